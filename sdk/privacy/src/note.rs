//! Confidential Notes
//!
//! A [`Note`] is the public face of privately held value: what a wallet
//! observes on chain and what the verifier checks a proof against.
//!
//! ```text
//! Note = {
//!     commitment: [u8; 32],   // Poseidon(value, randomness, owner_pk)
//!     nullifier:  [u8; 32],   // Poseidon("NULL", sk, commitment, position)
//!     value:      u64 | sealed,
//!     memo:       <= 512 bytes,
//! }
//! ```
//!
//! The matching [`NoteOpening`] holds the private values that open the
//! commitment and derive the nullifier.

use std::fmt;

use ark_bn254::Fr;
use ark_ff::PrimeField;
use ark_std::rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::cipher::{SealedValue, SharedSecret, open_value, seal_value};
use crate::commitment::{Commitment, commit};
use crate::error::{PrivacyError, Result};
use crate::field::{FieldElement, fr_to_bytes};
use crate::nullifier::{Nullifier, NullifierKey};
use crate::poseidon;

/// Largest memo accepted, in bytes
pub const MAX_MEMO_BYTES: usize = 512;

/// Largest integer a JavaScript wallet can hand over exactly as a double
const MAX_SAFE_JSON_FLOAT: f64 = 9_007_199_254_740_991.0;

/// Note value, either in the clear or sealed under a shared secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValue {
    Plain(u64),
    Sealed(SealedValue),
}

impl NoteValue {
    /// The plaintext amount, if not sealed
    pub fn plain(&self) -> Option<u64> {
        match self {
            Self::Plain(v) => Some(*v),
            Self::Sealed(_) => None,
        }
    }

    pub fn is_sealed(&self) -> bool {
        matches!(self, Self::Sealed(_))
    }
}

impl From<u64> for NoteValue {
    fn from(value: u64) -> Self {
        Self::Plain(value)
    }
}

/// A confidential note. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNote", into = "RawNote")]
pub struct Note {
    commitment: Commitment,
    nullifier: Nullifier,
    value: NoteValue,
    memo: String,
}

impl Note {
    /// Build a note from already-validated commitment and nullifier
    pub fn new(
        commitment: Commitment,
        nullifier: Nullifier,
        value: impl Into<NoteValue>,
        memo: impl Into<String>,
    ) -> Result<Self> {
        let memo = memo.into();
        if memo.len() > MAX_MEMO_BYTES {
            return Err(PrivacyError::validation(format!(
                "memo is {} bytes, limit is {MAX_MEMO_BYTES}",
                memo.len()
            )));
        }

        Ok(Self {
            commitment,
            nullifier,
            value: value.into(),
            memo,
        })
    }

    /// Build a note from raw byte fields, checking their lengths and encodings
    pub fn from_parts(
        commitment: &[u8],
        nullifier: &[u8],
        value: impl Into<NoteValue>,
        memo: impl Into<String>,
    ) -> Result<Self> {
        Self::new(
            Commitment::from_slice(commitment)?,
            Nullifier::from_slice(nullifier)?,
            value,
            memo,
        )
    }

    pub fn commitment(&self) -> &Commitment {
        &self.commitment
    }

    pub fn nullifier(&self) -> &Nullifier {
        &self.nullifier
    }

    pub fn value(&self) -> &NoteValue {
        &self.value
    }

    /// Memo, `None` when empty
    pub fn memo(&self) -> Option<&str> {
        (!self.memo.is_empty()).then_some(self.memo.as_str())
    }

    /// Public inputs a proof for this note must carry: `[commitment, nullifier]`
    pub fn public_inputs(&self) -> [FieldElement; 2] {
        [self.commitment.into(), self.nullifier.into()]
    }

    /// The same note with its value sealed under `secret`.
    ///
    /// A note that is already sealed is returned unchanged.
    pub fn seal_value(&self, secret: &SharedSecret) -> Result<Self> {
        let value = match &self.value {
            NoteValue::Plain(v) => NoteValue::Sealed(seal_value(*v, secret)?),
            NoteValue::Sealed(_) => return Ok(self.clone()),
        };
        Ok(Self {
            value,
            ..self.clone()
        })
    }

    /// Recover the amount, decrypting it if sealed
    pub fn open_value(&self, secret: &SharedSecret) -> Result<u64> {
        match &self.value {
            NoteValue::Plain(v) => Ok(*v),
            NoteValue::Sealed(sealed) => open_value(sealed, secret),
        }
    }
}

/// Note fields as a wallet or RPC node reports them.
///
/// Accepts the field names the dashboard wallets emit (`cm`/`commitment`/
/// `noteCommitment`, `nf`/`nullifier`); always serializes with the canonical
/// names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNote {
    #[serde(alias = "cm", alias = "commitment")]
    pub note_commitment: String,
    #[serde(alias = "nf")]
    pub nullifier: String,
    pub value: RawValue,
    #[serde(default)]
    pub memo: Option<String>,
}

/// A note value before range checks
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(serde_json::Number),
    Sealed(SealedValue),
}

impl RawValue {
    fn into_note_value(self) -> Result<NoteValue> {
        let number = match self {
            Self::Sealed(sealed) => return Ok(NoteValue::Sealed(sealed)),
            Self::Number(number) => number,
        };

        if let Some(v) = number.as_u64() {
            return Ok(NoteValue::Plain(v));
        }
        if number.is_i64() {
            return Err(PrivacyError::validation(format!(
                "note value {number} is negative"
            )));
        }
        match number.as_f64() {
            Some(f) if f < 0.0 => Err(PrivacyError::validation(format!(
                "note value {number} is negative"
            ))),
            Some(f) if f.fract() != 0.0 => Err(PrivacyError::validation(format!(
                "note value {number} is not an integer"
            ))),
            Some(f) if f <= MAX_SAFE_JSON_FLOAT => Ok(NoteValue::Plain(f as u64)),
            _ => Err(PrivacyError::validation(format!(
                "note value {number} is out of range"
            ))),
        }
    }
}

impl TryFrom<RawNote> for Note {
    type Error = PrivacyError;

    fn try_from(raw: RawNote) -> Result<Self> {
        Note::new(
            raw.note_commitment.parse()?,
            raw.nullifier.parse()?,
            raw.value.into_note_value()?,
            raw.memo.unwrap_or_default(),
        )
    }
}

impl From<Note> for RawNote {
    fn from(note: Note) -> Self {
        let value = match note.value {
            NoteValue::Plain(v) => RawValue::Number(v.into()),
            NoteValue::Sealed(sealed) => RawValue::Sealed(sealed),
        };
        RawNote {
            note_commitment: note.commitment.to_string(),
            nullifier: note.nullifier.to_string(),
            value,
            memo: Some(note.memo),
        }
    }
}

/// Spending key - allows spending notes
///
/// This is the most sensitive key. Loss = loss of funds.
/// Compromise = theft of funds.
#[derive(Clone)]
pub struct SpendingKey {
    key: [u8; 32],
}

impl SpendingKey {
    /// Generate a random spending key
    pub fn random<R: RngCore>(rng: &mut R) -> Self {
        let mut key = [0u8; 32];
        rng.fill_bytes(&mut key);
        Self { key }
    }

    pub fn from_bytes(key: [u8; 32]) -> Self {
        Self { key }
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }

    pub fn nullifier_key(&self) -> NullifierKey {
        NullifierKey::from_bytes(self.key)
    }

    /// Derive the public key (address): Poseidon("ShroudPK", sk)
    pub fn public_key(&self) -> [u8; 32] {
        let pk = poseidon::hash(&[poseidon::pk_domain(), Fr::from_le_bytes_mod_order(&self.key)]);
        fr_to_bytes(&pk)
    }
}

impl fmt::Debug for SpendingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SpendingKey(..)")
    }
}

/// The private values behind a note
#[derive(Clone, Debug)]
pub struct NoteOpening {
    /// The value (amount) held in this note
    pub value: u64,
    /// Random blinding factor for hiding the commitment
    pub randomness: [u8; 32],
    /// Key that authorizes spending
    pub spending_key: SpendingKey,
    /// Position in the commitment tree
    pub position: u64,
}

impl NoteOpening {
    pub fn new(value: u64, randomness: [u8; 32], spending_key: SpendingKey, position: u64) -> Self {
        Self {
            value,
            randomness,
            spending_key,
            position,
        }
    }

    /// Create an opening with fresh blinding
    pub fn random<R: RngCore>(
        value: u64,
        spending_key: SpendingKey,
        position: u64,
        rng: &mut R,
    ) -> Self {
        let mut randomness = [0u8; 32];
        rng.fill_bytes(&mut randomness);
        Self::new(value, randomness, spending_key, position)
    }

    pub fn owner_pk(&self) -> [u8; 32] {
        self.spending_key.public_key()
    }

    pub fn commitment(&self) -> Commitment {
        commit(self.value, &self.randomness, &self.owner_pk())
    }

    pub fn nullifier(&self) -> Nullifier {
        self.spending_key
            .nullifier_key()
            .derive_nullifier(&self.commitment(), self.position)
    }

    /// The public note this opening describes, value in the clear
    pub fn to_note(&self, memo: impl Into<String>) -> Result<Note> {
        Note::new(self.commitment(), self.nullifier(), self.value, memo)
    }

    /// Whether this opening matches `note`: same commitment, same nullifier
    /// and, for a plaintext note, the same value.
    pub fn opens(&self, note: &Note) -> bool {
        let commitment = self.commitment();
        let value_matches = note.value.plain().is_none_or(|v| v == self.value);
        value_matches
            && note.commitment == commitment
            && note.nullifier
                == self
                    .spending_key
                    .nullifier_key()
                    .derive_nullifier(&commitment, self.position)
    }
}
