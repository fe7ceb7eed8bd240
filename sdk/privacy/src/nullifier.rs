//! Nullifiers
//!
//! Implements nullifier derivation for double-spend prevention.
//!
//! ```text
//! Nullifier = Poseidon("NULL", spending_key, note_commitment, position)
//! ```
//!
//! Once a nullifier is published, the corresponding note cannot be spent again.

use std::collections::HashSet;

use ark_bn254::Fr;
use ark_ff::PrimeField;

use crate::commitment::Commitment;
use crate::error::{PrivacyError, Result};
use crate::field::canonical_field_bytes;
use crate::poseidon;

canonical_field_bytes! {
    /// A nullifier (32 bytes) - unique tag for a spent note
    Nullifier
}

/// Nullifier derivation key.
///
/// Knowledge of this key is required to derive valid nullifiers.
#[derive(Clone)]
pub struct NullifierKey {
    key: [u8; 32],
}

impl NullifierKey {
    /// Create from raw bytes
    pub fn from_bytes(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Derive a nullifier for a note
    ///
    /// # Arguments
    /// * `commitment` - The note commitment
    /// * `position` - The note's position in the commitment tree (prevents nullifier grinding)
    pub fn derive_nullifier(&self, commitment: &Commitment, position: u64) -> Nullifier {
        let result = poseidon::hash(&[
            poseidon::nf_domain(),
            Fr::from_le_bytes_mod_order(&self.key),
            commitment.to_field(),
            Fr::from(position),
        ]);
        Nullifier::from_field(result)
    }
}

/// Published nullifiers.
///
/// Publication is the terminal unspent -> spent transition of a note; a
/// nullifier can enter the set once and never leaves it.
#[derive(Clone, Debug, Default)]
pub struct NullifierSet {
    set: HashSet<Nullifier>,
}

impl NullifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the nullifier has already been published.
    pub fn is_spent(&self, nf: &Nullifier) -> bool {
        self.set.contains(nf)
    }

    /// Publish a nullifier, marking its note spent.
    pub fn publish(&mut self, nf: Nullifier) -> Result<()> {
        if self.set.insert(nf) {
            Ok(())
        } else {
            Err(PrivacyError::AlreadySpent(nf))
        }
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}
