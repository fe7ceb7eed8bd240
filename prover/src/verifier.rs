//! Groth16 verifier for note validity.
//!
//! Verification never errors on proof contents: malformed bytes, trailing
//! bytes, wrong input counts, non-canonical inputs and failed pairings all
//! yield `false`. Only an unusable verifying key is an error.

use ark_bn254::{Bn254, Fr};
use ark_groth16::{Groth16, PreparedVerifyingKey, VerifyingKey};
use ark_serialize::CanonicalDeserialize;
use ark_snark::SNARK;
use shroud_privacy::{FieldElement, Note, Proof};
use tracing::debug;

use crate::circuit::NUM_PUBLIC_INPUTS;
use crate::error::{ProverError, Result};
use crate::keys::{decode_verifying_key, encode_verifying_key, verifying_key_hash};

/// Checks note-validity proofs against one verifying key.
pub struct NoteVerifier {
    pvk: PreparedVerifyingKey<Bn254>,
    vk_hash: [u8; 32],
}

impl NoteVerifier {
    pub fn new(vk: &VerifyingKey<Bn254>) -> Result<Self> {
        let inputs = vk.gamma_abc_g1.len().saturating_sub(1);
        if inputs != NUM_PUBLIC_INPUTS {
            return Err(ProverError::VerifierConfig(format!(
                "verifying key expects {inputs} public inputs, note circuit has {NUM_PUBLIC_INPUTS}"
            )));
        }

        let vk_hash = verifying_key_hash(&encode_verifying_key(vk)?);
        let pvk = Groth16::<Bn254>::process_vk(vk).map_err(|e| {
            ProverError::VerifierConfig(format!("failed to prepare verifying key: {e}"))
        })?;
        Ok(Self { pvk, vk_hash })
    }

    /// Load from compressed key bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::new(&decode_verifying_key(bytes)?)
    }

    /// blake3 fingerprint of the verifying key
    pub fn vk_hash(&self) -> [u8; 32] {
        self.vk_hash
    }

    /// Check `proof` against the expected public inputs.
    pub fn verify(&self, proof: &Proof, expected: &[FieldElement]) -> bool {
        if !proof.binds(expected) {
            debug!("Proof public inputs differ from the expected inputs");
            return false;
        }
        if expected.len() != NUM_PUBLIC_INPUTS {
            debug!(count = expected.len(), "Wrong number of public inputs");
            return false;
        }

        let inputs: Option<Vec<Fr>> = expected.iter().map(FieldElement::to_field).collect();
        let Some(inputs) = inputs else {
            debug!("Non-canonical public input");
            return false;
        };

        let Some(groth_proof) = decode_groth16_proof(proof.proof_bytes()) else {
            debug!(len = proof.proof_bytes().len(), "Malformed proof bytes");
            return false;
        };

        match Groth16::<Bn254>::verify_with_processed_vk(&self.pvk, &inputs, &groth_proof) {
            Ok(valid) => valid,
            Err(e) => {
                debug!(error = %e, "Verification errored");
                false
            }
        }
    }

    /// Check `proof` against the public inputs of `note`
    pub fn verify_note(&self, proof: &Proof, note: &Note) -> bool {
        self.verify(proof, &note.public_inputs())
    }
}

impl std::fmt::Debug for NoteVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteVerifier")
            .field("vk_hash", &hex::encode(self.vk_hash))
            .finish_non_exhaustive()
    }
}

/// One-shot verification with a serialized verifying key.
///
/// Errors only when the key itself is unusable.
pub fn verify_proof(proof: &Proof, vk_bytes: &[u8], expected: &[FieldElement]) -> Result<bool> {
    Ok(NoteVerifier::from_bytes(vk_bytes)?.verify(proof, expected))
}

/// Decode a compressed proof, rejecting trailing bytes
fn decode_groth16_proof(bytes: &[u8]) -> Option<ark_groth16::Proof<Bn254>> {
    let mut reader = bytes;
    let proof = ark_groth16::Proof::<Bn254>::deserialize_compressed(&mut reader).ok()?;
    reader.is_empty().then_some(proof)
}
