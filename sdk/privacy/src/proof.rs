//! Proof objects
//!
//! A [`Proof`] is opaque proof bytes plus the ordered public inputs they were
//! produced for. This crate only carries proofs; producing and checking them
//! lives in `shroud-prover`.

use serde::{Deserialize, Serialize};

use crate::field::FieldElement;

/// A note-validity proof and its public inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Serialized proof (hex in JSON)
    #[serde(rename = "proof", with = "hex::serde")]
    proof_bytes: Vec<u8>,
    /// Public inputs, `[commitment, nullifier]` for note proofs
    #[serde(rename = "publicInputs")]
    public_inputs: Vec<FieldElement>,
}

impl Proof {
    pub fn new(proof_bytes: Vec<u8>, public_inputs: Vec<FieldElement>) -> Self {
        Self {
            proof_bytes,
            public_inputs,
        }
    }

    pub fn proof_bytes(&self) -> &[u8] {
        &self.proof_bytes
    }

    pub fn public_inputs(&self) -> &[FieldElement] {
        &self.public_inputs
    }

    /// Whether the carried public inputs are exactly `expected`
    pub fn binds(&self, expected: &[FieldElement]) -> bool {
        self.public_inputs == expected
    }
}
