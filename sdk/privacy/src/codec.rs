//! JSON codec for notes and proofs
//!
//! ```text
//! Note  = {"noteCommitment": "0x..", "nullifier": "0x..", "value": 100 | {sealed}, "memo": ".."}
//! Proof = {"proof": "<hex>", "publicInputs": ["0x..", "0x.."]}
//! ```
//!
//! Every decode failure surfaces as [`PrivacyError::Validation`].

use crate::error::{PrivacyError, Result};
use crate::note::Note;
use crate::proof::Proof;

pub fn encode_note(note: &Note) -> Result<String> {
    serde_json::to_string(note).map_err(|e| PrivacyError::validation(e.to_string()))
}

pub fn decode_note(json: &str) -> Result<Note> {
    serde_json::from_str(json).map_err(|e| PrivacyError::validation(e.to_string()))
}

pub fn encode_proof(proof: &Proof) -> Result<String> {
    serde_json::to_string(proof).map_err(|e| PrivacyError::validation(e.to_string()))
}

pub fn decode_proof(json: &str) -> Result<Proof> {
    serde_json::from_str(json).map_err(|e| PrivacyError::validation(e.to_string()))
}
