//! Shroud Prover
//!
//! Groth16 (BN254) proofs that a note's commitment and nullifier were derived
//! from a valid opening, without revealing the opening.
//!
//! ```text
//! keygen ──► proving.key ──► NoteProver ──► Proof { bytes, [cm, nf] }
//!        └─► verifying.key ─► NoteVerifier ─► bool
//!                              ▲
//!                 ProofService (tokio, per-call budget)
//! ```

pub mod circuit;
pub mod error;
pub mod keys;
pub mod prover;
pub mod service;
pub mod verifier;

pub use circuit::{CircuitShape, NUM_PUBLIC_INPUTS, NoteCircuit, circuit_shape};
pub use error::{ProverError, Result};
pub use keys::{KeyStore, setup, verifying_key_hash};
pub use prover::{NoteProver, ProofSeed};
pub use service::ProofService;
pub use verifier::{NoteVerifier, verify_proof};
