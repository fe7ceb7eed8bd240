//! Shroud Privacy SDK
//!
//! Confidential note primitives shared by wallets, the prover and verifiers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Note                                   │
//! │  ┌──────────────┐  ┌──────────────┐  ┌───────────────────────┐ │
//! │  │  Commitment  │  │  Nullifier   │  │   Value (plain or     │ │
//! │  │  (public)    │  │  (spend tag) │  │   sealed, AEAD)       │ │
//! │  └──────────────┘  └──────────────┘  └───────────────────────┘ │
//! │         │                 │                                     │
//! │         ▼                 ▼                                     │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │          Proof { proof_bytes, [commitment, nullifier] }  │   │
//! │  │  • produced and checked by shroud-prover (Groth16)       │   │
//! │  │  • JSON codec for the on-chain verifier                  │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod cipher;
pub mod codec;
pub mod commitment;
pub mod error;
pub mod field;
pub mod note;
pub mod nullifier;
pub mod poseidon;
pub mod proof;

pub use cipher::{SealedValue, SharedSecret, open_value, seal_value};
pub use codec::{decode_note, decode_proof, encode_note, encode_proof};
pub use commitment::{Commitment, commit};
pub use error::PrivacyError;
pub use field::FieldElement;
pub use note::{MAX_MEMO_BYTES, Note, NoteOpening, NoteValue, RawNote, SpendingKey};
pub use nullifier::{Nullifier, NullifierKey, NullifierSet};
pub use proof::Proof;
