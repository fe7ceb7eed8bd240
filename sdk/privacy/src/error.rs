//! Error taxonomy for note handling and value sealing.

use thiserror::Error;

use crate::nullifier::Nullifier;

/// Errors raised by the privacy primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrivacyError {
    /// Input has the wrong shape (lengths, encodings, ranges)
    #[error("validation error: {0}")]
    Validation(String),

    /// The ciphertext tag did not verify under the given secret
    #[error("authentication failed: ciphertext tag did not verify")]
    Authentication,

    /// The AEAD refused to encrypt the plaintext
    #[error("encryption failed")]
    Encryption,

    /// HKDF could not expand the shared secret
    #[error("key derivation failed")]
    KeyDerivation,

    /// The nullifier was already published
    #[error("note already spent: nullifier {0} was published before")]
    AlreadySpent(Nullifier),
}

impl PrivacyError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Result type for privacy operations
pub type Result<T> = std::result::Result<T, PrivacyError>;
