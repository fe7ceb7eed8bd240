//! Error definitions for proving and verification.
use std::time::Duration;

use shroud_privacy::PrivacyError;
use thiserror::Error;

/// Errors that can occur while proving or verifying note proofs
#[derive(Error, Debug)]
pub enum ProverError {
    /// The proving key is unusable or the witness does not satisfy the circuit
    #[error("proving error: {0}")]
    Proving(String),

    /// The verification key is missing or malformed
    #[error("verifier configuration error: {0}")]
    VerifierConfig(String),

    /// The operation did not finish within its budget
    #[error("operation exceeded its budget of {0:?}")]
    Timeout(Duration),

    /// The worker running the operation panicked or was shut down
    #[error("proof worker failed: {0}")]
    Worker(String),

    /// Note-level validation error
    #[error(transparent)]
    Note(#[from] PrivacyError),
}

/// Result type for prover operations
pub type Result<T> = std::result::Result<T, ProverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ProverError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "operation exceeded its budget of 250ms");

        let err = ProverError::VerifierConfig("no verifying key configured".into());
        assert_eq!(
            err.to_string(),
            "verifier configuration error: no verifying key configured"
        );

        let err: ProverError = PrivacyError::Authentication.into();
        assert_eq!(
            err.to_string(),
            "authentication failed: ciphertext tag did not verify"
        );
    }
}
