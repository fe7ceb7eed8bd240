//! Note Commitments
//!
//! Implements Poseidon-based commitments for notes.
//!
//! ```text
//! Commitment = Poseidon(value || randomness || owner_pk)
//! ```
//!
//! This hides the note contents while allowing ZK proofs of knowledge.

use ark_bn254::Fr;
use ark_ff::PrimeField;

use crate::field::canonical_field_bytes;
use crate::poseidon;

canonical_field_bytes! {
    /// A note commitment (32 bytes, canonical BN254 scalar)
    Commitment
}

/// Commit to a note: C = Poseidon(value, randomness, owner_pk)
///
/// # Arguments
/// * `value` - The note value (amount)
/// * `randomness` - Random blinding factor (32 bytes)
/// * `owner_pk` - Owner's public key (32 bytes)
pub fn commit(value: u64, randomness: &[u8; 32], owner_pk: &[u8; 32]) -> Commitment {
    let result = poseidon::hash(&[
        Fr::from(value),
        Fr::from_le_bytes_mod_order(randomness),
        Fr::from_le_bytes_mod_order(owner_pk),
    ]);
    Commitment::from_field(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commitment_deterministic() {
        let c1 = commit(1000, &[42u8; 32], &[1u8; 32]);
        let c2 = commit(1000, &[42u8; 32], &[1u8; 32]);

        assert_eq!(c1, c2, "same inputs should produce same commitment");
    }

    #[test]
    fn test_commitment_hiding() {
        let c1 = commit(1000, &[1u8; 32], &[1u8; 32]);
        let c2 = commit(1000, &[2u8; 32], &[1u8; 32]);

        assert_ne!(
            c1, c2,
            "different randomness should produce different commitments"
        );
    }

    #[test]
    fn test_commitment_binding() {
        let c1 = commit(1000, &[42u8; 32], &[1u8; 32]);
        let c2 = commit(2000, &[42u8; 32], &[1u8; 32]);
        let c3 = commit(1000, &[42u8; 32], &[2u8; 32]);

        assert_ne!(c1, c2, "different values should produce different commitments");
        assert_ne!(c1, c3, "different owners should produce different commitments");
    }

    #[test]
    fn test_commitment_rejects_non_canonical_bytes() {
        assert!(Commitment::from_slice(&[0xff; 32]).is_err());
        assert!(Commitment::from_slice(&[0x01; 31]).is_err());

        let c = commit(7, &[3u8; 32], &[4u8; 32]);
        assert_eq!(Commitment::from_slice(c.as_bytes()).unwrap(), c);
    }

    #[test]
    fn test_commitment_text_round_trip() {
        let c = commit(7, &[3u8; 32], &[4u8; 32]);
        let text = c.to_string();
        assert!(text.starts_with("0x"));
        assert_eq!(text.parse::<Commitment>().unwrap(), c);
    }
}
