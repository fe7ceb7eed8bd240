//! Poseidon parameters shared by the native code and the note circuit
//!
//! Field: BN254 Fr (254 bits)
//! Rate: 2, Capacity: 1
//! Rounds: 8 full, 57 partial, alpha = 5

use std::sync::OnceLock;

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::{
    CryptographicSponge,
    poseidon::{PoseidonConfig, PoseidonSponge, find_poseidon_ark_and_mds},
};
use ark_ff::PrimeField;

/// Domain tag for public key derivation
pub const PK_DOMAIN: &[u8; 32] = b"ShroudPK\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0";

/// Domain tag for nullifier derivation ("NULL")
pub const NF_DOMAIN: u64 = 0x4e554c4c;

const RATE: usize = 2;
const CAPACITY: usize = 1;
const FULL_ROUNDS: u64 = 8;
const PARTIAL_ROUNDS: u64 = 57;
const ALPHA: u64 = 5;

static CONFIG: OnceLock<PoseidonConfig<Fr>> = OnceLock::new();

/// Poseidon configuration, computed once per process
pub fn config() -> &'static PoseidonConfig<Fr> {
    CONFIG.get_or_init(|| {
        let (ark, mds) = find_poseidon_ark_and_mds::<Fr>(
            Fr::MODULUS_BIT_SIZE as u64,
            RATE,
            FULL_ROUNDS,
            PARTIAL_ROUNDS,
            0,
        );
        PoseidonConfig::new(
            FULL_ROUNDS as usize,
            PARTIAL_ROUNDS as usize,
            ALPHA,
            mds,
            ark,
            RATE,
            CAPACITY,
        )
    })
}

/// Absorb `inputs` in order and squeeze one element
pub fn hash(inputs: &[Fr]) -> Fr {
    let mut sponge = PoseidonSponge::new(config());
    for input in inputs {
        sponge.absorb(input);
    }
    sponge.squeeze_field_elements::<Fr>(1)[0]
}

/// Domain separator for public key derivation as a field element
pub fn pk_domain() -> Fr {
    Fr::from_le_bytes_mod_order(PK_DOMAIN)
}

/// Domain separator for nullifier derivation as a field element
pub fn nf_domain() -> Fr {
    Fr::from(NF_DOMAIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_order_sensitive() {
        let a = Fr::from(1u64);
        let b = Fr::from(2u64);
        assert_ne!(hash(&[a, b]), hash(&[b, a]));
        assert_eq!(hash(&[a, b]), hash(&[a, b]));
    }
}
