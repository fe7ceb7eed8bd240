#![allow(dead_code)]

use std::sync::OnceLock;

use ark_std::rand::{SeedableRng, rngs::StdRng};
use shroud_privacy::{Note, NoteOpening, SpendingKey};
use shroud_prover::keys::{encode_proving_key, encode_verifying_key};
use shroud_prover::{KeyStore, setup};

pub struct Fixture {
    pub keys: KeyStore,
    pub pk_bytes: Vec<u8>,
    pub vk_bytes: Vec<u8>,
}

static FIXTURE: OnceLock<Fixture> = OnceLock::new();

/// Keys from a seeded setup, generated once per test binary
pub fn fixture() -> &'static Fixture {
    FIXTURE.get_or_init(|| {
        let (pk, vk) = setup(&mut StdRng::seed_from_u64(42)).unwrap();
        let pk_bytes = encode_proving_key(&pk).unwrap();
        let vk_bytes = encode_verifying_key(&vk).unwrap();
        let keys = KeyStore::from_keys(pk, &vk).unwrap();
        Fixture {
            keys,
            pk_bytes,
            vk_bytes,
        }
    })
}

pub fn opening(value: u64) -> NoteOpening {
    NoteOpening::new(value, [17u8; 32], SpendingKey::from_bytes([23u8; 32]), 4)
}

pub fn note_and_opening(value: u64) -> (Note, NoteOpening) {
    let opening = opening(value);
    let note = opening.to_note("").unwrap();
    (note, opening)
}
