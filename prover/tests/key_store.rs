mod common;

use std::fs;

use shroud_config::ProverConfig;
use shroud_prover::{KeyStore, ProofSeed, ProofService, ProverError};

use common::{fixture, note_and_opening};

#[test]
fn test_load_from_configured_files() {
    let fx = fixture();
    let dir = tempfile::tempdir().unwrap();
    let pk_path = dir.path().join("proving.key");
    let vk_path = dir.path().join("verifying.key");
    fs::write(&pk_path, &fx.pk_bytes).unwrap();
    fs::write(&vk_path, &fx.vk_bytes).unwrap();

    let config = ProverConfig {
        proving_key_path: Some(pk_path.to_string_lossy().into_owned()),
        verifying_key_path: Some(vk_path.to_string_lossy().into_owned()),
        ..ProverConfig::default()
    };
    let keys = KeyStore::load(&config).unwrap();
    assert_eq!(keys.verifier().vk_hash(), fx.keys.verifier().vk_hash());

    // Proofs from loaded keys verify under the in-memory keys and vice versa
    let (note, opening) = note_and_opening(31);
    let proof = keys
        .prover()
        .prove(&note, &opening, ProofSeed::Os)
        .unwrap();
    assert!(fx.keys.verifier().verify_note(&proof, &note));

    assert!(ProofService::from_config(&config).is_ok());
}

#[test]
fn test_clones_share_keys() {
    let keys = fixture().keys.clone();
    assert!(std::sync::Arc::ptr_eq(
        &keys.verifier(),
        &fixture().keys.verifier()
    ));
}

#[test]
fn test_missing_file_is_error() {
    let fx = fixture();
    let dir = tempfile::tempdir().unwrap();
    let vk_path = dir.path().join("verifying.key");
    fs::write(&vk_path, &fx.vk_bytes).unwrap();

    let result = KeyStore::from_files(&dir.path().join("absent.key"), &vk_path);
    assert!(matches!(result, Err(ProverError::Proving(_))));
}

#[test]
fn test_corrupt_verifying_key_file() {
    let fx = fixture();
    let dir = tempfile::tempdir().unwrap();
    let pk_path = dir.path().join("proving.key");
    let vk_path = dir.path().join("verifying.key");
    fs::write(&pk_path, &fx.pk_bytes).unwrap();
    fs::write(&vk_path, b"definitely not a key").unwrap();

    let result = KeyStore::from_files(&pk_path, &vk_path);
    assert!(matches!(result, Err(ProverError::VerifierConfig(_))));
}

#[test]
fn test_proving_key_for_wrong_bytes() {
    assert!(matches!(
        KeyStore::from_bytes(&[7u8; 16], &fixture().vk_bytes),
        Err(ProverError::Proving(_))
    ));
}
