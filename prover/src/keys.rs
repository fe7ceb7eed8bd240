//! Groth16 key material for the note circuit.
//!
//! Keys are produced once by `keygen`, written in compressed arkworks
//! encoding, and loaded read-only into a [`KeyStore`] shared by every
//! prover and verifier in the process.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use ark_bn254::Bn254;
use ark_groth16::{Groth16, ProvingKey, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use ark_std::rand::{CryptoRng, RngCore};
use shroud_config::ProverConfig;
use tracing::info;

use crate::circuit::NoteCircuit;
use crate::error::{ProverError, Result};
use crate::prover::NoteProver;
use crate::verifier::NoteVerifier;

/// Run the circuit-specific setup for the note circuit.
pub fn setup<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> Result<(ProvingKey<Bn254>, VerifyingKey<Bn254>)> {
    let start = std::time::Instant::now();
    let keys = Groth16::<Bn254>::circuit_specific_setup(NoteCircuit::dummy(), rng)
        .map_err(|e| ProverError::Proving(format!("circuit setup failed: {e}")))?;
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "Note circuit setup complete");
    Ok(keys)
}

pub fn encode_proving_key(pk: &ProvingKey<Bn254>) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    pk.serialize_compressed(&mut bytes)
        .map_err(|e| ProverError::Proving(format!("failed to serialize proving key: {e}")))?;
    Ok(bytes)
}

pub fn encode_verifying_key(vk: &VerifyingKey<Bn254>) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    vk.serialize_compressed(&mut bytes).map_err(|e| {
        ProverError::VerifierConfig(format!("failed to serialize verifying key: {e}"))
    })?;
    Ok(bytes)
}

pub fn decode_proving_key(bytes: &[u8]) -> Result<ProvingKey<Bn254>> {
    if bytes.is_empty() {
        return Err(ProverError::Proving("proving key is empty".into()));
    }
    ProvingKey::<Bn254>::deserialize_compressed(bytes)
        .map_err(|e| ProverError::Proving(format!("failed to deserialize proving key: {e}")))
}

pub fn decode_verifying_key(bytes: &[u8]) -> Result<VerifyingKey<Bn254>> {
    if bytes.is_empty() {
        return Err(ProverError::VerifierConfig("verifying key is empty".into()));
    }
    VerifyingKey::<Bn254>::deserialize_compressed(bytes).map_err(|e| {
        ProverError::VerifierConfig(format!("failed to deserialize verifying key: {e}"))
    })
}

/// blake3 fingerprint of the encoded verifying key
pub fn verifying_key_hash(vk_bytes: &[u8]) -> [u8; 32] {
    *blake3::hash(vk_bytes).as_bytes()
}

/// Loaded, read-only key material.
///
/// Cloning is cheap; every clone shares the same prover and verifier.
#[derive(Clone)]
pub struct KeyStore {
    prover: Arc<NoteProver>,
    verifier: Arc<NoteVerifier>,
}

impl KeyStore {
    pub fn new(prover: NoteProver, verifier: NoteVerifier) -> Self {
        Self {
            prover: Arc::new(prover),
            verifier: Arc::new(verifier),
        }
    }

    /// Build a store from freshly generated keys
    pub fn from_keys(pk: ProvingKey<Bn254>, vk: &VerifyingKey<Bn254>) -> Result<Self> {
        Ok(Self::new(NoteProver::new(pk)?, NoteVerifier::new(vk)?))
    }

    /// Load from serialized key bytes
    pub fn from_bytes(pk_bytes: &[u8], vk_bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(
            NoteProver::from_bytes(pk_bytes)?,
            NoteVerifier::from_bytes(vk_bytes)?,
        ))
    }

    /// Load from key files
    pub fn from_files(pk_path: &Path, vk_path: &Path) -> Result<Self> {
        let pk_bytes = fs::read(pk_path).map_err(|e| {
            ProverError::Proving(format!(
                "failed to read proving key from {}: {e}",
                pk_path.display()
            ))
        })?;
        let vk_bytes = fs::read(vk_path).map_err(|e| {
            ProverError::VerifierConfig(format!(
                "failed to read verifying key from {}: {e}",
                vk_path.display()
            ))
        })?;

        let store = Self::from_bytes(&pk_bytes, &vk_bytes)?;
        info!(
            pk = %pk_path.display(),
            vk = %vk_path.display(),
            vk_hash = %hex::encode(store.verifier.vk_hash()),
            "Loaded note circuit keys"
        );
        Ok(store)
    }

    /// Load the key files named by the prover configuration
    pub fn load(config: &ProverConfig) -> Result<Self> {
        let pk_path = config
            .proving_key_path
            .as_deref()
            .ok_or_else(|| ProverError::Proving("no proving key configured".into()))?;
        let vk_path = config
            .verifying_key_path
            .as_deref()
            .ok_or_else(|| ProverError::VerifierConfig("no verifying key configured".into()))?;
        Self::from_files(Path::new(pk_path), Path::new(vk_path))
    }

    pub fn prover(&self) -> Arc<NoteProver> {
        Arc::clone(&self.prover)
    }

    pub fn verifier(&self) -> Arc<NoteVerifier> {
        Arc::clone(&self.verifier)
    }
}
