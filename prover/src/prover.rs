//! Groth16 prover for note validity.

use std::time::Instant;

use ark_bn254::Bn254;
use ark_groth16::{Groth16, ProvingKey};
use ark_serialize::CanonicalSerialize;
use ark_snark::SNARK;
use ark_std::rand::{SeedableRng, rngs::StdRng};
use rand::rngs::OsRng;
use shroud_privacy::{Note, NoteOpening, Proof};
use tracing::{debug, info};

use crate::circuit::{NUM_PUBLIC_INPUTS, NoteCircuit, circuit_shape};
use crate::error::{ProverError, Result};
use crate::keys::decode_proving_key;

/// Randomness source for proof blinding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProofSeed {
    /// Seeded generator; the same seed, key and note give identical proof bytes
    Fixed([u8; 32]),
    /// Operating system randomness
    Os,
}

/// Produces note-validity proofs from a loaded proving key.
pub struct NoteProver {
    proving_key: ProvingKey<Bn254>,
}

impl NoteProver {
    /// Wrap a proving key, rejecting keys generated for another circuit.
    ///
    /// The key's public input count and its per-variable queries must match
    /// the synthesized note circuit.
    pub fn new(proving_key: ProvingKey<Bn254>) -> Result<Self> {
        let inputs = proving_key.vk.gamma_abc_g1.len().saturating_sub(1);
        if inputs != NUM_PUBLIC_INPUTS {
            return Err(ProverError::Proving(format!(
                "proving key expects {inputs} public inputs, note circuit has {NUM_PUBLIC_INPUTS}"
            )));
        }

        let shape = circuit_shape()
            .map_err(|e| ProverError::Proving(format!("failed to synthesize note circuit: {e}")))?;
        let variables = shape.num_variables();
        if proving_key.a_query.len() != variables || proving_key.b_g2_query.len() != variables {
            return Err(ProverError::Proving(format!(
                "proving key covers {} variables, note circuit has {variables}",
                proving_key.a_query.len()
            )));
        }

        Ok(Self { proving_key })
    }

    /// Load from compressed key bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::new(decode_proving_key(bytes)?)
    }

    pub fn proving_key(&self) -> &ProvingKey<Bn254> {
        &self.proving_key
    }

    /// Prove that `opening` is a valid opening of `note`.
    ///
    /// The resulting proof carries `[commitment, nullifier]` as its public
    /// inputs. An opening that does not match the note is rejected before
    /// any proving work is done.
    pub fn prove(&self, note: &Note, opening: &NoteOpening, seed: ProofSeed) -> Result<Proof> {
        if !opening.opens(note) {
            debug!(commitment = %note.commitment(), "Opening does not match note");
            return Err(ProverError::Proving(
                "witness does not satisfy the note circuit".into(),
            ));
        }

        let circuit = NoteCircuit::new(note, opening);
        let start = Instant::now();

        let proof = match seed {
            ProofSeed::Fixed(seed) => {
                Groth16::<Bn254>::prove(&self.proving_key, circuit, &mut StdRng::from_seed(seed))
            }
            ProofSeed::Os => Groth16::<Bn254>::prove(&self.proving_key, circuit, &mut OsRng),
        }
        .map_err(|e| ProverError::Proving(format!("proof generation failed: {e}")))?;

        let mut proof_bytes = Vec::new();
        proof
            .serialize_compressed(&mut proof_bytes)
            .map_err(|e| ProverError::Proving(format!("failed to serialize proof: {e}")))?;

        info!(
            commitment = %note.commitment(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            proof_bytes = proof_bytes.len(),
            "Generated note proof"
        );

        Ok(Proof::new(proof_bytes, note.public_inputs().to_vec()))
    }
}

impl std::fmt::Debug for NoteProver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteProver").finish_non_exhaustive()
    }
}
