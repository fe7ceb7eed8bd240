//! Note Validity Circuit
//!
//! ZK proof that a note is well formed:
//! 1. The commitment opens to (value, randomness, owner_pk)
//! 2. owner_pk is derived from the spending key
//! 3. The nullifier is derived from the spending key, commitment and position
//! 4. The value fits in 64 bits
//!
//! ```text
//! Public Inputs (in order):
//!   - commitment
//!   - nullifier
//!
//! Private Witness:
//!   - value (64 bits), randomness, spending_key, position
//! ```

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::constraints::CryptographicSpongeVar;
use ark_crypto_primitives::sponge::poseidon::{PoseidonConfig, constraints::PoseidonSpongeVar};
use ark_ff::PrimeField;
use ark_r1cs_std::{alloc::AllocVar, boolean::Boolean, eq::EqGadget, fields::fp::FpVar, prelude::*};
use ark_relations::r1cs::{
    ConstraintSynthesizer, ConstraintSystem, ConstraintSystemRef, SynthesisError, SynthesisMode,
};
use shroud_privacy::{Note, NoteOpening, SpendingKey, poseidon};

/// Number of public inputs: commitment, nullifier
pub const NUM_PUBLIC_INPUTS: usize = 2;

/// Bit width enforced on the note value
pub const VALUE_BITS: usize = 64;

/// The note validity circuit.
///
/// Every field is optional so the same type serves key generation (no
/// assignment) and proving (full assignment).
#[derive(Clone, Debug, Default)]
pub struct NoteCircuit {
    // Public inputs
    pub commitment: Option<Fr>,
    pub nullifier: Option<Fr>,

    // Private witness
    pub value: Option<u64>,
    pub randomness: Option<Fr>,
    pub spending_key: Option<Fr>,
    pub position: Option<u64>,
}

impl NoteCircuit {
    /// Assign the circuit from a public note and its opening.
    pub fn new(note: &Note, opening: &NoteOpening) -> Self {
        Self {
            commitment: Some(note.commitment().to_field()),
            nullifier: Some(note.nullifier().to_field()),
            value: Some(opening.value),
            randomness: Some(Fr::from_le_bytes_mod_order(&opening.randomness)),
            spending_key: Some(Fr::from_le_bytes_mod_order(
                opening.spending_key.as_bytes(),
            )),
            position: Some(opening.position),
        }
    }

    /// A fully assigned circuit for parameter generation
    pub fn dummy() -> Self {
        let opening = NoteOpening::new(0, [0u8; 32], SpendingKey::from_bytes([1u8; 32]), 0);
        Self {
            commitment: Some(opening.commitment().to_field()),
            nullifier: Some(opening.nullifier().to_field()),
            value: Some(opening.value),
            randomness: Some(Fr::from_le_bytes_mod_order(&opening.randomness)),
            spending_key: Some(Fr::from_le_bytes_mod_order(
                opening.spending_key.as_bytes(),
            )),
            position: Some(opening.position),
        }
    }
}

/// Variable counts of the synthesized note circuit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CircuitShape {
    /// Instance variables, including the constant one
    pub num_instance: usize,
    pub num_witness: usize,
    pub num_constraints: usize,
}

impl CircuitShape {
    /// Every R1CS variable (instance and witness)
    pub fn num_variables(&self) -> usize {
        self.num_instance + self.num_witness
    }
}

/// Synthesize the note circuit in setup mode and count its variables.
pub fn circuit_shape() -> Result<CircuitShape, SynthesisError> {
    let cs = ConstraintSystem::<Fr>::new_ref();
    cs.set_mode(SynthesisMode::Setup);
    NoteCircuit::dummy().generate_constraints(cs.clone())?;
    Ok(CircuitShape {
        num_instance: cs.num_instance_variables(),
        num_witness: cs.num_witness_variables(),
        num_constraints: cs.num_constraints(),
    })
}

impl ConstraintSynthesizer<Fr> for NoteCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let config = poseidon::config();

        // ========================================================================
        // PUBLIC INPUTS (order is part of the verifying key)
        // ========================================================================

        let commitment_var = FpVar::new_input(cs.clone(), || {
            self.commitment.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let nullifier_var = FpVar::new_input(cs.clone(), || {
            self.nullifier.ok_or(SynthesisError::AssignmentMissing)
        })?;

        // ========================================================================
        // PRIVATE WITNESS
        // ========================================================================

        // Value as 64 boolean bits, so the recomposed value is < 2^64
        let mut value_var = FpVar::<Fr>::zero();
        for i in 0..VALUE_BITS {
            let bit = Boolean::new_witness(cs.clone(), || {
                self.value
                    .map(|v| (v >> i) & 1 == 1)
                    .ok_or(SynthesisError::AssignmentMissing)
            })?;
            value_var += FpVar::from(bit) * Fr::from(1u64 << i);
        }

        let randomness_var = FpVar::new_witness(cs.clone(), || {
            self.randomness.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let spending_key_var = FpVar::new_witness(cs.clone(), || {
            self.spending_key.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let position_var = FpVar::new_witness(cs.clone(), || {
            self.position
                .map(Fr::from)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        // ========================================================================
        // CONSTRAINTS
        // ========================================================================

        let owner_pk = derive_public_key(cs.clone(), config, &spending_key_var)?;

        let computed_commitment =
            compute_commitment(cs.clone(), config, &value_var, &randomness_var, &owner_pk)?;
        computed_commitment.enforce_equal(&commitment_var)?;

        let computed_nullifier = compute_nullifier(
            cs,
            config,
            &spending_key_var,
            &computed_commitment,
            &position_var,
        )?;
        computed_nullifier.enforce_equal(&nullifier_var)?;

        Ok(())
    }
}

/// Sponge over `inputs`, absorbed in order, squeezing one element
fn poseidon_hash(
    cs: ConstraintSystemRef<Fr>,
    config: &PoseidonConfig<Fr>,
    inputs: &[FpVar<Fr>],
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut sponge = PoseidonSpongeVar::new(cs, config);
    sponge.absorb(&inputs)?;
    let mut result = sponge.squeeze_field_elements(1)?;
    Ok(result.remove(0))
}

/// pk = Poseidon(PK_DOMAIN, sk)
fn derive_public_key(
    cs: ConstraintSystemRef<Fr>,
    config: &PoseidonConfig<Fr>,
    spending_key: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    let domain = FpVar::constant(poseidon::pk_domain());
    poseidon_hash(cs, config, &[domain, spending_key.clone()])
}

/// cm = Poseidon(value, randomness, owner_pk)
fn compute_commitment(
    cs: ConstraintSystemRef<Fr>,
    config: &PoseidonConfig<Fr>,
    value: &FpVar<Fr>,
    randomness: &FpVar<Fr>,
    owner_pk: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    poseidon_hash(
        cs,
        config,
        &[value.clone(), randomness.clone(), owner_pk.clone()],
    )
}

/// nf = Poseidon(NF_DOMAIN, sk, cm, position)
fn compute_nullifier(
    cs: ConstraintSystemRef<Fr>,
    config: &PoseidonConfig<Fr>,
    spending_key: &FpVar<Fr>,
    commitment: &FpVar<Fr>,
    position: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    let domain = FpVar::constant(poseidon::nf_domain());
    poseidon_hash(
        cs,
        config,
        &[
            domain,
            spending_key.clone(),
            commitment.clone(),
            position.clone(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opening() -> NoteOpening {
        NoteOpening::new(1_000, [9u8; 32], SpendingKey::from_bytes([5u8; 32]), 7)
    }

    fn satisfied(circuit: NoteCircuit) -> bool {
        let cs = ConstraintSystem::<Fr>::new_ref();
        circuit.generate_constraints(cs.clone()).unwrap();
        cs.is_satisfied().unwrap()
    }

    #[test]
    fn test_valid_opening_satisfies() {
        let opening = opening();
        let note = opening.to_note("").unwrap();

        let cs = ConstraintSystem::<Fr>::new_ref();
        NoteCircuit::new(&note, &opening)
            .generate_constraints(cs.clone())
            .unwrap();

        assert!(cs.is_satisfied().unwrap());
        assert_eq!(cs.num_instance_variables(), NUM_PUBLIC_INPUTS + 1);
    }

    #[test]
    fn test_max_value_satisfies() {
        let opening = NoteOpening::new(u64::MAX, [1u8; 32], SpendingKey::from_bytes([2u8; 32]), 0);
        let note = opening.to_note("").unwrap();
        assert!(satisfied(NoteCircuit::new(&note, &opening)));
    }

    #[test]
    fn test_shape_matches_assigned_circuit() {
        let shape = circuit_shape().unwrap();
        assert_eq!(shape.num_instance, NUM_PUBLIC_INPUTS + 1);

        let opening = opening();
        let note = opening.to_note("").unwrap();
        let cs = ConstraintSystem::<Fr>::new_ref();
        NoteCircuit::new(&note, &opening)
            .generate_constraints(cs.clone())
            .unwrap();
        assert_eq!(shape.num_witness, cs.num_witness_variables());
        assert_eq!(shape.num_constraints, cs.num_constraints());
    }

    #[test]
    fn test_dummy_satisfies() {
        assert!(satisfied(NoteCircuit::dummy()));
    }

    #[test]
    fn test_wrong_value_unsatisfied() {
        let opening = opening();
        let note = opening.to_note("").unwrap();

        let mut circuit = NoteCircuit::new(&note, &opening);
        circuit.value = Some(1_001);
        assert!(!satisfied(circuit));
    }

    #[test]
    fn test_wrong_nullifier_unsatisfied() {
        let opening = opening();
        let note = opening.to_note("").unwrap();

        let mut circuit = NoteCircuit::new(&note, &opening);
        circuit.nullifier = Some(Fr::from(123u64));
        assert!(!satisfied(circuit));
    }

    #[test]
    fn test_wrong_spending_key_unsatisfied() {
        let opening = opening();
        let note = opening.to_note("").unwrap();

        let mut circuit = NoteCircuit::new(&note, &opening);
        circuit.spending_key = Some(Fr::from(6u64));
        assert!(!satisfied(circuit));
    }
}
