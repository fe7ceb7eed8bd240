//! Proof Service
//!
//! Runs proving and verification on tokio's blocking pool, each call bounded
//! by a wall-clock budget. A call that overruns its budget returns
//! [`ProverError::Timeout`]; the abandoned worker finishes in the background
//! and its result is dropped.

use std::sync::Arc;
use std::time::Duration;

use shroud_config::ProverConfig;
use shroud_privacy::{FieldElement, Note, NoteOpening, Proof};
use tracing::warn;

use crate::error::{ProverError, Result};
use crate::keys::KeyStore;
use crate::prover::{NoteProver, ProofSeed};
use crate::verifier::NoteVerifier;

/// Budgeted async front for a [`KeyStore`].
#[derive(Clone, Debug)]
pub struct ProofService {
    prover: Arc<NoteProver>,
    verifier: Arc<NoteVerifier>,
    prove_budget: Duration,
    verify_budget: Duration,
}

impl ProofService {
    /// Create a service using the budgets from `config`
    pub fn new(keys: &KeyStore, config: &ProverConfig) -> Self {
        Self {
            prover: keys.prover(),
            verifier: keys.verifier(),
            prove_budget: config.prove_timeout(),
            verify_budget: config.verify_timeout(),
        }
    }

    /// Load keys and budgets from `config`
    pub fn from_config(config: &ProverConfig) -> Result<Self> {
        Ok(Self::new(&KeyStore::load(config)?, config))
    }

    pub fn prove_budget(&self) -> Duration {
        self.prove_budget
    }

    pub fn verify_budget(&self) -> Duration {
        self.verify_budget
    }

    /// Prove within the default proving budget
    pub async fn prove(&self, note: Note, opening: NoteOpening, seed: ProofSeed) -> Result<Proof> {
        self.prove_within(note, opening, seed, self.prove_budget)
            .await
    }

    /// Prove within `budget`
    ///
    /// The budget bounds the wait, not the work: on [`ProverError::Timeout`]
    /// the worker keeps its blocking-pool thread until it finishes. Callers
    /// that retry on timeout should cap their own concurrency, since tokio's
    /// blocking pool queues tasks once its thread limit is reached.
    pub async fn prove_within(
        &self,
        note: Note,
        opening: NoteOpening,
        seed: ProofSeed,
        budget: Duration,
    ) -> Result<Proof> {
        let prover = Arc::clone(&self.prover);
        run_bounded("prove", budget, move || prover.prove(&note, &opening, seed)).await
    }

    /// Verify within the default verification budget
    pub async fn verify(&self, proof: Proof, expected: Vec<FieldElement>) -> Result<bool> {
        self.verify_within(proof, expected, self.verify_budget)
            .await
    }

    /// Verify within `budget`
    ///
    /// As with [`ProofService::prove_within`], a timed-out worker still runs
    /// to completion on the blocking pool.
    pub async fn verify_within(
        &self,
        proof: Proof,
        expected: Vec<FieldElement>,
        budget: Duration,
    ) -> Result<bool> {
        let verifier = Arc::clone(&self.verifier);
        run_bounded("verify", budget, move || Ok(verifier.verify(&proof, &expected))).await
    }
}

async fn run_bounded<T, F>(op: &'static str, budget: Duration, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    // A zero budget can never be met; don't race the worker for it.
    if budget.is_zero() {
        warn!(op, "Zero budget, not starting work");
        return Err(ProverError::Timeout(budget));
    }

    let handle = tokio::task::spawn_blocking(work);
    match tokio::time::timeout(budget, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(ProverError::Worker(e.to_string())),
        Err(_) => {
            warn!(op, budget_ms = budget.as_millis() as u64, "Budget exceeded");
            Err(ProverError::Timeout(budget))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_budget_times_out() {
        let result = run_bounded("test", Duration::ZERO, || Ok(1u8)).await;
        assert!(matches!(result, Err(ProverError::Timeout(d)) if d.is_zero()));
    }

    #[tokio::test]
    async fn test_slow_work_times_out() {
        let result = run_bounded("test", Duration::from_millis(20), || {
            std::thread::sleep(Duration::from_millis(500));
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(ProverError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_timed_out_worker_still_finishes() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);
        let result = run_bounded("test", Duration::from_millis(20), move || {
            std::thread::sleep(Duration::from_millis(100));
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(ProverError::Timeout(_))));
        assert!(!finished.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let result: Result<()> = run_bounded("test", Duration::from_secs(5), || {
            Err(ProverError::Proving("bad witness".into()))
        })
        .await;
        assert!(matches!(result, Err(ProverError::Proving(_))));
    }

    #[tokio::test]
    async fn test_panicking_worker_reported() {
        let result: Result<()> =
            run_bounded("test", Duration::from_secs(5), || panic!("worker blew up")).await;
        assert!(matches!(result, Err(ProverError::Worker(_))));
    }
}
