//! Run orchestration: bounded-concurrency fan-out of claim verifications
//! with per-claim deadlines, cooperative cancellation, and input-order
//! results.
//!
//! ```text
//! verify_all(claims)
//!   JoinSet::spawn(verify claim_i) × N, Semaphore-bounded
//!   ├─ per-claim timeout → unverifiable(Timeout), siblings unaffected
//!   ├─ cancellation     → unstarted/in-flight claims resolve as Cancelled
//!   └─ results slotted by input index, regardless of completion order
//! ```
//!
//! Partial failures surface as individual outcome errors; the only run-level
//! error is the clean sweep (`AllClaimsFailed`).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::errors::{ClaimFailure, RunError};
use crate::retry::RetryPolicy;
use crate::types::{Claim, VerificationOutcome};
use crate::verifier::ClaimVerifier;

/// Engine limits for one analysis run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Claims in flight at once; bounds external API load.
    pub max_concurrency: usize,
    /// Deadline for a single claim's verification.
    pub per_claim_timeout: Duration,
    /// Bundle cap after reconciliation.
    pub max_evidence_per_claim: usize,
    /// Search queries derived per claim (also the per-claim fan-out bound).
    pub max_queries_per_claim: usize,
    /// Results requested per search query.
    pub max_results_per_query: usize,
    /// Snippets shorter than this are dropped as noise.
    pub min_snippet_len: usize,
    /// Query truncation budget in bytes.
    pub max_query_len: usize,
    pub retry: RetryPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            per_claim_timeout: Duration::from_secs(90),
            max_evidence_per_claim: 8,
            max_queries_per_claim: 2,
            max_results_per_query: 5,
            min_snippet_len: 16,
            max_query_len: 256,
            retry: RetryPolicy::default(),
        }
    }
}

/// Shared run state handed to every claim verification task.
///
/// Explicit context instead of ambient globals, so tasks stay independently
/// testable. All fields behind `Arc`; cloning is cheap.
#[derive(Clone)]
pub struct RunContext {
    pub config: Arc<RunConfig>,
    pub cancel: Arc<CancellationToken>,
}

impl RunContext {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config: Arc::new(config),
            cancel: Arc::new(CancellationToken::new()),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel the whole run. In-flight external calls are awaited, not
    /// interrupted; claims observe the token between calls.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new(RunConfig::default())
    }
}

/// Output of one orchestrated run.
#[derive(Debug)]
pub struct RunReport {
    /// One outcome per input claim, in input order.
    pub outcomes: Vec<VerificationOutcome>,
    /// Whether the run was cancelled before all claims completed.
    pub cancelled: bool,
}

/// Runs `ClaimVerifier` across all claims under the concurrency budget.
pub struct VerificationOrchestrator {
    verifier: Arc<ClaimVerifier>,
}

impl VerificationOrchestrator {
    pub fn new(verifier: ClaimVerifier) -> Self {
        Self {
            verifier: Arc::new(verifier),
        }
    }

    /// Verify every claim, returning exactly one outcome per input claim in
    /// input order regardless of completion order.
    ///
    /// # Errors
    ///
    /// `RunError::AllClaimsFailed` when the run was not cancelled and every
    /// single outcome carries an error, the only condition that aborts an
    /// analysis.
    pub async fn verify_all(
        &self,
        claims: &[Claim],
        ctx: &RunContext,
    ) -> Result<RunReport, RunError> {
        info!(
            claims = claims.len(),
            max_concurrency = ctx.config.max_concurrency,
            "verification run starting"
        );

        let sem = Arc::new(Semaphore::new(ctx.config.max_concurrency.max(1)));
        let mut join_set: JoinSet<(usize, VerificationOutcome)> = JoinSet::new();

        for (index, claim) in claims.iter().cloned().enumerate() {
            let sem = sem.clone();
            let ctx = ctx.clone();
            let verifier = self.verifier.clone();

            join_set.spawn(async move {
                let _permit = sem.acquire().await.expect("semaphore closed");

                // Claims that never started before cancellation resolve
                // immediately instead of burning provider quota.
                if ctx.is_cancelled() {
                    let outcome = VerificationOutcome::unverifiable(
                        &claim.id,
                        "run cancelled before verification started",
                        Some(ClaimFailure::Cancelled),
                    );
                    return (index, outcome);
                }

                let deadline = ctx.config.per_claim_timeout;
                let outcome = match tokio::time::timeout(deadline, verifier.verify(&claim, &ctx))
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        warn!(claim = %claim.id, timeout_secs = deadline.as_secs(), "claim timed out");
                        VerificationOutcome::unverifiable(
                            &claim.id,
                            "verification did not complete within the deadline",
                            Some(ClaimFailure::Timeout),
                        )
                    }
                };
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<VerificationOutcome>> = claims.iter().map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => {
                    // Panicked task; its slot is backfilled below.
                    warn!(error = %e, "claim verification task died");
                }
            }
        }

        let outcomes: Vec<VerificationOutcome> = slots
            .into_iter()
            .zip(claims)
            .map(|(slot, claim)| {
                slot.unwrap_or_else(|| {
                    VerificationOutcome::unverifiable(
                        &claim.id,
                        "verification task died unexpectedly",
                        Some(ClaimFailure::Internal("task panicked".into())),
                    )
                })
            })
            .collect();

        let cancelled = ctx.is_cancelled();
        let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
        info!(
            total = outcomes.len(),
            failed, cancelled, "verification run finished"
        );

        if !cancelled && !outcomes.is_empty() && failed == outcomes.len() {
            return Err(RunError::AllClaimsFailed {
                total: outcomes.len(),
            });
        }

        Ok(RunReport {
            outcomes,
            cancelled,
        })
    }
}
