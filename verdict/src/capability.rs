//! Capability contracts for the two external collaborators.
//!
//! Both capabilities are stateless from the engine's perspective and are
//! invoked concurrently by multiple claim verifications without mutual
//! exclusion. Production wiring selects concrete providers at startup;
//! tests substitute deterministic fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::evidence::EvidenceItem;
use crate::types::Verdict;

/// One raw result from an evidence search, in provider ranking order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

/// Web-search capability.
#[async_trait]
pub trait EvidenceSource: Send + Sync {
    /// Run one query, returning up to `max_results` hits in ranking order.
    ///
    /// # Errors
    ///
    /// `SearchUnavailable` on quota/network trouble (retryable),
    /// `SearchRejected` on a malformed query (not retryable).
    async fn search(&self, query: &str, max_results: usize)
        -> Result<Vec<SearchHit>, ProviderError>;
}

/// Classifier output for one claim against its evidence bundle.
///
/// Index vectors refer to positions in the evidence slice handed to
/// `classify`; indices absent from both vectors are neutral.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub verdict: Verdict,
    /// Self-reported certainty in [0, 1].
    pub confidence: f64,
    #[serde(default)]
    pub supporting_indices: Vec<usize>,
    #[serde(default)]
    pub contradicting_indices: Vec<usize>,
    pub rationale: String,
}

/// Language-model classification capability.
#[async_trait]
pub trait ClassifierModel: Send + Sync {
    /// Judge one claim against its reconciled evidence.
    ///
    /// # Errors
    ///
    /// `ClassifierUnavailable` on quota/network trouble (retryable),
    /// `ClassifierMalformed` when the model's response cannot be parsed
    /// (not retryable; the claim becomes unverifiable).
    async fn classify(
        &self,
        claim_text: &str,
        evidence: &[EvidenceItem],
    ) -> Result<Classification, ProviderError>;
}
