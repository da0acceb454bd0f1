//! Core data model: claims, verdicts, outcomes, and the aggregate result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ClaimFailure;
use crate::evidence::EvidenceBundle;

/// A single factual statement to verify.
///
/// Identity is the `id`; near-duplicate `text` across claims is expected
/// and must not be collapsed. Claims are created by the extraction step and
/// consumed read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub id: String,
    pub text: String,
    /// Byte offset of the statement in the source content, when known.
    pub extracted_from_offset: Option<usize>,
}

impl Claim {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            extracted_from_offset: None,
        }
    }
}

/// Qualitative classification of a claim given its evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Supported,
    Contradicted,
    Mixed,
    Unverifiable,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Supported => write!(f, "supported"),
            Self::Contradicted => write!(f, "contradicted"),
            Self::Mixed => write!(f, "mixed"),
            Self::Unverifiable => write!(f, "unverifiable"),
        }
    }
}

/// Terminal result of verifying one claim. Immutable once produced; a retry
/// produces a new outcome, never an edit of an old one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub claim_id: String,
    pub verdict: Verdict,
    /// Truthfulness score on the fixed 0–5 scale.
    pub score: f64,
    /// Classifier confidence in [0, 1]; forced to 0 for unverifiable claims.
    pub confidence: f64,
    pub evidence: EvidenceBundle,
    pub rationale: String,
    /// Set when verification failed; `None` for honest unverifiable results
    /// (searches succeeded but produced no usable evidence).
    pub error: Option<ClaimFailure>,
}

impl VerificationOutcome {
    /// An unverifiable outcome at the neutral midpoint with zero confidence.
    pub fn unverifiable(
        claim_id: impl Into<String>,
        rationale: impl Into<String>,
        error: Option<ClaimFailure>,
    ) -> Self {
        Self {
            claim_id: claim_id.into(),
            verdict: Verdict::Unverifiable,
            score: crate::scoring::NEUTRAL_MIDPOINT,
            confidence: 0.0,
            evidence: EvidenceBundle::default(),
            rationale: rationale.into(),
            error,
        }
    }

    /// Whether this outcome counts toward the aggregate score weighting.
    pub fn is_weighted(&self) -> bool {
        self.confidence > 0.0
    }
}

/// Run-level trust assessment combining all claim outcomes.
///
/// Produced exactly once per analysis run, after every claim has resolved
/// or timed out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Confidence-weighted mean of per-claim scores, 0–5.
    pub overall_score: f64,
    /// One outcome per input claim, in input order.
    pub per_claim: Vec<VerificationOutcome>,
    pub unverifiable_count: usize,
    pub topic: String,
    pub summary: String,
    pub generated_at: DateTime<Utc>,
}
