//! Error taxonomy with retry classification.
//!
//! Every failure the engine can observe is represented here. Callers query
//! `is_transient()` instead of string-matching, and per-claim failures are
//! recorded as data (`ClaimFailure`) rather than propagated; the only error
//! that ever crosses the orchestrator boundary is `RunError::AllClaimsFailed`.
//!
//! | Error                       | Retried | Surfaces as                  |
//! |-----------------------------|---------|------------------------------|
//! | SearchUnavailable           | yes     | query skipped after retries  |
//! | SearchRejected              | no      | query skipped immediately    |
//! | ClassifierUnavailable       | yes     | claim unverifiable           |
//! | ClassifierMalformed         | no      | claim unverifiable           |
//! | per-claim timeout           | —       | claim unverifiable           |
//! | every claim failed          | —       | `RunError::AllClaimsFailed`  |

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single external capability call.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Search backend unreachable, rate-limited, or over quota.
    #[error("search unavailable: {0}")]
    SearchUnavailable(String),

    /// Search backend rejected the query itself (malformed, too long).
    #[error("search rejected query: {0}")]
    SearchRejected(String),

    /// Classifier backend unreachable, rate-limited, or over quota.
    #[error("classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    /// Classifier responded but the payload could not be parsed.
    #[error("classifier returned malformed response: {0}")]
    ClassifierMalformed(String),
}

impl ProviderError {
    /// Returns `true` if a bounded retry with backoff is worthwhile.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::SearchUnavailable(_) | Self::ClassifierUnavailable(_)
        )
    }
}

/// Why a single claim could not be verified.
///
/// Stored on the outcome, never thrown. `Display` output ends up verbatim
/// in rendered reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum ClaimFailure {
    /// Every derived search query failed after retries.
    AllQueriesFailed { attempted: usize },
    /// The classifier failed terminally (malformed output or retries exhausted).
    Classification(String),
    /// The per-claim deadline expired before verification completed.
    Timeout,
    /// The run was cancelled before this claim finished.
    Cancelled,
    /// A verification task died unexpectedly (task panic).
    Internal(String),
}

impl std::fmt::Display for ClaimFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AllQueriesFailed { attempted } => {
                write!(f, "all {attempted} search queries failed")
            }
            Self::Classification(detail) => write!(f, "classification failed: {detail}"),
            Self::Timeout => write!(f, "timeout"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Internal(detail) => write!(f, "internal error: {detail}"),
        }
    }
}

/// Run-level error. Partial failures never abort a run; this fires only
/// when not a single claim produced a usable outcome.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("all {total} claims failed to verify — no provider reachable?")]
    AllClaimsFailed { total: usize },
}
