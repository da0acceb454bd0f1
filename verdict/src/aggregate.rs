//! Aggregation of per-claim outcomes into the run-level trust assessment.
//!
//! Pure and deterministic: identical outcome sequences produce identical
//! scores and summaries. The only wall-clock dependence is the recorded
//! `generated_at` stamp.

use tracing::debug;

use crate::scoring::NEUTRAL_MIDPOINT;
use crate::types::{AggregateResult, Verdict, VerificationOutcome};

/// Combines claim outcomes into one `AggregateResult`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreAggregator;

impl ScoreAggregator {
    /// Confidence-weighted mean of per-claim scores. Fully unverifiable
    /// claims (confidence 0) are excluded from the weighting but still
    /// listed in `per_claim`.
    pub fn aggregate(
        &self,
        outcomes: Vec<VerificationOutcome>,
        topic_hint: &str,
    ) -> AggregateResult {
        let unverifiable_count = outcomes
            .iter()
            .filter(|o| o.verdict == Verdict::Unverifiable)
            .count();

        let total_weight: f64 = outcomes
            .iter()
            .filter(|o| o.is_weighted())
            .map(|o| o.confidence)
            .sum();

        let overall_score = if total_weight > 0.0 {
            let weighted: f64 = outcomes
                .iter()
                .filter(|o| o.is_weighted())
                .map(|o| o.score * o.confidence)
                .sum();
            round1(weighted / total_weight)
        } else {
            NEUTRAL_MIDPOINT
        };

        let summary = build_summary(&outcomes, overall_score, total_weight > 0.0);

        debug!(
            claims = outcomes.len(),
            unverifiable = unverifiable_count,
            overall = overall_score,
            "outcomes aggregated"
        );

        AggregateResult {
            overall_score,
            unverifiable_count,
            topic: topic_hint.to_string(),
            summary,
            per_claim: outcomes,
            generated_at: chrono::Utc::now(),
        }
    }
}

/// Round to one decimal place, matching report precision.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn build_summary(outcomes: &[VerificationOutcome], overall: f64, any_verified: bool) -> String {
    if outcomes.is_empty() {
        return "No claims were submitted for verification.".to_string();
    }
    if !any_verified {
        return format!(
            "None of the {} claims could be verified; the overall score of {overall}/5 \
             is the neutral default, not an assessment.",
            outcomes.len()
        );
    }

    let count_of = |v: Verdict| outcomes.iter().filter(|o| o.verdict == v).count();
    format!(
        "{} of {} claims supported, {} contradicted, {} mixed, {} unverifiable. \
         Overall trust score: {overall}/5.",
        count_of(Verdict::Supported),
        outcomes.len(),
        count_of(Verdict::Contradicted),
        count_of(Verdict::Mixed),
        count_of(Verdict::Unverifiable),
    )
}
