//! Per-claim verification: query derivation, evidence retrieval,
//! reconciliation, classification, and outcome packaging.
//!
//! `verify` never returns an error: every failure mode is encoded in the
//! outcome's `error` field with an unverifiable verdict, so the orchestrator
//! can treat all claims uniformly.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::capability::{ClassifierModel, EvidenceSource, SearchHit};
use crate::errors::ClaimFailure;
use crate::evidence::{EvidenceItem, EvidenceReconciler};
use crate::orchestrator::RunContext;
use crate::retry::with_retry;
use crate::scoring::ScoreBands;
use crate::types::{Claim, Verdict, VerificationOutcome};

/// Derive search queries from claim text.
///
/// Deterministic: query 1 is the claim itself truncated at a word boundary;
/// query 2 (when allowed and distinct) is the keyword form: words longer
/// than three characters in original order. No model call involved.
pub fn derive_queries(text: &str, max_queries: usize, max_query_len: usize) -> Vec<String> {
    let mut queries = Vec::new();
    if max_queries == 0 {
        return queries;
    }

    let primary = truncate_at_word(text.trim(), max_query_len);
    if primary.is_empty() {
        return queries;
    }
    queries.push(primary.clone());

    if max_queries >= 2 {
        let keywords: Vec<&str> = text
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|w| w.chars().count() > 3)
            .collect();
        let keyword_query = truncate_at_word(&keywords.join(" "), max_query_len);
        if !keyword_query.is_empty() && keyword_query != primary {
            queries.push(keyword_query);
        }
    }

    queries.truncate(max_queries);
    queries
}

/// Truncate to at most `max_len` bytes without splitting a word.
fn truncate_at_word(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_string();
    }
    let mut out = String::new();
    for word in text.split_whitespace() {
        let needed = if out.is_empty() {
            word.len()
        } else {
            out.len() + 1 + word.len()
        };
        if needed > max_len {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    if out.is_empty() {
        // Single word longer than the budget: keep a char-safe prefix.
        out = text.chars().take(max_len).collect();
    }
    out
}

/// Verifies one claim end to end against the configured capabilities.
pub struct ClaimVerifier {
    search: Arc<dyn EvidenceSource>,
    classifier: Arc<dyn ClassifierModel>,
    bands: ScoreBands,
}

impl ClaimVerifier {
    pub fn new(search: Arc<dyn EvidenceSource>, classifier: Arc<dyn ClassifierModel>) -> Self {
        Self {
            search,
            classifier,
            bands: ScoreBands::default(),
        }
    }

    /// Override the score bands (tunable calibration).
    pub fn with_bands(mut self, bands: ScoreBands) -> Self {
        self.bands = bands;
        self
    }

    /// Verify one claim. Infallible by contract: failures become outcome
    /// fields. Cancellation is honored between external calls, never by
    /// interrupting one mid-flight.
    pub async fn verify(&self, claim: &Claim, ctx: &RunContext) -> VerificationOutcome {
        if ctx.is_cancelled() {
            return VerificationOutcome::unverifiable(
                &claim.id,
                "run cancelled before verification started",
                Some(ClaimFailure::Cancelled),
            );
        }

        let cfg = &ctx.config;
        let queries = derive_queries(&claim.text, cfg.max_queries_per_claim, cfg.max_query_len);
        debug!(claim = %claim.id, queries = queries.len(), "verifying claim");

        let raw_items = match self.gather_evidence(claim, &queries, ctx).await {
            Ok(items) => items,
            Err(failure) => {
                return VerificationOutcome::unverifiable(
                    &claim.id,
                    "evidence retrieval failed for every query",
                    Some(failure),
                )
            }
        };

        let reconciler =
            EvidenceReconciler::new(cfg.max_evidence_per_claim, cfg.min_snippet_len);
        let bundle = reconciler.reconcile(raw_items);

        if bundle.is_empty() {
            info!(claim = %claim.id, "no usable evidence found");
            return VerificationOutcome::unverifiable(
                &claim.id,
                "searches succeeded but returned no usable evidence",
                None,
            );
        }

        if ctx.is_cancelled() {
            return VerificationOutcome::unverifiable(
                &claim.id,
                "run cancelled before classification",
                Some(ClaimFailure::Cancelled),
            );
        }

        let classification = match with_retry(&cfg.retry, "classify", || {
            self.classifier.classify(&claim.text, &bundle.items)
        })
        .await
        {
            Ok(c) => c,
            Err(e) => {
                warn!(claim = %claim.id, error = %e, "classification failed");
                let mut outcome = VerificationOutcome::unverifiable(
                    &claim.id,
                    "classifier did not produce a usable judgement",
                    Some(ClaimFailure::Classification(e.to_string())),
                );
                // Evidence was gathered; keep it for the report.
                outcome.evidence = bundle;
                return outcome;
            }
        };

        let mut bundle = bundle;
        bundle.apply_partition(
            classification.supporting_indices,
            classification.contradicting_indices,
        );

        // Unverifiable from the model means "evidence inconclusive":
        // confidence is forced to zero so the claim drops out of weighting.
        let confidence = if classification.verdict == Verdict::Unverifiable {
            0.0
        } else {
            classification.confidence.clamp(0.0, 1.0)
        };
        let score = self.bands.score_for(classification.verdict, confidence);

        info!(
            claim = %claim.id,
            verdict = %classification.verdict,
            score,
            confidence,
            evidence = bundle.len(),
            "claim verified"
        );

        VerificationOutcome {
            claim_id: claim.id.clone(),
            verdict: classification.verdict,
            score,
            confidence,
            evidence: bundle,
            rationale: classification.rationale,
            error: None,
        }
    }

    /// Run all queries concurrently (the per-claim fan-out is already
    /// bounded by `max_queries_per_claim`), merging hits in query
    /// generation order. Individual query failures are logged and skipped;
    /// only a clean sweep of failures fails the claim.
    async fn gather_evidence(
        &self,
        claim: &Claim,
        queries: &[String],
        ctx: &RunContext,
    ) -> Result<Vec<EvidenceItem>, ClaimFailure> {
        let cfg = &ctx.config;
        let searches = queries.iter().map(|query| {
            let query = query.clone();
            async move {
                let result = with_retry(&cfg.retry, "search", || {
                    self.search.search(&query, cfg.max_results_per_query)
                })
                .await;
                (query, result)
            }
        });

        let mut items = Vec::new();
        let mut failed = 0usize;
        for (query, result) in join_all(searches).await {
            match result {
                Ok(hits) => {
                    let retrieved_at = Utc::now();
                    items.extend(hits.into_iter().map(|SearchHit { title, snippet, url }| {
                        EvidenceItem {
                            source_url: url,
                            title,
                            snippet,
                            retrieved_at,
                            query_used: query.clone(),
                        }
                    }));
                }
                Err(e) => {
                    warn!(claim = %claim.id, query = %query, error = %e, "query failed");
                    failed += 1;
                }
            }
        }

        if !queries.is_empty() && failed == queries.len() {
            return Err(ClaimFailure::AllQueriesFailed {
                attempted: queries.len(),
            });
        }
        Ok(items)
    }
}
