//! End-to-end engine tests against deterministic capability fakes.
//!
//! No network, no model: every external behavior is scripted so the
//! orchestration properties (ordering, timeouts, partial failure,
//! cancellation, aggregation) are checked exactly.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use verdict::{
    Claim, ClaimFailure, ClaimVerifier, Classification, ClassifierModel, EvidenceItem,
    EvidenceSource, ProviderError, RetryPolicy, RunConfig, RunContext, RunError, ScoreAggregator,
    SearchHit, Verdict, VerificationOrchestrator,
};

fn hits(urls: &[&str]) -> Vec<SearchHit> {
    urls.iter()
        .map(|u| SearchHit {
            title: format!("result from {u}"),
            snippet: "a snippet long enough to count as usable evidence".to_string(),
            url: u.to_string(),
        })
        .collect()
}

/// Search fake: claims whose derived query contains `fail_marker` get a
/// transient failure; everything else gets the static hit list.
struct RoutedSearch {
    fail_marker: &'static str,
    results: Vec<SearchHit>,
    calls: AtomicU32,
}

impl RoutedSearch {
    fn new(fail_marker: &'static str, results: Vec<SearchHit>) -> Self {
        Self {
            fail_marker,
            results,
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl EvidenceSource for RoutedSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if query.contains(self.fail_marker) {
            return Err(ProviderError::SearchUnavailable("quota exhausted".into()));
        }
        Ok(self.results.iter().take(max_results).cloned().collect())
    }
}

/// Classifier fake keyed on markers in the claim text; unmatched claims get
/// a low-confidence mixed verdict. A claim containing `slow_marker` stalls
/// long enough to blow any reasonable per-claim deadline.
struct RoutedClassifier {
    slow_marker: Option<&'static str>,
}

impl RoutedClassifier {
    fn instant() -> Self {
        Self { slow_marker: None }
    }

    fn with_slow_marker(marker: &'static str) -> Self {
        Self {
            slow_marker: Some(marker),
        }
    }
}

#[async_trait]
impl ClassifierModel for RoutedClassifier {
    async fn classify(
        &self,
        claim_text: &str,
        evidence: &[EvidenceItem],
    ) -> Result<Classification, ProviderError> {
        if let Some(marker) = self.slow_marker {
            if claim_text.contains(marker) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
        }
        let (verdict, confidence) = if claim_text.contains("eiffel") {
            (Verdict::Supported, 0.9)
        } else if claim_text.contains("coffee") {
            (Verdict::Mixed, 0.6)
        } else {
            (Verdict::Mixed, 0.2)
        };
        Ok(Classification {
            verdict,
            confidence,
            supporting_indices: (0..evidence.len().min(2)).collect(),
            contradicting_indices: vec![],
            rationale: format!("scripted judgement for: {claim_text}"),
        })
    }
}

fn engine(search: impl EvidenceSource + 'static, classifier: impl ClassifierModel + 'static)
    -> VerificationOrchestrator {
    VerificationOrchestrator::new(ClaimVerifier::new(
        std::sync::Arc::new(search),
        std::sync::Arc::new(classifier),
    ))
}

fn fast_config() -> RunConfig {
    RunConfig {
        retry: RetryPolicy {
            max_retries: 1,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        },
        ..RunConfig::default()
    }
}

#[tokio::test]
async fn one_outcome_per_claim_in_input_order() {
    let orchestrator = engine(
        RoutedSearch::new("never-matches", hits(&["https://a.com/1", "https://b.com/2"])),
        RoutedClassifier::instant(),
    );
    let claims: Vec<Claim> = (0..7)
        .map(|i| Claim::new(format!("claim-{i}"), format!("statement number {i} about eiffel")))
        .collect();
    let ctx = RunContext::new(fast_config());

    let report = orchestrator.verify_all(&claims, &ctx).await.unwrap();

    assert_eq!(report.outcomes.len(), 7);
    for (i, outcome) in report.outcomes.iter().enumerate() {
        assert_eq!(outcome.claim_id, format!("claim-{i}"));
    }
    assert!(!report.cancelled);
}

#[tokio::test]
async fn all_queries_failed_claim_is_unverifiable_with_zero_confidence() {
    let orchestrator = engine(
        RoutedSearch::new("magnetic", hits(&["https://a.com/1"])),
        RoutedClassifier::instant(),
    );
    let claims = vec![Claim::new("c1", "magnetic bracelets cure arthritis")];
    let ctx = RunContext::new(fast_config());

    let report = orchestrator.verify_all(&claims, &ctx).await;

    // A single claim that failed entirely is also a full-run failure.
    match report {
        Err(RunError::AllClaimsFailed { total }) => assert_eq!(total, 1),
        other => panic!("expected AllClaimsFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn failed_search_claim_does_not_abort_siblings() {
    let orchestrator = engine(
        RoutedSearch::new("magnetic", hits(&["https://a.com/1", "https://b.com/2"])),
        RoutedClassifier::instant(),
    );
    let claims = vec![
        Claim::new("a", "the eiffel tower is 330 metres tall"),
        Claim::new("c", "magnetic bracelets cure arthritis"),
    ];
    let ctx = RunContext::new(fast_config());

    let report = orchestrator.verify_all(&claims, &ctx).await.unwrap();

    let healthy = &report.outcomes[0];
    assert_eq!(healthy.verdict, Verdict::Supported);
    assert!(healthy.error.is_none());

    let failed = &report.outcomes[1];
    assert_eq!(failed.verdict, Verdict::Unverifiable);
    assert_eq!(failed.confidence, 0.0);
    assert_eq!(failed.score, 2.5);
    assert_eq!(
        failed.error,
        Some(ClaimFailure::AllQueriesFailed { attempted: 2 })
    );
}

#[tokio::test]
async fn three_claim_scenario_scores_and_aggregates() {
    let orchestrator = engine(
        RoutedSearch::new(
            "magnetic",
            hits(&["https://a.com/1", "https://b.com/2", "https://c.com/3"]),
        ),
        RoutedClassifier::instant(),
    );
    let claims = vec![
        Claim::new("a", "the eiffel tower is 330 metres tall"),
        Claim::new("b", "coffee stunts growth in children"),
        Claim::new("c", "magnetic bracelets cure arthritis"),
    ];
    let ctx = RunContext::new(fast_config());

    let report = orchestrator.verify_all(&claims, &ctx).await.unwrap();
    let [a, b, c] = &report.outcomes[..] else {
        panic!("expected 3 outcomes");
    };

    assert!((4.0..=5.0).contains(&a.score), "supported score {}", a.score);
    assert!((2.0..=3.0).contains(&b.score), "mixed score {}", b.score);
    assert_eq!(c.score, 2.5);
    assert_eq!(c.confidence, 0.0);

    let result = ScoreAggregator.aggregate(report.outcomes, "health");
    assert_eq!(result.unverifiable_count, 1);
    // Weighted mean of A and B only: (4.9*0.9 + 2.6*0.6) / 1.5 = 3.98 → 4.0
    assert_eq!(result.overall_score, 4.0);
}

#[tokio::test(start_paused = true)]
async fn per_claim_timeout_leaves_siblings_unaffected() {
    let orchestrator = engine(
        RoutedSearch::new("never-matches", hits(&["https://a.com/1", "https://b.com/2"])),
        RoutedClassifier::with_slow_marker("glacial"),
    );
    let claims = vec![
        Claim::new("fast", "the eiffel tower is 330 metres tall"),
        Claim::new("stuck", "a glacial claim that will never classify"),
    ];
    let ctx = RunContext::new(RunConfig {
        per_claim_timeout: Duration::from_secs(30),
        ..fast_config()
    });

    let report = orchestrator.verify_all(&claims, &ctx).await.unwrap();

    assert_eq!(report.outcomes[0].verdict, Verdict::Supported);
    assert!(report.outcomes[0].error.is_none());

    let stuck = &report.outcomes[1];
    assert_eq!(stuck.verdict, Verdict::Unverifiable);
    assert_eq!(stuck.error, Some(ClaimFailure::Timeout));
    assert_eq!(stuck.confidence, 0.0);
}

#[tokio::test]
async fn cancelled_run_preserves_flag_and_suppresses_all_claims_failed() {
    let orchestrator = engine(
        RoutedSearch::new("never-matches", hits(&["https://a.com/1"])),
        RoutedClassifier::instant(),
    );
    let claims = vec![
        Claim::new("a", "first statement about eiffel"),
        Claim::new("b", "second statement about coffee"),
    ];
    let ctx = RunContext::new(fast_config());
    ctx.cancel();

    let report = orchestrator.verify_all(&claims, &ctx).await.unwrap();

    assert!(report.cancelled);
    assert_eq!(report.outcomes.len(), 2);
    for outcome in &report.outcomes {
        assert_eq!(outcome.error, Some(ClaimFailure::Cancelled));
        assert_eq!(outcome.verdict, Verdict::Unverifiable);
    }
}

#[tokio::test(start_paused = true)]
async fn transient_search_failures_are_retried_within_a_claim() {
    /// Fails the first two calls, then serves results.
    struct FlakySearch {
        calls: AtomicU32,
    }

    #[async_trait]
    impl EvidenceSource for FlakySearch {
        async fn search(
            &self,
            _query: &str,
            _max_results: usize,
        ) -> Result<Vec<SearchHit>, ProviderError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(ProviderError::SearchUnavailable("blip".into()))
            } else {
                Ok(hits(&["https://a.com/1"]))
            }
        }
    }

    let orchestrator = engine(
        FlakySearch {
            calls: AtomicU32::new(0),
        },
        RoutedClassifier::instant(),
    );
    let claims = vec![Claim::new("a", "the eiffel tower is 330 metres tall")];
    let ctx = RunContext::new(RunConfig {
        // One query so the retry accounting is exact.
        max_queries_per_claim: 1,
        ..RunConfig::default()
    });

    let report = orchestrator.verify_all(&claims, &ctx).await.unwrap();

    assert!(report.outcomes[0].error.is_none());
    assert_eq!(report.outcomes[0].verdict, Verdict::Supported);
}

#[tokio::test]
async fn empty_evidence_is_unverifiable_without_error() {
    struct EmptySearch;

    #[async_trait]
    impl EvidenceSource for EmptySearch {
        async fn search(
            &self,
            _query: &str,
            _max_results: usize,
        ) -> Result<Vec<SearchHit>, ProviderError> {
            Ok(vec![])
        }
    }

    let orchestrator = engine(EmptySearch, RoutedClassifier::instant());
    let claims = vec![Claim::new("a", "an extremely obscure statement")];
    let ctx = RunContext::new(fast_config());

    let report = orchestrator.verify_all(&claims, &ctx).await.unwrap();

    let outcome = &report.outcomes[0];
    assert_eq!(outcome.verdict, Verdict::Unverifiable);
    assert!(outcome.error.is_none(), "evidence drought is not a failure");
    assert_eq!(outcome.confidence, 0.0);
}

#[tokio::test]
async fn malformed_classifier_response_fails_only_that_claim() {
    struct MalformedClassifier;

    #[async_trait]
    impl ClassifierModel for MalformedClassifier {
        async fn classify(
            &self,
            claim_text: &str,
            _evidence: &[EvidenceItem],
        ) -> Result<Classification, ProviderError> {
            if claim_text.contains("broken") {
                return Err(ProviderError::ClassifierMalformed("no json found".into()));
            }
            Ok(Classification {
                verdict: Verdict::Supported,
                confidence: 0.8,
                supporting_indices: vec![0],
                contradicting_indices: vec![],
                rationale: "fine".into(),
            })
        }
    }

    let orchestrator = engine(
        RoutedSearch::new("never-matches", hits(&["https://a.com/1", "https://b.com/2"])),
        MalformedClassifier,
    );
    let claims = vec![
        Claim::new("ok", "a verifiable statement"),
        Claim::new("bad", "a broken statement"),
    ];
    let ctx = RunContext::new(fast_config());

    let report = orchestrator.verify_all(&claims, &ctx).await.unwrap();

    assert!(report.outcomes[0].error.is_none());
    let bad = &report.outcomes[1];
    assert_eq!(bad.verdict, Verdict::Unverifiable);
    assert!(matches!(bad.error, Some(ClaimFailure::Classification(_))));
    // Gathered evidence is kept for the report even when classification dies.
    assert!(!bad.evidence.is_empty());
}
