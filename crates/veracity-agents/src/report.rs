//! Report assembly and rendering.
//!
//! The engine's `AggregateResult` is the factual core; this layer adds the
//! reader-facing narrative (summary, recommendations) and renders the whole
//! thing as markdown or JSON. Narrative generation uses the chat model but
//! degrades to deterministic text, so a report is always produced.

use regex::Regex;
use serde::Serialize;
use tracing::warn;

use verdict::AggregateResult;

use crate::agents::analyst::TopicProfile;
use crate::llm::ChatClient;
use crate::prompts;

/// Final artifact of one analysis run.
#[derive(Debug, Serialize)]
pub struct ContentAnalysisReport {
    pub source: String,
    pub topic_profile: TopicProfile,
    pub aggregate: AggregateResult,
    pub narrative_summary: String,
    pub recommendations: Vec<String>,
}

impl ContentAnalysisReport {
    pub fn render_markdown(&self) -> String {
        let agg = &self.aggregate;
        let mut out = String::new();

        out.push_str(&format!("# Content trust analysis: {}\n\n", self.source));
        out.push_str(&format!(
            "**Topic:** {} ({})  \n**Overall score:** {}/5  \n**Unverifiable claims:** {} of {}  \n**Generated:** {}\n\n",
            self.topic_profile.topic,
            self.topic_profile.domain,
            agg.overall_score,
            agg.unverifiable_count,
            agg.per_claim.len(),
            agg.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        ));

        out.push_str("## Summary\n\n");
        out.push_str(&self.narrative_summary);
        out.push_str("\n\n## Claims\n\n");

        for outcome in &agg.per_claim {
            out.push_str(&format!(
                "### {} — {} ({}/5, confidence {:.2})\n\n",
                outcome.claim_id, outcome.verdict, outcome.score, outcome.confidence
            ));
            if let Some(error) = &outcome.error {
                out.push_str(&format!("*Not verified: {error}.*\n\n"));
            }
            if !outcome.rationale.is_empty() {
                out.push_str(&format!("{}\n\n", outcome.rationale));
            }
            if !outcome.evidence.is_empty() {
                out.push_str("Sources:\n");
                for (i, item) in outcome.evidence.items.iter().enumerate() {
                    let stance = if outcome.evidence.supporting.contains(&i) {
                        " (supporting)"
                    } else if outcome.evidence.contradicting.contains(&i) {
                        " (contradicting)"
                    } else {
                        ""
                    };
                    out.push_str(&format!(
                        "- [{}]({}){stance}\n",
                        item.title, item.source_url
                    ));
                }
                out.push('\n');
            }
        }

        if !self.recommendations.is_empty() {
            out.push_str("## Recommendations for readers\n\n");
            for rec in &self.recommendations {
                out.push_str(&format!("- {rec}\n"));
            }
        }

        out
    }
}

/// Builds the narrative layer on top of an aggregate result.
pub struct ReportBuilder {
    chat: ChatClient,
}

impl ReportBuilder {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }

    pub async fn build(
        &self,
        source: &str,
        topic_profile: TopicProfile,
        aggregate: AggregateResult,
    ) -> ContentAnalysisReport {
        let digest = analysis_digest(&topic_profile, &aggregate);

        let narrative_summary = match self.chat.complete(prompts::SUMMARY_PREAMBLE, &digest).await
        {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(error = %e, "summary generation failed — using deterministic summary");
                aggregate.summary.clone()
            }
        };

        let recommendations = match self
            .chat
            .complete(prompts::RECOMMENDATIONS_PREAMBLE, &digest)
            .await
        {
            Ok(text) => parse_recommendations(&text),
            Err(e) => {
                warn!(error = %e, "recommendation generation failed — using defaults");
                default_recommendations(aggregate.overall_score)
            }
        };

        ContentAnalysisReport {
            source: source.to_string(),
            topic_profile,
            aggregate,
            narrative_summary,
            recommendations,
        }
    }
}

/// Compact, deterministic description of the run for narrative prompts.
fn analysis_digest(profile: &TopicProfile, aggregate: &AggregateResult) -> String {
    let mut digest = format!(
        "TOPIC: {}\nDOMAIN: {}\nOVERALL SCORE: {}/5\nUNVERIFIABLE: {} of {}\n\nPER-CLAIM RESULTS:\n",
        profile.topic,
        profile.domain,
        aggregate.overall_score,
        aggregate.unverifiable_count,
        aggregate.per_claim.len(),
    );
    for outcome in &aggregate.per_claim {
        let rationale: String = outcome.rationale.chars().take(240).collect();
        digest.push_str(&format!(
            "- {} | {} | score {}/5 | confidence {:.2} | {}\n",
            outcome.claim_id, outcome.verdict, outcome.score, outcome.confidence, rationale
        ));
    }
    digest
}

/// One recommendation per non-empty line, bullets and numbering stripped.
fn parse_recommendations(raw: &str) -> Vec<String> {
    let bullet_re = Regex::new(r"^[\s\-*•]*(\d+[.)])?\s*").unwrap();
    raw.lines()
        .map(|line| bullet_re.replace(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .take(5)
        .collect()
}

fn default_recommendations(overall_score: f64) -> Vec<String> {
    let mut recs = vec![
        "Cross-check important claims against primary sources before acting on them.".to_string(),
    ];
    if overall_score < 2.0 {
        recs.push(
            "Treat this content as unreliable; several claims were contradicted by independent sources."
                .to_string(),
        );
    } else if overall_score < 3.5 {
        recs.push(
            "Verify individual claims independently; the evidence for this content is mixed."
                .to_string(),
        );
    }
    recs
}
