//! Chat-model implementation of the engine's `ClassifierModel` capability.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use verdict::{Classification, ClassifierModel, EvidenceItem, ProviderError, Verdict};

use crate::agents::{analyst::TopicProfile, extract_json_object};
use crate::llm::{ChatClient, ChatError};
use crate::prompts;

/// Judges claims against evidence via one chat call per claim.
pub struct LlmClassifier {
    chat: ChatClient,
    topic: TopicProfile,
}

impl LlmClassifier {
    pub fn new(chat: ChatClient) -> Self {
        Self {
            chat,
            topic: TopicProfile::default(),
        }
    }

    /// Give the classifier domain context for its prompts.
    pub fn with_topic(mut self, topic: TopicProfile) -> Self {
        self.topic = topic;
        self
    }

    fn build_prompt(&self, claim_text: &str, evidence: &[EvidenceItem]) -> String {
        let mut prompt = format!(
            "CLAIM TO VERIFY: {claim_text}\n\nTOPIC: {topic}\nDOMAIN: {domain}\n",
            topic = self.topic.topic,
            domain = self.topic.domain,
        );
        if !self.topic.misinformation_patterns.is_empty() {
            prompt.push_str(&format!(
                "COMMON MISINFORMATION PATTERNS: {}\n",
                self.topic.misinformation_patterns.join(", ")
            ));
        }
        prompt.push_str("\nEVIDENCE:\n");
        for (i, item) in evidence.iter().enumerate() {
            prompt.push_str(&format!(
                "[{i}] {title}\n    SOURCE: {url}\n    CONTENT: {snippet}\n",
                title = item.title,
                url = item.source_url,
                snippet = item.snippet,
            ));
        }
        prompt.push_str("\nReturn your judgement in the required JSON format.");
        prompt
    }
}

#[async_trait]
impl ClassifierModel for LlmClassifier {
    async fn classify(
        &self,
        claim_text: &str,
        evidence: &[EvidenceItem],
    ) -> Result<Classification, ProviderError> {
        let prompt = self.build_prompt(claim_text, evidence);
        debug!(evidence = evidence.len(), "classifying claim");

        let raw = self
            .chat
            .complete(prompts::CLASSIFIER_PREAMBLE, &prompt)
            .await
            .map_err(|e| match e {
                ChatError::Unavailable(detail) => ProviderError::ClassifierUnavailable(detail),
                other => ProviderError::ClassifierMalformed(other.to_string()),
            })?;

        parse_classification(&raw)
    }
}

#[derive(Debug, Deserialize)]
struct RawClassification {
    verdict: String,
    confidence: f64,
    #[serde(default)]
    supporting_indices: Vec<usize>,
    #[serde(default)]
    contradicting_indices: Vec<usize>,
    #[serde(default)]
    rationale: String,
}

/// Parse the model's judgement, tolerating surrounding prose and verdict
/// capitalization but nothing structurally wrong.
fn parse_classification(raw: &str) -> Result<Classification, ProviderError> {
    let json = extract_json_object(raw).ok_or_else(|| {
        ProviderError::ClassifierMalformed("no JSON object in response".to_string())
    })?;

    let parsed: RawClassification = serde_json::from_str(json)
        .map_err(|e| ProviderError::ClassifierMalformed(e.to_string()))?;

    let verdict = match parsed.verdict.to_lowercase().as_str() {
        "supported" => Verdict::Supported,
        "contradicted" => Verdict::Contradicted,
        "mixed" => Verdict::Mixed,
        "unverifiable" => Verdict::Unverifiable,
        other => {
            return Err(ProviderError::ClassifierMalformed(format!(
                "unknown verdict: {other}"
            )))
        }
    };

    Ok(Classification {
        verdict,
        confidence: parsed.confidence.clamp(0.0, 1.0),
        supporting_indices: parsed.supporting_indices,
        contradicting_indices: parsed.contradicting_indices,
        rationale: parsed.rationale,
    })
}
