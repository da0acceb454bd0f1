//! Claim extraction agent.
//!
//! Pulls verifiable factual statements out of the content in a single chat
//! call. Claim ids are assigned deterministically (`claim-1`, `claim-2`, …)
//! in extraction order so downstream outcomes are stable across runs with
//! identical model output.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

use verdict::Claim;

use crate::agents::{analyst::TopicProfile, extract_json_array};
use crate::llm::ChatClient;
use crate::prompts;

/// Truncation budget for the extraction prompt.
const EXTRACTION_CONTENT_BUDGET: usize = 12_000;

pub struct ClaimExtractor {
    chat: ChatClient,
}

impl ClaimExtractor {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }

    /// Extract up to `max_claims` claims from the content.
    ///
    /// Unlike topic analysis this is a hard dependency (no claims, nothing
    /// to verify), so failures propagate.
    pub async fn extract(
        &self,
        content: &str,
        profile: &TopicProfile,
        max_claims: usize,
    ) -> Result<Vec<Claim>> {
        let excerpt: String = content.chars().take(EXTRACTION_CONTENT_BUDGET).collect();
        let user_prompt = format!(
            "TOPIC: {topic}\nDOMAIN: {domain}\n\nExtract at most {max_claims} claims.\n\nCONTENT:\n{excerpt}",
            topic = profile.topic,
            domain = profile.domain,
        );

        let raw = self
            .chat
            .complete(prompts::EXTRACTOR_PREAMBLE, &user_prompt)
            .await
            .context("Claim extraction call failed")?;

        let claims = parse_claims(&raw, max_claims)?;
        info!(claims = claims.len(), "claims extracted");
        Ok(claims)
    }
}

#[derive(Debug, Deserialize)]
struct RawClaim {
    claim: String,
    #[serde(default)]
    offset: Option<usize>,
}

fn parse_claims(raw: &str, max_claims: usize) -> Result<Vec<Claim>> {
    let json = extract_json_array(raw)
        .context("No JSON array found in extraction response")?;
    let raw_claims: Vec<RawClaim> =
        serde_json::from_str(json).context("Failed to parse extraction response")?;

    let claims: Vec<Claim> = raw_claims
        .into_iter()
        .filter(|r| !r.claim.trim().is_empty())
        .take(max_claims)
        .enumerate()
        .map(|(i, r)| Claim {
            id: format!("claim-{}", i + 1),
            text: r.claim.trim().to_string(),
            extracted_from_offset: r.offset,
        })
        .collect();

    if claims.is_empty() {
        bail!("Extraction produced no usable claims");
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_deterministic_and_ordered() {
        let raw = r#"[
            {"claim": "The tower is 330 m tall", "offset": 12},
            {"claim": "It opened in 1889", "offset": null}
        ]"#;
        let claims = parse_claims(raw, 5).unwrap();
        assert_eq!(claims[0].id, "claim-1");
        assert_eq!(claims[1].id, "claim-2");
        assert_eq!(claims[0].extracted_from_offset, Some(12));
        assert_eq!(claims[1].extracted_from_offset, None);
    }

    #[test]
    fn caps_at_max_claims() {
        let raw = r#"[{"claim": "a1"}, {"claim": "b2"}, {"claim": "c3"}]"#;
        let claims = parse_claims(raw, 2).unwrap();
        assert_eq!(claims.len(), 2);
    }

    #[test]
    fn blank_claims_are_dropped() {
        let raw = r#"[{"claim": "  "}, {"claim": "real claim"}]"#;
        let claims = parse_claims(raw, 5).unwrap();
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].text, "real claim");
    }

    #[test]
    fn empty_or_invalid_responses_error() {
        assert!(parse_claims("no array at all", 5).is_err());
        assert!(parse_claims("[]", 5).is_err());
    }
}
