//! Topic/domain analysis agent.
//!
//! One chat call over the leading slice of the content. The profile seeds
//! the classifier's context and the report header; when the call fails the
//! pipeline continues with a generic profile rather than aborting.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::agents::extract_json_object;
use crate::llm::ChatClient;
use crate::prompts;

/// How much content the analyst reads. Topic identification saturates
/// quickly; sending whole articles just burns tokens.
const ANALYSIS_CONTENT_BUDGET: usize = 6_000;

/// What the content is about and how it tends to go wrong.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicProfile {
    pub topic: String,
    pub domain: String,
    #[serde(default)]
    pub expertise_required: Vec<String>,
    #[serde(default)]
    pub misinformation_patterns: Vec<String>,
}

impl Default for TopicProfile {
    fn default() -> Self {
        Self {
            topic: "Unknown".to_string(),
            domain: "general".to_string(),
            expertise_required: vec!["General knowledge".to_string()],
            misinformation_patterns: vec!["Unverified claims".to_string()],
        }
    }
}

pub struct Analyst {
    chat: ChatClient,
}

impl Analyst {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }

    /// Analyze content topic and domain. Degrades to the default profile on
    /// any failure (analysis is context, not a gate).
    pub async fn analyze(&self, identifier: &str, content: &str) -> TopicProfile {
        let excerpt: String = content.chars().take(ANALYSIS_CONTENT_BUDGET).collect();
        let user_prompt = format!("SOURCE: {identifier}\n\nCONTENT:\n{excerpt}");

        let raw = match self.chat.complete(prompts::ANALYST_PREAMBLE, &user_prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "topic analysis call failed — using default profile");
                return TopicProfile::default();
            }
        };

        match parse_profile(&raw) {
            Some(profile) => {
                info!(topic = %profile.topic, domain = %profile.domain, "topic identified");
                profile
            }
            None => {
                warn!("topic analysis response unparseable — using default profile");
                TopicProfile::default()
            }
        }
    }
}

fn parse_profile(raw: &str) -> Option<TopicProfile> {
    let json = extract_json_object(raw)?;
    serde_json::from_str(json).ok()
}
