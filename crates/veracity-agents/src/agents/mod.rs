//! LLM-backed agents: topic analyst, claim extractor, evidence classifier.
//!
//! Every agent speaks JSON-over-chat. Models wrap their JSON in prose and
//! code fences often enough that each parser first cuts the outermost JSON
//! block out of the raw response before handing it to serde.

pub mod analyst;
pub mod classifier;
pub mod extractor;

use regex::Regex;

/// Cut the outermost JSON object out of a model response.
pub(crate) fn extract_json_object(raw: &str) -> Option<&str> {
    let re = Regex::new(r"(?s)\{.*\}").unwrap();
    re.find(raw).map(|m| m.as_str())
}

/// Cut the outermost JSON array out of a model response.
pub(crate) fn extract_json_array(raw: &str) -> Option<&str> {
    let re = Regex::new(r"(?s)\[.*\]").unwrap();
    re.find(raw).map(|m| m.as_str())
}
