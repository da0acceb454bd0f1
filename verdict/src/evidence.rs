//! Evidence reconciliation: URL canonicalization, deduplication, noise
//! filtering, and bundle capping.
//!
//! Raw search results are noisy: the same article reappears across queries
//! with different tracking parameters, and some hits carry no usable snippet
//! at all. The reconciler folds the merged result stream into a bounded,
//! deduplicated bundle before the (expensive) classification call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One retrieved piece of evidence. Never mutated after creation; lives only
/// for the duration of one claim's verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub source_url: String,
    pub title: String,
    pub snippet: String,
    pub retrieved_at: DateTime<Utc>,
    pub query_used: String,
}

/// Ordered, deduplicated evidence for one claim.
///
/// `supporting` / `contradicting` hold indices into `items`, filled in after
/// classification; indices in neither list are neutral. Invariant: no two
/// items share the same normalized source URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub items: Vec<EvidenceItem>,
    #[serde(default)]
    pub supporting: Vec<usize>,
    #[serde(default)]
    pub contradicting: Vec<usize>,
}

impl EvidenceBundle {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Record the classifier's partition, dropping out-of-range indices.
    pub fn apply_partition(&mut self, supporting: Vec<usize>, contradicting: Vec<usize>) {
        let n = self.items.len();
        self.supporting = supporting.into_iter().filter(|&i| i < n).collect();
        self.contradicting = contradicting.into_iter().filter(|&i| i < n).collect();
    }
}

/// Query parameters that identify a visit, not a document.
const TRACKING_PARAMS: [&str; 4] = ["fbclid", "gclid", "ref", "ref_src"];

/// Canonicalize a URL for deduplication.
///
/// Lowercases scheme and host, strips `www.`, default ports, fragments, and
/// tracking parameters, and trims the trailing slash. Unparseable inputs are
/// returned trimmed rather than dropped, so a weird URL still deduplicates
/// against an identical weird URL.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_fragment = trimmed.split('#').next().unwrap_or(trimmed);

    let (scheme, rest) = match without_fragment.split_once("://") {
        Some((s, r)) => (s.to_ascii_lowercase(), r),
        None => return without_fragment.trim_end_matches('/').to_string(),
    };

    let (authority_and_path, query) = match rest.split_once('?') {
        Some((ap, q)) => (ap, Some(q)),
        None => (rest, None),
    };

    let (authority, path) = match authority_and_path.split_once('/') {
        Some((a, p)) => (a, p),
        None => (authority_and_path, ""),
    };

    let mut host = authority.to_ascii_lowercase();
    if let Some(stripped) = host.strip_prefix("www.") {
        host = stripped.to_string();
    }
    let default_port = match scheme.as_str() {
        "http" => ":80",
        "https" => ":443",
        _ => "",
    };
    if !default_port.is_empty() {
        if let Some(stripped) = host.strip_suffix(default_port) {
            host = stripped.to_string();
        }
    }

    let path = path.trim_end_matches('/');

    let kept_query: Vec<&str> = query
        .unwrap_or("")
        .split('&')
        .filter(|pair| {
            if pair.is_empty() {
                return false;
            }
            let key = pair.split('=').next().unwrap_or(pair);
            !key.starts_with("utm_") && !TRACKING_PARAMS.contains(&key)
        })
        .collect();

    let mut out = format!("{scheme}://{host}");
    if !path.is_empty() {
        out.push('/');
        out.push_str(path);
    }
    if !kept_query.is_empty() {
        out.push('?');
        out.push_str(&kept_query.join("&"));
    }
    out
}

/// Deduplicates and bounds raw evidence for one claim.
#[derive(Debug, Clone)]
pub struct EvidenceReconciler {
    /// Bundle cap; bounds downstream classification cost.
    max_items: usize,
    /// Snippets shorter than this (after trimming) are noise, not evidence.
    min_snippet_len: usize,
}

impl Default for EvidenceReconciler {
    fn default() -> Self {
        Self {
            max_items: 8,
            min_snippet_len: 16,
        }
    }
}

impl EvidenceReconciler {
    pub fn new(max_items: usize, min_snippet_len: usize) -> Self {
        Self {
            max_items: max_items.max(1),
            min_snippet_len,
        }
    }

    /// Fold merged raw results into a bounded, deduplicated bundle.
    ///
    /// Input order defines priority: the first occurrence of a normalized
    /// URL wins, and when the cap bites, the earliest survivors are kept.
    pub fn reconcile(&self, raw_items: Vec<EvidenceItem>) -> EvidenceBundle {
        let total = raw_items.len();
        let mut seen = std::collections::HashSet::new();
        let mut items = Vec::new();

        for item in raw_items {
            if items.len() == self.max_items {
                break;
            }
            if item.snippet.trim().len() < self.min_snippet_len {
                continue;
            }
            if seen.insert(normalize_url(&item.source_url)) {
                items.push(item);
            }
        }

        tracing::debug!(raw = total, kept = items.len(), "evidence reconciled");
        EvidenceBundle {
            items,
            supporting: Vec::new(),
            contradicting: Vec::new(),
        }
    }
}
