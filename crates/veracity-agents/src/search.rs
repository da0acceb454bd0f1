//! Brave Search evidence source.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use verdict::{EvidenceSource, ProviderError, SearchHit};

const BRAVE_SEARCH_URL: &str = "https://api.search.brave.com/res/v1/web/search";

/// `EvidenceSource` backed by the Brave Search web API.
pub struct BraveSearch {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl BraveSearch {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build search HTTP client")?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            endpoint: BRAVE_SEARCH_URL.to_string(),
        })
    }

    /// Point at a different endpoint (tests, proxies).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct BraveResponse {
    web: Option<BraveWeb>,
}

#[derive(Debug, Deserialize)]
struct BraveWeb {
    #[serde(default)]
    results: Vec<BraveHit>,
}

#[derive(Debug, Deserialize)]
struct BraveHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    url: String,
}

#[async_trait]
impl EvidenceSource for BraveSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchHit>, ProviderError> {
        if query.trim().is_empty() {
            return Err(ProviderError::SearchRejected("empty query".into()));
        }

        let count = max_results.to_string();
        let response = self
            .http
            .get(&self.endpoint)
            .header("Accept", "application/json")
            .header("Accept-Encoding", "gzip")
            .header("X-Subscription-Token", &self.api_key)
            .query(&[("q", query), ("count", count.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::SearchUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = format!("HTTP {status}: {body}");
            return if status.as_u16() == 429 || status.is_server_error() {
                Err(ProviderError::SearchUnavailable(detail))
            } else {
                Err(ProviderError::SearchRejected(detail))
            };
        }

        let parsed: BraveResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::SearchUnavailable(format!("bad response body: {e}")))?;

        let hits: Vec<SearchHit> = parsed
            .web
            .map(|w| w.results)
            .unwrap_or_default()
            .into_iter()
            .take(max_results)
            .map(|r| SearchHit {
                title: r.title,
                snippet: r.description,
                url: r.url,
            })
            .collect();

        debug!(query, hits = hits.len(), "brave search complete");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parsing_tolerates_missing_fields() {
        let body = r#"{
            "web": {
                "results": [
                    {"title": "Eiffel Tower", "description": "330 m tall", "url": "https://a.com/1"},
                    {"url": "https://b.com/2"}
                ]
            }
        }"#;
        let parsed: BraveResponse = serde_json::from_str(body).unwrap();
        let results = parsed.web.unwrap().results;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Eiffel Tower");
        assert_eq!(results[1].title, "");
    }

    #[test]
    fn empty_web_section_is_no_hits() {
        let parsed: BraveResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.web.is_none());
    }
}
