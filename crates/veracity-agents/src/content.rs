//! Content loading from a URL or local file.
//!
//! Deliberately minimal: a plain GET with a browser User-Agent and a
//! regex-based tag strip. Robust scraping is out of scope; content that
//! needs JavaScript or anti-bot negotiation will simply yield thin text.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::info;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

/// Loaded content plus a stable identifier for the report.
#[derive(Debug, Clone)]
pub struct LoadedContent {
    /// The URL, or `file://<name>` for local documents.
    pub identifier: String,
    pub text: String,
}

/// Load and clean content from a URL or a local file path.
///
/// URLs are detected by scheme; everything else is treated as a path.
pub async fn load(source: &str) -> Result<LoadedContent> {
    if source.starts_with("http://") || source.starts_with("https://") {
        load_url(source).await
    } else {
        load_file(source)
    }
}

async fn load_url(url: &str) -> Result<LoadedContent> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build content HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {url}"))?
        .error_for_status()
        .with_context(|| format!("Non-success status fetching {url}"))?;

    let html = response.text().await.context("Failed to read response body")?;
    let text = strip_html(&html);
    info!(url, chars = text.len(), "content loaded");

    Ok(LoadedContent {
        identifier: url.to_string(),
        text,
    })
}

fn load_file(path: &str) -> Result<LoadedContent> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read content file: {path}"))?;

    let is_html = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
        || raw.trim_start().starts_with("<!");

    let text = if is_html { strip_html(&raw) } else { raw };

    let name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);
    info!(path, chars = text.len(), "content loaded");

    Ok(LoadedContent {
        identifier: format!("file://{name}"),
        text,
    })
}

/// Reduce an HTML document to readable text.
pub fn strip_html(html: &str) -> String {
    // Scripts and styles carry no prose; remove them wholesale first.
    let block_re =
        Regex::new(r"(?is)<script\b.*?</script>|<style\b.*?</style>|<noscript\b.*?</noscript>")
            .unwrap();
    let without_blocks = block_re.replace_all(html, " ");

    let tag_re = Regex::new(r"(?s)<[^>]*>").unwrap();
    let without_tags = tag_re.replace_all(&without_blocks, " ");

    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    let ws_re = Regex::new(r"\s+").unwrap();
    ws_re.replace_all(decoded.trim(), " ").to_string()
}
