use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use veracity_agents::{AppConfig, FactCheckEngine};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

/// Fact-check the claims in a web page or local document.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL or file path to analyze
    source: String,

    /// Maximum number of claims to extract and verify
    #[arg(long)]
    max_claims: Option<usize>,

    /// Claims verified concurrently
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-claim verification deadline in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Report output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = AppConfig::from_env();
    if let Some(n) = args.max_claims {
        config.max_claims = n;
    }
    if let Some(n) = args.concurrency {
        config = config.with_max_concurrency(n);
    }
    if let Some(secs) = args.timeout_secs {
        config = config.with_per_claim_timeout(Duration::from_secs(secs));
    }

    let engine = FactCheckEngine::new(config)?;
    let report = engine.analyze(&args.source).await?;

    match args.format {
        OutputFormat::Markdown => println!("{}", report.render_markdown()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}
