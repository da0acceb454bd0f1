//! Full analysis pipeline: content → topic analysis → claim extraction →
//! concurrent verification → aggregation → report.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use verdict::{
    ClaimVerifier, RunContext, ScoreAggregator, VerificationOrchestrator,
};

use crate::agents::analyst::Analyst;
use crate::agents::classifier::LlmClassifier;
use crate::agents::extractor::ClaimExtractor;
use crate::config::AppConfig;
use crate::content;
use crate::llm::ChatClient;
use crate::report::{ContentAnalysisReport, ReportBuilder};
use crate::search::BraveSearch;

/// Ties the agents and the verification core together for one deployment.
pub struct FactCheckEngine {
    config: AppConfig,
    chat: ChatClient,
}

impl FactCheckEngine {
    pub fn new(config: AppConfig) -> Result<Self> {
        let chat = ChatClient::new(config.model.clone())?;
        Ok(Self { config, chat })
    }

    /// Analyze one source (URL or file path) end to end.
    ///
    /// # Errors
    ///
    /// Fails on unloadable content, failed claim extraction, or a run where
    /// every single claim failed to verify. Partial verification failures
    /// are reported, not raised.
    pub async fn analyze(&self, source: &str) -> Result<ContentAnalysisReport> {
        info!(source, "starting content analysis");
        let loaded = content::load(source).await?;

        let analyst = Analyst::new(self.chat.clone());
        let profile = analyst.analyze(&loaded.identifier, &loaded.text).await;

        let extractor = ClaimExtractor::new(self.chat.clone());
        let claims = extractor
            .extract(&loaded.text, &profile, self.config.max_claims)
            .await
            .context("Could not extract claims from content")?;

        let search = BraveSearch::new(self.config.brave_api_key.clone())?;
        let classifier = LlmClassifier::new(self.chat.clone()).with_topic(profile.clone());
        let verifier = ClaimVerifier::new(Arc::new(search), Arc::new(classifier));
        let orchestrator = VerificationOrchestrator::new(verifier);

        let ctx = RunContext::new(self.config.run.clone());
        let run = orchestrator
            .verify_all(&claims, &ctx)
            .await
            .context("Verification run failed for every claim")?;

        let aggregate = ScoreAggregator.aggregate(run.outcomes, &profile.topic);
        info!(
            overall = aggregate.overall_score,
            unverifiable = aggregate.unverifiable_count,
            "analysis complete"
        );

        let builder = ReportBuilder::new(self.chat.clone());
        Ok(builder.build(&loaded.identifier, profile, aggregate).await)
    }
}
