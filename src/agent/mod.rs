//! Main orchestrator - one analysis per request
//!
//! INPUT → EXTRACT → FETCH → DERIVE → NARRATE → CLASSIFY → COMPLETE
//!                                       ↓ exhausted
//!                                   HEURISTIC → COMPLETE

use crate::classifier;
use crate::config::EngineConfig;
use crate::error::{EngineError, UserFacingError};
use crate::extractor;
use crate::heuristic;
use crate::market::{DexScreenerClient, MarketDataSource};
use crate::metrics;
use crate::models::{AnalysisMode, AnalysisResult};
use crate::narrative::NarrativeAdapter;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Sequences the analysis pipeline. Holds no per-request state.
pub struct Orchestrator {
    market: Arc<dyn MarketDataSource>,
    narrator: Arc<NarrativeAdapter>,
}

impl Orchestrator {
    pub fn new(market: Arc<dyn MarketDataSource>, narrator: Arc<NarrativeAdapter>) -> Self {
        Self { market, narrator }
    }

    /// Wire the DexScreener oracle to a shared narrator
    pub fn from_config(config: &EngineConfig, narrator: Arc<NarrativeAdapter>) -> crate::Result<Self> {
        let market = DexScreenerClient::new(config.oracle.base_url.clone(), config.oracle.timeout)?;
        Ok(Self::new(Arc::new(market), narrator))
    }

    /// Run one analysis. Only `NotFound` and `UpstreamUnavailable` escape;
    /// every narrative failure degrades to the heuristic engine.
    pub async fn analyze_asset(
        &self,
        raw_input: &str,
    ) -> std::result::Result<AnalysisResult, UserFacingError> {
        let request_id = Uuid::new_v4();
        let span = info_span!("analyze_asset", %request_id);

        self.run(raw_input).instrument(span).await
    }

    async fn run(&self, raw_input: &str) -> std::result::Result<AnalysisResult, UserFacingError> {
        let start_time = Instant::now();

        // === EXTRACT ===
        let id = extractor::extract(raw_input).map_err(|e| {
            info!(error = %e, "No identifier in input");
            UserFacingError::NotFound
        })?;

        info!(identifier = %id, "Orchestrator: starting analysis");

        // === FETCH ===
        let snapshot = self.market.fetch(&id).await.map_err(|e| match e {
            EngineError::NotFound(_) => {
                info!(identifier = %id, "Oracle has no listing");
                UserFacingError::NotFound
            }
            other => {
                warn!(identifier = %id, error = %other, "Oracle unavailable");
                UserFacingError::UpstreamUnavailable
            }
        })?;

        // === DERIVE ===
        let metrics = metrics::derive(&snapshot);
        debug!(
            risk_score = metrics.risk_score,
            liquidity_health = metrics.liquidity_health_score,
            "Metrics derived"
        );

        // === NARRATE ===
        let result = match self.narrator.generate(&snapshot, &metrics).await {
            Ok(narrative) => {
                // === CLASSIFY ===
                let verdict = classifier::classify(&narrative.text);
                debug!(%verdict, "Narrative classified");

                AnalysisResult {
                    narrative_text: narrative.text,
                    verdict,
                    risk_score: metrics.risk_score,
                    liquidity_health_score: metrics.liquidity_health_score,
                    sources: narrative.sources,
                    mode: AnalysisMode::Narrative,
                    risk_level: None,
                    snapshot,
                    metrics,
                }
            }
            Err(e) => {
                // === HEURISTIC ===
                warn!(error = %e, "Narrative unavailable - using heuristic engine");

                let fallback = heuristic::analyze(&snapshot, &metrics);

                AnalysisResult {
                    narrative_text: fallback.text,
                    verdict: fallback.verdict,
                    risk_score: metrics.risk_score,
                    liquidity_health_score: metrics.liquidity_health_score,
                    sources: Vec::new(),
                    mode: AnalysisMode::Heuristic,
                    risk_level: Some(fallback.risk),
                    snapshot,
                    metrics,
                }
            }
        };

        info!(
            verdict = %result.verdict,
            mode = ?result.mode,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Analysis complete"
        );

        Ok(result)
    }
}
