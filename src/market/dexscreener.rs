//! DexScreener token lookup
//!
//! Uses a long-lived reqwest::Client for connection pooling.

use crate::error::EngineError;
use crate::market::MarketDataSource;
use crate::models::{AssetIdentifier, Liquidity, MarketSnapshot, TimeWindows, TokenRef, TradeCounts};
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, instrument};

pub const DEFAULT_BASE_URL: &str = "https://api.dexscreener.com/latest/dex/tokens";

#[derive(Clone)]
pub struct DexScreenerClient {
    http: Client,
    base_url: String,
}

impl DexScreenerClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MarketDataSource for DexScreenerClient {
    #[instrument(skip(self), fields(identifier = %id), level = "debug")]
    async fn fetch(&self, id: &AssetIdentifier) -> Result<MarketSnapshot> {
        let url = format!("{}/{}", self.base_url, id);

        let response = self.http.get(&url).send().await.map_err(|e| {
            error!("Oracle request failed: {}", e);
            EngineError::Upstream(format!("oracle request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(%status, "Oracle returned non-success status");
            return Err(EngineError::Upstream(format!("oracle returned {}", status)));
        }

        let body: DexResponse = response.json().await.map_err(|e| {
            error!("Failed to parse oracle response: {}", e);
            EngineError::Upstream(format!("oracle parse error: {}", e))
        })?;

        snapshot_from_response(id, body)
    }
}

/// Pick the canonical listing and sanitize it into a snapshot
pub fn snapshot_from_response(id: &AssetIdentifier, body: DexResponse) -> Result<MarketSnapshot> {
    let pairs = body.pairs.unwrap_or_default();
    let listing_count = pairs.len();

    let best = select_canonical(pairs)
        .ok_or_else(|| EngineError::NotFound(format!("no listing for {}", id)))?;

    debug!(
        listing_count,
        dex_id = best.dex_id.as_deref().unwrap_or(""),
        liquidity_usd = best.liquidity_usd(),
        "Canonical listing selected"
    );

    Ok(best.into_snapshot(id.clone()))
}

/// Deepest pool wins; ties keep the first listing the oracle returned.
fn select_canonical(pairs: Vec<RawPair>) -> Option<RawPair> {
    pairs.into_iter().fold(None, |best, pair| match best {
        Some(current) if pair.liquidity_usd() <= current.liquidity_usd() => Some(current),
        _ => Some(pair),
    })
}

// =============================
// Wire types
// =============================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexResponse {
    #[serde(default)]
    pub schema_version: Option<String>,
    #[serde(default)]
    pub pairs: Option<Vec<RawPair>>,
}

/// A listing as the oracle sends it; any nested object may be absent or null.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPair {
    chain_id: Option<String>,
    dex_id: Option<String>,
    url: Option<String>,
    pair_address: Option<String>,
    base_token: Option<TokenRef>,
    quote_token: Option<TokenRef>,
    price_native: Option<String>,
    price_usd: Option<String>,
    txns: Option<TimeWindows<TradeCounts>>,
    volume: Option<TimeWindows<f64>>,
    price_change: Option<TimeWindows<f64>>,
    liquidity: Option<Liquidity>,
    fdv: Option<f64>,
    market_cap: Option<f64>,
    pair_created_at: Option<i64>,
}

impl RawPair {
    fn liquidity_usd(&self) -> f64 {
        self.liquidity
            .map(|l| l.usd)
            .filter(|usd| usd.is_finite())
            .unwrap_or(0.0)
    }

    fn into_snapshot(self, identifier: AssetIdentifier) -> MarketSnapshot {
        MarketSnapshot {
            identifier,
            chain_id: self.chain_id.unwrap_or_default(),
            dex_id: self.dex_id.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            pair_address: self.pair_address.unwrap_or_default(),
            base_token: self.base_token.unwrap_or_default(),
            quote_token: self.quote_token.unwrap_or_default(),
            price_native: self.price_native.unwrap_or_else(|| "0".to_string()),
            price_usd: self.price_usd.unwrap_or_else(|| "0".to_string()),
            liquidity: self.liquidity.unwrap_or_default(),
            market_cap: self.market_cap.unwrap_or(0.0),
            fdv: self.fdv.unwrap_or(0.0),
            volume: self.volume.unwrap_or_default(),
            price_change: self.price_change.unwrap_or_default(),
            txns: self.txns.unwrap_or_default(),
            pair_created_at: self.pair_created_at.and_then(DateTime::<Utc>::from_timestamp_millis),
        }
    }
}
