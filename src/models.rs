//! Core data models for the verdict engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Buy,
    Sell,
    Hold,
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Extreme,
}

/// Which path produced the narrative
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Narrative,
    Heuristic,
}

//
// ================= Identifier =================
//

/// A base58 asset address, 32 to 44 characters. Only the extractor builds these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetIdentifier(String);

impl AssetIdentifier {
    pub(crate) fn new_unchecked(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//
// ================= Market Snapshot =================
//

/// One value per rolling window reported by the oracle.
/// Missing or null windows deserialize to `T::default()`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct TimeWindows<T> {
    #[serde(deserialize_with = "null_as_default")]
    pub m5: T,
    #[serde(deserialize_with = "null_as_default")]
    pub h1: T,
    #[serde(deserialize_with = "null_as_default")]
    pub h6: T,
    #[serde(deserialize_with = "null_as_default")]
    pub h24: T,
}

impl<T> TimeWindows<T> {
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> TimeWindows<U> {
        TimeWindows {
            m5: f(&self.m5),
            h1: f(&self.h1),
            h6: f(&self.h6),
            h24: f(&self.h24),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TradeCounts {
    #[serde(deserialize_with = "null_as_default")]
    pub buys: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub sells: u64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Liquidity {
    #[serde(deserialize_with = "null_as_default")]
    pub usd: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub base: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub quote: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TokenRef {
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub symbol: String,
}

/// Oracle payloads send `null` for unknown leaf values; treat it like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The canonical (deepest liquidity) listing for an asset.
/// Every numeric sub-structure is always present, zero-filled when the oracle omitted it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub identifier: AssetIdentifier,
    pub chain_id: String,
    pub dex_id: String,
    pub url: String,
    pub pair_address: String,
    pub base_token: TokenRef,
    pub quote_token: TokenRef,
    pub price_native: String,
    pub price_usd: String,
    pub liquidity: Liquidity,
    pub market_cap: f64,
    pub fdv: f64,
    pub volume: TimeWindows<f64>,
    pub price_change: TimeWindows<f64>,
    pub txns: TimeWindows<TradeCounts>,
    pub pair_created_at: Option<DateTime<Utc>>,
}

impl MarketSnapshot {
    /// USD price as a float; unparsable or negative values read as zero.
    pub fn price(&self) -> f64 {
        self.price_usd
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p >= 0.0)
            .unwrap_or(0.0)
    }

    /// Market cap when reported, fully-diluted value otherwise
    pub fn cap_basis(&self) -> f64 {
        if self.market_cap > 0.0 {
            self.market_cap
        } else {
            self.fdv
        }
    }

    /// Asset still trades against a launchpad bonding curve
    pub fn is_bonding_curve(&self) -> bool {
        self.dex_id.eq_ignore_ascii_case("pumpfun")
            || self.base_token.address.to_lowercase().ends_with("pump")
    }
}

//
// ================= Derived Metrics =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    /// Estimate only: max of current price and back-solved 24h open
    pub estimated_high_24h: f64,
    /// Estimate only: min of current price and back-solved 24h open
    pub estimated_low_24h: f64,
    pub drop_from_high_pct: f64,
    pub liquidity_to_cap_ratio_pct: f64,
    pub liquidity_health_score: f64,
    pub risk_score: u8,
    /// Buy share of transactions per window, in percent
    pub order_flow: TimeWindows<f64>,
}

//
// ================= Narrative =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

/// Text returned by the generative service plus its retrieval citations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Narrative {
    pub text: String,
    pub sources: Vec<Source>,
}

//
// ================= Final Result =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub narrative_text: String,
    pub verdict: Verdict,
    pub risk_score: u8,
    pub liquidity_health_score: f64,
    pub sources: Vec<Source>,
    pub mode: AnalysisMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    pub snapshot: MarketSnapshot,
    pub metrics: DerivedMetrics,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Buy => "BUY",
            Verdict::Sell => "SELL",
            Verdict::Hold => "HOLD",
            Verdict::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Extreme => "Extreme",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for AssetIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
