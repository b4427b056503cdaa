//! Heuristic fallback engine
//!
//! Rule-based analysis used when the narrative service is exhausted.
//! Pure and deterministic: same snapshot and metrics, same answer.
//! Rules are evaluated in order and the first match wins.

use crate::models::{DerivedMetrics, MarketSnapshot, RiskLevel, Verdict};
use serde::Serialize;

/// Ratio (pct) below which a single holder can drain the pool
const ILLIQUID_RATIO_PCT: f64 = 2.0;
/// 24h gain (pct) treated as over-extended
const OVEREXTENDED_GAIN_PCT: f64 = 150.0;
/// 24h volume as a share of market cap that signals speculative interest
const SPECULATIVE_TURNOVER: f64 = 0.5;
/// Ratio (pct) above which a pullback reads as healthy
const DEEP_RATIO_PCT: f64 = 15.0;
/// Lower bound (pct) of a healthy consolidation
const CONSOLIDATION_FLOOR_PCT: f64 = -20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Illiquid,
    OverExtended,
    SpeculativeVolume,
    HealthyConsolidation,
    NoSignal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeuristicAnalysis {
    pub text: String,
    pub verdict: Verdict,
    pub risk: RiskLevel,
    pub rule: Rule,
}

/// Which rule of the decision table fires for these inputs
pub fn select_rule(snapshot: &MarketSnapshot, metrics: &DerivedMetrics) -> Rule {
    let ratio = metrics.liquidity_to_cap_ratio_pct;
    let change_h24 = snapshot.price_change.h24;
    let cap = snapshot.cap_basis().max(1.0);

    if ratio < ILLIQUID_RATIO_PCT {
        Rule::Illiquid
    } else if change_h24 > OVEREXTENDED_GAIN_PCT {
        Rule::OverExtended
    } else if snapshot.volume.h24 > cap * SPECULATIVE_TURNOVER {
        Rule::SpeculativeVolume
    } else if ratio > DEEP_RATIO_PCT && change_h24 > CONSOLIDATION_FLOOR_PCT && change_h24 < 0.0 {
        Rule::HealthyConsolidation
    } else {
        Rule::NoSignal
    }
}

pub fn analyze(snapshot: &MarketSnapshot, metrics: &DerivedMetrics) -> HeuristicAnalysis {
    let rule = select_rule(snapshot, metrics);

    let (verdict, risk, assessment) = match rule {
        Rule::Illiquid => (
            Verdict::Sell,
            RiskLevel::Extreme,
            format!(
                "🚨 Liquidity is only {:.2}% of market cap. A single large holder could exit and drain the pool; \
                 any sell pressure will move price violently.",
                metrics.liquidity_to_cap_ratio_pct
            ),
        ),
        Rule::OverExtended => (
            Verdict::Hold,
            RiskLevel::High,
            format!(
                "📈 Price is up {:.1}% in 24h. The move is over-extended and early holders are likely to take profit; \
                 chasing here carries elevated drawdown risk.",
                snapshot.price_change.h24
            ),
        ),
        Rule::SpeculativeVolume => (
            Verdict::Buy,
            RiskLevel::Medium,
            format!(
                "High speculative interest: 24h volume of ${:.0} exceeds half of the ${:.0} market cap. \
                 Turnover this strong usually precedes further price discovery.",
                snapshot.volume.h24,
                snapshot.cap_basis()
            ),
        ),
        Rule::HealthyConsolidation => (
            Verdict::Buy,
            RiskLevel::Low,
            format!(
                "Liquidity is a deep {:.2}% of market cap and price is consolidating ({:.1}% in 24h). \
                 This looks like a healthy pullback rather than distribution.",
                metrics.liquidity_to_cap_ratio_pct, snapshot.price_change.h24
            ),
        ),
        Rule::NoSignal => (
            Verdict::Hold,
            RiskLevel::Medium,
            "No strong signal either way. Liquidity, momentum and volume are all within normal ranges."
                .to_string(),
        ),
    };

    let symbol = if snapshot.base_token.symbol.trim().is_empty() {
        "this asset".to_string()
    } else {
        format!("${}", snapshot.base_token.symbol)
    };

    let text = format!(
        "Automated assessment for {} (live commentary unavailable).\n\n{}\n\n\
         Risk: {} (score {}/100, liquidity health {:.0}/100)\n\n\
         Verdict: {}",
        symbol, assessment, risk, metrics.risk_score, metrics.liquidity_health_score, verdict
    );

    HeuristicAnalysis {
        text,
        verdict,
        risk,
        rule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier;
    use crate::metrics;
    use crate::models::fixtures::snapshot;

    fn run(liquidity: f64, cap: f64, change_h24: f64, volume_h24: f64) -> HeuristicAnalysis {
        let mut s = snapshot();
        s.liquidity.usd = liquidity;
        s.market_cap = cap;
        s.price_change.h24 = change_h24;
        s.volume.h24 = volume_h24;
        let m = metrics::derive(&s);
        analyze(&s, &m)
    }

    #[test]
    fn test_illiquid_sells() {
        let a = run(10_000.0, 1_000_000.0, 400.0, 5_000_000.0);
        assert_eq!(a.rule, Rule::Illiquid);
        assert_eq!(a.verdict, Verdict::Sell);
        assert_eq!(a.risk, RiskLevel::Extreme);
    }

    #[test]
    fn test_overextended_holds() {
        let a = run(100_000.0, 1_000_000.0, 180.0, 5_000_000.0);
        assert_eq!(a.rule, Rule::OverExtended);
        assert_eq!(a.verdict, Verdict::Hold);
        assert_eq!(a.risk, RiskLevel::High);
    }

    #[test]
    fn test_speculative_volume_buys() {
        let a = run(100_000.0, 1_000_000.0, 20.0, 600_000.0);
        assert_eq!(a.rule, Rule::SpeculativeVolume);
        assert_eq!(a.verdict, Verdict::Buy);
        assert_eq!(a.risk, RiskLevel::Medium);
    }

    #[test]
    fn test_healthy_consolidation_buys() {
        let a = run(200_000.0, 1_000_000.0, -8.0, 10_000.0);
        assert_eq!(a.rule, Rule::HealthyConsolidation);
        assert_eq!(a.verdict, Verdict::Buy);
        assert_eq!(a.risk, RiskLevel::Low);
    }

    #[test]
    fn test_consolidation_bounds_are_exclusive() {
        assert_eq!(run(200_000.0, 1_000_000.0, -20.0, 10_000.0).rule, Rule::NoSignal);
        assert_eq!(run(200_000.0, 1_000_000.0, 0.0, 10_000.0).rule, Rule::NoSignal);
        assert_eq!(run(150_000.0, 1_000_000.0, -5.0, 10_000.0).rule, Rule::NoSignal);
    }

    #[test]
    fn test_default_holds() {
        let a = run(100_000.0, 1_000_000.0, 5.0, 10_000.0);
        assert_eq!(a.rule, Rule::NoSignal);
        assert_eq!(a.verdict, Verdict::Hold);
        assert_eq!(a.risk, RiskLevel::Medium);
    }

    #[test]
    fn test_empty_pool_is_illiquid() {
        let a = run(0.0, 100_000.0, 0.0, 0.0);
        assert_eq!(a.rule, Rule::Illiquid);
        assert_eq!(a.verdict, Verdict::Sell);
    }

    #[test]
    fn test_text_is_classifiable_and_deterministic() {
        let a = run(10_000.0, 1_000_000.0, 0.0, 0.0);
        assert_eq!(classifier::classify(&a.text), a.verdict);
        assert_eq!(a, run(10_000.0, 1_000_000.0, 0.0, 0.0));
    }
}
