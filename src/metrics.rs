//! Metric calculator
//!
//! Pure derivations from a `MarketSnapshot`. No I/O, no clock.

use crate::models::{DerivedMetrics, MarketSnapshot, TimeWindows, TradeCounts};

/// Risk penalty thresholds. Policy values, tune freely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskPolicy {
    /// Ratio (pct) below which the severe thin-liquidity penalty applies
    pub severe_ratio_pct: f64,
    pub severe_ratio_penalty: u32,
    /// Ratio (pct) below which the moderate thin-liquidity penalty applies
    pub thin_ratio_pct: f64,
    pub thin_ratio_penalty: u32,
    /// Absolute pool size (USD) below which exits are considered impractical
    pub min_liquidity_usd: f64,
    pub min_liquidity_penalty: u32,
    /// Absolute 1h price change (pct) above which the asset is treated as volatile
    pub volatility_h1_pct: f64,
    pub volatility_penalty: u32,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            severe_ratio_pct: 5.0,
            severe_ratio_penalty: 40,
            thin_ratio_pct: 10.0,
            thin_ratio_penalty: 20,
            min_liquidity_usd: 5_000.0,
            min_liquidity_penalty: 30,
            volatility_h1_pct: 50.0,
            volatility_penalty: 20,
        }
    }
}

/// Derive metrics with the default risk policy
pub fn derive(snapshot: &MarketSnapshot) -> DerivedMetrics {
    derive_with(snapshot, &RiskPolicy::default())
}

pub fn derive_with(snapshot: &MarketSnapshot, policy: &RiskPolicy) -> DerivedMetrics {
    let price = snapshot.price();
    let (estimated_low_24h, estimated_high_24h) = estimate_range_24h(price, snapshot.price_change.h24);

    let drop_from_high_pct = if estimated_high_24h > 0.0 {
        (price - estimated_high_24h) / estimated_high_24h * 100.0
    } else {
        0.0
    };

    let liquidity_usd = finite_or_zero(snapshot.liquidity.usd);
    let liquidity_to_cap_ratio_pct = liquidity_to_cap_ratio(liquidity_usd, snapshot.cap_basis());
    let liquidity_health_score = liquidity_to_cap_ratio_pct.clamp(0.0, 100.0);

    let risk_score = risk_score(
        policy,
        liquidity_to_cap_ratio_pct,
        liquidity_usd,
        snapshot.price_change.h1,
    );

    DerivedMetrics {
        estimated_high_24h,
        estimated_low_24h,
        drop_from_high_pct,
        liquidity_to_cap_ratio_pct,
        liquidity_health_score,
        risk_score,
        order_flow: buy_share(&snapshot.txns),
    }
}

/// Back-solves the 24h open from the close and the 24h change, then returns
/// `(low, high)` spanning open and close. The true intraperiod range is
/// unknowable from these two points.
fn estimate_range_24h(price: f64, change_h24_pct: f64) -> (f64, f64) {
    let growth = 1.0 + change_h24_pct / 100.0;

    if change_h24_pct == 0.0 || !growth.is_finite() || growth <= 0.0 {
        return (price, price);
    }

    let open = price / growth;
    if !open.is_finite() {
        return (price, price);
    }

    (price.min(open), price.max(open))
}

fn liquidity_to_cap_ratio(liquidity_usd: f64, cap: f64) -> f64 {
    let cap = finite_or_zero(cap).max(1.0);
    liquidity_usd.max(0.0) / cap * 100.0
}

fn risk_score(policy: &RiskPolicy, ratio_pct: f64, liquidity_usd: f64, change_h1_pct: f64) -> u8 {
    let mut score: u32 = 0;

    if ratio_pct < policy.severe_ratio_pct {
        score += policy.severe_ratio_penalty;
    } else if ratio_pct < policy.thin_ratio_pct {
        score += policy.thin_ratio_penalty;
    }

    if liquidity_usd < policy.min_liquidity_usd {
        score += policy.min_liquidity_penalty;
    }

    if finite_or_zero(change_h1_pct).abs() > policy.volatility_h1_pct {
        score += policy.volatility_penalty;
    }

    score.min(100) as u8
}

fn buy_share(txns: &TimeWindows<TradeCounts>) -> TimeWindows<f64> {
    txns.map(|counts| {
        let total = counts.buys.saturating_add(counts.sells);
        if total == 0 {
            0.0
        } else {
            counts.buys as f64 / total as f64 * 100.0
        }
    })
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::models::fixtures::snapshot;
    use proptest::prelude::*;

    fn snapshot_with(price: f64, liquidity: f64, cap: f64, fdv: f64, h1: f64, h24: f64) -> MarketSnapshot {
        let mut s = snapshot();
        s.price_usd = price.to_string();
        s.liquidity.usd = liquidity;
        s.market_cap = cap;
        s.fdv = fdv;
        s.price_change.h1 = h1;
        s.price_change.h24 = h24;
        s
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]
        #[test]
        fn test_metric_invariants(
            price in any::<f64>(),
            liquidity in any::<f64>(),
            cap in any::<f64>(),
            fdv in any::<f64>(),
            h1 in any::<f64>(),
            h24 in any::<f64>(),
            buys in any::<u64>(),
            sells in any::<u64>(),
        ) {
            let mut s = snapshot_with(price, liquidity, cap, fdv, h1, h24);
            s.txns.h24 = TradeCounts { buys, sells };

            let m = derive(&s);

            prop_assert!((0.0..=100.0).contains(&m.liquidity_health_score), "{:?}", m);
            prop_assert!(m.risk_score <= 100);
            prop_assert!(m.liquidity_to_cap_ratio_pct >= 0.0, "{:?}", m);
            prop_assert!(m.estimated_low_24h.is_finite() && m.estimated_high_24h.is_finite(), "{:?}", m);
            prop_assert!(m.estimated_low_24h <= m.estimated_high_24h, "{:?}", m);
            prop_assert!(m.drop_from_high_pct <= 0.0, "{:?}", m);
            prop_assert!((0.0..=100.0).contains(&m.order_flow.h24), "{:?}", m);

            // Pure: same snapshot, same metrics
            prop_assert_eq!(derive(&s), m);
        }

        #[test]
        fn test_thin_pool_always_penalized(
            liquidity in 0.0..5_000.0f64,
            cap in 100_000.0..1e12f64,
        ) {
            let s = snapshot_with(1.0, liquidity, cap, 0.0, 0.0, 0.0);
            prop_assert!(derive(&s).risk_score >= 70);
        }
    }
}
