//! Prompt construction
//!
//! Persona wording comes from configuration; the market section is shared.

use crate::models::{DerivedMetrics, MarketSnapshot};
use crate::persona::Persona;
use std::fmt::Write;

/// Bonding-curve assets graduate to an open venue above this market cap
const GRADUATION_CAP_USD: f64 = 60_000.0;
/// Pools below this size are flagged as a liquidity crisis
const CRISIS_LIQUIDITY_USD: f64 = 10_000.0;

/// System instruction carrying the persona voice
pub fn system_instruction(persona: &Persona) -> String {
    format!(
        "{}\nYou write as \"{}\" (Ticker: ${}). Mix professional financial jargon with your persona.",
        persona.voice, persona.name, persona.ticker
    )
}

/// Build the analysis prompt for one snapshot
pub fn analysis_prompt(
    persona: &Persona,
    snapshot: &MarketSnapshot,
    metrics: &DerivedMetrics,
    use_search: bool,
) -> String {
    let bonding_curve = snapshot.is_bonding_curve();
    let mut out = String::new();

    out.push_str("Analyze the following asset based on this real-time market data.\n\n");

    // ── Asset profile ──
    out.push_str("**Asset Profile:**\n");
    let _ = writeln!(
        out,
        "- Name: {} (${})",
        or_unknown(&snapshot.base_token.name),
        or_unknown(&snapshot.base_token.symbol)
    );
    let _ = writeln!(out, "- Address: {}", snapshot.identifier);
    let _ = writeln!(
        out,
        "- Venue: {} on {}",
        or_unknown(&snapshot.dex_id),
        or_unknown(&snapshot.chain_id)
    );
    let _ = writeln!(
        out,
        "- Origin: {}",
        if bonding_curve {
            "Bonding curve launchpad (High Risk)"
        } else {
            "Standard SPL listing"
        }
    );
    if let Some(created) = snapshot.pair_created_at {
        let _ = writeln!(out, "- Listed: {}", created.format("%Y-%m-%d %H:%M UTC"));
    }

    // ── Market metrics ──
    out.push_str("\n**Market Metrics:**\n");
    let _ = writeln!(out, "- Price: ${}", snapshot.price_usd);
    let _ = writeln!(out, "- Market Cap: ${:.0}", snapshot.cap_basis());
    let _ = writeln!(out, "- FDV: ${:.0}", snapshot.fdv);
    let _ = writeln!(out, "- Liquidity Pool: ${:.0}", snapshot.liquidity.usd);
    let _ = writeln!(
        out,
        "- Liquidity/Cap Ratio: {:.2}% (health score {:.0}/100)",
        metrics.liquidity_to_cap_ratio_pct, metrics.liquidity_health_score
    );
    let _ = writeln!(out, "- Computed Risk Score: {}/100", metrics.risk_score);
    let _ = writeln!(
        out,
        "- Estimated 24h range (approximation from open/close only): ${:.8} - ${:.8}",
        metrics.estimated_low_24h, metrics.estimated_high_24h
    );

    // ── Per-window activity ──
    out.push_str("\n**Activity by Window:**\n");
    out.push_str("| Window | Volume | Change | Buys | Sells | Buy Share |\n");
    out.push_str("|--------|--------|--------|------|-------|-----------|\n");
    let rows = [
        ("5m", snapshot.volume.m5, snapshot.price_change.m5, snapshot.txns.m5, metrics.order_flow.m5),
        ("1h", snapshot.volume.h1, snapshot.price_change.h1, snapshot.txns.h1, metrics.order_flow.h1),
        ("6h", snapshot.volume.h6, snapshot.price_change.h6, snapshot.txns.h6, metrics.order_flow.h6),
        ("24h", snapshot.volume.h24, snapshot.price_change.h24, snapshot.txns.h24, metrics.order_flow.h24),
    ];
    for (label, volume, change, counts, buy_share) in rows {
        let _ = writeln!(
            out,
            "| {} | ${:.0} | {:+.2}% | {} | {} | {:.0}% |",
            label, volume, change, counts.buys, counts.sells, buy_share
        );
    }

    // ── Instructions ──
    out.push_str("\n**Instructions:**\n");
    let _ = writeln!(
        out,
        "1. **Tone:** Stay in character. Use terms like {}.",
        quoted_list(persona.vocabulary)
    );
    out.push_str("2. **Risk Assessment:**\n");
    if bonding_curve {
        let _ = writeln!(
            out,
            "   - CRITICAL: Bonding curve asset. Check if market cap > ${:.0} (curve graduate). \
             If liquidity is low, flag as high rug risk.",
            GRADUATION_CAP_USD
        );
    } else {
        let _ = writeln!(
            out,
            "   - Check the liquidity to market cap ratio. If liquidity is < ${:.0}, flag as 'Liquidity Crisis'.",
            CRISIS_LIQUIDITY_USD
        );
    }
    out.push_str(
        "3. **Volume Analysis:** Is 24h volume high compared to market cap? If yes, mention \"High speculative interest\". \
         Compare buy and sell counts per window.\n",
    );
    if use_search {
        out.push_str(
            "4. **Research:** Search the web for recent news, social sentiment and security reports about this token. \
             Ground your claims in what you find.\n",
        );
    } else {
        out.push_str("4. **Research:** Base your claims only on the data above.\n");
    }
    let [buy, hold, sell] = persona.verdict_phrases;
    let _ = writeln!(
        out,
        "5. **Verdict:** End with a final line in the form `Verdict: <choice>` where <choice> is \"{}\", \"{}\" or \"{}\".",
        buy, hold, sell
    );
    let _ = writeln!(
        out,
        "6. **Format:** Keep it under {} words. Use emojis sparingly but effectively ({}).",
        persona.word_limit, persona.emojis
    );

    out
}

/// Build a chat prompt from caller-held history
pub fn chat_prompt(history: &[(String, String)], message: &str) -> String {
    let mut out = String::new();

    if !history.is_empty() {
        out.push_str("Conversation so far:\n\n");
        for (role, content) in history {
            let _ = writeln!(out, "{}: {}", role.to_uppercase(), content);
        }
        out.push_str("\n---\n\n");
    }

    out.push_str("Reply to the user's latest message. Use web search for live prices and news when relevant.\n\n");
    let _ = write!(out, "USER: {}", message);
    out
}

fn or_unknown(value: &str) -> &str {
    if value.trim().is_empty() {
        "Unknown"
    } else {
        value
    }
}

fn quoted_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|i| format!("\"{}\"", i))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics;
    use crate::models::fixtures::snapshot;
    use crate::models::TradeCounts;

    #[test]
    fn test_prompt_embeds_market_data() {
        let mut s = snapshot();
        s.txns.h1 = TradeCounts { buys: 12, sells: 4 };
        let m = metrics::derive(&s);

        let prompt = analysis_prompt(&Persona::by_key("cat"), &s, &m, true);

        assert!(prompt.contains("Test Token ($TEST)"));
        assert!(prompt.contains(s.identifier.as_str()));
        assert!(prompt.contains("Liquidity Pool: $100000"));
        assert!(prompt.contains("| 1h | $1000 | +0.00% | 12 | 4 | 75% |"));
        assert!(prompt.contains("meow-mentum"));
        assert!(prompt.contains("Liquidity Crisis"));
        assert!(prompt.contains("Search the web"));
        assert!(prompt.contains("Verdict: <choice>"));
        assert!(prompt.contains("LIQUIDATE IMMEDIATELY"));
    }

    #[test]
    fn test_bonding_curve_guidance() {
        let mut s = snapshot();
        s.dex_id = "pumpfun".to_string();
        let m = metrics::derive(&s);

        let prompt = analysis_prompt(&Persona::default(), &s, &m, false);
        assert!(prompt.contains("Bonding curve launchpad"));
        assert!(prompt.contains("curve graduate"));
        assert!(!prompt.contains("Search the web"));
    }

    #[test]
    fn test_system_instruction_names_persona() {
        let text = system_instruction(&Persona::by_key("lobster"));
        assert!(text.contains("MoltGPT Sentinel"));
        assert!(text.contains("$MOLT"));
    }

    #[test]
    fn test_chat_prompt_includes_history() {
        let history = vec![
            ("user".to_string(), "price of sol?".to_string()),
            ("agent".to_string(), "About $150.".to_string()),
        ];
        let prompt = chat_prompt(&history, "and bonk?");
        assert!(prompt.contains("USER: price of sol?"));
        assert!(prompt.contains("AGENT: About $150."));
        assert!(prompt.ends_with("USER: and bonk?"));

        assert!(!chat_prompt(&[], "hi").contains("Conversation so far"));
    }
}
