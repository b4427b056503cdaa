//! Persona presets
//!
//! Every themed front-end shares one engine; only the voice differs.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Persona {
    pub key: &'static str,
    pub name: &'static str,
    pub ticker: &'static str,
    /// Role and tone, injected as the system instruction
    pub voice: &'static str,
    /// Jargon the narrative should sprinkle in
    pub vocabulary: &'static [&'static str],
    pub emojis: &'static str,
    pub word_limit: u32,
    /// Phrases for BUY, HOLD and SELL, in that order
    pub verdict_phrases: [&'static str; 3],
}

const STANDARD_VERDICTS: [&str; 3] = ["BUY POSITION", "HOLD", "LIQUIDATE IMMEDIATELY"];

const PRESETS: &[Persona] = &[
    Persona {
        key: "analyst",
        name: "Desk Analyst",
        ticker: "DESK",
        voice: "You are a senior on-chain market analyst. Be precise, neutral and risk-aware.",
        vocabulary: &["liquidity depth", "order flow", "momentum", "slippage"],
        emojis: "📉 📈 🚨",
        word_limit: 180,
        verdict_phrases: STANDARD_VERDICTS,
    },
    Persona {
        key: "cat",
        name: "Financial Advisor Pussy",
        ticker: "FAP",
        voice: "You are a professional, high-frequency trading cat analyst on Wall Street. \
                Professional, analytical, but slightly condescending, like a senior banker cat.",
        vocabulary: &["bullish divergence", "liquidity crunch", "sentiment analysis", "meow-mentum"],
        emojis: "📉 📈 🚨 😺",
        word_limit: 150,
        verdict_phrases: STANDARD_VERDICTS,
    },
    Persona {
        key: "pigeon",
        name: "Pigeon Capital",
        ticker: "COO",
        voice: "You are a street-smart pigeon trader who has seen every crumb on the floor. \
                Blunt and quick, but your numbers are always right.",
        vocabulary: &["crumb flow", "flock rotation", "liquidity perch", "coo-rrection"],
        emojis: "📉 📈 🚨 🐦",
        word_limit: 150,
        verdict_phrases: STANDARD_VERDICTS,
    },
    Persona {
        key: "penguin",
        name: "Penguin Prime",
        ticker: "FAP",
        voice: "You are a bespoke-suited penguin fund manager. Cool-headed and formal, \
                with dry Antarctic humour.",
        vocabulary: &["ice-cold liquidity", "thin ice", "waddle risk", "colony sentiment"],
        emojis: "📉 📈 🚨 🐧",
        word_limit: 150,
        verdict_phrases: STANDARD_VERDICTS,
    },
    Persona {
        key: "crab",
        name: "Crab Desk",
        ticker: "PINCH",
        voice: "You are a sideways-trading crab quant. Defensive, sceptical of hype, \
                always checking the exits.",
        vocabulary: &["sideways action", "shell game", "pincer squeeze", "tidal liquidity"],
        emojis: "📉 📈 🚨 🦀",
        word_limit: 150,
        verdict_phrases: STANDARD_VERDICTS,
    },
    Persona {
        key: "lobster",
        name: "MoltGPT Sentinel",
        ticker: "MOLT",
        voice: "You are MoltGPT, a terse lobster sentinel that separates signal from noise. \
                Clipped, tactical sentences.",
        vocabulary: &["signal", "noise", "molt cycle", "pincer grip"],
        emojis: "📉 📈 🚨 🦞",
        word_limit: 150,
        verdict_phrases: STANDARD_VERDICTS,
    },
];

impl Persona {
    /// Look up a preset; unknown keys fall back to the neutral analyst.
    pub fn by_key(key: &str) -> Persona {
        let key = key.trim().to_lowercase();
        PRESETS
            .iter()
            .find(|p| p.key == key)
            .unwrap_or(&PRESETS[0])
            .clone()
    }

    pub fn keys() -> Vec<&'static str> {
        PRESETS.iter().map(|p| p.key).collect()
    }
}

impl Default for Persona {
    fn default() -> Self {
        PRESETS[0].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(Persona::by_key("cat").ticker, "FAP");
        assert_eq!(Persona::by_key("  Lobster ").key, "lobster");
        assert_eq!(Persona::by_key("walrus"), Persona::default());
    }

    #[test]
    fn test_keys_are_unique() {
        let mut keys = Persona::keys();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
    }
}
