//! Verdict Classifier
//!
//! Extracts a discrete decision from free-form narrative text.
//! - Primary: a labelled `Verdict:` followed by BUY / SELL / HOLD / LIQUIDATE,
//!   optionally wrapped in markdown emphasis or quotes. The last label wins.
//! - Fallback: literal `VERDICT: BUY` / `SELL` / `HOLD` in the uppercased text.
//! - Otherwise UNKNOWN. Bare keywords in prose never count.

use crate::models::Verdict;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LABELLED_VERDICT: Regex = Regex::new(
        r#"(?i)verdict\s*:\s*(?:\*{1,2}|_{1,2}|["'`“‘])?\s*(buy|sell|hold|liquidate)(?:[^a-z]|$)"#
    )
    .unwrap();
}

/// Fallback markers in precedence order
const FALLBACK_MARKERS: &[(&str, Verdict)] = &[
    ("VERDICT: BUY", Verdict::Buy),
    ("VERDICT: SELL", Verdict::Sell),
    ("VERDICT: HOLD", Verdict::Hold),
];

pub fn classify(text: &str) -> Verdict {
    if let Some(verdict) = labelled(text) {
        return verdict;
    }

    let upper = text.to_uppercase();
    FALLBACK_MARKERS
        .iter()
        .find(|(marker, _)| upper.contains(marker))
        .map(|(_, verdict)| *verdict)
        .unwrap_or(Verdict::Unknown)
}

fn labelled(text: &str) -> Option<Verdict> {
    let word = LABELLED_VERDICT
        .captures_iter(text)
        .last()?
        .get(1)?
        .as_str()
        .to_ascii_uppercase();

    match word.as_str() {
        "BUY" => Some(Verdict::Buy),
        "SELL" | "LIQUIDATE" => Some(Verdict::Sell),
        "HOLD" => Some(Verdict::Hold),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labelled_verdicts() {
        let cases = vec![
            ("Thin pool, heavy sells.\n\nVerdict: **SELL**", Verdict::Sell),
            ("Verdict: 'LIQUIDATE'", Verdict::Sell),
            ("Verdict: \"LIQUIDATE IMMEDIATELY\" 🚨", Verdict::Sell),
            ("verdict: buy position 📈", Verdict::Buy),
            ("**Verdict:** HOLD", Verdict::Hold),
            ("Verdict: _Hold_ for now", Verdict::Hold),
            ("VERDICT:BUY POSITION", Verdict::Buy),
        ];

        for (text, expected) in cases {
            assert_eq!(classify(text), expected, "text: {}", text);
        }
    }

    #[test]
    fn test_last_label_wins() {
        let text = "Earlier I said Verdict: BUY, but after the rug report...\nVerdict: LIQUIDATE IMMEDIATELY";
        assert_eq!(classify(text), Verdict::Sell);
    }

    #[test]
    fn test_fallback_markers() {
        // Label followed by a word the primary pattern rejects
        assert_eq!(classify("Final VERDICT: HOLDING steady"), Verdict::Hold);
        assert_eq!(classify("verdict: buyers are exhausted"), Verdict::Buy);
    }

    #[test]
    fn test_bare_keywords_are_unknown() {
        let cases = vec![
            "",
            "Whales buy the dip while retail sells; I would hold off on any call.",
            "BUY BUY BUY",
            "Verdict: unclear",
        ];

        for text in cases {
            assert_eq!(classify(text), Verdict::Unknown, "text: {}", text);
        }
    }
}
