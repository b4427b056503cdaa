//! Identifier extraction
//!
//! Pulls a base58 asset address out of whatever the user pasted:
//! a raw address, an oracle pair URL or a launchpad URL.

use crate::error::EngineError;
use crate::models::AssetIdentifier;
use crate::Result;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Base58 excludes 0, O, I and l. Case-sensitive.
    static ref BASE58_RUN: Regex = Regex::new(r"[1-9A-HJ-NP-Za-km-z]+").unwrap();
}

const MIN_LEN: usize = 32;
const MAX_LEN: usize = 44;

/// Returns the first base58 run of 32..=44 characters.
///
/// Longer runs are not truncated; a 60 character run is not an address.
pub fn extract(input: &str) -> Result<AssetIdentifier> {
    BASE58_RUN
        .find_iter(input)
        .map(|m| m.as_str())
        .find(|run| (MIN_LEN..=MAX_LEN).contains(&run.len()))
        .map(AssetIdentifier::new_unchecked)
        .ok_or_else(|| EngineError::NotFound(format!("no asset identifier in {:?}", input)))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]
        #[test]
        fn test_no_base58_alphabet_is_not_found(input in "[0OIl \\-/:.?=&_!#%а-яé\\n]{0,200}") {
            prop_assert!(extract(&input).is_err());
        }

        #[test]
        fn test_short_runs_are_not_found(
            runs in prop::collection::vec("[1-9A-HJ-NP-Za-km-z]{0,31}", 0..12),
            separator in "[0OIl/:.? ]",
        ) {
            let input = runs.join(&separator);
            prop_assert!(extract(&input).is_err(), "input: {}", input);
        }

        #[test]
        fn test_address_in_url_is_found(address in "[1-9A-HJ-NP-Za-km-z]{32,44}") {
            let input = format!("https://dexscreener.com/solana/{}?maker=0", address);
            let id = extract(&input);
            prop_assert!(id.is_ok());
            let id = id.unwrap();
            prop_assert_eq!(id.as_str(), address.as_str());
        }
    }
}
