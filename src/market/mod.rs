//! Market data lookup
//!
//! The oracle is a single-attempt dependency: any failure surfaces as
//! `Upstream`, an empty listing set as `NotFound`.

use crate::models::{AssetIdentifier, MarketSnapshot};
use crate::Result;
use async_trait::async_trait;

pub mod dexscreener;
pub use dexscreener::DexScreenerClient;

/// Trait for price oracle lookups
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch the canonical listing for an identifier
    async fn fetch(&self, id: &AssetIdentifier) -> Result<MarketSnapshot>;
}
