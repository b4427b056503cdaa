//! Token Verdict Engine
//!
//! Turns a free-text asset reference into a structured market verdict:
//! - Extracts a base58 asset identifier from raw input or URLs
//! - Looks up the deepest listing on the price oracle
//! - Derives liquidity and risk metrics deterministically
//! - Asks a generative service for a narrative under a deadline and retry budget
//! - Falls back to rule-based heuristics when the service is exhausted
//!
//! PIPELINE:
//! INPUT → EXTRACT → FETCH → DERIVE → NARRATE (or HEURISTIC) → CLASSIFY → RESULT

pub mod agent;
pub mod api;
pub mod classifier;
pub mod config;
pub mod conversational;
pub mod error;
pub mod extractor;
pub mod gemini;
pub mod heuristic;
pub mod logging;
pub mod market;
pub mod metrics;
pub mod models;
pub mod narrative;
pub mod persona;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use agent::Orchestrator;
pub use config::EngineConfig;
pub use error::{EngineError, UserFacingError};
