//! Process configuration
//!
//! Read once at startup, validated, then passed into constructors.
//! Nothing below the binaries touches the environment.

use crate::error::EngineError;
use crate::market::dexscreener::DEFAULT_BASE_URL as DEFAULT_ORACLE_URL;
use crate::persona::Persona;
use crate::Result;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const PLACEHOLDER_KEY: &str = "your_gemini_api_key_here";
const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
/// Upper bound on GENERATION_MAX_RETRIES
const MAX_GENERATION_RETRIES: u32 = 10;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub use_search: bool,
}

#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub base_url: String,
    pub timeout: Duration,
}

/// Timeout race and retry budget for the narrative service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResiliencePolicy {
    pub generation_timeout: Duration,
    pub max_retries: u32,
    pub backoff_base: Duration,
}

impl Default for ResiliencePolicy {
    fn default() -> Self {
        Self {
            generation_timeout: Duration::from_secs(15),
            max_retries: 2,
            backoff_base: Duration::from_secs(2),
        }
    }
}

impl ResiliencePolicy {
    /// Delay before retry `n` (1-based): base, 2x base, 4x base, ...
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.backoff_base.saturating_mul(1u32 << exponent)
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub gemini: GeminiConfig,
    pub oracle: OracleConfig,
    pub resilience: ResiliencePolicy,
    pub persona: Persona,
    pub api_port: u16,
}

impl EngineConfig {
    /// Load from the process environment (after `.env`) and validate.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let api_key = first_set(&["GEMINI_API_KEY", "API_KEY"]).unwrap_or_default();

        let defaults = ResiliencePolicy::default();

        let config = Self {
            gemini: GeminiConfig {
                api_key,
                base_url: var_or("GEMINI_BASE_URL", DEFAULT_GEMINI_URL),
                model: var_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
                use_search: parse_var("GEMINI_USE_SEARCH", true)?,
            },
            oracle: OracleConfig {
                base_url: var_or("ORACLE_BASE_URL", DEFAULT_ORACLE_URL),
                timeout: Duration::from_secs(parse_var("ORACLE_TIMEOUT_SECS", 10)?),
            },
            resilience: ResiliencePolicy {
                generation_timeout: Duration::from_secs(parse_var(
                    "GENERATION_TIMEOUT_SECS",
                    defaults.generation_timeout.as_secs(),
                )?),
                max_retries: parse_var("GENERATION_MAX_RETRIES", defaults.max_retries)?,
                backoff_base: Duration::from_millis(parse_var(
                    "GENERATION_BACKOFF_BASE_MS",
                    defaults.backoff_base.as_millis() as u64,
                )?),
            },
            persona: persona_from(&var_or("PERSONA", "analyst"))?,
            api_port: match env::var("PORT").or_else(|_| env::var("API_PORT")) {
                Ok(raw) => parse_value("PORT", &raw)?,
                Err(_) => 8080,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let key = self.gemini.api_key.trim();
        if key.is_empty() || key == PLACEHOLDER_KEY {
            return Err(EngineError::Config(
                "GEMINI_API_KEY not configured. Set it in the environment or .env".to_string(),
            ));
        }

        if self.gemini.model.trim().is_empty() {
            return Err(EngineError::Config("GEMINI_MODEL is empty".to_string()));
        }

        if self.resilience.max_retries > MAX_GENERATION_RETRIES {
            return Err(EngineError::Config(format!(
                "GENERATION_MAX_RETRIES must be <= {}",
                MAX_GENERATION_RETRIES
            )));
        }

        if self.oracle.timeout.is_zero() {
            return Err(EngineError::Config("ORACLE_TIMEOUT_SECS must be > 0".to_string()));
        }

        if self.resilience.generation_timeout.is_zero() {
            return Err(EngineError::Config(
                "GENERATION_TIMEOUT_SECS must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// First of `names` that is set to a non-blank value
fn first_set(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|v| !v.trim().is_empty())
}

fn persona_from(raw: &str) -> Result<Persona> {
    let key = raw.trim().to_lowercase();
    if !Persona::keys().contains(&key.as_str()) {
        return Err(EngineError::Config(format!(
            "PERSONA {:?} is unknown; expected one of {}",
            raw,
            Persona::keys().join(", ")
        )));
    }

    Ok(Persona::by_key(&key))
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => parse_value(name, &raw),
        _ => Ok(default),
    }
}

fn parse_value<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| EngineError::Config(format!("{} has an invalid value: {:?}", name, raw)))
}
