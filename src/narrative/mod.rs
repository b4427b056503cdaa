//! Narrative generation adapter
//!
//! Wraps a `NarrativeService` in a deadline and a bounded retry loop.
//! The deadline drops the pending call, which aborts the in-flight HTTP
//! request instead of leaving it running in the background.

use crate::config::{EngineConfig, ResiliencePolicy};
use crate::error::EngineError;
use crate::gemini::GeminiClient;
use crate::models::{DerivedMetrics, MarketSnapshot, Narrative};
use crate::persona::Persona;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub mod prompt;

/// One request to the generative service
#[derive(Debug, Clone)]
pub struct NarrativeRequest {
    pub prompt: String,
    pub system_instruction: Option<String>,
    pub use_search: bool,
}

/// Trait for the generative text backend
#[async_trait]
pub trait NarrativeService: Send + Sync {
    async fn generate(&self, request: &NarrativeRequest) -> Result<Narrative>;
}

/// Failure class of a single attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    RateLimited,
    Timeout,
    Fatal,
}

impl ErrorClass {
    fn of(error: &EngineError) -> Self {
        match error {
            EngineError::RateLimited(_) => ErrorClass::RateLimited,
            EngineError::GenerationTimeout(_) => ErrorClass::Timeout,
            _ => ErrorClass::Fatal,
        }
    }
}

/// Bookkeeping for one pass through the retry loop
#[derive(Debug, Clone)]
pub struct GenerationAttempt {
    pub index: u32,
    pub elapsed: Duration,
    pub last_error: Option<ErrorClass>,
}

pub struct NarrativeAdapter {
    service: Arc<dyn NarrativeService>,
    policy: ResiliencePolicy,
    persona: Persona,
    use_search: bool,
}

impl NarrativeAdapter {
    pub fn new(
        service: Arc<dyn NarrativeService>,
        policy: ResiliencePolicy,
        persona: Persona,
        use_search: bool,
    ) -> Self {
        Self {
            service,
            policy,
            persona,
            use_search,
        }
    }

    /// Gemini-backed adapter from process configuration
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let service = Arc::new(GeminiClient::new(&config.gemini)?);
        Ok(Self::new(
            service,
            config.resilience,
            config.persona.clone(),
            config.gemini.use_search,
        ))
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// Generate the market narrative for one snapshot
    pub async fn generate(
        &self,
        snapshot: &MarketSnapshot,
        metrics: &DerivedMetrics,
    ) -> Result<Narrative> {
        let request = NarrativeRequest {
            prompt: prompt::analysis_prompt(&self.persona, snapshot, metrics, self.use_search),
            system_instruction: Some(prompt::system_instruction(&self.persona)),
            use_search: self.use_search,
        };

        self.run(&request).await
    }

    /// Free-form request through the same timeout and retry policy
    pub async fn generate_raw(&self, text: String) -> Result<Narrative> {
        let request = NarrativeRequest {
            prompt: text,
            system_instruction: Some(prompt::system_instruction(&self.persona)),
            use_search: self.use_search,
        };

        self.run(&request).await
    }

    /// Race each attempt against the deadline; retry rate limits and timeouts
    /// with exponential backoff. Every failure ends as `GenerationExhausted`.
    async fn run(&self, request: &NarrativeRequest) -> Result<Narrative> {
        let max_attempts = self.policy.max_retries.saturating_add(1);
        let mut attempt = GenerationAttempt {
            index: 0,
            elapsed: Duration::ZERO,
            last_error: None,
        };

        loop {
            attempt.index += 1;
            let started = Instant::now();

            let outcome = match tokio::time::timeout(
                self.policy.generation_timeout,
                self.service.generate(request),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(EngineError::GenerationTimeout(self.policy.generation_timeout)),
            };

            attempt.elapsed = started.elapsed();

            let error = match outcome {
                Ok(narrative) => {
                    info!(
                        attempt = attempt.index,
                        elapsed_ms = attempt.elapsed.as_millis() as u64,
                        "Narrative generated"
                    );
                    return Ok(narrative);
                }
                Err(e) => e,
            };

            attempt.last_error = Some(ErrorClass::of(&error));

            warn!(
                attempt = attempt.index,
                elapsed_ms = attempt.elapsed.as_millis() as u64,
                class = ?attempt.last_error,
                error = %error,
                "Narrative attempt failed"
            );

            if !error.is_retryable() || attempt.index >= max_attempts {
                return Err(EngineError::GenerationExhausted {
                    attempts: attempt.index,
                    last_error: error.to_string(),
                });
            }

            let delay = self.policy.backoff_for(attempt.index);
            debug!(delay_ms = delay.as_millis() as u64, "Backing off before retry");
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use crate::models::Source;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Scripted outcome for one call
    pub enum Step {
        Reply(&'static str),
        RateLimit,
        Fail,
        Hang,
    }

    /// Plays back scripted steps; the last step repeats forever.
    pub struct ScriptedService {
        steps: Mutex<VecDeque<Step>>,
        repeat: fn() -> Step,
        pub calls: AtomicU32,
    }

    impl ScriptedService {
        pub fn new(steps: Vec<Step>, repeat: fn() -> Step) -> Self {
            Self {
                steps: Mutex::new(steps.into()),
                repeat,
                calls: AtomicU32::new(0),
            }
        }

        pub fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NarrativeService for ScriptedService {
        async fn generate(&self, _request: &NarrativeRequest) -> Result<Narrative> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let step = self
                .steps
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(self.repeat);

            match step {
                Step::Reply(text) => Ok(Narrative {
                    text: format!("{} (call {})", text, n),
                    sources: vec![Source {
                        title: "Example".into(),
                        uri: "https://example.com".into(),
                    }],
                }),
                Step::RateLimit => Err(EngineError::RateLimited("429".into())),
                Step::Fail => Err(EngineError::Generation("400 bad request".into())),
                Step::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(EngineError::Generation("unreachable".into()))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{ScriptedService, Step};
    use super::*;
    use crate::metrics;
    use crate::models::fixtures::snapshot;
    use tokio_test::{assert_err, assert_ok};

    fn fast_policy() -> ResiliencePolicy {
        ResiliencePolicy {
            generation_timeout: Duration::from_millis(50),
            max_retries: 2,
            backoff_base: Duration::from_millis(1),
        }
    }

    fn adapter(service: Arc<ScriptedService>) -> NarrativeAdapter {
        NarrativeAdapter::new(service, fast_policy(), Persona::default(), true)
    }

    async fn run(adapter: &NarrativeAdapter) -> Result<Narrative> {
        let s = snapshot();
        let m = metrics::derive(&s);
        adapter.generate(&s, &m).await
    }

    #[tokio::test]
    async fn test_succeeds_after_two_rate_limits() {
        let service = Arc::new(ScriptedService::new(
            vec![Step::RateLimit, Step::RateLimit, Step::Reply("Verdict: HOLD")],
            || Step::Fail,
        ));

        let narrative = assert_ok!(run(&adapter(service.clone())).await);

        assert_eq!(service.calls(), 3);
        assert_eq!(narrative.text, "Verdict: HOLD (call 3)");
        assert_eq!(narrative.sources.len(), 1);
    }

    #[tokio::test]
    async fn test_always_rate_limited_is_exhausted() {
        let service = Arc::new(ScriptedService::new(vec![], || Step::RateLimit));

        let err = assert_err!(run(&adapter(service.clone())).await);

        assert_eq!(service.calls(), 3);
        assert!(matches!(err, EngineError::GenerationExhausted { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn test_non_retryable_error_escalates_immediately() {
        let service = Arc::new(ScriptedService::new(vec![Step::Fail], || Step::Reply("late")));

        let err = assert_err!(run(&adapter(service.clone())).await);

        assert_eq!(service.calls(), 1);
        match err {
            EngineError::GenerationExhausted { attempts, last_error } => {
                assert_eq!(attempts, 1);
                assert!(last_error.contains("bad request"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_counts_as_retryable_attempt() {
        let service = Arc::new(ScriptedService::new(
            vec![Step::Hang],
            || Step::Reply("Verdict: BUY"),
        ));

        let narrative = assert_ok!(run(&adapter(service.clone())).await);

        assert_eq!(service.calls(), 2);
        assert!(narrative.text.starts_with("Verdict: BUY"));
    }

    #[tokio::test]
    async fn test_persistent_timeouts_are_exhausted() {
        let service = Arc::new(ScriptedService::new(vec![], || Step::Hang));

        let started = Instant::now();
        let err = assert_err!(run(&adapter(service.clone())).await);

        assert_eq!(service.calls(), 3);
        assert!(matches!(err, EngineError::GenerationExhausted { attempts: 3, .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_zero_retry_budget() {
        let service = Arc::new(ScriptedService::new(vec![], || Step::RateLimit));
        let policy = ResiliencePolicy {
            max_retries: 0,
            ..fast_policy()
        };
        let adapter = NarrativeAdapter::new(service.clone(), policy, Persona::default(), false);

        assert_err!(run(&adapter).await);
        assert_eq!(service.calls(), 1);
    }
}
