//! Gemini API client for narrative generation
//!
//! Provides direct LLM integration with optional Google Search grounding.
//! Uses a long-lived reqwest::Client for connection pooling. No client-level
//! timeout is set: the narrative adapter owns the deadline and drops the
//! in-flight request when it expires.

use crate::config::GeminiConfig;
use crate::error::EngineError;
use crate::models::{Narrative, Source};
use crate::narrative::{NarrativeRequest, NarrativeService};
use crate::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, error, info};

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
        })
    }
}

#[async_trait]
impl NarrativeService for GeminiClient {
    async fn generate(&self, request: &NarrativeRequest) -> Result<Narrative> {
        let body = GeminiRequest::from(request);

        info!(use_search = request.use_search, "Calling Gemini API");

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                EngineError::Generation(format!("Gemini API error: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Gemini API error response: {}", error_text);
            return Err(classify_failure(status, &error_text));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            EngineError::Generation(format!("Gemini parse error: {}", e))
        })?;

        let narrative = gemini_response.into_narrative()?;

        info!(
            sources = narrative.sources.len(),
            chars = narrative.text.len(),
            "Gemini response received"
        );

        Ok(narrative)
    }
}

/// 429 and quota exhaustion are the only retryable service answers
fn classify_failure(status: StatusCode, body: &str) -> EngineError {
    if status == StatusCode::TOO_MANY_REQUESTS || body.contains("RESOURCE_EXHAUSTED") {
        EngineError::RateLimited(format!("Gemini returned {}", status))
    } else {
        EngineError::Generation(format!("Gemini returned {}: {}", status, body))
    }
}

// =============================
// Wire types
// =============================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

impl From<&NarrativeRequest> for GeminiRequest {
    fn from(request: &NarrativeRequest) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.4,
                top_p: 0.9,
                top_k: 40,
                max_output_tokens: 1024,
            },
            system_instruction: request.system_instruction.as_ref().map(|text| Content {
                parts: vec![Part { text: text.clone() }],
            }),
            tools: if request.use_search {
                vec![Tool {
                    google_search: GoogleSearch {},
                }]
            } else {
                Vec::new()
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: i32,
    max_output_tokens: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    finish_reason: Option<String>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

impl GeminiResponse {
    fn into_narrative(self) -> Result<Narrative> {
        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            EngineError::Generation("No response from Gemini API".to_string())
        })?;

        debug!(finish_reason = ?candidate.finish_reason, "Gemini candidate");

        let text = candidate
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(EngineError::Generation(
                "Empty response from Gemini".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let sources = candidate
            .grounding_metadata
            .map(|m| m.grounding_chunks)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|chunk| chunk.web)
            .filter_map(|web| {
                let uri = web.uri?;
                let title = web.title.unwrap_or_else(|| uri.clone());
                Some(Source { title, uri })
            })
            .filter(|source| seen.insert(source.uri.clone()))
            .collect();

        Ok(Narrative { text, sources })
    }
}
