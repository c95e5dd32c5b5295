//! Gemini `generateContent` client.
//!
//! The whole prompt, persona included, goes in as one user part; there is no
//! system instruction. A failed call is fatal for the run, so nothing here
//! retries.
//!
//! # Architecture
//!
//! - [`TextGenerator`]: trait the pipeline depends on
//! - [`GeminiClient`]: production implementation over `reqwest`

use crate::utils::truncate_for_log;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Trait for turning a prompt into free text.
pub trait TextGenerator {
    /// Send `prompt` to the model and return its text output.
    async fn generate(&self, prompt: &str) -> Result<String, Box<dyn Error>>;
}

/// Client for the Gemini REST API.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base: String,
    model: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base", &self.base)
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base: GEMINI_BASE.to_string(),
            model: model.into(),
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base.trim_end_matches('/'),
            self.model
        )
    }
}

impl TextGenerator for GeminiClient {
    #[instrument(level = "info", skip_all, fields(model = %self.model, prompt_bytes = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, Box<dyn Error>> {
        let Some(api_key) = self.api_key.as_deref() else {
            error!("GEMINI_API_KEY is not set");
            return Err("GEMINI_API_KEY is not set".into());
        };

        let t0 = Instant::now();
        let request = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };
        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        let dt = t0.elapsed();

        if !status.is_success() {
            error!(
                %status,
                elapsed_ms = dt.as_millis(),
                body = %truncate_for_log(&body, 300),
                "Gemini call failed"
            );
            return Err(format!("Gemini request failed: HTTP {status}").into());
        }

        let text = parse_generate_response(&body)?;
        info!(elapsed_ms = dt.as_millis(), output_bytes = text.len(), "Gemini call succeeded");
        Ok(text)
    }
}

/// Extract the text of the first candidate from a `generateContent` response.
///
/// Fails when the prompt was blocked or the candidate carries no text.
pub fn parse_generate_response(body: &str) -> Result<String, Box<dyn Error>> {
    let parsed: GenerateResponse = serde_json::from_str(body)?;

    if let Some(reason) = parsed.prompt_feedback.as_ref().and_then(|f| f.block_reason.as_deref()) {
        return Err(format!("Gemini blocked the prompt: {reason}").into());
    }

    let Some(candidate) = parsed.candidates.into_iter().next() else {
        return Err("Gemini returned no candidates".into());
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
        return Err(format!("Gemini returned no text (finish reason: {reason})").into());
    }
    if let Some(reason) = candidate.finish_reason.as_deref() {
        if reason != "STOP" {
            warn!(finish_reason = reason, "Gemini output may be incomplete");
        }
    }
    Ok(text)
}
