//! Inference collaborator: a local language model behind an OpenAI-compatible
//! completion endpoint (llama.cpp / vLLM style).
//!
//! The engine and the evaluator consume the [`Interpreter`] trait so tests can
//! stub the model out; [`CompletionClient`] is the real implementation. The
//! request carries a raw ChatML prompt and the response is trimmed to the
//! content between the assistant role marker and the end marker.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
const DEFAULT_MODEL: &str = "mindtype-qwen-3b";
const REQUEST_TIMEOUT_SECS: u64 = 120;

const ASSISTANT_MARKER: &str = "<|im_start|>assistant";
const END_MARKER: &str = "<|im_end|>";

/// The single request/response contract the rest of the crate relies on.
pub trait Interpreter {
    /// Submit a system instruction plus a user text block; receive the
    /// generated text, already stripped of role/end markers.
    fn generate(&self, system: &str, user: &str, max_tokens: usize) -> Result<String, AppError>;
}

/// OpenAI-compatible completion request.
#[derive(Debug, Clone, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: String,
    max_tokens: usize,
    temperature: f32,
    stream: bool,
}

/// OpenAI-compatible completion response (the fields we consume).
#[derive(Debug, Clone, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct CompletionChoice {
    text: String,
}

/// Blocking client for a local completion server.
pub struct CompletionClient {
    client: Client,
    base_url: String,
    model: String,
}

impl CompletionClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::failure(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// Resolve server settings from the environment (`MINDTYPE_SERVER_URL`,
    /// `MINDTYPE_MODEL`), falling back to local defaults. CLI flags override
    /// both.
    pub fn from_env(
        base_url: Option<&str>,
        model: Option<&str>,
    ) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url = base_url
            .map(str::to_string)
            .or_else(|| std::env::var("MINDTYPE_SERVER_URL").ok())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        let model = model
            .map(str::to_string)
            .or_else(|| std::env::var("MINDTYPE_MODEL").ok())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Self::new(base_url, model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Swap the model id (used by `mt eval --compare`).
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            model: model.into(),
        }
    }
}

impl Interpreter for CompletionClient {
    fn generate(&self, system: &str, user: &str, max_tokens: usize) -> Result<String, AppError> {
        let request = CompletionRequest {
            model: &self.model,
            prompt: chatml_prompt(system, user),
            max_tokens,
            temperature: 0.0,
            stream: false,
        };

        let url = format!("{}/v1/completions", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .map_err(|e| AppError::failure(format!("Model request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::failure(format!(
                "Model request failed with status {}.",
                resp.status()
            )));
        }

        let body: CompletionResponse = resp
            .json()
            .map_err(|e| AppError::failure(format!("Failed to parse model response: {e}")))?;

        let raw = body
            .choices
            .first()
            .map(|c| c.text.as_str())
            .unwrap_or_default();

        Ok(extract_assistant(raw))
    }
}

/// Assemble the raw ChatML prompt the fine-tuned model was trained on.
pub fn chatml_prompt(system: &str, user: &str) -> String {
    format!(
        "<|im_start|>system\n{system}{END_MARKER}\n<|im_start|>user\n{user}{END_MARKER}\n{ASSISTANT_MARKER}\n"
    )
}

/// Trim a completion to the assistant's content: take what follows the last
/// assistant role marker (some servers echo the prompt), stop at the end
/// marker, and keep the first paragraph only to cut off runaway generation.
pub fn extract_assistant(raw: &str) -> String {
    let after_role = raw.rsplit(ASSISTANT_MARKER).next().unwrap_or(raw);
    let before_end = after_role.split(END_MARKER).next().unwrap_or(after_role);
    let trimmed = before_end.trim();
    trimmed.split("\n\n").next().unwrap_or(trimmed).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_both_blocks_in_chatml_order() {
        let prompt = chatml_prompt("be terse", "fix ths txt");
        assert!(prompt.starts_with("<|im_start|>system\nbe terse<|im_end|>"));
        assert!(prompt.contains("<|im_start|>user\nfix ths txt<|im_end|>"));
        assert!(prompt.ends_with("<|im_start|>assistant\n"));
    }

    #[test]
    fn extract_takes_content_between_markers() {
        let raw = "The corrected text.<|im_end|>\n<|im_start|>user\nleftover";
        assert_eq!(extract_assistant(raw), "The corrected text.");
    }

    #[test]
    fn extract_handles_echoed_prompts() {
        let raw = "<|im_start|>system\nsys<|im_end|>\n<|im_start|>user\nin<|im_end|>\n\
                   <|im_start|>assistant\nOut text<|im_end|>";
        assert_eq!(extract_assistant(raw), "Out text");
    }

    #[test]
    fn extract_keeps_the_first_paragraph_only() {
        let raw = "First paragraph stays.\n\nSecond paragraph is runaway generation.";
        assert_eq!(extract_assistant(raw), "First paragraph stays.");
    }

    #[test]
    fn extract_of_plain_text_is_a_trim() {
        assert_eq!(extract_assistant("  hello \n"), "hello");
        assert_eq!(extract_assistant(""), "");
    }
}
