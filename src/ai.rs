//! Generative-text collaborator.
//!
//! A thin client over an OpenAI-compatible chat-completions endpoint. Used
//! by persona ingestion (narrative derivation), the action executor, and
//! the chat responder.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ApiError;

const REQUEST_TIMEOUT_SECS: u64 = 60;
const MAX_TOKENS: u32 = 1024;

/// Seam over the generation provider
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, ApiError>;
}

#[derive(Clone)]
pub struct GenerationClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<CompletionMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct CompletionMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionResponseMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionResponseMessage {
    content: Option<String>,
}

impl GenerationClient {
    pub fn new(endpoint: String, api_key: Option<String>, model: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl TextGenerator for GenerationClient {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, ApiError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ApiError::ExternalService("Generation API key not configured".to_string())
        })?;

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                CompletionMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                CompletionMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::ExternalService(format!("Generation request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::ExternalService(format!(
                "Generation provider returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::ExternalService(format!("Invalid generation response: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::ExternalService("Generation returned no content".to_string()))
    }
}
