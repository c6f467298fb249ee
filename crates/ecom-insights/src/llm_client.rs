//! Completion API client
//!
//! Sends a single-turn chat completion to an OpenAI-compatible endpoint
//! (Groq by default) and returns the first choice's text.
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

pub struct CompletionClient {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl CompletionClient {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
            http_client: reqwest::Client::new(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(&cfg.completions_url, &cfg.chat_model, cfg.api_key.clone())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask for a completion of a single user message.
    ///
    /// Transport errors, non-2xx statuses and replies without
    /// `choices[0].message.content` are all errors. Nothing is retried.
    pub async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        debug!("Requesting completion ({} chars) from {}", prompt.len(), self.endpoint);
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let started = Instant::now();
        let mut builder = self.http_client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await;
        crate::metrics::observe_upstream(started.elapsed().as_secs_f64());

        let response =
            response.map_err(|e| anyhow::anyhow!("Completion API request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Completion API returned {}: {}", status, body));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse completion response: {}", e))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .map(|m| m.content)
            .ok_or_else(|| anyhow::anyhow!("Completion response had no message"))
    }
}
