//! Anthropic Messages API backend
//!
//! Async HTTP client for the Anthropic Messages API. Translates the vendor
//! wire format into the engine's content-block set at this boundary; the
//! conversation loop never sees vendor-specific shapes.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::{Config, ContentBlock, Message, Result, ToolSpec, TroupeError};
use crate::model::backend::{BackendResponse, ModelBackend, TokenUsage};
use crate::model::msn::Msn;

/// Model used when the MSN does not name one
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";

const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
const BASE_URL_VAR: &str = "ANTHROPIC_BASE_URL";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Anthropic API client
pub struct AnthropicBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    /// MSN flags, sent as extra request headers
    extra_headers: Vec<(String, String)>,
}

/// Messages API request
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [ToolSpec],
}

fn no_tools(tools: &&[ToolSpec]) -> bool {
    tools.is_empty()
}

/// Messages API response
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicBackend {
    /// Create a backend from a parsed MSN and configuration
    pub fn new(msn: &Msn, config: &Config) -> Result<Self> {
        let api_key = env::var(API_KEY_VAR).map_err(|_| {
            TroupeError::config(format!(
                "API key was not defined. Make sure {} is in your environment or .env.secret file",
                API_KEY_VAR
            ))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.model.timeout_secs))
            .build()
            .map_err(|e| TroupeError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: env::var(BASE_URL_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key,
            model: msn.model.clone().unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: config.model.max_tokens,
            extra_headers: msn.flags.clone(),
        })
    }

    /// The model this backend was bound to
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelBackend for AnthropicBackend {
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<BackendResponse> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: 0.0,
            system,
            messages,
            tools,
        };

        let mut builder = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request);

        for (key, value) in &self.extra_headers {
            builder = builder.header(key, value);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                TroupeError::backend(format!("Cannot reach {}: {}", self.base_url, e))
            } else {
                TroupeError::backend(format!("Request failed: {}", e))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TroupeError::backend(format!(
                "Anthropic API error ({}): {}",
                status, error_text
            )));
        }

        let response_text = response.text().await.map_err(TroupeError::from)?;

        let parsed: MessagesResponse = serde_json::from_str(&response_text)
            .map_err(|e| TroupeError::backend(format!("Failed to parse response: {}", e)))?;

        Ok(BackendResponse {
            blocks: parsed.content,
            usage: TokenUsage {
                input_tokens: parsed.usage.input_tokens,
                output_tokens: parsed.usage.output_tokens,
            },
        })
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}
