pub mod models;

use crate::config::KeyFromEnv;
use crate::core::GenerationService;
use crate::error::{AIError, DeepSeekError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

pub use models::DeepSeekModel;

const CHAT_COMPLETIONS_URL: &str = "https://api.deepseek.com/v1/chat/completions";

#[derive(Debug, Serialize)]
struct DeepSeekRequest {
    model: String,
    messages: Vec<DeepSeekMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct DeepSeekMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct DeepSeekResponse {
    choices: Vec<DeepSeekChoice>,
}

#[derive(Debug, Deserialize)]
struct DeepSeekChoice {
    message: DeepSeekResponseMessage,
}

#[derive(Debug, Deserialize)]
struct DeepSeekResponseMessage {
    content: String,
}

/// Configuration for DeepSeek client
#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    pub api_key: String,
    pub model: DeepSeekModel,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            api_key: DeepSeekClient::find_key().unwrap_or_default(),
            model: DeepSeekModel::default(),
            max_tokens: 4096,
            temperature: 0.3,
        }
    }
}

impl DeepSeekConfig {
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }
}

#[derive(Clone)]
pub struct DeepSeekClient {
    config: DeepSeekConfig,
    client: Client,
}

impl std::fmt::Debug for DeepSeekClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepSeekClient")
            .field("model", &self.config.model.id())
            .finish_non_exhaustive()
    }
}

impl KeyFromEnv for DeepSeekClient {
    const KEY_NAME: &'static str = "DEEPSEEK_API_KEY";
}

impl Default for DeepSeekClient {
    fn default() -> Self {
        Self::new(DeepSeekConfig::default())
    }
}

impl DeepSeekClient {
    /// Create a new DeepSeek client with full configuration
    pub fn new(config: DeepSeekConfig) -> Self {
        info!(model = %config.model.id(), "Creating new DeepSeek client");
        Self {
            config,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl GenerationService for DeepSeekClient {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len(), model = %self.config.model.id()))]
    async fn generate_content(&self, prompt: String) -> Result<String, AIError> {
        if self.config.api_key.is_empty() {
            error!("DEEPSEEK_API_KEY is not set");
            return Err(DeepSeekError::Authentication.into());
        }

        let request = DeepSeekRequest {
            model: self.config.model.id().to_string(),
            messages: vec![DeepSeekMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Sending request to DeepSeek API");
        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                DeepSeekError::Http(e.to_string())
            })?;

        let status = response.status();
        debug!(status = %status, "Received response from DeepSeek API");

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("DeepSeek API rate limit exceeded");
            return Err(DeepSeekError::RateLimit.into());
        }

        if status == StatusCode::UNAUTHORIZED {
            error!("DeepSeek API authentication failed");
            return Err(DeepSeekError::Authentication.into());
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "DeepSeek API error");
            return Err(DeepSeekError::Api(format!("{status}: {error_text}")).into());
        }

        let body: DeepSeekResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Failed to parse DeepSeek response JSON");
            DeepSeekError::Http(e.to_string())
        })?;

        let text = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| DeepSeekError::Api("No choices in response".to_string()))?;

        info!(response_len = text.len(), "Successfully received DeepSeek response");
        Ok(text)
    }

    fn clone_box(&self) -> Box<dyn GenerationService> {
        Box::new(self.clone())
    }
}
