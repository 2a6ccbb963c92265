#[cfg(feature = "deepseek")]
use super::deepseek::{DeepSeekClient, DeepSeekConfig};
#[cfg(feature = "gemini")]
use super::gemini::{GeminiClient, GeminiConfig};
use super::mock::{MockClient, MockHandle, MockResponse};
use crate::config::{self, KeyFromEnv, CLIENT_VAR};
use crate::core::GenerationService;
use crate::error::AIError;
use async_trait::async_trait;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Which generation backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    #[cfg(feature = "gemini")]
    Gemini,
    #[cfg(feature = "deepseek")]
    DeepSeek,
    Mock,
}

impl Default for ClientType {
    /// `QUIZ_CLIENT` if set, otherwise the first backend with an API key,
    /// otherwise the mock.
    fn default() -> Self {
        config::load_dotenv();
        if let Some(client_type) = env::var(CLIENT_VAR).ok().and_then(|s| s.parse().ok()) {
            return client_type;
        }
        #[cfg(feature = "gemini")]
        if GeminiClient::has_key() {
            return Self::Gemini;
        }
        #[cfg(feature = "deepseek")]
        if DeepSeekClient::has_key() {
            return Self::DeepSeek;
        }
        Self::Mock
    }
}

impl FromStr for ClientType {
    type Err = String;

    /// Parse client type from string (case insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            #[cfg(feature = "gemini")]
            "gemini" => Ok(Self::Gemini),
            #[cfg(feature = "deepseek")]
            "deepseek" => Ok(Self::DeepSeek),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown client type: '{}'. Supported: gemini, deepseek, mock", s)),
        }
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "gemini")]
            ClientType::Gemini => write!(f, "Gemini"),
            #[cfg(feature = "deepseek")]
            ClientType::DeepSeek => write!(f, "DeepSeek"),
            ClientType::Mock => write!(f, "Mock"),
        }
    }
}

/// Generation service chosen at runtime
#[derive(Debug, Clone)]
pub struct FlexibleClient {
    inner: Arc<dyn GenerationService>,
}

impl FlexibleClient {
    pub fn new(service: Box<dyn GenerationService>) -> Self {
        Self { inner: Arc::from(service) }
    }

    /// Build the backend for `client_type` from environment configuration.
    /// The mock variant replays the built-in sample quiz once.
    pub fn from_type(client_type: ClientType) -> Self {
        match client_type {
            #[cfg(feature = "gemini")]
            ClientType::Gemini => Self::gemini(GeminiConfig::default()),
            #[cfg(feature = "deepseek")]
            ClientType::DeepSeek => Self::deepseek(DeepSeekConfig::default()),
            ClientType::Mock => Self::new_mock_with_responses(vec![MockResponse::sample_quiz()]).0,
        }
    }

    #[cfg(feature = "gemini")]
    pub fn gemini(config: GeminiConfig) -> Self {
        Self::new(Box::new(GeminiClient::new(config)))
    }

    #[cfg(feature = "deepseek")]
    pub fn deepseek(config: DeepSeekConfig) -> Self {
        Self::new(Box::new(DeepSeekClient::new(config)))
    }

    /// Create a FlexibleClient with a mock and return the handle for configuration
    pub fn mock() -> (Self, Arc<MockHandle>) {
        Self::new_mock_with_responses(Vec::new())
    }

    pub fn new_mock_with_responses(responses: Vec<MockResponse>) -> (Self, Arc<MockHandle>) {
        let (mock_client, handle) = MockClient::with_responses(responses);
        (Self::new(Box::new(mock_client)), handle)
    }
}

#[async_trait]
impl GenerationService for FlexibleClient {
    async fn generate_content(&self, prompt: String) -> Result<String, AIError> {
        self.inner.generate_content(prompt).await
    }

    fn clone_box(&self) -> Box<dyn GenerationService> {
        Box::new(self.clone())
    }
}
