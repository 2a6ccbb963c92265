//! Generation client: sends a prompt to a [`GenerationService`] and retries
//! rate-limited calls with a fixed delay, up to a bounded number of attempts.
//!
//! Any other failure is fatal and returned straight away.

use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{self, MAX_ATTEMPTS_VAR, RETRY_DELAY_VAR};
use crate::error::{AIError, QuizError};
use crate::interceptors::Interceptor;

/// Remote text-generation service.
///
/// Implementors only need `generate_content`, which sends a prompt and returns
/// the raw model text. Rate limiting must be reported as an error for which
/// [`AIError::is_rate_limit`] holds.
#[async_trait]
pub trait GenerationService: Send + Sync + Debug {
    async fn generate_content(&self, prompt: String) -> Result<String, AIError>;

    /// Clone this service into a boxed trait object
    fn clone_box(&self) -> Box<dyn GenerationService>;
}

impl Clone for Box<dyn GenerationService> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[async_trait]
impl GenerationService for Box<dyn GenerationService> {
    async fn generate_content(&self, prompt: String) -> Result<String, AIError> {
        self.as_ref().generate_content(prompt).await
    }

    fn clone_box(&self) -> Box<dyn GenerationService> {
        self.as_ref().clone_box()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total calls allowed, the first one included
    pub max_attempts: u32,
    /// Fixed wait after a rate-limited call
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    /// Defaults, overridden by `QUIZ_MAX_ATTEMPTS` / `QUIZ_RETRY_DELAY_SECS`.
    pub fn from_env() -> Self {
        config::load_dotenv();
        let defaults = Self::default();
        let max_attempts = config::env_or(MAX_ATTEMPTS_VAR, defaults.max_attempts).max(1);
        let delay = config::env_secs_or(RETRY_DELAY_VAR, defaults.delay);
        Self { max_attempts, delay }
    }
}

/// Suspends the caller between rate-limited attempts.
#[async_trait]
pub trait Backoff: Send + Sync + Debug {
    async fn wait(&self, delay: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioBackoff;

#[async_trait]
impl Backoff for TokioBackoff {
    async fn wait(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Records requested delays without sleeping.
#[derive(Debug, Clone, Default)]
pub struct RecordingBackoff {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingBackoff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Backoff for RecordingBackoff {
    async fn wait(&self, delay: Duration) {
        if let Ok(mut delays) = self.delays.lock() {
            delays.push(delay);
        }
    }
}

/// Wraps a [`GenerationService`] with the rate-limit retry policy.
#[derive(Debug, Clone)]
pub struct GenerationClient<S: GenerationService> {
    service: S,
    config: RetryConfig,
    backoff: Arc<dyn Backoff>,
    interceptor: Option<Arc<dyn Interceptor>>,
}

impl<S: GenerationService> GenerationClient<S> {
    pub fn new(service: S, config: RetryConfig) -> Self {
        info!(
            max_attempts = config.max_attempts,
            delay_secs = config.delay.as_secs_f64(),
            "Creating new GenerationClient"
        );
        Self {
            service,
            config,
            backoff: Arc::new(TokioBackoff),
            interceptor: None,
        }
    }

    /// Replace how the client waits between attempts
    pub fn with_backoff(mut self, backoff: Arc<dyn Backoff>) -> Self {
        self.backoff = backoff;
        self
    }

    /// Store every successful prompt/response pair
    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Send `prompt`, retrying only while the service reports rate limiting.
    #[instrument(target = "student_quiz::generation", skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn generate(&self, prompt: String) -> Result<String, QuizError> {
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            debug!(attempt, max_attempts, "Calling generation service");

            match self.service.generate_content(prompt.clone()).await {
                Ok(text) => {
                    info!(attempt, response_len = text.len(), "Generation succeeded");
                    self.intercept(&prompt, &text).await;
                    return Ok(text);
                }
                Err(e) if e.is_rate_limit() => {
                    if attempt == max_attempts {
                        break;
                    }
                    warn!(
                        attempt,
                        delay_secs = self.config.delay.as_secs_f64(),
                        "Rate limit reached, retrying after delay"
                    );
                    self.backoff.wait(self.config.delay).await;
                }
                Err(e) => {
                    error!(error = %e, attempt, "Generation failed");
                    return Err(QuizError::Generation(e));
                }
            }
        }

        error!(attempts = max_attempts, "All generation attempts were rate limited");
        Err(QuizError::GenerationExhausted { attempts: max_attempts })
    }

    async fn intercept(&self, prompt: &str, response: &str) {
        if let Some(interceptor) = &self.interceptor {
            if let Err(e) = interceptor.save(prompt, response).await {
                warn!(error = %e, "Failed to save generation transcript");
            }
        }
    }
}
