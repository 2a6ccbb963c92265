use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("Quiz generation failed: {0}")]
    Generation(#[from] AIError),
    #[error("Quiz generation failed after {attempts} rate-limited attempts")]
    GenerationExhausted { attempts: u32 },
    #[error("Failed to generate quiz, try again: {0}")]
    ParseRejected(#[from] ParseError),
    #[error("Invalid quiz request: {0}")]
    InvalidRequest(String),
    #[error("Invalid session transition: {0}")]
    InvalidTransition(String),
    #[error("No active quiz session for '{0}'")]
    NoActiveSession(String),
    #[error("Session persistence error: {0}")]
    Persistence(String),
}

/// Why a generated quiz text was rejected. A rejection is always total.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected {expected} questions, found {found}")]
    WrongQuestionCount { expected: usize, found: usize },
    #[error("question {number} is malformed: {reason}")]
    MalformedQuestion { number: usize, reason: String },
}

#[derive(Error, Debug)]
pub enum AIError {
    #[error("Gemini API error: {0}")]
    Gemini(#[from] GeminiError),
    #[error("DeepSeek API error: {0}")]
    DeepSeek(#[from] DeepSeekError),
    #[error("Mock client error: {0}")]
    Mock(#[from] MockError),
}

impl AIError {
    /// Rate limiting is the only transient failure; everything else is fatal.
    pub fn is_rate_limit(&self) -> bool {
        matches!(
            self,
            AIError::Gemini(GeminiError::RateLimit)
                | AIError::DeepSeek(DeepSeekError::RateLimit)
                | AIError::Mock(MockError::RateLimit)
        )
    }
}

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

#[derive(Error, Debug)]
pub enum DeepSeekError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("Authentication failed")]
    Authentication,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MockError {
    #[error("Rate limit exceeded")]
    RateLimit,
    #[error("API error: {0}")]
    Api(String),
    #[error("No scripted responses left")]
    Exhausted,
}
