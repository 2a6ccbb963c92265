pub mod clients;
pub mod config;
pub mod core;
pub mod error;
pub mod generator;
pub mod interceptors;
pub mod parser;
pub mod prompt;
pub mod session;
pub mod store;

// Convenient re-exports
pub use crate::core::{GenerationClient, GenerationService, RetryConfig};
pub use error::{AIError, ParseError, QuizError};
pub use generator::QuizGenerator;
pub use parser::{parse_quiz, OptionLetter, Question, Quiz};
pub use prompt::{build_prompt, QuizRequest};
pub use session::{AnswerFeedback, Band, QuizReport, QuizSession, SessionState};
pub use store::SessionStore;
