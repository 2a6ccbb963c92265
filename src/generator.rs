//! Request to playable session: prompt, generate, parse.

use tracing::{info, instrument};

use crate::core::{GenerationClient, GenerationService};
use crate::error::QuizError;
use crate::parser::{parse_quiz, Quiz};
use crate::prompt::QuizRequest;
use crate::session::QuizSession;

#[derive(Debug, Clone)]
pub struct QuizGenerator<S: GenerationService> {
    client: GenerationClient<S>,
}

impl<S: GenerationService> QuizGenerator<S> {
    pub fn new(client: GenerationClient<S>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GenerationClient<S> {
        &self.client
    }

    /// Generate and parse a quiz. No partial quiz is ever returned.
    #[instrument(target = "student_quiz::generator", skip_all)]
    pub async fn generate_quiz(&self, request: &QuizRequest) -> Result<Quiz, QuizError> {
        let prompt = request.to_prompt();
        let raw = self.client.generate(prompt).await?;
        let quiz = parse_quiz(&raw)?;
        info!(questions = quiz.len(), "Quiz generated");
        Ok(quiz)
    }

    /// Generate a quiz and start a fresh session on it.
    pub async fn start_session(&self, request: &QuizRequest) -> Result<QuizSession, QuizError> {
        self.generate_quiz(request).await.map(QuizSession::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::mock::{MockClient, MockResponse};
    use crate::core::{RecordingBackoff, RetryConfig};
    use std::sync::Arc;

    fn generator(responses: Vec<MockResponse>) -> (QuizGenerator<MockClient>, Arc<crate::clients::MockHandle>) {
        let (mock, handle) = MockClient::with_responses(responses);
        let client = GenerationClient::new(mock, RetryConfig::default())
            .with_backoff(Arc::new(RecordingBackoff::new()));
        (QuizGenerator::new(client), handle)
    }

    #[tokio::test]
    async fn subject_request_starts_session() {
        let (generator, handle) = generator(vec![MockResponse::sample_quiz()]);
        let request = QuizRequest::from_subject("the water cycle").unwrap();

        let session = generator.start_session(&request).await.unwrap();

        assert_eq!(session.total(), 15);
        assert_eq!(session.current_index(), 0);
        assert!(handle.prompts()[0].contains("Generate a quiz about the water cycle."));
    }

    #[tokio::test]
    async fn unparsable_text_is_rejected() {
        let (generator, _handle) = generator(vec![MockResponse::Success("Sorry, I can't help".into())]);
        let request = QuizRequest::from_subject("rivers").unwrap();

        let err = generator.generate_quiz(&request).await.unwrap_err();
        assert!(matches!(err, QuizError::ParseRejected(_)));
        assert!(err.to_string().starts_with("Failed to generate quiz, try again"));
    }
}
