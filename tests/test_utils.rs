#![allow(dead_code)]

use std::sync::Arc;

use student_quiz::clients::{MockClient, MockHandle, MockResponse};
use student_quiz::core::RecordingBackoff;
use student_quiz::{GenerationClient, QuizGenerator, RetryConfig};

/// One question block in the generated format.
pub fn question_block(number: usize, answer: char) -> String {
    format!(
        "Q{number}. Which statement about topic {number} is true?\n\
         A) The first one\n\
         B) The second one\n\
         C) The third one\n\
         D) The fourth one\n\
         Correct Answer: {answer}\n\n"
    )
}

/// Answer letter used for question `number` by [`quiz_text`].
pub fn answer_for(number: usize) -> char {
    ['A', 'B', 'C', 'D'][(number - 1) % 4]
}

/// Quiz text with `count` well-formed blocks.
pub fn quiz_text(count: usize) -> String {
    (1..=count).map(|n| question_block(n, answer_for(n))).collect()
}

pub struct Harness {
    pub generator: QuizGenerator<MockClient>,
    pub handle: Arc<MockHandle>,
    pub backoff: RecordingBackoff,
}

/// Generator over a scripted mock that records backoff instead of sleeping.
pub fn harness(responses: Vec<MockResponse>) -> Harness {
    let (mock, handle) = MockClient::with_responses(responses);
    let backoff = RecordingBackoff::new();
    let client = GenerationClient::new(mock, RetryConfig::default()).with_backoff(Arc::new(backoff.clone()));
    Harness {
        generator: QuizGenerator::new(client),
        handle,
        backoff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_parses() {
        let quiz = student_quiz::parse_quiz(&quiz_text(15)).unwrap();
        assert_eq!(quiz.len(), 15);
    }

    #[test]
    fn answers_cycle_through_letters() {
        assert_eq!(answer_for(1), 'A');
        assert_eq!(answer_for(4), 'D');
        assert_eq!(answer_for(5), 'A');
    }
}
