//! Quiz-generation instruction text.
//!
//! The instruction asks the model for a fixed number of four-option questions
//! in a line format that [`crate::parser::parse_quiz`] understands.

use crate::error::QuizError;

/// Number of questions every quiz must contain.
pub const QUESTION_COUNT: usize = 15;

/// Only this many characters of a source document are sent to the model.
pub const DOCUMENT_PREFIX_CHARS: usize = 1000;

const FORMAT_INSTRUCTIONS: &str = "For each question, provide 4 options (A, B, C, D) and indicate the correct answer.
Format each question as follows:

Question: [Question text]
A) [Option A]
B) [Option B]
C) [Option C]
D) [Option D]
Correct Answer: [A/B/C/D]";

/// What a quiz should be generated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizRequest {
    /// Text extracted from an uploaded document
    FromDocument { text: String },
    /// A free-text subject typed by the student
    FromSubject { subject: String },
}

impl QuizRequest {
    pub fn from_document(text: impl Into<String>) -> Result<Self, QuizError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuizError::InvalidRequest("document text is empty".to_string()));
        }
        Ok(Self::FromDocument { text })
    }

    pub fn from_subject(subject: impl Into<String>) -> Result<Self, QuizError> {
        let subject = subject.into().trim().to_string();
        if subject.is_empty() {
            return Err(QuizError::InvalidRequest("subject is empty".to_string()));
        }
        Ok(Self::FromSubject { subject })
    }

    /// Build the instruction string for the generation service.
    pub fn to_prompt(&self) -> String {
        build_prompt(self)
    }
}

/// Build the quiz-generation prompt for a request.
///
/// Document text is cut at [`DOCUMENT_PREFIX_CHARS`] characters with no regard
/// for word boundaries.
pub fn build_prompt(request: &QuizRequest) -> String {
    match request {
        QuizRequest::FromSubject { subject } => format!(
            "Generate a quiz about {subject}. Generate {QUESTION_COUNT} multiple-choice questions.\n\
             {FORMAT_INSTRUCTIONS}\n\n\
             Repeat this format for all {QUESTION_COUNT} questions."
        ),
        QuizRequest::FromDocument { text } => format!(
            "Based on the following content, generate {QUESTION_COUNT} multiple-choice questions.\n\
             {FORMAT_INSTRUCTIONS}\n\n\
             Repeat this format for all {QUESTION_COUNT} questions.\n\n\
             Content:\n{}...",
            truncate_chars(text, DOCUMENT_PREFIX_CHARS)
        ),
    }
}

/// First `max` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_prompt_embeds_subject_and_format() {
        let request = QuizRequest::from_subject("photosynthesis").unwrap();
        let prompt = request.to_prompt();

        assert!(prompt.starts_with("Generate a quiz about photosynthesis."));
        assert!(prompt.contains("Generate 15 multiple-choice questions"));
        assert!(prompt.contains("Question: [Question text]"));
        assert!(prompt.contains("D) [Option D]"));
        assert!(prompt.contains("Correct Answer: [A/B/C/D]"));
        assert!(prompt.contains("Repeat this format for all 15 questions."));
        assert!(!prompt.contains("Content:"));
    }

    #[test]
    fn long_document_is_cut_to_prefix() {
        let text: String = (0..5000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let request = QuizRequest::from_document(text.clone()).unwrap();
        let prompt = request.to_prompt();

        let expected_tail = format!("Content:\n{}...", &text[..1000]);
        assert!(prompt.ends_with(&expected_tail));
        assert!(!prompt.contains(&text[..1001]));
    }

    #[test]
    fn short_document_is_sent_whole() {
        let request = QuizRequest::from_document("Cells divide by mitosis.").unwrap();
        assert!(request.to_prompt().ends_with("Content:\nCells divide by mitosis...."));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let text = "é".repeat(1200);
        let cut = truncate_chars(&text, DOCUMENT_PREFIX_CHARS);
        assert_eq!(cut.chars().count(), 1000);
        assert_eq!(cut.len(), 2000);
    }

    #[test]
    fn empty_inputs_are_rejected() {
        assert!(matches!(QuizRequest::from_subject("   "), Err(QuizError::InvalidRequest(_))));
        assert!(matches!(QuizRequest::from_document(""), Err(QuizError::InvalidRequest(_))));
    }

    #[test]
    fn prompt_is_pure() {
        let request = QuizRequest::from_subject("rivers").unwrap();
        assert_eq!(build_prompt(&request), build_prompt(&request));
    }
}
