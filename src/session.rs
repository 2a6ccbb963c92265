//! Per-student progress through one quiz.
//!
//! A [`QuizSession`] is a plain value: transitions take the current session
//! and hand back the next one, so whoever drives the quiz decides where the
//! session lives between interactions.

use std::fmt;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::QuizError;
use crate::parser::{OptionLetter, Question, Quiz};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Completed,
}

/// Result of answering one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub selected: OptionLetter,
    pub correct_answer: OptionLetter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "SessionRecord")]
pub struct QuizSession {
    quiz: Arc<Quiz>,
    current_index: usize,
    score: usize,
    completed: bool,
}

/// Unvalidated on-disk shape of a session.
#[derive(Deserialize, JsonSchema)]
struct SessionRecord {
    quiz: Arc<Quiz>,
    current_index: usize,
    score: usize,
    completed: bool,
}

impl TryFrom<SessionRecord> for QuizSession {
    type Error = QuizError;

    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        let len = record.quiz.len();
        if record.current_index > len {
            return Err(QuizError::Persistence(format!(
                "current index {} beyond quiz of {len} questions",
                record.current_index
            )));
        }
        if record.score > record.current_index {
            return Err(QuizError::Persistence(format!(
                "score {} exceeds {} answered questions",
                record.score, record.current_index
            )));
        }
        if record.completed != (record.current_index == len) {
            return Err(QuizError::Persistence(
                "completion flag disagrees with progress".to_string(),
            ));
        }
        Ok(Self {
            quiz: record.quiz,
            current_index: record.current_index,
            score: record.score,
            completed: record.completed,
        })
    }
}

impl QuizSession {
    /// Start at the first question with no score.
    pub fn new(quiz: Quiz) -> Self {
        info!(questions = quiz.len(), "Starting quiz session");
        Self {
            quiz: Arc::new(quiz),
            current_index: 0,
            score: 0,
            completed: false,
        }
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.quiz.len()
    }

    pub fn state(&self) -> SessionState {
        if self.completed {
            SessionState::Completed
        } else {
            SessionState::Active
        }
    }

    /// The question awaiting an answer, if the session is still active.
    pub fn current_question(&self) -> Option<&Question> {
        if self.completed {
            return None;
        }
        self.quiz.get(self.current_index)
    }

    /// Score the answer to the current question and move to the next one.
    ///
    /// Correct or not, the index advances by exactly one; answering the last
    /// question completes the session. Answering a completed session is an
    /// error and leaves it untouched.
    pub fn submit_answer(&self, selected: OptionLetter) -> Result<(Self, AnswerFeedback), QuizError> {
        let question = self.current_question().ok_or_else(|| {
            QuizError::InvalidTransition("quiz is already completed".to_string())
        })?;

        let correct = selected == question.correct_answer;
        let feedback = AnswerFeedback {
            correct,
            selected,
            correct_answer: question.correct_answer,
        };

        let current_index = self.current_index + 1;
        let next = Self {
            quiz: Arc::clone(&self.quiz),
            current_index,
            score: self.score + usize::from(correct),
            completed: current_index == self.quiz.len(),
        };

        debug!(
            question = current_index,
            correct,
            score = next.score,
            completed = next.completed,
            "Answer submitted"
        );
        if next.completed {
            info!(score = next.score, total = next.total(), "Quiz completed");
        }

        Ok((next, feedback))
    }

    /// Final results; `None` until every question has been answered.
    pub fn report(&self) -> Option<QuizReport> {
        self.completed.then(|| QuizReport::new(self.score, self.total()))
    }

    /// Discard the session. A new quiz is needed to start again.
    pub fn reset(self) {
        debug!(current_index = self.current_index, score = self.score, "Session reset");
    }
}

/// Qualitative performance tier derived from the final percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Excellent,
    Great,
    NeedsImprovement,
    ReviewNeeded,
}

impl Band {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 90.0 {
            Self::Excellent
        } else if percentage >= 70.0 {
            Self::Great
        } else if percentage >= 50.0 {
            Self::NeedsImprovement
        } else {
            Self::ReviewNeeded
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Great => "great",
            Self::NeedsImprovement => "needs improvement",
            Self::ReviewNeeded => "review needed",
        }
    }

    /// Encouragement shown to the student alongside the score.
    pub fn message(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent work! You've mastered this topic!",
            Self::Great => "Great job! You have a good understanding of the material.",
            Self::NeedsImprovement => "Good effort! There's room for improvement. Keep studying!",
            Self::ReviewNeeded => "You might need to review this topic more. Don't give up!",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuizReport {
    pub score: usize,
    pub total: usize,
    pub percentage: f64,
    pub band: Band,
}

impl QuizReport {
    pub fn new(score: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0.0
        } else {
            score as f64 / total as f64 * 100.0
        };
        Self {
            score,
            total,
            percentage,
            band: Band::from_percentage(percentage),
        }
    }
}

impl fmt::Display for QuizReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Your score: {}/{}", self.score, self.total)?;
        writeln!(f, "Percentage: {:.2}%", self.percentage)?;
        write!(f, "{}", self.band.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn quiz() -> Quiz {
        let questions = (0..15)
            .map(|i| Question {
                text: format!("Question {i}"),
                options: OptionLetter::ALL
                    .iter()
                    .map(|l| (*l, format!("option {l}")))
                    .collect::<BTreeMap<_, _>>(),
                correct_answer: OptionLetter::ALL[i % 4],
            })
            .collect();
        Quiz::new(questions).unwrap()
    }

    fn answer_all(mut session: QuizSession, correct_count: usize) -> QuizSession {
        for i in 0..15 {
            let right = session.current_question().unwrap().correct_answer;
            let pick = if i < correct_count {
                right
            } else {
                OptionLetter::ALL[(i + 1) % 4]
            };
            session = session.submit_answer(pick).unwrap().0;
        }
        session
    }

    #[test]
    fn fresh_session_is_active() {
        let session = QuizSession::new(quiz());
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
        assert!(!session.is_completed());
        assert!(session.report().is_none());
    }

    #[test]
    fn all_correct_answers_complete_with_full_score() {
        let session = answer_all(QuizSession::new(quiz()), 15);
        assert_eq!(session.score(), 15);
        assert_eq!(session.current_index(), 15);
        assert!(session.is_completed());
        assert_eq!(session.state(), SessionState::Completed);
        assert!(session.current_question().is_none());
    }

    #[test]
    fn wrong_answer_still_advances() {
        let session = QuizSession::new(quiz());
        let (next, feedback) = session.submit_answer(OptionLetter::B).unwrap();

        assert!(!feedback.correct);
        assert_eq!(feedback.correct_answer, OptionLetter::A);
        assert_eq!(next.current_index(), 1);
        assert_eq!(next.score(), 0);
        // the original value is untouched
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn answering_completed_session_fails() {
        let session = answer_all(QuizSession::new(quiz()), 3);
        let err = session.submit_answer(OptionLetter::A).unwrap_err();
        assert!(matches!(err, QuizError::InvalidTransition(_)));
        assert_eq!(session.score(), 3);
    }

    #[test]
    fn bands_follow_percentage() {
        let cases = [
            (14, Band::Excellent),
            (11, Band::Great),
            (8, Band::NeedsImprovement),
            (5, Band::ReviewNeeded),
        ];
        for (score, band) in cases {
            let report = answer_all(QuizSession::new(quiz()), score).report().unwrap();
            assert_eq!(report.score, score);
            assert_eq!(report.total, 15);
            assert_eq!(report.band, band, "score {score}");
        }
    }

    #[test]
    fn band_boundaries_are_inclusive() {
        assert_eq!(Band::from_percentage(90.0), Band::Excellent);
        assert_eq!(Band::from_percentage(70.0), Band::Great);
        assert_eq!(Band::from_percentage(50.0), Band::NeedsImprovement);
        assert_eq!(Band::from_percentage(49.99), Band::ReviewNeeded);
        assert_eq!(Band::NeedsImprovement.to_string(), "needs improvement");
    }

    #[test]
    fn report_formats_two_decimals() {
        let text = QuizReport::new(14, 15).to_string();
        assert!(text.contains("Your score: 14/15"));
        assert!(text.contains("Percentage: 93.33%"));
        assert!(text.contains("mastered"));
    }

    #[test]
    fn session_json_roundtrip_checks_invariants() {
        let (session, _) = QuizSession::new(quiz()).submit_answer(OptionLetter::A).unwrap();
        let json = serde_json::to_value(&session).unwrap();
        let restored: QuizSession = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(restored, session);

        let mut tampered = json;
        tampered["completed"] = serde_json::Value::Bool(true);
        assert!(serde_json::from_value::<QuizSession>(tampered).is_err());
    }
}
