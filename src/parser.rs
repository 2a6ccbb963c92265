//! Line-oriented parser turning generated quiz text into a [`Quiz`].
//!
//! The scan is stateful: a question-start line finalizes the record in
//! progress, option and answer lines fill the current record, and anything
//! seen before the first question is ignored. Validation happens once, over
//! the whole sequence, so a single malformed question rejects the quiz.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::ParseError;
use crate::prompt::QUESTION_COUNT;

const ANSWER_MARKER: &str = "Correct Answer:";
const QUESTION_MARKER: &str = "Question:";

/// One of the four lettered options of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    pub const ALL: [OptionLetter; 4] = [Self::A, Self::B, Self::C, Self::D];

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for OptionLetter {
    type Err = String;

    /// Accepts `B`, `b`, `B)`, `B.` and `B) option text`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let letter = chars
            .next()
            .and_then(Self::from_char)
            .ok_or_else(|| format!("'{s}' is not one of A, B, C, D"))?;
        match chars.next() {
            None | Some(')') | Some('.') | Some(' ') => Ok(letter),
            Some(_) => Err(format!("'{s}' is not one of A, B, C, D")),
        }
    }
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Question {
    pub text: String,
    pub options: BTreeMap<OptionLetter, String>,
    pub correct_answer: OptionLetter,
}

impl Question {
    pub fn option(&self, letter: OptionLetter) -> Option<&str> {
        self.options.get(&letter).map(String::as_str)
    }

    fn validate(&self, number: usize) -> Result<(), ParseError> {
        if self.options.len() != OptionLetter::ALL.len() {
            return Err(ParseError::MalformedQuestion {
                number,
                reason: format!("expected 4 options, found {}", self.options.len()),
            });
        }
        if !self.options.contains_key(&self.correct_answer) {
            return Err(ParseError::MalformedQuestion {
                number,
                reason: format!("correct answer {} is not among the options", self.correct_answer),
            });
        }
        Ok(())
    }
}

/// An immutable, validated sequence of exactly [`QUESTION_COUNT`] questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "Vec<Question>", into = "Vec<Question>")]
pub struct Quiz {
    questions: Vec<Question>,
}

impl Quiz {
    pub fn new(questions: Vec<Question>) -> Result<Self, ParseError> {
        if questions.len() != QUESTION_COUNT {
            return Err(ParseError::WrongQuestionCount {
                expected: QUESTION_COUNT,
                found: questions.len(),
            });
        }
        for (idx, question) in questions.iter().enumerate() {
            question.validate(idx + 1)?;
        }
        Ok(Self { questions })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl TryFrom<Vec<Question>> for Quiz {
    type Error = ParseError;

    fn try_from(questions: Vec<Question>) -> Result<Self, Self::Error> {
        Self::new(questions)
    }
}

impl From<Quiz> for Vec<Question> {
    fn from(quiz: Quiz) -> Self {
        quiz.questions
    }
}

/// Record being filled while scanning.
#[derive(Debug, Default)]
struct PendingQuestion {
    text: String,
    options: BTreeMap<OptionLetter, String>,
    answer: Option<String>,
}

impl PendingQuestion {
    fn finish(self, number: usize) -> Result<Question, ParseError> {
        let answer = self.answer.ok_or_else(|| ParseError::MalformedQuestion {
            number,
            reason: "missing correct answer line".to_string(),
        })?;
        let correct_answer = answer
            .parse::<OptionLetter>()
            .map_err(|reason| ParseError::MalformedQuestion { number, reason })?;
        Ok(Question {
            text: self.text,
            options: self.options,
            correct_answer,
        })
    }
}

/// Parse generated quiz text into a [`Quiz`], rejecting anything that does not
/// yield exactly [`QUESTION_COUNT`] well-formed questions.
#[instrument(target = "student_quiz::parser", skip(text), fields(text_len = text.len()))]
pub fn parse_quiz(text: &str) -> Result<Quiz, ParseError> {
    let records = scan(text);
    debug!(records = records.len(), "Scanned quiz text");

    if records.len() != QUESTION_COUNT {
        warn!(found = records.len(), expected = QUESTION_COUNT, "Rejecting quiz with wrong question count");
        return Err(ParseError::WrongQuestionCount {
            expected: QUESTION_COUNT,
            found: records.len(),
        });
    }

    let questions = records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| record.finish(idx + 1))
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|e| warn!(error = %e, "Rejecting malformed quiz"))?;

    Quiz::new(questions)
}

fn scan(text: &str) -> Vec<PendingQuestion> {
    let mut records = Vec::new();
    let mut current: Option<PendingQuestion> = None;

    for line in text.lines().map(str::trim) {
        if let Some(question_text) = question_start(line) {
            if let Some(done) = current.take() {
                records.push(done);
            }
            current = Some(PendingQuestion {
                text: question_text.to_string(),
                ..Default::default()
            });
            continue;
        }

        let Some(record) = current.as_mut() else {
            continue;
        };

        if let Some((letter, option_text)) = option_line(line) {
            record.options.insert(letter, option_text.to_string());
        } else if let Some(answer) = line.strip_prefix(ANSWER_MARKER) {
            record.answer = Some(answer.trim().to_string());
        }
    }

    if let Some(done) = current {
        records.push(done);
    }
    records
}

/// `Q1. text`, `Q12) text`, `Q3: text` or `Question: text`.
fn question_start(line: &str) -> Option<&str> {
    if let Some(rest) = line.strip_prefix(QUESTION_MARKER) {
        return Some(rest.trim());
    }
    let rest = line.strip_prefix('Q')?;
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let rest = &rest[digits..];
    let rest = rest
        .strip_prefix('.')
        .or_else(|| rest.strip_prefix(')'))
        .or_else(|| rest.strip_prefix(':'))?;
    Some(rest.trim())
}

fn option_line(line: &str) -> Option<(OptionLetter, &str)> {
    let mut chars = line.chars();
    let first = chars.next()?;
    if !first.is_ascii_uppercase() {
        return None;
    }
    let letter = OptionLetter::from_char(first)?;
    let rest = chars.as_str().strip_prefix(')')?;
    Some((letter, rest.trim()))
}
