//! Keeps sessions between interactions, in memory or as JSON files.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use schemars::{schema_for, Schema};
use tracing::{debug, info};

use crate::error::QuizError;
use crate::parser::{OptionLetter, Quiz};
use crate::session::{AnswerFeedback, QuizSession};

/// Sessions keyed by session id, one per student.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, QuizSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, QuizSession>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Start a session on `quiz`, replacing whatever `id` had before.
    pub fn start(&self, id: &str, quiz: Quiz) -> QuizSession {
        let session = QuizSession::new(quiz);
        if let Some(previous) = self.lock().insert(id.to_string(), session.clone()) {
            debug!(id, "Replaced existing session");
            previous.reset();
        }
        session
    }

    pub fn get(&self, id: &str) -> Option<QuizSession> {
        self.lock().get(id).cloned()
    }

    /// Answer the current question of `id`'s session.
    pub fn submit(&self, id: &str, answer: OptionLetter) -> Result<(QuizSession, AnswerFeedback), QuizError> {
        let mut sessions = self.lock();
        let session = sessions
            .get(id)
            .ok_or_else(|| QuizError::NoActiveSession(id.to_string()))?;
        let (next, feedback) = session.submit_answer(answer)?;
        sessions.insert(id.to_string(), next.clone());
        Ok((next, feedback))
    }

    /// Drop `id`'s session; returns whether there was one.
    pub fn reset(&self, id: &str) -> bool {
        match self.lock().remove(id) {
            Some(session) => {
                session.reset();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Write `session` as pretty JSON.
pub fn save_session(path: &Path, session: &QuizSession) -> Result<(), QuizError> {
    let json = serde_json::to_string_pretty(session)
        .map_err(|e| QuizError::Persistence(e.to_string()))?;
    std::fs::write(path, json)
        .map_err(|e| QuizError::Persistence(format!("{}: {e}", path.display())))?;
    info!(path = %path.display(), current_index = session.current_index(), "Session saved");
    Ok(())
}

/// Read a session written by [`save_session`], re-checking its invariants.
pub fn load_session(path: &Path) -> Result<QuizSession, QuizError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| QuizError::Persistence(format!("{}: {e}", path.display())))?;
    let session: QuizSession = serde_json::from_str(&json)
        .map_err(|e| QuizError::Persistence(format!("{}: {e}", path.display())))?;
    debug!(path = %path.display(), current_index = session.current_index(), "Session loaded");
    Ok(session)
}

/// JSON schema of the session file format.
pub fn session_schema() -> Schema {
    schema_for!(QuizSession)
}
