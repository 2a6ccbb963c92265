mod test_utils;

use std::time::Duration;

use student_quiz::clients::MockResponse;
use student_quiz::store::{load_session, save_session};
use student_quiz::{Band, OptionLetter, QuizError, QuizRequest, SessionState, SessionStore};
use test_utils::{answer_for, harness, quiz_text};

fn letter(c: char) -> OptionLetter {
    OptionLetter::from_char(c).unwrap()
}

#[tokio::test]
async fn document_quiz_end_to_end() {
    let h = harness(vec![MockResponse::Success(quiz_text(15))]);
    let document = "Mitochondria are the powerhouse of the cell. ".repeat(200);
    let request = QuizRequest::from_document(document.clone()).unwrap();

    let mut session = h.generator.start_session(&request).await.unwrap();

    let prompt = &h.handle.prompts()[0];
    assert!(prompt.contains(&document[..1000]));
    assert!(!prompt.contains(&document[..1001]));

    for n in 1..=15 {
        assert_eq!(session.state(), SessionState::Active);
        let (next, feedback) = session.submit_answer(letter(answer_for(n))).unwrap();
        assert!(feedback.correct);
        session = next;
    }

    assert_eq!(session.score(), 15);
    assert_eq!(session.current_index(), 15);
    assert!(session.is_completed());
    assert_eq!(session.report().unwrap().band, Band::Excellent);
}

#[tokio::test]
async fn rate_limited_twice_then_playable() {
    let h = harness(vec![
        MockResponse::RateLimited,
        MockResponse::RateLimited,
        MockResponse::Success(quiz_text(15)),
    ]);
    let request = QuizRequest::from_subject("cell biology").unwrap();

    let quiz = h.generator.generate_quiz(&request).await.unwrap();

    assert_eq!(quiz.len(), 15);
    assert_eq!(h.handle.call_count(), 3);
    assert_eq!(h.backoff.delays(), vec![Duration::from_secs(5), Duration::from_secs(5)]);
}

#[tokio::test]
async fn rate_limited_every_time_is_exhausted() {
    let h = harness(vec![MockResponse::RateLimited; 5]);
    let request = QuizRequest::from_subject("cell biology").unwrap();

    let err = h.generator.generate_quiz(&request).await.unwrap_err();

    assert!(matches!(err, QuizError::GenerationExhausted { attempts: 3 }));
    assert_eq!(h.handle.call_count(), 3);
    assert_eq!(h.handle.remaining(), 2);
}

#[tokio::test]
async fn fatal_error_is_immediate() {
    let h = harness(vec![MockResponse::Error("permission denied".into()), MockResponse::Success(quiz_text(15))]);
    let request = QuizRequest::from_subject("cell biology").unwrap();

    let err = h.generator.generate_quiz(&request).await.unwrap_err();

    assert!(matches!(err, QuizError::Generation(_)));
    assert!(err.to_string().contains("permission denied"));
    assert_eq!(h.handle.call_count(), 1);
    assert!(h.backoff.delays().is_empty());
}

#[tokio::test]
async fn short_quiz_never_becomes_a_session() {
    let h = harness(vec![MockResponse::Success(quiz_text(12))]);
    let request = QuizRequest::from_subject("geology").unwrap();

    let err = h.generator.start_session(&request).await.unwrap_err();
    assert!(matches!(err, QuizError::ParseRejected(_)));
}

#[tokio::test]
async fn store_drives_a_session_per_student() {
    let h = harness(vec![MockResponse::Success(quiz_text(15)), MockResponse::Success(quiz_text(15))]);
    let request = QuizRequest::from_subject("algebra").unwrap();
    let store = SessionStore::new();

    store.start("ana", h.generator.generate_quiz(&request).await.unwrap());
    store.start("ben", h.generator.generate_quiz(&request).await.unwrap());

    // ana gets 11 of 15 right
    for n in 1..=15 {
        let pick = if n <= 11 { answer_for(n) } else { answer_for(n + 1) };
        store.submit("ana", letter(pick)).unwrap();
    }

    let ana = store.get("ana").unwrap();
    assert_eq!(ana.score(), 11);
    assert_eq!(ana.report().unwrap().band, Band::Great);
    assert!(matches!(store.submit("ana", OptionLetter::A), Err(QuizError::InvalidTransition(_))));

    assert_eq!(store.get("ben").unwrap().current_index(), 0);

    assert!(store.reset("ana"));
    assert!(matches!(store.submit("ana", OptionLetter::A), Err(QuizError::NoActiveSession(_))));
}

#[tokio::test]
async fn session_survives_save_and_resume() {
    let h = harness(vec![MockResponse::Success(quiz_text(15))]);
    let request = QuizRequest::from_subject("poetry").unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let session = h.generator.start_session(&request).await.unwrap();
    let (session, _) = session.submit_answer(letter(answer_for(1))).unwrap();
    save_session(&path, &session).unwrap();

    let resumed = load_session(&path).unwrap();
    assert_eq!(resumed.current_index(), 1);
    assert_eq!(resumed.score(), 1);
    assert_eq!(resumed.current_question().unwrap().correct_answer, letter(answer_for(2)));
}
