//! Integration tests for the advisor chat: streamed and batch turns, history

mod common;

use serde_json::json;
use std::time::Duration;

use common::{seeded_storage, MockBackend};
use studywat::chat::{ChatProgress, ChatSession, HistoryState, SharedTranscript};
use studywat::config::ChatMode;
use studywat::ApiError;

async fn chat(mock: &MockBackend, mode: ChatMode) -> ChatSession {
    let (_session, backend) = mock.connect(seeded_storage("access-1", "refresh-1"));
    ChatSession::new(backend.orchestrator, SharedTranscript::new(), mode)
}

#[tokio::test]
async fn test_streamed_turn_reassembles_split_utf8() {
    let mock = MockBackend::start().await;
    let chat = chat(&mock, ChatMode::Stream).await;

    let mut deltas = String::new();
    let mut alerts = Vec::new();
    let reply = chat
        .send("Where should I study?", |progress| match progress {
            ChatProgress::Delta(text) => deltas.push_str(&text),
            ChatProgress::Alert(found) => alerts.extend(found),
            ChatProgress::Sent => {}
        })
        .await
        .unwrap();

    assert_eq!(reply, "Try the café ☕ near campus");
    assert_eq!(deltas, reply);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, "profile_update");

    let messages = chat.transcript().messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].is_user);
    assert_eq!(messages[1].text, reply);
    assert_eq!(messages[1].alert, alerts);
    assert!(!chat.transcript().is_pending());
}

#[tokio::test]
async fn test_turn_sends_prior_history_only() {
    let mock = MockBackend::start().await;
    let chat = chat(&mock, ChatMode::Stream).await;

    chat.send("First question", |_| {}).await.unwrap();
    chat.send("Second question", |_| {}).await.unwrap();

    let requests = mock.state().turn_requests.clone();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0]["message"], "First question");
    assert_eq!(requests[0]["conversation_history"], json!([]));
    assert_eq!(
        requests[1]["conversation_history"],
        json!([
            {"role": "user", "content": "First question"},
            {"role": "assistant", "content": "Try the café ☕ near campus"},
        ])
    );
}

#[tokio::test]
async fn test_batch_turn() {
    let mock = MockBackend::start().await;
    let chat = chat(&mock, ChatMode::Batch).await;

    let reply = chat.send("Hello", |_| {}).await.unwrap();

    assert_eq!(reply, "What are your strongest subjects?");
    let messages = chat.transcript().messages();
    assert_eq!(messages[1].alert[0].message, "Profile updated");
}

#[tokio::test]
async fn test_blank_message_is_not_sent() {
    let mock = MockBackend::start().await;
    let chat = chat(&mock, ChatMode::Stream).await;

    assert!(chat.send("   ", |_| {}).await.is_err());

    assert!(chat.transcript().is_empty());
    assert!(mock.state().turn_requests.is_empty());
}

#[tokio::test]
async fn test_history_loads_once_and_maps_roles() {
    let mock = MockBackend::start().await;
    mock.state().history = vec![
        json!({"role": "user", "content": "Hi", "timestamp": "2025-01-15T10:30:00"}),
        json!({"role": "assistant", "content": "Hello! What would you like to study?",
               "alert": [{"type": "profile_update", "message": "Saved"}]}),
    ];
    let chat = chat(&mock, ChatMode::Stream).await;

    assert!(chat.load_history().await.unwrap());
    // Cached: no second fetch
    assert!(!chat.load_history().await.unwrap());

    let messages = chat.transcript().messages();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].is_user);
    assert!(!messages[1].is_user);
    assert_eq!(messages[1].alert[0].message, "Saved");
    assert_eq!(chat.transcript().history_state(), HistoryState::Loaded);
}

#[tokio::test]
async fn test_clear_history() {
    let mock = MockBackend::start().await;
    mock.state().history = vec![json!({"role": "user", "content": "Hi"})];
    let chat = chat(&mock, ChatMode::Stream).await;
    chat.load_history().await.unwrap();

    chat.clear_history().await.unwrap();

    assert!(chat.transcript().is_empty());
    assert!(mock.state().history.is_empty());
}

/// Let a request reach the backend, then end the session while it is held
async fn logout_while_in_flight(mock: &MockBackend, chat: &ChatSession) {
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(mock.state().reply_delay > Duration::ZERO);
    chat.transcript().clear();
}

#[tokio::test]
async fn test_history_finishing_after_logout_is_discarded() {
    let mock = MockBackend::start().await;
    mock.state().history = vec![json!({"role": "user", "content": "Previous user's question"})];
    mock.state().reply_delay = Duration::from_millis(400);
    let chat = chat(&mock, ChatMode::Stream).await;

    let (loaded, _) = tokio::join!(chat.load_history(), logout_while_in_flight(&mock, &chat));
    assert!(loaded.unwrap());

    assert!(chat.transcript().is_empty());
    assert_eq!(chat.transcript().history_state(), HistoryState::NotLoaded);
    // The next session fetches its own history
    mock.state().reply_delay = Duration::ZERO;
    mock.state().history.clear();
    assert!(chat.load_history().await.unwrap());
}

#[tokio::test]
async fn test_batch_reply_after_logout_is_discarded() {
    let mock = MockBackend::start().await;
    mock.state().reply_delay = Duration::from_millis(400);
    let chat = chat(&mock, ChatMode::Batch).await;

    let (reply, _) = tokio::join!(
        chat.send("Where should I study?", |_| {}),
        logout_while_in_flight(&mock, &chat)
    );

    assert!(matches!(reply, Err(ApiError::Unauthorized(_))));
    assert!(chat.transcript().is_empty());
    assert!(!chat.transcript().is_pending());
}
