//! End-to-end tests driving the app service the way the terminal UI does:
//! commands in, background results folded back in from the event channel

mod common;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use common::{seeded_storage, MockBackend, GOOD_CREDENTIAL, USER_ID};
use studywat::app::{AppEvent, AppService, AppState, Command, Route};
use studywat::catalog::CatalogQuery;
use studywat::chat::HistoryState;
use studywat::config::Config;
use studywat::profile::{ProfileLoader, Section};
use studywat::session::MemoryStorage;

fn service(
    mock: &MockBackend,
    storage: Arc<MemoryStorage>,
    route: Route,
) -> (AppService, mpsc::UnboundedReceiver<AppEvent>) {
    let mut config = Config::default();
    config.api = mock.api_config();
    let (session, backend) = mock.connect(storage);
    let (tx, rx) = mpsc::unbounded_channel();
    let service = AppService::new(config, session, backend, route, CatalogQuery::default(), tx);
    (service, rx)
}

/// Feed events into the service until `done` holds
async fn pump(
    service: &mut AppService,
    rx: &mut mpsc::UnboundedReceiver<AppEvent>,
    done: impl Fn(&AppState) -> bool,
) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !done(service.state()) {
        let event = tokio::time::timeout_at(deadline, rx.recv())
            .await
            .expect("timed out waiting for the app to settle")
            .expect("event channel closed");
        service.handle_event(event);
    }
}

fn type_text(service: &mut AppService, text: &str) {
    for c in text.chars() {
        service.handle_command(Command::InsertChar(c));
    }
}

#[tokio::test]
async fn test_restored_session_opens_catalog() {
    let mock = MockBackend::start().await;
    let (mut service, mut rx) = service(&mock, seeded_storage("access-1", "refresh-1"), Route::Catalog);

    service.start();
    pump(&mut service, &mut rx, |s| {
        s.signed_in() && s.catalog.total() == 3 && s.filter_options.loaded
    })
    .await;

    let state = service.state();
    assert_eq!(state.route, Route::Catalog);
    assert!(!state.restoring);
    assert_eq!(state.filter_options.countries, vec!["Malaysia", "Japan"]);
}

#[tokio::test]
async fn test_sign_in_from_login_screen() {
    let mock = MockBackend::start().await;
    let (mut service, mut rx) = service(&mock, Arc::new(MemoryStorage::new()), Route::Chat);

    service.start();
    pump(&mut service, &mut rx, |s| !s.restoring).await;
    assert_eq!(service.state().route, Route::Login);

    type_text(&mut service, GOOD_CREDENTIAL);
    service.handle_command(Command::Submit);
    pump(&mut service, &mut rx, |s| s.signed_in()).await;

    // Lands on the route asked for before signing in
    assert_eq!(service.state().route, Route::Chat);
    assert!(service.state().input.is_empty());
}

#[tokio::test]
async fn test_bad_credential_shows_error() {
    let mock = MockBackend::start().await;
    let (mut service, mut rx) = service(&mock, Arc::new(MemoryStorage::new()), Route::Catalog);

    service.start();
    pump(&mut service, &mut rx, |s| !s.restoring).await;
    type_text(&mut service, "forged");
    service.handle_command(Command::Submit);
    pump(&mut service, &mut rx, |s| !s.login_pending).await;

    assert!(!service.state().signed_in());
    assert!(service.state().login_error.is_some());
    assert_eq!(service.state().route, Route::Login);
}

#[tokio::test]
async fn test_chat_turn_through_the_service() {
    let mock = MockBackend::start().await;
    let (mut service, mut rx) = service(&mock, seeded_storage("access-1", "refresh-1"), Route::Chat);

    service.start();
    pump(&mut service, &mut rx, |s| {
        s.route == Route::Chat && s.transcript.history_state() == HistoryState::Loaded
    })
    .await;

    type_text(&mut service, "Where should I study?");
    service.handle_command(Command::Submit);
    pump(&mut service, &mut rx, |s| {
        s.transcript.len() == 2 && !s.transcript.is_pending()
    })
    .await;

    let messages = service.state().transcript.messages();
    assert_eq!(messages[1].text, "Try the café ☕ near campus");
    assert!(service.state().input.is_empty());
}

#[tokio::test]
async fn test_logout_returns_to_login() {
    let mock = MockBackend::start().await;
    let storage = seeded_storage("access-1", "refresh-1");
    let (mut service, mut rx) = service(&mock, storage, Route::Catalog);

    service.start();
    pump(&mut service, &mut rx, |s| s.signed_in()).await;

    service.handle_command(Command::Logout);
    pump(&mut service, &mut rx, |s| !s.signed_in()).await;

    assert_eq!(service.state().route, Route::Login);
    assert_eq!(mock.state().logout_calls, 1);
}

#[tokio::test]
async fn test_profile_sections_load_independently() {
    let mock = MockBackend::start().await;
    let (_session, backend) = mock.connect(seeded_storage("access-1", "refresh-1"));
    let loader = ProfileLoader::new(backend.profile);

    let data = loader.load(USER_ID).await;
    let traits = data.traits.loaded().unwrap();
    assert_eq!(traits.len(), 2);
    assert_eq!(traits[0].confidence, Some(0.8));
    let recs = data.recommendations.loaded().unwrap();
    assert_eq!(recs.suggestions[0].fit, 1);
    assert_eq!(recs.suggestions[1].reason, None);

    // No profile for this user: only the suggestions fail
    let other = loader.load("nobody").await;
    assert!(other.traits.loaded().is_some());
    assert_eq!(
        other.recommendations,
        Section::Failed("Failed to load recommendations".to_string())
    );
}
