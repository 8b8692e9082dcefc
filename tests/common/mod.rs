//! In-process mock of the Studywat backend for integration tests
//!
//! Binds to `127.0.0.1:0`, keeps its data in a shared [`MockState`] and
//! records what the client sent so tests can assert on it.

#![allow(dead_code)]

use axum::body::{Body, Bytes};
use axum::extract::{Path, Query, RawQuery, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;

use studywat::api::{ApiClient, Backend};
use studywat::config::ApiConfig;
use studywat::session::storage::{DurableStorage, REFRESH_TOKEN_KEY, TOKEN_KEY, USER_KEY};
use studywat::session::{MemoryStorage, SessionHooks, SessionStore};

pub const GOOD_CREDENTIAL: &str = "good-credential";
pub const USER_ID: &str = "u1";

#[derive(Debug)]
pub struct MockState {
    /// The access token the backend currently accepts
    pub access: String,
    pub refresh: String,
    pub refresh_calls: usize,
    pub fail_refresh: bool,
    pub logout_calls: usize,
    /// Reject every program-list call with 401, even with a fresh token
    pub reject_lists: bool,
    /// Bearer tokens seen on program-list calls, in order
    pub list_auth: Vec<Option<String>>,
    pub lists: BTreeMap<String, Value>,
    pub next_list: usize,
    pub create_calls: usize,
    pub program_queries: Vec<String>,
    pub by_ids_requests: Vec<Vec<String>>,
    pub turn_requests: Vec<Value>,
    pub history: Vec<Value>,
    /// Hold history and batch-turn responses back this long
    pub reply_delay: Duration,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            access: "access-1".to_string(),
            refresh: "refresh-1".to_string(),
            refresh_calls: 0,
            fail_refresh: false,
            logout_calls: 0,
            reject_lists: false,
            list_auth: Vec::new(),
            lists: BTreeMap::new(),
            next_list: 1,
            create_calls: 0,
            program_queries: Vec::new(),
            by_ids_requests: Vec::new(),
            turn_requests: Vec::new(),
            history: Vec::new(),
            reply_delay: Duration::ZERO,
        }
    }
}

type Shared = Arc<Mutex<MockState>>;

pub struct MockBackend {
    pub addr: SocketAddr,
    state: Shared,
    handle: JoinHandle<()>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState::default()));
        let app = router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.url(),
            timeout_secs: 5,
        }
    }

    /// Session store and API wrappers over `storage`
    pub fn connect(&self, storage: Arc<MemoryStorage>) -> (Arc<SessionStore>, Backend) {
        self.connect_with_hooks(storage, Arc::new(SessionHooks::new()))
    }

    pub fn connect_with_hooks(
        &self,
        storage: Arc<MemoryStorage>,
        hooks: Arc<SessionHooks>,
    ) -> (Arc<SessionStore>, Backend) {
        let client = ApiClient::new(&self.api_config());
        let session = Arc::new(SessionStore::new(Backend::auth(&client), storage, hooks));
        let backend = Backend::new(&client, session.clone());
        (session, backend)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn user_json() -> Value {
    json!({"id": USER_ID, "name": "Aisha Rahman", "email": "aisha@example.com"})
}

/// Storage already holding a signed-in session with the given tokens
pub fn seeded_storage(access: &str, refresh: &str) -> Arc<MemoryStorage> {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .apply(&[
            (TOKEN_KEY, Some(access.to_string())),
            (REFRESH_TOKEN_KEY, Some(refresh.to_string())),
            (USER_KEY, Some(user_json().to_string())),
        ])
        .unwrap();
    storage
}

pub fn program_fixtures() -> Vec<Value> {
    vec![
        json!({
            "_id": "p1",
            "program_name": "Bachelor of Computer Science",
            "field_of_study": "computer_science",
            "program_duration_years": 3,
            "fees": {"registration_fee": 1000, "resource_fee": "500", "tuition_fee": 20000},
            "institution": {"_id": "i1", "institution_name": "Zeta University",
                            "institution_country": "Malaysia", "institution_type": "Public",
                            "world_rank": 120}
        }),
        json!({
            "_id": "p2",
            "program_name": "Bachelor of Laws",
            "field_of_study": "law",
            "intakes": ["Mar"],
            "institution": {"_id": "i2", "institution_name": "Alpha College",
                            "institution_country": "Japan", "institution_type": "Private"}
        }),
        json!({
            "id": "p3",
            "program_name": "Doctor of Medicine",
            "field_of_study": "medicine",
            "institution": {"id": "i3", "institution_name": "Mid Institute",
                            "institution_country": "Malaysia", "institution_type": "Public"}
        }),
    ]
}

fn program_id(program: &Value) -> String {
    program
        .get("_id")
        .or_else(|| program.get("id"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Could not validate credentials"})),
    )
        .into_response()
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"detail": format!("{} not found", what)})),
    )
        .into_response()
}

fn is_authorized(state: &MockState, headers: &HeaderMap) -> bool {
    bearer(headers).as_deref() == Some(state.access.as_str())
}

fn auth_response(state: &MockState) -> Value {
    json!({
        "access_token": state.access,
        "refresh_token": state.refresh,
        "user": user_json(),
    })
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/auth/google", post(google))
        .route("/auth/refresh", post(refresh))
        .route("/auth/me", get(me))
        .route("/auth/logout", post(logout))
        .route("/api/v1/programs/", get(programs))
        .route("/api/v1/programs/by-ids", post(programs_by_ids))
        .route("/api/v1/institutions/countries/", get(countries))
        .route("/api/v1/institutions/names/", get(names))
        .route("/api/v1/program-lists", get(lists).post(create_list))
        .route(
            "/api/v1/program-lists/:id",
            get(get_list).put(update_list).delete(delete_list),
        )
        .route(
            "/api/v1/orchestrator/history",
            get(history).delete(clear_history),
        )
        .route("/api/v1/orchestrator/turn", post(turn))
        .route("/api/v1/orchestrator/stream-turn", post(stream_turn))
        .route("/api/v1/profile/traits", get(traits))
        .route("/api/v1/recommendations/:user_id", get(recommendations))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

async fn google(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let state = state.lock().unwrap();
    if body["credential"] != GOOD_CREDENTIAL {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Invalid Google credential"})),
        )
            .into_response();
    }
    Json(auth_response(&state)).into_response()
}

async fn refresh(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    state.refresh_calls += 1;
    if state.fail_refresh || body["refresh_token"] != state.refresh.as_str() {
        return unauthorized();
    }
    let n = state.refresh_calls + 1;
    state.access = format!("access-{}", n);
    state.refresh = format!("refresh-{}", n);
    Json(auth_response(&state)).into_response()
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if !is_authorized(&state, &headers) {
        return unauthorized();
    }
    Json(user_json()).into_response()
}

async fn logout(State(state): State<Shared>) -> Response {
    state.lock().unwrap().logout_calls += 1;
    Json(json!({"ok": true})).into_response()
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

async fn programs(State(state): State<Shared>, RawQuery(query): RawQuery) -> Response {
    let raw = query.unwrap_or_default();
    state.lock().unwrap().program_queries.push(raw.clone());

    let params: Vec<(String, String)> = url::form_urlencoded::parse(raw.as_bytes())
        .into_owned()
        .collect();
    let param = |key: &str| {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };
    let page: usize = param("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: usize = param("limit").and_then(|l| l.parse().ok()).unwrap_or(10);

    let mut items = program_fixtures();
    if let Some(country) = param("institution_country") {
        items.retain(|p| p["institution"]["institution_country"] == country.as_str());
    }
    let total = items.len();
    let items: Vec<Value> = items
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();
    Json(json!({"items": items, "total": total, "page": page, "limit": limit})).into_response()
}

async fn programs_by_ids(State(state): State<Shared>, Json(ids): Json<Vec<String>>) -> Response {
    state.lock().unwrap().by_ids_requests.push(ids.clone());
    let found: Vec<Value> = program_fixtures()
        .into_iter()
        .filter(|p| ids.contains(&program_id(p)))
        .collect();
    Json(found).into_response()
}

async fn countries() -> Response {
    Json(json!(["Malaysia", "", null, "Japan"])).into_response()
}

async fn names() -> Response {
    Json(json!(["Zeta University", "Alpha College", " ", "Mid Institute"])).into_response()
}

// ---------------------------------------------------------------------------
// Program lists
// ---------------------------------------------------------------------------

/// Record the token and decide whether a list call may proceed
fn list_guard(state: &mut MockState, headers: &HeaderMap) -> bool {
    state.list_auth.push(bearer(headers));
    !state.reject_lists && is_authorized(state, headers)
}

async fn lists(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut state = state.lock().unwrap();
    if !list_guard(&mut state, &headers) {
        return unauthorized();
    }
    let user_id = params.get("user_id").cloned().unwrap_or_default();
    let found: Vec<Value> = state
        .lists
        .values()
        .filter(|l| l["user_id"] == user_id.as_str())
        .cloned()
        .collect();
    Json(found).into_response()
}

async fn get_list(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.lock().unwrap();
    if !list_guard(&mut state, &headers) {
        return unauthorized();
    }
    match state.lists.get(&id) {
        Some(list) => Json(list.clone()).into_response(),
        None => not_found("Program list"),
    }
}

async fn create_list(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if !list_guard(&mut state, &headers) {
        return unauthorized();
    }
    state.create_calls += 1;
    let id = format!("l{}", state.next_list);
    state.next_list += 1;
    // Stored with the legacy identity spelling on purpose
    let list = json!({
        "_id": id,
        "title": body["title"],
        "emoji": body["emoji"],
        "user_id": body["user_id"],
        "program_ids": body["program_ids"],
        "created_at": "2025-01-15T10:30:00",
        "updated_at": "2025-01-15T10:30:00",
    });
    state.lists.insert(id, list.clone());
    (StatusCode::CREATED, Json(list)).into_response()
}

async fn update_list(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if !list_guard(&mut state, &headers) {
        return unauthorized();
    }
    let Some(list) = state.lists.get_mut(&id) else {
        return not_found("Program list");
    };
    for key in ["title", "emoji", "program_ids"] {
        if let Some(value) = body.get(key) {
            list[key] = value.clone();
        }
    }
    list["updated_at"] = json!("2025-02-01T08:00:00Z");
    Json(list.clone()).into_response()
}

async fn delete_list(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.lock().unwrap();
    if !list_guard(&mut state, &headers) {
        return unauthorized();
    }
    match state.lists.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found("Program list"),
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

async fn hold_reply(state: &Shared) {
    let delay = state.lock().unwrap().reply_delay;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

async fn history(State(state): State<Shared>, headers: HeaderMap) -> Response {
    hold_reply(&state).await;
    let state = state.lock().unwrap();
    if !is_authorized(&state, &headers) {
        return unauthorized();
    }
    Json(json!({"conversations": state.history})).into_response()
}

async fn clear_history(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().unwrap();
    if !is_authorized(&state, &headers) {
        return unauthorized();
    }
    state.history.clear();
    Json(json!({"message": "History cleared"})).into_response()
}

async fn turn(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    hold_reply(&state).await;
    let mut state = state.lock().unwrap();
    if !is_authorized(&state, &headers) {
        return unauthorized();
    }
    state.turn_requests.push(body);
    Json(json!({
        "next_turn": "What are your strongest subjects?",
        "alert": [{"type": "profile_update", "message": "Profile updated"}],
    }))
    .into_response()
}

async fn stream_turn(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    {
        let mut state = state.lock().unwrap();
        if !is_authorized(&state, &headers) {
            return unauthorized();
        }
        state.turn_requests.push(body);
    }

    // The header arrives in two pieces and "é" is split across chunks
    let reply = "Try the café ☕ near campus".as_bytes();
    let split = "Try the caf".len() + 1;
    let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
        Ok(Bytes::from_static(b"{\"alert\": [{\"type\": \"profile_")),
        Ok(Bytes::from_static(b"update\", \"message\": \"Profile updated\"}]}\n")),
        Ok(Bytes::copy_from_slice(&reply[..split])),
        Ok(Bytes::copy_from_slice(&reply[split..])),
    ];
    Response::builder()
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from_stream(futures::stream::iter(chunks)))
        .unwrap()
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

async fn traits(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = state.lock().unwrap();
    if !is_authorized(&state, &headers) {
        return unauthorized();
    }
    Json(json!([
        {"trait": "learning_style", "label": "Hands-on",
         "label_description": "Learns best by building things", "confidence": 0.8},
        {"trait": "goal", "label": "Industry job"}
    ]))
    .into_response()
}

async fn recommendations(Path(user_id): Path<String>) -> Response {
    if user_id != USER_ID {
        return not_found("Profile");
    }
    Json(json!({
        "recommendations": [
            {"course": "Data Science", "course_fit": 1, "matched_traits": ["goal"],
             "reason": "Strong analytical interest"},
            {"course": "Law", "course_fit": 3, "matched_traits": [], "reason": ""}
        ]
    }))
    .into_response()
}
