//! Exposes an in-process mock of the Langflow API for use in integration tests.
//!
//! ```
//! use flowbench_test::server::{Endpoint, MockTarget};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!    let server = MockTarget::new().await;
//!    let url = server.url("/");
//!    // point a client at the URL, then inspect the requests...
//!    assert_eq!(server.hits(Endpoint::Login), 0);
//! }
//! ```
//!
//! The mock keeps API keys and flows in memory and behaves like the real service for the
//! endpoints flowbench uses. Every endpoint can be scripted to return a fixed response instead,
//! see [`MockTarget::respond`].

use std::collections::HashMap;
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::{Value, json};

/// The only username accepted by the mock's login endpoint.
pub const SUPERUSER: &str = "admin";

/// The password of [`SUPERUSER`].
pub const SUPERUSER_PASSWORD: &str = "secret";

/// The bearer token issued on successful login.
pub const ACCESS_TOKEN: &str = "tok123";

const BEARER: &str = "Bearer tok123";

/// An endpoint of the mock, used to script responses and inspect requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `POST /api/v1/login`
    Login,
    /// `GET /api/v1/api_key/`
    ListApiKeys,
    /// `POST /api/v1/api_key/`
    CreateApiKey,
    /// `POST /api/v1/flows/`
    CreateFlow,
    /// `POST /api/v1/run/{flow_id}?stream=false`
    RunFlow,
    /// `GET /health`
    Health,
}

#[derive(Debug, Default)]
struct Recorder {
    scripted: HashMap<Endpoint, (StatusCode, Value)>,
    hits: HashMap<Endpoint, usize>,
    bodies: HashMap<Endpoint, Vec<Value>>,
    run_queries: Vec<String>,
    api_keys: Vec<(String, String)>,
    flows: Vec<String>,
    mask_listed_keys: bool,
}

impl Recorder {
    /// Counts the request and returns the scripted response for the endpoint, if any.
    fn record(&mut self, endpoint: Endpoint, body: Value) -> Option<Response> {
        *self.hits.entry(endpoint).or_default() += 1;
        self.bodies.entry(endpoint).or_default().push(body);
        self.scripted
            .get(&endpoint)
            .map(|(status, body)| (*status, Json(body.clone())).into_response())
    }

    fn create_api_key(&mut self, name: &str) -> String {
        let secret = format!("sk-mock-{}", self.api_keys.len() + 1);
        self.api_keys.push((name.to_owned(), secret.clone()));
        secret
    }
}

type Shared = Arc<Mutex<Recorder>>;

/// An in-process mock of the Langflow API for use in integration tests.
///
/// The server listens on a random available port on localhost and stops when dropped.
#[derive(Debug)]
pub struct MockTarget {
    handle: tokio::task::JoinHandle<()>,
    socket: SocketAddr,
    state: Shared,
}

impl MockTarget {
    /// Starts a new mock server on the current tokio runtime.
    pub async fn new() -> Self {
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let listener = TcpListener::bind(addr).unwrap();
        listener.set_nonblocking(true).unwrap();
        let socket = listener.local_addr().unwrap();

        let state = Shared::default();
        let router = routes().with_state(state.clone());

        let handle = tokio::spawn(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            handle,
            socket,
            state,
        }
    }

    /// Returns a full URL pointing to the given path.
    ///
    /// This URL uses `localhost` as hostname.
    pub fn url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("http://localhost:{}/{}", self.socket.port(), path)
    }

    /// Makes `endpoint` answer every subsequent request with `status` and a JSON `body`.
    ///
    /// Requests are still counted and recorded.
    pub fn respond(&self, endpoint: Endpoint, status: u16, body: Value) {
        let status = StatusCode::from_u16(status).unwrap();
        self.lock().scripted.insert(endpoint, (status, body));
    }

    /// Masks secrets in API key listings, like the real service does.
    pub fn mask_listed_keys(&self) {
        self.lock().mask_listed_keys = true;
    }

    /// Stores an API key as if it had been created earlier.
    pub fn seed_api_key(&self, name: &str, secret: &str) {
        self.lock()
            .api_keys
            .push((name.to_owned(), secret.to_owned()));
    }

    /// Stores a flow as if it had been created earlier and returns its identifier.
    pub fn seed_flow(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.lock().flows.push(id.clone());
        id
    }

    /// Returns the number of requests received by `endpoint`.
    pub fn hits(&self, endpoint: Endpoint) -> usize {
        self.lock().hits.get(&endpoint).copied().unwrap_or_default()
    }

    /// Returns the number of requests received by all endpoints.
    pub fn total_hits(&self) -> usize {
        self.lock().hits.values().sum()
    }

    /// Returns the request bodies received by `endpoint`, in order.
    ///
    /// Form bodies are converted to JSON objects.
    pub fn bodies(&self, endpoint: Endpoint) -> Vec<Value> {
        self.lock()
            .bodies
            .get(&endpoint)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the raw query strings of all flow run requests, in order.
    pub fn run_queries(&self) -> Vec<String> {
        self.lock().run_queries.clone()
    }

    /// Returns the names of all stored API keys, including seeded ones.
    pub fn api_key_names(&self) -> Vec<String> {
        self.lock()
            .api_keys
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorder> {
        self.state.lock().unwrap()
    }
}

impl Drop for MockTarget {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn routes() -> Router<Shared> {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/login", post(login))
        .route("/api/v1/api_key/", get(list_api_keys).post(create_api_key))
        .route("/api/v1/flows/", post(create_flow))
        .route("/api/v1/run/{flow_id}", post(run_flow))
}

fn is_authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(BEARER)
}

fn error(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

async fn health(State(state): State<Shared>) -> Response {
    let mut recorder = state.lock().unwrap();
    if let Some(response) = recorder.record(Endpoint::Health, Value::Null) {
        return response;
    }
    Json(json!({ "status": "ok" })).into_response()
}

async fn login(
    State(state): State<Shared>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let mut recorder = state.lock().unwrap();
    if let Some(response) = recorder.record(Endpoint::Login, json!(form)) {
        return response;
    }

    let field = |name: &str| form.get(name).map(String::as_str);
    if field("grant_type") != Some("password")
        || field("username") != Some(SUPERUSER)
        || field("password") != Some(SUPERUSER_PASSWORD)
    {
        return error(StatusCode::UNAUTHORIZED, "Incorrect username or password");
    }

    Json(json!({
        "access_token": ACCESS_TOKEN,
        "refresh_token": "refresh",
        "token_type": "bearer",
    }))
    .into_response()
}

async fn list_api_keys(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut recorder = state.lock().unwrap();
    if let Some(response) = recorder.record(Endpoint::ListApiKeys, Value::Null) {
        return response;
    }
    if !is_authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }

    let api_keys: Vec<_> = recorder
        .api_keys
        .iter()
        .map(|(name, secret)| {
            let secret = if recorder.mask_listed_keys {
                format!("{}{}", &secret[..secret.len().min(8)], "*".repeat(8))
            } else {
                secret.clone()
            };
            json!({ "name": name, "api_key": secret })
        })
        .collect();

    Json(json!({
        "total_count": api_keys.len(),
        "user_id": "00000000-0000-0000-0000-000000000001",
        "api_keys": api_keys,
    }))
    .into_response()
}

async fn create_api_key(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut recorder = state.lock().unwrap();
    if let Some(response) = recorder.record(Endpoint::CreateApiKey, body.clone()) {
        return response;
    }
    if !is_authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    let Some(name) = body.get("name").and_then(Value::as_str) else {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "field required: name");
    };

    let secret = recorder.create_api_key(name);
    Json(json!({ "name": name, "api_key": secret })).into_response()
}

async fn create_flow(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut recorder = state.lock().unwrap();
    if let Some(response) = recorder.record(Endpoint::CreateFlow, body.clone()) {
        return response;
    }
    if !is_authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    let Some(name) = body.get("name").and_then(Value::as_str) else {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "field required: name");
    };

    let id = uuid::Uuid::new_v4().to_string();
    recorder.flows.push(id.clone());
    (
        StatusCode::CREATED,
        Json(json!({ "id": id, "name": name, "data": body.get("data") })),
    )
        .into_response()
}

async fn run_flow(
    State(state): State<Shared>,
    Path(flow_id): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut recorder = state.lock().unwrap();
    let query = query.unwrap_or_default();
    recorder.run_queries.push(query.clone());
    if let Some(response) = recorder.record(Endpoint::RunFlow, body.clone()) {
        return response;
    }
    if !query.split('&').any(|pair| pair == "stream=false") {
        return error(StatusCode::BAD_REQUEST, "only non-streaming runs are supported");
    }

    let api_key = headers.get("x-api-key").and_then(|value| value.to_str().ok());
    let known_key = api_key.is_some_and(|key| recorder.api_keys.iter().any(|(_, s)| s == key));
    if !known_key {
        return error(StatusCode::FORBIDDEN, "Invalid or missing API key");
    }
    if !recorder.flows.contains(&flow_id) {
        return error(StatusCode::NOT_FOUND, "Flow not found");
    }

    let input = body.get("input_value").cloned().unwrap_or(Value::Null);
    Json(json!({
        "session_id": flow_id,
        "outputs": [{
            "inputs": { "input_value": input },
            "outputs": [{ "results": { "message": { "text": input } } }],
        }],
    }))
    .into_response()
}
