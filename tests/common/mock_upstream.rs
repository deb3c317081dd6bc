//! Mock of the upstream open-data API
//!
//! Serves scripted responses per district on an ephemeral port and records
//! every request it receives.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::Value;
use tokio::net::TcpListener;

/// Key used for requests without a district filter (district list lookup)
pub const DISTRICT_LIST_KEY: &str = "all-districts";

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockResponse {
    Json(Value),
    Status(u16),
}

/// A request as seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub params: HashMap<String, String>,
    pub api_key: Option<String>,
}

#[derive(Default)]
struct MockState {
    /// Replies consumed in order; the last one repeats
    scripts: Mutex<HashMap<String, VecDeque<MockResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockState {
    fn next_response(&self, key: &str) -> MockResponse {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(key) {
            Some(script) if script.len() > 1 => script.pop_front().unwrap(),
            Some(script) => script
                .front()
                .cloned()
                .unwrap_or(MockResponse::Status(404)),
            None => MockResponse::Status(404),
        }
    }
}

pub struct MockUpstream {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockUpstream {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/resource", get(handle))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/resource", addr),
            state,
        }
    }

    /// Script the replies for a district (or [`DISTRICT_LIST_KEY`])
    pub fn script(&self, key: &str, responses: Vec<MockResponse>) {
        self.state
            .scripts
            .lock()
            .unwrap()
            .insert(key.to_string(), responses.into());
    }

    /// Always reply with `{ "records": rows }` for a district
    pub fn serve_records(&self, key: &str, rows: Vec<Value>) {
        self.script(
            key,
            vec![MockResponse::Json(serde_json::json!({ "records": rows }))],
        );
    }

    /// Number of requests received for a district
    pub fn hits(&self, key: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| request_key(&r.params) == key)
            .count()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

fn request_key(params: &HashMap<String, String>) -> String {
    params
        .get("filters[district]")
        .cloned()
        .unwrap_or_else(|| DISTRICT_LIST_KEY.to_string())
}

async fn handle(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let key = request_key(&params);
    let api_key = headers
        .get("api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state
        .requests
        .lock()
        .unwrap()
        .push(RecordedRequest { params, api_key });

    match state.next_response(&key) {
        MockResponse::Json(body) => Json(body).into_response(),
        MockResponse::Status(code) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
    }
}
