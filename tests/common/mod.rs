//! Fake localities endpoint for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    routing::get,
};
use tokio::net::TcpListener;

pub const SEARCH_PATH: &str = "/locations/v1/localities/search";

pub const LAUSANNE: &str = r#"{"localities":[
    {"zip":"1000","name":"Lausanne","canton":"VD"},
    {"zip":"","name":"X"},
    {"zip":"1003","name":"","canton":"VD"},
    {"zip":"1004","name":"Lausanne","canton":"VD"}
]}"#;

/// What the fake endpoint saw for one request
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub params: HashMap<String, String>,
    pub accept: Option<String>,
    pub accept_language: Option<String>,
}

#[derive(Clone)]
struct FakeState {
    status: StatusCode,
    body: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct FakeProvider {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeProvider {
    /// Serve `body` with `status` for every request on an ephemeral port
    pub async fn start(status: StatusCode, body: &str) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            status,
            body: body.to_string(),
            requests: requests.clone(),
        };

        let app = Router::new()
            .route(SEARCH_PATH, get(localities))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, requests }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}{}", self.addr, SEARCH_PATH)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn localities(
    State(state): State<FakeState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        params,
        accept: header_value(header::ACCEPT),
        accept_language: header_value(header::ACCEPT_LANGUAGE),
    });

    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
}
