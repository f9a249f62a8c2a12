//! HTTP routes exposing the location search to the trip-creation front end.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::service::LocationSearch;
use crate::types::Location;

/// Application state shared across all requests
#[derive(Clone)]
struct AppState {
    search: Arc<LocationSearch>,
    metrics: Arc<Metrics>,
}

/// Server metrics
struct Metrics {
    total_requests: AtomicU64,
    requests_in_flight: AtomicU64,
    failed_lookups: AtomicU64,
    start_time: Instant,
}

/// RAII guard for tracking in-flight requests
struct RequestGuard<'a>(&'a AtomicU64);

impl<'a> RequestGuard<'a> {
    fn enter(counter: &'a AtomicU64) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self(counter)
    }
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Build the Axum application with routes and middleware
pub fn build_app(search: Arc<LocationSearch>) -> Router {
    let metrics = Arc::new(Metrics {
        total_requests: AtomicU64::new(0),
        requests_in_flight: AtomicU64::new(0),
        failed_lookups: AtomicU64::new(0),
        start_time: Instant::now(),
    });

    let state = AppState { search, metrics };

    Router::new()
        .route("/health", get(health_check))
        .route("/api/locations", get(search_locations))
        .route("/api/metrics", get(get_metrics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// Autocomplete suggestions for `q`.
///
/// Always answers 200: a failed lookup looks exactly like "no matches" and is
/// only visible through `failed_lookups` in the metrics.
async fn search_locations(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    state.metrics.total_requests.fetch_add(1, Ordering::Relaxed);
    let _guard = RequestGuard::enter(&state.metrics.requests_in_flight);

    let lookup = state.search.lookup(&params.q).await;
    if lookup.error().is_some() {
        state.metrics.failed_lookups.fetch_add(1, Ordering::Relaxed);
    }

    let data = lookup.into_locations();
    tracing::info!(q = %params.q, results = data.len(), "location search");

    Json(SearchResponse {
        success: true,
        data,
    })
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Serialize)]
struct SearchResponse {
    success: bool,
    data: Vec<Location>,
}

async fn get_metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        total_requests: state.metrics.total_requests.load(Ordering::Relaxed),
        requests_in_flight: state.metrics.requests_in_flight.load(Ordering::Relaxed),
        failed_lookups: state.metrics.failed_lookups.load(Ordering::Relaxed),
        cache_entries: state.search.cache().len().await,
        uptime_seconds: state.metrics.start_time.elapsed().as_secs(),
    })
}

#[derive(Serialize)]
struct MetricsResponse {
    total_requests: u64,
    requests_in_flight: u64,
    failed_lookups: u64,
    cache_entries: usize,
    uptime_seconds: u64,
}
