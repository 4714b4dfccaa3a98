use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use hyper::Server;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::common::types::{date_key, NormalizedAction};
use crate::completion::CompletionStore;
use crate::pipeline::ingestion::FeedIngestor;
use crate::pipeline::processing::date_parser::parse_csv_date;
use crate::visibility::{visible_actions, GateMode, ManualOverride, QueryOverride, VisibilityGate};

/// Shared handles for every request.
#[derive(Clone)]
pub struct AppState {
    pub ingestor: Arc<FeedIngestor>,
    pub sheet_url: Arc<str>,
    pub gate: Arc<VisibilityGate>,
    pub completions: Arc<CompletionStore>,
    pub metrics: Option<PrometheusHandle>,
}

/// The `env` query parameter of the page being rendered.
#[derive(Debug, Default, Deserialize)]
pub struct EnvQuery {
    pub env: Option<String>,
}

impl EnvQuery {
    fn query_override(&self) -> Option<QueryOverride> {
        QueryOverride::from_query_value(self.env.as_deref())
    }
}

#[derive(Serialize)]
struct ActionView<'a> {
    #[serde(flatten)]
    action: &'a NormalizedAction,
    date_key: String,
    completed: bool,
}

#[derive(Serialize)]
struct ActionsResponse<'a> {
    dev_mode: bool,
    actions: Vec<ActionView<'a>>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DevModeResponse {
    pub dev_mode: bool,
    pub toggle_available: bool,
    pub manual_override: ManualOverride,
    pub mode: GateMode,
}

impl DevModeResponse {
    fn from_gate(gate: &VisibilityGate, query: Option<QueryOverride>) -> Self {
        Self {
            dev_mode: gate.is_dev_mode(query),
            toggle_available: gate.toggle_available(),
            manual_override: gate.manual_override(),
            mode: gate.mode(),
        }
    }
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "countdown-feed",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Fresh fetch, gated by dev mode, annotated with completion state.
async fn list_actions(State(state): State<AppState>, Query(q): Query<EnvQuery>) -> Response {
    let actions = state.ingestor.fetch_feed(&state.sheet_url).await;
    let dev_mode = state.gate.is_dev_mode(q.query_override());
    let views = visible_actions(dev_mode, &actions)
        .into_iter()
        .map(|action| ActionView {
            action,
            date_key: action.date_key(),
            completed: state.completions.is_complete(action.date),
        })
        .collect();
    Json(ActionsResponse {
        dev_mode,
        actions: views,
    })
    .into_response()
}

async fn dev_mode(State(state): State<AppState>, Query(q): Query<EnvQuery>) -> Json<DevModeResponse> {
    Json(DevModeResponse::from_gate(&state.gate, q.query_override()))
}

async fn toggle_dev_mode(
    State(state): State<AppState>,
    Query(q): Query<EnvQuery>,
) -> Json<DevModeResponse> {
    let query = q.query_override();
    state.gate.toggle(query);
    Json(DevModeResponse::from_gate(&state.gate, query))
}

async fn list_completions(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({ "completed": state.completions.completed_keys() }))
}

async fn toggle_completion(State(state): State<AppState>, Path(date): Path<String>) -> Response {
    match parse_csv_date(&date) {
        Ok(date) => {
            let completed = state.completions.toggle_complete(date);
            Json(serde_json::json!({ "date": date_key(date), "completed": completed }))
                .into_response()
        }
        Err(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    }
}

async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()).into_response(),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed").into_response(),
    }
}

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/actions", get(list_actions))
        .route("/dev-mode", get(dev_mode))
        .route("/dev-mode/toggle", post(toggle_dev_mode))
        .route("/completions", get(list_completions))
        .route("/completions/:date/toggle", post(toggle_completion))
        .route("/metrics", get(render_metrics))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(cors))
}

/// Serve until Ctrl-C.
pub async fn start_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server running on http://localhost:{port}");
    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
