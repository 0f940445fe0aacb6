use super::page::{PageOptions, render_page};
use crate::model::DisplayOptionsPatch;
use crate::runtime::{RuntimeStopped, VoyagerHandle};
use crate::session::SessionSnapshot;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{
        Html, IntoResponse, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::{Stream, StreamExt, wrappers::WatchStream};
use tower_http::cors::{Any, CorsLayer};

/// Application state shared across handlers
pub struct AppState {
    pub handle: VoyagerHandle,
    pub page: PageOptions,
}

#[derive(Debug, Deserialize)]
pub struct TargetRequest {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ResizeRequest {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Deserialize)]
pub struct PanRequest {
    pub dx: f64,
    pub dy: f64,
}

#[derive(Debug, Deserialize)]
pub struct ZoomRequest {
    pub factor: f64,
    pub x: f64,
    pub y: f64,
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/snapshot", get(snapshot_handler))
        .route("/api/events", get(events_handler))
        .route("/api/options", post(options_handler))
        .route("/api/click", post(click_handler))
        .route("/api/focus", post(focus_handler))
        .route("/api/resize", post(resize_handler))
        .route("/api/pan", post(pan_handler))
        .route("/api/zoom", post(zoom_handler))
        .route("/api/refresh", post(refresh_handler))
        .layer(cors)
        .with_state(state)
}

async fn index_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Html(render_page(&state.page))
}

async fn snapshot_handler(State(state): State<Arc<AppState>>) -> Json<Arc<SessionSnapshot>> {
    Json(state.handle.snapshot())
}

/// One `update` event per published snapshot, carrying its version.
async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = WatchStream::new(state.handle.subscribe()).map(|snapshot| {
        Ok(Event::default()
            .event("update")
            .data(snapshot.version.to_string()))
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

async fn options_handler(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<DisplayOptionsPatch>,
) -> Response {
    accepted(state.handle.set_options(patch))
}

async fn click_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TargetRequest>,
) -> Response {
    accepted(state.handle.click(body.id))
}

async fn focus_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TargetRequest>,
) -> Response {
    accepted(state.handle.focus_node(body.id))
}

async fn resize_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResizeRequest>,
) -> Response {
    accepted(state.handle.resize(body.width, body.height))
}

async fn pan_handler(State(state): State<Arc<AppState>>, Json(body): Json<PanRequest>) -> Response {
    accepted(state.handle.pan(body.dx, body.dy))
}

async fn zoom_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ZoomRequest>,
) -> Response {
    accepted(state.handle.zoom(body.factor, body.x, body.y))
}

async fn refresh_handler(State(state): State<Arc<AppState>>) -> Response {
    accepted(state.handle.refresh())
}

fn accepted(result: Result<(), RuntimeStopped>) -> Response {
    match result {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(err) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()).into_response(),
    }
}
