//! HTTP transport for rollcall.
//!
//! Uses axum for routing. Handlers hand the blocking file work to
//! [`tokio::task::spawn_blocking`] and map [`Error`] to status codes in one
//! place.
//!
//! ## Routes
//!
//! - `GET /api/students`, `POST /api/students`
//! - `PUT /api/students/:id`, `DELETE /api/students/:id`
//! - `GET /api/attendance?date=&year=&section=`, `POST /api/attendance`
//! - `DELETE /api/attendance/:id`
//! - `GET /api/dashboard/stats`
//! - `GET /api/export/students`, `GET /api/export/attendance`
//! - `GET /api/events` (Server-Sent Events)
//! - `GET /health`

mod events;
mod handlers;

use std::future::IntoFuture;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde_json::json;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::service::Tracker;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    tracker: Arc<Tracker>,
}

impl AppState {
    /// Wrap a tracker for sharing across requests.
    #[must_use]
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }

    /// The shared tracker.
    #[must_use]
    pub fn tracker(&self) -> &Arc<Tracker> {
        &self.tracker
    }

    /// Run a tracker call on the blocking pool.
    async fn run<T, F>(&self, call: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Tracker) -> Result<T> + Send + 'static,
    {
        let tracker = Arc::clone(&self.tracker);
        tokio::task::spawn_blocking(move || call(&tracker))
            .await
            .map_err(|e| Error::internal(format!("request task failed: {e}")))?
    }
}

/// Build the axum `Router` for the given tracker.
pub fn router(tracker: Arc<Tracker>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/students",
            get(handlers::list_students).post(handlers::create_student),
        )
        .route(
            "/api/students/:id",
            put(handlers::update_student).delete(handlers::delete_student),
        )
        .route(
            "/api/attendance",
            get(handlers::list_attendance).post(handlers::mark_attendance),
        )
        .route("/api/attendance/:id", delete(handlers::delete_attendance))
        .route("/api/dashboard/stats", get(handlers::dashboard_stats))
        .route("/api/export/students", get(handlers::export_students))
        .route("/api/export/attendance", get(handlers::export_attendance))
        .route("/api/events", get(events::stream))
        .with_state(AppState::new(tracker))
}

/// Open the store and serve HTTP until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the address cannot be
/// bound.
pub async fn serve(config: &Config) -> Result<()> {
    let tracker = Arc::new(Tracker::from_config(config)?);
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    // Open event streams never finish, so stop without draining them.
    let server = axum::serve(listener, router(tracker)).into_future();
    tokio::select! {
        result = server => result?,
        () = shutdown_signal() => {}
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

impl Error {
    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else if self.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }
        let body = json!({ "success": false, "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
