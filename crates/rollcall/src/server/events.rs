//! Server-Sent Events push channel.
//!
//! Each connection subscribes to the [`Notifier`](crate::notify::Notifier)
//! and receives a `connection_response` greeting followed by one
//! `data_updated` event per mutation.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use serde_json::json;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info, warn};

use super::AppState;

/// Event name of the greeting sent on connect.
pub const GREETING_EVENT: &str = "connection_response";

/// Event name of change notifications.
pub const UPDATE_EVENT: &str = "data_updated";

/// Logs when an observer's stream is dropped.
struct ObserverGuard;

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        info!("Observer disconnected");
    }
}

/// `GET /api/events`
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let notifier = state.tracker().notifier();
    let rx = notifier.subscribe();
    info!(
        "Observer connected ({} connected)",
        notifier.observer_count()
    );

    let greeting = Event::default()
        .event(GREETING_EVENT)
        .json_data(json!({ "data": "Connected to server" }));

    let guard = ObserverGuard;
    let updates = BroadcastStream::new(rx).filter_map(move |message| {
        let _guard = &guard;
        match message {
            Ok(change) => {
                debug!("Pushing {} to observer", change.kind);
                Some(Event::default().event(UPDATE_EVENT).json_data(change))
            }
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!("Observer fell behind, skipped {} events", skipped);
                None
            }
        }
    });

    Sse::new(tokio_stream::once(greeting).chain(updates)).keep_alive(KeepAlive::default())
}
