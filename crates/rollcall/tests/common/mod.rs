//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use rollcall::config::StorageConfig;
use rollcall::{server, FixedClock, Notifier, RecordStore, Tracker};
use tempfile::TempDir;

/// A running server over a scratch data directory.
pub struct TestServer {
    pub base: String,
    pub tracker: Arc<Tracker>,
    pub client: reqwest::Client,
    _dir: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }
}

/// The instant every test server treats as "now".
pub fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 18)
        .unwrap()
        .and_hms_opt(9, 15, 0)
        .unwrap()
}

/// Bind to port 0 and serve a fresh, empty store.
pub async fn start_server() -> TestServer {
    let dir = TempDir::new().unwrap();
    let store = RecordStore::open(&StorageConfig::in_dir(dir.path())).unwrap();
    let tracker = Arc::new(Tracker::new(
        store,
        Notifier::new(16),
        Arc::new(FixedClock(now())),
    ));

    let app = server::router(Arc::clone(&tracker));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base: format!("http://{addr}"),
        tracker,
        client: reqwest::Client::new(),
        _dir: dir,
    }
}
