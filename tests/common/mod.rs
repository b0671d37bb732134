//! Common test infrastructure
//!
//! Builds the full router over a temporary SQLite database so tests exercise the
//! same wiring as the server binary, minus the network listener.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::TestEnv;
//!
//! #[tokio::test]
//! async fn test_anonymous() {
//!     let env = TestEnv::seeded();
//!     let response = env.get("/v1/recommendations").await;
//!     assert_eq!(response.status, 200);
//! }
//! ```

mod fixtures;

#[allow(unused_imports)]
pub use fixtures::*;

use axum::{body::Body, http::Request, Router};
use playrank_server::server::{make_app, ServerConfig, ServerState};
use playrank_server::{
    RecommendationEngine, RecommendationSettings, SqliteMusicStore, ViewBuffer, ViewCapCache,
};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

#[allow(dead_code)]
impl TestResponse {
    /// Song ids of a recommendation page, in order.
    pub fn item_ids(&self) -> Vec<i64> {
        self.body["items"]
            .as_array()
            .expect("response has no items")
            .iter()
            .map(|item| item["id"].as_i64().expect("item has no id"))
            .collect()
    }
}

pub struct TestEnv {
    pub store: Arc<SqliteMusicStore>,
    pub view_buffer: Arc<ViewBuffer>,
    pub view_cap: Arc<ViewCapCache>,
    pub fixture: Fixture,
    app: Router,
    db_dir: TempDir,
}

#[allow(dead_code)]
impl TestEnv {
    /// The standard fixture with default engine settings.
    pub fn seeded() -> Self {
        Self::with_settings(RecommendationSettings::default())
    }

    pub fn with_settings(settings: RecommendationSettings) -> Self {
        let db_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(
            SqliteMusicStore::new(db_dir.path().join("playrank.db"))
                .expect("Failed to open store"),
        );
        let fixture = seed(&store);
        Self::build(db_dir, store, fixture, settings)
    }

    fn build(
        db_dir: TempDir,
        store: Arc<SqliteMusicStore>,
        fixture: Fixture,
        settings: RecommendationSettings,
    ) -> Self {
        let view_cap = Arc::new(ViewCapCache::new(store.clone(), 0.9).expect("view cap"));
        let view_buffer = Arc::new(ViewBuffer::new(store.clone(), false));
        let engine = Arc::new(RecommendationEngine::new(
            store.clone(),
            store.clone(),
            view_cap.clone(),
            settings,
        ));
        let state = ServerState::new(ServerConfig::default(), engine, view_buffer.clone(), None);

        TestEnv {
            store,
            view_buffer,
            view_cap,
            fixture,
            app: make_app(state),
            db_dir,
        }
    }

    pub fn db_path(&self) -> std::path::PathBuf {
        self.db_dir.path().join("playrank.db")
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post(&self, uri: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status().as_u16();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        TestResponse { status, body }
    }
}
