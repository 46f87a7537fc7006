//! HTTP surface over a shared [`SnapshotStore`].

use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{error, info};

use crate::cache::SnapshotStore;
use crate::config::Config;
use crate::models::Snapshot;

#[derive(Debug, Default, Deserialize)]
struct DataQuery {
    #[serde(default)]
    force: bool,
}

pub fn router(store: Arc<SnapshotStore>, config: &Config) -> Router {
    let router = Router::new()
        .route("/api/data", get(api_data))
        .route("/api/refresh", post(api_refresh))
        .route("/api/health", get(api_health))
        .route_service("/", ServeFile::new(config.index_html()))
        .with_state(store);

    let assets = config.assets_dir();
    if assets.is_dir() {
        router.nest_service("/assets", ServeDir::new(assets))
    } else {
        router
    }
}

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = Arc::new(SnapshotStore::new(config.data_dir.clone()));
    let app = router(store, &config);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(
        addr = %config.bind,
        data_dir = %config.data_dir.display(),
        "serving homework scoreboard"
    );
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn api_data(
    State(store): State<Arc<SnapshotStore>>,
    Query(query): Query<DataQuery>,
) -> Result<Json<Arc<Snapshot>>, StatusCode> {
    load(store, query.force).await
}

async fn api_refresh(State(store): State<Arc<SnapshotStore>>) -> Result<Json<Arc<Snapshot>>, StatusCode> {
    load(store, true).await
}

async fn api_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Aggregation reads files and blocks on the store lock.
async fn load(store: Arc<SnapshotStore>, force: bool) -> Result<Json<Arc<Snapshot>>, StatusCode> {
    tokio::task::spawn_blocking(move || store.load(force))
        .await
        .map(Json)
        .map_err(|err| {
            error!(error = %err, "snapshot task failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::fs;
    use tower::ServiceExt;

    fn setup() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("HW01.csv"), "ФИО,Результат\nIvan Ivanov,зач\n").unwrap();
        let web = dir.path().join("web");
        fs::create_dir_all(web.join("assets")).unwrap();
        fs::write(web.join("index.html"), "<html>scoreboard</html>").unwrap();
        fs::write(web.join("assets").join("app.js"), "console.log(1)").unwrap();

        let config = Config {
            data_dir: dir.path().to_path_buf(),
            web_dir: web,
            ..Config::default()
        };
        let store = Arc::new(SnapshotStore::new(config.data_dir.clone()));
        (dir, router(store, &config))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (_dir, app) = setup();
        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn data_returns_snapshot_document() {
        let (_dir, app) = setup();
        let response = app
            .oneshot(Request::get("/api/data").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["meta"]["hw_count"], 1);
        assert_eq!(body["hws"][0]["label"], "HW01");
        assert_eq!(body["students"][0]["name"], "Ivan Ivanov");
        assert_eq!(body["students"][0]["per_hw"], json!([1]));
        assert_eq!(body["students"][0]["group"], "1/1");
        assert_eq!(body["stats"]["counts_by_accepted"]["1"], 1);
    }

    #[tokio::test]
    async fn refresh_and_forced_data() {
        let (_dir, app) = setup();
        let response = app
            .clone()
            .oneshot(Request::post("/api/refresh").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/api/data?force=true").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["meta"]["warnings"], json!([]));
    }

    #[tokio::test]
    async fn serves_dashboard_files() {
        let (_dir, app) = setup();
        let response = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/assets/app.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
