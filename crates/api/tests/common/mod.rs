#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use beatmarket_core::types::{DbId, Timestamp};
use beatmarket_db::models::content_item::CreateContentItem;
use beatmarket_db::repositories::ContentItemRepo;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use beatmarket_api::config::ServerConfig;
use beatmarket_api::router::build_app_router;
use beatmarket_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        candidate_pool_limit: 1000,
    }
}

/// Build the full application router, with the production middleware
/// stack, over the given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState::new(pool, config.clone());
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Insert an approved item and return its id.
pub async fn seed_item(
    pool: &PgPool,
    kind: &str,
    owner_id: Option<DbId>,
    created_at: Timestamp,
    plays: i64,
    likes: i64,
) -> DbId {
    let input = CreateContentItem {
        content_kind: kind.to_string(),
        owner_id,
        title: "Seeded".to_string(),
        play_count: Some(plays),
        like_count: Some(likes),
        approved: true,
        rejected: false,
        created_at: Some(created_at),
    };
    ContentItemRepo::create(pool, &input).await.unwrap().id
}

/// Collect the `data.items` ids of a ranking response.
pub fn item_ids(json: &serde_json::Value) -> Vec<DbId> {
    json["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect()
}
