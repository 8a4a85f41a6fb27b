//! HTTP-level integration tests for the ranking endpoints.

mod common;

use axum::http::StatusCode;
use beatmarket_db::repositories::ContentItemRepo;
use chrono::{Duration, Utc};
use common::{body_json, get, item_ids, seed_item};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_trending_and_popular_are_disjoint(pool: PgPool) {
    let now = Utc::now();
    let hot = seed_item(&pool, "track", None, now - Duration::days(1), 200, 15).await;
    let steady = seed_item(&pool, "track", None, now - Duration::days(40), 400, 30).await;

    let app = common::build_test_app(pool.clone());
    let trending = body_json(get(app, "/api/v1/rankings/track/trending").await).await;
    assert_eq!(item_ids(&trending), vec![hot]);

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/rankings/tracks/popular").await;
    assert_eq!(response.status(), StatusCode::OK);
    let popular = body_json(response).await;
    assert_eq!(item_ids(&popular), vec![steady]);
    assert_eq!(popular["data"]["total_count"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_new_paginates_with_clamped_limit(pool: PgPool) {
    let now = Utc::now();
    let mut ids = Vec::new();
    for hours in 1..=5 {
        ids.push(seed_item(&pool, "bundle", None, now - Duration::hours(hours), 0, 0).await);
    }

    let app = common::build_test_app(pool.clone());
    let first = body_json(get(app, "/api/v1/rankings/bundle/new?page=0&limit=2").await).await;
    assert_eq!(item_ids(&first), vec![ids[0], ids[1]]);
    assert_eq!(first["data"]["total_count"], 5);

    let app = common::build_test_app(pool.clone());
    let last = body_json(get(app, "/api/v1/rankings/bundle/new?page=2&limit=2").await).await;
    assert_eq!(item_ids(&last), vec![ids[4]]);

    let app = common::build_test_app(pool);
    let clamped = body_json(get(app, "/api/v1/rankings/bundle/new?page=-3&limit=0").await).await;
    assert_eq!(clamped["data"]["page"], 0);
    assert_eq!(clamped["data"]["limit"], 1);
    assert_eq!(item_ids(&clamped), vec![ids[0]]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_owner_scope_filters_listing(pool: PgPool) {
    let now = Utc::now();
    let mine = seed_item(&pool, "kit", Some(11), now - Duration::days(1), 0, 0).await;
    seed_item(&pool, "kit", Some(12), now - Duration::days(1), 0, 0).await;

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/rankings/kit/new?owner_id=11").await).await;
    assert_eq!(item_ids(&json), vec![mine]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rejected_items_never_listed(pool: PgPool) {
    let now = Utc::now();
    let id = seed_item(&pool, "track", None, now - Duration::hours(2), 0, 0).await;
    ContentItemRepo::set_moderation(&pool, id, true, true)
        .await
        .unwrap();

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/rankings/track/new").await).await;
    assert!(item_ids(&json).is_empty());
}

// ---------------------------------------------------------------------------
// Degenerate input
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_kind_returns_empty_page(pool: PgPool) {
    seed_item(&pool, "track", None, Utc::now(), 0, 0).await;

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/rankings/podcasts/new?limit=5").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(item_ids(&json).is_empty());
    assert_eq!(json["data"]["total_count"], 0);
    assert_eq!(json["data"]["limit"], 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_malformed_params_fall_back_to_defaults(pool: PgPool) {
    let now = Utc::now();
    for hours in 1..=3 {
        seed_item(&pool, "bundle", None, now - Duration::hours(hours), 0, 0).await;
    }

    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/rankings/bundle/new?limit=abc&owner_id=x").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(item_ids(&json).len(), 3);
    assert_eq!(json["data"]["limit"], 20);
    assert_eq!(json["data"]["page"], 0);

    let app = common::build_test_app(pool.clone());
    let response = get(
        app,
        "/api/v1/rankings/bundle/new?page=1e3&limit=99999999999999999999",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(item_ids(&json).is_empty());
    assert_eq!(json["data"]["page"], 1000);
    assert_eq!(json["data"]["limit"], 100);
    assert_eq!(json["data"]["total_count"], 3);

    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/rankings/podcasts/new?limit=abc").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(item_ids(&json).is_empty());
    assert_eq!(json["data"]["limit"], 20);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_list_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/rankings/track/hottest").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
