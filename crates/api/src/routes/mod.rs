pub mod health;
pub mod promotion;
pub mod ranking;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /rankings/{kind}/new                 newest items
/// /rankings/{kind}/popular             sustained engagement
/// /rankings/{kind}/trending            decayed recent engagement
/// /rankings/{kind}/featured            paid promotion windows
///
/// /promotions                          buy or renew a window (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/rankings", ranking::router())
        .nest("/promotions", promotion::router())
}
