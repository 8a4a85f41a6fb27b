//! Route definitions for the `/rankings` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::ranking;
use crate::state::AppState;

/// Routes mounted at `/rankings`.
///
/// ```text
/// GET /{kind}/new        -> get_new       (?page=&limit=&owner_id=)
/// GET /{kind}/popular    -> get_popular
/// GET /{kind}/trending   -> get_trending
/// GET /{kind}/featured   -> get_featured
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{kind}/new", get(ranking::get_new))
        .route("/{kind}/popular", get(ranking::get_popular))
        .route("/{kind}/trending", get(ranking::get_trending))
        .route("/{kind}/featured", get(ranking::get_featured))
}
