//! Route definitions for the `/promotions` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::promotion;
use crate::state::AppState;

/// Routes mounted at `/promotions`.
///
/// ```text
/// POST /    -> start_promotion
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(promotion::start_promotion))
}
