//! Handlers for the `/promotions` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use beatmarket_core::ranking::promotion::MIN_PROMOTION_DAYS;
use beatmarket_core::ranking::{ContentKind, Promotion, PromotionTier};
use beatmarket_core::types::DbId;
use chrono::Utc;
use serde::Deserialize;

use crate::error::AppResult;
use crate::query::{lenient_i64, lenient_text};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body for `POST /promotions`.
///
/// `tier` falls back to `standard` when absent or unknown; `days` is
/// clamped to the purchasable range and defaults to one day when absent or
/// not a number.
#[derive(Debug, Deserialize)]
pub struct StartPromotionRequest {
    pub target_type: String,
    pub target_id: DbId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub tier: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub days: Option<i64>,
    /// Purchaser of the window.
    pub owner_id: DbId,
}

// ---------------------------------------------------------------------------
// POST /promotions
// ---------------------------------------------------------------------------

/// Buy or renew a Featured window for one content item.
///
/// Returns 201 with the saved window. A target that does not exist, or a
/// `target_type` that names no content kind, records nothing and returns
/// 200 with `{"data": null}`.
pub async fn start_promotion(
    State(state): State<AppState>,
    Json(input): Json<StartPromotionRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Option<Promotion>>>)> {
    let Some(kind) = ContentKind::parse(&input.target_type) else {
        tracing::debug!(
            target_type = %input.target_type,
            target_id = input.target_id,
            "Unknown promotion target type, nothing recorded",
        );
        return Ok((StatusCode::OK, Json(DataResponse { data: None })));
    };
    let tier = PromotionTier::parse_or_default(input.tier.as_deref());
    let days = input.days.unwrap_or(i64::from(MIN_PROMOTION_DAYS));

    let promotion = state
        .engine
        .start_promotion(kind, input.target_id, tier, days, input.owner_id, Utc::now())
        .await?;

    let status = if promotion.is_some() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(DataResponse { data: promotion })))
}
