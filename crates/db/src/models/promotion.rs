//! Promotion entity model.

use beatmarket_core::error::CoreError;
use beatmarket_core::ranking::{ContentKind, Promotion, PromotionTier};
use beatmarket_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `promotions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PromotionRow {
    pub id: DbId,
    pub target_type: String,
    pub target_id: DbId,
    pub tier: String,
    pub start_date: Timestamp,
    pub duration_days: i32,
    pub end_date: Timestamp,
    pub owner_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<PromotionRow> for Promotion {
    type Error = CoreError;

    fn try_from(row: PromotionRow) -> Result<Self, Self::Error> {
        Ok(Promotion {
            id: row.id,
            target_type: ContentKind::from_str_value(&row.target_type)
                .map_err(CoreError::Internal)?,
            target_id: row.target_id,
            tier: PromotionTier::from_str_value(&row.tier).map_err(CoreError::Internal)?,
            start_date: row.start_date,
            duration_days: row.duration_days,
            end_date: row.end_date,
            owner_id: row.owner_id,
        })
    }
}
