//! Repository for the `promotions` table.

use beatmarket_core::ranking::promotion::{current_window, plan_renewal, RenewalPlan};
use beatmarket_core::ranking::{Promotion, PromotionRequest};
use beatmarket_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::promotion::PromotionRow;

/// Column list for `promotions` queries.
const COLUMNS: &str = "\
    id, target_type, target_id, tier, start_date, duration_days, end_date, \
    owner_id, created_at, updated_at";

/// Tier rank as an integer, higher is more prominent.
const TIER_RANK: &str = "CASE tier WHEN 'spotlight' THEN 2 WHEN 'premium' THEN 1 ELSE 0 END";

/// Provides ledger queries and the serialized renewal write for promotions.
pub struct PromotionRepo;

impl PromotionRepo {
    /// Promotions of one target type whose window contains `as_of`, most
    /// prominent first (tier, then later start, then higher id) so `limit`
    /// drops the least prominent windows.
    pub async fn list_active(
        pool: &PgPool,
        target_type: &str,
        as_of: Timestamp,
        limit: i64,
    ) -> Result<Vec<PromotionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM promotions \
             WHERE target_type = $1 AND start_date <= $2 AND end_date > $2 \
             ORDER BY {TIER_RANK} DESC, start_date DESC, id DESC \
             LIMIT $3"
        );
        sqlx::query_as::<_, PromotionRow>(&query)
            .bind(target_type)
            .bind(as_of)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Every window ever bought for one target, oldest first.
    pub async fn find_by_target(
        pool: &PgPool,
        target_type: &str,
        target_id: DbId,
    ) -> Result<Vec<PromotionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM promotions \
             WHERE target_type = $1 AND target_id = $2 \
             ORDER BY start_date, id"
        );
        sqlx::query_as::<_, PromotionRow>(&query)
            .bind(target_type)
            .bind(target_id)
            .fetch_all(pool)
            .await
    }

    /// Record a purchase: extend the target's active window or open a new one.
    ///
    /// Runs in one transaction holding a per-target advisory lock, so two
    /// concurrent renewals of the same target are applied one after the
    /// other and each sees the other's result. The active row is also
    /// locked with `FOR UPDATE`.
    pub async fn save_renewal(
        pool: &PgPool,
        request: &PromotionRequest,
        now: Timestamp,
    ) -> Result<PromotionRow, sqlx::Error> {
        let target_type = request.target_type.as_str();
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("promotion:{target_type}:{}", request.target_id))
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM promotions \
             WHERE target_type = $1 AND target_id = $2 \
               AND start_date <= $3 AND end_date > $3 \
             FOR UPDATE"
        );
        let active_rows = sqlx::query_as::<_, PromotionRow>(&query)
            .bind(target_type)
            .bind(request.target_id)
            .bind(now)
            .fetch_all(&mut *tx)
            .await?;

        let active = active_rows
            .into_iter()
            .map(Promotion::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        let row = match plan_renewal(current_window(&active, now), request, now) {
            RenewalPlan::Extend {
                promotion_id,
                tier,
                duration_days,
                end_date,
            } => {
                tracing::debug!(promotion_id, %end_date, "Extending active promotion window");
                let query = format!(
                    "UPDATE promotions SET tier = $2, duration_days = $3, end_date = $4 \
                     WHERE id = $1 RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, PromotionRow>(&query)
                    .bind(promotion_id)
                    .bind(tier.as_str())
                    .bind(duration_days)
                    .bind(end_date)
                    .fetch_one(&mut *tx)
                    .await?
            }
            RenewalPlan::Create {
                tier,
                start_date,
                duration_days,
                end_date,
            } => {
                let query = format!(
                    "INSERT INTO promotions \
                        (target_type, target_id, tier, start_date, duration_days, end_date, owner_id) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7) \
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, PromotionRow>(&query)
                    .bind(target_type)
                    .bind(request.target_id)
                    .bind(tier.as_str())
                    .bind(start_date)
                    .bind(duration_days)
                    .bind(end_date)
                    .bind(request.owner_id)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        tx.commit().await?;
        Ok(row)
    }
}
