//! Repository for the `content_items` table.

use beatmarket_core::ranking::policy::PopularPolicy;
use beatmarket_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::content_item::{ContentItemRow, CreateContentItem};

/// Column list for `content_items` queries.
const COLUMNS: &str = "\
    id, content_kind, owner_id, title, play_count, like_count, \
    approved, rejected, created_at, updated_at";

/// Eligibility filter shared by every ranking read.
const ELIGIBLE: &str = "approved = true AND rejected = false";

/// Newest first; rows without a creation time count as newest.
const NEWEST_FIRST: &str = "ORDER BY created_at DESC NULLS FIRST, id DESC";

/// Undecayed popularity score: `plays + 3 * likes`.
const POPULARITY_SCORE: &str = "(play_count + 3 * like_count)";

/// Provides CRUD and ranking-candidate queries for content items.
pub struct ContentItemRepo;

impl ContentItemRepo {
    /// Insert a content item, returning the full row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateContentItem,
    ) -> Result<ContentItemRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO content_items \
                (content_kind, owner_id, title, play_count, like_count, \
                 approved, rejected, created_at) \
             VALUES ($1, $2, $3, COALESCE($4, 0), COALESCE($5, 0), $6, $7, COALESCE($8, NOW())) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentItemRow>(&query)
            .bind(&input.content_kind)
            .bind(input.owner_id)
            .bind(&input.title)
            .bind(input.play_count)
            .bind(input.like_count)
            .bind(input.approved)
            .bind(input.rejected)
            .bind(input.created_at)
            .fetch_one(pool)
            .await
    }

    /// Eligible items of one kind created at or after `cutoff`, newest first.
    ///
    /// Rows with a NULL `created_at` are treated as created now and always
    /// pass the cutoff.
    pub async fn find_approved_since(
        pool: &PgPool,
        content_kind: &str,
        owner_id: Option<DbId>,
        cutoff: Timestamp,
        limit: i64,
    ) -> Result<Vec<ContentItemRow>, sqlx::Error> {
        let owner_clause = if owner_id.is_some() {
            "AND owner_id = $4"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM content_items \
             WHERE content_kind = $1 AND {ELIGIBLE} \
               AND (created_at >= $2 OR created_at IS NULL) {owner_clause} \
             {NEWEST_FIRST} LIMIT $3"
        );

        let mut q = sqlx::query_as::<_, ContentItemRow>(&query)
            .bind(content_kind)
            .bind(cutoff)
            .bind(limit);
        if let Some(owner) = owner_id {
            q = q.bind(owner);
        }
        q.fetch_all(pool).await
    }

    /// Eligible items of one kind created at or after `cutoff` that clear the
    /// Popular floors, highest score first.
    ///
    /// The floors are applied before the `LIMIT`, so a large catalog of
    /// recent low-engagement items cannot push older popular items out of
    /// the candidate pool.
    pub async fn find_popular_candidates(
        pool: &PgPool,
        content_kind: &str,
        owner_id: Option<DbId>,
        cutoff: Timestamp,
        floors: &PopularPolicy,
        limit: i64,
    ) -> Result<Vec<ContentItemRow>, sqlx::Error> {
        let owner_clause = if owner_id.is_some() {
            "AND owner_id = $7"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM content_items \
             WHERE content_kind = $1 AND {ELIGIBLE} \
               AND (created_at >= $2 OR created_at IS NULL) \
               AND (play_count >= $4 OR like_count >= $5) \
               AND {POPULARITY_SCORE} >= $6 {owner_clause} \
             ORDER BY {POPULARITY_SCORE} DESC, created_at DESC NULLS FIRST, id DESC \
             LIMIT $3"
        );

        let mut q = sqlx::query_as::<_, ContentItemRow>(&query)
            .bind(content_kind)
            .bind(cutoff)
            .bind(limit)
            .bind(floors.min_plays)
            .bind(floors.min_likes)
            .bind(floors.min_score);
        if let Some(owner) = owner_id {
            q = q.bind(owner);
        }
        q.fetch_all(pool).await
    }

    /// Eligible items of one kind with no time window, newest first.
    pub async fn find_approved_ordered_by_created_desc(
        pool: &PgPool,
        content_kind: &str,
        owner_id: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<ContentItemRow>, sqlx::Error> {
        let owner_clause = if owner_id.is_some() {
            "AND owner_id = $3"
        } else {
            ""
        };
        let query = format!(
            "SELECT {COLUMNS} FROM content_items \
             WHERE content_kind = $1 AND {ELIGIBLE} {owner_clause} \
             {NEWEST_FIRST} LIMIT $2"
        );

        let mut q = sqlx::query_as::<_, ContentItemRow>(&query)
            .bind(content_kind)
            .bind(limit);
        if let Some(owner) = owner_id {
            q = q.bind(owner);
        }
        q.fetch_all(pool).await
    }

    /// Items of one kind with the given IDs, regardless of moderation state.
    pub async fn find_by_ids(
        pool: &PgPool,
        content_kind: &str,
        ids: &[DbId],
    ) -> Result<Vec<ContentItemRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_items \
             WHERE content_kind = $1 AND id = ANY($2)"
        );
        sqlx::query_as::<_, ContentItemRow>(&query)
            .bind(content_kind)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Count one play. Returns `None` if the item does not exist.
    pub async fn record_play(pool: &PgPool, id: DbId) -> Result<Option<ContentItemRow>, sqlx::Error> {
        let query = format!(
            "UPDATE content_items SET play_count = play_count + 1 \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentItemRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Add `delta` likes (negative for unlikes), never dropping below zero.
    pub async fn adjust_likes(
        pool: &PgPool,
        id: DbId,
        delta: i64,
    ) -> Result<Option<ContentItemRow>, sqlx::Error> {
        let query = format!(
            "UPDATE content_items SET like_count = GREATEST(like_count + $2, 0) \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentItemRow>(&query)
            .bind(id)
            .bind(delta)
            .fetch_optional(pool)
            .await
    }

    /// Record a moderation decision.
    pub async fn set_moderation(
        pool: &PgPool,
        id: DbId,
        approved: bool,
        rejected: bool,
    ) -> Result<Option<ContentItemRow>, sqlx::Error> {
        let query = format!(
            "UPDATE content_items SET approved = $2, rejected = $3 \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentItemRow>(&query)
            .bind(id)
            .bind(approved)
            .bind(rejected)
            .fetch_optional(pool)
            .await
    }
}
