//! PostgreSQL implementations of the engine's store traits.
//!
//! Thin adapters over the repositories: they translate [`ContentKind`] to
//! its column value and `sqlx::Error` to [`CoreError::Internal`].

use async_trait::async_trait;
use beatmarket_core::error::CoreError;
use beatmarket_core::ranking::policy::PopularPolicy;
use beatmarket_core::ranking::{
    ContentKind, ContentSource, Promotion, PromotionRequest, PromotionStore,
};
use beatmarket_core::types::{DbId, Timestamp};

use crate::models::content_item::ContentItemRow;
use crate::repositories::{ContentItemRepo, PromotionRepo};
use crate::DbPool;

fn internal(err: sqlx::Error) -> CoreError {
    CoreError::Internal(format!("database error: {err}"))
}

/// Content reads backed by the `content_items` table.
#[derive(Debug, Clone)]
pub struct PgContentSource {
    pool: DbPool,
}

impl PgContentSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentSource for PgContentSource {
    type Item = ContentItemRow;

    async fn find_approved_since(
        &self,
        kind: ContentKind,
        owner_id: Option<DbId>,
        cutoff: Timestamp,
        limit: i64,
    ) -> Result<Vec<ContentItemRow>, CoreError> {
        ContentItemRepo::find_approved_since(&self.pool, kind.as_str(), owner_id, cutoff, limit)
            .await
            .map_err(internal)
    }

    async fn find_popular_candidates(
        &self,
        kind: ContentKind,
        owner_id: Option<DbId>,
        cutoff: Timestamp,
        floors: &PopularPolicy,
        limit: i64,
    ) -> Result<Vec<ContentItemRow>, CoreError> {
        ContentItemRepo::find_popular_candidates(
            &self.pool,
            kind.as_str(),
            owner_id,
            cutoff,
            floors,
            limit,
        )
        .await
        .map_err(internal)
    }

    async fn find_approved_ordered_by_created_desc(
        &self,
        kind: ContentKind,
        owner_id: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<ContentItemRow>, CoreError> {
        ContentItemRepo::find_approved_ordered_by_created_desc(
            &self.pool,
            kind.as_str(),
            owner_id,
            limit,
        )
        .await
        .map_err(internal)
    }

    async fn find_by_ids(
        &self,
        kind: ContentKind,
        ids: &[DbId],
    ) -> Result<Vec<ContentItemRow>, CoreError> {
        ContentItemRepo::find_by_ids(&self.pool, kind.as_str(), ids)
            .await
            .map_err(internal)
    }
}

/// The promotion ledger backed by the `promotions` table.
#[derive(Debug, Clone)]
pub struct PgPromotionStore {
    pool: DbPool,
}

impl PgPromotionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PromotionStore for PgPromotionStore {
    async fn get_active_promotions(
        &self,
        kind: ContentKind,
        as_of: Timestamp,
        limit: i64,
    ) -> Result<Vec<Promotion>, CoreError> {
        PromotionRepo::list_active(&self.pool, kind.as_str(), as_of, limit)
            .await
            .map_err(internal)?
            .into_iter()
            .map(Promotion::try_from)
            .collect()
    }

    async fn save_promotion(
        &self,
        request: &PromotionRequest,
        now: Timestamp,
    ) -> Result<Promotion, CoreError> {
        let row = PromotionRepo::save_renewal(&self.pool, request, now)
            .await
            .map_err(internal)?;
        Promotion::try_from(row)
    }
}
