//! Collaborator interfaces the engine reads from and writes to.
//!
//! Implemented by `beatmarket-db` against PostgreSQL and by
//! [`crate::ranking::memory`] for tests and local tooling.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::ranking::content::{ContentItem, ContentKind};
use crate::ranking::policy::PopularPolicy;
use crate::ranking::promotion::{Promotion, PromotionRequest};
use crate::types::{DbId, Timestamp};

/// Read access to content items.
///
/// The `find_approved_*` methods return only eligible items
/// (`approved && !rejected`); the classifiers re-check eligibility anyway.
#[async_trait]
pub trait ContentSource: Send + Sync {
    type Item: ContentItem + Send + Sync;

    /// Eligible items of `kind` created at or after `cutoff`, optionally
    /// restricted to one owner, newest first, at most `limit` rows.
    async fn find_approved_since(
        &self,
        kind: ContentKind,
        owner_id: Option<DbId>,
        cutoff: Timestamp,
        limit: i64,
    ) -> Result<Vec<Self::Item>, CoreError>;

    /// Eligible items of `kind` created at or after `cutoff` that clear the
    /// Popular floors of `floors`, highest popularity score first (then
    /// newest, then highest id), at most `limit` rows.
    async fn find_popular_candidates(
        &self,
        kind: ContentKind,
        owner_id: Option<DbId>,
        cutoff: Timestamp,
        floors: &PopularPolicy,
        limit: i64,
    ) -> Result<Vec<Self::Item>, CoreError>;

    /// Eligible items of `kind`, newest first, at most `limit` rows.
    async fn find_approved_ordered_by_created_desc(
        &self,
        kind: ContentKind,
        owner_id: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<Self::Item>, CoreError>;

    /// Items of `kind` with the given ids, whatever their moderation state.
    /// Unknown ids are simply absent from the result.
    async fn find_by_ids(
        &self,
        kind: ContentKind,
        ids: &[DbId],
    ) -> Result<Vec<Self::Item>, CoreError>;
}

/// The promotion ledger.
#[async_trait]
pub trait PromotionStore: Send + Sync {
    /// Promotions of `kind` active at `as_of`, at most `limit` rows.
    ///
    /// Rows come in [`crate::ranking::promotion::featured_precedence`]
    /// order, so truncation drops the least prominent windows.
    async fn get_active_promotions(
        &self,
        kind: ContentKind,
        as_of: Timestamp,
        limit: i64,
    ) -> Result<Vec<Promotion>, CoreError>;

    /// Record a purchase, extending the target's active window or opening a
    /// new one (see [`crate::ranking::promotion::plan_renewal`]).
    ///
    /// Implementations must make reading the active window and writing the
    /// result atomic per target.
    async fn save_promotion(
        &self,
        request: &PromotionRequest,
        now: Timestamp,
    ) -> Result<Promotion, CoreError>;
}
