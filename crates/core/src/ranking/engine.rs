//! The ranking engine: New, Popular, Trending and Featured pages plus the
//! promotion purchase path.
//!
//! Every read recomputes from the stores; nothing is cached. Read failures
//! are logged and degrade to an empty page, so a store outage never turns a
//! listing into an error.

use std::collections::{HashMap, HashSet};

use chrono::Duration;

use crate::error::CoreError;
use crate::ranking::classifier::{
    classify_new, classify_popular, classify_trending, effective_popular_days, widen_eval_window,
};
use crate::ranking::content::{ContentItem, ContentKind};
use crate::ranking::page::{paginate, Page, PageRequest};
use crate::ranking::policy::{CategoryPolicy, PolicySet};
use crate::ranking::promotion::{rank_featured, Promotion, PromotionRequest, PromotionTier};
use crate::ranking::store::{ContentSource, PromotionStore};
use crate::types::{DbId, Timestamp};

/// Caller-supplied listing parameters, before clamping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankingQuery {
    /// Restrict to one content owner; `None` ranks globally.
    pub owner_id: Option<DbId>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl RankingQuery {
    pub fn global(page: i64, limit: i64) -> Self {
        Self {
            owner_id: None,
            page: Some(page),
            limit: Some(limit),
        }
    }

    pub fn for_owner(owner_id: DbId, page: i64, limit: i64) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..Self::global(page, limit)
        }
    }
}

/// One engine serves all content kinds; per-kind constants come from the
/// [`PolicySet`].
pub struct RankingEngine<S, P> {
    source: S,
    promotions: P,
    policies: PolicySet,
}

impl<S, P> RankingEngine<S, P>
where
    S: ContentSource,
    P: PromotionStore,
{
    pub fn new(source: S, promotions: P) -> Self {
        Self {
            source,
            promotions,
            policies: PolicySet::default(),
        }
    }

    pub fn with_policies(mut self, policies: PolicySet) -> Self {
        self.policies = policies;
        self
    }

    pub fn policies(&self) -> &PolicySet {
        &self.policies
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn promotions(&self) -> &P {
        &self.promotions
    }

    // -----------------------------------------------------------------------
    // Listings
    // -----------------------------------------------------------------------

    /// Newest eligible items, topped up past the New window when short of
    /// one page.
    pub async fn get_new(
        &self,
        kind: ContentKind,
        query: &RankingQuery,
        now: Timestamp,
    ) -> Page<DbId> {
        let policy = self.policies.get(kind);
        let request = PageRequest::clamped(query.page, query.limit, policy.max_page_size);
        let result = self.new_ids(kind, policy, query.owner_id, request, now).await;
        finish("new", kind, request, result)
    }

    /// Sustained-engagement items, excluding anything Trending right now.
    pub async fn get_popular(
        &self,
        kind: ContentKind,
        query: &RankingQuery,
        now: Timestamp,
    ) -> Page<DbId> {
        let policy = self.policies.get(kind);
        let request = PageRequest::clamped(query.page, query.limit, policy.max_page_size);
        let result = self.popular_ids(kind, policy, query.owner_id, now).await;
        finish("popular", kind, request, result)
    }

    /// Recent items ordered by half-life decayed engagement.
    pub async fn get_trending(
        &self,
        kind: ContentKind,
        query: &RankingQuery,
        now: Timestamp,
    ) -> Page<DbId> {
        let policy = self.policies.get(kind);
        let request = PageRequest::clamped(query.page, query.limit, policy.max_page_size);
        let result = self.trending_ids(kind, policy, query.owner_id, now).await;
        finish("trending", kind, request, result)
    }

    /// Items with an active paid promotion, by tier then recency.
    pub async fn get_featured(
        &self,
        kind: ContentKind,
        query: &RankingQuery,
        now: Timestamp,
    ) -> Page<DbId> {
        let policy = self.policies.get(kind);
        let request = PageRequest::clamped(query.page, query.limit, policy.max_page_size);
        let result = self.featured_ids(kind, policy, query.owner_id, now).await;
        finish("featured", kind, request, result)
    }

    // -----------------------------------------------------------------------
    // Promotion purchase
    // -----------------------------------------------------------------------

    /// Buy or renew a Featured window for one content item.
    ///
    /// Days are clamped to the purchasable range. A `target_id` with no item
    /// of `kind` records nothing and yields `Ok(None)`; only a failed ledger
    /// write is an error.
    pub async fn start_promotion(
        &self,
        kind: ContentKind,
        target_id: DbId,
        tier: PromotionTier,
        days: i64,
        purchaser_id: DbId,
        now: Timestamp,
    ) -> Result<Option<Promotion>, CoreError> {
        let exists = self
            .source
            .find_by_ids(kind, &[target_id])
            .await?
            .iter()
            .any(|item| item.id() == target_id);
        if !exists {
            tracing::warn!(
                kind = %kind,
                target_id,
                purchaser_id,
                "Promotion target not found, nothing recorded",
            );
            return Ok(None);
        }

        let request = PromotionRequest::new(kind, target_id, tier, days, purchaser_id);
        let promotion = self.promotions.save_promotion(&request, now).await?;

        tracing::info!(
            promotion_id = promotion.id,
            kind = %kind,
            target_id,
            tier = %promotion.tier,
            end_date = %promotion.end_date,
            purchaser_id,
            "Promotion window saved",
        );
        Ok(Some(promotion))
    }

    // -----------------------------------------------------------------------
    // Classification passes
    // -----------------------------------------------------------------------

    async fn new_ids(
        &self,
        kind: ContentKind,
        policy: &CategoryPolicy,
        owner_id: Option<DbId>,
        request: PageRequest,
        now: Timestamp,
    ) -> Result<Vec<DbId>, CoreError> {
        let fill_to = request.limit_usize();
        let cutoff = now - Duration::days(policy.new.window_days);
        let windowed = self
            .source
            .find_approved_since(kind, owner_id, cutoff, policy.candidate_pool_limit)
            .await?;

        let ranked = classify_new(&windowed, &[], &policy.new, fill_to, now);
        if ranked.len() >= fill_to {
            return Ok(ids_of(&ranked));
        }

        let fallback = self
            .source
            .find_approved_ordered_by_created_desc(kind, owner_id, request.limit)
            .await?;
        let topped_up = classify_new(&windowed, &fallback, &policy.new, fill_to, now);

        tracing::debug!(
            kind = %kind,
            windowed = ranked.len(),
            topped_up = topped_up.len(),
            "New list topped up past its window",
        );
        Ok(ids_of(&topped_up))
    }

    async fn trending_ids(
        &self,
        kind: ContentKind,
        policy: &CategoryPolicy,
        owner_id: Option<DbId>,
        now: Timestamp,
    ) -> Result<Vec<DbId>, CoreError> {
        let cutoff = now - Duration::days(policy.trending.pool_days);
        let pool = self
            .source
            .find_approved_since(kind, owner_id, cutoff, policy.candidate_pool_limit)
            .await?;
        Ok(ids_of(&classify_trending(&pool, &policy.trending, now)))
    }

    async fn popular_ids(
        &self,
        kind: ContentKind,
        policy: &CategoryPolicy,
        owner_id: Option<DbId>,
        now: Timestamp,
    ) -> Result<Vec<DbId>, CoreError> {
        let trending: HashSet<DbId> = self
            .trending_ids(kind, policy, owner_id, now)
            .await?
            .into_iter()
            .collect();

        // Trending items are excluded afterwards, so they must not use up
        // the pool's row budget.
        let pool_limit = policy
            .candidate_pool_limit
            .saturating_add(i64::try_from(trending.len()).unwrap_or(i64::MAX));
        let mut eval_days = policy.popular.eval_window_days;
        let mut fetched_days: Option<i64> = None;
        let mut pool = Vec::new();

        loop {
            // Widening past the max age cannot add candidates; reuse the pool.
            let lookback = effective_popular_days(&policy.popular, eval_days);
            if fetched_days != Some(lookback) {
                let cutoff = now - Duration::days(lookback);
                pool = self
                    .source
                    .find_popular_candidates(kind, owner_id, cutoff, &policy.popular, pool_limit)
                    .await?;
                fetched_days = Some(lookback);
            }

            let ranked = classify_popular(&pool, &policy.popular, eval_days, &trending, now);
            if !ranked.is_empty() {
                return Ok(ids_of(&ranked));
            }

            match widen_eval_window(eval_days) {
                Some(next) => {
                    tracing::debug!(
                        kind = %kind,
                        from_days = eval_days,
                        to_days = next,
                        "Popular list empty, widening evaluation window",
                    );
                    eval_days = next;
                }
                None => return Ok(Vec::new()),
            }
        }
    }

    async fn featured_ids(
        &self,
        kind: ContentKind,
        policy: &CategoryPolicy,
        owner_id: Option<DbId>,
        now: Timestamp,
    ) -> Result<Vec<DbId>, CoreError> {
        let active = self
            .promotions
            .get_active_promotions(kind, now, policy.candidate_pool_limit)
            .await?;
        let ranked = rank_featured(active, now);
        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        let target_ids: Vec<DbId> = ranked.iter().map(|p| p.target_id).collect();
        let owners: HashMap<DbId, Option<DbId>> = self
            .source
            .find_by_ids(kind, &target_ids)
            .await?
            .iter()
            .filter(|item| item.is_eligible())
            .map(|item| (item.id(), item.owner_id()))
            .collect();

        Ok(ranked
            .into_iter()
            .filter(|p| match (owners.get(&p.target_id), owner_id) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(item_owner), Some(wanted)) => *item_owner == Some(wanted),
            })
            .map(|p| p.target_id)
            .collect())
    }
}

fn ids_of<T: ContentItem>(items: &[&T]) -> Vec<DbId> {
    items.iter().map(|item| item.id()).collect()
}

/// Paginate a successful pass, or log the failure and return an empty page.
fn finish(
    list: &'static str,
    kind: ContentKind,
    request: PageRequest,
    result: Result<Vec<DbId>, CoreError>,
) -> Page<DbId> {
    match result {
        Ok(ids) => paginate(&ids, request),
        Err(err) => {
            tracing::warn!(
                error = %err,
                list,
                kind = %kind,
                "Ranking query failed, returning empty page",
            );
            Page::empty(request)
        }
    }
}
