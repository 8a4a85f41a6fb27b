//! In-memory implementations of the store traits.
//!
//! Used by engine tests and handy for local tooling. The promotion ledger
//! holds its mutex across the extend-vs-create decision and the write, which
//! is the same per-target serialization the PostgreSQL store gets from its
//! advisory lock.

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::error::CoreError;
use crate::ranking::classifier::passes_popular_floors;
use crate::ranking::content::{ContentItem, ContentKind, ContentSnapshot};
use crate::ranking::policy::PopularPolicy;
use crate::ranking::promotion::{
    current_window, featured_precedence, plan_renewal, Promotion, PromotionRequest, RenewalPlan,
};
use crate::ranking::scoring::popularity_score;
use crate::ranking::store::{ContentSource, PromotionStore};
use crate::types::{DbId, Timestamp};

fn row_limit(limit: i64) -> usize {
    usize::try_from(limit.max(0)).unwrap_or(usize::MAX)
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    items: RwLock<Vec<ContentSnapshot>>,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<ContentSnapshot>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    /// Insert an item, replacing any existing item with the same kind and id.
    pub async fn upsert(&self, item: ContentSnapshot) {
        let mut items = self.items.write().await;
        items.retain(|existing| !(existing.kind == item.kind && existing.id == item.id));
        items.push(item);
    }

    /// Increment the play counter. Returns `false` if the item does not exist.
    pub async fn record_play(&self, kind: ContentKind, id: DbId) -> bool {
        self.update(kind, id, |item| item.play_count += 1).await
    }

    /// Add `delta` to the like counter, never going below zero.
    pub async fn adjust_likes(&self, kind: ContentKind, id: DbId, delta: i64) -> bool {
        self.update(kind, id, |item| {
            item.like_count = item.like_count.saturating_add(delta).max(0)
        })
        .await
    }

    pub async fn set_moderation(
        &self,
        kind: ContentKind,
        id: DbId,
        approved: bool,
        rejected: bool,
    ) -> bool {
        self.update(kind, id, |item| {
            item.approved = approved;
            item.rejected = rejected;
        })
        .await
    }

    async fn update(
        &self,
        kind: ContentKind,
        id: DbId,
        apply: impl FnOnce(&mut ContentSnapshot),
    ) -> bool {
        let mut items = self.items.write().await;
        match items.iter_mut().find(|item| item.kind == kind && item.id == id) {
            Some(item) => {
                apply(item);
                true
            }
            None => false,
        }
    }

    async fn eligible_newest_first(
        &self,
        kind: ContentKind,
        owner_id: Option<DbId>,
        cutoff: Option<Timestamp>,
        limit: i64,
    ) -> Vec<ContentSnapshot> {
        let items = self.items.read().await;
        let mut matching: Vec<ContentSnapshot> = items
            .iter()
            .filter(|item| item.kind == kind && item.is_eligible())
            .filter(|item| owner_id.is_none() || item.owner_id == owner_id)
            .filter(|item| match (cutoff, item.created_at) {
                (Some(cutoff), Some(created)) => created >= cutoff,
                _ => true,
            })
            .cloned()
            .collect();

        // Undated items count as newest.
        matching.sort_by(|a, b| match (a.created_at, b.created_at) {
            (Some(a_at), Some(b_at)) => b_at.cmp(&a_at).then_with(|| b.id.cmp(&a.id)),
            (None, Some(_)) => std::cmp::Ordering::Less,
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, None) => b.id.cmp(&a.id),
        });
        matching.truncate(row_limit(limit));
        matching
    }
}

#[async_trait]
impl ContentSource for InMemoryContentStore {
    type Item = ContentSnapshot;

    async fn find_approved_since(
        &self,
        kind: ContentKind,
        owner_id: Option<DbId>,
        cutoff: Timestamp,
        limit: i64,
    ) -> Result<Vec<ContentSnapshot>, CoreError> {
        Ok(self
            .eligible_newest_first(kind, owner_id, Some(cutoff), limit)
            .await)
    }

    async fn find_popular_candidates(
        &self,
        kind: ContentKind,
        owner_id: Option<DbId>,
        cutoff: Timestamp,
        floors: &PopularPolicy,
        limit: i64,
    ) -> Result<Vec<ContentSnapshot>, CoreError> {
        let mut matching: Vec<ContentSnapshot> = self
            .eligible_newest_first(kind, owner_id, Some(cutoff), i64::MAX)
            .await
            .into_iter()
            .filter(|item| passes_popular_floors(item, floors))
            .collect();

        // Stable sort keeps the newest-first order among equal scores.
        matching.sort_by_key(|item| std::cmp::Reverse(popularity_score(item)));
        matching.truncate(row_limit(limit));
        Ok(matching)
    }

    async fn find_approved_ordered_by_created_desc(
        &self,
        kind: ContentKind,
        owner_id: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<ContentSnapshot>, CoreError> {
        Ok(self.eligible_newest_first(kind, owner_id, None, limit).await)
    }

    async fn find_by_ids(
        &self,
        kind: ContentKind,
        ids: &[DbId],
    ) -> Result<Vec<ContentSnapshot>, CoreError> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .filter(|item| item.kind == kind && ids.contains(&item.id))
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Promotions
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Ledger {
    records: Vec<Promotion>,
    next_id: DbId,
}

#[derive(Debug)]
pub struct InMemoryPromotionStore {
    ledger: Mutex<Ledger>,
}

impl Default for InMemoryPromotionStore {
    fn default() -> Self {
        Self {
            ledger: Mutex::new(Ledger {
                records: Vec::new(),
                next_id: 1,
            }),
        }
    }
}

impl InMemoryPromotionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<Promotion> {
        self.ledger.lock().await.records.clone()
    }
}

#[async_trait]
impl PromotionStore for InMemoryPromotionStore {
    async fn get_active_promotions(
        &self,
        kind: ContentKind,
        as_of: Timestamp,
        limit: i64,
    ) -> Result<Vec<Promotion>, CoreError> {
        let ledger = self.ledger.lock().await;
        let mut active: Vec<Promotion> = ledger
            .records
            .iter()
            .filter(|p| p.target_type == kind && p.is_active_at(as_of))
            .cloned()
            .collect();
        active.sort_by(featured_precedence);
        active.truncate(row_limit(limit));
        Ok(active)
    }

    async fn save_promotion(
        &self,
        request: &PromotionRequest,
        now: Timestamp,
    ) -> Result<Promotion, CoreError> {
        let mut ledger = self.ledger.lock().await;

        let target_records: Vec<Promotion> = ledger
            .records
            .iter()
            .filter(|p| p.target_type == request.target_type && p.target_id == request.target_id)
            .cloned()
            .collect();

        match plan_renewal(current_window(&target_records, now), request, now) {
            RenewalPlan::Extend {
                promotion_id,
                tier,
                duration_days,
                end_date,
            } => {
                let record = ledger
                    .records
                    .iter_mut()
                    .find(|p| p.id == promotion_id)
                    .ok_or_else(|| {
                        CoreError::Internal(format!(
                            "promotion {promotion_id} vanished while locked"
                        ))
                    })?;
                record.tier = tier;
                record.duration_days = duration_days;
                record.end_date = end_date;
                Ok(record.clone())
            }
            RenewalPlan::Create {
                tier,
                start_date,
                duration_days,
                end_date,
            } => {
                let promotion = Promotion {
                    id: ledger.next_id,
                    target_type: request.target_type,
                    target_id: request.target_id,
                    tier,
                    start_date,
                    duration_days,
                    end_date,
                    owner_id: request.owner_id,
                };
                ledger.next_id += 1;
                ledger.records.push(promotion.clone());
                Ok(promotion)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use super::*;
    use crate::ranking::promotion::PromotionTier;

    #[tokio::test]
    async fn find_approved_since_filters_owner_window_and_moderation() {
        let now = Utc::now();
        let store = InMemoryContentStore::with_items(vec![
            ContentSnapshot::approved(1, ContentKind::Track, now - Duration::days(1)).with_owner(7),
            ContentSnapshot::approved(2, ContentKind::Track, now - Duration::days(1)).with_owner(8),
            ContentSnapshot::approved(3, ContentKind::Track, now - Duration::days(30)).with_owner(7),
            ContentSnapshot::approved(4, ContentKind::Kit, now).with_owner(7),
        ]);
        store.set_moderation(ContentKind::Track, 2, true, true).await;

        let global = store
            .find_approved_since(ContentKind::Track, None, now - Duration::days(7), 10)
            .await
            .unwrap();
        assert_eq!(global.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1]);

        let owned = store
            .find_approved_ordered_by_created_desc(ContentKind::Track, Some(7), 10)
            .await
            .unwrap();
        assert_eq!(owned.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[tokio::test]
    async fn popular_candidates_are_floored_and_ordered_by_score() {
        let now = Utc::now();
        let store = InMemoryContentStore::with_items(vec![
            ContentSnapshot::approved(1, ContentKind::Track, now - Duration::days(1))
                .with_engagement(60, 10),
            ContentSnapshot::approved(2, ContentKind::Track, now - Duration::days(50))
                .with_engagement(300, 0),
            ContentSnapshot::approved(3, ContentKind::Track, now - Duration::days(2))
                .with_engagement(5, 1),
            ContentSnapshot::approved(4, ContentKind::Track, now - Duration::days(200))
                .with_engagement(900, 0),
        ]);
        let floors = crate::ranking::policy::CategoryPolicy::track().popular;

        let pool = store
            .find_popular_candidates(ContentKind::Track, None, now - Duration::days(90), &floors, 1)
            .await
            .unwrap();
        assert_eq!(pool.iter().map(|i| i.id).collect::<Vec<_>>(), vec![2]);

        let pool = store
            .find_popular_candidates(ContentKind::Track, None, now - Duration::days(90), &floors, 10)
            .await
            .unwrap();
        assert_eq!(pool.iter().map(|i| i.id).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[tokio::test]
    async fn active_promotions_are_truncated_by_precedence() {
        let now = Utc::now();
        let store = InMemoryPromotionStore::new();
        let buys = [
            (1, PromotionTier::Standard),
            (2, PromotionTier::Standard),
            (3, PromotionTier::Spotlight),
        ];
        for (offset, (target, tier)) in buys.into_iter().enumerate() {
            let request = PromotionRequest::new(ContentKind::Track, target, tier, 7, 1);
            let at = now + Duration::seconds(offset as i64);
            store.save_promotion(&request, at).await.unwrap();
        }

        let active = store
            .get_active_promotions(ContentKind::Track, now + Duration::minutes(1), 2)
            .await
            .unwrap();
        assert_eq!(active.iter().map(|p| p.target_id).collect::<Vec<_>>(), vec![3, 2]);
    }

    #[tokio::test]
    async fn counters_never_go_negative() {
        let store = InMemoryContentStore::new();
        store
            .upsert(ContentSnapshot::approved(1, ContentKind::Track, Utc::now()))
            .await;
        assert!(store.record_play(ContentKind::Track, 1).await);
        assert!(store.adjust_likes(ContentKind::Track, 1, -3).await);
        assert!(!store.record_play(ContentKind::Track, 99).await);

        let items = store.find_by_ids(ContentKind::Track, &[1]).await.unwrap();
        assert_eq!(items[0].play_count, 1);
        assert_eq!(items[0].like_count, 0);
    }

    #[tokio::test]
    async fn concurrent_renewals_do_not_double_extend() {
        let now = Utc::now();
        let store = Arc::new(InMemoryPromotionStore::new());
        let request = PromotionRequest::new(ContentKind::Track, 5, PromotionTier::Standard, 10, 1);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            let request = request.clone();
            handles.push(tokio::spawn(async move {
                store.save_promotion(&request, now).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let records = store.records().await;
        assert_eq!(records.len(), 1, "only one window may exist for the target");
        // One purchase opens 10 days, the other seven extend it by 10 each.
        assert_eq!(records[0].end_date, now + Duration::days(80));
        assert_eq!(records[0].start_date, now);
    }
}
