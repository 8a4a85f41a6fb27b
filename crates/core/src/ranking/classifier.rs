//! New / Popular / Trending classification over candidate pools.
//!
//! Each classifier takes a pool already fetched by the store, applies its
//! window and floors, and returns a fully ordered, deduplicated list of
//! references into the pool. Ineligible items (unapproved or rejected) are
//! always dropped here, whatever the store returned.
//!
//! Every ordering ends with `created_at` descending and then `id`
//! descending, so identical scores still produce one deterministic order.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::Duration;

use crate::ranking::content::ContentItem;
use crate::ranking::policy::{NewPolicy, PopularPolicy, TrendingPolicy, MAX_EVAL_WINDOW_DAYS};
use crate::ranking::scoring::{popularity_score, trending_score};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Ordering helpers
// ---------------------------------------------------------------------------

/// Newer first; ties broken by higher id first.
fn newest_first<T: ContentItem>(a: &T, b: &T, now: Timestamp) -> Ordering {
    b.created_or(now)
        .cmp(&a.created_or(now))
        .then_with(|| b.id().cmp(&a.id()))
}

/// Keep the first occurrence of each id, preserving order.
fn dedup_by_id<T: ContentItem>(items: &mut Vec<&T>) {
    let mut seen = HashSet::with_capacity(items.len());
    items.retain(|item| seen.insert(item.id()));
}

fn window_start(now: Timestamp, days: i64) -> Timestamp {
    now - Duration::days(days.max(0))
}

// ---------------------------------------------------------------------------
// Trending
// ---------------------------------------------------------------------------

/// Items created within `pool_days` that clear either light floor, ordered
/// by decayed score.
///
/// An empty result is a normal outcome; Trending never widens.
pub fn classify_trending<'a, T: ContentItem>(
    pool: &'a [T],
    policy: &TrendingPolicy,
    now: Timestamp,
) -> Vec<&'a T> {
    let cutoff = window_start(now, policy.pool_days);

    let mut scored: Vec<(&T, f64)> = pool
        .iter()
        .filter(|item| item.is_eligible())
        .filter(|item| item.created_or(now) >= cutoff)
        .filter(|item| {
            item.play_count() >= policy.min_plays || item.like_count() >= policy.min_likes
        })
        .map(|item| (item, trending_score(item, now, policy.half_life_days)))
        .collect();

    scored.sort_by(|(a, score_a), (b, score_b)| {
        score_b
            .total_cmp(score_a)
            .then_with(|| newest_first(*a, *b, now))
    });

    let mut ranked: Vec<&T> = scored.into_iter().map(|(item, _)| item).collect();
    dedup_by_id(&mut ranked);
    ranked
}

// ---------------------------------------------------------------------------
// Popular
// ---------------------------------------------------------------------------

/// True when the item clears the Popular floors:
/// `(plays >= min_plays OR likes >= min_likes) AND score >= min_score`.
pub fn passes_popular_floors<T: ContentItem>(item: &T, policy: &PopularPolicy) -> bool {
    let engaged = item.play_count() >= policy.min_plays || item.like_count() >= policy.min_likes;
    engaged && popularity_score(item) >= policy.min_score
}

/// One Popular pass for a given evaluation window.
///
/// Items inside both `eval_window_days` and `max_age_days` that clear the
/// floors and are not in `trending` are ordered by undecayed score. The
/// caller drives fallback widening with [`widen_eval_window`].
pub fn classify_popular<'a, T: ContentItem>(
    pool: &'a [T],
    policy: &PopularPolicy,
    eval_window_days: i64,
    trending: &HashSet<DbId>,
    now: Timestamp,
) -> Vec<&'a T> {
    let cutoff = window_start(now, effective_popular_days(policy, eval_window_days));

    let mut ranked: Vec<&T> = pool
        .iter()
        .filter(|item| item.is_eligible())
        .filter(|item| item.created_or(now) >= cutoff)
        .filter(|item| passes_popular_floors(*item, policy))
        .filter(|item| !trending.contains(&item.id()))
        .collect();

    ranked.sort_by(|a, b| {
        popularity_score(*b)
            .cmp(&popularity_score(*a))
            .then_with(|| newest_first(*a, *b, now))
    });
    dedup_by_id(&mut ranked);
    ranked
}

/// Lookback actually applied by a Popular pass: the evaluation window,
/// never past the hard age ceiling.
pub fn effective_popular_days(policy: &PopularPolicy, eval_window_days: i64) -> i64 {
    eval_window_days.min(policy.max_age_days)
}

/// Next evaluation window after an empty Popular pass, or `None` once the
/// window has reached [`MAX_EVAL_WINDOW_DAYS`].
pub fn widen_eval_window(current_days: i64) -> Option<i64> {
    if current_days >= MAX_EVAL_WINDOW_DAYS {
        return None;
    }
    Some(current_days.max(1).saturating_mul(2).min(MAX_EVAL_WINDOW_DAYS))
}

// ---------------------------------------------------------------------------
// New
// ---------------------------------------------------------------------------

/// Newest-first list of items created within the New window, topped up
/// from `fallback` when short of `fill_to` items.
///
/// `fallback` is the store's newest-first eligible list without a window.
/// Windowed items always come first and keep their order; fallback items
/// are appended in newest-first order, skipping ids already present, until
/// `fill_to` is reached or the fallback is exhausted.
pub fn classify_new<'a, T: ContentItem>(
    windowed: &'a [T],
    fallback: &'a [T],
    policy: &NewPolicy,
    fill_to: usize,
    now: Timestamp,
) -> Vec<&'a T> {
    let cutoff = window_start(now, policy.window_days);

    let mut ranked: Vec<&T> = windowed
        .iter()
        .filter(|item| item.is_eligible())
        .filter(|item| item.created_or(now) >= cutoff)
        .collect();
    ranked.sort_by(|a, b| newest_first(*a, *b, now));
    dedup_by_id(&mut ranked);

    if ranked.len() >= fill_to {
        return ranked;
    }

    let mut seen: HashSet<DbId> = ranked.iter().map(|item| item.id()).collect();
    let mut extra: Vec<&T> = fallback.iter().filter(|item| item.is_eligible()).collect();
    extra.sort_by(|a, b| newest_first(*a, *b, now));

    for item in extra {
        if ranked.len() >= fill_to {
            break;
        }
        if seen.insert(item.id()) {
            ranked.push(item);
        }
    }

    ranked
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::ranking::content::{ContentKind, ContentSnapshot};
    use crate::ranking::policy::CategoryPolicy;

    fn aged(id: DbId, now: Timestamp, days: i64, plays: i64, likes: i64) -> ContentSnapshot {
        ContentSnapshot::approved(id, ContentKind::Track, now - Duration::days(days))
            .with_engagement(plays, likes)
    }

    fn ids<T: ContentItem>(items: &[&T]) -> Vec<DbId> {
        items.iter().map(|item| item.id()).collect()
    }

    // -- trending ------------------------------------------------------------

    #[test]
    fn trending_orders_by_decayed_score() {
        let now = Utc::now();
        let policy = CategoryPolicy::track().trending;
        let pool = vec![
            aged(1, now, 3, 100, 10),
            aged(2, now, 0, 100, 10),
            aged(3, now, 1, 400, 0),
        ];
        let ranked = classify_trending(&pool, &policy, now);
        assert_eq!(ids(&ranked), vec![3, 2, 1]);
    }

    #[test]
    fn trending_drops_items_outside_pool_window() {
        let now = Utc::now();
        let policy = CategoryPolicy::track().trending;
        let pool = vec![aged(1, now, 30, 10_000, 500), aged(2, now, 2, 20, 0)];
        let ranked = classify_trending(&pool, &policy, now);
        assert_eq!(ids(&ranked), vec![2]);
    }

    #[test]
    fn trending_light_floor_is_either_plays_or_likes() {
        let now = Utc::now();
        let policy = CategoryPolicy::track().trending; // 10 plays or 2 likes
        let pool = vec![
            aged(1, now, 1, 9, 1),
            aged(2, now, 1, 0, 2),
            aged(3, now, 1, 10, 0),
        ];
        let ranked = classify_trending(&pool, &policy, now);
        let mut got = ids(&ranked);
        got.sort_unstable();
        assert_eq!(got, vec![2, 3]);
    }

    #[test]
    fn trending_empty_pool_is_valid() {
        let now = Utc::now();
        let pool: Vec<ContentSnapshot> = Vec::new();
        assert!(classify_trending(&pool, &CategoryPolicy::kit().trending, now).is_empty());
    }

    #[test]
    fn trending_ties_break_by_newest_then_id() {
        let now = Utc::now();
        let policy = CategoryPolicy::track().trending;
        let created = now - Duration::days(1);
        let pool = vec![
            ContentSnapshot::approved(5, ContentKind::Track, created).with_engagement(50, 0),
            ContentSnapshot::approved(9, ContentKind::Track, created).with_engagement(50, 0),
            ContentSnapshot::approved(7, ContentKind::Track, created).with_engagement(50, 0),
        ];
        let ranked = classify_trending(&pool, &policy, now);
        assert_eq!(ids(&ranked), vec![9, 7, 5]);
    }

    #[test]
    fn trending_skips_rejected_items() {
        let now = Utc::now();
        let mut rejected = aged(1, now, 1, 500, 50);
        rejected.rejected = true;
        let pool = vec![rejected, aged(2, now, 1, 20, 0)];
        let ranked = classify_trending(&pool, &CategoryPolicy::track().trending, now);
        assert_eq!(ids(&ranked), vec![2]);
    }

    // -- popular -------------------------------------------------------------

    #[test]
    fn popular_floor_example() {
        let now = Utc::now();
        let policy = PopularPolicy {
            eval_window_days: 60,
            max_age_days: 90,
            min_plays: 50,
            min_likes: 5,
            min_score: 80,
        };
        // 60 + 3*3 = 69: clears the plays floor but not the score floor.
        let weak = aged(1, now, 10, 60, 3);
        // 55 + 3*10 = 85.
        let strong = aged(2, now, 10, 55, 10);
        assert!(!passes_popular_floors(&weak, &policy));
        assert!(passes_popular_floors(&strong, &policy));

        let pool = vec![weak, strong];
        let ranked = classify_popular(&pool, &policy, 60, &HashSet::new(), now);
        assert_eq!(ids(&ranked), vec![2]);
    }

    #[test]
    fn popular_excludes_trending_items() {
        let now = Utc::now();
        let policy = CategoryPolicy::track().popular;
        let pool = vec![aged(1, now, 5, 500, 20), aged(2, now, 40, 300, 10)];
        let trending: HashSet<DbId> = [1].into_iter().collect();
        let ranked = classify_popular(&pool, &policy, 60, &trending, now);
        assert_eq!(ids(&ranked), vec![2]);
    }

    #[test]
    fn popular_orders_by_score_then_newest() {
        let now = Utc::now();
        let policy = CategoryPolicy::track().popular;
        let pool = vec![
            aged(1, now, 30, 100, 0),
            aged(2, now, 20, 100, 0),
            aged(3, now, 50, 400, 0),
        ];
        let ranked = classify_popular(&pool, &policy, 60, &HashSet::new(), now);
        assert_eq!(ids(&ranked), vec![3, 2, 1]);
    }

    #[test]
    fn popular_respects_eval_window_and_max_age() {
        let now = Utc::now();
        let policy = CategoryPolicy::track().popular; // eval 60, max age 90
        let pool = vec![aged(1, now, 75, 500, 0), aged(2, now, 120, 500, 0)];

        let narrow = classify_popular(&pool, &policy, 60, &HashSet::new(), now);
        assert!(narrow.is_empty());

        // Widened past the max age: the 120-day item stays out.
        let wide = classify_popular(&pool, &policy, 240, &HashSet::new(), now);
        assert_eq!(ids(&wide), vec![1]);
    }

    #[test]
    fn widening_doubles_until_cap_then_stops() {
        assert_eq!(widen_eval_window(60), Some(120));
        assert_eq!(widen_eval_window(240), Some(365));
        assert_eq!(widen_eval_window(365), None);
        assert_eq!(widen_eval_window(400), None);
    }

    #[test]
    fn widening_from_zero_terminates_at_cap() {
        let mut visited = vec![0];
        while let Some(next) = widen_eval_window(*visited.last().unwrap()) {
            visited.push(next);
        }
        assert_eq!(visited, vec![0, 2, 4, 8, 16, 32, 64, 128, 256, 365]);
    }

    #[test]
    fn effective_window_never_exceeds_max_age() {
        let policy = CategoryPolicy::track().popular;
        assert_eq!(effective_popular_days(&policy, 60), 60);
        assert_eq!(effective_popular_days(&policy, 365), 90);
    }

    // -- new -----------------------------------------------------------------

    #[test]
    fn new_sorts_windowed_items_newest_first() {
        let now = Utc::now();
        let policy = NewPolicy { window_days: 14 };
        let windowed = vec![aged(1, now, 5, 0, 0), aged(2, now, 1, 0, 0), aged(3, now, 3, 0, 0)];
        let ranked = classify_new(&windowed, &[], &policy, 2, now);
        assert_eq!(ids(&ranked), vec![2, 3, 1]);
    }

    #[test]
    fn new_tops_up_from_fallback_without_duplicates() {
        let now = Utc::now();
        let policy = NewPolicy { window_days: 14 };
        let windowed = vec![aged(1, now, 2, 0, 0)];
        let fallback = vec![
            aged(1, now, 2, 0, 0),
            aged(4, now, 40, 0, 0),
            aged(5, now, 20, 0, 0),
            aged(6, now, 90, 0, 0),
        ];
        let ranked = classify_new(&windowed, &fallback, &policy, 3, now);
        assert_eq!(ids(&ranked), vec![1, 5, 4]);
    }

    #[test]
    fn new_top_up_stops_when_fallback_exhausted() {
        let now = Utc::now();
        let policy = NewPolicy { window_days: 14 };
        let fallback = vec![aged(7, now, 30, 0, 0)];
        let ranked = classify_new::<ContentSnapshot>(&[], &fallback, &policy, 10, now);
        assert_eq!(ids(&ranked), vec![7]);
    }

    #[test]
    fn new_does_not_top_up_a_full_page() {
        let now = Utc::now();
        let policy = NewPolicy { window_days: 14 };
        let windowed = vec![aged(1, now, 1, 0, 0), aged(2, now, 2, 0, 0)];
        let fallback = vec![aged(3, now, 60, 0, 0)];
        let ranked = classify_new(&windowed, &fallback, &policy, 2, now);
        assert_eq!(ids(&ranked), vec![1, 2]);
    }

    #[test]
    fn new_treats_undated_items_as_newest() {
        let now = Utc::now();
        let policy = NewPolicy { window_days: 14 };
        let mut undated = aged(8, now, 0, 0, 0);
        undated.created_at = None;
        let windowed = vec![aged(1, now, 1, 0, 0), undated];
        let ranked = classify_new(&windowed, &[], &policy, 1, now);
        assert_eq!(ids(&ranked), vec![8, 1]);
    }
}
