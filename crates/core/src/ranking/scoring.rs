//! Popularity and trending scores computed from engagement counters.
//!
//! Pure functions only. Scores are recomputed on every query.

use crate::ranking::content::ContentItem;
use crate::types::Timestamp;

/// A like counts as this many plays.
pub const LIKE_WEIGHT: i64 = 3;

/// Age floor in days. Keeps brand-new (or undated) items from dividing by
/// a zero age and caps the decay credit they receive.
pub const MIN_AGE_DAYS: f64 = 0.01;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// `plays + 3 * likes`, with negative counters treated as zero.
pub fn engagement_base(plays: i64, likes: i64) -> i64 {
    plays
        .max(0)
        .saturating_add(likes.max(0).saturating_mul(LIKE_WEIGHT))
}

/// Undecayed engagement score used by the Popular classifier.
pub fn popularity_score<T: ContentItem + ?Sized>(item: &T) -> i64 {
    engagement_base(item.play_count(), item.like_count())
}

/// Age of an item in fractional days, floored at [`MIN_AGE_DAYS`].
///
/// Unknown creation times and creation times in the future both land on
/// the floor.
pub fn age_days(created_at: Option<Timestamp>, now: Timestamp) -> f64 {
    match created_at {
        None => MIN_AGE_DAYS,
        Some(created) => {
            let seconds = (now - created).num_seconds() as f64;
            (seconds / SECONDS_PER_DAY).max(MIN_AGE_DAYS)
        }
    }
}

/// `0.5 ^ (age / half_life)`.
pub fn decay_factor(age_days: f64, half_life_days: f64) -> f64 {
    0.5_f64.powf(age_days / half_life_days.max(f64::EPSILON))
}

/// Half-life decayed engagement score used by the Trending classifier.
pub fn trending_score<T: ContentItem + ?Sized>(
    item: &T,
    now: Timestamp,
    half_life_days: f64,
) -> f64 {
    let base = popularity_score(item) as f64;
    base * decay_factor(age_days(item.created_at(), now), half_life_days)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::ranking::content::{ContentKind, ContentSnapshot};

    fn item_aged(age: Duration, plays: i64, likes: i64) -> (ContentSnapshot, Timestamp) {
        let now = Utc::now();
        let item = ContentSnapshot::approved(1, ContentKind::Track, now - age)
            .with_engagement(plays, likes);
        (item, now)
    }

    #[test]
    fn popularity_weights_likes_three_to_one() {
        let (item, _) = item_aged(Duration::days(1), 100, 10);
        assert_eq!(popularity_score(&item), 130);
    }

    #[test]
    fn negative_counters_count_as_zero() {
        assert_eq!(engagement_base(-5, -2), 0);
        assert_eq!(engagement_base(10, -2), 10);
    }

    #[test]
    fn hour_old_item_keeps_most_of_its_score() {
        let (item, now) = item_aged(Duration::hours(1), 100, 10);
        let score = trending_score(&item, now, 2.5);
        // 130 * 0.5^((1/24) / 2.5)
        assert!((score - 128.51).abs() < 0.05, "got {score}");
    }

    #[test]
    fn three_day_old_item_decays_past_half() {
        let (item, now) = item_aged(Duration::days(3), 100, 10);
        let score = trending_score(&item, now, 2.5);
        // 130 * 0.5^(3 / 2.5)
        assert!((score - 56.59).abs() < 0.05, "got {score}");
    }

    #[test]
    fn newer_item_outranks_older_with_equal_engagement() {
        let now = Utc::now();
        let mut previous = f64::INFINITY;
        for hours in [1, 6, 24, 72, 240] {
            let item = ContentSnapshot::approved(1, ContentKind::Track, now - Duration::hours(hours))
                .with_engagement(40, 7);
            let score = trending_score(&item, now, 2.5);
            assert!(score < previous, "score at {hours}h should be below {previous}");
            previous = score;
        }
    }

    #[test]
    fn undated_item_gets_no_decay_credit() {
        let now = Utc::now();
        let mut item = ContentSnapshot::approved(1, ContentKind::Kit, now).with_engagement(10, 0);
        item.created_at = None;
        let score = trending_score(&item, now, 3.0);
        let expected = 10.0 * decay_factor(MIN_AGE_DAYS, 3.0);
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn future_creation_time_clamps_to_floor() {
        let now = Utc::now();
        assert_eq!(age_days(Some(now + Duration::days(2)), now), MIN_AGE_DAYS);
    }

    #[test]
    fn score_halves_every_half_life() {
        assert!((decay_factor(2.5, 2.5) - 0.5).abs() < 1e-12);
        assert!((decay_factor(5.0, 2.5) - 0.25).abs() < 1e-12);
    }
}
