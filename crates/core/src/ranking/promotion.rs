//! Paid feature windows (promotions) and Featured ordering.
//!
//! A promotion is a time-boxed, tiered placement for one content item,
//! independent of organic engagement. Per target the lifecycle is
//! `NONE -> ACTIVE -> EXPIRED`; at most one window is active at a time.
//!
//! Renewal is planned here as a pure decision ([`plan_renewal`]) and applied
//! by the store inside whatever serialization guarantee it provides, so the
//! extend-vs-create check and the write cannot interleave with another
//! renewal of the same target.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::ranking::content::ContentKind;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Longest window a single purchase can buy, and the furthest past the
/// renewal instant an extended window may end.
pub const MAX_PROMOTION_DAYS: i32 = 90;

/// Shortest purchasable window.
pub const MIN_PROMOTION_DAYS: i32 = 1;

pub const TIER_STANDARD: &str = "standard";
pub const TIER_PREMIUM: &str = "premium";
pub const TIER_SPOTLIGHT: &str = "spotlight";

/// All valid tier strings, lowest rank first.
pub const VALID_TIERS: &[&str] = &[TIER_STANDARD, TIER_PREMIUM, TIER_SPOTLIGHT];

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// Promotion level. Declaration order is rank order, so the derived `Ord`
/// gives `Standard < Premium < Spotlight`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionTier {
    Standard,
    Premium,
    Spotlight,
}

impl PromotionTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => TIER_STANDARD,
            Self::Premium => TIER_PREMIUM,
            Self::Spotlight => TIER_SPOTLIGHT,
        }
    }

    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            TIER_STANDARD => Ok(Self::Standard),
            TIER_PREMIUM => Ok(Self::Premium),
            TIER_SPOTLIGHT => Ok(Self::Spotlight),
            _ => Err(format!(
                "Invalid promotion tier '{s}'. Must be one of: {}",
                VALID_TIERS.join(", ")
            )),
        }
    }

    /// Lenient parse for request input: unknown or missing tiers become
    /// [`PromotionTier::Standard`].
    pub fn parse_or_default(s: Option<&str>) -> Self {
        s.map(|raw| raw.trim().to_ascii_lowercase())
            .and_then(|raw| Self::from_str_value(&raw).ok())
            .unwrap_or(Self::Standard)
    }
}

impl fmt::Display for PromotionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Promotion record
// ---------------------------------------------------------------------------

/// A stored promotion window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    pub id: DbId,
    pub target_type: ContentKind,
    pub target_id: DbId,
    pub tier: PromotionTier,
    pub start_date: Timestamp,
    pub duration_days: i32,
    pub end_date: Timestamp,
    /// Purchaser of the window.
    pub owner_id: DbId,
}

impl Promotion {
    /// `start_date <= t < end_date`.
    pub fn is_active_at(&self, t: Timestamp) -> bool {
        self.start_date <= t && t < self.end_date
    }
}

/// The window active at `now` among one target's records, preferring the
/// later start (then the higher id) if legacy data has overlaps.
pub fn current_window(records: &[Promotion], now: Timestamp) -> Option<&Promotion> {
    records
        .iter()
        .filter(|p| p.is_active_at(now))
        .max_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.id.cmp(&b.id)))
}

// ---------------------------------------------------------------------------
// Requests and renewal
// ---------------------------------------------------------------------------

/// Clamp requested days to `[MIN_PROMOTION_DAYS, MAX_PROMOTION_DAYS]`.
pub fn clamp_days(days: i64) -> i32 {
    days.clamp(i64::from(MIN_PROMOTION_DAYS), i64::from(MAX_PROMOTION_DAYS)) as i32
}

/// A normalized purchase: tier defaulted, days clamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionRequest {
    pub target_type: ContentKind,
    pub target_id: DbId,
    pub tier: PromotionTier,
    pub days: i32,
    pub owner_id: DbId,
}

impl PromotionRequest {
    pub fn new(
        target_type: ContentKind,
        target_id: DbId,
        tier: PromotionTier,
        days: i64,
        owner_id: DbId,
    ) -> Self {
        Self {
            target_type,
            target_id,
            tier,
            days: clamp_days(days),
            owner_id,
        }
    }
}

/// What a renewal should do to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum RenewalPlan {
    /// Extend the active window in place. `start_date` is unchanged.
    Extend {
        promotion_id: DbId,
        tier: PromotionTier,
        duration_days: i32,
        end_date: Timestamp,
    },
    /// Open a fresh window starting now.
    Create {
        tier: PromotionTier,
        start_date: Timestamp,
        duration_days: i32,
        end_date: Timestamp,
    },
}

/// Decide extend-vs-create for a renewal.
///
/// `current` is the target's window active at `now`, if any (see
/// [`current_window`]). An active window is extended by the requested days,
/// but never to end more than [`MAX_PROMOTION_DAYS`] after `now`; its end
/// never moves backwards and its tier becomes the higher of old and new.
/// Without an active window a new one starts at `now`.
pub fn plan_renewal(
    current: Option<&Promotion>,
    request: &PromotionRequest,
    now: Timestamp,
) -> RenewalPlan {
    let days = clamp_days(i64::from(request.days));

    match current.filter(|p| p.is_active_at(now)) {
        Some(active) => {
            let ceiling = now + Duration::days(i64::from(MAX_PROMOTION_DAYS));
            let headroom = (ceiling - active.end_date).num_days().max(0);
            let added = i64::from(days).min(headroom) as i32;

            RenewalPlan::Extend {
                promotion_id: active.id,
                tier: active.tier.max(request.tier),
                duration_days: active.duration_days.saturating_add(added),
                end_date: active.end_date + Duration::days(i64::from(added)),
            }
        }
        None => RenewalPlan::Create {
            tier: request.tier,
            start_date: now,
            duration_days: days,
            end_date: now + Duration::days(i64::from(days)),
        },
    }
}

// ---------------------------------------------------------------------------
// Featured ordering
// ---------------------------------------------------------------------------

/// Featured precedence between two records: higher tier, then later start,
/// then higher id.
///
/// Stores apply this order before truncating a candidate pool, so a row
/// limit cuts the least prominent windows first.
pub fn featured_precedence(a: &Promotion, b: &Promotion) -> Ordering {
    b.tier
        .cmp(&a.tier)
        .then_with(|| b.start_date.cmp(&a.start_date))
        .then_with(|| b.id.cmp(&a.id))
}

/// Order active promotions for a Featured listing.
///
/// Drops anything not active at `now`, keeps one record per target (later
/// `start_date`, then higher id), and sorts by tier rank descending, then
/// `start_date` descending, then `target_id` descending.
pub fn rank_featured(promotions: Vec<Promotion>, now: Timestamp) -> Vec<Promotion> {
    let mut per_target: HashMap<DbId, Promotion> = HashMap::new();

    for promotion in promotions.into_iter().filter(|p| p.is_active_at(now)) {
        let newer = per_target
            .get(&promotion.target_id)
            .map_or(true, |existing| {
                (existing.start_date, existing.id) < (promotion.start_date, promotion.id)
            });
        if newer {
            per_target.insert(promotion.target_id, promotion);
        }
    }

    let mut ranked: Vec<Promotion> = per_target.into_values().collect();
    ranked.sort_by(|a, b| {
        b.tier
            .cmp(&a.tier)
            .then_with(|| b.start_date.cmp(&a.start_date))
            .then_with(|| b.target_id.cmp(&a.target_id))
    });
    ranked
}
