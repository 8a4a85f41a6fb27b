//! Per-category ranking constants.
//!
//! Tracks, bundles and kits share one engine; everything that differs
//! between them lives in a [`CategoryPolicy`] so floors and decay constants
//! cannot drift apart between separate code paths.

use serde::{Deserialize, Serialize};

use crate::ranking::content::ContentKind;

// ---------------------------------------------------------------------------
// Shared limits
// ---------------------------------------------------------------------------

/// Popular fallback widening never looks back further than this.
pub const MAX_EVAL_WINDOW_DAYS: i64 = 365;

/// Page size used when the caller does not send a limit.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Largest page a caller may request, unless a category allows more.
pub const DEFAULT_MAX_PAGE_SIZE: i64 = 100;

/// Maximum rows fetched from the content store for one candidate pool.
pub const DEFAULT_CANDIDATE_POOL_LIMIT: i64 = 1000;

// ---------------------------------------------------------------------------
// Policy structs
// ---------------------------------------------------------------------------

/// Trending: short pool, light noise floors, half-life decay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendingPolicy {
    pub half_life_days: f64,
    pub pool_days: i64,
    pub min_plays: i64,
    pub min_likes: i64,
}

/// Popular: engagement lookback, hard age ceiling, and score floors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularPolicy {
    pub eval_window_days: i64,
    pub max_age_days: i64,
    pub min_plays: i64,
    pub min_likes: i64,
    pub min_score: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPolicy {
    pub window_days: i64,
}

/// Every constant the engine needs for one content category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryPolicy {
    pub trending: TrendingPolicy,
    pub popular: PopularPolicy,
    pub new: NewPolicy,
    pub max_page_size: i64,
    pub candidate_pool_limit: i64,
}

impl CategoryPolicy {
    pub fn track() -> Self {
        Self {
            trending: TrendingPolicy {
                half_life_days: 2.5,
                pool_days: 21,
                min_plays: 10,
                min_likes: 2,
            },
            popular: PopularPolicy {
                eval_window_days: 60,
                max_age_days: 90,
                min_plays: 50,
                min_likes: 5,
                min_score: 80,
            },
            new: NewPolicy { window_days: 14 },
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            candidate_pool_limit: DEFAULT_CANDIDATE_POOL_LIMIT,
        }
    }

    pub fn bundle() -> Self {
        Self {
            trending: TrendingPolicy {
                half_life_days: 3.0,
                pool_days: 21,
                min_plays: 5,
                min_likes: 1,
            },
            popular: PopularPolicy {
                eval_window_days: 60,
                max_age_days: 180,
                min_plays: 20,
                min_likes: 3,
                min_score: 30,
            },
            new: NewPolicy { window_days: 30 },
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            candidate_pool_limit: DEFAULT_CANDIDATE_POOL_LIMIT,
        }
    }

    pub fn kit() -> Self {
        Self {
            trending: TrendingPolicy {
                half_life_days: 3.0,
                pool_days: 21,
                min_plays: 5,
                min_likes: 1,
            },
            popular: PopularPolicy {
                eval_window_days: 60,
                max_age_days: 365,
                min_plays: 20,
                min_likes: 3,
                min_score: 30,
            },
            new: NewPolicy { window_days: 60 },
            max_page_size: 200,
            candidate_pool_limit: DEFAULT_CANDIDATE_POOL_LIMIT,
        }
    }

    pub fn for_kind(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Track => Self::track(),
            ContentKind::Bundle => Self::bundle(),
            ContentKind::Kit => Self::kit(),
        }
    }
}

/// One [`CategoryPolicy`] per [`ContentKind`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicySet {
    pub track: CategoryPolicy,
    pub bundle: CategoryPolicy,
    pub kit: CategoryPolicy,
}

impl Default for PolicySet {
    fn default() -> Self {
        Self {
            track: CategoryPolicy::track(),
            bundle: CategoryPolicy::bundle(),
            kit: CategoryPolicy::kit(),
        }
    }
}

impl PolicySet {
    pub fn get(&self, kind: ContentKind) -> &CategoryPolicy {
        match kind {
            ContentKind::Track => &self.track,
            ContentKind::Bundle => &self.bundle,
            ContentKind::Kit => &self.kit,
        }
    }

    pub fn get_mut(&mut self, kind: ContentKind) -> &mut CategoryPolicy {
        match kind {
            ContentKind::Track => &mut self.track,
            ContentKind::Bundle => &mut self.bundle,
            ContentKind::Kit => &mut self.kit,
        }
    }

    /// Apply one candidate pool limit to every category. Values below 1 are
    /// raised to 1.
    pub fn with_candidate_pool_limit(mut self, limit: i64) -> Self {
        for kind in ContentKind::ALL {
            self.get_mut(kind).candidate_pool_limit = limit.max(1);
        }
        self
    }
}
