//! Content ranking and promotion engine.
//!
//! Classifies content items into New, Popular, Trending and paid Featured
//! lists and assembles stable, paginated pages of item IDs. Nothing here is
//! materialized: every call recomputes scores over a candidate pool fetched
//! through the [`store`] traits.
//!
//! Layering, leaves first:
//!
//! - [`content`]: the read-only [`ContentItem`] accessor and [`ContentKind`]
//! - [`scoring`]: popularity and half-life trending scores
//! - [`policy`]: per-category constants ([`CategoryPolicy`], [`PolicySet`])
//! - [`classifier`]: floors, windows, widening and top-up
//! - [`promotion`]: paid feature windows, renewal planning, Featured order
//! - [`page`]: limit/page clamping and slicing
//! - [`engine`]: the [`RankingEngine`] tying them to the stores

pub mod classifier;
pub mod content;
pub mod engine;
pub mod memory;
pub mod page;
pub mod policy;
pub mod promotion;
pub mod scoring;
pub mod store;

pub use content::{ContentItem, ContentKind, ContentSnapshot};
pub use engine::{RankingEngine, RankingQuery};
pub use page::{Page, PageRequest};
pub use policy::{CategoryPolicy, PolicySet};
pub use promotion::{Promotion, PromotionRequest, PromotionTier};
pub use store::{ContentSource, PromotionStore};
