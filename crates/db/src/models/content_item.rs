//! Content item entity model and DTOs.

use beatmarket_core::ranking::ContentItem;
use beatmarket_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `content_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContentItemRow {
    pub id: DbId,
    pub content_kind: String,
    pub owner_id: Option<DbId>,
    pub title: String,
    pub play_count: i64,
    pub like_count: i64,
    pub approved: bool,
    pub rejected: bool,
    pub created_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

impl ContentItem for ContentItemRow {
    fn id(&self) -> DbId {
        self.id
    }

    fn owner_id(&self) -> Option<DbId> {
        self.owner_id
    }

    fn created_at(&self) -> Option<Timestamp> {
        self.created_at
    }

    fn play_count(&self) -> i64 {
        self.play_count
    }

    fn like_count(&self) -> i64 {
        self.like_count
    }

    fn approved(&self) -> bool {
        self.approved
    }

    fn rejected(&self) -> bool {
        self.rejected
    }
}

/// DTO for inserting a content item.
///
/// `created_at` defaults to `NOW()` when absent; counters default to zero.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateContentItem {
    pub content_kind: String,
    pub owner_id: Option<DbId>,
    #[serde(default)]
    pub title: String,
    pub play_count: Option<i64>,
    pub like_count: Option<i64>,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub rejected: bool,
    pub created_at: Option<Timestamp>,
}
