//! Content categories and the read-only item accessor the engine scores.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Database value for tracks (single beats / songs).
pub const KIND_TRACK: &str = "track";

/// Database value for bundles (packs of tracks sold together).
pub const KIND_BUNDLE: &str = "bundle";

/// Database value for sound-kits.
pub const KIND_KIT: &str = "kit";

/// All valid content kind strings as stored in `content_items.content_kind`.
pub const VALID_CONTENT_KINDS: &[&str] = &[KIND_TRACK, KIND_BUNDLE, KIND_KIT];

// ---------------------------------------------------------------------------
// ContentKind
// ---------------------------------------------------------------------------

/// The content category a ranking or promotion applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Track,
    Bundle,
    Kit,
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [ContentKind::Track, ContentKind::Bundle, ContentKind::Kit];

    /// The canonical database / wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Track => KIND_TRACK,
            Self::Bundle => KIND_BUNDLE,
            Self::Kit => KIND_KIT,
        }
    }

    /// Convert from a database string value. Only canonical values are accepted.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            KIND_TRACK => Ok(Self::Track),
            KIND_BUNDLE => Ok(Self::Bundle),
            KIND_KIT => Ok(Self::Kit),
            _ => Err(format!(
                "Invalid content kind '{s}'. Must be one of: {}",
                VALID_CONTENT_KINDS.join(", ")
            )),
        }
    }

    /// Lenient parse for user-facing input (URL segments, request bodies).
    ///
    /// Accepts singular and plural forms plus the legacy category names
    /// (`beat`, `pack`, `sound-kit`), case-insensitively. Returns `None`
    /// for anything else so callers can degrade instead of failing.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "track" | "tracks" | "beat" | "beats" => Some(Self::Track),
            "bundle" | "bundles" | "pack" | "packs" => Some(Self::Bundle),
            "kit" | "kits" | "sound-kit" | "sound-kits" | "sound_kit" | "sound_kits" => {
                Some(Self::Kit)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ContentItem accessor
// ---------------------------------------------------------------------------

/// Read-only view over any rankable content item.
///
/// Counters are maintained by play-tracking and like/unlike collaborators
/// outside the engine; moderation flags are set once by review. The engine
/// only ever reads these values.
pub trait ContentItem {
    fn id(&self) -> DbId;
    fn owner_id(&self) -> Option<DbId>;
    /// `None` is treated as "now" everywhere a creation time is needed.
    fn created_at(&self) -> Option<Timestamp>;
    fn play_count(&self) -> i64;
    fn like_count(&self) -> i64;
    fn approved(&self) -> bool;
    fn rejected(&self) -> bool;

    /// An item may appear in any ranked list only when approved and not rejected.
    fn is_eligible(&self) -> bool {
        self.approved() && !self.rejected()
    }

    /// Creation time, falling back to `now` when unknown.
    fn created_or(&self, now: Timestamp) -> Timestamp {
        self.created_at().unwrap_or(now)
    }
}

/// A plain in-memory content item.
///
/// Used by [`crate::ranking::memory`] and by tests; the database layer has
/// its own row type implementing [`ContentItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSnapshot {
    pub id: DbId,
    pub kind: ContentKind,
    pub owner_id: Option<DbId>,
    pub created_at: Option<Timestamp>,
    pub play_count: i64,
    pub like_count: i64,
    pub approved: bool,
    pub rejected: bool,
}

impl ContentSnapshot {
    /// An approved item with no engagement yet.
    pub fn approved(id: DbId, kind: ContentKind, created_at: Timestamp) -> Self {
        Self {
            id,
            kind,
            owner_id: None,
            created_at: Some(created_at),
            play_count: 0,
            like_count: 0,
            approved: true,
            rejected: false,
        }
    }

    pub fn with_owner(mut self, owner_id: DbId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn with_engagement(mut self, plays: i64, likes: i64) -> Self {
        self.play_count = plays;
        self.like_count = likes;
        self
    }
}

impl ContentItem for ContentSnapshot {
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
