//! Handlers for the `/rankings` resource.
//!
//! Each list is recomputed per request. `{kind}` accepts the canonical kind
//! names and their common aliases (`tracks`, `beats`, `packs`, `sound-kits`);
//! anything else yields an empty page rather than an error.

use axum::extract::{Path, Query, State};
use axum::Json;
use beatmarket_core::ranking::policy::DEFAULT_MAX_PAGE_SIZE;
use beatmarket_core::ranking::{ContentKind, Page, PageRequest, RankingQuery};
use beatmarket_core::types::DbId;
use chrono::Utc;

use crate::query::RankingParams;
use crate::response::DataResponse;
use crate::state::AppState;

type RankingResponse = Json<DataResponse<Page<DbId>>>;

/// Which ranked list to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankingList {
    New,
    Popular,
    Trending,
    Featured,
}

impl RankingList {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Popular => "popular",
            Self::Trending => "trending",
            Self::Featured => "featured",
        }
    }
}

async fn list(
    state: &AppState,
    raw_kind: &str,
    params: RankingParams,
    which: RankingList,
) -> RankingResponse {
    let query = RankingQuery::from(params);
    let engine = &state.engine;

    let Some(kind) = ContentKind::parse(raw_kind) else {
        tracing::debug!(kind = raw_kind, list = which.as_str(), "Unknown content kind");
        // No category applies, so echo the limit clamped to the shared default.
        let request = PageRequest::clamped(query.page, query.limit, DEFAULT_MAX_PAGE_SIZE);
        return Json(DataResponse {
            data: Page::empty(request),
        });
    };

    let now = Utc::now();
    let page = match which {
        RankingList::New => engine.get_new(kind, &query, now).await,
        RankingList::Popular => engine.get_popular(kind, &query, now).await,
        RankingList::Trending => engine.get_trending(kind, &query, now).await,
        RankingList::Featured => engine.get_featured(kind, &query, now).await,
    };

    Json(DataResponse { data: page })
}

// ---------------------------------------------------------------------------
// GET /rankings/{kind}/...
// ---------------------------------------------------------------------------

/// Newest eligible items, topped up past the New window when sparse.
pub async fn get_new(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<RankingParams>,
) -> RankingResponse {
    list(&state, &kind, params, RankingList::New).await
}

/// Sustained-engagement items, never overlapping Trending.
pub async fn get_popular(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<RankingParams>,
) -> RankingResponse {
    list(&state, &kind, params, RankingList::Popular).await
}

/// Recent items by half-life decayed engagement.
pub async fn get_trending(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<RankingParams>,
) -> RankingResponse {
    list(&state, &kind, params, RankingList::Trending).await
}

/// Items with an active promotion, by tier then recency.
pub async fn get_featured(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<RankingParams>,
) -> RankingResponse {
    list(&state, &kind, params, RankingList::Featured).await
}
