use std::sync::Arc;

use beatmarket_core::ranking::{PolicySet, RankingEngine};
use beatmarket_db::store::{PgContentSource, PgPromotionStore};

use crate::config::ServerConfig;

/// The ranking engine wired to PostgreSQL.
pub type PgRankingEngine = RankingEngine<PgContentSource, PgPromotionStore>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: beatmarket_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Ranking engine over the same pool.
    pub engine: Arc<PgRankingEngine>,
}

impl AppState {
    /// Build state and the engine, applying the configured pool limit to
    /// every category policy.
    pub fn new(pool: beatmarket_db::DbPool, config: ServerConfig) -> Self {
        let policies = PolicySet::default().with_candidate_pool_limit(config.candidate_pool_limit);
        let engine = RankingEngine::new(
            PgContentSource::new(pool.clone()),
            PgPromotionStore::new(pool.clone()),
        )
        .with_policies(policies);

        Self {
            pool,
            config: Arc::new(config),
            engine: Arc::new(engine),
        }
    }
}
