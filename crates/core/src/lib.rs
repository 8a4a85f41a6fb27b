//! Domain logic for the Beatmarket ranking and promotion engine.
//!
//! This crate has zero internal deps: scoring, classification, promotion
//! windows and pagination are pure functions over pre-loaded data, and the
//! storage collaborators are expressed as traits implemented elsewhere
//! (`beatmarket-db` for PostgreSQL, [`ranking::memory`] for tests).

pub mod error;
pub mod ranking;
pub mod types;
