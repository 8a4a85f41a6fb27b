//! Shared query parameter types for API handlers.
//!
//! Ranking is a best-effort read path: malformed numbers are treated as
//! absent and fall back to the engine's defaults instead of failing the
//! request in the extractor.

use beatmarket_core::ranking::RankingQuery;
use beatmarket_core::types::DbId;
use serde::{Deserialize, Deserializer};

/// Any scalar a client might send where a number is expected.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseValue {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

/// Parse text as an integer, accepting float notation (`1e3`) and
/// saturating values past the `i64` range.
fn parse_loose_i64(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().and_then(float_to_i64))
}

/// `as` saturates at the `i64` bounds; NaN and infinities are rejected.
fn float_to_i64(value: f64) -> Option<i64> {
    value.is_finite().then_some(value as i64)
}

/// Deserialize an optional integer, mapping anything unparseable to `None`.
///
/// Use with `#[serde(default, deserialize_with = "lenient_i64")]`.
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LooseValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(LooseValue::Int(n)) => Some(n),
        Some(LooseValue::Float(f)) => float_to_i64(f),
        Some(LooseValue::Text(text)) => parse_loose_i64(&text),
        Some(LooseValue::Other(_)) | None => None,
    })
}

/// Deserialize an optional string, mapping non-string values to `None`.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<LooseValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(LooseValue::Text(text)) => Some(text),
        _ => None,
    })
}

/// Ranking list parameters (`?page=&limit=&owner_id=`).
///
/// Values are clamped by the engine against the category's page size, so
/// nothing here is validated.
#[derive(Debug, Default, Deserialize)]
pub struct RankingParams {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub owner_id: Option<DbId>,
}

impl From<RankingParams> for RankingQuery {
    fn from(params: RankingParams) -> Self {
        RankingQuery {
            owner_id: params.owner_id,
            page: params.page,
            limit: params.limit,
        }
    }
}
