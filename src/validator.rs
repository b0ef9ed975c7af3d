//! Validation of DexScreener pair responses
//!
//! The upstream body is untrusted. Shape problems surface as
//! [`FetchError::SchemaInvalid`], a well-formed envelope without pairs as
//! [`FetchError::NoData`]. Neither is worth retrying.

use crate::{error::FetchError, types::TradingPair};
use serde::Deserialize;
use serde_json::Value;

/// Parses a raw response body into the authoritative pair.
pub fn parse_body(body: &str) -> Result<TradingPair, FetchError> {
    let raw: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::schema_invalid(format!("body is not valid JSON: {}", e)))?;
    parse(&raw)
}

/// Validates a `{ "pairs": [...] }` envelope and returns its first pair.
///
/// Every element is validated, not just the first; a malformed sibling means
/// the upstream is misbehaving.
pub fn parse(raw: &Value) -> Result<TradingPair, FetchError> {
    let envelope = raw.as_object().ok_or_else(|| {
        FetchError::schema_invalid(format!("expected an object envelope, got {}", type_name(raw)))
    })?;

    let candidates = match envelope.get("pairs") {
        None | Some(Value::Null) => return Err(FetchError::NoData),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(FetchError::schema_invalid(format!(
                "`pairs` must be an array, got {}",
                type_name(other)
            )))
        }
    };

    let pairs = candidates
        .iter()
        .enumerate()
        .map(|(index, item)| {
            TradingPair::deserialize(item)
                .map_err(|e| FetchError::schema_invalid(format!("pairs[{}]: {}", index, e)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    pairs.into_iter().next().ok_or(FetchError::NoData)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
