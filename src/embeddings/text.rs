//! Row normalization and descriptive-text assembly for embedding generation
//!
//! The normalizer is a total function over the configured field set: every
//! field gets exactly one entry, with the `"none"` sentinel standing in for
//! absent or empty values. The descriptive-text builder then concatenates the
//! normalized entries in canonical schema order, so identical logical content
//! always yields a byte-identical embedding input.

use serde_json::Map;
use serde_json::Value;
use tracing::trace;
use tracing::warn;

use crate::schema::SENTINEL_NONE;

/// Normalize a raw row into ordered `(field, value)` pairs.
///
/// For each field in `fields` (iteration order preserved): present, truthy
/// values are stringified, trimmed, and lowercased; everything else becomes
/// the sentinel. Never fails - absence is a representable state, not an error.
pub fn normalize_row(row: &Map<String, Value>, fields: &[&str]) -> Vec<(String, String)> {
    trace!("Normalizing row with {} fields", fields.len());

    fields
        .iter()
        .map(|&field| {
            let value = row.get(field).map_or_else(
                || SENTINEL_NONE.to_string(),
                |raw| normalize_value(raw).unwrap_or_else(|| SENTINEL_NONE.to_string()),
            );
            (field.to_string(), value)
        })
        .collect()
}

/// Stringify a raw value if it carries content, mirroring the truthiness
/// rules the store rows were ingested under: null, empty strings, zero, and
/// false all normalize to the sentinel.
fn normalize_value(raw: &Value) -> Option<String> {
    match raw {
        Value::Null => None,
        Value::Bool(b) => b.then(|| "true".to_string()),
        Value::Number(n) => {
            if n.as_f64() == Some(0.0) {
                None
            } else {
                Some(n.to_string().to_lowercase())
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_lowercase())
            }
        }
        // Arrays and objects don't occur in the property schema; stringify
        // them rather than fail so a malformed warehouse row stays ingestible.
        other => Some(other.to_string().to_lowercase()),
    }
}

/// Join normalized fields into the canonical embedding input string.
///
/// Deterministic given the same pairs: the output is `"field: value"` joined
/// by `" | "` in the order produced by [`normalize_row`].
pub fn descriptive_text(normalized: &[(String, String)]) -> String {
    let text = normalized
        .iter()
        .map(|(field, value)| format!("{field}: {value}"))
        .collect::<Vec<_>>()
        .join(" | ");

    if text.is_empty() {
        warn!("Descriptive text is empty; embedding input will carry no content");
    }

    text
}
