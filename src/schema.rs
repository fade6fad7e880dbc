//! Canonical property field schema
//!
//! The field lists here pin the one fixed iteration order used everywhere:
//! descriptive-text assembly, filter-clause emission, and row normalization.
//! Changing the order changes embedding inputs byte-for-byte, so treat it as
//! part of the wire contract with the store.

/// All fields that participate in descriptive-text / embedding generation,
/// in canonical order.
pub const EMBED_FIELDS: [&str; 15] = [
    "city",
    "state",
    "county",
    "zipcode",
    "datePosted",
    "datesold",
    "hometype",
    "homestatus",
    "price",
    "yearbuilt",
    "livingarea",
    "bathrooms",
    "bedrooms",
    "pageviewcount",
    "favoritecount",
];

/// Categorical fields that become exact-match filter clauses.
pub const CATEGORICAL_FILTER_FIELDS: [&str; 4] = ["city", "state", "hometype", "homestatus"];

/// Numeric and date fields that become range filter clauses.
pub const NUMERIC_FILTER_FIELDS: [&str; 9] = [
    "datePosted",
    "datesold",
    "price",
    "yearbuilt",
    "livingarea",
    "bathrooms",
    "bedrooms",
    "pageviewcount",
    "favoritecount",
];

/// The sentinel string marking an unspecified field at the text and filter
/// boundary. Internal types use `Option` instead; this literal only appears
/// in descriptive text and in payloads exchanged with the extraction model.
pub const SENTINEL_NONE: &str = "none";

/// Default number of ranked candidates fetched from the store per query.
pub const DEFAULT_RESULT_LIMIT: usize = 21;

/// Returns true when a raw string is the "unspecified" sentinel.
pub fn is_sentinel(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case(SENTINEL_NONE)
}
