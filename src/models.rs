//! Domain types for parsed queries, retrieval results, and ingestion reports

use serde::Serialize;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

use crate::errors::EstateRagError;
use crate::errors::Result;
use crate::schema;

/// Comparison operator allowed in a range filter clause.
///
/// The allow-list is closed on purpose: operator strings coming back from the
/// extraction model are parsed into this enum before they can reach the store
/// query language, so an unexpected operator fails loudly instead of being
/// interpolated into a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOp {
    Lte,
    Gte,
    Lt,
    Gt,
    Eq,
}

impl RangeOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lte => "lte",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Gt => "gt",
            Self::Eq => "eq",
        }
    }

    /// Parse an operator string produced by the extraction model.
    ///
    /// # Errors
    /// Returns `FilterBuild` for any operator outside the allow-list.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "lte" => Ok(Self::Lte),
            "gte" => Ok(Self::Gte),
            "lt" => Ok(Self::Lt),
            "gt" => Ok(Self::Gt),
            "eq" => Ok(Self::Eq),
            other => Err(EstateRagError::FilterBuild(format!(
                "unrecognized operator: {other}"
            ))),
        }
    }
}

/// A range bound: numeric for prices and counts, textual for ISO dates.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeValue {
    Number(f64),
    Text(String),
}

impl RangeValue {
    pub fn to_json(&self) -> Value {
        match self {
            // Integral values stay integers so stringified rows match the
            // ingested data ("600000", not "600000.0").
            #[allow(clippy::cast_possible_truncation)]
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 9e15 => {
                Value::Number(Number::from(*n as i64))
            }
            Self::Number(n) => Number::from_f64(*n).map_or(Value::Null, Value::Number),
            Self::Text(s) => Value::String(s.clone()),
        }
    }
}

/// A numeric/date field constraint as extracted from the user's query.
///
/// Both halves are optional: the extraction model reports fields the user did
/// not mention, and may report a value without a usable operator. Only a
/// fully-bound spec (value and operator) produces a filter clause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeSpec {
    pub value: Option<RangeValue>,
    pub op: Option<RangeOp>,
}

impl RangeSpec {
    /// The (operator, value) pair, if this spec is fully bound.
    pub fn bound(&self) -> Option<(RangeOp, &RangeValue)> {
        match (self.op, &self.value) {
            (Some(op), Some(value)) => Some((op, value)),
            _ => None,
        }
    }
}

/// Structured intent extracted from a natural-language property query.
///
/// Total over the field schema: every schema field has exactly one slot here,
/// and a field absent from the user's intent is `None` rather than omitted.
/// The `"none"` sentinel used by the extraction model is converted to `None`
/// at the deserialization boundary and reintroduced only when building
/// descriptive text.
#[derive(Debug, Clone, Default)]
pub struct ParsedQuery {
    pub city: Option<String>,
    pub state: Option<String>,
    pub county: Option<String>,
    pub zipcode: Option<String>,
    pub hometype: Option<String>,
    pub homestatus: Option<String>,
    pub date_posted: RangeSpec,
    pub date_sold: RangeSpec,
    pub price: RangeSpec,
    pub yearbuilt: RangeSpec,
    pub livingarea: RangeSpec,
    pub bathrooms: RangeSpec,
    pub bedrooms: RangeSpec,
    pub pageviewcount: RangeSpec,
    pub favoritecount: RangeSpec,
}

impl ParsedQuery {
    /// Build from the extraction model's JSON output.
    ///
    /// Tolerates the model's looser habits: `"none"` sentinels, nulls, and
    /// missing keys all map to absent. Operator strings are validated here,
    /// so a malformed extraction fails before any filter is assembled.
    ///
    /// # Errors
    /// Returns `FilterBuild` when a range field carries an operator outside
    /// the allow-list.
    pub fn from_json(raw: &Value) -> Result<Self> {
        Ok(Self {
            city: scalar_field(raw, "city"),
            state: scalar_field(raw, "state"),
            county: scalar_field(raw, "county"),
            zipcode: scalar_field(raw, "zipcode"),
            hometype: scalar_field(raw, "hometype"),
            homestatus: scalar_field(raw, "homestatus"),
            date_posted: range_field(raw, "datePosted")?,
            date_sold: range_field(raw, "datesold")?,
            price: range_field(raw, "price")?,
            yearbuilt: range_field(raw, "yearbuilt")?,
            livingarea: range_field(raw, "livingarea")?,
            bathrooms: range_field(raw, "bathrooms")?,
            bedrooms: range_field(raw, "bedrooms")?,
            pageviewcount: range_field(raw, "pageviewcount")?,
            favoritecount: range_field(raw, "favoritecount")?,
        })
    }

    /// Look up a categorical field by its schema name.
    pub fn categorical(&self, field: &str) -> Option<&str> {
        let slot = match field {
            "city" => &self.city,
            "state" => &self.state,
            "county" => &self.county,
            "zipcode" => &self.zipcode,
            "hometype" => &self.hometype,
            "homestatus" => &self.homestatus,
            _ => return None,
        };
        slot.as_deref()
    }

    /// Look up a range field by its schema name.
    pub fn range(&self, field: &str) -> Option<&RangeSpec> {
        match field {
            "datePosted" => Some(&self.date_posted),
            "datesold" => Some(&self.date_sold),
            "price" => Some(&self.price),
            "yearbuilt" => Some(&self.yearbuilt),
            "livingarea" => Some(&self.livingarea),
            "bathrooms" => Some(&self.bathrooms),
            "bedrooms" => Some(&self.bedrooms),
            "pageviewcount" => Some(&self.pageviewcount),
            "favoritecount" => Some(&self.favoritecount),
            _ => None,
        }
    }

    /// Flatten into a row map keyed by schema field names, for the normalizer
    /// and descriptive-text builder. Absent fields are omitted; the
    /// normalizer reintroduces them with the sentinel.
    pub fn to_row(&self) -> Map<String, Value> {
        let mut row = Map::new();
        for field in schema::EMBED_FIELDS {
            if let Some(value) = self.categorical(field) {
                row.insert(field.to_string(), Value::String(value.to_string()));
            } else if let Some(spec) = self.range(field) {
                if let Some(value) = &spec.value {
                    row.insert(field.to_string(), value.to_json());
                }
            }
        }
        row
    }
}

fn scalar_field(raw: &Value, field: &str) -> Option<String> {
    match raw.get(field) {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || schema::is_sentinel(trimmed) {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn range_field(raw: &Value, field: &str) -> Result<RangeSpec> {
    let Some(obj) = raw.get(field).and_then(Value::as_object) else {
        return Ok(RangeSpec::default());
    };

    let value = match obj.get("value") {
        Some(Value::Number(n)) => n.as_f64().map(RangeValue::Number),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || schema::is_sentinel(trimmed) {
                None
            } else if let Ok(n) = trimmed.parse::<f64>() {
                Some(RangeValue::Number(n))
            } else {
                Some(RangeValue::Text(trimmed.to_string()))
            }
        }
        _ => None,
    };

    let op = match obj.get("operator") {
        Some(Value::String(s)) if !schema::is_sentinel(s) && !s.trim().is_empty() => {
            Some(RangeOp::parse(s)?)
        }
        _ => None,
    };

    Ok(RangeSpec { value, op })
}

/// One ranked candidate returned by the store.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredDocument {
    pub document: Value,
    pub similarity: Option<f32>,
}

/// Final serving-path result: raw matching properties plus an optional
/// generated digest. `summary` stays `None` when summary generation fails,
/// which is a degraded success, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub properties: Vec<Value>,
    pub summary: Option<String>,
}

/// Outcome counters for one ingestion run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub rows_seen: usize,
    pub rows_embedded: usize,
    pub rows_skipped: usize,
    pub batches_inserted: usize,
    pub batches_failed: usize,
}
