//! Filter construction for hybrid retrieval
//!
//! Maps a [`ParsedQuery`] into the store's filter language: a `$and`
//! conjunction of exact-match clauses for categorical fields and
//! `{"$<op>": value}` clauses for range fields. Clause order follows the
//! fixed schema order, so a given query always produces the same wire shape.
//!
//! Open-world semantics: a field the user did not specify produces no clause
//! at all. The empty expression serializes to `{}` and matches everything,
//! leaving ranking entirely to vector similarity.

use serde_json::json;
use serde_json::Map;
use serde_json::Value;

use crate::models::ParsedQuery;
use crate::models::RangeOp;
use crate::schema;

/// One per-field predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterClause {
    /// Exact match on a canonicalized categorical value.
    Eq { field: String, value: Value },
    /// Range comparison with an allow-listed operator.
    Range {
        field: String,
        op: RangeOp,
        value: Value,
    },
}

impl FilterClause {
    fn to_json(&self) -> Value {
        match self {
            Self::Eq { field, value } => {
                let mut clause = Map::new();
                clause.insert(field.clone(), value.clone());
                Value::Object(clause)
            }
            Self::Range { field, op, value } => {
                let mut predicate = Map::new();
                predicate.insert(format!("${}", op.as_str()), value.clone());
                let mut clause = Map::new();
                clause.insert(field.clone(), Value::Object(predicate));
                Value::Object(clause)
            }
        }
    }
}

/// A conjunction of per-field clauses in deterministic order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpression {
    clauses: Vec<FilterClause>,
}

impl FilterExpression {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    /// Serialize to the store's wire shape: `{"$and": [...]}`, or `{}` when
    /// no field is constrained.
    pub fn to_json(&self) -> Value {
        if self.clauses.is_empty() {
            return Value::Object(Map::new());
        }
        let clauses: Vec<Value> = self.clauses.iter().map(FilterClause::to_json).collect();
        json!({ "$and": clauses })
    }
}

/// Build the filter expression for a parsed query.
///
/// Categorical fields come first, then range fields, each in schema order.
/// Unspecified fields impose no constraint. Operator safety is enforced
/// upstream: by the time a query reaches this function, every operator is
/// already a [`RangeOp`], so nothing unvalidated can leak into the wire
/// shape.
pub fn build_filter(parsed: &ParsedQuery) -> FilterExpression {
    let mut clauses = Vec::new();

    for field in schema::CATEGORICAL_FILTER_FIELDS {
        if let Some(value) = parsed.categorical(field) {
            clauses.push(FilterClause::Eq {
                field: field.to_string(),
                value: Value::String(canonicalize(value)),
            });
        }
    }

    for field in schema::NUMERIC_FILTER_FIELDS {
        if let Some((op, value)) = parsed.range(field).and_then(|spec| spec.bound()) {
            clauses.push(FilterClause::Range {
                field: field.to_string(),
                op,
                value: value.to_json(),
            });
        }
    }

    FilterExpression { clauses }
}

/// Title-case a categorical value to match the casing rows were stored under.
pub fn canonicalize(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parsed(raw: Value) -> ParsedQuery {
        ParsedQuery::from_json(&raw).unwrap()
    }

    #[test]
    fn test_scenario_city_state_price() {
        let query = parsed(json!({
            "city": "atlanta",
            "state": "ga",
            "price": {"value": 800_000, "operator": "lte"},
        }));

        let filter = build_filter(&query);
        assert_eq!(
            filter.to_json(),
            json!({
                "$and": [
                    {"city": "Atlanta"},
                    {"state": "Ga"},
                    {"price": {"$lte": 800_000}},
                ]
            })
        );
    }

    #[test]
    fn test_all_fields_absent_yields_empty_filter() {
        let query = parsed(json!({
            "city": "none",
            "state": "none",
            "hometype": "none",
            "homestatus": "none",
            "price": {"value": "none", "operator": "none"},
            "bedrooms": {"value": "none"},
        }));

        let filter = build_filter(&query);
        assert!(filter.is_empty());
        assert_eq!(filter.to_json(), json!({}));
    }

    #[test]
    fn test_no_clause_for_unbound_range() {
        // Value without operator: half-specified constraints are dropped,
        // not guessed.
        let query = parsed(json!({
            "bedrooms": {"value": 3},
            "price": {"operator": "lte"},
        }));

        assert!(build_filter(&query).is_empty());
    }

    #[test]
    fn test_clause_order_is_deterministic() {
        let query = parsed(json!({
            "homestatus": "for sale",
            "city": "austin",
            "bedrooms": {"value": 3, "operator": "gte"},
            "price": {"value": 500_000, "operator": "lte"},
        }));

        let filter = build_filter(&query);
        let first = filter.to_json();
        for _ in 0..5 {
            assert_eq!(build_filter(&query).to_json(), first);
        }

        // Categorical clauses precede range clauses, each in schema order.
        let clauses = first["$and"].as_array().unwrap();
        let fields: Vec<&str> = clauses
            .iter()
            .map(|c| c.as_object().unwrap().keys().next().unwrap().as_str())
            .collect();
        assert_eq!(fields, vec!["city", "homestatus", "price", "bedrooms"]);
    }

    #[test]
    fn test_canonicalize_title_cases_words() {
        assert_eq!(canonicalize("atlanta"), "Atlanta");
        assert_eq!(canonicalize("ga"), "Ga");
        assert_eq!(canonicalize("los angeles"), "Los Angeles");
        assert_eq!(canonicalize("SINGLE FAMILY"), "Single Family");
        assert_eq!(canonicalize("for sale"), "For Sale");
    }

    #[test]
    fn test_date_range_clause_wire_shape() {
        let query = parsed(json!({
            "datePosted": {"value": "2024-01-15", "operator": "gte"},
        }));

        let filter = build_filter(&query);
        assert_eq!(
            filter.to_json(),
            json!({"$and": [{"datePosted": {"$gte": "2024-01-15"}}]})
        );
    }

    #[test]
    fn test_every_operator_serializes_with_dollar_prefix() {
        for (op, expected) in [
            ("lte", "$lte"),
            ("gte", "$gte"),
            ("lt", "$lt"),
            ("gt", "$gt"),
            ("eq", "$eq"),
        ] {
            let query = parsed(json!({
                "price": {"value": 100, "operator": op},
            }));
            let filter = build_filter(&query).to_json();
            assert!(
                filter["$and"][0]["price"].get(expected).is_some(),
                "operator {op} should serialize as {expected}"
            );
        }
    }
}
