//! Public-surface test: extracted JSON fields through to the store-ready
//! filter document and embedding text.

use estaterag::embeddings::descriptive_text;
use estaterag::embeddings::normalize_row;
use estaterag::models::ParsedQuery;
use estaterag::query::build_filter;
use estaterag::schema::EMBED_FIELDS;
use serde_json::json;

#[test]
fn extraction_json_becomes_wire_filter() {
    let raw = json!({
        "city": "atlanta",
        "state": "ga",
        "county": "none",
        "hometype": "none",
        "homestatus": "none",
        "price": {"value": 800_000, "operator": "lte"},
        "bedrooms": {"value": 3, "operator": "gte"},
    });

    let parsed = ParsedQuery::from_json(&raw).unwrap();
    let filter = build_filter(&parsed);

    assert_eq!(
        filter.to_json(),
        json!({"$and": [
            {"city": "Atlanta"},
            {"state": "Ga"},
            {"price": {"$lte": 800_000}},
            {"bedrooms": {"$gte": 3}},
        ]})
    );
}

#[test]
fn absent_fields_yield_the_empty_filter() {
    let parsed = ParsedQuery::from_json(&json!({})).unwrap();
    let filter = build_filter(&parsed);

    assert!(filter.is_empty());
    assert_eq!(filter.to_json(), json!({}));
}

#[test]
fn embedding_text_is_total_over_the_schema() {
    let raw = json!({
        "city": "Austin",
        "state": "TX",
        "price": {"value": 600_000, "operator": "lte"},
    });

    let parsed = ParsedQuery::from_json(&raw).unwrap();
    let normalized = normalize_row(&parsed.to_row(), &EMBED_FIELDS);

    assert_eq!(normalized.len(), EMBED_FIELDS.len());
    let text = descriptive_text(&normalized);
    assert!(text.starts_with("city: austin | state: tx | county: none"));
    assert!(text.contains("price: 600000"));

    // same extraction, same text
    let again = descriptive_text(&normalize_row(
        &ParsedQuery::from_json(&raw).unwrap().to_row(),
        &EMBED_FIELDS,
    ));
    assert_eq!(text, again);
}

#[test]
fn unknown_operator_is_rejected() {
    let raw = json!({
        "price": {"value": 800_000, "operator": "between"},
    });

    assert!(ParsedQuery::from_json(&raw).is_err());
}
