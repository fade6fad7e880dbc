//! Analytical warehouse client (BigQuery-style REST API)

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;
use tracing::debug;
use tracing::info;

use crate::errors::EstateRagError;
use crate::errors::Result;

/// Rows fetched per page. The API caps response sizes anyway; paging
/// explicitly keeps memory per request bounded.
const PAGE_SIZE: usize = 5000;

/// Seam over the warehouse extraction side of the batch pipeline.
#[async_trait]
pub trait WarehouseReader: Send + Sync {
    /// Fetch rows from the configured table, optionally capped at `limit`.
    async fn fetch_rows(&self, limit: Option<usize>) -> Result<Vec<Map<String, Value>>>;
}

/// REST client for a BigQuery-style `jobs/query` endpoint.
pub struct WarehouseClient {
    endpoint: String,
    project: String,
    table: String,
    access_token: String,
    client: Client,
}

impl WarehouseClient {
    /// Create a new warehouse client
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(
        endpoint: String,
        project: String,
        table: String,
        access_token: String,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .map_err(|e| EstateRagError::Http(e.to_string()))?;

        Ok(Self {
            endpoint,
            project,
            table,
            access_token,
            client,
        })
    }

    pub fn from_config(config: &crate::config::AppConfig) -> Result<Self> {
        Self::new(
            config.warehouse.endpoint.clone(),
            config.warehouse.project.clone(),
            config.warehouse_table(),
            config.warehouse.access_token.clone(),
        )
    }

    async fn post_query(&self, body: &Value, url: &str) -> Result<QueryResponse> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| EstateRagError::Warehouse(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(EstateRagError::Warehouse(format!(
                "Warehouse API error ({status}): {error_text}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| EstateRagError::Warehouse(format!("Failed to parse response: {e}")))
    }

    async fn get_page(&self, job_id: &str, page_token: &str) -> Result<QueryResponse> {
        let url = format!(
            "{}/projects/{}/queries/{job_id}?pageToken={page_token}&maxResults={PAGE_SIZE}",
            self.endpoint, self.project
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| EstateRagError::Warehouse(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(EstateRagError::Warehouse(format!(
                "Warehouse API error ({status}): {error_text}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| EstateRagError::Warehouse(format!("Failed to parse response: {e}")))
    }
}

#[async_trait]
impl WarehouseReader for WarehouseClient {
    async fn fetch_rows(&self, limit: Option<usize>) -> Result<Vec<Map<String, Value>>> {
        let mut query = format!("SELECT * FROM `{}`", self.table);
        if let Some(limit) = limit {
            query.push_str(&format!(" LIMIT {limit}"));
        }

        let url = format!("{}/projects/{}/queries", self.endpoint, self.project);
        let body = serde_json::json!({
            "query": query,
            "useLegacySql": false,
            "maxResults": PAGE_SIZE,
        });

        debug!("Warehouse query: {query}");
        let mut page = self.post_query(&body, &url).await?;

        let schema_fields = page
            .schema
            .as_ref()
            .map(|s| s.fields.clone())
            .ok_or_else(|| EstateRagError::Warehouse("query response has no schema".to_string()))?;

        let mut rows = Vec::new();
        loop {
            for raw in page.rows.drain(..) {
                rows.push(decode_row(&schema_fields, raw));
            }

            let Some(token) = page.page_token.take() else {
                break;
            };
            let Some(job_id) = page
                .job_reference
                .as_ref()
                .map(|j| j.job_id.clone())
            else {
                break;
            };
            page = self.get_page(&job_id, &token).await?;
        }

        info!("Fetched {} rows from warehouse table {}", rows.len(), self.table);
        Ok(rows)
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    schema: Option<TableSchema>,
    #[serde(default)]
    rows: Vec<TableRow>,
    #[serde(rename = "pageToken")]
    page_token: Option<String>,
    #[serde(rename = "jobReference")]
    job_reference: Option<JobReference>,
}

#[derive(Debug, Deserialize)]
struct JobReference {
    #[serde(rename = "jobId")]
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct TableSchema {
    fields: Vec<SchemaField>,
}

#[derive(Debug, Clone, Deserialize)]
struct SchemaField {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
}

#[derive(Debug, Deserialize)]
struct TableRow {
    #[serde(default)]
    f: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    v: Option<Value>,
}

/// Convert the positional `f`/`v` row encoding into a named map, restoring
/// numeric types from the schema (the wire format carries everything as
/// strings).
fn decode_row(fields: &[SchemaField], row: TableRow) -> Map<String, Value> {
    let mut decoded = Map::new();
    for (field, cell) in fields.iter().zip(row.f) {
        let value = match cell.v {
            None | Some(Value::Null) => Value::Null,
            Some(Value::String(s)) => decode_cell(&field.field_type, s),
            Some(other) => other,
        };
        decoded.insert(field.name.clone(), value);
    }
    decoded
}

fn decode_cell(field_type: &str, raw: String) -> Value {
    match field_type {
        "INTEGER" | "INT64" | "FLOAT" | "FLOAT64" | "NUMERIC" | "BIGNUMERIC" => raw
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map_or(Value::String(raw), Value::Number),
        "BOOLEAN" | "BOOL" => match raw.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(raw),
        },
        _ => Value::String(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<SchemaField> {
        vec![
            SchemaField {
                name: "city".to_string(),
                field_type: "STRING".to_string(),
            },
            SchemaField {
                name: "price".to_string(),
                field_type: "INTEGER".to_string(),
            },
            SchemaField {
                name: "bathrooms".to_string(),
                field_type: "FLOAT".to_string(),
            },
        ]
    }

    #[test]
    fn test_decode_row_restores_types() {
        let row = TableRow {
            f: vec![
                Cell {
                    v: Some(Value::String("Atlanta".to_string())),
                },
                Cell {
                    v: Some(Value::String("800000".to_string())),
                },
                Cell {
                    v: Some(Value::String("2.5".to_string())),
                },
            ],
        };

        let decoded = decode_row(&schema(), row);
        assert_eq!(decoded["city"], Value::String("Atlanta".to_string()));
        assert_eq!(decoded["price"].as_f64(), Some(800_000.0));
        assert_eq!(decoded["bathrooms"].as_f64(), Some(2.5));
    }

    #[test]
    fn test_decode_row_preserves_nulls() {
        let row = TableRow {
            f: vec![Cell { v: None }, Cell { v: Some(Value::Null) }, Cell { v: None }],
        };

        let decoded = decode_row(&schema(), row);
        assert_eq!(decoded["city"], Value::Null);
        assert_eq!(decoded["price"], Value::Null);
    }
}
