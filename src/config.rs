use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::schema;

/// Vector document store (Astra-style Data API) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database API endpoint, e.g. `https://<db-id>-<region>.apps.astra.datastax.com`
    pub api_endpoint: String,
    /// Application token. Overridden by `ASTRA_DB_APPLICATION_TOKEN` when set.
    #[serde(default)]
    pub application_token: String,
    #[serde(default = "default_keyspace")]
    pub keyspace: String,
    pub collection: String,
}

fn default_keyspace() -> String {
    "default_keyspace".to_string()
}

/// OpenAI-compatible model endpoint settings, used for both the chat model
/// and the embedding model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,
    /// API key. Overridden by `OPENAI_API_KEY` when set.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-2024-08-06".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-large".to_string()
}

fn default_embedding_dimension() -> usize {
    3072
}

/// Analytical warehouse (BigQuery-style REST) settings for the batch pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    #[serde(default = "default_warehouse_endpoint")]
    pub endpoint: String,
    pub project: String,
    pub dataset: String,
    pub table: String,
    /// Bearer token. Overridden by `WAREHOUSE_ACCESS_TOKEN` when set.
    #[serde(default)]
    pub access_token: String,
}

fn default_warehouse_endpoint() -> String {
    "https://bigquery.googleapis.com/bigquery/v2".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub enable_cors: bool,
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_result_limit() -> usize {
    schema::DEFAULT_RESULT_LIMIT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_cors: false,
            result_limit: default_result_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
    /// Upper bound on concurrent embedding calls within a batch window.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_batch_size() -> usize {
    100
}

fn default_progress_interval() -> usize {
    200
}

fn default_concurrency() -> usize {
    8
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            progress_interval: default_progress_interval(),
            concurrency: default_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub backtrace: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            backtrace: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub openai: OpenAiConfig,
    pub warehouse: WarehouseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply environment overrides
    /// for secrets.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default config file path.
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            eprintln!(
                "Warning: Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            Err(crate::EstateRagError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config file found. Please create config.toml or config.example.toml",
            )))
        }
    }

    /// Credentials come from the environment when present; the file values
    /// are a development convenience only.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.openai.api_key = key;
        }
        if let Ok(token) = std::env::var("ASTRA_DB_APPLICATION_TOKEN") {
            self.store.application_token = token;
        }
        if let Ok(token) = std::env::var("WAREHOUSE_ACCESS_TOKEN") {
            self.warehouse.access_token = token;
        }
    }

    fn validate(&self) -> crate::Result<()> {
        if self.store.api_endpoint.is_empty() {
            return Err(crate::EstateRagError::Config(
                "store.api_endpoint is required".to_string(),
            ));
        }
        if self.store.collection.is_empty() {
            return Err(crate::EstateRagError::Config(
                "store.collection is required".to_string(),
            ));
        }
        if self.ingest.batch_size == 0 {
            return Err(crate::EstateRagError::Config(
                "ingest.batch_size must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Effective config rendered as TOML with secrets redacted, for the
    /// `config` CLI command.
    pub fn redacted_toml(&self) -> crate::Result<String> {
        let mut copy = self.clone();
        if !copy.openai.api_key.is_empty() {
            copy.openai.api_key = "<redacted>".to_string();
        }
        if !copy.store.application_token.is_empty() {
            copy.store.application_token = "<redacted>".to_string();
        }
        if !copy.warehouse.access_token.is_empty() {
            copy.warehouse.access_token = "<redacted>".to_string();
        }
        toml::to_string_pretty(&copy)
            .map_err(|e| crate::EstateRagError::Config(format!("failed to render config: {e}")))
    }

    /// Fully-qualified warehouse table identifier.
    pub fn warehouse_table(&self) -> String {
        format!(
            "{}.{}.{}",
            self.warehouse.project, self.warehouse.dataset, self.warehouse.table
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const MINIMAL: &str = r#"
[store]
api_endpoint = "https://db-region.apps.astra.datastax.com"
collection = "listings"

[openai]
api_key = "sk-test"

[warehouse]
project = "acme"
dataset = "housing"
table = "listings"
"#;

    #[test]
    fn test_minimal_config_with_defaults() {
        let config: AppConfig = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.store.keyspace, "default_keyspace");
        assert_eq!(config.openai.embedding_model, "text-embedding-3-large");
        assert_eq!(config.openai.embedding_dimension, 3072);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.result_limit, 21);
        assert_eq!(config.ingest.batch_size, 100);
        assert_eq!(config.ingest.progress_interval, 200);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_from_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.warehouse_table(), "acme.housing.listings");
    }

    #[test]
    fn test_validate_rejects_zero_batch_size() {
        let mut config: AppConfig = toml::from_str(MINIMAL).unwrap();
        config.ingest.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_redacted_toml_hides_secrets() {
        let mut config: AppConfig = toml::from_str(MINIMAL).unwrap();
        config.store.application_token = "AstraCS:secret".to_string();
        let rendered = config.redacted_toml().unwrap();
        assert!(!rendered.contains("AstraCS:secret"));
        assert!(!rendered.contains("sk-test"));
        assert!(rendered.contains("<redacted>"));
    }
}
