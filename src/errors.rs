use thiserror::Error;

/// Reasons a user query is rejected before any billable external call is made.
///
/// These are user-correctable conditions and map to HTTP 4xx responses with an
/// advisory message, never to server errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    #[error("query is not written in English")]
    NotEnglish,

    #[error("input is not a natural-language real estate question")]
    InvalidFormat,

    #[error("query is ambiguous or too broad")]
    Ambiguous,

    #[error("query is not related to real estate")]
    NotRealEstate,

    #[error("query involves unsupported complexity")]
    UnsupportedComplexity,
}

#[derive(Error, Debug)]
pub enum EstateRagError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    #[error("Filter build error: {0}")]
    FilterBuild(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Summary error: {0}")]
    Summary(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Warehouse error: {0}")]
    Warehouse(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EstateRagError {
    /// Whether this error should be reported to the user as a client error
    /// rather than a server failure.
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, EstateRagError>;
