//! Serving pipeline: validate -> extract -> embed -> retrieve -> summarize
//!
//! # Examples
//!
//! ```rust,no_run
//! use estaterag::config::AppConfig;
//! use estaterag::rag::PropertySearch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let search = PropertySearch::from_config(&config)?;
//!
//!     let outcome = search
//!         .answer("Show me 3-bedroom homes in Austin under $600,000")
//!         .await?;
//!     println!("{} properties", outcome.properties.len());
//!
//!     Ok(())
//! }
//! ```

pub mod pipeline;
pub mod summary;

pub use pipeline::PropertySearch;
pub use summary::Summarizer;
