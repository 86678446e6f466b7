//! Product catalog for the Figuro voice assistant
//!
//! - [`ProductCache`]: TTL snapshot of products and categories with
//!   single-flight refresh and relevance ranking
//! - [`HttpProductBackend`]: the store API client
//! - [`price`]: price bands and `under_N` / `over_N` filters

pub mod cache;
pub mod http;
pub mod price;

pub use cache::{rank, CacheConfig, CatalogSnapshot, ProductCache, DEFAULT_SEARCH_LIMIT};
pub use http::HttpProductBackend;
pub use price::{filter_by_price, PriceBand, PriceFilter};

use figuro_voice_core::BackendError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to fetch {resource}: {source}")]
    Fetch {
        resource: &'static str,
        #[source]
        source: BackendError,
    },

    /// A concurrent refresh that this caller waited on failed
    #[error("Catalog refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<CatalogError> for figuro_voice_core::Error {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Configuration(msg) => figuro_voice_core::Error::Configuration(msg),
            other => figuro_voice_core::Error::Internal(other.to_string()),
        }
    }
}
