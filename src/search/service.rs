use crate::core::geo::NamedLocation;
use async_trait::async_trait;

/// Failure reported by a geocoding backend
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError {
    #[error("geocoding service unreachable: {0}")]
    Unreachable(String),

    #[error("geocoding service rejected the query: {0}")]
    Rejected(String),

    #[error("malformed geocoding response: {0}")]
    Malformed(String),
}

/// Free-text place lookup.
///
/// Results are passed through in the order the backend ranks them; an empty
/// list is a valid answer.
#[async_trait]
pub trait GeocodingService: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<NamedLocation>, SearchError>;
}
