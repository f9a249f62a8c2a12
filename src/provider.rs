use async_trait::async_trait;

use crate::error::SearchError;
use crate::types::LocalityQuery;

/// External directory that answers locality searches.
///
/// Implementations perform exactly one request per call and return the raw
/// body of a successful response; validating that body is the service's job.
#[async_trait]
pub trait LocalityProvider: Send + Sync + std::fmt::Debug {
    async fn search(&self, query: &LocalityQuery) -> Result<String, SearchError>;
}
