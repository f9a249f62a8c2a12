use thiserror::Error;

/// Reasons a location lookup can fail.
///
/// Cloneable so every caller waiting on the same in-flight request receives
/// the same failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("Network error: {reason}")]
    Network { reason: String },

    /// The provider answered with a non-success status.
    #[error("Provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The body was not JSON or did not match the localities schema.
    #[error("Malformed response: {reason}")]
    MalformedResponse { reason: String },

    /// The body parsed but carried no `localities` collection.
    #[error("Response has no localities collection")]
    MissingLocalities,

    /// The background task running the request panicked or was aborted.
    #[error("Lookup task failed: {reason}")]
    TaskFailed { reason: String },
}

impl From<serde_json::Error> for SearchError {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedResponse {
            reason: e.to_string(),
        }
    }
}
