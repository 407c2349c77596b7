use thiserror::Error;

/// Failures of a search or resolution call.
///
/// Nothing here is retried by the resolver. Only
/// [ResolveError::UpstreamUnavailable] is worth retrying, and that decision
/// belongs to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Invalid identifier {0:?}, expected OL<digits>W or OL<digits>M")]
    InvalidIdentifier(String),

    #[error("Search query must not be empty")]
    InvalidQuery,

    #[error("No upstream record for {0}")]
    NotFound(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Upstream response malformed: {0}")]
    UpstreamMalformed(String),
}

impl ResolveError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable(_))
    }
}

impl From<reqwest::Error> for ResolveError {
    fn from(e: reqwest::Error) -> Self {
        Self::UpstreamUnavailable(e.to_string())
    }
}

impl From<serde_path_to_error::Error<serde_json::Error>> for ResolveError {
    fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
        Self::UpstreamMalformed(format!("{} at {}", e.inner(), e.path()))
    }
}

pub type Result<T, E = ResolveError> = std::result::Result<T, E>;
