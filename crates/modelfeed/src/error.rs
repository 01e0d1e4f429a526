use thiserror::Error;

/// Error taxonomy for the manifest pipeline.
///
/// Invalid query parameters are deliberately absent here: they are
/// ignored (the predicate is treated as unset) rather than rejected.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The base dataset fetch failed; the previous manifest stays
    /// authoritative.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Nothing has been resolved and persisted yet. Distinct from an
    /// empty query result.
    #[error("manifest not yet initialized")]
    ManifestNotFound,

    /// Stored bytes failed to parse. Retrievable fault, not a crash.
    #[error("malformed persisted manifest: {0}")]
    MalformedManifest(String),

    #[error("manifest storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::MalformedManifest(err.to_string())
    }
}

impl From<std::io::Error> for FeedError {
    fn from(err: std::io::Error) -> Self {
        FeedError::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        FeedError::UpstreamUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
