use thiserror::Error;

/// All the ways a quote run can go wrong
///
/// None of these reach the page: the fetcher turns them into a fallback
/// step or a skipped cache write, and logs them at debug level.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Transport failed: {0}")]
    Transport(#[from] dailyquote_api::TransportError),

    #[error("Provider {provider} did not answer within {seconds}s")]
    Timeout { provider: String, seconds: u64 },

    #[error("Unexpected response shape: {0}")]
    InvalidResponse(String),

    #[error("Cache operation failed: {0}")]
    CacheError(#[from] dailyquote_cache::CacheError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
