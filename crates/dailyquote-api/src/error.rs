use thiserror::Error;

/// Everything that can go wrong while talking to a quote provider
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Provider returned HTTP {status}")]
    Status { status: u16 },

    #[error("Script could not be loaded: {0}")]
    ScriptLoad(String),

    #[error("Script did not invoke callback {callback}")]
    CallbackNotInvoked { callback: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
