// Transport clients for quote providers
pub mod bridge;
pub mod direct;
pub mod error;
pub mod jsonp;

// Re-export common types
pub use bridge::{CallbackGuard, CallbackRegistry};
pub use direct::DirectClient;
pub use error::{Result, TransportError};
pub use jsonp::JsonpClient;

/// Sent with every request so providers can tell us apart from browsers
pub const USER_AGENT: &str = concat!("dailyquote/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client with our default headers
pub fn build_http_client() -> Result<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(USER_AGENT),
    );

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .build()?;

    Ok(client)
}
