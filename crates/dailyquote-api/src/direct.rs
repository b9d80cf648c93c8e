// Plain JSON-over-HTTP provider transport
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, TransportError};

/// Issues a single GET and hands back the decoded JSON body.
///
/// No retries and no timeout here: the fallback chain owns both decisions.
pub struct DirectClient {
    client: reqwest::Client,
}

impl DirectClient {
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(crate::build_http_client()?))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn get_json(&self, url: &str) -> Result<Value> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                status: response.status().as_u16(),
            });
        }

        let body: Value = response.json().await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{client, serve_once};

    #[tokio::test]
    async fn test_get_json_returns_body() {
        let base = serve_once(|_| (200, r#"{"hitokoto":"A","from":"B"}"#.to_string())).await;
        let client = DirectClient::with_client(client());

        let body = client.get_json(&format!("{}/?c=a", base)).await.unwrap();

        assert_eq!(body["hitokoto"], "A");
        assert_eq!(body["from"], "B");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let base = serve_once(|_| (503, r#"{"hitokoto":"ignored"}"#.to_string())).await;
        let client = DirectClient::with_client(client());

        let result = client.get_json(&base).await;

        assert!(matches!(result, Err(TransportError::Status { status: 503 })));
    }

    #[tokio::test]
    async fn test_non_json_body_is_an_error() {
        let base = serve_once(|_| (200, "<html>maintenance</html>".to_string())).await;
        let client = DirectClient::with_client(client());

        assert!(matches!(
            client.get_json(&base).await,
            Err(TransportError::NetworkError(_))
        ));
    }
}
