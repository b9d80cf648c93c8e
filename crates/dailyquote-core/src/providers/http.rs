// Network-backed RawFetch
use async_trait::async_trait;
use dailyquote_api::{DirectClient, JsonpClient};
use serde_json::Value;

use super::{RawFetch, Transport};
use crate::Result;

/// Routes each request to the client for its transport
pub struct HttpFetch {
    direct: DirectClient,
    jsonp: JsonpClient,
}

impl HttpFetch {
    pub fn new() -> Result<Self> {
        let client = dailyquote_api::build_http_client()?;
        Ok(Self {
            direct: DirectClient::with_client(client.clone()),
            jsonp: JsonpClient::with_client(client),
        })
    }
}

#[async_trait]
impl RawFetch for HttpFetch {
    async fn fetch_raw(&self, url: &str, transport: Transport) -> Result<Value> {
        let raw = match transport {
            Transport::DirectRequest => self.direct.get_json(url).await?,
            Transport::ScriptInjection => self.jsonp.fetch(url).await?,
        };
        Ok(raw)
    }
}
