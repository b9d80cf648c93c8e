// Script-injection (JSONP) provider transport
use serde_json::Value;
use tracing::debug;

use crate::bridge::CallbackRegistry;
use crate::error::{Result, TransportError};

/// Prefix for generated callback names
pub const CALLBACK_PREFIX: &str = "dailyQuoteCallback";

/// Loads a provider script and waits for it to call back with the payload.
///
/// Each fetch owns its registration through a guard, so an attempt that is
/// cancelled by a timeout still leaves the registry clean.
pub struct JsonpClient {
    client: reqwest::Client,
    registry: CallbackRegistry,
}

impl JsonpClient {
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(crate::build_http_client()?))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            registry: CallbackRegistry::new(),
        }
    }

    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    pub async fn fetch(&self, url: &str) -> Result<Value> {
        let (mut guard, rx) = self.registry.register(CALLBACK_PREFIX);
        let src = callback_url(url, guard.name());
        debug!("Loading script {}", src);

        let response = self
            .client
            .get(&src)
            .send()
            .await
            .map_err(|e| TransportError::ScriptLoad(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                status: response.status().as_u16(),
            });
        }

        let script = response.text().await?;
        self.registry.dispatch(&script)?;

        // Whatever the script did, this attempt is settled now
        let callback = guard.name().to_string();
        guard.release();

        rx.await.map_err(|_| TransportError::CallbackNotInvoked { callback })
    }
}

/// Append the `callback=` parameter the provider needs to name our function
pub fn callback_url(url: &str, callback: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}callback={}", url, separator, callback)
}
