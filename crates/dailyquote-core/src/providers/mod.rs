// Provider descriptors and the transports that reach them
pub mod http;

pub use http::HttpFetch;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::{models::QuoteRecord, Error, Result};

/// How a provider is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transport {
    /// Plain GET returning JSON
    DirectRequest,
    /// Script that invokes a named callback with the payload (JSONP)
    ScriptInjection,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::DirectRequest => write!(f, "direct-request"),
            Transport::ScriptInjection => write!(f, "script-injection"),
        }
    }
}

/// How a provider's payload maps onto a QuoteRecord
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// hitokoto.cn response: pick `hitokoto`, `from`, `from_who`, ignore the rest
    Hitokoto,
    /// Payload is already a QuoteRecord
    Passthrough,
}

impl ResponseFormat {
    pub fn parse(&self, raw: Value) -> Result<QuoteRecord> {
        match self {
            ResponseFormat::Hitokoto => parse_hitokoto(&raw),
            ResponseFormat::Passthrough => Ok(serde_json::from_value(raw)?),
        }
    }
}

fn parse_hitokoto(raw: &Value) -> Result<QuoteRecord> {
    let body = raw
        .as_object()
        .ok_or_else(|| Error::InvalidResponse("expected a JSON object".to_string()))?;

    let text = body
        .get("hitokoto")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::InvalidResponse("missing `hitokoto` string".to_string()))?;

    let field = |name: &str| body.get(name).and_then(Value::as_str).map(str::to_string);

    Ok(QuoteRecord {
        text: text.to_string(),
        source: field("from"),
        author: field("from_who"),
    })
}

/// One entry of the fallback chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub name: String,
    pub url: String,
    pub transport: Transport,
    pub format: ResponseFormat,
}

impl ProviderDescriptor {
    pub fn parse(&self, raw: Value) -> Result<QuoteRecord> {
        self.format.parse(raw)
    }
}

/// The built-in chain, in fallback order
pub fn default_chain() -> Vec<ProviderDescriptor> {
    vec![
        ProviderDescriptor {
            name: "hitokoto".to_string(),
            url: "https://v1.hitokoto.cn/?c=a&c=b&c=c&c=d&c=h&c=i&c=j&c=k&c=l".to_string(),
            transport: Transport::DirectRequest,
            format: ResponseFormat::Hitokoto,
        },
        ProviderDescriptor {
            name: "yiyan-jsonp".to_string(),
            url: "https://whyta.cn/api/yiyan?key=738b541a5f7a".to_string(),
            transport: Transport::ScriptInjection,
            format: ResponseFormat::Passthrough,
        },
    ]
}

/// Fetches a provider's raw payload over the given transport
///
/// The seam between the fallback chain and the network; tests swap it out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RawFetch: Send + Sync {
    async fn fetch_raw(&self, url: &str, transport: Transport) -> Result<Value>;
}
