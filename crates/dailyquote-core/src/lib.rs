// Quote widget logic: cache gate, provider fallback chain, rendering
pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod page;
pub mod providers;
pub mod quote_cache;
pub mod render;

pub use config::Config;
pub use error::Error;
pub use fetcher::{QuoteFetcher, QuoteOutcome};
pub use models::{CacheEntry, QuoteRecord};
pub use page::{HtmlPage, MemoryPage, Page};
pub use providers::{HttpFetch, ProviderDescriptor, RawFetch, ResponseFormat, Transport};
pub use quote_cache::{CacheLookup, CacheWrite, QuoteCache};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
