// The quote widget: cache gate first, then the provider fallback chain
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::models::QuoteRecord;
use crate::page::Page;
use crate::providers::{default_chain, ProviderDescriptor, RawFetch};
use crate::quote_cache::{CacheLookup, CacheWrite, QuoteCache};
use crate::render::{render_placeholder, render_quote, QuoteTargets};
use crate::{Error, Result};

/// How long a single provider gets before we move on
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of "now" in epoch millis
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// What a run ended up showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteOutcome {
    /// Fresh cache entry; no network traffic
    Cached(QuoteRecord),
    /// A provider answered; `cached` says whether the cache write went through
    Fetched {
        provider: String,
        record: QuoteRecord,
        cached: bool,
    },
    /// Every provider failed
    Placeholder,
    /// The page lacks one of the target elements; nothing was done
    Skipped,
}

pub struct QuoteFetcher {
    providers: Vec<ProviderDescriptor>,
    fetch: Arc<dyn RawFetch>,
    cache: Option<QuoteCache>,
    targets: QuoteTargets,
    timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl QuoteFetcher {
    /// Fetcher over the built-in provider chain, without a cache
    pub fn new(fetch: Arc<dyn RawFetch>) -> Self {
        Self {
            providers: default_chain(),
            fetch,
            cache: None,
            targets: QuoteTargets::default(),
            timeout: DEFAULT_TIMEOUT,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_providers(mut self, providers: Vec<ProviderDescriptor>) -> Self {
        self.providers = providers;
        self
    }

    pub fn with_cache(mut self, cache: QuoteCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_targets(mut self, targets: QuoteTargets) -> Self {
        self.targets = targets;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn providers(&self) -> &[ProviderDescriptor] {
        &self.providers
    }

    /// Render a quote into `page`. Never fails: the worst case is the placeholder.
    pub async fn run(&self, page: &mut dyn Page) -> QuoteOutcome {
        if !self.targets.present_on(page) {
            debug!(
                "Page has no #{} / #{} elements, skipping",
                self.targets.text_id, self.targets.from_id
            );
            return QuoteOutcome::Skipped;
        }

        if let Some(cache) = &self.cache {
            match cache.lookup(self.clock.now_millis()) {
                CacheLookup::Fresh(entry) => {
                    info!("Using cached quote from {}", entry.timestamp);
                    render_quote(page, &self.targets, &entry.data);
                    return QuoteOutcome::Cached(entry.data);
                }
                CacheLookup::Stale(entry) => {
                    debug!("Cached quote from {} has expired", entry.timestamp)
                }
                CacheLookup::Missing => debug!("No cached quote"),
                CacheLookup::Recovered(_) => {}
            }
        }

        let Some((provider, record)) = self.fetch_first().await else {
            info!("All providers failed, showing placeholder");
            render_placeholder(page, &self.targets);
            return QuoteOutcome::Placeholder;
        };

        render_quote(page, &self.targets, &record);

        let cached = match &self.cache {
            Some(cache) => matches!(
                cache.store(&record, self.clock.now_millis()),
                CacheWrite::Stored
            ),
            None => false,
        };

        QuoteOutcome::Fetched {
            provider,
            record,
            cached,
        }
    }

    /// Walk the chain in order, stopping at the first provider that answers
    async fn fetch_first(&self) -> Option<(String, QuoteRecord)> {
        for provider in &self.providers {
            match self.attempt(provider).await {
                Ok(record) => {
                    info!("Fetched quote from {}", provider.name);
                    return Some((provider.name.clone(), record));
                }
                Err(e) => debug!("Provider {} failed: {}", provider.name, e),
            }
        }

        None
    }

    /// One provider, raced against the timeout
    pub async fn attempt(&self, provider: &ProviderDescriptor) -> Result<QuoteRecord> {
        debug!("Trying {} via {}", provider.name, provider.transport);

        let request = self.fetch.fetch_raw(&provider.url, provider.transport);
        let raw = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| Error::Timeout {
                provider: provider.name.clone(),
                seconds: self.timeout.as_secs(),
            })??;

        provider.parse(raw)
    }
}
