use anyhow::Context;
use clap::Parser;
use dailyquote_cache::{DisabledStore, KeyValueStore, SqliteStore};
use dailyquote_core::{
    Config, HtmlPage, HttpFetch, MemoryPage, QuoteCache, QuoteFetcher, QuoteOutcome,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Used when RUST_LOG is unset: our own crates only, warnings and up
const DEFAULT_LOG_FILTER: &str = "dailyquote=warn";

#[derive(Parser)]
#[command(name = "dailyquote")]
#[command(
    version,
    about = "A short quote a day, from whichever provider answers first",
    long_about = None
)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "DAILYQUOTE_CONFIG")]
    config: Option<PathBuf>,

    /// Cache database file
    #[arg(long, global = true, env = "DAILYQUOTE_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Render today's quote (the default)
    Show {
        /// Render into this HTML page in place instead of printing
        #[arg(long)]
        html: Option<PathBuf>,

        /// Skip the cache for this run
        #[arg(long)]
        no_cache: bool,

        /// Seconds each provider gets
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// List the provider chain in fallback order
    Providers,
    /// Show where the config file lives
    Config {
        /// Write the default config if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout is just the quote
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::config_path()?,
    };
    let mut config = Config::load_from(&config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    if let Some(db) = cli.db {
        config.cache.path = Some(db);
    }

    match cli.command.unwrap_or(Commands::Show {
        html: None,
        no_cache: false,
        timeout: None,
    }) {
        Commands::Show {
            html,
            no_cache,
            timeout,
        } => {
            if let Some(secs) = timeout {
                config.fetch.timeout_secs = secs;
            }
            if no_cache {
                config.cache.enabled = false;
            }
            show(&config, html.as_deref()).await?;
        }
        Commands::Providers => {
            for (rank, provider) in config.providers.iter().enumerate() {
                println!(
                    "{}. {} [{}] {}",
                    rank + 1,
                    provider.name,
                    provider.transport,
                    provider.url
                );
            }
        }
        Commands::Config { init } => {
            if init && !config_path.exists() {
                Config::default().save_to(&config_path)?;
                println!("Wrote default config to {}", config_path.display());
            } else {
                println!("{}", config_path.display());
            }
        }
    }

    Ok(())
}

async fn show(config: &Config, html: Option<&Path>) -> anyhow::Result<()> {
    let targets = config.page.targets();
    let mut fetcher = QuoteFetcher::new(Arc::new(HttpFetch::new()?))
        .with_providers(config.providers.clone())
        .with_targets(targets.clone())
        .with_timeout(config.fetch.timeout());

    if config.cache.enabled {
        fetcher = fetcher.with_cache(QuoteCache::with_ttl(open_store(config), config.cache.ttl()));
    }

    match html {
        Some(path) => {
            let mut page = HtmlPage::load(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;

            if fetcher.run(&mut page).await == QuoteOutcome::Skipped {
                eprintln!(
                    "{} has no #{} and #{} elements, nothing rendered",
                    path.display(),
                    targets.text_id,
                    targets.from_id
                );
                return Ok(());
            }

            page.save()
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => {
            let mut page =
                MemoryPage::with_elements([targets.text_id.clone(), targets.from_id.clone()]);
            fetcher.run(&mut page).await;

            println!("{}", page.text_content(&targets.text_id).unwrap_or_default());
            println!("{}", page.text_content(&targets.from_id).unwrap_or_default());
        }
    }

    Ok(())
}

/// A broken cache never stops the quote from showing
fn open_store(config: &Config) -> Box<dyn KeyValueStore> {
    let opened = config
        .cache
        .db_path()
        .map_err(|e| e.to_string())
        .and_then(|path| SqliteStore::open(path).map_err(|e| e.to_string()));

    match opened {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::debug!("Cache unavailable, running without it: {}", e);
            Box::new(DisabledStore)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_filter_targets_our_crates() {
        let filter = tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER);
        assert!(filter.to_string().starts_with("dailyquote="));
        assert_eq!(
            filter.max_level_hint(),
            Some(tracing::level_filters::LevelFilter::WARN)
        );
    }

    #[test]
    fn test_config_init_flag() {
        let cli = Cli::try_parse_from(["dailyquote", "config", "--init"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Config { init: true })));
    }

    #[test]
    fn test_show_flags() {
        let cli =
            Cli::try_parse_from(["dailyquote", "show", "--no-cache", "--timeout", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Show {
                html: None,
                no_cache: true,
                timeout: Some(2),
            })
        ));
    }
}
