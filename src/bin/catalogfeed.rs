//! Browses the catalog from the terminal, one page per proximity signal.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use catalogfeed::{
    core::state::CollectionState,
    fetch::{
        PageFetcher,
        http::{HttpFetcherConfig, HttpPageFetcher},
    },
    query::{QueryDescriptor, RawQuery},
    runtime::{
        events::LoaderEvent,
        handle::{LoaderConfig, TriggerOutcome, spawn_loader},
    },
};

#[derive(Debug, Parser)]
#[command(name = "catalogfeed", about = "Page through a remote product catalog")]
struct Args {
    /// Catalog service base URL.
    #[arg(long, env = "CATALOGFEED_BASE_URL", default_value = "https://dummyjson.com")]
    base_url: String,
    /// Free-text search term; takes precedence over --category.
    #[arg(long, short = 'q')]
    term: Option<String>,
    /// Category filter.
    #[arg(long, short)]
    category: Option<String>,
    /// Sort by price: asc, desc, or none.
    #[arg(long, short)]
    sort: Option<String>,
    /// Items per page.
    #[arg(long)]
    limit: Option<String>,
    /// Extra pages to load after the first.
    #[arg(long, default_value_t = 2)]
    pages: usize,
    /// Show the detail record for one item instead of listing.
    #[arg(long)]
    item: Option<u64>,
    /// Per-fetch timeout in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("catalogfeed=info")),
        )
        .init();

    let args = Args::parse();
    let fetcher = Arc::new(
        HttpPageFetcher::new(&HttpFetcherConfig {
            base_url: args.base_url.clone(),
            request_timeout_ms: args.timeout_ms,
            ..HttpFetcherConfig::default()
        })
        .context("failed to build catalog client")?,
    );

    if let Some(id) = args.item {
        let detail = fetcher.fetch_item(id).await.context("failed to fetch product")?;
        println!("{} [{}]", detail.item.title, detail.item.category);
        println!("${:.2}  stock: {}", detail.item.price, detail.stock);
        println!("{}", detail.item.description);
        for image in &detail.images {
            println!("  {image}");
        }
        return Ok(());
    }

    let query = QueryDescriptor::from_raw(&RawQuery {
        term: args.term,
        category: args.category,
        sort: args.sort,
        page_size: args.limit,
    })?;

    let first = fetcher
        .fetch_page(&query, 0)
        .await
        .context("failed to fetch first page")?;
    let state = CollectionState::seeded(query, first.items, first.total);
    let mut printed = print_new(state.items(), 0);

    let handle = spawn_loader(
        state,
        fetcher,
        LoaderConfig {
            fetch_timeout_ms: args.timeout_ms,
            ..LoaderConfig::default()
        },
    );
    let mut events = handle.subscribe();

    for _ in 0..args.pages {
        match handle.near_end().await? {
            TriggerOutcome::Issued { .. } => {}
            TriggerOutcome::Ignored(reason) => {
                tracing::info!(?reason, "no more pages requested");
                break;
            }
        }

        loop {
            let event = tokio::time::timeout(event_wait(args.timeout_ms), events.recv())
                .await
                .context("loader went quiet")??;
            match event {
                LoaderEvent::StateChanged(snapshot) if !snapshot.loading => {
                    printed = print_new(&snapshot.items, printed);
                    if snapshot.exhausted {
                        println!("-- no more products ({printed} shown)");
                    }
                    break;
                }
                LoaderEvent::StateChanged(_) => {}
                LoaderEvent::LoadFailed { offset, message } => {
                    handle.shutdown().await?;
                    bail!("failed to load more at offset {offset}: {message}");
                }
            }
        }
    }

    handle.shutdown().await?;
    Ok(())
}

/// How long to wait for the loader to settle after a trigger.
fn event_wait(fetch_timeout_ms: u64) -> Duration {
    Duration::from_millis(fetch_timeout_ms.saturating_mul(2))
}

fn print_new(items: &[catalogfeed::item::CatalogItem], from: usize) -> usize {
    for item in items.iter().skip(from) {
        println!("{:>5}  ${:>9.2}  {}", item.id, item.price, item.title);
    }
    items.len()
}
