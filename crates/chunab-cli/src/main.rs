mod config;
mod display;
mod server;

use std::future::IntoFuture;
use std::sync::Arc;

use anyhow::{Context, bail};
use chunab_core::{constituency_key, normalize_district};
use chunab_store::LiveHub;
use chunab_sync::{FeedClient, FeedSource, Poller, build_tally};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, Command, FeedArgs, RosterArgs, ServeArgs};
use crate::server::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("chunab v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Roster(args) => roster(&args),
        Command::Poll(args) => poll(&args).await,
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let roster = config::load_roster(&args.reference)?;
    let symbols = config::load_symbols(args.symbols.as_deref())?;
    let hub = Arc::new(LiveHub::default());

    let source: Option<Arc<dyn FeedSource>> = match args.feed.feed_config() {
        Some(feed) => {
            let client = FeedClient::new(&feed).context("building live feed client")?;
            info!(url = %client.url(), every_secs = args.poll_secs, "live polling enabled");
            Some(Arc::new(client))
        }
        None => {
            info!("no live feed configured, serving reference data only");
            None
        }
    };
    let poller = Arc::new(Poller::new(source, Arc::clone(&hub)));
    let state = AppState::new(Arc::clone(&hub), roster, &symbols, poller.is_enabled());
    let polling = tokio::spawn(Arc::clone(&poller).run(args.poll_interval()));

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("binding {}", args.bind))?;
    info!(addr = %args.bind, "listening");

    // Open event streams never finish on their own, so shutdown does not wait
    // for in-flight connections.
    tokio::select! {
        result = axum::serve(listener, server::router(state)).into_future() => {
            result.context("http server failed")?;
        }
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }
    polling.abort();
    Ok(())
}

fn roster(args: &RosterArgs) -> anyhow::Result<()> {
    let index = config::load_roster(&args.reference)?;
    let mut out = String::new();
    display::write_summary(&mut out, &index.summary())?;
    out.push('\n');

    let Some(name) = args.district.as_deref() else {
        display::write_roster_cards(&mut out, &index)?;
        print!("{out}");
        return Ok(());
    };
    if let Some(key) = constituency_key(name) {
        let seat = index
            .seat(&key)
            .with_context(|| format!("no seat {key} in the reference data"))?;
        let seats = std::slice::from_ref(seat);
        display::write_district_card(&mut out, key.district.as_str(), &seat.province, seats)?;
        print!("{out}");
        return Ok(());
    }

    let district = normalize_district(name);
    let seats = index.seats(&district);
    if seats.is_empty() {
        bail!("no seats found for district {name:?} (normalized to {district})");
    }
    let province = seats[0].province.as_str();
    display::write_district_card(&mut out, district.as_str(), province, seats)?;
    print!("{out}");
    Ok(())
}

async fn poll(args: &FeedArgs) -> anyhow::Result<()> {
    let Some(feed) = args.feed_config() else {
        bail!("no live feed configured; set --feed-url or CHUNAB_FEED_URL");
    };
    let client = FeedClient::new(&feed).context("building live feed client")?;
    let rows = client
        .fetch_rows()
        .await
        .with_context(|| format!("fetching {}", client.url()))?;
    let (tally, stats) = build_tally(&rows);
    let mut out = String::new();
    display::write_tally(&mut out, &tally, &stats)?;
    print!("{out}");
    Ok(())
}
