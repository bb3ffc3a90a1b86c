//! Command-line and environment configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chunab_core::SymbolFile;
use chunab_roster::{CandidateIndex, RosterError};
use chunab_sync::FeedConfig;
use clap::{Args, Parser, Subcommand};
use tracing::warn;

#[derive(Debug, Parser)]
#[command(name = "chunab", version, about = "Live election results backend for the constituency map")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll the live feed and serve snapshots, the event stream, and the roster.
    Serve(ServeArgs),
    /// Print the joined reference roster.
    Roster(RosterArgs),
    /// Fetch the live feed once and print the normalized tally.
    Poll(FeedArgs),
}

/// Live feed settings. Without a URL polling is disabled.
#[derive(Debug, Clone, Args)]
pub struct FeedArgs {
    /// Live results feed endpoint.
    #[arg(long = "feed-url", env = "CHUNAB_FEED_URL")]
    pub url: Option<String>,

    /// Referer header sent to the feed.
    #[arg(long = "feed-referer", env = "CHUNAB_FEED_REFERER")]
    pub referer: Option<String>,

    /// Session cookie sent to the feed.
    #[arg(long = "feed-cookie", env = "CHUNAB_FEED_COOKIE", hide_env_values = true)]
    pub cookie: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long = "feed-timeout", env = "CHUNAB_FEED_TIMEOUT", default_value_t = 20)]
    pub timeout_secs: u64,
}

impl FeedArgs {
    /// `None` when no (non-blank) URL is configured.
    pub fn feed_config(&self) -> Option<FeedConfig> {
        let url = self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        let non_blank = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        Some(FeedConfig {
            referer: non_blank(&self.referer),
            cookie: non_blank(&self.cookie),
            timeout: Duration::from_secs(self.timeout_secs),
            ..FeedConfig::new(url)
        })
    }
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub feed: FeedArgs,

    /// Seconds between live feed polls.
    #[arg(long = "poll-secs", env = "CHUNAB_POLL_SECS", default_value_t = 30)]
    pub poll_secs: u64,

    /// Address to listen on.
    #[arg(long, env = "CHUNAB_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Reference candidate data (JSON).
    #[arg(long, env = "CHUNAB_REFERENCE", default_value = "data/reference.json")]
    pub reference: PathBuf,

    /// Party-symbol mapping (JSON).
    #[arg(long, env = "CHUNAB_SYMBOLS")]
    pub symbols: Option<PathBuf>,
}

impl ServeArgs {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_secs.max(1))
    }
}

#[derive(Debug, Clone, Args)]
pub struct RosterArgs {
    /// Reference candidate data (JSON).
    #[arg(long, env = "CHUNAB_REFERENCE", default_value = "data/reference.json")]
    pub reference: PathBuf,

    /// Only print this district, or a single seat such as `"Jhapa 1"` (any
    /// spelling the normalizer understands).
    pub district: Option<String>,
}

/// Load the roster. A missing file is an expected state and yields an empty
/// index; an unreadable or malformed one is an error.
pub fn load_roster(path: &Path) -> anyhow::Result<CandidateIndex> {
    match CandidateIndex::load(path) {
        Ok(index) => Ok(index),
        Err(RosterError::NotFound(p)) => {
            warn!(path = %p.display(), "reference file not found, serving an empty roster");
            Ok(CandidateIndex::default())
        }
        Err(e) => Err(e).with_context(|| format!("loading reference data from {}", path.display())),
    }
}

/// Load the party-symbol mapping; absent path or file gives an empty table.
pub fn load_symbols(path: Option<&Path>) -> anyhow::Result<SymbolFile> {
    let Some(path) = path else {
        return Ok(SymbolFile::default());
    };
    if !path.exists() {
        warn!(path = %path.display(), "symbol file not found, parties will have no symbols");
        return Ok(SymbolFile::default());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading symbol file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing symbol file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("chunab").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn blank_feed_url_disables_polling() {
        let feed = FeedArgs {
            url: Some("   ".into()),
            referer: None,
            cookie: None,
            timeout_secs: 20,
        };
        assert!(feed.feed_config().is_none());
    }

    #[test]
    fn feed_config_carries_headers() {
        let Command::Poll(feed) = parse(&[
            "poll",
            "--feed-url",
            " https://example.test/feed ",
            "--feed-referer",
            "https://example.test/",
            "--feed-cookie",
            "",
        ])
        .command
        else {
            panic!("expected poll command");
        };
        let config = feed.feed_config().unwrap();
        assert_eq!(config.url, "https://example.test/feed");
        assert_eq!(config.referer.as_deref(), Some("https://example.test/"));
        assert!(config.cookie.is_none());
    }

    #[test]
    fn serve_defaults() {
        let Command::Serve(args) = parse(&["serve", "--reference", "ref.json"]).command else {
            panic!("expected serve command");
        };
        assert_eq!(args.poll_interval(), Duration::from_secs(30));
        assert_eq!(args.bind.port(), 8080);
        assert_eq!(args.reference, PathBuf::from("ref.json"));
    }

    #[test]
    fn missing_reference_is_empty_roster() {
        let dir = tempfile::tempdir().unwrap();
        let index = load_roster(&dir.path().join("nope.json")).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn malformed_reference_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "[").unwrap();
        assert!(load_roster(&path).is_err());
    }

    #[test]
    fn symbols_optional() {
        assert!(load_symbols(None).unwrap().symbols.is_empty());
        let dir = tempfile::tempdir().unwrap();
        assert!(load_symbols(Some(&dir.path().join("none.json"))).unwrap().symbols.is_empty());

        let path = dir.path().join("symbols.json");
        std::fs::write(&path, r#"{"source":"wiki","fetchedAt":"x","symbols":{"Nepali Congress":"img/tree.png"}}"#).unwrap();
        assert_eq!(load_symbols(Some(&path)).unwrap().symbols.len(), 1);
    }
}
