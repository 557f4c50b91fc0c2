//! Follow-graph harvester
//!
//! Single-binary collection engine that:
//! 1. Loads the credential pool and the user id list
//! 2. Fetches each user's follow set through rotating API credentials
//! 3. Appends edges and failures durably to timestamped run files
//!
//! The `corpus` subcommand turns a collected edge file into per-user
//! training sentences for the embedding trainer.

mod collect;
mod config;
mod corpus;
mod error;
mod input;
mod sink;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use rotation::RateLimitCoordinator;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use twitter_auth::{CredentialPool, TwitterConnector};

use crate::collect::Collector;
use crate::config::Config;
use crate::sink::{OutputSink, RunPaths};

/// Value following a `--flag` argument, if present.
fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Env-driven log filter: LOG_LEVEL, then RUST_LOG, then "info".
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_env("LOG_LEVEL")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let command = args
        .get(1)
        .map(String::as_str)
        .filter(|a| !a.starts_with("--"))
        .unwrap_or("collect");

    match command {
        "collect" => run_collect(&args).await,
        "corpus" => run_corpus(&args),
        other => bail!("unknown command {other:?}; expected collect or corpus"),
    }
}

/// Run the collection engine end to end.
async fn run_collect(args: &[String]) -> Result<()> {
    let config_path = Config::resolve_path(flag_value(args, "--config"));
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    let collect = &config.collect;

    std::fs::create_dir_all(&collect.output_dir)
        .with_context(|| format!("creating output dir {}", collect.output_dir.display()))?;
    let paths = RunPaths::new(&collect.output_dir);

    // Event log goes to the timestamped run file; operator progress to stderr.
    let log_file = std::fs::File::create(&paths.log)
        .with_context(|| format!("creating event log {}", paths.log.display()))?;
    tracing_subscriber::registry()
        .with(log_filter())
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(log_file))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        config = %config_path.display(),
        users_file = %collect.users_file.display(),
        tokens_file = %collect.tokens_file.display(),
        output_dir = %collect.output_dir.display(),
        cooldown_secs = collect.cooldown_secs,
        max_attempts = collect.max_attempts,
        "starting follow-harvester"
    );

    let pool = CredentialPool::load(&collect.tokens_file)?;
    let client = twitter_auth::http_client(collect.proxy.as_deref())
        .context("building API client")?;
    let connector = TwitterConnector::new(client, pool);
    let pool_size = connector.pool_size();

    let mut coordinator = RateLimitCoordinator::new(
        Arc::new(connector),
        pool_size,
        Duration::from_secs(collect.cooldown_secs),
    )
    .context("initializing rotation coordinator")?;

    let mut sink = OutputSink::create(&paths)
        .with_context(|| format!("opening sinks in {}", collect.output_dir.display()))?;
    let user_ids = input::read_user_ids(&collect.users_file)?;

    let summary = Collector::new(&mut coordinator, &mut sink, collect.max_attempts)
        .run(&user_ids)
        .await
        .context("collection run aborted")?;

    info!(
        edges_file = %paths.edges.display(),
        failures_file = %paths.failures.display(),
        succeeded = summary.succeeded,
        edges = summary.edges,
        "harvest complete"
    );
    Ok(())
}

/// Build the training corpus from a collected edge file.
fn run_corpus(args: &[String]) -> Result<()> {
    tracing_subscriber::registry()
        .with(log_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let input = flag_value(args, "--input")
        .context("corpus requires --input pointing at a collected edge file")?;
    let config_path = Config::resolve_path(flag_value(args, "--config"));
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    std::fs::create_dir_all(&config.collect.output_dir)
        .with_context(|| format!("creating output dir {}", config.collect.output_dir.display()))?;

    let sentences =
        corpus::build_corpus(std::path::Path::new(input), config.corpus.popular_count)?;
    let path = corpus::write_corpus(&sentences, &config.collect.output_dir)?;
    info!(path = %path.display(), sentences = sentences.len(), "corpus ready");
    Ok(())
}
