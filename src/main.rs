//! Mailman-Mirror main entry point
//!
//! This is the command-line interface for the Mailman-Mirror archive mirror.

use anyhow::Context;
use clap::Parser;
use mailman_mirror::config::{load_config_with_hash, ArchiveConfig};
use mailman_mirror::crawler::{mirror, mirror_text_archives};
use mailman_mirror::url::ArchiveUrls;
use mailman_mirror::ContentFilter;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Mailman-Mirror: a redacting mirror for Mailman pipermail archives
///
/// Mailman-Mirror copies a list's monthly archive to a local directory with
/// email addresses and deep quotes removed, and writes an RSS feed of the
/// latest messages.
#[derive(Parser, Debug)]
#[command(name = "mailman-mirror")]
#[command(version)]
#[command(about = "A redacting mirror for Mailman pipermail archives", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG", default_value = "mailman-mirror.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Only download each month's gzipped text archive into <publish-dir>/text
    #[arg(long)]
    text_only: bool,

    /// Validate config and show what would be mirrored without fetching anything
    #[arg(long, conflicts_with = "text_only")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The config's own verbose flag feeds into the log level, so load it first
    let loaded = load_config_with_hash(&cli.config);
    let config_verbose = matches!(&loaded, Ok((config, _)) if config.local.verbose);
    setup_logging(cli.verbose, cli.quiet, config_verbose);

    let (config, config_hash) = loaded
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!(
        "Configuration loaded from {} (hash: {})",
        cli.config.display(),
        config_hash
    );

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    let report = if cli.text_only {
        mirror_text_archives(config)
            .await
            .context("Text archive download failed")?
    } else {
        mirror(config).await.context("Mirror run failed")?
    };
    tracing::debug!("{:?}", report);

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool, config_verbose: bool) {
    let level = if quiet {
        0
    } else if config_verbose {
        verbose.max(1) + 1
    } else {
        verbose + 1
    };

    let filter = match level {
        0 => EnvFilter::new("error"),
        1 => EnvFilter::new("mailman_mirror=info,warn"),
        2 => EnvFilter::new("mailman_mirror=debug,info"),
        _ => EnvFilter::new("mailman_mirror=trace,debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be mirrored
fn handle_dry_run(config: &ArchiveConfig) -> anyhow::Result<()> {
    let urls = ArchiveUrls::new(&config.mailman, config.is_private())?;
    let filter = ContentFilter::new(config, &urls)?;

    println!("=== Mailman-Mirror Dry Run ===\n");

    println!("Archive:");
    println!("  List: {}", config.mailman.list_name);
    println!("  Index: {}", urls.list_url());
    println!(
        "  Access: {}",
        if config.is_private() {
            "private (login required)"
        } else {
            "public"
        }
    );

    println!("\nMirror:");
    println!("  Publish dir: {}", config.local.publish_dir.display());
    println!("  Publish URL: {}", config.local.publish_url);
    match config.look_back_hours() {
        Some(hours) => println!("  Look-back window: {} hours", hours),
        None => println!("  Look-back window: unbounded"),
    }
    println!("  Message delay: {}ms", config.local.message_delay_ms);

    println!("\nFilter stages:");
    for name in filter.stage_names() {
        println!("  - {}", name);
    }

    println!("\nFeed:");
    if config.feed_enabled() {
        println!("  File: {}", config.rss.rss_file);
        println!("  Items: {}", config.rss.items_for_rss);
        println!("  Title: {}", config.rss.rss_title);
    } else {
        println!("  Disabled");
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}
