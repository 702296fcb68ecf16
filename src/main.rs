//! Site-Validator main entry point
//!
//! This is the command-line interface for the Site-Validator link and
//! resource checker.

use clap::Parser;
use site_validator::config::{load_config_with_hash, validate, validate_seed_url, Config};
use site_validator::crawler::run_crawl;
use site_validator::output::{MarkdownReport, ReportWriter, TerminalReport};
use site_validator::{ConfigError, SiteError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Site-Validator: validate website HTML & CSS, check links & resources
///
/// Starting from a single URL, Site-Validator checks every internal page and
/// every resource they reference (images, stylesheets, scripts, favicons,
/// inline-style URLs), and reports broken links, redirects, mixed content
/// and markup validation errors.
#[derive(Parser, Debug)]
#[command(name = "site-validator")]
#[command(version)]
#[command(about = "Validate website HTML & CSS, check links & resources", long_about = None)]
struct Cli {
    /// URL to start from
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Path to TOML configuration file (command-line options take precedence)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Recursive, follow all internal links (default single URL)
    #[arg(short, long)]
    all: bool,

    /// Crawl depth ("-a" overrides this)
    #[arg(short, long, value_name = "N")]
    depth: Option<u32>,

    /// Check outbound links (HEAD only)
    #[arg(short, long)]
    outbound: bool,

    /// Validate HTML
    #[arg(long)]
    html: bool,

    /// Validate CSS
    #[arg(long)]
    css: bool,

    /// Ignore URLs, comma-separated, wildcards allowed (*.jpg,example.com)
    #[arg(short, long, value_delimiter = ',', value_name = "PATTERNS")]
    ignore: Vec<String>,

    /// Ignore robots.txt
    #[arg(short, long)]
    no_robots: bool,

    /// Treat redirects as errors
    #[arg(short, long)]
    redirects: bool,

    /// Display validation warnings (default errors only)
    #[arg(short, long)]
    warnings: bool,

    /// Full scan (same as "-a -r -o --html --css")
    #[arg(short, long)]
    full: bool,

    /// Number of concurrent requests
    #[arg(short, long, value_name = "N")]
    threads: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Nu HTML Checker address
    #[arg(long, value_name = "URL")]
    validator: Option<String>,

    /// Also write a markdown report to this path
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Exit status when the crawl was interrupted
const EXIT_INTERRUPTED: u8 = 1;

/// Exit status for configuration and startup errors
const EXIT_CONFIG: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match handle_crawl(cli).await {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::from(EXIT_INTERRUPTED),
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("site-validator: {}", e);
            if matches!(e, SiteError::Config(ConfigError::MissingUrl)) {
                eprintln!("Try `site-validator --help` for more options.");
            }
            ExitCode::from(EXIT_CONFIG)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_validator=warn"),
            1 => EnvFilter::new("site_validator=info,warn"),
            2 => EnvFilter::new("site_validator=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the configuration: file (if any), then command-line overrides
fn build_config(cli: &Cli) -> Result<Config, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if cli.all {
        config.crawler.recursive = true;
    }
    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if cli.outbound {
        config.crawler.check_outbound = true;
    }
    if cli.html {
        config.validation.html = true;
    }
    if cli.css {
        config.validation.css = true;
    }
    config
        .crawler
        .ignore
        .extend(cli.ignore.iter().filter(|p| !p.trim().is_empty()).cloned());
    if cli.no_robots {
        config.crawler.ignore_robots = true;
    }
    if cli.redirects {
        config.crawler.redirects_as_errors = true;
    }
    if cli.warnings {
        config.validation.warnings = true;
    }
    if let Some(threads) = cli.threads {
        config.crawler.workers = threads;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.timeout_secs = timeout;
    }
    if let Some(validator) = &cli.validator {
        config.validation.validator_url = validator.clone();
    }
    if cli.full {
        config.apply_full_scan();
    }

    validate(&config)?;
    Ok(config)
}

/// Runs the crawl and prints the report
///
/// Returns whether the crawl was interrupted.
async fn handle_crawl(cli: Cli) -> Result<bool, SiteError> {
    let config = build_config(&cli)?;
    let raw_url = cli.url.as_deref().ok_or(ConfigError::MissingUrl)?;
    let seed = validate_seed_url(raw_url)?;

    tracing::info!(
        "Workers: {}, timeout: {}s, depth: {}",
        config.crawler.workers,
        config.crawler.timeout_secs,
        config
            .max_depth()
            .map_or_else(|| "unlimited".to_string(), |d| d.to_string())
    );

    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::warn!("Unable to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let report = run_crawl(config, seed, shutdown).await?;

    TerminalReport::new(std::io::stdout().lock()).write_report(&report)?;

    if let Some(path) = &cli.summary {
        MarkdownReport::new(path).write_report(&report)?;
    }

    Ok(report.interrupted)
}
