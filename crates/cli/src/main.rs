mod commands;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use relwatch_core::{load_config_or_default, validate_config, Config, Quality};

/// Default config file when neither `--config` nor `RELWATCH_CONFIG` is set
const DEFAULT_CONFIG_PATH: &str = "relwatch.toml";

#[derive(Debug, Parser)]
#[command(name = "relwatch", version)]
#[command(about = "Watch a release catalog and open magnets for new episodes")]
struct Cli {
    /// Configuration file (falls back to $RELWATCH_CONFIG, then relwatch.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List catalog shows whose title contains QUERY
    Search { query: String },

    /// List every episode of a show
    Episodes {
        /// Show page link, absolute or relative to the catalog
        link: String,
        /// Show title used to name episodes (default: derived from the link)
        #[arg(long)]
        title: Option<String>,
        /// Quality tier: 1080, 720 or 480
        #[arg(long)]
        quality: Option<Quality>,
        /// Fetch all pages concurrently from an estimated page count
        #[arg(long)]
        bulk: bool,
        /// Open every listed magnet
        #[arg(long)]
        open: bool,
    },

    /// Start tracking a show
    Track { title: String, link: String },

    /// Stop tracking a show
    Untrack { title: String },

    /// List tracked shows
    Shows,

    /// Check every tracked show and open magnets for new episodes
    Run {
        /// Quality tier: 1080, 720 or 480
        #[arg(long)]
        quality: Option<Quality>,
        /// Fetch all pages concurrently from an estimated page count
        #[arg(long)]
        bulk: bool,
        /// Report new episodes without opening them or marking them as seen
        #[arg(long)]
        dry_run: bool,
        /// Print Prometheus metrics to stderr when done
        #[arg(long)]
        metrics: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(format: LogFormat) {
    let json = format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

/// Resolve the config path: flag, then environment, then the default file.
fn config_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var("RELWATCH_CONFIG").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn load(path: &Path) -> Result<Config> {
    info!("Loading configuration from {:?}", path);
    let config = load_config_or_default(path)
        .with_context(|| format!("Failed to load config from {:?}", path))?;
    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let config = load(&config_path(cli.config))?;

    match cli.command {
        Command::Search { query } => commands::search(&config, &query).await,
        Command::Episodes {
            link,
            title,
            quality,
            bulk,
            open,
        } => {
            let options = commands::EpisodesOptions {
                title,
                quality,
                bulk,
                open,
            };
            commands::episodes(&config, &link, options).await
        }
        Command::Track { title, link } => commands::track(&config, title, link),
        Command::Untrack { title } => commands::untrack(&config, &title),
        Command::Shows => commands::shows(&config),
        Command::Run {
            quality,
            bulk,
            dry_run,
            metrics,
        } => {
            let options = commands::RunOptions {
                quality,
                bulk,
                dry_run,
                metrics,
            };
            commands::run_batch(&config, options).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "relwatch", "--config", "custom.toml", "run", "--quality", "720p", "--bulk",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Command::Run {
                quality,
                bulk,
                dry_run,
                metrics,
            } => {
                assert_eq!(quality, Some(Quality::P720));
                assert!(bulk);
                assert!(dry_run);
                assert!(!metrics);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_quality() {
        assert!(Cli::try_parse_from(["relwatch", "run", "--quality", "4k"]).is_err());
    }

    #[test]
    fn test_parse_episodes() {
        let cli = Cli::try_parse_from([
            "relwatch", "episodes", "/shows/x", "--title", "X", "--log-format", "json",
        ])
        .unwrap();

        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(matches!(
            cli.command,
            Command::Episodes { ref link, ref title, quality: None, bulk: false, open: false }
                if link == "/shows/x" && title.as_deref() == Some("X")
        ));
    }

    #[test]
    fn test_config_path_flag_wins() {
        assert_eq!(
            config_path(Some(PathBuf::from("a.toml"))),
            PathBuf::from("a.toml")
        );
    }
}
