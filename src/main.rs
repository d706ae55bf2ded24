use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

mod binary;
mod classifier;
mod cli_output;
mod config;
mod detectors;
mod fetcher;
mod language;
mod models;
mod placeholder;
mod registry;
mod safety;
mod urls;

use classifier::Classifier;
use cli_output::{OutputMode, OutputWriter};
use config::AppConfig;
use fetcher::{ContentFetcher, HttpTransport, OfflineTransport, Transport};
use language::detect_language;
use placeholder::render_failure;

#[derive(Parser)]
#[command(name = "cmdpeek")]
#[command(about = "Explain what a pasted shell command does before you run it", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (default: <config dir>/cmdpeek/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Per-attempt network timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a command and preview any remote script it would run
    Analyze {
        /// Command text (read from stdin when omitted)
        command: Option<String>,

        /// Never touch the network; fetch-failure paths are used instead
        #[arg(long)]
        no_fetch: bool,

        /// Output format (default: auto-detect)
        #[arg(short, long, value_enum)]
        format: Option<OutputMode>,
    },

    /// Download a URL through the relay chain and print it
    Fetch {
        url: String,

        #[arg(short, long, value_enum)]
        format: Option<OutputMode>,
    },

    /// List configured package managers and programming tools
    Tables {
        #[arg(short, long, value_enum)]
        format: Option<OutputMode>,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as JSON
    Show,
    /// Write the built-in defaults to the configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration file location
    Path,
}

fn build_fetcher(config: &AppConfig, timeout: Option<u64>, offline: bool) -> Result<ContentFetcher> {
    let attempt_timeout = timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.fetch.attempt_timeout());

    let transport: Arc<dyn Transport> = if offline {
        debug!("Network access disabled");
        Arc::new(OfflineTransport)
    } else {
        Arc::new(HttpTransport::new(attempt_timeout).context("Failed to build HTTP client")?)
    };
    Ok(ContentFetcher::new(transport, config.fetch.clone()).with_attempt_timeout(attempt_timeout))
}

fn read_command(command: Option<String>) -> Result<String> {
    match command {
        Some(command) => Ok(command),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read command from stdin")?;
            Ok(buf)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; stderr keeps JSON on stdout clean
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Analyze {
            command,
            no_fetch,
            format,
        } => {
            let out = OutputWriter::new(format.unwrap_or_else(OutputMode::auto));
            let command = read_command(command)?;
            let config = AppConfig::load(cli.config.as_deref())?;

            let registry = Arc::new(config.registry()?);
            let fetcher = Arc::new(build_fetcher(&config, cli.timeout, no_fetch)?);
            let classifier = Classifier::new(registry, fetcher);
            debug!("Detectors: {}", classifier.detector_names().join(", "));

            let spinner = if no_fetch {
                None
            } else {
                out.spinner("Analyzing command...")
            };
            let analysis = classifier.classify(&command).await;
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }

            out.render_analysis(&analysis)?;
            Ok(())
        }

        Commands::Fetch { url, format } => {
            let out = OutputWriter::new(format.unwrap_or_else(OutputMode::auto));
            let config = AppConfig::load(cli.config.as_deref())?;
            let fetcher = build_fetcher(&config, cli.timeout, false)?;

            let spinner = out.spinner(&format!("Fetching {}...", url));
            let result = fetcher.fetch(&url).await;
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }

            match result {
                Ok(fetched) => {
                    if out.mode() == OutputMode::Json {
                        out.json(&json!({
                            "requestedUrl": fetched.requested_url,
                            "resolvedUrl": fetched.resolved_url,
                            "route": fetched.route,
                            "content": fetched.body,
                        }))?;
                    } else {
                        out.section(&fetched.resolved_url);
                        out.success(&format!("Retrieved via {}", fetched.route));
                        out.code_block(detect_language(&fetched.body).as_str(), &fetched.body);
                    }
                }
                Err(failure) => {
                    let placeholder = render_failure(&failure, fetcher.settings());
                    if out.mode() == OutputMode::Json {
                        out.json(&json!({
                            "requestedUrl": failure.requested_url,
                            "resolvedUrl": failure.resolved_url,
                            "error": failure.summary(),
                            "placeholder": placeholder,
                        }))?;
                    } else {
                        out.section(&failure.requested_url);
                        out.warning(&failure.summary());
                        out.code_block("powershell", &placeholder);
                    }
                }
            }
            Ok(())
        }

        Commands::Tables { format } => {
            let out = OutputWriter::new(format.unwrap_or_else(OutputMode::auto));
            let config = AppConfig::load(cli.config.as_deref())?;
            if out.mode() == OutputMode::Json {
                out.json(&json!({
                    "packageManagers": config.package_managers,
                    "programmingTools": config.programming_tools,
                }))?;
            } else {
                out.render_registry(&config.registry()?);
            }
            Ok(())
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let config = AppConfig::load(cli.config.as_deref())?;
                println!("{}", serde_json::to_string_pretty(&config)?);
                Ok(())
            }
            ConfigAction::Init { force } => {
                let path = match cli.config {
                    Some(path) => path,
                    None => AppConfig::config_file_path()?,
                };
                if path.exists() && !force {
                    bail!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    );
                }
                AppConfig::default().save_to(&path)?;
                info!("📝 Wrote default configuration to {}", path.display());
                OutputWriter::new(OutputMode::auto())
                    .success(&format!("Created {}", path.display()));
                Ok(())
            }
            ConfigAction::Path => {
                println!("{}", AppConfig::config_file_path()?.display());
                Ok(())
            }
        },
    }
}
