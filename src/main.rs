use anyhow::Context;
use clap::{Parser, Subcommand};
use slack_broadcast::broadcast::{
    BroadcastOutcome, Broadcaster, exit_code, render_broadcast, render_dry_run,
};
use slack_broadcast::config::{BroadcastConfig, load_broadcast_settings, load_settings};
use slack_broadcast::error::BroadcastError;
use slack_broadcast::logging::{init_tracing, log_error};
use slack_broadcast::slack::SlackClient;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "slack-broadcast",
    version,
    about = "Broadcast a message to lists of Slack channels"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Broadcast YAML file (mentions, channel lists, sender).
    #[arg(long, short, global = true, env = "BROADCAST_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message to every channel of a list.
    Send {
        /// Name of the channel list to broadcast to.
        #[arg(short, long)]
        list: String,
        /// Message text; `@name` and `@{name}` are resolved from `mentions`.
        #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
        message: Option<String>,
        /// Read the message text from a file.
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Predict the outcome without posting anything.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
        /// Print the result as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show the configured channel lists.
    Lists,
    /// Load and check the configuration file.
    Validate,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize rustls crypto provider
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            match e.downcast_ref::<BroadcastError>() {
                Some(error) => {
                    log_error("broadcast", error);
                    exit_code::for_error(error)
                }
                None => {
                    tracing::error!(error = %format!("{e:#}"), "Broadcast aborted");
                    exit_code::CONFIG_ERROR
                }
            }
        }
    };

    ExitCode::from(u8::try_from(code).unwrap_or(u8::MAX))
}

async fn load_config(cli_path: Option<PathBuf>) -> anyhow::Result<BroadcastConfig> {
    let path = match cli_path {
        Some(path) => path,
        None => load_broadcast_settings()?.config_path,
    };
    let config = BroadcastConfig::load(&path).await?;
    tracing::info!(path = %path.display(), "Configuration loaded");
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Commands::Send {
            list,
            message,
            file,
            dry_run,
            json,
        } => {
            let mut settings = load_settings()?;
            if let Some(path) = cli.config {
                settings.broadcast.config_path = path;
            }

            let config = BroadcastConfig::load(&settings.broadcast.config_path).await?;
            let message = match (message, file) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .map_err(BroadcastError::from)
                    .with_context(|| format!("reading message from {}", path.display()))?,
                (None, None) => {
                    return Err(BroadcastError::Config("no message given".to_string()).into());
                }
            };

            let client = Arc::new(SlackClient::new(settings.slack.clone())?);
            tracing::info!("Slack client created");

            let broadcaster = Broadcaster::new(client, config, settings.broadcast.clone());
            let outcome = broadcaster.run(&list, &message, dry_run).await?;

            match &outcome {
                BroadcastOutcome::Delivered { result, summary } => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(result)?);
                    } else {
                        println!("{}", render_broadcast(result, summary));
                    }
                    Ok(exit_code::resolve(result))
                }
                BroadcastOutcome::Simulated { result, summary } => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(result)?);
                    } else {
                        println!("{}", render_dry_run(result, summary));
                    }
                    // Predicted failures are warnings, not errors
                    Ok(exit_code::SUCCESS)
                }
            }
        }
        Commands::Lists => {
            let config = load_config(cli.config).await?;
            for list in &config.channel_lists {
                let description = list.description.as_deref().unwrap_or("");
                println!(
                    "{:<24} {:>3} channel(s)  {}",
                    list.name,
                    list.channels.len(),
                    description
                );
            }
            Ok(exit_code::SUCCESS)
        }
        Commands::Validate => {
            let config = load_config(cli.config).await?;
            let mapping = config.mention_mapping()?;
            println!(
                "OK: {} channel list(s), {} mention(s)",
                config.channel_lists.len(),
                mapping.len()
            );
            Ok(exit_code::SUCCESS)
        }
    }
}
