use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::task::JoinHandle;

use keyword_bot::application::errors::BotError;
use keyword_bot::application::handlers::KeywordHandler;
use keyword_bot::application::messaging::Router;
use keyword_bot::domain::entities::GroupRegistry;
use keyword_bot::domain::traits::Outbox;
use keyword_bot::infrastructure::adapters::console::{self, ConsoleOutbox};
use keyword_bot::infrastructure::adapters::groupme::{self, GroupMeApi, GroupMeOutbox};
use keyword_bot::infrastructure::config::Config;
use keyword_bot::infrastructure::storage::{RuleFileWriter, RuleStore};

#[derive(Parser)]
#[command(name = "keyword-bot")]
#[command(about = "GroupMe bot that replies to keyword rules", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Access token (overrides config and environment)
    #[arg(short, long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server
    Run,
    /// Read messages from stdin and print replies (dev mode)
    Console {
        /// Group the typed messages appear to come from
        #[arg(short, long)]
        group: String,
    },
    /// Show version
    Version,
    /// Print a sample config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => load_config(&cli.config, cli.token).and_then(run_server),
        Commands::Console { group } => load_config(&cli.config, cli.token).and_then(|config| run_console(config, group)),
        Commands::Version => {
            println!("keyword-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(config_path: &str, token_override: Option<String>) -> Result<Config, BotError> {
    let mut config = if std::path::Path::new(config_path).exists() {
        Config::load(config_path)?.with_env()
    } else {
        tracing::warn!("Config file {} not found, using defaults", config_path);
        Config::load_env()
    };

    if token_override.is_some() {
        config.access_token = token_override;
    }
    Ok(config)
}

/// Load the rule file and attach a background writer for it. The returned
/// handle finishes once the store is dropped and queued writes are flushed.
/// Must run inside the tokio runtime.
fn open_rule_store(config: &Config) -> Result<(RuleStore, Option<JoinHandle<()>>), BotError> {
    match &config.keyword_file {
        Some(path) => {
            let store = RuleStore::load(path)?;
            let (writer, handle) = RuleFileWriter::spawn(path);
            Ok((store.with_writer(writer), Some(handle)))
        }
        None => {
            tracing::warn!("Keyword config file not set, rules will not be saved");
            Ok((RuleStore::new(), None))
        }
    }
}

fn build_router(
    config: &Config,
    groups: Arc<GroupRegistry>,
    outbox: Arc<dyn Outbox>,
) -> Result<(Router, Option<JoinHandle<()>>), BotError> {
    let (store, writer) = open_rule_store(config)?;

    let keywords = Arc::new(KeywordHandler::new(store, outbox.clone()));
    Ok((Router::new(groups, outbox).with_handler(keywords), writer))
}

/// Wait for queued rule file writes. The router owning the store must already
/// be dropped.
async fn flush_rules(writer: Option<JoinHandle<()>>) {
    if let Some(handle) = writer {
        if let Err(e) = handle.await {
            tracing::error!("Keyword file writer failed: {}", e);
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

fn run_server(config: Config) -> Result<(), BotError> {
    let rt = tokio::runtime::Runtime::new().map_err(|e| BotError::Internal(e.to_string()))?;

    rt.block_on(async {
        let groups = Arc::new(config.group_registry());
        let api = Arc::new(GroupMeApi::new(config.access_token()));
        let outbox: Arc<dyn Outbox> = Arc::new(GroupMeOutbox::new(api, groups.clone()));

        let (router, writer) = build_router(&config, groups, outbox)?;
        let served = groupme::serve(Arc::new(router), config.server.port, shutdown_signal()).await;
        flush_rules(writer).await;
        served
    })
}

fn run_console(config: Config, group: String) -> Result<(), BotError> {
    let rt = tokio::runtime::Runtime::new().map_err(|e| BotError::Internal(e.to_string()))?;

    rt.block_on(async {
        let groups = Arc::new(config.group_registry());
        let (router, writer) = build_router(&config, groups, Arc::new(ConsoleOutbox::new()))?;
        let result = console::run(Arc::new(router), group).await;
        flush_rules(writer).await;
        result
    })
}

fn init_config() -> Result<(), BotError> {
    let yaml = serde_yaml::to_string(&Config::example())
        .map_err(|e| BotError::Internal(format!("Failed to render config: {}", e)))?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
