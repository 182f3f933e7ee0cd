use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use sales_ledger_bot::application::errors::{BotError, ConfigError};
use sales_ledger_bot::application::messaging::MessageDispatcher;
use sales_ledger_bot::application::services::{CommandService, LedgerService};
use sales_ledger_bot::domain::traits::Bot;
use sales_ledger_bot::infrastructure::adapters::console::CONSOLE_CHAT;
use sales_ledger_bot::infrastructure::adapters::{ConsoleAdapter, TelegramAdapter};
use sales_ledger_bot::infrastructure::config::Config;
use sales_ledger_bot::infrastructure::database::SqliteLedger;

#[derive(Parser)]
#[command(name = "sales-ledger-bot")]
#[command(about = "Chat bot keeping a two-currency sales ledger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config)
    #[arg(short, long)]
    token: Option<String>,

    /// SQLite database path (overrides config)
    #[arg(short, long)]
    database: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => run_bot(cli.config, cli.token, cli.database),
        Commands::Version => {
            println!("sales-ledger-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(config_path: &str) -> Config {
    if !std::path::Path::new(config_path).exists() {
        return Config::load_env();
    }
    match Config::load(config_path) {
        Ok(mut config) => {
            config.apply_env(|key| std::env::var(key).ok());
            config
        }
        Err(e) => {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        }
    }
}

fn run_bot(config_path: String, token_override: Option<String>, database_override: Option<PathBuf>) -> Result<(), BotError> {
    let mut config = load_config(&config_path);
    if let Some(database) = database_override {
        config.ledger.database = database;
    }

    tracing::info!("Starting {}", config.bot.name);

    // Opened once here, closed when the dispatcher is dropped at the end of run_bot
    let ledger = SqliteLedger::new(&config.ledger.database)?;
    tracing::info!("Database initialized at {}", config.ledger.database.display());

    let service = LedgerService::new(Arc::new(ledger), config.currencies());
    let mut commands = CommandService::new(&config.bot.prefix);
    commands.register_defaults();
    commands.register_ledger_commands(Arc::new(service));
    let dispatcher = MessageDispatcher::new(commands);

    let rt = tokio::runtime::Runtime::new()?;

    if let Some(token) = token_override.or_else(|| config.telegram_token()) {
        rt.block_on(run_telegram_bot(token, &config, &dispatcher))
    } else if config.adapters.console.as_ref().map_or(true, |c| c.enabled) {
        rt.block_on(run_console_bot(&config, &dispatcher))
    } else {
        Err(BotError::Config(ConfigError::InvalidValue(
            "no adapter enabled: set a Telegram token or enable the console".to_string(),
        )))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}

async fn run_telegram_bot(token: String, config: &Config, dispatcher: &MessageDispatcher) -> Result<(), BotError> {
    let mut bot = TelegramAdapter::new(token, &config.bot.name);
    bot.start().await?;

    // Fetch bot info
    bot.fetch_bot_info().await?;
    let info = bot.bot_info();
    tracing::info!("Bot started: @{}", info.username);

    // Register bot commands with Telegram
    if let Err(e) = bot.register_commands(&dispatcher.commands().summaries()).await {
        tracing::warn!("Failed to register commands: {}", e);
    }

    bot.run(
        |chat_id, text, sender| dispatcher.process_from(chat_id, text, sender),
        shutdown_signal(),
    )
    .await
}

async fn run_console_bot(config: &Config, dispatcher: &MessageDispatcher) -> Result<(), BotError> {
    let bot = ConsoleAdapter::new(&config.bot.name);
    bot.start().await?;

    let info = bot.bot_info();
    tracing::info!("Bot started: @{} (type {}help)", info.username, config.bot.prefix);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    // Main loop (for console mode)
    loop {
        let line = tokio::select! {
            _ = &mut shutdown => break,
            line = bot.read_line("> ") => line?,
        };

        let Some(input) = line else {
            // stdin closed
            break;
        };
        if input.is_empty() {
            continue;
        }

        if let Some(reply) = dispatcher.process_text(CONSOLE_CHAT, input) {
            bot.send_message(CONSOLE_CHAT, &reply).await?;
        }
    }

    Ok(())
}

fn init_config() -> Result<(), BotError> {
    let yaml = Config::default().to_yaml()?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and adjust as needed.");
    Ok(())
}
