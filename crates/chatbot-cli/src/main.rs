//! chatbot CLI: mounts the chat widget in the terminal and manages its
//! persisted history.

use chatbot_engine::persistence::load_state;
use chatbot_engine::{
    ConversationStore, FileStorage, Sender, StateStorage, SystemClock, WidgetConfig,
    WidgetController,
};
use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Embeddable chat widget for the terminal
#[derive(Parser)]
#[command(name = "chatbot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory for history, config and logs
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (defaults to <data-dir>/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount the widget (default when no command specified)
    Tui,

    /// Print the persisted conversation
    History {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete the persisted conversation
    Reset,
}

const APP_DIR: &str = "chatbot";
const CONFIG_FILE: &str = "config.json";
const LOG_FILE: &str = "chatbot.log";

fn main() {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| data_dir.join(CONFIG_FILE));

    if let Err(e) = run(cli.command, &data_dir, &config_path) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(
    command: Option<Commands>,
    data_dir: &Path,
    config_path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(data_dir)?;
    init_logging(data_dir)?;
    let config = WidgetConfig::load(config_path)?;

    match command {
        None | Some(Commands::Tui) => cmd_tui(config, data_dir),
        Some(Commands::History { json }) => cmd_history(&config, data_dir, json),
        Some(Commands::Reset) => cmd_reset(&config, data_dir),
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Send tracing output to a log file so it never draws over the UI.
fn init_logging(data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn history_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("history")
}

fn cmd_tui(config: WidgetConfig, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let storage = FileStorage::new(history_dir(data_dir))?;
    let store = ConversationStore::open(Box::new(storage), config.storage_key.clone());
    if let Some(notice) = store.notice() {
        info!(notice, "Starting with memory-only history");
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let controller = WidgetController::new(config, store, Box::new(SystemClock));
        chatbot_tui::run_tui(controller).await
    })
}

fn cmd_history(
    config: &WidgetConfig,
    data_dir: &Path,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let storage = FileStorage::new(history_dir(data_dir))?;
    let state = load_state(&storage, &config.storage_key)?.unwrap_or_default();

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    if state.messages.is_empty() {
        println!("No messages");
        return Ok(());
    }

    for message in &state.messages {
        match (message.sender, &message.timestamp) {
            (Sender::User, Some(timestamp)) => {
                println!("[{timestamp}] {}: {}", message.sender, message.text);
            }
            _ => println!("{}: {}", message.sender, message.text),
        }
    }
    Ok(())
}

fn cmd_reset(config: &WidgetConfig, data_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let storage = FileStorage::new(history_dir(data_dir))?;
    storage.remove(&config.storage_key)?;
    info!(key = %config.storage_key, "History reset");
    println!("History cleared");
    Ok(())
}
