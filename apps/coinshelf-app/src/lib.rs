//! # Coinshelf App Library
//!
//! Application layer for Coinshelf: the currency store, configuration and
//! the command surface, plus the startup sequence the `coinshelf` binary
//! runs.
//!
//! ## Module Organization
//! ```text
//! coinshelf_app/
//! ├── lib.rs          ◄─── You are here (startup & dispatch)
//! ├── cli.rs          ◄─── clap argument parsing
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── currency.rs ◄─── CurrencyStore: snapshot, mutations, hydration
//! │   ├── search.rs   ◄─── QueryDebouncer, memoized filter
//! │   └── config.rs   ◄─── AppConfig (file + env)
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   └── currency.rs ◄─── get_currencies, list_view, insert/clear
//! └── error.rs        ◄─── StoreError, ConfigError, ApiError
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use coinshelf_core::SearchQuery;
use coinshelf_db::{Database, KeyValueStorage, MemoryStorage};

use cli::{Cli, Command, Dataset};
use commands::currency::{self as currency_commands, CurrenciesResponse, ListView};
use error::ApiError;
use state::{AppConfig, CurrencyStore, QueryDebouncer};

/// Runs one CLI invocation.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults → coinshelf.toml → COINSHELF_* → --db                    │
/// │                                                                         │
/// │  2. Open Storage ─────────────────────────────────────────────────────► │
/// │     • SQLite with WAL mode, pending migrations applied                  │
/// │     • or MemoryStorage with --memory                                    │
/// │                                                                         │
/// │  3. Create & Hydrate CurrencyStore ───────────────────────────────────► │
/// │     • read failures are kept in the store's error and shown             │
/// │                                                                         │
/// │  4. Dispatch Subcommand ──────────────────────────────────────────────► │
/// │     • list / insert / clear / search                                    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(cli: Cli) -> Result<(), ApiError> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.db {
        config.storage.database_path = Some(path);
    }

    if let Command::Config = cli.command {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let (storage, database) = open_storage(&config, cli.memory).await?;
    let store = CurrencyStore::new(storage, config.store_options())?;

    if let Err(e) = store.hydrate().await {
        warn!(error = %e, "Continuing without saved currencies");
    }

    let result = dispatch(&store, &config, cli.command).await;

    if let Some(db) = database {
        db.close().await;
    }
    result
}

async fn dispatch(
    store: &CurrencyStore,
    config: &AppConfig,
    command: Command,
) -> Result<(), ApiError> {
    match command {
        Command::List { query, json } => {
            let response = currency_commands::get_currencies(store, query.as_deref());
            print_list(&response, query.as_deref(), json)
        }
        Command::Insert { dataset } => {
            let task = match dataset {
                Dataset::Crypto => currency_commands::insert_crypto_data(store),
                Dataset::Fiat => currency_commands::insert_fiat_data(store),
                Dataset::Both => currency_commands::insert_both_data(store),
            };
            let outcome = currency_commands::await_persist(task).await?;
            info!(?outcome, "Insert finished");
            println!("Stored {} currencies", store.snapshot().total_count());
            Ok(())
        }
        Command::Clear => {
            let outcome = currency_commands::await_persist(currency_commands::clear_data(store)).await?;
            info!(?outcome, "Clear finished");
            println!("Cleared all currencies");
            Ok(())
        }
        Command::Search => run_search(store, config.debounce()).await,
        Command::Config => Ok(()),
    }
}

async fn open_storage(
    config: &AppConfig,
    memory: bool,
) -> Result<(Arc<dyn KeyValueStorage>, Option<Database>), ApiError> {
    if memory {
        info!("Using in-memory storage, nothing will be saved");
        return Ok((Arc::new(MemoryStorage::new()), None));
    }

    let db = Database::new(config.db_config()?).await?;

    Ok((Arc::new(db.key_values()), Some(db)))
}

/// Reads keystroke states from stdin and prints the list each time the
/// query settles.
async fn run_search(store: &CurrencyStore, debounce: Duration) -> Result<(), ApiError> {
    let debouncer = QueryDebouncer::spawn(debounce);
    let mut settled = debouncer.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_list(&currency_commands::get_currencies(store, None), None, false)?;

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => debouncer.push(line),
                None => break,
            },
            changed = settled.changed() => {
                if changed.is_err() {
                    break;
                }
                let query = settled.borrow_and_update().clone();
                print_search_result(store, &query)?;
            }
        }
    }

    // Input ended; let the last keystroke settle before exiting.
    let grace = debounce + Duration::from_millis(100);
    if let Ok(Ok(())) = tokio::time::timeout(grace, settled.changed()).await {
        let query = settled.borrow_and_update().clone();
        print_search_result(store, &query)?;
    }

    Ok(())
}

fn print_search_result(store: &CurrencyStore, query: &SearchQuery) -> Result<(), ApiError> {
    println!("> {}", query);
    let raw = Some(query.as_str());
    print_list(&currency_commands::get_currencies(store, raw), raw, false)
}

fn print_list(
    response: &CurrenciesResponse,
    query: Option<&str>,
    json: bool,
) -> Result<(), ApiError> {
    if json {
        let rendered = serde_json::to_string_pretty(response)
            .map_err(|e| ApiError::internal(format!("Failed to render response: {}", e)))?;
        println!("{}", rendered);
        return Ok(());
    }

    match currency_commands::list_view(response, query) {
        ListView::Loading => println!("{}", currency_commands::LOADING_MESSAGE),
        ListView::Error { message } => println!("Error: {}", message),
        ListView::Empty { message } => println!("{}", message),
        ListView::Rows { rows } => {
            for row in &rows {
                println!(
                    "{:>2}  {:<28} {}",
                    row.initial.as_deref().unwrap_or(" "),
                    row.name,
                    row.display_code
                );
            }
            println!("{} of {} currencies", rows.len(), response.total_count);
        }
    }

    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=coinshelf=trace` - Show trace for coinshelf crates only
/// - Default: `info,coinshelf=debug,sqlx=warn`
///
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,coinshelf=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli_with_config(dir: &tempfile::TempDir, args: &[&str]) -> Cli {
        let config = dir.path().join("coinshelf.toml");
        std::fs::write(&config, "[search]\ndebounce_ms = 10\n").unwrap();

        let mut argv = vec!["coinshelf", "--config", config.to_str().unwrap()];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    /// Reopens the file and returns what a fresh store hydrates from it.
    async fn persisted_currencies(path: &std::path::Path) -> Vec<coinshelf_core::CurrencyRecord> {
        let db = Database::new(coinshelf_db::DbConfig::new(path)).await.unwrap();
        let store =
            CurrencyStore::new(Arc::new(db.key_values()), state::StoreOptions::default()).unwrap();
        store.hydrate().await.unwrap();
        let currencies = store.snapshot().currencies.to_vec();
        db.close().await;
        currencies
    }

    #[tokio::test]
    async fn test_insert_then_list_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shelf.db");
        let db = path.to_str().unwrap();

        run(cli_with_config(&dir, &["--db", db, "insert", "fiat"]))
            .await
            .unwrap();
        assert_eq!(
            persisted_currencies(&path).await,
            coinshelf_core::reference::fiat_list()
        );

        run(cli_with_config(&dir, &["--db", db, "list", "--query", "dollar"]))
            .await
            .unwrap();
        assert_eq!(
            persisted_currencies(&path).await.len(),
            coinshelf_core::reference::fiat_list().len()
        );

        run(cli_with_config(&dir, &["--db", db, "clear"])).await.unwrap();
        assert!(persisted_currencies(&path).await.is_empty());
    }

    #[tokio::test]
    async fn test_memory_run() {
        let dir = tempfile::tempdir().unwrap();
        run(cli_with_config(&dir, &["--memory", "insert", "both"]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_invalid_config_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("bad.toml");
        std::fs::write(&config, "[search]\ndebounce_ms = 999999\n").unwrap();

        let cli = Cli::parse_from(["coinshelf", "--config", config.to_str().unwrap(), "list"]);
        let err = run(cli).await.unwrap_err();
        assert_eq!(err.code, error::ErrorCode::ConfigError);
    }

    #[tokio::test]
    async fn test_print_list_views() {
        let store = CurrencyStore::new(Arc::new(MemoryStorage::new()), Default::default()).unwrap();
        let loading = currency_commands::get_currencies(&store, None);
        assert!(print_list(&loading, None, true).is_ok());

        store.hydrate().await.unwrap();
        currency_commands::insert_crypto_data(&store);
        let rows = currency_commands::get_currencies(&store, Some("eth"));
        assert!(print_list(&rows, Some("eth"), false).is_ok());
    }
}
