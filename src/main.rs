//! Merchstore Backend - Employee Rewards Store
//!
//! Run modes:
//!   cargo run -- api             - Start the REST API server
//!   cargo run -- seed            - Seed the catalog with the default items
//!   cargo run                    - Show usage

use std::env;
use std::sync::Arc;

use dotenv::dotenv;

use merchstore::api::{start_server, AppState};
use merchstore::config::StoreConfig;
use merchstore::logging::{init_logging, LogLevel};
use merchstore::storage::{CoinStore, SqliteCoinStore};
use merchstore::types::CatalogItem;

/// Default catalog inserted by the `seed` run mode.
const DEFAULT_CATALOG: &[(&str, i64, &str)] = &[
    ("t-shirt", 80, "Company t-shirt"),
    ("cup", 20, "Branded cup"),
    ("book", 50, "Engineering notebook"),
    ("pen", 10, "Branded pen"),
    ("powerbank", 200, "Pocket powerbank"),
    ("hoody", 300, "Company hoody"),
    ("umbrella", 200, "Branded umbrella"),
    ("socks", 10, "Branded socks"),
    ("wallet", 50, "Branded wallet"),
    ("pink-hoody", 500, "Limited pink hoody"),
];

#[tokio::main]
async fn main() {
    dotenv().ok();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "api" => run_api_server(&args[2..]).await,
        "seed" => run_seed().await,
        "help" | "--help" | "-h" => print_usage(),
        _ => print_usage(),
    }
}

fn print_usage() {
    println!("Merchstore Backend - Employee Rewards Store");
    println!();
    println!("Usage:");
    println!("  merchstore-api api [--port <port>]    Start REST API server (default: 8080)");
    println!("  merchstore-api seed                   Seed the catalog with default items");
    println!();
    println!("Environment Variables:");
    println!("  MERCHSTORE_PORT              REST API port");
    println!("  MERCHSTORE_DB_PATH           SQLite database path");
    println!("  MERCHSTORE_JWT_SECRET        Session token signing secret");
    println!("  MERCHSTORE_JWT_TTL_MIN       Session token lifetime in minutes");
    println!("  MERCHSTORE_CACHE_TTL_MIN     Auth cache entry lifetime in minutes");
    println!("  MERCHSTORE_STARTING_BALANCE  Coins granted at signup");
    println!("  MERCHSTORE_LOG_LEVEL         Logging level (debug, info, warn, error)");
    println!("  MERCHSTORE_LOG_JSON          Set to \"1\" for JSON log output");
}

/// Load configuration, or exit with a message.
fn load_config() -> StoreConfig {
    match StoreConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Open the SQLite store, or exit with a message.
fn open_store(config: &StoreConfig) -> Arc<SqliteCoinStore> {
    match SqliteCoinStore::new(&config.db_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("Failed to open database at {}: {}", config.db_path, e);
            std::process::exit(1);
        }
    }
}

/// Start the REST API server
async fn run_api_server(args: &[String]) {
    let mut config = load_config();

    // Parse arguments
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--port" if i + 1 < args.len() => {
                config.port = args[i + 1].parse().unwrap_or(config.port);
                i += 2;
            }
            _ => i += 1,
        }
    }

    if let Err(e) = init_logging(LogLevel::from(config.log_level.as_str()), config.log_json) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    config.print_summary();

    let store = open_store(&config);
    let state = AppState::new(store, &config);

    if let Err(e) = start_server(state, config.port).await {
        eprintln!("API server error: {}", e);
    }
}

/// Seed the catalog with the default item list
async fn run_seed() {
    let config = load_config();
    let store = open_store(&config);

    println!("Seeding catalog at {}", config.db_path);

    for (name, price, description) in DEFAULT_CATALOG {
        let item = CatalogItem::new(*name, *price, *description);
        match store.upsert_item(&item).await {
            Ok(()) => println!("  {} ({} coins)", name, price),
            Err(e) => {
                eprintln!("Failed to seed '{}': {}", name, e);
                std::process::exit(1);
            }
        }
    }

    println!("Done: {} items", DEFAULT_CATALOG.len());
}
