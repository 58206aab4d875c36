//! API Server
//!
//! Application state wiring and server startup.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::TokenIssuer;
use crate::config::StoreConfig;
use crate::services::{LedgerService, PurchasesService, UserService};
use crate::storage::CoinStore;

/// Combined application state for all API endpoints
pub struct AppState {
    /// Authentication and query facade
    pub users: UserService,
    /// Transfer engine
    pub ledger: LedgerService,
    /// Purchase engine
    pub purchases: PurchasesService,
}

/// Shared application state type
pub type SharedAppState = Arc<AppState>;

impl AppState {
    /// Wire the services over one store according to the configuration.
    pub fn new(store: Arc<dyn CoinStore>, config: &StoreConfig) -> SharedAppState {
        let tokens = TokenIssuer::new(&config.jwt_secret, config.token_ttl_minutes);
        let users = UserService::new(
            store.clone(),
            tokens,
            config.starting_balance,
            Duration::from_secs(config.cache_ttl_minutes * 60),
        );
        let ledger = LedgerService::new(store.clone());
        let purchases = PurchasesService::new(store);

        Arc::new(Self {
            users,
            ledger,
            purchases,
        })
    }
}

/// Start the REST API server
pub async fn start_server(state: SharedAppState, port: u16) -> Result<(), std::io::Error> {
    let app = super::routes::create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    println!("=== Merchstore API ===");
    println!("Listening on http://{}", addr);
    println!();
    println!("Endpoints:");
    println!("  POST /api/auth        - Authenticate (auto-provisions new usernames)");
    println!("  POST /api/createUser  - Create an account");
    println!("  GET  /api/info        - Balance, inventory and coin history");
    println!("  POST /api/sendCoin    - Transfer coins to another user");
    println!("  GET  /api/buy/:item   - Buy one unit of a catalog item");
    println!("  GET  /api/health      - Health check");
    println!();

    tracing::info!(target: "merchstore::api", %addr, "REST API listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
