//! Domain and API Types
//!
//! Records owned by the ledger subsystem (accounts, ledger entries), the
//! purchase subsystem (catalog items, holdings) and the request/response
//! payloads of the HTTP layer.

pub mod account;
pub mod catalog;
pub mod ledger;
pub mod requests;

pub use account::Account;
pub use catalog::{CatalogItem, Holding};
pub use ledger::{LedgerEntry, MovementType};

/// Current unix timestamp in seconds.
pub fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}
