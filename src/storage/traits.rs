//! Storage Trait Definitions
//!
//! Defines the abstract store interface for accounts, ledger entries,
//! catalog items and holdings. The money-moving operations are atomic
//! units: either every write in the unit lands, or none do.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Account, CatalogItem, Holding, LedgerEntry};

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: i64, required: i64 },

    #[error("database error: {0}")]
    Database(String),

    #[error("connection error: {0}")]
    Connection(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistent store of accounts, coins, ledger and catalog.
///
/// Implementations must guarantee check-and-mutate atomicity for
/// `transfer_coins` and `purchase_item`: the balance-sufficiency check is
/// part of the same atomic unit as the debit, so concurrent operations on
/// the same account can never jointly overdraw it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CoinStore: Send + Sync {
    /// Insert a new account. `Duplicate` if the username is taken.
    async fn create_account(&self, account: &Account) -> StorageResult<()>;

    /// Look up `(account id, credential hash)` by username. `Ok(None)` is
    /// the typed "no such account" signal and is distinct from any error.
    async fn get_credentials(&self, username: &str) -> StorageResult<Option<(String, String)>>;

    /// Current balance of an account. `NotFound` if the account is unknown.
    async fn get_balance(&self, user_id: &str) -> StorageResult<i64>;

    /// Atomically debit the sender, credit the recipient and append the two
    /// symmetric ledger entries. Fails with `InsufficientBalance` when the
    /// sender cannot cover `amount` at mutation time, leaving no trace.
    async fn transfer_coins(
        &self,
        sender_id: &str,
        recipient_id: &str,
        amount: i64,
    ) -> StorageResult<()>;

    /// Atomically debit the buyer by `price`, upsert the holding (quantity
    /// accumulates, never duplicate rows) and append one purchase entry.
    async fn purchase_item(&self, user_id: &str, item_id: &str, price: i64) -> StorageResult<()>;

    /// A user's transfer entries (purchases excluded), most recent first,
    /// with counterparty names resolved at read time.
    async fn get_transfer_history(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> StorageResult<Vec<LedgerEntry>>;

    /// A user's holdings joined with catalog name and price, most recently
    /// acquired first.
    async fn get_holdings(&self, user_id: &str) -> StorageResult<Vec<Holding>>;

    /// Resolve a catalog item by its unique name.
    async fn get_item_by_name(&self, name: &str) -> StorageResult<Option<CatalogItem>>;

    /// Insert or refresh a catalog item (used by seeding and tests).
    async fn upsert_item(&self, item: &CatalogItem) -> StorageResult<()>;
}
