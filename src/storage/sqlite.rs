//! SQLite Persistent Storage
//!
//! Durable storage for accounts, ledger, catalog and holdings, pooled via
//! r2d2 for concurrent access. Transfer and purchase run as IMMEDIATE
//! transactions: the conditional debit (`balance >= amount` checked by the
//! same UPDATE that decrements) makes the sufficiency check part of the
//! mutation itself, and rusqlite rolls the transaction back on drop, so no
//! error path can leave a partial unit behind.

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

use super::traits::{CoinStore, StorageError, StorageResult};
use crate::types::{unix_now, Account, CatalogItem, Holding, LedgerEntry, MovementType};

/// SQLite-backed store with connection pooling
pub struct SqliteCoinStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteCoinStore {
    /// Create a new store with the given database path.
    ///
    /// Creates the database file and runs migrations if needed.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StorageError> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
            conn.busy_timeout(Duration::from_secs(5))?;
            conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        });
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations()?;

        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> Result<Self, StorageError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations()?;

        Ok(store)
    }

    /// Get a connection from the pool
    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, StorageError> {
        self.pool
            .get()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<(), StorageError> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                balance INTEGER NOT NULL DEFAULT 0 CHECK (balance >= 0),
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS ledger (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                movement_type TEXT NOT NULL,
                amount INTEGER NOT NULL,
                counterparty_id TEXT,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS catalog (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                price INTEGER NOT NULL,
                description TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS holdings (
                user_id TEXT NOT NULL,
                item_id TEXT NOT NULL,
                quantity INTEGER NOT NULL DEFAULT 0,
                acquired_at INTEGER NOT NULL,
                PRIMARY KEY (user_id, item_id)
            );

            CREATE INDEX IF NOT EXISTS idx_ledger_user_created
                ON ledger(user_id, created_at DESC);
            CREATE INDEX IF NOT EXISTS idx_holdings_user ON holdings(user_id);
            "#,
        )
        .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }

    /// Convert a database row to a ledger entry
    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<LedgerEntry> {
        let movement: String = row.get(2)?;

        Ok(LedgerEntry {
            id: row.get(0)?,
            user_id: row.get(1)?,
            movement_type: movement.parse().unwrap_or(MovementType::TransferIn),
            amount: row.get(3)?,
            counterparty_id: row.get(4)?,
            counterparty_name: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

/// Map a SQLite failure to a `Duplicate` for uniqueness violations.
fn map_insert_err(e: rusqlite::Error, key: &str) -> StorageError {
    if let rusqlite::Error::SqliteFailure(ref err, _) = e {
        // 1555 = SQLITE_CONSTRAINT_PRIMARYKEY, 2067 = SQLITE_CONSTRAINT_UNIQUE
        if err.extended_code == 1555 || err.extended_code == 2067 {
            return StorageError::Duplicate(key.to_string());
        }
    }
    StorageError::Database(e.to_string())
}

fn db_err(e: rusqlite::Error) -> StorageError {
    StorageError::Database(e.to_string())
}

#[async_trait]
impl CoinStore for SqliteCoinStore {
    async fn create_account(&self, account: &Account) -> StorageResult<()> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO accounts (id, username, password_hash, balance, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                account.id,
                account.username,
                account.password_hash,
                account.balance,
                account.created_at,
            ],
        )
        .map_err(|e| map_insert_err(e, &account.username))?;

        Ok(())
    }

    async fn get_credentials(&self, username: &str) -> StorageResult<Option<(String, String)>> {
        let conn = self.conn()?;

        conn.query_row(
            "SELECT id, password_hash FROM accounts WHERE username = ?1",
            params![username],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(db_err)
    }

    async fn get_balance(&self, user_id: &str) -> StorageResult<i64> {
        let conn = self.conn()?;

        conn.query_row(
            "SELECT balance FROM accounts WHERE id = ?1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(db_err)?
        .ok_or_else(|| StorageError::NotFound(user_id.to_string()))
    }

    async fn transfer_coins(
        &self,
        sender_id: &str,
        recipient_id: &str,
        amount: i64,
    ) -> StorageResult<()> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(db_err)?;

        // The debit only happens when the balance covers it at mutation time.
        let debited = tx
            .execute(
                "UPDATE accounts SET balance = balance - ?1 WHERE id = ?2 AND balance >= ?1",
                params![amount, sender_id],
            )
            .map_err(db_err)?;
        if debited == 0 {
            let available = tx
                .query_row(
                    "SELECT balance FROM accounts WHERE id = ?1",
                    params![sender_id],
                    |row| row.get::<_, i64>(0),
                )
                .optional()
                .map_err(db_err)?
                .ok_or_else(|| StorageError::NotFound(sender_id.to_string()))?;
            return Err(StorageError::InsufficientBalance {
                available,
                required: amount,
            });
        }

        let credited = tx
            .execute(
                "UPDATE accounts SET balance = balance + ?1 WHERE id = ?2",
                params![amount, recipient_id],
            )
            .map_err(db_err)?;
        if credited == 0 {
            return Err(StorageError::NotFound(recipient_id.to_string()));
        }

        let now = unix_now();
        tx.execute(
            r#"
            INSERT INTO ledger (user_id, movement_type, amount, counterparty_id, created_at)
            VALUES (?1, 'transfer_out', ?2, ?3, ?4)
            "#,
            params![sender_id, amount, recipient_id, now],
        )
        .map_err(db_err)?;
        tx.execute(
            r#"
            INSERT INTO ledger (user_id, movement_type, amount, counterparty_id, created_at)
            VALUES (?1, 'transfer_in', ?2, ?3, ?4)
            "#,
            params![recipient_id, amount, sender_id, now],
        )
        .map_err(db_err)?;

        tx.commit().map_err(db_err)
    }

    async fn purchase_item(&self, user_id: &str, item_id: &str, price: i64) -> StorageResult<()> {
        let mut conn = self.conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(db_err)?;

        let debited = tx
            .execute(
                "UPDATE accounts SET balance = balance - ?1 WHERE id = ?2 AND balance >= ?1",
                params![price, user_id],
            )
            .map_err(db_err)?;
        if debited == 0 {
            let available = tx
                .query_row(
                    "SELECT balance FROM accounts WHERE id = ?1",
                    params![user_id],
                    |row| row.get::<_, i64>(0),
                )
                .optional()
                .map_err(db_err)?
                .ok_or_else(|| StorageError::NotFound(user_id.to_string()))?;
            return Err(StorageError::InsufficientBalance {
                available,
                required: price,
            });
        }

        let now = unix_now();
        // Quantity accumulates; the conflict target keeps one row per pair.
        tx.execute(
            r#"
            INSERT INTO holdings (user_id, item_id, quantity, acquired_at)
            VALUES (?1, ?2, 1, ?3)
            ON CONFLICT(user_id, item_id)
            DO UPDATE SET quantity = quantity + 1, acquired_at = excluded.acquired_at
            "#,
            params![user_id, item_id, now],
        )
        .map_err(db_err)?;

        tx.execute(
            r#"
            INSERT INTO ledger (user_id, movement_type, amount, counterparty_id, created_at)
            VALUES (?1, 'purchase', ?2, ?3, ?4)
            "#,
            params![user_id, price, item_id, now],
        )
        .map_err(db_err)?;

        tx.commit().map_err(db_err)
    }

    async fn get_transfer_history(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> StorageResult<Vec<LedgerEntry>> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(
                r#"
                SELECT l.id, l.user_id, l.movement_type, l.amount,
                       l.counterparty_id, a.username, l.created_at
                FROM ledger l
                LEFT JOIN accounts a ON a.id = l.counterparty_id
                WHERE l.user_id = ?1
                  AND l.movement_type IN ('transfer_in', 'transfer_out')
                ORDER BY l.created_at DESC, l.id DESC
                LIMIT ?2 OFFSET ?3
                "#,
            )
            .map_err(db_err)?;

        let entries = stmt
            .query_map(params![user_id, limit, offset], |row| {
                Self::row_to_entry(row)
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;

        Ok(entries)
    }

    async fn get_holdings(&self, user_id: &str) -> StorageResult<Vec<Holding>> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(
                r#"
                SELECT h.item_id, c.name, c.price, h.quantity, h.acquired_at
                FROM holdings h
                JOIN catalog c ON c.id = h.item_id
                WHERE h.user_id = ?1
                ORDER BY h.acquired_at DESC
                "#,
            )
            .map_err(db_err)?;

        let holdings = stmt
            .query_map(params![user_id], |row| {
                Ok(Holding {
                    item_id: row.get(0)?,
                    name: row.get(1)?,
                    price: row.get(2)?,
                    quantity: row.get(3)?,
                    acquired_at: row.get(4)?,
                })
            })
            .map_err(db_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err)?;

        Ok(holdings)
    }

    async fn get_item_by_name(&self, name: &str) -> StorageResult<Option<CatalogItem>> {
        let conn = self.conn()?;

        conn.query_row(
            "SELECT id, name, price, description FROM catalog WHERE name = ?1",
            params![name],
            |row| {
                Ok(CatalogItem {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    price: row.get(2)?,
                    description: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(db_err)
    }

    async fn upsert_item(&self, item: &CatalogItem) -> StorageResult<()> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO catalog (id, name, price, description)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(name)
            DO UPDATE SET price = excluded.price, description = excluded.description
            "#,
            params![item.id, item.name, item.price, item.description],
        )
        .map_err(|e| map_insert_err(e, &item.name))?;

        Ok(())
    }
}
