//! Account Record
//!
//! The single source of truth for spendable coins. The balance is the only
//! field mutated after signup, and only by the transfer/purchase engines.

use serde::Serialize;
use uuid::Uuid;

use super::unix_now;

/// A user account with its coin balance.
///
/// Invariant: `balance >= 0` at all observable times between transactions.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    /// Opaque stable account id, generated at creation
    pub id: String,
    /// Unique username
    pub username: String,
    /// Stored credential hash, never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Spendable coins (whole coins, never fractional)
    pub balance: i64,
    /// Creation timestamp (unix seconds)
    pub created_at: i64,
}

impl Account {
    /// Create a new account with a fresh id and the given starting balance.
    pub fn new(username: String, password_hash: String, balance: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            password_hash,
            balance,
            created_at: unix_now(),
        }
    }
}
