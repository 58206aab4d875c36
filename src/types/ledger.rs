//! Ledger Types
//!
//! Append-only records of balance-affecting movements. Entries are never
//! mutated or deleted; history queries order them by creation time.

use serde::{Deserialize, Serialize};

/// Kind of balance-affecting movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Coins received from another user
    TransferIn,
    /// Coins sent to another user
    TransferOut,
    /// Coins spent on a catalog item
    Purchase,
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::TransferIn => "transfer_in",
            Self::TransferOut => "transfer_out",
            Self::Purchase => "purchase",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for MovementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transfer_in" => Ok(Self::TransferIn),
            "transfer_out" => Ok(Self::TransferOut),
            "purchase" => Ok(Self::Purchase),
            _ => Err(format!("unknown movement type: {}", s)),
        }
    }
}

/// One immutable movement on a user's balance.
///
/// The counterparty is captured as a stable id at write time (another user's
/// account id for transfers, an item id for purchases); the display name is
/// resolved at read time, so the entry stays identifiable even after renames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Sequence id assigned by the store
    pub id: i64,
    /// Account this entry belongs to
    pub user_id: String,
    /// Movement kind
    pub movement_type: MovementType,
    /// Moved amount, always positive
    pub amount: i64,
    /// Stable id of the other party
    pub counterparty_id: Option<String>,
    /// Display name of the other party, resolved at read time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty_name: Option<String>,
    /// Creation timestamp (unix seconds)
    pub created_at: i64,
}
