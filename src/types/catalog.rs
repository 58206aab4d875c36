//! Catalog and Holding Types
//!
//! Catalog items are read-mostly and owned by catalog administration.
//! Holdings accumulate a user's owned quantity per item; there is at most one
//! holding row per (user, item) pair.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sellable catalog item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Stable item id
    pub id: String,
    /// Unique display name, the purchase lookup key
    pub name: String,
    /// Price in coins, always positive
    pub price: i64,
    /// Free-form description
    pub description: String,
}

impl CatalogItem {
    /// Create a new catalog item with a fresh id.
    pub fn new(name: impl Into<String>, price: i64, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            price,
            description: description.into(),
        }
    }
}

/// A user's accumulated quantity of one catalog item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    /// Item this holding refers to
    pub item_id: String,
    /// Item display name
    pub name: String,
    /// Item price at read time
    pub price: i64,
    /// Owned quantity, accumulated across purchases
    pub quantity: i64,
    /// Timestamp of the most recent acquisition (unix seconds)
    pub acquired_at: i64,
}
