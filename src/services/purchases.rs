//! Purchase Engine
//!
//! Orchestrates catalog purchases as one atomic unit: holding upsert,
//! balance debit and one purchase ledger entry. Quantity is fixed at one
//! per call; repeated calls accumulate the holding.

use std::sync::Arc;

use super::{ServiceError, ServiceResult};
use crate::storage::CoinStore;
use crate::types::Holding;

/// Catalog purchase engine
pub struct PurchasesService {
    store: Arc<dyn CoinStore>,
}

impl PurchasesService {
    pub fn new(store: Arc<dyn CoinStore>) -> Self {
        Self { store }
    }

    /// Buy one unit of the item named `item_name` for `user_id`.
    pub async fn buy(&self, user_id: &str, item_name: &str) -> ServiceResult<()> {
        let item = self
            .store
            .get_item_by_name(item_name)
            .await?
            .ok_or_else(|| ServiceError::ItemNotFound(item_name.to_string()))?;

        self.store
            .purchase_item(user_id, &item.id, item.price)
            .await?;

        tracing::info!(
            target: "merchstore::purchases",
            user = %user_id,
            item = %item.name,
            price = item.price,
            "purchase committed"
        );

        Ok(())
    }

    /// A user's holdings, most recently acquired first.
    pub async fn holdings(&self, user_id: &str) -> ServiceResult<Vec<Holding>> {
        Ok(self.store.get_holdings(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteCoinStore;
    use crate::types::{Account, CatalogItem};

    async fn setup() -> (Arc<SqliteCoinStore>, PurchasesService, Account) {
        let store = Arc::new(SqliteCoinStore::in_memory().unwrap());
        let service = PurchasesService::new(store.clone());

        let user = Account::new("alice".to_string(), "hash".to_string(), 250);
        store.create_account(&user).await.unwrap();

        let item = CatalogItem::new("t-shirt", 100, "store t-shirt");
        store.upsert_item(&item).await.unwrap();

        (store, service, user)
    }

    #[tokio::test]
    async fn test_unknown_item() {
        let (_store, service, user) = setup().await;

        let result = service.buy(&user.id, "jetpack").await;

        assert!(matches!(result, Err(ServiceError::ItemNotFound(_))));
    }

    #[tokio::test]
    async fn test_buying_twice_accumulates_holding() {
        // One unit per call is a deliberate simplification; two calls buy two.
        let (store, service, user) = setup().await;

        service.buy(&user.id, "t-shirt").await.unwrap();
        service.buy(&user.id, "t-shirt").await.unwrap();

        assert_eq!(store.get_balance(&user.id).await.unwrap(), 50);

        let holdings = service.holdings(&user.id).await.unwrap();
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].quantity, 2);
        assert_eq!(holdings[0].price, 100);
    }

    #[tokio::test]
    async fn test_insufficient_balance_blocks_third_purchase() {
        let (store, service, user) = setup().await;

        service.buy(&user.id, "t-shirt").await.unwrap();
        service.buy(&user.id, "t-shirt").await.unwrap();

        let result = service.buy(&user.id, "t-shirt").await;

        assert!(matches!(
            result,
            Err(ServiceError::InsufficientBalance {
                available: 50,
                required: 100
            })
        ));
        assert_eq!(store.get_balance(&user.id).await.unwrap(), 50);
        assert_eq!(service.holdings(&user.id).await.unwrap()[0].quantity, 2);
    }
}
