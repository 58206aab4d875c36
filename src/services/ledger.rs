//! Transfer Engine and Ledger Query
//!
//! Orchestrates peer-to-peer coin transfers as one atomic unit and exposes
//! the split sent/received history view. The balance-sufficiency check lives
//! inside the storage unit, not here: a read-then-write gap would let two
//! concurrent transfers pass against a stale balance.

use std::sync::Arc;

use super::{ServiceError, ServiceResult};
use crate::storage::CoinStore;
use crate::types::{LedgerEntry, MovementType};

/// Default cap on history entries returned per page
pub const HISTORY_PAGE_SIZE: u32 = 100;

/// Peer-to-peer transfer engine
pub struct LedgerService {
    store: Arc<dyn CoinStore>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn CoinStore>) -> Self {
        Self { store }
    }

    /// Transfer `amount` coins from `sender_id` to the account owning
    /// `recipient_username`.
    ///
    /// Either all of {debit, credit, both ledger entries} happen, or none
    /// do. The two entries carry symmetric counterparty references.
    pub async fn send_coins(
        &self,
        sender_id: &str,
        recipient_username: &str,
        amount: i64,
    ) -> ServiceResult<()> {
        if amount <= 0 {
            return Err(ServiceError::AmountInvalid(amount));
        }

        let (recipient_id, _) = self
            .store
            .get_credentials(recipient_username)
            .await?
            .ok_or_else(|| ServiceError::RecipientNotFound(recipient_username.to_string()))?;

        self.store
            .transfer_coins(sender_id, &recipient_id, amount)
            .await?;

        tracing::info!(
            target: "merchstore::ledger",
            sender = %sender_id,
            recipient = %recipient_id,
            amount,
            "coin transfer committed"
        );

        Ok(())
    }

    /// Split a user's peer-transfer history into `(received, sent)`, most
    /// recent first. Purchase entries belong to spend history and never
    /// appear here.
    pub async fn history(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> ServiceResult<(Vec<LedgerEntry>, Vec<LedgerEntry>)> {
        let entries = self
            .store
            .get_transfer_history(user_id, limit, offset)
            .await?;

        let mut received = Vec::new();
        let mut sent = Vec::new();
        for entry in entries {
            match entry.movement_type {
                MovementType::TransferIn => received.push(entry),
                MovementType::TransferOut => sent.push(entry),
                MovementType::Purchase => {}
            }
        }

        Ok((received, sent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteCoinStore;
    use crate::types::Account;

    async fn setup() -> (Arc<SqliteCoinStore>, LedgerService, Account, Account) {
        let store = Arc::new(SqliteCoinStore::in_memory().unwrap());
        let service = LedgerService::new(store.clone());

        let alice = Account::new("alice".to_string(), "hash".to_string(), 1000);
        let bob = Account::new("bob".to_string(), "hash".to_string(), 1000);
        store.create_account(&alice).await.unwrap();
        store.create_account(&bob).await.unwrap();

        (store, service, alice, bob)
    }

    #[tokio::test]
    async fn test_non_positive_amount_rejected_before_storage() {
        let (_store, service, alice, _bob) = setup().await;

        for amount in [0, -5] {
            let result = service.send_coins(&alice.id, "bob", amount).await;
            assert!(matches!(result, Err(ServiceError::AmountInvalid(_))));
        }
    }

    #[tokio::test]
    async fn test_unknown_recipient() {
        let (_store, service, alice, _bob) = setup().await;

        let result = service.send_coins(&alice.id, "ghost", 100).await;

        assert!(matches!(result, Err(ServiceError::RecipientNotFound(_))));
    }

    #[tokio::test]
    async fn test_transfer_then_overdraw_attempt() {
        let (store, service, alice, bob) = setup().await;

        service.send_coins(&alice.id, "bob", 300).await.unwrap();
        assert_eq!(store.get_balance(&alice.id).await.unwrap(), 700);
        assert_eq!(store.get_balance(&bob.id).await.unwrap(), 1300);

        let result = service.send_coins(&alice.id, "bob", 800).await;
        match result {
            Err(ServiceError::InsufficientBalance {
                available,
                required,
            }) => {
                assert_eq!(available, 700);
                assert_eq!(required, 800);
            }
            other => panic!("expected InsufficientBalance, got {:?}", other),
        }

        // Balances unchanged by the failed attempt.
        assert_eq!(store.get_balance(&alice.id).await.unwrap(), 700);
        assert_eq!(store.get_balance(&bob.id).await.unwrap(), 1300);
    }

    #[tokio::test]
    async fn test_history_partition_and_counterparty_naming() {
        let (_store, service, alice, bob) = setup().await;

        service.send_coins(&alice.id, "bob", 100).await.unwrap();
        service.send_coins(&bob.id, "alice", 40).await.unwrap();

        let (received, sent) = service.history(&alice.id, HISTORY_PAGE_SIZE, 0).await.unwrap();

        assert_eq!(received.len(), 1);
        assert_eq!(received[0].amount, 40);
        assert_eq!(received[0].counterparty_name.as_deref(), Some("bob"));

        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].amount, 100);
        assert_eq!(sent[0].counterparty_name.as_deref(), Some("bob"));

        let (bob_received, bob_sent) = service.history(&bob.id, HISTORY_PAGE_SIZE, 0).await.unwrap();
        assert_eq!(bob_received[0].counterparty_name.as_deref(), Some("alice"));
        assert_eq!(bob_sent[0].counterparty_name.as_deref(), Some("alice"));
    }
}
