//! User Service - Authentication and the Query Facade
//!
//! Implements the authentication state machine: presented credentials either
//! match an existing account, provision a new one (only on the typed
//! "no such account" signal), or fail terminally. Also composes the
//! balance/inventory/history view returned by the info endpoint.
//!
//! The token cache in front of re-authentication is owned by this component;
//! its sweep task starts with the service and ends when the service drops.

use std::sync::Arc;
use std::time::Duration;

use super::ledger::{LedgerService, HISTORY_PAGE_SIZE};
use super::purchases::PurchasesService;
use super::{ServiceError, ServiceResult};
use crate::auth::cache::SWEEP_INTERVAL;
use crate::auth::{credential_key, credentials, TokenCache, TokenIssuer};
use crate::logging::log_security_event;
use crate::storage::CoinStore;
use crate::types::requests::{CoinHistory, InfoResponse};
use crate::types::Account;

/// Authentication service and read-side facade
pub struct UserService {
    store: Arc<dyn CoinStore>,
    tokens: TokenIssuer,
    cache: TokenCache,
    starting_balance: i64,
    cache_ttl: Duration,
}

impl UserService {
    pub fn new(
        store: Arc<dyn CoinStore>,
        tokens: TokenIssuer,
        starting_balance: i64,
        cache_ttl: Duration,
    ) -> Self {
        let mut cache = TokenCache::new();
        cache.start_sweeper(SWEEP_INTERVAL);

        Self {
            store,
            tokens,
            cache,
            starting_balance,
            cache_ttl,
        }
    }

    /// Provision a new account with the configured starting balance and
    /// issue its first session token.
    pub async fn create_account(&self, username: &str, password: &str) -> ServiceResult<String> {
        if username.is_empty() || password.is_empty() {
            return Err(ServiceError::Validation(
                "username and password are required".to_string(),
            ));
        }

        let account = Account::new(
            username.to_string(),
            credentials::hash_password(password),
            self.starting_balance,
        );
        self.store.create_account(&account).await?;

        log_security_event(
            "account_provisioned",
            true,
            serde_json::json!({ "username": username }),
        );

        let token = self.tokens.issue(&account.id)?;
        self.cache
            .set(credential_key(username, password), token.clone(), self.cache_ttl)
            .await;

        Ok(token)
    }

    /// Authenticate a credential pair and return a session token.
    ///
    /// A username with no existing account is provisioned and treated as a
    /// successful authentication. That transition fires only on the typed
    /// not-found signal from the credentials lookup; a storage fault
    /// propagates as a persistence failure and never provisions. A wrong
    /// password for an existing account is terminal.
    pub async fn authenticate(&self, username: &str, password: &str) -> ServiceResult<String> {
        if username.is_empty() || password.is_empty() {
            return Err(ServiceError::Validation(
                "username and password are required".to_string(),
            ));
        }

        let key = credential_key(username, password);
        if let Some(token) = self.cache.get(&key).await {
            return Ok(token);
        }

        match self.store.get_credentials(username).await? {
            None => self.create_account(username, password).await,
            Some((user_id, stored_hash)) => {
                if !credentials::verify_password(&stored_hash, password) {
                    log_security_event(
                        "authentication_failed",
                        false,
                        serde_json::json!({ "username": username }),
                    );
                    return Err(ServiceError::Unauthorized);
                }

                let token = self.tokens.issue(&user_id)?;
                self.cache.set(key, token.clone(), self.cache_ttl).await;

                Ok(token)
            }
        }
    }

    /// Decode a session token back to its account id.
    pub fn decode_token(&self, token: &str) -> ServiceResult<String> {
        self.tokens
            .decode(token)
            .map_err(|_| ServiceError::InvalidToken)
    }

    /// Current balance of an account.
    pub async fn balance(&self, user_id: &str) -> ServiceResult<i64> {
        Ok(self.store.get_balance(user_id).await?)
    }

    /// Compose balance, inventory and split transfer history for a user.
    pub async fn get_info(
        &self,
        user_id: &str,
        purchases: &PurchasesService,
        ledger: &LedgerService,
    ) -> ServiceResult<InfoResponse> {
        let coins = self.balance(user_id).await?;
        let inventory = purchases.holdings(user_id).await?;
        let (received, sent) = ledger.history(user_id, HISTORY_PAGE_SIZE, 0).await?;

        Ok(InfoResponse {
            coins,
            inventory,
            coin_history: CoinHistory { received, sent },
        })
    }
}
