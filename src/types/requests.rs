//! HTTP Request/Response Payloads

use serde::{Deserialize, Serialize};

use super::catalog::Holding;
use super::ledger::LedgerEntry;

/// Credentials for `POST /api/auth` and `POST /api/createUser`
#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

/// Issued session token
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Body of `POST /api/sendCoin`
#[derive(Debug, Deserialize)]
pub struct SendCoinRequest {
    #[serde(rename = "toUser")]
    pub to_user: String,
    pub amount: i64,
}

/// Plain confirmation message
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Split peer-transfer history, most recent first
#[derive(Debug, Serialize, Deserialize)]
pub struct CoinHistory {
    pub received: Vec<LedgerEntry>,
    pub sent: Vec<LedgerEntry>,
}

/// Composed view returned by `GET /api/info`
#[derive(Debug, Serialize, Deserialize)]
pub struct InfoResponse {
    pub coins: i64,
    pub inventory: Vec<Holding>,
    #[serde(rename = "coinHistory")]
    pub coin_history: CoinHistory,
}

/// Error body returned for failed requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}
