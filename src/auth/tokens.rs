//! Session Tokens
//!
//! HS256 tokens carrying the account id and an expiry claim. Issue and
//! decode are the only operations the rest of the system needs.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Sign(jsonwebtoken::errors::Error),

    #[error("invalid token")]
    Invalid,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Account id
    sub: String,
    /// Expiry (unix seconds)
    exp: i64,
}

/// Issues and decodes session tokens for account ids.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_minutes: i64,
}

impl TokenIssuer {
    /// Create an issuer from a shared secret and a token lifetime.
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_minutes,
        }
    }

    /// Issue a token for the given account id.
    pub fn issue(&self, user_id: &str) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: chrono::Utc::now().timestamp() + self.ttl_minutes * 60,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding).map_err(TokenError::Sign)
    }

    /// Decode a token back to its account id. Expired or tampered tokens
    /// yield `TokenError::Invalid`.
    pub fn decode(&self, token: &str) -> Result<String, TokenError> {
        let data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
                .map_err(|_| TokenError::Invalid)?;

        Ok(data.claims.sub)
    }
}
