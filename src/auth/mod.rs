//! Authentication Building Blocks
//!
//! Credential hashing and verification, session token issue/decode, and the
//! in-process token cache that short-circuits repeated authentication.

pub mod cache;
pub mod credentials;
pub mod tokens;

pub use cache::{credential_key, TokenCache};
pub use tokens::{TokenError, TokenIssuer};
