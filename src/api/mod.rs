//! API Layer
//!
//! HTTP server, routes and request plumbing. Transport carries no business
//! logic; handlers validate shape, resolve the session and delegate to the
//! domain services.

pub mod middleware;
pub mod routes;
pub mod server;

pub use middleware::ApiError;
pub use routes::create_router;
pub use server::{start_server, AppState, SharedAppState};
