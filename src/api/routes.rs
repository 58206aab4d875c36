//! API Routes
//!
//! REST endpoints mirroring the store's operations:
//! - POST /api/auth - authenticate, auto-provisioning unseen usernames
//! - POST /api/createUser - explicit account creation
//! - GET /api/info - composed balance/inventory/history view
//! - POST /api/sendCoin - peer-to-peer coin transfer
//! - GET /api/buy/:item - buy one unit of a catalog item
//! - GET /api/health - health check

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

use super::middleware::{bearer_token, ApiError};
use super::server::SharedAppState;
use crate::types::requests::{
    AuthRequest, InfoResponse, MessageResponse, SendCoinRequest, TokenResponse,
};

/// Create the API router
pub fn create_router(state: SharedAppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/auth", post(handle_auth))
        .route("/api/createUser", post(handle_create_user))
        .route("/api/info", get(handle_info))
        .route("/api/sendCoin", post(handle_send_coin))
        .route("/api/buy/:item", get(handle_buy))
        .route("/api/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Resolve the requesting account id from the Authorization header.
fn authenticated_user(state: &SharedAppState, headers: &HeaderMap) -> Result<String, ApiError> {
    let token = bearer_token(headers)?;
    Ok(state.users.decode_token(token)?)
}

/// POST /api/auth
async fn handle_auth(
    State(state): State<SharedAppState>,
    Json(req): Json<AuthRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.users.authenticate(&req.username, &req.password).await?;
    Ok(Json(TokenResponse { token }))
}

/// POST /api/createUser
async fn handle_create_user(
    State(state): State<SharedAppState>,
    Json(req): Json<AuthRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state.users.create_account(&req.username, &req.password).await?;
    Ok(Json(TokenResponse { token }))
}

/// GET /api/info
async fn handle_info(
    State(state): State<SharedAppState>,
    headers: HeaderMap,
) -> Result<Json<InfoResponse>, ApiError> {
    let user_id = authenticated_user(&state, &headers)?;

    let info = state
        .users
        .get_info(&user_id, &state.purchases, &state.ledger)
        .await?;

    Ok(Json(info))
}

/// POST /api/sendCoin
async fn handle_send_coin(
    State(state): State<SharedAppState>,
    headers: HeaderMap,
    Json(req): Json<SendCoinRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let sender_id = authenticated_user(&state, &headers)?;

    state
        .ledger
        .send_coins(&sender_id, &req.to_user, req.amount)
        .await?;

    Ok(Json(MessageResponse {
        message: "Coin transfer successful".to_string(),
    }))
}

/// GET /api/buy/:item
async fn handle_buy(
    State(state): State<SharedAppState>,
    headers: HeaderMap,
    Path(item): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = authenticated_user(&state, &headers)?;

    state.purchases.buy(&user_id, &item).await?;

    Ok(Json(MessageResponse {
        message: "Purchase successful".to_string(),
    }))
}

/// GET /api/health
async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "merchstore-api",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::server::AppState;
    use crate::config::StoreConfig;
    use crate::storage::traits::CoinStore;
    use crate::storage::SqliteCoinStore;
    use crate::types::CatalogItem;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_config() -> StoreConfig {
        StoreConfig {
            port: 0,
            db_path: ":memory:".to_string(),
            jwt_secret: "test-secret".to_string(),
            token_ttl_minutes: 60,
            cache_ttl_minutes: 10,
            starting_balance: 1000,
            log_level: "info".to_string(),
            log_json: false,
        }
    }

    async fn test_router() -> Router {
        let store = Arc::new(SqliteCoinStore::in_memory().unwrap());
        store
            .upsert_item(&CatalogItem::new("cup", 20, "store cup"))
            .await
            .unwrap();

        create_router(AppState::new(store, &test_config()))
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn authenticate(router: &Router, username: &str) -> String {
        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth",
                serde_json::json!({ "username": username, "password": "pw" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        body_json(response).await["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_auth_provisions_and_returns_token() {
        let router = test_router().await;

        let token = authenticate(&router, "alice").await;

        assert!(!token.is_empty());
    }

    #[tokio::test]
    async fn test_info_requires_bearer_token() {
        let router = test_router().await;

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/api/info").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_transfer_and_info_flow() {
        let router = test_router().await;

        let alice_token = authenticate(&router, "alice").await;
        authenticate(&router, "bob").await;

        let mut request = json_request(
            "POST",
            "/api/sendCoin",
            serde_json::json!({ "toUser": "bob", "amount": 300 }),
        );
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {}", alice_token).parse().unwrap(),
        );
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let info_request = Request::builder()
            .uri("/api/info")
            .header(header::AUTHORIZATION, format!("Bearer {}", alice_token))
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(info_request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let info = body_json(response).await;
        assert_eq!(info["coins"], 700);
        assert_eq!(info["coinHistory"]["sent"][0]["amount"], 300);
    }

    #[tokio::test]
    async fn test_buy_updates_inventory() {
        let router = test_router().await;

        let token = authenticate(&router, "alice").await;

        let buy_request = Request::builder()
            .uri("/api/buy/cup")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(buy_request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let info_request = Request::builder()
            .uri("/api/info")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let info = body_json(router.clone().oneshot(info_request).await.unwrap()).await;

        assert_eq!(info["coins"], 980);
        assert_eq!(info["inventory"][0]["name"], "cup");
        assert_eq!(info["inventory"][0]["quantity"], 1);
    }

    #[tokio::test]
    async fn test_buy_unknown_item_is_404() {
        let router = test_router().await;
        let token = authenticate(&router, "alice").await;

        let request = Request::builder()
            .uri("/api/buy/jetpack")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["code"], "NOT_FOUND");
    }
}
