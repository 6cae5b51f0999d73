//! HTTP gateway to the finance backend
//!
//! [`HttpGateway`] implements [`Gateway`] over the backend's REST API:
//! - `/auth/*`: login, registration and the current user
//! - `/users/{id}`: profile updates and the balance summary
//! - `/transactions/` and `/transaction-types/`: list and CRUD

pub mod error;
pub mod session;

use async_trait::async_trait;
use moneta_config::{ApiConfig, Config};
use moneta_core::{
    AccessToken, BalanceSummary, Gateway, GatewayError, GatewayResult, Transaction, TransactionData,
    TransactionType, TransactionTypeData, User, UserUpdate,
};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

pub use error::{ClientError, ClientResult};
pub use session::TokenStore;

/// reqwest-backed gateway
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    list_limit: u32,
    tokens: TokenStore,
}

impl HttpGateway {
    pub fn new(api: &ApiConfig, tokens: TokenStore) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .map_err(|e| ClientError::Build { message: e.to_string() })?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            list_limit: api.list_limit,
            tokens,
        })
    }

    /// Gateway for `config`, persisting the token when a token file is set
    pub fn from_config(config: &Config) -> ClientResult<Self> {
        let tokens = match config.session.token_file {
            Some(ref path) => TokenStore::persistent(path.clone())?,
            None => TokenStore::in_memory(),
        };
        Self::new(&config.api, tokens)
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn list_path(&self, resource: &str) -> String {
        format!("/{}/?skip=0&limit={}", resource, self.list_limit)
    }

    fn drop_token(&self) {
        if let Err(e) = self.tokens.clear() {
            log::warn!("Could not remove stored token: {}", e);
        }
    }

    /// Send a request and return the parsed body; `None` for 204.
    ///
    /// With `auth`, the stored token is attached and a 401 drops it.
    async fn request(&self, method: Method, path: &str, body: Option<Value>, auth: bool) -> GatewayResult<Option<Value>> {
        let mut request = self.client.request(method.clone(), self.url(path));
        if auth {
            if let Some(token) = self.tokens.get() {
                request = request.bearer_auth(token);
            }
        }
        if let Some(ref body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            log::error!(target: "moneta::api", "{} {} failed: {}", method, path, e);
            GatewayError::network(e.to_string())
        })?;
        let status = response.status();
        log::debug!(target: "moneta::api", "{} {} -> {}", method, path, status.as_u16());

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let text = response.text().await.map_err(|e| GatewayError::network(e.to_string()))?;
        let data = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::Null)
        };

        if !status.is_success() {
            let error = GatewayError::from_body(status.as_u16(), data);
            if auth && status == StatusCode::UNAUTHORIZED {
                log::warn!(target: "moneta::api", "Token rejected on {} {}; clearing session", method, path);
                self.drop_token();
            } else {
                log::error!(target: "moneta::api", "{} {} -> {}: {}", method, path, status.as_u16(), error.message);
            }
            return Err(error);
        }

        Ok(Some(data))
    }

    async fn call<T: DeserializeOwned>(&self, method: Method, path: &str, body: Option<Value>, auth: bool) -> GatewayResult<T> {
        let data = self.request(method, path, body, auth).await?.unwrap_or(Value::Null);
        serde_json::from_value(data)
            .map_err(|e| GatewayError::http(200, format!("Invalid response from {}: {}", path, e), Value::Null))
    }

    async fn call_no_content(&self, method: Method, path: &str) -> GatewayResult<()> {
        self.request(method, path, None, true).await.map(|_| ())
    }
}

fn encode<T: Serialize>(data: &T) -> GatewayResult<Value> {
    serde_json::to_value(data).map_err(|e| GatewayError::http(400, format!("Could not encode request: {}", e), Value::Null))
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn login(&self, email: &str, password: &str) -> GatewayResult<AccessToken> {
        let body = json!({ "email": email, "password": password });
        let token: AccessToken = self.call(Method::POST, "/auth/login", Some(body), false).await?;
        if let Err(e) = self.tokens.set(token.access_token.clone()) {
            log::warn!("Token kept in memory only: {}", e);
        }
        Ok(token)
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> GatewayResult<User> {
        let body = json!({ "name": name, "email": email, "password": password });
        self.call(Method::POST, "/auth/register", Some(body), false).await
    }

    async fn current_user(&self) -> GatewayResult<User> {
        self.call(Method::GET, "/auth/me", None, true).await
    }

    async fn update_user(&self, id: i64, data: &UserUpdate) -> GatewayResult<User> {
        self.call(Method::PUT, &format!("/users/{}", id), Some(encode(data)?), true)
            .await
    }

    fn logout(&self) {
        self.drop_token();
    }

    fn is_authenticated(&self) -> bool {
        self.tokens.is_set()
    }

    async fn list_transactions(&self) -> GatewayResult<Vec<Transaction>> {
        self.call(Method::GET, &self.list_path("transactions"), None, true).await
    }

    async fn get_transaction(&self, id: i64) -> GatewayResult<Transaction> {
        self.call(Method::GET, &format!("/transactions/{}", id), None, true).await
    }

    async fn create_transaction(&self, data: &TransactionData) -> GatewayResult<Transaction> {
        self.call(Method::POST, "/transactions/", Some(encode(data)?), true).await
    }

    async fn update_transaction(&self, id: i64, data: &TransactionData) -> GatewayResult<Transaction> {
        self.call(Method::PUT, &format!("/transactions/{}", id), Some(encode(data)?), true)
            .await
    }

    async fn delete_transaction(&self, id: i64) -> GatewayResult<()> {
        self.call_no_content(Method::DELETE, &format!("/transactions/{}", id)).await
    }

    async fn list_transaction_types(&self) -> GatewayResult<Vec<TransactionType>> {
        self.call(Method::GET, &self.list_path("transaction-types"), None, true).await
    }

    async fn get_transaction_type(&self, id: i64) -> GatewayResult<TransactionType> {
        self.call(Method::GET, &format!("/transaction-types/{}", id), None, true).await
    }

    async fn create_transaction_type(&self, data: &TransactionTypeData) -> GatewayResult<TransactionType> {
        self.call(Method::POST, "/transaction-types/", Some(encode(data)?), true).await
    }

    async fn update_transaction_type(&self, id: i64, data: &TransactionTypeData) -> GatewayResult<TransactionType> {
        self.call(Method::PUT, &format!("/transaction-types/{}", id), Some(encode(data)?), true)
            .await
    }

    async fn delete_transaction_type(&self, id: i64) -> GatewayResult<()> {
        self.call_no_content(Method::DELETE, &format!("/transaction-types/{}", id)).await
    }

    async fn get_balance(&self, user_id: i64) -> GatewayResult<BalanceSummary> {
        self.call(Method::GET, &format!("/users/{}/balance", user_id), None, true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::{delete, get, post};
    use axum::{Json, Router};
    use moneta_core::Category;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    const TOKEN: &str = "abc123";

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map_or(false, |v| v == format!("Bearer {}", TOKEN))
    }

    fn unauthorized() -> (AxumStatus, Json<Value>) {
        (AxumStatus::UNAUTHORIZED, Json(json!({ "detail": "Could not validate credentials" })))
    }

    async fn login(Json(body): Json<Value>) -> (AxumStatus, Json<Value>) {
        if body["email"] == "ana@example.com" && body["password"] == "secret1" {
            (AxumStatus::OK, Json(json!({ "access_token": TOKEN, "token_type": "bearer" })))
        } else {
            (AxumStatus::UNAUTHORIZED, Json(json!({ "detail": "Incorrect email or password" })))
        }
    }

    async fn me(headers: HeaderMap) -> (AxumStatus, Json<Value>) {
        if !authorized(&headers) {
            return unauthorized();
        }
        (AxumStatus::OK, Json(json!({ "id": 1, "name": "Ana", "email": "ana@example.com" })))
    }

    async fn transactions(headers: HeaderMap, Query(query): Query<HashMap<String, String>>) -> (AxumStatus, Json<Value>) {
        if !authorized(&headers) {
            return unauthorized();
        }
        if query.get("skip").map(String::as_str) != Some("0") || query.get("limit").map(String::as_str) != Some("50") {
            return (AxumStatus::BAD_REQUEST, Json(json!({ "detail": "unexpected paging" })));
        }
        (
            AxumStatus::OK,
            Json(json!([{
                "id": 10,
                "user_id": 1,
                "transaction_type_id": 3,
                "transaction_type_name": "Salary",
                "transaction_type_type": "INCOME",
                "value": "2500.00",
                "created_at": "2024-06-15T10:30:00"
            }])),
        )
    }

    async fn create_type(headers: HeaderMap, Json(body): Json<Value>) -> (AxumStatus, Json<Value>) {
        if !authorized(&headers) {
            return unauthorized();
        }
        let name = body["name"].clone();
        let category = body["type"].clone();
        (AxumStatus::OK, Json(json!({ "id": 7, "name": name, "type": category })))
    }

    async fn delete_type(headers: HeaderMap, Path(id): Path<i64>) -> axum::response::Response {
        use axum::response::IntoResponse;
        if !authorized(&headers) {
            return unauthorized().into_response();
        }
        if id == 1 {
            (
                AxumStatus::CONFLICT,
                Json(json!({ "detail": "Cannot delete transaction type with associated transactions" })),
            )
                .into_response()
        } else {
            AxumStatus::NO_CONTENT.into_response()
        }
    }

    async fn balance() -> (AxumStatus, &'static str) {
        (AxumStatus::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }

    async fn spawn_backend() -> ApiConfig {
        let router = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/me", get(me))
            .route("/transactions/", get(transactions))
            .route("/transaction-types/", post(create_type))
            .route("/transaction-types/:id", delete(delete_type))
            .route("/users/:id/balance", get(balance));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        ApiConfig {
            base_url: format!("http://{}/", addr),
            timeout_secs: 5,
            list_limit: 50,
        }
    }

    async fn logged_in() -> HttpGateway {
        let gateway = HttpGateway::new(&spawn_backend().await, TokenStore::in_memory()).unwrap();
        gateway.login("ana@example.com", "secret1").await.unwrap();
        gateway
    }

    #[tokio::test]
    async fn test_login_stores_token() {
        let gateway = logged_in().await;
        assert!(gateway.is_authenticated());
        assert_eq!(gateway.tokens().get().as_deref(), Some(TOKEN));

        let user = gateway.current_user().await.unwrap();
        assert_eq!(user.email, "ana@example.com");
    }

    #[tokio::test]
    async fn test_bad_login_keeps_detail() {
        let gateway = HttpGateway::new(&spawn_backend().await, TokenStore::in_memory()).unwrap();
        let err = gateway.login("ana@example.com", "nope").await.unwrap_err();

        assert_eq!(err.status, Some(401));
        assert_eq!(err.message, "Incorrect email or password");
        assert!(!gateway.is_authenticated());
    }

    #[tokio::test]
    async fn test_rejected_token_is_cleared() {
        let tokens = TokenStore::in_memory();
        tokens.set("stale".to_string()).unwrap();
        let gateway = HttpGateway::new(&spawn_backend().await, tokens).unwrap();

        let err = gateway.current_user().await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(!gateway.is_authenticated());
    }

    #[tokio::test]
    async fn test_list_transactions_sends_paging() {
        let gateway = logged_in().await;
        let list = gateway.list_transactions().await.unwrap();

        assert_eq!(list.len(), 1);
        assert_eq!(list[0].value, dec!(2500));
        assert_eq!(list[0].transaction_type_type, Category::Income);
    }

    #[tokio::test]
    async fn test_create_type_round_trips_category() {
        let gateway = logged_in().await;
        let data = TransactionTypeData {
            name: "Groceries".to_string(),
            category: Category::Expense,
        };
        let created = gateway.create_transaction_type(&data).await.unwrap();

        assert_eq!(created.id, 7);
        assert_eq!(created.category, Category::Expense);
    }

    #[tokio::test]
    async fn test_delete_type_conflict_and_no_content() {
        let gateway = logged_in().await;

        let err = gateway.delete_transaction_type(1).await.unwrap_err();
        assert_eq!(err.status, Some(409));
        assert_eq!(err.message, "Cannot delete transaction type with associated transactions");
        assert!(gateway.is_authenticated());

        gateway.delete_transaction_type(2).await.unwrap();
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let gateway = logged_in().await;
        let err = gateway.get_balance(1).await.unwrap_err();

        assert_eq!(err.status, Some(500));
        assert_eq!(err.message, "HTTP error! status: 500");
        assert!(err.data.is_null());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let api = ApiConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 2,
            list_limit: 10,
        };
        let gateway = HttpGateway::new(&api, TokenStore::in_memory()).unwrap();
        let err = gateway.login("ana@example.com", "secret1").await.unwrap_err();
        assert!(err.status.is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_persisted_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token");
        let tokens = TokenStore::persistent(path.clone()).unwrap();
        let gateway = HttpGateway::new(&spawn_backend().await, tokens).unwrap();

        gateway.login("ana@example.com", "secret1").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), TOKEN);

        gateway.logout();
        assert!(!path.exists());
        assert!(!gateway.is_authenticated());
    }
}
