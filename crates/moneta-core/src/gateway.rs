//! Backend access seam
//!
//! The controller only talks to the backend through [`Gateway`]. The HTTP
//! implementation lives in `moneta-client`; [`crate::memory::InMemoryGateway`]
//! is the fake used by tests.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::GatewayResult;
use crate::models::{
    AccessToken, BalanceSummary, Transaction, TransactionData, TransactionType, TransactionTypeData, User,
    UserUpdate,
};

/// Gateway reference type
pub type GatewayRef = Arc<dyn Gateway>;

/// Authenticated calls against the finance backend
///
/// Every non-2xx response is reported as a [`crate::GatewayError`]. A 401
/// on any call other than `login` also drops the stored token.
#[async_trait]
pub trait Gateway: Send + Sync {
    // ---- session ----

    /// Exchange credentials for a token and keep it for later calls
    async fn login(&self, email: &str, password: &str) -> GatewayResult<AccessToken>;

    async fn register(&self, name: &str, email: &str, password: &str) -> GatewayResult<User>;

    /// Profile of the token's owner
    async fn current_user(&self) -> GatewayResult<User>;

    async fn update_user(&self, id: i64, data: &UserUpdate) -> GatewayResult<User>;

    /// Forget the stored token
    fn logout(&self);

    fn is_authenticated(&self) -> bool;

    // ---- transactions ----

    async fn list_transactions(&self) -> GatewayResult<Vec<Transaction>>;

    async fn get_transaction(&self, id: i64) -> GatewayResult<Transaction>;

    async fn create_transaction(&self, data: &TransactionData) -> GatewayResult<Transaction>;

    async fn update_transaction(&self, id: i64, data: &TransactionData) -> GatewayResult<Transaction>;

    async fn delete_transaction(&self, id: i64) -> GatewayResult<()>;

    // ---- transaction types ----

    async fn list_transaction_types(&self) -> GatewayResult<Vec<TransactionType>>;

    async fn get_transaction_type(&self, id: i64) -> GatewayResult<TransactionType>;

    async fn create_transaction_type(&self, data: &TransactionTypeData) -> GatewayResult<TransactionType>;

    async fn update_transaction_type(&self, id: i64, data: &TransactionTypeData) -> GatewayResult<TransactionType>;

    /// Fails with 409 while any transaction still references the type
    async fn delete_transaction_type(&self, id: i64) -> GatewayResult<()>;

    // ---- balance ----

    /// Server-computed totals, independent of the cached transaction list
    async fn get_balance(&self, user_id: i64) -> GatewayResult<BalanceSummary>;
}
