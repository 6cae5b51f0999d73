//! In-memory [`Gateway`] with the backend's integrity rules
//!
//! Used by the controller and session tests. Failures can be injected per
//! operation with [`InMemoryGateway::fail`].

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::Gateway;
use crate::models::{
    AccessToken, BalanceSummary, Transaction, TransactionData, TransactionType, TransactionTypeData, User,
    UserUpdate,
};
use crate::types::Category;

/// Gateway operations, for failure injection and call counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Login,
    Register,
    CurrentUser,
    UpdateUser,
    ListTransactions,
    GetTransaction,
    CreateTransaction,
    UpdateTransaction,
    DeleteTransaction,
    ListTypes,
    GetType,
    CreateType,
    UpdateType,
    DeleteType,
    Balance,
}

#[derive(Default)]
struct State {
    users: Vec<(User, String)>,
    types: Vec<TransactionType>,
    transactions: Vec<Transaction>,
    token: Option<String>,
    session_user: Option<i64>,
    next_id: i64,
    failures: HashMap<Operation, GatewayError>,
    calls: HashMap<Operation, usize>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Record the call and return an injected failure, if any
    fn enter(&mut self, op: Operation) -> GatewayResult<()> {
        *self.calls.entry(op).or_insert(0) += 1;
        match self.failures.get(&op) {
            Some(err) => {
                if err.is_unauthorized() && op != Operation::Login {
                    self.token = None;
                }
                Err(err.clone())
            }
            None => Ok(()),
        }
    }

    fn authorized(&mut self, op: Operation) -> GatewayResult<i64> {
        self.enter(op)?;
        match self.session_user {
            Some(user_id) if self.token.is_some() => Ok(user_id),
            _ => {
                self.token = None;
                Err(detail(401, "Could not validate credentials"))
            }
        }
    }

    fn find_type(&self, id: i64) -> GatewayResult<&TransactionType> {
        self.types
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| detail(404, "Transaction type not found"))
    }

    fn build_transaction(&mut self, user_id: i64, data: &TransactionData) -> GatewayResult<Transaction> {
        let kind = self.find_type(data.transaction_type_id)?.clone();
        Ok(Transaction {
            id: self.next_id(),
            user_id: Some(user_id),
            transaction_type_id: kind.id,
            transaction_type_name: kind.name,
            transaction_type_type: kind.category,
            value: data.value,
            created_at: Utc::now().naive_utc(),
            updated_at: None,
        })
    }
}

fn detail(status: u16, message: &str) -> GatewayError {
    GatewayError::http(status, message, serde_json::json!({ "detail": message }))
}

/// Fake backend kept entirely in memory
#[derive(Default)]
pub struct InMemoryGateway {
    state: Mutex<State>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add an account and return its id
    pub fn add_user(&self, name: &str, email: &str, password: &str) -> i64 {
        let mut state = self.state();
        let id = state.next_id();
        state.users.push((
            User {
                id,
                name: name.to_string(),
                email: email.to_string(),
                created_at: None,
                updated_at: None,
            },
            password.to_string(),
        ));
        id
    }

    pub fn add_type(&self, name: &str, category: Category) -> TransactionType {
        let mut state = self.state();
        let kind = TransactionType {
            id: state.next_id(),
            name: name.to_string(),
            category,
            created_at: None,
            updated_at: None,
        };
        state.types.push(kind.clone());
        kind
    }

    pub fn add_transaction(&self, user_id: i64, transaction_type_id: i64, value: Decimal) -> GatewayResult<Transaction> {
        let mut state = self.state();
        let data = TransactionData {
            user_id,
            transaction_type_id,
            value,
        };
        let transaction = state.build_transaction(user_id, &data)?;
        state.transactions.push(transaction.clone());
        Ok(transaction)
    }

    /// Make `op` fail with `error` until healed
    pub fn fail(&self, op: Operation, error: GatewayError) {
        self.state().failures.insert(op, error);
    }

    pub fn heal(&self, op: Operation) {
        self.state().failures.remove(&op);
    }

    /// Invalidate the token; protected calls answer 401 afterwards
    pub fn expire_session(&self) {
        let mut state = self.state();
        state.token = None;
        state.session_user = None;
    }

    /// Number of times `op` was called
    pub fn calls(&self, op: Operation) -> usize {
        self.state().calls.get(&op).copied().unwrap_or(0)
    }

    pub fn transaction_count(&self) -> usize {
        self.state().transactions.len()
    }

    pub fn type_count(&self) -> usize {
        self.state().types.len()
    }
}

#[async_trait]
impl Gateway for InMemoryGateway {
    async fn login(&self, email: &str, password: &str) -> GatewayResult<AccessToken> {
        let mut state = self.state();
        state.enter(Operation::Login)?;
        let user_id = state
            .users
            .iter()
            .find(|(u, p)| u.email == email && p == password)
            .map(|(u, _)| u.id)
            .ok_or_else(|| detail(401, "Incorrect email or password"))?;

        let token = format!("token-{}", user_id);
        state.token = Some(token.clone());
        state.session_user = Some(user_id);
        Ok(AccessToken {
            access_token: token,
            token_type: "bearer".to_string(),
        })
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> GatewayResult<User> {
        {
            let mut state = self.state();
            state.enter(Operation::Register)?;
            if state.users.iter().any(|(u, _)| u.email == email) {
                return Err(detail(400, "Email already registered"));
            }
        }
        let id = self.add_user(name, email, password);
        let state = self.state();
        state
            .users
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone())
            .ok_or_else(|| detail(500, "User vanished"))
    }

    async fn current_user(&self) -> GatewayResult<User> {
        let mut state = self.state();
        let user_id = state.authorized(Operation::CurrentUser)?;
        state
            .users
            .iter()
            .find(|(u, _)| u.id == user_id)
            .map(|(u, _)| u.clone())
            .ok_or_else(|| detail(404, "User not found"))
    }

    async fn update_user(&self, id: i64, data: &UserUpdate) -> GatewayResult<User> {
        let mut state = self.state();
        let user_id = state.authorized(Operation::UpdateUser)?;
        if user_id != id {
            return Err(detail(403, "Not enough permissions"));
        }
        if state.users.iter().any(|(u, _)| u.email == data.email && u.id != id) {
            return Err(detail(400, "Email already registered"));
        }
        let (user, password) = state
            .users
            .iter_mut()
            .find(|(u, _)| u.id == id)
            .ok_or_else(|| detail(404, "User not found"))?;
        user.name = data.name.clone();
        user.email = data.email.clone();
        if let Some(ref new_password) = data.password {
            *password = new_password.clone();
        }
        Ok(user.clone())
    }

    fn logout(&self) {
        let mut state = self.state();
        state.token = None;
        state.session_user = None;
    }

    fn is_authenticated(&self) -> bool {
        self.state().token.is_some()
    }

    async fn list_transactions(&self) -> GatewayResult<Vec<Transaction>> {
        let mut state = self.state();
        let user_id = state.authorized(Operation::ListTransactions)?;
        Ok(state
            .transactions
            .iter()
            .filter(|t| t.user_id == Some(user_id))
            .cloned()
            .collect())
    }

    async fn get_transaction(&self, id: i64) -> GatewayResult<Transaction> {
        let mut state = self.state();
        let user_id = state.authorized(Operation::GetTransaction)?;
        state
            .transactions
            .iter()
            .find(|t| t.id == id && t.user_id == Some(user_id))
            .cloned()
            .ok_or_else(|| detail(404, "Transaction not found"))
    }

    async fn create_transaction(&self, data: &TransactionData) -> GatewayResult<Transaction> {
        let mut state = self.state();
        let user_id = state.authorized(Operation::CreateTransaction)?;
        let transaction = state.build_transaction(user_id, data)?;
        state.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn update_transaction(&self, id: i64, data: &TransactionData) -> GatewayResult<Transaction> {
        let mut state = self.state();
        let user_id = state.authorized(Operation::UpdateTransaction)?;
        let kind = state.find_type(data.transaction_type_id)?.clone();
        let transaction = state
            .transactions
            .iter_mut()
            .find(|t| t.id == id && t.user_id == Some(user_id))
            .ok_or_else(|| detail(404, "Transaction not found"))?;
        transaction.transaction_type_id = kind.id;
        transaction.transaction_type_name = kind.name;
        transaction.transaction_type_type = kind.category;
        transaction.value = data.value;
        transaction.updated_at = Some(Utc::now().naive_utc());
        Ok(transaction.clone())
    }

    async fn delete_transaction(&self, id: i64) -> GatewayResult<()> {
        let mut state = self.state();
        let user_id = state.authorized(Operation::DeleteTransaction)?;
        let before = state.transactions.len();
        state.transactions.retain(|t| !(t.id == id && t.user_id == Some(user_id)));
        if state.transactions.len() == before {
            return Err(detail(404, "Transaction not found"));
        }
        Ok(())
    }

    async fn list_transaction_types(&self) -> GatewayResult<Vec<TransactionType>> {
        let mut state = self.state();
        state.authorized(Operation::ListTypes)?;
        Ok(state.types.clone())
    }

    async fn get_transaction_type(&self, id: i64) -> GatewayResult<TransactionType> {
        let mut state = self.state();
        state.authorized(Operation::GetType)?;
        state.find_type(id).cloned()
    }

    async fn create_transaction_type(&self, data: &TransactionTypeData) -> GatewayResult<TransactionType> {
        let mut state = self.state();
        state.authorized(Operation::CreateType)?;
        let kind = TransactionType {
            id: state.next_id(),
            name: data.name.clone(),
            category: data.category,
            created_at: Some(Utc::now().naive_utc()),
            updated_at: None,
        };
        state.types.push(kind.clone());
        Ok(kind)
    }

    async fn update_transaction_type(&self, id: i64, data: &TransactionTypeData) -> GatewayResult<TransactionType> {
        let mut state = self.state();
        state.authorized(Operation::UpdateType)?;
        let kind = state
            .types
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| detail(404, "Transaction type not found"))?;
        kind.name = data.name.clone();
        kind.category = data.category;
        kind.updated_at = Some(Utc::now().naive_utc());
        let kind = kind.clone();

        for transaction in state.transactions.iter_mut().filter(|t| t.transaction_type_id == id) {
            transaction.transaction_type_name = kind.name.clone();
            transaction.transaction_type_type = kind.category;
        }
        Ok(kind)
    }

    async fn delete_transaction_type(&self, id: i64) -> GatewayResult<()> {
        let mut state = self.state();
        state.authorized(Operation::DeleteType)?;
        state.find_type(id)?;
        if state.transactions.iter().any(|t| t.transaction_type_id == id) {
            return Err(detail(409, "Cannot delete transaction type with associated transactions"));
        }
        state.types.retain(|t| t.id != id);
        Ok(())
    }

    async fn get_balance(&self, user_id: i64) -> GatewayResult<BalanceSummary> {
        let mut state = self.state();
        let session_user = state.authorized(Operation::Balance)?;
        if session_user != user_id {
            return Err(detail(403, "Not enough permissions"));
        }
        let (mut income, mut expense) = (Decimal::ZERO, Decimal::ZERO);
        for t in state.transactions.iter().filter(|t| t.user_id == Some(user_id)) {
            match t.transaction_type_type {
                Category::Income => income += t.value,
                Category::Expense => expense += t.value,
            }
        }
        Ok(BalanceSummary {
            total_income: income,
            total_expense: expense,
            balance: income - expense,
        })
    }
}
