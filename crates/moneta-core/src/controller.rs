//! Transaction list controller
//!
//! Owns every piece of per-session state: the transaction store, the active
//! filter, the pagination cursor, the type list, the balance and the user.
//! Reloads are tagged with a [`ReloadTicket`]; completing a ticket that is no
//! longer the latest of its kind drops the result.

use moneta_utils::MoneyFormat;
use std::sync::Arc;

use crate::error::{CoreError, CoreResult, GatewayResult};
use crate::filter::FilterEngine;
use crate::gateway::GatewayRef;
use crate::models::{BalanceSummary, FilterState, Transaction, TransactionType, User};
use crate::pagination::PaginationCursor;
use crate::store::TransactionStore;
use crate::types::Category;
use crate::validation::{ProfileForm, TransactionForm, TypeForm};
use crate::view::{DashboardView, TransactionListView, TypeListView};

/// What a reload refreshes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadKind {
    Transactions,
    Balance,
    Types,
}

/// Tag issued when a reload starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadTicket {
    kind: ReloadKind,
    generation: u64,
}

impl ReloadTicket {
    pub fn kind(&self) -> ReloadKind {
        self.kind
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Outcome of completing a reload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadStatus {
    Applied,
    /// A newer reload of the same kind was issued; the result was dropped
    Stale,
}

/// Monotonic counter of issued reloads
#[derive(Debug, Default)]
struct Generation {
    issued: u64,
}

impl Generation {
    fn issue(&mut self, kind: ReloadKind) -> ReloadTicket {
        self.issued += 1;
        ReloadTicket {
            kind,
            generation: self.issued,
        }
    }

    fn is_current(&self, ticket: &ReloadTicket) -> bool {
        ticket.generation == self.issued
    }
}

/// Results of the concurrent reloads behind one user action
#[derive(Debug)]
pub struct RefreshReport {
    pub transactions: CoreResult<ReloadStatus>,
    pub balance: CoreResult<ReloadStatus>,
    /// `None` when the type list was not reloaded
    pub types: Option<CoreResult<ReloadStatus>>,
}

impl RefreshReport {
    pub fn is_ok(&self) -> bool {
        self.errors().is_empty()
    }

    /// Errors in reporting order: transactions, balance, types
    pub fn errors(&self) -> Vec<&CoreError> {
        [Some(&self.transactions), Some(&self.balance), self.types.as_ref()]
            .into_iter()
            .flatten()
            .filter_map(|r| r.as_ref().err())
            .collect()
    }

    pub fn into_result(self) -> CoreResult<()> {
        self.transactions?;
        self.balance?;
        if let Some(types) = self.types {
            types?;
        }
        Ok(())
    }
}

/// Per-session state and the operations users trigger on it
pub struct TransactionController {
    gateway: GatewayRef,
    store: TransactionStore,
    filter: FilterState,
    cursor: PaginationCursor,
    types: Vec<TransactionType>,
    balance: Option<BalanceSummary>,
    user: Option<User>,
    transactions_gen: Generation,
    balance_gen: Generation,
    types_gen: Generation,
}

impl TransactionController {
    pub fn new(gateway: GatewayRef, page_size: usize) -> Self {
        Self {
            gateway,
            store: TransactionStore::new(),
            filter: FilterState::default(),
            cursor: PaginationCursor::new(page_size),
            types: Vec::new(),
            balance: None,
            user: None,
            transactions_gen: Generation::default(),
            balance_gen: Generation::default(),
            types_gen: Generation::default(),
        }
    }

    pub fn gateway(&self) -> &GatewayRef {
        &self.gateway
    }

    pub fn store(&self) -> &TransactionStore {
        &self.store
    }

    pub fn filter(&self) -> FilterState {
        self.filter
    }

    pub fn cursor(&self) -> &PaginationCursor {
        &self.cursor
    }

    pub fn types(&self) -> &[TransactionType] {
        &self.types
    }

    pub fn balance(&self) -> Option<&BalanceSummary> {
        self.balance.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    fn user_id(&self) -> CoreResult<i64> {
        self.user.as_ref().map(|u| u.id).ok_or(CoreError::NotAuthenticated)
    }

    // ==================== Session ====================

    /// Authenticate and fetch the profile
    pub async fn login(&mut self, email: &str, password: &str) -> CoreResult<User> {
        self.gateway
            .login(email, password)
            .await
            .map_err(|e| CoreError::from_gateway(e, true))?;
        let user = self
            .gateway
            .current_user()
            .await
            .map_err(|e| CoreError::from_gateway(e, false))?;
        log::info!("Logged in as user {}", user.id);
        self.user = Some(user.clone());
        Ok(user)
    }

    /// Create the account, then log in with it
    pub async fn register(&mut self, name: &str, email: &str, password: &str) -> CoreResult<User> {
        self.gateway
            .register(name, email, password)
            .await
            .map_err(|e| CoreError::from_gateway(e, false))?;
        self.login(email, password).await
    }

    /// Resume a session from a stored token; `None` when there is none
    pub async fn restore(&mut self) -> CoreResult<Option<User>> {
        if !self.gateway.is_authenticated() {
            return Ok(None);
        }
        let user = self
            .gateway
            .current_user()
            .await
            .map_err(|e| CoreError::from_gateway(e, false))?;
        self.user = Some(user.clone());
        Ok(Some(user))
    }

    /// Fetch types, transactions and balance together; each reports on its own
    pub async fn load_user_data(&mut self) -> CoreResult<RefreshReport> {
        self.reload_all().await
    }

    pub async fn update_profile(&mut self, form: &ProfileForm) -> CoreResult<User> {
        let data = form.validate()?;
        let user_id = self.user_id()?;
        let user = self
            .gateway
            .update_user(user_id, &data)
            .await
            .map_err(|e| CoreError::from_gateway(e, false))?;
        self.user = Some(user.clone());
        Ok(user)
    }

    pub fn logout(&mut self) {
        self.gateway.logout();
        self.clear();
    }

    /// Drop all session state; reloads still in flight become stale
    pub fn clear(&mut self) {
        self.transactions_gen.issue(ReloadKind::Transactions);
        self.balance_gen.issue(ReloadKind::Balance);
        self.types_gen.issue(ReloadKind::Types);
        self.store.clear();
        self.filter = FilterState::default();
        self.cursor = PaginationCursor::new(self.cursor.page_size());
        self.types.clear();
        self.balance = None;
        self.user = None;
    }

    // ==================== Reloads ====================

    pub fn begin_transactions_reload(&mut self) -> ReloadTicket {
        self.transactions_gen.issue(ReloadKind::Transactions)
    }

    /// Replace the store and reset pagination, unless `ticket` is stale.
    /// A failed reload leaves the store empty.
    pub fn complete_transactions_reload(
        &mut self,
        ticket: ReloadTicket,
        result: GatewayResult<Vec<Transaction>>,
    ) -> CoreResult<ReloadStatus> {
        if ticket.kind != ReloadKind::Transactions || !self.transactions_gen.is_current(&ticket) {
            log::debug!("Dropping stale transactions reload (generation {})", ticket.generation);
            return Ok(ReloadStatus::Stale);
        }
        let applied = self.store.apply(result);
        self.reset_view();
        log::debug!("Applied transactions reload (generation {})", ticket.generation);
        applied.map(|_| ReloadStatus::Applied)
    }

    pub fn begin_balance_reload(&mut self) -> ReloadTicket {
        self.balance_gen.issue(ReloadKind::Balance)
    }

    /// Store the new balance; a failure keeps the previous figures
    pub fn complete_balance_reload(
        &mut self,
        ticket: ReloadTicket,
        result: GatewayResult<BalanceSummary>,
    ) -> CoreResult<ReloadStatus> {
        if ticket.kind != ReloadKind::Balance || !self.balance_gen.is_current(&ticket) {
            log::debug!("Dropping stale balance reload (generation {})", ticket.generation);
            return Ok(ReloadStatus::Stale);
        }
        let balance = result.map_err(|e| CoreError::from_gateway(e, false))?;
        self.balance = Some(balance);
        Ok(ReloadStatus::Applied)
    }

    pub fn begin_types_reload(&mut self) -> ReloadTicket {
        self.types_gen.issue(ReloadKind::Types)
    }

    /// Replace the type list; a failure empties it
    pub fn complete_types_reload(
        &mut self,
        ticket: ReloadTicket,
        result: GatewayResult<Vec<TransactionType>>,
    ) -> CoreResult<ReloadStatus> {
        if ticket.kind != ReloadKind::Types || !self.types_gen.is_current(&ticket) {
            log::debug!("Dropping stale types reload (generation {})", ticket.generation);
            return Ok(ReloadStatus::Stale);
        }
        match result {
            Ok(types) => {
                self.types = types;
                Ok(ReloadStatus::Applied)
            }
            Err(e) => {
                self.types.clear();
                Err(CoreError::from_gateway(e, false))
            }
        }
    }

    pub async fn reload_transactions(&mut self) -> CoreResult<ReloadStatus> {
        let ticket = self.begin_transactions_reload();
        let gateway = Arc::clone(&self.gateway);
        let result = gateway.list_transactions().await;
        self.complete_transactions_reload(ticket, result)
    }

    pub async fn reload_balance(&mut self) -> CoreResult<ReloadStatus> {
        let user_id = self.user_id()?;
        let ticket = self.begin_balance_reload();
        let gateway = Arc::clone(&self.gateway);
        let result = gateway.get_balance(user_id).await;
        self.complete_balance_reload(ticket, result)
    }

    pub async fn reload_types(&mut self) -> CoreResult<ReloadStatus> {
        let ticket = self.begin_types_reload();
        let gateway = Arc::clone(&self.gateway);
        let result = gateway.list_transaction_types().await;
        self.complete_types_reload(ticket, result)
    }

    /// Reload transactions and balance concurrently and wait for both
    pub async fn refresh(&mut self) -> CoreResult<RefreshReport> {
        let user_id = self.user_id()?;
        let transactions_ticket = self.begin_transactions_reload();
        let balance_ticket = self.begin_balance_reload();

        let gateway = Arc::clone(&self.gateway);
        let (transactions, balance) = tokio::join!(gateway.list_transactions(), gateway.get_balance(user_id));

        Ok(RefreshReport {
            transactions: self.complete_transactions_reload(transactions_ticket, transactions),
            balance: self.complete_balance_reload(balance_ticket, balance),
            types: None,
        })
    }

    /// Reload types, transactions and balance concurrently and wait for all three
    pub async fn reload_all(&mut self) -> CoreResult<RefreshReport> {
        let user_id = self.user_id()?;
        let types_ticket = self.begin_types_reload();
        let transactions_ticket = self.begin_transactions_reload();
        let balance_ticket = self.begin_balance_reload();

        let gateway = Arc::clone(&self.gateway);
        let (types, transactions, balance) = tokio::join!(
            gateway.list_transaction_types(),
            gateway.list_transactions(),
            gateway.get_balance(user_id)
        );

        let types = self.complete_types_reload(types_ticket, types);
        Ok(RefreshReport {
            transactions: self.complete_transactions_reload(transactions_ticket, transactions),
            balance: self.complete_balance_reload(balance_ticket, balance),
            types: Some(types),
        })
    }

    // ==================== Filters ====================

    /// Current store contents passed through the active filter
    pub fn filtered(&self) -> Vec<Transaction> {
        FilterEngine::apply(self.store.as_slice(), &self.filter)
    }

    fn reset_view(&mut self) {
        let view = self.filtered();
        self.cursor.reset(view);
    }

    pub fn apply_filter(&mut self, filter: FilterState) {
        self.filter = filter;
        self.reset_view();
    }

    /// Switch category; a selected type outside it is cleared
    pub fn set_category(&mut self, category: Option<Category>) {
        self.filter = FilterEngine::with_category(&self.filter, category, &self.types);
        self.reset_view();
    }

    pub fn set_transaction_type(&mut self, transaction_type_id: Option<i64>) {
        self.filter.transaction_type_id = transaction_type_id;
        self.reset_view();
    }

    pub fn clear_filters(&mut self) {
        self.apply_filter(FilterState::default());
    }

    /// Types offered for the type filter under the current category
    pub fn type_choices(&self) -> Vec<TransactionType> {
        FilterEngine::type_choices(&self.types, self.filter.category)
    }

    // ==================== Pagination ====================

    /// Reveal the next page; returns how many rows were added
    pub fn load_more(&mut self) -> usize {
        self.cursor.load_next().len()
    }

    // ==================== Mutations ====================

    /// Cached copy first, otherwise ask the backend
    pub async fn get_transaction(&self, id: i64) -> CoreResult<Transaction> {
        if let Some(transaction) = self.store.get(id) {
            return Ok(transaction.clone());
        }
        self.gateway
            .get_transaction(id)
            .await
            .map_err(|e| CoreError::from_gateway(e, false))
    }

    /// Create or update, then refresh list and balance
    pub async fn save_transaction(&mut self, form: &TransactionForm) -> CoreResult<(Transaction, RefreshReport)> {
        let user_id = self.user_id()?;
        let data = form.validate(user_id)?;

        let saved = match form.id {
            Some(id) => self.gateway.update_transaction(id, &data).await,
            None => self.gateway.create_transaction(&data).await,
        }
        .map_err(|e| CoreError::from_gateway(e, false))?;
        log::info!("Saved transaction {}", saved.id);

        let report = self.refresh().await?;
        Ok((saved, report))
    }

    pub async fn delete_transaction(&mut self, id: i64) -> CoreResult<RefreshReport> {
        self.gateway
            .delete_transaction(id)
            .await
            .map_err(|e| CoreError::from_gateway(e, false))?;
        log::info!("Deleted transaction {}", id);
        self.refresh().await
    }

    pub async fn get_transaction_type(&self, id: i64) -> CoreResult<TransactionType> {
        if let Some(kind) = self.types.iter().find(|t| t.id == id) {
            return Ok(kind.clone());
        }
        self.gateway
            .get_transaction_type(id)
            .await
            .map_err(|e| CoreError::from_gateway(e, false))
    }

    /// Create or update a type, then reload everything that shows its name
    pub async fn save_type(&mut self, form: &TypeForm) -> CoreResult<(TransactionType, RefreshReport)> {
        let data = form.validate()?;
        let saved = match form.id {
            Some(id) => self.gateway.update_transaction_type(id, &data).await,
            None => self.gateway.create_transaction_type(&data).await,
        }
        .map_err(|e| CoreError::from_gateway(e, false))?;
        log::info!("Saved transaction type {}", saved.id);

        let report = self.reload_all().await?;
        Ok((saved, report))
    }

    /// Delete a type; a conflict leaves the type list untouched
    pub async fn delete_type(&mut self, id: i64) -> CoreResult<RefreshReport> {
        self.gateway
            .delete_transaction_type(id)
            .await
            .map_err(|e| CoreError::from_gateway(e, false))?;
        log::info!("Deleted transaction type {}", id);

        if self.filter.transaction_type_id == Some(id) {
            self.filter.transaction_type_id = None;
            self.reset_view();
        }
        self.reload_all().await
    }

    // ==================== Views ====================

    pub fn dashboard(&self, format: &MoneyFormat) -> DashboardView {
        DashboardView::build(self.balance.as_ref(), self.store.len(), self.cursor.total(), format)
    }

    pub fn transaction_list(&self, format: &MoneyFormat) -> TransactionListView {
        TransactionListView::build(&self.cursor, format)
    }

    pub fn type_list(&self) -> TypeListView {
        TypeListView::build(&self.types)
    }
}
