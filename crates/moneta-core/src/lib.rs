//! Core client logic for moneta
//!
//! Models, the error taxonomy, the [`Gateway`] seam, the transaction list
//! controller and the session adapter that drives a [`Renderer`].

pub mod app;
pub mod controller;
pub mod error;
pub mod filter;
pub mod gateway;
pub mod memory;
pub mod models;
pub mod notify;
pub mod pagination;
pub mod store;
pub mod types;
pub mod validation;
pub mod view;

pub use app::{Renderer, SessionApp};
pub use controller::{RefreshReport, ReloadKind, ReloadStatus, ReloadTicket, TransactionController};
pub use error::{CoreError, CoreResult, ErrorSeverity, GatewayError, GatewayResult};
pub use filter::FilterEngine;
pub use gateway::{Gateway, GatewayRef};
pub use memory::InMemoryGateway;
pub use models::{
    AccessToken, BalanceSummary, FilterState, Transaction, TransactionData, TransactionType, TransactionTypeData,
    User, UserUpdate,
};
pub use notify::{Notification, NotificationLevel, Notifier};
pub use pagination::{CursorState, PaginationCursor};
pub use store::TransactionStore;
pub use types::Category;
pub use validation::{LoginForm, ProfileForm, RegisterForm, TransactionForm, TypeForm};
pub use view::{BalanceTone, DashboardView, TransactionListView, TransactionRow, TypeListView};

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::models::{Transaction, TransactionType};
    use crate::types::Category;

    pub fn transaction(id: i64, type_id: i64, category: Category, value: i64) -> Transaction {
        let created_at = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        Transaction {
            id,
            user_id: Some(1),
            transaction_type_id: type_id,
            transaction_type_name: format!("Type {}", type_id),
            transaction_type_type: category,
            value: Decimal::from(value),
            created_at,
            updated_at: None,
        }
    }

    pub fn transaction_type(id: i64, name: &str, category: Category) -> TransactionType {
        TransactionType {
            id,
            name: name.to_string(),
            category,
            created_at: None,
            updated_at: None,
        }
    }
}
