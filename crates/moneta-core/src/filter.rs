//! Pure filtering over transaction snapshots

use crate::models::{FilterState, Transaction, TransactionType};
use crate::types::Category;

/// Derives filtered views and the type choices offered for filtering
pub struct FilterEngine;

impl FilterEngine {
    /// Keep the transactions matching `filter`, preserving input order.
    ///
    /// A type id takes precedence; the category only applies when no type
    /// id is selected.
    pub fn apply(transactions: &[Transaction], filter: &FilterState) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|t| Self::matches(t, filter))
            .cloned()
            .collect()
    }

    pub fn matches(transaction: &Transaction, filter: &FilterState) -> bool {
        if let Some(type_id) = filter.transaction_type_id {
            transaction.transaction_type_id == type_id
        } else if let Some(category) = filter.category {
            transaction.transaction_type_type == category
        } else {
            true
        }
    }

    /// Types selectable for filtering, sorted by name and narrowed by category
    pub fn type_choices(types: &[TransactionType], category: Option<Category>) -> Vec<TransactionType> {
        let mut choices: Vec<TransactionType> = types
            .iter()
            .filter(|t| category.map_or(true, |c| t.category == c))
            .cloned()
            .collect();
        choices.sort_by_key(|t| t.name.to_lowercase());
        choices
    }

    /// Filter after switching to `category`, dropping a type id it excludes
    pub fn with_category(filter: &FilterState, category: Option<Category>, types: &[TransactionType]) -> FilterState {
        let transaction_type_id = filter.transaction_type_id.filter(|id| {
            Self::type_choices(types, category)
                .iter()
                .any(|t| t.id == *id)
        });
        FilterState::new(category, transaction_type_id)
    }
}
