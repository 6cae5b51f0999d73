//! Render-ready views handed to the UI layer

use moneta_utils::MoneyFormat;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{BalanceSummary, Transaction, TransactionType};
use crate::pagination::PaginationCursor;
use crate::types::Category;

/// Sign of the balance, for colouring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceTone {
    Positive,
    Negative,
    Neutral,
}

impl BalanceTone {
    pub fn of(value: Decimal) -> Self {
        if value > Decimal::ZERO {
            BalanceTone::Positive
        } else if value < Decimal::ZERO {
            BalanceTone::Negative
        } else {
            BalanceTone::Neutral
        }
    }
}

/// Formatted balance figures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceFigures {
    pub total_income: String,
    pub total_expense: String,
    pub balance: String,
    pub tone: BalanceTone,
}

/// Dashboard summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    /// `None` until a balance has been fetched
    pub figures: Option<BalanceFigures>,
    /// Unfiltered transaction count, abbreviated from a thousand up
    pub transaction_count: String,
    pub filtered_count: usize,
    pub total_count: usize,
}

impl DashboardView {
    pub fn build(balance: Option<&BalanceSummary>, total: usize, filtered: usize, format: &MoneyFormat) -> Self {
        let figures = balance.map(|b| BalanceFigures {
            total_income: format.format_currency_abbreviated(b.total_income, true),
            total_expense: format.format_currency_abbreviated(b.total_expense, true),
            balance: format.format_currency_abbreviated(b.balance, true),
            tone: BalanceTone::of(b.balance),
        });

        Self {
            figures,
            transaction_count: format.format_count(total),
            filtered_count: filtered,
            total_count: total,
        }
    }

    pub fn is_filtered(&self) -> bool {
        self.filtered_count != self.total_count
    }
}

/// One line of the transaction list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub type_name: String,
    pub category: Category,
    /// Signed amount, e.g. `+R$ 12,50`
    pub value: String,
}

impl TransactionRow {
    pub fn build(transaction: &Transaction, format: &MoneyFormat) -> Self {
        Self {
            id: transaction.id,
            date: transaction.display_date(),
            type_name: transaction.transaction_type_name.clone(),
            category: transaction.transaction_type_type,
            value: format!(
                "{}{}",
                transaction.transaction_type_type.sign(),
                format.format_currency(transaction.value)
            ),
        }
    }
}

/// Currently revealed part of the filtered list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionListView {
    pub rows: Vec<TransactionRow>,
    pub remaining: usize,
    pub has_more: bool,
}

impl TransactionListView {
    pub fn build(cursor: &PaginationCursor, format: &MoneyFormat) -> Self {
        Self {
            rows: cursor.shown().iter().map(|t| TransactionRow::build(t, format)).collect(),
            remaining: cursor.remaining(),
            has_more: !cursor.is_exhausted(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Transaction types grouped by category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeListView {
    pub income: Vec<TransactionType>,
    pub expense: Vec<TransactionType>,
}

impl TypeListView {
    pub fn build(types: &[TransactionType]) -> Self {
        let (income, expense) = types.iter().cloned().partition(|t| t.category == Category::Income);
        Self { income, expense }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{transaction, transaction_type};
    use rust_decimal_macros::dec;

    #[test]
    fn test_dashboard_abbreviates_large_amounts() {
        let balance = BalanceSummary {
            total_income: dec!(15000),
            total_expense: dec!(2450.75),
            balance: dec!(12549.25),
        };
        let view = DashboardView::build(Some(&balance), 1250, 40, &MoneyFormat::default());
        let figures = view.figures.clone().unwrap();

        assert_eq!(figures.total_income, "R$ 15K");
        assert_eq!(figures.total_expense, "R$ 2,5K");
        assert_eq!(figures.balance, "R$ 12,5K");
        assert_eq!(figures.tone, BalanceTone::Positive);
        assert_eq!(view.transaction_count, "1,3K");
        assert!(view.is_filtered());
    }

    #[test]
    fn test_dashboard_small_and_negative() {
        let balance = BalanceSummary {
            total_income: dec!(100),
            total_expense: dec!(350.5),
            balance: dec!(-250.5),
        };
        let view = DashboardView::build(Some(&balance), 3, 3, &MoneyFormat::default());
        let figures = view.figures.clone().unwrap();

        assert_eq!(figures.total_income, "R$ 100,00");
        assert_eq!(figures.balance, "-R$ 250,50");
        assert_eq!(figures.tone, BalanceTone::Negative);
        assert_eq!(view.transaction_count, "3");
        assert!(!view.is_filtered());
    }

    #[test]
    fn test_dashboard_without_balance() {
        let view = DashboardView::build(None, 0, 0, &MoneyFormat::default());
        assert!(view.figures.is_none());
        assert_eq!(BalanceTone::of(Decimal::ZERO), BalanceTone::Neutral);
    }

    #[test]
    fn test_rows_are_signed() {
        let format = MoneyFormat::default();
        let income = TransactionRow::build(&transaction(1, 1, Category::Income, 1234), &format);
        let expense = TransactionRow::build(&transaction(2, 2, Category::Expense, 12), &format);

        assert_eq!(income.value, "+R$ 1.234,00");
        assert_eq!(expense.value, "-R$ 12,00");
    }

    #[test]
    fn test_list_view_reports_remaining() {
        let mut cursor = PaginationCursor::new(2);
        cursor.reset((1..=5).map(|id| transaction(id, 1, Category::Income, 1)).collect());

        let view = TransactionListView::build(&cursor, &MoneyFormat::default());
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.remaining, 3);
        assert!(view.has_more);
    }

    #[test]
    fn test_type_list_groups_by_category() {
        let types = vec![
            transaction_type(1, "Salary", Category::Income),
            transaction_type(2, "Rent", Category::Expense),
            transaction_type(3, "Food", Category::Expense),
        ];
        let view = TypeListView::build(&types);
        assert_eq!(view.income.len(), 1);
        assert_eq!(view.expense.len(), 2);
    }
}
