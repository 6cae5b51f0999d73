//! Core data models exchanged with the backend

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::Category;

/// Recorded movement of money
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: i64,
    /// Owner of the transaction
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Referenced transaction type
    pub transaction_type_id: i64,
    /// Name of the referenced type, denormalized by the backend
    pub transaction_type_name: String,
    /// Category of the referenced type
    pub transaction_type_type: Category,
    /// Non-negative amount
    pub value: Decimal,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<NaiveDateTime>,
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.transaction_type_type == Category::Income
    }

    /// Value with the sign implied by its category
    pub fn signed_value(&self) -> Decimal {
        match self.transaction_type_type {
            Category::Income => self.value,
            Category::Expense => -self.value,
        }
    }

    /// Creation time as `dd/mm/yyyy HH:MM`
    pub fn display_date(&self) -> String {
        self.created_at.format("%d/%m/%Y %H:%M").to_string()
    }
}

/// User-defined classification of transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionType {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub category: Category,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<NaiveDateTime>,
}

/// Authenticated account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<NaiveDateTime>,
}

/// Server-computed totals for a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub balance: Decimal,
}

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Payload for creating or updating a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionData {
    pub user_id: i64,
    pub transaction_type_id: i64,
    pub value: Decimal,
}

/// Payload for creating or updating a transaction type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionTypeData {
    pub name: String,
    #[serde(rename = "type")]
    pub category: Category,
}

/// Profile changes; the password is only sent when it changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Active list filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Broad category filter; also narrows the type choices offered
    pub category: Option<Category>,
    /// Specific type filter; wins over `category` when both are set
    pub transaction_type_id: Option<i64>,
}

impl FilterState {
    pub fn new(category: Option<Category>, transaction_type_id: Option<i64>) -> Self {
        Self {
            category,
            transaction_type_id,
        }
    }

    pub fn by_category(category: Category) -> Self {
        Self::new(Some(category), None)
    }

    pub fn by_type(transaction_type_id: i64) -> Self {
        Self::new(None, Some(transaction_type_id))
    }

    /// True when nothing is filtered out
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.transaction_type_id.is_none()
    }
}

/// Backend timestamps, with or without an offset
mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn parse(s: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.naive_utc());
        }
        NaiveDateTime::parse_from_str(s, FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
    }

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw))),
                None => Ok(None),
            }
        }
    }
}
