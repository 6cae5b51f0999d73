//! Client-side form validation
//!
//! A form that fails here never reaches the gateway.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult};
use crate::models::{TransactionData, TransactionTypeData, UserUpdate};
use crate::types::Category;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Shortest password accepted on profile changes
pub const MIN_PASSWORD_LEN: usize = 6;

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn required<'a>(value: &'a str, message: &str) -> CoreResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CoreError::validation(message))
    } else {
        Ok(trimmed)
    }
}

fn email(value: &str) -> CoreResult<String> {
    let email = required(value, "Please enter your email")?;
    if !is_valid_email(email) {
        return Err(CoreError::validation("Please enter a valid email"));
    }
    Ok(email.to_string())
}

/// Login screen input
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// Returns the trimmed email and the password
    pub fn validate(&self) -> CoreResult<(String, String)> {
        let email = email(&self.email)?;
        if self.password.is_empty() {
            return Err(CoreError::validation("Please enter your password"));
        }
        Ok((email, self.password.clone()))
    }
}

/// Registration screen input
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> CoreResult<(String, String, String)> {
        let name = required(&self.name, "Please enter your name")?.to_string();
        let email = email(&self.email)?;
        if self.password.is_empty() {
            return Err(CoreError::validation("Please enter a password"));
        }
        Ok((name, email, self.password.clone()))
    }
}

/// Transaction modal input; `id` is set when editing
#[derive(Debug, Clone, Default)]
pub struct TransactionForm {
    pub id: Option<i64>,
    pub transaction_type_id: Option<i64>,
    pub value: Decimal,
}

impl TransactionForm {
    pub fn validate(&self, user_id: i64) -> CoreResult<TransactionData> {
        let transaction_type_id = self
            .transaction_type_id
            .ok_or_else(|| CoreError::validation("Please select a transaction type"))?;
        if self.value <= Decimal::ZERO {
            return Err(CoreError::validation("Please enter a value greater than zero"));
        }
        Ok(TransactionData {
            user_id,
            transaction_type_id,
            value: self.value,
        })
    }
}

/// Transaction type modal input
#[derive(Debug, Clone, Default)]
pub struct TypeForm {
    pub id: Option<i64>,
    pub name: String,
    pub category: Option<Category>,
}

impl TypeForm {
    pub fn validate(&self) -> CoreResult<TransactionTypeData> {
        let name = required(&self.name, "Please fill in all fields")?.to_string();
        let category = self
            .category
            .ok_or_else(|| CoreError::validation("Please fill in all fields"))?;
        Ok(TransactionTypeData { name, category })
    }
}

/// Profile modal input; an empty password keeps the current one
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl ProfileForm {
    pub fn validate(&self) -> CoreResult<UserUpdate> {
        let name = required(&self.name, "Name and email are required")?.to_string();
        let email_input = required(&self.email, "Name and email are required")?;
        if !is_valid_email(email_input) {
            return Err(CoreError::validation("Please enter a valid email"));
        }

        let password = if self.password.is_empty() {
            None
        } else {
            if self.password != self.confirm_password {
                return Err(CoreError::validation("Passwords do not match"));
            }
            if self.password.chars().count() < MIN_PASSWORD_LEN {
                return Err(CoreError::validation(format!(
                    "Password must be at least {} characters long",
                    MIN_PASSWORD_LEN
                )));
            }
            Some(self.password.clone())
        };

        Ok(UserUpdate {
            name,
            email: email_input.to_string(),
            password,
        })
    }
}
