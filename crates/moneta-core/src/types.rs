//! Basic types shared by the models

use serde::{Deserialize, Serialize};

/// Whether a transaction type records money coming in or going out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Money received (salary, refunds)
    Income,
    /// Money spent (food, rent)
    Expense,
}

impl Category {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Category::Income => "Income",
            Category::Expense => "Expense",
        }
    }

    /// Sign prefix used when listing values
    pub fn sign(&self) -> &'static str {
        match self {
            Category::Income => "+",
            Category::Expense => "-",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" | "in" => Ok(Category::Income),
            "expense" | "expenses" | "out" => Ok(Category::Expense),
            _ => Err(format!("Invalid category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Income => write!(f, "INCOME"),
            Category::Expense => write!(f, "EXPENSE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_str() {
        assert_eq!("income".parse::<Category>().unwrap(), Category::Income);
        assert_eq!("EXPENSE".parse::<Category>().unwrap(), Category::Expense);
        assert!("transfer".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_wire_format() {
        assert_eq!(serde_json::to_string(&Category::Income).unwrap(), "\"INCOME\"");
        let parsed: Category = serde_json::from_str("\"EXPENSE\"").unwrap();
        assert_eq!(parsed, Category::Expense);
    }
}
