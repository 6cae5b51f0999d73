//! Utility functions and helpers

pub mod mask;
pub mod money;

pub use mask::{CurrencyMask, MaskedInput};
pub use money::{MoneyFormat, SymbolPosition};

/// Format a number with thousands separators
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    match s.strip_prefix('-') {
        Some(digits) => format!("-{}", group_digits(digits, ",")),
        None => group_digits(&s, ","),
    }
}

/// Insert `separator` between every group of three digits, counting from the right
pub fn group_digits(digits: &str, separator: &str) -> String {
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push_str(&separator.chars().rev().collect::<String>());
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(-1234), "-1,234");
    }

    #[test]
    fn test_group_digits_custom_separator() {
        assert_eq!(group_digits("1234567", "."), "1.234.567");
        assert_eq!(group_digits("123", "."), "123");
        assert_eq!(group_digits("1234", "'"), "1'234");
    }
}
