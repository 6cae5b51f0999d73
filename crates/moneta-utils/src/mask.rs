//! Monetary input mask
//!
//! Every keystroke re-reads the field as a run of digits interpreted as
//! minor units (cents), so typing `1`, `2`, `3`, `4` shows `R$ 0,01`,
//! `R$ 0,12`, `R$ 1,23`, `R$ 12,34`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::money::MoneyFormat;

/// Digits beyond this are ignored so the value always fits an i64
const MAX_INPUT_DIGITS: usize = 18;

/// Text and caret position after masking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedInput {
    pub text: String,
    pub cursor: usize,
}

/// Currency mask bound to a money format
#[derive(Debug, Clone, Default)]
pub struct CurrencyMask {
    format: MoneyFormat,
}

impl CurrencyMask {
    pub fn new(format: MoneyFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> &MoneyFormat {
        &self.format
    }

    /// Re-format raw field content; empty when it holds no digits
    pub fn format_currency_input(&self, raw: &str) -> String {
        match self.minor_units(raw).and_then(|units| self.to_value(units)) {
            Some(value) => self.format.format_currency(value),
            None => String::new(),
        }
    }

    /// Read field content back as a value; zero when it holds no digits
    pub fn parse_currency_input(&self, raw: &str) -> Decimal {
        self.minor_units(raw)
            .and_then(|units| self.to_value(units))
            .unwrap_or(Decimal::ZERO)
    }

    /// Apply the mask after an edit, shifting the caret by the change in length
    pub fn on_input(&self, value: &str, cursor: usize) -> MaskedInput {
        let text = self.format_currency_input(value);
        let old_len = value.chars().count() as i64;
        let new_len = text.chars().count() as i64;
        let moved = (cursor as i64 + (new_len - old_len)).clamp(0, new_len);
        MaskedInput {
            text,
            cursor: moved as usize,
        }
    }

    /// The zero amount shown in an empty focused field
    pub fn placeholder(&self) -> String {
        self.format.format_currency(Decimal::ZERO)
    }

    pub fn on_focus(&self, value: &str) -> String {
        if value.is_empty() {
            self.placeholder()
        } else {
            value.to_string()
        }
    }

    pub fn on_blur(&self, value: &str) -> String {
        if value == self.placeholder() {
            String::new()
        } else {
            value.to_string()
        }
    }

    /// Seed the field from a stored value when editing
    pub fn input_from_value(&self, value: Decimal) -> String {
        let value = 10i64
            .checked_pow(self.format.decimal_places)
            .and_then(|scale| value.abs().checked_mul(Decimal::from(scale)))
            .and_then(|scaled| scaled.round().to_i64())
            .and_then(|units| self.to_value(units));
        match value {
            Some(value) => self.format.format_currency(value),
            None => String::new(),
        }
    }

    fn minor_units(&self, raw: &str) -> Option<i64> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return None;
        }
        let significant = digits.trim_start_matches('0');
        let kept: String = significant.chars().take(MAX_INPUT_DIGITS).collect();
        if kept.is_empty() {
            return Some(0);
        }
        kept.parse().ok()
    }

    /// `None` when the scale is beyond what `Decimal` holds
    fn to_value(&self, units: i64) -> Option<Decimal> {
        Decimal::try_new(units, self.format.decimal_places).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_currency_input_reads_cents() {
        let mask = CurrencyMask::default();
        assert_eq!(mask.format_currency_input(""), "");
        assert_eq!(mask.format_currency_input("abc"), "");
        assert_eq!(mask.format_currency_input("1"), "R$ 0,01");
        assert_eq!(mask.format_currency_input("1234"), "R$ 12,34");
        assert_eq!(mask.format_currency_input("R$ 12,345"), "R$ 123,45");
        assert_eq!(mask.format_currency_input("00000"), "R$ 0,00");
    }

    #[test]
    fn test_parse_currency_input() {
        let mask = CurrencyMask::default();
        assert_eq!(mask.parse_currency_input(""), Decimal::ZERO);
        assert_eq!(mask.parse_currency_input("R$ 1.234,56"), dec!(1234.56));
        assert_eq!(mask.parse_currency_input("R$ 0,05"), dec!(0.05));
    }

    #[test]
    fn test_on_input_moves_cursor() {
        let mask = CurrencyMask::default();
        // "R$ 1,23" plus a typed "4" at the end
        let masked = mask.on_input("R$ 1,234", 8);
        assert_eq!(masked.text, "R$ 12,34");
        assert_eq!(masked.cursor, 8);

        let masked = mask.on_input("5", 1);
        assert_eq!(masked.text, "R$ 0,05");
        assert_eq!(masked.cursor, 7);

        let masked = mask.on_input("", 0);
        assert_eq!(masked.text, "");
        assert_eq!(masked.cursor, 0);
    }

    #[test]
    fn test_focus_and_blur_placeholder() {
        let mask = CurrencyMask::default();
        assert_eq!(mask.on_focus(""), "R$ 0,00");
        assert_eq!(mask.on_focus("R$ 5,00"), "R$ 5,00");
        assert_eq!(mask.on_blur("R$ 0,00"), "");
        assert_eq!(mask.on_blur("R$ 5,00"), "R$ 5,00");
    }

    #[test]
    fn test_input_from_value() {
        let mask = CurrencyMask::default();
        assert_eq!(mask.input_from_value(dec!(12.5)), "R$ 12,50");
        assert_eq!(mask.input_from_value(dec!(1999.99)), "R$ 1.999,99");
    }

    #[test]
    fn test_input_from_value_out_of_range_is_empty() {
        let mask = CurrencyMask::default();
        assert_eq!(mask.input_from_value(Decimal::MAX), "");

        let wide = CurrencyMask::new(MoneyFormat {
            decimal_places: 30,
            ..MoneyFormat::default()
        });
        assert_eq!(wide.input_from_value(dec!(1.5)), "");
        assert_eq!(wide.format_currency_input("123"), "");
        assert_eq!(wide.parse_currency_input("123"), Decimal::ZERO);
    }

    #[test]
    fn test_overlong_input_is_truncated() {
        let mask = CurrencyMask::default();
        let raw = "9".repeat(40);
        assert!(!mask.format_currency_input(&raw).is_empty());
    }
}
