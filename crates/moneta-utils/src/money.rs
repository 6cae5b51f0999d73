//! Currency formatting for dashboard figures and transaction values

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::group_digits;

const THOUSAND: Decimal = Decimal::from_parts(1_000, 0, 0, false, 0);
const MILLION: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);
const BILLION: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Currency symbol position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    Before,
    After,
}

impl Default for SymbolPosition {
    fn default() -> Self {
        SymbolPosition::Before
    }
}

/// How monetary values are rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyFormat {
    /// Currency symbol (e.g., "R$")
    pub symbol: String,
    /// Number of decimal places
    pub decimal_places: u32,
    /// Thousands separator
    pub thousands_separator: String,
    /// Decimal separator
    pub decimal_separator: String,
    /// Where the symbol goes relative to the number
    pub symbol_position: SymbolPosition,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self {
            symbol: "R$".to_string(),
            decimal_places: 2,
            thousands_separator: ".".to_string(),
            decimal_separator: ",".to_string(),
            symbol_position: SymbolPosition::Before,
        }
    }
}

impl MoneyFormat {
    /// Format a value as currency, e.g. `R$ 1.234,56`
    pub fn format_currency(&self, value: Decimal) -> String {
        let rounded = value.round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let number = self.grouped(rounded.abs());
        self.with_symbol(negative, &number)
    }

    /// Abbreviate large values: `1,5K`, `2,3Mi`, `1Bi`; smaller values keep two decimals
    pub fn format_large_number(&self, value: Decimal) -> String {
        let abs = value.abs();
        let scaled = if abs >= BILLION {
            Some((value / BILLION, "Bi"))
        } else if abs >= MILLION {
            Some((value / MILLION, "Mi"))
        } else if abs >= THOUSAND {
            Some((value / THOUSAND, "K"))
        } else {
            None
        };

        match scaled {
            Some((scaled, suffix)) => {
                let text = fixed(scaled, 1);
                let text = text.strip_suffix(".0").unwrap_or(&text);
                format!("{}{}", text.replace('.', &self.decimal_separator), suffix)
            }
            None => fixed(value, 2).replace('.', &self.decimal_separator),
        }
    }

    /// Format as currency, abbreviating when asked and the magnitude is at least a thousand
    pub fn format_currency_abbreviated(&self, value: Decimal, abbreviate: bool) -> String {
        let abs = value.abs();
        if abbreviate && abs >= THOUSAND {
            let negative = value.is_sign_negative();
            return self.with_symbol(negative, &self.format_large_number(abs));
        }
        self.format_currency(value)
    }

    /// Abbreviated count for the dashboard counter
    pub fn format_count(&self, count: usize) -> String {
        if count >= 1000 {
            self.format_large_number(Decimal::from(count))
        } else {
            count.to_string()
        }
    }

    fn grouped(&self, abs: Decimal) -> String {
        let text = fixed(abs, self.decimal_places);
        match text.split_once('.') {
            Some((int_part, frac_part)) => format!(
                "{}{}{}",
                group_digits(int_part, &self.thousands_separator),
                self.decimal_separator,
                frac_part
            ),
            None => group_digits(&text, &self.thousands_separator),
        }
    }

    fn with_symbol(&self, negative: bool, number: &str) -> String {
        let sign = if negative { "-" } else { "" };
        match self.symbol_position {
            SymbolPosition::Before => format!("{}{} {}", sign, self.symbol, number),
            SymbolPosition::After => format!("{}{} {}", sign, number, self.symbol),
        }
    }
}

/// Fixed-point rendering with `.` as separator, rounding half away from zero
fn fixed(value: Decimal, places: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(places);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded.to_string()
}
