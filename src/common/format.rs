// src/common/format.rs

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Formata no padrão brasileiro: "R$ 1.234,56".
pub fn format_brl(value: Decimal) -> String {
    let rounded = value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .abs();
    let text = format!("{:.2}", rounded);
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}R$ {grouped},{frac_part}")
}

pub fn format_date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn formats_thousands_and_cents() {
        assert_eq!(format_brl(Decimal::from_str("1234.5").unwrap()), "R$ 1.234,50");
        assert_eq!(format_brl(Decimal::from_str("1234567.891").unwrap()), "R$ 1.234.567,89");
        assert_eq!(format_brl(Decimal::ZERO), "R$ 0,00");
        assert_eq!(format_brl(Decimal::from(999)), "R$ 999,00");
    }

    #[test]
    fn negative_values_keep_the_sign() {
        assert_eq!(format_brl(Decimal::from_str("-50").unwrap()), "-R$ 50,00");
    }

    #[test]
    fn dates_are_day_first() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(format_date_br(date), "05/01/2026");
    }
}
