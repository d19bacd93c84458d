//! Brazilian Portuguese number and date formatting for proposal documents.

use chrono::{DateTime, Utc};

/// Inserts `.` thousands separators into a string of ASCII digits.
fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Fixed-point decimal with `.` grouping and `,` as decimal mark, e.g. `1.234,50`.
#[must_use]
pub fn format_decimal(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut out = String::new();
    // Values that round to zero print without a sign
    if value.is_sign_negative() && fixed.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        out.push('-');
    }
    out.push_str(&group_digits(int_part));
    if !frac_part.is_empty() {
        out.push(',');
        out.push_str(frac_part);
    }
    out
}

/// Currency in reais: `R$ 65.600,00`.
#[must_use]
pub fn format_currency(value: f64) -> String {
    format!("R$ {}", format_decimal(value, 2))
}

/// Whole number with thousands grouping: `1.500`.
#[must_use]
pub fn format_integer(value: i64) -> String {
    let grouped = group_digits(&value.unsigned_abs().to_string());
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Length in meters with two decimals: `6,00`.
#[must_use]
pub fn format_meters(value: f64) -> String {
    format_decimal(value, 2)
}

/// Shortest decimal form with a comma, e.g. pixel pitch `2,5` or `4`.
#[must_use]
pub fn format_plain(value: f64) -> String {
    value.to_string().replace('.', ",")
}

/// Calendar date as `dd/mm/yyyy`.
#[must_use]
pub fn format_date(value: DateTime<Utc>) -> String {
    value.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_currency() {
        assert_eq!(format_currency(65600.0), "R$ 65.600,00");
        assert_eq!(format_currency(55760.0), "R$ 55.760,00");
        assert_eq!(format_currency(1800.5), "R$ 1.800,50");
        assert_eq!(format_currency(999.999), "R$ 1.000,00");
        assert_eq!(format_currency(0.0), "R$ 0,00");
        assert_eq!(format_currency(1_234_567.0), "R$ 1.234.567,00");
    }

    #[test]
    fn test_negative_values() {
        assert_eq!(format_decimal(-1500.25, 2), "-1.500,25");
        assert_eq!(format_decimal(-0.001, 2), "0,00");
        assert_eq!(format_integer(-2500), "-2.500");
    }

    #[test]
    fn test_integers_and_meters() {
        assert_eq!(format_integer(1500), "1.500");
        assert_eq!(format_integer(768), "768");
        assert_eq!(format_integer(100_000), "100.000");
        assert_eq!(format_meters(6.0), "6,00");
        assert_eq!(format_meters(1.92), "1,92");
        assert_eq!(format_plain(2.5), "2,5");
        assert_eq!(format_plain(4.0), "4");
    }

    #[test]
    fn test_date() {
        let date = Utc.with_ymd_and_hms(2026, 3, 7, 23, 0, 0).unwrap();
        assert_eq!(format_date(date), "07/03/2026");
    }
}
