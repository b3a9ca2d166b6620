//! Canonical forms for the free-text fields of a ledger row.

use crate::Decimal;
use chrono::NaiveDate;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization as _;

/// Parse a monetary string like `"$10,500.00"` into a decimal.
///
/// Currency symbols, thousands separators and whitespace are dropped, then the
/// longest leading number is parsed (`"12.50 MXN"` is `12.50`). Returns zero
/// when nothing numeric is left.
pub fn clean_amount(raw: &str) -> Decimal {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();

    leading_number(&cleaned)
        .and_then(|number| Decimal::from_str(&number).ok())
        .unwrap_or(Decimal::ZERO)
}

fn leading_number(input: &str) -> Option<String> {
    let mut chars = input.chars().peekable();
    let mut number = String::new();

    match chars.peek() {
        Some('-') => {
            number.push('-');
            chars.next();
        }
        Some('+') => {
            chars.next();
        }
        _ => {}
    }

    let mut integer_digits = 0;
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        number.push(c);
        integer_digits += 1;
    }

    let mut fraction = String::new();
    if chars.next_if_eq(&'.').is_some() {
        while let Some(c) = chars.next_if(char::is_ascii_digit) {
            fraction.push(c);
        }
    }

    if integer_digits == 0 && fraction.is_empty() {
        return None;
    }
    if integer_digits == 0 {
        number.push('0');
    }
    if !fraction.is_empty() {
        number.push('.');
        number.push_str(&fraction);
    }
    Some(number)
}

/// Comparison key for a person or company name.
///
/// Lowercases, strips diacritics (`"José"` and `"jose"` are equal) and trims.
pub fn normalize_name(raw: &str) -> String {
    raw.to_lowercase()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Whether either normalized name contains the other.
///
/// An empty name carries no evidence and never overlaps.
pub fn names_overlap(a: &str, b: &str) -> bool {
    let a = normalize_name(a);
    let b = normalize_name(b);
    // an empty name is contained in every other name
    a.contains(&b) || b.contains(&a)
}

/// Best-effort calendar date parsing.
///
/// Day-first numeric dates (`1/12/2025`, `01-12-25`, `01.12.2025`) and ISO
/// dates (`2025-12-01`) are accepted, a trailing time is ignored.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date = raw
        .trim()
        .split(|c: char| c.is_whitespace() || c == 'T')
        .next()?;

    let separator = date.chars().find(|c| matches!(c, '/' | '-' | '.'))?;
    let parts: Vec<&str> = date.split(separator).collect();
    let [first, second, third] = parts.as_slice() else {
        return None;
    };
    if ![first, second, third]
        .iter()
        .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }

    let (year, month, day) = match (first.len(), third.len()) {
        (4, 1..=2) => (first, second, third),
        (1..=2, 4) | (1..=2, 2) => (third, second, first),
        _ => return None,
    };

    let mut year: i32 = year.parse().ok()?;
    if year < 100 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}
