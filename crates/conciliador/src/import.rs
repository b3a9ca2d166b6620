//! Reading ledger exports into [`Transaction`]s.
//!
//! Exports from the payment processor and from banks disagree on column order,
//! so fields are recognised by their shape instead of their position.

use crate::normalize::{clean_amount, parse_date};
use crate::{Decimal, Result, Source, Transaction};
use anyhow::Context as _;
use std::path::Path;

const UNKNOWN_ID: &str = "S/R";
const UNKNOWN_NAME: &str = "S/N";

/// Read a ledger file. See [`parse_ledger`].
pub fn read_ledger(path: impl AsRef<Path>, source: Source) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ledger file: {}", path.display()))?;
    parse_ledger(&text, source)
        .with_context(|| format!("Failed to parse ledger file: {}", path.display()))
}

/// Parse comma separated ledger rows.
///
/// Rows without a recognisable date or without a positive amount (headers,
/// totals, blank lines) are skipped.
pub fn parse_ledger(text: &str, source: Source) -> Result<Vec<Transaction>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        let start = record
            .position()
            .map_or(0, |position| position.byte() as usize);
        records.push((start, record));
    }

    let mut transactions = Vec::new();
    for (index, (start, record)) in records.iter().enumerate() {
        let end = records
            .get(index + 1)
            .map_or(text.len(), |(next_start, _)| *next_start);
        // with CRLF the following record starts at the '\n'
        let line = text
            .get(*start..end)
            .unwrap_or_default()
            .trim_matches(['\r', '\n']);

        let fields: Vec<&str> = record.iter().collect();
        match parse_row(&fields, source) {
            Some(transaction) => transactions.push(transaction.with_original_line(line)),
            None => tracing::trace!("skipping row {}: {:?}", index + 1, line),
        }
    }

    tracing::debug!(
        "read {} {} transaction(s) from {} row(s)",
        transactions.len(),
        source,
        records.len()
    );
    Ok(transactions)
}

fn parse_row(fields: &[&str], source: Source) -> Option<Transaction> {
    let date_at = fields.iter().position(|field| parse_date(field).is_some())?;
    let (amount_at, amount) = find_amount(fields, date_at)?;

    let others = || {
        fields
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != date_at && *i != amount_at)
    };

    let id = others()
        .find(|(_, field)| {
            (4..=8).contains(&field.chars().count()) && field.chars().any(|c| c.is_ascii_digit())
        })
        .map(|(i, field)| (i, *field));

    let mut name: Option<&str> = None;
    for (i, field) in others() {
        if id.is_some_and(|(id_at, _)| id_at == i) {
            continue;
        }
        if field.contains('/') || !field.chars().any(char::is_alphabetic) {
            continue;
        }
        if name.is_none_or(|longest| field.chars().count() > longest.chars().count()) {
            name = Some(*field);
        }
    }

    Some(Transaction::new(
        source,
        fields[date_at],
        name.unwrap_or(UNKNOWN_NAME),
        id.map_or(UNKNOWN_ID, |(_, id)| id),
        amount,
    ))
}

/// The first monetary looking field wins. Without one, fall back to the first
/// positive number so plain `120` columns still work.
fn find_amount(fields: &[&str], date_at: usize) -> Option<(usize, Decimal)> {
    let candidates = || {
        fields
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != date_at)
    };

    let (at, field) = match candidates().find(|(_, field)| looks_monetary(field)) {
        Some(found) => found,
        None => candidates().find(|(_, field)| clean_amount(field) > Decimal::ZERO)?,
    };
    let amount = clean_amount(field);
    (amount > Decimal::ZERO).then_some((at, amount))
}

fn looks_monetary(field: &str) -> bool {
    if field.contains('$') {
        return true;
    }
    match field.rsplit_once('.') {
        Some((whole, cents)) => {
            whole.ends_with(|c: char| c.is_ascii_digit())
                && cents.len() == 2
                && cents.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}
