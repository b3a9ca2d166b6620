//! Spreadsheet friendly report of a reconciliation.

use crate::{ReconciliationResult, Result, Transaction};
use std::io::Write;

const HEADER: [&str; 6] = [
    "internal id",
    "internal name",
    "internal amount",
    "bank date",
    "confidence",
    "status",
];

/// Write the report as CSV: one row per pair, followed by a section for the
/// leftovers of each ledger.
pub fn write_report<W: Write>(writer: W, result: &ReconciliationResult) -> Result<()> {
    let mut wrt = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(writer);

    wrt.write_record(HEADER)?;
    for record in &result.matches {
        wrt.write_record([
            record.internal.id.as_str(),
            record.internal.name.as_str(),
            record.internal.amount.to_string().as_str(),
            record.bank.date.as_str(),
            record.confidence.to_string().as_str(),
            record.confidence.status().label(),
        ])?;
    }

    write_section(&mut wrt, "Only in internal", &result.unmatched_internal)?;
    write_section(&mut wrt, "Only in bank", &result.unmatched_bank)?;

    wrt.flush()?;
    Ok(())
}

fn write_section<W: Write>(
    wrt: &mut csv::Writer<W>,
    title: &str,
    transactions: &[Transaction],
) -> Result<()> {
    wrt.write_record([title, "", "amount"])?;
    for transaction in transactions {
        wrt.write_record([
            transaction.id.as_str(),
            transaction.name.as_str(),
            transaction.amount.to_string().as_str(),
        ])?;
    }
    Ok(())
}

/// [`write_report`] into a string.
pub fn report_csv(result: &ReconciliationResult) -> Result<String> {
    let mut buffer = Vec::new();
    write_report(&mut buffer, result)?;
    Ok(String::from_utf8(buffer)?)
}
