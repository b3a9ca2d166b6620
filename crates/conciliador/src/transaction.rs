use crate::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which ledger a transaction was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// The organisation's own payment export.
    Internal,
    /// The bank statement reconciled against.
    Bank,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Internal => f.write_str("internal"),
            Source::Bank => f.write_str("bank"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Pending,
    /// Paired by reference code and exact amount.
    Matched,
    /// Paired by a heuristic (name or date), should be reviewed.
    Suggested,
}

impl Status {
    /// Label used in exported reports.
    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Matched => "Reconciled",
            Status::Suggested => "Suggested",
        }
    }
}

/// A single movement from one of the two ledgers.
///
/// Fields are kept as they appeared in the source file, only the amount is
/// canonicalized. Comparison keys (normalized names, parsed dates) are derived
/// on demand by the matching passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: String,
    pub name: String,
    /// Student/control number or bank reference. May be empty or `S/R`.
    pub id: String,
    pub amount: Decimal,
    pub source: Source,
    #[serde(default)]
    pub status: Status,
    /// Raw source line, only used as a fallback when searching for the id.
    #[serde(default)]
    pub original_line: String,
}

impl Transaction {
    pub fn new(
        source: Source,
        date: impl Into<String>,
        name: impl Into<String>,
        id: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Transaction {
            date: date.into(),
            name: name.into(),
            id: id.into(),
            amount,
            source,
            status: Status::Pending,
            original_line: String::new(),
        }
    }

    pub fn with_original_line(mut self, line: impl Into<String>) -> Self {
        self.original_line = line.into();
        self
    }

    pub(crate) fn with_status(&self, status: Status) -> Self {
        Transaction {
            status,
            ..self.clone()
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} {:?} {}",
            self.date, self.id, self.name, self.amount
        )
    }
}
