//! Pairing the internal payment ledger with the bank statement.
//!
//! Three passes run in order of decreasing evidence: reference code with the
//! exact amount, then similar names, then close dates. A transaction paired in
//! one pass is not available to the following ones.

mod matching;

use crate::{Decimal, Status, Transaction};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a pair was found. The discriminant is the reported percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Confidence {
    Date = 60,
    Name = 85,
    Exact = 100,
}

impl Confidence {
    /// Pass order.
    pub const ALL: [Confidence; 3] = [Confidence::Exact, Confidence::Name, Confidence::Date];

    pub fn percent(self) -> u8 {
        self as u8
    }

    /// Status given to both sides of a pair with this confidence.
    pub fn status(self) -> Status {
        match self {
            Confidence::Exact => Status::Matched,
            Confidence::Name | Confidence::Date => Status::Suggested,
        }
    }
}

impl From<Confidence> for u8 {
    fn from(confidence: Confidence) -> u8 {
        confidence.percent()
    }
}

impl TryFrom<u8> for Confidence {
    type Error = String;

    fn try_from(percent: u8) -> Result<Self, Self::Error> {
        Confidence::ALL
            .into_iter()
            .find(|confidence| confidence.percent() == percent)
            .ok_or_else(|| format!("unknown confidence {percent}%"))
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{}%", self.percent()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub internal: Transaction,
    pub bank: Transaction,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// Grouped by pass, highest confidence first.
    pub matches: Vec<MatchRecord>,
    pub unmatched_internal: Vec<Transaction>,
    pub unmatched_bank: Vec<Transaction>,
    /// Sum over the complete internal input, independent of matching.
    pub total_internal: Decimal,
    /// Sum over the complete bank input, independent of matching.
    pub total_bank: Decimal,
}

impl ReconciliationResult {
    /// Bank total minus internal total. Zero when both ledgers agree.
    pub fn difference(&self) -> Decimal {
        self.total_bank.saturating_sub(self.total_internal)
    }

    pub fn count(&self, confidence: Confidence) -> usize {
        self.matches
            .iter()
            .filter(|record| record.confidence == confidence)
            .count()
    }

    pub fn is_fully_reconciled(&self) -> bool {
        self.unmatched_internal.is_empty() && self.unmatched_bank.is_empty()
    }
}

/// Tolerances used by the fuzzy passes.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileConfig {
    /// Amounts closer than this are considered equal by the name and date passes.
    pub amount_tolerance: Decimal,
    /// Maximum distance between the two dates in the date pass (inclusive).
    pub date_window: TimeDelta,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        ReconcileConfig {
            amount_tolerance: Decimal::new(1, 2),
            date_window: TimeDelta::hours(48),
        }
    }
}

impl ReconcileConfig {
    pub fn new(amount_tolerance: Decimal, date_window: TimeDelta) -> Self {
        ReconcileConfig {
            amount_tolerance,
            date_window,
        }
    }

    fn pair_matches(&self, pass: Confidence, internal: &Transaction, bank: &Transaction) -> bool {
        match pass {
            Confidence::Exact => matching::exact_match(internal, bank),
            Confidence::Name => matching::name_match(internal, bank, self.amount_tolerance),
            Confidence::Date => {
                matching::date_match(internal, bank, self.amount_tolerance, self.date_window)
            }
        }
    }

    /// Pair the two ledgers. Inputs are left untouched, the result holds copies
    /// with their status set.
    // PERF: O(internal*bank) per pass
    pub fn reconcile(&self, internal: &[Transaction], bank: &[Transaction]) -> ReconciliationResult {
        let mut internal_used = vec![false; internal.len()];
        let mut bank_used = vec![false; bank.len()];
        let mut matches = Vec::new();

        for pass in Confidence::ALL {
            let before = matches.len();

            // latest internal entries pick first, the bank side is scanned in order
            for (i, internal_item) in internal.iter().enumerate().rev() {
                if internal_used[i] {
                    continue;
                }
                let found = bank.iter().enumerate().position(|(j, bank_item)| {
                    !bank_used[j] && self.pair_matches(pass, internal_item, bank_item)
                });
                if let Some(j) = found {
                    internal_used[i] = true;
                    bank_used[j] = true;
                    matches.push(MatchRecord {
                        internal: internal_item.with_status(pass.status()),
                        bank: bank[j].with_status(pass.status()),
                        confidence: pass,
                    });
                }
            }

            tracing::debug!(
                "{:?} pass paired {} transaction(s)",
                pass,
                matches.len() - before
            );
        }

        let unmatched_internal = leftovers(internal, &internal_used);
        let unmatched_bank = leftovers(bank, &bank_used);
        tracing::info!(
            "reconciled {} pair(s), {} only internal, {} only bank",
            matches.len(),
            unmatched_internal.len(),
            unmatched_bank.len()
        );

        ReconciliationResult {
            matches,
            unmatched_internal,
            unmatched_bank,
            total_internal: total(internal),
            total_bank: total(bank),
        }
    }
}

/// Reconcile with the default tolerances (one cent, 48 hours).
pub fn reconcile(internal: &[Transaction], bank: &[Transaction]) -> ReconciliationResult {
    ReconcileConfig::default().reconcile(internal, bank)
}

fn leftovers(transactions: &[Transaction], used: &[bool]) -> Vec<Transaction> {
    transactions
        .iter()
        .zip(used)
        .filter(|(_, used)| !**used)
        .map(|(transaction, _)| transaction.with_status(Status::Pending))
        .collect()
}

fn total(transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .fold(Decimal::ZERO, |sum, transaction| {
            sum.saturating_add(transaction.amount)
        })
}
