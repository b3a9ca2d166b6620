pub mod export;
pub mod import;
pub mod normalize;
pub mod reconcile;
mod transaction;

pub type Decimal = rust_decimal::Decimal;

pub use anyhow::Result;
pub use reconcile::{Confidence, MatchRecord, ReconcileConfig, ReconciliationResult, reconcile};
pub use transaction::{Source, Status, Transaction};
