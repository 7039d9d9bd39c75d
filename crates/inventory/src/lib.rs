//! `khata-inventory` — stock adjustment for sales, purchases and reverts.
//!
//! Translates a completed sale or purchase (a list of line items) into
//! stock mutations on the named items and on the universal Bardana
//! packaging item, with kg→bag conversion, a non-negative floor on sales,
//! and duplicate-application protection keyed by transaction id.

pub mod adjuster;
pub mod dedup;

pub use adjuster::{Adjustment, InventoryAdjuster, InventoryError, ItemOutcome, SkipReason};
pub use dedup::{DedupStore, InMemoryDedupStore};
