//! `khata-ledger` — running-balance computation over party transactions.
//!
//! The net balance of a party is never trusted from storage: it is always
//! re-derived by folding the party's full transaction history (sale
//! invoices, purchase bills, payments in and out) with a fixed sign rule.

pub mod engine;
pub mod transaction;

pub use engine::{LedgerEngine, LedgerError, PartyBalance, compute_balance};
pub use transaction::{BalanceBreakdown, Transaction, TransactionRecord};
