//! `khata-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the ledger and
//! inventory engines: typed identifiers, the domain error model, weight-unit
//! conversion, and the small value objects (`PartyKey`, `LineItem`) both
//! engines consume. No IO, no transport concerns.

pub mod error;
pub mod id;
pub mod line_item;
pub mod party_key;
pub mod units;

pub use error::{DomainError, DomainResult};
pub use id::{ItemId, PartyId, TransactionId};
pub use line_item::LineItem;
pub use party_key::PartyKey;
pub use units::{KG_PER_BAG, bags_to_kg, kg_to_bags, round2};
