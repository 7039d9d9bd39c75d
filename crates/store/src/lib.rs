//! `khata-store` — the persistence collaborator boundary.
//!
//! Entity records matching the remote JSON shapes, the [`Store`] trait the
//! ledger and inventory engines consume, and an in-memory reference
//! implementation for tests and local development. Transport, retry and
//! timeout policy belong to `Store` implementations, not to callers.

pub mod error;
pub mod memory;
pub mod records;
pub mod store;

pub use error::StoreError;
pub use memory::InMemoryStore;
pub use records::{
    BARDANA_NAME, Bill, Invoice, Item, ItemPatch, NewItem, NewParty, Party, PartyPatch, Payment,
    PaymentDirection,
};
pub use store::{StockOp, Store};
