//! The `Store` trait: every operation the engines need from persistence.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use khata_core::{ItemId, PartyId};

use crate::error::StoreError;
use crate::records::{
    Bill, Invoice, Item, ItemPatch, NewItem, NewParty, Party, PartyPatch, Payment,
    PaymentDirection,
};

/// Stock mutation direction for the universal-item endpoint.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockOp {
    Add,
    Subtract,
}

/// Persistence collaborator abstraction.
///
/// Implementations are thin adapters over the remote JSON API; the
/// reference [`crate::InMemoryStore`] backs tests and local development.
pub trait Store: Send + Sync {
    fn list_sales(&self) -> Result<Vec<Invoice>, StoreError>;
    fn list_purchases(&self) -> Result<Vec<Bill>, StoreError>;
    /// List payments, optionally filtered to one direction.
    fn list_payments(
        &self,
        direction: Option<PaymentDirection>,
    ) -> Result<Vec<Payment>, StoreError>;

    fn list_parties(&self) -> Result<Vec<Party>, StoreError>;
    fn get_party(&self, id: PartyId) -> Result<Party, StoreError>;
    fn create_party(&self, party: NewParty) -> Result<Party, StoreError>;
    fn update_party(&self, id: PartyId, patch: PartyPatch) -> Result<Party, StoreError>;
    fn delete_party(&self, id: PartyId) -> Result<(), StoreError>;

    /// List items, optionally filtered by a case-insensitive substring of
    /// the product name (the upstream `{search}` filter).
    fn list_items(&self, search: Option<&str>) -> Result<Vec<Item>, StoreError>;
    fn get_item(&self, id: ItemId) -> Result<Item, StoreError>;
    fn create_item(&self, item: NewItem) -> Result<Item, StoreError>;
    fn update_item(&self, id: ItemId, patch: ItemPatch) -> Result<Item, StoreError>;
    /// Delete an item. MUST refuse for the universal item.
    fn delete_item(&self, id: ItemId) -> Result<(), StoreError>;

    /// Look up a non-universal item by exact product name.
    ///
    /// The universal item is excluded; it is reached only through the
    /// dedicated Bardana operations below.
    fn find_item_by_name(&self, product_name: &str) -> Result<Option<Item>, StoreError> {
        let items = self.list_items(Some(product_name))?;
        Ok(items
            .into_iter()
            .find(|item| !item.is_universal && item.product_name == product_name))
    }

    fn get_bardana(&self) -> Result<Item, StoreError>;
    /// Move the universal item's stock by a kilogram quantity.
    ///
    /// The delta is converted to bags before persisting; a subtract never
    /// takes the stock below zero.
    fn update_bardana_stock(&self, op: StockOp, quantity_kg: f64) -> Result<Item, StoreError>;
    /// Ensure the universal item exists. Idempotent: returns the existing
    /// item when already present, never errors on "already exists".
    fn initialize_bardana(&self) -> Result<Item, StoreError>;
}

impl<S> Store for Arc<S>
where
    S: Store + ?Sized,
{
    fn list_sales(&self) -> Result<Vec<Invoice>, StoreError> {
        (**self).list_sales()
    }

    fn list_purchases(&self) -> Result<Vec<Bill>, StoreError> {
        (**self).list_purchases()
    }

    fn list_payments(
        &self,
        direction: Option<PaymentDirection>,
    ) -> Result<Vec<Payment>, StoreError> {
        (**self).list_payments(direction)
    }

    fn list_parties(&self) -> Result<Vec<Party>, StoreError> {
        (**self).list_parties()
    }

    fn get_party(&self, id: PartyId) -> Result<Party, StoreError> {
        (**self).get_party(id)
    }

    fn create_party(&self, party: NewParty) -> Result<Party, StoreError> {
        (**self).create_party(party)
    }

    fn update_party(&self, id: PartyId, patch: PartyPatch) -> Result<Party, StoreError> {
        (**self).update_party(id, patch)
    }

    fn delete_party(&self, id: PartyId) -> Result<(), StoreError> {
        (**self).delete_party(id)
    }

    fn list_items(&self, search: Option<&str>) -> Result<Vec<Item>, StoreError> {
        (**self).list_items(search)
    }

    fn get_item(&self, id: ItemId) -> Result<Item, StoreError> {
        (**self).get_item(id)
    }

    fn create_item(&self, item: NewItem) -> Result<Item, StoreError> {
        (**self).create_item(item)
    }

    fn update_item(&self, id: ItemId, patch: ItemPatch) -> Result<Item, StoreError> {
        (**self).update_item(id, patch)
    }

    fn delete_item(&self, id: ItemId) -> Result<(), StoreError> {
        (**self).delete_item(id)
    }

    fn find_item_by_name(&self, product_name: &str) -> Result<Option<Item>, StoreError> {
        (**self).find_item_by_name(product_name)
    }

    fn get_bardana(&self) -> Result<Item, StoreError> {
        (**self).get_bardana()
    }

    fn update_bardana_stock(&self, op: StockOp, quantity_kg: f64) -> Result<Item, StoreError> {
        (**self).update_bardana_stock(op, quantity_kg)
    }

    fn initialize_bardana(&self) -> Result<Item, StoreError> {
        (**self).initialize_bardana()
    }
}
