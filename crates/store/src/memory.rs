//! In-memory reference store for tests and local development.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use khata_core::{DomainError, ItemId, KG_PER_BAG, PartyId, round2};

use crate::error::StoreError;
use crate::records::{
    BARDANA_NAME, Bill, Invoice, Item, ItemPatch, NewItem, NewParty, Party, PartyPatch, Payment,
    PaymentDirection,
};
use crate::store::{StockOp, Store};

#[derive(Debug, Default)]
struct State {
    parties: HashMap<PartyId, Party>,
    items: HashMap<ItemId, Item>,
    sales: Vec<Invoice>,
    purchases: Vec<Bill>,
    payments: Vec<Payment>,
}

/// In-memory [`Store`] with the same observable behavior as the remote
/// collaborator: PATCH-style sparse updates, case-insensitive product-name
/// uniqueness among non-universal items, a protected universal item, and
/// idempotent Bardana initialization.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::fetch("store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::update("store lock poisoned"))
    }

    /// Seed a sale record (test/dev helper; the real CRUD flow lives in the
    /// remote collaborator).
    pub fn insert_sale(&self, invoice: Invoice) {
        if let Ok(mut state) = self.inner.write() {
            state.sales.push(invoice);
        }
    }

    /// Seed a purchase record.
    pub fn insert_purchase(&self, bill: Bill) {
        if let Ok(mut state) = self.inner.write() {
            state.purchases.push(bill);
        }
    }

    /// Seed a payment record.
    pub fn insert_payment(&self, payment: Payment) {
        if let Ok(mut state) = self.inner.write() {
            state.payments.push(payment);
        }
    }

    /// Seed an item verbatim, bypassing creation validation.
    pub fn insert_item(&self, item: Item) {
        if let Ok(mut state) = self.inner.write() {
            state.items.insert(item.id, item);
        }
    }
}

fn name_taken(state: &State, product_name: &str, exclude: Option<ItemId>) -> bool {
    state.items.values().any(|item| {
        !item.is_universal
            && Some(item.id) != exclude
            && item.product_name.eq_ignore_ascii_case(product_name)
    })
}

fn bardana(state: &State) -> Option<&Item> {
    state.items.values().find(|item| item.is_universal)
}

impl Store for InMemoryStore {
    fn list_sales(&self) -> Result<Vec<Invoice>, StoreError> {
        Ok(self.read()?.sales.clone())
    }

    fn list_purchases(&self) -> Result<Vec<Bill>, StoreError> {
        Ok(self.read()?.purchases.clone())
    }

    fn list_payments(
        &self,
        direction: Option<PaymentDirection>,
    ) -> Result<Vec<Payment>, StoreError> {
        let state = self.read()?;
        Ok(state
            .payments
            .iter()
            .filter(|p| direction.is_none_or(|d| p.direction == d))
            .cloned()
            .collect())
    }

    fn list_parties(&self) -> Result<Vec<Party>, StoreError> {
        let state = self.read()?;
        let mut parties: Vec<Party> = state.parties.values().cloned().collect();
        parties.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(parties)
    }

    fn get_party(&self, id: PartyId) -> Result<Party, StoreError> {
        self.read()?
            .parties
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn create_party(&self, party: NewParty) -> Result<Party, StoreError> {
        if party.name.trim().is_empty() {
            return Err(DomainError::validation("party name cannot be empty").into());
        }
        if party.phone_number.trim().is_empty() {
            return Err(DomainError::validation("phone number cannot be empty").into());
        }

        let mut state = self.write()?;
        let created = Party {
            id: PartyId::new(),
            name: party.name,
            phone_number: party.phone_number,
            address: party.address,
            email: party.email,
            balance: 0.0,
        };
        state.parties.insert(created.id, created.clone());
        Ok(created)
    }

    fn update_party(&self, id: PartyId, patch: PartyPatch) -> Result<Party, StoreError> {
        let mut state = self.write()?;
        let party = state.parties.get_mut(&id).ok_or(StoreError::NotFound)?;

        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("party name cannot be empty").into());
            }
            party.name = name;
        }
        if let Some(phone) = patch.phone_number {
            party.phone_number = phone;
        }
        if let Some(address) = patch.address {
            party.address = Some(address);
        }
        if let Some(email) = patch.email {
            party.email = Some(email);
        }
        if let Some(balance) = patch.balance {
            party.balance = balance;
        }

        Ok(party.clone())
    }

    fn delete_party(&self, id: PartyId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state
            .parties
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    fn list_items(&self, search: Option<&str>) -> Result<Vec<Item>, StoreError> {
        let state = self.read()?;
        let needle = search.map(str::to_lowercase);
        let mut items: Vec<Item> = state
            .items
            .values()
            .filter(|item| {
                needle
                    .as_deref()
                    .is_none_or(|n| item.product_name.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| a.product_name.cmp(&b.product_name));
        Ok(items)
    }

    fn get_item(&self, id: ItemId) -> Result<Item, StoreError> {
        self.read()?
            .items
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn create_item(&self, item: NewItem) -> Result<Item, StoreError> {
        if item.product_name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty").into());
        }

        let mut state = self.write()?;
        if name_taken(&state, &item.product_name, None) {
            return Err(DomainError::conflict(format!(
                "product name already exists: {}",
                item.product_name
            ))
            .into());
        }

        let created = Item {
            id: ItemId::new(),
            product_name: item.product_name,
            category: item.category,
            purchase_price: item.purchase_price,
            sale_price: item.sale_price,
            opening_stock_bags: round2(item.opening_stock_bags),
            low_stock_alert_bags: item.low_stock_alert_bags,
            is_universal: false,
        };
        state.items.insert(created.id, created.clone());
        Ok(created)
    }

    fn update_item(&self, id: ItemId, patch: ItemPatch) -> Result<Item, StoreError> {
        let mut state = self.write()?;

        if let Some(ref name) = patch.product_name {
            let target = state.items.get(&id).ok_or(StoreError::NotFound)?;
            if target.is_universal {
                return Err(
                    DomainError::invariant("the universal item cannot be renamed").into(),
                );
            }
            if name.trim().is_empty() {
                return Err(DomainError::validation("product name cannot be empty").into());
            }
            if name_taken(&state, name, Some(id)) {
                return Err(
                    DomainError::conflict(format!("product name already exists: {name}")).into(),
                );
            }
        }

        let item = state.items.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(name) = patch.product_name {
            item.product_name = name;
        }
        if let Some(category) = patch.category {
            item.category = category;
        }
        if let Some(price) = patch.purchase_price {
            item.purchase_price = price;
        }
        if let Some(price) = patch.sale_price {
            item.sale_price = price;
        }
        if let Some(stock) = patch.opening_stock_bags {
            item.opening_stock_bags = round2(stock);
        }
        if let Some(alert) = patch.low_stock_alert_bags {
            item.low_stock_alert_bags = alert;
        }

        Ok(item.clone())
    }

    fn delete_item(&self, id: ItemId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let item = state.items.get(&id).ok_or(StoreError::NotFound)?;
        if item.is_universal {
            return Err(DomainError::invariant("the universal item cannot be deleted").into());
        }
        state.items.remove(&id);
        Ok(())
    }

    fn get_bardana(&self) -> Result<Item, StoreError> {
        let state = self.read()?;
        bardana(&state).cloned().ok_or(StoreError::NotFound)
    }

    fn update_bardana_stock(&self, op: StockOp, quantity_kg: f64) -> Result<Item, StoreError> {
        let mut state = self.write()?;
        let item = state
            .items
            .values_mut()
            .find(|item| item.is_universal)
            .ok_or(StoreError::NotFound)?;

        let delta_bags = quantity_kg / KG_PER_BAG;
        let new_bags = match op {
            StockOp::Add => item.opening_stock_bags + delta_bags,
            // Stock never goes negative.
            StockOp::Subtract => (item.opening_stock_bags - delta_bags).max(0.0),
        };
        item.opening_stock_bags = round2(new_bags);

        Ok(item.clone())
    }

    fn initialize_bardana(&self) -> Result<Item, StoreError> {
        let mut state = self.write()?;
        if let Some(existing) = bardana(&state) {
            return Ok(existing.clone());
        }

        let created = Item {
            id: ItemId::new(),
            product_name: BARDANA_NAME.to_string(),
            category: "Packaging".to_string(),
            purchase_price: 0.0,
            sale_price: 0.0,
            opening_stock_bags: 0.0,
            low_stock_alert_bags: 0.0,
            is_universal: true,
        };
        state.items.insert(created.id, created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_item(name: &str, stock_bags: f64) -> NewItem {
        NewItem {
            product_name: name.to_string(),
            category: "Grain".to_string(),
            purchase_price: 100.0,
            sale_price: 120.0,
            opening_stock_bags: stock_bags,
            low_stock_alert_bags: 5.0,
        }
    }

    #[test]
    fn initialize_bardana_is_idempotent() {
        let store = InMemoryStore::new();
        let first = store.initialize_bardana().unwrap();
        let second = store.initialize_bardana().unwrap();
        assert_eq!(first.id, second.id);
        assert!(first.is_universal);
        assert_eq!(first.product_name, BARDANA_NAME);
    }

    #[test]
    fn universal_item_cannot_be_deleted_or_renamed() {
        let store = InMemoryStore::new();
        let bardana = store.initialize_bardana().unwrap();

        let err = store.delete_item(bardana.id).unwrap_err();
        assert!(matches!(err, StoreError::Domain(_)));

        let err = store
            .update_item(
                bardana.id,
                ItemPatch {
                    product_name: Some("Sack".to_string()),
                    ..ItemPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(_)));
    }

    #[test]
    fn product_names_are_unique_case_insensitive() {
        let store = InMemoryStore::new();
        store.create_item(new_item("Wheat", 10.0)).unwrap();

        let err = store.create_item(new_item("WHEAT", 3.0)).unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Conflict(_))));
    }

    #[test]
    fn bardana_subtract_clamps_at_zero() {
        let store = InMemoryStore::new();
        store.initialize_bardana().unwrap();
        store.update_bardana_stock(StockOp::Add, 60.0).unwrap();

        let after = store
            .update_bardana_stock(StockOp::Subtract, 900.0)
            .unwrap();
        assert_eq!(after.opening_stock_bags, 0.0);
    }

    #[test]
    fn bardana_stock_moves_in_bags() {
        let store = InMemoryStore::new();
        store.initialize_bardana().unwrap();

        let after = store.update_bardana_stock(StockOp::Add, 900.0).unwrap();
        assert_eq!(after.opening_stock_bags, 30.0);

        let after = store.update_bardana_stock(StockOp::Subtract, 450.0).unwrap();
        assert_eq!(after.opening_stock_bags, 15.0);
    }

    #[test]
    fn search_filters_by_substring_case_insensitive() {
        let store = InMemoryStore::new();
        store.create_item(new_item("Basmati Rice", 10.0)).unwrap();
        store.create_item(new_item("Wheat", 10.0)).unwrap();

        let found = store.list_items(Some("rice")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].product_name, "Basmati Rice");
    }

    #[test]
    fn find_item_by_name_is_exact_and_skips_universal() {
        let store = InMemoryStore::new();
        store.initialize_bardana().unwrap();
        store.create_item(new_item("Wheat", 10.0)).unwrap();

        assert!(store.find_item_by_name("Wheat").unwrap().is_some());
        assert!(store.find_item_by_name("Whea").unwrap().is_none());
        assert!(store.find_item_by_name(BARDANA_NAME).unwrap().is_none());
    }
}
