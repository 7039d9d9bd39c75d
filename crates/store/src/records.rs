//! Entity records, shaped after the remote JSON documents.
//!
//! Monetary amounts and weights are decimal JSON numbers upstream, so they
//! are `f64` here. Records that can arrive without an `amount` field
//! deserialize it as 0 (`#[serde(default)]`) rather than failing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use khata_core::{ItemId, LineItem, PartyId, PartyKey, TransactionId};

/// Product name of the single universal packaging-material item.
///
/// Its identity is fixed by this name; it always exists and is never
/// deletable.
pub const BARDANA_NAME: &str = "Bardana";

/// A counterparty (customer or supplier).
///
/// `balance` is advisory only: the authoritative figure is always
/// recomputed from the transaction history by the ledger engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub id: PartyId,
    pub name: String,
    pub phone_number: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub balance: f64,
}

impl Party {
    /// Ledger-subject identity for this party.
    pub fn key(&self) -> PartyKey {
        PartyKey::new(&self.name, &self.phone_number)
    }
}

/// New-party payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewParty {
    pub name: String,
    pub phone_number: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Sparse party update (upstream PATCH shape).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartyPatch {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub balance: Option<f64>,
}

/// Inventory item. Stock quantities are persisted in bags (1 bag = 30 kg).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub product_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub purchase_price: f64,
    #[serde(default)]
    pub sale_price: f64,
    /// Current stock, in bags.
    #[serde(default)]
    pub opening_stock_bags: f64,
    /// Low-stock threshold, in bags.
    #[serde(default)]
    pub low_stock_alert_bags: f64,
    /// True only for the Bardana packaging-material item.
    #[serde(default)]
    pub is_universal: bool,
}

/// New-item payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub product_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub purchase_price: f64,
    #[serde(default)]
    pub sale_price: f64,
    #[serde(default)]
    pub opening_stock_bags: f64,
    #[serde(default)]
    pub low_stock_alert_bags: f64,
}

/// Sparse item update (upstream PATCH shape).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub purchase_price: Option<f64>,
    pub sale_price: Option<f64>,
    pub opening_stock_bags: Option<f64>,
    pub low_stock_alert_bags: Option<f64>,
}

impl ItemPatch {
    /// Patch that only moves stock to a new bag quantity.
    pub fn stock(opening_stock_bags: f64) -> Self {
        Self {
            opening_stock_bags: Some(opening_stock_bags),
            ..Self::default()
        }
    }
}

/// Sale invoice record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: TransactionId,
    pub invoice_number: String,
    pub party_name: String,
    pub phone_number: String,
    #[serde(default)]
    pub amount: f64,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

/// Purchase bill record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: TransactionId,
    pub bill_number: String,
    pub party_name: String,
    pub phone_number: String,
    #[serde(default)]
    pub amount: f64,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

/// Direction of a payment record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentDirection {
    /// Cash received from the party.
    In,
    /// Cash paid out to the party.
    Out,
}

/// Payment record (either direction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: TransactionId,
    pub payment_number: String,
    pub direction: PaymentDirection,
    pub party_name: String,
    pub phone_number: String,
    #[serde(default)]
    pub amount: f64,
    pub date: DateTime<Utc>,
}
