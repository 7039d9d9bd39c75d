//! The transaction union folded by the ledger engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use khata_core::{PartyKey, TransactionId};
use khata_store::{Bill, Invoice, Payment, PaymentDirection};

/// Fields shared by every transaction kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub party: PartyKey,
    pub amount: f64,
    pub date: DateTime<Utc>,
    /// Human-readable invoice/bill/payment number.
    pub reference: String,
}

/// One ledger-relevant transaction, normalized from the store records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transaction {
    /// Sale invoice: increases what the party owes the business.
    Invoice(TransactionRecord),
    /// Purchase bill: decreases the net balance.
    Bill(TransactionRecord),
    /// Cash received: decreases what the party owes.
    PaymentIn(TransactionRecord),
    /// Cash paid out: increases the net position against the party.
    PaymentOut(TransactionRecord),
}

impl Transaction {
    pub fn record(&self) -> &TransactionRecord {
        match self {
            Transaction::Invoice(r)
            | Transaction::Bill(r)
            | Transaction::PaymentIn(r)
            | Transaction::PaymentOut(r) => r,
        }
    }

    pub fn amount(&self) -> f64 {
        self.record().amount
    }

    pub fn party(&self) -> &PartyKey {
        &self.record().party
    }

    pub fn from_invoice(invoice: &Invoice) -> Self {
        Transaction::Invoice(TransactionRecord {
            id: invoice.id,
            party: PartyKey::new(&invoice.party_name, &invoice.phone_number),
            amount: invoice.amount,
            date: invoice.date,
            reference: invoice.invoice_number.clone(),
        })
    }

    pub fn from_bill(bill: &Bill) -> Self {
        Transaction::Bill(TransactionRecord {
            id: bill.id,
            party: PartyKey::new(&bill.party_name, &bill.phone_number),
            amount: bill.amount,
            date: bill.date,
            reference: bill.bill_number.clone(),
        })
    }

    pub fn from_payment(payment: &Payment) -> Self {
        let record = TransactionRecord {
            id: payment.id,
            party: PartyKey::new(&payment.party_name, &payment.phone_number),
            amount: payment.amount,
            date: payment.date,
            reference: payment.payment_number.clone(),
        };
        match payment.direction {
            PaymentDirection::In => Transaction::PaymentIn(record),
            PaymentDirection::Out => Transaction::PaymentOut(record),
        }
    }
}

/// Derived per-party totals. Never persisted; a pure function of the
/// party's transaction list.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BalanceBreakdown {
    /// Signed net balance. Positive means the party owes the business.
    pub balance: f64,
    pub total_invoiced: f64,
    pub total_billed: f64,
    pub total_payment_in: f64,
    pub total_payment_out: f64,
    pub transaction_count: usize,
}
