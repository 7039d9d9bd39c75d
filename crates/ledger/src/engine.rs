//! Balance computation and the store-facing ledger engine.

use thiserror::Error;

use khata_core::PartyKey;
use khata_store::{Party, Store, StoreError};

use crate::transaction::{BalanceBreakdown, Transaction};

#[derive(Debug, Error)]
pub enum LedgerError {
    /// A transaction-category read failed. The whole computation fails:
    /// a partial ledger would silently misstate the balance, so no
    /// category is ever zero-filled. The policy is the same for all four
    /// transaction kinds.
    #[error("transaction fetch failed: {0}")]
    Fetch(#[from] StoreError),
}

/// A party merged with its recomputed balance breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct PartyBalance {
    pub party: Party,
    pub breakdown: BalanceBreakdown,
}

/// Fold a party's transactions into a balance breakdown.
///
/// Sign rule, fixed: Invoice `+`, Bill `-`, PaymentIn `-`, PaymentOut `+`,
/// starting from 0. The rule never branches on the sign of the running
/// balance, so the fold is a plain signed sum and the result is identical
/// for any ordering of the input.
pub fn compute_balance(transactions: &[Transaction]) -> BalanceBreakdown {
    let mut breakdown = BalanceBreakdown::default();

    for transaction in transactions {
        let amount = transaction.amount();
        match transaction {
            Transaction::Invoice(_) => {
                breakdown.total_invoiced += amount;
                breakdown.balance += amount;
            }
            Transaction::Bill(_) => {
                breakdown.total_billed += amount;
                breakdown.balance -= amount;
            }
            Transaction::PaymentIn(_) => {
                breakdown.total_payment_in += amount;
                breakdown.balance -= amount;
            }
            Transaction::PaymentOut(_) => {
                breakdown.total_payment_out += amount;
                breakdown.balance += amount;
            }
        }
        breakdown.transaction_count += 1;
    }

    breakdown
}

/// Computes net party balances from full transaction histories.
///
/// Stateless: every call re-reads from the store and re-folds. Nothing is
/// cached between calls.
#[derive(Debug)]
pub struct LedgerEngine<S: Store> {
    store: S,
}

impl<S: Store> LedgerEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Recompute one party's breakdown from its full transaction history.
    pub fn fetch_and_compute_balance(
        &self,
        party_name: &str,
        phone_number: &str,
    ) -> Result<BalanceBreakdown, LedgerError> {
        let key = PartyKey::new(party_name, phone_number);
        let transactions = self.fetch_party_transactions(&key)?;
        tracing::debug!(
            party = key.name(),
            count = transactions.len(),
            "computing balance"
        );
        Ok(compute_balance(&transactions))
    }

    /// Balances for every known party.
    ///
    /// A full O(parties × transactions) rescan per call; acceptable at
    /// small-business volumes and deliberately not optimized.
    pub fn list_parties_with_balances(&self) -> Result<Vec<PartyBalance>, LedgerError> {
        self.store
            .list_parties()?
            .into_iter()
            .map(|party| {
                let breakdown =
                    self.fetch_and_compute_balance(&party.name, &party.phone_number)?;
                Ok(PartyBalance { party, breakdown })
            })
            .collect()
    }

    fn fetch_party_transactions(&self, key: &PartyKey) -> Result<Vec<Transaction>, LedgerError> {
        let mut transactions = Vec::new();

        for invoice in self.store.list_sales()? {
            if key.matches(&invoice.party_name, &invoice.phone_number) {
                transactions.push(Transaction::from_invoice(&invoice));
            }
        }
        for bill in self.store.list_purchases()? {
            if key.matches(&bill.party_name, &bill.phone_number) {
                transactions.push(Transaction::from_bill(&bill));
            }
        }
        for payment in self.store.list_payments(None)? {
            if key.matches(&payment.party_name, &payment.phone_number) {
                transactions.push(Transaction::from_payment(&payment));
            }
        }

        Ok(transactions)
    }
}
