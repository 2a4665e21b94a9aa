//! Per-account loan ledger

use std::collections::HashMap;

use crate::models::{account::AccountId, item::ItemId};

/// Item ids currently held by each account, one entry per copy.
#[derive(Debug, Default)]
pub struct LoanLedger {
    loans: HashMap<AccountId, Vec<ItemId>>,
}

impl LoanLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, account_id: AccountId, item_id: ItemId) {
        self.loans.entry(account_id).or_default().push(item_id);
    }

    /// Drops one copy of `item_id` from the account's ledger.
    ///
    /// Returns `false`, leaving the ledger untouched, if the account does
    /// not hold that item.
    pub fn release(&mut self, account_id: AccountId, item_id: ItemId) -> bool {
        let Some(held) = self.loans.get_mut(&account_id) else {
            return false;
        };
        let Some(index) = held.iter().position(|id| *id == item_id) else {
            return false;
        };
        held.swap_remove(index);
        if held.is_empty() {
            self.loans.remove(&account_id);
        }
        true
    }

    pub fn held(&self, account_id: AccountId) -> &[ItemId] {
        self.loans
            .get(&account_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Copies of `item_id` out on loan across all accounts.
    pub fn outstanding(&self, item_id: ItemId) -> usize {
        self.loans
            .values()
            .flat_map(|held| held.iter())
            .filter(|id| **id == item_id)
            .count()
    }
}
