//! In-memory account registry

use chrono::Utc;

use crate::models::account::{Account, AccountId, CreateAccount};

#[derive(Debug)]
pub struct AccountRegistry {
    accounts: Vec<Account>,
    next_id: AccountId,
}

impl Default for AccountRegistry {
    fn default() -> Self {
        Self {
            accounts: Vec::new(),
            next_id: 1,
        }
    }
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, request: &CreateAccount) -> Account {
        let account = Account {
            id: self.next_id,
            username: request.username.clone(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            created_at: Utc::now(),
        };
        self.next_id += 1;
        self.accounts.push(account.clone());
        account
    }

    pub fn get(&self, id: AccountId) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn contains(&self, id: AccountId) -> bool {
        self.get(id).is_some()
    }
}
