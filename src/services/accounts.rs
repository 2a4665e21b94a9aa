//! Account service

use crate::{
    error::{AppError, AppResult},
    models::account::{Account, AccountId, CreateAccount},
    repository::Repository,
};

#[derive(Clone)]
pub struct AccountsService {
    repository: Repository,
}

impl AccountsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Open a new borrower account
    pub fn open_account(&self, request: &CreateAccount) -> Account {
        let account = self.repository.accounts().open(request);
        tracing::info!("Account opened: {} (id={})", account.username, account.id);
        account
    }

    pub fn get_account(&self, id: AccountId) -> AppResult<Account> {
        self.repository
            .accounts()
            .get(id)
            .cloned()
            .ok_or(AppError::AccountNotFound(id))
    }
}
