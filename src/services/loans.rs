//! Loan management service
//!
//! Borrow and return change the item stock and the borrower's ledger inside
//! one catalog write section, so `count + outstanding loans` for an item is
//! the same before and after every borrow/return pair.

use std::time::{Duration, Instant};

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        account::{AccountId, AccountLoans},
        loan::LoanReceipt,
    },
    repository::{resources::Resource, Repository, Shelf},
};

/// Result of one locked borrow pass
#[derive(Debug)]
pub enum BorrowStep {
    Granted(LoanReceipt),
    /// Out of stock; wait for a broadcast past this stock generation
    OutOfStock(u64),
}

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    default_wait: Option<Duration>,
}

impl LoansService {
    pub fn new(repository: Repository, default_wait: Option<Duration>) -> Self {
        Self {
            repository,
            default_wait,
        }
    }

    /// Wait bound used when a caller does not give one
    pub fn default_wait(&self) -> Option<Duration> {
        self.default_wait
    }

    fn ensure_account(&self, account_id: AccountId) -> AppResult<()> {
        if self.repository.accounts().contains(account_id) {
            Ok(())
        } else {
            Err(AppError::AccountNotFound(account_id))
        }
    }

    /// Borrow one copy of `title` for `account_id`.
    ///
    /// Fails with `Busy` if the catalog lock is taken right now; this first
    /// attempt never queues. If the item is out of stock the call releases
    /// the lock and sleeps until some return, update or removal broadcasts,
    /// then re-takes the lock and looks the title up again. With `wait` set,
    /// gives up with `Timeout` once that much time has passed.
    pub fn borrow(
        &self,
        title: &str,
        account_id: AccountId,
        wait: Option<Duration>,
    ) -> AppResult<LoanReceipt> {
        let deadline = wait.map(|wait| Instant::now() + wait);
        let mut first = true;
        loop {
            match self.borrow_step(title, account_id, first)? {
                BorrowStep::Granted(receipt) => return Ok(receipt),
                BorrowStep::OutOfStock(seen) => {
                    let woken = {
                        let _waiting = self.repository.resources.enter(Resource::StockWait);
                        self.repository.stock.wait_past(seen, deadline)
                    };
                    if !woken {
                        return Err(self.timed_out(title, account_id));
                    }
                }
            }
            first = false;
        }
    }

    /// One locked pass of a borrow.
    ///
    /// The `first` pass checks the account and only tries the lock, failing
    /// with `Busy` if it is taken. Later passes wait for the lock. On
    /// `OutOfStock` the lock is already released and the caller must wait
    /// for a stock broadcast past the returned generation before the next
    /// pass.
    pub fn borrow_step(
        &self,
        title: &str,
        account_id: AccountId,
        first: bool,
    ) -> AppResult<BorrowStep> {
        let mut shelf = if first {
            self.ensure_account(account_id)?;
            self.repository.try_write_shelf().ok_or_else(|| {
                tracing::debug!("Borrow '{}' refused: catalog lock busy", title);
                AppError::Busy(title.to_string())
            })?
        } else {
            self.repository.write_shelf()
        };

        let Shelf { catalog, ledger } = &mut *shelf;
        let item = catalog
            .find_mut(title)
            .ok_or_else(|| AppError::NotFound(title.to_string()))?;

        if item.count == 0 {
            // Read the generation before letting go of the lock so that a
            // return slipping in right after cannot be missed.
            let seen = self.repository.stock.generation();
            drop(shelf);
            tracing::debug!(
                "Borrow '{}' by account {}: out of stock, waiting",
                title,
                account_id
            );
            return Ok(BorrowStep::OutOfStock(seen));
        }

        item.count -= 1;
        ledger.record(account_id, item.id);
        let receipt = LoanReceipt {
            item_id: item.id,
            title: item.title.clone(),
            account_id,
            remaining: item.count,
            date: Utc::now(),
        };
        drop(shelf);
        tracing::info!(
            "Borrow: '{}' (id={}) by account {}, {} left",
            receipt.title,
            receipt.item_id,
            account_id,
            receipt.remaining
        );
        Ok(BorrowStep::Granted(receipt))
    }

    /// Suspend an async borrow until stock changes past `seen`.
    ///
    /// Returns `false` once `deadline` has passed. Holds no thread while
    /// waiting.
    pub async fn wait_for_stock(&self, seen: u64, deadline: Option<Instant>) -> bool {
        let _waiting = self.repository.resources.enter(Resource::StockWait);
        self.repository.stock.changed_past(seen, deadline).await
    }

    pub(crate) fn timed_out(&self, title: &str, account_id: AccountId) -> AppError {
        tracing::info!(
            "Borrow '{}' by account {}: wait timed out",
            title,
            account_id
        );
        AppError::Timeout(title.to_string())
    }

    /// Undo a granted loan whose requester never received the receipt.
    ///
    /// Looks the item up by id so a rename in between does not matter.
    pub fn revoke(&self, receipt: &LoanReceipt) -> AppResult<()> {
        {
            let mut shelf = self.repository.write_shelf();
            let Shelf { catalog, ledger } = &mut *shelf;
            let item = catalog
                .get_mut(receipt.item_id)
                .ok_or_else(|| AppError::NotFound(receipt.title.clone()))?;
            if !ledger.release(receipt.account_id, item.id) {
                return Err(AppError::NotBorrowedByCaller(receipt.title.clone()));
            }
            item.count += 1;
        }

        self.repository.stock.notify_all();
        tracing::warn!(
            "Borrow: '{}' (id={}) for account {} abandoned by its caller, copy put back",
            receipt.title,
            receipt.item_id,
            receipt.account_id
        );
        Ok(())
    }

    /// Return one copy of `title` previously borrowed by `account_id`.
    ///
    /// Refused with `NotBorrowedByCaller`, and nothing changes, unless the
    /// account's ledger holds the item. Wakes every suspended borrow.
    pub fn return_item(&self, title: &str, account_id: AccountId) -> AppResult<LoanReceipt> {
        self.ensure_account(account_id)?;

        let receipt = {
            let mut shelf = self.repository.write_shelf();
            let Shelf { catalog, ledger } = &mut *shelf;
            let item = catalog
                .find_mut(title)
                .ok_or_else(|| AppError::NotFound(title.to_string()))?;

            if !ledger.release(account_id, item.id) {
                tracing::warn!(
                    "Return '{}' (id={}) refused: not held by account {}",
                    title,
                    item.id,
                    account_id
                );
                return Err(AppError::NotBorrowedByCaller(title.to_string()));
            }
            item.count += 1;

            LoanReceipt {
                item_id: item.id,
                title: item.title.clone(),
                account_id,
                remaining: item.count,
                date: Utc::now(),
            }
        };

        self.repository.stock.notify_all();
        tracing::info!(
            "Return: '{}' (id={}) by account {}, {} on hand",
            receipt.title,
            receipt.item_id,
            account_id,
            receipt.remaining
        );
        Ok(receipt)
    }

    /// Get the items an account currently holds
    pub fn account_loans(&self, account_id: AccountId) -> AppResult<AccountLoans> {
        self.ensure_account(account_id)?;
        let items = self.repository.read_shelf().ledger.held(account_id).to_vec();
        Ok(AccountLoans { account_id, items })
    }
}
