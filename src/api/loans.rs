//! Loan management endpoints

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Path, State},
    Json,
};
use parking_lot::Mutex;

use crate::{
    error::{AppError, AppResult},
    models::{
        account::{AccountId, AccountLoans},
        loan::{BorrowRequest, LoanReceipt, ReturnRequest},
    },
    services::loans::{BorrowStep, LoansService},
    AppState,
};

use super::{blocking, ValidatedJson};

/// Get items currently held by an account
#[utoipa::path(
    get,
    path = "/accounts/{id}/loans",
    tag = "loans",
    params(
        ("id" = u64, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Item ids held by the account", body = AccountLoans),
        (status = 404, description = "Account not found")
    )
)]
pub async fn get_account_loans(
    State(state): State<AppState>,
    Path(account_id): Path<AccountId>,
) -> AppResult<Json<AccountLoans>> {
    let loans = state.services.loans.clone();
    let held = blocking(move || loans.account_loans(account_id)).await?;
    Ok(Json(held))
}

/// Borrow an item, waiting for stock if none is on hand
#[utoipa::path(
    post,
    path = "/loans/borrow",
    tag = "loans",
    request_body = BorrowRequest,
    responses(
        (status = 200, description = "Item borrowed", body = LoanReceipt),
        (status = 404, description = "Item or account not found"),
        (status = 408, description = "No stock became available in time"),
        (status = 503, description = "Catalog busy, retry later")
    )
)]
pub async fn borrow(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<BorrowRequest>,
) -> AppResult<Json<LoanReceipt>> {
    let loans = state.services.loans.clone();
    let deadline = request
        .wait_secs
        .map(Duration::from_secs)
        .or(loans.default_wait())
        .map(|wait| Instant::now() + wait);

    let mut first = true;
    loop {
        let step = borrow_pass(&loans, &request.title, request.account_id, first).await?;
        match step {
            BorrowStep::Granted(receipt) => return Ok(Json(receipt)),
            BorrowStep::OutOfStock(seen) => {
                if !loans.wait_for_stock(seen, deadline).await {
                    return Err(loans.timed_out(&request.title, request.account_id));
                }
            }
        }
        first = false;
    }
}

/// Run one borrow pass on the blocking pool.
///
/// Only the locked pass takes a blocking thread; waiting for stock happens
/// back on the async side. If this future is dropped while the pass is in
/// flight, a loan the pass grants is put back.
async fn borrow_pass(
    loans: &LoansService,
    title: &str,
    account_id: AccountId,
    first: bool,
) -> AppResult<BorrowStep> {
    let pass = Arc::new(BorrowPass::new(loans.clone()));
    let mut pending = PendingPass(Some(Arc::clone(&pass)));
    let title = title.to_string();
    let step = blocking(move || pass.run(&title, account_id, first)).await;
    if let Some(pass) = pending.0.take() {
        pass.settle();
    }
    step
}

#[derive(Debug)]
enum PassState {
    Running,
    /// The request went away before the pass finished
    Abandoned,
    /// Granted but not yet handed to the request
    Granted(LoanReceipt),
    Settled,
}

struct BorrowPass {
    loans: LoansService,
    state: Mutex<PassState>,
}

impl BorrowPass {
    fn new(loans: LoansService) -> Self {
        Self {
            loans,
            state: Mutex::new(PassState::Running),
        }
    }

    fn run(&self, title: &str, account_id: AccountId, first: bool) -> AppResult<BorrowStep> {
        let step = self.loans.borrow_step(title, account_id, first)?;
        if let BorrowStep::Granted(receipt) = &step {
            let mut state = self.state.lock();
            if matches!(*state, PassState::Abandoned) {
                drop(state);
                self.loans.revoke(receipt)?;
                return Err(AppError::Timeout(title.to_string()));
            }
            *state = PassState::Granted(receipt.clone());
        }
        Ok(step)
    }

    /// The request has the result in hand.
    fn settle(&self) {
        *self.state.lock() = PassState::Settled;
    }

    /// The request was dropped. A grant already made is put back here,
    /// otherwise `run` puts it back when it finishes.
    fn abandon(&self) {
        let previous = std::mem::replace(&mut *self.state.lock(), PassState::Abandoned);
        let PassState::Granted(receipt) = previous else {
            return;
        };
        let loans = self.loans.clone();
        let put_back = move || {
            if let Err(e) = loans.revoke(&receipt) {
                tracing::error!("Failed to put back abandoned loan: {}", e);
            }
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn_blocking(put_back);
            }
            Err(_) => put_back(),
        }
    }
}

/// Abandons the pass unless it was settled first.
struct PendingPass(Option<Arc<BorrowPass>>);

impl Drop for PendingPass {
    fn drop(&mut self) {
        if let Some(pass) = self.0.take() {
            pass.abandon();
        }
    }
}

/// Return a borrowed item
#[utoipa::path(
    post,
    path = "/loans/return",
    tag = "loans",
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Item returned", body = LoanReceipt),
        (status = 404, description = "Item or account not found"),
        (status = 409, description = "Item is not borrowed by this account")
    )
)]
pub async fn return_item(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ReturnRequest>,
) -> AppResult<Json<LoanReceipt>> {
    let loans = state.services.loans.clone();
    let receipt = blocking(move || loans.return_item(&request.title, request.account_id)).await?;
    Ok(Json(receipt))
}
