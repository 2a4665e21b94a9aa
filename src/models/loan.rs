//! Borrow/return payloads and receipts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::account::AccountId;
use super::item::ItemId;

/// Borrow request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BorrowRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub account_id: AccountId,
    /// Upper bound in seconds on waiting for stock; falls back to the
    /// server setting, and waits indefinitely if neither is set
    pub wait_secs: Option<u64>,
}

/// Return request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReturnRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub account_id: AccountId,
}

/// Outcome of a successful borrow or return
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanReceipt {
    pub item_id: ItemId,
    pub title: String,
    pub account_id: AccountId,
    /// Stock left on hand right after the operation
    pub remaining: u32,
    pub date: DateTime<Utc>,
}
