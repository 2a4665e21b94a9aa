//! Borrower account model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::item::ItemId;

pub type AccountId = u64;

/// A borrower identity. Credentials and sessions are handled upstream.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

/// Open account request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAccount {
    #[validate(length(min = 1, message = "username must not be empty"))]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Items currently held by an account, one entry per copy
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountLoans {
    pub account_id: AccountId,
    pub items: Vec<ItemId>,
}
