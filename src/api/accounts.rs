//! Account endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::account::{Account, AccountId, CreateAccount},
    AppState,
};

use super::{blocking, ValidatedJson};

/// Open a borrower account
#[utoipa::path(
    post,
    path = "/accounts",
    tag = "accounts",
    request_body = CreateAccount,
    responses(
        (status = 201, description = "Account opened", body = Account),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_account(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateAccount>,
) -> AppResult<(StatusCode, Json<Account>)> {
    let accounts = state.services.accounts.clone();
    let account = blocking(move || Ok(accounts.open_account(&request))).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// Get account by ID
#[utoipa::path(
    get,
    path = "/accounts/{id}",
    tag = "accounts",
    params(
        ("id" = u64, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Account details", body = Account),
        (status = 404, description = "Account not found")
    )
)]
pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
) -> AppResult<Json<Account>> {
    let accounts = state.services.accounts.clone();
    let account = blocking(move || accounts.get_account(id)).await?;
    Ok(Json(account))
}
