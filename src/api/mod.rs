//! API handlers for Elidune circulation REST endpoints

pub mod accounts;
pub mod diagnostics;
pub mod health;
pub mod items;
pub mod loans;
pub mod openapi;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    AppState,
};

/// JSON body extractor that also runs `validator` rules
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        value
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        Ok(ValidatedJson(value))
    }
}

/// Run a core operation on the blocking pool.
///
/// Core calls may sleep on the catalog lock or on stock, which must not
/// happen on an async worker thread.
pub(crate) async fn blocking<T, F>(operation: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(operation)
        .await
        .map_err(|e| AppError::Internal(format!("blocking task failed: {}", e)))?
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Items (catalog)
        .route(
            "/items",
            get(items::list_items)
                .post(items::create_item)
                .put(items::update_items),
        )
        .route(
            "/items/:title",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
        .route("/items/:title/availability", get(items::check_availability))
        // Accounts
        .route("/accounts", post(accounts::create_account))
        .route("/accounts/:id", get(accounts::get_account))
        .route("/accounts/:id/loans", get(loans::get_account_loans))
        // Loans
        .route("/loans/borrow", post(loans::borrow))
        .route("/loans/return", post(loans::return_item))
        // Diagnostics
        .route("/diagnostics/lock", get(diagnostics::lock_status))
        .route("/diagnostics/deadlock", get(diagnostics::deadlock_check))
        .route("/diagnostics/snapshot", get(diagnostics::lock_snapshot))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
