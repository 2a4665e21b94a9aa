//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{accounts, diagnostics, health, items, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Elidune Circulation API",
        version = "0.1.0",
        description = "Concurrent catalog stock, loans and lock diagnostics",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Elidune Team", email = "contact@elidune.org")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Items
        items::list_items,
        items::get_item,
        items::create_item,
        items::update_item,
        items::update_items,
        items::delete_item,
        items::check_availability,
        // Accounts
        accounts::create_account,
        accounts::get_account,
        // Loans
        loans::get_account_loans,
        loans::borrow,
        loans::return_item,
        // Diagnostics
        diagnostics::lock_status,
        diagnostics::deadlock_check,
        diagnostics::lock_snapshot,
    ),
    components(
        schemas(
            // Items
            crate::models::item::ItemRecord,
            crate::models::item::CreateItem,
            crate::models::item::ItemEdit,
            crate::models::item::ItemUpdate,
            crate::models::item::BatchUpdate,
            crate::models::item::Availability,
            items::CreatedItem,
            // Accounts
            crate::models::account::Account,
            crate::models::account::CreateAccount,
            crate::models::account::AccountLoans,
            // Loans
            crate::models::loan::BorrowRequest,
            crate::models::loan::ReturnRequest,
            crate::models::loan::LoanReceipt,
            // Diagnostics
            crate::models::diagnostics::LockStatus,
            crate::models::diagnostics::DeadlockStatus,
            crate::models::diagnostics::DeadlockReport,
            crate::models::diagnostics::LockSnapshot,
            // Health
            health::HealthResponse,
            health::ReadinessResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "items", description = "Catalog item management"),
        (name = "accounts", description = "Borrower accounts"),
        (name = "loans", description = "Borrow and return"),
        (name = "diagnostics", description = "Advisory lock diagnostics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
