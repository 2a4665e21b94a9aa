//! Item (catalog) endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::item::{Availability, BatchUpdate, CreateItem, ItemEdit, ItemId, ItemRecord},
    AppState,
};

use super::{blocking, ValidatedJson};

/// Create item response
#[derive(Serialize, ToSchema)]
pub struct CreatedItem {
    pub id: ItemId,
}

/// List all items (snapshot)
#[utoipa::path(
    get,
    path = "/items",
    tag = "items",
    responses(
        (status = 200, description = "Catalog snapshot", body = Vec<ItemRecord>)
    )
)]
pub async fn list_items(State(state): State<AppState>) -> AppResult<Json<Vec<ItemRecord>>> {
    let catalog = state.services.catalog.clone();
    let items = blocking(move || Ok(catalog.list_items())).await?;
    Ok(Json(items))
}

/// Get item by title
#[utoipa::path(
    get,
    path = "/items/{title}",
    tag = "items",
    params(
        ("title" = String, Path, description = "Item title")
    ),
    responses(
        (status = 200, description = "Item details", body = ItemRecord),
        (status = 404, description = "Item not found")
    )
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> AppResult<Json<ItemRecord>> {
    let catalog = state.services.catalog.clone();
    let item = blocking(move || catalog.find_item(&title)).await?;
    Ok(Json(item))
}

/// Create a new item
#[utoipa::path(
    post,
    path = "/items",
    tag = "items",
    request_body = CreateItem,
    responses(
        (status = 201, description = "Item created", body = CreatedItem),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_item(
    State(state): State<AppState>,
    ValidatedJson(item): ValidatedJson<CreateItem>,
) -> AppResult<(StatusCode, Json<CreatedItem>)> {
    let catalog = state.services.catalog.clone();
    let id = blocking(move || Ok(catalog.add_item(&item))).await?;
    Ok((StatusCode::CREATED, Json(CreatedItem { id })))
}

/// Update an existing item
#[utoipa::path(
    put,
    path = "/items/{title}",
    tag = "items",
    params(
        ("title" = String, Path, description = "Current item title")
    ),
    request_body = ItemEdit,
    responses(
        (status = 200, description = "Item updated", body = ItemRecord),
        (status = 404, description = "Item not found")
    )
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(title): Path<String>,
    ValidatedJson(edit): ValidatedJson<ItemEdit>,
) -> AppResult<Json<ItemRecord>> {
    let catalog = state.services.catalog.clone();
    let updated = blocking(move || catalog.update_item(&title, &edit)).await?;
    Ok(Json(updated))
}

/// Apply a sequence of updates that no other edit can split
#[utoipa::path(
    put,
    path = "/items",
    tag = "items",
    request_body = BatchUpdate,
    responses(
        (status = 200, description = "All updates applied", body = Vec<ItemRecord>),
        (status = 404, description = "An item in the sequence was not found")
    )
)]
pub async fn update_items(
    State(state): State<AppState>,
    ValidatedJson(batch): ValidatedJson<BatchUpdate>,
) -> AppResult<Json<Vec<ItemRecord>>> {
    let catalog = state.services.catalog.clone();
    let updated = blocking(move || catalog.update_items(&batch.updates)).await?;
    Ok(Json(updated))
}

/// Delete an item
#[utoipa::path(
    delete,
    path = "/items/{title}",
    tag = "items",
    params(
        ("title" = String, Path, description = "Item title")
    ),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Item not found")
    )
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> AppResult<StatusCode> {
    let catalog = state.services.catalog.clone();
    blocking(move || catalog.remove_item(&title)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Check stock on hand
#[utoipa::path(
    get,
    path = "/items/{title}/availability",
    tag = "items",
    params(
        ("title" = String, Path, description = "Item title")
    ),
    responses(
        (status = 200, description = "Copies on hand", body = Availability),
        (status = 404, description = "Item not found")
    )
)]
pub async fn check_availability(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> AppResult<Json<Availability>> {
    let catalog = state.services.catalog.clone();
    let availability = blocking(move || catalog.check_availability(&title)).await?;
    Ok(Json(availability))
}
