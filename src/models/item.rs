//! Catalog item model and edit payloads

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Item identifier, assigned from a monotonic counter and never reissued.
pub type ItemId = u64;

/// A lendable title with its on-hand stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ItemRecord {
    pub id: ItemId,
    /// Lookup key, assumed unique within the catalog
    pub title: String,
    pub author: String,
    /// Copies on hand (not counting loans)
    pub count: u32,
}

/// Create item request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateItem {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub author: String,
    pub quantity: u32,
}

/// Replacement values for every editable field of an item
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ItemEdit {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub author: String,
    pub quantity: u32,
}

/// One element of a batch edit: the item to change and its new values
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ItemUpdate {
    #[validate(length(min = 1, message = "current_title must not be empty"))]
    pub current_title: String,
    #[validate(nested)]
    pub edit: ItemEdit,
}

/// Batch edit request, applied in order as one uninterrupted edit sequence
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BatchUpdate {
    #[validate(nested)]
    pub updates: Vec<ItemUpdate>,
}

/// Stock on hand for a title
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Availability {
    pub id: ItemId,
    pub title: String,
    pub count: u32,
}
