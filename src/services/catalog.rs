//! Catalog management service

use std::sync::Arc;

use parking_lot::ReentrantMutex;

use crate::{
    error::{AppError, AppResult},
    models::item::{Availability, CreateItem, ItemEdit, ItemId, ItemRecord, ItemUpdate},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    /// Keeps one logical edit sequence from being split by another edit.
    update_serializer: Arc<ReentrantMutex<()>>,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self {
            repository,
            update_serializer: Arc::new(ReentrantMutex::new(())),
        }
    }

    /// Add a new item and return its id
    pub fn add_item(&self, item: &CreateItem) -> ItemId {
        let id = self
            .repository
            .write_shelf()
            .catalog
            .add(&item.title, &item.author, item.quantity);
        tracing::info!(
            "Catalog add: '{}' by {} (id={}, quantity={})",
            item.title,
            item.author,
            id,
            item.quantity
        );
        id
    }

    /// Get an item by title
    pub fn find_item(&self, title: &str) -> AppResult<ItemRecord> {
        self.repository
            .read_shelf()
            .catalog
            .find(title)
            .cloned()
            .ok_or_else(|| AppError::NotFound(title.to_string()))
    }

    /// Replace title, author and stock of an existing item.
    ///
    /// All three fields change under one write section. Stock waiters are
    /// woken afterwards since the new count may satisfy them.
    pub fn update_item(&self, title: &str, edit: &ItemEdit) -> AppResult<ItemRecord> {
        let _serial = self.update_serializer.lock();
        let updated = {
            let mut shelf = self.repository.write_shelf();
            shelf
                .catalog
                .update(title, edit)
                .cloned()
                .ok_or_else(|| AppError::NotFound(title.to_string()))?
        };
        self.repository.stock.notify_all();
        tracing::info!(
            "Catalog update: '{}' -> '{}' by {} (id={}, quantity={})",
            title,
            updated.title,
            updated.author,
            updated.id,
            updated.count
        );
        Ok(updated)
    }

    /// Apply several updates in order as one uninterrupted edit sequence.
    ///
    /// Stops at the first missing title; earlier updates stay applied.
    pub fn update_items(&self, updates: &[ItemUpdate]) -> AppResult<Vec<ItemRecord>> {
        let _serial = self.update_serializer.lock();
        updates
            .iter()
            .map(|update| self.update_item(&update.current_title, &update.edit))
            .collect()
    }

    /// Remove an item from the catalog
    pub fn remove_item(&self, title: &str) -> AppResult<ItemRecord> {
        let removed = self
            .repository
            .write_shelf()
            .catalog
            .remove(title)
            .ok_or_else(|| AppError::NotFound(title.to_string()))?;
        // Waiters for this title must find out it is gone.
        self.repository.stock.notify_all();
        tracing::info!("Catalog remove: '{}' (id={})", removed.title, removed.id);
        Ok(removed)
    }

    /// Point-in-time copy of the whole catalog
    pub fn list_items(&self) -> Vec<ItemRecord> {
        self.repository.read_shelf().catalog.snapshot()
    }

    /// Stock on hand for a title
    pub fn check_availability(&self, title: &str) -> AppResult<Availability> {
        let shelf = self.repository.read_shelf();
        let item = shelf
            .catalog
            .find(title)
            .ok_or_else(|| AppError::NotFound(title.to_string()))?;
        Ok(Availability {
            id: item.id,
            title: item.title.clone(),
            count: item.count,
        })
    }
}
