//! In-memory catalog of items.
//!
//! Holds no lock of its own; every access goes through the shelf lock in
//! [`super::Repository`].

use crate::models::item::{ItemEdit, ItemId, ItemRecord};

/// Ordered item records plus the id counter.
#[derive(Debug)]
pub struct Catalog {
    items: Vec<ItemRecord>,
    next_id: ItemId,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
        }
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and returns its id.
    ///
    /// Ids come from a counter that removals never rewind, so an id is
    /// never handed out twice.
    pub fn add(&mut self, title: &str, author: &str, count: u32) -> ItemId {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(ItemRecord {
            id,
            title: title.to_string(),
            author: author.to_string(),
            count,
        });
        id
    }

    /// First record with this title.
    pub fn find(&self, title: &str) -> Option<&ItemRecord> {
        self.items.iter().find(|item| item.title == title)
    }

    pub fn find_mut(&mut self, title: &str) -> Option<&mut ItemRecord> {
        self.items.iter_mut().find(|item| item.title == title)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut ItemRecord> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Replaces title, author and count in one step.
    pub fn update(&mut self, title: &str, edit: &ItemEdit) -> Option<&ItemRecord> {
        let item = self.find_mut(title)?;
        item.title = edit.title.clone();
        item.author = edit.author.clone();
        item.count = edit.quantity;
        Some(&*item)
    }

    pub fn remove(&mut self, title: &str) -> Option<ItemRecord> {
        let index = self.items.iter().position(|item| item.title == title)?;
        Some(self.items.remove(index))
    }

    pub fn snapshot(&self) -> Vec<ItemRecord> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
