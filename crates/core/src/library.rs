//! The user's local game library.
//!
//! Records only enter the library through explicit add requests; nothing
//! fetched from the catalog lands here on its own.

use std::{fmt, str::FromStr};

use crate::{
    error::CatalogError,
    models::{GameId, GameRecord},
};

/// One of the three user-curated record sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibraryCategory {
    /// Games the user owns.
    Collection,
    /// Games the user wants.
    Wishlist,
    /// Games the user has finished.
    Completed,
}

impl LibraryCategory {
    /// All categories in display order.
    pub const ALL: [LibraryCategory; 3] = [
        LibraryCategory::Collection,
        LibraryCategory::Wishlist,
        LibraryCategory::Completed,
    ];

    /// Tag used for this category in commands and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            LibraryCategory::Collection => "collection",
            LibraryCategory::Wishlist => "wishlist",
            LibraryCategory::Completed => "completed",
        }
    }
}

impl fmt::Display for LibraryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LibraryCategory {
    type Err = CatalogError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "collection" => Ok(LibraryCategory::Collection),
            "wishlist" => Ok(LibraryCategory::Wishlist),
            "completed" => Ok(LibraryCategory::Completed),
            other => Err(CatalogError::InvalidCategory(other.to_string())),
        }
    }
}

/// Three independent, insertion-ordered record sets keyed by game id.
///
/// The same id may sit in several categories at once. Within one category
/// an id appears at most once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryStore {
    collection: Vec<GameRecord>,
    wishlist: Vec<GameRecord>,
    completed: Vec<GameRecord>,
}

impl LibraryStore {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record` into `category`. Returns `false` if a record with the
    /// same id was already there, in which case nothing changes.
    pub fn add(&mut self, record: GameRecord, category: LibraryCategory) -> bool {
        let entries = self.entries_mut(category);
        if entries.iter().any(|existing| existing.id == record.id) {
            return false;
        }
        entries.push(record);
        true
    }

    /// Remove the record with `id` from `category`. Returns `false` when it
    /// was not present.
    pub fn remove(&mut self, id: GameId, category: LibraryCategory) -> bool {
        let entries = self.entries_mut(category);
        let before = entries.len();
        entries.retain(|record| record.id != id);
        entries.len() != before
    }

    /// Records in `category`, oldest first.
    pub fn category(&self, category: LibraryCategory) -> &[GameRecord] {
        match category {
            LibraryCategory::Collection => &self.collection,
            LibraryCategory::Wishlist => &self.wishlist,
            LibraryCategory::Completed => &self.completed,
        }
    }

    /// Whether `category` holds a record with `id`.
    pub fn contains(&self, id: GameId, category: LibraryCategory) -> bool {
        self.category(category).iter().any(|record| record.id == id)
    }

    /// Every category that currently holds `id`.
    pub fn categories_of(&self, id: GameId) -> Vec<LibraryCategory> {
        LibraryCategory::ALL
            .into_iter()
            .filter(|category| self.contains(id, *category))
            .collect()
    }

    /// Total number of entries across all categories.
    pub fn len(&self) -> usize {
        self.collection.len() + self.wishlist.len() + self.completed.len()
    }

    /// Whether every category is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries_mut(&mut self, category: LibraryCategory) -> &mut Vec<GameRecord> {
        match category {
            LibraryCategory::Collection => &mut self.collection,
            LibraryCategory::Wishlist => &mut self.wishlist,
            LibraryCategory::Completed => &mut self.completed,
        }
    }
}
