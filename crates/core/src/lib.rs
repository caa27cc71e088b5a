#![warn(clippy::all, missing_docs)]

//! Core orchestration for the gamevault catalog browser.
//!
//! This crate hosts the data models, configuration handling, the paged
//! catalog state machine with its async service, search debouncing and
//! the local game library used by the command-line frontend and any
//! future UI.

pub mod catalog;
pub mod config;
pub mod error;
pub mod library;
pub mod models;
pub mod search;

#[cfg(test)]
pub(crate) mod test_support;

pub use catalog::{
    CatalogClient, CatalogService, CatalogSnapshot, DetailTicket, DetailTracker, FetchTicket,
    QueryState, RawgClient, PAGE_SIZE,
};
pub use config::AppConfig;
pub use error::CatalogError;
pub use library::{LibraryCategory, LibraryStore};
pub use models::{GameDraft, GameId, GameRecord, Genre, Platform};
pub use search::SearchDebouncer;
