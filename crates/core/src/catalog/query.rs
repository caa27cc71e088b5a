use crate::{
    error::CatalogError,
    models::{GameRecord, GenreId, PlatformId},
};

/// Number of records requested per catalog page.
pub const PAGE_SIZE: usize = 20;

/// Filter, search and pagination parameters of the active catalog query.
///
/// Search text, genre and platform combine: changing one leaves the
/// others in place. Every change rewinds to the first page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    /// Free-text search, empty when not searching.
    pub search: String,
    /// Selected genre filter.
    pub genre: Option<GenreId>,
    /// Selected platform filter.
    pub platform: Option<PlatformId>,
    /// 1-based page number.
    pub page: u32,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search: String::new(),
            genre: None,
            platform: None,
            page: 1,
        }
    }
}

impl QueryState {
    /// Search text with surrounding whitespace removed, if any remains.
    pub fn search_term(&self) -> Option<&str> {
        let term = self.search.trim();
        (!term.is_empty()).then_some(term)
    }

    /// Return the state that results from applying `change`.
    ///
    /// Search text is stored trimmed, so inputs differing only in
    /// surrounding whitespace describe the same query.
    pub fn with_change(&self, change: QueryChange) -> Self {
        let mut next = self.clone();
        match change {
            QueryChange::Search(text) => next.search = text.trim().to_string(),
            QueryChange::Genre(genre) => next.genre = genre,
            QueryChange::Platform(platform) => next.platform = platform,
        }
        next.page = 1;
        next
    }
}

/// A single user-driven change to the query dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryChange {
    /// Replace the search text.
    Search(String),
    /// Select a genre, or `None` for all genres.
    Genre(Option<GenreId>),
    /// Select a platform, or `None` for all platforms.
    Platform(Option<PlatformId>),
}

/// Records accumulated for the active query.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    /// Records in arrival order. Ids may repeat across pages.
    pub records: Vec<GameRecord>,
    /// Whether the last successful page was full.
    pub has_more: bool,
    /// Whether a request for the active query is outstanding.
    pub is_loading: bool,
    /// Failure of the most recent request for the active query.
    pub last_error: Option<CatalogError>,
}

impl Default for ResultSet {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            has_more: true,
            is_loading: false,
            last_error: None,
        }
    }
}
