//! Scripted catalog used by unit tests.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::{
    catalog::{query::QueryState, CatalogClient},
    error::CatalogError,
    models::{GameId, GameRecord, Genre, Platform},
};

/// Minimal record with the given id and name.
pub(crate) fn game(id: GameId, name: &str) -> GameRecord {
    GameRecord {
        id,
        name: name.to_string(),
        released: None,
        rating: None,
        image: None,
        genres: Vec::new(),
        platforms: Vec::new(),
        description: None,
    }
}

/// `len` records named after `search` with ids unique per page.
pub(crate) fn page_of(search: &str, page: u32, len: usize) -> Vec<GameRecord> {
    (0..len)
        .map(|index| {
            let id = u64::from(page) * 1000 + index as u64;
            game(id, &format!("{search} #{page}-{index}"))
        })
        .collect()
}

#[derive(Default)]
struct Script {
    // Page lengths per search term; pages past the end come back empty.
    pages: HashMap<String, Vec<usize>>,
    gates: HashMap<String, oneshot::Receiver<()>>,
    fail_next: bool,
    calls: Vec<QueryState>,
    details: HashMap<GameId, GameRecord>,
    genres: Vec<Genre>,
    platforms: Vec<Platform>,
    taxonomy_fails: bool,
}

/// In-memory [`CatalogClient`] with controllable timing and failures.
#[derive(Default)]
pub(crate) struct FakeCatalog {
    script: Mutex<Script>,
}

impl FakeCatalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Serve pages of the given lengths for `search`.
    pub(crate) fn with_pages(self, search: &str, lengths: &[usize]) -> Self {
        self.script
            .lock()
            .pages
            .insert(search.to_string(), lengths.to_vec());
        self
    }

    pub(crate) fn with_detail(self, record: GameRecord) -> Self {
        self.script.lock().details.insert(record.id, record);
        self
    }

    pub(crate) fn with_taxonomy(self, genres: Vec<Genre>, platforms: Vec<Platform>) -> Self {
        {
            let mut script = self.script.lock();
            script.genres = genres;
            script.platforms = platforms;
        }
        self
    }

    pub(crate) fn failing_taxonomy(self) -> Self {
        self.script.lock().taxonomy_fails = true;
        self
    }

    /// Hold the next request for `search` until the returned sender fires.
    pub(crate) fn gate(&self, search: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.script.lock().gates.insert(search.to_string(), rx);
        tx
    }

    pub(crate) fn fail_next(&self) {
        self.script.lock().fail_next = true;
    }

    pub(crate) fn calls(&self) -> Vec<QueryState> {
        self.script.lock().calls.clone()
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn list_games(&self, query: &QueryState) -> Result<Vec<GameRecord>, CatalogError> {
        let gate = {
            let mut script = self.script.lock();
            script.calls.push(query.clone());
            script.gates.remove(&query.search)
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let mut script = self.script.lock();
        if std::mem::take(&mut script.fail_next) {
            return Err(CatalogError::NetworkFailure("connection reset".into()));
        }
        let len = script
            .pages
            .get(&query.search)
            .and_then(|lengths| lengths.get(query.page as usize - 1))
            .copied()
            .unwrap_or(0);
        Ok(page_of(&query.search, query.page, len))
    }

    async fn get_game(&self, id: GameId) -> Result<GameRecord, CatalogError> {
        self.script
            .lock()
            .details
            .get(&id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }

    async fn list_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        let script = self.script.lock();
        if script.taxonomy_fails {
            return Err(CatalogError::NetworkFailure("genres unavailable".into()));
        }
        Ok(script.genres.clone())
    }

    async fn list_platforms(&self) -> Result<Vec<Platform>, CatalogError> {
        let script = self.script.lock();
        if script.taxonomy_fails {
            return Err(CatalogError::NetworkFailure("platforms unavailable".into()));
        }
        Ok(script.platforms.clone())
    }
}
