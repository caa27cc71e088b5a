use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::{
    client::{CatalogClient, RawgClient},
    coordinator::{FetchCoordinator, FetchOutcome, FetchTicket},
    detail::DetailTicket,
    query::QueryChange,
};
use crate::{
    config::AppConfig,
    error::CatalogError,
    library::{LibraryCategory, LibraryStore},
    models::{GameId, GameRecord, Genre, GenreId, Platform, PlatformId},
};

/// Read-only view of the browsing state handed to the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogSnapshot {
    /// Records accumulated for the active query.
    pub games: Vec<GameRecord>,
    /// Whether a page request is outstanding.
    pub loading: bool,
    /// Failure of the last page request, if it failed.
    pub error: Option<CatalogError>,
    /// Whether another page may be requested.
    pub has_more: bool,
    /// Genres available for filtering.
    pub genres: Vec<Genre>,
    /// Platforms available for filtering.
    pub platforms: Vec<Platform>,
    /// Active search text.
    pub search: String,
    /// Active genre filter.
    pub selected_genre: Option<GenreId>,
    /// Active platform filter.
    pub selected_platform: Option<PlatformId>,
    /// Last requested page.
    pub page: u32,
}

/// Orchestrates catalog browsing and the local library.
///
/// Cloning is cheap and every clone shares the same state. The internal
/// lock is never held across an `.await`, so intents keep flowing while a
/// request is outstanding. Callers that spawn requests should apply the
/// intent with a `begin_*` method first and spawn only [`fetch`](Self::fetch).
#[derive(Clone)]
pub struct CatalogService {
    client: Arc<dyn CatalogClient>,
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    coordinator: FetchCoordinator,
    genres: Vec<Genre>,
    platforms: Vec<Platform>,
    library: LibraryStore,
}

impl CatalogService {
    /// Build a service over an existing catalog client.
    pub fn new(client: Arc<dyn CatalogClient>) -> Self {
        Self {
            client,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Build a service talking HTTP to the configured catalog.
    pub fn from_config(config: &AppConfig) -> Result<Self, CatalogError> {
        Ok(Self::new(Arc::new(RawgClient::new(config)?)))
    }

    /// Load genre and platform lists alongside the first page.
    pub async fn bootstrap(&self) {
        info!("loading catalog taxonomy and first page");
        let first_page = self.begin_refresh();
        tokio::join!(self.refresh_taxonomy(), self.fetch_opt(first_page));
    }

    /// Reload the genre and platform lists. Failures keep the old lists.
    pub async fn refresh_taxonomy(&self) {
        let (genres, platforms) =
            tokio::join!(self.client.list_genres(), self.client.list_platforms());

        let mut inner = self.inner.lock();
        match genres {
            Ok(genres) => {
                debug!(count = genres.len(), "genres loaded");
                inner.genres = genres;
            }
            Err(err) => warn!(%err, "failed to load genres"),
        }
        match platforms {
            Ok(platforms) => {
                debug!(count = platforms.len(), "platforms loaded");
                inner.platforms = platforms;
            }
            Err(err) => warn!(%err, "failed to load platforms"),
        }
    }

    /// Replace the search text and load its first page.
    pub async fn search_games(&self, text: impl Into<String>) {
        let ticket = self.begin_search(text);
        self.fetch_opt(ticket).await;
    }

    /// Select a genre (or all genres) and load the first page.
    pub async fn select_genre(&self, genre: Option<GenreId>) {
        let ticket = self.begin_genre(genre);
        self.fetch_opt(ticket).await;
    }

    /// Select a platform (or all platforms) and load the first page.
    pub async fn select_platform(&self, platform: Option<PlatformId>) {
        let ticket = self.begin_platform(platform);
        self.fetch_opt(ticket).await;
    }

    /// Append the next page. No-op while loading or after the last page.
    pub async fn load_more(&self) {
        let ticket = self.begin_load_more();
        self.fetch_opt(ticket).await;
    }

    /// Reload the first page of the active query.
    pub async fn refresh(&self) {
        let ticket = self.begin_refresh();
        self.fetch_opt(ticket).await;
    }

    /// Re-issue whatever request last failed.
    pub async fn retry(&self) {
        let ticket = self.begin_retry();
        self.fetch_opt(ticket).await;
    }

    /// Apply a search change immediately and return the request to run.
    ///
    /// The `begin_*` family updates the query before returning, so intents
    /// take effect in call order even when their [`fetch`](Self::fetch)
    /// futures are spawned and polled in any order.
    pub fn begin_search(&self, text: impl Into<String>) -> Option<FetchTicket> {
        self.begin(QueryChange::Search(text.into()))
    }

    /// Apply a genre selection immediately and return the request to run.
    pub fn begin_genre(&self, genre: Option<GenreId>) -> Option<FetchTicket> {
        self.begin(QueryChange::Genre(genre))
    }

    /// Apply a platform selection immediately and return the request to run.
    pub fn begin_platform(&self, platform: Option<PlatformId>) -> Option<FetchTicket> {
        self.begin(QueryChange::Platform(platform))
    }

    /// Advance to the next page, if one may be requested now.
    pub fn begin_load_more(&self) -> Option<FetchTicket> {
        let ticket = self.inner.lock().coordinator.next_page();
        if ticket.is_none() {
            debug!("load_more ignored");
        }
        ticket
    }

    /// Restart the active query at page 1.
    pub fn begin_refresh(&self) -> Option<FetchTicket> {
        self.inner.lock().coordinator.refresh()
    }

    /// Pick the request that repeats the last failure: page 1 when nothing
    /// has loaded yet, otherwise the next page.
    pub fn begin_retry(&self) -> Option<FetchTicket> {
        let mut inner = self.inner.lock();
        if inner.coordinator.results().records.is_empty() {
            inner.coordinator.refresh()
        } else {
            inner.coordinator.next_page()
        }
    }

    /// Run a request issued by one of the `begin_*` methods and fold its
    /// result into the browsing state. Stale results are discarded.
    pub async fn fetch(&self, ticket: FetchTicket) {
        debug!(generation = ticket.generation(), query = ?ticket.query(), "fetching catalog page");
        let query = ticket.query().clone();
        let guard = LoadingGuard::new(Arc::clone(&self.inner), ticket);
        let outcome = self.client.list_games(&query).await;
        let count = outcome.as_ref().map(Vec::len).unwrap_or_default();
        match guard.complete(outcome) {
            FetchOutcome::Stale => {}
            applied => info!(?applied, count, "catalog page applied"),
        }
    }

    /// Fetch the full record for `id`. Browsing state is untouched.
    pub async fn get_game_details(&self, id: GameId) -> Result<GameRecord, CatalogError> {
        let result = self.client.get_game(id).await;
        if let Err(err) = &result {
            warn!(id, %err, "game detail lookup failed");
        }
        result
    }

    /// Fetch details on behalf of a view. Returns `None` if the view moved
    /// on or was torn down while the request was outstanding.
    pub async fn load_detail(
        &self,
        ticket: &DetailTicket,
        id: GameId,
    ) -> Option<Result<GameRecord, CatalogError>> {
        let result = self.get_game_details(id).await;
        let accepted = ticket.accept(result);
        if accepted.is_none() {
            debug!(id, "dropping detail for inactive view");
        }
        accepted
    }

    /// Current browsing state.
    pub fn snapshot(&self) -> CatalogSnapshot {
        let inner = self.inner.lock();
        let query = inner.coordinator.query();
        let results = inner.coordinator.results();
        CatalogSnapshot {
            games: results.records.clone(),
            loading: results.is_loading,
            error: results.last_error.clone(),
            has_more: results.has_more,
            genres: inner.genres.clone(),
            platforms: inner.platforms.clone(),
            search: query.search.clone(),
            selected_genre: query.genre,
            selected_platform: query.platform,
            page: query.page,
        }
    }

    /// Copy of the whole library.
    pub fn library(&self) -> LibraryStore {
        self.inner.lock().library.clone()
    }

    /// Records in one library category.
    pub fn library_category(&self, category: LibraryCategory) -> Vec<GameRecord> {
        self.inner.lock().library.category(category).to_vec()
    }

    /// Add `record` to `category`. Returns `false` if it was already there.
    pub fn add_to_library(&self, record: GameRecord, category: LibraryCategory) -> bool {
        let id = record.id;
        let added = self.inner.lock().library.add(record, category);
        info!(id, %category, added, "library add");
        added
    }

    /// Remove `id` from `category`. Returns `false` if it was not there.
    pub fn remove_from_library(&self, id: GameId, category: LibraryCategory) -> bool {
        let removed = self.inner.lock().library.remove(id, category);
        info!(id, %category, removed, "library remove");
        removed
    }

    fn begin(&self, change: QueryChange) -> Option<FetchTicket> {
        self.inner.lock().coordinator.apply_change(change)
    }

    async fn fetch_opt(&self, ticket: Option<FetchTicket>) {
        if let Some(ticket) = ticket {
            self.fetch(ticket).await;
        }
    }
}

/// Releases the loading flag for a request on every exit path, including a
/// dropped future.
struct LoadingGuard {
    inner: Arc<Mutex<Inner>>,
    ticket: Option<FetchTicket>,
}

impl LoadingGuard {
    fn new(inner: Arc<Mutex<Inner>>, ticket: FetchTicket) -> Self {
        Self {
            inner,
            ticket: Some(ticket),
        }
    }

    fn complete(mut self, outcome: Result<Vec<GameRecord>, CatalogError>) -> FetchOutcome {
        match self.ticket.take() {
            Some(ticket) => self.inner.lock().coordinator.complete(&ticket, outcome),
            None => FetchOutcome::Stale,
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.inner.lock().coordinator.abandon(&ticket);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::{detail::DetailTracker, query::PAGE_SIZE},
        test_support::{game, FakeCatalog},
    };

    fn service_with(fake: FakeCatalog) -> (CatalogService, Arc<FakeCatalog>) {
        let fake = Arc::new(fake);
        let service = CatalogService::new(fake.clone());
        (service, fake)
    }

    async fn wait_for_calls(fake: &FakeCatalog, count: usize) {
        while fake.calls().len() < count {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn pages_accumulate_until_a_short_page() {
        let (service, fake) = service_with(FakeCatalog::new().with_pages("", &[PAGE_SIZE, 5]));

        service.refresh().await;
        let snapshot = service.snapshot();
        assert_eq!(snapshot.games.len(), PAGE_SIZE);
        assert!(snapshot.has_more);
        assert!(!snapshot.loading);

        service.load_more().await;
        let snapshot = service.snapshot();
        assert_eq!(snapshot.games.len(), 25);
        assert!(!snapshot.has_more);
        assert_eq!(snapshot.page, 2);

        service.load_more().await;
        assert_eq!(fake.calls().len(), 2);
        assert_eq!(service.snapshot().games.len(), 25);
    }

    #[tokio::test]
    async fn late_result_of_superseded_query_is_ignored() {
        let (service, fake) = service_with(
            FakeCatalog::new()
                .with_pages("slow", &[PAGE_SIZE])
                .with_pages("fast", &[3]),
        );
        let release_slow = fake.gate("slow");

        let newer = async {
            wait_for_calls(&fake, 1).await;
            service.search_games("fast").await;
            assert!(!service.snapshot().loading);
            let _ = release_slow.send(());
        };
        tokio::join!(service.search_games("slow"), newer);

        let snapshot = service.snapshot();
        assert_eq!(snapshot.search, "fast");
        assert_eq!(snapshot.page, 1);
        assert_eq!(snapshot.games.len(), 3);
        assert!(snapshot.games.iter().all(|g| g.name.starts_with("fast")));
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn identical_concurrent_searches_share_one_request() {
        let (service, fake) = service_with(FakeCatalog::new().with_pages("zelda", &[4]));
        let release = fake.gate("zelda");

        let second = async {
            wait_for_calls(&fake, 1).await;
            service.search_games("zelda").await;
            let _ = release.send(());
        };
        tokio::join!(service.search_games("zelda"), second);

        assert_eq!(fake.calls().len(), 1);
        assert_eq!(service.snapshot().games.len(), 4);
    }

    #[tokio::test]
    async fn filters_combine_and_rewind_paging() {
        let (service, fake) = service_with(FakeCatalog::new().with_pages("", &[PAGE_SIZE, PAGE_SIZE]));
        service.refresh().await;
        service.load_more().await;
        assert_eq!(service.snapshot().page, 2);

        service.select_genre(Some(4)).await;
        service.select_platform(Some(187)).await;

        let snapshot = service.snapshot();
        assert_eq!(snapshot.page, 1);
        assert_eq!(snapshot.selected_genre, Some(4));
        assert_eq!(snapshot.selected_platform, Some(187));
        let last = fake.calls().pop().expect("a request was made");
        assert_eq!(last.genre, Some(4));
        assert_eq!(last.platform, Some(187));
        assert_eq!(last.page, 1);
    }

    #[tokio::test]
    async fn failure_is_recorded_and_retry_recovers() {
        let (service, fake) = service_with(FakeCatalog::new().with_pages("", &[PAGE_SIZE, 2]));
        service.refresh().await;

        fake.fail_next();
        service.load_more().await;
        let snapshot = service.snapshot();
        assert_eq!(snapshot.games.len(), PAGE_SIZE);
        assert!(snapshot.has_more);
        assert!(matches!(snapshot.error, Some(CatalogError::NetworkFailure(_))));

        service.retry().await;
        let snapshot = service.snapshot();
        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.games.len(), PAGE_SIZE + 2);
        assert_eq!(fake.calls().last().map(|q| q.page), Some(2));
    }

    #[tokio::test]
    async fn failed_first_page_retries_first_page() {
        let (service, fake) = service_with(FakeCatalog::new().with_pages("doom", &[7]));
        fake.fail_next();
        service.search_games("doom").await;
        assert!(service.snapshot().error.is_some());
        assert!(service.snapshot().games.is_empty());

        service.retry().await;
        assert_eq!(service.snapshot().games.len(), 7);
    }

    #[tokio::test]
    async fn dropped_request_releases_loading() {
        let (service, fake) = service_with(FakeCatalog::new().with_pages("hang", &[1]));
        let _gate = fake.gate("hang");

        tokio::select! {
            biased;
            _ = service.search_games("hang") => panic!("request should still be pending"),
            _ = wait_for_calls(&fake, 1) => {}
        }
        assert!(!service.snapshot().loading);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn spawned_fetches_keep_intent_order() {
        let (service, fake) = service_with(FakeCatalog::new().with_pages("", &[2]));

        for round in 0..500 {
            let mut handles = Vec::new();
            for genre in [4, 7] {
                if let Some(ticket) = service.begin_genre(Some(genre)) {
                    let service = service.clone();
                    handles.push(tokio::spawn(async move { service.fetch(ticket).await }));
                }
            }
            for handle in handles {
                handle.await.expect("fetch task panicked");
            }

            let snapshot = service.snapshot();
            assert_eq!(snapshot.selected_genre, Some(7), "round {round}");
            assert!(!snapshot.loading, "round {round}");
            assert_eq!(snapshot.games.len(), 2, "round {round}");
        }
        assert_eq!(fake.calls().len(), 1000);
    }

    #[tokio::test]
    async fn begin_applies_intent_before_any_fetch_runs() {
        let (service, fake) = service_with(FakeCatalog::new().with_pages("", &[PAGE_SIZE]));
        let older = service.begin_platform(Some(4)).expect("first change issues a request");
        let newer = service.begin_platform(Some(187)).expect("second change issues a request");
        assert_eq!(service.snapshot().selected_platform, Some(187));

        service.fetch(newer).await;
        service.fetch(older).await;

        let snapshot = service.snapshot();
        assert_eq!(snapshot.selected_platform, Some(187));
        assert_eq!(snapshot.games.len(), PAGE_SIZE);
        assert!(service.begin_retry().is_some());
        assert_eq!(fake.calls().len(), 2);
    }

    #[tokio::test]
    async fn bootstrap_loads_taxonomy_and_first_page() {
        let genres = vec![Genre { id: 4, name: "Action".into() }];
        let platforms = vec![Platform {
            id: 4,
            name: "PC".into(),
            slug: "pc".into(),
        }];
        let (service, _fake) = service_with(
            FakeCatalog::new()
                .with_pages("", &[PAGE_SIZE])
                .with_taxonomy(genres.clone(), platforms.clone()),
        );

        service.bootstrap().await;
        let snapshot = service.snapshot();
        assert_eq!(snapshot.genres, genres);
        assert_eq!(snapshot.platforms, platforms);
        assert_eq!(snapshot.games.len(), PAGE_SIZE);
    }

    #[tokio::test]
    async fn taxonomy_failure_is_not_fatal() {
        let (service, _fake) = service_with(
            FakeCatalog::new()
                .with_pages("", &[2])
                .failing_taxonomy(),
        );
        service.bootstrap().await;
        let snapshot = service.snapshot();
        assert!(snapshot.genres.is_empty());
        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.games.len(), 2);
    }

    #[tokio::test]
    async fn detail_lookup_reports_missing_games() {
        let (service, _fake) = service_with(FakeCatalog::new().with_detail(game(3498, "GTA V")));
        service.refresh().await;
        let before = service.snapshot();

        let found = service.get_game_details(3498).await;
        assert_eq!(found.map(|g| g.name), Ok("GTA V".to_string()));
        assert_eq!(
            service.get_game_details(1).await,
            Err(CatalogError::NotFound(1))
        );
        assert_eq!(service.snapshot(), before);
    }

    #[tokio::test]
    async fn detail_for_torn_down_view_is_dropped() {
        let (service, _fake) = service_with(FakeCatalog::new().with_detail(game(9, "Braid")));
        let tracker = DetailTracker::new();

        let live = tracker.issue();
        assert!(matches!(service.load_detail(&live, 9).await, Some(Ok(_))));

        let ticket = tracker.issue();
        tracker.teardown();
        assert!(service.load_detail(&ticket, 9).await.is_none());
    }

    #[tokio::test]
    async fn library_ignores_catalog_results() {
        let (service, _fake) = service_with(FakeCatalog::new().with_pages("", &[3]));
        service.refresh().await;
        assert!(service.library().is_empty());

        let record = service.snapshot().games[0].clone();
        assert!(service.add_to_library(record.clone(), LibraryCategory::Wishlist));
        assert!(!service.remove_from_library(record.id, LibraryCategory::Collection));
        assert_eq!(
            service.library_category(LibraryCategory::Wishlist),
            [record.clone()]
        );
        assert!(service.remove_from_library(record.id, LibraryCategory::Wishlist));
        assert!(!service.remove_from_library(record.id, LibraryCategory::Completed));
    }
}
