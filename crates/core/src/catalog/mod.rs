//! Remote catalog access and browsing orchestration.

/// Remote catalog client trait and HTTP implementation.
pub mod client;
/// Request/response state machine for paged catalog queries.
pub mod coordinator;
/// Liveness tickets for detail views.
pub mod detail;
/// Query parameters and accumulated results.
pub mod query;
/// Async service shared with the UI.
pub mod service;

pub use client::{CatalogClient, RawgClient};
pub use coordinator::{FetchCoordinator, FetchOutcome, FetchTicket};
pub use detail::{DetailTicket, DetailTracker};
pub use query::{QueryChange, QueryState, ResultSet, PAGE_SIZE};
pub use service::{CatalogService, CatalogSnapshot};
