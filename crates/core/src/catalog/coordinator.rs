use tracing::{debug, warn};

use super::query::{QueryChange, QueryState, ResultSet, PAGE_SIZE};
use crate::{error::CatalogError, models::GameRecord};

/// Identifies one issued catalog request.
///
/// A ticket is current only while both its generation and its query match
/// the coordinator's live values; anything else is a stale result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    query: QueryState,
}

impl FetchTicket {
    /// Query the request was issued for.
    pub fn query(&self) -> &QueryState {
        &self.query
    }

    /// Monotonic request number.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// First page replaced the records.
    Replaced,
    /// A later page was appended.
    Appended,
    /// The request failed and the error was recorded.
    Failed,
    /// The query moved on while the request was outstanding.
    Stale,
}

/// Synchronous state machine behind catalog browsing.
///
/// It decides which request to issue for each intent and folds completed
/// requests back into the [`ResultSet`]. It never performs I/O itself.
#[derive(Debug, Default)]
pub struct FetchCoordinator {
    query: QueryState,
    results: ResultSet,
    generation: u64,
    in_flight: Option<FetchTicket>,
}

impl FetchCoordinator {
    /// Coordinator with the default (unfiltered) query and no records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Live query.
    pub fn query(&self) -> &QueryState {
        &self.query
    }

    /// Accumulated records and request status.
    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    /// Request currently awaited for the live query.
    pub fn in_flight(&self) -> Option<&FetchTicket> {
        self.in_flight.as_ref()
    }

    /// Apply a search or filter change and start over at page 1.
    ///
    /// Returns `None` when an identical query is already in flight.
    pub fn apply_change(&mut self, change: QueryChange) -> Option<FetchTicket> {
        let next = self.query.with_change(change);
        self.reset_to(next)
    }

    /// Re-request page 1 of the live query.
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        let next = QueryState {
            page: 1,
            ..self.query.clone()
        };
        self.reset_to(next)
    }

    /// Advance to the next page of the live query.
    ///
    /// Returns `None` while a request is outstanding or after a short page.
    pub fn next_page(&mut self) -> Option<FetchTicket> {
        if self.results.is_loading || !self.results.has_more {
            return None;
        }
        self.query.page += 1;
        Some(self.issue())
    }

    /// Fold the outcome of `ticket` into the result set.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        outcome: Result<Vec<GameRecord>, CatalogError>,
    ) -> FetchOutcome {
        if !self.is_current(ticket) {
            debug!(
                generation = ticket.generation,
                live = self.generation,
                "discarding stale catalog page"
            );
            return FetchOutcome::Stale;
        }

        self.in_flight = None;
        self.results.is_loading = false;

        match outcome {
            Ok(records) => {
                self.results.has_more = records.len() == PAGE_SIZE;
                self.results.last_error = None;
                if ticket.query.page == 1 {
                    self.results.records = records;
                    FetchOutcome::Replaced
                } else {
                    self.results.records.extend(records);
                    FetchOutcome::Appended
                }
            }
            Err(err) => {
                warn!(page = ticket.query.page, %err, "catalog page failed");
                self.rewind_failed_page();
                self.results.last_error = Some(err);
                FetchOutcome::Failed
            }
        }
    }

    /// Release a request that will never complete, e.g. a dropped future.
    ///
    /// Only the current request clears the loading flag. A late arrival for
    /// an abandoned ticket is always stale, whatever page it was for.
    pub fn abandon(&mut self, ticket: &FetchTicket) {
        if !self.is_current(ticket) {
            return;
        }
        debug!(generation = ticket.generation, "catalog request abandoned");
        self.in_flight = None;
        self.results.is_loading = false;
        self.rewind_failed_page();
        self.generation += 1;
    }

    fn reset_to(&mut self, next: QueryState) -> Option<FetchTicket> {
        if let Some(in_flight) = &self.in_flight {
            if in_flight.query == next {
                debug!(query = ?next, "coalescing with in-flight request");
                return None;
            }
        }
        self.query = next;
        self.results.records.clear();
        Some(self.issue())
    }

    fn issue(&mut self) -> FetchTicket {
        self.generation += 1;
        let ticket = FetchTicket {
            generation: self.generation,
            query: self.query.clone(),
        };
        self.in_flight = Some(ticket.clone());
        self.results.is_loading = true;
        ticket
    }

    fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.generation == self.generation && ticket.query == self.query
    }

    // A page that never arrived must be requested again by the next advance.
    fn rewind_failed_page(&mut self) {
        if self.query.page > 1 {
            self.query.page -= 1;
        }
    }
}
