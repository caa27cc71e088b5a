use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Hands out liveness tickets for a detail view.
///
/// Issuing a new ticket or tearing the view down invalidates every ticket
/// issued before, so a detail lookup that returns late is dropped instead
/// of being shown in the wrong place.
#[derive(Debug, Clone, Default)]
pub struct DetailTracker {
    current: Arc<AtomicU64>,
}

/// Proof that a detail lookup belongs to the view's latest request.
#[derive(Debug, Clone)]
pub struct DetailTicket {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl DetailTracker {
    /// Tracker with no outstanding tickets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding any earlier ticket.
    pub fn issue(&self) -> DetailTicket {
        let generation = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        DetailTicket {
            generation,
            current: Arc::clone(&self.current),
        }
    }

    /// Invalidate all outstanding tickets.
    pub fn teardown(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }
}

impl DetailTicket {
    /// Whether this ticket is still the view's latest request.
    pub fn is_live(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }

    /// Pass `value` through only if the ticket is still live.
    pub fn accept<T>(&self, value: T) -> Option<T> {
        self.is_live().then_some(value)
    }
}
