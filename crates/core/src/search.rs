//! Keystroke debouncing for catalog search.

use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle, time::sleep};
use tracing::debug;

/// Turns a burst of search input changes into a single delayed commit.
///
/// Commits are delivered on the receiver returned by [`SearchDebouncer::new`].
/// At most one timer is armed at a time: every change aborts the previous
/// one. Must be driven from within a tokio runtime.
pub struct SearchDebouncer {
    delay: Duration,
    text: String,
    pending: Option<JoinHandle<()>>,
    commits: mpsc::UnboundedSender<String>,
}

impl SearchDebouncer {
    /// Create a debouncer with the given quiet period.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (commits, receiver) = mpsc::unbounded_channel();
        let debouncer = Self {
            delay,
            text: String::new(),
            pending: None,
            commits,
        };
        (debouncer, receiver)
    }

    /// Record the latest input and restart the quiet period.
    ///
    /// Blank input cancels any pending commit without scheduling a new one.
    pub fn on_input_changed(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cancel();
        if self.text.trim().is_empty() {
            return;
        }

        let delay = self.delay;
        let text = self.text.clone();
        let commits = self.commits.clone();
        self.pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            debug!(%text, "search input settled");
            let _ = commits.send(text);
        }));
    }

    /// Commit the current input immediately, skipping the quiet period.
    pub fn submit(&mut self) {
        self.cancel();
        let _ = self.commits.send(self.text.clone());
    }

    /// Latest input text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether a commit is scheduled but has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
