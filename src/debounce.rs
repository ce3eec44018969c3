//! Debounced catalog queries
//!
//! Coalesces rapid search-term changes for one open resolution item into a
//! single delayed, cancellable catalog call. Ordering guarantee: only the
//! result of the most recently issued term is ever delivered — last write
//! wins by term, not by completion time. A generation counter is checked
//! after the quiescence sleep and again after the I/O, so a stale in-flight
//! call whose term has since changed is dropped when it resolves.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::catalog::{CatalogClient, CatalogOption, LookupType, OptionId};
use crate::error::CatalogResult;

/// Input quiescence window before a search is issued.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Result of one debounced search, tagged with the term that produced it.
#[derive(Debug)]
pub struct SearchOutcome {
    pub term: String,
    pub result: CatalogResult<Vec<CatalogOption>>,
}

/// Coalesces a stream of term updates into at most one catalog search per
/// quiescence window. One controller per open resolution item.
pub struct DebouncedQueryController {
    client: Arc<dyn CatalogClient>,
    lookup_type: LookupType,
    parent: Option<OptionId>,
    delay: Duration,
    generation: Arc<AtomicU64>,
    pending: Option<JoinHandle<()>>,
    outcomes: mpsc::UnboundedSender<SearchOutcome>,
}

impl DebouncedQueryController {
    pub fn new(
        client: Arc<dyn CatalogClient>,
        lookup_type: LookupType,
    ) -> (Self, mpsc::UnboundedReceiver<SearchOutcome>) {
        Self::with_delay(client, lookup_type, DEFAULT_DEBOUNCE)
    }

    pub fn with_delay(
        client: Arc<dyn CatalogClient>,
        lookup_type: LookupType,
        delay: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SearchOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                client,
                lookup_type,
                parent: None,
                delay,
                generation: Arc::new(AtomicU64::new(0)),
                pending: None,
                outcomes: tx,
            },
            rx,
        )
    }

    /// Scope searches to a parent entity (the selected country, for cities).
    /// Changing the scope invalidates any pending or in-flight search.
    pub fn set_parent(&mut self, parent: Option<OptionId>) {
        self.invalidate();
        self.parent = parent;
    }

    /// Record a new term. The search fires after the quiescence window unless
    /// a newer term arrives first.
    pub fn update_term(&mut self, term: impl Into<String>) {
        self.invalidate();

        let term = term.into();
        let generation = self.generation.load(Ordering::SeqCst);
        let client = Arc::clone(&self.client);
        let lookup_type = self.lookup_type;
        let parent = self.parent.clone();
        let delay = self.delay;
        let generations = Arc::clone(&self.generation);
        let outcomes = self.outcomes.clone();

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if generations.load(Ordering::SeqCst) != generation {
                return;
            }

            let result = client.search(lookup_type, &term, parent.as_ref()).await;

            // The term may have changed while the call was in flight.
            if generations.load(Ordering::SeqCst) != generation {
                tracing::debug!(%lookup_type, term, "dropping stale search result");
                return;
            }

            let _ = outcomes.send(SearchOutcome { term, result });
        }));
    }

    /// Cancel the pending timer and invalidate any in-flight call.
    /// Never rolls back the item's status; safe to call repeatedly.
    pub fn dispose(&mut self) {
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for DebouncedQueryController {
    fn drop(&mut self) {
        self.dispose();
    }
}
