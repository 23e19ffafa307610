use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use shared::{domain::Hero, protocol::ResponseEnvelope};
use tokio::{
    sync::{broadcast, mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

pub mod config;
pub mod error;
pub mod pipeline;
pub mod transport;
pub mod types;

pub use config::ControllerConfig;
pub use error::{ConfigError, QueryError, TransportError};
pub use transport::{CatalogTransport, HttpTransport, MissingTransport};
pub use types::{total_pages, FetchStats, QueryParams, QueryState};

use pipeline::{Debouncer, DistinctGate};
use types::PARAM_API_KEY;

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    StateChanged(QueryState),
    FetchStarted {
        request_id: u64,
        state: QueryState,
        params: QueryParams,
    },
    ResponseApplied {
        request_id: u64,
        state: QueryState,
        response: Arc<ResponseEnvelope>,
    },
    FetchFailed(FetchFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub request_id: u64,
    pub state: QueryState,
    pub message: String,
}

#[derive(Default)]
struct FetchCounters {
    requests_issued: AtomicU64,
    responses_applied: AtomicU64,
    responses_discarded: AtomicU64,
    failures: AtomicU64,
    duplicates_dropped: AtomicU64,
}

impl FetchCounters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> FetchStats {
        FetchStats {
            requests_issued: self.requests_issued.load(Ordering::Relaxed),
            responses_applied: self.responses_applied.load(Ordering::Relaxed),
            responses_discarded: self.responses_discarded.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            duplicates_dropped: self.duplicates_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Owns the query state for one paged catalog view and turns every change into
/// at most one request whose response becomes the current page.
///
/// Must be constructed inside a tokio runtime; the fetch pipeline runs on a
/// task spawned by [`QueryController::new`] and stops when the controller is
/// dropped.
pub struct QueryController {
    allowed_page_sizes: Vec<u32>,
    state: watch::Sender<QueryState>,
    response: watch::Receiver<Option<Arc<ResponseEnvelope>>>,
    events: broadcast::Sender<ControllerEvent>,
    stats: Arc<FetchCounters>,
    worker: JoinHandle<()>,
}

impl QueryController {
    pub fn new(
        config: ControllerConfig,
        transport: Arc<dyn CatalogTransport>,
    ) -> Result<Self, ConfigError> {
        let initial_page_size = config.validate()?;
        let (state, state_rx) = watch::channel(QueryState::new(initial_page_size));
        let (response_tx, response) = watch::channel(None);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let stats = Arc::new(FetchCounters::default());
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();

        let worker = FetchWorker {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            transport,
            state_rx,
            response_tx,
            events: events.clone(),
            stats: Arc::clone(&stats),
            debouncer: Debouncer::new(config.debounce),
            gate: DistinctGate::default(),
            latest_request: 0,
            outcomes_tx,
            outcomes_rx,
        };
        info!(
            url = %config.base_url,
            debounce_ms = config.debounce.as_millis() as u64,
            page_size = initial_page_size,
            "catalog: starting query controller"
        );
        let worker = tokio::spawn(worker.run());

        Ok(Self {
            allowed_page_sizes: config.allowed_page_sizes,
            state,
            response,
            events,
            stats,
            worker,
        })
    }

    pub fn with_http_transport(config: ControllerConfig) -> Result<Self, ConfigError> {
        Self::new(config, Arc::new(HttpTransport::new()))
    }

    pub fn set_search(&self, search: impl Into<String>) {
        let search = search.into();
        self.replace_state(|state| state.with_search(search));
    }

    /// Moves by `delta` pages without bounds checks; keeping the result inside
    /// `0..total_pages` is up to the caller.
    pub fn move_page(&self, delta: i64) {
        self.replace_state(|state| state.moved_by(delta));
    }

    pub fn set_page_size(&self, page_size: u32) -> Result<(), QueryError> {
        if !self.allowed_page_sizes.contains(&page_size) {
            warn!(
                requested = page_size,
                allowed = ?self.allowed_page_sizes,
                "catalog: rejected page size"
            );
            return Err(QueryError::InvalidPageSize {
                requested: page_size,
                allowed: self.allowed_page_sizes.clone(),
            });
        }
        self.replace_state(|state| state.with_page_size(page_size));
        Ok(())
    }

    fn replace_state(&self, transition: impl FnOnce(&QueryState) -> QueryState) {
        let mut next = None;
        self.state.send_modify(|state| {
            *state = transition(state);
            next = Some(state.clone());
        });
        if let Some(next) = next {
            debug!(
                search = %next.search,
                page = next.page,
                page_size = next.page_size,
                "catalog: query state replaced"
            );
            let _ = self.events.send(ControllerEvent::StateChanged(next));
        }
    }

    pub fn state(&self) -> QueryState {
        self.state.borrow().clone()
    }

    pub fn search(&self) -> String {
        self.state.borrow().search.clone()
    }

    pub fn page(&self) -> i64 {
        self.state.borrow().page
    }

    pub fn display_page(&self) -> i64 {
        self.state.borrow().display_page()
    }

    pub fn page_size(&self) -> u32 {
        self.state.borrow().page_size
    }

    pub fn allowed_page_sizes(&self) -> &[u32] {
        &self.allowed_page_sizes
    }

    pub fn latest_response(&self) -> Option<Arc<ResponseEnvelope>> {
        self.response.borrow().clone()
    }

    pub fn items(&self) -> Option<Vec<Hero>> {
        self.response
            .borrow()
            .as_ref()
            .map(|response| response.data.results.clone())
    }

    pub fn total_count(&self) -> Option<u64> {
        self.response
            .borrow()
            .as_ref()
            .map(|response| response.data.total)
    }

    /// Uses the current page size even if the latest response was fetched
    /// with a different one.
    pub fn total_pages(&self) -> Option<u64> {
        self.total_count()
            .map(|total| total_pages(total, self.page_size()))
    }

    pub fn fetch_stats(&self) -> FetchStats {
        self.stats.snapshot()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<QueryState> {
        self.state.subscribe()
    }

    pub fn subscribe_response(&self) -> watch::Receiver<Option<Arc<ResponseEnvelope>>> {
        self.response.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }
}

impl Drop for QueryController {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

struct FetchOutcome {
    request_id: u64,
    state: QueryState,
    result: Result<ResponseEnvelope, TransportError>,
}

/// Single writer of the current response. State changes, quiet-window expiry
/// and transport outcomes are all handled on this one task.
struct FetchWorker {
    base_url: String,
    api_key: Option<String>,
    transport: Arc<dyn CatalogTransport>,
    state_rx: watch::Receiver<QueryState>,
    response_tx: watch::Sender<Option<Arc<ResponseEnvelope>>>,
    events: broadcast::Sender<ControllerEvent>,
    stats: Arc<FetchCounters>,
    debouncer: Debouncer,
    gate: DistinctGate<QueryState>,
    latest_request: u64,
    outcomes_tx: mpsc::UnboundedSender<FetchOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<FetchOutcome>,
}

impl FetchWorker {
    async fn run(mut self) {
        // The initial snapshot goes through the same quiet window.
        self.debouncer.touch();
        loop {
            tokio::select! {
                changed = self.state_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.debouncer.touch();
                }
                _ = self.debouncer.elapsed() => self.on_quiet_window(),
                Some(outcome) = self.outcomes_rx.recv() => self.apply(outcome),
            }
        }
        debug!("catalog: query controller stopped");
    }

    fn on_quiet_window(&mut self) {
        self.debouncer.clear();
        if self.state_rx.has_changed().unwrap_or(false) {
            // A newer snapshot landed after the window closed; it gets its own.
            self.state_rx.borrow_and_update();
            self.debouncer.touch();
            return;
        }

        let state = self.state_rx.borrow().clone();
        if !self.gate.admit(&state) {
            FetchCounters::bump(&self.stats.duplicates_dropped);
            debug!(
                search = %state.search,
                page = state.page,
                page_size = state.page_size,
                "catalog: snapshot unchanged since last request, skipping"
            );
            return;
        }
        self.dispatch(state);
    }

    fn dispatch(&mut self, state: QueryState) {
        self.latest_request += 1;
        let request_id = self.latest_request;

        let mut params = state.to_params();
        if let Some(api_key) = &self.api_key {
            params.insert(PARAM_API_KEY, api_key.clone());
        }

        FetchCounters::bump(&self.stats.requests_issued);
        info!(
            request_id,
            search = %state.search,
            page = state.page,
            page_size = state.page_size,
            "catalog: issuing request"
        );
        let _ = self.events.send(ControllerEvent::FetchStarted {
            request_id,
            state: state.clone(),
            params: params.redacted(),
        });

        let transport = Arc::clone(&self.transport);
        let base_url = self.base_url.clone();
        let outcomes = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let result = transport.fetch(&base_url, &params).await;
            let _ = outcomes.send(FetchOutcome {
                request_id,
                state,
                result,
            });
        });
    }

    fn apply(&mut self, outcome: FetchOutcome) {
        let FetchOutcome {
            request_id,
            state,
            result,
        } = outcome;

        if request_id != self.latest_request {
            FetchCounters::bump(&self.stats.responses_discarded);
            debug!(
                request_id,
                latest_request = self.latest_request,
                ok = result.is_ok(),
                "catalog: discarding superseded response"
            );
            return;
        }

        match result {
            Ok(envelope) => {
                let response = Arc::new(envelope);
                self.response_tx.send_replace(Some(Arc::clone(&response)));
                FetchCounters::bump(&self.stats.responses_applied);
                info!(
                    request_id,
                    total = response.data.total,
                    count = response.data.results.len(),
                    "catalog: response applied"
                );
                let _ = self.events.send(ControllerEvent::ResponseApplied {
                    request_id,
                    state,
                    response,
                });
            }
            Err(err) => {
                FetchCounters::bump(&self.stats.failures);
                warn!(request_id, error = %err, "catalog: fetch failed");
                let _ = self.events.send(ControllerEvent::FetchFailed(FetchFailure {
                    request_id,
                    state,
                    message: err.to_string(),
                }));
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
