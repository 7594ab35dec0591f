//! Pipeline controller: the entry point for screen activation and settings changes.
//!
//! The controller decides whether to load at all (connectivity), builds the
//! request from the user's preferences, owns the single load slot, and applies
//! delivered results to the [`Presenter`]. It lives on one owner task; the only
//! work that leaves that task is the fetch and parse inside the loader.

mod traits;

pub use traits::{
    ConnectivityProbe, InMemoryPreferences, PREF_MIN_MAGNITUDE, PREF_ORDER_BY, PreferenceStore,
    Presenter,
};

use crate::config::{Config, FailurePolicy};
use crate::error::Result;
use crate::feed::{FeedSource, HttpFeedClient, LoadRequest};
use crate::loader::{Delivery, LoadCoordinator};
use crate::types::{Event, Generation, LoadResult, Record, UnavailableKind};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

/// Empty-state text when the device is offline
pub const NO_CONNECTION_MESSAGE: &str = "No internet connection";

/// Empty-state text when the server reported zero events
pub const NO_EARTHQUAKES_MESSAGE: &str = "No earthquakes found.";

/// Empty-state text when the request URL cannot be built
pub const INVALID_REQUEST_MESSAGE: &str = "The earthquake feed is not configured correctly.";

/// Commands accepted by [`PipelineController::run`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Screen activated or settings changed
    Refresh,
    /// Screen torn down
    Reset,
    /// Leave the event loop
    Shutdown,
}

enum Step {
    Command(Option<Command>),
    Delivery(Option<Delivery>),
}

/// Coordinates connectivity, preferences, the loader and the presenter
pub struct PipelineController {
    config: Arc<Config>,
    source: Arc<dyn FeedSource>,
    preferences: Arc<dyn PreferenceStore>,
    connectivity: Arc<dyn ConnectivityProbe>,
    presenter: Box<dyn Presenter>,
    loader: Option<LoadCoordinator>,
    visible: Vec<Record>,
    event_tx: broadcast::Sender<Event>,
}

impl PipelineController {
    /// Create a controller that fetches through `source`
    pub fn new(
        config: Config,
        source: Arc<dyn FeedSource>,
        preferences: Arc<dyn PreferenceStore>,
        connectivity: Arc<dyn ConnectivityProbe>,
        presenter: Box<dyn Presenter>,
    ) -> Self {
        let (event_tx, _rx) = broadcast::channel(config.event_buffer.max(1));
        Self {
            config: Arc::new(config),
            source,
            preferences,
            connectivity,
            presenter,
            loader: None,
            visible: Vec::new(),
            event_tx,
        }
    }

    /// Create a controller that fetches over HTTP
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the HTTP client cannot be created
    pub fn with_http(
        config: Config,
        preferences: Arc<dyn PreferenceStore>,
        connectivity: Arc<dyn ConnectivityProbe>,
        presenter: Box<dyn Presenter>,
    ) -> Result<Self> {
        config.validate()?;
        let source = Arc::new(HttpFeedClient::new(&config.feed)?);
        Ok(Self::new(config, source, preferences, connectivity, presenter))
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Records currently shown by the presenter
    pub fn visible(&self) -> &[Record] {
        &self.visible
    }

    /// Whether a load is in flight
    pub fn is_loading(&self) -> bool {
        self.loader.as_ref().is_some_and(LoadCoordinator::is_running)
    }

    /// Start (or restart) a load with the current preferences.
    ///
    /// Without connectivity no load is started and the "no connection" reason is
    /// applied immediately. A load still in flight is withdrawn whenever a new
    /// one cannot start, since it was built from settings that no longer apply.
    /// Must be called from within a tokio runtime.
    pub fn refresh(&mut self) {
        if !self.connectivity.is_connected() {
            info!("No network connectivity, not loading earthquakes");
            self.withdraw_in_flight();
            self.apply(
                None,
                &LoadResult::unavailable(UnavailableKind::NoConnection, NO_CONNECTION_MESSAGE),
            );
            return;
        }

        let min_magnitude = self.preference(PREF_MIN_MAGNITUDE, &self.config.preferences.min_magnitude);
        let order_by = self.preference(PREF_ORDER_BY, &self.config.preferences.order_by);

        let request = match LoadRequest::build(&self.config.feed.endpoint, &min_magnitude, &order_by) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Could not build earthquake feed request");
                self.withdraw_in_flight();
                self.apply(
                    None,
                    &LoadResult::unavailable(UnavailableKind::InvalidRequest, INVALID_REQUEST_MESSAGE),
                );
                return;
            }
        };

        let source = Arc::clone(&self.source);
        let event_tx = self.event_tx.clone();
        let started = self
            .loader
            .get_or_insert_with(|| LoadCoordinator::new(source, event_tx))
            .start(request);

        match started {
            Ok(generation) => {
                debug!(generation = %generation, %min_magnitude, %order_by, "Load dispatched");
                self.presenter.set_loading_visible(true);
            }
            Err(e) => {
                // The slot never holds a reset coordinator, see `reset`
                warn!(error = %e, "Could not start earthquake load");
                self.apply(
                    None,
                    &LoadResult::unavailable(UnavailableKind::InvalidRequest, e.to_string()),
                );
            }
        }
    }

    /// Wait for the in-flight load and apply its result to the presenter.
    ///
    /// Returns `None` when nothing is in flight.
    pub async fn await_delivery(&mut self) -> Option<Delivery> {
        let delivery = self.loader.as_mut()?.next_delivery().await?;
        self.apply(Some(delivery.generation), &delivery.result);
        Some(delivery)
    }

    /// Reset the loader and clear the visible list.
    ///
    /// A result still in flight is dropped. The next `refresh` uses a fresh loader.
    pub fn reset(&mut self) {
        if let Some(mut loader) = self.loader.take() {
            loader.reset();
        }
        self.visible.clear();
        self.presenter.set_list(&[]);
        self.presenter.set_loading_visible(false);
        info!("Earthquake pipeline reset");
        let _ = self.event_tx.send(Event::Reset);
    }

    /// Owner event loop.
    ///
    /// Handles commands and applies deliveries as they arrive. Returns the
    /// controller on `Shutdown` or when every command sender is dropped.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> Self {
        info!("Earthquake pipeline started");

        loop {
            let loading = self.is_loading();
            let step = tokio::select! {
                command = commands.recv() => Step::Command(command),
                delivery = next_delivery(&mut self.loader), if loading => Step::Delivery(delivery),
            };

            match step {
                Step::Command(Some(Command::Refresh)) => self.refresh(),
                Step::Command(Some(Command::Reset)) => self.reset(),
                Step::Command(Some(Command::Shutdown)) | Step::Command(None) => break,
                Step::Delivery(Some(delivery)) => {
                    self.apply(Some(delivery.generation), &delivery.result);
                }
                Step::Delivery(None) => {}
            }
        }

        info!("Earthquake pipeline stopped");
        self
    }

    fn withdraw_in_flight(&mut self) {
        if let Some(generation) = self.loader.as_mut().and_then(LoadCoordinator::cancel) {
            debug!(generation = %generation, "In-flight load superseded by refresh");
        }
    }

    fn preference(&self, key: &str, default: &str) -> String {
        self.preferences
            .get_string(key)
            .unwrap_or_else(|| default.to_string())
    }

    fn apply(&mut self, generation: Option<Generation>, result: &LoadResult) {
        self.presenter.set_loading_visible(false);

        match result {
            LoadResult::Records(records) => {
                self.visible = records.clone();
                self.presenter.set_list(&self.visible);
                if records.is_empty() {
                    self.presenter.set_empty_message(NO_EARTHQUAKES_MESSAGE);
                }
                info!(records = records.len(), "Earthquakes delivered");
                if let Some(generation) = generation {
                    let _ = self.event_tx.send(Event::LoadDelivered {
                        generation,
                        records: records.len(),
                    });
                }
            }
            LoadResult::Unavailable { kind, reason } => {
                if self.config.failure_policy == FailurePolicy::ClearList {
                    self.visible.clear();
                    self.presenter.set_list(&[]);
                }
                self.presenter.set_empty_message(reason);
                info!(?kind, %reason, "No earthquake data available");
                let _ = self.event_tx.send(Event::LoadUnavailable {
                    generation,
                    kind: *kind,
                    reason: reason.clone(),
                });
            }
        }
    }
}

async fn next_delivery(loader: &mut Option<LoadCoordinator>) -> Option<Delivery> {
    match loader {
        Some(loader) => loader.next_delivery().await,
        None => None,
    }
}
