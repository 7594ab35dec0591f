//! Background loading of the earthquake feed.
//!
//! A [`LoadCoordinator`] is one load slot. `start` dispatches a fetch-then-parse
//! attempt to a tokio worker task and returns immediately; the owner later
//! awaits [`LoadCoordinator::next_delivery`] on its own task to receive the
//! result. Crossing back happens over a completion channel, so the presenter is
//! never touched from a worker.
//!
//! Every start takes a new [`Generation`]. Starting again while a load is in
//! flight supersedes it: the old completion is dropped when it arrives.
//! [`LoadCoordinator::cancel`] withdraws a load without starting another. After
//! [`LoadCoordinator::reset`] nothing is ever delivered and the coordinator
//! cannot be restarted.

use crate::error::{Error, Result};
use crate::feed::{FeedSource, LoadRequest, parse_feed};
use crate::types::{Event, Generation, LoadResult, UnavailableKind};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Reason reported when a worker dies without producing a result
pub const WORKER_FAILED_MESSAGE: &str = "Problem retrieving earthquake data.";

/// Lifecycle state of a [`LoadCoordinator`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing started yet
    Idle,
    /// A load is in flight
    Running(Generation),
    /// The last load was delivered to the owner
    Delivered(Generation),
    /// The last load was withdrawn before delivery
    Cancelled(Generation),
    /// Torn down; terminal
    Reset,
}

/// A load result handed to the owner
#[derive(Clone, Debug, PartialEq)]
pub struct Delivery {
    /// Generation of the load that produced the result
    pub generation: Generation,
    /// The outcome
    pub result: LoadResult,
}

struct Completion {
    generation: Generation,
    result: LoadResult,
}

/// One load slot with supersession and reset
pub struct LoadCoordinator {
    source: Arc<dyn FeedSource>,
    event_tx: broadcast::Sender<Event>,
    state: LoadState,
    generation: Generation,
    cancel_token: Option<CancellationToken>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
}

impl LoadCoordinator {
    /// Create an idle coordinator that fetches through `source`
    pub fn new(source: Arc<dyn FeedSource>, event_tx: broadcast::Sender<Event>) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            source,
            event_tx,
            state: LoadState::Idle,
            generation: Generation::default(),
            cancel_token: None,
            completion_tx,
            completion_rx,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Whether a load is in flight
    pub fn is_running(&self) -> bool {
        matches!(self.state, LoadState::Running(_))
    }

    /// Dispatch a load for `request` to a worker task.
    ///
    /// Returns immediately with the new load's generation. A load already in
    /// flight is superseded and its result will not be delivered.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LoaderReset`] if the coordinator has been reset.
    pub fn start(&mut self, request: LoadRequest) -> Result<Generation> {
        if self.state == LoadState::Reset {
            return Err(Error::LoaderReset);
        }

        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        if let LoadState::Running(previous) = self.state {
            debug!(generation = %previous, "Superseding in-flight load");
        }

        let generation = self.generation.next();
        self.generation = generation;
        self.state = LoadState::Running(generation);

        let token = CancellationToken::new();
        self.cancel_token = Some(token.clone());

        info!(generation = %generation, url = %request, "Starting earthquake load");
        let _ = self.event_tx.send(Event::LoadStarted {
            generation,
            url: request.to_string(),
        });

        let source = Arc::clone(&self.source);
        let completion_tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let worker =
                tokio::spawn(async move { run_load(source.as_ref(), &request, &token).await });

            let result = match worker.await {
                Ok(result) => result,
                Err(e) => {
                    error!(generation = %generation, error = %e, "Earthquake load task panicked");
                    Some(LoadResult::unavailable(
                        UnavailableKind::Transport,
                        WORKER_FAILED_MESSAGE,
                    ))
                }
            };

            if let Some(result) = result {
                // The receiver is closed after a reset; the result is dropped
                let _ = completion_tx.send(Completion { generation, result });
            }
        });

        Ok(generation)
    }

    /// Wait for the current load's result.
    ///
    /// Returns `None` immediately when nothing is in flight or the coordinator
    /// has been reset. Results of superseded loads are discarded while waiting.
    /// Each load is delivered at most once.
    ///
    /// Cancel-safe: dropping the future before it completes loses nothing.
    pub async fn next_delivery(&mut self) -> Option<Delivery> {
        loop {
            let LoadState::Running(current) = self.state else {
                return None;
            };

            let completion = self.completion_rx.recv().await?;
            if completion.generation != current {
                debug!(
                    generation = %completion.generation,
                    current = %current,
                    "Discarding stale load result"
                );
                let _ = self.event_tx.send(Event::LoadDiscarded {
                    generation: completion.generation,
                });
                continue;
            }

            self.state = LoadState::Delivered(current);
            self.cancel_token = None;
            return Some(Delivery {
                generation: current,
                result: completion.result,
            });
        }
    }

    /// Withdraw the in-flight load without tearing the coordinator down.
    ///
    /// Its result is discarded when it arrives and `start` keeps working.
    /// Returns the withdrawn generation, or `None` when nothing was running.
    pub fn cancel(&mut self) -> Option<Generation> {
        let LoadState::Running(current) = self.state else {
            return None;
        };
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        debug!(generation = %current, "Load withdrawn before delivery");
        self.state = LoadState::Cancelled(current);
        Some(current)
    }

    /// Tear the coordinator down.
    ///
    /// In-flight work is not interrupted, but its result is never delivered.
    pub fn reset(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        self.completion_rx.close();
        if self.state != LoadState::Reset {
            debug!(generation = %self.generation, "Load coordinator reset");
        }
        self.state = LoadState::Reset;
    }
}

impl Drop for LoadCoordinator {
    fn drop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
    }
}

/// Fetch then parse. Returns `None` when cancelled between the two steps.
async fn run_load(
    source: &dyn FeedSource,
    request: &LoadRequest,
    token: &CancellationToken,
) -> Option<LoadResult> {
    let bytes = match source.fetch(request).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(source = source.name(), error = %e, "Earthquake feed fetch failed");
            return Some(LoadResult::unavailable(
                UnavailableKind::Transport,
                e.user_message(),
            ));
        }
    };

    if token.is_cancelled() {
        debug!(url = %request, "Load cancelled after fetch, skipping parse");
        return None;
    }

    match parse_feed(&bytes) {
        Ok(records) => Some(LoadResult::Records(records)),
        Err(e) => {
            warn!(error = %e, url = %request, "Earthquake feed could not be parsed");
            Some(LoadResult::unavailable(
                UnavailableKind::Parse,
                e.user_message(),
            ))
        }
    }
}
