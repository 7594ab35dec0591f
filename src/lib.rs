//! # quake-report
//!
//! Asynchronous load pipeline for a recent-earthquake list backed by the USGS
//! event feed.
//!
//! ## Design Philosophy
//!
//! quake-report is designed to be:
//! - **Non-blocking** - Fetch and parse run on worker tasks, never on the owner
//! - **Latest wins** - Restarting a load supersedes the one in flight
//! - **Library-first** - The display layer, settings and connectivity are traits
//! - **Event-driven** - Consumers can subscribe to load lifecycle events
//!
//! ## Quick Start
//!
//! ```no_run
//! use quake_report::controller::{ConnectivityProbe, InMemoryPreferences, Presenter};
//! use quake_report::{Command, Config, PipelineController, Record};
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//!
//! struct Online;
//! impl ConnectivityProbe for Online {
//!     fn is_connected(&self) -> bool {
//!         true
//!     }
//! }
//!
//! struct Stdout;
//! impl Presenter for Stdout {
//!     fn set_list(&mut self, records: &[Record]) {
//!         for record in records {
//!             println!("{:.1} {}", record.magnitude(), record.place());
//!         }
//!     }
//!     fn set_empty_message(&mut self, message: &str) {
//!         println!("{message}");
//!     }
//!     fn set_loading_visible(&mut self, _visible: bool) {}
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let controller = PipelineController::with_http(
//!         Config::default(),
//!         Arc::new(InMemoryPreferences::new()),
//!         Arc::new(Online),
//!         Box::new(Stdout),
//!     )?;
//!
//!     let (commands, rx) = mpsc::channel(8);
//!     commands.send(Command::Refresh).await?;
//!     quake_report::run_with_shutdown(controller, rx).await;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Pipeline controller and its collaborator traits
pub mod controller;
/// Error types
pub mod error;
/// Feed request building, fetching and parsing
pub mod feed;
/// Background load coordination
pub mod loader;
/// Core types and events
pub mod types;

// unwrap/expect are acceptable in test helpers for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use config::{Config, FailurePolicy, FeedConfig, PreferenceDefaults};
pub use controller::{Command, PipelineController};
pub use error::{Error, ParseError, Result, TransportError};
pub use feed::{FeedSource, HttpFeedClient, LoadRequest};
pub use loader::{Delivery, LoadCoordinator, LoadState};
pub use types::{Event, Generation, LoadResult, Record, UnavailableKind};

use tokio::sync::mpsc;
use tracing::{info, warn};

const FORWARD_BUFFER: usize = 16;

/// Run the controller's event loop until a termination signal arrives.
///
/// Commands from `commands` are forwarded to the loop. The loop also stops when
/// every sender of `commands` is dropped or a [`Command::Shutdown`] is sent.
/// Returns the controller so the caller can inspect or reset it.
///
/// Signals are SIGTERM (Unix only) and Ctrl+C.
pub async fn run_with_shutdown(
    controller: PipelineController,
    mut commands: mpsc::Receiver<Command>,
) -> PipelineController {
    let (forward_tx, forward_rx) = mpsc::channel(FORWARD_BUFFER);

    // Dropping `forward_tx` on signal closes the loop's command channel
    let forwarder = tokio::spawn(async move {
        tokio::select! {
            _ = wait_for_signal() => {}
            _ = async {
                while let Some(command) = commands.recv().await {
                    if forward_tx.send(command).await.is_err() {
                        break;
                    }
                }
            } => {}
        }
    });

    let controller = controller.run(forward_rx).await;
    forwarder.abort();
    controller
}

/// Resolve on SIGTERM (Unix) or Ctrl+C.
///
/// If no handler can be registered this never resolves, leaving shutdown to
/// the command channel.
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, stopping earthquake pipeline");
                        return;
                    }
                    result = tokio::signal::ctrl_c() => return on_ctrl_c(result).await,
                }
            }
            Err(e) => {
                warn!(error = %e, "Could not register SIGTERM handler, listening for Ctrl+C only");
            }
        }
    }

    on_ctrl_c(tokio::signal::ctrl_c().await).await;
}

async fn on_ctrl_c(result: std::io::Result<()>) {
    match result {
        Ok(()) => info!("Received Ctrl+C, stopping earthquake pipeline"),
        Err(e) => {
            warn!(error = %e, "Could not listen for Ctrl+C, relying on commands to stop");
            std::future::pending::<()>().await;
        }
    }
}
