//! Waiting helpers for asynchronous pipeline behavior

use quake_report::Event;
use std::time::Duration;
use tokio::sync::broadcast;

/// Outcome of waiting for the end of a load
#[derive(Debug)]
pub enum WaitResult {
    /// Records were applied
    Delivered(usize),
    /// An absence signal was applied
    Unavailable(String),
    /// Timeout waiting for the load
    Timeout,
    /// Channel closed unexpectedly
    ChannelClosed,
}

/// Wait until the pipeline applies a load result
pub async fn wait_for_outcome(
    events: &mut broadcast::Receiver<Event>,
    timeout: Duration,
) -> WaitResult {
    let result = tokio::time::timeout(timeout, async {
        loop {
            match events.recv().await {
                Ok(Event::LoadDelivered { records, .. }) => return WaitResult::Delivered(records),
                Ok(Event::LoadUnavailable { reason, .. }) => return WaitResult::Unavailable(reason),
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return WaitResult::ChannelClosed,
            }
        }
    })
    .await;

    result.unwrap_or(WaitResult::Timeout)
}

/// Poll `check` until it holds or `timeout` elapses
pub async fn wait_until<F>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    tokio::time::timeout(timeout, async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .is_ok()
}
