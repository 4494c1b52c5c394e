use tokio::sync::mpsc;

use crate::data_models::{FetchOutcome, ListingId, SkipReason};
use crate::enumerator::StopReason;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    PageFetched {
        start: usize,
        entries: usize,
        new_ids: usize,
        total_ids: usize,
    },
    MalformedEntry {
        start: usize,
        reason: String,
    },
    EnumerationFinished {
        ids: usize,
        pages: usize,
        stop: StopReason,
    },
    /// `index` is 1-based.
    ItemFetched {
        index: usize,
        total: usize,
        id: ListingId,
        outcome: FetchOutcome,
    },
    RunFinished {
        attempted: usize,
        succeeded: usize,
        skipped: usize,
        interrupted: bool,
    },
}

pub trait ProgressObserver: Send + Sync {
    fn on_event(&self, event: &ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_event(&self, event: &ProgressEvent) {
        self(event)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_event(&self, _event: &ProgressEvent) {}
}

/// Forwards every event to a receiver the caller drains on its own task.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelObserver {
    pub fn new() -> (ChannelObserver, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelObserver { tx }, rx)
    }
}

impl ProgressObserver for ChannelObserver {
    fn on_event(&self, event: &ProgressEvent) {
        // receiver gone means nobody is listening anymore
        let _ = self.tx.send(event.clone());
    }
}

/// Console-facing progress through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn on_event(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::PageFetched {
                start,
                entries,
                new_ids,
                total_ids,
            } => {
                tracing::info!(start, entries, new_ids, total_ids, "search page fetched");
            }
            ProgressEvent::MalformedEntry { start, reason } => {
                tracing::warn!(start, %reason, "skipping malformed listing entry");
            }
            ProgressEvent::EnumerationFinished { ids, pages, stop } => match stop {
                StopReason::Transport { message } => {
                    tracing::warn!(ids, pages, %message, "search stopped early");
                }
                _ => tracing::info!(ids, pages, ?stop, "search finished"),
            },
            ProgressEvent::ItemFetched {
                index,
                total,
                id,
                outcome,
            } => match outcome {
                FetchOutcome::Success(record) => tracing::info!(
                    "[{index}/{total}] {id}: {}",
                    record.title.as_deref().unwrap_or("Unknown Title")
                ),
                FetchOutcome::Skipped(reason) => {
                    tracing::warn!("[{index}/{total}] skipped {id}: {reason}")
                }
            },
            ProgressEvent::RunFinished {
                attempted,
                succeeded,
                skipped,
                interrupted,
            } => {
                tracing::info!(attempted, succeeded, skipped, interrupted, "run finished");
            }
        }
    }
}

/// Tally of per-item outcomes, fed from [`ProgressEvent::ItemFetched`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutcomeTally {
    pub succeeded: usize,
    pub not_found: usize,
    pub transient: usize,
    pub parse_failures: usize,
}

impl OutcomeTally {
    pub fn record(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Success(_) => self.succeeded += 1,
            FetchOutcome::Skipped(SkipReason::NotFound) => self.not_found += 1,
            FetchOutcome::Skipped(SkipReason::TransientError) => self.transient += 1,
            FetchOutcome::Skipped(SkipReason::ParseFailure) => self.parse_failures += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.not_found + self.transient + self.parse_failures
    }
}
