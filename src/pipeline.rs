use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::client::ServiceClient;
use crate::config::ScraperConfig;
use crate::data_models::{FetchOutcome, JobRecord, ListingId, SearchRequest, SkipReason};
use crate::detail::DetailFetcher;
use crate::enumerator::{Enumeration, Enumerator, StopReason};
use crate::error::Result;
use crate::extractor::SelectorTable;
use crate::pacer::Pacer;
use crate::progress::{OutcomeTally, ProgressEvent, ProgressObserver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunSummary {
    /// The search answered but listed no ids.
    NoResults,
    /// The first search page failed, so no ids were ever listed.
    SearchFailed,
    Complete,
    /// Some items were skipped or the run was interrupted.
    Partial,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    /// Successful records in enumeration order.
    pub records: Vec<JobRecord>,
    pub enumeration: Enumeration,
    pub attempted: usize,
    pub skipped: Vec<(ListingId, SkipReason)>,
    pub tally: OutcomeTally,
    pub interrupted: bool,
}

impl RunReport {
    pub fn succeeded(&self) -> usize {
        self.records.len()
    }

    pub fn summary(&self) -> RunSummary {
        if self.enumeration.ids.is_empty() && !self.interrupted {
            match self.enumeration.stop {
                StopReason::Transport { .. } => RunSummary::SearchFailed,
                _ => RunSummary::NoResults,
            }
        } else if self.interrupted || !self.skipped.is_empty() {
            RunSummary::Partial
        } else {
            RunSummary::Complete
        }
    }
}

/// One enumerate-then-fetch pass. Each pipeline owns its own pacer, so
/// separate pipelines never share a throttle budget.
pub struct Pipeline {
    enumerator: Enumerator,
    fetcher: DetailFetcher,
}

impl Pipeline {
    pub fn new(config: &ScraperConfig) -> Result<Pipeline> {
        Pipeline::with_selectors(config, SelectorTable::standard()?)
    }

    pub fn with_selectors(config: &ScraperConfig, table: SelectorTable) -> Result<Pipeline> {
        let pacer = Arc::new(Pacer::new());
        let client = ServiceClient::new(config, pacer)?;
        Ok(Pipeline {
            enumerator: Enumerator::new(client.clone(), config.search_delay)?,
            fetcher: DetailFetcher::new(client, config.detail_delay, table)?,
        })
    }

    pub fn enumerator(&self) -> &Enumerator {
        &self.enumerator
    }

    pub fn fetcher(&self) -> &DetailFetcher {
        &self.fetcher
    }

    pub async fn run(&self, request: &SearchRequest, observer: &dyn ProgressObserver) -> RunReport {
        self.run_until(request, observer, &CancellationToken::new())
            .await
    }

    /// Like [`Pipeline::run`], but stops between items once `cancel` fires
    /// and returns what was gathered so far.
    pub async fn run_until(
        &self,
        request: &SearchRequest,
        observer: &dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> RunReport {
        let enumeration = self
            .enumerator
            .enumerate_until(request, observer, cancel)
            .await;

        let total = enumeration.ids.len();
        let mut records = Vec::with_capacity(total);
        let mut skipped = Vec::new();
        let mut tally = OutcomeTally::default();
        let mut attempted = 0;
        let mut interrupted = cancel.is_cancelled();

        for (offset, id) in enumeration.ids.iter().enumerate() {
            if interrupted {
                break;
            }
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    interrupted = true;
                    break;
                }
                outcome = self.fetcher.fetch_detail(id) => outcome,
            };
            attempted += 1;
            tally.record(&outcome);

            observer.on_event(&ProgressEvent::ItemFetched {
                index: offset + 1,
                total,
                id: id.clone(),
                outcome: outcome.clone(),
            });

            match outcome {
                FetchOutcome::Success(record) => records.push(record),
                FetchOutcome::Skipped(reason) => skipped.push((id.clone(), reason)),
            }
        }

        observer.on_event(&ProgressEvent::RunFinished {
            attempted,
            succeeded: records.len(),
            skipped: skipped.len(),
            interrupted,
        });

        RunReport {
            records,
            enumeration,
            attempted,
            skipped,
            tally,
            interrupted,
        }
    }
}
