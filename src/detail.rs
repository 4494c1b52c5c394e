use reqwest::Url;

use crate::client::{ServiceClient, with_segment};
use crate::data_models::{FetchOutcome, JobRecord, ListingId, SkipReason};
use crate::error::{Result, ScrapeError};
use crate::extractor::{SelectorTable, extract_html};
use crate::pacer::PaceWindow;

pub const DETAIL_PATH: &str = "/jobs-guest/jobs/api/jobPosting";
pub const VIEW_PATH: &str = "/jobs/view";

pub struct DetailFetcher {
    client: ServiceClient,
    detail_endpoint: Url,
    view_endpoint: Url,
    window: PaceWindow,
    table: SelectorTable,
}

impl DetailFetcher {
    pub fn new(
        client: ServiceClient,
        window: PaceWindow,
        table: SelectorTable,
    ) -> Result<DetailFetcher> {
        Ok(DetailFetcher {
            detail_endpoint: client.endpoint(DETAIL_PATH)?,
            view_endpoint: client.endpoint(VIEW_PATH)?,
            client,
            window,
            table,
        })
    }

    pub fn detail_url(&self, id: &ListingId) -> Url {
        with_segment(&self.detail_endpoint, id.as_str())
    }

    /// Public posting URL stored on the record.
    pub fn posting_url(&self, id: &ListingId) -> Url {
        with_segment(&self.view_endpoint, id.as_str())
    }

    pub async fn fetch_detail(&self, id: &ListingId) -> FetchOutcome {
        let body = match self
            .client
            .get_text(self.detail_url(id), self.window, "detail")
            .await
        {
            Ok(body) => body,
            Err(err) => {
                let reason = classify(&err);
                tracing::debug!(%id, error = %err, ?reason, "detail fetch failed");
                return FetchOutcome::Skipped(reason);
            }
        };

        match self.record_from_document(id, &body) {
            Ok(record) => FetchOutcome::Success(record),
            Err(err) => {
                tracing::debug!(%id, error = %err, "detail document unusable");
                FetchOutcome::Skipped(SkipReason::ParseFailure)
            }
        }
    }

    /// Markup with none of the expected elements still yields a record; only
    /// a body that is not markup at all is rejected.
    pub fn record_from_document(&self, id: &ListingId, body: &str) -> Result<JobRecord> {
        if !looks_like_markup(body) {
            return Err(ScrapeError::parse("detail", "response body is not markup"));
        }
        let fields = extract_html(body, &self.table);
        Ok(fields.into_record(self.posting_url(id).to_string()))
    }
}

fn looks_like_markup(body: &str) -> bool {
    body.trim_start().starts_with('<')
}

fn classify(err: &ScrapeError) -> SkipReason {
    match err {
        ScrapeError::HttpStatus { status, .. } if *status == 404 || *status == 410 => {
            SkipReason::NotFound
        }
        ScrapeError::Parse { .. } => SkipReason::ParseFailure,
        _ => SkipReason::TransientError,
    }
}
