use indexmap::IndexSet;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tokio_util::sync::CancellationToken;

use crate::client::ServiceClient;
use crate::data_models::{ListingId, SearchRequest};
use crate::error::{Result, ScrapeError};
use crate::pacer::PaceWindow;
use crate::progress::{ProgressEvent, ProgressObserver};

/// Fixed page size of the search endpoint.
pub const PAGE_SIZE: usize = 25;
pub const SEARCH_PATH: &str = "/jobs-guest/jobs/api/seeMoreJobPostings/search";
const URN_ATTR: &str = "data-entity-urn";
const POSTING_URN_PREFIX: &str = "urn:li:jobPosting:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    TargetReached,
    /// A page with no listing entries; the service exposes no other end marker.
    EmptyPage,
    /// The page request failed or came back non-2xx.
    Transport { message: String },
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumeration {
    /// Unique ids in first-seen order, never more than the target count.
    pub ids: Vec<ListingId>,
    pub stop: StopReason,
    pub pages_requested: usize,
    pub duplicates: usize,
    pub malformed_entries: usize,
}

/// Entries found on one search page, each either an id or the reason it
/// could not be read.
#[derive(Debug)]
pub struct ListingPage {
    pub entries: Vec<Result<ListingId>>,
}

impl ListingPage {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct ListingSelectors {
    entry: Selector,
    cards: Vec<Selector>,
}

impl ListingSelectors {
    pub fn new() -> Result<Self> {
        Ok(Self {
            entry: parse_selector("li")?,
            cards: vec![
                parse_selector("div.base-card[data-entity-urn]")?,
                parse_selector("[data-entity-urn]")?,
            ],
        })
    }

    fn card_urn<'a>(&self, entry: &ElementRef<'a>) -> Option<&'a str> {
        if let Some(urn) = entry.value().attr(URN_ATTR) {
            return Some(urn);
        }
        self.cards.iter().find_map(|selector| {
            entry
                .select(selector)
                .find_map(|card| card.value().attr(URN_ATTR))
        })
    }
}

fn parse_selector(raw: &str) -> Result<Selector> {
    Selector::parse(raw).map_err(|err| ScrapeError::Selector {
        selector: raw.to_string(),
        message: err.to_string(),
    })
}

pub fn parse_listing_page(html: &str, selectors: &ListingSelectors) -> ListingPage {
    let document = Html::parse_fragment(html);
    // lists nested inside a card (benefits, insights) are part of that card
    let entries = document
        .select(&selectors.entry)
        .filter(|entry| !has_entry_ancestor(entry))
        .map(|entry| match selectors.card_urn(&entry) {
            Some(urn) => listing_id_from_urn(urn),
            None => Err(ScrapeError::MalformedEntry(format!(
                "entry has no `{URN_ATTR}` card"
            ))),
        })
        .collect();
    ListingPage { entries }
}

fn has_entry_ancestor(entry: &ElementRef<'_>) -> bool {
    entry
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == "li")
}

/// `urn:li:jobPosting:<id>` → `<id>`. Other entity types are rejected.
pub fn listing_id_from_urn(urn: &str) -> Result<ListingId> {
    match urn.trim().strip_prefix(POSTING_URN_PREFIX).map(str::trim) {
        Some(id) if !id.is_empty() && !id.contains(':') => Ok(ListingId::new(id)),
        _ => Err(ScrapeError::MalformedEntry(format!(
            "unexpected entity urn `{urn}`"
        ))),
    }
}

pub struct Enumerator {
    client: ServiceClient,
    search_endpoint: Url,
    window: PaceWindow,
    selectors: ListingSelectors,
}

impl Enumerator {
    pub fn new(client: ServiceClient, window: PaceWindow) -> Result<Enumerator> {
        let search_endpoint = client.endpoint(SEARCH_PATH)?;
        Ok(Enumerator {
            client,
            search_endpoint,
            window,
            selectors: ListingSelectors::new()?,
        })
    }

    /// Search page URL for `start`. Unset filters are left out of the query.
    pub fn search_url(&self, request: &SearchRequest, start: usize) -> Url {
        let mut url = self.search_endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("keywords", request.title())
                .append_pair("location", request.location())
                .append_pair("start", &start.to_string());
            if let Some(token) = request.date_posted().wire_token() {
                query.append_pair("f_TPR", token);
            }
            if let Some(token) = request.experience_token() {
                query.append_pair("f_E", &token);
            }
        }
        url
    }

    pub async fn enumerate(
        &self,
        request: &SearchRequest,
        observer: &dyn ProgressObserver,
    ) -> Enumeration {
        self.enumerate_until(request, observer, &CancellationToken::new())
            .await
    }

    /// Walk search pages until the target is met, a page comes back empty,
    /// a request fails, or `cancel` fires between pages.
    pub async fn enumerate_until(
        &self,
        request: &SearchRequest,
        observer: &dyn ProgressObserver,
        cancel: &CancellationToken,
    ) -> Enumeration {
        let target = request.target_count();
        let mut collected: IndexSet<ListingId> = IndexSet::new();
        let mut start = 0;
        let mut pages_requested = 0;
        let mut duplicates = 0;
        let mut malformed_entries = 0;
        let mut stop = StopReason::TargetReached;

        while collected.len() < target {
            let url = self.search_url(request, start);

            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    stop = StopReason::Interrupted;
                    break;
                }
                fetched = self.client.get_text(url, self.window, "search_page") => fetched,
            };
            pages_requested += 1;

            let body = match fetched {
                Ok(body) => body,
                Err(err) => {
                    stop = StopReason::Transport {
                        message: err.to_string(),
                    };
                    break;
                }
            };

            let page = parse_listing_page(&body, &self.selectors);
            if page.is_empty() {
                stop = StopReason::EmptyPage;
                break;
            }

            let entries = page.entries.len();
            let before = collected.len();
            for entry in page.entries {
                match entry {
                    Ok(id) => {
                        if !collected.insert(id) {
                            duplicates += 1;
                        }
                    }
                    Err(err) => {
                        malformed_entries += 1;
                        observer.on_event(&ProgressEvent::MalformedEntry {
                            start,
                            reason: err.to_string(),
                        });
                    }
                }
                if collected.len() >= target {
                    break;
                }
            }

            observer.on_event(&ProgressEvent::PageFetched {
                start,
                entries,
                new_ids: collected.len() - before,
                total_ids: collected.len(),
            });
            start += PAGE_SIZE;
        }

        let mut ids: Vec<ListingId> = collected.into_iter().collect();
        ids.truncate(target);

        observer.on_event(&ProgressEvent::EnumerationFinished {
            ids: ids.len(),
            pages: pages_requested,
            stop: stop.clone(),
        });

        Enumeration {
            ids,
            stop,
            pages_requested,
            duplicates,
            malformed_entries,
        }
    }
}
