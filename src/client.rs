use std::sync::Arc;

use reqwest::{Client, Url};

use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};
use crate::pacer::{PaceWindow, Pacer};

/// HTTP access to the listing service. Every request goes through the
/// shared [`Pacer`] first.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: Client,
    base_url: Url,
    pacer: Arc<Pacer>,
}

impl ServiceClient {
    pub fn new(config: &ScraperConfig, pacer: Arc<Pacer>) -> Result<ServiceClient> {
        let base_url =
            Url::parse(&config.base_url).map_err(|source| ScrapeError::InvalidBaseUrl {
                url: config.base_url.clone(),
                source,
            })?;
        if base_url.cannot_be_a_base() {
            return Err(ScrapeError::UnsupportedBaseUrl(config.base_url.clone()));
        }

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.request_timeout)
            .build()
            .map_err(ScrapeError::Client)?;

        Ok(ServiceClient {
            http,
            base_url,
            pacer,
        })
    }

    /// `path` resolved against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|source| ScrapeError::UrlJoin {
                path: path.to_string(),
                source,
            })
    }

    /// Pace, GET `url`, and return the body of a 2xx answer.
    pub async fn get_text(&self, url: Url, window: PaceWindow, stage: &'static str) -> Result<String> {
        self.pacer.pace(window).await;

        tracing::debug!(stage, %url, "sending request");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| ScrapeError::request(stage, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                stage,
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|source| ScrapeError::Body { stage, source })
    }
}

/// `base` with `segment` appended as one percent-encoded path segment.
pub(crate) fn with_segment(base: &Url, segment: &str) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(segment);
    }
    url
}
