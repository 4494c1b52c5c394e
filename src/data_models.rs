use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RequestError;

/// Target counts above this are slow and tend to trip upstream throttling.
pub const CAUTION_TARGET_COUNT: usize = 100;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePosted {
    Any,
    Day,
    #[default]
    Week,
    Month,
}

impl DatePosted {
    /// Value of the `f_TPR` query parameter; `None` means the filter is omitted.
    pub fn wire_token(self) -> Option<&'static str> {
        match self {
            DatePosted::Any => None,
            DatePosted::Day => Some("r86400"),
            DatePosted::Week => Some("r604800"),
            DatePosted::Month => Some("r2592000"),
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            DatePosted::Any => "any time",
            DatePosted::Day => "the last 24 hours",
            DatePosted::Week => "the last 7 days",
            DatePosted::Month => "the last 30 days",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExperienceLevel {
    Internship,
    EntryLevel,
    Associate,
    MidSenior,
    Director,
    Executive,
}

impl ExperienceLevel {
    pub const ALL: [ExperienceLevel; 6] = [
        ExperienceLevel::Internship,
        ExperienceLevel::EntryLevel,
        ExperienceLevel::Associate,
        ExperienceLevel::MidSenior,
        ExperienceLevel::Director,
        ExperienceLevel::Executive,
    ];

    pub fn wire_token(self) -> &'static str {
        match self {
            ExperienceLevel::Internship => "1",
            ExperienceLevel::EntryLevel => "2",
            ExperienceLevel::Associate => "3",
            ExperienceLevel::MidSenior => "4",
            ExperienceLevel::Director => "5",
            ExperienceLevel::Executive => "6",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExperienceLevel::Internship => "Internship",
            ExperienceLevel::EntryLevel => "Entry level",
            ExperienceLevel::Associate => "Associate",
            ExperienceLevel::MidSenior => "Mid-Senior level",
            ExperienceLevel::Director => "Director",
            ExperienceLevel::Executive => "Executive",
        }
    }
}

/// A validated search. Fields are private so a request can only be built
/// through [`SearchRequest::new`].
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    title: String,
    location: String,
    target_count: usize,
    date_posted: DatePosted,
    experience_levels: BTreeSet<ExperienceLevel>,
}

impl SearchRequest {
    pub fn new(
        title: impl Into<String>,
        location: impl Into<String>,
        target_count: usize,
        date_posted: DatePosted,
        experience_levels: impl IntoIterator<Item = ExperienceLevel>,
    ) -> Result<SearchRequest, RequestError> {
        let title = title.into().trim().to_string();
        let location = location.into().trim().to_string();
        if title.is_empty() {
            return Err(RequestError::EmptyTitle);
        }
        if location.is_empty() {
            return Err(RequestError::EmptyLocation);
        }
        if target_count == 0 {
            return Err(RequestError::ZeroTargetCount);
        }
        Ok(SearchRequest {
            title,
            location,
            target_count,
            date_posted,
            experience_levels: experience_levels.into_iter().collect(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    pub fn date_posted(&self) -> DatePosted {
        self.date_posted
    }

    pub fn experience_levels(&self) -> &BTreeSet<ExperienceLevel> {
        &self.experience_levels
    }

    /// Value of the `f_E` query parameter; `None` when any level is accepted.
    pub fn experience_token(&self) -> Option<String> {
        if self.experience_levels.is_empty() {
            return None;
        }
        let tokens: Vec<&str> = self
            .experience_levels
            .iter()
            .map(|level| level.wire_token())
            .collect();
        Some(tokens.join(","))
    }

    pub fn exceeds_caution(&self) -> bool {
        self.target_count > CAUTION_TARGET_COUNT
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ListingId(String);

impl ListingId {
    pub fn new(raw: impl Into<String>) -> ListingId {
        ListingId(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    #[serde(rename = "job_title")]
    pub title: Option<String>,
    pub company_name: Option<String>,
    #[serde(rename = "job_location")]
    pub location: Option<String>,
    #[serde(rename = "time_posted")]
    pub posted_ago: Option<String>,
    #[serde(rename = "num_applicants")]
    pub applicant_count: Option<String>,
    #[serde(rename = "job_url")]
    pub url: String,
    #[serde(rename = "job_description_preview")]
    pub description_preview: Option<String>,
}

impl JobRecord {
    /// A record with only the url populated.
    pub fn bare(url: impl Into<String>) -> JobRecord {
        JobRecord {
            title: None,
            company_name: None,
            location: None,
            posted_ago: None,
            applicant_count: None,
            url: url.into(),
            description_preview: None,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotFound,
    TransientError,
    ParseFailure,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::NotFound => "not found",
            SkipReason::TransientError => "transient error",
            SkipReason::ParseFailure => "parse failure",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(JobRecord),
    Skipped(SkipReason),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }
}
