use thiserror::Error;

/// Rejections raised while building a [`crate::data_models::SearchRequest`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("job title cannot be empty")]
    EmptyTitle,
    #[error("job location cannot be empty")]
    EmptyLocation,
    #[error("number of jobs must be positive")]
    ZeroTargetCount,
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid base URL `{url}`: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to join `{path}` onto base URL: {source}")]
    UrlJoin {
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("base URL `{0}` cannot carry a path")]
    UnsupportedBaseUrl(String),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("invalid selector `{selector}`: {message}")]
    Selector { selector: String, message: String },
    #[error("request error during `{stage}`: {source}")]
    Request {
        stage: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected HTTP status {status} during `{stage}`")]
    HttpStatus { stage: &'static str, status: u16 },
    #[error("failed to read HTTP body during `{stage}`: {source}")]
    Body {
        stage: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("parse error during `{stage}`: {message}")]
    Parse {
        stage: &'static str,
        message: String,
    },
    #[error("malformed listing entry: {0}")]
    MalformedEntry(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ScrapeError {
    pub fn request(stage: &'static str, source: reqwest::Error) -> Self {
        ScrapeError::Request { stage, source }
    }

    pub fn parse(stage: &'static str, message: impl Into<String>) -> Self {
        ScrapeError::Parse {
            stage,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
