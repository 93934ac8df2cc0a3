//! HTTP access to the BCRP statistics service.
//!
//! [`BcrpClient`] fetches series observations and the metadata catalog. All
//! series requests pass through a single-permit gate followed by a fixed
//! delay, so at most one request is in flight against the upstream API.

mod api;
pub mod metadata;
pub mod period;

use std::error::Error;
use std::fmt;
use std::time::Duration;

use bcrp_store::schema::{API_BASE_URL, METADATA_URL};

pub use api::{BcrpClient, parse_series_payload, parse_value, series_url};
pub use period::PeriodRange;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_METADATA_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(500);
const DEFAULT_USER_AGENT: &str = concat!("bcrp-mcp/", env!("CARGO_PKG_VERSION"));

/// Endpoints and pacing for [`BcrpClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub metadata_url: String,
    pub timeout: Duration,
    pub metadata_timeout: Duration,
    pub request_delay: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: API_BASE_URL.to_string(),
            metadata_url: METADATA_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            metadata_timeout: DEFAULT_METADATA_TIMEOUT,
            request_delay: DEFAULT_REQUEST_DELAY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_metadata_url(mut self, url: impl Into<String>) -> Self {
        self.metadata_url = url.into();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_metadata_timeout(mut self, timeout: Duration) -> Self {
        self.metadata_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }
}

#[derive(Debug)]
pub enum ClientError {
    Http(reqwest::Error),
    Status { status: u16, url: String },
    Decode(String),
    Io(std::io::Error),
    InvalidInput(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(err) => write!(f, "http request failed: {err}"),
            Self::Status { status, url } => write!(f, "upstream returned {status} for {url}"),
            Self::Decode(message) => write!(f, "failed to decode upstream response: {message}"),
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
        }
    }
}

impl Error for ClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err)
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<tokio::task::JoinError> for ClientError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Io(std::io::Error::other(err))
    }
}
