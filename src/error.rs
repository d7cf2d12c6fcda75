use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use thiserror::Error;

use crate::platform::Platform;

/// Fatal errors that abort the run before or while reading input.
#[derive(Debug, Error)]
pub enum Error {
    #[error("At least one search flag (-o, -r, or -u) must be specified")]
    NoCategory,

    #[error("Error reading stdin: {0}")]
    Input(#[source] std::io::Error),

    #[error("Error creating HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Failure of a single search call. These are reported and the run continues.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{var} environment variable is not set")]
    MissingCredential { platform: Platform, var: &'static str },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{platform} API returned {status}: {message}")]
    Api {
        platform: Platform,
        status: StatusCode,
        message: String,
    },

    #[error("{platform} rate limit exhausted{}", reset_suffix(.reset))]
    RateLimited {
        platform: Platform,
        reset: Option<DateTime<Utc>>,
    },

    #[error("unexpected {platform} response: {source}")]
    Decode {
        platform: Platform,
        #[source]
        source: serde_json::Error,
    },
}

fn reset_suffix(reset: &Option<DateTime<Utc>>) -> String {
    match reset {
        Some(at) => format!(" (resets at {})", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => String::new(),
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
