use fennec_contracts::error::FetchError;
use thiserror::Error;

/// Failure carried by [`LibraryState::Error`](crate::paging::LibraryState).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("Unable to get page: {0}")]
    UnableToGetPage(String),

    #[error("Unable to get random element: {0}")]
    UnableToGetRandomElement(String),
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid server url: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
