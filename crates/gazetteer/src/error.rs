//! Top-level error type aggregating the per-module errors.

use thiserror::Error;

use crate::search::SearchError;

#[derive(Error, Debug)]
pub enum GazetteerError {
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] gazetteer_data::DatasetError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging setup error: {0}")]
    InitLogging(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GazetteerError {
    /// Whether the error is the empty-query rejection.
    #[must_use]
    pub fn is_invalid_query(&self) -> bool {
        matches!(self, Self::Search(SearchError::InvalidQuery))
    }

    /// Whether the error is an unresolvable country scope.
    #[must_use]
    pub fn is_country_not_found(&self) -> bool {
        matches!(self, Self::Search(SearchError::CountryNotFound(_)))
    }
}

pub type Result<T> = std::result::Result<T, GazetteerError>;
