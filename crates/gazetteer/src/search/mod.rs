//! Matching, scoring and the search pipeline.
//!
//! The submodules layer from mechanism to policy: [`normalize`] and
//! [`distance`] are the text primitives, `scorer` turns them into per-place
//! scores, and `orchestration` runs the full cached pipeline.

mod matcher;
mod normalize;
mod orchestration;
mod scorer;

pub use error::SearchError;
pub use matcher::distance;
pub use normalize::normalize;
pub use orchestration::{CountrySummary, Scope, SearchConfig, SearchResult};
pub(crate) use orchestration::{search_countries_inner, search_inner};

mod error {
    use thiserror::Error;

    /// Errors a search can return. Everything else that can go wrong during
    /// a search (cache trouble, translation trouble) degrades the result
    /// instead of surfacing here.
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum SearchError {
        /// The query was empty or whitespace-only.
        #[error("query must not be empty")]
        InvalidQuery,
        /// The country scope did not resolve against the dataset.
        #[error("unknown country: {0}")]
        CountryNotFound(String),
    }

    pub type Result<T> = std::result::Result<T, SearchError>;
}
