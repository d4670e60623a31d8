//! Listing-search collaborator: query type, source trait and HTTP client.

mod http;
pub(crate) mod payload;

pub use http::HttpListingSource;

use crate::screening::domain::RawListing;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// City/state pair sent to the search service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub city: String,
    pub state: String,
}

impl SearchQuery {
    pub fn new(city: &str, state: &str) -> Result<Self, SearchError> {
        let city = city.trim();
        let state = state.trim();
        if city.is_empty() {
            return Err(SearchError::InvalidQuery("city must not be empty"));
        }
        if state.is_empty() {
            return Err(SearchError::InvalidQuery("state must not be empty"));
        }

        Ok(Self {
            city: city.to_string(),
            state: state.to_ascii_uppercase(),
        })
    }
}

/// Successful search response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub listings: Vec<RawListing>,
    pub trending: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("invalid search query: {0}")]
    InvalidQuery(&'static str),
    #[error("listing search request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("listing search returned HTTP {0}")]
    Status(u16),
    #[error("listing search response could not be decoded: {0}")]
    Decode(String),
}

/// Anything that can answer a listing search.
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch(&self, query: &SearchQuery) -> Result<SearchResults, SearchError>;
}
