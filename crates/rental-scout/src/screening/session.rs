//! Working set for one screening session.
//!
//! Raw listings and assumptions are replaced wholesale, and every replacement
//! triggers a full enrichment pass. Favorites live independently of searches.
//! Searches are gated by generation: only the most recently issued ticket may
//! install its result.

use super::domain::{Assumptions, ListingId, RankingFilters, RawListing, SortKey};
use super::enrichment::{EnrichedListing, EnrichmentEngine, ExcludedListing};
use super::favorites::FavoriteSet;
use super::ranking::rank;
use super::search::{SearchError, SearchQuery, SearchResults};
use super::views::{present, ScreeningReport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// Proof that a search was issued; redeemed by `complete_search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    query: SearchQuery,
}

impl SearchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }
}

/// What happened to a completed search.
#[derive(Debug)]
pub enum SearchApplication {
    Applied { listings: usize },
    Failed(SearchError),
    Stale { generation: u64, latest: u64 },
}

/// Last search as seen by the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStatus {
    pub query: SearchQuery,
    pub completed_at: DateTime<Utc>,
    pub listing_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ScreeningSession {
    engine: EnrichmentEngine,
    raw: Vec<RawListing>,
    assumptions: Assumptions,
    enriched: Vec<EnrichedListing>,
    excluded: Vec<ExcludedListing>,
    favorites: FavoriteSet,
    trending: bool,
    issued_generation: u64,
    last_search: Option<SearchStatus>,
}

impl Default for ScreeningSession {
    fn default() -> Self {
        Self::new(Assumptions::default())
    }
}

impl ScreeningSession {
    pub fn new(assumptions: Assumptions) -> Self {
        Self::with_engine(EnrichmentEngine::default(), assumptions)
    }

    pub fn with_engine(engine: EnrichmentEngine, assumptions: Assumptions) -> Self {
        Self {
            engine,
            raw: Vec::new(),
            assumptions,
            enriched: Vec::new(),
            excluded: Vec::new(),
            favorites: FavoriteSet::new(),
            trending: false,
            issued_generation: 0,
            last_search: None,
        }
    }

    pub fn assumptions(&self) -> Assumptions {
        self.assumptions
    }

    pub fn raw_listings(&self) -> &[RawListing] {
        &self.raw
    }

    pub fn enriched(&self) -> &[EnrichedListing] {
        &self.enriched
    }

    pub fn excluded(&self) -> &[ExcludedListing] {
        &self.excluded
    }

    pub fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }

    pub fn is_trending(&self) -> bool {
        self.trending
    }

    pub fn last_search(&self) -> Option<&SearchStatus> {
        self.last_search.as_ref()
    }

    pub fn set_assumptions(&mut self, assumptions: Assumptions) {
        self.assumptions = assumptions;
        self.recompute();
    }

    pub fn replace_listings(&mut self, listings: Vec<RawListing>) {
        self.raw = listings;
        self.recompute();
    }

    /// Install listings from outside a search; outstanding tickets become stale.
    pub fn load_listings(&mut self, listings: Vec<RawListing>) {
        self.issued_generation += 1;
        info!(
            generation = self.issued_generation,
            listings = listings.len(),
            "listings loaded, outstanding searches superseded"
        );
        self.replace_listings(listings);
    }

    fn recompute(&mut self) {
        let outcome = self.engine.enrich_with_report(&self.raw, &self.assumptions);
        self.enriched = outcome.listings;
        self.excluded = outcome.excluded;
    }

    /// Issue a new search; any earlier outstanding ticket becomes stale.
    pub fn begin_search(&mut self, query: SearchQuery) -> SearchTicket {
        self.issued_generation += 1;
        info!(
            generation = self.issued_generation,
            city = %query.city,
            state = %query.state,
            "search issued"
        );
        SearchTicket {
            generation: self.issued_generation,
            query,
        }
    }

    /// Install a search result if `ticket` is still the latest one issued.
    pub fn complete_search(
        &mut self,
        ticket: SearchTicket,
        result: Result<SearchResults, SearchError>,
    ) -> SearchApplication {
        if ticket.generation != self.issued_generation {
            info!(
                generation = ticket.generation,
                latest = self.issued_generation,
                "dropping stale search result"
            );
            return SearchApplication::Stale {
                generation: ticket.generation,
                latest: self.issued_generation,
            };
        }

        let completed_at = Utc::now();
        match result {
            Ok(results) => {
                let count = results.listings.len();
                self.trending = results.trending;
                self.replace_listings(results.listings);
                self.last_search = Some(SearchStatus {
                    query: ticket.query,
                    completed_at,
                    listing_count: count,
                    error: None,
                });
                SearchApplication::Applied { listings: count }
            }
            Err(err) => {
                warn!(error = %err, "search failed; clearing listings");
                self.trending = false;
                self.replace_listings(Vec::new());
                self.last_search = Some(SearchStatus {
                    query: ticket.query,
                    completed_at,
                    listing_count: 0,
                    error: Some(err.to_string()),
                });
                SearchApplication::Failed(err)
            }
        }
    }

    /// Flip favorite membership and return the new state for `id`.
    pub fn toggle_favorite(&mut self, id: &ListingId) -> bool {
        self.favorites = self.favorites.toggle(id);
        self.favorites.is_favorite(id)
    }

    pub fn view(&self, filters: &RankingFilters, sort: SortKey) -> ScreeningReport {
        let ranked = rank(&self.enriched, filters, sort);
        ScreeningReport {
            assumptions: self.assumptions,
            filters: *filters,
            sort,
            total_listings: self.enriched.len(),
            listings: present(ranked, &self.favorites),
            excluded: self.excluded.clone(),
        }
    }
}
