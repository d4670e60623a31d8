//! Short-term-rental screening: enrichment, heat scoring, ranking and the
//! session that ties them to a listing-search service.

pub mod domain;
pub mod enrichment;
pub mod favorites;
pub mod heat;
pub mod import;
pub mod metrics;
pub mod ranking;
pub mod router;
pub mod search;
pub mod service;
pub mod session;
pub mod views;

pub use domain::{Assumptions, ListingId, RankingFilters, RawListing, SortKey};
pub use enrichment::{
    enrich, enrich_with_report, EnrichedListing, EnrichmentEngine, EnrichmentOutcome,
    ExcludedListing,
};
pub use favorites::FavoriteSet;
pub use heat::{compose, HeatBreakdown, HeatScore, HeatTier, HeatWeights, HeatWeightsError};
pub use import::{ImportError, ListingFormat, ListingImporter};
pub use metrics::{calculate, ListingMetrics, MetricsError};
pub use ranking::rank;
pub use router::screening_router;
pub use search::{HttpListingSource, ListingSource, SearchError, SearchQuery, SearchResults};
pub use service::{ScreeningService, ScreeningServiceError, SearchOutcome, SessionView};
pub use session::{ScreeningSession, SearchApplication, SearchStatus, SearchTicket};
pub use views::{present, ListingView, ScreeningReport};
