use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::info;

use super::domain::{Assumptions, ListingId, RankingFilters, RawListing, SortKey};
use super::import::{ImportError, ListingImporter};
use super::search::{ListingSource, SearchError, SearchQuery};
use super::session::{ScreeningSession, SearchApplication, SearchStatus};
use super::views::ScreeningReport;

/// Shared screening session behind a listing source.
///
/// The session lock is never held across the search request, so a newer
/// search can be issued while an older one is still in flight.
pub struct ScreeningService<S> {
    source: Arc<S>,
    defaults: Assumptions,
    session: Mutex<ScreeningSession>,
}

/// Result of a search that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub generation: u64,
    pub applied: bool,
    pub listings: usize,
}

/// Ranked view plus session-level context.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    #[serde(flatten)]
    pub report: ScreeningReport,
    pub trending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_search: Option<SearchStatus>,
}

impl<S> ScreeningService<S>
where
    S: ListingSource + 'static,
{
    pub fn new(source: Arc<S>, defaults: Assumptions) -> Self {
        Self {
            source,
            defaults,
            session: Mutex::new(ScreeningSession::new(defaults)),
        }
    }

    /// Assumptions a fresh session starts from.
    pub fn defaults(&self) -> Assumptions {
        self.defaults
    }

    fn session(&self) -> MutexGuard<'_, ScreeningSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a search and install its result unless a newer search was issued meanwhile.
    pub async fn search(
        &self,
        city: &str,
        state: &str,
    ) -> Result<SearchOutcome, ScreeningServiceError> {
        let query = SearchQuery::new(city, state)?;
        let ticket = self.session().begin_search(query);
        let generation = ticket.generation();

        let result = self.source.fetch(ticket.query()).await;

        match self.session().complete_search(ticket, result) {
            SearchApplication::Applied { listings } => Ok(SearchOutcome {
                generation,
                applied: true,
                listings,
            }),
            SearchApplication::Stale { .. } => Ok(SearchOutcome {
                generation,
                applied: false,
                listings: 0,
            }),
            SearchApplication::Failed(err) => Err(err.into()),
        }
    }

    /// Install listings directly. A search still in flight will not overwrite them.
    pub fn replace_listings(&self, listings: Vec<RawListing>) {
        self.session().load_listings(listings);
    }

    /// Seed the working set from a saved export.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<usize, ScreeningServiceError> {
        let listings = ListingImporter::from_path(path)?;
        let count = listings.len();
        self.replace_listings(listings);
        Ok(count)
    }

    /// Clamp and install new assumptions; returns what was applied.
    pub fn set_assumptions(&self, assumptions: Assumptions) -> Assumptions {
        let applied = assumptions.clamp_to_surface();
        self.session().set_assumptions(applied);
        info!(
            nightly_rate = applied.nightly_rate,
            occupancy_percent = applied.occupancy_percent,
            expense_percent = applied.expense_percent,
            "assumptions updated"
        );
        applied
    }

    pub fn toggle_favorite(&self, id: &ListingId) -> bool {
        self.session().toggle_favorite(id)
    }

    pub fn view(&self, filters: &RankingFilters, sort: SortKey) -> SessionView {
        let filters = filters.clamp_to_surface();
        let session = self.session();
        SessionView {
            report: session.view(&filters, sort),
            trending: session.is_trending(),
            last_search: session.last_search().cloned(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScreeningServiceError {
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Import(#[from] ImportError),
}
