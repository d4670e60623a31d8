use super::domain::{Assumptions, RankingFilters, SortKey};
use super::enrichment::{EnrichedListing, ExcludedListing};
use super::favorites::FavoriteSet;
use super::heat::HeatTier;
use serde::Serialize;

/// One row of the ranked output, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    #[serde(flatten)]
    pub listing: EnrichedListing,
    pub heat_tier: HeatTier,
    pub heat_label: &'static str,
    pub is_favorite: bool,
}

/// Attach favorite membership and tier labels to ranked listings.
pub fn present(ranked: Vec<EnrichedListing>, favorites: &FavoriteSet) -> Vec<ListingView> {
    ranked
        .into_iter()
        .map(|listing| {
            let tier = listing.heat_tier();
            let is_favorite = favorites.is_favorite(listing.id());
            ListingView {
                listing,
                heat_tier: tier,
                heat_label: tier.label(),
                is_favorite,
            }
        })
        .collect()
}

/// Ranked view plus the context it was produced under.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningReport {
    pub assumptions: Assumptions,
    pub filters: RankingFilters,
    pub sort: SortKey,
    pub total_listings: usize,
    pub listings: Vec<ListingView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<ExcludedListing>,
}

impl ScreeningReport {
    pub fn favorites(&self) -> impl Iterator<Item = &ListingView> {
        self.listings.iter().filter(|view| view.is_favorite)
    }
}
