use super::domain::{RankingFilters, SortKey};
use super::enrichment::EnrichedListing;
use std::cmp::Ordering;

impl RankingFilters {
    /// Minimum semantics: a metric equal to its threshold passes.
    pub fn admits(&self, listing: &EnrichedListing) -> bool {
        let cap_ok = self
            .min_cap_rate
            .map_or(true, |min| listing.cap_rate_percent >= min);
        let coc_ok = self
            .min_cash_on_cash
            .map_or(true, |min| listing.cash_on_cash_return_percent >= min);
        cap_ok && coc_ok
    }
}

impl SortKey {
    /// Primary ordering for this key, ties broken by ascending listing id.
    pub fn compare(self, a: &EnrichedListing, b: &EnrichedListing) -> Ordering {
        let primary = match self {
            SortKey::HeatScore => b.heat_score.cmp(&a.heat_score),
            SortKey::CapRate => b.cap_rate_percent.total_cmp(&a.cap_rate_percent),
            SortKey::CashOnCashReturn => b
                .cash_on_cash_return_percent
                .total_cmp(&a.cash_on_cash_return_percent),
            SortKey::PriceLow => a.price().total_cmp(&b.price()),
            SortKey::PriceHigh => b.price().total_cmp(&a.price()),
        };
        primary.then_with(|| a.id().cmp(b.id()))
    }
}

/// Filter then order the enriched set. The input is left untouched.
pub fn rank(
    listings: &[EnrichedListing],
    filters: &RankingFilters,
    sort: SortKey,
) -> Vec<EnrichedListing> {
    let mut ranked: Vec<EnrichedListing> = listings
        .iter()
        .filter(|listing| filters.admits(listing))
        .cloned()
        .collect();
    ranked.sort_by(|a, b| sort.compare(a, b));
    ranked
}
