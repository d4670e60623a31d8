//! Enrichment pass: raw listings + assumptions -> enriched working set.
//!
//! A pass is always a full rebuild from the raw records. Listings whose metrics
//! cannot be computed are reported as exclusions instead of failing the batch.

use super::domain::{Assumptions, ListingId, RawListing};
use super::heat::{compose, HeatBreakdown, HeatTier, HeatWeights};
use super::metrics::{calculate, MetricsError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Raw listing plus every derived figure for one assumption set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedListing {
    #[serde(flatten)]
    pub listing: RawListing,
    pub cap_rate_percent: f64,
    pub cash_on_cash_return_percent: f64,
    pub estimated_nightly_rate: f64,
    pub occupancy_fraction: f64,
    pub net_operating_income: f64,
    pub annual_cash_flow: f64,
    pub heat_score: u8,
    pub heat_breakdown: HeatBreakdown,
}

impl EnrichedListing {
    pub fn id(&self) -> &ListingId {
        &self.listing.id
    }

    /// Price the metrics were computed from. Always positive.
    pub fn price(&self) -> f64 {
        self.listing.price.unwrap_or_default()
    }

    pub fn heat_tier(&self) -> HeatTier {
        HeatTier::from_score(self.heat_score)
    }
}

/// Listing left out of the enriched set, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcludedListing {
    pub id: ListingId,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnrichmentOutcome {
    pub listings: Vec<EnrichedListing>,
    pub excluded: Vec<ExcludedListing>,
}

/// Stateless enricher carrying the heat-score weights.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentEngine {
    weights: HeatWeights,
}

impl EnrichmentEngine {
    pub fn new(weights: HeatWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &HeatWeights {
        &self.weights
    }

    pub fn enrich_listing(
        &self,
        listing: &RawListing,
        assumptions: &Assumptions,
    ) -> Result<EnrichedListing, MetricsError> {
        let metrics = calculate(listing, assumptions)?;
        let heat = compose(listing, &metrics, &self.weights);

        Ok(EnrichedListing {
            listing: listing.clone(),
            cap_rate_percent: metrics.cap_rate_percent,
            cash_on_cash_return_percent: metrics.cash_on_cash_return_percent,
            estimated_nightly_rate: metrics.estimated_nightly_rate,
            occupancy_fraction: metrics.occupancy_fraction,
            net_operating_income: metrics.net_operating_income,
            annual_cash_flow: metrics.annual_cash_flow,
            heat_score: heat.score,
            heat_breakdown: heat.breakdown,
        })
    }

    /// Enrich every listing in input order, collecting exclusions.
    pub fn enrich_with_report(
        &self,
        listings: &[RawListing],
        assumptions: &Assumptions,
    ) -> EnrichmentOutcome {
        let mut outcome = EnrichmentOutcome {
            listings: Vec::with_capacity(listings.len()),
            excluded: Vec::new(),
        };

        for listing in listings {
            match self.enrich_listing(listing, assumptions) {
                Ok(enriched) => outcome.listings.push(enriched),
                Err(err) => {
                    warn!(listing_id = %listing.id, reason = %err, "listing excluded from enrichment");
                    outcome.excluded.push(ExcludedListing {
                        id: listing.id.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        debug!(
            enriched = outcome.listings.len(),
            excluded = outcome.excluded.len(),
            "enrichment pass complete"
        );
        outcome
    }

    pub fn enrich(&self, listings: &[RawListing], assumptions: &Assumptions) -> Vec<EnrichedListing> {
        self.enrich_with_report(listings, assumptions).listings
    }
}

/// Enrich with the standard heat weights.
pub fn enrich(listings: &[RawListing], assumptions: &Assumptions) -> Vec<EnrichedListing> {
    EnrichmentEngine::default().enrich(listings, assumptions)
}

pub fn enrich_with_report(listings: &[RawListing], assumptions: &Assumptions) -> EnrichmentOutcome {
    EnrichmentEngine::default().enrich_with_report(listings, assumptions)
}
