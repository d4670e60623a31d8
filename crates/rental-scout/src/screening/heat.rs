use super::domain::RawListing;
use super::metrics::ListingMetrics;
use serde::{Deserialize, Serialize};

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Relative weight of each sub-score in the composite. Always sums to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatWeights {
    cap_rate: f64,
    cash_on_cash: f64,
    price: f64,
    days_on_market: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HeatWeightsError {
    #[error("heat weights must be finite and non-negative")]
    InvalidWeight,
    #[error("heat weights must sum to 1.0, got {0}")]
    UnbalancedSum(f64),
}

impl HeatWeights {
    pub const STANDARD: Self = Self {
        cap_rate: 0.4,
        cash_on_cash: 0.4,
        price: 0.1,
        days_on_market: 0.1,
    };

    pub fn new(
        cap_rate: f64,
        cash_on_cash: f64,
        price: f64,
        days_on_market: f64,
    ) -> Result<Self, HeatWeightsError> {
        let weights = [cap_rate, cash_on_cash, price, days_on_market];
        if weights
            .iter()
            .any(|weight| !weight.is_finite() || *weight < 0.0)
        {
            return Err(HeatWeightsError::InvalidWeight);
        }

        let sum: f64 = weights.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(HeatWeightsError::UnbalancedSum(sum));
        }

        Ok(Self {
            cap_rate,
            cash_on_cash,
            price,
            days_on_market,
        })
    }

    pub fn sum(&self) -> f64 {
        self.cap_rate + self.cash_on_cash + self.price + self.days_on_market
    }
}

impl Default for HeatWeights {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl<'de> Deserialize<'de> for HeatWeights {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Unchecked {
            cap_rate: f64,
            cash_on_cash: f64,
            price: f64,
            days_on_market: f64,
        }

        let raw = Unchecked::deserialize(deserializer)?;
        Self::new(raw.cap_rate, raw.cash_on_cash, raw.price, raw.days_on_market)
            .map_err(serde::de::Error::custom)
    }
}

/// Display tier derived from the heat score; never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatTier {
    None,
    Warm,
    Hot,
}

impl HeatTier {
    pub const fn from_score(score: u8) -> Self {
        if score >= 85 {
            Self::Hot
        } else if score >= 70 {
            Self::Warm
        } else {
            Self::None
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Warm => "flame",
            Self::Hot => "double-flame",
        }
    }

    pub const fn badge(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Warm => "\u{1F525}",
            Self::Hot => "\u{1F525}\u{1F525}",
        }
    }
}

/// Individual sub-scores, each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatBreakdown {
    pub cap_rate: f64,
    pub cash_on_cash: f64,
    pub price: f64,
    pub days_on_market: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatScore {
    pub score: u8,
    pub breakdown: HeatBreakdown,
}

impl HeatScore {
    pub fn tier(&self) -> HeatTier {
        HeatTier::from_score(self.score)
    }
}

fn clamp_subscore(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

fn price_subscore(listing: &RawListing) -> f64 {
    match (listing.estimated_value, listing.price) {
        (Some(estimate), Some(price)) if estimate > 0.0 && price > 0.0 => {
            clamp_subscore(((estimate - price) / estimate) * 100.0)
        }
        _ => 0.0,
    }
}

fn days_subscore(days_on_market: u32) -> f64 {
    match days_on_market {
        0..=3 => 100.0,
        4..=7 => 60.0,
        _ => 20.0,
    }
}

/// Blend yield, discount-to-value and freshness into a 0-100 score.
pub fn compose(listing: &RawListing, metrics: &ListingMetrics, weights: &HeatWeights) -> HeatScore {
    let breakdown = HeatBreakdown {
        cap_rate: clamp_subscore(metrics.cap_rate_percent * 10.0),
        cash_on_cash: clamp_subscore(metrics.cash_on_cash_return_percent * 10.0),
        price: price_subscore(listing),
        days_on_market: days_subscore(listing.days_on_market_or_unknown()),
    };

    let composite = breakdown.cap_rate * weights.cap_rate
        + breakdown.cash_on_cash * weights.cash_on_cash
        + breakdown.price * weights.price
        + breakdown.days_on_market * weights.days_on_market;

    HeatScore {
        score: composite.round().clamp(0.0, 100.0) as u8,
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::domain::Assumptions;
    use crate::screening::metrics::calculate;

    fn metrics_with(cap_rate_percent: f64, cash_on_cash_return_percent: f64) -> ListingMetrics {
        let mut metrics = calculate(&RawListing::new("m", 200_000.0), &Assumptions::default())
            .expect("metrics compute");
        metrics.cap_rate_percent = cap_rate_percent;
        metrics.cash_on_cash_return_percent = cash_on_cash_return_percent;
        metrics
    }

    #[test]
    fn worked_example_scores_ninety_and_double_flame() {
        let listing = RawListing::new("1", 200_000.0).with_days_on_market(2);
        let metrics = calculate(&listing, &Assumptions::default()).expect("metrics compute");

        let heat = compose(&listing, &metrics, &HeatWeights::STANDARD);

        assert_eq!(heat.breakdown.cap_rate, 100.0);
        assert_eq!(heat.breakdown.cash_on_cash, 100.0);
        assert_eq!(heat.breakdown.price, 0.0);
        assert_eq!(heat.breakdown.days_on_market, 100.0);
        assert_eq!(heat.score, 90);
        assert_eq!(heat.tier(), HeatTier::Hot);
        assert_eq!(heat.tier().label(), "double-flame");
    }

    #[test]
    fn pathological_yields_clamp_to_bounds() {
        let listing = RawListing::new("2", 200_000.0);
        let heat = compose(&listing, &metrics_with(500.0, -80.0), &HeatWeights::STANDARD);

        assert_eq!(heat.breakdown.cap_rate, 100.0);
        assert_eq!(heat.breakdown.cash_on_cash, 0.0);
        assert!(heat.score <= 100);
    }

    #[test]
    fn discount_to_value_feeds_price_subscore() {
        let listing = RawListing::new("3", 180_000.0).with_estimated_value(200_000.0);
        let heat = compose(&listing, &metrics_with(0.0, 0.0), &HeatWeights::STANDARD);
        assert!((heat.breakdown.price - 10.0).abs() < 1e-9);

        let overpriced = RawListing::new("4", 250_000.0).with_estimated_value(200_000.0);
        let heat = compose(&overpriced, &metrics_with(0.0, 0.0), &HeatWeights::STANDARD);
        assert_eq!(heat.breakdown.price, 0.0);
    }

    #[test]
    fn zero_estimate_contributes_nothing() {
        let listing = RawListing::new("5", 180_000.0).with_estimated_value(0.0);
        let heat = compose(&listing, &metrics_with(0.0, 0.0), &HeatWeights::STANDARD);
        assert_eq!(heat.breakdown.price, 0.0);
    }

    #[test]
    fn days_on_market_buckets() {
        assert_eq!(days_subscore(0), 100.0);
        assert_eq!(days_subscore(3), 100.0);
        assert_eq!(days_subscore(4), 60.0);
        assert_eq!(days_subscore(7), 60.0);
        assert_eq!(days_subscore(8), 20.0);

        let unknown = RawListing::new("6", 200_000.0);
        let heat = compose(&unknown, &metrics_with(0.0, 0.0), &HeatWeights::STANDARD);
        assert_eq!(heat.breakdown.days_on_market, 20.0);
        assert_eq!(heat.score, 2);
    }

    #[test]
    fn tier_thresholds() {
        assert_eq!(HeatTier::from_score(100), HeatTier::Hot);
        assert_eq!(HeatTier::from_score(85), HeatTier::Hot);
        assert_eq!(HeatTier::from_score(84), HeatTier::Warm);
        assert_eq!(HeatTier::from_score(70), HeatTier::Warm);
        assert_eq!(HeatTier::from_score(69), HeatTier::None);
        assert_eq!(HeatTier::from_score(0).label(), "none");
    }

    #[test]
    fn standard_weights_sum_to_one() {
        assert!((HeatWeights::STANDARD.sum() - 1.0).abs() < 1e-12);
        assert_eq!(HeatWeights::default(), HeatWeights::STANDARD);
    }

    #[test]
    fn custom_weights_must_stay_balanced() {
        assert!(HeatWeights::new(0.25, 0.25, 0.25, 0.25).is_ok());
        assert!(matches!(
            HeatWeights::new(0.5, 0.5, 0.1, 0.1),
            Err(HeatWeightsError::UnbalancedSum(_))
        ));
        assert_eq!(
            HeatWeights::new(1.2, -0.2, 0.0, 0.0),
            Err(HeatWeightsError::InvalidWeight)
        );
    }

    #[test]
    fn weights_deserialize_through_validation() {
        let ok: Result<HeatWeights, _> = serde_json::from_str(
            r#"{"capRate":0.5,"cashOnCash":0.3,"price":0.1,"daysOnMarket":0.1}"#,
        );
        assert!(ok.is_ok());

        let bad: Result<HeatWeights, _> = serde_json::from_str(
            r#"{"capRate":0.5,"cashOnCash":0.5,"price":0.1,"daysOnMarket":0.1}"#,
        );
        assert!(bad.is_err());
    }
}
