use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Down-payment share of the purchase price.
pub const DOWN_PAYMENT_FRACTION: f64 = 0.20;
/// Annual interest on the financed share, applied flat (interest-only).
pub const LOAN_INTEREST_RATE: f64 = 0.07;
/// Days-on-market assumed when the listing does not report it.
pub const UNKNOWN_DAYS_ON_MARKET: u32 = 999;

pub const NIGHTLY_RATE_RANGE: RangeInclusive<f64> = 50.0..=1500.0;
pub const OCCUPANCY_PERCENT_RANGE: RangeInclusive<f64> = 20.0..=100.0;
pub const EXPENSE_PERCENT_RANGE: RangeInclusive<f64> = 10.0..=50.0;
pub const MIN_CAP_RATE_RANGE: RangeInclusive<f64> = 0.0..=20.0;
pub const MIN_CASH_ON_CASH_RANGE: RangeInclusive<f64> = 0.0..=20.0;

fn clamp_into(value: f64, range: &RangeInclusive<f64>) -> f64 {
    if value.is_nan() {
        return *range.start();
    }
    value.clamp(*range.start(), *range.end())
}

/// Stable identifier assigned by the listing-search service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ListingId(pub String);

impl ListingId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ListingId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // The search service emits numeric zpids; exports carry them as strings.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        let id = match RawId::deserialize(deserializer)? {
            RawId::Text(text) => text.trim().to_string(),
            RawId::Unsigned(value) => value.to_string(),
            RawId::Signed(value) => value.to_string(),
        };

        if id.is_empty() {
            return Err(serde::de::Error::custom("listing id must not be empty"));
        }
        Ok(Self(id))
    }
}

/// Days on market arrive as integers, integral floats, or junk. Junk reads as
/// unreported so the unknown-days fallback applies.
fn lenient_days<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDays {
        Whole(u64),
        Fractional(f64),
        Other(serde::de::IgnoredAny),
    }

    let days = match Option::<RawDays>::deserialize(deserializer)? {
        Some(RawDays::Whole(value)) => u32::try_from(value).ok(),
        Some(RawDays::Fractional(value))
            if value.is_finite()
                && value >= 0.0
                && value.fract() == 0.0
                && value <= f64::from(u32::MAX) =>
        {
            Some(value as u32)
        }
        _ => None,
    };
    Ok(days)
}

/// Display-only flag; null or non-boolean values read as `false`.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Flag(bool),
        Other(serde::de::IgnoredAny),
    }

    Ok(matches!(
        Option::<RawFlag>::deserialize(deserializer)?,
        Some(RawFlag::Flag(true))
    ))
}

/// Listing record as received from the search service. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawListing {
    #[serde(rename = "zpid", alias = "id")]
    pub id: ListingId,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(rename = "zestimate", alias = "estimatedValue", default)]
    pub estimated_value: Option<f64>,
    #[serde(
        rename = "daysOnZillow",
        alias = "daysOnMarket",
        default,
        deserialize_with = "lenient_days"
    )]
    pub days_on_market: Option<u32>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub bedrooms: Option<f32>,
    #[serde(default)]
    pub bathrooms: Option<f32>,
    #[serde(rename = "imgSrc", alias = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub detail_url: Option<String>,
    #[serde(
        rename = "undervalued",
        alias = "undervaluedFlag",
        default,
        deserialize_with = "lenient_flag"
    )]
    pub undervalued: bool,
}

impl RawListing {
    /// Minimal listing carrying only the fields the engine computes with.
    pub fn new(id: impl Into<String>, price: f64) -> Self {
        Self {
            id: ListingId::new(id),
            price: Some(price),
            estimated_value: None,
            days_on_market: None,
            address: None,
            bedrooms: None,
            bathrooms: None,
            image_url: None,
            detail_url: None,
            undervalued: false,
        }
    }

    pub fn with_estimated_value(mut self, value: f64) -> Self {
        self.estimated_value = Some(value);
        self
    }

    pub fn with_days_on_market(mut self, days: u32) -> Self {
        self.days_on_market = Some(days);
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn days_on_market_or_unknown(&self) -> u32 {
        self.days_on_market.unwrap_or(UNKNOWN_DAYS_ON_MARKET)
    }
}

/// User-tunable rental assumptions shared by every listing in a pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assumptions {
    pub nightly_rate: f64,
    #[serde(alias = "occupancy")]
    pub occupancy_percent: f64,
    #[serde(alias = "expenses")]
    pub expense_percent: f64,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            nightly_rate: 150.0,
            occupancy_percent: 65.0,
            expense_percent: 30.0,
        }
    }
}

impl Assumptions {
    /// Clamp user input into the adjustable ranges before it reaches the engine.
    pub fn clamp_to_surface(self) -> Self {
        Self {
            nightly_rate: clamp_into(self.nightly_rate, &NIGHTLY_RATE_RANGE),
            occupancy_percent: clamp_into(self.occupancy_percent, &OCCUPANCY_PERCENT_RANGE),
            expense_percent: clamp_into(self.expense_percent, &EXPENSE_PERCENT_RANGE),
        }
    }
}

/// Minimum-threshold filters; `None` disables a filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingFilters {
    #[serde(default, alias = "minCapRate")]
    pub min_cap_rate: Option<f64>,
    #[serde(default, alias = "minCocReturn", alias = "minCashOnCash")]
    pub min_cash_on_cash: Option<f64>,
}

impl RankingFilters {
    pub fn clamp_to_surface(self) -> Self {
        Self {
            min_cap_rate: self
                .min_cap_rate
                .map(|value| clamp_into(value, &MIN_CAP_RATE_RANGE)),
            min_cash_on_cash: self
                .min_cash_on_cash
                .map(|value| clamp_into(value, &MIN_CASH_ON_CASH_RANGE)),
        }
    }
}

/// Ordering applied to the filtered set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    HeatScore,
    #[default]
    CapRate,
    #[serde(alias = "cocReturn")]
    CashOnCashReturn,
    PriceLow,
    PriceHigh,
}

impl SortKey {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::HeatScore,
            Self::CapRate,
            Self::CashOnCashReturn,
            Self::PriceLow,
            Self::PriceHigh,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HeatScore => "heatScore",
            Self::CapRate => "capRate",
            Self::CashOnCashReturn => "cashOnCashReturn",
            Self::PriceLow => "priceLow",
            Self::PriceHigh => "priceHigh",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::HeatScore => "Heat Score",
            Self::CapRate => "Cap Rate",
            Self::CashOnCashReturn => "Cash-on-Cash",
            Self::PriceLow => "Price: Low to High",
            Self::PriceHigh => "Price: High to Low",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "heatscore" | "heat" => Ok(Self::HeatScore),
            "caprate" | "cap" => Ok(Self::CapRate),
            "cashoncashreturn" | "cashoncash" | "cocreturn" | "coc" => Ok(Self::CashOnCashReturn),
            "pricelow" => Ok(Self::PriceLow),
            "pricehigh" => Ok(Self::PriceHigh),
            _ => Err(format!(
                "unknown sort key '{raw}' (expected one of: {})",
                Self::ordered()
                    .iter()
                    .map(|key| key.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}
