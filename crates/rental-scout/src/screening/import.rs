//! Load raw listings from saved search exports (JSON or CSV).

use super::domain::RawListing;
use super::search::payload::decode_listings;
use serde::Deserialize;
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingFormat {
    Json,
    Csv,
}

impl ListingFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Some(Self::Json),
            Some("csv") => Some(Self::Csv),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read listing export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid listing JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid listing CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("listing JSON must be an array or an object with a results array")]
    UnexpectedShape,
    #[error("unsupported listing export '{0}' (expected .json or .csv)")]
    UnsupportedFormat(String),
}

pub struct ListingImporter;

impl ListingImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<RawListing>, ImportError> {
        let path = path.as_ref();
        let format = ListingFormat::from_path(path)
            .ok_or_else(|| ImportError::UnsupportedFormat(path.display().to_string()))?;
        let file = std::fs::File::open(path)?;
        let listings = Self::from_reader(file, format)?;
        info!(path = %path.display(), listings = listings.len(), "imported listings");
        Ok(listings)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        format: ListingFormat,
    ) -> Result<Vec<RawListing>, ImportError> {
        match format {
            ListingFormat::Json => from_json(reader),
            ListingFormat::Csv => from_csv(reader),
        }
    }
}

fn from_json<R: Read>(reader: R) -> Result<Vec<RawListing>, ImportError> {
    let document: Value = serde_json::from_reader(reader)?;
    let records = match document {
        Value::Array(records) => records,
        Value::Object(mut object) => match object.remove("results") {
            Some(Value::Array(records)) => records,
            _ => return Err(ImportError::UnexpectedShape),
        },
        _ => return Err(ImportError::UnexpectedShape),
    };
    Ok(decode_listings(records))
}

fn from_csv<R: Read>(reader: R) -> Result<Vec<RawListing>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut listings = Vec::new();

    for (index, record) in csv_reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                warn!(row = index + 1, error = %err, "skipping unreadable CSV row");
                continue;
            }
        };

        match record.deserialize::<CsvListingRow>(Some(&headers)) {
            Ok(row) => match row.into_listing() {
                Some(listing) => listings.push(listing),
                None => warn!(row = index + 1, "skipping CSV row without listing id"),
            },
            Err(err) => warn!(row = index + 1, error = %err, "skipping malformed CSV row"),
        }
    }

    Ok(listings)
}

/// CSV columns mirror the search service field names; blanks read as absent.
#[derive(Debug, Deserialize)]
struct CsvListingRow {
    #[serde(alias = "id")]
    zpid: Option<String>,
    price: Option<f64>,
    #[serde(alias = "estimatedValue")]
    zestimate: Option<f64>,
    #[serde(rename = "daysOnZillow", alias = "daysOnMarket")]
    days_on_zillow: Option<u32>,
    address: Option<String>,
    bedrooms: Option<f32>,
    bathrooms: Option<f32>,
    #[serde(rename = "imgSrc", alias = "imageUrl")]
    img_src: Option<String>,
    #[serde(rename = "detailUrl")]
    detail_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    undervalued: bool,
}

impl CsvListingRow {
    fn into_listing(self) -> Option<RawListing> {
        let id = self.zpid.filter(|id| !id.trim().is_empty())?;
        let mut listing = RawListing::new(id.trim(), 0.0);
        listing.price = self.price;
        listing.estimated_value = self.zestimate;
        listing.days_on_market = self.days_on_zillow;
        listing.address = self.address.filter(|value| !value.is_empty());
        listing.bedrooms = self.bedrooms;
        listing.bathrooms = self.bathrooms;
        listing.image_url = self.img_src.filter(|value| !value.is_empty());
        listing.detail_url = self.detail_url.filter(|value| !value.is_empty());
        listing.undervalued = self.undervalued;
        Some(listing)
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(matches!(
        raw.as_deref().map(|value| value.trim().to_ascii_lowercase()).as_deref(),
        Some("true" | "yes" | "1" | "y")
    ))
}
