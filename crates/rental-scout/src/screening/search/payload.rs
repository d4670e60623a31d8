use crate::screening::domain::RawListing;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Response body of the listing-search service.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchPayload {
    #[serde(default)]
    pub(crate) results: Option<Vec<Value>>,
    #[serde(default)]
    pub(crate) trending: Option<bool>,
}

/// Decode records one at a time so a malformed record only drops itself.
pub(crate) fn decode_listings(records: Vec<Value>) -> Vec<RawListing> {
    let total = records.len();
    let mut listings = Vec::with_capacity(total);

    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<RawListing>(record) {
            Ok(listing) => listings.push(listing),
            Err(err) => warn!(index, error = %err, "skipping malformed listing record"),
        }
    }

    if listings.len() < total {
        warn!(
            decoded = listings.len(),
            skipped = total - listings.len(),
            "listing batch contained malformed records"
        );
    }
    listings
}
