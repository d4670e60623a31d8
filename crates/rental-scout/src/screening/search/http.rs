use super::payload::{decode_listings, SearchPayload};
use super::{ListingSource, SearchError, SearchQuery, SearchResults};
use crate::config::SearchServiceConfig;
use async_trait::async_trait;
use tracing::{debug, info};

/// Client for the `GET /scan?city=..&state=..` search endpoint.
#[derive(Debug, Clone)]
pub struct HttpListingSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpListingSource {
    pub fn new(config: &SearchServiceConfig) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("rental-scout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SearchError::Transport)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn scan_url(&self) -> String {
        format!("{}/scan", self.base_url)
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn fetch(&self, query: &SearchQuery) -> Result<SearchResults, SearchError> {
        let url = self.scan_url();
        debug!(%url, city = %query.city, state = %query.state, "requesting listings");

        let response = self
            .client
            .get(&url)
            .query(&[("city", query.city.as_str()), ("state", query.state.as_str())])
            .send()
            .await
            .map_err(SearchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(SearchError::Transport)?;
        let payload: SearchPayload =
            serde_json::from_slice(&body).map_err(|err| SearchError::Decode(err.to_string()))?;
        let records = payload
            .results
            .ok_or_else(|| SearchError::Decode("response has no results array".to_string()))?;

        let listings = decode_listings(records);
        info!(
            city = %query.city,
            state = %query.state,
            listings = listings.len(),
            "listing search returned"
        );

        Ok(SearchResults {
            listings,
            trending: payload.trending.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    async fn scan(Query(params): Query<HashMap<String, String>>) -> axum::response::Response {
        match params.get("city").map(String::as_str) {
            Some("Whitefish") => Json(json!({
                "trending": true,
                "results": [
                    { "zpid": 11, "price": 349000, "zestimate": 360000, "daysOnZillow": 2 },
                    { "zpid": 12, "price": "n/a" },
                    { "zpid": 13, "price": 515000 }
                ]
            }))
            .into_response(),
            Some("Nowhere") => (StatusCode::SERVICE_UNAVAILABLE, "upstream down").into_response(),
            Some("Garbled") => (StatusCode::OK, "<html>oops</html>").into_response(),
            _ => Json(json!({ "detail": "no results key" })).into_response(),
        }
    }

    async fn spawn_search_service() -> String {
        let app = Router::new().route("/scan", get(scan));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server runs");
        });
        format!("http://{addr}")
    }

    fn source(base_url: String) -> HttpListingSource {
        HttpListingSource::new(&SearchServiceConfig {
            base_url,
            timeout_secs: 5,
        })
        .expect("client builds")
    }

    #[tokio::test]
    async fn fetch_decodes_results_and_trending_flag() {
        let source = source(spawn_search_service().await);
        let query = SearchQuery::new("Whitefish", "MT").expect("valid query");

        let results = source.fetch(&query).await.expect("search succeeds");

        assert!(results.trending);
        let ids: Vec<&str> = results
            .listings
            .iter()
            .map(|listing| listing.id.as_str())
            .collect();
        assert_eq!(ids, vec!["11", "13"]);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let source = source(spawn_search_service().await);
        let query = SearchQuery::new("Nowhere", "MT").expect("valid query");

        let err = source.fetch(&query).await.expect_err("status surfaces");
        assert!(matches!(err, SearchError::Status(503)));
    }

    #[tokio::test]
    async fn undecodable_body_is_an_error() {
        let source = source(spawn_search_service().await);
        for city in ["Garbled", "Elsewhere"] {
            let query = SearchQuery::new(city, "MT").expect("valid query");
            let err = source.fetch(&query).await.expect_err("decode fails");
            assert!(matches!(err, SearchError::Decode(_)), "{city}: {err}");
        }
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let source = source(format!("http://{addr}"));
        let query = SearchQuery::new("Whitefish", "MT").expect("valid query");
        let err = source.fetch(&query).await.expect_err("connection refused");
        assert!(matches!(err, SearchError::Transport(_)));
    }
}
