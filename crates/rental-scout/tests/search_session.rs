use axum::body::{to_bytes, Body};
use axum::extract::Query;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rental_scout::config::SearchServiceConfig;
use rental_scout::screening::{
    screening_router, Assumptions, HttpListingSource, ListingId, RankingFilters, ScreeningService,
    ScreeningServiceError, SearchError, SortKey,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

async fn scan(Query(params): Query<HashMap<String, String>>) -> Response {
    match params.get("city").map(String::as_str) {
        Some("Bozeman") => {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Json(json!({
                "results": [{ "zpid": 901, "price": 510000, "daysOnZillow": 12 }]
            }))
            .into_response()
        }
        Some("Whitefish") => Json(json!({
            "trending": true,
            "results": [
                { "zpid": 101, "price": 200000, "daysOnZillow": 2 },
                { "zpid": 102, "price": 415000, "zestimate": 450000, "daysOnZillow": 6 },
                { "zpid": 103 }
            ]
        }))
        .into_response(),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "search backend exploded").into_response(),
    }
}

async fn spawn_search_service() -> String {
    let app = Router::new().route("/scan", get(scan));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("search stub runs");
    });
    format!("http://{addr}")
}

async fn live_service() -> Arc<ScreeningService<HttpListingSource>> {
    let source = HttpListingSource::new(&SearchServiceConfig {
        base_url: spawn_search_service().await,
        timeout_secs: 5,
    })
    .expect("client builds");
    Arc::new(ScreeningService::new(Arc::new(source), Assumptions::default()))
}

fn listing_ids(service: &ScreeningService<HttpListingSource>) -> Vec<String> {
    service
        .view(&RankingFilters::default(), SortKey::CapRate)
        .report
        .listings
        .iter()
        .map(|view| view.listing.id().to_string())
        .collect()
}

#[tokio::test]
async fn live_search_enriches_and_flags_trending_market() {
    let service = live_service().await;

    let outcome = service.search("Whitefish", "mt").await.expect("search succeeds");
    assert!(outcome.applied);
    // The record without a price decodes but cannot be enriched.
    assert_eq!(outcome.listings, 3);

    let view = service.view(&RankingFilters::default(), SortKey::HeatScore);
    assert!(view.trending);
    assert_eq!(listing_ids(&service), vec!["101", "102"]);
    assert_eq!(view.report.excluded.len(), 1);
    assert_eq!(view.report.listings[0].heat_label, "double-flame");
}

#[tokio::test]
async fn slow_response_is_dropped_once_a_newer_search_lands() {
    let service = live_service().await;

    let slow = tokio::spawn({
        let service = service.clone();
        async move { service.search("Bozeman", "MT").await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let fast = service.search("Whitefish", "MT").await.expect("fast search");
    let slow = slow.await.expect("task joins").expect("slow search");

    assert!(fast.applied);
    assert!(!slow.applied);
    assert_eq!(listing_ids(&service), vec!["101", "102"]);
}

#[tokio::test]
async fn upstream_failure_empties_the_view_but_keeps_favorites() {
    let service = live_service().await;
    service.search("Whitefish", "MT").await.expect("first search");
    service.toggle_favorite(&ListingId::new("101"));

    let err = service
        .search("Missoula", "MT")
        .await
        .expect_err("upstream fails");
    assert!(matches!(
        err,
        ScreeningServiceError::Search(SearchError::Status(500))
    ));
    assert!(listing_ids(&service).is_empty());

    service.search("Whitefish", "MT").await.expect("recovers");
    let view = service.view(&RankingFilters::default(), SortKey::CapRate);
    let starred: Vec<&str> = view
        .report
        .favorites()
        .map(|listing| listing.listing.id().as_str())
        .collect();
    assert_eq!(starred, vec!["101"]);
}

#[tokio::test]
async fn http_surface_drives_the_same_session() {
    let service = live_service().await;
    let router = screening_router(service);

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/search")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "city": "Whitefish", "state": "MT" }).to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/listings?sort=priceHigh&min_cash_on_cash=0")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    let payload: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(payload["sort"], "priceHigh");
    assert_eq!(payload["totalListings"], 2);
    assert_eq!(payload["trending"], true);
    assert_eq!(payload["listings"][0]["zpid"], "102");
}
