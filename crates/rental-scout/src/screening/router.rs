use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::domain::{Assumptions, ListingId, RankingFilters, SortKey};
use super::search::payload::decode_listings;
use super::search::{ListingSource, SearchError};
use super::service::{ScreeningService, ScreeningServiceError};
use super::session::ScreeningSession;

/// Router exposing the screening session and the stateless screening endpoint.
pub fn screening_router<S>(service: Arc<ScreeningService<S>>) -> Router
where
    S: ListingSource + 'static,
{
    Router::new()
        .route("/api/v1/listings/screen", post(screen_handler::<S>))
        .route("/api/v1/listings", get(listings_handler::<S>))
        .route("/api/v1/search", post(search_handler::<S>))
        .route("/api/v1/assumptions", put(assumptions_handler::<S>))
        .route(
            "/api/v1/favorites/{listing_id}",
            post(favorite_handler::<S>),
        )
        .with_state(service)
}

/// Query string of `GET /api/v1/listings`.
#[derive(Debug, Default, Deserialize)]
pub struct ListingsQuery {
    pub sort: Option<String>,
    #[serde(alias = "minCapRate")]
    pub min_cap_rate: Option<f64>,
    #[serde(alias = "minCocReturn", alias = "minCashOnCash")]
    pub min_cash_on_cash: Option<f64>,
}

impl ListingsQuery {
    fn sort_key(&self) -> Result<SortKey, String> {
        self.sort
            .as_deref()
            .map(str::parse::<SortKey>)
            .transpose()
            .map(Option::unwrap_or_default)
    }

    fn filters(&self) -> RankingFilters {
        RankingFilters {
            min_cap_rate: self.min_cap_rate,
            min_cash_on_cash: self.min_cash_on_cash,
        }
    }
}

/// Body of `POST /api/v1/listings/screen`.
#[derive(Debug, Deserialize)]
pub struct ScreenRequest {
    pub listings: Vec<Value>,
    #[serde(default)]
    pub assumptions: Option<Assumptions>,
    #[serde(default)]
    pub filters: Option<RankingFilters>,
    #[serde(default)]
    pub sort: Option<SortKey>,
    #[serde(default)]
    pub favorites: Vec<ListingId>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub city: String,
    pub state: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({ "error": message.into() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn screen_handler<S>(
    State(service): State<Arc<ScreeningService<S>>>,
    axum::Json(request): axum::Json<ScreenRequest>,
) -> Response
where
    S: ListingSource + 'static,
{
    let assumptions = request
        .assumptions
        .unwrap_or_else(|| service.defaults())
        .clamp_to_surface();
    let filters = request.filters.unwrap_or_default().clamp_to_surface();
    let sort = request.sort.unwrap_or_default();

    let mut session = ScreeningSession::new(assumptions);
    session.replace_listings(decode_listings(request.listings));
    for id in &request.favorites {
        session.toggle_favorite(id);
    }

    (StatusCode::OK, axum::Json(session.view(&filters, sort))).into_response()
}

pub(crate) async fn listings_handler<S>(
    State(service): State<Arc<ScreeningService<S>>>,
    Query(query): Query<ListingsQuery>,
) -> Response
where
    S: ListingSource + 'static,
{
    match query.sort_key() {
        Ok(sort) => {
            let view = service.view(&query.filters(), sort);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(message) => error_response(StatusCode::BAD_REQUEST, message),
    }
}

pub(crate) async fn search_handler<S>(
    State(service): State<Arc<ScreeningService<S>>>,
    axum::Json(request): axum::Json<SearchRequest>,
) -> Response
where
    S: ListingSource + 'static,
{
    match service.search(&request.city, &request.state).await {
        Ok(outcome) => {
            let view = service.view(&RankingFilters::default(), SortKey::default());
            let payload = json!({
                "search": outcome,
                "view": view,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(ScreeningServiceError::Search(error @ SearchError::InvalidQuery(_))) => {
            error_response(StatusCode::BAD_REQUEST, error.to_string())
        }
        Err(ScreeningServiceError::Search(error)) => {
            // The working set is already cleared; report why it is empty.
            error_response(StatusCode::BAD_GATEWAY, error.to_string())
        }
        Err(other) => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

pub(crate) async fn assumptions_handler<S>(
    State(service): State<Arc<ScreeningService<S>>>,
    axum::Json(assumptions): axum::Json<Assumptions>,
) -> Response
where
    S: ListingSource + 'static,
{
    service.set_assumptions(assumptions);
    let view = service.view(&RankingFilters::default(), SortKey::default());
    (StatusCode::OK, axum::Json(view)).into_response()
}

pub(crate) async fn favorite_handler<S>(
    State(service): State<Arc<ScreeningService<S>>>,
    Path(listing_id): Path<String>,
) -> Response
where
    S: ListingSource + 'static,
{
    let listing_id = listing_id.trim();
    if listing_id.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "listing id must not be empty");
    }

    let id = ListingId::new(listing_id);
    let is_favorite = service.toggle_favorite(&id);
    let payload = json!({
        "listingId": id,
        "isFavorite": is_favorite,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}
