use metrics_exporter_prometheus::PrometheusHandle;
use rental_scout::config::AppConfig;
use rental_scout::error::AppError;
use rental_scout::screening::{HttpListingSource, ScreeningService};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type LiveScreeningService = ScreeningService<HttpListingSource>;

/// Screening service backed by the configured listing-search endpoint.
pub(crate) fn listing_service(config: &AppConfig) -> Result<Arc<LiveScreeningService>, AppError> {
    let source = HttpListingSource::new(&config.search)?;
    Ok(Arc::new(ScreeningService::new(
        Arc::new(source),
        config.defaults,
    )))
}
