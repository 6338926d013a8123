use axum::extract::Request;
use axum::http::HeaderName;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use lead_pipeline::config::AppConfig;
use lead_pipeline::error::AppError;
use lead_pipeline::workflows::leads::{ColumnMap, LeadService, Ruleset, RulesStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::info;

pub(crate) static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Builds the lead service from configuration, creating the rules file with
/// defaults when a path is configured but missing.
pub(crate) fn build_lead_service(config: &AppConfig) -> Result<LeadService, AppError> {
    let ruleset = match config.rules.path.as_deref() {
        Some(path) => Ruleset::load_or_init(path)?,
        None => Ruleset::default(),
    };
    let store = Arc::new(RulesStore::new(ruleset)?);

    let service =
        LeadService::new(store).with_max_batch_size(config.pipeline.max_batch_size);
    Ok(match config.rules.path.clone() {
        Some(path) => service.with_rules_path(path),
        None => service,
    })
}

/// Reads an existing rules file, or falls back to the built-in defaults.
pub(crate) fn load_ruleset(path: Option<&Path>) -> Result<Ruleset, AppError> {
    match path {
        Some(path) => Ok(Ruleset::read(path)?),
        None => Ok(Ruleset::default()),
    }
}

pub(crate) fn parse_column_map(raw: &str) -> Result<ColumnMap, String> {
    ColumnMap::from_json(raw).map_err(|err| format!("failed to parse column map '{raw}' ({err})"))
}

/// Request logging and `X-Request-ID` handling, applied bottom-up: the id is
/// set (a UUID unless the caller sent one), logged, then copied to the response.
pub(crate) fn with_request_tracing(router: Router) -> Router {
    router
        .layer(middleware::from_fn(log_requests))
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID.clone()))
        .layer(SetRequestIdLayer::new(X_REQUEST_ID.clone(), MakeRequestUuid))
}

/// Logs one structured line per request, tagged with the id set upstream.
pub(crate) async fn log_requests(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let method = request.method().clone();
    let endpoint = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let latency_ms = (started.elapsed().as_secs_f64() * 100_000.0).round() / 100.0;

    info!(
        request_id = %request_id,
        endpoint = %endpoint,
        method = %method,
        status = response.status().as_u16(),
        latency_ms,
        "request completed"
    );

    response
}
