use crate::cli::ServeArgs;
use crate::infra::{build_lead_service, with_request_tracing, AppState};
use crate::routes::with_lead_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use lead_pipeline::config::AppConfig;
use lead_pipeline::error::AppError;
use lead_pipeline::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let lead_service = Arc::new(build_lead_service(&config)?);
    let rules_version = lead_service.rules().version;

    let app = with_request_tracing(with_lead_routes(lead_service).layer(Extension(app_state)))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        rules_version,
        max_batch_size = config.pipeline.max_batch_size,
        "lead pipeline ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
