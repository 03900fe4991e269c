use crate::cli::ServeArgs;
use crate::infra::{build_service, AppState};
use crate::routes::with_intelligence_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use demand_intel::config::AppConfig;
use demand_intel::error::AppError;
use demand_intel::telemetry;
use std::sync::atomic::Ordering;
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
    if let Some(dataset) = args.dataset.take() {
        config.engine.dataset_dir = Some(dataset);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = build_service(config.engine.dataset_dir.as_deref(), config.engine.clone())?;

    let app = with_intelligence_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        top_zips = config.engine.top_zips,
        "demand intelligence service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
