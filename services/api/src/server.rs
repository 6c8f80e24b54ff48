use crate::cli::ServeArgs;
use crate::infra::{seed_store, AppState};
use crate::routes::with_registry_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use research_scholar::config::AppConfig;
use research_scholar::error::AppError;
use research_scholar::registry::{MemoryOutbox, RegistryService};
use research_scholar::telemetry;
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

    let store = Arc::new(seed_store(args.roster.as_deref())?);
    let outbox = Arc::new(MemoryOutbox::default());
    let service = Arc::new(RegistryService::new(store, outbox, config.supervision));

    let app = with_registry_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        warning_band = config.supervision.warning_band,
        "research scholar registry ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
