use crate::cli::ServeArgs;
use crate::infra::{
    load_overrides, AppState, InMemoryAssessmentStore, InMemoryOperationLog, StaticRoleDirectory,
};
use crate::routes::with_scoring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use persona_scoring::config::AppConfig;
use persona_scoring::error::AppError;
use persona_scoring::recalculation::RecalculationService;
use persona_scoring::telemetry;
use persona_scoring::ScoringEngine;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let overrides = load_overrides(&config.scoring)?;
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let assessments = Arc::new(InMemoryAssessmentStore::default());
    if config.auth.admin_tokens.is_empty() {
        warn!("no admin tokens configured; admin endpoints will reject every request");
    }
    let directory = Arc::new(StaticRoleDirectory::new(config.auth.admin_tokens.clone()));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        engine: Arc::new(ScoringEngine::new(overrides)),
        assessments: assessments.clone(),
        directory: directory.clone(),
    };

    let recalculation_service = Arc::new(RecalculationService::new(
        assessments,
        Arc::new(InMemoryOperationLog::default()),
        directory,
        config.recalculation,
    ));

    let app = with_scoring_routes(recalculation_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "persona scoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
