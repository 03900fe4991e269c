use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use demand_intel::error::AppError;
use demand_intel::intelligence::{
    breakdown, intelligence_router, Household, IntelligenceService, IntelligenceStore,
    ScoreBreakdown, ServiceCategory,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Ad-hoc scoring of a single household, no tenant data involved.
#[derive(Debug, Deserialize)]
pub(crate) struct ScoreBreakdownRequest {
    pub(crate) service_category: String,
    pub(crate) household: Household,
}

pub(crate) fn with_intelligence_routes<S>(service: Arc<IntelligenceService<S>>) -> axum::Router
where
    S: IntelligenceStore + 'static,
{
    intelligence_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/intelligence/score-breakdown",
            axum::routing::post(score_breakdown_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn score_breakdown_endpoint(
    Json(payload): Json<ScoreBreakdownRequest>,
) -> Result<Json<ScoreBreakdown>, AppError> {
    let category: ServiceCategory = payload.service_category.parse()?;
    Ok(Json(breakdown(&payload.household, category)))
}
