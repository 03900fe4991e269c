use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::ClientId;
use super::report::{
    IntelligenceService, ProfileRequest, ReportFilter, ReportId, ReportRequest, ZipRankingRequest,
};
use super::store::IntelligenceStore;
use super::IntelligenceError;

/// Header carrying the tenant identifier resolved by the upstream gateway.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Router builder exposing report, profile and ZIP ranking endpoints.
pub fn intelligence_router<S>(service: Arc<IntelligenceService<S>>) -> Router
where
    S: IntelligenceStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/intelligence/reports",
            post(create_report_handler::<S>).get(list_reports_handler::<S>),
        )
        .route(
            "/api/v1/intelligence/reports/:report_id",
            get(get_report_handler::<S>),
        )
        .route(
            "/api/v1/intelligence/buyer-profile",
            post(buyer_profile_handler::<S>),
        )
        .route(
            "/api/v1/intelligence/zip-rankings",
            post(zip_rankings_handler::<S>),
        )
        .with_state(service)
}

fn client_id(headers: &HeaderMap) -> Result<ClientId, Response> {
    headers
        .get(CLIENT_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ClientId::new)
        .ok_or_else(|| {
            let payload = json!({ "error": format!("missing {CLIENT_ID_HEADER} header") });
            (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
        })
}

fn error_response(error: IntelligenceError) -> Response {
    let status = match &error {
        IntelligenceError::InvalidCategory(_) | IntelligenceError::InvalidScoreThreshold(_) => {
            StatusCode::BAD_REQUEST
        }
        IntelligenceError::GeographyNotFound(_) | IntelligenceError::ReportNotFound => {
            StatusCode::NOT_FOUND
        }
        IntelligenceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

pub(crate) async fn create_report_handler<S>(
    State(service): State<Arc<IntelligenceService<S>>>,
    headers: HeaderMap,
    Json(request): Json<ReportRequest>,
) -> Response
where
    S: IntelligenceStore + 'static,
{
    let client_id = match client_id(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match service.generate_report(&client_id, request) {
        Ok(report) => (StatusCode::CREATED, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_reports_handler<S>(
    State(service): State<Arc<IntelligenceService<S>>>,
    headers: HeaderMap,
    Query(filter): Query<ReportFilter>,
) -> Response
where
    S: IntelligenceStore + 'static,
{
    let client_id = match client_id(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match service.list_reports(&client_id, &filter) {
        Ok(reports) => (StatusCode::OK, Json(reports)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_report_handler<S>(
    State(service): State<Arc<IntelligenceService<S>>>,
    headers: HeaderMap,
    Path(report_id): Path<String>,
) -> Response
where
    S: IntelligenceStore + 'static,
{
    let client_id = match client_id(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match service.get_report(&client_id, &ReportId(report_id)) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn buyer_profile_handler<S>(
    State(service): State<Arc<IntelligenceService<S>>>,
    headers: HeaderMap,
    Json(request): Json<ProfileRequest>,
) -> Response
where
    S: IntelligenceStore + 'static,
{
    let client_id = match client_id(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match service.buyer_profile(&client_id, &request) {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn zip_rankings_handler<S>(
    State(service): State<Arc<IntelligenceService<S>>>,
    headers: HeaderMap,
    Json(request): Json<ZipRankingRequest>,
) -> Response
where
    S: IntelligenceStore + 'static,
{
    let client_id = match client_id(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match service.rank_zip_codes(&client_id, &request) {
        Ok(rankings) => (StatusCode::OK, Json(rankings)).into_response(),
        Err(error) => error_response(error),
    }
}
