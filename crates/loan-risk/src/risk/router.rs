use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::narrative::{NarrativeGenerator, NarrativeRequest};
use super::profile::CustomerProfile;
use super::repository::{AssessmentId, AssessmentRepository, RepositoryError};
use super::service::{
    AssessmentService, AssessmentServiceError, AssessmentSubmission, DEFAULT_HISTORY_LIMIT,
};

/// Router builder exposing scoring, analysis, and history endpoints.
pub fn risk_router<R, G>(service: Arc<AssessmentService<R, G>>) -> Router
where
    R: AssessmentRepository + 'static,
    G: NarrativeGenerator + 'static,
{
    Router::new()
        .route("/api/v1/risk/score", post(score_handler::<R, G>))
        .route("/api/v1/risk/analysis", post(analysis_handler::<R, G>))
        .route(
            "/api/generate-risk-analysis",
            post(legacy_analysis_handler::<R, G>),
        )
        .route(
            "/api/v1/risk/assessments",
            post(assess_handler::<R, G>).get(history_handler::<R, G>),
        )
        .route(
            "/api/v1/risk/assessments/:assessment_id",
            get(assessment_handler::<R, G>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HistoryQuery {
    pub(crate) limit: Option<usize>,
}

pub(crate) async fn score_handler<R, G>(
    State(service): State<Arc<AssessmentService<R, G>>>,
    Json(profile): Json<CustomerProfile>,
) -> Response
where
    R: AssessmentRepository + 'static,
    G: NarrativeGenerator + 'static,
{
    let result = service.score(&profile);
    (StatusCode::OK, Json(result)).into_response()
}

pub(crate) async fn analysis_handler<R, G>(
    State(service): State<Arc<AssessmentService<R, G>>>,
    Json(request): Json<NarrativeRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    G: NarrativeGenerator + 'static,
{
    let outcome = service.analyze(&request).await;
    (StatusCode::OK, Json(outcome)).into_response()
}

pub(crate) async fn legacy_analysis_handler<R, G>(
    State(service): State<Arc<AssessmentService<R, G>>>,
    Json(request): Json<NarrativeRequest>,
) -> Response
where
    R: AssessmentRepository + 'static,
    G: NarrativeGenerator + 'static,
{
    match service.narrate(&request).await {
        Ok(analysis) => (StatusCode::OK, Json(json!({ "analysis": analysis }))).into_response(),
        Err(err) => {
            error!(error = %err, "error generating analysis");
            let payload = json!({ "error": "Failed to generate analysis" });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn assess_handler<R, G>(
    State(service): State<Arc<AssessmentService<R, G>>>,
    Json(submission): Json<AssessmentSubmission>,
) -> Response
where
    R: AssessmentRepository + 'static,
    G: NarrativeGenerator + 'static,
{
    match service.assess(submission) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(AssessmentServiceError::Repository(RepositoryError::Conflict)) => {
            let payload = json!({ "error": "assessment already exists" });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn history_handler<R, G>(
    State(service): State<Arc<AssessmentService<R, G>>>,
    Query(query): Query<HistoryQuery>,
) -> Response
where
    R: AssessmentRepository + 'static,
    G: NarrativeGenerator + 'static,
{
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    match service.history(limit) {
        Ok(records) => {
            let rows: Vec<_> = records.iter().map(|record| record.summary_view()).collect();
            (StatusCode::OK, Json(rows)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn assessment_handler<R, G>(
    State(service): State<Arc<AssessmentService<R, G>>>,
    Path(assessment_id): Path<String>,
) -> Response
where
    R: AssessmentRepository + 'static,
    G: NarrativeGenerator + 'static,
{
    let id = AssessmentId(assessment_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(AssessmentServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "error": "assessment not found",
                "id": id.0,
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

fn internal_error(err: AssessmentServiceError) -> Response {
    let payload = json!({ "error": err.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
