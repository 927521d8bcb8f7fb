use crate::infra::AppState;
use axum::extract::Query;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::Utc;
use persona_scoring::error::AppError;
use persona_scoring::overrides::{
    auto_fix_overrides, validate_complete_overrides, OverridesError, ValidationOptions,
    ValidationReport,
};
use persona_scoring::recalculation::{
    authorize_admin, bearer_token, recalculation_router, AssessmentId, AssessmentStore,
    OperationLog, RecalculationError, RecalculationService, RoleDirectory, StoredAssessment,
};
use persona_scoring::scoring::{ClarificationExchange, IntegralAnswer, IntegralSource};
use persona_scoring::{PersonalityProfile, ScoringOverrides};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScoreRequest {
    pub(crate) responses: Value,
    #[serde(default)]
    pub(crate) integral_answers: Vec<IntegralAnswer>,
    /// Follow-up exchange refining the questionnaire answers.
    #[serde(default)]
    pub(crate) clarification: Option<ClarificationExchange>,
    /// Estimate the integral level from trait scores when no answers are supplied.
    #[serde(default)]
    pub(crate) estimate_integral: bool,
}

impl ScoreRequest {
    fn integral_source(&self) -> IntegralSource<'_> {
        if !self.integral_answers.is_empty() {
            IntegralSource::Answers {
                answers: &self.integral_answers,
                clarification: self.clarification.as_ref(),
            }
        } else if self.estimate_integral {
            IntegralSource::Traits
        } else {
            IntegralSource::Skip
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssessmentRequest {
    pub(crate) user_id: String,
    #[serde(default = "default_variant")]
    pub(crate) variant: String,
    #[serde(flatten)]
    pub(crate) score: ScoreRequest,
}

fn default_variant() -> String {
    "standard".to_string()
}

#[derive(Debug, Serialize)]
pub(crate) struct AssessmentResponse {
    pub(crate) id: AssessmentId,
    pub(crate) profile: PersonalityProfile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ValidateQuery {
    #[serde(default)]
    pub(crate) autofix: bool,
    #[serde(default)]
    pub(crate) max_deviation: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OverridesValidationResponse {
    #[serde(flatten)]
    pub(crate) report: ValidationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) fixed: Option<ScoringOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) fixed_report: Option<ValidationReport>,
}

pub(crate) fn with_scoring_routes<S, O, D>(
    service: Arc<RecalculationService<S, O, D>>,
) -> axum::Router
where
    S: AssessmentStore + 'static,
    O: OperationLog + 'static,
    D: RoleDirectory + 'static,
{
    recalculation_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/profiles", axum::routing::post(score_endpoint))
        .route(
            "/api/v1/assessments",
            axum::routing::post(submit_assessment_endpoint),
        )
        .route(
            "/api/v1/scoring/overrides/validate",
            axum::routing::post(validate_overrides_endpoint),
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

pub(crate) async fn score_endpoint(
    Extension(state): Extension<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<PersonalityProfile>, AppError> {
    let profile = state
        .engine
        .score_json(&request.responses, request.integral_source())?;
    Ok(Json(profile))
}

pub(crate) async fn submit_assessment_endpoint(
    Extension(state): Extension<AppState>,
    Json(request): Json<AssessmentRequest>,
) -> Result<(StatusCode, Json<AssessmentResponse>), AppError> {
    let profile = state
        .engine
        .score_json(&request.score.responses, request.score.integral_source())?;
    let profile_value = serde_json::to_value(&profile).map_err(|err| AppError::Io(err.into()))?;

    let id = AssessmentId(Uuid::new_v4().to_string());
    state
        .assessments
        .insert(StoredAssessment {
            id: id.clone(),
            responses: request.score.responses,
            profile: Some(profile_value),
            user_id: request.user_id,
            variant: request.variant,
            updated_at: Utc::now(),
        })
        .map_err(RecalculationError::Store)?;

    Ok((StatusCode::CREATED, Json(AssessmentResponse { id, profile })))
}

/// Admin tooling: checks a candidate overrides document before it is deployed.
pub(crate) async fn validate_overrides_endpoint(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
    Query(query): Query<ValidateQuery>,
    Json(document): Json<Value>,
) -> Result<Json<OverridesValidationResponse>, AppError> {
    authorize_admin(state.directory.as_ref(), bearer_token(&headers))?;
    let overrides: ScoringOverrides =
        serde_json::from_value(document).map_err(OverridesError::Parse)?;
    let options = ValidationOptions {
        max_total_deviation: query
            .max_deviation
            .unwrap_or(ValidationOptions::default().max_total_deviation),
        ..ValidationOptions::default()
    };

    let report = validate_complete_overrides(&overrides, &options);
    let (fixed, fixed_report) = if query.autofix {
        let fixed = auto_fix_overrides(&overrides);
        let fixed_report = validate_complete_overrides(&fixed, &options);
        (Some(fixed), Some(fixed_report))
    } else {
        (None, None)
    };

    Ok(Json(OverridesValidationResponse {
        report,
        fixed,
        fixed_report,
    }))
}
