use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::auth::{bearer_token, AuthError, RoleDirectory};
use super::domain::{ApplyRequest, ListRequest};
use super::repository::{AssessmentStore, OperationLog};
use super::service::{RecalculationError, RecalculationService};

/// Router exposing the admin recalculation RPC.
pub fn recalculation_router<S, O, D>(service: Arc<RecalculationService<S, O, D>>) -> Router
where
    S: AssessmentStore + 'static,
    O: OperationLog + 'static,
    D: RoleDirectory + 'static,
{
    Router::new()
        .route(
            "/api/v1/admin/recalculate",
            post(recalculate_handler::<S, O, D>),
        )
        .with_state(service)
}

pub(crate) async fn recalculate_handler<S, O, D>(
    State(service): State<Arc<RecalculationService<S, O, D>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: AssessmentStore + 'static,
    O: OperationLog + 'static,
    D: RoleDirectory + 'static,
{
    let actor = match service.authorize(bearer_token(&headers)) {
        Ok(actor) => actor,
        Err(error) => return error_response(error),
    };

    // Decoded only once the caller is known to be an admin.
    let body: Value = match serde_json::from_slice(&body) {
        Ok(body) => body,
        Err(error) => return invalid_request(error),
    };

    match body.get("mode").and_then(Value::as_str) {
        Some("list") => match parse::<ListRequest>(body) {
            Ok(request) => match service.list(request) {
                Ok(page) => (StatusCode::OK, axum::Json(page)).into_response(),
                Err(error) => error_response(error),
            },
            Err(response) => response,
        },
        Some("apply") => match parse::<ApplyRequest>(body) {
            Ok(request) => match service.apply(&actor, request) {
                Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
                Err(error) => error_response(error),
            },
            Err(response) => response,
        },
        _ => {
            let payload = json!({
                "error": "Invalid mode",
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
    }
}

fn parse<T: DeserializeOwned>(body: Value) -> Result<T, Response> {
    serde_json::from_value(body).map_err(invalid_request)
}

fn invalid_request(error: serde_json::Error) -> Response {
    let payload = json!({
        "error": format!("Invalid request: {error}"),
    });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}

fn error_response(error: RecalculationError) -> Response {
    let status = match &error {
        RecalculationError::Auth(AuthError::Unauthorized) => StatusCode::UNAUTHORIZED,
        RecalculationError::Auth(AuthError::Forbidden) => StatusCode::FORBIDDEN,
        RecalculationError::OperationNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
