use crate::config::ConfigError;
use crate::overrides::OverridesError;
use crate::recalculation::{AuthError, RecalculationError};
use crate::scoring::ResponseValidationError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Overrides(OverridesError),
    Responses(ResponseValidationError),
    Recalculation(RecalculationError),
    Auth(AuthError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Overrides(err) => write!(f, "scoring overrides error: {}", err),
            AppError::Responses(err) => write!(f, "invalid responses: {}", err),
            AppError::Recalculation(err) => write!(f, "recalculation error: {}", err),
            AppError::Auth(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Overrides(err) => Some(err),
            AppError::Responses(err) => Some(err),
            AppError::Recalculation(err) => Some(err),
            AppError::Auth(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Responses(_) | AppError::Overrides(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(AuthError::Unauthorized) => StatusCode::UNAUTHORIZED,
            AppError::Auth(AuthError::Forbidden) => StatusCode::FORBIDDEN,
            AppError::Auth(_)
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Recalculation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<OverridesError> for AppError {
    fn from(value: OverridesError) -> Self {
        Self::Overrides(value)
    }
}

impl From<ResponseValidationError> for AppError {
    fn from(value: ResponseValidationError) -> Self {
        Self::Responses(value)
    }
}

impl From<AuthError> for AppError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

impl From<RecalculationError> for AppError {
    fn from(value: RecalculationError) -> Self {
        Self::Recalculation(value)
    }
}
