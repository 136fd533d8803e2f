use crate::error::{LightError, SessionError, ValidationError};
use axum::{
    extract::rejection::JsonRejection,
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Error returned by API handlers, rendered as `{"detail": "..."}`
#[derive(Debug)]
pub enum ApiError {
    Session(SessionError),
    Validation(ValidationError),
    Light(LightError),
    /// Request body could not be read as the expected JSON
    BadRequest(String),
}

/// JSON body extractor whose rejections render as `{"detail": "..."}`
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Session(SessionError::AlreadyRunning)
            | ApiError::Session(SessionError::NotRunning) => StatusCode::BAD_REQUEST,
            ApiError::Session(SessionError::AdapterUnavailable { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Light(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn detail(&self) -> String {
        match self {
            ApiError::Session(e) => e.to_string(),
            ApiError::Validation(e) => e.to_string(),
            ApiError::Light(e) => e.to_string(),
            ApiError::BadRequest(details) => details.clone(),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        ApiError::Session(e)
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}

impl From<LightError> for ApiError {
    fn from(e: LightError) -> Self {
        ApiError::Light(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self.detail());
        }
        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}
