use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::commands::ApiResponse;
use crate::domain::DomainError;

/// Successful envelope plus its status
pub struct ApiReply<T> {
    status: StatusCode,
    body: ApiResponse<T>,
}

impl<T> ApiReply<T> {
    pub fn ok(message: &str, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            body: ApiResponse::ok(message, Some(data)),
        }
    }

    pub fn created(message: &str, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            body: ApiResponse::ok(message, Some(data)),
        }
    }
}

impl ApiReply<()> {
    /// Success without data
    pub fn done(message: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: ApiResponse::ok(message, None),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiReply<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Failure envelope; upstream detail is logged, never returned
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError(err)
    }
}

pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
        DomainError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
        DomainError::PermissionDenied => StatusCode::FORBIDDEN,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::UpstreamFailure(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        match &self.0 {
            DomainError::UpstreamFailure(detail) => log::error!("Upstream failure: {}", detail),
            other => log::debug!("Request rejected: {}", other),
        }
        let body = ApiResponse::<()>::failure(self.0.public_message());
        (status, Json(body)).into_response()
    }
}

pub type HandlerResult<T> = Result<ApiReply<T>, ApiError>;
