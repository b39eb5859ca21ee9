use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::error::{AppError, ErrorReport};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

pub mod codes {
    pub const INVALID_FILTERS: &str = "invalid_filters";
    pub const INVALID_LIMIT: &str = "invalid_limit";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const UPSTREAM: &str = "upstream_error";
    pub const INTERNAL: &str = "internal_error";
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
    report: Option<ErrorReport>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
            report: None,
        }
    }

    pub fn invalid_filters(hint: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_FILTERS,
            "`filters` must be a JSON array of filter clauses",
            Some(hint.into()),
        )
    }

    pub fn invalid_limit(hint: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_LIMIT,
            "`limit` must be a positive integer",
            Some(hint.into()),
        )
    }

    pub fn upstream_failed() -> Self {
        Self::new(
            StatusCode::BAD_GATEWAY,
            codes::UPSTREAM,
            "Upstream fetch failed",
            None,
        )
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::INTERNAL,
            "Unexpected error occurred",
            None,
        )
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        let mut api = match &error {
            AppError::Validation(message) => Self::new(
                StatusCode::BAD_REQUEST,
                codes::INVALID_INPUT,
                "Request could not be processed",
                Some(message.clone()),
            ),
            AppError::Upstream(_) => Self::upstream_failed(),
            AppError::Infra(_) | AppError::Unexpected(_) => Self::internal(),
        };
        api.report = Some(ErrorReport::from_error(
            "infra::http::api",
            api.status,
            &error,
        ));
        api
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let report = self.report.unwrap_or_else(|| {
            ErrorReport::from_message(
                "infra::http::api",
                self.status,
                format!(
                    "{}: {}",
                    self.code,
                    self.hint.as_deref().unwrap_or(self.message)
                ),
            )
        });
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint: self.hint,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        report.attach(&mut response);
        response
    }
}
