use crate::error::AdTableError;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, CONTENT_DISPOSITION, CONTENT_TYPE,
};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub const CSV_FILENAME: &str = "generated_ads.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    MissingParameters,
    PayloadTooLarge,
    Generation,
    MalformedModelOutput,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameters => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Generation => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MalformedModelOutput => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingParameters => "Missing required parameters",
            Self::PayloadTooLarge => "Request body is too large",
            Self::Generation => "An error occurred during ad generation",
            Self::MalformedModelOutput => "The model returned malformed ad data",
        }
    }
}

impl From<&AdTableError> for ApiError {
    fn from(err: &AdTableError) -> Self {
        if err.is_malformed_output() {
            Self::MalformedModelOutput
        } else {
            Self::Generation
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
            Json(json!({ "error": self.message() })),
        )
            .into_response()
    }
}

pub fn csv_response(csv: String) -> Response {
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/csv".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", CSV_FILENAME),
            ),
            (ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()),
        ],
        csv,
    )
        .into_response()
}

pub fn preflight_response() -> Response {
    (
        StatusCode::NO_CONTENT,
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (ACCESS_CONTROL_ALLOW_METHODS, "POST"),
            (ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
            (ACCESS_CONTROL_MAX_AGE, "3600"),
        ],
    )
        .into_response()
}
