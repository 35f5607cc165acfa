use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";
pub const UNREADABLE_REQUEST: &str = "Unreadable request";
pub const INVALID_FORM_DATA: &str = "Invalid form data";
pub const COULD_NOT_SEND_MESSAGE: &str = "Failed to send email. Please try again later.";

pub fn internal_server_error(err: impl Into<anyhow::Error>) -> Response {
    let err = err.into();
    tracing::error!("internal server error: {err:#}");
    error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
}

pub fn error(code: StatusCode, detail: &'static str) -> Response {
    (code, Json(ApiError { detail })).into_response()
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub detail: &'static str,
}
