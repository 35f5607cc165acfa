use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use forge_core_contact_contracts::{ContactSendMessageError, ContactService};
use forge_models::contact::ContactMessage;
use serde_json::Value;
use tracing::info;

use crate::{
    errors::{
        error, internal_server_error, COULD_NOT_SEND_MESSAGE, INVALID_FORM_DATA,
        UNREADABLE_REQUEST,
    },
    models::contact::{parse_contact_form, ApiContactResponse, ApiValidationError},
};

pub fn router(service: Arc<impl ContactService>) -> Router<()> {
    Router::new()
        .route("/api/contact", routing::post(send_message))
        .with_state(service)
}

async fn send_message(
    service: State<Arc<impl ContactService>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(payload @ Value::Object(_))) => payload,
        Ok(Json(payload)) => {
            info!(kind = json_kind(&payload), "rejecting contact request without a json object");
            return unreadable_request();
        }
        Err(err) => {
            info!("rejecting unreadable contact request: {err}");
            return unreadable_request();
        }
    };

    let message = match ContactMessage::validate(parse_contact_form(payload)) {
        Ok(message) => message,
        Err(err) => {
            let fields = err.fields().map(|f| f.as_str()).collect::<Vec<_>>();
            info!(?fields, "rejecting invalid contact form submission");
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiValidationError::new(INVALID_FORM_DATA, &err)),
            )
                .into_response();
        }
    };

    match service.send_message(message).await {
        Ok(()) => Json(ApiContactResponse::SENT).into_response(),
        Err(ContactSendMessageError::Send(_)) => {
            error(StatusCode::INTERNAL_SERVER_ERROR, COULD_NOT_SEND_MESSAGE)
        }
        Err(ContactSendMessageError::Other(err)) => internal_server_error(err),
    }
}

fn unreadable_request() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiValidationError {
            detail: UNREADABLE_REQUEST,
            errors: Vec::new(),
        }),
    )
        .into_response()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
