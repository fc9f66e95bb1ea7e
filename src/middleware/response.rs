use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

/// Encode a success payload with the handler's chosen status.
///
/// By the time we are here the request has succeeded and the status line
/// is decided; a serialization failure is logged and the status kept, it
/// never turns into a different client-visible error.
pub fn json_response<T: Serialize>(status: StatusCode, payload: &T) -> Response {
    match serde_json::to_vec(payload) {
        Ok(body) => (status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            tracing::warn!("Error while writing response: {}", e);
            status.into_response()
        }
    }
}

/// Bare success signal for operations with no payload
pub fn status_ok() -> Response {
    json_response(StatusCode::OK, &json!({"status": "OK"}))
}
