// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// Terminal request error. At most one exists per request: the request
/// context latches the first error raised and every later check or
/// business call short-circuits against it.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    // 400 Bad Request - caller sent a missing or malformed parameter
    InvalidParameter { field: String },

    // 403 Forbidden - session lacks the named permission
    PermissionDenied { permission: String },

    // 501 Not Implemented - license absent or feature flag disabled
    NotImplemented { feature: String },

    // Opaque application error with its own id and status. Surfaced
    // verbatim from the business facade, or raised by a handler for
    // conditions only known mid-flight (scope mismatch, bad session token).
    App {
        id: String,
        message: String,
        status: u16,
    },
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidParameter { .. } => 400,
            ApiError::PermissionDenied { .. } => 403,
            ApiError::NotImplemented { .. } => 501,
            ApiError::App { status, .. } => *status,
        }
    }

    /// Machine-readable error id for client handling
    pub fn error_id(&self) -> &str {
        match self {
            ApiError::InvalidParameter { .. } => "api.context.invalid_param",
            ApiError::PermissionDenied { .. } => "api.context.permission_denied",
            ApiError::NotImplemented { .. } => "api.context.feature_disabled",
            ApiError::App { id, .. } => id,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::InvalidParameter { field } => {
                format!("Invalid or missing parameter: {}", field)
            }
            ApiError::PermissionDenied { permission } => {
                format!("You do not have the appropriate permission: {}", permission)
            }
            ApiError::NotImplemented { feature } => {
                format!("Feature is not available on this server: {}", feature)
            }
            ApiError::App { message, .. } => message.clone(),
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "error": true,
            "id": self.error_id(),
            "message": self.message(),
            "status_code": self.status_code(),
        });

        match self {
            ApiError::InvalidParameter { field } => {
                body["field"] = json!(field);
            }
            ApiError::PermissionDenied { permission } => {
                body["permission"] = json!(permission);
            }
            ApiError::NotImplemented { feature } => {
                body["feature"] = json!(feature);
            }
            ApiError::App { .. } => {}
        }

        body
    }
}

// Static constructor methods
impl ApiError {
    pub fn invalid_param(field: impl Into<String>) -> Self {
        ApiError::InvalidParameter { field: field.into() }
    }

    pub fn permission_denied(permission: impl Into<String>) -> Self {
        ApiError::PermissionDenied { permission: permission.into() }
    }

    pub fn not_implemented(feature: impl Into<String>) -> Self {
        ApiError::NotImplemented { feature: feature.into() }
    }

    pub fn app(id: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        ApiError::App {
            id: id.into(),
            message: message.into(),
            status,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_id(), self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
