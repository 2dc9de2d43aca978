use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use service::errors::ServiceError;

/// Wire shape for failed requests.
#[derive(Debug, Serialize)]
struct ErrorBody {
    err: String,
    msg: String,
}

/// JSON error response carrying the `{err, msg}` body.
#[derive(Debug)]
pub struct JsonApiError {
    status: StatusCode,
    err: String,
    msg: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, err: impl Into<String>, msg: impl Into<String>) -> Self {
        Self { status, err: err.into(), msg: msg.into() }
    }

    /// Map a service failure onto the wire: absence is a 404, everything
    /// else a generic 500. `msg` is the human-readable route context.
    pub fn from_service(e: ServiceError, msg: &str) -> Self {
        match e {
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, e.to_string(), msg),
            _ => Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string(), msg),
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        error!(status = %self.status, err = %self.err, "{}", self.msg);
        (self.status, Json(ErrorBody { err: self.err, msg: self.msg })).into_response()
    }
}
