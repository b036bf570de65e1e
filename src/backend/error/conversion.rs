/**
 * Error Conversion
 *
 * `IntoResponse` for `BackendError`, so handlers can return it directly.
 *
 * # Response Format
 *
 * Validation failures:
 * ```json
 * { "errors": [{ "param": "name", "msg": "Please provide a project name." }], "status": 422 }
 * ```
 *
 * Everything else:
 * ```json
 * { "msg": "Ticket not found", "status": 404 }
 * ```
 *
 * Server errors are logged here with their full details before the generic
 * body goes out.
 */

use axum::{
    response::{IntoResponse, Json, Response},
};
use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected ({}): {}", status.as_u16(), self);
        }

        let body = match self.field_errors() {
            Some(errors) => serde_json::json!({
                "errors": errors,
                "status": status.as_u16(),
            }),
            None => serde_json::json!({
                "msg": self.message(),
                "status": status.as_u16(),
            }),
        };

        (status, Json(body)).into_response()
    }
}
