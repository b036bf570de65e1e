/**
 * Request Validation
 *
 * Handlers validate every field before touching the store. A `Validator`
 * collects one `FieldError` per failed check, in check order, so a single
 * response can report every problem with a request at once:
 *
 * ```json
 * { "errors": [{ "param": "name", "msg": "Please provide a project name." }], "status": 422 }
 * ```
 *
 * Request bodies use `Option<String>` fields, so a missing field and a
 * blank one are reported the same way. Bodies are read through `JsonBody`,
 * which reports a malformed body or a wrongly typed field in the same
 * `{ errors: [{ param, msg }] }` shape instead of axum's plain-text rejection.
 */

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::str::FromStr;

use crate::backend::error::BackendError;
use crate::shared::FieldError;

/// Collects field errors for one request
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `param`
    pub fn push(&mut self, param: &str, msg: &str) {
        self.errors.push(FieldError::new(param, msg));
    }

    /// Record a failure unless `ok`
    pub fn check(&mut self, ok: bool, param: &str, msg: &str) {
        if !ok {
            self.push(param, msg);
        }
    }

    /// Trimmed, non-blank value of a required field
    pub fn required(&mut self, param: &str, value: Option<&str>, msg: &str) -> Option<String> {
        match non_blank(value) {
            Some(v) => Some(v.to_string()),
            None => {
                self.push(param, msg);
                None
            }
        }
    }

    /// Required field parsed with `FromStr` (ticket enums, roles, ids)
    pub fn parse<T: FromStr>(&mut self, param: &str, value: Option<&str>, msg: &str) -> Option<T> {
        let parsed = non_blank(value).and_then(|v| v.parse::<T>().ok());
        if parsed.is_none() {
            self.push(param, msg);
        }
        parsed
    }

    /// Optional field parsed with `FromStr`; blank means absent
    pub fn parse_optional<T: FromStr>(
        &mut self,
        param: &str,
        value: Option<&str>,
        msg: &str,
    ) -> Option<T> {
        let raw = non_blank(value)?;
        match raw.parse::<T>() {
            Ok(v) => Some(v),
            Err(_) => {
                self.push(param, msg);
                None
            }
        }
    }

    /// Required date field
    pub fn date(&mut self, param: &str, value: Option<&str>, msg: &str) -> Option<DateTime<Utc>> {
        let parsed = non_blank(value).and_then(parse_date);
        if parsed.is_none() {
            self.push(param, msg);
        }
        parsed
    }

    /// Optional date field; blank means absent
    pub fn date_optional(
        &mut self,
        param: &str,
        value: Option<&str>,
        msg: &str,
    ) -> Option<DateTime<Utc>> {
        let raw = non_blank(value)?;
        let parsed = parse_date(raw);
        if parsed.is_none() {
            self.push(param, msg);
        }
        parsed
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fail with every collected error, or succeed if there are none
    pub fn finish(self, status: StatusCode) -> Result<(), BackendError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(BackendError::validation(status, self.errors))
        }
    }
}

/// JSON request body whose rejections render as field errors
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(body_rejection(&rejection)),
        }
    }
}

fn body_rejection(rejection: &JsonRejection) -> BackendError {
    let status = rejection.status();
    let error = match rejection {
        JsonRejection::JsonDataError(err) => data_error_field(&err.body_text()),
        JsonRejection::JsonSyntaxError(_) => {
            FieldError::new("body", "The request body is not valid JSON.")
        }
        JsonRejection::MissingJsonContentType(_) => {
            FieldError::new("body", "Expected a request with `Content-Type: application/json`.")
        }
        other => FieldError::new("body", other.body_text()),
    };
    BackendError::validation(status, vec![error])
}

/// Split axum's data error text into the offending field and serde's message
///
/// The text reads `<prefix>: <path>: <message> at line L column C`, where the
/// path is absent when the whole body has the wrong shape.
fn data_error_field(text: &str) -> FieldError {
    let detail = text.split_once(": ").map_or(text, |(_, rest)| rest);
    let detail = detail.split(" at line ").next().unwrap_or(detail);
    match detail.split_once(": ") {
        Some((path, msg)) if !path.is_empty() && !path.contains(' ') => {
            let param = path.split(['[', '.']).next().unwrap_or(path);
            FieldError::new(param, msg)
        }
        _ => FieldError::new("body", detail),
    }
}

/// Body of every `PUT .../comment/{id}` route
#[derive(Debug, Default, Deserialize)]
pub struct CommentRequest {
    pub text: Option<String>,
}

impl CommentRequest {
    /// Trimmed comment text; blank text is a 400 with a field error
    pub fn text(&self) -> Result<String, BackendError> {
        let mut v = Validator::new();
        let text = v.required(
            "text",
            self.text.as_deref(),
            "Please provide text in the comment field.",
        );
        v.finish(StatusCode::BAD_REQUEST)?;
        Ok(text.unwrap_or_default())
    }
}

/// Trimmed value, or `None` when missing or blank
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC)
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Usernames are 3-30 chars, start with a letter, then letters, digits or `_`
pub fn is_valid_username(username: &str) -> bool {
    if username.len() < 3 || username.len() > 30 {
        return false;
    }

    let mut chars = username.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Minimal shape check: one `@` with something on both sides
pub fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !email.contains(' ')
        }
        None => false,
    }
}
