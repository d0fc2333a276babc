use axum::extract::Request;
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::UpdateResponse;

/// Uniform error body. `details` describes the request path and is filled in by
/// [`describe_request_path`] on the way out.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetails {
    pub timestamp: DateTime<Utc>,
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

pub fn error(code: &str, message: impl Into<String>, status: StatusCode) -> Response {
    let body = ErrorDetails {
        timestamp: Utc::now(),
        code: code.to_string(),
        message: message.into(),
        details: None,
    };

    let mut response = (status, Json(body.clone())).into_response();
    response.extensions_mut().insert(body);
    response
}

/// Rewrites error bodies produced by [`error`] so they name the request path.
pub async fn describe_request_path(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let response = next.run(request).await;

    let Some(mut body) = response.extensions().get::<ErrorDetails>().cloned() else {
        return response;
    };
    body.details = Some(format!("uri={path}"));

    let (mut parts, _) = response.into_parts();
    parts.extensions.remove::<ErrorDetails>();
    (parts, Json(body)).into_response()
}

/// 201 with a `Location` header pointing at the new resource.
pub fn created<T: Serialize>(location: &str, body: T) -> Response {
    with_location(StatusCode::CREATED, location, Json(body))
}

/// 200 with a `Location` header.
pub fn ok_at<T: Serialize>(location: &str, body: T) -> Response {
    with_location(StatusCode::OK, location, Json(body))
}

/// Answer to a full replace, shaped by the configured [`UpdateResponse`].
pub fn replaced<T: Serialize>(mode: UpdateResponse, location: &str, body: T) -> Response {
    match mode {
        UpdateResponse::Body => ok_at(location, body),
        UpdateResponse::NoContent => with_location(StatusCode::NO_CONTENT, location, ()),
    }
}

fn with_location(status: StatusCode, location: &str, body: impl IntoResponse) -> Response {
    let mut response = (status, body).into_response();
    match HeaderValue::from_str(location) {
        Ok(value) => {
            response.headers_mut().insert(header::LOCATION, value);
        }
        Err(e) => {
            tracing::warn!(location, error = %e, "Skipping invalid Location header");
        }
    }
    response
}
