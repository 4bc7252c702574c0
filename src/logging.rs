//! Middleware for logging requests and responses.

use axum::{
    body::{Body, to_bytes},
    extract::Request,
    http::{HeaderMap, HeaderValue, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    middleware::Next,
};

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level with the
/// `Authorization` header redacted. If a body is longer than
/// [LOG_BODY_LENGTH_LIMIT] characters, it is truncated and the full body is
/// logged at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_text = match read_body_text(body).await {
        Ok(body_text) => body_text,
        Err(error) => {
            tracing::warn!("Could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    log_message(
        &format!(
            "Received request: {} {}\nheaders: {:#?}",
            parts.method,
            parts.uri,
            redact_authorization(&parts.headers)
        ),
        "request",
        &body_text,
    );

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_text = match read_body_text(body).await {
        Ok(body_text) => body_text,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    log_message(
        &format!(
            "Sending response: {}\nheaders: {:#?}",
            parts.status, parts.headers
        ),
        "response",
        &body_text,
    );

    Response::from_parts(parts, body_text.into())
}

async fn read_body_text(body: Body) -> Result<String, axum::Error> {
    let body_bytes = to_bytes(body, usize::MAX).await?;

    Ok(String::from_utf8_lossy(&body_bytes).to_string())
}

fn redact_authorization(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();

    if let Some(value) = headers.get_mut(AUTHORIZATION) {
        *value = HeaderValue::from_static("********");
    }

    headers
}

const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The first [LOG_BODY_LENGTH_LIMIT] characters of `body`, or `None` if it is short enough.
fn truncate(body: &str) -> Option<&str> {
    body.char_indices()
        .nth(LOG_BODY_LENGTH_LIMIT)
        .map(|(end, _)| &body[..end])
}

fn log_message(message: &str, kind: &str, body: &str) {
    match truncate(body) {
        Some(truncated) => {
            tracing::info!("{message}\nbody: {truncated}...");
            tracing::debug!("Full {kind} body: {body:?}");
        }
        None => tracing::info!("{message}\nbody: {body:?}"),
    }
}
