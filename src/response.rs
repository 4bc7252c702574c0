//! The uniform JSON envelope wrapped around every API response.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts},
    http::{HeaderValue, StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A JSON request body whose parse errors are reported with the API envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

/// Path parameters whose parse errors are reported with the API envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct ApiPath<T>(pub T);

/// The body of every JSON response: `{status, message, data}`.
///
/// `data` is `null` for errors and for lookups that found nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// The HTTP status code, repeated in the body.
    pub status: u16,
    /// A human readable description of the outcome.
    pub message: String,
    /// The payload, if any.
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create an envelope for `status`.
    pub fn new(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            data,
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// A 200 OK response carrying `data`.
    pub fn ok(message: &str, data: T) -> Response {
        (
            StatusCode::OK,
            Json(Self::new(StatusCode::OK, message, Some(data))),
        )
            .into_response()
    }

    /// A 201 Created response carrying `data`, with the `Location` header
    /// pointing at `location`.
    pub fn created(location: &str, message: &str, data: T) -> Response {
        let body = Json(Self::new(StatusCode::CREATED, message, Some(data)));

        match HeaderValue::from_str(location) {
            Ok(location) => (StatusCode::CREATED, [(LOCATION, location)], body).into_response(),
            Err(error) => {
                tracing::warn!("Could not use \"{location}\" as a location header: {error}");
                (StatusCode::CREATED, body).into_response()
            }
        }
    }
}

/// A 204 No Content response, used after deleting a resource.
pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}
