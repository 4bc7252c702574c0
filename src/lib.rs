//! EconoMe is a bookkeeping backend for personal finances.
//!
//! This library provides a JSON REST API for managing bank accounts,
//! categorizing income and expense transactions, and summarizing spending.
//! Callers are identified by bearer tokens issued by an external identity
//! provider.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod account;
mod app_state;
mod auth;
mod bank_institution;
mod category;
mod database_id;
mod db;
mod endpoints;
mod logging;
mod money;
mod response;
mod routing;
mod transaction;
mod transaction_type;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{CallerIdentity, IdentityVerifier, JwtIdentityVerifier};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use money::Money;
pub use routing::build_router;
pub use transaction_type::TransactionType;

use crate::{database_id::InstitutionId, response::ApiResponse};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request reached a handler that needs the caller's identity, but
    /// no identity was resolved from the request.
    #[error("caller identity not found in the request context")]
    MissingIdentity,

    /// The bearer token could not be verified by the identity provider.
    #[error("Unauthorized: Invalid token")]
    InvalidToken,

    /// The key used to verify bearer tokens could not be loaded.
    #[error("could not load the token verification key: {0}")]
    InvalidVerificationKey(String),

    /// The request body could not be parsed.
    #[error("invalid request body: {0}")]
    InvalidPayload(String),

    /// A path parameter could not be parsed.
    #[error("invalid path parameter: {0}")]
    InvalidPathParameter(String),

    /// The ID in the request path does not match the ID in the request body.
    #[error("the ID in the path does not match the ID in the request body")]
    IdMismatch,

    /// A transaction or category type other than the two accepted literals.
    #[error("invalid transaction type \"{0}\", must be 'Despesa' or 'Entrada'")]
    InvalidTransactionType(String),

    /// A transaction amount that is zero or negative.
    #[error("the amount {0} must be greater than zero")]
    NonPositiveAmount(Money),

    /// A monetary amount that does not fit in the store.
    #[error("the amount {0} is out of range")]
    AmountOutOfRange(String),

    /// A name field was empty.
    #[error("the {0} name cannot be empty")]
    EmptyName(&'static str),

    /// The email address given for a user is not valid.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// An account was created without a bank institution.
    #[error("the institution ID is required")]
    MissingInstitution,

    /// The bank institution ID does not refer to a known institution.
    #[error("the institution ID {0} does not refer to a known institution")]
    InvalidInstitution(InstitutionId),

    /// The account referenced by a transaction is missing or belongs to
    /// someone else.
    #[error("the account is invalid or does not belong to the user")]
    InvalidAccount,

    /// The category referenced by a transaction is missing or its type does
    /// not match the transaction type.
    #[error("the category is invalid or does not match the transaction type")]
    InvalidCategory,

    /// A category cannot be deleted while transactions still reference it.
    #[error("the category is still used by one or more transactions")]
    CategoryInUse,

    /// A user with the same external identity already exists.
    #[error("a user with the identity \"{0}\" already exists")]
    DuplicateIdentity(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The account does not exist or is not owned by the caller.
    #[error("account not found or not owned by the user")]
    AccountNotFound,

    /// The caller has no accounts.
    #[error("no accounts registered")]
    NoAccounts,

    /// The transaction does not exist or is not owned by the caller.
    #[error("transaction not found or not owned by the user")]
    TransactionNotFound,

    /// The category does not exist.
    #[error("category not found")]
    CategoryNotFound,

    /// No categories exist.
    #[error("no categories found")]
    NoCategories,

    /// The user does not exist.
    #[error("user not found")]
    UserNotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidPayload(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::InvalidPathParameter(rejection.body_text())
    }
}

impl Error {
    /// Replace [Error::NotFound] with `error`, keeping any other error as is.
    pub(crate) fn not_found_as(self, error: Error) -> Error {
        match self {
            Error::NotFound => error,
            other => other,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingIdentity | Error::InvalidToken => StatusCode::UNAUTHORIZED,
            Error::InvalidPayload(_)
            | Error::InvalidPathParameter(_)
            | Error::IdMismatch
            | Error::InvalidTransactionType(_)
            | Error::NonPositiveAmount(_)
            | Error::AmountOutOfRange(_)
            | Error::EmptyName(_)
            | Error::InvalidEmail(_)
            | Error::MissingInstitution
            | Error::InvalidInstitution(_)
            | Error::InvalidAccount
            | Error::InvalidCategory
            | Error::CategoryInUse
            | Error::DuplicateIdentity(_) => StatusCode::BAD_REQUEST,
            Error::NotFound
            | Error::AccountNotFound
            | Error::NoAccounts
            | Error::TransactionNotFound
            | Error::CategoryNotFound
            | Error::NoCategories
            | Error::UserNotFound => StatusCode::NOT_FOUND,
            Error::InvalidVerificationKey(_) | Error::SqlError(_) | Error::DatabaseLockError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Any errors that are not handled above are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        let body: ApiResponse<()> = ApiResponse::new(status, message, None);

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
    use serde_json::{Value, json};

    use crate::Error;

    async fn response_json(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }

    #[test]
    fn not_found_as_only_replaces_not_found() {
        assert_eq!(
            Error::NotFound.not_found_as(Error::UserNotFound),
            Error::UserNotFound
        );
        assert_eq!(
            Error::DatabaseLockError.not_found_as(Error::UserNotFound),
            Error::DatabaseLockError
        );
    }

    #[tokio::test]
    async fn client_errors_use_envelope_with_message() {
        let (status, body) = response_json(Error::InvalidAccount).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "status": 400,
                "message": "the account is invalid or does not belong to the user",
                "data": null,
            })
        );
    }

    #[tokio::test]
    async fn missing_identity_is_unauthorized() {
        let (status, body) = response_json(Error::MissingIdentity).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], 401);
    }

    #[tokio::test]
    async fn server_errors_hide_details() {
        let (status, body) = response_json(Error::DatabaseLockError).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            !body["message"]
                .as_str()
                .unwrap()
                .contains("database lock")
        );
    }
}
