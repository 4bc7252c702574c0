//! Defines the endpoint for updating a transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::Response,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{CallerIdentity, ensure_owned},
    database_id::TransactionId,
    db::lock_connection,
    response::{ApiJson, ApiPath, ApiResponse},
    transaction::{TransactionForm, get_transaction, update_transaction},
};

/// The state needed to update a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for replacing one of the caller's transactions.
///
/// The body must carry the same ID as the path. The existing transaction must
/// belong to the caller (else 404), and the new values go through the same
/// checks as a new transaction (else 400).
pub async fn update_transaction_endpoint(
    State(state): State<EditTransactionState>,
    caller: CallerIdentity,
    ApiPath(transaction_id): ApiPath<TransactionId>,
    ApiJson(form): ApiJson<TransactionForm>,
) -> Result<Response, Error> {
    if form.id != Some(transaction_id) {
        return Err(Error::IdMismatch);
    }

    let connection = lock_connection(&state.db_connection)?;

    let existing = get_transaction(transaction_id, &connection)
        .map_err(|error| error.not_found_as(Error::TransactionNotFound))?;
    ensure_owned(&caller, existing, Error::TransactionNotFound)?;

    let new_transaction = form.validate(&caller, &connection)?;
    let transaction = update_transaction(transaction_id, new_transaction, &connection)
        .map_err(|error| error.not_found_as(Error::TransactionNotFound))?;

    Ok(ApiResponse::ok("Transaction updated successfully", transaction))
}
