//! Defines the endpoint for deleting a transaction.
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
    response::{ApiPath, no_content},
    transaction::{delete_transaction, get_transaction},
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting one of the caller's transactions.
///
/// Responds with 404 if the transaction does not exist or belongs to someone else.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    caller: CallerIdentity,
    ApiPath(transaction_id): ApiPath<TransactionId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let transaction = get_transaction(transaction_id, &connection)
        .map_err(|error| error.not_found_as(Error::TransactionNotFound))?;
    ensure_owned(&caller, transaction, Error::TransactionNotFound)?;

    if delete_transaction(transaction_id, &connection)? {
        Ok(no_content())
    } else {
        Err(Error::TransactionNotFound)
    }
}
