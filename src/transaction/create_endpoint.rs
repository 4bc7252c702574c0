//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::Response,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::CallerIdentity,
    db::lock_connection,
    endpoints::{self, format_endpoint},
    response::{ApiJson, ApiResponse},
    transaction::{TransactionForm, create_transaction},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for recording a transaction against one of the caller's accounts.
///
/// Responds with 201 and a location pointing at the new transaction.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    caller: CallerIdentity,
    ApiJson(form): ApiJson<TransactionForm>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let new_transaction = form.validate(&caller, &connection)?;
    let transaction = create_transaction(caller.as_str(), new_transaction, &connection)?;
    tracing::debug!(
        "Created transaction {} in account {}",
        transaction.id,
        transaction.account_id
    );

    Ok(ApiResponse::created(
        &format_endpoint(endpoints::TRANSACTION, transaction.id),
        "Transaction created successfully",
        transaction,
    ))
}
