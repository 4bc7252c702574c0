//! Defines the endpoint for deleting an account.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::Response,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{delete_account, get_account},
    auth::{CallerIdentity, ensure_owned},
    database_id::AccountId,
    db::lock_connection,
    response::{ApiPath, no_content},
};

/// The state needed to delete an account.
#[derive(Debug, Clone)]
pub struct DeleteAccountState {
    /// The database connection for managing account.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting one of the caller's accounts along with its transactions.
pub async fn delete_account_endpoint(
    State(state): State<DeleteAccountState>,
    caller: CallerIdentity,
    ApiPath(account_id): ApiPath<AccountId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let account = get_account(account_id, &connection)
        .map_err(|error| error.not_found_as(Error::AccountNotFound))?;
    ensure_owned(&caller, account, Error::AccountNotFound)?;

    if delete_account(account_id, &connection)? {
        tracing::info!("Deleted account {account_id}");
        Ok(no_content())
    } else {
        Err(Error::AccountNotFound)
    }
}
