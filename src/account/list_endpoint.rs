//! Defines the endpoint listing the caller's accounts.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::Response,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::get_account_views_by_owner,
    auth::CallerIdentity,
    db::lock_connection,
    response::ApiResponse,
};

/// The state needed to list accounts.
#[derive(Debug, Clone)]
pub struct AccountsState {
    /// The database connection for reading accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler listing the caller's accounts, or 404 if the caller has none.
pub async fn get_accounts_endpoint(
    State(state): State<AccountsState>,
    caller: CallerIdentity,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let accounts = get_account_views_by_owner(caller.as_str(), &connection)?;

    if accounts.is_empty() {
        return Err(Error::NoAccounts);
    }

    Ok(ApiResponse::ok("Accounts retrieved successfully", accounts))
}
