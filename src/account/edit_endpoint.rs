//! Defines the endpoint for updating an account.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::Response,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{AccountView, create_endpoint::AccountForm, get_account, update_account},
    auth::{CallerIdentity, ensure_owned},
    bank_institution::get_institution_name,
    database_id::AccountId,
    db::lock_connection,
    response::{ApiJson, ApiPath, ApiResponse},
};

/// The state needed to update an account.
#[derive(Debug, Clone)]
pub struct EditAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for updating one of the caller's accounts.
///
/// Responds with 404 if the account does not exist or belongs to someone else.
pub async fn update_account_endpoint(
    State(state): State<EditAccountState>,
    caller: CallerIdentity,
    ApiPath(account_id): ApiPath<AccountId>,
    ApiJson(form): ApiJson<AccountForm>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let existing = get_account(account_id, &connection)
        .map_err(|error| error.not_found_as(Error::AccountNotFound))?;
    let existing = ensure_owned(&caller, existing, Error::AccountNotFound)?;

    let fields = form.into_fields(Some(existing.institution_id))?;
    let account = update_account(account_id, fields, &connection)?;
    let institution_name = get_institution_name(account.institution_id, &connection)?;

    Ok(ApiResponse::ok(
        "Account updated successfully",
        AccountView {
            account,
            institution_name,
        },
    ))
}
