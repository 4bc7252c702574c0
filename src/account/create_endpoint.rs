//! Defines the endpoint for creating a new account.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::Response,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, Money,
    account::{AccountFields, AccountView, create_account},
    auth::CallerIdentity,
    bank_institution::get_institution_name,
    database_id::InstitutionId,
    db::lock_connection,
    endpoints::{self, format_endpoint},
    response::{ApiJson, ApiResponse},
};

/// The state needed to create an account.
#[derive(Debug, Clone)]
pub struct CreateAccountState {
    /// The database connection for managing accounts.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating or updating an account.
#[derive(Debug, Deserialize)]
pub struct AccountForm {
    /// The account name.
    pub name: String,
    /// Required when creating. When updating, the current institution is kept if omitted.
    #[serde(default)]
    pub institution_id: Option<InstitutionId>,
    /// Defaults to zero if omitted.
    #[serde(default)]
    pub balance: Option<Money>,
}

impl AccountForm {
    /// Validate the form, using `current_institution` when the form has no institution.
    ///
    /// # Errors
    /// Returns [Error::EmptyName] for a blank name or [Error::MissingInstitution]
    /// if there is no institution to use.
    pub fn into_fields(
        self,
        current_institution: Option<InstitutionId>,
    ) -> Result<AccountFields, Error> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::EmptyName("account"));
        }

        let institution_id = match (self.institution_id, current_institution) {
            (Some(id), _) if id != 0 => id,
            (_, Some(current)) => current,
            _ => return Err(Error::MissingInstitution),
        };

        Ok(AccountFields {
            name: name.to_owned(),
            institution_id,
            balance: self.balance.unwrap_or(Money::ZERO),
        })
    }
}

/// A route handler for creating a new account owned by the caller.
///
/// Responds with 201 and a location pointing at the account's detailed view.
pub async fn create_account_endpoint(
    State(state): State<CreateAccountState>,
    caller: CallerIdentity,
    ApiJson(form): ApiJson<AccountForm>,
) -> Result<Response, Error> {
    let fields = form.into_fields(None)?;

    let connection = lock_connection(&state.db_connection)?;
    let account = create_account(caller.as_str(), fields, &connection)?;
    let institution_name = get_institution_name(account.institution_id, &connection)?;
    tracing::debug!("Created account {} for {caller}", account.id);

    Ok(ApiResponse::created(
        &format_endpoint(endpoints::ACCOUNT_DETAILED, account.id),
        "Account created successfully",
        AccountView {
            account,
            institution_name,
        },
    ))
}
