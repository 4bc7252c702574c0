//! The fixed set of banks an account can belong to.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::Response,
};
use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, database_id::InstitutionId, db::lock_connection, response::ApiResponse,
};

/// The name shown for accounts whose institution is not in the seed set.
pub const UNKNOWN_INSTITUTION_NAME: &str = "Outros";

const SEED_INSTITUTIONS: [(InstitutionId, &str); 4] = [
    (1, "Itau"),
    (2, "Nubank"),
    (3, "Banco do Brasil"),
    (4, "Santander"),
];

/// A bank, e.g. "Nubank".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankInstitution {
    /// The ID of the institution.
    pub id: InstitutionId,
    /// The display name of the institution.
    pub name: String,
}

/// Create the bank institution table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_bank_institution_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS bank_institution (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Insert the known institutions, leaving existing rows untouched.
pub fn seed_bank_institutions(connection: &Connection) -> Result<(), rusqlite::Error> {
    let mut statement =
        connection.prepare("INSERT OR IGNORE INTO bank_institution (id, name) VALUES (?1, ?2)")?;

    for (id, name) in SEED_INSTITUTIONS {
        statement.execute((id, name))?;
    }

    Ok(())
}

fn map_row_to_institution(row: &Row) -> Result<BankInstitution, rusqlite::Error> {
    Ok(BankInstitution {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

/// Get every bank institution, ordered by ID.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_bank_institutions(connection: &Connection) -> Result<Vec<BankInstitution>, Error> {
    connection
        .prepare("SELECT id, name FROM bank_institution ORDER BY id")?
        .query_map([], map_row_to_institution)?
        .map(|maybe_institution| maybe_institution.map_err(Error::from))
        .collect()
}

/// Get the display name for the institution `id`, or
/// [UNKNOWN_INSTITUTION_NAME] if there is no such institution.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_institution_name(id: InstitutionId, connection: &Connection) -> Result<String, Error> {
    let name = connection
        .query_row(
            "SELECT name FROM bank_institution WHERE id = ?1",
            (id,),
            |row| row.get(0),
        )
        .optional()?;

    Ok(name.unwrap_or_else(|| UNKNOWN_INSTITUTION_NAME.to_owned()))
}

/// The state needed to list bank institutions.
#[derive(Debug, Clone)]
pub struct InstitutionState {
    /// The database connection for reading institutions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for InstitutionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler listing all bank institutions.
pub async fn get_institutions_endpoint(
    State(state): State<InstitutionState>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let institutions = get_bank_institutions(&connection)?;

    Ok(ApiResponse::ok(
        "Institutions retrieved successfully",
        institutions,
    ))
}
