//! Database initialization and connection helpers.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::{
    Error,
    account::create_account_table,
    bank_institution::{create_bank_institution_table, seed_bank_institutions},
    category::{create_category_table, seed_default_categories},
    transaction::create_transaction_table,
    user::create_user_table,
};

/// Create the application tables and seed data.
///
/// This function is idempotent: tables are only created if they do not
/// exist and seed rows are only inserted once.
///
/// # Errors
/// Returns an error if any of the SQL statements fail.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = connection.unchecked_transaction()?;

    create_user_table(&transaction)?;
    create_bank_institution_table(&transaction)?;
    create_account_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;

    seed_bank_institutions(&transaction)?;
    seed_default_categories(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Lock the shared database connection.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if the mutex was poisoned.
pub fn lock_connection(
    connection: &Arc<Mutex<Connection>>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}
