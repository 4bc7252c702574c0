//! Bank accounts and the database functions for storing them.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error, Money,
    auth::Owned,
    database_id::{AccountId, InstitutionId},
    transaction::delete_transactions_by_account,
};

/// A bank account owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The identity of the user that owns the account.
    pub owner_uid: String,
    /// The name of the account, e.g. "Conta corrente".
    pub name: String,
    /// The bank the account is held at.
    pub institution_id: InstitutionId,
    /// The balance.
    pub balance: Money,
    /// When the account was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the account was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Owned for Account {
    fn owner(&self) -> &str {
        &self.owner_uid
    }
}

/// An account together with the display name of its bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountView {
    /// The account.
    #[serde(flatten)]
    pub account: Account,
    /// The bank's name, or "Outros" if the bank is unknown.
    pub institution_name: String,
}

impl Owned for AccountView {
    fn owner(&self) -> &str {
        &self.account.owner_uid
    }
}

/// The validated fields written when creating or updating an account.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountFields {
    /// The name of the account, never empty.
    pub name: String,
    /// The bank the account is held at.
    pub institution_id: InstitutionId,
    /// The balance.
    pub balance: Money,
}

/// Create the account table and the index on its owner.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            owner_uid TEXT NOT NULL,
            name TEXT NOT NULL,
            institution_id INTEGER NOT NULL,
            balance INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(institution_id) REFERENCES bank_institution(id)
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_account_owner ON account(owner_uid)",
        (),
    )?;

    Ok(())
}

/// Map a row of `id, owner_uid, name, institution_id, balance, created_at, updated_at`.
fn map_row_to_account(row: &Row) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(0)?,
        owner_uid: row.get(1)?,
        name: row.get(2)?,
        institution_id: row.get(3)?,
        balance: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn map_row_to_account_view(row: &Row) -> Result<AccountView, rusqlite::Error> {
    Ok(AccountView {
        account: map_row_to_account(row)?,
        institution_name: row.get(7)?,
    })
}

const SELECT_ACCOUNT_VIEW: &str = "SELECT account.id, owner_uid, account.name, institution_id, \
    balance, created_at, updated_at, COALESCE(bank_institution.name, 'Outros') \
    FROM account LEFT JOIN bank_institution ON account.institution_id = bank_institution.id";

fn map_institution_violation(error: rusqlite::Error, institution_id: InstitutionId) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            _,
        ) => Error::InvalidInstitution(institution_id),
        error => error.into(),
    }
}

/// Get the account with `id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such account, or
/// [Error::SqlError] if the query fails.
pub fn get_account(id: AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .query_row(
            "SELECT id, owner_uid, name, institution_id, balance, created_at, updated_at
            FROM account WHERE id = ?1",
            (id,),
            map_row_to_account,
        )
        .map_err(Error::from)
}

/// Get the account with `id` and the name of its bank.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such account, or
/// [Error::SqlError] if the query fails.
pub fn get_account_view(id: AccountId, connection: &Connection) -> Result<AccountView, Error> {
    connection
        .query_row(
            &format!("{SELECT_ACCOUNT_VIEW} WHERE account.id = ?1"),
            (id,),
            map_row_to_account_view,
        )
        .map_err(Error::from)
}

/// Get all accounts owned by `owner_uid` with the names of their banks, ordered by ID.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_account_views_by_owner(
    owner_uid: &str,
    connection: &Connection,
) -> Result<Vec<AccountView>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_ACCOUNT_VIEW} WHERE owner_uid = ?1 ORDER BY account.id"
        ))?
        .query_map((owner_uid,), map_row_to_account_view)?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect()
}

/// Create an account owned by `owner_uid`.
///
/// # Errors
/// Returns [Error::InvalidInstitution] if the institution does not exist, or
/// [Error::SqlError] if the insert fails.
pub fn create_account(
    owner_uid: &str,
    fields: AccountFields,
    connection: &Connection,
) -> Result<Account, Error> {
    let now = OffsetDateTime::now_utc();

    connection
        .query_row(
            "INSERT INTO account (owner_uid, name, institution_id, balance, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            RETURNING id, owner_uid, name, institution_id, balance, created_at, updated_at",
            (
                owner_uid,
                &fields.name,
                fields.institution_id,
                fields.balance,
                now,
            ),
            map_row_to_account,
        )
        .map_err(|error| map_institution_violation(error, fields.institution_id))
}

/// Replace the name, institution and balance of the account with `id`, and
/// refresh its `updated_at`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such account,
/// [Error::InvalidInstitution] if the institution does not exist, or
/// [Error::SqlError] if the update fails.
pub fn update_account(
    id: AccountId,
    fields: AccountFields,
    connection: &Connection,
) -> Result<Account, Error> {
    connection
        .query_row(
            "UPDATE account SET name = ?1, institution_id = ?2, balance = ?3, updated_at = ?4
            WHERE id = ?5
            RETURNING id, owner_uid, name, institution_id, balance, created_at, updated_at",
            (
                &fields.name,
                fields.institution_id,
                fields.balance,
                OffsetDateTime::now_utc(),
                id,
            ),
            map_row_to_account,
        )
        .map_err(|error| map_institution_violation(error, fields.institution_id))
}

/// Delete the account with `id` and all of its transactions.
///
/// Both deletes happen in one SQL transaction. Returns whether the account existed.
///
/// # Errors
/// Returns [Error::SqlError] if either delete fails, in which case nothing is deleted.
pub fn delete_account(id: AccountId, connection: &Connection) -> Result<bool, Error> {
    let transaction = connection.unchecked_transaction()?;

    let transactions_deleted = delete_transactions_by_account(id, &transaction)?;
    let accounts_deleted = transaction.execute("DELETE FROM account WHERE id = ?1", (id,))?;

    transaction.commit()?;

    tracing::debug!(
        "Deleted account {id} and {transactions_deleted} of its transactions"
    );

    Ok(accounts_deleted != 0)
}
