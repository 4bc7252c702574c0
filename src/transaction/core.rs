//! The transaction model and the database functions for storing transactions.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error, Money, TransactionType,
    auth::Owned,
    database_id::{AccountId, CategoryId, TransactionId},
};

/// An amount of money that came into or went out of an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The account the money moved in or out of.
    pub account_id: AccountId,
    /// The category of the transaction.
    pub category_id: CategoryId,
    /// The name of the category, read from the category table.
    pub category_name: String,
    /// Whether this is income or an expense. Always equal to the category's type.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// The amount, a positive number of cents for both types.
    pub amount: Money,
    /// A free text description, e.g. "Mercado".
    pub description: String,
    /// When the transaction happened, in UTC.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// The identity of the user that owns the transaction's account.
    pub owner_uid: String,
}

impl Owned for Transaction {
    fn owner(&self) -> &str {
        &self.owner_uid
    }
}

/// The validated fields of a transaction that is about to be stored.
///
/// Use [TransactionForm::validate](super::TransactionForm::validate) to build
/// one from a request, which checks the account, category and type.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The account the money moved in or out of.
    pub account_id: AccountId,
    /// The category of the transaction.
    pub category_id: CategoryId,
    /// Whether this is income or an expense.
    pub kind: TransactionType,
    /// The amount, rounded to cents.
    pub amount: Money,
    /// A free text description.
    pub description: String,
    /// When the transaction happened.
    pub date: OffsetDateTime,
}

/// The columns read by [map_transaction_row], joined with the category name.
pub(crate) const SELECT_TRANSACTION: &str = "SELECT \"transaction\".id, account_id, category_id, \
    category.name, \"transaction\".type, amount, description, date, owner_uid \
    FROM \"transaction\" INNER JOIN category ON \"transaction\".category_id = category.id";

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('Entrada', 'Despesa')),
                amount INTEGER NOT NULL,
                description TEXT NOT NULL,
                date TEXT NOT NULL,
                owner_uid TEXT NOT NULL,
                FOREIGN KEY(account_id) REFERENCES account(id),
                FOREIGN KEY(category_id) REFERENCES category(id)
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_owner_type ON \"transaction\"(owner_uid, type)",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_account ON \"transaction\"(account_id)",
        (),
    )?;

    Ok(())
}

/// Map a database row selected with [SELECT_TRANSACTION] to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        account_id: row.get(1)?,
        category_id: row.get(2)?,
        category_name: row.get(3)?,
        kind: row.get(4)?,
        amount: row.get(5)?,
        description: row.get(6)?,
        date: row.get(7)?,
        owner_uid: row.get(8)?,
    })
}

/// Store a new transaction owned by `owner_uid`.
///
/// The caller is responsible for checking that the account belongs to
/// `owner_uid` and that the category has the same type as the transaction.
///
/// # Errors
/// Returns [Error::SqlError] if the account or category does not exist, or
/// if there is some other SQL error.
pub fn create_transaction(
    owner_uid: &str,
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let id: TransactionId = connection.query_row(
        "INSERT INTO \"transaction\"
            (account_id, category_id, type, amount, description, date, owner_uid)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING id",
        (
            transaction.account_id,
            transaction.category_id,
            transaction.kind,
            transaction.amount,
            &transaction.description,
            transaction.date,
            owner_uid,
        ),
        |row| row.get(0),
    )?;

    get_transaction(id, connection)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!("{SELECT_TRANSACTION} WHERE \"transaction\".id = :id"))?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Replace every field of the transaction with `id` except its owner.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
            SET account_id = ?1, category_id = ?2, type = ?3, amount = ?4, description = ?5, date = ?6
            WHERE id = ?7",
        (
            transaction.account_id,
            transaction.category_id,
            transaction.kind,
            transaction.amount,
            &transaction.description,
            transaction.date,
            id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_transaction(id, connection)
}

/// Delete the transaction with `id`, returning whether a row was deleted.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<bool, Error> {
    connection
        .execute("DELETE FROM \"transaction\" WHERE id = ?1", (id,))
        .map(|rows_affected| rows_affected != 0)
        .map_err(Error::from)
}

/// Delete every transaction of the account with `account_id`, returning how many were deleted.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn delete_transactions_by_account(
    account_id: AccountId,
    connection: &Connection,
) -> Result<usize, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE account_id = ?1",
            (account_id,),
        )
        .map_err(Error::from)
}
