//! Code for creating the user table and managing user profiles.

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, database_id::UserId};

/// The profile of a user of the application.
///
/// Users are identified across requests by `firebase_uid`, the identity
/// assigned by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The identity assigned by the identity provider.
    pub firebase_uid: String,
    /// The user's display name.
    pub name: String,
    /// The user's email address.
    pub email: String,
    /// When the user was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the user was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Validated user fields that have not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The identity assigned by the identity provider, never empty.
    pub firebase_uid: String,
    /// The display name, never empty.
    pub name: String,
    /// A syntactically valid email address.
    pub email: String,
}

impl NewUser {
    /// Validate the raw user fields.
    ///
    /// # Errors
    /// Returns an error if `firebase_uid` or `name` is blank, or if `email`
    /// is not a valid email address.
    pub fn new(firebase_uid: &str, name: &str, email: &str) -> Result<Self, Error> {
        let firebase_uid = firebase_uid.trim();
        if firebase_uid.is_empty() {
            return Err(Error::InvalidPayload(
                "the firebase_uid cannot be empty".to_owned(),
            ));
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyName("user"));
        }

        let email = email.trim();
        if !EmailAddress::is_valid(email) {
            return Err(Error::InvalidEmail(email.to_owned()));
        }

        Ok(Self {
            firebase_uid: firebase_uid.to_owned(),
            name: name.to_owned(),
            email: email.to_owned(),
        })
    }
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                firebase_uid TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

fn map_row_to_user(row: &Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        firebase_uid: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn map_unique_violation(error: rusqlite::Error, firebase_uid: &str) -> Error {
    match error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: _,
                extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            _,
        ) => Error::DuplicateIdentity(firebase_uid.to_owned()),
        error => error.into(),
    }
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns [Error::DuplicateIdentity] if a user with the same `firebase_uid`
/// exists, or [Error::SqlError] if an SQL related error occurred.
pub fn create_user(user: NewUser, connection: &Connection) -> Result<User, Error> {
    let now = OffsetDateTime::now_utc();

    connection
        .query_row(
            "INSERT INTO user (firebase_uid, name, email, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            RETURNING id, firebase_uid, name, email, created_at, updated_at",
            (&user.firebase_uid, &user.name, &user.email, now),
            map_row_to_user,
        )
        .map_err(|error| map_unique_violation(error, &user.firebase_uid))
}

/// Get the user whose identity provider ID is `firebase_uid`.
///
/// # Errors
///
/// This function will return an error if:
/// - `firebase_uid` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_identity(firebase_uid: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .query_row(
            "SELECT id, firebase_uid, name, email, created_at, updated_at
            FROM user WHERE firebase_uid = ?1",
            (firebase_uid,),
            map_row_to_user,
        )
        .map_err(|error| error.into())
}

/// Replace the fields of the user with `id` and refresh its `updated_at`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such user,
/// [Error::DuplicateIdentity] if another user has the same `firebase_uid`,
/// or [Error::SqlError] if an SQL related error occurred.
pub fn update_user(id: UserId, user: NewUser, connection: &Connection) -> Result<User, Error> {
    connection
        .query_row(
            "UPDATE user SET firebase_uid = ?1, name = ?2, email = ?3, updated_at = ?4
            WHERE id = ?5
            RETURNING id, firebase_uid, name, email, created_at, updated_at",
            (
                &user.firebase_uid,
                &user.name,
                &user.email,
                OffsetDateTime::now_utc(),
                id,
            ),
            map_row_to_user,
        )
        .map_err(|error| map_unique_violation(error, &user.firebase_uid))
}

/// Delete the user with `id`, returning whether a row was deleted.
///
/// # Errors
///
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn delete_user(id: UserId, connection: &Connection) -> Result<bool, Error> {
    connection
        .execute("DELETE FROM user WHERE id = ?1", (id,))
        .map(|rows_affected| rows_affected != 0)
        .map_err(|error| error.into())
}
