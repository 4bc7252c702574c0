//! Defines the category model and its database queries.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, TransactionType, database_id::CategoryId};

const DEFAULT_CATEGORIES: [(&str, TransactionType); 15] = [
    ("Salário", TransactionType::Income),
    ("Bônus", TransactionType::Income),
    ("Investimentos", TransactionType::Income),
    ("Reembolso", TransactionType::Income),
    ("Outros", TransactionType::Income),
    ("Alimentação", TransactionType::Expense),
    ("Transporte", TransactionType::Expense),
    ("Moradia", TransactionType::Expense),
    ("Educação", TransactionType::Expense),
    ("Saúde", TransactionType::Expense),
    ("Lazer", TransactionType::Expense),
    ("Roupas", TransactionType::Expense),
    ("Eletrônicos", TransactionType::Expense),
    ("Contas e Serviços", TransactionType::Expense),
    ("Outros", TransactionType::Expense),
];

/// A label for transactions, e.g. "Transporte", that is either for income or for expenses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The display name of the category.
    pub name: String,
    /// Whether the category is for income or expenses.
    #[serde(rename = "type")]
    pub kind: TransactionType,
}

/// A validated category that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    /// The display name, never empty.
    pub name: String,
    /// Whether the category is for income or expenses.
    pub kind: TransactionType,
}

impl NewCategory {
    /// Validate the raw `name` and `kind` of a category.
    ///
    /// # Errors
    /// Returns [Error::EmptyName] if `name` is blank or
    /// [Error::InvalidTransactionType] if `kind` is not a known literal.
    pub fn new(name: &str, kind: &str) -> Result<Self, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyName("category"));
        }

        Ok(Self {
            name: name.to_owned(),
            kind: kind.parse()?,
        })
    }
}

/// Create the category table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('Entrada', 'Despesa'))
        )",
        (),
    )?;

    Ok(())
}

/// Insert the default categories if the category table is empty.
pub fn seed_default_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    let count: i64 = connection.query_row("SELECT COUNT(id) FROM category", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(());
    }

    let mut statement = connection.prepare("INSERT INTO category (name, type) VALUES (?1, ?2)")?;
    for (name, kind) in DEFAULT_CATEGORIES {
        statement.execute((name, kind))?;
    }

    Ok(())
}

/// Map a row of `id, name, type` to a [Category].
fn map_row_to_category(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
    })
}

/// Get all categories, ordered by ID.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, type FROM category ORDER BY id")?
        .query_map([], map_row_to_category)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Get the category with `id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such category, or
/// [Error::SqlError] if the query fails.
pub fn get_category(id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .query_row(
            "SELECT id, name, type FROM category WHERE id = ?1",
            (id,),
            map_row_to_category,
        )
        .map_err(Error::from)
}

/// Create a category.
///
/// # Errors
/// Returns [Error::SqlError] if the insert fails.
pub fn create_category(category: NewCategory, connection: &Connection) -> Result<Category, Error> {
    connection
        .query_row(
            "INSERT INTO category (name, type) VALUES (?1, ?2) RETURNING id, name, type",
            (&category.name, category.kind),
            map_row_to_category,
        )
        .map_err(Error::from)
}

/// Replace the name and type of the category with `id`.
///
/// # Errors
/// Returns [Error::NotFound] if there is no such category, or
/// [Error::SqlError] if the update fails.
pub fn update_category(
    id: CategoryId,
    category: NewCategory,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .query_row(
            "UPDATE category SET name = ?1, type = ?2 WHERE id = ?3 RETURNING id, name, type",
            (&category.name, category.kind, id),
            map_row_to_category,
        )
        .map_err(Error::from)
}

/// Delete the category with `id`, returning whether a row was deleted.
///
/// # Errors
/// Returns [Error::CategoryInUse] if transactions still reference the
/// category, or [Error::SqlError] if the delete fails.
pub fn delete_category(id: CategoryId, connection: &Connection) -> Result<bool, Error> {
    connection
        .execute("DELETE FROM category WHERE id = ?1", (id,))
        .map(|rows_affected| rows_affected != 0)
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ) => Error::CategoryInUse,
            error => error.into(),
        })
}
