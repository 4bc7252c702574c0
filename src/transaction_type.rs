//! The two kinds of money movement shared by categories and transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::Error;

const INCOME: &str = "Entrada";
const EXPENSE: &str = "Despesa";
/// Older clients label expenses with this literal.
const EXPENSE_ALIAS: &str = "Saida";

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Money earned, e.g. a salary.
    #[serde(rename = "Entrada")]
    Income,
    /// Money spent, e.g. groceries.
    #[serde(rename = "Despesa", alias = "Saida")]
    Expense,
}

impl TransactionType {
    /// The literal used on the wire and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => INCOME,
            TransactionType::Expense => EXPENSE,
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            INCOME => Ok(TransactionType::Income),
            EXPENSE | EXPENSE_ALIAS => Ok(TransactionType::Expense),
            other => Err(Error::InvalidTransactionType(other.to_owned())),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}
