//! Filtered transaction lookups.

use rusqlite::{Connection, ToSql};

use crate::{Error, TransactionType, database_id::AccountId};

use super::core::{SELECT_TRANSACTION, Transaction, map_transaction_row};

/// Selects the transactions of one owner or one account, optionally of one type.
///
/// ```ignore
/// let expenses = TransactionFilter::for_owner("uid").of_kind(TransactionType::Expense);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionFilter<'a> {
    owner_uid: Option<&'a str>,
    account_id: Option<AccountId>,
    kind: Option<TransactionType>,
}

impl<'a> TransactionFilter<'a> {
    /// Select the transactions owned by `owner_uid`.
    pub fn for_owner(owner_uid: &'a str) -> Self {
        Self {
            owner_uid: Some(owner_uid),
            account_id: None,
            kind: None,
        }
    }

    /// Select the transactions of the account `account_id`.
    pub fn for_account(account_id: AccountId) -> Self {
        Self {
            owner_uid: None,
            account_id: Some(account_id),
            kind: None,
        }
    }

    /// Narrow the selection to transactions of type `kind`.
    pub fn of_kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    fn where_clause(&self) -> (String, Vec<&dyn ToSql>) {
        let mut conditions = Vec::new();
        let mut params: Vec<&dyn ToSql> = Vec::new();

        if let Some(owner_uid) = &self.owner_uid {
            params.push(owner_uid);
            conditions.push(format!("\"transaction\".owner_uid = ?{}", params.len()));
        }

        if let Some(account_id) = &self.account_id {
            params.push(account_id);
            conditions.push(format!("\"transaction\".account_id = ?{}", params.len()));
        }

        if let Some(kind) = &self.kind {
            params.push(kind);
            conditions.push(format!("\"transaction\".type = ?{}", params.len()));
        }

        if conditions.is_empty() {
            (String::new(), params)
        } else {
            (format!("WHERE {}", conditions.join(" AND ")), params)
        }
    }
}

/// Get the transactions selected by `filter`, newest first.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - Transaction row mapping fails
pub fn get_transactions(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let (where_clause, params) = filter.where_clause();

    // Sort by date, and then ID to keep transaction order stable after updates
    let query = format!(
        "{SELECT_TRANSACTION} {where_clause} ORDER BY date DESC, \"transaction\".id DESC"
    );

    connection
        .prepare(&query)?
        .query_map(params.as_slice(), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}
