//! Aggregations of transactions: expense totals per category and income vs. expenses.

use std::collections::BTreeMap;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{Error, Money, TransactionType};

use super::core::Transaction;

/// The sum of the expenses in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// The name of the category.
    pub category_name: String,
    /// The sum of the amounts in the category.
    pub total: Money,
}

/// A user's total income and total expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeExpenseSummary {
    /// The sum of all income transactions.
    pub total_income: Money,
    /// The sum of all expense transactions.
    pub total_expenses: Money,
}

/// Sum the expenses of `owner_uid` per category name, ordered by name.
///
/// Categories with the same name are merged.
///
/// # Errors
/// Returns [Error::AmountOutOfRange] if a total overflows, or
/// [Error::SqlError] if the query fails.
pub fn get_expenses_by_category(
    owner_uid: &str,
    connection: &Connection,
) -> Result<Vec<CategoryTotal>, Error> {
    let amounts = connection
        .prepare(
            "SELECT category.name, \"transaction\".amount
            FROM \"transaction\"
            INNER JOIN category ON \"transaction\".category_id = category.id
            WHERE \"transaction\".owner_uid = ?1 AND \"transaction\".type = ?2",
        )?
        .query_map((owner_uid, TransactionType::Expense), |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .collect::<Result<Vec<(String, Money)>, rusqlite::Error>>()?;

    total_per_category(amounts)
}

/// Sum the income and expenses of `owner_uid`.
///
/// # Errors
/// Returns [Error::AmountOutOfRange] if a total overflows, or
/// [Error::SqlError] if the query fails.
pub fn get_income_expense_summary(
    owner_uid: &str,
    connection: &Connection,
) -> Result<IncomeExpenseSummary, Error> {
    let amounts = connection
        .prepare("SELECT type, amount FROM \"transaction\" WHERE owner_uid = ?1")?
        .query_map((owner_uid,), |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<(TransactionType, Money)>, rusqlite::Error>>()?;

    let mut summary = IncomeExpenseSummary {
        total_income: Money::ZERO,
        total_expenses: Money::ZERO,
    };

    for (kind, amount) in amounts {
        let total = match kind {
            TransactionType::Income => &mut summary.total_income,
            TransactionType::Expense => &mut summary.total_expenses,
        };
        *total = total.checked_add(amount)?;
    }

    Ok(summary)
}

/// Sum the expenses among `transactions` per category name, ordered by name.
///
/// Income transactions are ignored.
///
/// # Errors
/// Returns [Error::AmountOutOfRange] if a total overflows.
pub fn group_expenses_by_category(
    transactions: &[Transaction],
) -> Result<Vec<CategoryTotal>, Error> {
    total_per_category(
        transactions
            .iter()
            .filter(|transaction| transaction.kind == TransactionType::Expense)
            .map(|transaction| (transaction.category_name.clone(), transaction.amount)),
    )
}

fn total_per_category(
    amounts: impl IntoIterator<Item = (String, Money)>,
) -> Result<Vec<CategoryTotal>, Error> {
    let mut totals: BTreeMap<String, Money> = BTreeMap::new();

    for (category_name, amount) in amounts {
        let total = totals.entry(category_name).or_default();
        *total = total.checked_add(amount)?;
    }

    Ok(totals
        .into_iter()
        .map(|(category_name, total)| CategoryTotal {
            category_name,
            total,
        })
        .collect())
}
