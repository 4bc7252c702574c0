//! The request body for creating and updating transactions, and its validation.

use rusqlite::Connection;
use serde::Deserialize;
use time::{OffsetDateTime, UtcOffset};

use crate::{
    Error, Money, TransactionType,
    account::get_account,
    auth::{CallerIdentity, ensure_owned},
    category::get_category,
    database_id::{AccountId, CategoryId, TransactionId},
};

use super::core::NewTransaction;

/// The JSON body sent to create or update a transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionForm {
    /// Only checked on update, where it must match the ID in the path.
    #[serde(default)]
    pub id: Option<TransactionId>,
    pub account_id: AccountId,
    pub category_id: CategoryId,
    /// Either "Entrada" or "Despesa" ("Saida" is read as "Despesa").
    #[serde(rename = "type")]
    pub kind: String,
    /// Rounded to cents when parsed. Must be greater than zero, the type
    /// says whether it is income or an expense.
    pub amount: Money,
    #[serde(default)]
    pub description: String,
    /// Defaults to the current time. Stored in UTC.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
}

impl TransactionForm {
    /// Check the form against the store and the caller.
    ///
    /// The checks run in this order and stop at the first failure:
    /// 1. the type is a known literal,
    /// 2. the amount is greater than zero,
    /// 3. the account exists and belongs to `caller`,
    /// 4. the category exists and has the same type as the transaction.
    ///
    /// # Errors
    /// Returns [Error::InvalidTransactionType], [Error::NonPositiveAmount],
    /// [Error::InvalidAccount] or [Error::InvalidCategory] for the failed
    /// check, or [Error::SqlError] if a lookup fails.
    pub fn validate(
        self,
        caller: &CallerIdentity,
        connection: &Connection,
    ) -> Result<NewTransaction, Error> {
        let kind: TransactionType = self.kind.parse()?;

        if self.amount <= Money::ZERO {
            return Err(Error::NonPositiveAmount(self.amount));
        }

        let account = get_account(self.account_id, connection)
            .map_err(|error| error.not_found_as(Error::InvalidAccount))?;
        ensure_owned(caller, account, Error::InvalidAccount)?;

        let category = get_category(self.category_id, connection)
            .map_err(|error| error.not_found_as(Error::InvalidCategory))?;
        if category.kind != kind {
            tracing::debug!(
                "Rejected {kind} transaction with {} category {}",
                category.kind,
                category.id
            );
            return Err(Error::InvalidCategory);
        }

        Ok(NewTransaction {
            account_id: self.account_id,
            category_id: self.category_id,
            kind,
            amount: self.amount,
            description: self.description,
            date: self
                .date
                .map_or_else(OffsetDateTime::now_utc, |date| date.to_offset(UtcOffset::UTC)),
        })
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use serde_json::json;
    use time::{UtcOffset, macros::datetime};

    use super::TransactionForm;
    use crate::{
        Error, Money, TransactionType,
        account::{AccountFields, create_account},
        auth::CallerIdentity,
        db::initialize,
    };

    fn get_test_connection() -> (Connection, i64) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let account_id = create_account(
            "alice",
            AccountFields {
                name: "Conta".to_owned(),
                institution_id: 1,
                balance: Money::ZERO,
            },
            &conn,
        )
        .unwrap()
        .id;

        (conn, account_id)
    }

    fn form(value: serde_json::Value) -> TransactionForm {
        serde_json::from_value(value).unwrap()
    }

    fn alice() -> CallerIdentity {
        CallerIdentity::new("alice").unwrap()
    }

    #[test]
    fn valid_form_rounds_amount_and_keeps_date() {
        let (conn, account_id) = get_test_connection();

        let new_transaction = form(json!({
            "account_id": account_id,
            "category_id": 6,
            "type": "Despesa",
            "amount": 10.005,
            "description": "Mercado",
            "date": "2025-03-01T12:00:00Z",
        }))
        .validate(&alice(), &conn)
        .unwrap();

        assert_eq!(new_transaction.kind, TransactionType::Expense);
        assert_eq!(new_transaction.amount, Money::from_cents(1_000));
        assert_eq!(new_transaction.date, datetime!(2025-03-01 12:00 UTC));
    }

    #[test]
    fn expense_alias_is_accepted() {
        let (conn, account_id) = get_test_connection();

        let new_transaction = form(json!({
            "account_id": account_id,
            "category_id": 6,
            "type": "Saida",
            "amount": 1,
        }))
        .validate(&alice(), &conn)
        .unwrap();

        assert_eq!(new_transaction.kind, TransactionType::Expense);
    }

    #[test]
    fn type_is_checked_before_account() {
        let (conn, _) = get_test_connection();

        let result = form(json!({
            "account_id": 999,
            "category_id": 6,
            "type": "Gasto",
            "amount": 1,
        }))
        .validate(&alice(), &conn);

        assert_eq!(result, Err(Error::InvalidTransactionType("Gasto".to_owned())));
    }

    #[test]
    fn missing_account_is_invalid() {
        let (conn, _) = get_test_connection();

        let result = form(json!({
            "account_id": 999,
            "category_id": 6,
            "type": "Despesa",
            "amount": 1,
        }))
        .validate(&alice(), &conn);

        assert_eq!(result, Err(Error::InvalidAccount));
    }

    #[test]
    fn other_users_account_is_invalid() {
        let (conn, account_id) = get_test_connection();

        let result = form(json!({
            "account_id": account_id,
            "category_id": 6,
            "type": "Despesa",
            "amount": 1,
        }))
        .validate(&CallerIdentity::new("mallory").unwrap(), &conn);

        assert_eq!(result, Err(Error::InvalidAccount));
    }

    #[test]
    fn account_is_checked_before_category() {
        let (conn, _) = get_test_connection();

        let result = form(json!({
            "account_id": 999,
            "category_id": 999,
            "type": "Despesa",
            "amount": 1,
        }))
        .validate(&alice(), &conn);

        assert_eq!(result, Err(Error::InvalidAccount));
    }

    #[test]
    fn category_type_must_match() {
        let (conn, account_id) = get_test_connection();

        // Category 1 is the seeded "Salário" income category.
        let result = form(json!({
            "account_id": account_id,
            "category_id": 1,
            "type": "Despesa",
            "amount": 1,
        }))
        .validate(&alice(), &conn);

        assert_eq!(result, Err(Error::InvalidCategory));
    }

    #[test]
    fn missing_category_is_invalid() {
        let (conn, account_id) = get_test_connection();

        let result = form(json!({
            "account_id": account_id,
            "category_id": 999,
            "type": "Entrada",
            "amount": 1,
        }))
        .validate(&alice(), &conn);

        assert_eq!(result, Err(Error::InvalidCategory));
    }

    #[test]
    fn date_is_stored_in_utc() {
        let (conn, account_id) = get_test_connection();

        let new_transaction = form(json!({
            "account_id": account_id,
            "category_id": 6,
            "type": "Despesa",
            "amount": 1,
            "date": "2025-03-01T10:00:00-05:00",
        }))
        .validate(&alice(), &conn)
        .unwrap();

        assert_eq!(new_transaction.date, datetime!(2025-03-01 15:00 UTC));
        assert_eq!(new_transaction.date.offset(), UtcOffset::UTC);
    }

    #[test]
    fn amount_must_be_positive() {
        let (conn, account_id) = get_test_connection();

        for amount in [json!(0), json!(-12.5), json!(0.004)] {
            let result = form(json!({
                "account_id": account_id,
                "category_id": 6,
                "type": "Despesa",
                "amount": amount,
            }))
            .validate(&alice(), &conn);

            assert!(
                matches!(result, Err(Error::NonPositiveAmount(_))),
                "amount {amount} was accepted"
            );
        }
    }

    #[test]
    fn amount_is_checked_before_account() {
        let (conn, _) = get_test_connection();

        let result = form(json!({
            "account_id": 999,
            "category_id": 6,
            "type": "Despesa",
            "amount": -1,
        }))
        .validate(&alice(), &conn);

        assert_eq!(result, Err(Error::NonPositiveAmount(Money::from_cents(-100))));
    }
}
