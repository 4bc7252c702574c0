//! Defines the endpoints for reading the caller's transactions.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::Response,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::get_account,
    auth::{CallerIdentity, ensure_owned},
    database_id::{AccountId, TransactionId},
    db::lock_connection,
    response::{ApiPath, ApiResponse},
    transaction::{TransactionFilter, get_transaction, get_transactions},
};

/// The state needed to read transactions.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for one of the caller's transactions.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionsState>,
    caller: CallerIdentity,
    ApiPath(transaction_id): ApiPath<TransactionId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let transaction = get_transaction(transaction_id, &connection)
        .map_err(|error| error.not_found_as(Error::TransactionNotFound))?;
    let transaction = ensure_owned(&caller, transaction, Error::TransactionNotFound)?;

    Ok(ApiResponse::ok("Transaction retrieved successfully", transaction))
}

/// A route handler listing all of the caller's transactions, newest first.
///
/// An empty list is still a 200 response.
pub async fn get_user_transactions_endpoint(
    State(state): State<TransactionsState>,
    caller: CallerIdentity,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let transactions =
        get_transactions(&TransactionFilter::for_owner(caller.as_str()), &connection)?;

    Ok(ApiResponse::ok(
        "Transactions retrieved successfully",
        transactions,
    ))
}

/// A route handler listing the transactions of one of the caller's accounts.
pub async fn get_account_transactions_endpoint(
    State(state): State<TransactionsState>,
    caller: CallerIdentity,
    ApiPath(account_id): ApiPath<AccountId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let account = get_account(account_id, &connection)
        .map_err(|error| error.not_found_as(Error::AccountNotFound))?;
    ensure_owned(&caller, account, Error::AccountNotFound)?;

    let transactions = get_transactions(&TransactionFilter::for_account(account_id), &connection)?;

    Ok(ApiResponse::ok(
        "Transactions retrieved successfully",
        transactions,
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        endpoints::{self, format_endpoint},
        response::ApiResponse,
        test_utils::{create_test_account, create_test_transaction, create_token, get_test_server},
        transaction::Transaction,
    };

    #[tokio::test]
    async fn user_list_is_ok_when_empty() {
        let server = get_test_server();

        let response = server
            .get(endpoints::USER_TRANSACTIONS)
            .authorization_bearer(create_token("alice"))
            .await;

        response.assert_status_ok();
        let transactions = response
            .json::<ApiResponse<Vec<Transaction>>>()
            .data
            .unwrap();
        assert!(transactions.is_empty());
    }

    #[tokio::test]
    async fn user_list_only_has_callers_transactions() {
        let server = get_test_server();
        let alices = create_test_account(&server, "alice", "Conta").await;
        let bobs = create_test_account(&server, "bob", "Conta").await;
        let mine =
            create_test_transaction(&server, "alice", alices.account.id, 6, "Despesa", 10.0).await;
        create_test_transaction(&server, "bob", bobs.account.id, 6, "Despesa", 20.0).await;

        let response = server
            .get(endpoints::USER_TRANSACTIONS)
            .authorization_bearer(create_token("alice"))
            .await;

        let transactions = response
            .json::<ApiResponse<Vec<Transaction>>>()
            .data
            .unwrap();
        assert_eq!(transactions, [mine]);
    }

    #[tokio::test]
    async fn account_list_only_has_that_account() {
        let server = get_test_server();
        let first = create_test_account(&server, "alice", "Conta").await;
        let second = create_test_account(&server, "alice", "Poupança").await;
        let wanted =
            create_test_transaction(&server, "alice", first.account.id, 1, "Entrada", 10.0).await;
        create_test_transaction(&server, "alice", second.account.id, 1, "Entrada", 20.0).await;

        let response = server
            .get(&format_endpoint(
                endpoints::ACCOUNT_TRANSACTIONS,
                first.account.id,
            ))
            .authorization_bearer(create_token("alice"))
            .await;

        response.assert_status_ok();
        let transactions = response
            .json::<ApiResponse<Vec<Transaction>>>()
            .data
            .unwrap();
        assert_eq!(transactions, [wanted]);
    }

    #[tokio::test]
    async fn other_users_account_list_is_not_found() {
        let server = get_test_server();
        let account = create_test_account(&server, "alice", "Conta").await;

        server
            .get(&format_endpoint(
                endpoints::ACCOUNT_TRANSACTIONS,
                account.account.id,
            ))
            .authorization_bearer(create_token("mallory"))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn other_users_transaction_is_not_found() {
        let server = get_test_server();
        let account = create_test_account(&server, "alice", "Conta").await;
        let transaction =
            create_test_transaction(&server, "alice", account.account.id, 6, "Despesa", 10.0)
                .await;

        server
            .get(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .authorization_bearer(create_token("mallory"))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn newest_first_across_time_zones() {
        let server = get_test_server();
        let account = create_test_account(&server, "alice", "Conta").await;

        // 10:00 at UTC-5 is 15:00 UTC, so it is newer than 12:00 UTC.
        for date in ["2025-03-01T12:00:00Z", "2025-03-01T10:00:00-05:00"] {
            server
                .post(endpoints::TRANSACTIONS)
                .authorization_bearer(create_token("alice"))
                .json(&json!({
                    "account_id": account.account.id,
                    "category_id": 6,
                    "type": "Despesa",
                    "amount": 1,
                    "date": date,
                }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let transactions = server
            .get(endpoints::USER_TRANSACTIONS)
            .authorization_bearer(create_token("alice"))
            .await
            .json::<serde_json::Value>();

        assert_eq!(transactions["data"][0]["date"], "2025-03-01T15:00:00Z");
        assert_eq!(transactions["data"][1]["date"], "2025-03-01T12:00:00Z");
    }
}
