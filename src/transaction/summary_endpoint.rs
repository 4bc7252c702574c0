//! Defines the endpoints summarizing the caller's transactions.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::Response,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::CallerIdentity,
    db::lock_connection,
    response::ApiResponse,
    transaction::{get_expenses_by_category, get_income_expense_summary},
};

/// The state needed to summarize transactions.
#[derive(Debug, Clone)]
pub struct TransactionSummaryState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionSummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for the caller's expense totals per category name.
pub async fn get_expenses_by_category_endpoint(
    State(state): State<TransactionSummaryState>,
    caller: CallerIdentity,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let totals = get_expenses_by_category(caller.as_str(), &connection)?;

    Ok(ApiResponse::ok(
        "Expenses by category retrieved successfully",
        totals,
    ))
}

/// A route handler for the caller's total income and total expenses.
pub async fn get_income_and_expenses_endpoint(
    State(state): State<TransactionSummaryState>,
    caller: CallerIdentity,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let summary = get_income_expense_summary(caller.as_str(), &connection)?;

    Ok(ApiResponse::ok(
        "Income and expenses retrieved successfully",
        summary,
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        Money,
        category::Category,
        endpoints,
        response::ApiResponse,
        test_utils::{create_test_account, create_test_transaction, create_token, get_test_server},
        transaction::{CategoryTotal, IncomeExpenseSummary},
    };

    async fn create_category(server: &TestServer, name: &str) -> i64 {
        let response = server
            .post(endpoints::CATEGORIES)
            .json(&json!({"name": name, "type": "Despesa"}))
            .await;
        response.assert_status(StatusCode::CREATED);

        response.json::<ApiResponse<Category>>().data.unwrap().id
    }

    #[tokio::test]
    async fn grouped_expenses_match_expense_total() {
        let server = get_test_server();
        let account = create_test_account(&server, "alice", "Conta").await.account.id;
        let food = create_category(&server, "Food").await;
        let transport = create_category(&server, "Transport").await;
        create_test_transaction(&server, "alice", account, food, "Despesa", 10.0).await;
        create_test_transaction(&server, "alice", account, food, "Despesa", 15.5).await;
        create_test_transaction(&server, "alice", account, transport, "Saida", 5.0).await;
        create_test_transaction(&server, "alice", account, 1, "Entrada", 2500.0).await;

        let by_category = server
            .get(endpoints::EXPENSES_BY_CATEGORY)
            .authorization_bearer(create_token("alice"))
            .await
            .json::<ApiResponse<Vec<CategoryTotal>>>()
            .data
            .unwrap();
        let summary = server
            .get(endpoints::INCOME_AND_EXPENSES)
            .authorization_bearer(create_token("alice"))
            .await
            .json::<ApiResponse<IncomeExpenseSummary>>()
            .data
            .unwrap();

        assert_eq!(
            by_category,
            [
                CategoryTotal {
                    category_name: "Food".to_owned(),
                    total: Money::from_cents(2_550),
                },
                CategoryTotal {
                    category_name: "Transport".to_owned(),
                    total: Money::from_cents(500),
                },
            ]
        );
        assert_eq!(summary.total_expenses, Money::from_cents(3_050));
        assert_eq!(summary.total_income, Money::from_cents(250_000));
        assert_eq!(
            Money::checked_sum(by_category.iter().map(|total| total.total)),
            Ok(summary.total_expenses)
        );
    }

    #[tokio::test]
    async fn summary_json_uses_numbers() {
        let server = get_test_server();
        let account = create_test_account(&server, "alice", "Conta").await.account.id;
        create_test_transaction(&server, "alice", account, 6, "Despesa", 25.5).await;

        let response = server
            .get(endpoints::INCOME_AND_EXPENSES)
            .authorization_bearer(create_token("alice"))
            .await;

        response.assert_status_ok();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["data"]["total_expenses"], json!(25.5));
        assert_eq!(body["data"]["total_income"], json!(0.0));
    }

    #[tokio::test]
    async fn summaries_require_identity() {
        let server = get_test_server();

        server
            .get(endpoints::EXPENSES_BY_CATEGORY)
            .await
            .assert_status_unauthorized();
        server
            .get(endpoints::INCOME_AND_EXPENSES)
            .await
            .assert_status_unauthorized();
    }

    #[tokio::test]
    async fn overflowing_totals_are_rejected() {
        let server = get_test_server();
        let account = create_test_account(&server, "alice", "Conta").await.account.id;
        for _ in 0..11 {
            create_test_transaction(
                &server,
                "alice",
                account,
                6,
                "Despesa",
                9_000_000_000_000_000.0,
            )
            .await;
        }

        for endpoint in [endpoints::EXPENSES_BY_CATEGORY, endpoints::INCOME_AND_EXPENSES] {
            let response = server
                .get(endpoint)
                .authorization_bearer(create_token("alice"))
                .await;

            response.assert_status_bad_request();
            assert!(
                response
                    .json::<ApiResponse<()>>()
                    .message
                    .contains("out of range")
            );
        }
    }
}
