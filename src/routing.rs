//! Application router configuration.

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::{
    AppState,
    account::{
        create_account_endpoint, delete_account_endpoint, get_account_detail_endpoint,
        get_accounts_endpoint, get_accounts_overview_endpoint, update_account_endpoint,
    },
    auth::resolve_caller_identity,
    bank_institution::get_institutions_endpoint,
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
        get_category_endpoint, update_category_endpoint,
    },
    endpoints,
    logging::logging_middleware,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint,
        get_account_transactions_endpoint, get_expenses_by_category_endpoint,
        get_income_and_expenses_endpoint, get_transaction_endpoint,
        get_user_transactions_endpoint, update_transaction_endpoint,
    },
    user::{create_user_endpoint, delete_user_endpoint, get_user_endpoint, update_user_endpoint},
};

/// Return a router with all the app's routes.
///
/// Every route runs behind the identity middleware: requests with an invalid
/// bearer token are rejected before reaching a handler. Account and
/// transaction handlers additionally require a resolved identity.
pub fn build_router(state: AppState) -> Router {
    let category_routes = Router::new()
        .route(
            endpoints::CATEGORIES,
            get(get_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY,
            get(get_category_endpoint)
                .put(update_category_endpoint)
                .delete(delete_category_endpoint),
        );

    let account_routes = Router::new()
        .route(
            endpoints::ACCOUNTS,
            get(get_accounts_endpoint).post(create_account_endpoint),
        )
        .route(
            endpoints::ACCOUNT,
            put(update_account_endpoint).delete(delete_account_endpoint),
        )
        .route(
            endpoints::ACCOUNTS_DETAILED,
            get(get_accounts_overview_endpoint),
        )
        .route(endpoints::ACCOUNT_DETAILED, get(get_account_detail_endpoint));

    let transaction_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS,
            axum::routing::post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::USER_TRANSACTIONS,
            get(get_user_transactions_endpoint),
        )
        .route(
            endpoints::ACCOUNT_TRANSACTIONS,
            get(get_account_transactions_endpoint),
        )
        .route(
            endpoints::EXPENSES_BY_CATEGORY,
            get(get_expenses_by_category_endpoint),
        )
        .route(
            endpoints::INCOME_AND_EXPENSES,
            get(get_income_and_expenses_endpoint),
        );

    let user_routes = Router::new()
        .route(endpoints::USERS, axum::routing::post(create_user_endpoint))
        .route(
            endpoints::USER,
            get(get_user_endpoint)
                .put(update_user_endpoint)
                .delete(delete_user_endpoint),
        );

    Router::new()
        .merge(category_routes)
        .merge(account_routes)
        .merge(transaction_routes)
        .merge(user_routes)
        .route(endpoints::INSTITUTIONS, get(get_institutions_endpoint))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_caller_identity,
        ))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        bank_institution::BankInstitution, endpoints, response::ApiResponse,
        test_utils::get_test_server,
    };

    #[tokio::test]
    async fn lists_institutions_without_identity() {
        let server = get_test_server();

        let response = server.get(endpoints::INSTITUTIONS).await;

        response.assert_status_ok();
        let institutions = response
            .json::<ApiResponse<Vec<BankInstitution>>>()
            .data
            .unwrap();
        assert_eq!(institutions.len(), 4);
    }

    #[tokio::test]
    async fn invalid_token_is_rejected_on_public_routes() {
        let server = get_test_server();

        let response = server
            .get(endpoints::CATEGORIES)
            .authorization_bearer("garbage")
            .await;

        response.assert_status_unauthorized();
        assert_eq!(
            response.json::<ApiResponse<()>>().message,
            "Unauthorized: Invalid token"
        );
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let server = get_test_server();

        server
            .get("/v1/nada")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn caller_scoped_routes_require_identity() {
        let server = get_test_server();

        server.get(endpoints::ACCOUNTS).await.assert_status_unauthorized();
        server
            .get(endpoints::ACCOUNTS_DETAILED)
            .await
            .assert_status_unauthorized();
        server
            .get(endpoints::USER_TRANSACTIONS)
            .await
            .assert_status_unauthorized();
        server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({}))
            .await
            .assert_status_unauthorized();
    }
}
