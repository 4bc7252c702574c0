#![allow(missing_docs)]

use axum::http::StatusCode;
use axum_test::TestServer;
use jsonwebtoken::{EncodingKey, Header, encode};
use rusqlite::Connection;
use serde_json::json;
use time::{Duration, OffsetDateTime};

use crate::{
    AppState, JwtIdentityVerifier,
    account::AccountView,
    build_router,
    database_id::{AccountId, CategoryId},
    endpoints,
    response::ApiResponse,
    transaction::Transaction,
    user::User,
};

pub(crate) const TEST_SECRET: &[u8] = b"super secret test key";
pub(crate) const TEST_AUDIENCE: &str = "econome-test";
pub(crate) const TEST_ISSUER: &str = "https://securetoken.google.com/econome-test";

pub(crate) fn test_verifier() -> JwtIdentityVerifier {
    JwtIdentityVerifier::from_secret(TEST_SECRET, Some(TEST_AUDIENCE), Some(TEST_ISSUER))
}

/// Sign a token for `uid` that [test_verifier] accepts for the next hour.
pub(crate) fn create_token(uid: &str) -> String {
    let exp = (OffsetDateTime::now_utc() + Duration::hours(1)).unix_timestamp();

    encode(
        &Header::default(),
        &json!({"sub": uid, "aud": TEST_AUDIENCE, "iss": TEST_ISSUER, "exp": exp}),
        &EncodingKey::from_secret(TEST_SECRET),
    )
    .expect("Could not sign test token")
}

pub(crate) fn get_test_server() -> TestServer {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory database connection");
    let state = AppState::new(connection, test_verifier()).expect("Could not create app state");
    let app = build_router(state);

    TestServer::try_new(app).expect("Could not create test server.")
}

pub(crate) async fn create_test_user(server: &TestServer, uid: &str, name: &str) -> User {
    let response = server
        .post(endpoints::USERS)
        .json(&json!({
            "firebase_uid": uid,
            "name": name,
            "email": format!("{uid}@example.com"),
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    response
        .json::<ApiResponse<User>>()
        .data
        .expect("Created user missing from response")
}

/// Create an account for `uid` at Nubank with a balance of 100.00.
pub(crate) async fn create_test_account(server: &TestServer, uid: &str, name: &str) -> AccountView {
    let response = server
        .post(endpoints::ACCOUNTS)
        .authorization_bearer(create_token(uid))
        .json(&json!({"name": name, "institution_id": 2, "balance": 100.0}))
        .await;
    response.assert_status(StatusCode::CREATED);

    response
        .json::<ApiResponse<AccountView>>()
        .data
        .expect("Created account missing from response")
}

pub(crate) async fn create_test_transaction(
    server: &TestServer,
    uid: &str,
    account_id: AccountId,
    category_id: CategoryId,
    kind: &str,
    amount: f64,
) -> Transaction {
    let response = server
        .post(endpoints::TRANSACTIONS)
        .authorization_bearer(create_token(uid))
        .json(&json!({
            "account_id": account_id,
            "category_id": category_id,
            "type": kind,
            "amount": amount,
            "description": "test transaction",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    response
        .json::<ApiResponse<Transaction>>()
        .data
        .expect("Created transaction missing from response")
}
