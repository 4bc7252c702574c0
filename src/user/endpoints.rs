//! The JSON endpoints for user profiles.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::Response,
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    database_id::UserId,
    db::lock_connection,
    endpoints::{self, format_endpoint},
    response::{ApiJson, ApiPath, ApiResponse, no_content},
    user::{NewUser, create_user, delete_user, get_user_by_identity, update_user},
};

/// The state needed by the user endpoints.
#[derive(Debug, Clone)]
pub struct UserState {
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The request body for creating or updating a user.
#[derive(Debug, Deserialize)]
pub struct UserForm {
    /// Only checked on update, where it must match the ID in the path.
    #[serde(default)]
    pub id: Option<UserId>,
    pub firebase_uid: String,
    pub name: String,
    pub email: String,
}

/// A route handler that gets a user by the identity provider's ID.
pub async fn get_user_endpoint(
    State(state): State<UserState>,
    ApiPath(firebase_uid): ApiPath<String>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let user = get_user_by_identity(&firebase_uid, &connection)
        .map_err(|error| error.not_found_as(Error::UserNotFound))?;

    Ok(ApiResponse::ok("User retrieved successfully", user))
}

/// A route handler for registering a user profile.
///
/// Responds with 201 and a location pointing at the user's identity.
pub async fn create_user_endpoint(
    State(state): State<UserState>,
    ApiJson(form): ApiJson<UserForm>,
) -> Result<Response, Error> {
    let new_user = NewUser::new(&form.firebase_uid, &form.name, &form.email)?;

    let connection = lock_connection(&state.db_connection)?;
    let user = create_user(new_user, &connection)?;
    tracing::info!("Registered user {}", user.id);

    Ok(ApiResponse::created(
        &format_endpoint(endpoints::USER, &user.firebase_uid),
        "User created successfully",
        user,
    ))
}

/// A route handler for replacing a user's profile.
pub async fn update_user_endpoint(
    State(state): State<UserState>,
    ApiPath(user_id): ApiPath<UserId>,
    ApiJson(form): ApiJson<UserForm>,
) -> Result<Response, Error> {
    if form.id != Some(user_id) {
        return Err(Error::IdMismatch);
    }

    let new_user = NewUser::new(&form.firebase_uid, &form.name, &form.email)?;

    let connection = lock_connection(&state.db_connection)?;
    let user = update_user(user_id, new_user, &connection)
        .map_err(|error| error.not_found_as(Error::UserNotFound))?;

    Ok(ApiResponse::ok("User updated successfully", user))
}

/// A route handler for deleting a user by its database ID.
pub async fn delete_user_endpoint(
    State(state): State<UserState>,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<Response, Error> {
    let connection = lock_connection(&state.db_connection)?;

    if delete_user(user_id, &connection)? {
        tracing::info!("Deleted user {user_id}");
        Ok(no_content())
    } else {
        Err(Error::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        endpoints::{self, format_endpoint},
        response::ApiResponse,
        test_utils::{create_test_user, get_test_server},
        user::User,
    };

    #[tokio::test]
    async fn create_then_get_by_identity() {
        let server = get_test_server();

        let response = server
            .post(endpoints::USERS)
            .json(&json!({
                "firebase_uid": "uid-1",
                "name": "Maria",
                "email": "maria@example.com",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.header("location"), "/v1/usuarios/uid-1");

        let response = server.get(&format_endpoint(endpoints::USER, "uid-1")).await;
        response.assert_status_ok();
        let user = response.json::<ApiResponse<User>>().data.unwrap();
        assert_eq!(user.name, "Maria");
        assert_eq!(user.email, "maria@example.com");
    }

    #[tokio::test]
    async fn get_unknown_identity_is_not_found() {
        let server = get_test_server();

        let response = server.get(&format_endpoint(endpoints::USER, "nobody")).await;

        response.assert_status_not_found();
        assert_eq!(response.json::<ApiResponse<User>>().data, None);
    }

    #[tokio::test]
    async fn create_rejects_invalid_email() {
        let server = get_test_server();

        server
            .post(endpoints::USERS)
            .json(&json!({"firebase_uid": "uid-1", "name": "Maria", "email": "maria"}))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn create_rejects_duplicate_identity() {
        let server = get_test_server();
        create_test_user(&server, "uid-1", "Maria").await;

        server
            .post(endpoints::USERS)
            .json(&json!({"firebase_uid": "uid-1", "name": "Outra", "email": "o@example.com"}))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn update_requires_matching_id() {
        let server = get_test_server();
        let user = create_test_user(&server, "uid-1", "Maria").await;

        server
            .put(&format_endpoint(endpoints::USER, user.id))
            .json(&json!({
                "id": user.id + 1,
                "firebase_uid": "uid-1",
                "name": "Maria",
                "email": "maria@example.com",
            }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn update_changes_profile() {
        let server = get_test_server();
        let user = create_test_user(&server, "uid-1", "Maria").await;

        let response = server
            .put(&format_endpoint(endpoints::USER, user.id))
            .json(&json!({
                "id": user.id,
                "firebase_uid": "uid-1",
                "name": "Maria Silva",
                "email": "silva@example.com",
            }))
            .await;

        response.assert_status_ok();
        let updated = response.json::<ApiResponse<User>>().data.unwrap();
        assert_eq!(updated.name, "Maria Silva");
    }

    #[tokio::test]
    async fn update_missing_user_is_not_found() {
        let server = get_test_server();

        server
            .put(&format_endpoint(endpoints::USER, 42))
            .json(&json!({
                "id": 42,
                "firebase_uid": "uid-1",
                "name": "Maria",
                "email": "maria@example.com",
            }))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn delete_then_delete_again_is_not_found() {
        let server = get_test_server();
        let user = create_test_user(&server, "uid-1", "Maria").await;
        let path = format_endpoint(endpoints::USER, user.id);

        server.delete(&path).await.assert_status(StatusCode::NO_CONTENT);
        server.delete(&path).await.assert_status_not_found();
    }

    #[tokio::test]
    async fn non_numeric_id_is_bad_request() {
        let server = get_test_server();

        server
            .delete(&format_endpoint(endpoints::USER, "abc"))
            .await
            .assert_status_bad_request();
    }
}
