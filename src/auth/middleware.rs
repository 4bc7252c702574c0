//! Authentication middleware that resolves bearer tokens into caller identities.

use std::sync::Arc;

use axum::{
    RequestPartsExt,
    extract::{FromRef, Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{AppState, Error, auth::IdentityVerifier};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// Checks bearer tokens with the identity provider.
    pub identity_verifier: Arc<dyn IdentityVerifier>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            identity_verifier: state.identity_verifier.clone(),
        }
    }
}

/// Middleware function that resolves the caller's identity from the `Authorization` header.
///
/// If the header is missing the request continues without an identity, and
/// handlers that need one respond with 401. If the header is present but the
/// token cannot be verified, the request is rejected with 401 here.
///
/// **Note**: Route handlers can use the function argument `caller: CallerIdentity` to receive the identity.
pub async fn resolve_caller_identity(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    if !request.headers().contains_key(AUTHORIZATION) {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();
    let bearer = match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
        Ok(TypedHeader(Authorization(bearer))) => bearer,
        Err(error) => {
            tracing::debug!("Malformed authorization header: {error}");
            return Error::InvalidToken.into_response();
        }
    };

    let identity = match state.identity_verifier.verify(bearer.token()) {
        Ok(identity) => identity,
        Err(error) => return error.into_response(),
    };

    tracing::debug!("Resolved caller identity {identity}");
    parts.extensions.insert(identity);

    next.run(Request::from_parts(parts, body)).await
}

#[cfg(test)]
mod resolve_caller_identity_tests {
    use std::sync::Arc;

    use axum::{Router, middleware, routing::get};
    use axum_test::TestServer;

    use crate::{
        auth::{AuthState, CallerIdentity, resolve_caller_identity},
        response::ApiResponse,
        test_utils::{create_token, test_verifier},
    };

    async fn whoami(caller: CallerIdentity) -> String {
        caller.to_string()
    }

    async fn public() -> &'static str {
        "hello"
    }

    fn get_test_server() -> TestServer {
        let state = AuthState {
            identity_verifier: Arc::new(test_verifier()),
        };

        let app = Router::new()
            .route("/whoami", get(whoami))
            .route("/public", get(public))
            .layer(middleware::from_fn_with_state(state, resolve_caller_identity));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn valid_token_resolves_identity() {
        let server = get_test_server();

        let response = server
            .get("/whoami")
            .authorization_bearer(create_token("uid-42"))
            .await;

        response.assert_status_ok();
        response.assert_text("uid-42");
    }

    #[tokio::test]
    async fn missing_header_skips_resolution() {
        let server = get_test_server();

        server.get("/public").await.assert_status_ok();
        server.get("/whoami").await.assert_status_unauthorized();
    }

    #[tokio::test]
    async fn invalid_token_is_rejected_before_handler() {
        let server = get_test_server();

        let response = server
            .get("/public")
            .authorization_bearer("not-a-real-token")
            .await;

        response.assert_status_unauthorized();
        let body = response.json::<ApiResponse<()>>();
        assert_eq!(body.status, 401);
        assert_eq!(body.message, "Unauthorized: Invalid token");
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let server = get_test_server();

        server
            .get("/public")
            .authorization("Basic dXNlcjpwYXNz")
            .await
            .assert_status_unauthorized();
    }
}
