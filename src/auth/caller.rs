//! The identity of the user making a request.

use std::fmt::Display;

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The stable identity string the identity provider assigned to the caller.
///
/// Route handlers can take a `CallerIdentity` argument to require an
/// authenticated caller. The extractor reads the identity placed into the
/// request extensions by [resolve_caller_identity](super::resolve_caller_identity)
/// and rejects the request with [Error::MissingIdentity] if there is none.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallerIdentity(String);

impl CallerIdentity {
    /// Wrap a resolved identity string.
    ///
    /// # Errors
    /// Returns [Error::InvalidToken] if `identity` is empty.
    pub fn new(identity: &str) -> Result<Self, Error> {
        if identity.trim().is_empty() {
            return Err(Error::InvalidToken);
        }

        Ok(Self(identity.to_owned()))
    }

    /// The identity as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CallerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or(Error::MissingIdentity)
    }
}
