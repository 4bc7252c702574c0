//! Verification of identity-provider bearer tokens.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use crate::{Error, auth::CallerIdentity};

/// Turns a bearer token into the caller's identity.
///
/// Implementations must not issue tokens, only check them.
pub trait IdentityVerifier: Send + Sync {
    /// Verify `token` and return the identity it was issued for.
    ///
    /// # Errors
    /// Returns [Error::InvalidToken] if the token is malformed, expired,
    /// signed with the wrong key, or issued for a different audience.
    fn verify(&self, token: &str) -> Result<CallerIdentity, Error>;
}

/// The claims read from an identity token.
#[derive(Debug, Deserialize)]
struct Claims {
    /// The identity the token was issued for.
    sub: String,
}

/// Verifies JSON Web Tokens and uses their `sub` claim as the identity.
///
/// Tokens from an identity provider are signed with RS256, use
/// [JwtIdentityVerifier::from_rsa_pem]. A shared HS256 secret is supported for
/// local development through [JwtIdentityVerifier::from_secret].
#[derive(Clone)]
pub struct JwtIdentityVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityVerifier {
    /// Create a verifier for RS256 tokens signed by the private half of the
    /// PEM encoded public key `pem`.
    ///
    /// # Errors
    /// Returns [Error::InvalidVerificationKey] if `pem` is not an RSA public key.
    pub fn from_rsa_pem(
        pem: &[u8],
        audience: Option<&str>,
        issuer: Option<&str>,
    ) -> Result<Self, Error> {
        let decoding_key = DecodingKey::from_rsa_pem(pem)
            .map_err(|error| Error::InvalidVerificationKey(error.to_string()))?;

        Ok(Self::new(decoding_key, Algorithm::RS256, audience, issuer))
    }

    /// Create a verifier for HS256 tokens signed with `secret`.
    pub fn from_secret(secret: &[u8], audience: Option<&str>, issuer: Option<&str>) -> Self {
        Self::new(
            DecodingKey::from_secret(secret),
            Algorithm::HS256,
            audience,
            issuer,
        )
    }

    fn new(
        decoding_key: DecodingKey,
        algorithm: Algorithm,
        audience: Option<&str>,
        issuer: Option<&str>,
    ) -> Self {
        let mut validation = Validation::new(algorithm);

        match audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            decoding_key,
            validation,
        }
    }
}

impl IdentityVerifier for JwtIdentityVerifier {
    fn verify(&self, token: &str) -> Result<CallerIdentity, Error> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|error| {
                tracing::debug!("Rejected bearer token: {error}");
                Error::InvalidToken
            })?;

        CallerIdentity::new(&token_data.claims.sub)
    }
}
