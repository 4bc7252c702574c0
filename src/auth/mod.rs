//! Resolves bearer tokens into caller identities and checks resource ownership.

mod caller;
mod middleware;
mod ownership;
mod token;

pub use caller::CallerIdentity;
pub use middleware::{AuthState, resolve_caller_identity};
pub use ownership::{Owned, ensure_owned};
pub use token::{IdentityVerifier, JwtIdentityVerifier};
