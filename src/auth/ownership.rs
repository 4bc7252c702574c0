//! The single ownership check used by the account and transaction handlers.

use crate::auth::CallerIdentity;

/// A resource that belongs to exactly one caller.
pub trait Owned {
    /// The identity of the owner.
    fn owner(&self) -> &str;
}

/// Return `resource` if `caller` owns it, otherwise `Err(not_owned)`.
///
/// Callers choose the error: handlers looking up a resource by its own ID
/// respond with 404 so that other users cannot learn whether it exists,
/// while handlers validating a referenced resource respond with 400.
pub fn ensure_owned<T: Owned, E>(caller: &CallerIdentity, resource: T, not_owned: E) -> Result<T, E> {
    if resource.owner() == caller.as_str() {
        Ok(resource)
    } else {
        tracing::debug!("Caller {caller} tried to access a resource owned by someone else");
        Err(not_owned)
    }
}

#[cfg(test)]
mod tests {
    use super::{Owned, ensure_owned};
    use crate::{Error, auth::CallerIdentity};

    #[derive(Debug, PartialEq)]
    struct Thing(&'static str);

    impl Owned for Thing {
        fn owner(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn owner_gets_resource() {
        let caller = CallerIdentity::new("alice").unwrap();

        assert_eq!(
            ensure_owned(&caller, Thing("alice"), Error::NotFound),
            Ok(Thing("alice"))
        );
    }

    #[test]
    fn other_caller_gets_error() {
        let caller = CallerIdentity::new("bob").unwrap();

        assert_eq!(
            ensure_owned(&caller, Thing("alice"), Error::AccountNotFound),
            Err(Error::AccountNotFound)
        );
    }
}
