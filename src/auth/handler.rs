//! Credential verification that feeds the attribute cache

use super::{Credential, IdentityTransport, RemoteIdentity};
use crate::core::resolver::AttributeRepository;
use crate::core::value::wrap_scalars;
use crate::error::{CacheError, Result};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Authenticated principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
}

/// Authenticates credentials through a transport and caches the attributes
/// it hands back
pub struct AuthenticationHandler<T> {
    transport: T,
    repository: Option<Arc<dyn AttributeRepository>>,
}

impl<T: IdentityTransport> AuthenticationHandler<T> {
    /// Handler that only verifies credentials
    pub fn new(transport: T) -> Self {
        AuthenticationHandler {
            transport,
            repository: None,
        }
    }

    /// Wire in the repository that receives attributes on success
    pub fn with_repository(mut self, repository: Arc<dyn AttributeRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Verify a credential
    ///
    /// On success the identity's attributes are stored under the identity's
    /// id, each value wrapped into a single-element sequence, and a principal
    /// named after the credential's username is returned.
    ///
    /// # Errors
    ///
    /// `AuthenticationFailed` if the transport rejects the credential or
    /// fails; `InvalidCredential` if it refuses the credential outright.
    pub fn authenticate(&self, credential: &Credential) -> Result<Principal> {
        let username = credential.username.clone();
        debug!("Authenticating {}", username);

        let identity = match self.transport.authenticate(credential) {
            Ok(identity) => identity,
            Err(CacheError::InvalidCredential(reason)) => {
                return Err(CacheError::InvalidCredential(reason));
            }
            Err(e) => {
                error!("Identity transport failed for {}: {}", username, e);
                return Err(CacheError::AuthenticationFailed(username));
            }
        };

        let Some(identity) = identity else {
            warn!("No identity received for {}", username);
            return Err(CacheError::AuthenticationFailed(username));
        };

        self.update_person_attributes(identity)?;
        Ok(Principal { id: username })
    }

    fn update_person_attributes(&self, identity: RemoteIdentity) -> Result<()> {
        let Some(repository) = &self.repository else {
            return Ok(());
        };

        debug!(
            "Updating {} person attributes for {}",
            identity.attributes.len(),
            identity.id
        );
        repository.put(&identity.id, wrap_scalars(identity.attributes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::AttributeCache;
    use crate::core::value::AttributeValue;

    struct FixedTransport(Option<RemoteIdentity>);

    impl IdentityTransport for FixedTransport {
        fn authenticate(&self, _credential: &Credential) -> Result<Option<RemoteIdentity>> {
            Ok(self.0.clone())
        }
    }

    struct BrokenTransport;

    impl IdentityTransport for BrokenTransport {
        fn authenticate(&self, _credential: &Credential) -> Result<Option<RemoteIdentity>> {
            Err(CacheError::Transport("connection refused".to_string()))
        }
    }

    #[test]
    fn test_success_caches_wrapped_attributes() -> Result<()> {
        let cache = Arc::new(AttributeCache::new());
        let identity = RemoteIdentity::new("jdoe")
            .with_attribute("firstname", "John")
            .with_attribute("lastname", "Doe");
        let handler = AuthenticationHandler::new(FixedTransport(Some(identity)))
            .with_repository(cache.clone());

        let principal = handler.authenticate(&Credential::new("JDoe", "pw"))?;
        assert_eq!(principal.id, "JDoe");

        let attrs = cache.take_exact("jdoe").unwrap();
        assert_eq!(attrs["firstname"], vec![AttributeValue::from("John")]);
        assert_eq!(attrs["lastname"], vec![AttributeValue::from("Doe")]);

        Ok(())
    }

    #[test]
    fn test_success_without_repository() -> Result<()> {
        let handler = AuthenticationHandler::new(FixedTransport(Some(RemoteIdentity::new("x"))));
        assert_eq!(handler.authenticate(&Credential::new("x", "pw"))?.id, "x");
        Ok(())
    }

    #[test]
    fn test_null_identity_fails() {
        let cache = Arc::new(AttributeCache::new());
        let handler =
            AuthenticationHandler::new(FixedTransport(None)).with_repository(cache.clone());

        let result = handler.authenticate(&Credential::new("jdoe", "pw"));
        assert!(matches!(result, Err(CacheError::AuthenticationFailed(ref u)) if u == "jdoe"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_transport_error_fails_authentication() {
        let handler = AuthenticationHandler::new(BrokenTransport);
        assert!(matches!(
            handler.authenticate(&Credential::new("jdoe", "pw")),
            Err(CacheError::AuthenticationFailed(_))
        ));
    }
}
