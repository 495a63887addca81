//! Authentication: the step that writes attributes into the cache
//!
//! An [`IdentityTransport`] exchanges a credential for a remote identity and
//! its raw (single-valued) attributes. The [`AuthenticationHandler`] drives the
//! transport and, on success, stores the identity's attributes in an
//! [`AttributeRepository`](crate::AttributeRepository) for the resolution step.

mod directory;
mod handler;

pub use directory::{StaticDirectory, DEFAULT_FIRSTNAME, DEFAULT_LASTNAME};
pub use handler::{AuthenticationHandler, Principal};

use crate::core::value::AttributeValue;
use crate::error::Result;
use std::collections::BTreeMap;
use std::fmt;

/// Username/password pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub username: String,
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credential {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Username as sent to identity providers: trimmed and lowercased
    pub fn normalized_username(&self) -> String {
        self.username.trim().to_lowercase()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identity returned by a remote provider
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteIdentity {
    pub id: String,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl RemoteIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        RemoteIdentity {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(
        mut self,
        name: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

/// Exchanges credentials for a remote identity
///
/// `Ok(None)` means the provider did not vouch for the credential.
pub trait IdentityTransport: Send + Sync {
    fn authenticate(&self, credential: &Credential) -> Result<Option<RemoteIdentity>>;
}

impl<T: IdentityTransport + ?Sized> IdentityTransport for std::sync::Arc<T> {
    fn authenticate(&self, credential: &Credential) -> Result<Option<RemoteIdentity>> {
        (**self).authenticate(credential)
    }
}
