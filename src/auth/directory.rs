//! In-memory identity provider
//!
//! Stands in for a remote authentication service. Accounts are registered
//! with a password and display names; authenticating returns `firstname`,
//! `lastname` and `netid` attributes, keyed by the normalized username.

use super::{Credential, IdentityTransport, RemoteIdentity};
use crate::error::{CacheError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// First name returned for unregistered users in accept-any mode
pub const DEFAULT_FIRSTNAME: &str = "TestFirstName";

/// Last name returned for unregistered users in accept-any mode
pub const DEFAULT_LASTNAME: &str = "TestLastName";

#[derive(Debug, Clone)]
struct Account {
    password: String,
    firstname: String,
    lastname: String,
}

/// Identity provider backed by an in-memory account table
///
/// # Examples
///
/// ```
/// use identity_cache::{Credential, IdentityTransport, StaticDirectory};
///
/// # fn main() -> identity_cache::Result<()> {
/// let directory = StaticDirectory::new();
/// directory.register("jdoe", "secret", "John", "Doe");
///
/// let identity = directory.authenticate(&Credential::new("JDoe", "secret"))?;
/// assert_eq!(identity.map(|i| i.id), Some("jdoe".to_string()));
///
/// assert!(directory.authenticate(&Credential::new("jdoe", "wrong"))?.is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct StaticDirectory {
    accounts: RwLock<HashMap<String, Account>>,
    accept_any_password: bool,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory that vouches for any non-blank username/password pair
    pub fn accept_any() -> Self {
        StaticDirectory {
            accounts: RwLock::new(HashMap::new()),
            accept_any_password: true,
        }
    }

    /// Register or replace an account
    pub fn register(
        &self,
        username: &str,
        password: &str,
        firstname: &str,
        lastname: &str,
    ) {
        let key = username.trim().to_lowercase();
        self.accounts.write().insert(
            key,
            Account {
                password: password.to_string(),
                firstname: firstname.to_string(),
                lastname: lastname.to_string(),
            },
        );
    }

    /// Remove an account; returns true if it existed
    pub fn unregister(&self, username: &str) -> bool {
        self.accounts
            .write()
            .remove(&username.trim().to_lowercase())
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}

impl IdentityTransport for StaticDirectory {
    fn authenticate(&self, credential: &Credential) -> Result<Option<RemoteIdentity>> {
        let netid = credential.normalized_username();
        if netid.is_empty() || credential.password.trim().is_empty() {
            return Err(CacheError::InvalidCredential(
                "netid and password are mandatory".to_string(),
            ));
        }

        let (firstname, lastname) = match self.accounts.read().get(&netid) {
            Some(account) if account.password == credential.password => {
                (account.firstname.clone(), account.lastname.clone())
            }
            Some(_) => {
                debug!("Password mismatch for {}", netid);
                return Ok(None);
            }
            None if self.accept_any_password => {
                (DEFAULT_FIRSTNAME.to_string(), DEFAULT_LASTNAME.to_string())
            }
            None => {
                debug!("Unknown netid {}", netid);
                return Ok(None);
            }
        };

        Ok(Some(
            RemoteIdentity::new(netid.clone())
                .with_attribute("firstname", firstname)
                .with_attribute("lastname", lastname)
                .with_attribute("netid", netid),
        ))
    }
}
