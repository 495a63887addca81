//! # Identity Cache - Consume-Once Attribute Cache
//!
//! `identity-cache` holds identity attributes for the short window between an
//! authentication step and the resolution step that reads them back:
//!
//! - **Consume-once reads**: an exact lookup removes the entry it returns
//! - **Wildcard reads**: `*` patterns return every live match without consuming
//! - **Time-to-live**: unread entries expire and are purged on later writes
//! - **Lock-free store**: safe to share across threads without caller locking
//!
//! ## Quick Start
//!
//! ```rust
//! use identity_cache::{AttributeCache, Attributes, Result};
//!
//! # fn main() -> Result<()> {
//! let cache = AttributeCache::new();
//!
//! // Written by the authentication step
//! let mut attrs = Attributes::new();
//! attrs.insert("firstname".to_string(), vec!["Ada".into()]);
//! cache.put("ada", attrs)?;
//!
//! // Read back once by the resolution step
//! assert!(cache.take_exact("ada").is_some());
//! assert!(cache.take_exact("ada").is_none());
//! # Ok(())
//! # }
//! ```
//!
//! ## Authentication and Resolution
//!
//! ```rust
//! use identity_cache::{
//!     AttributeCacheBuilder, AuthenticationHandler, Credential, PersonResolver,
//!     ResolveRequest, ResolverConfig, Result, StaticDirectory,
//! };
//! use std::sync::Arc;
//!
//! # fn main() -> Result<()> {
//! let cache = Arc::new(
//!     AttributeCacheBuilder::new()
//!         .ttl_minutes(2)
//!         .query_attribute_name("netid")
//!         .username_attribute("netid")
//!         .build()?,
//! );
//!
//! let directory = StaticDirectory::new();
//! directory.register("jdoe", "secret", "John", "Doe");
//!
//! let handler = AuthenticationHandler::new(directory).with_repository(cache.clone());
//! handler.authenticate(&Credential::new("jdoe", "secret"))?;
//!
//! let resolver = PersonResolver::new(cache.clone(), ResolverConfig::from(cache.config()));
//! let people = resolver.resolve(&ResolveRequest::new("jdoe"))?;
//! assert_eq!(people[0].name.as_deref(), Some("jdoe"));
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod core;
pub mod error;

pub use crate::auth::{
    AuthenticationHandler, Credential, IdentityTransport, Principal, RemoteIdentity,
    StaticDirectory,
};
pub use crate::core::{
    AttributeCache, AttributeRepository, AttributeValue, Attributes, CacheConfig, CacheEntry,
    CachedSubject, Clock, ExpiryStamp, ManualClock, Matches, PersonAttributes, PersonResolver,
    ResolveRequest, ResolverConfig, SubjectPattern, SystemClock, Ttl, EXPIRY_ATTRIBUTE, WILDCARD,
};
pub use crate::error::{CacheError, Result};

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Builder for customizing cache creation
///
/// Settings are checked when [`build`](Self::build) runs, so a non-positive
/// TTL fails there rather than being clamped.
///
/// # Examples
///
/// ```rust
/// use identity_cache::AttributeCacheBuilder;
///
/// # fn main() -> identity_cache::Result<()> {
/// let cache = AttributeCacheBuilder::new()
///     .ttl_minutes(5)
///     .query_attribute_name("uid")
///     .possible_attribute_names(["firstname", "lastname"])
///     .build()?;
///
/// assert_eq!(cache.ttl().minutes(), 5);
///
/// assert!(AttributeCacheBuilder::new().ttl_minutes(0).build().is_err());
/// # Ok(())
/// # }
/// ```
pub struct AttributeCacheBuilder {
    config_path: Option<PathBuf>,
    ttl_minutes: Option<i64>,
    query_attribute_name: Option<String>,
    username_attribute: Option<String>,
    possible_attribute_names: BTreeSet<String>,
    clock: Option<Arc<dyn Clock>>,
}

impl AttributeCacheBuilder {
    /// Create a new AttributeCacheBuilder with default settings
    pub fn new() -> Self {
        AttributeCacheBuilder {
            config_path: None,
            ttl_minutes: None,
            query_attribute_name: None,
            username_attribute: None,
            possible_attribute_names: BTreeSet::new(),
            clock: None,
        }
    }

    /// Start from a TOML config file; explicit settings override it
    pub fn config_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Set the entry lifetime in whole minutes (must be positive)
    pub fn ttl_minutes(mut self, minutes: i64) -> Self {
        self.ttl_minutes = Some(minutes);
        self
    }

    /// Set the correlation attribute name
    pub fn query_attribute_name<S: Into<String>>(mut self, name: S) -> Self {
        self.query_attribute_name = Some(name.into());
        self
    }

    /// Set the attribute used to name resolved people
    pub fn username_attribute<S: Into<String>>(mut self, name: S) -> Self {
        self.username_attribute = Some(name.into());
        self
    }

    /// Advertise attribute names the cache may hold
    pub fn possible_attribute_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.possible_attribute_names
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Use a custom time source
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the cache
    ///
    /// # Errors
    ///
    /// `InvalidTtl` for a TTL below one minute; `Io`/`Config` if a config
    /// file was given and cannot be read or parsed.
    pub fn build(self) -> Result<AttributeCache> {
        let mut config = match &self.config_path {
            Some(path) => {
                debug!("Loading cache config from {:?}", path);
                CacheConfig::load(path)?
            }
            None => CacheConfig::default(),
        };

        if let Some(minutes) = self.ttl_minutes {
            config.ttl_minutes = Ttl::from_minutes(minutes)?;
        }
        if let Some(name) = self.query_attribute_name {
            config.query_attribute_name = Some(name);
        }
        if let Some(name) = self.username_attribute {
            config.username_attribute = name;
        }
        config
            .possible_attribute_names
            .extend(self.possible_attribute_names);

        info!(
            "Building attribute cache with TTL {}, query attribute {:?}",
            config.ttl_minutes, config.query_attribute_name
        );

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        Ok(AttributeCache::with_clock(config, clock))
    }
}

impl Default for AttributeCacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}
