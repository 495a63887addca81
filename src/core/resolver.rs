//! Resolving cached attributes into named people
//!
//! The resolution step reads attributes back out of a repository, either by
//! an exact subject identifier (consuming the entry) or by a wildcard pattern,
//! and names each result.
//!
//! A result is named by, in priority order:
//! 1. the subject name supplied by the caller;
//! 2. for exact lookups, the lookup key itself, when the attribute being
//!    queried is the configured correlation attribute;
//! 3. the first value of the username attribute found in the attributes.

use super::cache::{AttributeCache, CachedSubject};
use super::config::CacheConfig;
use super::pattern::SubjectPattern;
use super::value::{first_value, Attributes};
use crate::error::Result;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Narrow write/read interface over an attribute store
pub trait AttributeRepository: Send + Sync {
    /// Store attributes for a subject
    fn put(&self, subject_id: &str, attributes: Attributes) -> Result<()>;

    /// Exact (consuming) or wildcard (non-consuming) lookup, selected by
    /// whether `key` contains the wildcard token
    fn lookup(&self, key: &str) -> Result<Vec<CachedSubject>>;

    /// Attribute names the store may hold (informational)
    fn possible_attribute_names(&self) -> BTreeSet<String> {
        BTreeSet::new()
    }
}

impl AttributeRepository for AttributeCache {
    fn put(&self, subject_id: &str, attributes: Attributes) -> Result<()> {
        AttributeCache::put(self, subject_id, attributes)
    }

    fn lookup(&self, key: &str) -> Result<Vec<CachedSubject>> {
        AttributeCache::lookup(self, key)
    }

    fn possible_attribute_names(&self) -> BTreeSet<String> {
        AttributeCache::possible_attribute_names(self).clone()
    }
}

impl<R: AttributeRepository + ?Sized> AttributeRepository for Arc<R> {
    fn put(&self, subject_id: &str, attributes: Attributes) -> Result<()> {
        (**self).put(subject_id, attributes)
    }

    fn lookup(&self, key: &str) -> Result<Vec<CachedSubject>> {
        (**self).lookup(key)
    }

    fn possible_attribute_names(&self) -> BTreeSet<String> {
        (**self).possible_attribute_names()
    }
}

/// Attribute names used to correlate and name results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Attribute that names a person
    pub username_attribute: String,
    /// Correlation attribute keying into the repository
    pub query_attribute_name: Option<String>,
}

impl From<&CacheConfig> for ResolverConfig {
    fn from(config: &CacheConfig) -> Self {
        ResolverConfig {
            username_attribute: config.username_attribute.clone(),
            query_attribute_name: config.query_attribute_name.clone(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig::from(&CacheConfig::default())
    }
}

/// A resolution request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveRequest {
    /// Exact subject identifier, or a wildcard pattern
    pub key: String,
    /// Name already known to the caller
    pub subject_name: Option<String>,
    /// Attribute the key was taken from, if not the username attribute
    pub query_attribute: Option<String>,
}

impl ResolveRequest {
    pub fn new(key: impl Into<String>) -> Self {
        ResolveRequest {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn with_subject_name(mut self, name: impl Into<String>) -> Self {
        self.subject_name = Some(name.into());
        self
    }

    pub fn with_query_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.query_attribute = Some(attribute.into());
        self
    }
}

/// A resolved, named attribute set
#[derive(Debug, Clone, PartialEq)]
pub struct PersonAttributes {
    /// `None` when no naming rule produced a name
    pub name: Option<String>,
    pub attributes: Attributes,
}

/// Reads attributes back out of a repository and names the results
pub struct PersonResolver<R> {
    repository: R,
    config: ResolverConfig,
}

impl<R: AttributeRepository> PersonResolver<R> {
    pub fn new(repository: R, config: ResolverConfig) -> Self {
        PersonResolver { repository, config }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Attribute whose value keys into the repository
    pub fn key_attribute(&self) -> &str {
        self.config
            .query_attribute_name
            .as_deref()
            .unwrap_or(&self.config.username_attribute)
    }

    /// Attributes a query may be issued on
    pub fn available_query_attributes(&self) -> BTreeSet<String> {
        BTreeSet::from([self.config.username_attribute.clone()])
    }

    pub fn possible_attribute_names(&self) -> BTreeSet<String> {
        self.repository.possible_attribute_names()
    }

    /// Pick the lookup key out of a query map
    ///
    /// Returns the first value of the key attribute, if the query has one.
    pub fn seed_from_query(&self, query: &Attributes) -> Option<String> {
        first_value(query, self.key_attribute())
    }

    /// Resolve a request into named attribute sets
    ///
    /// An empty result means nothing matched (or the exact entry was already
    /// consumed or expired).
    pub fn resolve(&self, request: &ResolveRequest) -> Result<Vec<PersonAttributes>> {
        let seed = if SubjectPattern::is_pattern(&request.key) {
            None
        } else {
            Some(request.key.as_str())
        };

        let people = self
            .repository
            .lookup(&request.key)?
            .into_iter()
            .map(|found| self.create_person(seed, request, found))
            .collect::<Vec<_>>();

        debug!("Resolved {} people for key {}", people.len(), request.key);
        Ok(people)
    }

    /// Resolve a query map, keyed by [`key_attribute`](Self::key_attribute)
    ///
    /// Returns an empty result if the query does not carry the key attribute.
    pub fn resolve_query(
        &self,
        query: &Attributes,
        subject_name: Option<&str>,
    ) -> Result<Vec<PersonAttributes>> {
        let Some(key) = self.seed_from_query(query) else {
            debug!("Query has no {} attribute", self.key_attribute());
            return Ok(Vec::new());
        };

        let mut request = ResolveRequest::new(key);
        request.subject_name = subject_name.map(str::to_string);
        self.resolve(&request)
    }

    fn create_person(
        &self,
        seed: Option<&str>,
        request: &ResolveRequest,
        found: CachedSubject,
    ) -> PersonAttributes {
        let name = self.person_name(
            seed,
            request.subject_name.as_deref(),
            request.query_attribute.as_deref(),
            &found.attributes,
        );
        debug!("Created person {:?} for subject {}", name, found.subject_id);

        PersonAttributes {
            name,
            attributes: found.attributes,
        }
    }

    /// Name a result
    ///
    /// `seed` is the exact lookup key (`None` for pattern lookups) and
    /// `query_attribute` overrides the username attribute as the attribute
    /// the key was taken from.
    pub fn person_name(
        &self,
        seed: Option<&str>,
        subject_name: Option<&str>,
        query_attribute: Option<&str>,
        attributes: &Attributes,
    ) -> Option<String> {
        if let Some(name) = subject_name {
            return Some(name.to_string());
        }

        let query_attribute = query_attribute.unwrap_or(&self.config.username_attribute);
        if let (Some(seed), Some(correlation)) = (seed, &self.config.query_attribute_name) {
            if query_attribute == correlation {
                return Some(seed.to_string());
            }
        }

        first_value(attributes, &self.config.username_attribute)
    }
}
