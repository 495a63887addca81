//! Short-lived identity attribute cache
//!
//! Holds attribute sets per subject identifier between an authentication step
//! (which writes them) and a resolution step (which reads them back once).
//!
//! - Exact lookups consume the entry: a second read finds nothing.
//! - Pattern lookups leave entries in place.
//! - Entries expire after the configured TTL and are purged by a sweep that
//!   runs inline before every write. There is no background timer.

use super::clock::{Clock, SystemClock};
use super::config::{CacheConfig, Ttl};
use super::entry::{CacheEntry, ExpiryStamp};
use super::pattern::SubjectPattern;
use super::value::Attributes;
use crate::error::{CacheError, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use std::vec;
use tracing::{debug, warn};

/// Attributes found for one subject
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSubject {
    pub subject_id: String,
    pub attributes: Attributes,
}

/// Concurrent attribute cache
///
/// All synchronization is internal; share it behind an `Arc` and call it
/// from any thread. Every store mutation happens under one write lock, so a
/// replaced subject is never observed as absent.
///
/// # Examples
///
/// ```
/// use identity_cache::{AttributeCache, Attributes};
///
/// # fn main() -> identity_cache::Result<()> {
/// let cache = AttributeCache::new();
///
/// let mut attrs = Attributes::new();
/// attrs.insert("firstname".to_string(), vec!["Ada".into()]);
/// cache.put("ada", attrs.clone())?;
///
/// assert_eq!(cache.take_exact("ada"), Some(attrs));
/// assert_eq!(cache.take_exact("ada"), None);
/// # Ok(())
/// # }
/// ```
pub struct AttributeCache {
    entries: RwLock<BTreeMap<String, CacheEntry>>,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
}

impl AttributeCache {
    /// Create a cache with default settings (1 minute TTL)
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        AttributeCache {
            entries: RwLock::new(BTreeMap::new()),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn ttl(&self) -> Ttl {
        self.config.ttl_minutes
    }

    pub fn query_attribute_name(&self) -> Option<&str> {
        self.config.query_attribute_name.as_deref()
    }

    /// Attribute names this cache advertises (not enforced)
    pub fn possible_attribute_names(&self) -> &BTreeSet<String> {
        &self.config.possible_attribute_names
    }

    /// Store attributes for a subject, replacing any previous entry
    ///
    /// Runs a cleanup sweep first, then stamps the entry with
    /// `now + ttl`. A caller-supplied expiry pseudo-attribute is discarded.
    ///
    /// # Errors
    ///
    /// Returns `EmptySubjectId` if `subject_id` is empty.
    pub fn put(&self, subject_id: &str, attributes: Attributes) -> Result<()> {
        if subject_id.is_empty() {
            return Err(CacheError::EmptySubjectId);
        }

        let mut entries = self.entries.write();
        Self::sweep(&mut entries, self.clock.now());

        let expires_at = self.clock.now() + self.config.ttl_minutes.as_duration();
        let entry = CacheEntry::new(attributes, expires_at);
        debug!(
            "Stored {} attributes for subject {} (expires {})",
            entry.attributes().len(),
            subject_id,
            expires_at
        );
        entries.insert(subject_id.to_string(), entry);

        Ok(())
    }

    /// Store a prebuilt entry verbatim
    ///
    /// No sweep runs and the entry's expiry stamp is kept as-is. Used to
    /// import entries from generic attribute-map plumbing (see
    /// [`CacheEntry::from_attribute_map`]).
    pub fn insert_entry(&self, subject_id: &str, entry: CacheEntry) -> Result<()> {
        if subject_id.is_empty() {
            return Err(CacheError::EmptySubjectId);
        }
        self.entries.write().insert(subject_id.to_string(), entry);
        Ok(())
    }

    /// Remove and return the attributes stored for `subject_id`
    ///
    /// Returns `None` when nothing is stored, or when the stored entry has
    /// expired (the expired entry is dropped on the spot).
    pub fn take_exact(&self, subject_id: &str) -> Option<Attributes> {
        let (entry, remaining) = {
            let mut entries = self.entries.write();
            let entry = entries.remove(subject_id)?;
            (entry, entries.len())
        };

        if entry.is_expired_at(self.clock.now()) {
            debug!("Dropped expired attributes for subject {}", subject_id);
            return None;
        }

        debug!("Obtained attributes from cache for subject {}", subject_id);
        debug!("Attribute entries remaining in cache: {}", remaining);
        Some(entry.into_attributes())
    }

    /// Find all live entries whose subject matches a wildcard pattern
    ///
    /// Nothing is removed. Matching subjects are gathered in subject order
    /// when this is called; expiry is checked against the clock as each
    /// item is yielded, so holding the iterator past an entry's TTL drops it.
    pub fn find_by_pattern(&self, pattern: &str) -> Result<Matches<'_>> {
        let pattern = SubjectPattern::compile(pattern)?;
        let matched: Vec<_> = self
            .entries
            .read()
            .iter()
            .filter(|(subject_id, _)| pattern.matches(subject_id))
            .map(|(subject_id, entry)| (subject_id.clone(), entry.clone()))
            .collect();

        Ok(Matches {
            inner: matched.into_iter(),
            clock: &*self.clock,
        })
    }

    /// Single read path: pattern lookup if `key` holds a wildcard, else a
    /// consuming exact lookup
    pub fn lookup(&self, key: &str) -> Result<Vec<CachedSubject>> {
        if SubjectPattern::is_pattern(key) {
            return Ok(self
                .find_by_pattern(key)?
                .map(|(subject_id, attributes)| CachedSubject {
                    subject_id,
                    attributes,
                })
                .collect());
        }

        Ok(self
            .take_exact(key)
            .map(|attributes| CachedSubject {
                subject_id: key.to_string(),
                attributes,
            })
            .into_iter()
            .collect())
    }

    /// Number of stored entries, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// True if an entry (live or expired) is physically stored for `subject_id`
    pub fn contains(&self, subject_id: &str) -> bool {
        self.entries.read().contains_key(subject_id)
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Remove expired entries
    ///
    /// Walks the store once in subject order. The first entry with no expiry
    /// stamp at all ends the whole pass, leaving every later entry untouched.
    /// Entries whose stamp is present but empty are dropped with a warning.
    ///
    /// Returns the number of entries removed.
    fn sweep(entries: &mut BTreeMap<String, CacheEntry>, now: DateTime<Utc>) -> usize {
        let before = entries.len();
        let mut bailed = false;
        debug!("Entries in attribute cache: {}", before);

        entries.retain(|subject_id, entry| {
            if bailed {
                return true;
            }
            match entry.expiry() {
                ExpiryStamp::Missing => {
                    debug!(
                        "Entry for subject {} has no expiry stamp, ending sweep",
                        subject_id
                    );
                    bailed = true;
                    true
                }
                ExpiryStamp::Empty => {
                    warn!(
                        "Attribute entry for subject {} has no expiry value. Removing.",
                        subject_id
                    );
                    false
                }
                ExpiryStamp::At(expires_at) if expires_at <= now => {
                    debug!("Removing expired attributes for subject {}", subject_id);
                    false
                }
                ExpiryStamp::At(_) => true,
            }
        });

        before - entries.len()
    }

    #[cfg(test)]
    pub(crate) fn sweep_now(&self) -> usize {
        Self::sweep(&mut self.entries.write(), self.clock.now())
    }
}

impl Default for AttributeCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AttributeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeCache")
            .field("entries", &self.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Lazy iterator over pattern matches
///
/// Not restartable; call [`AttributeCache::find_by_pattern`] again to rescan.
pub struct Matches<'a> {
    inner: vec::IntoIter<(String, CacheEntry)>,
    clock: &'a dyn Clock,
}

impl<'a> Iterator for Matches<'a> {
    type Item = (String, Attributes);

    fn next(&mut self) -> Option<Self::Item> {
        for (subject_id, entry) in self.inner.by_ref() {
            if entry.is_expired_at(self.clock.now()) {
                continue;
            }
            debug!("Found attributes for subject {}", subject_id);
            return Some((subject_id, entry.into_attributes()));
        }
        None
    }
}
