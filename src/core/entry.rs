//! Cache entries and their expiry stamps
//!
//! The expiry timestamp lives in a dedicated field so it never leaks into the
//! attributes handed back to callers. For interop with plumbing that only
//! speaks plain attribute maps, the stamp can be carried in the reserved
//! [`EXPIRY_ATTRIBUTE`] pseudo-attribute as epoch milliseconds.

use super::value::{AttributeValue, Attributes};
use chrono::{DateTime, TimeZone, Utc};

/// Reserved attribute name carrying the expiry time in generic attribute maps
pub const EXPIRY_ATTRIBUTE: &str = "USER_ATTRIB_CACHE_EXPIRY_TIME";

/// Expiry metadata attached to a stored entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStamp {
    /// No expiry metadata at all
    Missing,
    /// Expiry metadata present but holding no usable value
    Empty,
    /// Entry expires at this instant
    At(DateTime<Utc>),
}

impl ExpiryStamp {
    /// True once `now` has reached the expiry instant.
    ///
    /// Entries without a usable stamp never report as expired here; the
    /// cleanup sweep deals with them separately.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            ExpiryStamp::At(expires_at) => *expires_at <= now,
            ExpiryStamp::Missing | ExpiryStamp::Empty => false,
        }
    }

    /// The expiry instant, if one is set
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self {
            ExpiryStamp::At(expires_at) => Some(*expires_at),
            _ => None,
        }
    }
}

/// Attribute set stored for one subject
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    attributes: Attributes,
    expiry: ExpiryStamp,
}

impl CacheEntry {
    /// Create an entry expiring at `expires_at`
    ///
    /// Any caller-supplied [`EXPIRY_ATTRIBUTE`] is dropped.
    pub fn new(mut attributes: Attributes, expires_at: DateTime<Utc>) -> Self {
        attributes.remove(EXPIRY_ATTRIBUTE);
        CacheEntry {
            attributes,
            expiry: ExpiryStamp::At(expires_at),
        }
    }

    /// Build an entry from a generic attribute map carrying the reserved key
    ///
    /// - key absent: [`ExpiryStamp::Missing`]
    /// - key present with no values, or a first value that is not epoch
    ///   milliseconds: [`ExpiryStamp::Empty`]
    /// - otherwise: [`ExpiryStamp::At`]
    pub fn from_attribute_map(mut attributes: Attributes) -> Self {
        let expiry = match attributes.remove(EXPIRY_ATTRIBUTE) {
            None => ExpiryStamp::Missing,
            Some(values) => values
                .first()
                .and_then(AttributeValue::as_i64)
                .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
                .map(ExpiryStamp::At)
                .unwrap_or(ExpiryStamp::Empty),
        };

        CacheEntry { attributes, expiry }
    }

    /// Flatten back into a generic attribute map with the reserved key
    pub fn into_attribute_map(self) -> Attributes {
        let mut attributes = self.attributes;
        match self.expiry {
            ExpiryStamp::Missing => {}
            ExpiryStamp::Empty => {
                attributes.insert(EXPIRY_ATTRIBUTE.to_string(), Vec::new());
            }
            ExpiryStamp::At(expires_at) => {
                attributes.insert(
                    EXPIRY_ATTRIBUTE.to_string(),
                    vec![AttributeValue::Integer(expires_at.timestamp_millis())],
                );
            }
        }
        attributes
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn into_attributes(self) -> Attributes {
        self.attributes
    }

    pub fn expiry(&self) -> ExpiryStamp {
        self.expiry
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_expired_at(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn attrs() -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert("firstname".to_string(), vec!["Ada".into()]);
        attrs
    }

    #[test]
    fn test_new_strips_reserved_key() {
        let mut input = attrs();
        input.insert(EXPIRY_ATTRIBUTE.to_string(), vec![AttributeValue::Integer(0)]);

        let expires_at = Utc::now() + Duration::minutes(1);
        let entry = CacheEntry::new(input, expires_at);

        assert!(!entry.attributes().contains_key(EXPIRY_ATTRIBUTE));
        assert_eq!(entry.expiry(), ExpiryStamp::At(expires_at));
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let entry = CacheEntry::new(attrs(), now);

        assert!(!entry.is_expired_at(now - Duration::milliseconds(1)));
        assert!(entry.is_expired_at(now));
        assert!(entry.is_expired_at(now + Duration::milliseconds(1)));
    }

    #[test]
    fn test_from_attribute_map_variants() {
        let missing = CacheEntry::from_attribute_map(attrs());
        assert_eq!(missing.expiry(), ExpiryStamp::Missing);

        let mut empty = attrs();
        empty.insert(EXPIRY_ATTRIBUTE.to_string(), Vec::new());
        assert_eq!(
            CacheEntry::from_attribute_map(empty).expiry(),
            ExpiryStamp::Empty
        );

        let mut garbage = attrs();
        garbage.insert(EXPIRY_ATTRIBUTE.to_string(), vec!["soon".into()]);
        assert_eq!(
            CacheEntry::from_attribute_map(garbage).expiry(),
            ExpiryStamp::Empty
        );

        let mut stamped = attrs();
        stamped.insert(
            EXPIRY_ATTRIBUTE.to_string(),
            vec![AttributeValue::Integer(1_700_000_000_000)],
        );
        let entry = CacheEntry::from_attribute_map(stamped);
        assert_eq!(
            entry.expiry().expires_at().map(|t| t.timestamp_millis()),
            Some(1_700_000_000_000)
        );
        assert!(!entry.attributes().contains_key(EXPIRY_ATTRIBUTE));
    }

    #[test]
    fn test_attribute_map_interop() {
        let expires_at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let entry = CacheEntry::new(attrs(), expires_at);

        let flat = entry.clone().into_attribute_map();
        assert_eq!(
            flat[EXPIRY_ATTRIBUTE],
            vec![AttributeValue::Integer(1_700_000_000_123)]
        );
        assert_eq!(CacheEntry::from_attribute_map(flat), entry);
    }
}
