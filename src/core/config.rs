//! Cache configuration
//!
//! Settings are fixed when the cache is built. They can be assembled in code
//! or loaded from a TOML document:
//!
//! ```toml
//! ttl_minutes = 2
//! query_attribute_name = "netid"
//! username_attribute = "netid"
//! possible_attribute_names = ["firstname", "lastname", "netid"]
//! ```

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Default username attribute used to name resolved people
pub const DEFAULT_USERNAME_ATTRIBUTE: &str = "username";

/// Validated time-to-live, in whole minutes
///
/// # Examples
///
/// ```
/// use identity_cache::Ttl;
///
/// let ttl = Ttl::from_minutes(2).unwrap();
/// assert_eq!(ttl.minutes(), 2);
///
/// assert!(Ttl::from_minutes(0).is_err());
/// assert!(Ttl::from_minutes(-5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ttl(u32);

impl Ttl {
    /// Default entry lifetime
    pub const DEFAULT: Ttl = Ttl(1);

    /// Create a TTL, rejecting anything below one minute
    ///
    /// # Errors
    ///
    /// Returns `InvalidTtl` for zero, negative or out-of-range values.
    pub fn from_minutes(minutes: i64) -> Result<Self> {
        if minutes < 1 {
            return Err(CacheError::InvalidTtl(minutes));
        }
        u32::try_from(minutes)
            .map(Ttl)
            .map_err(|_| CacheError::InvalidTtl(minutes))
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }

    pub fn as_duration(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.0))
    }
}

impl Default for Ttl {
    fn default() -> Self {
        Ttl::DEFAULT
    }
}

impl std::fmt::Display for Ttl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}m", self.0)
    }
}

/// Settings for an [`AttributeCache`](crate::AttributeCache) and its resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Entry lifetime in minutes
    #[serde(
        default,
        serialize_with = "serialize_ttl",
        deserialize_with = "deserialize_ttl"
    )]
    pub ttl_minutes: Ttl,

    /// Attribute that correlates a query back to a subject identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_attribute_name: Option<String>,

    /// Attribute read from cached attributes to name a resolved person
    #[serde(default = "default_username_attribute")]
    pub username_attribute: String,

    /// Attribute names the cache may hold (advertised, not enforced)
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub possible_attribute_names: BTreeSet<String>,
}

impl CacheConfig {
    /// Parse a configuration from a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Load a configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Set the TTL in minutes
    pub fn with_ttl_minutes(mut self, minutes: i64) -> Result<Self> {
        self.ttl_minutes = Ttl::from_minutes(minutes)?;
        Ok(self)
    }

    /// Set the correlation attribute name
    pub fn with_query_attribute_name(mut self, name: impl Into<String>) -> Self {
        self.query_attribute_name = Some(name.into());
        self
    }

    /// Set the username attribute
    pub fn with_username_attribute(mut self, name: impl Into<String>) -> Self {
        self.username_attribute = name.into();
        self
    }

    /// Advertise an attribute name
    pub fn add_possible_attribute_name(mut self, name: impl Into<String>) -> Self {
        self.possible_attribute_names.insert(name.into());
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_minutes: Ttl::DEFAULT,
            query_attribute_name: None,
            username_attribute: default_username_attribute(),
            possible_attribute_names: BTreeSet::new(),
        }
    }
}

fn default_username_attribute() -> String {
    DEFAULT_USERNAME_ATTRIBUTE.to_string()
}

fn serialize_ttl<S>(ttl: &Ttl, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u32(ttl.minutes())
}

fn deserialize_ttl<'de, D>(deserializer: D) -> std::result::Result<Ttl, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let minutes = i64::deserialize(deserializer)?;
    Ttl::from_minutes(minutes).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_validation() {
        assert!(Ttl::from_minutes(1).is_ok());
        assert!(Ttl::from_minutes(60).is_ok());

        assert!(matches!(Ttl::from_minutes(0), Err(CacheError::InvalidTtl(0))));
        assert!(matches!(
            Ttl::from_minutes(-1),
            Err(CacheError::InvalidTtl(-1))
        ));
        assert!(Ttl::from_minutes(i64::MAX).is_err());
    }

    #[test]
    fn test_ttl_duration() {
        let ttl = Ttl::from_minutes(3).unwrap();
        assert_eq!(ttl.as_duration(), chrono::Duration::minutes(3));
        assert_eq!(ttl.to_string(), "3m");
        assert_eq!(Ttl::default(), Ttl::DEFAULT);
    }

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl_minutes.minutes(), 1);
        assert_eq!(config.query_attribute_name, None);
        assert_eq!(config.username_attribute, "username");
        assert!(config.possible_attribute_names.is_empty());
    }

    #[test]
    fn test_from_toml() -> Result<()> {
        let config = CacheConfig::from_toml_str(
            r#"
            ttl_minutes = 2
            query_attribute_name = "netid"
            username_attribute = "netid"
            possible_attribute_names = ["firstname", "lastname", "netid"]
            "#,
        )?;

        assert_eq!(config.ttl_minutes.minutes(), 2);
        assert_eq!(config.query_attribute_name.as_deref(), Some("netid"));
        assert_eq!(config.username_attribute, "netid");
        assert_eq!(config.possible_attribute_names.len(), 3);
        assert!(config.possible_attribute_names.contains("lastname"));

        Ok(())
    }

    #[test]
    fn test_empty_toml_uses_defaults() -> Result<()> {
        let config = CacheConfig::from_toml_str("")?;
        assert_eq!(config, CacheConfig::default());
        Ok(())
    }

    #[test]
    fn test_toml_rejects_non_positive_ttl() {
        assert!(matches!(
            CacheConfig::from_toml_str("ttl_minutes = 0"),
            Err(CacheError::Config(_))
        ));
        assert!(CacheConfig::from_toml_str("ttl_minutes = -3").is_err());
    }

    #[test]
    fn test_toml_round_trip() -> Result<()> {
        let config = CacheConfig::default()
            .with_ttl_minutes(5)?
            .with_query_attribute_name("uid")
            .add_possible_attribute_name("mail");

        let text = toml::to_string(&config).unwrap();
        assert_eq!(CacheConfig::from_toml_str(&text)?, config);

        Ok(())
    }

    #[test]
    fn test_builder_methods() {
        assert!(CacheConfig::default().with_ttl_minutes(0).is_err());

        let config = CacheConfig::default().with_username_attribute("uid");
        assert_eq!(config.username_attribute, "uid");
    }
}
