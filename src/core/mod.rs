//! Cache engine: entries, expiry, patterns, configuration and resolution

pub mod cache;
pub mod clock;
pub mod config;
pub mod entry;
pub mod pattern;
pub mod resolver;
pub mod value;

pub use cache::{AttributeCache, CachedSubject, Matches};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, Ttl, DEFAULT_USERNAME_ATTRIBUTE};
pub use entry::{CacheEntry, ExpiryStamp, EXPIRY_ATTRIBUTE};
pub use pattern::{SubjectPattern, WILDCARD};
pub use resolver::{
    AttributeRepository, PersonAttributes, PersonResolver, ResolveRequest, ResolverConfig,
};
pub use value::{first_value, wrap_scalars, AttributeValue, Attributes};
