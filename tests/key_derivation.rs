//! Naming rules applied when resolving cached attributes

use identity_cache::{
    AttributeCache, AttributeValue, Attributes, PersonResolver, ResolveRequest, ResolverConfig,
};
use std::sync::Arc;

fn payload(netid: &str) -> Attributes {
    let mut attrs = Attributes::new();
    attrs.insert("netid".to_string(), vec![AttributeValue::from(netid)]);
    attrs.insert("firstname".to_string(), vec!["Jane".into()]);
    attrs
}

fn resolver(query_attribute_name: Option<&str>) -> PersonResolver<Arc<AttributeCache>> {
    PersonResolver::new(
        Arc::new(AttributeCache::new()),
        ResolverConfig {
            username_attribute: "netid".to_string(),
            query_attribute_name: query_attribute_name.map(str::to_string),
        },
    )
}

#[test]
fn test_explicit_subject_name_wins() {
    let resolver = resolver(Some("netid"));
    resolver
        .repository()
        .put("lookup-key", payload("from-payload"))
        .unwrap();

    let people = resolver
        .resolve(&ResolveRequest::new("lookup-key").with_subject_name("explicit"))
        .unwrap();

    assert_eq!(people.len(), 1);
    assert_eq!(people[0].name.as_deref(), Some("explicit"));
}

#[test]
fn test_correlation_attribute_uses_lookup_key() {
    let resolver = resolver(Some("netid"));
    resolver
        .repository()
        .put("lookup-key", payload("from-payload"))
        .unwrap();

    let people = resolver.resolve(&ResolveRequest::new("lookup-key")).unwrap();

    assert_eq!(people[0].name.as_deref(), Some("lookup-key"));
}

#[test]
fn test_payload_username_attribute_as_fallback() {
    let resolver = resolver(None);
    resolver
        .repository()
        .put("lookup-key", payload("from-payload"))
        .unwrap();

    let people = resolver.resolve(&ResolveRequest::new("lookup-key")).unwrap();

    assert_eq!(people[0].name.as_deref(), Some("from-payload"));
}

#[test]
fn test_query_attribute_override_breaks_correlation() {
    let resolver = resolver(Some("netid"));
    resolver
        .repository()
        .put("lookup-key", payload("from-payload"))
        .unwrap();

    let people = resolver
        .resolve(&ResolveRequest::new("lookup-key").with_query_attribute("mail"))
        .unwrap();

    assert_eq!(people[0].name.as_deref(), Some("from-payload"));
}

#[test]
fn test_pattern_results_named_from_payload() {
    let resolver = resolver(Some("netid"));
    resolver.repository().put("jane1", payload("jane-one")).unwrap();
    resolver.repository().put("jane2", payload("jane-two")).unwrap();

    let people = resolver.resolve(&ResolveRequest::new("jane*")).unwrap();
    let mut names: Vec<_> = people.into_iter().filter_map(|p| p.name).collect();
    names.sort();

    assert_eq!(names, vec!["jane-one".to_string(), "jane-two".to_string()]);
}

#[test]
fn test_pattern_with_explicit_name() {
    let resolver = resolver(None);
    resolver.repository().put("jane1", payload("jane-one")).unwrap();

    let people = resolver
        .resolve(&ResolveRequest::new("jane*").with_subject_name("given"))
        .unwrap();

    assert_eq!(people[0].name.as_deref(), Some("given"));
}

#[test]
fn test_missing_entry_resolves_to_nothing() {
    let resolver = resolver(Some("netid"));
    assert!(resolver.resolve(&ResolveRequest::new("ghost")).unwrap().is_empty());
    assert!(resolver.resolve(&ResolveRequest::new("gh*")).unwrap().is_empty());
}
