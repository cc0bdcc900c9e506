// Copyright (c) 2025 - Cowboy AI, Inc.
//! Alias Namespace
//!
//! An alias namespace binds value patterns to an ordered list of alias
//! templates. Allocating from the namespace generates one value and
//! substitutes it into every template, e.g. value `950` and templates
//! `H323_E164 -> "{value}"`, `SIP_URI -> "{value}@cesnet.cz"` give the aliases
//! `950` and `950@cesnet.cz`.
//!
//! Derived data (provided technologies, alias types and the compiled
//! value-matching expressions) is cached and rebuilt on the next read after
//! the templates change.

use chrono::{DateTime, Utc};
use parking_lot::{RwLock, RwLockUpgradableReadGuard, RwLockWriteGuard};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{trace, warn};

use super::pattern::{ValueGenerator, ValuePattern};
use crate::domain::{
    technology, Alias, AliasType, DateTimeSpecification, Resource, Technology, TechnologySet,
    VALUE_PLACEHOLDER,
};
use crate::errors::{AliasError, AliasResult};

#[derive(Debug, Default)]
struct NamespaceCache {
    built: bool,
    technologies: TechnologySet,
    alias_types: HashSet<AliasType>,
    value_matchers: Vec<Regex>,
}

impl NamespaceCache {
    fn rebuild(&mut self, aliases: &[Alias]) {
        self.technologies = aliases.iter().map(Alias::technology).collect();
        self.alias_types = aliases.iter().map(|alias| alias.alias_type).collect();
        self.value_matchers = aliases
            .iter()
            .filter_map(|alias| match value_matcher(&alias.value) {
                Ok(matcher) => matcher,
                Err(error) => {
                    warn!(template = %alias.value, %error, "alias template cannot be matched");
                    None
                }
            })
            .collect();
        self.built = true;
        trace!(templates = aliases.len(), "alias namespace cache rebuilt");
    }
}

/// Compile a template into an anchored expression capturing the `{value}` part
///
/// Templates without a `{value}` placeholder yield no matcher.
fn value_matcher(template: &str) -> Result<Option<Regex>, regex::Error> {
    if !template.contains(VALUE_PLACEHOLDER) {
        return Ok(None);
    }
    let mut expression = String::from("^");
    let mut rest = template;
    let mut captured = false;
    while let Some(open) = rest.find('{') {
        let Some(length) = rest[open..].find('}') else {
            break;
        };
        expression.push_str(&regex::escape(&rest[..open]));
        let placeholder = &rest[open..=open + length];
        if placeholder == VALUE_PLACEHOLDER && !captured {
            expression.push_str("(.+)");
            captured = true;
        } else {
            expression.push_str(".+");
        }
        rest = &rest[open + length + 1..];
    }
    expression.push_str(&regex::escape(rest));
    expression.push('$');
    Regex::new(&expression).map(Some)
}

/// Namespace of aliases generated from value patterns
#[derive(Debug, Serialize, Deserialize)]
pub struct AliasNamespace {
    /// Value patterns tried in order
    patterns: Vec<String>,

    /// Alias templates containing placeholders
    aliases: Vec<Alias>,

    /// Own horizon, preferred over the owning resource's one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    maximum_future: Option<DateTimeSpecification>,

    /// Generated aliases may only be used by the owning device
    #[serde(default)]
    restricted_to_resource: bool,

    #[serde(skip)]
    cache: RwLock<NamespaceCache>,
}

impl Clone for AliasNamespace {
    fn clone(&self) -> Self {
        Self {
            patterns: self.patterns.clone(),
            aliases: self.aliases.clone(),
            maximum_future: self.maximum_future,
            restricted_to_resource: self.restricted_to_resource,
            cache: RwLock::default(),
        }
    }
}

impl AliasNamespace {
    /// Namespace generating values from a single pattern
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            patterns: vec![pattern.into()],
            aliases: Vec::new(),
            maximum_future: None,
            restricted_to_resource: false,
            cache: RwLock::default(),
        }
    }

    /// Add a fallback pattern, tried after the previous ones are exhausted
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    pub fn with_alias(mut self, alias_type: AliasType, template: impl Into<String>) -> Self {
        self.add_alias(Alias::new(alias_type, template));
        self
    }

    pub fn with_maximum_future(mut self, maximum_future: DateTimeSpecification) -> Self {
        self.maximum_future = Some(maximum_future);
        self
    }

    pub fn restricted_to_resource(mut self, restricted: bool) -> Self {
        self.restricted_to_resource = restricted;
        self
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn aliases(&self) -> &[Alias] {
        &self.aliases
    }

    pub fn is_restricted_to_resource(&self) -> bool {
        self.restricted_to_resource
    }

    pub fn maximum_future(&self) -> Option<&DateTimeSpecification> {
        self.maximum_future.as_ref()
    }

    pub fn add_alias(&mut self, alias: Alias) {
        self.aliases.push(alias);
        self.invalidate();
    }

    /// Remove the first template equal to `alias`
    pub fn remove_alias(&mut self, alias: &Alias) -> bool {
        match self.aliases.iter().position(|candidate| candidate == alias) {
            Some(position) => {
                self.aliases.remove(position);
                self.invalidate();
                true
            }
            None => false,
        }
    }

    fn invalidate(&mut self) {
        self.cache.get_mut().built = false;
    }

    fn with_cache<R>(&self, read: impl FnOnce(&NamespaceCache) -> R) -> R {
        {
            let guard = self.cache.read();
            if guard.built {
                return read(&*guard);
            }
        }
        let guard = self.cache.upgradable_read();
        if guard.built {
            return read(&*guard);
        }
        let mut guard = RwLockUpgradableReadGuard::upgrade(guard);
        guard.rebuild(&self.aliases);
        let guard = RwLockWriteGuard::downgrade(guard);
        read(&*guard)
    }

    /// Technologies of the templates; `ROOM_NAME` contributes the `All` wildcard
    pub fn technologies(&self) -> TechnologySet {
        self.with_cache(|cache| cache.technologies.clone())
    }

    pub fn alias_types(&self) -> HashSet<AliasType> {
        self.with_cache(|cache| cache.alias_types.clone())
    }

    /// Returns `true` if the namespace provides aliases for any of `technologies`
    ///
    /// A namespace with a wildcard template owned by a device provides every
    /// technology the device supports.
    pub fn provides_technology(&self, owner: &Resource, technologies: &TechnologySet) -> bool {
        self.with_cache(|cache| {
            if technology::intersects(&cache.technologies, technologies) {
                return true;
            }
            if cache.technologies.contains(&Technology::All) && !technologies.is_empty() {
                return owner.supports_any(technologies);
            }
            false
        })
    }

    /// Returns `true` if any template has one of `alias_types`
    pub fn provides_alias_type(&self, alias_types: &HashSet<AliasType>) -> bool {
        self.with_cache(|cache| alias_types.iter().any(|alias_type| cache.alias_types.contains(alias_type)))
    }

    /// Generate a value from the first pattern with free values
    pub fn generate_value(&self, generator: &mut dyn ValueGenerator) -> AliasResult<String> {
        let mut last_error = None;
        for pattern in &self.patterns {
            match generator.generate(pattern) {
                Ok(value) => return Ok(value),
                Err(error @ AliasError::ValueSpaceExhausted(_)) => last_error = Some(error),
                Err(error) => return Err(error),
            }
        }
        Err(last_error.unwrap_or_else(|| AliasError::InvalidPattern {
            pattern: String::new(),
            reason: "namespace has no value pattern".to_string(),
        }))
    }

    /// Returns `true` if a requested value belongs to one of the patterns
    pub fn is_value_allowed(&self, value: &str) -> bool {
        self.patterns.iter().any(|pattern| {
            ValuePattern::parse(pattern)
                .map(|pattern| pattern.matches(value))
                .unwrap_or(false)
        })
    }

    /// Substitute `value` into every template
    ///
    /// Namespaces restricted to their resource let the owning device rewrite
    /// each alias afterwards.
    pub fn materialize_aliases(&self, owner: &Resource, value: &str) -> Vec<Alias> {
        let rewrite = self.restricted_to_resource && owner.is_device();
        self.aliases
            .iter()
            .map(|template| {
                let alias = Alias::new(
                    template.alias_type,
                    template.value.replace(VALUE_PLACEHOLDER, value),
                );
                if rewrite {
                    owner.transform_alias(alias)
                } else {
                    alias
                }
            })
            .collect()
    }

    /// Recover the generated value from a materialized alias value
    ///
    /// Templates are tried in declaration order. Returns the input unchanged
    /// when no template matches.
    pub fn parse_value(&self, raw: &str) -> String {
        self.with_cache(|cache| {
            cache
                .value_matchers
                .iter()
                .find_map(|matcher| {
                    matcher
                        .captures(raw)
                        .and_then(|captures| captures.get(1))
                        .map(|value| value.as_str())
                })
                .unwrap_or(raw)
                .to_string()
        })
    }

    /// Latest instant aliases of the namespace may be scheduled to
    pub fn maximum_future_date_time(
        &self,
        owner: &Resource,
        reference: DateTime<Utc>,
        default: Option<&DateTimeSpecification>,
    ) -> Option<DateTime<Utc>> {
        match &self.maximum_future {
            Some(specification) => Some(specification.earliest(reference)),
            None => owner.maximum_future_date_time(reference, default),
        }
    }

    /// Reject a namespace restricted to its resource on a non-device owner
    pub fn validate_owner(&self, owner: &Resource) -> AliasResult<()> {
        if self.restricted_to_resource && !owner.is_device() {
            return Err(AliasError::RestrictedToNonDevice(owner.id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::PatternValueGenerator;
    use crate::domain::DeviceInfo;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn owner() -> Resource {
        Resource::builder(1, "namespace", "admin").build().unwrap()
    }

    fn device() -> Resource {
        Resource::builder(2, "mcu", "admin")
            .device(DeviceInfo::new([Technology::H323, Technology::Sip]).with_address("mcu.cesnet.cz"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_materialize_and_parse_value() {
        let namespace = AliasNamespace::new("95{digit:1}")
            .with_alias(AliasType::H323E164, "{value}")
            .with_alias(AliasType::SipUri, "{value}@cesnet.cz");

        let aliases = namespace.materialize_aliases(&owner(), "950");
        assert_eq!(
            aliases,
            vec![
                Alias::new(AliasType::H323E164, "950"),
                Alias::new(AliasType::SipUri, "950@cesnet.cz"),
            ]
        );
        assert_eq!(namespace.parse_value("950"), "950");
    }

    #[test]
    fn test_parse_value_uses_first_matching_template() {
        let bare_first = AliasNamespace::new("95{digit:1}")
            .with_alias(AliasType::H323E164, "{value}")
            .with_alias(AliasType::SipUri, "{value}@cesnet.cz");
        assert_eq!(bare_first.parse_value("950@cesnet.cz"), "950@cesnet.cz");

        let domain_first = AliasNamespace::new("95{digit:1}")
            .with_alias(AliasType::SipUri, "{value}@cesnet.cz")
            .with_alias(AliasType::H323E164, "{value}");
        assert_eq!(domain_first.parse_value("950@cesnet.cz"), "950");
        assert_eq!(domain_first.parse_value("950"), "950");
    }

    #[test]
    fn test_parse_value_without_match_returns_input() {
        let namespace = AliasNamespace::new("{hash}").with_alias(AliasType::SipUri, "{value}@cesnet.cz");
        assert_eq!(namespace.parse_value("unrelated"), "unrelated");
        assert_eq!(namespace.parse_value("950@example.org"), "950@example.org");

        let no_templates = AliasNamespace::new("{hash}");
        assert_eq!(no_templates.parse_value("950"), "950");
    }

    #[test]
    fn test_parse_value_skips_device_address() {
        let namespace = AliasNamespace::new("{hash}")
            .with_alias(AliasType::H323Uri, "{device.address}/{value}")
            .restricted_to_resource(true);

        let aliases = namespace.materialize_aliases(&device(), "abc");
        assert_eq!(aliases[0].value, "mcu.cesnet.cz/abc");
        assert_eq!(namespace.parse_value("mcu.cesnet.cz/abc"), "abc");
    }

    #[test]
    fn test_unrestricted_namespace_keeps_placeholders() {
        let namespace = AliasNamespace::new("{hash}")
            .with_alias(AliasType::H323Uri, "{device.address}/{value}");
        let aliases = namespace.materialize_aliases(&device(), "abc");
        assert_eq!(aliases[0].value, "{device.address}/abc");
    }

    #[test]
    fn test_provides_technology() {
        let sip = AliasNamespace::new("{digit:3}").with_alias(AliasType::SipUri, "{value}@cesnet.cz");
        assert!(sip.provides_technology(&owner(), &[Technology::Sip].into()));
        assert!(!sip.provides_technology(&owner(), &[Technology::H323].into()));

        let wildcard = AliasNamespace::new("{hash}").with_alias(AliasType::RoomName, "{value}");
        assert!(wildcard.provides_technology(&device(), &[Technology::H323].into()));
        assert!(!wildcard.provides_technology(&device(), &[Technology::Pexip].into()));
        assert!(!wildcard.provides_technology(&owner(), &[Technology::H323].into()));
        assert!(!wildcard.provides_technology(&device(), &TechnologySet::new()));
    }

    #[test]
    fn test_cache_is_rebuilt_after_template_change() {
        let mut namespace = AliasNamespace::new("{digit:2}").with_alias(AliasType::RoomName, "{value}");
        let types: HashSet<AliasType> = [AliasType::SipUri].into();
        assert!(!namespace.provides_alias_type(&types));

        namespace.add_alias(Alias::new(AliasType::SipUri, "{value}@cesnet.cz"));
        assert!(namespace.provides_alias_type(&types));

        assert!(namespace.remove_alias(&Alias::new(AliasType::SipUri, "{value}@cesnet.cz")));
        assert!(!namespace.provides_alias_type(&types));
    }

    #[test]
    fn test_generate_value_falls_back_to_next_pattern() {
        let namespace = AliasNamespace::new("1-{digit:1}").with_pattern("2-{digit:1}");
        let mut generator = PatternValueGenerator::with_used_values((0..10).map(|d| format!("1-{d}")));
        assert_eq!(namespace.generate_value(&mut generator).unwrap(), "2-0");
        assert!(namespace.is_value_allowed("1-5"));
        assert!(!namespace.is_value_allowed("3-5"));
    }

    #[test]
    fn test_horizon_prefers_namespace() {
        let reference = Utc.with_ymd_and_hms(2026, 1, 19, 0, 0, 0).unwrap();
        let namespace = AliasNamespace::new("{hash}").with_maximum_future(DateTimeSpecification::months(2));
        let inherited = DateTimeSpecification::months(4);

        assert_eq!(
            namespace.maximum_future_date_time(&owner(), reference, Some(&inherited)),
            Some(Utc.with_ymd_and_hms(2026, 3, 19, 0, 0, 0).unwrap())
        );
        assert_eq!(
            AliasNamespace::new("{hash}").maximum_future_date_time(&owner(), reference, Some(&inherited)),
            Some(Utc.with_ymd_and_hms(2026, 5, 19, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_restricted_namespace_needs_device_owner() {
        let namespace = AliasNamespace::new("{hash}").restricted_to_resource(true);
        assert!(namespace.validate_owner(&device()).is_ok());
        assert_eq!(
            namespace.validate_owner(&owner()),
            Err(AliasError::RestrictedToNonDevice(crate::domain::ResourceId::new(1)))
        );
    }
}
