// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pattern-driven value generation
//!
//! A value pattern mixes literal text with placeholders:
//!
//! - `{digit:N}` - N decimal digits, zero padded (`95{digit:1}` yields `950` … `959`)
//! - `{hash}` - eight lowercase alphanumeric characters
//!
//! Every pattern describes a finite, ordered value space. The generator hands
//! out the first value of that space which is not used yet.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::{debug, trace};

use crate::errors::{AliasError, AliasResult};

const HASH_LENGTH: u32 = 8;
const HASH_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
/// Coprime to 36^8, so multiplying by it permutes the hash space
const HASH_STRIDE: u128 = 2_654_435_761;

/// Source of values for alias namespaces
pub trait ValueGenerator {
    /// Produce an unused value matching `pattern`
    fn generate(&mut self, pattern: &str) -> AliasResult<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Component {
    Literal(String),
    Digits(u32),
    Hash,
}

impl Component {
    fn cardinality(&self) -> u128 {
        match self {
            Self::Literal(_) => 1,
            Self::Digits(width) => 10u128.pow(*width),
            Self::Hash => 36u128.pow(HASH_LENGTH),
        }
    }

    fn render(&self, digit: u128, out: &mut String) {
        match self {
            Self::Literal(text) => out.push_str(text),
            Self::Digits(width) => out.push_str(&format!("{:0width$}", digit, width = *width as usize)),
            Self::Hash => {
                let mut code = (digit * HASH_STRIDE) % self.cardinality();
                let mut chars = [b'0'; HASH_LENGTH as usize];
                for slot in chars.iter_mut().rev() {
                    *slot = HASH_ALPHABET[(code % 36) as usize];
                    code /= 36;
                }
                out.extend(chars.iter().map(|byte| *byte as char));
            }
        }
    }

    fn regex(&self) -> String {
        match self {
            Self::Literal(text) => regex::escape(text),
            Self::Digits(width) => format!("[0-9]{{{}}}", width),
            Self::Hash => format!("[0-9a-z]{{{}}}", HASH_LENGTH),
        }
    }
}

static PLACEHOLDER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\{([^{}]*)\}").ok());

/// Parsed value pattern
#[derive(Debug, Clone)]
pub struct ValuePattern {
    source: String,
    components: Vec<Component>,
    matcher: Regex,
}

impl ValuePattern {
    /// Parse a pattern
    ///
    /// # Invariants
    /// - Placeholders are `{digit:N}` with `1 <= N <= 9` or `{hash}`
    /// - The pattern produces at least one character
    pub fn parse(pattern: &str) -> AliasResult<Self> {
        let invalid = |reason: &str| AliasError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        let placeholder = PLACEHOLDER
            .as_ref()
            .ok_or_else(|| invalid("placeholder matcher unavailable"))?;

        let mut components = Vec::new();
        let mut last = 0;
        for captures in placeholder.captures_iter(pattern) {
            let (Some(whole), Some(inner)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            if whole.start() > last {
                components.push(Component::Literal(pattern[last..whole.start()].to_string()));
            }
            last = whole.end();

            let inner = inner.as_str().trim();
            if inner == "hash" {
                components.push(Component::Hash);
            } else if let Some(width) = inner.strip_prefix("digit:") {
                let width: u32 = width
                    .trim()
                    .parse()
                    .map_err(|_| invalid("digit width is not a number"))?;
                if !(1..=9).contains(&width) {
                    return Err(invalid("digit width must be between 1 and 9"));
                }
                components.push(Component::Digits(width));
            } else {
                return Err(invalid(&format!("unknown placeholder '{{{}}}'", inner)));
            }
        }
        if last < pattern.len() {
            components.push(Component::Literal(pattern[last..].to_string()));
        }
        if components.is_empty() {
            return Err(invalid("pattern is empty"));
        }
        if pattern.contains(['{', '}']) && components.iter().all(|c| matches!(c, Component::Literal(_))) {
            return Err(invalid("unbalanced braces"));
        }

        let expression: String = components.iter().map(Component::regex).collect();
        let matcher = Regex::new(&format!("^{}$", expression))
            .map_err(|error| invalid(&error.to_string()))?;

        Ok(Self {
            source: pattern.to_string(),
            components,
            matcher,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Number of distinct values the pattern can produce
    pub fn value_count(&self) -> u128 {
        self.components
            .iter()
            .map(Component::cardinality)
            .fold(1u128, |total, size| total.saturating_mul(size))
    }

    /// Value at `index` of the ordered value space
    ///
    /// The right-most placeholder changes fastest.
    pub fn nth(&self, index: u128) -> Option<String> {
        if index >= self.value_count() {
            return None;
        }
        let mut digits = vec![0u128; self.components.len()];
        let mut rest = index;
        for (position, component) in self.components.iter().enumerate().rev() {
            let size = component.cardinality();
            digits[position] = rest % size;
            rest /= size;
        }
        let mut value = String::new();
        for (component, digit) in self.components.iter().zip(digits) {
            component.render(digit, &mut value);
        }
        Some(value)
    }

    /// Returns `true` if `value` belongs to the pattern's value space
    pub fn matches(&self, value: &str) -> bool {
        self.matcher.is_match(value)
    }
}

/// Generator handing out the first unused value of a pattern
///
/// Used values are shared across patterns, so two namespaces with
/// overlapping patterns never produce the same value twice.
#[derive(Debug, Clone, Default)]
pub struct PatternValueGenerator {
    used: HashSet<String>,
}

impl PatternValueGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator that treats `values` as already allocated
    pub fn with_used_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            used: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Mark a value as used; returns `false` if it was used already
    pub fn mark_used(&mut self, value: impl Into<String>) -> bool {
        self.used.insert(value.into())
    }

    /// Return a value to the pool
    pub fn release(&mut self, value: &str) -> bool {
        self.used.remove(value)
    }

    pub fn is_used(&self, value: &str) -> bool {
        self.used.contains(value)
    }
}

impl ValueGenerator for PatternValueGenerator {
    fn generate(&mut self, pattern: &str) -> AliasResult<String> {
        let pattern = ValuePattern::parse(pattern)?;

        // Among the first used+1 values at least one is free, if the space is large enough.
        let attempts = pattern
            .value_count()
            .min(self.used.len() as u128 + 1);
        for index in 0..attempts {
            let Some(candidate) = pattern.nth(index) else {
                break;
            };
            if self.used.contains(&candidate) {
                trace!(pattern = pattern.as_str(), candidate = %candidate, "value already used");
                continue;
            }
            debug!(pattern = pattern.as_str(), value = %candidate, "generated value");
            self.used.insert(candidate.clone());
            return Ok(candidate);
        }
        Err(AliasError::ValueSpaceExhausted(pattern.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_digit_pattern_is_sequential() {
        let mut generator = PatternValueGenerator::new();
        assert_eq!(generator.generate("95{digit:1}").unwrap(), "950");
        assert_eq!(generator.generate("95{digit:1}").unwrap(), "951");
        assert_eq!(generator.generate("1-{digit:1}").unwrap(), "1-0");
    }

    #[test]
    fn test_used_values_are_skipped() {
        let mut generator = PatternValueGenerator::with_used_values(["950", "951", "953"]);
        assert_eq!(generator.generate("95{digit:1}").unwrap(), "952");
        assert_eq!(generator.generate("95{digit:1}").unwrap(), "954");
    }

    #[test]
    fn test_exhausted_value_space() {
        let mut generator = PatternValueGenerator::new();
        for _ in 0..10 {
            generator.generate("{digit:1}").unwrap();
        }
        assert_eq!(
            generator.generate("{digit:1}"),
            Err(AliasError::ValueSpaceExhausted("{digit:1}".to_string()))
        );
    }

    #[test]
    fn test_released_value_is_reused() {
        let mut generator = PatternValueGenerator::new();
        let first = generator.generate("{digit:2}").unwrap();
        generator.generate("{digit:2}").unwrap();
        assert!(generator.release(&first));
        assert_eq!(generator.generate("{digit:2}").unwrap(), first);
    }

    #[test]
    fn test_hash_values_are_distinct_and_well_formed() {
        let mut generator = PatternValueGenerator::new();
        let pattern = ValuePattern::parse("{hash}").unwrap();
        let values: HashSet<String> = (0..50)
            .map(|_| generator.generate("{hash}").unwrap())
            .collect();
        assert_eq!(values.len(), 50);
        for value in &values {
            assert_eq!(value.len(), 8);
            assert!(pattern.matches(value));
        }
    }

    #[test_case("95{digit:1}", "957", true ; "digit match")]
    #[test_case("95{digit:1}", "9577", false ; "too long")]
    #[test_case("95{digit:1}", "96x", false ; "wrong literal")]
    #[test_case("room.{digit:2}", "room.07", true ; "escaped dot")]
    #[test_case("room.{digit:2}", "roomx07", false ; "dot is literal")]
    fn test_matches(pattern: &str, value: &str, expected: bool) {
        assert_eq!(ValuePattern::parse(pattern).unwrap().matches(value), expected);
    }

    #[test_case("" ; "empty")]
    #[test_case("{letter}" ; "unknown placeholder")]
    #[test_case("{digit:x}" ; "bad width")]
    #[test_case("{digit:0}" ; "zero width")]
    #[test_case("95{" ; "unbalanced")]
    fn test_invalid_patterns(pattern: &str) {
        assert!(matches!(
            ValuePattern::parse(pattern),
            Err(AliasError::InvalidPattern { .. })
        ));
    }
}
