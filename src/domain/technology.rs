// Copyright (c) 2025 - Cowboy AI, Inc.
//! Conferencing Technology Taxonomy
//!
//! Devices declare the set of technologies they speak, alias types belong
//! to exactly one technology, and capability lookups filter candidates by
//! the technologies a request needs.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Conferencing technology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Technology {
    /// ITU-T H.323
    H323,
    /// Session Initiation Protocol
    Sip,
    /// Adobe Connect web conferencing
    AdobeConnect,
    /// Skype for Business / Lync
    SkypeForBusiness,
    /// FreePBX telephony
    FreePbx,
    /// Pexip Infinity web client
    Pexip,
    /// Wildcard: every technology of the owning device
    All,
}

/// Set of technologies
pub type TechnologySet = HashSet<Technology>;

impl Technology {
    /// Every concrete technology (excludes the [`Technology::All`] wildcard)
    pub const CONCRETE: [Technology; 6] = [
        Self::H323,
        Self::Sip,
        Self::AdobeConnect,
        Self::SkypeForBusiness,
        Self::FreePbx,
        Self::Pexip,
    ];

    /// Get the canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::H323 => "h323",
            Self::Sip => "sip",
            Self::AdobeConnect => "adobe_connect",
            Self::SkypeForBusiness => "skype_for_business",
            Self::FreePbx => "freepbx",
            Self::Pexip => "pexip",
            Self::All => "all",
        }
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "h323" | "h.323" => Some(Self::H323),
            "sip" => Some(Self::Sip),
            "adobe_connect" | "adobeconnect" | "connect" => Some(Self::AdobeConnect),
            "skype_for_business" | "lync" | "skype" => Some(Self::SkypeForBusiness),
            "freepbx" | "free_pbx" | "pbx" => Some(Self::FreePbx),
            "pexip" => Some(Self::Pexip),
            "all" | "*" => Some(Self::All),
            _ => None,
        }
    }

    /// Get human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::H323 => "H.323",
            Self::Sip => "SIP",
            Self::AdobeConnect => "Adobe Connect",
            Self::SkypeForBusiness => "Skype for Business",
            Self::FreePbx => "FreePBX",
            Self::Pexip => "Pexip",
            Self::All => "All",
        }
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Returns `true` if the two sets share at least one technology
pub fn intersects(left: &TechnologySet, right: &TechnologySet) -> bool {
    left.iter().any(|technology| right.contains(technology))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_canonical_names() {
        for technology in Technology::CONCRETE {
            assert_eq!(Technology::parse(technology.as_str()), Some(technology));
        }
        assert_eq!(Technology::parse("ALL"), Some(Technology::All));
        assert_eq!(Technology::parse("telepathy"), None);
    }

    #[test]
    fn test_intersects() {
        let left: TechnologySet = [Technology::H323, Technology::Sip].into();
        let right: TechnologySet = [Technology::Sip].into();
        assert!(intersects(&left, &right));
        assert!(!intersects(&left, &TechnologySet::new()));
    }
}
