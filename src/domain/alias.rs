// Copyright (c) 2025 - Cowboy AI, Inc.
//! Alias Value Objects
//!
//! An [`Alias`] is a typed identifier (dial string, URI, room name) that
//! participants use to reach a virtual room. Alias namespaces store aliases
//! whose values are templates with placeholders such as `{value}` and
//! `{device.address}`; allocation substitutes them into concrete aliases.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Technology;

/// Placeholder replaced by the allocated value
pub const VALUE_PLACEHOLDER: &str = "{value}";

/// Placeholder replaced by the owning device's network address
pub const DEVICE_ADDRESS_PLACEHOLDER: &str = "{device.address}";

/// Type of an alias
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AliasType {
    RoomName,
    H323E164,
    H323Uri,
    H323Ip,
    SipUri,
    SipIp,
    AdobeConnectUri,
    SkypeUri,
    FreePbxConferenceNumber,
    WebClientUri,
}

impl AliasType {
    /// Technology the alias type belongs to
    pub fn technology(&self) -> Technology {
        match self {
            Self::RoomName => Technology::All,
            Self::H323E164 | Self::H323Uri | Self::H323Ip => Technology::H323,
            Self::SipUri | Self::SipIp => Technology::Sip,
            Self::AdobeConnectUri => Technology::AdobeConnect,
            Self::SkypeUri => Technology::SkypeForBusiness,
            Self::FreePbxConferenceNumber => Technology::FreePbx,
            Self::WebClientUri => Technology::Pexip,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoomName => "ROOM_NAME",
            Self::H323E164 => "H323_E164",
            Self::H323Uri => "H323_URI",
            Self::H323Ip => "H323_IP",
            Self::SipUri => "SIP_URI",
            Self::SipIp => "SIP_IP",
            Self::AdobeConnectUri => "ADOBE_CONNECT_URI",
            Self::SkypeUri => "SKYPE_URI",
            Self::FreePbxConferenceNumber => "FREEPBX_CONFERENCE_NUMBER",
            Self::WebClientUri => "WEB_CLIENT_URI",
        }
    }
}

impl fmt::Display for AliasType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed alias
///
/// Used both as a template (value containing placeholders) inside alias
/// namespaces and as the materialized alias handed to reservations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Alias {
    pub alias_type: AliasType,
    pub value: String,
}

impl Alias {
    pub fn new(alias_type: AliasType, value: impl Into<String>) -> Self {
        Self {
            alias_type,
            value: value.into(),
        }
    }

    /// Technology derived from the alias type
    pub fn technology(&self) -> Technology {
        self.alias_type.technology()
    }

    /// Returns `true` if the value still contains a `{...}` placeholder
    pub fn has_placeholders(&self) -> bool {
        match self.value.find('{') {
            Some(open) => self.value[open..].contains('}'),
            None => false,
        }
    }
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.alias_type, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_type_technology() {
        assert_eq!(AliasType::RoomName.technology(), Technology::All);
        assert_eq!(AliasType::H323E164.technology(), Technology::H323);
        assert_eq!(AliasType::SipUri.technology(), Technology::Sip);
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(Alias::new(AliasType::SipUri, "{value}@cesnet.cz").has_placeholders());
        assert!(!Alias::new(AliasType::SipUri, "950@cesnet.cz").has_placeholders());
    }
}
