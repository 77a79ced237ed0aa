// ── Core identity types ──
//
// EntityId is the numeric surrogate every stored record carries for external
// references. MacAddress is the canonical MAC form used as part of the
// natural key of MAC-table and ARP rows.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── EntityId ────────────────────────────────────────────────────────

/// Numeric surrogate id assigned by the inventory store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

// ── MacAddress ──────────────────────────────────────────────────────

/// MAC address in canonical form: lowercase hex, separators stripped
/// (`aabbccddeeff`).
///
/// Vendors print MACs as `AA:BB:CC:DD:EE:FF`, `aabb.ccdd.eeff`, or
/// `aa-bb-cc-dd-ee-ff`. All of them compare equal once canonicalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacAddress(String);

impl MacAddress {
    /// Canonicalize a MAC address from any common vendor format.
    pub fn canonical(raw: impl AsRef<str>) -> Self {
        let normalized = raw
            .as_ref()
            .trim()
            .chars()
            .filter(|c| !matches!(c, ':' | '.' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::canonical(s))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_round_trips_through_str() {
        let id: EntityId = " 42 ".parse().unwrap();
        assert_eq!(id, EntityId::new(42));
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn entity_id_rejects_non_numeric() {
        assert!("sw-core-01".parse::<EntityId>().is_err());
    }

    #[test]
    fn mac_colon_and_dotted_forms_agree() {
        let colon = MacAddress::canonical("AA:BB:CC:DD:EE:FF");
        let dotted = MacAddress::canonical("aabb.ccdd.eeff");
        assert_eq!(colon.as_str(), "aabbccddeeff");
        assert_eq!(colon, dotted);
    }

    #[test]
    fn mac_dashes_are_stripped() {
        let mac: MacAddress = "00-1A-2b-3C-4d-5E".parse().unwrap();
        assert_eq!(mac.to_string(), "001a2b3c4d5e");
    }
}
