//! Session code generation and canonicalization.
//!
//! Codes are short human-shareable identifiers, displayed on the host screen
//! and typed by players. All lookups are case-insensitive: parsing
//! uppercases, so the canonical form is the only one that exists inside the
//! server.

use std::fmt::Display;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

/// Safe character set for session codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
pub const CODE_LENGTH: usize = 6;

/// A canonical (uppercase, fixed-width) session code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionCode(String);

impl SessionCode {
    /// Generate a random code. Uniqueness against live sessions is the
    /// registry's job (regenerate on collision).
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        Self(
            (0..CODE_LENGTH)
                .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
                .collect(),
        )
    }

    /// Canonicalize a client-supplied code. Never fails: lookups with a
    /// malformed code simply miss the registry.
    pub fn parse(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SessionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for SessionCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SessionCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_have_fixed_width_and_charset() {
        for _ in 0..100 {
            let code = SessionCode::generate();
            assert_eq!(code.as_str().len(), CODE_LENGTH);
            assert!(code
                .as_str()
                .bytes()
                .all(|b| CODE_CHARS.contains(&b)));
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(SessionCode::parse("ab2cd3"), SessionCode::parse("AB2CD3"));
        assert_eq!(SessionCode::parse(" ab2cd3 ").as_str(), "AB2CD3");
    }

    #[test]
    fn serde_round_trip_canonicalizes() {
        let code: SessionCode = serde_json::from_str("\"xyz234\"").unwrap();
        assert_eq!(code.as_str(), "XYZ234");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"XYZ234\"");
    }
}
