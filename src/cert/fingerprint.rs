use sha1::{Digest, Sha1};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Certificate thumbprint: SHA-1 of the DER encoding, kept as uppercase hex
/// without separators
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    hex: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FingerprintParseError {
    #[error("Invalid hex character: {0}")]
    InvalidHexCharacter(char),

    #[error("Empty string provided")]
    EmptyString,

    #[error("Invalid length: expected even number of hex characters")]
    InvalidLength,
}

fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != ':' && *c != '.')
        .collect::<String>()
        .to_uppercase()
}

impl Fingerprint {
    /// Normalize a fingerprint as typed by a user (`aa:bb.cc` -> `AABBCC`)
    pub fn new(raw: &str) -> Self {
        Self {
            hex: normalize(raw),
        }
    }

    /// Normalize and validate that the result is a hex string
    pub fn parse(raw: &str) -> Result<Self, FingerprintParseError> {
        let hex = normalize(raw.trim());
        if hex.is_empty() {
            return Err(FingerprintParseError::EmptyString);
        }
        if let Some(ch) = hex.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(FingerprintParseError::InvalidHexCharacter(ch));
        }
        if hex.len() % 2 != 0 {
            return Err(FingerprintParseError::InvalidLength);
        }
        Ok(Self { hex })
    }

    /// Compute the thumbprint of a DER encoded certificate
    pub fn of_der(der: &[u8]) -> Self {
        let digest = Sha1::digest(der);
        Self {
            hex: hex::encode_upper(digest),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.hex
    }

    /// Colon separated form (e.g., "AA:BB:CC")
    pub fn as_colon_hex(&self) -> String {
        self.hex
            .as_bytes()
            .chunks(2)
            .map(|pair| String::from_utf8_lossy(pair).into_owned())
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}

impl From<&str> for Fingerprint {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_strips_separators() {
        assert_eq!(Fingerprint::new("AA:BB:cc.dd").as_str(), "AABBCCDD");
        assert_eq!(Fingerprint::new("aabbccdd").as_str(), "AABBCCDD");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = Fingerprint::new("3b:fc.2E:b1");
        let twice = Fingerprint::new(once.as_str());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(
            Fingerprint::parse(""),
            Err(FingerprintParseError::EmptyString)
        );
        assert_eq!(
            Fingerprint::parse("zz:11"),
            Err(FingerprintParseError::InvalidHexCharacter('Z'))
        );
        assert_eq!(
            Fingerprint::parse("abc"),
            Err(FingerprintParseError::InvalidLength)
        );
    }

    #[test]
    fn test_of_der_is_uppercase_sha1() {
        // SHA-1 of the empty input
        assert_eq!(
            Fingerprint::of_der(b"").as_str(),
            "DA39A3EE5E6B4B0D3255BFEF95601890AFD80709"
        );
    }

    #[test]
    fn test_colon_format() {
        assert_eq!(Fingerprint::new("aabbcc").as_colon_hex(), "AA:BB:CC");
    }
}
