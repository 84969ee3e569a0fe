use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    Blake3V1,
}

impl HashAlgorithm {
    fn prefix(&self) -> &'static str {
        match self {
            HashAlgorithm::Blake3V1 => "blake3v1",
        }
    }
}

/// Deduplication key of a clipboard payload.
///
/// Rendered as `<alg>:<hex>` in the index file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash {
    pub alg: HashAlgorithm,
    pub bytes: [u8; 32],
}

impl ContentHash {
    pub fn blake3(bytes: [u8; 32]) -> Self {
        Self {
            alg: HashAlgorithm::Blake3V1,
            bytes,
        }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.alg.prefix(), self.to_hex())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ContentHashParseError {
    #[error("unknown hash algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("malformed content hash: {0}")]
    Malformed(String),
}

impl FromStr for ContentHash {
    type Err = ContentHashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (alg, digest) = s
            .split_once(':')
            .ok_or_else(|| ContentHashParseError::Malformed(s.to_string()))?;
        if alg != HashAlgorithm::Blake3V1.prefix() {
            return Err(ContentHashParseError::UnknownAlgorithm(alg.to_string()));
        }
        let raw = hex::decode(digest).map_err(|_| ContentHashParseError::Malformed(s.to_string()))?;
        let bytes: [u8; 32] = raw
            .try_into()
            .map_err(|_| ContentHashParseError::Malformed(s.to_string()))?;
        Ok(Self::blake3(bytes))
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_agree() {
        let hash = ContentHash::blake3([7u8; 32]);
        let text = hash.to_string();
        assert!(text.starts_with("blake3v1:0707"));
        assert_eq!(text.parse::<ContentHash>().unwrap(), hash);
    }

    #[test]
    fn parse_rejects_unknown_algorithm_and_short_digest() {
        assert!(matches!(
            "sha1:00".parse::<ContentHash>(),
            Err(ContentHashParseError::UnknownAlgorithm(_))
        ));
        assert!(matches!(
            "blake3v1:abcd".parse::<ContentHash>(),
            Err(ContentHashParseError::Malformed(_))
        ));
    }
}
