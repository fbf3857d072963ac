/// Shared types used across the codebase
use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Record identifier: 24 lowercase hexadecimal characters, the same shape
/// as the ids the original deployment handed out. Clients keep working
/// against stored links and bookmarks without an id-format migration.
///
/// Layout is a 4-byte big-endian unix timestamp followed by 8 random
/// bytes, so ids sort roughly by creation time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(String);

impl ObjectId {
    pub const LENGTH: usize = 24;

    /// Generate a fresh id.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 12];
        let seconds = Utc::now().timestamp() as u32;
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..].copy_from_slice(&Uuid::new_v4().as_bytes()[..8]);
        ObjectId(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    /// Wrap a value read back from the store, which already persisted it
    /// in canonical form.
    pub(crate) fn from_stored(value: String) -> Self {
        ObjectId(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid object id: {0:?}")]
pub struct ParseIdError(String);

impl FromStr for ObjectId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == Self::LENGTH && s.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(ObjectId(s.to_ascii_lowercase()))
        } else {
            Err(ParseIdError(s.to_string()))
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
