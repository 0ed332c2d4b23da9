use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Region identifier that may arrive as text or as a number.
///
/// Equality uses a canonical form: surrounding whitespace is ignored and all-digit
/// values compare by numeric value, so `"13"`, `"013"` and `13` are the same region.
#[derive(Debug, Clone)]
pub struct RegionId(String);

impl RegionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    fn canonical(&self) -> &str {
        let trimmed = self.0.trim();
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            let stripped = trimmed.trim_start_matches('0');
            if stripped.is_empty() {
                "0"
            } else {
                stripped
            }
        } else {
            trimmed
        }
    }
}

impl PartialEq for RegionId {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for RegionId {}

impl Hash for RegionId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RegionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u32> for RegionId {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for RegionId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for RegionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRegionId {
    Text(String),
    Number(u64),
}

impl<'de> Deserialize<'de> for RegionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawRegionId::deserialize(deserializer)? {
            RawRegionId::Text(text) => Self(text),
            RawRegionId::Number(number) => Self(number.to_string()),
        })
    }
}
