//! Strongly-typed identifiers for ledger entities
//!
//! Ledger documents are keyed by plain strings in the store. Newtype wrappers
//! keep user ids, client ids and week keys from being mixed up in code.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

macro_rules! define_key {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Returns the key as stored in the document
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_key!(UserId);
define_key!(ClientId);

/// Characters the hierarchical store cannot accept inside a path segment
const FORBIDDEN_KEY_CHARS: &[char] = &['.', '#', '$', '[', ']', '/'];

impl UserId {
    /// Normalizes and validates a user key
    ///
    /// All whitespace is removed; the remainder must be non-empty and must not
    /// contain characters that would escape the user's document path.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let normalized: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if normalized.is_empty() {
            return Err(CoreError::validation("user must not be empty"));
        }
        if let Some(bad) = normalized.chars().find(|c| FORBIDDEN_KEY_CHARS.contains(c)) {
            return Err(CoreError::validation(format!(
                "user '{}' contains forbidden character '{}'",
                normalized, bad
            )));
        }
        Ok(Self(normalized))
    }
}

impl FromStr for UserId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl ClientId {
    /// Prefix shared by every allocated client id
    pub const PREFIX: char = 'P';

    /// Builds the id `P<n>`
    pub fn from_number(n: u32) -> Self {
        Self(format!("{}{}", Self::PREFIX, n))
    }

    /// Wraps an arbitrary key read from a document or request
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The numeric suffix of a `P<n>` id, if the key has that shape
    pub fn number(&self) -> Option<u32> {
        self.0.strip_prefix(Self::PREFIX)?.parse().ok()
    }
}

impl From<&str> for ClientId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One-based index into a client's weekly schedule
///
/// Stored as the map key `week<N>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekNumber(u32);

impl WeekNumber {
    pub const FIRST: WeekNumber = WeekNumber(1);

    /// Returns `None` for zero, which is not a valid week
    pub fn new(n: u32) -> Option<Self> {
        (n >= 1).then_some(Self(n))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// The document key, e.g. `week3`
    pub fn key(self) -> String {
        format!("week{}", self.0)
    }
}

impl fmt::Display for WeekNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "week{}", self.0)
    }
}

impl FromStr for WeekNumber {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("week")
            .and_then(|n| n.parse::<u32>().ok())
            .and_then(WeekNumber::new)
            .ok_or_else(|| CoreError::validation(format!("invalid week key '{}'", s)))
    }
}

impl Serialize for WeekNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WeekNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
