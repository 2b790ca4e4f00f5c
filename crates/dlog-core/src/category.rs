//! Category enum as the single source of truth for category labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Life categories an entry can be classified into.
///
/// The set is closed: anything outside it is rejected at the categorizer
/// boundary, so an `Entry` can never carry a free-text category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Work,
    Routine,
    Development,
    Family,
    Social,
    Resting,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 6] = [
        Self::Work,
        Self::Development,
        Self::Routine,
        Self::Family,
        Self::Social,
        Self::Resting,
    ];

    /// Categories that count toward the productivity score.
    #[must_use]
    pub const fn is_productive(self) -> bool {
        matches!(self, Self::Work | Self::Development)
    }

    /// Canonical lowercase label, as used in prompts and JSON.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Routine => "routine",
            Self::Development => "development",
            Self::Family => "family",
            Self::Social => "social",
            Self::Resting => "resting",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work" => Ok(Self::Work),
            "routine" => Ok(Self::Routine),
            "development" => Ok(Self::Development),
            "family" => Ok(Self::Family),
            "social" => Ok(Self::Social),
            "resting" => Ok(Self::Resting),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for labels outside the category set.
#[derive(Debug, Clone)]
pub struct UnknownCategory(String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}
