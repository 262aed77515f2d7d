//! Domain types shared by the services and the persistence layer.
//!
//! Identifiers are wrapped in newtypes so a recipe id can never be passed
//! where a user id is expected.

pub mod timestamp;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Returns the underlying i32 value.
            #[must_use]
            pub const fn value(&self) -> i32 {
                self.0
            }

            /// Database ids start at 1; anything else cannot name a row.
            #[must_use]
            pub const fn is_valid(&self) -> bool {
                self.0 > 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self::new(id)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i32>()
                    .map(Self::new)
                    .map_err(|_| format!("invalid {}: {s}", $label))
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_i32(self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                i32::deserialize(deserializer).map(Self::new)
            }
        }
    };
}

id_newtype!(
    /// Identifier of a registered user.
    UserId,
    "user id"
);

id_newtype!(
    /// Identifier of a recipe.
    RecipeId,
    "recipe id"
);

/// Which collection a unified history item was read from.
///
/// Deletions are routed by this tag, so it travels with every item shown
/// to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistorySource {
    History,
    Log,
}

impl HistorySource {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::History => "history",
            Self::Log => "log",
        }
    }
}

impl fmt::Display for HistorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistorySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "history" => Ok(Self::History),
            "log" => Ok(Self::Log),
            other => Err(format!("unknown history source: {other}")),
        }
    }
}

/// How a raw search term is normalized before it is fingerprinted and stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryNormalization {
    /// Strip leading and trailing whitespace only. Case and inner spacing
    /// are significant, so "Pasta" and "pasta" are distinct history rows.
    #[default]
    Trim,
    /// Trim, collapse runs of whitespace to one space and lowercase.
    TrimAndFold,
}

impl QueryNormalization {
    /// Returns the normalized term, or `None` if nothing is left.
    #[must_use]
    pub fn apply(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        match self {
            Self::Trim => Some(trimmed.to_string()),
            Self::TrimAndFold => Some(
                trimmed
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
                    .to_lowercase(),
            ),
        }
    }
}

/// Which slice of recipes the media feed shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedVariant {
    /// Every public recipe with media.
    #[default]
    Main,
    /// Only recipes uploaded by users, no editorial content.
    Community,
}

/// Kind of media attached to a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Video,
    Gif,
    Image,
}

impl MediaType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Gif => "gif",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" => Ok(Self::Video),
            "gif" => Ok(Self::Gif),
            "image" => Ok(Self::Image),
            other => Err(format!("unsupported media type: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_conversions() {
        let id = UserId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i32::from(id), 42);
        assert_eq!(UserId::from(42), id);
        assert_eq!("42".parse::<UserId>().unwrap(), id);
        assert!("abc".parse::<UserId>().is_err());
    }

    #[test]
    fn ids_reject_non_positive_values() {
        assert!(UserId::new(1).is_valid());
        assert!(!UserId::new(0).is_valid());
        assert!(!RecipeId::new(-3).is_valid());
    }

    #[test]
    fn history_source_round_trips_through_strings() {
        assert_eq!("history".parse::<HistorySource>(), Ok(HistorySource::History));
        assert_eq!(" LOG ".parse::<HistorySource>(), Ok(HistorySource::Log));
        assert!("archive".parse::<HistorySource>().is_err());
        assert_eq!(HistorySource::Log.to_string(), "log");
        assert_eq!(
            serde_json::to_string(&HistorySource::History).unwrap(),
            "\"history\""
        );
    }

    #[test]
    fn trim_normalization_keeps_case_and_inner_spacing() {
        let policy = QueryNormalization::Trim;
        assert_eq!(policy.apply("  Pasta  Salad "), Some("Pasta  Salad".to_string()));
        assert_eq!(policy.apply("   "), None);
        assert_eq!(policy.apply(""), None);
    }

    #[test]
    fn fold_normalization_collapses_and_lowercases() {
        let policy = QueryNormalization::TrimAndFold;
        assert_eq!(policy.apply("  Pasta \t Salad "), Some("pasta salad".to_string()));
        assert_eq!(policy.apply("\n"), None);
    }

    #[test]
    fn media_type_parsing() {
        assert_eq!("Video".parse::<MediaType>(), Ok(MediaType::Video));
        assert!("mp3".parse::<MediaType>().is_err());
    }
}
