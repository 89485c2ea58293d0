//! Strongly-typed ID wrappers for all entity types
//!
//! Using newtype wrappers prevents accidentally mixing up IDs from different
//! entity types at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parse an ID from a full UUID string
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }

            /// Check whether a user-supplied short form (`prefix-xxxxxxxx` or a
            /// bare UUID prefix) refers to this ID
            pub fn matches_short(&self, s: &str) -> bool {
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                s.len() >= 4 && self.0.to_string().starts_with(&s.to_lowercase())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, &self.0.to_string()[..8])
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if let Ok(uuid) = Uuid::parse_str(s) {
                    return Ok(Self(uuid));
                }
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(NoteId, "note-");
define_id!(CategoryId, "cat-");
define_id!(EntryId, "ent-");
define_id!(LimitId, "lim-");
define_id!(ArchiveId, "arc-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        let id = NoteId::new();
        let display = format!("{}", id);
        assert!(display.starts_with("note-"));
        assert_eq!(display.len(), 13);
    }

    #[test]
    fn test_id_parse_with_prefix() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id: EntryId = format!("ent-{}", uuid_str).parse().unwrap();
        assert_eq!(id.as_uuid().to_string(), uuid_str);
    }

    #[test]
    fn test_matches_short() {
        let id = ArchiveId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert!(id.matches_short("arc-550e8400"));
        assert!(id.matches_short("550e"));
        assert!(!id.matches_short("arc-660e8400"));
        assert!(!id.matches_short("55"));
    }

    #[test]
    fn test_id_serialization() {
        let id = CategoryId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: CategoryId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
