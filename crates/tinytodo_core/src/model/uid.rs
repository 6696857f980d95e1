//! Canonical entity identifiers and their text codec.
//!
//! # Responsibility
//! - Define the single typed identifier used by every entity.
//! - Parse and format the `Type::"id"` wire form.
//!
//! # Invariants
//! - Equality, ordering and hashing use `(entity_type, id)` only.
//! - `parse_uid(&format_uid(u)) == u` for every id without a `::` sequence.
//! - Formatting always quotes the id; parsing accepts it with or without quotes.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const COMPONENT_SEPARATOR: &str = "::";

/// Entity types known to the store and the policy decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityType {
    User,
    Team,
    Application,
    Action,
    List,
    Task,
}

impl EntityType {
    pub const ALL: [EntityType; 6] = [
        Self::User,
        Self::Team,
        Self::Application,
        Self::Action,
        Self::List,
        Self::Task,
    ];

    /// Canonical type name used in the wire form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Team => "Team",
            Self::Application => "Application",
            Self::Action => "Action",
            Self::List => "List",
            Self::Task => "Task",
        }
    }

    /// Case-insensitive lookup of a type name.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(value))
    }
}

impl Display for EntityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed entity identifier, immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uid {
    entity_type: EntityType,
    id: String,
}

impl Uid {
    pub fn new(entity_type: EntityType, id: impl Into<String>) -> Self {
        Self {
            entity_type,
            id: id.into(),
        }
    }

    pub fn entity_type(&self) -> EntityType {
        self.entity_type
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns whether this identifier names an entity of `entity_type`.
    pub fn is(&self, entity_type: EntityType) -> bool {
        self.entity_type == entity_type
    }
}

/// Formats an identifier as `Type::"id"`.
pub fn format_uid(uid: &Uid) -> String {
    format!("{}{COMPONENT_SEPARATOR}\"{}\"", uid.entity_type.as_str(), uid.id)
}

/// Parses `Type::"id"` (quotes optional) into an identifier.
///
/// # Errors
/// - `WrongComponentCount` when the text does not split into exactly two
///   `::`-separated components.
/// - `UnknownEntityType` when the type component is not a known type.
pub fn parse_uid(text: &str) -> Result<Uid, UidParseError> {
    let parts: Vec<&str> = text.split(COMPONENT_SEPARATOR).collect();
    let [type_part, id_part] = parts[..] else {
        return Err(UidParseError::WrongComponentCount { found: parts.len() });
    };

    let entity_type = EntityType::parse(type_part)
        .ok_or_else(|| UidParseError::UnknownEntityType(type_part.to_string()))?;

    let id = id_part.strip_prefix('"').unwrap_or(id_part);
    let id = id.strip_suffix('"').unwrap_or(id);
    Ok(Uid::new(entity_type, id))
}

/// Malformed identifier text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UidParseError {
    WrongComponentCount { found: usize },
    UnknownEntityType(String),
}

impl Display for UidParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongComponentCount { found } => write!(
                f,
                "wrong number of identifier components, expected 2, got {found}"
            ),
            Self::UnknownEntityType(value) => write!(f, "invalid entity type: {value}"),
        }
    }
}

impl Error for UidParseError {}

impl Display for Uid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_uid(self))
    }
}

impl FromStr for Uid {
    type Err = UidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_uid(s)
    }
}

impl Serialize for Uid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_uid(self))
    }
}

impl<'de> Deserialize<'de> for Uid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct UidVisitor;

        impl Visitor<'_> for UidVisitor {
            type Value = Uid;

            fn expecting(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str("an entity identifier string such as `User::\"alice\"`")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Uid, E> {
                parse_uid(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(UidVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::{format_uid, parse_uid, EntityType, Uid, UidParseError};

    #[test]
    fn formats_with_quoted_id() {
        let uid = Uid::new(EntityType::User, "kesha");
        assert_eq!(format_uid(&uid), "User::\"kesha\"");
        assert_eq!(uid.to_string(), "User::\"kesha\"");
    }

    #[test]
    fn parses_quoted_and_unquoted_ids() {
        let quoted = parse_uid("List::\"0\"").expect("quoted list uid");
        let unquoted = parse_uid("List::0").expect("unquoted list uid");
        assert_eq!(quoted, Uid::new(EntityType::List, "0"));
        assert_eq!(quoted, unquoted);
    }

    #[test]
    fn parses_type_case_insensitively() {
        let uid = parse_uid("tEaM::\"interns\"").expect("mixed-case type");
        assert_eq!(uid.entity_type(), EntityType::Team);
        assert_eq!(uid.id(), "interns");
    }

    #[test]
    fn rejects_wrong_component_count() {
        assert_eq!(
            parse_uid("kesha").expect_err("single component"),
            UidParseError::WrongComponentCount { found: 1 }
        );
        assert_eq!(
            parse_uid("User::\"a::b\"").expect_err("three components"),
            UidParseError::WrongComponentCount { found: 3 }
        );
    }

    #[test]
    fn rejects_unknown_type() {
        let err = parse_uid("Photo::\"vacation\"").expect_err("unknown type");
        assert_eq!(err, UidParseError::UnknownEntityType("Photo".to_string()));
    }

    #[test]
    fn serde_uses_text_form() {
        let uid = Uid::new(EntityType::Team, "1");
        let json = serde_json::to_string(&uid).expect("serialize uid");
        assert_eq!(json, r#""Team::\"1\"""#);
        let back: Uid = serde_json::from_str(&json).expect("deserialize uid");
        assert_eq!(back, uid);
        assert!(serde_json::from_str::<Uid>("42").is_err());
    }
}
