//! Sharing roles granted through a List's reader/editor teams.

use std::fmt::{Display, Formatter};

/// Role granted when a List is shared with a User or Team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareRole {
    Reader,
    Editor,
}

impl ShareRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reader => "Reader",
            Self::Editor => "Editor",
        }
    }

    /// Case-insensitive parse of `Reader` / `Editor`.
    pub fn parse(value: &str) -> Option<Self> {
        [Self::Reader, Self::Editor]
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(value))
    }
}

impl Display for ShareRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
