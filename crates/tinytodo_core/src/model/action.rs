//! Authorization actions understood by the policy decision point.

use crate::model::uid::{EntityType, Uid};
use std::fmt::{Display, Formatter};

/// Action names carried in authorization requests as `Action::"<Name>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    EditShare,
    UpdateTask,
    CreateTask,
    DeleteTask,
    GetLists,
    GetList,
    CreateList,
    UpdateList,
    DeleteList,
}

impl Action {
    pub const ALL: [Action; 9] = [
        Self::EditShare,
        Self::UpdateTask,
        Self::CreateTask,
        Self::DeleteTask,
        Self::GetLists,
        Self::GetList,
        Self::CreateList,
        Self::UpdateList,
        Self::DeleteList,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::EditShare => "EditShare",
            Self::UpdateTask => "UpdateTask",
            Self::CreateTask => "CreateTask",
            Self::DeleteTask => "DeleteTask",
            Self::GetLists => "GetLists",
            Self::GetList => "GetList",
            Self::CreateList => "CreateList",
            Self::UpdateList => "UpdateList",
            Self::DeleteList => "DeleteList",
        }
    }

    /// Canonical `Action::"<Name>"` identifier.
    pub fn uid(self) -> Uid {
        Uid::new(EntityType::Action, self.as_str())
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uid())
    }
}
