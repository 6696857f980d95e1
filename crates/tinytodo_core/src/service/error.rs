//! Resource service error taxonomy.
//!
//! # Invariants
//! - `Display` of input, denial and domain errors is the exact client-facing
//!   message; internal errors are never shown to clients.
//! - `ServiceError::kind()` is the only input the boundary needs to pick a
//!   status code.

use crate::authz::gateway::AuthzError;
use crate::model::uid::{Uid, UidParseError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Coarse error class used by request boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed request; 400-class.
    Input,
    /// Authorization refused or resource unknown; reported as a normal payload.
    Denied,
    /// Request was authorized but cannot be applied; reported as a normal payload.
    Domain,
    /// Snapshot or PDP failure; 500-class.
    Internal,
}

/// Request rejected before authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    MalformedBody(String),
    MalformedIdentifier {
        field: &'static str,
        source: UidParseError,
    },
    InvalidRole(String),
    InvalidTaskState(String),
    /// Authorized share/unshare whose target is neither a Team nor a User.
    ShareTargetNotFound { field: &'static str, uid: Uid },
}

impl Display for InputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedBody(_) => f.write_str("Failed to process request body"),
            Self::MalformedIdentifier { field, .. } => write!(f, "Failed to process {field}"),
            Self::InvalidRole(role) => write!(f, "Invalid role: \"{role}\""),
            Self::InvalidTaskState(_) => f.write_str("Invalid task state"),
            Self::ShareTargetNotFound { field, .. } => write!(f, "Failed to find {field} entity"),
        }
    }
}

impl Error for InputError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MalformedIdentifier { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Failure that must surface as a server error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalError {
    Authorization(AuthzError),
    /// An authorized list vanished before the mutation ran.
    MissingList(Uid),
}

impl Display for InternalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Authorization(err) => write!(f, "authorization failed: {err}"),
            Self::MissingList(uid) => write!(f, "authorized list {uid} is missing from the store"),
        }
    }
}

impl Error for InternalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Authorization(err) => Some(err),
            Self::MissingList(_) => None,
        }
    }
}

/// Resource service error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    Input(InputError),
    AuthorizationDenied,
    TaskIndexOutOfRange { list: Uid, index: i64 },
    Internal(InternalError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Input(_) => ErrorKind::Input,
            Self::AuthorizationDenied => ErrorKind::Denied,
            Self::TaskIndexOutOfRange { .. } => ErrorKind::Domain,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input(err) => write!(f, "{err}"),
            Self::AuthorizationDenied => f.write_str("Authorization Denied"),
            Self::TaskIndexOutOfRange { list, index } => {
                write!(f, "The list {list} does not contain a task with ID {index}")
            }
            Self::Internal(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Input(err) => Some(err),
            Self::Internal(err) => Some(err),
            Self::AuthorizationDenied | Self::TaskIndexOutOfRange { .. } => None,
        }
    }
}

impl From<InputError> for ServiceError {
    fn from(value: InputError) -> Self {
        Self::Input(value)
    }
}

impl From<InternalError> for ServiceError {
    fn from(value: InternalError) -> Self {
        Self::Internal(value)
    }
}

impl From<AuthzError> for ServiceError {
    fn from(value: AuthzError) -> Self {
        Self::Internal(InternalError::Authorization(value))
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, InputError, ServiceError};
    use crate::model::uid::{parse_uid, EntityType, Uid};

    #[test]
    fn client_messages_match_wire_contract() {
        let malformed = InputError::MalformedIdentifier {
            field: "list",
            source: parse_uid("nope").expect_err("malformed"),
        };
        assert_eq!(malformed.to_string(), "Failed to process list");
        assert_eq!(
            InputError::InvalidRole("owner".to_string()).to_string(),
            "Invalid role: \"owner\""
        );
        assert_eq!(
            InputError::ShareTargetNotFound {
                field: "unshare_with",
                uid: Uid::new(EntityType::Team, "x"),
            }
            .to_string(),
            "Failed to find unshare_with entity"
        );
        assert_eq!(
            ServiceError::AuthorizationDenied.to_string(),
            "Authorization Denied"
        );
        assert_eq!(
            ServiceError::TaskIndexOutOfRange {
                list: Uid::new(EntityType::List, "0"),
                index: 3,
            }
            .to_string(),
            "The list List::\"0\" does not contain a task with ID 3"
        );
    }

    #[test]
    fn kinds_drive_status_selection() {
        assert_eq!(
            ServiceError::from(InputError::InvalidTaskState("done".to_string())).kind(),
            ErrorKind::Input
        );
        assert_eq!(ServiceError::AuthorizationDenied.kind(), ErrorKind::Denied);
        assert_eq!(
            ServiceError::TaskIndexOutOfRange {
                list: Uid::new(EntityType::List, "0"),
                index: -1,
            }
            .kind(),
            ErrorKind::Domain
        );
    }
}
