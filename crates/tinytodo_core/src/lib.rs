//! Core domain logic for TinyTodo.
//! Authorization-gated task lists over an in-memory entity graph.

pub mod authz;
pub mod config;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use authz::{
    AuthorizationGateway, AuthzError, CedarPdp, Decision, PdpError, PolicyDecisionPoint,
    PolicyError,
};
pub use config::{ConfigError, ServiceConfig};
pub use logging::{
    default_log_level, init_from_config, init_logging, logging_status, LoggingError,
};
pub use model::action::Action;
pub use model::entity::{Application, Team, User};
pub use model::list::{List, Task, TaskState};
pub use model::role::ShareRole;
pub use model::uid::{format_uid, parse_uid, EntityType, Uid, UidParseError};
pub use service::{ErrorKind, ServiceError, ServiceResult, TodoService};
pub use store::{EntitySnapshot, EntityStore, SnapshotError, StoreError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
