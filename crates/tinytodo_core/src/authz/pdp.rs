//! Policy decision point contract.

use crate::model::action::Action;
use crate::model::uid::Uid;
use crate::store::snapshot::EntitySnapshot;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Outcome of one authorization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    /// Ids of the policies that determined the decision.
    pub diagnostics: Vec<String>,
}

/// Failure inside the decision point itself, as opposed to a deny.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdpError {
    /// The snapshot was rejected by the engine, e.g. a cyclic hierarchy.
    Entities(String),
    Evaluation(String),
}

impl Display for PdpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entities(message) => write!(f, "entity data rejected: {message}"),
            Self::Evaluation(message) => write!(f, "policy evaluation failed: {message}"),
        }
    }
}

impl Error for PdpError {}

/// Evaluates `(principal, action, resource)` against an entity snapshot.
///
/// Unknown principals or resources are not errors; they match no policy and
/// are denied.
pub trait PolicyDecisionPoint: Send + Sync {
    fn evaluate(
        &self,
        entities: &EntitySnapshot,
        principal: &Uid,
        action: Action,
        resource: &Uid,
    ) -> Result<Decision, PdpError>;
}
