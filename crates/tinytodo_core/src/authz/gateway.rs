//! Authorization gateway.
//!
//! # Responsibility
//! - Build a fresh snapshot for every request and delegate to the PDP.
//! - Emit one `event=authorize` record per call.
//!
//! # Invariants
//! - Snapshots are never cached between calls.
//! - A missing resource and a refused request are both `allowed=false`.
//! - Only snapshot or PDP failures return `Err`.

use crate::authz::pdp::{Decision, PdpError, PolicyDecisionPoint};
use crate::model::action::Action;
use crate::model::uid::Uid;
use crate::store::entity_store::EntityStore;
use crate::store::snapshot::SnapshotError;
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Internal authorization failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthzError {
    Snapshot(SnapshotError),
    Pdp(PdpError),
}

impl Display for AuthzError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Snapshot(err) => write!(f, "failed to build entity snapshot: {err}"),
            Self::Pdp(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthzError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Snapshot(err) => Some(err),
            Self::Pdp(err) => Some(err),
        }
    }
}

impl From<SnapshotError> for AuthzError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

impl From<PdpError> for AuthzError {
    fn from(value: PdpError) -> Self {
        Self::Pdp(value)
    }
}

/// Snapshot-then-evaluate front door to a [`PolicyDecisionPoint`].
#[derive(Debug)]
pub struct AuthorizationGateway<P> {
    pdp: P,
}

impl<P: PolicyDecisionPoint> AuthorizationGateway<P> {
    pub fn new(pdp: P) -> Self {
        Self { pdp }
    }

    pub fn pdp(&self) -> &P {
        &self.pdp
    }

    /// Authorizes `principal` to perform `action` on `resource`.
    ///
    /// `store` must be borrowed from the caller's lock guard so the decision
    /// reflects exactly the state the caller will act on.
    pub fn authorize(
        &self,
        store: &EntityStore,
        principal: &Uid,
        action: Action,
        resource: &Uid,
    ) -> Result<Decision, AuthzError> {
        let request_id = Uuid::new_v4();

        let decision = store
            .snapshot()
            .map_err(AuthzError::from)
            .and_then(|snapshot| {
                debug!(
                    "event=snapshot module=authz request_id={} entities={}",
                    request_id,
                    snapshot.len()
                );
                self.pdp
                    .evaluate(&snapshot, principal, action, resource)
                    .map_err(AuthzError::from)
            });

        match &decision {
            Ok(decision) => info!(
                "event=authorize module=authz status={} request_id={} principal={} action={} resource={} diagnostics={}",
                if decision.allowed { "ok" } else { "denied" },
                request_id,
                principal,
                action,
                resource,
                decision.diagnostics.join(",")
            ),
            Err(err) => error!(
                "event=authorize module=authz status=error request_id={} principal={} action={} resource={} error={}",
                request_id, principal, action, resource, err
            ),
        }

        decision
    }
}
