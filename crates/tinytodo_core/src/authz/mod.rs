//! Authorization: PDP contract, the Cedar decision point and the snapshotting gateway.

pub mod gateway;
pub mod pdp;
pub mod policy;

pub use gateway::{AuthorizationGateway, AuthzError};
pub use pdp::{Decision, PdpError, PolicyDecisionPoint};
pub use policy::{CedarPdp, PolicyError};
