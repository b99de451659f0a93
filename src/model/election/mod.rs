//! Election lifecycle: statuses, administrative actions, who may issue them,
//! and the per-node DKG progress.

pub use auth::{AuthContext, UserRole};
pub use dkg::{DkgError, DkgPoll, DkgStatusResponse, DkgStatuses, NodeAddress, NodeState};
pub use info::{ElectionInfo, LightElectionInfo, NodeProxies};
pub use lifecycle::{ActionTicket, ElectionLifecycle, PollTicket, Reconciliation};
pub use status::{Action, NodeStatus, OngoingAction, Status};

mod auth;
mod dkg;
mod info;
mod lifecycle;
mod status;

/// Our election IDs are opaque hex strings chosen by the backend.
pub type ElectionId = String;
