use chrono::{DateTime, Utc};

use crate::error::{Error, Result};

use super::{Action, AuthContext, ElectionId, OngoingAction, Status};

/// Issued by [`ElectionLifecycle::begin`]; hand it back with the outcome of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTicket {
    election_id: ElectionId,
    action: Action,
    revision: u64,
}

impl ActionTicket {
    pub fn election_id(&self) -> &str {
        &self.election_id
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Issued by [`ElectionLifecycle::poll_ticket`] before a status is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTicket {
    election_id: ElectionId,
    revision: u64,
    sequence: u64,
}

/// What became of a response handed back to the lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The status was adopted as expected.
    Applied(Status),
    /// The backend confirmed a status the action does not lead to. It was
    /// adopted anyway.
    Resynced(Status),
    /// The action failed. The in-flight marker was cleared and the status kept.
    Reset,
    /// The response predates a local change or belongs to another election.
    Stale,
}

#[derive(Debug, Clone)]
struct InFlight {
    action: Action,
    started_at: DateTime<Utc>,
}

/// Client-side view of one election's lifecycle.
///
/// Every local change bumps a revision counter. Responses carry the revision
/// they were issued at, so anything arriving after a newer local change is
/// recognised as stale and dropped. Polls are also numbered in issue order:
/// once a poll's answer has been applied, answers to earlier polls are stale.
#[derive(Debug, Clone)]
pub struct ElectionLifecycle {
    election_id: ElectionId,
    status: Status,
    in_flight: Option<InFlight>,
    revision: u64,
    polls_issued: u64,
    last_observed: u64,
}

impl ElectionLifecycle {
    pub fn new(election_id: impl Into<ElectionId>, status: Status) -> Self {
        Self {
            election_id: election_id.into(),
            status,
            in_flight: None,
            revision: 0,
            polls_issued: 0,
            last_observed: 0,
        }
    }

    pub fn election_id(&self) -> &str {
        &self.election_id
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn ongoing_action(&self) -> Option<OngoingAction> {
        self.in_flight.as_ref().map(|f| f.action.ongoing())
    }

    /// When the in-flight action was issued.
    pub fn in_flight_since(&self) -> Option<DateTime<Utc>> {
        self.in_flight.as_ref().map(|f| f.started_at)
    }

    /// Actions the current status offers to this user.
    pub fn legal_actions(&self, auth: &AuthContext) -> Vec<Action> {
        if auth.is_authorized() {
            self.status.legal_actions()
        } else {
            Vec::new()
        }
    }

    /// Could `begin` succeed right now?
    pub fn can_issue(&self, action: Action, auth: &AuthContext) -> bool {
        self.in_flight.is_none() && self.legal_actions(auth).contains(&action)
    }

    /// Mark `action` as in flight, or reject it without contacting the backend.
    pub fn begin(&mut self, action: Action, auth: &AuthContext) -> Result<ActionTicket> {
        if !auth.is_authorized() {
            return Err(Error::Unauthorized(format!(
                "role {} cannot {action} an election",
                auth.role
            )));
        }
        if let Some(in_flight) = &self.in_flight {
            return Err(Error::ActionInFlight(in_flight.action.ongoing()));
        }
        if !self.status.legal_actions().contains(&action) {
            return Err(Error::IllegalAction {
                action,
                status: self.status,
            });
        }

        self.revision += 1;
        self.in_flight = Some(InFlight {
            action,
            started_at: Utc::now(),
        });
        info!(
            "Election {}: {action} issued at revision {}",
            self.election_id, self.revision
        );
        Ok(ActionTicket {
            election_id: self.election_id.clone(),
            action,
            revision: self.revision,
        })
    }

    fn is_current(&self, ticket: &ActionTicket) -> bool {
        ticket.election_id == self.election_id
            && ticket.revision == self.revision
            && self
                .in_flight
                .as_ref()
                .is_some_and(|f| f.action == ticket.action)
    }

    /// The backend accepted the action and now reports `confirmed`.
    pub fn complete(&mut self, ticket: &ActionTicket, confirmed: Status) -> Reconciliation {
        if !self.is_current(ticket) {
            warn!(
                "Election {}: ignoring stale confirmation of {} (revision {}, now {})",
                self.election_id, ticket.action, ticket.revision, self.revision
            );
            return Reconciliation::Stale;
        }
        self.in_flight = None;
        self.revision += 1;
        self.status = confirmed;
        if ticket.action.expected_statuses().contains(&confirmed) {
            info!(
                "Election {}: {} confirmed, status is {confirmed}",
                self.election_id, ticket.action
            );
            Reconciliation::Applied(confirmed)
        } else {
            info!(
                "Election {}: {} answered with unexpected status {confirmed}, resynchronised",
                self.election_id, ticket.action
            );
            Reconciliation::Resynced(confirmed)
        }
    }

    /// The backend rejected the action or could not be reached.
    pub fn fail(&mut self, ticket: &ActionTicket) -> Reconciliation {
        if !self.is_current(ticket) {
            warn!(
                "Election {}: ignoring stale failure of {} (revision {}, now {})",
                self.election_id, ticket.action, ticket.revision, self.revision
            );
            return Reconciliation::Stale;
        }
        self.in_flight = None;
        self.revision += 1;
        warn!(
            "Election {}: {} failed, status stays {}",
            self.election_id, ticket.action, self.status
        );
        Reconciliation::Reset
    }

    pub fn poll_ticket(&mut self) -> PollTicket {
        self.polls_issued += 1;
        PollTicket {
            election_id: self.election_id.clone(),
            revision: self.revision,
            sequence: self.polls_issued,
        }
    }

    /// Apply a polled status, unless something changed locally since the poll
    /// was issued or a later poll has already been applied.
    pub fn observe(&mut self, ticket: &PollTicket, status: Status) -> Reconciliation {
        if ticket.election_id != self.election_id || ticket.revision != self.revision {
            debug!(
                "Election {}: dropping polled status {status} from revision {}",
                self.election_id, ticket.revision
            );
            return Reconciliation::Stale;
        }
        if ticket.sequence <= self.last_observed {
            debug!(
                "Election {}: dropping polled status {status} from poll #{}, poll #{} already applied",
                self.election_id, ticket.sequence, self.last_observed
            );
            return Reconciliation::Stale;
        }
        self.last_observed = ticket.sequence;
        if status != self.status {
            info!(
                "Election {}: status moved from {} to {status}",
                self.election_id, self.status
            );
            self.status = status;
        }
        Reconciliation::Applied(status)
    }

    /// Tear down: forget the in-flight action so its outcome is ignored.
    pub fn abandon(&mut self) -> Option<OngoingAction> {
        self.revision += 1;
        let abandoned = self.in_flight.take().map(|f| f.action.ongoing());
        if let Some(ongoing) = abandoned {
            info!("Election {}: abandoned {ongoing:?}", self.election_id);
        }
        abandoned
    }
}
