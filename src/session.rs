//! One administrator's or voter's view of a single election.
//!
//! The session owns the election's lifecycle tracker and DKG map behind an
//! async mutex. The lock is never held across a backend call, so actions,
//! status polls and DKG polls can run concurrently; their outcomes are
//! reconciled through the lifecycle's revision tickets.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Mutex;

use crate::api::Backend;
use crate::error::{Error, Result};
use crate::model::answers::Answers;
use crate::model::ballot::prepare_ballot;
use crate::model::election::{
    Action, AuthContext, DkgStatuses, ElectionInfo, ElectionLifecycle, NodeAddress, NodeProxies,
    NodeStatus, OngoingAction, Reconciliation, Status,
};
use crate::poller::{PollOutcome, Poller};

struct SessionState {
    election: ElectionInfo,
    lifecycle: ElectionLifecycle,
    dkg: DkgStatuses,
    proxies: Option<NodeProxies>,
}

impl SessionState {
    /// Take in a fresher copy of the election.
    fn replace_election(&mut self, election: ElectionInfo) {
        if election.roster != self.election.roster {
            info!(
                "Election {}: roster changed, resetting DKG statuses",
                election.election_id
            );
            self.dkg.reset_roster(&election.roster);
        }
        self.election = election;
    }
}

pub struct ElectionSession<B: Backend> {
    backend: Arc<B>,
    state: Mutex<SessionState>,
}

impl<B: Backend> ElectionSession<B> {
    pub fn new(backend: Arc<B>, election: ElectionInfo) -> Self {
        let state = SessionState {
            lifecycle: election.lifecycle(),
            dkg: election.dkg_statuses(),
            election,
            proxies: None,
        };
        Self {
            backend,
            state: Mutex::new(state),
        }
    }

    /// Fetch an election and start a session on it.
    pub async fn open(backend: Arc<B>, election_id: &str) -> Result<Self> {
        let election = backend.get_election(election_id).await?;
        Ok(Self::new(backend, election))
    }

    /// Latest known copy of the election.
    pub async fn election(&self) -> ElectionInfo {
        self.state.lock().await.election.clone()
    }

    pub async fn status(&self) -> Status {
        self.state.lock().await.lifecycle.status()
    }

    pub async fn ongoing_action(&self) -> Option<OngoingAction> {
        self.state.lock().await.lifecycle.ongoing_action()
    }

    pub async fn dkg_statuses(&self) -> DkgStatuses {
        self.state.lock().await.dkg.clone()
    }

    pub async fn legal_actions(&self, auth: &AuthContext) -> Vec<Action> {
        self.state.lock().await.lifecycle.legal_actions(auth)
    }

    /// Node proxies, fetched once per session.
    async fn proxies(&self) -> Result<NodeProxies> {
        if let Some(proxies) = &self.state.lock().await.proxies {
            return Ok(proxies.clone());
        }
        let proxies = self.backend.proxies().await?;
        self.state.lock().await.proxies = Some(proxies.clone());
        Ok(proxies)
    }

    async fn node_proxies(&self, roster: &[NodeAddress]) -> Result<Vec<String>> {
        let proxies = self.proxies().await?;
        roster
            .iter()
            .map(|node| {
                proxies
                    .get(node)
                    .cloned()
                    .ok_or_else(|| Error::MissingProxy(format!("node {node}")))
            })
            .collect()
    }

    /// Issue `action` and wait for the backend to confirm the new status.
    ///
    /// Illegal or unauthorized actions are rejected before any request is
    /// made. When the request fails the in-flight action is cleared and the
    /// error returned. If the session moved on while the request was
    /// running, its outcome is ignored and the current status returned.
    pub async fn perform(&self, action: Action, auth: &AuthContext) -> Result<Status> {
        let (ticket, election_id, roster) = {
            let mut state = self.state.lock().await;
            let ticket = state.lifecycle.begin(action, auth)?;
            (
                ticket,
                state.election.election_id.clone(),
                state.election.roster.clone(),
            )
        };

        match self.issue(&election_id, action, &roster).await {
            Ok(election) => {
                let mut state = self.state.lock().await;
                if state.lifecycle.complete(&ticket, election.status) != Reconciliation::Stale {
                    state.replace_election(election);
                }
                Ok(state.lifecycle.status())
            }
            Err(e) => {
                self.state.lock().await.lifecycle.fail(&ticket);
                Err(e)
            }
        }
    }

    async fn issue(
        &self,
        election_id: &str,
        action: Action,
        roster: &[NodeAddress],
    ) -> Result<ElectionInfo> {
        let node_proxies = match action {
            Action::Initialize | Action::Setup => self.node_proxies(roster).await?,
            _ => Vec::new(),
        };
        self.backend
            .issue_action(election_id, action, &node_proxies)
            .await?;
        self.backend.get_election(election_id).await
    }

    /// Fetch the election again and adopt its status, unless something
    /// changed locally in the meantime.
    pub async fn refresh(&self) -> Result<Reconciliation> {
        let (ticket, election_id) = {
            let mut state = self.state.lock().await;
            (
                state.lifecycle.poll_ticket(),
                state.election.election_id.clone(),
            )
        };
        let election = self.backend.get_election(&election_id).await?;

        let mut state = self.state.lock().await;
        let reconciliation = state.lifecycle.observe(&ticket, election.status);
        if reconciliation != Reconciliation::Stale {
            state.replace_election(election);
        }
        Ok(reconciliation)
    }

    /// Query the DKG status of every roster node concurrently. Each node's
    /// outcome is recorded on its own; a failing node never holds back the
    /// others. Answers landing after those of a later poll are returned but
    /// not recorded. Fails as a whole only if the proxies cannot be fetched.
    pub async fn poll_dkg(&self) -> Result<Vec<(NodeAddress, Result<NodeStatus>)>> {
        let (poll, election_id, roster) = {
            let mut state = self.state.lock().await;
            (
                state.dkg.begin_poll(),
                state.election.election_id.clone(),
                state.election.roster.clone(),
            )
        };
        let proxies = self.proxies().await?;

        let queries = roster.iter().map(|node| {
            let proxy = proxies.get(node);
            let election_id = election_id.as_str();
            async move {
                match proxy {
                    Some(proxy) => self.backend.dkg_status(proxy, election_id).await,
                    None => Err(Error::MissingProxy(format!("node {node}"))),
                }
            }
        });
        let responses = join_all(queries).await;

        let mut state = self.state.lock().await;
        let outcomes = roster
            .into_iter()
            .zip(responses)
            .map(|(node, response)| {
                let outcome = match response {
                    Ok(response) => {
                        state.dkg.update(&poll, &node, response.status);
                        if let Some(error) = response.error {
                            state.dkg.record_error(&poll, &node, error.message);
                        }
                        Ok(response.status)
                    }
                    Err(e) => {
                        state.dkg.record_error(&poll, &node, e.to_string());
                        Err(e)
                    }
                };
                (node, outcome)
            })
            .collect();
        Ok(outcomes)
    }

    /// Check, encode and cast a ballot.
    pub async fn submit_ballot(&self, answers: &Answers) -> Result<()> {
        let election = self.election().await;
        let ballot = prepare_ballot(&election, answers)?;
        info!(
            "Casting a ballot of {} chunks in election {}",
            ballot.len(),
            election.election_id
        );
        self.backend
            .submit_ballot(&election.election_id, ballot)
            .await
    }

    /// Tear the session down, forgetting any in-flight action.
    pub async fn close(&self) -> Option<OngoingAction> {
        self.state.lock().await.lifecycle.abandon()
    }
}

impl<B: Backend + 'static> ElectionSession<B> {
    /// Keep the session up to date in the background until the election
    /// reaches a terminal status. DKG statuses are polled as well while the
    /// election is being set up.
    pub fn watch(self: &Arc<Self>, interval: Duration) -> Poller {
        let session = Arc::clone(self);
        Poller::spawn(interval, move || {
            let session = Arc::clone(&session);
            async move {
                if let Err(e) = session.refresh().await {
                    warn!("Status poll failed: {e}");
                    return PollOutcome::Continue;
                }
                let status = session.status().await;
                if matches!(
                    status,
                    Status::Initial | Status::Initialized | Status::OnGoingSetup
                ) {
                    if let Err(e) = session.poll_dkg().await {
                        warn!("DKG poll failed: {e}");
                    }
                }
                if status.is_terminal() {
                    PollOutcome::Done
                } else {
                    PollOutcome::Continue
                }
            }
        })
    }
}

impl<B: Backend> Drop for ElectionSession<B> {
    fn drop(&mut self) {
        self.state.get_mut().lifecycle.abandon();
    }
}
