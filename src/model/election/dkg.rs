use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::NodeStatus;

/// Address of a node in the election roster.
pub type NodeAddress = String;

/// Last known DKG state of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeState {
    pub status: NodeStatus,
    /// Why the last query for this node failed, cleared by the next successful one.
    pub error: Option<String>,
    /// Time of the last successful status update.
    pub updated_at: Option<DateTime<Utc>>,
    /// Sequence number of the poll that last touched this node.
    poll: u64,
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            status: NodeStatus::NotInitialized,
            error: None,
            updated_at: None,
            poll: 0,
        }
    }
}

/// Issued by [`DkgStatuses::begin_poll`] before the nodes are queried.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DkgPoll {
    sequence: u64,
}

/// Body of `GET /evoting/services/dkg/actors/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DkgStatusResponse {
    #[serde(rename = "Status")]
    pub status: NodeStatus,
    #[serde(rename = "Error", default, skip_serializing_if = "Option::is_none")]
    pub error: Option<DkgError>,
}

/// Failure reported by a DKG actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DkgError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// DKG status of every roster node of one election, in roster order.
///
/// Updates touch exactly one node. The election's own status is never
/// derived from this map. Polls are numbered in issue order, and a node
/// ignores answers from polls older than the one that last touched it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DkgStatuses {
    nodes: Vec<(NodeAddress, NodeState)>,
    polls_issued: u64,
}

impl DkgStatuses {
    /// Every node of the roster starts out `NotInitialized`.
    pub fn new(roster: &[NodeAddress]) -> Self {
        let mut statuses = Self::default();
        statuses.reset_roster(roster);
        statuses
    }

    /// Start over with a new roster. Polls issued before the reset no
    /// longer apply to any node.
    pub fn reset_roster(&mut self, roster: &[NodeAddress]) {
        self.polls_issued += 1;
        let fresh = NodeState {
            poll: self.polls_issued,
            ..NodeState::default()
        };
        self.nodes = Vec::with_capacity(roster.len());
        for node in roster {
            if self.nodes.iter().any(|(n, _)| n == node) {
                warn!("Node {node} is listed twice in the roster");
                continue;
            }
            self.nodes.push((node.clone(), fresh.clone()));
        }
    }

    /// Number the next round of node queries.
    pub fn begin_poll(&mut self) -> DkgPoll {
        self.polls_issued += 1;
        DkgPoll {
            sequence: self.polls_issued,
        }
    }

    fn state_mut(&mut self, poll: &DkgPoll, node: &str) -> Option<&mut NodeState> {
        let Some(state) = self
            .nodes
            .iter_mut()
            .find(|(n, _)| n == node)
            .map(|(_, s)| s)
        else {
            warn!("Ignoring DKG update for unknown node {node}");
            return None;
        };
        if state.poll > poll.sequence {
            debug!(
                "Node {node}: dropping DKG answer from poll #{}, poll #{} already applied",
                poll.sequence, state.poll
            );
            return None;
        }
        state.poll = poll.sequence;
        Some(state)
    }

    /// Record a fresh status for one node. Returns false for unknown nodes
    /// and for answers older than the node's current state.
    pub fn update(&mut self, poll: &DkgPoll, node: &str, status: NodeStatus) -> bool {
        match self.state_mut(poll, node) {
            Some(state) => {
                if state.status != status {
                    debug!("Node {node}: DKG status {:?} -> {status:?}", state.status);
                }
                state.status = status;
                state.error = None;
                state.updated_at = Some(Utc::now());
                true
            }
            None => false,
        }
    }

    /// Record a failed query for one node, keeping its last known status.
    /// Returns false for unknown nodes and for stale answers.
    pub fn record_error(
        &mut self,
        poll: &DkgPoll,
        node: &str,
        message: impl Into<String>,
    ) -> bool {
        match self.state_mut(poll, node) {
            Some(state) => {
                let message = message.into();
                warn!("Node {node}: DKG status query failed: {message}");
                state.error = Some(message);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, node: &str) -> Option<&NodeState> {
        self.nodes.iter().find(|(n, _)| n == node).map(|(_, s)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NodeState)> {
        self.nodes.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn count(&self, status: NodeStatus) -> usize {
        self.nodes.iter().filter(|(_, s)| s.status == status).count()
    }

    /// True when every node has the given status. Vacuously true for an empty roster.
    pub fn all(&self, status: NodeStatus) -> bool {
        self.nodes.iter().all(|(_, s)| s.status == status)
    }

    pub fn any(&self, status: NodeStatus) -> bool {
        self.nodes.iter().any(|(_, s)| s.status == status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<NodeAddress> {
        vec!["node-a:2001", "node-b:2002", "node-c:2003"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn starts_not_initialized() {
        let statuses = DkgStatuses::new(&roster());
        assert_eq!(statuses.len(), 3);
        assert!(statuses.all(NodeStatus::NotInitialized));
        assert_eq!(
            statuses.nodes().collect::<Vec<_>>(),
            vec!["node-a:2001", "node-b:2002", "node-c:2003"]
        );
    }

    fn untouched(state: &NodeState) -> bool {
        state.status == NodeStatus::NotInitialized
            && state.error.is_none()
            && state.updated_at.is_none()
    }

    #[test]
    fn update_touches_one_node() {
        for status in [NodeStatus::Setup, NodeStatus::Failed] {
            let mut statuses = DkgStatuses::new(&roster());
            let poll = statuses.begin_poll();
            assert!(statuses.update(&poll, "node-a:2001", status));

            assert_eq!(statuses.get("node-a:2001").unwrap().status, status);
            assert!(statuses.get("node-a:2001").unwrap().updated_at.is_some());
            for node in ["node-b:2002", "node-c:2003"] {
                assert!(untouched(statuses.get(node).unwrap()), "{node}");
            }
            assert_eq!(statuses.count(status), 1);
            assert!(statuses.any(status));
            assert!(!statuses.all(status));
        }
    }

    #[test]
    fn errors_are_per_node() {
        let mut statuses = DkgStatuses::new(&roster());
        let poll = statuses.begin_poll();
        statuses.update(&poll, "node-b:2002", NodeStatus::Initialized);
        let poll = statuses.begin_poll();
        assert!(statuses.record_error(&poll, "node-b:2002", "connection refused"));

        let b = statuses.get("node-b:2002").unwrap();
        assert_eq!(b.status, NodeStatus::Initialized);
        assert_eq!(b.error.as_deref(), Some("connection refused"));
        assert_eq!(statuses.get("node-a:2001").unwrap().error, None);

        // The next successful query clears the error.
        let poll = statuses.begin_poll();
        statuses.update(&poll, "node-b:2002", NodeStatus::Setup);
        assert_eq!(statuses.get("node-b:2002").unwrap().error, None);
    }

    #[test]
    fn late_answers_are_dropped() {
        let mut statuses = DkgStatuses::new(&roster());
        let older = statuses.begin_poll();
        let newer = statuses.begin_poll();

        assert!(statuses.update(&newer, "node-a:2001", NodeStatus::Setup));
        assert!(!statuses.update(&older, "node-a:2001", NodeStatus::Initialized));
        assert!(!statuses.record_error(&older, "node-a:2001", "timed out"));
        let a = statuses.get("node-a:2001").unwrap();
        assert_eq!(a.status, NodeStatus::Setup);
        assert_eq!(a.error, None);

        // Nodes the newer poll has not reached yet still take the older answer.
        assert!(statuses.update(&older, "node-b:2002", NodeStatus::Initialized));
        // One poll may report a status and an error for the same node.
        assert!(statuses.record_error(&older, "node-b:2002", "actor error"));
        assert_eq!(
            statuses.get("node-b:2002").unwrap().status,
            NodeStatus::Initialized
        );
    }

    #[test]
    fn roster_reset_drops_earlier_polls() {
        let mut statuses = DkgStatuses::new(&roster());
        let before_reset = statuses.begin_poll();
        statuses.reset_roster(&roster()[..2]);
        assert_eq!(statuses.len(), 2);
        assert!(!statuses.update(&before_reset, "node-a:2001", NodeStatus::Setup));
        assert!(statuses.all(NodeStatus::NotInitialized));

        let poll = statuses.begin_poll();
        assert!(statuses.update(&poll, "node-a:2001", NodeStatus::Setup));
    }

    #[test]
    fn unknown_nodes_are_ignored() {
        let mut statuses = DkgStatuses::new(&roster());
        let poll = statuses.begin_poll();
        let before = statuses.clone();
        assert!(!statuses.update(&poll, "node-z:9999", NodeStatus::Failed));
        assert!(!statuses.record_error(&poll, "node-z:9999", "boom"));
        assert_eq!(statuses, before);
    }

    #[test]
    fn duplicate_roster_entries_collapse() {
        let mut roster = roster();
        roster.push("node-a:2001".to_string());
        assert_eq!(DkgStatuses::new(&roster).len(), 3);
        assert!(DkgStatuses::new(&[]).all(NodeStatus::Setup));
    }

    #[test]
    fn parse_status_response() {
        let ok: DkgStatusResponse = serde_json::from_str(r#"{"Status": 1}"#).unwrap();
        assert_eq!(ok.status, NodeStatus::Setup);
        assert_eq!(ok.error, None);

        let failed: DkgStatusResponse = serde_json::from_str(
            r#"{"Status": 2, "Error": {"code": 500, "message": "setup failed"}}"#,
        )
        .unwrap();
        assert_eq!(failed.status, NodeStatus::Failed);
        assert_eq!(failed.error.unwrap().message, "setup failed");
    }
}
