use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::configuration::{Configuration, RawConfiguration};
use crate::model::results::{GroupedResults, ResultExport, Results};

use super::{DkgStatuses, ElectionId, ElectionLifecycle, NodeAddress, Status};

/// Proxy base URL of each roster node.
pub type NodeProxies = HashMap<NodeAddress, String>;

/// Full description of an election, as returned by `GET /evoting/elections/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", try_from = "RawElectionInfo")]
pub struct ElectionInfo {
    #[serde(rename = "ElectionID")]
    pub election_id: ElectionId,
    pub status: Status,
    /// Election public key, empty until the DKG setup completed.
    #[serde(default)]
    pub pubkey: String,
    /// Decrypted ballots, only present once the result is available.
    #[serde(default)]
    pub result: Option<Vec<Results>>,
    /// Addresses of the nodes running the election.
    #[serde(default)]
    pub roster: Vec<NodeAddress>,
    pub chunks_per_ballot: usize,
    pub ballot_size: usize,
    pub configuration: Configuration,
}

/// Election as received, before its configuration has been checked.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawElectionInfo {
    #[serde(rename = "ElectionID")]
    election_id: ElectionId,
    status: Status,
    #[serde(default)]
    pubkey: String,
    #[serde(default)]
    result: Option<Vec<Results>>,
    #[serde(default)]
    roster: Vec<NodeAddress>,
    chunks_per_ballot: usize,
    ballot_size: usize,
    configuration: RawConfiguration,
}

impl TryFrom<RawElectionInfo> for ElectionInfo {
    type Error = Error;

    fn try_from(raw: RawElectionInfo) -> Result<Self> {
        Ok(Self {
            configuration: raw.configuration.try_into()?,
            election_id: raw.election_id,
            status: raw.status,
            pubkey: raw.pubkey,
            result: raw.result,
            roster: raw.roster,
            chunks_per_ballot: raw.chunks_per_ballot,
            ballot_size: raw.ballot_size,
        })
    }
}

impl ElectionInfo {
    /// Decode an election. A configuration breaking the tree's invariants is
    /// reported as [`Error::MalformedConfiguration`], anything else
    /// undecodable as [`Error::Json`].
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawElectionInfo = serde_json::from_str(json)?;
        raw.try_into()
    }

    pub fn title(&self) -> &str {
        &self.configuration.main_title
    }

    /// Decrypted ballots, empty while the result is unavailable.
    pub fn results(&self) -> &[Results] {
        self.result.as_deref().unwrap_or_default()
    }

    pub fn grouped_results(&self) -> GroupedResults {
        GroupedResults::from_results(self.results())
    }

    /// The downloadable results document for this election.
    pub fn export(&self) -> ResultExport {
        ResultExport::build(
            &self.configuration,
            &self.grouped_results(),
            self.results().len(),
        )
    }

    /// A fresh lifecycle tracker starting at the reported status.
    pub fn lifecycle(&self) -> ElectionLifecycle {
        ElectionLifecycle::new(self.election_id.clone(), self.status)
    }

    pub fn dkg_statuses(&self) -> DkgStatuses {
        DkgStatuses::new(&self.roster)
    }
}

/// Summary of an election, as listed by `GET /evoting/elections`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LightElectionInfo {
    #[serde(rename = "ElectionID")]
    pub election_id: ElectionId,
    pub title: String,
    pub status: Status,
    #[serde(default)]
    pub pubkey: String,
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::election::NodeStatus;

    #[test]
    fn parse_example_dump() {
        let election = ElectionInfo::example();
        assert_eq!(election.status, Status::ResultAvailable);
        assert_eq!(election.title(), "Life on the campus");
        assert_eq!(election.results().len(), 2);
        assert_eq!(election.roster.len(), 3);
        assert_eq!(election.configuration, Configuration::example());
    }

    #[test]
    fn export_counts_every_ballot() {
        let export = ElectionInfo::example().export();
        assert_eq!(export.number_of_votes, 2);
        assert_eq!(export.title, "Life on the campus");
    }

    #[test]
    fn null_result_means_none_yet() {
        let mut json = serde_json::to_value(ElectionInfo::yes_no_example(Status::Open)).unwrap();
        json["Result"] = serde_json::Value::Null;
        let election: ElectionInfo = serde_json::from_value(json).unwrap();
        assert!(election.results().is_empty());
        assert_eq!(election.export().number_of_votes, 0);
    }

    #[test]
    fn malformed_configuration_rejects_election() {
        let mut json = serde_json::to_value(ElectionInfo::yes_no_example(Status::Open)).unwrap();
        json["Configuration"]["Scaffold"][0]["Order"] = serde_json::json!(["missing"]);
        assert!(serde_json::from_value::<ElectionInfo>(json).is_err());
    }

    #[test]
    fn invalid_configuration_keeps_its_category() {
        let json = include_str!("../../../example_dumps/election_invalid_configuration.json");
        match ElectionInfo::from_json(json) {
            Err(Error::MalformedConfiguration(reason)) => assert!(reason.contains("q1")),
            other => panic!("expected a malformed configuration, got {other:?}"),
        }

        let truncated = include_str!("../../../example_dumps/election_malformed.json");
        assert!(matches!(ElectionInfo::from_json(truncated), Err(Error::Json(_))));
    }

    #[test]
    fn derived_trackers() {
        let election = ElectionInfo::yes_no_example(Status::Initialized);
        let lifecycle = election.lifecycle();
        assert_eq!(lifecycle.election_id(), "e1");
        assert_eq!(lifecycle.status(), Status::Initialized);
        assert!(election.dkg_statuses().all(NodeStatus::NotInitialized));
    }

    #[test]
    fn parse_light_info() {
        let json = r#"{"ElectionID": "abc", "Title": "Referendum", "Status": 1, "Pubkey": ""}"#;
        let light: LightElectionInfo = serde_json::from_str(json).unwrap();
        assert_eq!(light.status, Status::Open);
        assert_eq!(light.title, "Referendum");
    }
}
