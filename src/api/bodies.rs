use serde::{Deserialize, Serialize};

use crate::model::election::{Action, ElectionId, LightElectionInfo, NodeProxies};

/// Response of `GET /evoting/elections`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionList {
    #[serde(rename = "Elections", default)]
    pub elections: Vec<LightElectionInfo>,
}

/// Response of `GET /proxies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyList {
    #[serde(rename = "Proxies", default)]
    pub proxies: NodeProxies,
}

/// Body of `POST /evoting/services/dkg/actors`, sent once per roster node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InitializeRequest {
    #[serde(rename = "ElectionID")]
    pub election_id: ElectionId,
    pub proxy: String,
}

/// Body of `PUT /evoting/services/dkg/actors/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SetupRequest {
    /// Always [`Action::Setup`].
    pub action: Action,
    pub proxy: String,
}

/// Body of `PUT /evoting/elections/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActionRequest {
    pub action: Action,
}

/// Body of `POST /evoting/elections/{id}/vote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VoteRequest {
    pub ballot: Vec<Vec<u8>>,
}
