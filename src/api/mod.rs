//! Access to the voting backend.
//!
//! Everything goes through the [`Backend`] trait so sessions can be driven
//! by the real HTTP client or by an in-memory stand-in.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::election::{
    Action, AuthContext, DkgStatusResponse, ElectionInfo, LightElectionInfo, NodeProxies,
};

pub use bodies::{ActionRequest, ElectionList, InitializeRequest, ProxyList, SetupRequest, VoteRequest};
pub use http::HttpBackend;

mod bodies;
mod http;

/// Endpoint paths, relative to the proxy address.
pub mod paths {
    pub const PERSONAL_INFO: &str = "/personal_info";
    pub const ELECTIONS: &str = "/evoting/elections";
    pub const DKG_ACTORS: &str = "/evoting/services/dkg/actors";
    pub const PROXIES: &str = "/proxies";

    pub fn election(election_id: &str) -> String {
        format!("{ELECTIONS}/{election_id}")
    }

    pub fn vote(election_id: &str) -> String {
        format!("{ELECTIONS}/{election_id}/vote")
    }

    pub fn dkg_actor(election_id: &str) -> String {
        format!("{DKG_ACTORS}/{election_id}")
    }
}

/// Operations offered by the voting backend. Nothing is retried.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Who is logged in.
    async fn personal_info(&self) -> Result<AuthContext>;

    async fn list_elections(&self) -> Result<Vec<LightElectionInfo>>;

    async fn get_election(&self, election_id: &str) -> Result<ElectionInfo>;

    /// Ask the backend to perform `action`. `node_proxies` lists the proxy of
    /// every roster node, in roster order: `Initialize` starts a DKG actor
    /// through each of them and `Setup` goes through the first one.
    async fn issue_action(
        &self,
        election_id: &str,
        action: Action,
        node_proxies: &[String],
    ) -> Result<()>;

    /// Proxy of every known node.
    async fn proxies(&self) -> Result<NodeProxies>;

    /// DKG status of the actor for `election_id` on the node behind `node_proxy`.
    async fn dkg_status(&self, node_proxy: &str, election_id: &str) -> Result<DkgStatusResponse>;

    /// Cast an encoded, chunked ballot.
    async fn submit_ballot(&self, election_id: &str, ballot: Vec<Vec<u8>>) -> Result<()>;
}
