use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::RequestId;
use crate::model::election::{
    Action, AuthContext, DkgStatusResponse, ElectionInfo, LightElectionInfo, NodeProxies,
};

use super::{
    paths, ActionRequest, Backend, ElectionList, InitializeRequest, ProxyList, SetupRequest,
    VoteRequest,
};

/// [`Backend`] talking JSON over HTTP to the proxy.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    proxy_address: String,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            proxy_address: config.proxy_address().to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.proxy_address)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// Send a request, logging it and its response. Non-2xx answers become
    /// [`Error::Backend`].
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = request.build()?;
        let id = RequestId::next();
        info!("->req{id} {} {}", request.method(), request.url());

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                error!("<-rsp{id} transport failure: {e}");
                return Err(e.into());
            }
        };

        let status = response.status();
        let log_msg = format!("<-rsp{id} {status}");
        if status.is_server_error() {
            error!("{log_msg}");
        } else if status.is_client_error() {
            warn!("{log_msg}");
        } else {
            info!("{log_msg}");
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Backend {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }
        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.send(request).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn personal_info(&self) -> Result<AuthContext> {
        self.fetch(self.request(Method::GET, paths::PERSONAL_INFO))
            .await
    }

    async fn list_elections(&self) -> Result<Vec<LightElectionInfo>> {
        let list: ElectionList = self.fetch(self.request(Method::GET, paths::ELECTIONS)).await?;
        Ok(list.elections)
    }

    async fn get_election(&self, election_id: &str) -> Result<ElectionInfo> {
        // Decoded by hand so a broken configuration keeps its own error.
        let request = self.request(Method::GET, &paths::election(election_id));
        let body = self.send(request).await?.text().await?;
        ElectionInfo::from_json(&body)
    }

    async fn issue_action(
        &self,
        election_id: &str,
        action: Action,
        node_proxies: &[String],
    ) -> Result<()> {
        match action {
            Action::Initialize => {
                // One DKG actor per node, started in parallel.
                try_join_all(node_proxies.iter().map(|proxy| {
                    self.send(
                        self.request(Method::POST, paths::DKG_ACTORS)
                            .json(&InitializeRequest {
                                election_id: election_id.to_string(),
                                proxy: proxy.clone(),
                            }),
                    )
                }))
                .await?;
            }
            Action::Setup => {
                let proxy = node_proxies.first().ok_or_else(|| {
                    Error::MissingProxy(format!("the roster of election {election_id}"))
                })?;
                self.send(
                    self.request(Method::PUT, &paths::dkg_actor(election_id))
                        .json(&SetupRequest {
                            action,
                            proxy: proxy.clone(),
                        }),
                )
                .await?;
            }
            _ => {
                self.send(
                    self.request(Method::PUT, &paths::election(election_id))
                        .json(&ActionRequest { action }),
                )
                .await?;
            }
        }
        Ok(())
    }

    async fn proxies(&self) -> Result<NodeProxies> {
        let list: ProxyList = self.fetch(self.request(Method::GET, paths::PROXIES)).await?;
        Ok(list.proxies)
    }

    async fn dkg_status(&self, node_proxy: &str, election_id: &str) -> Result<DkgStatusResponse> {
        self.fetch(
            self.request(Method::GET, &paths::dkg_actor(election_id))
                .query(&[("proxy", node_proxy)]),
        )
        .await
    }

    async fn submit_ballot(&self, election_id: &str, ballot: Vec<Vec<u8>>) -> Result<()> {
        self.send(
            self.request(Method::POST, &paths::vote(election_id))
                .json(&VoteRequest { ballot }),
        )
        .await?;
        Ok(())
    }
}
