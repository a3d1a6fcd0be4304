//! Policy sources: the HTTP endpoint and a fixed in-process answer.

use async_trait::async_trait;
use cookieconsent_core::{ConsentConfig, Error, MaybeSendSync, RemotePolicy, Result};
use reqwest::Client;
use tracing::debug;

/// Where the per-hostname policy comes from.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait PolicySource: MaybeSendSync {
    async fn fetch(&self, hostname: &str) -> Result<RemotePolicy>;
}

/// Fetches the policy from the configured endpoint.
pub struct HttpPolicySource {
    client: Client,
    endpoint: String,
}

impl HttpPolicySource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &ConsentConfig) -> Self {
        Self::new(config.policy_endpoint.clone())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl PolicySource for HttpPolicySource {
    async fn fetch(&self, hostname: &str) -> Result<RemotePolicy> {
        debug!("Fetching consent policy for {} from {}", hostname, self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("hostname", hostname)])
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::PolicyStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| Error::MalformedPolicy(e.to_string()))
    }
}

/// Always answers with the same policy (or the same failure).
pub struct StaticPolicySource {
    answer: std::result::Result<RemotePolicy, String>,
}

impl StaticPolicySource {
    pub fn new(policy: RemotePolicy) -> Self {
        Self { answer: Ok(policy) }
    }

    /// A source whose every fetch fails with a network error.
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self {
            answer: Err(reason.into()),
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl PolicySource for StaticPolicySource {
    async fn fetch(&self, _hostname: &str) -> Result<RemotePolicy> {
        self.answer.clone().map_err(Error::Network)
    }
}
