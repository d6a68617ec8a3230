//! Remote custody service clients.
//!
//! A [`RemoteClient`] is a capability bound to exactly one (service id,
//! agent) pair; it is invalidated and replaced whenever the session identity
//! changes. An absent identity still yields a client - an anonymous one that
//! can read public values (network, key names) but not the user's address.
//!
//! [`CustodyApi`] is the narrow call contract the core consumes; tests swap
//! in scripted implementations behind the same trait.

mod transport;

pub use transport::Agent;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::session::Identity;

/// Which Bitcoin network the custody service is bound to. Fetched once per
/// client; immutable for that client's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BitcoinNetwork {
    Mainnet,
    Testnet,
    Regtest,
}

impl BitcoinNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            BitcoinNetwork::Mainnet => "mainnet",
            BitcoinNetwork::Testnet => "testnet",
            BitcoinNetwork::Regtest => "regtest",
        }
    }
}

impl std::fmt::Display for BitcoinNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire arguments for `wallet_send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendArgs {
    pub destination_address: String,
    pub amount_in_satoshi: u64,
}

/// The call contract consumed from the custody service. Balances travel as
/// integer satoshis.
#[async_trait]
pub trait CustodyApi: Send + Sync {
    async fn get_network(&self) -> Result<BitcoinNetwork>;
    async fn get_ecdsa_key_name(&self, network: BitcoinNetwork) -> Result<String>;
    async fn get_wallet_address(&self) -> Result<String>;
    async fn get_balance(&self, address: &str) -> Result<u64>;
    async fn wallet_send(&self, args: &SendArgs) -> Result<String>;
}

/// Builds a client for a service id against the current identity. The seam
/// the session cascade goes through, so tests can inject scripted services.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn create(&self, service_id: &str, identity: Option<Identity>) -> Result<Arc<dyn CustodyApi>>;
}

/// A typed client over one service behind one agent.
pub struct RemoteClient {
    agent: Arc<Agent>,
    service_id: String,
}

impl RemoteClient {
    pub fn new(agent: Arc<Agent>, service_id: impl Into<String>) -> Self {
        Self { agent, service_id: service_id.into() }
    }

    fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T> {
        serde_json::from_value(value).map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl CustodyApi for RemoteClient {
    async fn get_network(&self) -> Result<BitcoinNetwork> {
        Self::decode(self.agent.call(&self.service_id, "get_network", json!({})).await?)
    }

    async fn get_ecdsa_key_name(&self, network: BitcoinNetwork) -> Result<String> {
        Self::decode(
            self.agent
                .call(&self.service_id, "get_ecdsa_key_name", json!({ "network": network }))
                .await?,
        )
    }

    async fn get_wallet_address(&self) -> Result<String> {
        Self::decode(self.agent.call(&self.service_id, "get_wallet_address", json!({})).await?)
    }

    async fn get_balance(&self, address: &str) -> Result<u64> {
        Self::decode(
            self.agent
                .call(&self.service_id, "get_balance", json!({ "address": address }))
                .await?,
        )
    }

    async fn wallet_send(&self, args: &SendArgs) -> Result<String> {
        let args = serde_json::to_value(args).map_err(|e| Error::InvalidResponse(e.to_string()))?;
        Self::decode(self.agent.call(&self.service_id, "wallet_send", args).await?)
    }
}

/// Production factory: one fresh agent per client, bound to the configured
/// gateway and the supplied identity.
pub struct HttpClientFactory {
    config: ClientConfig,
}

impl HttpClientFactory {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ClientFactory for HttpClientFactory {
    async fn create(&self, service_id: &str, identity: Option<Identity>) -> Result<Arc<dyn CustodyApi>> {
        let agent = Agent::connect(&self.config, identity).await?;
        Ok(Arc::new(RemoteClient::new(Arc::new(agent), service_id)))
    }
}
