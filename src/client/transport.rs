//! Agent - HTTP transport bound to one (gateway, identity) pair.
//!
//! Local deployments serve a self-signed root of trust, so the agent fetches
//! the gateway root key once, before it is usable; production gateways ship
//! their key with the client and skip the fetch. An agent is never mutated
//! after creation - identity changes always build a new agent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::session::Identity;

const ANONYMOUS_SENDER: &str = "2vxsx-fae";

#[derive(Debug)]
pub struct Agent {
    http: reqwest::Client,
    base_url: String,
    identity: Option<Identity>,
    root_key: Option<Vec<u8>>,
}

#[derive(Serialize)]
struct CallEnvelope<'a> {
    method: &'a str,
    args: Value,
    sender: &'a str,
}

#[derive(Deserialize)]
struct CallReply {
    #[serde(default)]
    ok: Option<Value>,
    #[serde(default)]
    err: Option<String>,
}

#[derive(Deserialize)]
struct GatewayStatus {
    root_key: String,
}

impl Agent {
    /// Build an agent for the configured gateway, bound to `identity` (or
    /// anonymous). Any failure during the trust bootstrap fails the whole
    /// creation.
    pub async fn connect(config: &ClientConfig, identity: Option<Identity>) -> Result<Self> {
        let mut agent = Self {
            http: reqwest::Client::new(),
            base_url: config.gateway_url(),
            identity,
            root_key: None,
        };
        if config.requires_trust_bootstrap() {
            agent.fetch_root_key().await?;
        }
        tracing::debug!(gateway = %agent.base_url, anonymous = agent.identity.is_none(), "agent ready");
        Ok(agent)
    }

    async fn fetch_root_key(&mut self) -> Result<()> {
        let url = format!("{}/api/v2/status", self.base_url);
        let status: GatewayStatus = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| Error::Bootstrap(e.to_string()))?
            .json()
            .await
            .map_err(|e| Error::Bootstrap(e.to_string()))?;
        let key = hex::decode(&status.root_key)
            .map_err(|e| Error::Bootstrap(format!("root key decode: {e}")))?;
        self.root_key = Some(key);
        Ok(())
    }

    pub fn sender(&self) -> &str {
        self.identity
            .as_ref()
            .map(Identity::principal)
            .unwrap_or(ANONYMOUS_SENDER)
    }

    /// One call to `method` on `service_id`. Service-side rejections come
    /// back as `Error::Remote` with the service's message untouched.
    pub async fn call(&self, service_id: &str, method: &str, args: Value) -> Result<Value> {
        let url = format!("{}/api/v2/call/{}", self.base_url, service_id);
        let envelope = CallEnvelope { method, args, sender: self.sender() };
        let reply: CallReply = self
            .http
            .post(&url)
            .json(&envelope)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(e.to_string()))?;
        if let Some(message) = reply.err {
            return Err(Error::Remote(message));
        }
        reply
            .ok
            .ok_or_else(|| Error::InvalidResponse(format!("{method}: empty reply")))
    }
}
