//! Client configuration - deployment mode, service ids, idle timeout.
//!
//! The deployment mode selects the gateway endpoint and the identity provider
//! endpoint, and decides whether client creation performs the local
//! trust-bootstrap fetch. This is configuration input, not core logic.

use std::time::Duration;

const PROD_GATEWAY: &str = "https://icp0.io";
const PROD_IDENTITY: &str = "https://identity.ic0.app/#authorize";
const DEFAULT_REPLICA_PORT: u16 = 4943;
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeployMode {
    #[default]
    Local,
    Production,
}

impl DeployMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployMode::Local => "local",
            DeployMode::Production => "production",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" | "dev" => Some(DeployMode::Local),
            "production" | "ic" => Some(DeployMode::Production),
            _ => None,
        }
    }
}

/// Wallet client configuration. The embedding app constructs this.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub mode: DeployMode,
    pub replica_port: u16,
    pub wallet_service_id: String,
    pub fiduciary_service_id: String,
    pub identity_service_id: String,
    pub idle_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            mode: DeployMode::default(),
            replica_port: DEFAULT_REPLICA_PORT,
            wallet_service_id: String::new(),
            fiduciary_service_id: String::new(),
            identity_service_id: String::new(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(mode: DeployMode) -> Self {
        Self { mode, ..Default::default() }
    }

    pub fn local() -> Self { Self::new(DeployMode::Local) }
    pub fn production() -> Self { Self::new(DeployMode::Production) }

    pub fn with_replica_port(mut self, port: u16) -> Self { self.replica_port = port; self }
    pub fn with_wallet_service(mut self, id: impl Into<String>) -> Self { self.wallet_service_id = id.into(); self }
    pub fn with_fiduciary_service(mut self, id: impl Into<String>) -> Self { self.fiduciary_service_id = id.into(); self }
    pub fn with_identity_service(mut self, id: impl Into<String>) -> Self { self.identity_service_id = id.into(); self }
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self { self.idle_timeout = timeout; self }

    /// Gateway the remote-call transport binds to.
    pub fn gateway_url(&self) -> String {
        match self.mode {
            DeployMode::Local => format!("http://localhost:{}", self.replica_port),
            DeployMode::Production => PROD_GATEWAY.to_string(),
        }
    }

    /// Identity provider endpoint handed to the login flow.
    pub fn identity_endpoint(&self) -> String {
        match self.mode {
            DeployMode::Local => format!(
                "http://localhost:{}?canisterId={}#authorize",
                self.replica_port, self.identity_service_id
            ),
            DeployMode::Production => PROD_IDENTITY.to_string(),
        }
    }

    /// Local mode trusts nothing until the gateway root key is fetched.
    pub fn requires_trust_bootstrap(&self) -> bool {
        self.mode == DeployMode::Local
    }
}
