//! Scripted provider/service doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use custody_client::{
    AuthHandle, AuthProvider, BitcoinNetwork, ClientConfig, ClientFactory, CustodyApi, Error,
    Identity, IdleOptions, Result, SendArgs,
};
use tokio::sync::Notify;

pub fn test_config() -> ClientConfig {
    ClientConfig::local()
        .with_wallet_service("wallet")
        .with_fiduciary_service("fiduciary")
        .with_identity_service("identity")
}

// ---------------------------------------------------------------------------
// Identity provider double
// ---------------------------------------------------------------------------

pub struct MockProvider {
    /// Authentication flag new handles restore, as the real provider would
    /// from its persisted state.
    pub persisted_auth: AtomicBool,
    pub fail_create: AtomicBool,
    pub created: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            persisted_auth: AtomicBool::new(false),
            fail_create: AtomicBool::new(false),
            created: AtomicUsize::new(0),
        })
    }

    pub fn with_persisted_auth() -> Arc<Self> {
        let provider = Self::new();
        provider.persisted_auth.store(true, Ordering::SeqCst);
        provider
    }

    pub fn created_handles(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthProvider for MockProvider {
    async fn create(&self, _options: IdleOptions) -> Result<Arc<dyn AuthHandle>> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Error::Auth("provider unavailable".into()));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockHandle {
            authenticated: AtomicBool::new(self.persisted_auth.load(Ordering::SeqCst)),
            logins: Mutex::new(Vec::new()),
        }))
    }
}

pub struct MockHandle {
    authenticated: AtomicBool,
    pub logins: Mutex<Vec<String>>,
}

#[async_trait]
impl AuthHandle for MockHandle {
    async fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    async fn login(&self, endpoint: &str) -> Result<()> {
        self.logins
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(endpoint.to_string());
        self.authenticated.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        self.authenticated.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn identity(&self) -> Option<Identity> {
        self.authenticated
            .load(Ordering::SeqCst)
            .then(|| Identity::new("aaaaa-aa"))
    }
}

// ---------------------------------------------------------------------------
// Custody service double
// ---------------------------------------------------------------------------

/// Two-phase gate: `entered` fires when the fetch reaches the service,
/// `release` lets it resolve. Scripts resolution order in the stale-fetch
/// tests.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

pub struct MockService {
    pub network: BitcoinNetwork,
    pub key_name: String,
    pub address: Mutex<String>,
    pub balances: Mutex<HashMap<String, u64>>,
    pub balance_gates: Mutex<HashMap<String, Arc<Gate>>>,
    pub balance_calls: AtomicUsize,
    pub send_result: Mutex<Result<String, String>>,
    pub sent: Mutex<Vec<SendArgs>>,
}

impl MockService {
    pub fn new(network: BitcoinNetwork, key_name: &str) -> Arc<Self> {
        Arc::new(Self {
            network,
            key_name: key_name.to_string(),
            address: Mutex::new(String::new()),
            balances: Mutex::new(HashMap::new()),
            balance_gates: Mutex::new(HashMap::new()),
            balance_calls: AtomicUsize::new(0),
            send_result: Mutex::new(Ok("txid123".to_string())),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn set_address(&self, address: &str) {
        *self.address.lock().unwrap_or_else(PoisonError::into_inner) = address.to_string();
    }

    pub fn set_balance(&self, address: &str, sats: u64) {
        self.balances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(address.to_string(), sats);
    }

    pub fn gate_balance(&self, address: &str) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.balance_gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(address.to_string(), gate.clone());
        gate
    }

    pub fn set_send_result(&self, result: Result<String, String>) {
        *self.send_result.lock().unwrap_or_else(PoisonError::into_inner) = result;
    }

    pub fn balance_call_count(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub fn sent_args(&self) -> Vec<SendArgs> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl CustodyApi for MockService {
    async fn get_network(&self) -> Result<BitcoinNetwork> {
        Ok(self.network)
    }

    async fn get_ecdsa_key_name(&self, network: BitcoinNetwork) -> Result<String> {
        Ok(format!("{}_{}", self.key_name, network.as_str()))
    }

    async fn get_wallet_address(&self) -> Result<String> {
        Ok(self.address.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    async fn get_balance(&self, address: &str) -> Result<u64> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self
            .balance_gates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .cloned();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.balances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .copied()
            .ok_or_else(|| Error::Remote(format!("unknown address: {address}")))
    }

    async fn wallet_send(&self, args: &SendArgs) -> Result<String> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(args.clone());
        self.send_result
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .map_err(Error::Remote)
    }
}

// ---------------------------------------------------------------------------
// Client factory double
// ---------------------------------------------------------------------------

pub struct MockFactory {
    services: Mutex<HashMap<String, Arc<MockService>>>,
    pub fail_create: AtomicBool,
    pub created: Mutex<Vec<(String, Option<Identity>)>>,
}

impl MockFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            services: Mutex::new(HashMap::new()),
            fail_create: AtomicBool::new(false),
            created: Mutex::new(Vec::new()),
        })
    }

    pub fn register(&self, service_id: &str, service: Arc<MockService>) {
        self.services
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(service_id.to_string(), service);
    }

    pub fn created_clients(&self) -> Vec<(String, Option<Identity>)> {
        self.created.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl ClientFactory for MockFactory {
    async fn create(&self, service_id: &str, identity: Option<Identity>) -> Result<Arc<dyn CustodyApi>> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Error::Bootstrap("gateway unreachable".into()));
        }
        self.created
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((service_id.to_string(), identity));
        let service = self
            .services
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(service_id)
            .cloned()
            .ok_or_else(|| Error::Bootstrap(format!("unknown service: {service_id}")))?;
        Ok(service as Arc<dyn CustodyApi>)
    }
}

/// A factory + wallet/fiduciary pair wired for the common test setup.
pub fn test_services() -> (Arc<MockFactory>, Arc<MockService>, Arc<MockService>) {
    let factory = MockFactory::new();
    let wallet = MockService::new(BitcoinNetwork::Regtest, "dfx_test_key");
    let fiduciary = MockService::new(BitcoinNetwork::Regtest, "fiduciary_key");
    factory.register("wallet", wallet.clone());
    factory.register("fiduciary", fiduciary.clone());
    (factory, wallet, fiduciary)
}
