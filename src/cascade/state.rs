//! WalletState - the four fixed edges of the refresh cascade.
//!
//! ```text
//! session epoch ──▶ refresh_clients ──▶ wallet client ─┬─▶ refresh_network ──▶ network ──▶ refresh_keys
//!                                  └──▶ fiduciary client┘                                   (per service)
//!                                       wallet client + authenticated ──▶ refresh_address ──▶ refresh_balance
//! ```
//!
//! Every fetch runs under a slot token, so rapid re-triggering of the same
//! edge lets only the fetch started against the current input land. Fetch
//! failures leave the slot unknown and are retried only on the next natural
//! trigger of that edge.

use std::sync::Arc;

use crate::cascade::Slot;
use crate::client::{BitcoinNetwork, ClientFactory, CustodyApi};
use crate::config::ClientConfig;
use crate::session::Identity;

#[derive(Default)]
pub struct WalletState {
    wallet_client: Slot<Arc<dyn CustodyApi>>,
    fiduciary_client: Slot<Arc<dyn CustodyApi>>,
    network: Slot<BitcoinNetwork>,
    wallet_key: Slot<String>,
    fiduciary_key: Slot<String>,
    address: Slot<String>,
    balance: Slot<u64>,
}

impl WalletState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Edge 1: session changed, recreate both clients, then run the edges
    /// that hang off the wallet client.
    pub async fn refresh_clients(
        &self,
        factory: &Arc<dyn ClientFactory>,
        config: &ClientConfig,
        identity: Option<Identity>,
        authenticated: bool,
    ) {
        let wallet_token = self.wallet_client.begin();
        let fiduciary_token = self.fiduciary_client.begin();

        let wallet_ready = match factory.create(&config.wallet_service_id, identity.clone()).await {
            Ok(client) => self.wallet_client.complete(wallet_token, client),
            Err(err) => {
                tracing::warn!(%err, service = "wallet", "client creation failed");
                false
            }
        };
        match factory.create(&config.fiduciary_service_id, identity).await {
            Ok(client) => {
                self.fiduciary_client.complete(fiduciary_token, client);
            }
            Err(err) => tracing::warn!(%err, service = "fiduciary", "client creation failed"),
        }

        if wallet_ready {
            self.refresh_network().await;
            self.refresh_address(authenticated).await;
        }
    }

    /// Edge 2: fetch the network the service is bound to, then the keys.
    pub async fn refresh_network(&self) {
        let token = self.network.begin();
        let Some(client) = self.wallet_client.get() else { return };
        match client.get_network().await {
            Ok(network) => {
                if self.network.complete(token, network) {
                    tracing::debug!(%network, "network refreshed");
                    self.refresh_keys(network).await;
                }
            }
            Err(err) => tracing::warn!(%err, "network fetch failed"),
        }
    }

    /// Edge 3: one key name per (service, network) pair.
    pub async fn refresh_keys(&self, network: BitcoinNetwork) {
        let wallet_token = self.wallet_key.begin();
        if let Some(client) = self.wallet_client.get() {
            match client.get_ecdsa_key_name(network).await {
                Ok(key) => {
                    self.wallet_key.complete(wallet_token, key);
                }
                Err(err) => tracing::warn!(%err, service = "wallet", "key fetch failed"),
            }
        }

        let fiduciary_token = self.fiduciary_key.begin();
        if let Some(client) = self.fiduciary_client.get() {
            match client.get_ecdsa_key_name(network).await {
                Ok(key) => {
                    self.fiduciary_key.complete(fiduciary_token, key);
                }
                Err(err) => tracing::warn!(%err, service = "fiduciary", "key fetch failed"),
            }
        }
    }

    /// Edge 4, first half: the address exists only while authenticated.
    /// Invalidating the address always invalidates the balance with it, so a
    /// balance is never shown against an address it was not fetched for.
    pub async fn refresh_address(&self, authenticated: bool) {
        let token = self.address.begin();
        self.balance.begin();
        if !authenticated {
            return;
        }
        let Some(client) = self.wallet_client.get() else { return };
        match client.get_wallet_address().await {
            Ok(address) => {
                if self.address.complete(token, address) {
                    self.refresh_balance().await;
                }
            }
            Err(err) => tracing::warn!(%err, "address fetch failed"),
        }
    }

    /// Edge 4, second half - also the explicit "refresh balance" action: the
    /// displayed balance resets to unknown before the fetch starts.
    pub async fn refresh_balance(&self) {
        let token = self.balance.begin();
        let Some(address) = self.address.get() else { return };
        let Some(client) = self.wallet_client.get() else { return };
        match client.get_balance(&address).await {
            Ok(sats) => {
                if self.balance.complete(token, sats) {
                    tracing::debug!(sats, "balance refreshed");
                }
            }
            Err(err) => tracing::warn!(%err, "balance fetch failed"),
        }
    }

    pub fn wallet_client(&self) -> Option<Arc<dyn CustodyApi>> {
        self.wallet_client.get()
    }

    pub fn fiduciary_client(&self) -> Option<Arc<dyn CustodyApi>> {
        self.fiduciary_client.get()
    }

    pub fn network(&self) -> Option<BitcoinNetwork> {
        self.network.get()
    }

    pub fn wallet_key(&self) -> Option<String> {
        self.wallet_key.get()
    }

    pub fn fiduciary_key(&self) -> Option<String> {
        self.fiduciary_key.get()
    }

    pub fn address(&self) -> Option<String> {
        self.address.get()
    }

    pub fn balance_sats(&self) -> Option<u64> {
        self.balance.get()
    }
}
