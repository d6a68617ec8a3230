//! Wallet - the top-level orchestrator.
//!
//! Owns the single session root, the client factory, the refresh cascade
//! state, the send flow, and the amount field. Every session transition
//! (init, login, logout, idle) funnels through [`Wallet::after_session_change`],
//! which runs edge 1 of the cascade against the new identity.

use std::ops::Range;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{mpsc, Mutex as AsyncMutex};

use crate::cascade::WalletState;
use crate::client::{BitcoinNetwork, ClientFactory, CustodyApi};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::numeric::{InputOutcome, Key, NumberField};
use crate::send::{SendFlow, SendOutcome, SendPhase};
use crate::session::{AuthProvider, SessionManager, SessionState};

pub struct Wallet {
    config: ClientConfig,
    factory: Arc<dyn ClientFactory>,
    session: AsyncMutex<SessionManager>,
    state: WalletState,
    send: Mutex<SendFlow>,
    amount: Mutex<NumberField>,
    idle_rx: AsyncMutex<mpsc::UnboundedReceiver<()>>,
}

impl Wallet {
    pub fn new(
        config: ClientConfig,
        provider: Arc<dyn AuthProvider>,
        factory: Arc<dyn ClientFactory>,
    ) -> Arc<Self> {
        let (idle_tx, idle_rx) = mpsc::unbounded_channel();
        let on_idle = Arc::new(move || {
            let _ = idle_tx.send(());
        });
        let session = SessionManager::new(provider, &config, on_idle);
        Arc::new(Self {
            config,
            factory,
            session: AsyncMutex::new(session),
            state: WalletState::new(),
            send: Mutex::new(SendFlow::new()),
            amount: Mutex::new(NumberField::satoshis()),
            idle_rx: AsyncMutex::new(idle_rx),
        })
    }

    /// Create/restore the session and run the cascade once.
    pub async fn init(&self) {
        self.session.lock().await.init().await;
        self.after_session_change().await;
    }

    pub async fn login(&self) -> Result<()> {
        self.session.lock().await.login().await?;
        self.after_session_change().await;
        Ok(())
    }

    pub async fn logout(&self) {
        self.session.lock().await.logout().await;
        self.after_session_change().await;
    }

    /// Apply one idle signal from the provider.
    pub async fn handle_idle(&self) {
        let changed = {
            let mut session = self.session.lock().await;
            let before = session.epoch();
            session.on_idle().await;
            session.epoch() != before
        };
        if changed {
            self.after_session_change().await;
        }
    }

    /// Forward provider idle signals to [`Wallet::handle_idle`] until the
    /// sender side is dropped.
    pub async fn run_idle_watch(&self) {
        loop {
            let signal = self.idle_rx.lock().await.recv().await;
            if signal.is_none() {
                return;
            }
            self.handle_idle().await;
        }
    }

    /// Edge 1: recreate clients against the current session.
    async fn after_session_change(&self) {
        let (identity, authenticated) = {
            let session = self.session.lock().await;
            (session.identity(), session.is_authenticated())
        };
        self.state
            .refresh_clients(&self.factory, &self.config, identity, authenticated)
            .await;
    }

    /// Explicit user refresh: balance back to unknown, then re-fetched for
    /// the current address.
    pub async fn refresh_balance(&self) {
        self.state.refresh_balance().await;
    }

    // Amount field. Committed values (canonical text) flow into the send
    // request; intermediate text does not.

    pub fn amount_key_down(&self, selection: Range<usize>, key: Key) -> InputOutcome {
        let outcome = self.lock_amount().key_down(selection, key);
        self.sync_amount(&outcome);
        outcome
    }

    pub fn amount_paste(&self, selection: Range<usize>, pasted: &str) -> InputOutcome {
        let outcome = self.lock_amount().paste(selection, pasted);
        self.sync_amount(&outcome);
        outcome
    }

    pub fn amount_commit(&self) -> u64 {
        let value = self.lock_amount().commit();
        let sats = value as u64;
        self.lock_send().set_amount_sats(sats);
        sats
    }

    pub fn amount_text(&self) -> String {
        self.lock_amount().text().to_string()
    }

    fn sync_amount(&self, outcome: &InputOutcome) {
        if let InputOutcome::Accepted { committed: Some(value) } = outcome {
            self.lock_send().set_amount_sats(*value as u64);
        }
    }

    // Send flow.

    pub fn set_destination(&self, destination: &str) {
        self.lock_send().set_destination(destination);
    }

    pub fn can_confirm(&self) -> bool {
        self.lock_send().can_confirm()
    }

    pub fn open_confirmation(&self) -> bool {
        self.lock_send().open_confirmation()
    }

    pub fn close_confirmation(&self) {
        self.lock_send().close_confirmation();
    }

    /// Confirm the pending request: exactly one send call, settled with the
    /// transaction id or the rejection message verbatim. Success refreshes
    /// the balance for the current address.
    pub async fn submit_send(&self) -> Option<SendOutcome> {
        let client: Arc<dyn CustodyApi> = self.state.wallet_client()?;
        let args = self.lock_send().begin_send()?;
        tracing::info!(
            destination = %args.destination_address,
            sats = args.amount_in_satoshi,
            "submitting send"
        );
        let outcome = match client.wallet_send(&args).await {
            Ok(txid) => SendOutcome::success(txid),
            Err(err) => SendOutcome::failure(err.to_string()),
        };
        self.lock_send().settle(outcome.clone());
        if outcome.succeeded {
            self.state.refresh_balance().await;
        } else {
            tracing::warn!(message = %outcome.message, "send failed");
        }
        Some(outcome)
    }

    pub fn dismiss_outcome(&self) {
        self.lock_send().dismiss();
    }

    pub fn send_phase(&self) -> SendPhase {
        self.lock_send().phase()
    }

    pub fn send_outcome(&self) -> Option<SendOutcome> {
        self.lock_send().outcome().cloned()
    }

    // Displayed values.

    pub fn network(&self) -> Option<BitcoinNetwork> {
        self.state.network()
    }

    pub fn wallet_key(&self) -> Option<String> {
        self.state.wallet_key()
    }

    pub fn fiduciary_key(&self) -> Option<String> {
        self.state.fiduciary_key()
    }

    pub fn address(&self) -> Option<String> {
        self.state.address()
    }

    pub fn balance_sats(&self) -> Option<u64> {
        self.state.balance_sats()
    }

    pub async fn session_state(&self) -> SessionState {
        self.session.lock().await.state()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.lock().await.is_authenticated()
    }

    pub async fn session_epoch(&self) -> u64 {
        self.session.lock().await.epoch()
    }

    pub fn cascade(&self) -> &WalletState {
        &self.state
    }

    fn lock_send(&self) -> std::sync::MutexGuard<'_, SendFlow> {
        self.send.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_amount(&self) -> std::sync::MutexGuard<'_, NumberField> {
        self.amount.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Display conversion for integer satoshis, 8 decimal places.
pub fn format_btc(sats: u64) -> String {
    format!("{}.{:08}", sats / 100_000_000, sats % 100_000_000)
}
