//! Session manager - identity provider lifecycle.
//!
//! One session root per running client. The provider handle is a
//! single-owner, replace-on-change resource: login flips the state, but
//! logout always discards the handle and creates a fresh one. Flipping the
//! authenticated flag alone leaves the provider unable to complete the next
//! login, so the recreation must stay even though it looks redundant.
//!
//! Every handle replacement bumps the session epoch; the refresh cascade
//! keys client recreation off that epoch.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// Opaque identity handle delivered by the provider after login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    principal: String,
}

impl Identity {
    pub fn new(principal: impl Into<String>) -> Self {
        Self { principal: principal.into() }
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }
}

/// Fired by the provider when the user has been idle past the threshold.
pub type IdleCallback = Arc<dyn Fn() + Send + Sync>;

/// Options passed once per handle creation. The callback is registered for
/// the lifetime of that handle only.
pub struct IdleOptions {
    pub idle_timeout: Duration,
    pub on_idle: IdleCallback,
}

/// One provider handle. Restores persisted authentication state on creation.
#[async_trait]
pub trait AuthHandle: Send + Sync {
    async fn is_authenticated(&self) -> bool;
    /// Delegates to the provider's redirect/popup flow against `endpoint`.
    /// Returning Ok means the provider invoked its success path.
    async fn login(&self, endpoint: &str) -> Result<()>;
    async fn logout(&self) -> Result<()>;
    fn identity(&self) -> Option<Identity>;
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn create(&self, options: IdleOptions) -> Result<Arc<dyn AuthHandle>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Initializing,
    Unauthenticated,
    Authenticated,
}

pub struct SessionManager {
    provider: Arc<dyn AuthProvider>,
    identity_endpoint: String,
    idle_timeout: Duration,
    on_idle: IdleCallback,
    handle: Option<Arc<dyn AuthHandle>>,
    state: SessionState,
    epoch: u64,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn AuthProvider>, config: &ClientConfig, on_idle: IdleCallback) -> Self {
        Self {
            provider,
            identity_endpoint: config.identity_endpoint(),
            idle_timeout: config.idle_timeout,
            on_idle,
            handle: None,
            state: SessionState::Initializing,
            epoch: 0,
        }
    }

    /// Create/restore the provider handle and read its persisted flag.
    pub async fn init(&mut self) {
        self.refresh_handle().await;
    }

    /// Discard the current handle (if any) and create a fresh one, reading
    /// the persisted authentication flag from it. Creation failure downgrades
    /// to Unauthenticated and is not retried.
    async fn refresh_handle(&mut self) {
        let options = IdleOptions { idle_timeout: self.idle_timeout, on_idle: self.on_idle.clone() };
        match self.provider.create(options).await {
            Ok(handle) => {
                let authenticated = handle.is_authenticated().await;
                self.state = if authenticated {
                    SessionState::Authenticated
                } else {
                    SessionState::Unauthenticated
                };
                self.handle = Some(handle);
                tracing::info!(authenticated, "session handle created");
            }
            Err(err) => {
                tracing::error!(%err, "session handle creation failed");
                self.handle = None;
                self.state = SessionState::Unauthenticated;
            }
        }
        self.epoch += 1;
    }

    pub async fn login(&mut self) -> Result<()> {
        let handle = self
            .handle
            .as_ref()
            .ok_or_else(|| Error::Auth("no session handle".into()))?;
        handle.login(&self.identity_endpoint).await?;
        self.state = SessionState::Authenticated;
        tracing::info!("login succeeded");
        Ok(())
    }

    /// Provider logout followed by a full handle recreation (see module doc).
    pub async fn logout(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.logout().await {
                tracing::warn!(%err, "provider logout failed");
            }
        }
        self.refresh_handle().await;
        tracing::info!("logged out, session handle recreated");
    }

    /// Idle threshold fired. Only an authenticated session reacts.
    pub async fn on_idle(&mut self) {
        if self.state == SessionState::Authenticated {
            tracing::info!("idle timeout, forcing logout");
            self.logout().await;
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    pub fn identity(&self) -> Option<Identity> {
        self.handle.as_ref().and_then(|h| h.identity())
    }

    /// Bumped on every handle replacement, including failed creations.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn handle(&self) -> Option<Arc<dyn AuthHandle>> {
        self.handle.clone()
    }
}
