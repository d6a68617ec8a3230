//! Custody wallet client core.
//!
//! The non-presentational half of a browser wallet backed by a remote
//! custody service: session lifecycle, client derivation, the dependent
//! refresh cascade, the bounded amount input, and the send flow. Rendering
//! and the custody service itself are external collaborators.
//!
//! # Architecture
//!
//! ```text
//! Wallet (orchestrator)
//!   │
//!   ├── SessionManager ── AuthProvider / AuthHandle (identity provider)
//!   │     └── epoch bump on every handle replacement
//!   │
//!   ├── WalletState (refresh cascade over versioned Slots)
//!   │     session ⇒ RemoteClients ⇒ network ⇒ key names
//!   │     client + authenticated ⇒ address ⇒ balance
//!   │
//!   ├── NumberField (amount input: pattern + clamp admission)
//!   │
//!   └── SendFlow (Idle → Confirming → Sending → Settled)
//! ```
//!
//! # Concurrency
//!
//! Cooperative async; no in-place mutation of shared values. Session handle,
//! clients, and every cascade value are swapped whole. In-flight fetches are
//! never cancelled; a stale fetch is discarded by its slot token when a newer
//! trigger has superseded it.

pub mod cascade;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod numeric;
pub mod send;
pub mod session;
pub mod wallet;

pub use cascade::{FetchToken, Slot, WalletState};
pub use client::{
    Agent, BitcoinNetwork, ClientFactory, CustodyApi, HttpClientFactory, RemoteClient, SendArgs,
};
pub use config::{ClientConfig, DeployMode};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use numeric::{InputOutcome, Key, NumberField, NumberPattern, SignShape};
pub use send::{SendFlow, SendOutcome, SendPhase};
pub use session::{
    AuthHandle, AuthProvider, Identity, IdleCallback, IdleOptions, SessionManager, SessionState,
};
pub use wallet::{format_btc, Wallet};
