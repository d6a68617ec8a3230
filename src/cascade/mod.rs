//! Dependent refresh cascade.
//!
//! An explicit directed acyclic graph of (input version, async fetch,
//! stale discard) rather than implicit re-render subscriptions. [`Slot`]
//! carries the last-request-wins rule; [`WalletState`] wires the four fixed
//! edges: session → clients → network → keys, and client + authenticated →
//! address → balance.

mod slot;
mod state;

pub use slot::{FetchToken, Slot};
pub use state::WalletState;
