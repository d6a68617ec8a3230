//! Transaction submission flow.
//!
//! `Idle -> Confirming -> Sending -> Settled -> Idle`. At most one send is in
//! flight: the confirm action is unavailable while Sending. Settlement keeps
//! the outcome around until the next field edit or an explicit dismissal.
//! The flow owns the submit-enable policy (non-empty destination, at least
//! one satoshi); the numeric engine only keeps the text well-formed.

use crate::client::SendArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendPhase {
    #[default]
    Idle,
    Confirming,
    Sending,
    Settled,
}

/// Either a transaction id or an error description, verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub succeeded: bool,
    pub message: String,
}

impl SendOutcome {
    pub fn success(txid: impl Into<String>) -> Self {
        Self { succeeded: true, message: txid.into() }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { succeeded: false, message: message.into() }
    }
}

#[derive(Debug, Default)]
pub struct SendFlow {
    phase: SendPhase,
    destination: String,
    amount_sats: u64,
    outcome: Option<SendOutcome>,
}

impl SendFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field edits fold a settled flow back to idle and clear the outcome.
    pub fn set_destination(&mut self, destination: impl Into<String>) {
        self.reset_settled();
        self.destination = destination.into();
    }

    pub fn set_amount_sats(&mut self, sats: u64) {
        self.reset_settled();
        self.amount_sats = sats;
    }

    fn reset_settled(&mut self) {
        if self.phase == SendPhase::Settled {
            self.phase = SendPhase::Idle;
            self.outcome = None;
        }
    }

    /// Guard for both the confirmation view and the confirm button.
    pub fn can_confirm(&self) -> bool {
        !self.destination.is_empty() && self.amount_sats >= 1 && self.phase != SendPhase::Sending
    }

    /// Idle -> Confirming. Starting a new request clears the old outcome.
    pub fn open_confirmation(&mut self) -> bool {
        self.reset_settled();
        if !self.can_confirm() {
            return false;
        }
        self.phase = SendPhase::Confirming;
        self.outcome = None;
        true
    }

    /// Close the confirmation view without sending.
    pub fn close_confirmation(&mut self) {
        if self.phase == SendPhase::Confirming {
            self.phase = SendPhase::Idle;
        }
    }

    /// Confirming -> Sending. Returns the wire arguments for the single send
    /// call, or None when the transition is not allowed.
    pub fn begin_send(&mut self) -> Option<SendArgs> {
        if self.phase != SendPhase::Confirming || !self.can_confirm() {
            return None;
        }
        self.phase = SendPhase::Sending;
        self.outcome = None;
        Some(SendArgs {
            destination_address: self.destination.clone(),
            amount_in_satoshi: self.amount_sats,
        })
    }

    /// Sending -> Settled.
    pub fn settle(&mut self, outcome: SendOutcome) {
        if self.phase == SendPhase::Sending {
            self.phase = SendPhase::Settled;
            self.outcome = Some(outcome);
        }
    }

    /// Settled -> Idle on outcome dismissal.
    pub fn dismiss(&mut self) {
        if self.phase == SendPhase::Settled {
            self.phase = SendPhase::Idle;
            self.outcome = None;
        }
    }

    pub fn phase(&self) -> SendPhase {
        self.phase
    }

    pub fn is_sending(&self) -> bool {
        self.phase == SendPhase::Sending
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn amount_sats(&self) -> u64 {
        self.amount_sats
    }

    pub fn outcome(&self) -> Option<&SendOutcome> {
        self.outcome.as_ref()
    }
}
