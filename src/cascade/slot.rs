//! Slot - a versioned, replace-on-change value cell.
//!
//! Every fetch in the refresh cascade starts with `begin()`, which clears the
//! value to unknown and returns a token, and ends with `complete(token, v)`,
//! which stores the value only while the token is still current. A fetch
//! superseded by a newer `begin()` can therefore never overwrite the newer
//! reset: last request wins, first-class and testable.

use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchToken(u64);

#[derive(Debug)]
pub struct Slot<T> {
    inner: Mutex<Inner<T>>,
}

#[derive(Debug)]
struct Inner<T> {
    version: u64,
    value: Option<T>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Slot<T> {
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner { version: 0, value: None }) }
    }

    /// Start a new fetch: the value becomes unknown and every earlier token
    /// goes stale.
    pub fn begin(&self) -> FetchToken {
        let mut inner = self.lock();
        inner.version += 1;
        inner.value = None;
        FetchToken(inner.version)
    }

    /// Store the fetch result. Returns false (and drops the value) when a
    /// newer `begin()` has superseded this fetch.
    pub fn complete(&self, token: FetchToken, value: T) -> bool {
        let mut inner = self.lock();
        if token.0 != inner.version {
            return false;
        }
        inner.value = Some(value);
        true
    }

    /// Current version, for observing how often the slot was invalidated.
    pub fn version(&self) -> u64 {
        self.lock().version
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> Slot<T> {
    /// Latest known value, or None while unknown/loading.
    pub fn get(&self) -> Option<T> {
        self.lock().value.clone()
    }
}
