//! Operation-scoped completion barrier.
//!
//! Every operation owns one `CompletionBarrier`. Targets report into it as
//! they are moved, classified (immovable or bound) and settled. The barrier
//! signals completion exactly once, when every moved target has been
//! classified and every bound target has settled, whatever the order in
//! which those reports arrive.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Handle identifying one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OperationId(pub u64);

impl OperationId {
    /// Generate a new unique operation handle.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a bound target's wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Settlement {
    /// The transition-end event arrived.
    Finished,
    /// A newer move on the same target replaced this wait.
    Superseded,
}

/// Counters for one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionBarrier {
    moved: usize,
    immovable: usize,
    bound: usize,
    settled: usize,
    superseded: usize,
    signaled: bool,
}

impl CompletionBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_moved(&mut self) {
        self.moved += 1;
    }

    /// Record a target that will not fire a completion event.
    ///
    /// Returns `true` if this report completes the operation.
    pub fn record_immovable(&mut self) -> bool {
        self.immovable += 1;
        self.try_signal()
    }

    pub fn record_bound(&mut self) {
        self.bound += 1;
    }

    /// Record the end of a bound target's wait.
    ///
    /// Returns `true` if this report completes the operation.
    pub fn record_settled(&mut self, settlement: Settlement) -> bool {
        match settlement {
            Settlement::Finished => self.settled += 1,
            Settlement::Superseded => self.superseded += 1,
        }
        self.try_signal()
    }

    /// Every moved target is classified and every bound target has settled.
    pub fn is_satisfied(&self) -> bool {
        self.immovable + self.bound == self.moved && self.settled + self.superseded >= self.bound
    }

    pub fn is_signaled(&self) -> bool {
        self.signaled
    }

    /// Signal an operation that moved nothing. Returns `true` at most once.
    pub fn signal_if_idle(&mut self) -> bool {
        self.moved == 0 && self.try_signal()
    }

    fn try_signal(&mut self) -> bool {
        if self.signaled || !self.is_satisfied() {
            return false;
        }
        self.signaled = true;
        true
    }

    pub fn moved(&self) -> usize {
        self.moved
    }

    pub fn immovable(&self) -> usize {
        self.immovable
    }

    pub fn bound(&self) -> usize {
        self.bound
    }

    pub fn settled(&self) -> usize {
        self.settled
    }

    pub fn superseded(&self) -> usize {
        self.superseded
    }
}
