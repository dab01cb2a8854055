//! CycleState - per-dispatch bookkeeping
//!
//! Tracks which handlers have started (`pending`) and finished (`handled`)
//! within the current cycle, plus the in-progress flag guarding re-entrancy.
//! Both sets are cleared when a cycle begins, so every registered token
//! starts the cycle neither pending nor handled. By construction
//! `handled` is a subset of `pending`.

use std::collections::HashSet;

use contracts::Token;

/// Bookkeeping for one dispatch cycle.
#[derive(Debug, Default)]
pub struct CycleState {
    pending: HashSet<Token>,
    handled: HashSet<Token>,
    in_progress: bool,
}

impl CycleState {
    /// Create idle state with no cycle in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a dispatch cycle is currently active.
    #[inline]
    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    /// Whether the handler for `token` has started in this cycle.
    #[inline]
    pub fn is_pending(&self, token: Token) -> bool {
        self.pending.contains(&token)
    }

    /// Whether the handler for `token` has finished in this cycle.
    #[inline]
    pub fn is_handled(&self, token: Token) -> bool {
        self.handled.contains(&token)
    }

    /// Reset per-cycle flags and mark the cycle active.
    pub fn begin(&mut self) {
        self.pending.clear();
        self.handled.clear();
        self.in_progress = true;
    }

    /// Mark the cycle complete.
    pub fn finish(&mut self) {
        self.in_progress = false;
    }

    /// Record that the handler for `token` has started.
    pub fn mark_pending(&mut self, token: Token) {
        self.pending.insert(token);
    }

    /// Record that the handler for `token` has finished.
    pub fn mark_handled(&mut self, token: Token) {
        self.handled.insert(token);
    }
}
