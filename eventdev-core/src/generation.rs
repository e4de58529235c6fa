//! Request generations: decide whether a late response may still be applied.
//!
//! Each load takes a [`Ticket`]. Starting a newer load, or closing the owner,
//! makes every earlier ticket stale. Results carried by a stale ticket are
//! dropped instead of overwriting newer state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Proof of which load a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Ticket dispenser owned by one screen. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct Generations {
    latest: Arc<AtomicU64>,
    closed: Arc<AtomicBool>,
}

impl Generations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load. Every ticket handed out before this one goes stale.
    pub fn begin(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// The owner is gone; nothing may be applied from now on.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        !self.is_closed() && self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_ticket_is_current() {
        let generations = Generations::new();
        let first = generations.begin();
        assert!(generations.is_current(&first));

        let second = generations.begin();
        assert!(!generations.is_current(&first));
        assert!(generations.is_current(&second));
    }

    #[test]
    fn test_close_invalidates_everything() {
        let generations = Generations::new();
        let ticket = generations.begin();
        generations.close();
        assert!(generations.is_closed());
        assert!(!generations.is_current(&ticket));
        assert!(!generations.is_current(&generations.begin()));
    }

    #[test]
    fn test_clones_share_state() {
        let generations = Generations::new();
        let handle = generations.clone();
        let ticket = generations.begin();
        handle.begin();
        assert!(!generations.is_current(&ticket));
    }
}
