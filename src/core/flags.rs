//! Event flag group
//!
//! A minimal semaphore-like handshake primitive: named bits are raised by one
//! task and awaited (then cleared) by another. Waiting never spins; a task whose
//! wait is not satisfied reports [`TaskOutcome::Blocked`] to the scheduler and is
//! retried after another task has run.
//!
//! The group also keeps a short history of raised bits so execution traces can
//! be inspected (oldest first).
//!
//! [`TaskOutcome::Blocked`]: crate::core::scheduler::TaskOutcome::Blocked

use bitflags::Flags;
use heapless::HistoryBuf;

/// Number of raised-bit events retained in the signal history
pub const SIGNAL_HISTORY_LEN: usize = 32;

/// A set of event flags over a `bitflags` type
pub struct EventFlagGroup<F: Flags + Copy> {
    bits: F,
    signals: HistoryBuf<F, SIGNAL_HISTORY_LEN>,
}

impl<F: Flags + Copy> EventFlagGroup<F> {
    /// Create a group with the given bits already raised
    ///
    /// Initial bits are not recorded in the signal history.
    pub fn new(initial: F) -> Self {
        Self {
            bits: initial,
            signals: HistoryBuf::new(),
        }
    }

    /// Raise `bits`
    ///
    /// The bits are visible to the next wait as soon as this returns.
    pub fn set(&mut self, bits: F) {
        self.bits.insert(bits);
        self.signals.write(bits);
    }

    /// Lower `bits` without recording a signal
    pub fn clear(&mut self, bits: F) {
        self.bits.remove(bits);
    }

    /// Lower every bit and forget the signal history
    pub fn reset(&mut self) {
        self.bits = F::empty();
        self.signals.clear();
    }

    /// Return true if all of `bits` are currently raised
    pub fn is_set(&self, bits: F) -> bool {
        self.bits.contains(bits)
    }

    /// Currently raised bits
    pub fn bits(&self) -> F {
        self.bits
    }

    /// Wait for any of `mask` (OR mode) and clear the matched bits
    ///
    /// Returns the matched bits, or `None` if none of them are raised, in
    /// which case nothing is modified.
    pub fn try_wait_any_clear(&mut self, mask: F) -> Option<F> {
        if !self.bits.intersects(mask) {
            return None;
        }
        let matched = F::from_bits_retain(self.bits.bits() & mask.bits());
        self.bits.remove(matched);
        Some(matched)
    }

    /// Iterate over recently raised bits, oldest first
    pub fn signals(&self) -> impl Iterator<Item = &F> {
        self.signals.oldest_ordered()
    }
}
