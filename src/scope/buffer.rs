//! Circular sample buffer
//!
//! Fixed-capacity ring of samples with a single write cursor owned by the
//! sampler. Every written sample gets a sequence number (0, 1, 2, ...); the
//! slot of sequence `s` is `s mod N`.
//!
//! Consumers never lock the ring:
//! - the edge detector reads the newest pair right after the sampler signalled
//!   it (flag handshake, see [`crate::scope::tasks`]);
//! - the analyzer keeps its own [`ReadCursor`] and relies on its period being
//!   at least one full buffer-fill interval.

use crate::platform::Sample;

/// Fixed-capacity ring of samples
#[derive(Debug, Clone)]
pub struct CircularBuffer<const N: usize> {
    slots: [Sample; N],
    cursor: usize,
    written: u64,
}

impl<const N: usize> Default for CircularBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> CircularBuffer<N> {
    /// Create a zero-filled ring
    pub const fn new() -> Self {
        Self {
            slots: [0; N],
            cursor: 0,
            written: 0,
        }
    }

    /// Ring capacity
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Write one sample at the cursor and advance it by one slot
    ///
    /// Returns the sequence number of the written sample.
    pub fn push(&mut self, sample: Sample) -> u64 {
        self.slots[self.cursor] = sample;
        self.cursor = (self.cursor + 1) % N;
        let seq = self.written;
        self.written += 1;
        seq
    }

    /// Slot the next sample will be written to
    pub fn write_cursor(&self) -> usize {
        self.cursor
    }

    /// Total number of samples written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Sequence number of the newest sample
    pub fn latest_sequence(&self) -> Option<u64> {
        self.written.checked_sub(1)
    }

    /// Sample with sequence number `seq`, if it has been written and not
    /// yet overwritten
    pub fn get(&self, seq: u64) -> Option<Sample> {
        if seq >= self.written || seq + (N as u64) < self.written {
            return None;
        }
        Some(self.slots[(seq % N as u64) as usize])
    }

    /// The newest sample and the one written before it, as `(prev, curr)`
    ///
    /// `None` until two samples have been written.
    pub fn latest_pair(&self) -> Option<(Sample, Sample)> {
        if self.written < 2 {
            return None;
        }
        let curr = (self.cursor + N - 1) % N;
        let prev = (self.cursor + N - 2) % N;
        Some((self.slots[prev], self.slots[curr]))
    }

    /// Raw slots in storage order
    pub fn slots(&self) -> &[Sample; N] {
        &self.slots
    }

    /// Copy the whole ring into `out`, oldest sample first
    ///
    /// Before the first full lap the unwritten (zero) slots come first.
    pub fn copy_chronological(&self, out: &mut [Sample; N]) {
        let (newer, older) = self.slots.split_at(self.cursor);
        out[..older.len()].copy_from_slice(older);
        out[older.len()..].copy_from_slice(newer);
    }

    /// Copy the ring for a consumer with its own cursor
    ///
    /// Copies the whole ring oldest first and moves `cursor` past the newest
    /// sample. The returned [`WindowRead`] tells how many samples in the window
    /// were new to this consumer and how many were overwritten before it
    /// caught up.
    pub fn read_window(&self, cursor: &mut ReadCursor, out: &mut [Sample; N]) -> WindowRead {
        self.copy_chronological(out);

        let oldest = self.written.saturating_sub(N as u64);
        let first_fresh = cursor.next.max(oldest);
        let read = WindowRead {
            fresh: (self.written - first_fresh.min(self.written)) as usize,
            lapped: oldest.saturating_sub(cursor.next),
        };
        cursor.next = self.written;
        read
    }
}

/// Independent read position of a consumer (next unread sequence number)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadCursor {
    next: u64,
}

impl ReadCursor {
    /// Cursor positioned at the first sample ever written
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    /// Next unread sequence number
    pub fn position(&self) -> u64 {
        self.next
    }
}

/// Outcome of [`CircularBuffer::read_window`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRead {
    /// Samples in the window this consumer had not read before
    pub fresh: usize,
    /// Samples overwritten before this consumer could read them
    pub lapped: u64,
}
