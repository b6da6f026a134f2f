//! Trigger edge detection and the snapshot hand-off
//!
//! The edge detector compares the newest sample with the one before it against
//! a fixed threshold. On a crossing of an armed polarity, a full copy of the
//! sample ring is offered to the trigger renderer through a one-slot channel.
//!
//! The channel is lossy: if the previous snapshot has not been rendered yet,
//! the new one is dropped and counted. The renderer always gets the oldest
//! undelivered detection.

use bitflags::bitflags;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::{Channel, TrySendError};

use crate::platform::Sample;

/// Edge polarity selected by the `tlevel` commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Low-to-high crossing
    Rising,
    /// High-to-low crossing
    Falling,
}

impl Polarity {
    /// Edge mask armed by this polarity
    pub const fn edges(self) -> EdgeMask {
        match self {
            Polarity::Rising => EdgeMask::RISING,
            Polarity::Falling => EdgeMask::FALLING,
        }
    }

    /// Name for logging
    pub const fn name(self) -> &'static str {
        match self {
            Polarity::Rising => "rise",
            Polarity::Falling => "fall",
        }
    }
}

bitflags! {
    /// Armed edge kinds (the "trigger high" / "trigger low" flags)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EdgeMask: u8 {
        /// Fire on low-to-high crossings
        const RISING = 0b0000_0001;
        /// Fire on high-to-low crossings
        const FALLING = 0b0000_0010;
    }
}

/// Detected edge kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// `prev < threshold < curr`
    Rising,
    /// `prev > threshold > curr`
    Falling,
}

/// Classify the step from `prev` to `curr` against `threshold`
///
/// Comparisons are strict: touching the threshold is not a crossing.
pub fn crossing(prev: Sample, curr: Sample, threshold: Sample) -> Option<Edge> {
    if prev < threshold && curr > threshold {
        Some(Edge::Rising)
    } else if prev > threshold && curr < threshold {
        Some(Edge::Falling)
    } else {
        None
    }
}

/// Trigger settings consulted by the edge detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerSettings {
    /// Whether the trigger is armed at all
    pub armed: bool,
    /// Armed edge kinds
    pub edges: EdgeMask,
    /// Crossing threshold
    pub threshold: Sample,
}

impl TriggerSettings {
    /// Disarmed trigger with the given polarity and threshold
    pub const fn new(polarity: Polarity, threshold: Sample) -> Self {
        Self {
            armed: false,
            edges: polarity.edges(),
            threshold,
        }
    }

    /// Return true iff `prev -> curr` crosses the threshold in an armed
    /// direction; always false while disarmed
    pub fn detect(&self, prev: Sample, curr: Sample) -> bool {
        if !self.armed {
            return false;
        }
        match crossing(prev, curr, self.threshold) {
            Some(Edge::Rising) => self.edges.contains(EdgeMask::RISING),
            Some(Edge::Falling) => self.edges.contains(EdgeMask::FALLING),
            None => false,
        }
    }
}

/// Copy of the sample ring taken when an edge fired
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<const N: usize> {
    /// Ring contents, oldest first; the triggering sample is the last one
    pub samples: [Sample; N],
    /// Sequence number of the triggering sample
    pub sequence: u64,
}

/// Single-slot, drop-on-busy hand-off from the edge detector to the renderer
pub struct SnapshotChannel<const N: usize> {
    slot: Channel<NoopRawMutex, Snapshot<N>, 1>,
    delivered: u32,
    dropped: u32,
}

impl<const N: usize> Default for SnapshotChannel<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SnapshotChannel<N> {
    /// Create an empty channel
    pub const fn new() -> Self {
        Self {
            slot: Channel::new(),
            delivered: 0,
            dropped: 0,
        }
    }

    /// Offer a snapshot without blocking
    ///
    /// Returns false (and drops the snapshot) if one is already in flight.
    pub fn offer(&mut self, snapshot: Snapshot<N>) -> bool {
        match self.slot.try_send(snapshot) {
            Ok(()) => {
                self.delivered = self.delivered.saturating_add(1);
                true
            }
            Err(TrySendError::Full(_rejected)) => {
                self.dropped = self.dropped.saturating_add(1);
                crate::log_trace!(
                    "Snapshot of sample {} dropped: previous one not rendered",
                    _rejected.sequence
                );
                false
            }
        }
    }

    /// Take the snapshot in flight, if any
    pub fn take(&mut self) -> Option<Snapshot<N>> {
        self.slot.try_receive().ok()
    }

    /// True if a snapshot is waiting to be rendered
    pub fn is_occupied(&self) -> bool {
        self.slot.is_full()
    }

    /// Snapshots accepted so far
    pub fn delivered(&self) -> u32 {
        self.delivered
    }

    /// Snapshots dropped because the slot was occupied
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}
