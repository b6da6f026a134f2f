//! Core types for the cyclic scheduler
//!
//! This module defines the fundamental types used by the scheduler:
//! - Task metadata (static configuration: name, priority, release pattern)
//! - Task handles and run outcomes
//! - Per-task dispatch state

/// Scheduler time unit (one clock tick)
pub type Ticks = u64;

/// How a task gets released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Release {
    /// Released by the clock whenever `(now - phase) mod period == 0`
    Periodic {
        /// Offset of the first release
        phase: Ticks,
        /// Distance between releases (must be positive)
        period: Ticks,
    },
    /// Never released by the clock; only an out-of-band resume wakes it
    Sporadic,
}

impl Release {
    /// Shorthand for a periodic release
    pub const fn periodic(phase: Ticks, period: Ticks) -> Self {
        Release::Periodic { phase, period }
    }

    /// Check whether the clock releases the task at `now`
    ///
    /// A zero period never releases.
    #[inline]
    pub fn is_due(&self, now: Ticks) -> bool {
        match *self {
            Release::Periodic { phase, period } => {
                period > 0 && now >= phase && (now - phase) % period == 0
            }
            Release::Sporadic => false,
        }
    }
}

/// Task metadata registered at start-up
///
/// Each task in the scheduler has associated metadata that defines its
/// release pattern and dispatch order.
#[derive(Debug, Clone, Copy)]
pub struct TaskMetadata {
    /// Human-readable task name for logging and debugging
    pub name: &'static str,

    /// Priority (higher = more important)
    ///
    /// Within a tick, ready tasks run in descending priority order; ties are
    /// broken by registration order.
    pub priority: u8,

    /// Release pattern
    pub release: Release,
}

/// Handle of a registered task (index into the registry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskHandle(pub(crate) usize);

impl TaskHandle {
    /// Registry index of this task
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Result of running a task body once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskOutcome {
    /// The body reached its suspension point; the next release starts it
    /// again from the top
    Suspended,
    /// The body is waiting on a flag or channel and made no changes
    ///
    /// The scheduler retries it after some other task has completed.
    Blocked,
}

/// Dispatch state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskState {
    /// Suspended, waiting for its next release
    Idle,
    /// Released, waiting to be dispatched
    Ready,
    /// Released but waiting on a flag or channel
    ///
    /// `epoch` is the scheduler progress counter at the time it blocked.
    Blocked {
        /// Completed-run counter value when the task blocked
        epoch: u32,
    },
}

impl TaskState {
    /// True while a release is outstanding (ready or blocked)
    #[inline]
    pub const fn is_active(&self) -> bool {
        !matches!(self, TaskState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periodic_release_with_phase() {
        let release = Release::periodic(1, 4);

        assert!(!release.is_due(0));
        assert!(release.is_due(1));
        assert!(!release.is_due(2));
        assert!(release.is_due(5));
        assert!(release.is_due(9));
    }

    #[test]
    fn test_periodic_release_large_phase() {
        let release = Release::periodic(650, 50);

        assert!(!release.is_due(0));
        assert!(!release.is_due(600));
        assert!(release.is_due(650));
        assert!(release.is_due(700));
        assert!(!release.is_due(675));
    }

    #[test]
    fn test_zero_period_never_due() {
        let release = Release::periodic(0, 0);
        assert!(!release.is_due(0));
        assert!(!release.is_due(10));
    }

    #[test]
    fn test_sporadic_never_due() {
        let release = Release::Sporadic;
        assert!((0..1000).all(|t| !release.is_due(t)));
    }

    #[test]
    fn test_task_state_active() {
        assert!(!TaskState::Idle.is_active());
        assert!(TaskState::Ready.is_active());
        assert!(TaskState::Blocked { epoch: 3 }.is_active());
    }
}
