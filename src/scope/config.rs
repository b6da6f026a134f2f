//! Scope configuration
//!
//! Task timing, trigger threshold and trigger-level policy. Times are in
//! scheduler ticks (one tick = 1 ms on the reference board).
//!
//! # Defaults
//!
//! | Task             | Phase | Period   | Priority |
//! |------------------|-------|----------|----------|
//! | sampler          | 0     | 4        | 22       |
//! | edge detector    | 1     | 4        | 21       |
//! | time renderer    | 0     | 250      | 18       |
//! | analyzer         | 0     | 1000     | 17       |
//! | PDS renderer     | 140   | 1000     | 16       |
//! | trigger renderer | -     | sporadic | 16       |
//! | command decoder  | 600   | 50       | 11       |
//! | state machine    | 650   | 50       | 10       |

use crate::core::scheduler::{Release, Ticks};
use crate::platform::Sample;

use super::error::ConfigError;
use super::mode::LevelPolicy;
use super::trigger::Polarity;

/// Sample ring capacity (time-domain length)
pub const TIME_DOMAIN_LENGTH: usize = 64;

/// Spectrum length (half the time-domain length)
pub const PDS_LENGTH: usize = TIME_DOMAIN_LENGTH / 2;

/// Maximum number of characters in a command line (terminator excluded)
pub const LINE_CAPACITY: usize = 14;

/// Default edge-detection threshold
pub const DEFAULT_THRESHOLD: Sample = 188;

/// Tasks of the scope, in registration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScopeTask {
    /// Reads one sample per release into the ring
    Sampler,
    /// Checks the newest samples for a trigger crossing
    EdgeDetector,
    /// Computes the spectrum of the ring
    Analyzer,
    /// Plots the live time-domain trace
    TimeRenderer,
    /// Plots the spectrum
    PdsRenderer,
    /// Plots the trigger snapshot (woken by the edge detector)
    TriggerRenderer,
    /// Decodes completed command lines
    CommandDecoder,
    /// Applies decoded commands to the mode
    StateMachine,
}

impl ScopeTask {
    /// Every task, in registration order
    pub const ALL: [ScopeTask; 8] = [
        ScopeTask::Sampler,
        ScopeTask::EdgeDetector,
        ScopeTask::Analyzer,
        ScopeTask::TimeRenderer,
        ScopeTask::PdsRenderer,
        ScopeTask::TriggerRenderer,
        ScopeTask::CommandDecoder,
        ScopeTask::StateMachine,
    ];

    /// Task name used in the scheduler and in logs
    pub const fn name(self) -> &'static str {
        match self {
            ScopeTask::Sampler => "sampler",
            ScopeTask::EdgeDetector => "edge_detector",
            ScopeTask::Analyzer => "analyzer",
            ScopeTask::TimeRenderer => "time_renderer",
            ScopeTask::PdsRenderer => "pds_renderer",
            ScopeTask::TriggerRenderer => "trigger_renderer",
            ScopeTask::CommandDecoder => "command_decoder",
            ScopeTask::StateMachine => "state_machine",
        }
    }

    /// Registry index of the task
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Task registered at `index`
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Release pattern and priority of one task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTiming {
    /// Dispatch priority (higher = more important)
    pub priority: u8,
    /// Release pattern
    pub release: Release,
}

impl TaskTiming {
    /// Periodic task timing
    pub const fn periodic(priority: u8, phase: Ticks, period: Ticks) -> Self {
        Self {
            priority,
            release: Release::periodic(phase, period),
        }
    }

    /// Timing of a task released only out of band
    pub const fn sporadic(priority: u8) -> Self {
        Self {
            priority,
            release: Release::Sporadic,
        }
    }

    fn period(&self) -> Option<Ticks> {
        match self.release {
            Release::Periodic { period, .. } => Some(period),
            Release::Sporadic => None,
        }
    }
}

/// Complete scope configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeConfig {
    /// Sampler timing
    pub sampler: TaskTiming,
    /// Edge detector timing
    pub edge_detector: TaskTiming,
    /// Analyzer timing
    pub analyzer: TaskTiming,
    /// Time renderer timing
    pub time_renderer: TaskTiming,
    /// PDS renderer timing
    pub pds_renderer: TaskTiming,
    /// Trigger renderer timing (normally sporadic)
    pub trigger_renderer: TaskTiming,
    /// Command decoder timing
    pub command_decoder: TaskTiming,
    /// State machine timing
    pub state_machine: TaskTiming,
    /// Edge-detection threshold
    pub threshold: Sample,
    /// Handling of the `tlevel fall` command
    pub level_policy: LevelPolicy,
    /// Polarity armed at start-up
    pub initial_polarity: Polarity,
}

impl ScopeConfig {
    /// Reference board configuration
    pub const DEFAULT: Self = Self {
        sampler: TaskTiming::periodic(22, 0, 4),
        edge_detector: TaskTiming::periodic(21, 1, 4),
        analyzer: TaskTiming::periodic(17, 0, 1000),
        time_renderer: TaskTiming::periodic(18, 0, 250),
        pds_renderer: TaskTiming::periodic(16, 140, 1000),
        trigger_renderer: TaskTiming::sporadic(16),
        command_decoder: TaskTiming::periodic(11, 600, 50),
        state_machine: TaskTiming::periodic(10, 650, 50),
        threshold: DEFAULT_THRESHOLD,
        level_policy: LevelPolicy::Corrected,
        initial_polarity: Polarity::Falling,
    };

    /// Timing of `task`
    pub const fn timing(&self, task: ScopeTask) -> TaskTiming {
        match task {
            ScopeTask::Sampler => self.sampler,
            ScopeTask::EdgeDetector => self.edge_detector,
            ScopeTask::Analyzer => self.analyzer,
            ScopeTask::TimeRenderer => self.time_renderer,
            ScopeTask::PdsRenderer => self.pds_renderer,
            ScopeTask::TriggerRenderer => self.trigger_renderer,
            ScopeTask::CommandDecoder => self.command_decoder,
            ScopeTask::StateMachine => self.state_machine,
        }
    }

    /// Validate the configuration for a ring of `N` samples
    ///
    /// # Returns
    ///
    /// Ok if the configuration can be scheduled. An analyzer period shorter
    /// than one full buffer-fill interval is accepted with a warning: the
    /// analyzer then sees samples it already analyzed.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::CapacityTooSmall`] / [`ConfigError::OddCapacity`] for
    ///   an unusable ring size
    /// - [`ConfigError::NotPeriodic`] if any task but the trigger renderer is
    ///   sporadic
    /// - [`ConfigError::ZeroPeriod`] for a periodic task with period 0
    /// - [`ConfigError::PriorityOrder`] unless sampler > edge detector > others
    pub fn validate<const N: usize>(&self) -> Result<(), ConfigError> {
        if N < 2 {
            return Err(ConfigError::CapacityTooSmall { capacity: N });
        }
        if N % 2 != 0 {
            return Err(ConfigError::OddCapacity { capacity: N });
        }

        for task in ScopeTask::ALL {
            let timing = self.timing(task);
            match timing.period() {
                Some(0) => return Err(ConfigError::ZeroPeriod { task: task.name() }),
                None if task != ScopeTask::TriggerRenderer => {
                    return Err(ConfigError::NotPeriodic { task: task.name() })
                }
                _ => {}
            }
        }

        let sampler = self.sampler.priority;
        let detector = self.edge_detector.priority;
        if detector >= sampler {
            return Err(ConfigError::PriorityOrder {
                task: ScopeTask::EdgeDetector.name(),
            });
        }
        for task in ScopeTask::ALL.iter().skip(2) {
            if self.timing(*task).priority >= detector {
                return Err(ConfigError::PriorityOrder { task: task.name() });
            }
        }

        if let (Some(sampler_period), Some(analyzer_period)) =
            (self.sampler.period(), self.analyzer.period())
        {
            let fill_interval = sampler_period.saturating_mul(N as Ticks);
            if analyzer_period < fill_interval {
                crate::log_warn!(
                    "Analyzer period {} is shorter than the buffer fill interval {}",
                    analyzer_period,
                    fill_interval
                );
            }
        }

        Ok(())
    }
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
