//! Operating mode and its transition table
//!
//! The mode has two independent axes: what is displayed ([`DisplayMode`]) and
//! how the trigger is set up ([`TriggerMode`]). Commands move the mode through
//! an explicit table ([`Mode::transition`]); each transition lists the task
//! schedules to enable and disable.
//!
//! | Command         | Applies when        | Enables                | Disables                        | Next                       |
//! |-----------------|---------------------|------------------------|---------------------------------|----------------------------|
//! | `DisplayPds`    | display is signal   | analyzer, PDS renderer | time renderer, edge detector    | display PDS, disarmed      |
//! | `DisplaySignal` | display is PDS      | time renderer          | analyzer, PDS renderer          | display signal             |
//! | `TriggerOn`     | disarmed            | edge detector          | -                               | armed                      |
//! | `TriggerOff`    | armed               | -                      | edge detector                   | disarmed                   |
//! | `TriggerRise`   | polarity not rising | -                      | -                               | polarity rising            |
//! | `TriggerFall`   | see [`LevelPolicy`] | -                      | -                               | polarity falling or rising |
//!
//! A command whose target state is already active is a no-op
//! ([`TransitionOutcome::AlreadyActive`]); `Invalid` is ignored.

use bitflags::bitflags;

use crate::platform::Sample;

use super::command::Command;
use super::config::ScopeTask;
use super::trigger::{Polarity, TriggerSettings};

/// What the display shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayMode {
    /// Live time-domain trace
    Signal,
    /// Power density spectrum
    Pds,
}

/// Trigger arming and polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TriggerMode {
    /// Whether the edge detector runs
    pub armed: bool,
    /// Edge the detector reacts to
    pub polarity: Polarity,
}

/// Handling of the `tlevel fall` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LevelPolicy {
    /// `tlevel fall` arms the rising edge, as the reference firmware does
    Literal,
    /// `tlevel fall` arms the falling edge
    #[default]
    Corrected,
}

bitflags! {
    /// Set of scope tasks
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TaskSet: u8 {
        /// Sampler
        const SAMPLER = 1 << 0;
        /// Edge detector
        const EDGE_DETECTOR = 1 << 1;
        /// Analyzer
        const ANALYZER = 1 << 2;
        /// Time renderer
        const TIME_RENDERER = 1 << 3;
        /// PDS renderer
        const PDS_RENDERER = 1 << 4;
        /// Trigger renderer
        const TRIGGER_RENDERER = 1 << 5;
        /// Command decoder
        const COMMAND_DECODER = 1 << 6;
        /// State machine
        const STATE_MACHINE = 1 << 7;
    }
}

impl From<ScopeTask> for TaskSet {
    fn from(task: ScopeTask) -> Self {
        TaskSet::from_bits_retain(1 << task.index())
    }
}

impl TaskSet {
    /// Whether `task` is in the set
    pub fn has(self, task: ScopeTask) -> bool {
        self.contains(TaskSet::from(task))
    }

    /// Tasks in the set, in registration order
    pub fn tasks(self) -> impl Iterator<Item = ScopeTask> {
        ScopeTask::ALL.into_iter().filter(move |task| self.has(*task))
    }
}

/// How a command affected the mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransitionOutcome {
    /// The mode changed
    Applied,
    /// The command asked for the current state
    AlreadyActive,
    /// The command has no transition
    Ignored,
}

/// Result of applying a command to a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Mode after the command
    pub next: Mode,
    /// Schedules to enable
    pub enable: TaskSet,
    /// Schedules to disable
    pub disable: TaskSet,
    /// What happened
    pub outcome: TransitionOutcome,
}

impl Transition {
    fn unchanged(mode: Mode, outcome: TransitionOutcome) -> Self {
        Self {
            next: mode,
            enable: TaskSet::empty(),
            disable: TaskSet::empty(),
            outcome,
        }
    }

    fn applied(next: Mode, enable: TaskSet, disable: TaskSet) -> Self {
        Self {
            next,
            enable,
            disable,
            outcome: TransitionOutcome::Applied,
        }
    }
}

/// Current operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mode {
    /// Display axis
    pub display: DisplayMode,
    /// Trigger axis
    pub trigger: TriggerMode,
}

impl Mode {
    /// Start-up mode: signal display, trigger disarmed
    pub const fn initial(polarity: Polarity) -> Self {
        Self {
            display: DisplayMode::Signal,
            trigger: TriggerMode {
                armed: false,
                polarity,
            },
        }
    }

    /// Look up the transition for `command`
    pub fn transition(self, command: Command, policy: LevelPolicy) -> Transition {
        let mut next = self;
        match command {
            Command::Invalid => Transition::unchanged(self, TransitionOutcome::Ignored),

            Command::DisplayPds => {
                if self.display == DisplayMode::Pds {
                    return Transition::unchanged(self, TransitionOutcome::AlreadyActive);
                }
                next.display = DisplayMode::Pds;
                next.trigger.armed = false;
                Transition::applied(
                    next,
                    TaskSet::ANALYZER | TaskSet::PDS_RENDERER,
                    TaskSet::TIME_RENDERER | TaskSet::EDGE_DETECTOR,
                )
            }

            Command::DisplaySignal => {
                if self.display == DisplayMode::Signal {
                    return Transition::unchanged(self, TransitionOutcome::AlreadyActive);
                }
                next.display = DisplayMode::Signal;
                Transition::applied(
                    next,
                    TaskSet::TIME_RENDERER,
                    TaskSet::ANALYZER | TaskSet::PDS_RENDERER,
                )
            }

            Command::TriggerOn => {
                if self.trigger.armed {
                    return Transition::unchanged(self, TransitionOutcome::AlreadyActive);
                }
                next.trigger.armed = true;
                Transition::applied(next, TaskSet::EDGE_DETECTOR, TaskSet::empty())
            }

            Command::TriggerOff => {
                if !self.trigger.armed {
                    return Transition::unchanged(self, TransitionOutcome::AlreadyActive);
                }
                next.trigger.armed = false;
                Transition::applied(next, TaskSet::empty(), TaskSet::EDGE_DETECTOR)
            }

            Command::TriggerRise | Command::TriggerFall => {
                let polarity = match (command, policy) {
                    (Command::TriggerFall, LevelPolicy::Corrected) => Polarity::Falling,
                    _ => Polarity::Rising,
                };
                if self.trigger.polarity == polarity {
                    return Transition::unchanged(self, TransitionOutcome::AlreadyActive);
                }
                next.trigger.polarity = polarity;
                Transition::applied(next, TaskSet::empty(), TaskSet::empty())
            }
        }
    }

    /// Detector settings for this mode
    pub fn trigger_settings(&self, threshold: Sample) -> TriggerSettings {
        TriggerSettings {
            armed: self.trigger.armed,
            edges: self.trigger.polarity.edges(),
            threshold,
        }
    }

    /// Schedules that are enabled while this mode is active
    ///
    /// Sampler, decoder, state machine and trigger renderer are always in.
    pub fn schedules(&self) -> TaskSet {
        let mut set = TaskSet::SAMPLER
            | TaskSet::TRIGGER_RENDERER
            | TaskSet::COMMAND_DECODER
            | TaskSet::STATE_MACHINE;
        match self.display {
            DisplayMode::Signal => set |= TaskSet::TIME_RENDERER,
            DisplayMode::Pds => set |= TaskSet::ANALYZER | TaskSet::PDS_RENDERER,
        }
        if self.trigger.armed {
            set |= TaskSet::EDGE_DETECTOR;
        }
        set
    }
}
