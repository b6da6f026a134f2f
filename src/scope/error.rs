//! Scope error types
//!
//! All faults of the control core are absorbed locally: configuration errors
//! are reported once at start-up, command errors are logged by the serial path
//! and the scope keeps running in its last valid mode.

use core::fmt;

use crate::core::scheduler::RegistryError;

/// Result type for scope operations
pub type Result<T> = core::result::Result<T, ScopeError>;

/// Invalid scope configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A periodic task has a zero period
    ZeroPeriod {
        /// Task name
        task: &'static str,
    },
    /// A task that must be clock-driven was configured as sporadic
    NotPeriodic {
        /// Task name
        task: &'static str,
    },
    /// Sample ring smaller than two slots
    CapacityTooSmall {
        /// Configured capacity
        capacity: usize,
    },
    /// Sample ring capacity is not even (the spectrum has `capacity / 2` bins)
    OddCapacity {
        /// Configured capacity
        capacity: usize,
    },
    /// Spectrum length is not half the sample ring capacity
    SpectrumLength {
        /// Configured capacity
        capacity: usize,
        /// Configured number of spectrum bins
        bins: usize,
    },
    /// Sampler must outrank the edge detector, which must outrank every other task
    PriorityOrder {
        /// Task that outranks (or ties with) the sampler or detector
        task: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroPeriod { task } => write!(f, "Task {} has a zero period", task),
            ConfigError::NotPeriodic { task } => {
                write!(f, "Task {} must have a periodic release", task)
            }
            ConfigError::CapacityTooSmall { capacity } => {
                write!(f, "Sample buffer capacity {} is below 2", capacity)
            }
            ConfigError::OddCapacity { capacity } => {
                write!(f, "Sample buffer capacity {} is not even", capacity)
            }
            ConfigError::SpectrumLength { capacity, bins } => write!(
                f,
                "Spectrum of {} bins does not match sample buffer capacity {}",
                bins, capacity
            ),
            ConfigError::PriorityOrder { task } => write!(
                f,
                "Task {} breaks the sampler > edge detector > others priority order",
                task
            ),
        }
    }
}

/// Serial command path errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// The command line exceeded its capacity; the partial line was discarded
    BufferOverflow {
        /// Maximum number of characters in a line
        capacity: usize,
    },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::BufferOverflow { capacity } => write!(
                f,
                "Command line longer than {} characters discarded",
                capacity
            ),
        }
    }
}

/// Umbrella error of the scope core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScopeError {
    /// Invalid configuration
    Config(ConfigError),
    /// Serial command path fault
    Command(CommandError),
    /// Task registration failed
    Registry(RegistryError),
}

impl From<ConfigError> for ScopeError {
    fn from(e: ConfigError) -> Self {
        ScopeError::Config(e)
    }
}

impl From<CommandError> for ScopeError {
    fn from(e: CommandError) -> Self {
        ScopeError::Command(e)
    }
}

impl From<RegistryError> for ScopeError {
    fn from(e: RegistryError) -> Self {
        ScopeError::Registry(e)
    }
}

impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeError::Config(e) => write!(f, "Configuration error: {}", e),
            ScopeError::Command(e) => write!(f, "Command error: {}", e),
            ScopeError::Registry(e) => write!(f, "Scheduler error: {}", e),
        }
    }
}
