//! Task registry
//!
//! The registry holds the schedule entry of every task: its static metadata,
//! the runtime-mutable enabled flag, its dispatch state and statistics.
//! Tasks are registered once during start-up; entries are never removed, so a
//! [`TaskHandle`] stays valid for the lifetime of the registry.

use core::fmt;

use heapless::Vec;

use super::stats::TaskStats;
use super::types::{TaskHandle, TaskMetadata, TaskState};

/// Maximum number of tasks that can be registered
pub const MAX_TASKS: usize = 16;

/// Registry errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// More than [`MAX_TASKS`] registrations
    Full,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Full => write!(
                f,
                "Task registry full: cannot register more than {} tasks",
                MAX_TASKS
            ),
        }
    }
}

/// Schedule entry binding a task to its release pattern
#[derive(Debug, Clone, Copy)]
pub struct ScheduleEntry {
    /// Static task metadata
    pub metadata: TaskMetadata,
    /// Whether the clock releases this task (the only runtime-mutable field
    /// of the schedule itself)
    pub enabled: bool,
    /// Current dispatch state
    pub state: TaskState,
    /// Runtime statistics
    pub stats: TaskStats,
}

/// Fixed-capacity table of schedule entries
#[derive(Debug, Default)]
pub struct TaskRegistry {
    entries: Vec<ScheduleEntry, MAX_TASKS>,
}

impl TaskRegistry {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a task
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Full`] if `MAX_TASKS` tasks are already registered.
    pub fn register(
        &mut self,
        metadata: TaskMetadata,
        enabled: bool,
    ) -> Result<TaskHandle, RegistryError> {
        let handle = TaskHandle(self.entries.len());
        self.entries
            .push(ScheduleEntry {
                metadata,
                enabled,
                state: TaskState::Idle,
                stats: TaskStats::default(),
            })
            .map_err(|_| RegistryError::Full)?;
        Ok(handle)
    }

    /// Get a schedule entry
    pub fn get(&self, handle: TaskHandle) -> Option<&ScheduleEntry> {
        self.entries.get(handle.0)
    }

    /// Get a schedule entry mutably
    pub fn get_mut(&mut self, handle: TaskHandle) -> Option<&mut ScheduleEntry> {
        self.entries.get_mut(handle.0)
    }

    /// Set the enabled flag of a task; unknown handles are ignored
    pub fn set_enabled(&mut self, handle: TaskHandle, enabled: bool) {
        if let Some(entry) = self.entries.get_mut(handle.0) {
            entry.enabled = enabled;
        }
    }

    /// Whether the clock currently releases this task
    pub fn is_enabled(&self, handle: TaskHandle) -> bool {
        self.get(handle).is_some_and(|entry| entry.enabled)
    }

    /// Number of registered tasks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no task is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(handle, entry)` pairs in registration order
    pub fn iter(&self) -> impl Iterator<Item = (TaskHandle, &ScheduleEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (TaskHandle(i), entry))
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [ScheduleEntry] {
        &mut self.entries
    }
}
