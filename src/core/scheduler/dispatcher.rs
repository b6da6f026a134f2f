//! Cyclic (time-triggered) dispatcher
//!
//! [`CyclicScheduler`] drives a monotonic tick clock. On every tick it:
//!
//! 1. applies the enable/disable requests made since the previous tick,
//! 2. releases every enabled task whose release pattern is due,
//! 3. dispatches ready tasks in priority order until none is ready.
//!
//! Task bodies are plain calls through [`Dispatch::run`]: "suspend" is a return,
//! "resume" is the next call. A task that must wait on a flag or channel returns
//! [`TaskOutcome::Blocked`] without side effects and is retried once another
//! task has completed. A release that arrives while the previous one is still
//! outstanding is dropped, never queued.

use heapless::Vec;

use super::registry::{RegistryError, ScheduleEntry, TaskRegistry, MAX_TASKS};
use super::stats::SchedulerStats;
use super::types::{TaskHandle, TaskMetadata, TaskOutcome, TaskState, Ticks};

/// Task set driven by the scheduler
pub trait Dispatch {
    /// Run the body of `task` once, up to its next suspension point
    ///
    /// `control` collects schedule changes (applied at the next tick boundary)
    /// and out-of-band wake-ups (applied immediately).
    fn run(&mut self, task: TaskHandle, control: &mut SchedulerControl) -> TaskOutcome;
}

/// Requests issued by tasks while they run
#[derive(Debug, Default)]
pub struct SchedulerControl {
    pending: Vec<(TaskHandle, bool), MAX_TASKS>,
    wakes: Vec<TaskHandle, MAX_TASKS>,
}

impl SchedulerControl {
    /// Create an empty request set
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
            wakes: Vec::new(),
        }
    }

    /// Enable the periodic release of `task` from the next tick on
    pub fn enable(&mut self, task: TaskHandle) {
        self.request(task, true);
    }

    /// Disable the periodic release of `task` from the next tick on
    ///
    /// A run already in progress is not affected.
    pub fn disable(&mut self, task: TaskHandle) {
        self.request(task, false);
    }

    /// Wake `task` out of band, independent of its schedule
    pub fn resume(&mut self, task: TaskHandle) {
        if !self.wakes.contains(&task) {
            // At most MAX_TASKS distinct handles exist
            let _ = self.wakes.push(task);
        }
    }

    /// Enabled flag that will be in effect after the next tick boundary,
    /// if a change is pending for `task`
    pub fn pending_state(&self, task: TaskHandle) -> Option<bool> {
        self.pending
            .iter()
            .find(|(handle, _)| *handle == task)
            .map(|(_, enabled)| *enabled)
    }

    fn request(&mut self, task: TaskHandle, enabled: bool) {
        if let Some(slot) = self.pending.iter_mut().find(|(handle, _)| *handle == task) {
            slot.1 = enabled;
        } else {
            let _ = self.pending.push((task, enabled));
        }
    }
}

/// Cyclic scheduler over a fixed task registry
#[derive(Debug, Default)]
pub struct CyclicScheduler {
    registry: TaskRegistry,
    control: SchedulerControl,
    now: Ticks,
    epoch: u32,
    stats: SchedulerStats,
}

impl CyclicScheduler {
    /// Create a scheduler with an empty registry and the clock at zero
    pub const fn new() -> Self {
        Self {
            registry: TaskRegistry::new(),
            control: SchedulerControl::new(),
            now: 0,
            epoch: 0,
            stats: SchedulerStats {
                ticks: 0,
                total_dropped_releases: 0,
                total_runs: 0,
            },
        }
    }

    /// Register a task with its initial enabled flag
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Full`] if the registry has no free slot.
    pub fn register(
        &mut self,
        metadata: TaskMetadata,
        enabled: bool,
    ) -> Result<TaskHandle, RegistryError> {
        let handle = self.registry.register(metadata, enabled)?;
        crate::log_debug!(
            "Registered task {} (priority {}, enabled {})",
            metadata.name,
            metadata.priority,
            enabled
        );
        Ok(handle)
    }

    /// Request enabling `task` at the next tick boundary
    pub fn enable(&mut self, task: TaskHandle) {
        self.control.enable(task);
    }

    /// Request disabling `task` at the next tick boundary
    pub fn disable(&mut self, task: TaskHandle) {
        self.control.disable(task);
    }

    /// Wake `task` out of band; it runs during the next dispatch
    pub fn resume(&mut self, task: TaskHandle) {
        self.control.resume(task);
    }

    /// Whether `task` is currently enabled (pending requests not included)
    pub fn is_enabled(&self, task: TaskHandle) -> bool {
        self.registry.is_enabled(task)
    }

    /// Current clock value (the next tick to be processed)
    pub fn now(&self) -> Ticks {
        self.now
    }

    /// Task registry
    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Pending requests
    pub fn control(&self) -> &SchedulerControl {
        &self.control
    }

    /// Schedule entry of `task`
    pub fn entry(&self, task: TaskHandle) -> Option<&ScheduleEntry> {
        self.registry.get(task)
    }

    /// Scheduler-wide statistics
    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// Process one clock tick
    pub fn tick<D: Dispatch>(&mut self, tasks: &mut D) {
        self.apply_pending();
        self.release_due();
        self.dispatch(tasks);

        self.now += 1;
        self.stats.ticks += 1;
        self.stats
            .update_totals(self.registry.iter().map(|(_, entry)| &entry.stats));
    }

    /// Process `count` clock ticks
    pub fn run_for<D: Dispatch>(&mut self, tasks: &mut D, count: Ticks) {
        for _ in 0..count {
            self.tick(tasks);
        }
    }

    fn apply_pending(&mut self) {
        for (task, enabled) in self.control.pending.iter() {
            if self.registry.is_enabled(*task) != *enabled {
                let _name = self
                    .registry
                    .get(*task)
                    .map(|entry| entry.metadata.name)
                    .unwrap_or("?");
                crate::log_debug!("Schedule {}: enabled = {}", _name, enabled);
            }
            self.registry.set_enabled(*task, *enabled);
        }
        self.control.pending.clear();
    }

    fn release_due(&mut self) {
        let now = self.now;
        for entry in self.registry.entries_mut() {
            if !entry.enabled || !entry.metadata.release.is_due(now) {
                continue;
            }
            let dropped = entry.state.is_active();
            entry.stats.record_release(dropped);
            if dropped {
                crate::log_warn!(
                    "Release of {} dropped at tick {}: previous release still active",
                    entry.metadata.name,
                    now
                );
            } else {
                entry.state = TaskState::Ready;
            }
        }
    }

    fn absorb_wakes(&mut self) {
        for task in self.control.wakes.iter() {
            if let Some(entry) = self.registry.get_mut(*task) {
                entry.stats.record_wake();
                entry.state = TaskState::Ready;
            }
        }
        self.control.wakes.clear();
    }

    /// Highest-priority ready task; ties go to the earliest registered
    fn next_ready(&self) -> Option<TaskHandle> {
        let mut best: Option<(TaskHandle, u8)> = None;
        for (handle, entry) in self.registry.iter() {
            if entry.state != TaskState::Ready {
                continue;
            }
            let priority = entry.metadata.priority;
            match best {
                Some((_, p)) if p >= priority => {}
                _ => best = Some((handle, priority)),
            }
        }
        best.map(|(handle, _)| handle)
    }

    fn dispatch<D: Dispatch>(&mut self, tasks: &mut D) {
        loop {
            self.absorb_wakes();

            // Blocked tasks get another chance once something else completed
            let epoch = self.epoch;
            for entry in self.registry.entries_mut() {
                if let TaskState::Blocked { epoch: blocked_at } = entry.state {
                    if blocked_at != epoch {
                        entry.state = TaskState::Ready;
                    }
                }
            }

            let Some(task) = self.next_ready() else {
                break;
            };

            let outcome = tasks.run(task, &mut self.control);

            if let Some(entry) = self.registry.get_mut(task) {
                match outcome {
                    TaskOutcome::Suspended => {
                        entry.state = TaskState::Idle;
                        entry.stats.record_run();
                        self.epoch = self.epoch.wrapping_add(1);
                    }
                    TaskOutcome::Blocked => {
                        entry.state = TaskState::Blocked { epoch: self.epoch };
                        entry.stats.record_blocked();
                    }
                }
            }
        }
    }
}
