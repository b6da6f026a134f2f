//! Task statistics tracking
//!
//! Per-task counters are updated by the dispatcher on every release, run and
//! wake-up; scheduler-wide counters aggregate them for monitoring.

/// Runtime statistics for a single task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    /// Clock releases while the schedule was enabled
    pub releases: u32,

    /// Runs that reached the suspension point
    pub runs: u32,

    /// Releases dropped because the previous release was still outstanding
    pub dropped_releases: u32,

    /// Out-of-band wake-ups (resume requests)
    pub wakes: u32,

    /// Runs that ended blocked on a flag or channel
    pub blocked_runs: u32,
}

impl TaskStats {
    /// Record a clock release; `dropped` if the task was still active
    pub fn record_release(&mut self, dropped: bool) {
        self.releases = self.releases.saturating_add(1);
        if dropped {
            self.dropped_releases = self.dropped_releases.saturating_add(1);
        }
    }

    /// Record a completed run
    pub fn record_run(&mut self) {
        self.runs = self.runs.saturating_add(1);
    }

    /// Record a run that ended blocked
    pub fn record_blocked(&mut self) {
        self.blocked_runs = self.blocked_runs.saturating_add(1);
    }

    /// Record an out-of-band wake-up
    pub fn record_wake(&mut self) {
        self.wakes = self.wakes.saturating_add(1);
    }
}

/// Global scheduler statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Number of clock ticks processed
    pub ticks: u64,

    /// Total dropped releases across all tasks
    pub total_dropped_releases: u32,

    /// Total completed runs across all tasks
    pub total_runs: u32,
}

impl SchedulerStats {
    /// Re-aggregate totals from per-task statistics
    pub fn update_totals<'a>(&mut self, task_stats: impl Iterator<Item = &'a TaskStats>) {
        let (dropped, runs) = task_stats.fold((0u32, 0u32), |(d, r), s| {
            (
                d.saturating_add(s.dropped_releases),
                r.saturating_add(s.runs),
            )
        });
        self.total_dropped_releases = dropped;
        self.total_runs = runs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_stats_release_and_drop() {
        let mut stats = TaskStats::default();
        stats.record_release(false);
        stats.record_release(true);
        stats.record_release(false);

        assert_eq!(stats.releases, 3);
        assert_eq!(stats.dropped_releases, 1);
    }

    #[test]
    fn test_scheduler_stats_totals() {
        let mut stats = SchedulerStats::default();
        let tasks = [
            TaskStats {
                dropped_releases: 5,
                runs: 10,
                ..Default::default()
            },
            TaskStats {
                dropped_releases: 3,
                runs: 1,
                ..Default::default()
            },
            TaskStats::default(),
        ];

        stats.update_totals(tasks.iter());
        assert_eq!(stats.total_dropped_releases, 8);
        assert_eq!(stats.total_runs, 11);
    }
}
