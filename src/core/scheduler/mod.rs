//! Cyclic task scheduler
//!
//! Time-triggered scheduling of a fixed task set. Every task has a release
//! pattern (phase and period in ticks, or sporadic), a priority and an enabled
//! flag that can be toggled at runtime to start or stop its periodic execution
//! without destroying the task.
//!
//! # Components
//!
//! - [`types`]: Release patterns, task metadata, handles and outcomes
//! - [`registry`]: Schedule entries and lookup
//! - [`stats`]: Per-task and scheduler-wide counters
//! - [`dispatcher`]: The tick-driven dispatcher
//!
//! # Example
//!
//! ```
//! use pico_scope::core::scheduler::{
//!     CyclicScheduler, Dispatch, Release, SchedulerControl, TaskHandle, TaskMetadata,
//!     TaskOutcome,
//! };
//!
//! struct Blink(u32);
//!
//! impl Dispatch for Blink {
//!     fn run(&mut self, _task: TaskHandle, _control: &mut SchedulerControl) -> TaskOutcome {
//!         self.0 += 1;
//!         TaskOutcome::Suspended
//!     }
//! }
//!
//! let mut scheduler = CyclicScheduler::new();
//! scheduler
//!     .register(
//!         TaskMetadata { name: "blink", priority: 1, release: Release::periodic(0, 250) },
//!         true,
//!     )
//!     .unwrap();
//!
//! let mut blink = Blink(0);
//! scheduler.run_for(&mut blink, 1000);
//! assert_eq!(blink.0, 4);
//! ```

pub mod dispatcher;
pub mod registry;
pub mod stats;
pub mod types;

pub use dispatcher::*;
pub use registry::*;
pub use stats::*;
pub use types::*;
