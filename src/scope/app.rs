//! Oscilloscope application
//!
//! Wires the scope tasks into a [`CyclicScheduler`]: one registration per
//! [`ScopeTask`], release patterns and priorities from [`ScopeConfig`], and
//! the start-up enabled set derived from the initial [`Mode`].
//!
//! The serial interrupt path is not owned here: the [`CommandBridge`] is
//! borrowed so it can live in a `static` shared with the interrupt handler.
//!
//! # Example
//!
//! ```
//! use pico_scope::core::traits::MockState;
//! use pico_scope::platform::mock::{MockAdc, MockRenderer, MockSerial};
//! use pico_scope::scope::{
//!     CommandBridge, CommandLine, DisplayMode, Oscilloscope, PowerDensity64, ScopeConfig,
//!     ScopeTask,
//! };
//!
//! let bridge = CommandBridge::new(MockState::new(CommandLine::new()));
//! let mut scope: Oscilloscope<'_, _, _, _> = Oscilloscope::new(
//!     ScopeConfig::DEFAULT,
//!     MockAdc::new(0),
//!     MockRenderer::new(),
//!     PowerDensity64,
//!     &bridge,
//! )
//! .unwrap();
//!
//! let mut serial = MockSerial::new();
//! serial.inject_rx_data(b"display pds\n");
//! scope.bridge().pump(&mut serial);
//!
//! scope.run_for(700);
//! assert_eq!(scope.mode().display, DisplayMode::Pds);
//! assert!(scope.is_enabled(ScopeTask::Analyzer));
//! assert!(!scope.is_enabled(ScopeTask::TimeRenderer));
//! ```

use crate::core::scheduler::{CyclicScheduler, SchedulerStats, TaskMetadata, TaskStats, Ticks};
use crate::core::traits::SharedState;
use crate::platform::{Renderer, SampleSource, SerialReceiver};

use super::command::{CommandBridge, CommandLine};
use super::config::{ScopeConfig, ScopeTask, PDS_LENGTH, TIME_DOMAIN_LENGTH};
use super::context::ScopeContext;
use super::error::{ConfigError, Result};
use super::mode::Mode;
use super::spectrum::{PowerDensity64, SpectralTransform};
use super::tasks::{handle, ScopeTasks};

/// The oscilloscope: scheduler plus task set
pub struct Oscilloscope<
    'a,
    A,
    R,
    S,
    T = PowerDensity64,
    const N: usize = TIME_DOMAIN_LENGTH,
    const M: usize = PDS_LENGTH,
> where
    S: SharedState<CommandLine>,
{
    scheduler: CyclicScheduler,
    tasks: ScopeTasks<'a, A, R, S, T, N, M>,
    config: ScopeConfig,
}

impl<'a, A, R, S, T, const N: usize, const M: usize> Oscilloscope<'a, A, R, S, T, N, M>
where
    A: SampleSource,
    R: Renderer,
    S: SharedState<CommandLine>,
    T: SpectralTransform,
{
    /// Validate `config` and register every task
    ///
    /// # Errors
    ///
    /// - [`ScopeError::Config`](super::error::ScopeError::Config) if the
    ///   configuration is invalid or `M` is not `N / 2`
    /// - [`ScopeError::Registry`](super::error::ScopeError::Registry) if the
    ///   scheduler has no room for the task set
    pub fn new(
        config: ScopeConfig,
        adc: A,
        renderer: R,
        transform: T,
        bridge: &'a CommandBridge<S>,
    ) -> Result<Self> {
        config.validate::<N>()?;
        if M * 2 != N {
            return Err(ConfigError::SpectrumLength {
                capacity: N,
                bins: M,
            }
            .into());
        }

        let context = ScopeContext::new(&config);
        let enabled = context.mode.schedules();

        let mut scheduler = CyclicScheduler::new();
        for task in ScopeTask::ALL {
            let timing = config.timing(task);
            let registered = scheduler.register(
                TaskMetadata {
                    name: task.name(),
                    priority: timing.priority,
                    release: timing.release,
                },
                enabled.has(task),
            )?;
            debug_assert_eq!(registered, handle(task));
        }

        crate::log_info!("Scope started in mode {:?}", context.mode);

        Ok(Self {
            scheduler,
            tasks: ScopeTasks::new(context, adc, renderer, transform, bridge),
            config,
        })
    }

    /// Process one clock tick
    pub fn tick(&mut self) {
        self.scheduler.tick(&mut self.tasks);
    }

    /// Process `ticks` clock ticks
    pub fn run_for(&mut self, ticks: Ticks) {
        self.scheduler.run_for(&mut self.tasks, ticks);
    }

    /// Next tick to be processed
    pub fn now(&self) -> Ticks {
        self.scheduler.now()
    }

    /// Current operating mode
    pub fn mode(&self) -> Mode {
        self.tasks.context().mode
    }

    /// Whether the clock currently releases `task`
    pub fn is_enabled(&self, task: ScopeTask) -> bool {
        self.scheduler.is_enabled(handle(task))
    }

    /// Scheduler-wide statistics
    pub fn stats(&self) -> SchedulerStats {
        self.scheduler.stats()
    }

    /// Statistics of one task
    pub fn task_stats(&self, task: ScopeTask) -> Option<TaskStats> {
        self.scheduler.entry(handle(task)).map(|entry| entry.stats)
    }

    /// Shared state
    pub fn context(&self) -> &ScopeContext<N, M> {
        self.tasks.context()
    }

    /// Configuration in use
    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    /// Sample source, mutably
    pub fn adc_mut(&mut self) -> &mut A {
        self.tasks.adc_mut()
    }

    /// Renderer
    pub fn renderer(&self) -> &R {
        self.tasks.renderer()
    }

    /// Renderer, mutably
    pub fn renderer_mut(&mut self) -> &mut R {
        self.tasks.renderer_mut()
    }

    /// Command bridge
    pub fn bridge(&self) -> &'a CommandBridge<S> {
        self.tasks.bridge()
    }

    /// Feed everything `serial` holds through the interrupt path
    ///
    /// Returns the number of completed lines.
    pub fn receive<Rx: SerialReceiver + ?Sized>(&self, serial: &mut Rx) -> usize {
        self.bridge().pump(serial)
    }
}
