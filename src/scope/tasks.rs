//! Task bodies
//!
//! [`ScopeTasks`] owns the [`ScopeContext`] and the collaborators and runs
//! one task body per [`Dispatch::run`] call. Each body runs to its suspension
//! point and returns; nothing survives between runs except what is stored in
//! the context.
//!
//! Sampler and edge detector alternate through the two handshake bits while
//! the detector schedule is enabled:
//!
//! ```text
//! sampler:   wait DETECTOR_READY -> write sample -> set SAMPLE_READY
//! detector:  wait SAMPLE_READY   -> check edge   -> set DETECTOR_READY
//! ```
//!
//! The state machine only requests the handshake when it enables the
//! detector. The detector's first run engages it without waiting, so the
//! sampler always follows the detector's release. While the detector is
//! disabled the sampler neither waits nor signals.
//!
//! A wait that is not satisfied returns [`TaskOutcome::Blocked`] before any
//! side effect.

use crate::core::scheduler::{Dispatch, SchedulerControl, TaskHandle, TaskOutcome};
use crate::core::traits::SharedState;
use crate::platform::{Color, Renderer, Sample, SampleSource};

use super::command::{CommandBridge, CommandLine};
use super::config::{ScopeTask, PDS_LENGTH, TIME_DOMAIN_LENGTH};
use super::context::{Handshake, HandshakeState, ScopeContext};
use super::mode::TransitionOutcome;
use super::spectrum::SpectralTransform;
use super::trigger::Snapshot;

/// Scheduler handle of `task`
///
/// Tasks are registered in [`ScopeTask::ALL`] order on a fresh scheduler.
pub(crate) const fn handle(task: ScopeTask) -> TaskHandle {
    TaskHandle(task.index())
}

/// The scope task set
pub struct ScopeTasks<
    'a,
    A,
    R,
    S,
    T,
    const N: usize = TIME_DOMAIN_LENGTH,
    const M: usize = PDS_LENGTH,
> where
    S: SharedState<CommandLine>,
{
    context: ScopeContext<N, M>,
    adc: A,
    renderer: R,
    transform: T,
    bridge: &'a CommandBridge<S>,
}

impl<'a, A, R, S, T, const N: usize, const M: usize> ScopeTasks<'a, A, R, S, T, N, M>
where
    A: SampleSource,
    R: Renderer,
    S: SharedState<CommandLine>,
    T: SpectralTransform,
{
    /// Bundle the context with its collaborators
    pub fn new(
        context: ScopeContext<N, M>,
        adc: A,
        renderer: R,
        transform: T,
        bridge: &'a CommandBridge<S>,
    ) -> Self {
        Self {
            context,
            adc,
            renderer,
            transform,
            bridge,
        }
    }

    /// Shared state
    pub fn context(&self) -> &ScopeContext<N, M> {
        &self.context
    }

    /// Sample source
    pub fn adc(&self) -> &A {
        &self.adc
    }

    /// Sample source, mutably
    pub fn adc_mut(&mut self) -> &mut A {
        &mut self.adc
    }

    /// Renderer
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Renderer, mutably
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Command bridge
    pub fn bridge(&self) -> &'a CommandBridge<S> {
        self.bridge
    }

    fn sample(&mut self) -> TaskOutcome {
        let engaged = self.context.is_handshake_engaged();
        if engaged
            && self
                .context
                .handshake
                .try_wait_any_clear(Handshake::DETECTOR_READY)
                .is_none()
        {
            return TaskOutcome::Blocked;
        }

        let sample = self.adc.read_sample();
        self.context.buffer.push(sample);

        if engaged {
            self.context.handshake.set(Handshake::SAMPLE_READY);
        }
        TaskOutcome::Suspended
    }

    fn detect_edge(&mut self, control: &mut SchedulerControl) -> TaskOutcome {
        match self.context.handshake_state() {
            // Released once more after a disengage
            HandshakeState::Off => return TaskOutcome::Suspended,
            // First run after enabling: check the newest pair right away
            HandshakeState::Requested => self.context.engage_handshake(),
            HandshakeState::Engaged => {
                if self
                    .context
                    .handshake
                    .try_wait_any_clear(Handshake::SAMPLE_READY)
                    .is_none()
                {
                    return TaskOutcome::Blocked;
                }
            }
        }

        let settings = self.context.trigger_settings();
        let fired = self
            .context
            .buffer
            .latest_pair()
            .is_some_and(|(prev, curr)| settings.detect(prev, curr));

        if fired {
            self.context.detections = self.context.detections.saturating_add(1);
            let mut samples = [0 as Sample; N];
            self.context.buffer.copy_chronological(&mut samples);
            let sequence = self.context.buffer.latest_sequence().unwrap_or(0);
            if self.context.snapshots.offer(Snapshot { samples, sequence }) {
                control.resume(handle(ScopeTask::TriggerRenderer));
            }
        }

        // Always let the sampler continue
        self.context.handshake.set(Handshake::DETECTOR_READY);
        TaskOutcome::Suspended
    }

    fn analyze(&mut self) -> TaskOutcome {
        let mut window = [0 as Sample; N];
        let read = self
            .context
            .buffer
            .read_window(&mut self.context.analyzer_cursor, &mut window);
        if read.fresh < N {
            crate::log_warn!(
                "Analyzer window holds {} new samples of {}",
                read.fresh,
                N
            );
        }
        self.context
            .frequency_domain
            .update(&mut self.transform, &window);
        TaskOutcome::Suspended
    }

    fn render_time(&mut self) -> TaskOutcome {
        let mut trace = [0 as Sample; N];
        self.context.buffer.copy_chronological(&mut trace);
        if let Err(_e) = self.renderer.plot(&trace, Color::Black, Color::White) {
            crate::log_error!("Time trace not drawn: {}", _e);
        }
        TaskOutcome::Suspended
    }

    fn render_pds(&mut self) -> TaskOutcome {
        let bins = self.context.frequency_domain.bins();
        if let Err(_e) = self
            .renderer
            .plot_spectrum(bins, Color::Black, Color::White)
        {
            crate::log_error!("Spectrum not drawn: {}", _e);
        }
        TaskOutcome::Suspended
    }

    fn render_trigger(&mut self) -> TaskOutcome {
        let Some(snapshot) = self.context.snapshots.take() else {
            return TaskOutcome::Suspended;
        };
        if let Err(_e) = self
            .renderer
            .plot(&snapshot.samples, Color::Black, Color::White)
        {
            crate::log_error!(
                "Trigger snapshot {} not drawn: {}",
                snapshot.sequence,
                _e
            );
        }
        TaskOutcome::Suspended
    }

    fn decode(&mut self) -> TaskOutcome {
        if let Some(command) = self.bridge.decode_completed() {
            crate::log_debug!("Decoded command {:?}", command);
            self.context.pending_command = command;
        }
        TaskOutcome::Suspended
    }

    fn step_mode(&mut self, control: &mut SchedulerControl) -> TaskOutcome {
        let command = core::mem::take(&mut self.context.pending_command);
        let transition = self
            .context
            .mode
            .transition(command, self.context.level_policy);

        match transition.outcome {
            TransitionOutcome::Applied => {
                for task in transition.disable.tasks() {
                    control.disable(handle(task));
                }
                for task in transition.enable.tasks() {
                    control.enable(handle(task));
                }
                if transition.disable.has(ScopeTask::EdgeDetector) {
                    self.context.disengage_handshake();
                }
                if transition.enable.has(ScopeTask::EdgeDetector) {
                    self.context.request_handshake();
                }
                crate::log_info!(
                    "Mode {:?} -> {:?} on {:?}",
                    self.context.mode,
                    transition.next,
                    command
                );
                self.context.mode = transition.next;
                self.context.transitions = self.context.transitions.saturating_add(1);
            }
            TransitionOutcome::AlreadyActive => {
                crate::log_debug!("Command {:?} ignored: already active", command);
            }
            TransitionOutcome::Ignored => {}
        }
        TaskOutcome::Suspended
    }
}

impl<'a, A, R, S, T, const N: usize, const M: usize> Dispatch for ScopeTasks<'a, A, R, S, T, N, M>
where
    A: SampleSource,
    R: Renderer,
    S: SharedState<CommandLine>,
    T: SpectralTransform,
{
    fn run(&mut self, task: TaskHandle, control: &mut SchedulerControl) -> TaskOutcome {
        let Some(task) = ScopeTask::from_index(task.index()) else {
            crate::log_error!("Dispatch of unknown task {}", task.index());
            return TaskOutcome::Suspended;
        };
        match task {
            ScopeTask::Sampler => self.sample(),
            ScopeTask::EdgeDetector => self.detect_edge(control),
            ScopeTask::Analyzer => self.analyze(),
            ScopeTask::TimeRenderer => self.render_time(),
            ScopeTask::PdsRenderer => self.render_pds(),
            ScopeTask::TriggerRenderer => self.render_trigger(),
            ScopeTask::CommandDecoder => self.decode(),
            ScopeTask::StateMachine => self.step_mode(control),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::MockState;
    use crate::platform::mock::{Frame, MockAdc, MockRenderer, MockSerial};
    use crate::scope::command::Command;
    use crate::scope::config::ScopeConfig;
    use crate::scope::mode::DisplayMode;
    use crate::scope::spectrum::PowerDensity64;
    use crate::scope::trigger::Polarity;

    type Bridge = CommandBridge<MockState<CommandLine>>;

    fn bridge() -> Bridge {
        CommandBridge::new(MockState::new(CommandLine::new()))
    }

    fn tasks(bridge: &Bridge) -> ScopeTasks<'_, MockAdc, MockRenderer, MockState<CommandLine>, PowerDensity64> {
        ScopeTasks::new(
            ScopeContext::new(&ScopeConfig::DEFAULT),
            MockAdc::new(0),
            MockRenderer::new(),
            PowerDensity64,
            bridge,
        )
    }

    fn run(tasks: &mut impl Dispatch, task: ScopeTask, control: &mut SchedulerControl) -> TaskOutcome {
        tasks.run(handle(task), control)
    }

    #[test]
    fn test_sampler_free_runs_while_disengaged() {
        let bridge = bridge();
        let mut tasks = tasks(&bridge);
        let mut control = SchedulerControl::new();
        tasks.adc_mut().push_samples(&[1, 2, 3]);

        for _ in 0..3 {
            assert_eq!(run(&mut tasks, ScopeTask::Sampler, &mut control), TaskOutcome::Suspended);
        }
        assert_eq!(tasks.context().buffer.written(), 3);
        assert_eq!(tasks.context().handshake.bits(), Handshake::empty());
    }

    #[test]
    fn test_detector_first_run_engages_handshake() {
        let bridge = bridge();
        let mut tasks = tasks(&bridge);
        let mut control = SchedulerControl::new();
        tasks.context.request_handshake();

        // Sampler is not held back until the detector engaged
        assert_eq!(run(&mut tasks, ScopeTask::Sampler, &mut control), TaskOutcome::Suspended);
        assert_eq!(run(&mut tasks, ScopeTask::EdgeDetector, &mut control), TaskOutcome::Suspended);
        assert!(tasks.context().is_handshake_engaged());
        assert_eq!(tasks.context().handshake.bits(), Handshake::DETECTOR_READY);

        assert_eq!(run(&mut tasks, ScopeTask::EdgeDetector, &mut control), TaskOutcome::Blocked);
        assert_eq!(run(&mut tasks, ScopeTask::Sampler, &mut control), TaskOutcome::Suspended);
        assert_eq!(run(&mut tasks, ScopeTask::Sampler, &mut control), TaskOutcome::Blocked);
        assert_eq!(tasks.adc().reads(), 2);

        assert_eq!(run(&mut tasks, ScopeTask::EdgeDetector, &mut control), TaskOutcome::Suspended);
        assert_eq!(run(&mut tasks, ScopeTask::Sampler, &mut control), TaskOutcome::Suspended);
        assert_eq!(tasks.context().buffer.written(), 3);
    }

    #[test]
    fn test_detector_idle_while_handshake_off() {
        let bridge = bridge();
        let mut tasks = tasks(&bridge);
        let mut control = SchedulerControl::new();

        assert_eq!(run(&mut tasks, ScopeTask::EdgeDetector, &mut control), TaskOutcome::Suspended);
        assert_eq!(tasks.context().handshake.bits(), Handshake::empty());
    }

    #[test]
    fn test_detector_snapshot_wakes_trigger_renderer() {
        let bridge = bridge();
        let mut tasks = tasks(&bridge);
        let mut control = SchedulerControl::new();
        tasks.context.mode.trigger.armed = true;
        tasks.context.mode.trigger.polarity = Polarity::Rising;
        tasks.context.request_handshake();
        tasks.adc_mut().push_samples(&[150, 200]);

        run(&mut tasks, ScopeTask::EdgeDetector, &mut control);
        for _ in 0..2 {
            run(&mut tasks, ScopeTask::Sampler, &mut control);
            run(&mut tasks, ScopeTask::EdgeDetector, &mut control);
        }
        assert_eq!(tasks.context().detections, 1);
        assert!(tasks.context().snapshots.is_occupied());

        run(&mut tasks, ScopeTask::TriggerRenderer, &mut control);
        match tasks.renderer().frames() {
            [Frame::Trace(samples)] => {
                assert_eq!(samples.len(), 64);
                assert_eq!(&samples[62..], &[150, 200]);
            }
            other => panic!("unexpected frames {:?}", other),
        }
    }

    #[test]
    fn test_state_machine_consumes_command() {
        let bridge = bridge();
        let mut tasks = tasks(&bridge);
        let mut control = SchedulerControl::new();
        tasks.context.pending_command = Command::DisplayPds;

        run(&mut tasks, ScopeTask::StateMachine, &mut control);
        assert_eq!(tasks.context().mode.display, DisplayMode::Pds);
        assert_eq!(tasks.context().pending_command, Command::Invalid);
        assert_eq!(control.pending_state(handle(ScopeTask::Analyzer)), Some(true));
        assert_eq!(control.pending_state(handle(ScopeTask::TimeRenderer)), Some(false));
    }

    #[test]
    fn test_trigger_on_requests_handshake() {
        let bridge = bridge();
        let mut tasks = tasks(&bridge);
        let mut control = SchedulerControl::new();
        tasks.context.pending_command = Command::TriggerOn;

        run(&mut tasks, ScopeTask::StateMachine, &mut control);
        assert_eq!(tasks.context().handshake_state(), HandshakeState::Requested);
        assert_eq!(control.pending_state(handle(ScopeTask::EdgeDetector)), Some(true));

        tasks.context.pending_command = Command::TriggerOff;
        run(&mut tasks, ScopeTask::StateMachine, &mut control);
        assert_eq!(tasks.context().handshake_state(), HandshakeState::Off);
        assert_eq!(control.pending_state(handle(ScopeTask::EdgeDetector)), Some(false));
    }

    #[test]
    fn test_decoder_reads_completed_line() {
        let bridge = bridge();
        let mut serial = MockSerial::new();
        serial.inject_rx_data(b"tlevel rise\n");
        bridge.pump(&mut serial);

        let mut tasks = tasks(&bridge);
        let mut control = SchedulerControl::new();
        run(&mut tasks, ScopeTask::CommandDecoder, &mut control);
        assert_eq!(tasks.context().pending_command, Command::TriggerRise);
        assert!(!bridge.is_decodable());
    }

    #[test]
    fn test_render_failure_is_absorbed() {
        let bridge = bridge();
        let mut tasks = tasks(&bridge);
        let mut control = SchedulerControl::new();
        tasks.renderer_mut().set_failing(true);

        assert_eq!(run(&mut tasks, ScopeTask::TimeRenderer, &mut control), TaskOutcome::Suspended);
        assert_eq!(run(&mut tasks, ScopeTask::PdsRenderer, &mut control), TaskOutcome::Suspended);
        assert!(tasks.renderer().frames().is_empty());
    }
}
