//! End-to-end tests of the scope task set on the mock platform

use pico_scope::core::traits::MockState;
use pico_scope::platform::mock::{Frame, MockAdc, MockRenderer, MockSerial};
use pico_scope::platform::Sample;
use pico_scope::scope::{
    Command, CommandBridge, CommandLine, DisplayMode, Handshake, LevelPolicy, Oscilloscope,
    Polarity, PowerDensity64, ScopeConfig, ScopeTask,
};
use proptest::prelude::*;

type Bridge = CommandBridge<MockState<CommandLine>>;
type Scope<'a> = Oscilloscope<'a, MockAdc, MockRenderer, MockState<CommandLine>>;

const STATE_MACHINE_PHASE: u64 = 650;
const STATE_MACHINE_PERIOD: u64 = 50;

fn bridge() -> Bridge {
    CommandBridge::new(MockState::new(CommandLine::new()))
}

fn scope_with(bridge: &Bridge, config: ScopeConfig, idle: Sample) -> Scope<'_> {
    Oscilloscope::new(
        config,
        MockAdc::new(idle),
        MockRenderer::new(),
        PowerDensity64,
        bridge,
    )
    .expect("default configuration is valid")
}

fn send(scope: &Scope<'_>, text: &[u8]) {
    let mut serial = MockSerial::new();
    serial.inject_rx_data(text);
    scope.receive(&mut serial);
}

/// Run until the state machine has consumed the pending command and its
/// schedule changes are in effect
fn settle(scope: &mut Scope<'_>) {
    let now = scope.now();
    let next = if now <= STATE_MACHINE_PHASE {
        STATE_MACHINE_PHASE
    } else {
        STATE_MACHINE_PHASE + (now - STATE_MACHINE_PHASE).div_ceil(STATE_MACHINE_PERIOD) * STATE_MACHINE_PERIOD
    };
    scope.run_for(next + 2 - now);
}

fn command(scope: &mut Scope<'_>, text: &[u8]) {
    send(scope, text);
    settle(scope);
}

fn assert_display_exclusive(scope: &Scope<'_>) {
    let time = scope.is_enabled(ScopeTask::TimeRenderer);
    let analyzer = scope.is_enabled(ScopeTask::Analyzer);
    let pds = scope.is_enabled(ScopeTask::PdsRenderer);
    assert_eq!(analyzer, pds, "analyzer and PDS renderer toggle together");
    assert!(time != analyzer, "exactly one display path is scheduled");
}

#[test]
fn ring_cursor_follows_sampler_releases() {
    let bridge = bridge();
    let mut scope = scope_with(&bridge, ScopeConfig::DEFAULT, 0);

    for _ in 0..1000 {
        scope.tick();
        let buffer = &scope.context().buffer;
        assert_eq!(buffer.write_cursor() as u64, buffer.written() % 64);
    }
    assert_eq!(scope.context().buffer.written(), 250);
}

#[test]
fn rising_edge_fires_once_at_the_crossing() {
    let bridge = bridge();
    let mut scope = scope_with(&bridge, ScopeConfig::DEFAULT, 100);

    command(&mut scope, b"tlevel rise\n");
    command(&mut scope, b"trigger on\n");
    assert!(scope.mode().trigger.armed);
    assert_eq!(scope.mode().trigger.polarity, Polarity::Rising);
    assert!(scope.is_enabled(ScopeTask::EdgeDetector));

    scope.renderer_mut().clear();
    scope.adc_mut().push_samples(&[150, 200]);
    scope.run_for(40);

    let context = scope.context();
    assert_eq!(context.detections, 1);
    assert_eq!(context.snapshots.delivered(), 1);
    assert_eq!(context.snapshots.dropped(), 0);

    match scope.renderer().frames() {
        [Frame::Trace(snapshot)] => {
            assert_eq!(snapshot.len(), 64);
            assert_eq!(&snapshot[62..], &[150, 200]);
            // The crossing is the only low-to-high step over the threshold
            let crossings: Vec<usize> = snapshot
                .windows(2)
                .enumerate()
                .filter(|(_, pair)| pair[0] < 188 && pair[1] > 188)
                .map(|(i, _)| i + 1)
                .collect();
            assert_eq!(crossings, vec![63]);
        }
        other => panic!("expected one trigger frame, got {:?}", other),
    }
    assert_eq!(
        scope.task_stats(ScopeTask::TriggerRenderer).map(|s| s.wakes),
        Some(1)
    );
}

#[test]
fn falling_edge_ignored_while_armed_for_rise() {
    let bridge = bridge();
    let mut scope = scope_with(&bridge, ScopeConfig::DEFAULT, 220);

    command(&mut scope, b"tlevel rise\n");
    command(&mut scope, b"trigger on\n");
    scope.adc_mut().push_samples(&[200, 150]);
    scope.run_for(40);

    assert_eq!(scope.context().detections, 0);
}

#[test]
fn sampler_and_detector_alternate_while_armed() {
    let bridge = bridge();
    let mut scope = scope_with(&bridge, ScopeConfig::DEFAULT, 0);
    command(&mut scope, b"trigger on\n");
    assert!(!scope.context().is_handshake_engaged());

    // Detector enabled from tick 651, first released at 653
    scope.run_for(2);
    assert!(scope.context().is_handshake_engaged());
    assert_eq!(
        scope.context().handshake.signals().next(),
        Some(&Handshake::DETECTOR_READY)
    );

    for _ in 0..400 {
        scope.tick();
        let signals: Vec<Handshake> = scope.context().handshake.signals().copied().collect();
        for pair in signals.windows(2) {
            assert_ne!(pair[0], pair[1], "two {:?} signals in a row", pair[0]);
        }
    }
    assert_eq!(
        scope.task_stats(ScopeTask::Sampler).map(|s| s.dropped_releases),
        Some(0)
    );
    assert_eq!(
        scope.task_stats(ScopeTask::EdgeDetector).map(|s| s.dropped_releases),
        Some(0)
    );
}

#[test]
fn sampling_continues_after_trigger_off_and_in_pds_mode() {
    let bridge = bridge();
    let mut scope = scope_with(&bridge, ScopeConfig::DEFAULT, 0);

    command(&mut scope, b"trigger on\n");
    command(&mut scope, b"trigger off\n");
    assert!(!scope.context().is_handshake_engaged());

    command(&mut scope, b"display pds\n");
    let before = scope.context().buffer.written();
    scope.run_for(400);
    assert_eq!(scope.context().buffer.written(), before + 100);
    assert_eq!(scope.context().handshake.bits(), Handshake::empty());
}

#[test]
fn display_pds_twice_is_one_transition() {
    let bridge = bridge();
    let mut scope = scope_with(&bridge, ScopeConfig::DEFAULT, 0);

    command(&mut scope, b"display pds\n");
    assert_eq!(scope.mode().display, DisplayMode::Pds);
    assert_eq!(scope.context().transitions, 1);
    assert!(scope.is_enabled(ScopeTask::Analyzer));
    assert!(scope.is_enabled(ScopeTask::PdsRenderer));
    assert!(!scope.is_enabled(ScopeTask::TimeRenderer));

    command(&mut scope, b"display pds\n");
    assert_eq!(scope.mode().display, DisplayMode::Pds);
    assert_eq!(scope.context().transitions, 1);
    assert_display_exclusive(&scope);
}

#[test]
fn pds_mode_draws_spectra() {
    let bridge = bridge();
    let mut scope = scope_with(&bridge, ScopeConfig::DEFAULT, 50);

    command(&mut scope, b"display pds\n");
    scope.renderer_mut().clear();
    // Analyzer at 1000 and 2000, PDS renderer at 1140 and 2140
    scope.run_for(2200 - scope.now());

    assert_eq!(scope.renderer().spectrum_count(), 2);
    assert_eq!(scope.renderer().trace_count(), 0);
    assert_eq!(scope.context().frequency_domain.updates(), 2);
    // Constant input: all power in DC
    let bins = scope.context().frequency_domain.bins();
    assert!(bins[0] > 0.0);
    assert!(bins[1..].iter().all(|b| b.abs() < 1e-2));
}

#[test]
fn display_signal_restores_time_renderer() {
    let bridge = bridge();
    let mut scope = scope_with(&bridge, ScopeConfig::DEFAULT, 0);

    command(&mut scope, b"display pds\n");
    command(&mut scope, b"display signal\n");
    assert_eq!(scope.mode().display, DisplayMode::Signal);
    assert!(scope.is_enabled(ScopeTask::TimeRenderer));
    assert!(!scope.is_enabled(ScopeTask::Analyzer));
    assert_eq!(scope.context().transitions, 2);
}

#[test]
fn unknown_line_changes_nothing() {
    let bridge = bridge();
    let mut scope = scope_with(&bridge, ScopeConfig::DEFAULT, 0);
    let initial = scope.mode();

    command(&mut scope, b"trigger maybe\n");
    assert_eq!(scope.mode(), initial);
    assert_eq!(scope.context().transitions, 0);
    assert_eq!(scope.context().pending_command, Command::Invalid);
}

#[test]
fn overlong_line_never_produces_a_command() {
    let bridge = bridge();
    let mut scope = scope_with(&bridge, ScopeConfig::DEFAULT, 0);

    send(&scope, b"display signals");
    assert_eq!(bridge.position(), 0);
    assert_eq!(bridge.stats().overflows, 1);
    assert!(!bridge.is_decodable());

    settle(&mut scope);
    assert_eq!(scope.context().transitions, 0);
    assert_eq!(scope.context().pending_command, Command::Invalid);
}

#[test]
fn tail_of_overlong_line_is_not_a_command() {
    let bridge = bridge();
    let mut scope = scope_with(&bridge, ScopeConfig::DEFAULT, 0);

    send(&scope, b"xxxxxxxxxxxxxxxtrigger on\n");
    assert!(!bridge.is_decodable());
    assert_eq!(bridge.stats().overflows, 1);
    assert_eq!(bridge.stats().lines, 0);

    settle(&mut scope);
    assert!(!scope.mode().trigger.armed);
    assert!(!scope.is_enabled(ScopeTask::EdgeDetector));
    assert_eq!(scope.context().transitions, 0);
}

#[test]
fn level_fall_policy() {
    let bridge = bridge();
    let mut corrected = scope_with(&bridge, ScopeConfig::DEFAULT, 0);
    command(&mut corrected, b"tlevel rise\n");
    command(&mut corrected, b"tlevel fall\n");
    assert_eq!(corrected.mode().trigger.polarity, Polarity::Falling);

    let bridge = self::bridge();
    let literal_config = ScopeConfig {
        level_policy: LevelPolicy::Literal,
        ..ScopeConfig::DEFAULT
    };
    let mut literal = scope_with(&bridge, literal_config, 0);
    command(&mut literal, b"tlevel fall\n");
    // Literal mapping: `tlevel fall` selects the rising edge
    assert_eq!(literal.mode().trigger.polarity, Polarity::Rising);
    assert!(!literal.mode().trigger.armed);
}

fn keyword() -> impl Strategy<Value = &'static [u8]> {
    prop_oneof![
        Just(&b"display signal\n"[..]),
        Just(&b"display pds\n"[..]),
        Just(&b"trigger on\n"[..]),
        Just(&b"trigger off\n"[..]),
        Just(&b"tlevel rise\n"[..]),
        Just(&b"tlevel fall\n"[..]),
        Just(&b"bogus\n"[..]),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn display_paths_stay_exclusive(commands in proptest::collection::vec(keyword(), 1..8)) {
        let bridge = bridge();
        let mut scope = scope_with(&bridge, ScopeConfig::DEFAULT, 0);

        for line in commands {
            send(&scope, line);
            for _ in 0..STATE_MACHINE_PERIOD {
                scope.tick();
                assert_display_exclusive(&scope);
                let armed = scope.mode().trigger.armed;
                prop_assert!(scope.stats().total_dropped_releases == 0);
                if scope.now() % STATE_MACHINE_PERIOD != 1 {
                    // Outside the boundary right after the state machine ran
                    prop_assert_eq!(scope.is_enabled(ScopeTask::EdgeDetector), armed);
                }
            }
        }
    }
}
