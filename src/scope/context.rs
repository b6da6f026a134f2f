//! Shared scope state
//!
//! One [`ScopeContext`] holds everything the tasks share: the sample ring, the
//! sampler/detector handshake flags, the snapshot channel, the spectrum, the
//! analyzer cursor, the current mode and the pending command. It is owned by
//! the task set and handed to each task body by reference; nothing here is a
//! global.

use bitflags::bitflags;

use crate::core::flags::EventFlagGroup;
use crate::platform::Sample;

use super::buffer::{CircularBuffer, ReadCursor};
use super::command::Command;
use super::config::{ScopeConfig, PDS_LENGTH, TIME_DOMAIN_LENGTH};
use super::mode::{LevelPolicy, Mode};
use super::spectrum::FrequencyDomain;
use super::trigger::{SnapshotChannel, TriggerSettings};

bitflags! {
    /// Sampler/detector handshake bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Handshake: u32 {
        /// A new sample was written ("sample ready")
        const SAMPLE_READY = 0x02;
        /// The detector consumed the last sample ("detector ready")
        const DETECTOR_READY = 0x20;
    }
}

/// Sampler/detector handshake state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeState {
    /// Sampler runs alone
    Off,
    /// Detector was enabled; its first run starts the ping-pong
    Requested,
    /// Sampler and detector alternate
    Engaged,
}

/// State shared by the scope tasks
pub struct ScopeContext<const N: usize = TIME_DOMAIN_LENGTH, const M: usize = PDS_LENGTH> {
    /// Sample ring; the sampler is the only writer
    pub buffer: CircularBuffer<N>,
    /// Sampler/detector handshake
    pub handshake: EventFlagGroup<Handshake>,
    handshake_state: HandshakeState,
    /// Edge detector to trigger renderer hand-off
    pub snapshots: SnapshotChannel<N>,
    /// Latest spectrum
    pub frequency_domain: FrequencyDomain<M>,
    /// Analyzer read position
    pub analyzer_cursor: ReadCursor,
    /// Current operating mode; written only by the state machine
    pub mode: Mode,
    /// Latest decoded command, consumed by the state machine
    pub pending_command: Command,
    /// Edge-detection threshold
    pub threshold: Sample,
    /// Handling of `tlevel fall`
    pub level_policy: LevelPolicy,
    /// Edges detected so far
    pub detections: u32,
    /// Mode transitions applied so far
    pub transitions: u32,
}

impl<const N: usize, const M: usize> ScopeContext<N, M> {
    /// Fresh context in the start-up mode of `config`
    pub fn new(config: &ScopeConfig) -> Self {
        let mut context = Self {
            buffer: CircularBuffer::new(),
            handshake: EventFlagGroup::new(Handshake::empty()),
            handshake_state: HandshakeState::Off,
            snapshots: SnapshotChannel::new(),
            frequency_domain: FrequencyDomain::new(),
            analyzer_cursor: ReadCursor::new(),
            mode: Mode::initial(config.initial_polarity),
            pending_command: Command::Invalid,
            threshold: config.threshold,
            level_policy: config.level_policy,
            detections: 0,
            transitions: 0,
        };
        if context.mode.trigger.armed {
            context.request_handshake();
        }
        context
    }

    /// Ask the detector to start the ping-pong on its next run
    ///
    /// Engaging from the detector keeps the alternation in phase with the
    /// detector's release, wherever the sampler is in its period.
    pub fn request_handshake(&mut self) {
        if self.handshake_state == HandshakeState::Off {
            self.handshake_state = HandshakeState::Requested;
        }
    }

    /// Start the ping-pong from the detector side
    ///
    /// Lowers both bits and restarts the signal history; the detector raises
    /// "detector ready" when it finishes, so the sampler goes next.
    pub fn engage_handshake(&mut self) {
        self.handshake.reset();
        self.handshake_state = HandshakeState::Engaged;
    }

    /// Stop the ping-pong; the sampler then runs without waiting
    pub fn disengage_handshake(&mut self) {
        self.handshake.clear(Handshake::SAMPLE_READY | Handshake::DETECTOR_READY);
        self.handshake_state = HandshakeState::Off;
    }

    /// Current handshake state
    pub fn handshake_state(&self) -> HandshakeState {
        self.handshake_state
    }

    /// Whether the sampler and detector currently alternate
    pub fn is_handshake_engaged(&self) -> bool {
        self.handshake_state == HandshakeState::Engaged
    }

    /// Detector settings for the current mode
    pub fn trigger_settings(&self) -> TriggerSettings {
        self.mode.trigger_settings(self.threshold)
    }
}
