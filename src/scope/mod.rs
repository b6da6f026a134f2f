//! Oscilloscope control core
//!
//! The scope samples an analog input at a fixed rate, watches it for trigger
//! edges, computes its spectrum and renders either the trace or the spectrum.
//! An operator switches modes over a serial line.
//!
//! # Components
//!
//! - [`buffer`]: Sample ring with per-consumer read cursors
//! - [`trigger`]: Edge detection and the snapshot hand-off
//! - [`spectrum`]: Spectral transform and the frequency-domain store
//! - [`command`]: Serial ISR to task command pipeline
//! - [`mode`]: Operating mode and its transition table
//! - [`context`]: State shared by the tasks
//! - [`tasks`]: Task bodies
//! - [`app`]: Scheduler wiring
//! - [`config`], [`error`]: Configuration and error types
//!
//! # Tasks
//!
//! | Task             | Does                                                  |
//! |------------------|-------------------------------------------------------|
//! | sampler          | one ADC read per release into the ring                |
//! | edge detector    | checks the two newest samples, hands off a snapshot   |
//! | analyzer         | spectrum of the whole ring                            |
//! | time renderer    | plots the ring                                        |
//! | PDS renderer     | plots the spectrum                                    |
//! | trigger renderer | plots a snapshot; woken only by the edge detector     |
//! | command decoder  | decodes completed serial lines                        |
//! | state machine    | applies the latest command to the mode and schedules  |

pub mod app;
pub mod buffer;
pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod mode;
pub mod spectrum;
pub mod tasks;
pub mod trigger;

pub use app::Oscilloscope;
pub use buffer::{CircularBuffer, ReadCursor, WindowRead};
pub use command::{
    BridgeStats, Command, CommandBridge, CommandLine, IsrOutcome, LineStatus, LINE_TERMINATOR,
};
pub use config::{
    ScopeConfig, ScopeTask, TaskTiming, DEFAULT_THRESHOLD, LINE_CAPACITY, PDS_LENGTH,
    TIME_DOMAIN_LENGTH,
};
pub use context::{Handshake, HandshakeState, ScopeContext};
pub use error::{CommandError, ConfigError, ScopeError};
pub use mode::{
    DisplayMode, LevelPolicy, Mode, TaskSet, Transition, TransitionOutcome, TriggerMode,
};
pub use spectrum::{FrequencyDomain, PowerDensity64, SpectralTransform};
pub use tasks::ScopeTasks;
pub use trigger::{crossing, Edge, EdgeMask, Polarity, Snapshot, SnapshotChannel, TriggerSettings};
