//! Serial command pipeline
//!
//! Bytes cross from interrupt context to task context in three stages:
//!
//! 1. [`CommandBridge::on_interrupt`] runs in the serial ISR. It takes one byte
//!    into a one-byte mailbox, or leaves it in the receiver if the mailbox is
//!    still occupied.
//! 2. [`CommandBridge::run_deferred`] runs in the deferred handler. It moves the
//!    mailbox byte into the line being assembled; a `\n` completes the line.
//! 3. [`CommandBridge::decode_completed`] runs in the command decoder task and
//!    turns a completed line into a [`Command`].
//!
//! # Wire format
//!
//! ASCII lines terminated by `\n`, at most [`LINE_CAPACITY`] characters,
//! matched case-sensitively and exactly against:
//!
//! | Line             | Command                   |
//! |------------------|---------------------------|
//! | `display signal` | [`Command::DisplaySignal`] |
//! | `display pds`    | [`Command::DisplayPds`]    |
//! | `trigger on`     | [`Command::TriggerOn`]     |
//! | `trigger off`    | [`Command::TriggerOff`]    |
//! | `tlevel rise`    | [`Command::TriggerRise`]   |
//! | `tlevel fall`    | [`Command::TriggerFall`]   |
//!
//! Anything else decodes to [`Command::Invalid`].

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;

use crate::core::traits::SharedState;
use crate::platform::SerialReceiver;

use super::config::LINE_CAPACITY;
use super::error::CommandError;

/// Line terminator
pub const LINE_TERMINATOR: u8 = b'\n';

/// Operator command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Show the time-domain trace
    DisplaySignal,
    /// Show the spectrum
    DisplayPds,
    /// Arm the trigger
    TriggerOn,
    /// Disarm the trigger
    TriggerOff,
    /// Trigger on rising edges
    TriggerRise,
    /// Trigger on falling edges
    TriggerFall,
    /// Unknown text, or no command pending
    #[default]
    Invalid,
}

impl Command {
    const KEYWORDS: [(&'static [u8], Command); 6] = [
        (b"display signal", Command::DisplaySignal),
        (b"display pds", Command::DisplayPds),
        (b"trigger on", Command::TriggerOn),
        (b"trigger off", Command::TriggerOff),
        (b"tlevel rise", Command::TriggerRise),
        (b"tlevel fall", Command::TriggerFall),
    ];

    /// Decode a line (terminator excluded)
    pub fn decode(line: &[u8]) -> Command {
        Self::KEYWORDS
            .iter()
            .find(|(keyword, _)| *keyword == line)
            .map(|(_, command)| *command)
            .unwrap_or(Command::Invalid)
    }
}

/// Result of the interrupt stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IsrOutcome {
    /// Nothing to receive
    Handled,
    /// A byte is in the mailbox; run the deferred stage
    CallDeferred,
    /// The mailbox was occupied; the byte stays in the receiver
    Busy,
}

/// Result of feeding one byte to the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineStatus {
    /// The mailbox was empty
    Idle,
    /// Byte appended, line not finished
    Incomplete,
    /// Terminator received; the line is ready for decoding
    Complete,
    /// Byte swallowed; part of a line that overflowed
    Discarding,
    /// Terminator of an overflowed line; nothing to decode
    Discarded,
}

/// Counters of the command pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Bytes taken from the receiver
    pub received: u32,
    /// Interrupts that found the mailbox occupied
    pub busy: u32,
    /// Lines completed
    pub lines: u32,
    /// Lines discarded for exceeding the capacity
    pub overflows: u32,
    /// Completed lines replaced before they were decoded
    pub replaced: u32,
}

/// Line being assembled plus the last completed, not yet decoded line
///
/// Once a line overflows, every byte up to and including its terminator is
/// swallowed, so no tail of an overlong line is ever decoded.
#[derive(Debug, Default)]
pub struct CommandLine {
    partial: Vec<u8, LINE_CAPACITY>,
    completed: Option<Vec<u8, LINE_CAPACITY>>,
    discarding: bool,
    stats: BridgeStats,
}

impl CommandLine {
    /// Empty line
    pub const fn new() -> Self {
        Self {
            partial: Vec::new(),
            completed: None,
            discarding: false,
            stats: BridgeStats {
                received: 0,
                busy: 0,
                lines: 0,
                overflows: 0,
                replaced: 0,
            },
        }
    }

    /// Append one byte
    ///
    /// # Errors
    ///
    /// [`CommandError::BufferOverflow`] if the line is already full; the
    /// partial line is dropped and the rest of it, up to the next `\n`, is
    /// swallowed.
    pub fn push(&mut self, byte: u8) -> Result<LineStatus, CommandError> {
        if self.discarding {
            if byte == LINE_TERMINATOR {
                self.discarding = false;
                return Ok(LineStatus::Discarded);
            }
            return Ok(LineStatus::Discarding);
        }

        if byte == LINE_TERMINATOR {
            let line = core::mem::take(&mut self.partial);
            if self.completed.replace(line).is_some() {
                self.stats.replaced = self.stats.replaced.saturating_add(1);
            }
            self.stats.lines = self.stats.lines.saturating_add(1);
            return Ok(LineStatus::Complete);
        }

        if self.partial.push(byte).is_err() {
            self.partial.clear();
            self.discarding = true;
            self.stats.overflows = self.stats.overflows.saturating_add(1);
            return Err(CommandError::BufferOverflow {
                capacity: LINE_CAPACITY,
            });
        }
        Ok(LineStatus::Incomplete)
    }

    /// Characters of the line being assembled (the write position)
    pub fn position(&self) -> usize {
        self.partial.len()
    }

    /// Whether a completed line waits for the decoder
    pub fn is_decodable(&self) -> bool {
        self.completed.is_some()
    }

    /// Whether the rest of an overflowed line is being swallowed
    pub fn is_discarding(&self) -> bool {
        self.discarding
    }

    /// Take the completed line, if any
    pub fn take_completed(&mut self) -> Option<Vec<u8, LINE_CAPACITY>> {
        self.completed.take()
    }

    /// Pipeline counters
    pub fn stats(&self) -> BridgeStats {
        self.stats
    }
}

/// ISR to task bridge for serial commands
///
/// Every method takes `&self`, so a single bridge can live in a `static`
/// shared by the interrupt handler and the command decoder task.
pub struct CommandBridge<S: SharedState<CommandLine>> {
    mailbox: Channel<CriticalSectionRawMutex, u8, 1>,
    line: S,
}

impl<S: SharedState<CommandLine>> CommandBridge<S> {
    /// Create a bridge around `line` storage
    pub const fn new(line: S) -> Self {
        Self {
            mailbox: Channel::new(),
            line,
        }
    }

    /// Interrupt stage: move at most one byte into the mailbox
    ///
    /// Never blocks and never loops.
    pub fn on_interrupt<R: SerialReceiver + ?Sized>(&self, serial: &mut R) -> IsrOutcome {
        if self.mailbox.is_full() {
            self.line
                .with_mut(|line| line.stats.busy = line.stats.busy.saturating_add(1));
            return IsrOutcome::Busy;
        }
        if !serial.char_available() {
            return IsrOutcome::Handled;
        }

        let byte = serial.getc();
        match self.mailbox.try_send(byte) {
            Ok(()) => {
                self.line.with_mut(|line| {
                    line.stats.received = line.stats.received.saturating_add(1)
                });
                IsrOutcome::CallDeferred
            }
            Err(_) => IsrOutcome::Busy,
        }
    }

    /// Deferred stage: drain the mailbox into the line
    ///
    /// # Errors
    ///
    /// [`CommandError::BufferOverflow`] when the line was discarded. The
    /// rest of the line up to its `\n` is swallowed; callers only need to log it.
    pub fn run_deferred(&self) -> Result<LineStatus, CommandError> {
        let Ok(byte) = self.mailbox.try_receive() else {
            return Ok(LineStatus::Idle);
        };
        self.line.with_mut(|line| line.push(byte))
    }

    /// Decoder stage: decode the completed line, if any
    ///
    /// Returns `None` if no line was completed since the last call. An
    /// unknown line yields `Some(Command::Invalid)`.
    pub fn decode_completed(&self) -> Option<Command> {
        let line = self.line.with_mut(|line| line.take_completed())?;
        let command = Command::decode(&line);
        if command == Command::Invalid {
            crate::log_debug!("Unknown command line ({} bytes)", line.len());
        }
        Some(command)
    }

    /// Whether a byte waits in the mailbox
    pub fn has_pending_byte(&self) -> bool {
        self.mailbox.is_full()
    }

    /// Write position of the line being assembled
    pub fn position(&self) -> usize {
        self.line.with(|line| line.position())
    }

    /// Whether a completed line waits for the decoder
    pub fn is_decodable(&self) -> bool {
        self.line.with(|line| line.is_decodable())
    }

    /// Pipeline counters
    pub fn stats(&self) -> BridgeStats {
        self.line.with(|line| line.stats())
    }

    /// Run the interrupt and deferred stages until `serial` is drained
    ///
    /// Host-side helper standing in for the interrupt controller. Overflows
    /// are logged and skipped. Returns the number of completed lines.
    pub fn pump<R: SerialReceiver + ?Sized>(&self, serial: &mut R) -> usize {
        let mut completed = 0;
        while self.on_interrupt(serial) == IsrOutcome::CallDeferred {
            match self.run_deferred() {
                Ok(LineStatus::Complete) => completed += 1,
                Ok(_) => {}
                Err(_e) => crate::log_warn!("Serial line dropped: {}", _e),
            }
        }
        completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::MockState;
    use crate::platform::mock::MockSerial;

    fn bridge() -> CommandBridge<MockState<CommandLine>> {
        CommandBridge::new(MockState::new(CommandLine::new()))
    }

    #[test]
    fn test_decode_exact_keywords() {
        assert_eq!(Command::decode(b"display signal"), Command::DisplaySignal);
        assert_eq!(Command::decode(b"display pds"), Command::DisplayPds);
        assert_eq!(Command::decode(b"trigger on"), Command::TriggerOn);
        assert_eq!(Command::decode(b"trigger off"), Command::TriggerOff);
        assert_eq!(Command::decode(b"tlevel rise"), Command::TriggerRise);
        assert_eq!(Command::decode(b"tlevel fall"), Command::TriggerFall);
    }

    #[test]
    fn test_decode_rejects_near_misses() {
        assert_eq!(Command::decode(b"Trigger on"), Command::Invalid);
        assert_eq!(Command::decode(b"trigger on "), Command::Invalid);
        assert_eq!(Command::decode(b"trigger"), Command::Invalid);
        assert_eq!(Command::decode(b""), Command::Invalid);
    }

    #[test]
    fn test_line_completes_on_terminator() {
        let mut line = CommandLine::new();
        for b in b"trigger on" {
            assert_eq!(line.push(*b), Ok(LineStatus::Incomplete));
        }
        assert_eq!(line.position(), 10);
        assert_eq!(line.push(b'\n'), Ok(LineStatus::Complete));
        assert_eq!(line.position(), 0);
        assert_eq!(line.take_completed().as_deref(), Some(&b"trigger on"[..]));
        assert!(!line.is_decodable());
    }

    #[test]
    fn test_line_overflow_discards_and_restarts() {
        let mut line = CommandLine::new();
        for b in b"display signal" {
            assert!(line.push(*b).is_ok());
        }
        assert_eq!(
            line.push(b'!'),
            Err(CommandError::BufferOverflow { capacity: 14 })
        );
        assert_eq!(line.position(), 0);
        assert!(!line.is_decodable());
        assert!(line.is_discarding());
        assert_eq!(line.stats().overflows, 1);

        // Tail of the overlong line is swallowed up to its terminator
        for b in b"trigger on" {
            assert_eq!(line.push(*b), Ok(LineStatus::Discarding));
        }
        assert_eq!(line.push(b'\n'), Ok(LineStatus::Discarded));
        assert!(!line.is_discarding());
        assert!(!line.is_decodable());
        assert_eq!(line.stats().lines, 0);

        for b in b"trigger on\n" {
            let _ = line.push(*b);
        }
        assert_eq!(line.take_completed().as_deref(), Some(&b"trigger on"[..]));
        assert_eq!(line.stats().lines, 1);
        assert_eq!(line.stats().overflows, 1);
    }

    #[test]
    fn test_overlong_line_tail_never_decodes() {
        let bridge = bridge();
        let mut serial = MockSerial::new();
        serial.inject_rx_data(b"xxxxxxxxxxxxxxxtrigger on\n");

        assert_eq!(bridge.pump(&mut serial), 0);
        assert_eq!(bridge.decode_completed(), None);
        let stats = bridge.stats();
        assert_eq!(stats.overflows, 1);
        assert_eq!(stats.lines, 0);
    }

    #[test]
    fn test_newer_completed_line_replaces_undecoded_one() {
        let mut line = CommandLine::new();
        for b in b"trigger on\ntrigger off\n" {
            let _ = line.push(*b);
        }
        assert_eq!(line.stats().replaced, 1);
        assert_eq!(line.take_completed().as_deref(), Some(&b"trigger off"[..]));
    }

    #[test]
    fn test_isr_leaves_byte_when_mailbox_busy() {
        let bridge = bridge();
        let mut serial = MockSerial::new();
        serial.inject_rx_data(b"ab");

        assert_eq!(bridge.on_interrupt(&mut serial), IsrOutcome::CallDeferred);
        assert_eq!(bridge.on_interrupt(&mut serial), IsrOutcome::Busy);
        assert_eq!(serial.pending(), 1);
        assert_eq!(bridge.stats().busy, 1);

        assert_eq!(bridge.run_deferred(), Ok(LineStatus::Incomplete));
        assert_eq!(bridge.on_interrupt(&mut serial), IsrOutcome::CallDeferred);
        assert_eq!(bridge.run_deferred(), Ok(LineStatus::Incomplete));
        assert_eq!(bridge.on_interrupt(&mut serial), IsrOutcome::Handled);
        assert_eq!(bridge.position(), 2);
        assert_eq!(bridge.stats().received, 2);
    }

    #[test]
    fn test_deferred_without_byte_is_idle() {
        let bridge = bridge();
        assert_eq!(bridge.run_deferred(), Ok(LineStatus::Idle));
    }

    #[test]
    fn test_pump_and_decode() {
        let bridge = bridge();
        let mut serial = MockSerial::new();
        serial.inject_rx_data(b"tlevel rise\nhello\n");

        assert_eq!(bridge.pump(&mut serial), 2);
        // Latest completed line wins
        assert_eq!(bridge.decode_completed(), Some(Command::Invalid));
        assert_eq!(bridge.decode_completed(), None);
    }
}
