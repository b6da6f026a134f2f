//! Mock serial receiver for testing

use crate::platform::traits::SerialReceiver;
use std::collections::VecDeque;

/// Mock serial receiver
///
/// Holds injected bytes in an in-memory FIFO so tests can drive the serial
/// interrupt path without hardware.
///
/// # Example
///
/// ```
/// use pico_scope::platform::mock::MockSerial;
/// use pico_scope::platform::traits::SerialReceiver;
///
/// let mut serial = MockSerial::new();
/// serial.inject_rx_data(b"ok");
///
/// assert!(serial.char_available());
/// assert_eq!(serial.getc(), b'o');
/// assert_eq!(serial.getc(), b'k');
/// assert!(!serial.char_available());
/// ```
#[derive(Debug, Default)]
pub struct MockSerial {
    rx_buffer: VecDeque<u8>,
    read_count: usize,
}

impl MockSerial {
    /// Create a new mock receiver with an empty FIFO
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject receive data (for test setup)
    pub fn inject_rx_data(&mut self, data: &[u8]) {
        self.rx_buffer.extend(data.iter().copied());
    }

    /// Bytes still waiting in the FIFO
    pub fn pending(&self) -> usize {
        self.rx_buffer.len()
    }

    /// Bytes taken with `getc` so far
    pub fn read_count(&self) -> usize {
        self.read_count
    }
}

impl SerialReceiver for MockSerial {
    fn char_available(&self) -> bool {
        !self.rx_buffer.is_empty()
    }

    fn getc(&mut self) -> u8 {
        self.read_count += 1;
        self.rx_buffer.pop_front().unwrap_or(0)
    }
}
