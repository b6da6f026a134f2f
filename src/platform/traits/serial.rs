//! Serial receiver interface trait
//!
//! This module defines the receive side of the UART driver as seen from the
//! serial interrupt handler.

/// Byte-wise serial receiver
///
/// The command bridge is the sole consumer. Both methods are called from
/// interrupt context and must not block.
pub trait SerialReceiver {
    /// Check if a received byte is waiting
    fn char_available(&self) -> bool;

    /// Take the next received byte
    ///
    /// Only meaningful after `char_available()` returned `true`.
    fn getc(&mut self) -> u8;
}
