//! Interrupt-safe shared state
//!
//! The serial ISR and the command decoder task both touch the line being
//! assembled. [`SharedState`] hides how that access is serialized:
//! [`CriticalState`] masks interrupts around every access on the target,
//! [`MockState`] is a bare `RefCell` for single-threaded host tests.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

/// Closure-scoped access to a value shared with interrupt context
///
/// Accessors never hand out references that outlive the closure, so an ISR
/// cannot observe a half-updated value.
///
/// # Example
///
/// ```
/// use pico_scope::core::traits::{MockState, SharedState};
///
/// fn on_byte<S: SharedState<heapless::Vec<u8, 4>>>(line: &S, byte: u8) -> bool {
///     line.with_mut(|line| line.push(byte).is_ok())
/// }
///
/// let line = MockState::new(heapless::Vec::new());
/// assert!(on_byte(&line, b'a'));
/// assert_eq!(line.with(|line| line.len()), 1);
/// ```
pub trait SharedState<T> {
    /// Read the value
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R;

    /// Modify the value
    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R;
}

/// State behind a critical-section mutex
///
/// Usable from an interrupt handler and from task context alike, and
/// constructible in a `static`. Interrupts stay masked while a closure runs.
pub struct CriticalState<T> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<T>>,
}

impl<T> CriticalState<T> {
    /// Wrap `value`
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }
}

impl<T> SharedState<T> for CriticalState<T> {
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        self.inner.lock(|cell| f(&cell.borrow()))
    }

    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

/// Host-test state without any locking
///
/// A nested `with_mut` inside `with` panics on the `RefCell` borrow.
pub struct MockState<T> {
    inner: RefCell<T>,
}

impl<T> MockState<T> {
    /// Wrap `value`
    pub fn new(value: T) -> Self {
        Self {
            inner: RefCell::new(value),
        }
    }
}

impl<T> SharedState<T> for MockState<T> {
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.inner.borrow())
    }

    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        f(&mut self.inner.borrow_mut())
    }
}
