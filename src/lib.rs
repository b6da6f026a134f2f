#![cfg_attr(not(test), no_std)]

//! pico_scope - Control core of an embedded digital storage oscilloscope
//!
//! This library provides the real-time coordination layer of the scope:
//! a cyclic task scheduler, the sample ring shared by the sampler, trigger
//! detector and analyzer, the serial command pipeline and the mode state
//! machine that reconfigures which periodic tasks run.

#[cfg(any(test, feature = "mock"))]
extern crate std;

// Core systems (scheduler, event flags, logging, shared state)
pub mod core;

// Collaborator boundary (ADC, serial receiver, renderer)
pub mod platform;

// Oscilloscope control core
pub mod scope;
