//! Rewindcast - catch-up recorder for sliding-window live-streaming origins
//!
//! This library crate exposes the addressing-and-acquisition engine for
//! integration testing.

pub mod fetch;
pub mod origin;
pub mod probe;
pub mod resolver;
