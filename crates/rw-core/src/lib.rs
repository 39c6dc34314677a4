//! rw-core: shared types, errors, configuration, and timeline algebra.
//!
//! This crate is the foundational dependency for the other rw-* crates and
//! the rewindcast binary. It owns the unified error type, the application
//! configuration, the opaque track identifier, and the pure tick/time
//! conversion and alignment logic. It performs no I/O.

pub mod config;
pub mod error;
pub mod ids;
pub mod timeline;

// Re-export the most commonly used items at the crate root.
pub use config::Config;
pub use error::{Error, Result};
pub use ids::TrackId;
pub use timeline::{Alignment, Anchor, Direction, Tick};
