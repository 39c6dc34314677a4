//! Unified error type for the rewindcast application.
//!
//! All crates funnel their failures into [`Error`]. Per-segment download
//! failures are deliberately NOT represented here: the prober and the
//! fetcher accumulate per-item outcomes and only raise an `Error` for
//! structural misuse (bad configuration, empty run) or for single-resource
//! requests where the caller asked for exactly one thing.

use std::fmt;

/// Unified error type covering all failure modes in rewindcast.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration value is structurally invalid (zero timescale,
    /// non-positive segment duration, empty probe window, ...). Fatal to the
    /// calling operation; raised before any request is issued.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request data failed validation (inverted time window, unparseable
    /// datetime, mismatched anchor arguments).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The probe window was fully searched without finding a valid tick.
    /// Recoverable: the caller may widen the window or fail the request.
    #[error("probe exhausted for track {track}: no valid tick in a window of {window_size}")]
    ProbeExhausted {
        /// The track that was probed.
        track: String,
        /// The window size that was fully searched.
        window_size: u64,
    },

    /// The origin answered a single-resource request with a non-success
    /// status.
    #[error("origin returned status {status} for {url}")]
    Origin {
        /// HTTP status code.
        status: u16,
        /// The URL that was requested.
        url: String,
    },

    /// A network-level failure on a single-resource request.
    #[error("Transport error: {0}")]
    Transport(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the caller can reasonably retry the operation with adjusted
    /// parameters (e.g. a wider probe window) rather than treating it as
    /// fatal.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ProbeExhausted { .. } | Error::Origin { .. } | Error::Transport(_)
        )
    }

    /// Convenience constructor for [`Error::Config`].
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// Convenience constructor for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Convenience constructor for [`Error::ProbeExhausted`].
    pub fn probe_exhausted(track: impl fmt::Display, window_size: u64) -> Self {
        Error::ProbeExhausted {
            track: track.to_string(),
            window_size,
        }
    }

    /// Convenience constructor for [`Error::Origin`].
    pub fn origin(status: u16, url: impl Into<String>) -> Self {
        Error::Origin {
            status,
            url: url.into(),
        }
    }

    /// Convenience constructor for [`Error::Transport`].
    pub fn transport(source: impl fmt::Display) -> Self {
        Error::Transport(source.to_string())
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
