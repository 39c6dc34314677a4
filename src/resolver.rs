//! Window resolution and acquisition orchestration.
//!
//! Turns a (track, wall-clock window) request into a concrete
//! [`SegmentRun`] and executes it. An anchor supplied by the caller is only
//! trusted for targets on its own calendar day; otherwise a fresh anchor is
//! discovered by probing around the target time. A probed tick is strictly
//! an existence fact: its wall-clock time is re-derived and the pair is fed
//! back through the locator like any other anchor, never used as the final
//! answer directly.

use std::sync::Arc;

use chrono::NaiveDateTime;

use rw_core::timeline::{self, Anchor};
use rw_core::{Config, Error, Result, TrackId};

use crate::fetch::{self, FetchReport, SegmentRun};
use crate::origin::OriginClient;
use crate::probe;

/// Resolve a wall-clock window to the exact fetch plan for one track.
///
/// `anchor` is used when it covers the same calendar day as `start`;
/// otherwise the window around `start` is probed for a fresh one. Window
/// start and end are aligned independently against the same anchor.
pub async fn resolve_window(
    origin: &OriginClient,
    track: &TrackId,
    start: NaiveDateTime,
    end: NaiveDateTime,
    anchor: Option<Anchor>,
    cfg: &Config,
) -> Result<SegmentRun> {
    if end <= start {
        return Err(Error::validation("window end must be after window start"));
    }

    let tl = &cfg.timeline;
    let anchor = match anchor {
        Some(a) if a.covers_day(start) => {
            tracing::debug!(track = %track, tick = a.tick, "using caller-supplied anchor");
            a
        }
        _ => discover_anchor(origin, track, start, cfg).await?,
    };

    let start_align = timeline::nearest_tick(anchor.tick, start, tl);
    let end_align = timeline::nearest_tick(anchor.tick, end, tl);
    let count = (end_align.tick - start_align.tick) / tl.segment_duration;
    if count <= 0 {
        return Err(Error::validation(
            "window is shorter than one segment after alignment",
        ));
    }

    tracing::debug!(
        track = %track,
        start_tick = start_align.tick,
        start_rep = start_align.rep,
        end_tick = end_align.tick,
        end_rep = end_align.rep,
        count,
        "resolved window"
    );

    Ok(SegmentRun {
        track: track.clone(),
        start_tick: start_align.tick,
        duration: tl.segment_duration,
        count: count as u64,
    })
}

/// Probe for a valid tick near `target` and promote the first hit to a
/// fresh anchor.
async fn discover_anchor(
    origin: &OriginClient,
    track: &TrackId,
    target: NaiveDateTime,
    cfg: &Config,
) -> Result<Anchor> {
    let tl = &cfg.timeline;
    let center = timeline::datetime_to_ticks(target, tl);
    tracing::info!(track = %track, center, "no usable anchor; probing origin");

    let hits = probe::probe_window(origin, track, center, &cfg.probe).await?;
    let Some(&tick) = hits.first() else {
        return Err(Error::probe_exhausted(track, cfg.probe.window_size));
    };

    let time = timeline::secs_to_datetime(
        timeline::ticks_to_secs(tick, tl.timescale),
        tl.offset_hours,
    );
    tracing::info!(track = %track, tick, time = %time, "probed fresh anchor");
    Ok(Anchor::new(tick, time))
}

/// Resolve a window and download the resulting run, persisting the track's
/// init blob alongside the segments.
///
/// An incomplete run is not an error: the report carries the per-tick
/// outcomes and the caller decides whether the partial result is usable.
pub async fn resolve_and_fetch(
    origin: Arc<OriginClient>,
    track: &TrackId,
    start: NaiveDateTime,
    end: NaiveDateTime,
    anchor: Option<Anchor>,
    cfg: &Config,
) -> Result<(SegmentRun, FetchReport)> {
    let run = resolve_window(&origin, track, start, end, anchor, cfg).await?;

    let dir = fetch::segment_dir(&cfg.fetch, track);
    std::fs::create_dir_all(&dir)?;

    // The init blob is needed by the external decrypt/mux step; a failure
    // here doesn't block segment acquisition.
    match origin.fetch_init(track).await {
        Ok(bytes) => {
            tokio::fs::write(dir.join("init.mp4"), &bytes).await?;
        }
        Err(e) => {
            tracing::warn!(track = %track, error = %e, "failed to download init blob");
        }
    }

    let report = fetch::fetch_run(origin, &run, &dir, &cfg.fetch).await?;
    if !report.is_complete() {
        tracing::warn!(
            track = %track,
            missing = ?report.missing_ticks(),
            "segment run is incomplete"
        );
    }
    Ok((run, report))
}
