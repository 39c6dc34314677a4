//! Brute-force tick discovery against the origin.
//!
//! When no timeline anchor is known for the requested day, the only way to
//! find a usable tick is to existence-check candidates around a guessed
//! center. Candidates are probed in ordered batches: the batch size bounds
//! the number of concurrent requests to the origin, and the probe stops at
//! the first batch containing any valid tick. A single hit anywhere is
//! enough to bootstrap an anchor, so exhaustive search is never needed.

use std::ops::Range;
use std::time::Instant;

use futures::stream::{FuturesUnordered, StreamExt};
use rw_core::config::ProbeConfig;
use rw_core::{Error, Result, Tick, TrackId};

use crate::origin::OriginClient;

/// Outcome of one fully-drained probe batch.
enum BatchOutcome {
    /// At least one candidate exists; the probe terminates.
    Found(Vec<Tick>),
    /// Nothing in this batch; move on to the next.
    Continue,
}

/// Probe `[center_tick, center_tick + window_size)` for ticks the origin
/// currently serves, in batches of `batch_size`.
///
/// Returns the valid ticks from the first non-empty batch in completion
/// order, or an empty vec if the whole window came up dry. Exhaustion is a
/// normal, reportable outcome here; the caller decides whether it is an
/// error.
pub async fn probe_window(
    origin: &OriginClient,
    track: &TrackId,
    center_tick: Tick,
    cfg: &ProbeConfig,
) -> Result<Vec<Tick>> {
    if cfg.window_size == 0 || cfg.batch_size == 0 {
        return Err(Error::config(
            "probe window_size and batch_size must be nonzero",
        ));
    }

    let started = Instant::now();
    let mut checked = 0u64;

    let mut batch_start = 0u64;
    while batch_start < cfg.window_size {
        let batch_end = (batch_start + cfg.batch_size).min(cfg.window_size);
        tracing::debug!(
            track = %track,
            center_tick,
            batch_start,
            batch_end,
            "probing batch"
        );
        checked += batch_end - batch_start;

        match probe_batch(origin, track, center_tick, batch_start..batch_end).await {
            BatchOutcome::Found(ticks) => {
                let elapsed = started.elapsed();
                tracing::debug!(
                    track = %track,
                    hits = ticks.len(),
                    checked,
                    elapsed_secs = elapsed.as_secs_f64(),
                    rate = checked as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
                    "probe found valid ticks"
                );
                return Ok(ticks);
            }
            BatchOutcome::Continue => {}
        }

        batch_start = batch_end;
    }

    tracing::debug!(
        track = %track,
        checked,
        elapsed_secs = started.elapsed().as_secs_f64(),
        "probe window exhausted"
    );
    Ok(Vec::new())
}

/// Issue one existence check per offset in `offsets`, all concurrently, and
/// drain them to completion. Hits are collected in completion order, not
/// offset order.
async fn probe_batch(
    origin: &OriginClient,
    track: &TrackId,
    center_tick: Tick,
    offsets: Range<u64>,
) -> BatchOutcome {
    let mut pending: FuturesUnordered<_> = offsets
        .map(|offset| {
            let tick = center_tick + offset as Tick;
            async move { origin.probe_segment(track, tick).await.then_some(tick) }
        })
        .collect();

    let mut hits = Vec::new();
    while let Some(result) = pending.next().await {
        if let Some(tick) = result {
            hits.push(tick);
        }
    }

    if hits.is_empty() {
        BatchOutcome::Continue
    } else {
        BatchOutcome::Found(hits)
    }
}
