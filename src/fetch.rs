//! Concurrent acquisition of a contiguous segment run.
//!
//! Every segment in the run is downloaded under a shared concurrency
//! ceiling; each download independently succeeds (payload persisted) or
//! fails (recorded), and one failure never aborts or blocks the others. The
//! run always drains to completion; outcomes are attributed by logical
//! index, never by arrival order, so downstream consumers can locate a
//! specific segment regardless of how the downloads interleaved.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio::sync::Semaphore;

use rw_core::config::FetchConfig;
use rw_core::{Error, Result, Tick, TrackId};

use crate::origin::OriginClient;

/// The fully specified fetch plan for one contiguous time window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentRun {
    pub track: TrackId,
    pub start_tick: Tick,
    /// Tick distance between consecutive segments.
    pub duration: i64,
    /// Number of segments in the run; always positive.
    pub count: u64,
}

impl SegmentRun {
    /// The tick addressed by logical index `index` in `[0, count)`.
    pub fn tick_at(&self, index: u64) -> Tick {
        self.start_tick + index as i64 * self.duration
    }
}

/// What happened to one segment of the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentResult {
    /// Downloaded and persisted at the given path.
    Saved(PathBuf),
    /// Download or persistence failed; the segment is missing from disk.
    Failed,
}

/// Per-segment outcome, attributed by logical index and tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchOutcome {
    pub index: u64,
    pub tick: Tick,
    pub result: SegmentResult,
}

impl FetchOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self.result, SegmentResult::Saved(_))
    }
}

/// Aggregate result of a segment run fetch: one outcome per index, plus the
/// success count the caller needs to judge whether the partial run is
/// usable.
#[derive(Debug, Clone, Serialize)]
pub struct FetchReport {
    pub outcomes: Vec<FetchOutcome>,
    pub succeeded: usize,
}

impl FetchReport {
    fn new(outcomes: Vec<FetchOutcome>) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_saved()).count();
        Self {
            outcomes,
            succeeded,
        }
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded
    }

    /// Whether every expected tick was actually obtained. Downstream
    /// container assembly assumes full contiguity, so anything less needs an
    /// explicit caller decision.
    pub fn is_complete(&self) -> bool {
        self.failed() == 0
    }

    /// Ticks that were not obtained, in run order.
    pub fn missing_ticks(&self) -> Vec<Tick> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_saved())
            .map(|o| o.tick)
            .collect()
    }
}

/// The directory one track's segments are persisted into.
pub fn segment_dir(cfg: &FetchConfig, track: &TrackId) -> PathBuf {
    cfg.output_dir.join(format!("segments_{track}"))
}

/// Download every segment of `run` into `dir`, with at most
/// `cfg.concurrency` requests in flight.
///
/// Returns only after every download has completed or definitively failed;
/// there is no early exit and no internal retry. Segments are persisted as
/// `<tick>.m4s` so external tooling can enumerate them in tick order.
pub async fn fetch_run(
    origin: Arc<OriginClient>,
    run: &SegmentRun,
    dir: &Path,
    cfg: &FetchConfig,
) -> Result<FetchReport> {
    if run.count == 0 {
        return Err(Error::config("segment run count must be positive"));
    }
    if cfg.concurrency == 0 {
        return Err(Error::config("fetch concurrency must be nonzero"));
    }
    std::fs::create_dir_all(dir)?;

    tracing::info!(
        track = %run.track,
        start_tick = run.start_tick,
        count = run.count,
        "starting segment run download"
    );
    let started = Instant::now();

    let semaphore = Arc::new(Semaphore::new(cfg.concurrency));
    let mut handles = Vec::with_capacity(run.count as usize);

    for index in 0..run.count {
        let tick = run.tick_at(index);
        let path = dir.join(format!("{tick}.m4s"));
        let origin = origin.clone();
        let track = run.track.clone();
        let sem = semaphore.clone();

        handles.push(tokio::spawn(async move {
            let _permit = sem.acquire().await.expect("semaphore closed");

            match origin.fetch_segment(&track, tick).await {
                Ok(bytes) => match tokio::fs::write(&path, &bytes).await {
                    Ok(()) => SegmentResult::Saved(path),
                    Err(e) => {
                        tracing::warn!(index, tick, error = %e, "failed to persist segment");
                        SegmentResult::Failed
                    }
                },
                Err(e) => {
                    tracing::warn!(index, tick, error = %e, "failed to download segment");
                    SegmentResult::Failed
                }
            }
        }));
    }

    // Join in index order: each task owns exactly one result slot, so the
    // report is index-addressed no matter how the downloads completed.
    let mut outcomes = Vec::with_capacity(handles.len());
    for (index, handle) in handles.into_iter().enumerate() {
        let index = index as u64;
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(index, error = %e, "segment download task panicked");
                SegmentResult::Failed
            }
        };
        outcomes.push(FetchOutcome {
            index,
            tick: run.tick_at(index),
            result,
        });
    }

    let report = FetchReport::new(outcomes);
    let elapsed = started.elapsed();
    tracing::info!(
        track = %run.track,
        succeeded = report.succeeded,
        failed = report.failed(),
        elapsed_secs = elapsed.as_secs_f64(),
        "segment run download finished"
    );
    Ok(report)
}
