//! Integration tests for the concurrent segment fetcher.

mod common;

use common::{origin_config, segment_path};

use std::sync::Arc;

use assert_matches::assert_matches;
use rewindcast::fetch::{fetch_run, SegmentResult, SegmentRun};
use rewindcast::origin::OriginClient;
use rw_core::config::FetchConfig;
use rw_core::{Error, TrackId};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ten_segment_run(track: &TrackId) -> SegmentRun {
    SegmentRun {
        track: track.clone(),
        start_tick: 1_000,
        duration: 10,
        count: 10,
    }
}

/// Serve every tick of `run` except the given indices, with the tick's
/// big-endian bytes as the body.
async fn mount_run_except(server: &MockServer, run: &SegmentRun, missing: &[u64]) {
    for index in 0..run.count {
        if missing.contains(&index) {
            continue;
        }
        let tick = run.tick_at(index);
        Mock::given(method("GET"))
            .and(path(segment_path(&run.track, tick)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(tick.to_be_bytes().to_vec()))
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn partial_failure_reports_every_index() {
    let server = MockServer::start().await;
    let track = TrackId::from("0_1_384");
    let run = ten_segment_run(&track);
    mount_run_except(&server, &run, &[3, 7]).await;

    let origin = Arc::new(OriginClient::new(origin_config(&server)).unwrap());
    let dir = tempfile::tempdir().unwrap();
    let cfg = FetchConfig {
        concurrency: 4,
        output_dir: dir.path().to_path_buf(),
    };

    let report = fetch_run(origin, &run, dir.path(), &cfg).await.unwrap();

    // All ten outcomes are present and index-addressed, regardless of
    // completion order.
    assert_eq!(report.outcomes.len(), 10);
    for (i, outcome) in report.outcomes.iter().enumerate() {
        assert_eq!(outcome.index, i as u64);
        assert_eq!(outcome.tick, run.tick_at(i as u64));
    }

    assert_eq!(report.succeeded, 8);
    assert_eq!(report.failed(), 2);
    assert!(!report.is_complete());
    assert_eq!(report.missing_ticks(), vec![1_030, 1_070]);
    assert_matches!(report.outcomes[3].result, SegmentResult::Failed);
    assert_matches!(report.outcomes[7].result, SegmentResult::Failed);

    // Successful segments landed on disk named by tick; failed ones did not.
    assert_eq!(
        std::fs::read(dir.path().join("1000.m4s")).unwrap(),
        1_000i64.to_be_bytes()
    );
    assert!(!dir.path().join("1030.m4s").exists());
}

#[tokio::test]
async fn complete_run_persists_every_segment() {
    let server = MockServer::start().await;
    let track = TrackId::from("0_1_3524");
    let run = SegmentRun {
        track: track.clone(),
        start_tick: 288_000,
        duration: 288_000,
        count: 3,
    };
    mount_run_except(&server, &run, &[]).await;

    let origin = Arc::new(OriginClient::new(origin_config(&server)).unwrap());
    let dir = tempfile::tempdir().unwrap();
    let cfg = FetchConfig {
        concurrency: 2,
        output_dir: dir.path().to_path_buf(),
    };

    let report = fetch_run(origin, &run, dir.path(), &cfg).await.unwrap();
    assert!(report.is_complete());
    assert_eq!(report.succeeded, 3);
    assert!(report.missing_ticks().is_empty());

    for index in 0..run.count {
        let tick = run.tick_at(index);
        assert!(dir.path().join(format!("{tick}.m4s")).exists());
    }
}

#[tokio::test]
async fn zero_count_is_a_config_error() {
    let server = MockServer::start().await;
    let track = TrackId::from("0_1_384");
    let run = SegmentRun {
        track,
        start_tick: 1_000,
        duration: 10,
        count: 0,
    };

    let origin = Arc::new(OriginClient::new(origin_config(&server)).unwrap());
    let dir = tempfile::tempdir().unwrap();
    let cfg = FetchConfig {
        concurrency: 4,
        output_dir: dir.path().to_path_buf(),
    };

    let err = fetch_run(origin, &run, dir.path(), &cfg).await.unwrap_err();
    assert_matches!(err, Error::Config(_));
    assert!(server.received_requests().await.unwrap().is_empty());
}
