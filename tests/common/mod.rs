//! Shared helpers for origin-facing integration tests.

#![allow(dead_code)]

use rw_core::config::OriginConfig;
use rw_core::{Tick, TrackId};
use wiremock::MockServer;

/// Origin config pointed at a wiremock server, mirroring the real origin's
/// `<base>/media/<track>_<tick>` layout.
pub fn origin_config(server: &MockServer) -> OriginConfig {
    OriginConfig {
        base_url: format!("{}/media", server.uri()),
        request_timeout_secs: 5,
        ..OriginConfig::default()
    }
}

/// Request path for a media segment.
pub fn segment_path(track: &TrackId, tick: Tick) -> String {
    format!("/media/{track}_{tick}")
}

/// Request path for a track's init blob.
pub fn init_path(track: &TrackId) -> String {
    format!("/media/{track}_init")
}

/// Every tick the server was asked about for `track`, in request order.
/// Init requests don't parse as ticks and are skipped.
pub async fn requested_ticks(server: &MockServer, track: &TrackId) -> Vec<Tick> {
    let prefix = format!("/media/{track}_");
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter_map(|r| r.url.path().strip_prefix(&prefix)?.parse::<Tick>().ok())
        .collect()
}
