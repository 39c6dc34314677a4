//! HTTP client for the segment origin.
//!
//! The origin's URL scheme and status semantics are a fixed external
//! contract: `<base>/<track>_<tick>` for media segments,
//! `<base>/<track>_init` for the per-track initialization blob, 2xx meaning
//! "exists" and anything else "absent". One shared [`reqwest::Client`]
//! provides the connection pool and the fixed per-request timeout that turns
//! a stuck request into a local failure.

use std::time::Duration;

use bytes::Bytes;
use rw_core::config::OriginConfig;
use rw_core::{Error, Result, Tick, TrackId};

pub struct OriginClient {
    http: reqwest::Client,
    cfg: OriginConfig,
}

impl OriginClient {
    pub fn new(cfg: OriginConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .map_err(|e| Error::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, cfg })
    }

    /// URL of a media segment. The tick is embedded verbatim.
    pub fn segment_url(&self, track: &TrackId, tick: Tick) -> String {
        format!("{}/{}_{}", self.cfg.base_url, track, tick)
    }

    /// URL of the track's initialization blob.
    pub fn init_url(&self, track: &TrackId) -> String {
        format!("{}/{}_init", self.cfg.base_url, track)
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .header("Accept", "*/*")
            .header("Referer", &self.cfg.referer)
            .header("User-Agent", &self.cfg.user_agent)
    }

    /// Existence check for one (track, tick) pair.
    ///
    /// 2xx means the segment is currently served; any other status or a
    /// transport error means it is not. A transient network failure is
    /// indistinguishable from a structural gap here; probing is approximate
    /// and gets re-run at a higher level if it yields nothing.
    pub async fn probe_segment(&self, track: &TrackId, tick: Tick) -> bool {
        let url = self.segment_url(track, tick);
        match self.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Download one media segment's bytes.
    pub async fn fetch_segment(&self, track: &TrackId, tick: Tick) -> Result<Bytes> {
        let url = self.segment_url(track, tick);
        self.fetch_url(&url).await
    }

    /// Download the track's initialization blob.
    pub async fn fetch_init(&self, track: &TrackId) -> Result<Bytes> {
        let url = self.init_url(track);
        self.fetch_url(&url).await
    }

    async fn fetch_url(&self, url: &str) -> Result<Bytes> {
        let resp = self
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transport(e))?;
        if !resp.status().is_success() {
            return Err(Error::origin(resp.status().as_u16(), url));
        }
        resp.bytes().await.map_err(|e| Error::transport(e))
    }
}
