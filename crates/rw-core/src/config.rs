//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries the
//! sub-configs for the origin client, timeline constants, probing, and
//! fetching. Every section defaults sensibly so a completely empty `{}` file
//! is valid. [`Config::validate`] reports non-fatal warnings;
//! [`Config::ensure_valid`] is the hard gate that rejects structurally
//! invalid values before any network request is issued.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub origin: OriginConfig,
    pub timeline: TimelineConfig,
    pub probe: ProbeConfig,
    pub fetch: FetchConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Reject structurally invalid values.
    ///
    /// Everything checked here would otherwise surface mid-operation as a
    /// division by zero, an infinite loop, or a stalled download, so the
    /// whole set is verified up front.
    pub fn ensure_valid(&self) -> Result<()> {
        if self.timeline.timescale == 0 {
            return Err(Error::config("timeline.timescale must be nonzero"));
        }
        if self.timeline.segment_duration <= 0 {
            return Err(Error::config("timeline.segment_duration must be positive"));
        }
        if self.probe.window_size == 0 {
            return Err(Error::config("probe.window_size must be nonzero"));
        }
        if self.probe.batch_size == 0 {
            return Err(Error::config("probe.batch_size must be nonzero"));
        }
        if self.fetch.concurrency == 0 {
            return Err(Error::config("fetch.concurrency must be nonzero"));
        }
        Ok(())
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.origin.base_url.is_empty() {
            warnings.push("origin.base_url is empty".into());
        }
        if self.origin.request_timeout_secs == 0 {
            warnings.push(
                "origin.request_timeout_secs is 0; every request will fail immediately".into(),
            );
        }
        if self.probe.batch_size > self.probe.window_size {
            warnings.push(format!(
                "probe.batch_size {} exceeds window_size {}; the window will be probed in a single batch",
                self.probe.batch_size, self.probe.window_size
            ));
        }
        if self.timeline.offset_hours.abs() > 23 {
            warnings.push(format!(
                "timeline.offset_hours {} is not a plausible timezone offset",
                self.timeline.offset_hours
            ));
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Segment origin settings: base URL and the request headers the origin
/// expects, plus the per-request timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginConfig {
    pub base_url: String,
    pub referer: String,
    pub user_agent: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            base_url: "https://media.stream.proxad.net/media".into(),
            referer: "https://tv.free.fr/".into(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/143.0.0.0 Safari/537.36"
                .into(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Timeline constants shared by every track on the origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Ticks per second.
    pub timescale: u32,
    /// Fixed duration of one segment, in ticks.
    pub segment_duration: i64,
    /// Hour offset between the origin's naive local representation and UTC.
    pub offset_hours: i64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            timescale: 90_000,
            segment_duration: 288_000,
            offset_hours: 1,
        }
    }
}

/// Candidate-window settings for tick discovery when no anchor is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Number of candidate tick offsets to try, starting at the center guess.
    pub window_size: u64,
    /// Number of concurrent existence checks per batch.
    pub batch_size: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            window_size: 288_000,
            batch_size: 20_000,
        }
    }
}

/// Segment download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum number of segment downloads in flight at once.
    pub concurrency: usize,
    /// Directory under which per-track segment directories are created.
    pub output_dir: PathBuf,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            concurrency: 64,
            output_dir: PathBuf::from("./segments"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = Config::default();
        assert_eq!(cfg.timeline.timescale, 90_000);
        assert_eq!(cfg.timeline.segment_duration, 288_000);
        assert_eq!(cfg.timeline.offset_hours, 1);
        assert_eq!(cfg.probe.window_size, 288_000);
        assert_eq!(cfg.probe.batch_size, 20_000);
        assert_eq!(cfg.fetch.concurrency, 64);
        assert!(cfg.ensure_valid().is_ok());
    }

    #[test]
    fn default_config_no_warnings() {
        let cfg = Config::default();
        let warnings = cfg.validate();
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    }

    #[test]
    fn zero_timescale_rejected() {
        let mut cfg = Config::default();
        cfg.timeline.timescale = 0;
        let err = cfg.ensure_valid().unwrap_err();
        assert!(err.to_string().contains("timescale"));
    }

    #[test]
    fn non_positive_duration_rejected() {
        let mut cfg = Config::default();
        cfg.timeline.segment_duration = 0;
        assert!(cfg.ensure_valid().is_err());
        cfg.timeline.segment_duration = -288_000;
        assert!(cfg.ensure_valid().is_err());
    }

    #[test]
    fn zero_probe_window_rejected() {
        let mut cfg = Config::default();
        cfg.probe.window_size = 0;
        assert!(cfg.ensure_valid().is_err());
    }

    #[test]
    fn zero_batch_size_rejected() {
        let mut cfg = Config::default();
        cfg.probe.batch_size = 0;
        assert!(cfg.ensure_valid().is_err());
    }

    #[test]
    fn zero_concurrency_rejected() {
        let mut cfg = Config::default();
        cfg.fetch.concurrency = 0;
        assert!(cfg.ensure_valid().is_err());
    }

    #[test]
    fn batch_larger_than_window_warns() {
        let mut cfg = Config::default();
        cfg.probe.window_size = 100;
        cfg.probe.batch_size = 500;
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.contains("batch_size")));
        // Still structurally valid: min() clamps the last batch.
        assert!(cfg.ensure_valid().is_ok());
    }

    #[test]
    fn parse_json_config() {
        let json = r#"{"timeline": {"timescale": 48000}, "probe": {"batch_size": 64}}"#;
        let cfg = Config::from_json(json).unwrap();
        assert_eq!(cfg.timeline.timescale, 48_000);
        assert_eq!(cfg.probe.batch_size, 64);
        // Untouched sections keep their defaults.
        assert_eq!(cfg.timeline.segment_duration, 288_000);
        assert_eq!(cfg.fetch.concurrency, 64);
    }

    #[test]
    fn parse_empty_json_uses_defaults() {
        let cfg = Config::from_json("{}").unwrap();
        assert_eq!(cfg.timeline.timescale, 90_000);
    }

    #[test]
    fn load_or_default_with_none() {
        let cfg = Config::load_or_default(None);
        assert_eq!(cfg.probe.window_size, 288_000);
    }

    #[test]
    fn load_or_default_with_missing_file() {
        let cfg = Config::load_or_default(Some(Path::new("/nonexistent/rewindcast.json")));
        assert_eq!(cfg.probe.window_size, 288_000);
    }
}
