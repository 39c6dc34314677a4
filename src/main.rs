mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDateTime;
use clap::Parser;
use cli::{Cli, Commands};

use rewindcast::{fetch, origin::OriginClient, probe, resolver};
use rw_core::timeline::{self, Anchor};
use rw_core::{Config, TrackId};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "rewindcast=debug,rw_core=debug,rw_media=debug".to_string()
        } else {
            "rewindcast=info,rw_core=info,rw_media=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Fetch {
            track,
            start,
            end,
            anchor_tick,
            anchor_time,
            output,
            json,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(fetch_window(
                cli.config.as_deref(),
                &track,
                &start,
                &end,
                anchor_tick,
                anchor_time.as_deref(),
                output,
                json,
            ))
        }
        Commands::Probe { track, time } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(probe_around(cli.config.as_deref(), &track, &time))
        }
        Commands::KeyId { path } => extract_key_id(&path),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("rewindcast {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = Config::load_or_default(path);
    for warning in config.validate() {
        tracing::warn!("config: {warning}");
    }
    config.ensure_valid()?;
    Ok(config)
}

fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .map_err(|e| anyhow::anyhow!("invalid datetime {s:?} (expected {DATETIME_FORMAT}): {e}"))
}

#[allow(clippy::too_many_arguments)]
async fn fetch_window(
    config_path: Option<&Path>,
    track: &str,
    start: &str,
    end: &str,
    anchor_tick: Option<i64>,
    anchor_time: Option<&str>,
    output: Option<std::path::PathBuf>,
    json: bool,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(output) = output {
        config.fetch.output_dir = output;
    }

    let track = TrackId::from(track);
    let start = parse_datetime(start)?;
    let end = parse_datetime(end)?;
    let anchor = match (anchor_tick, anchor_time) {
        (Some(tick), Some(time)) => Some(Anchor::new(tick, parse_datetime(time)?)),
        (None, None) => None,
        _ => anyhow::bail!("--anchor-tick and --anchor-time must be given together"),
    };

    let origin = Arc::new(OriginClient::new(config.origin.clone())?);
    let (run, report) =
        resolver::resolve_and_fetch(origin, &track, start, end, anchor, &config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Fetched {}/{} segments for {} (start tick {})",
            report.succeeded, run.count, run.track, run.start_tick
        );
        if !report.is_complete() {
            println!("Missing ticks: {:?}", report.missing_ticks());
        }
    }

    let dir = fetch::segment_dir(&config.fetch, &track);
    match rw_media::scan_segment_dir(&dir)? {
        Some(key_id) => println!("Key id: {key_id}"),
        None => println!("No key id marker found in the downloaded segments"),
    }

    Ok(())
}

async fn probe_around(config_path: Option<&Path>, track: &str, time: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let track = TrackId::from(track);
    let time = parse_datetime(time)?;

    let origin = OriginClient::new(config.origin.clone())?;
    let center = timeline::datetime_to_ticks(time, &config.timeline);
    let hits = probe::probe_window(&origin, &track, center, &config.probe).await?;

    if hits.is_empty() {
        println!(
            "No valid tick found for {track} in a window of {} around {center}",
            config.probe.window_size
        );
    } else {
        for tick in hits {
            println!("{tick}");
        }
    }
    Ok(())
}

fn extract_key_id(path: &Path) -> Result<()> {
    let key_id = if path.is_dir() {
        rw_media::scan_segment_dir(path)?
    } else {
        let data = std::fs::read(path)?;
        rw_media::extract_key_id(&data)
    };

    match key_id {
        Some(key_id) => println!("{key_id}"),
        None => println!("No key id marker found in {}", path.display()),
    }
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = Config::load_or_default(path);
    let warnings = config.validate();
    if warnings.is_empty() {
        println!("Configuration OK");
    } else {
        for warning in &warnings {
            println!("warning: {warning}");
        }
    }
    config.ensure_valid()?;
    Ok(())
}
