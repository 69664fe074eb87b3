//! Map tracker session replay
//!
//! Feeds a recorded console memory session through the poll pipeline and
//! writes, for every poll, the outcome, the tracker state and the overlay
//! geometry a renderer would draw.

mod args;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use maptrack::constants::FRAME_COUNTER_ADDRESS;
use maptrack::{
    FrameRateStats, MapRegion, OverlayFrame, PollOutcome, PollPipeline, RaceState, TrackerConfig,
};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::Args;
use session::{RecordedTransport, Session};

/// Output for one replayed poll.
#[derive(Serialize)]
struct PollRecord {
    timestamp_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<PollOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    region: MapRegion,
    samples: usize,
    race: RaceState,
    overlay: OverlayFrame,
    #[serde(skip_serializing_if = "Option::is_none")]
    fps: Option<f64>,
}

#[derive(Serialize)]
struct Report {
    rom_name: Option<String>,
    polls: Vec<PollRecord>,
    frame_rate: Option<FrameRateStats>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => TrackerConfig::load(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => TrackerConfig::default(),
    };
    if let Some(len) = args.history_len {
        config = config.history_len(len);
    }

    let session = Session::load(&args.session)?;
    info!(
        polls = session.polls.len(),
        device = ?session.device,
        "replaying session"
    );

    let report = replay(&session, &config, args.race_override)?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    match &args.output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("Failed to write '{}'", path.display()))?,
        None => writeln!(io::stdout(), "{}", json)?,
    }
    Ok(())
}

fn replay(session: &Session, config: &TrackerConfig, race_override: bool) -> Result<Report> {
    let mut pipeline = PollPipeline::new();
    let handle = pipeline.handle();
    if race_override {
        pipeline.request_race_override();
    }

    let mut transport = RecordedTransport::new();
    let device = session.device.as_ref();
    let mut polls = Vec::with_capacity(session.polls.len());

    for poll in &session.polls {
        transport.apply(poll)?;

        let (outcome, error) = match pipeline.poll(&transport, device) {
            Ok(outcome) => (Some(outcome), None),
            Err(e) => (None, Some(e.to_string())),
        };

        let fps = if outcome.is_some() && transport.covers(FRAME_COUNTER_ADDRESS) {
            match pipeline.sample_frame_rate(&transport, device, poll.timestamp_ms) {
                Ok(fps) => fps,
                Err(e) => {
                    warn!(error = %e, "frame counter read failed");
                    None
                }
            }
        } else {
            None
        };

        let state = handle.read();
        polls.push(PollRecord {
            timestamp_ms: poll.timestamp_ms,
            outcome,
            error,
            region: state.tracker.region(),
            samples: state.tracker.history().len(),
            race: state.tracker.race(),
            overlay: state.overlay(&config.view),
            fps,
        });
    }

    let rom_name = handle
        .read()
        .rom_name
        .as_deref()
        .map(|name| name.trim_end_matches(['\0', ' ']).to_string());

    Ok(Report {
        rom_name,
        polls,
        frame_rate: pipeline.frame_rate().stats(),
    })
}
