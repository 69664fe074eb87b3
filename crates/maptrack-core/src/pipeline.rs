//! The poll pipeline: read, decode, track, publish.
//!
//! An external scheduler calls [`PollPipeline::poll`] on its own cadence.
//! Each call performs one full cycle. Readers (a renderer, the CLI) hold a
//! cloned [`TrackerHandle`] and always observe either the previous or the
//! new complete state, never a half-applied one.

use crate::address_map::RomVariant;
use crate::decoder::{GameState, GameStateDecoder};
use crate::error::Result;
use crate::frame_rate::FrameRateMeter;
use crate::overlay::{OverlayFrame, OverlayGeometryBuilder, ViewOptions};
use crate::reader::{ReaderEvent, SnapshotReader};
use crate::region::{CoordinateSample, MapRegion, RaceState, RegionTracker, RegionTransition, TrackOutcome};
use crate::transport::{DeviceId, MemoryTransport};
use parking_lot::{RwLock, RwLockReadGuard};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cancels in-flight poll cycles.
///
/// Cloned into the scheduler. Bumping the generation while a read is in
/// flight makes that cycle discard its snapshot instead of decoding it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicU64>);

impl CancelToken {
    /// Create a token at generation 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// Cancel every cycle started before this call.
    pub fn cancel(&self) {
        self.0.fetch_add(1, Ordering::AcqRel);
    }
}

/// Published tracker state.
#[derive(Debug, Clone, Default)]
pub struct TrackerState {
    /// Region tracker
    pub tracker: RegionTracker,
    /// Last decoded state; cleared while race gating hides the map
    pub game: Option<GameState>,
    /// Variant of the last complete cycle
    pub variant: Option<RomVariant>,
    /// Name of the loaded ROM
    pub rom_name: Option<String>,
}

impl TrackerState {
    /// Build the overlay for this state.
    pub fn overlay(&self, options: &ViewOptions) -> OverlayFrame {
        OverlayGeometryBuilder::build(
            self.game.as_ref(),
            self.tracker.region(),
            self.tracker.history(),
            self.tracker.race(),
            options,
        )
    }
}

/// Shared, read-mostly view of the tracker state.
#[derive(Debug, Clone, Default)]
pub struct TrackerHandle(Arc<RwLock<TrackerState>>);

impl TrackerHandle {
    /// Lock the state for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, TrackerState> {
        self.0.read()
    }

    /// Current region.
    pub fn region(&self) -> MapRegion {
        self.0.read().tracker.region()
    }

    /// Race gating state.
    pub fn race(&self) -> RaceState {
        self.0.read().tracker.race()
    }

    /// Copy of the position log.
    pub fn history(&self) -> Vec<CoordinateSample> {
        self.0.read().tracker.history().to_vec()
    }

    /// Build the overlay for the current state.
    pub fn overlay(&self, options: &ViewOptions) -> OverlayFrame {
        self.0.read().overlay(options)
    }

    /// User override of race gating.
    pub fn request_race_override(&self) {
        self.0.write().tracker.request_race_override();
    }
}

/// Result of a completed poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PollOutcome {
    /// A position was recorded
    Tracked {
        /// The appended sample
        sample: CoordinateSample,
        /// Set when the region changed
        transition: Option<RegionTransition>,
    },
    /// Not in gameplay; state decoded but nothing recorded
    Idle,
    /// Race ROM without override; the map stays hidden
    RaceModeBlocked,
    /// The cycle was cancelled while reading; the snapshot was discarded
    Cancelled,
}

impl From<TrackOutcome> for PollOutcome {
    fn from(outcome: TrackOutcome) -> Self {
        match outcome {
            TrackOutcome::Idle => PollOutcome::Idle,
            TrackOutcome::Tracked { sample, transition } => PollOutcome::Tracked { sample, transition },
            TrackOutcome::RaceModeBlocked => PollOutcome::RaceModeBlocked,
        }
    }
}

/// Drives [`SnapshotReader`], [`GameStateDecoder`] and [`RegionTracker`]
/// once per poll.
#[derive(Debug, Default)]
pub struct PollPipeline {
    reader: SnapshotReader,
    handle: TrackerHandle,
    cancel: CancelToken,
    frame_rate: FrameRateMeter,
}

impl PollPipeline {
    /// Create a pipeline with fresh state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for observers of the published state.
    pub fn handle(&self) -> TrackerHandle {
        self.handle.clone()
    }

    /// Token the scheduler uses to cancel in-flight cycles.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Snapshot reader (cached mapping, variant and ROM name).
    pub fn reader(&self) -> &SnapshotReader {
        &self.reader
    }

    /// Run one poll cycle
    ///
    /// # Arguments
    ///
    /// * `transport` - Memory transport
    /// * `device` - Selected device
    ///
    /// # Returns
    ///
    /// The cycle's outcome, or the error that aborted it. An aborted cycle
    /// leaves the published state untouched.
    pub fn poll<T>(&mut self, transport: &T, device: Option<&DeviceId>) -> Result<PollOutcome>
    where
        T: MemoryTransport + ?Sized,
    {
        let generation = self.cancel.generation();

        let cycle = self.reader.read(transport, device).inspect_err(|e| {
            warn!(error = %e, "poll aborted");
        })?;

        let mut state = self.handle.0.write();

        for event in cycle.events {
            match event {
                ReaderEvent::RomChanged { previous, rom_name } => {
                    // The first ROM seen is not a change; an early override stands.
                    if previous.is_some() {
                        state.tracker.on_rom_change();
                    }
                    state.rom_name = Some(rom_name);
                }
                ReaderEvent::PracticeHackDetected => {
                    info!("practice hack detected, race gating disabled");
                    state.tracker.force_race_override();
                }
            }
        }

        if self.cancel.generation() != generation {
            debug!("poll cancelled, snapshot discarded");
            return Ok(PollOutcome::Cancelled);
        }

        let current = state.tracker.region();
        let mut game = GameStateDecoder::decode(&cycle.snapshot, current);
        let region = state.tracker.preview_region(&game);
        if region != current {
            game = GameStateDecoder::decode(&cycle.snapshot, region);
        }

        let outcome = state.tracker.track(&game, cycle.variant);
        state.variant = Some(cycle.variant);
        state.game = match outcome {
            TrackOutcome::RaceModeBlocked => None,
            _ => Some(game),
        };

        debug!(?outcome, region = %state.tracker.region(), "poll complete");
        Ok(outcome.into())
    }

    /// User override of race gating.
    pub fn request_race_override(&self) {
        self.handle.request_race_override();
    }

    /// Drop cached connection state and cancel any cycle in flight.
    ///
    /// Tracker history and race state are kept. Race gating re-arms on
    /// reconnect only if a different ROM is found.
    pub fn reset_connection(&mut self) {
        self.cancel.cancel();
        self.reader.invalidate();
        self.frame_rate.reset();
    }

    /// Read the frame counter and record it
    ///
    /// # Returns
    ///
    /// The rate since the previous sample, when positive.
    pub fn sample_frame_rate<T>(
        &mut self,
        transport: &T,
        device: Option<&DeviceId>,
        timestamp_ms: u64,
    ) -> Result<Option<f64>>
    where
        T: MemoryTransport + ?Sized,
    {
        let frames = self.reader.read_frame_counter(transport, device)?;
        Ok(self.frame_rate.record(frames, timestamp_ms))
    }

    /// Frame rate meter.
    pub fn frame_rate(&self) -> &FrameRateMeter {
        &self.frame_rate
    }
}
