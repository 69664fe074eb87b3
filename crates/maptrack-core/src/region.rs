//! Region tracking state machine and race gating.
//!
//! The tracker follows the player across the four map sheets, keeps an
//! append-only position log and decides whether the map may be shown on
//! race ROMs.

use crate::address_map::RomVariant;
use crate::constants::{
    COMPLETED_MODULES, IN_GAME_MODULES, MAP_WRAP, MODULE_DUNGEON, MODULE_OVERWORLD,
    RACE_MODE_ENABLED,
};
use crate::decoder::GameState;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// One of the four tracked map sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MapRegion {
    /// Primary dungeon sheet
    #[default]
    #[serde(rename = "EG1")]
    Eg1,
    /// Secondary dungeon sheet (rooms stored 8192 pixels down)
    #[serde(rename = "EG2")]
    Eg2,
    /// Light world overworld
    #[serde(rename = "LW")]
    LightWorld,
    /// Dark world overworld
    #[serde(rename = "DW")]
    DarkWorld,
}

impl MapRegion {
    /// Dungeon sheets (EG1/EG2).
    pub fn is_indoor(&self) -> bool {
        matches!(self, MapRegion::Eg1 | MapRegion::Eg2)
    }

    /// Map-pixel scale of the sheet image: overworld images are drawn at 2×.
    pub fn scale(&self) -> u32 {
        if self.is_indoor() {
            1
        } else {
            2
        }
    }

    /// Short label.
    pub fn as_str(&self) -> &'static str {
        match self {
            MapRegion::Eg1 => "EG1",
            MapRegion::Eg2 => "EG2",
            MapRegion::LightWorld => "LW",
            MapRegion::DarkWorld => "DW",
        }
    }
}

impl fmt::Display for MapRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the position log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinateSample {
    /// Region the sample was taken in
    pub region: MapRegion,
    /// Horizontal position
    pub x: u16,
    /// Vertical position, adjusted to the sheet
    pub y: u16,
}

/// Race-ROM gating state.
///
/// `overridden` only moves from `false` to `true`, except when a ROM change
/// re-arms the whole state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RaceState {
    /// A race ROM was detected
    pub detected: bool,
    /// The map was unlocked (game completed, user override or practice hack)
    pub overridden: bool,
}

impl RaceState {
    /// Whether the map must stay hidden.
    pub fn map_hidden(&self) -> bool {
        self.detected && !self.overridden
    }
}

/// A change of the current region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegionTransition {
    /// Region before the poll
    pub from: MapRegion,
    /// Region after the poll
    pub to: MapRegion,
}

/// What one poll did to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackOutcome {
    /// Not in a gameplay module; nothing recorded
    Idle,
    /// Position recorded
    Tracked {
        /// The appended sample
        sample: CoordinateSample,
        /// Set when the region changed on this poll
        transition: Option<RegionTransition>,
    },
    /// Race ROM without override; region and history were left alone
    RaceModeBlocked,
}

/// Classify a poll's region without mutating anything.
///
/// Returns the region in effect after applying the transition rules to
/// `current`, and the sheet-adjusted y.
pub fn classify(current: MapRegion, module: u8, world: Option<u8>, y: u16) -> (MapRegion, u16) {
    if !IN_GAME_MODULES.contains(&module) {
        return (current, y);
    }
    match (module, world) {
        (MODULE_DUNGEON, _) if y > MAP_WRAP => (MapRegion::Eg2, y - MAP_WRAP),
        (MODULE_DUNGEON, _) => (MapRegion::Eg1, y),
        (MODULE_OVERWORLD, Some(1)) => (MapRegion::DarkWorld, y),
        (MODULE_OVERWORLD, Some(0)) => (MapRegion::LightWorld, y),
        _ => (current, y),
    }
}

/// Region, position log and race state, advanced once per poll.
#[derive(Debug, Clone, Default)]
pub struct RegionTracker {
    current: MapRegion,
    history: Vec<CoordinateSample>,
    race: RaceState,
}

impl RegionTracker {
    /// Start on EG1 with an empty log and ungated race state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current region.
    pub fn region(&self) -> MapRegion {
        self.current
    }

    /// Full position log, oldest first.
    pub fn history(&self) -> &[CoordinateSample] {
        &self.history
    }

    /// Race gating state.
    pub fn race(&self) -> RaceState {
        self.race
    }

    /// Region this poll would resolve to, without recording anything.
    ///
    /// Used as the decoder's region context.
    pub fn preview_region(&self, state: &GameState) -> MapRegion {
        match (state.module, state.coords) {
            (Some(module), Some(coords)) => classify(self.current, module, state.world, coords.y).0,
            _ => self.current,
        }
    }

    /// Advance the tracker with one decoded poll
    ///
    /// # Arguments
    ///
    /// * `state` - Decoded game state
    /// * `variant` - Variant the poll was read under; race gating applies
    ///   to standard ROMs only
    pub fn track(&mut self, state: &GameState, variant: RomVariant) -> TrackOutcome {
        let Some(module) = state.module else {
            return TrackOutcome::Idle;
        };

        if COMPLETED_MODULES.contains(&module) && !self.race.overridden {
            info!(module, "game completed, race gating lifted");
            self.race.overridden = true;
        }

        if variant == RomVariant::Standard && state.race_mode == Some(RACE_MODE_ENABLED) {
            self.race.detected = true;
            if !self.race.overridden {
                return TrackOutcome::RaceModeBlocked;
            }
        }

        let Some(coords) = state.coords else {
            return TrackOutcome::Idle;
        };
        if !IN_GAME_MODULES.contains(&module) {
            return TrackOutcome::Idle;
        }

        let (region, y) = classify(self.current, module, state.world, coords.y);
        let transition = (region != self.current).then(|| RegionTransition {
            from: self.current,
            to: region,
        });
        if let Some(t) = transition {
            info!(from = %t.from, to = %t.to, "region transition");
            self.current = region;
        }

        let sample = CoordinateSample {
            region,
            x: coords.x,
            y,
        };
        self.history.push(sample);
        TrackOutcome::Tracked { sample, transition }
    }

    /// User override of race gating. One-way.
    pub fn request_race_override(&mut self) {
        if !self.race.overridden {
            info!("race gating overridden by user");
        }
        self.race.overridden = true;
    }

    /// Practice hacks are never gated.
    pub fn force_race_override(&mut self) {
        self.race.overridden = true;
    }

    /// A different ROM was loaded: re-arm race gating.
    pub fn on_rom_change(&mut self) {
        self.race = RaceState::default();
    }

    /// Maximal runs of consecutive same-region samples in `samples`.
    pub fn runs(samples: &[CoordinateSample]) -> impl Iterator<Item = &[CoordinateSample]> {
        samples.chunk_by(|a, b| a.region == b.region)
    }
}
