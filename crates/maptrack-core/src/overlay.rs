//! Render-ready overlay geometry.
//!
//! Everything here is a pure function of the decoded state and the tracker
//! log. Coordinates are in sheet-image pixels: overworld sheets are drawn
//! at twice the game's resolution, and every marker carries a small corner
//! correction so it sits on the sprite's visual centre.

use crate::constants::{MAP_WRAP, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use crate::decoder::{BoundSet, EntityReading, GameState, TransitionBounds};
use crate::region::{CoordinateSample, MapRegion, RaceState, RegionTracker};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Trail endpoints are shifted onto the centre of the stroke.
const TRAIL_STROKE_OFFSET: i32 = 5;

/// Default number of history samples drawn as a trail.
pub const DEFAULT_HISTORY_LEN: usize = 10;

bitflags! {
    /// Overlay layers requested by the renderer
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct OverlayLayers: u8 {
        /// Player marker
        const PLAYER = 0x01;
        /// Position trail
        const TRAIL = 0x02;
        /// Camera viewport and transition bounds
        const CAMERA = 0x04;
        /// Sprite markers
        const SPRITES = 0x08;
        /// Ancilla markers
        const ANCILLAE = 0x10;
        /// Debug readout
        const DEBUG = 0x20;
    }
}

impl Default for OverlayLayers {
    fn default() -> Self {
        OverlayLayers::PLAYER | OverlayLayers::TRAIL | OverlayLayers::SPRITES | OverlayLayers::ANCILLAE
    }
}

/// Presentation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    /// Number of most recent samples drawn as a trail; 0 draws the whole log
    pub history_len: usize,
    /// Enabled layers
    pub layers: OverlayLayers,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            history_len: DEFAULT_HISTORY_LEN,
            layers: OverlayLayers::default(),
        }
    }
}

/// A point in sheet pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    /// Horizontal position
    pub x: i32,
    /// Vertical position
    pub y: i32,
}

/// A circle marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Marker {
    /// Centre
    pub at: Point,
    /// The unwrapped position lies on the secondary sub-map (drawn dashed)
    pub wrapped: bool,
}

/// One trail line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Older endpoint
    pub from: Point,
    /// Newer endpoint
    pub to: Point,
}

/// Trail segments of one same-region run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrailRun {
    /// Region the run was recorded in
    pub region: MapRegion,
    /// Segments between consecutive samples
    pub segments: Vec<Segment>,
}

/// An outlined rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
    /// The unwrapped origin lies on the secondary sub-map (drawn dashed)
    pub wrapped: bool,
}

/// Which table an entity marker came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Sprite table
    Sprite,
    /// Ancilla table
    Ancilla,
}

/// Marker for a sprite or ancilla slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityMarker {
    /// Source table
    pub kind: EntityKind,
    /// Slot index
    pub slot: usize,
    /// Raw type id
    pub id: u8,
    /// Marker position
    pub marker: Marker,
}

/// Numeric readout for the debug panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugReadout {
    /// Player position in game units, 4-digit hex
    pub link: Option<(String, String)>,
    /// Camera origin in game units, 4-digit hex
    pub camera: Option<(String, String)>,
    /// Transition bound selectors
    pub bound_set: Option<BoundSet>,
    /// Decoded transition bounds
    pub bounds: Option<TransitionBounds>,
}

/// Geometry of one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlayGeometry {
    /// Sheet being displayed
    pub region: MapRegion,
    /// Player marker
    pub player: Option<Marker>,
    /// Trail runs, oldest first
    pub trail: Vec<TrailRun>,
    /// Transition bounds outline
    pub transition_bounds: Option<Rect>,
    /// Camera viewport outline
    pub camera: Option<Rect>,
    /// Sprite and ancilla markers
    pub entities: Vec<EntityMarker>,
    /// Debug readout
    pub debug: Option<DebugReadout>,
}

impl OverlayGeometry {
    /// Trail runs recorded in `region`.
    pub fn trail_on(&self, region: MapRegion) -> impl Iterator<Item = &TrailRun> {
        self.trail.iter().filter(move |run| run.region == region)
    }
}

/// What the renderer should draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum OverlayFrame {
    /// Race ROM without override: the map must not be shown
    RaceHidden,
    /// Map with overlay
    Map(OverlayGeometry),
}

/// Builds [`OverlayFrame`]s from decoded and tracked state.
pub struct OverlayGeometryBuilder;

impl OverlayGeometryBuilder {
    /// Build the overlay for the current frame
    ///
    /// # Arguments
    ///
    /// * `game` - Last decoded state, `None` before the first complete poll
    /// * `region` - Current region
    /// * `history` - Full position log
    /// * `race` - Race gating state
    /// * `options` - View options
    pub fn build(
        game: Option<&GameState>,
        region: MapRegion,
        history: &[CoordinateSample],
        race: RaceState,
        options: &ViewOptions,
    ) -> OverlayFrame {
        if race.map_hidden() {
            return OverlayFrame::RaceHidden;
        }

        let layers = options.layers;
        let scale = region.scale() as i32;
        let corner = corner_correction(region);

        let player = layers
            .contains(OverlayLayers::PLAYER)
            .then(|| history.last())
            .flatten()
            .map(|sample| {
                wrapped_marker(
                    i32::from(sample.x) * scale,
                    i32::from(sample.y) * scale,
                    corner,
                )
            });

        let trail = if layers.contains(OverlayLayers::TRAIL) {
            trail_runs(window(history, options.history_len))
        } else {
            Vec::new()
        };

        let camera_layer = layers.contains(OverlayLayers::CAMERA);
        let transition_bounds = game
            .and_then(|g| g.transition_bounds)
            .filter(|_| camera_layer)
            .map(|b| Rect {
                x: b.west % i32::from(MAP_WRAP),
                y: b.north % i32::from(MAP_WRAP),
                width: b.width,
                height: b.height,
                wrapped: b.north.max(b.west) >= i32::from(MAP_WRAP),
            });
        let camera = game
            .and_then(|g| g.camera)
            .filter(|_| camera_layer)
            .map(|c| Rect {
                x: c.x % i32::from(MAP_WRAP),
                y: c.y % i32::from(MAP_WRAP),
                width: VIEWPORT_WIDTH as i32 * scale,
                height: VIEWPORT_HEIGHT as i32 * scale,
                wrapped: c.x.max(c.y) >= i32::from(MAP_WRAP),
            });

        let mut entities = Vec::new();
        if let Some(game) = game {
            if layers.contains(OverlayLayers::SPRITES) {
                entities.extend(entity_markers(
                    game.sprites.as_deref(),
                    EntityKind::Sprite,
                    scale,
                    corner,
                ));
            }
            if layers.contains(OverlayLayers::ANCILLAE) {
                entities.extend(entity_markers(
                    game.ancillae.as_deref(),
                    EntityKind::Ancilla,
                    scale,
                    corner,
                ));
            }
        }

        let debug = layers
            .contains(OverlayLayers::DEBUG)
            .then(|| debug_readout(game, history.last(), scale));

        OverlayFrame::Map(OverlayGeometry {
            region,
            player,
            trail,
            transition_bounds,
            camera,
            entities,
            debug,
        })
    }
}

/// (x, y) offset added after scaling.
pub fn corner_correction(region: MapRegion) -> Point {
    if region.is_indoor() {
        Point { x: 3, y: 8 }
    } else {
        Point { x: 12, y: 24 }
    }
}

fn wrapped_marker(x: i32, y: i32, corner: Point) -> Marker {
    let wrap = i32::from(MAP_WRAP);
    Marker {
        at: Point {
            x: x % wrap + corner.x,
            y: y % wrap + corner.y,
        },
        wrapped: x.max(y) >= wrap,
    }
}

fn window(history: &[CoordinateSample], len: usize) -> &[CoordinateSample] {
    if len == 0 || history.len() <= len {
        history
    } else {
        &history[history.len() - len..]
    }
}

fn trail_runs(samples: &[CoordinateSample]) -> Vec<TrailRun> {
    RegionTracker::runs(samples)
        .map(|run| {
            let region = run[0].region;
            let scale = region.scale() as i32;
            let corner = corner_correction(region);
            let point = |s: &CoordinateSample| Point {
                x: i32::from(s.x) * scale + corner.x + TRAIL_STROKE_OFFSET,
                y: i32::from(s.y) * scale + corner.y + TRAIL_STROKE_OFFSET,
            };
            TrailRun {
                region,
                segments: run
                    .windows(2)
                    .map(|pair| Segment {
                        from: point(&pair[0]),
                        to: point(&pair[1]),
                    })
                    .collect(),
            }
        })
        .collect()
}

fn entity_markers(
    readings: Option<&[EntityReading]>,
    kind: EntityKind,
    scale: i32,
    corner: Point,
) -> impl Iterator<Item = EntityMarker> + '_ {
    readings
        .unwrap_or_default()
        .iter()
        .filter(move |e| kind == EntityKind::Sprite || !e.is_empty_ancilla())
        .map(move |e| EntityMarker {
            kind,
            slot: e.slot,
            id: e.id,
            marker: wrapped_marker(i32::from(e.x) * scale, i32::from(e.y) * scale, corner),
        })
}

fn hex4(value: i32) -> String {
    if value < 0 {
        format!("-{:04x}", value.unsigned_abs())
    } else {
        format!("{value:04x}")
    }
}

fn debug_readout(
    game: Option<&GameState>,
    latest: Option<&CoordinateSample>,
    scale: i32,
) -> DebugReadout {
    DebugReadout {
        link: latest.map(|s| (hex4(i32::from(s.x)), hex4(i32::from(s.y)))),
        camera: game
            .and_then(|g| g.camera)
            .map(|c| (hex4(c.x / scale), hex4(c.y / scale))),
        bound_set: game.and_then(|g| g.bound_set),
        bounds: game.and_then(|g| g.transition_bounds),
    }
}
