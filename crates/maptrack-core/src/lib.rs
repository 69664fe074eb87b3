//! Live map tracker for A Link to the Past
//!
//! Reads a running SNES's work RAM through a remote memory transport,
//! decodes the player's position, camera, room bounds and active entities,
//! and tracks which of the four map sheets (two dungeon sheets, light and
//! dark world) the player is on. Overlay geometry for a map renderer is
//! produced as plain serializable data.
//!
//! # Features
//! - Mapping detection for LoROM randomizer builds and SA-1 practice hacks
//! - One batched read per poll, zipped into a typed [`Snapshot`]
//! - Pure decoding of indoor and overworld bounds and camera registers
//! - Region state machine with an append-only position log
//! - Race ROM gating with completion, user and practice-hack overrides
//! - Overlay geometry with secondary sub-map wrapping
//! - Emulation speed measurement from the frame counter
//!
//! # Quick start
//! ```no_run
//! use maptrack::{DeviceId, MemoryTransport, PollPipeline, ViewOptions};
//!
//! fn run(transport: &dyn MemoryTransport) -> maptrack::Result<()> {
//!     let device = DeviceId::new("fxpakpro://./dev/ttyACM0");
//!     let mut pipeline = PollPipeline::new();
//!     let handle = pipeline.handle();
//!
//!     pipeline.poll(transport, Some(&device))?;
//!     let frame = handle.overlay(&ViewOptions::default());
//!     println!("{} samples, {:?}", handle.history().len(), frame);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

pub mod address_map; // Per-variant memory layout
pub mod config; // Tracker configuration
pub mod constants; // Game and hardware constants
pub mod decoder; // Snapshot decoding
pub mod error; // Error types
pub mod frame_rate; // Emulation speed
pub mod overlay; // Render-ready geometry
pub mod pipeline; // Poll cycle orchestration
pub mod reader; // Snapshot acquisition
pub mod region; // Region tracking and race gating
pub mod snapshot; // Raw poll buffers
pub mod transport; // Memory transport abstraction

// Public API exports
pub use address_map::{address_map, lookup, AddressEntry, FieldKey, RomVariant};
pub use config::TrackerConfig;
pub use decoder::{
    BoundSet, CameraPosition, Coords, EntityReading, GameState, GameStateDecoder, TransitionBounds,
};
pub use error::{ConfigError, PollError, Result, TransportError};
pub use frame_rate::{FrameRateMeter, FrameRateStats};
pub use overlay::{
    DebugReadout, EntityKind, EntityMarker, Marker, OverlayFrame, OverlayGeometry,
    OverlayGeometryBuilder, OverlayLayers, Point, Rect, Segment, TrailRun, ViewOptions,
};
pub use pipeline::{CancelToken, PollOutcome, PollPipeline, TrackerHandle, TrackerState};
pub use reader::{ReadCycle, ReaderEvent, SnapshotReader};
pub use region::{
    classify, CoordinateSample, MapRegion, RaceState, RegionTracker, RegionTransition,
    TrackOutcome,
};
pub use snapshot::Snapshot;
pub use transport::{DeviceId, MemoryMapping, MemoryTransport, ReadRequest};
