//! Snapshot → [`GameState`] decoding.
//!
//! Decoding is pure and never fails. Every multi-byte value is an
//! unsigned little-endian 16-bit word unless noted. A missing or short
//! buffer leaves the corresponding field `None`, which downstream code
//! treats as "not renderable" rather than as a zero reading.

mod bounds;
mod camera;
mod entities;

pub use bounds::{BoundSet, TransitionBounds};
pub use camera::CameraPosition;
pub use entities::EntityReading;

use crate::region::MapRegion;
use crate::snapshot::Snapshot;
use serde::Serialize;

/// Player position as read from WRAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Coords {
    /// Horizontal position
    pub x: u16,
    /// Vertical position (unadjusted; may include the 8192 sub-map offset)
    pub y: u16,
}

/// Decoded state of one poll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GameState {
    /// Main game module
    pub module: Option<u8>,
    /// World flag (0 light, 1 dark)
    pub world: Option<u8>,
    /// Tournament flag (standard ROMs only)
    pub race_mode: Option<u8>,
    /// Player coordinates
    pub coords: Option<Coords>,
    /// Transition bound selectors
    pub bound_set: Option<BoundSet>,
    /// Room or area transition bounds, in map pixels
    pub transition_bounds: Option<TransitionBounds>,
    /// Camera origin, in map pixels
    pub camera: Option<CameraPosition>,
    /// Sprite slots
    pub sprites: Option<Vec<EntityReading>>,
    /// Ancilla slots
    pub ancillae: Option<Vec<EntityReading>>,
}

/// Pure decoder from raw buffers to [`GameState`].
pub struct GameStateDecoder;

impl GameStateDecoder {
    /// Decode a snapshot
    ///
    /// # Arguments
    ///
    /// * `snapshot` - Complete raw buffers of one poll
    /// * `region` - Region in effect for this poll; selects the indoor or
    ///   overworld interpretation of bounds and camera registers
    pub fn decode(snapshot: &Snapshot, region: MapRegion) -> GameState {
        let bound_set = snapshot
            .transition_bound_set
            .as_deref()
            .and_then(BoundSet::parse);

        let transition_bounds = snapshot.transition_bounds.as_deref().and_then(|buf| {
            if region.is_indoor() {
                bound_set.and_then(|set| bounds::decode_indoor(buf, set, region))
            } else {
                bounds::decode_overworld(buf)
            }
        });

        let camera = if region.is_indoor() {
            snapshot
                .camera_pos_uw
                .as_deref()
                .and_then(|buf| camera::decode_indoor(buf, region))
        } else {
            snapshot.camera_pos_ow.as_deref().and_then(camera::decode_overworld)
        };

        GameState {
            module: first_byte(snapshot.module.as_deref()),
            world: first_byte(snapshot.world.as_deref()),
            race_mode: first_byte(snapshot.race_mode.as_deref()),
            coords: snapshot.coords.as_deref().and_then(decode_coords),
            bound_set,
            transition_bounds,
            camera,
            sprites: entities::decode(
                snapshot.sprite_ids.as_deref(),
                snapshot.sprite_coords.as_deref(),
                &entities::SPRITE_PLANES,
            ),
            ancillae: entities::decode(
                snapshot.ancillae_ids.as_deref(),
                snapshot.ancillae_coords.as_deref(),
                &entities::ANCILLA_PLANES,
            ),
        }
    }
}

/// Little-endian word at `offset`.
#[inline]
pub(crate) fn le16_at(buf: &[u8], offset: usize) -> Option<u16> {
    let lo = *buf.get(offset)?;
    let hi = *buf.get(offset + 1)?;
    Some(u16::from_le_bytes([lo, hi]))
}

/// Little-endian word from split low/high byte planes.
#[inline]
pub(crate) fn le16_planes(buf: &[u8], lo: usize, hi: usize) -> Option<u16> {
    Some(u16::from_le_bytes([*buf.get(lo)?, *buf.get(hi)?]))
}

fn first_byte(buf: Option<&[u8]>) -> Option<u8> {
    buf.and_then(|b| b.first().copied())
}

/// y comes first in WRAM, x second.
fn decode_coords(buf: &[u8]) -> Option<Coords> {
    Some(Coords {
        y: le16_at(buf, 0)?,
        x: le16_at(buf, 2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coords_y_then_x() {
        let snapshot = Snapshot {
            coords: Some(vec![0x64, 0x00, 0xC8, 0x00]),
            ..Default::default()
        };
        let state = GameStateDecoder::decode(&snapshot, MapRegion::LightWorld);
        assert_eq!(state.coords, Some(Coords { x: 200, y: 100 }));
    }

    #[test]
    fn test_coords_high_byte() {
        let snapshot = Snapshot {
            coords: Some(vec![0x28, 0x23, 0x34, 0x12]),
            ..Default::default()
        };
        let state = GameStateDecoder::decode(&snapshot, MapRegion::Eg1);
        assert_eq!(state.coords, Some(Coords { x: 0x1234, y: 9000 }));
    }

    #[test]
    fn test_missing_buffers_stay_absent() {
        let state = GameStateDecoder::decode(&Snapshot::default(), MapRegion::Eg1);
        assert_eq!(state, GameState::default());
        assert!(state.camera.is_none());
        assert!(state.transition_bounds.is_none());
    }

    #[test]
    fn test_short_buffers_stay_absent() {
        let snapshot = Snapshot {
            module: Some(vec![]),
            coords: Some(vec![0x01, 0x02, 0x03]),
            camera_pos_uw: Some(vec![0; 4]),
            ..Default::default()
        };
        let state = GameStateDecoder::decode(&snapshot, MapRegion::Eg1);
        assert!(state.module.is_none());
        assert!(state.coords.is_none());
        assert!(state.camera.is_none());
    }

    #[test]
    fn test_single_byte_fields() {
        let snapshot = Snapshot {
            module: Some(vec![0x09]),
            world: Some(vec![0x01]),
            race_mode: Some(vec![0x01]),
            ..Default::default()
        };
        let state = GameStateDecoder::decode(&snapshot, MapRegion::DarkWorld);
        assert_eq!(state.module, Some(0x09));
        assert_eq!(state.world, Some(0x01));
        assert_eq!(state.race_mode, Some(0x01));
    }

    #[test]
    fn test_region_selects_camera_registers() {
        let mut uw = vec![0u8; 8];
        uw[0..2].copy_from_slice(&0x0100u16.to_le_bytes());
        uw[6..8].copy_from_slice(&0x0200u16.to_le_bytes());
        let mut ow = vec![0u8; 8];
        ow[0..2].copy_from_slice(&(108u16 + 10).to_le_bytes());
        ow[6..8].copy_from_slice(&(123u16 + 20).to_le_bytes());
        let snapshot = Snapshot {
            camera_pos_uw: Some(uw),
            camera_pos_ow: Some(ow),
            ..Default::default()
        };

        let indoor = GameStateDecoder::decode(&snapshot, MapRegion::Eg1);
        assert_eq!(indoor.camera, Some(CameraPosition { x: 0x100, y: 0x200 }));

        let outdoor = GameStateDecoder::decode(&snapshot, MapRegion::LightWorld);
        assert_eq!(outdoor.camera, Some(CameraPosition { x: 40, y: 20 }));
    }
}
