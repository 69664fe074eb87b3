//! Camera scroll register decoding.

use super::le16_at;
use crate::constants::{MAP_WRAP, OW_CAMERA_X_OFFSET, OW_CAMERA_Y_OFFSET};
use crate::region::MapRegion;
use serde::Serialize;

/// Top-left corner of the visible screen, in map pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CameraPosition {
    /// Horizontal origin
    pub x: i32,
    /// Vertical origin
    pub y: i32,
}

/// Underworld registers hold x at 0 and y at 6.
pub(super) fn decode_indoor(buf: &[u8], region: MapRegion) -> Option<CameraPosition> {
    let x = i32::from(le16_at(buf, 0)?);
    let mut y = i32::from(le16_at(buf, 6)?);
    if region == MapRegion::Eg2 && y >= i32::from(MAP_WRAP) {
        y -= i32::from(MAP_WRAP);
    }
    Some(CameraPosition { x, y })
}

/// Overworld registers hold y at 0 and x at 6, offset by the screen border
/// and in half-resolution units.
pub(super) fn decode_overworld(buf: &[u8]) -> Option<CameraPosition> {
    let y = (i32::from(le16_at(buf, 0)?) - OW_CAMERA_Y_OFFSET) * 2;
    let x = (i32::from(le16_at(buf, 6)?) - OW_CAMERA_X_OFFSET) * 2;
    Some(CameraPosition { x, y })
}
