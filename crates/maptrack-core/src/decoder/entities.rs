//! Sprite and ancilla slot decoding.
//!
//! Both tables store positions as four parallel byte planes (y low, x low,
//! y high, x high), one byte per slot.

use super::le16_planes;
use crate::constants::NO_ANCILLA_ID;
use serde::Serialize;

/// Start offsets of the four coordinate planes.
pub(super) struct PlaneLayout {
    y_lo: usize,
    y_hi: usize,
    x_lo: usize,
    x_hi: usize,
}

pub(super) const SPRITE_PLANES: PlaneLayout = PlaneLayout {
    y_lo: 0x00,
    x_lo: 0x10,
    y_hi: 0x20,
    x_hi: 0x30,
};

pub(super) const ANCILLA_PLANES: PlaneLayout = PlaneLayout {
    y_lo: 0x00,
    x_lo: 0x0A,
    y_hi: 0x14,
    x_hi: 0x1E,
};

/// One sprite or ancilla slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityReading {
    /// Slot index in the game's table
    pub slot: usize,
    /// Raw type id
    pub id: u8,
    /// Horizontal position
    pub x: u16,
    /// Vertical position
    pub y: u16,
}

impl EntityReading {
    /// Whether this ancilla slot is empty. Meaningless for sprites.
    pub fn is_empty_ancilla(&self) -> bool {
        self.id == NO_ANCILLA_ID
    }
}

pub(super) fn decode(
    ids: Option<&[u8]>,
    coords: Option<&[u8]>,
    layout: &PlaneLayout,
) -> Option<Vec<EntityReading>> {
    let (ids, coords) = (ids?, coords?);
    ids.iter()
        .enumerate()
        .map(|(slot, &id)| {
            Some(EntityReading {
                slot,
                id,
                x: le16_planes(coords, layout.x_lo + slot, layout.x_hi + slot)?,
                y: le16_planes(coords, layout.y_lo + slot, layout.y_hi + slot)?,
            })
        })
        .collect()
}
