//! Transition bounds decoding.
//!
//! Indoors the game keeps three candidate bounds per edge and picks one
//! with the horizontal/vertical selectors at 0xF500A6. The selected word
//! sits at the edge's base offset shifted by the selector, and the edges
//! need per-selector corrections before they line up with the room.
//! Outdoors the bounds are single words in half-resolution units.

use super::le16_at;
use crate::constants::MAP_WRAP;
use crate::region::MapRegion;
use serde::Serialize;

/// Indoor base offsets, in N, E, S, W order.
const INDOOR_BASE_OFFSETS: [usize; 4] = [0x0, 0xC, 0x4, 0x8];

/// Overworld offsets, in N, E, S, W order.
const OVERWORLD_OFFSETS: [usize; 4] = [0x0, 0x16, 0x12, 0x4];

/// Highest valid selector value.
const MAX_SELECTOR: u8 = 2;

/// Horizontal and vertical bound selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundSet {
    /// Horizontal selector (E/W edges)
    pub h: u8,
    /// Vertical selector (N/S edges)
    pub v: u8,
}

impl BoundSet {
    /// Parse the 2-byte selector buffer; `None` for out-of-range selectors.
    pub fn parse(buf: &[u8]) -> Option<Self> {
        let (&h, &v) = (buf.first()?, buf.get(1)?);
        (h <= MAX_SELECTOR && v <= MAX_SELECTOR).then_some(BoundSet { h, v })
    }

    /// Selector applied to each edge, in N, E, S, W order.
    pub fn selectors(&self) -> [u8; 4] {
        [self.v, self.h, self.v, self.h]
    }
}

/// Transition bounds of the current room or area, in map pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionBounds {
    /// Top edge
    pub north: i32,
    /// Right edge
    pub east: i32,
    /// Bottom edge
    pub south: i32,
    /// Left edge
    pub west: i32,
    /// Horizontal extent
    pub width: i32,
    /// Vertical extent
    pub height: i32,
}

pub(super) fn decode_indoor(buf: &[u8], set: BoundSet, region: MapRegion) -> Option<TransitionBounds> {
    let mut edges = [0i32; 4];
    for (edge, (&base, selector)) in INDOOR_BASE_OFFSETS
        .iter()
        .zip(set.selectors())
        .enumerate()
    {
        let raw = i32::from(le16_at(buf, base + usize::from(selector))?);
        edges[edge] = match (edge, selector) {
            (0, 0) => raw + 0x10,
            (1, 0) => raw + 0x100,
            (2, 0) => raw + 0xF0,
            (2, 2) => raw - 0x10,
            _ => raw,
        };
    }

    let [mut north, east, mut south, west] = edges;
    let height = (south - north) * if set.v == 0 { 1 } else { 2 };
    let width = (east - west) * if set.h == 0 { 1 } else { 2 };

    let wrap = i32::from(MAP_WRAP);
    if region == MapRegion::Eg2 && north >= wrap {
        north -= wrap;
        south -= wrap;
    }

    Some(TransitionBounds {
        north,
        east,
        south,
        west,
        width,
        height,
    })
}

pub(super) fn decode_overworld(buf: &[u8]) -> Option<TransitionBounds> {
    let mut edges = [0i32; 4];
    for (edge, &offset) in OVERWORLD_OFFSETS.iter().enumerate() {
        edges[edge] = i32::from(le16_at(buf, offset)?) * 2;
    }
    let [north, east, south, west] = edges;
    Some(TransitionBounds {
        north,
        east,
        south,
        west,
        width: east - west,
        height: south - north,
    })
}
