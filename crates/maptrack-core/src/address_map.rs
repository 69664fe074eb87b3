//! Fixed WRAM/ROM address tables per ROM variant.
//!
//! Addresses are hardware-fixed and reproduced bit-exact. A size of zero
//! marks a field that the variant does not expose; such entries never
//! reach the transport.

use serde::{Deserialize, Serialize};
use std::fmt;

/// ROM classification selecting the address table and race-gating rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RomVariant {
    /// Randomizer or vanilla LoROM build
    Standard,
    /// SA-1 practice hack
    PracticeHack,
}

/// Every field the tracker reads from console memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    /// Main game module
    Module,
    /// Player coordinates (y, x)
    Coords,
    /// Light/dark world flag
    World,
    /// Tournament flag baked into the ROM
    RaceMode,
    /// Horizontal/vertical transition bound selectors
    TransitionBoundSet,
    /// Room/area transition bounds
    TransitionBounds,
    /// Overworld camera scroll registers
    CameraPosOw,
    /// Underworld camera scroll registers
    CameraPosUw,
    /// Sprite type table
    SpriteIds,
    /// Sprite coordinate planes
    SpriteCoords,
    /// Ancilla type table
    AncillaeIds,
    /// Ancilla coordinate planes
    AncillaeCoords,
}

impl FieldKey {
    /// Every key, in address-table order.
    pub const ALL: [FieldKey; 12] = [
        FieldKey::Module,
        FieldKey::Coords,
        FieldKey::World,
        FieldKey::RaceMode,
        FieldKey::TransitionBoundSet,
        FieldKey::TransitionBounds,
        FieldKey::CameraPosOw,
        FieldKey::CameraPosUw,
        FieldKey::SpriteIds,
        FieldKey::SpriteCoords,
        FieldKey::AncillaeIds,
        FieldKey::AncillaeCoords,
    ];

    /// Wire name of the key.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::Module => "module",
            FieldKey::Coords => "coords",
            FieldKey::World => "world",
            FieldKey::RaceMode => "race_mode",
            FieldKey::TransitionBoundSet => "transition_bound_set",
            FieldKey::TransitionBounds => "transition_bounds",
            FieldKey::CameraPosOw => "camera_pos_ow",
            FieldKey::CameraPosUw => "camera_pos_uw",
            FieldKey::SpriteIds => "sprite_ids",
            FieldKey::SpriteCoords => "sprite_coords",
            FieldKey::AncillaeIds => "ancillae_ids",
            FieldKey::AncillaeCoords => "ancillae_coords",
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the address table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressEntry {
    /// Field the buffer decodes into
    pub key: FieldKey,
    /// 24-bit bus address
    pub address: u32,
    /// Bytes to read; zero means unavailable for this variant
    pub size: u32,
}

impl AddressEntry {
    const fn new(key: FieldKey, address: u32, size: u32) -> Self {
        Self { key, address, size }
    }
}

/// (key, standard address/size, practice hack address/size)
const ADDRESS_TABLE: [(FieldKey, (u32, u32), (u32, u32)); 12] = [
    (FieldKey::Module, (0xF50010, 1), (0xE07C04, 1)),
    (FieldKey::Coords, (0xF50020, 4), (0xE07C00, 4)),
    (FieldKey::World, (0xF50FFF, 1), (0xE07C06, 1)),
    (FieldKey::RaceMode, (0x180213, 1), (0x180213, 0)),
    (FieldKey::TransitionBoundSet, (0xF500A6, 2), (0xF500A6, 2)),
    (FieldKey::TransitionBounds, (0xF50600, 0x20), (0xF50600, 0x20)),
    (FieldKey::CameraPosOw, (0xF50618, 8), (0xF50618, 8)),
    (FieldKey::CameraPosUw, (0xF500E0, 8), (0xF500E0, 8)),
    (FieldKey::SpriteIds, (0xF50E20, 0x10), (0xF50E20, 0x10)),
    (FieldKey::SpriteCoords, (0xF50D00, 0x40), (0xF50D00, 0x40)),
    (FieldKey::AncillaeIds, (0xF50C4A, 0x0A), (0xF50C4A, 0x0A)),
    (FieldKey::AncillaeCoords, (0xF50BFA, 0x28), (0xF50BFA, 0x28)),
];

/// Ordered address entries for a variant, skipping unavailable fields.
///
/// The order of the returned list is the order buffers come back from a
/// batched read, so it doubles as the zip order when assembling a
/// [`Snapshot`](crate::Snapshot).
pub fn address_map(variant: RomVariant) -> Vec<AddressEntry> {
    ADDRESS_TABLE
        .iter()
        .map(|&(key, standard, practice)| {
            let (address, size) = match variant {
                RomVariant::Standard => standard,
                RomVariant::PracticeHack => practice,
            };
            AddressEntry::new(key, address, size)
        })
        .filter(|entry| entry.size > 0)
        .collect()
}

/// Look up a single entry; `None` when the variant does not expose the key.
pub fn lookup(variant: RomVariant, key: FieldKey) -> Option<AddressEntry> {
    address_map(variant).into_iter().find(|entry| entry.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_is_complete_and_ordered() {
        let entries = address_map(RomVariant::Standard);
        let keys: Vec<FieldKey> = entries.iter().map(|e| e.key).collect();
        assert_eq!(keys, FieldKey::ALL.to_vec());
        assert_eq!(entries[0], AddressEntry::new(FieldKey::Module, 0xF50010, 1));
        assert_eq!(entries[1], AddressEntry::new(FieldKey::Coords, 0xF50020, 4));
        assert_eq!(entries[2], AddressEntry::new(FieldKey::World, 0xF50FFF, 1));
        assert_eq!(entries[3], AddressEntry::new(FieldKey::RaceMode, 0x180213, 1));
    }

    #[test]
    fn test_practice_hack_skips_race_mode() {
        let entries = address_map(RomVariant::PracticeHack);
        assert_eq!(entries.len(), FieldKey::ALL.len() - 1);
        assert!(entries.iter().all(|e| e.key != FieldKey::RaceMode));
        assert!(lookup(RomVariant::PracticeHack, FieldKey::RaceMode).is_none());
    }

    #[test]
    fn test_practice_hack_addresses() {
        let module = lookup(RomVariant::PracticeHack, FieldKey::Module).unwrap();
        let coords = lookup(RomVariant::PracticeHack, FieldKey::Coords).unwrap();
        let world = lookup(RomVariant::PracticeHack, FieldKey::World).unwrap();
        assert_eq!((module.address, module.size), (0xE07C04, 1));
        assert_eq!((coords.address, coords.size), (0xE07C00, 4));
        assert_eq!((world.address, world.size), (0xE07C06, 1));
    }

    #[test]
    fn test_shared_entries_identical_across_variants() {
        for key in [
            FieldKey::TransitionBoundSet,
            FieldKey::TransitionBounds,
            FieldKey::CameraPosOw,
            FieldKey::CameraPosUw,
            FieldKey::SpriteIds,
            FieldKey::SpriteCoords,
        ] {
            assert_eq!(
                lookup(RomVariant::Standard, key),
                lookup(RomVariant::PracticeHack, key),
                "{key} differs between variants"
            );
        }
        let bounds = lookup(RomVariant::Standard, FieldKey::TransitionBounds).unwrap();
        assert_eq!((bounds.address, bounds.size), (0xF50600, 0x20));
        let sprites = lookup(RomVariant::Standard, FieldKey::SpriteCoords).unwrap();
        assert_eq!((sprites.address, sprites.size), (0xF50D00, 0x40));
    }
}
