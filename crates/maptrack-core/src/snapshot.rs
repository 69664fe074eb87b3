//! One poll's raw memory buffers as a typed record.

use crate::address_map::{AddressEntry, FieldKey};
use crate::error::PollError;

/// Raw buffers read in a single poll, one optional field per known key.
///
/// A `Snapshot` only exists once a batched read completed for every
/// requested entry. Fields the variant does not expose stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Main game module
    pub module: Option<Vec<u8>>,
    /// Player coordinates
    pub coords: Option<Vec<u8>>,
    /// Light/dark world flag
    pub world: Option<Vec<u8>>,
    /// Tournament flag
    pub race_mode: Option<Vec<u8>>,
    /// Transition bound selectors
    pub transition_bound_set: Option<Vec<u8>>,
    /// Transition bounds
    pub transition_bounds: Option<Vec<u8>>,
    /// Overworld camera registers
    pub camera_pos_ow: Option<Vec<u8>>,
    /// Underworld camera registers
    pub camera_pos_uw: Option<Vec<u8>>,
    /// Sprite type table
    pub sprite_ids: Option<Vec<u8>>,
    /// Sprite coordinate planes
    pub sprite_coords: Option<Vec<u8>>,
    /// Ancilla type table
    pub ancillae_ids: Option<Vec<u8>>,
    /// Ancilla coordinate planes
    pub ancillae_coords: Option<Vec<u8>>,
}

impl Snapshot {
    /// Assemble a snapshot by zipping batch buffers to entries in request order.
    ///
    /// Buffers are never matched by content. A count mismatch means the
    /// batch is incomplete and no snapshot is produced.
    pub fn from_batch(entries: &[AddressEntry], buffers: Vec<Vec<u8>>) -> Result<Self, PollError> {
        if entries.len() != buffers.len() {
            return Err(PollError::read_failed(
                "memory batch",
                format!(
                    "expected {} buffers, got {}",
                    entries.len(),
                    buffers.len()
                ),
            ));
        }

        let mut snapshot = Snapshot::default();
        for (entry, buffer) in entries.iter().zip(buffers) {
            *snapshot.slot_mut(entry.key) = Some(buffer);
        }
        Ok(snapshot)
    }

    /// Buffer for a key, if it was read.
    pub fn get(&self, key: FieldKey) -> Option<&[u8]> {
        let slot = match key {
            FieldKey::Module => &self.module,
            FieldKey::Coords => &self.coords,
            FieldKey::World => &self.world,
            FieldKey::RaceMode => &self.race_mode,
            FieldKey::TransitionBoundSet => &self.transition_bound_set,
            FieldKey::TransitionBounds => &self.transition_bounds,
            FieldKey::CameraPosOw => &self.camera_pos_ow,
            FieldKey::CameraPosUw => &self.camera_pos_uw,
            FieldKey::SpriteIds => &self.sprite_ids,
            FieldKey::SpriteCoords => &self.sprite_coords,
            FieldKey::AncillaeIds => &self.ancillae_ids,
            FieldKey::AncillaeCoords => &self.ancillae_coords,
        };
        slot.as_deref()
    }

    fn slot_mut(&mut self, key: FieldKey) -> &mut Option<Vec<u8>> {
        match key {
            FieldKey::Module => &mut self.module,
            FieldKey::Coords => &mut self.coords,
            FieldKey::World => &mut self.world,
            FieldKey::RaceMode => &mut self.race_mode,
            FieldKey::TransitionBoundSet => &mut self.transition_bound_set,
            FieldKey::TransitionBounds => &mut self.transition_bounds,
            FieldKey::CameraPosOw => &mut self.camera_pos_ow,
            FieldKey::CameraPosUw => &mut self.camera_pos_uw,
            FieldKey::SpriteIds => &mut self.sprite_ids,
            FieldKey::SpriteCoords => &mut self.sprite_coords,
            FieldKey::AncillaeIds => &mut self.ancillae_ids,
            FieldKey::AncillaeCoords => &mut self.ancillae_coords,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address_map::{address_map, RomVariant};

    #[test]
    fn test_zip_follows_request_order() {
        let entries = address_map(RomVariant::PracticeHack);
        let buffers: Vec<Vec<u8>> = (0..entries.len()).map(|i| vec![i as u8]).collect();
        let snapshot = Snapshot::from_batch(&entries, buffers).unwrap();

        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(snapshot.get(entry.key), Some(&[i as u8][..]));
        }
        assert!(snapshot.race_mode.is_none());
    }

    #[test]
    fn test_short_batch_rejected() {
        let entries = address_map(RomVariant::Standard);
        let buffers = vec![vec![0x09]; entries.len() - 1];
        let err = Snapshot::from_batch(&entries, buffers).unwrap_err();
        assert!(matches!(err, PollError::ReadFailed { .. }));
    }
}
