//! Snapshot acquisition: mapping detection, ROM identification and batched reads.
//!
//! The reader owns the cached mapping, variant and ROM identity. Changes
//! that affect race gating are not applied here; they are queued as
//! [`ReaderEvent`]s and handed to the pipeline with the next complete
//! [`ReadCycle`].

use crate::address_map::{address_map, RomVariant};
use crate::constants::{FRAME_COUNTER_ADDRESS, FRAME_COUNTER_SIZE, ROM_NAME_ADDRESS, ROM_NAME_SIZE};
use crate::error::{PollError, Result};
use crate::snapshot::Snapshot;
use crate::transport::{DeviceId, MemoryMapping, MemoryTransport, ReadRequest};
use tracing::{debug, info};

/// State changes observed while reading, applied to the tracker by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderEvent {
    /// A cartridge header name was read that differs from the last one seen
    RomChanged {
        /// Previously seen ROM name; `None` on the first observation
        previous: Option<String>,
        /// New ROM name (raw header bytes as Latin-1)
        rom_name: String,
    },
    /// An SA-1 practice hack was detected; race gating does not apply
    PracticeHackDetected,
}

/// Result of one successful read cycle.
#[derive(Debug, Clone)]
pub struct ReadCycle {
    /// Complete snapshot for the current variant
    pub snapshot: Snapshot,
    /// Variant the snapshot was read under
    pub variant: RomVariant,
    /// Mapping used for the reads
    pub mapping: MemoryMapping,
    /// Events raised since the last successful cycle, oldest first
    pub events: Vec<ReaderEvent>,
}

/// Reads one [`Snapshot`] per poll through a [`MemoryTransport`].
#[derive(Debug, Default)]
pub struct SnapshotReader {
    mapping: Option<MemoryMapping>,
    variant: Option<RomVariant>,
    rom_identity: Option<String>,
    pending: PendingEvents,
}

/// Events waiting for the next complete cycle.
///
/// Repeated observations across failed cycles collapse into one event each,
/// and a ROM change is always delivered before the new ROM's classification.
#[derive(Debug, Default)]
struct PendingEvents {
    rom_change: Option<(Option<String>, String)>,
    practice_hack: bool,
}

impl PendingEvents {
    fn rom_changed(&mut self, previous: Option<String>, rom_name: String) {
        let previous = match self.rom_change.take() {
            Some((first, _)) => first,
            None => previous,
        };
        self.rom_change = Some((previous, rom_name));
    }

    fn len(&self) -> usize {
        usize::from(self.rom_change.is_some()) + usize::from(self.practice_hack)
    }

    fn drain(&mut self) -> Vec<ReaderEvent> {
        let mut events = Vec::with_capacity(self.len());
        if let Some((previous, rom_name)) = self.rom_change.take() {
            events.push(ReaderEvent::RomChanged { previous, rom_name });
        }
        if std::mem::take(&mut self.practice_hack) {
            events.push(ReaderEvent::PracticeHackDetected);
        }
        events
    }
}

impl SnapshotReader {
    /// Create a reader with nothing cached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached memory mapping, if detected.
    pub fn mapping(&self) -> Option<MemoryMapping> {
        self.mapping
    }

    /// Cached ROM variant, if classified.
    pub fn variant(&self) -> Option<RomVariant> {
        self.variant
    }

    /// Last observed ROM name.
    pub fn rom_name(&self) -> Option<&str> {
        self.rom_identity.as_deref()
    }

    /// Drop the cached mapping and variant (connection reset or device switch).
    ///
    /// The ROM identity is kept, so reconnecting to the same cartridge is not
    /// a ROM change. Queued events are kept so they still reach the tracker.
    pub fn invalidate(&mut self) {
        self.mapping = None;
        self.variant = None;
    }

    /// Number of events waiting for the next complete cycle.
    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    /// Run one read cycle
    ///
    /// # Arguments
    ///
    /// * `transport` - Memory transport
    /// * `device` - Selected device, `None` if nothing is selected
    ///
    /// # Returns
    ///
    /// A complete [`ReadCycle`], or the error that aborted the cycle. On
    /// error no snapshot exists and queued events wait for the next cycle.
    pub fn read<T>(&mut self, transport: &T, device: Option<&DeviceId>) -> Result<ReadCycle>
    where
        T: MemoryTransport + ?Sized,
    {
        let device = device.ok_or(PollError::NoDeviceSelected)?;

        let (mut mapping, mut variant, fresh) = self.ensure_mapping(transport, device)?;

        let rom_name = read_rom_name(transport, device, mapping)?;
        if self.rom_identity.as_deref() != Some(rom_name.as_str()) {
            info!(rom = %rom_name.trim_end(), "ROM changed");
            let previous = self.rom_identity.replace(rom_name.clone());
            self.pending.rom_changed(previous, rom_name);
            if !fresh {
                self.mapping = None;
                self.variant = None;
                (mapping, variant, _) = self.ensure_mapping(transport, device)?;
            }
        }

        let entries = address_map(variant);
        let requests: Vec<ReadRequest> = entries
            .iter()
            .map(|entry| ReadRequest {
                address: entry.address,
                size: entry.size,
            })
            .collect();
        let buffers = transport
            .read_batch(device, mapping, &requests)
            .map_err(|e| PollError::read_failed("memory batch", e.0))?;
        let snapshot = Snapshot::from_batch(&entries, buffers)?;

        debug!(%device, ?variant, entries = entries.len(), "snapshot read");
        Ok(ReadCycle {
            snapshot,
            variant,
            mapping,
            events: self.pending.drain(),
        })
    }

    /// Read the 32-bit frame counter
    ///
    /// Uses the cached mapping, detecting it first if needed.
    pub fn read_frame_counter<T>(&mut self, transport: &T, device: Option<&DeviceId>) -> Result<u32>
    where
        T: MemoryTransport + ?Sized,
    {
        let device = device.ok_or(PollError::NoDeviceSelected)?;
        let (mapping, _, _) = self.ensure_mapping(transport, device)?;
        let data = transport
            .read_single(device, mapping, FRAME_COUNTER_ADDRESS, FRAME_COUNTER_SIZE)
            .map_err(|e| PollError::read_failed("frame counter", e.0))?;
        match data.get(..4) {
            Some(&[b0, b1, b2, b3]) => Ok(u32::from_le_bytes([b0, b1, b2, b3])),
            _ => Err(PollError::read_failed(
                "frame counter",
                format!("expected 4 bytes, got {}", data.len()),
            )),
        }
    }

    /// Returns the mapping, the variant and whether detection ran just now.
    fn ensure_mapping<T>(
        &mut self,
        transport: &T,
        device: &DeviceId,
    ) -> Result<(MemoryMapping, RomVariant, bool)>
    where
        T: MemoryTransport + ?Sized,
    {
        if let (Some(mapping), Some(variant)) = (self.mapping, self.variant) {
            return Ok((mapping, variant, false));
        }

        let detected = transport
            .detect_mapping(device)
            .map_err(PollError::MappingDetectFailed)?;

        let (mapping, variant) = match detected {
            Some(MemoryMapping::LoRom) => {
                self.pending.practice_hack = false;
                (MemoryMapping::LoRom, RomVariant::Standard)
            }
            Some(MemoryMapping::Sa1) => {
                self.pending.practice_hack = true;
                if !transport.supports_mapping(device, MemoryMapping::Sa1) {
                    return Err(PollError::UnsupportedMapping(format!(
                        "{} cannot address sa1 memory",
                        device
                    )));
                }
                (MemoryMapping::Sa1, RomVariant::PracticeHack)
            }
            None => {
                return Err(PollError::UnsupportedMapping(
                    "device reported an unknown mapping".to_string(),
                ))
            }
        };

        info!(%device, %mapping, ?variant, "memory mapping detected");
        self.mapping = Some(mapping);
        self.variant = Some(variant);
        Ok((mapping, variant, true))
    }
}

fn read_rom_name<T>(transport: &T, device: &DeviceId, mapping: MemoryMapping) -> Result<String>
where
    T: MemoryTransport + ?Sized,
{
    let data = transport
        .read_single(device, mapping, ROM_NAME_ADDRESS, ROM_NAME_SIZE)
        .map_err(|e| PollError::read_failed("rom name", e.0))?;
    Ok(data.iter().map(|&b| b as char).collect())
}
