//! Recorded sessions and the transport that plays them back.
//!
//! A session is a list of polls. Each poll carries the memory regions the
//! console held at that moment, keyed by hex bus address. Regions carry
//! over from one poll to the next, so a recording only needs to list what
//! changed. Regions may nest or overlap; the last write to a byte wins.

use anyhow::{bail, Context, Result};
use maptrack::{DeviceId, MemoryMapping, MemoryTransport, ReadRequest, TransportError};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// A recorded session.
#[derive(Debug, Deserialize)]
pub struct Session {
    /// Selected device; `null` replays a run with nothing selected
    #[serde(default)]
    pub device: Option<DeviceId>,
    /// Polls in recording order
    pub polls: Vec<RecordedPoll>,
}

/// Console state at one poll.
#[derive(Debug, Deserialize)]
pub struct RecordedPoll {
    /// Wall-clock time of the poll
    pub timestamp_ms: u64,
    /// Mapping reported by the device; `null` for an unknown scheme
    pub mapping: Option<MemoryMapping>,
    /// Whether the connection can address SA-1 memory
    #[serde(default = "default_true")]
    pub sa1_supported: bool,
    /// Mapping detection fails on this poll
    #[serde(default)]
    pub detect_fails: bool,
    /// Memory reads fail on this poll
    #[serde(default)]
    pub read_fails: bool,
    /// Memory regions by hex address ("0xF50010" or "F50010")
    #[serde(default)]
    pub memory: HashMap<String, Vec<u8>>,
}

fn default_true() -> bool {
    true
}

impl Session {
    /// Load a session file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session '{}'", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Parse a session.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Malformed session")
    }
}

/// Parse a hex bus address.
pub fn parse_address(key: &str) -> Result<u32> {
    let digits = key
        .strip_prefix("0x")
        .or_else(|| key.strip_prefix("0X"))
        .unwrap_or(key);
    let address = u32::from_str_radix(digits, 16)
        .with_context(|| format!("Invalid memory address '{}'", key))?;
    if address > 0xFF_FFFF {
        bail!("Memory address '{}' is outside the 24-bit bus", key);
    }
    Ok(address)
}

/// Plays back recorded polls as a [`MemoryTransport`].
#[derive(Debug, Default)]
pub struct RecordedTransport {
    memory: BTreeMap<u32, u8>,
    mapping: Option<MemoryMapping>,
    sa1_supported: bool,
    detect_fails: bool,
    read_fails: bool,
}

impl RecordedTransport {
    /// Create a transport with empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next recorded poll, merging its memory regions.
    pub fn apply(&mut self, poll: &RecordedPoll) -> Result<()> {
        let mut regions = poll
            .memory
            .iter()
            .map(|(key, bytes)| Ok((parse_address(key)?, bytes)))
            .collect::<Result<Vec<_>>>()?;
        // Within one poll, smaller regions are written over the larger ones
        // they sit in.
        regions.sort_by_key(|(address, bytes)| (std::cmp::Reverse(bytes.len()), *address));
        for (start, bytes) in regions {
            for (offset, &byte) in bytes.iter().enumerate() {
                self.memory.insert(start + offset as u32, byte);
            }
        }
        self.mapping = poll.mapping;
        self.sa1_supported = poll.sa1_supported;
        self.detect_fails = poll.detect_fails;
        self.read_fails = poll.read_fails;
        Ok(())
    }

    /// Whether some recorded region covers `address`.
    pub fn covers(&self, address: u32) -> bool {
        self.memory.contains_key(&address)
    }

    /// Bytes at `address`; unrecorded bytes read as zero.
    fn read(&self, address: u32, size: u32) -> Vec<u8> {
        let mut data = vec![0u8; size as usize];
        for (&at, &byte) in self.memory.range(address..address.saturating_add(size)) {
            data[(at - address) as usize] = byte;
        }
        data
    }
}

impl MemoryTransport for RecordedTransport {
    fn detect_mapping(&self, _device: &DeviceId) -> Result<Option<MemoryMapping>, TransportError> {
        if self.detect_fails {
            return Err("recorded mapping detection failure".into());
        }
        Ok(self.mapping)
    }

    fn read_batch(
        &self,
        _device: &DeviceId,
        _mapping: MemoryMapping,
        requests: &[ReadRequest],
    ) -> Result<Vec<Vec<u8>>, TransportError> {
        if self.read_fails {
            return Err("recorded read failure".into());
        }
        Ok(requests
            .iter()
            .map(|r| self.read(r.address, r.size))
            .collect())
    }

    fn read_single(
        &self,
        _device: &DeviceId,
        _mapping: MemoryMapping,
        address: u32,
        size: u32,
    ) -> Result<Vec<u8>, TransportError> {
        if self.read_fails {
            return Err("recorded read failure".into());
        }
        Ok(self.read(address, size))
    }

    fn supports_mapping(&self, _device: &DeviceId, mapping: MemoryMapping) -> bool {
        mapping != MemoryMapping::Sa1 || self.sa1_supported
    }
}
