//! Transport trait abstraction for remote console memory access
//!
//! The tracker never talks to hardware itself. Anything that can detect a
//! cartridge mapping and read bytes at bus addresses (an SNI gRPC client,
//! a recorded session, a test double) implements [`MemoryTransport`].

use crate::error::TransportError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cartridge addressing scheme the transport must translate bus addresses for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryMapping {
    /// Plain LoROM (randomizer builds)
    LoRom,
    /// SA-1 coprocessor mapping (practice hack)
    Sa1,
}

impl fmt::Display for MemoryMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryMapping::LoRom => f.write_str("lorom"),
            MemoryMapping::Sa1 => f.write_str("sa1"),
        }
    }
}

/// Opaque device identifier, typically a device URI.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub String);

impl DeviceId {
    /// Create a device identifier from a URI.
    pub fn new(uri: impl Into<String>) -> Self {
        DeviceId(uri.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One (address, size) pair of a batched read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRequest {
    /// 24-bit bus address
    pub address: u32,
    /// Number of bytes
    pub size: u32,
}

/// Common interface for console memory transports
///
/// Implementations may block; they are driven from a single poll pipeline
/// and never called concurrently by this crate.
///
/// # Example
///
/// ```
/// use maptrack::{DeviceId, MemoryMapping, MemoryTransport, ReadRequest, TransportError};
///
/// struct Blank;
///
/// impl MemoryTransport for Blank {
///     fn detect_mapping(&self, _: &DeviceId) -> Result<Option<MemoryMapping>, TransportError> {
///         Ok(Some(MemoryMapping::LoRom))
///     }
///
///     fn read_batch(
///         &self,
///         _: &DeviceId,
///         _: MemoryMapping,
///         requests: &[ReadRequest],
///     ) -> Result<Vec<Vec<u8>>, TransportError> {
///         Ok(requests.iter().map(|r| vec![0; r.size as usize]).collect())
///     }
///
///     fn read_single(
///         &self,
///         _: &DeviceId,
///         _: MemoryMapping,
///         _: u32,
///         size: u32,
///     ) -> Result<Vec<u8>, TransportError> {
///         Ok(vec![0; size as usize])
///     }
/// }
/// ```
pub trait MemoryTransport {
    /// Detect the cartridge mapping of a device
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the device reports a scheme outside [`MemoryMapping`].
    fn detect_mapping(&self, device: &DeviceId) -> Result<Option<MemoryMapping>, TransportError>;

    /// Read several regions in one round trip
    ///
    /// # Arguments
    ///
    /// * `device` - Target device
    /// * `mapping` - Mapping used to translate bus addresses
    /// * `requests` - Regions to read
    ///
    /// # Returns
    ///
    /// One buffer per request, in request order. No atomicity is implied
    /// across entries.
    fn read_batch(
        &self,
        device: &DeviceId,
        mapping: MemoryMapping,
        requests: &[ReadRequest],
    ) -> Result<Vec<Vec<u8>>, TransportError>;

    /// Read a single region
    fn read_single(
        &self,
        device: &DeviceId,
        mapping: MemoryMapping,
        address: u32,
        size: u32,
    ) -> Result<Vec<u8>, TransportError>;

    /// Whether the device's connection kind can address memory under `mapping`
    ///
    /// Defaults to `true`. Override for connections (some emulator bridges)
    /// that cannot translate SA-1 addresses.
    fn supports_mapping(&self, _device: &DeviceId, _mapping: MemoryMapping) -> bool {
        true
    }
}
