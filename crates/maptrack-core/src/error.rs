//! Error types for polling, transport access and configuration.

/// Result type for tracker operations.
pub type Result<T> = std::result::Result<T, PollError>;

/// Failure reported by a [`MemoryTransport`](crate::MemoryTransport) implementation.
///
/// The transport is an external collaborator, so its failures are carried
/// as an opaque message.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<String> for TransportError {
    fn from(msg: String) -> Self {
        TransportError(msg)
    }
}

impl From<&str> for TransportError {
    fn from(msg: &str) -> Self {
        TransportError(msg.to_string())
    }
}

/// Errors that abort a poll cycle.
///
/// Every variant leaves previously published state untouched. The next
/// scheduled poll is the only retry.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    /// No device has been selected for polling
    #[error("No device selected")]
    NoDeviceSelected,

    /// The transport could not report the memory mapping of the cartridge
    #[error("Error detecting memory mapping: {0}")]
    MappingDetectFailed(TransportError),

    /// The cartridge uses a mapping this tracker cannot read
    #[error("Unsupported memory mapping: {0}")]
    UnsupportedMapping(String),

    /// A memory read failed or returned an incomplete batch
    #[error("Error reading {what}: {reason}")]
    ReadFailed {
        /// Which read failed (rom name, snapshot batch, frame counter)
        what: &'static str,
        /// Failure description
        reason: String,
    },
}

impl PollError {
    pub(crate) fn read_failed(what: &'static str, reason: impl Into<String>) -> Self {
        PollError::ReadFailed {
            what,
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading a [`TrackerConfig`](crate::TrackerConfig).
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error reading the configuration file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Well-formed but invalid value
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_failed_display() {
        let err = PollError::read_failed("rom name", "timeout");
        assert_eq!(err.to_string(), "Error reading rom name: timeout");
    }

    #[test]
    fn test_transport_error_from_str() {
        let err: TransportError = "device gone".into();
        let wrapped = PollError::MappingDetectFailed(err);
        assert_eq!(
            wrapped.to_string(),
            "Error detecting memory mapping: device gone"
        );
    }
}
