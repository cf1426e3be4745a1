//! Error types for ring construction, ring access and the UART transport.

use std::time::Duration;
use thiserror::Error;

/// Errors returned when a [`ByteRing`](crate::ByteRing) cannot be built from its config.
///
/// All of these are recoverable by retrying with a corrected
/// [`RingBufferConfig`](crate::RingBufferConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InitError {
    /// Capacity is zero or not a power of two.
    #[error("ring capacity {capacity} is not a non-zero power of two")]
    InvalidCapacity {
        /// The rejected capacity.
        capacity: usize,
    },

    /// No backing storage was supplied.
    #[error("no backing storage supplied")]
    NullStorage,

    /// The supplied storage does not hold exactly `capacity` bytes.
    #[error("storage holds {len} bytes but capacity is {capacity}")]
    StorageLength {
        /// The configured capacity.
        capacity: usize,
        /// The length of the storage that was supplied.
        len: usize,
    },
}

/// The ring holds `capacity` bytes; the byte offered to `put` was not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("ring buffer is full")]
pub struct Full;

/// The ring holds no bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("ring buffer is empty")]
pub struct Empty;

/// No received byte is waiting. A normal outcome for a polling reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no received data available")]
pub struct NoData;

impl From<Empty> for NoData {
    fn from(_: Empty) -> Self {
        NoData
    }
}

/// Errors on the transmit side of a [`Transport`](crate::Transport).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The sink never signalled transmit-ready within the configured bound.
    #[error("transmitter not ready after {waited:?}")]
    WriteTimeout {
        /// How long the caller spun before giving up.
        waited: Duration,
    },

    /// A multi-byte write stopped early on a transmit timeout.
    #[error("wrote {written} bytes before transmitter timed out after {waited:?}")]
    Incomplete {
        /// Bytes handed to the transmitter before the timeout.
        written: usize,
        /// How long the failing byte waited.
        waited: Duration,
    },
}

impl TransportError {
    /// Bytes that did reach the transmitter before the error.
    #[inline]
    pub fn written(&self) -> usize {
        match self {
            Self::WriteTimeout { .. } => 0,
            Self::Incomplete { written, .. } => *written,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_maps_to_no_data() {
        let err: NoData = Empty.into();
        assert_eq!(err, NoData);
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            InitError::InvalidCapacity { capacity: 6 }.to_string(),
            "ring capacity 6 is not a non-zero power of two"
        );
        assert_eq!(
            InitError::StorageLength { capacity: 8, len: 4 }.to_string(),
            "storage holds 4 bytes but capacity is 8"
        );
        assert_eq!(Full.to_string(), "ring buffer is full");
    }

    #[test]
    fn test_written_counts_progress() {
        let waited = Duration::from_millis(5);
        assert_eq!(TransportError::WriteTimeout { waited }.written(), 0);
        assert_eq!(
            TransportError::Incomplete { written: 3, waited }.written(),
            3
        );
    }
}
