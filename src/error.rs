//! Error types for the ISM8 protocol.

use std::io;
use thiserror::Error;

/// Result type alias for ISM8 operations.
pub type Result<T> = std::result::Result<T, Ism8Error>;

/// Errors that can occur during ISM8 communication.
#[derive(Debug, Error)]
pub enum Ism8Error {
    /// Raw bytes could not be decoded for a known data type.
    #[error("Decode error for datapoint {id}: {reason}")]
    Decode {
        /// Datapoint identifier the bytes belonged to.
        id: u16,
        /// Description of the decode failure.
        reason: String,
    },

    /// A value could not be encoded for transmission.
    #[error("Encode error for datapoint {id}: {reason}")]
    Encode {
        /// Datapoint identifier the value was meant for.
        id: u16,
        /// Description of the encode failure.
        reason: String,
    },

    /// The identifier is not present in the datapoint registry.
    #[error("Unknown datapoint {id}")]
    UnknownDatapoint {
        /// The unresolved identifier.
        id: u16,
    },

    /// The datapoint exists but is read-only.
    #[error("Datapoint {id} is not writable")]
    NotWritable {
        /// The read-only identifier.
        id: u16,
    },

    /// The byte stream could not be framed into telegrams.
    #[error("Framing error: {reason}")]
    Framing {
        /// Description of the framing failure.
        reason: String,
    },

    /// No gateway connection is currently established.
    #[error("No connection to ISM8 module")]
    NotConnected,

    /// The connection closed while an operation was in flight.
    #[error("Connection closed")]
    ConnectionClosed,

    /// I/O error during communication.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Ism8Error {
    /// Creates a new `Decode` error.
    pub fn decode(id: u16, reason: impl Into<String>) -> Self {
        Self::Decode {
            id,
            reason: reason.into(),
        }
    }

    /// Creates a new `Encode` error.
    pub fn encode(id: u16, reason: impl Into<String>) -> Self {
        Self::Encode {
            id,
            reason: reason.into(),
        }
    }

    /// Creates a new `Framing` error.
    pub fn framing(reason: impl Into<String>) -> Self {
        Self::Framing {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_display() {
        let err = Ism8Error::decode(178, "need 2 bytes, got 1");
        assert_eq!(
            err.to_string(),
            "Decode error for datapoint 178: need 2 bytes, got 1"
        );
    }

    #[test]
    fn test_not_writable_display() {
        let err = Ism8Error::NotWritable { id: 1 };
        assert_eq!(err.to_string(), "Datapoint 1 is not writable");
    }

    #[test]
    fn test_framing_display() {
        let err = Ism8Error::framing("resync limit exceeded");
        assert_eq!(err.to_string(), "Framing error: resync limit exceeded");
    }

    #[test]
    fn test_not_connected_display() {
        let err = Ism8Error::NotConnected;
        assert_eq!(err.to_string(), "No connection to ISM8 module");
    }
}
