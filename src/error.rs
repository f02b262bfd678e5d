//! Error types for descriptive-metadata reading.

use crate::ul::InstanceId;
use thiserror::Error;

/// Result type for DM operations.
pub type Result<T> = std::result::Result<T, DmError>;

/// Errors that can occur while reading descriptive metadata.
///
/// Only hard failures surface as `Err`. Recoverable conditions found during
/// resolution (unknown local tags, references to frameworks outside the
/// container, cycles, a malformed payload in one object) are carried as data
/// in the resolved tree so that the rest of the metadata is still returned.
#[derive(Error, Debug)]
pub enum DmError {
    /// IO error from an underlying container read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No framework with the given instance id exists in the container.
    #[error("Framework {0} not found")]
    NotFound(InstanceId),

    /// Caller-supplied buffer is smaller than the framework's declared length.
    #[error("Buffer too small: framework needs {required} bytes, buffer holds {capacity}")]
    SizeMismatch {
        /// Declared payload length.
        required: usize,
        /// Capacity of the buffer the caller supplied.
        capacity: usize,
    },

    /// A payload read was attempted without an open session.
    #[error("No payload session open")]
    SessionNotOpen,

    /// A local set is inconsistent with its declared length.
    #[error("Malformed local set at offset {offset}: {reason}")]
    Malformed {
        /// Byte offset within the payload where decoding stopped.
        offset: usize,
        /// What was wrong at that offset.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DmError::SizeMismatch {
            required: 128,
            capacity: 16,
        };
        assert_eq!(
            err.to_string(),
            "Buffer too small: framework needs 128 bytes, buffer holds 16"
        );

        let err = DmError::Malformed {
            offset: 42,
            reason: "item overruns payload".into(),
        };
        assert!(err.to_string().contains("offset 42"));

        assert_eq!(DmError::SessionNotOpen.to_string(), "No payload session open");
    }

    #[test]
    fn test_not_found_carries_id() {
        let id = InstanceId([0xAB; 16]);
        let err = DmError::NotFound(id);
        assert!(err.to_string().contains("abababab"));
    }
}
