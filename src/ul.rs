//! Identifier types for descriptive metadata.
//!
//! Two 16-byte identifier spaces are in play:
//!
//! - [`UniversalLabel`]: a globally-scoped SMPTE label naming either a
//!   property's meaning or a framework's scheme ("scheme key").
//! - [`InstanceId`]: identifies one framework set within one open container.
//!   Unique per file only; two files may reuse the same instance id.

use serde::Serialize;
use std::fmt;

/// A raw 16-byte Universal Label.
pub type Ul = [u8; 16];

/// Universal Label wrapper with helper methods.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct UniversalLabel(pub Ul);

impl UniversalLabel {
    /// Create from raw bytes.
    pub fn new(bytes: Ul) -> Self {
        UniversalLabel(bytes)
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &Ul {
        &self.0
    }

    /// Check if this is a SMPTE-registered label (starts with 06 0E 2B 34).
    pub fn is_smpte(&self) -> bool {
        self.0[0] == 0x06 && self.0[1] == 0x0E && self.0[2] == 0x2B && self.0[3] == 0x34
    }

    /// Check if the label starts with the given prefix.
    pub fn matches_prefix(&self, prefix: &[u8]) -> bool {
        self.0.len() >= prefix.len() && self.0[..prefix.len()] == *prefix
    }
}

impl fmt::Debug for UniversalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UL(")?;
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for UniversalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl From<Ul> for UniversalLabel {
    fn from(bytes: Ul) -> Self {
        UniversalLabel(bytes)
    }
}

impl From<&Ul> for UniversalLabel {
    fn from(bytes: &Ul) -> Self {
        UniversalLabel(*bytes)
    }
}

/// Identifies one framework set within one open container.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct InstanceId(pub [u8; 16]);

impl InstanceId {
    /// The all-zero instance id (used for "no generation").
    pub const ZERO: InstanceId = InstanceId([0; 16]);

    /// Create from raw bytes.
    pub fn new(bytes: [u8; 16]) -> Self {
        InstanceId(bytes)
    }

    /// Mint a fresh random instance id (for building containers in memory).
    pub fn random() -> Self {
        InstanceId(*uuid::Uuid::new_v4().as_bytes())
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Check for the all-zero id.
    pub fn is_zero(&self) -> bool {
        self.0 == [0; 16]
    }
}

impl fmt::Debug for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceId({})", self)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl From<[u8; 16]> for InstanceId {
    fn from(bytes: [u8; 16]) -> Self {
        InstanceId(bytes)
    }
}

/// Well-known labels for the supported descriptive-metadata vocabularies.
///
/// Set keys (scheme keys on framework sets) live in the groups registry
/// (`06 0E 2B 34 02 53 ...`); property labels live in the elements registry
/// (`06 0E 2B 34 01 01 ...`). Each scheme keeps its sets and properties under
/// one well-known prefix so that unrecognized-but-related labels can still be
/// attributed to a scheme.
pub mod labels {
    use super::Ul;

    /// SMPTE label prefix.
    pub const SMPTE_PREFIX: [u8; 4] = [0x06, 0x0E, 0x2B, 0x34];

    // Properties common to every local set.

    /// Instance UID property.
    pub const INSTANCE_UID: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x15, 0x02, 0x00, 0x00, 0x00,
        0x00,
    ];

    /// Generation UID property.
    pub const GENERATION_UID: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x02, 0x05, 0x20, 0x07, 0x01, 0x05, 0x01, 0x00,
        0x00,
    ];

    // Production / clip / scene scheme (set keys under 0D 01 04 01 01).

    /// Set-key prefix shared by every production-scheme set.
    pub const PRODUCTION_SET_PREFIX: [u8; 13] = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x04, 0x01, 0x01,
    ];

    /// Property prefix shared by every production-scheme property.
    pub const PRODUCTION_PROPERTY_PREFIX: [u8; 10] =
        [0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x02, 0x30];

    /// Production framework.
    pub const PRODUCTION_FRAMEWORK: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x04, 0x01, 0x01, 0x01, 0x01,
        0x00,
    ];

    /// Clip framework.
    pub const CLIP_FRAMEWORK: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x04, 0x01, 0x01, 0x01, 0x02,
        0x00,
    ];

    /// Scene framework.
    pub const SCENE_FRAMEWORK: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x04, 0x01, 0x01, 0x01, 0x03,
        0x00,
    ];

    /// Titles set.
    pub const TITLES_SET: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x04, 0x01, 0x01, 0x10, 0x00,
        0x00,
    ];

    /// Participant set.
    pub const PARTICIPANT_SET: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x04, 0x01, 0x01, 0x11, 0x00,
        0x00,
    ];

    /// Person set.
    pub const PERSON_SET: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x04, 0x01, 0x01, 0x12, 0x00,
        0x00,
    ];

    /// Location set.
    pub const LOCATION_SET: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x04, 0x01, 0x01, 0x14, 0x00,
        0x00,
    ];

    /// Address set.
    pub const ADDRESS_SET: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x04, 0x01, 0x01, 0x15, 0x00,
        0x00,
    ];

    /// Annotation set.
    pub const ANNOTATION_SET: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x04, 0x01, 0x01, 0x16, 0x00,
        0x00,
    ];

    /// Framework title (UTF-16 string on the framework itself).
    pub const FRAMEWORK_TITLE: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x02, 0x30, 0x01, 0x01, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Batch of references to titles sets.
    pub const TITLES_BATCH: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x02, 0x30, 0x02, 0x01, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Batch of references to participant sets.
    pub const PARTICIPANTS_BATCH: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x02, 0x30, 0x02, 0x02, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Batch of references to location sets.
    pub const LOCATIONS_BATCH: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x02, 0x30, 0x02, 0x03, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Batch of references to annotation sets.
    pub const ANNOTATIONS_BATCH: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x02, 0x30, 0x02, 0x04, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Batch of references to person sets (on a participant set).
    pub const PERSONS_BATCH: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x02, 0x30, 0x02, 0x05, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Batch of references to address sets (on a person or location set).
    pub const ADDRESSES_BATCH: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x02, 0x30, 0x02, 0x06, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Main title (UTF-16) on a titles set.
    pub const MAIN_TITLE: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x02, 0x30, 0x03, 0x01, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Secondary title (UTF-16) on a titles set.
    pub const SECONDARY_TITLE: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x02, 0x30, 0x03, 0x02, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Participant role/function (UTF-16).
    pub const PARTICIPANT_ROLE: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x02, 0x30, 0x04, 0x01, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Family name (UTF-16) on a person set.
    pub const FAMILY_NAME: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x02, 0x30, 0x05, 0x01, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// First given name (UTF-16) on a person set.
    pub const FIRST_GIVEN_NAME: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x02, 0x30, 0x05, 0x02, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Location name (UTF-16) on a location set.
    pub const LOCATION_NAME: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x02, 0x30, 0x06, 0x01, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// City (UTF-16) on an address set.
    pub const ADDRESS_CITY: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x02, 0x30, 0x07, 0x01, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Country (UTF-16) on an address set.
    pub const ADDRESS_COUNTRY: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x02, 0x30, 0x07, 0x02, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Annotation kind (UTF-16) on an annotation set.
    pub const ANNOTATION_KIND: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x02, 0x30, 0x08, 0x01, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Annotation synopsis (UTF-16) on an annotation set.
    pub const ANNOTATION_SYNOPSIS: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x02, 0x30, 0x08, 0x02, 0x01, 0x00, 0x00,
        0x00,
    ];

    // Broadcast-delivery scheme (set keys under 0D 01 04 01 02).

    /// Set-key prefix shared by every broadcast-scheme set.
    pub const BROADCAST_SET_PREFIX: [u8; 13] = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x04, 0x01, 0x02,
    ];

    /// Property prefix shared by every broadcast-scheme property.
    pub const BROADCAST_PROPERTY_PREFIX: [u8; 10] =
        [0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x02, 0x40];

    /// Broadcast framework.
    pub const BROADCAST_FRAMEWORK: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x04, 0x01, 0x02, 0x01, 0x01,
        0x00,
    ];

    /// Broadcast main title (UTF-16).
    pub const BROADCAST_MAIN_TITLE: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x02, 0x40, 0x01, 0x01, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Broadcast secondary title (UTF-16).
    pub const BROADCAST_SECONDARY_TITLE: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x02, 0x40, 0x01, 0x02, 0x01, 0x00, 0x00,
        0x00,
    ];

    // Text-based scheme (captions and other textual payloads,
    // set keys under 0D 01 04 01 04).

    /// Set-key prefix shared by every text-based-scheme set.
    pub const TEXT_SET_PREFIX: [u8; 13] = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x04, 0x01, 0x04,
    ];

    /// Property prefix shared by every text-based-scheme property.
    pub const TEXT_PROPERTY_PREFIX: [u8; 10] =
        [0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x03, 0x01];

    /// Text-based framework.
    pub const TEXT_FRAMEWORK: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x04, 0x01, 0x04, 0x01, 0x01,
        0x00,
    ];

    /// Text-based object set.
    pub const TEXT_OBJECT_SET: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0D, 0x01, 0x04, 0x01, 0x04, 0x02, 0x00,
        0x00,
    ];

    /// MIME media type (UTF-16) of the text payload.
    pub const TEXT_MIME_TYPE: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x03, 0x01, 0x01, 0x01, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// RFC 5646 language code (UTF-8).
    pub const TEXT_LANGUAGE_CODE: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x03, 0x01, 0x01, 0x02, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Identifier of the payload's own scheme (16 opaque bytes).
    pub const TEXT_PAYLOAD_SCHEME: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x03, 0x01, 0x01, 0x03, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// UTF-8 payload text.
    pub const TEXT_DATA: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x03, 0x01, 0x01, 0x04, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Single reference to another text-based object.
    pub const TEXT_OBJECT_REF: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x04, 0x03, 0x01, 0x01, 0x05, 0x01, 0x00, 0x00,
        0x00,
    ];

    // Camera-card clip scheme (vendor private, set keys under 0E 06).

    /// Set-key prefix shared by every camera-clip-scheme set.
    pub const CAMERA_CLIP_SET_PREFIX: [u8; 13] = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0E, 0x06, 0x06, 0x01, 0x01,
    ];

    /// Property prefix shared by every camera-clip-scheme property.
    pub const CAMERA_CLIP_PROPERTY_PREFIX: [u8; 10] =
        [0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x01, 0x0E, 0x06];

    /// Camera-card clip framework.
    pub const CAMERA_CLIP_FRAMEWORK: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x02, 0x53, 0x01, 0x01, 0x0E, 0x06, 0x06, 0x01, 0x01, 0x01, 0x01,
        0x00,
    ];

    /// Free-text clip notes (UTF-16).
    pub const CLIP_NOTES: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x01, 0x0E, 0x06, 0x01, 0x01, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Thumbnail image format code (1-byte unsigned).
    pub const THUMBNAIL_FORMAT: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x01, 0x0E, 0x06, 0x01, 0x02, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Thumbnail width in pixels (2-byte unsigned).
    pub const THUMBNAIL_WIDTH: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x01, 0x0E, 0x06, 0x01, 0x03, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Thumbnail height in pixels (2-byte unsigned).
    pub const THUMBNAIL_HEIGHT: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x01, 0x0E, 0x06, 0x01, 0x04, 0x01, 0x00, 0x00,
        0x00,
    ];

    /// Thumbnail pixel data (opaque bytes).
    pub const THUMBNAIL_DATA: Ul = [
        0x06, 0x0E, 0x2B, 0x34, 0x01, 0x01, 0x01, 0x01, 0x0E, 0x06, 0x01, 0x05, 0x01, 0x00, 0x00,
        0x00,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universal_label() {
        let ul = UniversalLabel::new(labels::PRODUCTION_FRAMEWORK);
        assert!(ul.is_smpte());
        assert!(ul.matches_prefix(&labels::PRODUCTION_SET_PREFIX));
        assert!(!ul.matches_prefix(&labels::TEXT_SET_PREFIX));
    }

    #[test]
    fn test_prefix_longer_than_label() {
        let ul = UniversalLabel::new(labels::TEXT_FRAMEWORK);
        assert!(!ul.matches_prefix(&[0u8; 17]));
    }

    #[test]
    fn test_instance_id_display() {
        let id = InstanceId([
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D,
            0x0E, 0x0F,
        ]);
        assert_eq!(id.to_string(), "000102030405060708090a0b0c0d0e0f");
        assert!(!id.is_zero());
        assert!(InstanceId::ZERO.is_zero());
    }

    #[test]
    fn test_random_ids_differ() {
        assert_ne!(InstanceId::random(), InstanceId::random());
    }

    #[test]
    fn test_scheme_prefixes_distinct() {
        let prefixes: [&[u8]; 4] = [
            &labels::PRODUCTION_SET_PREFIX,
            &labels::BROADCAST_SET_PREFIX,
            &labels::TEXT_SET_PREFIX,
            &labels::CAMERA_CLIP_SET_PREFIX,
        ];
        for (i, a) in prefixes.iter().enumerate() {
            for b in prefixes.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
