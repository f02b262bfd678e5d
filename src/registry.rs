//! Immutable registry of the recognized metadata vocabularies.
//!
//! Each scheme owns a set-key prefix (classifying framework sets by their
//! scheme key) and a property prefix with a static table giving recognized
//! properties a name and a wire type. The registry is built once at startup
//! and passed by reference into the resolver, so adding a vocabulary never
//! touches core resolution logic.

use crate::ul::{labels, Ul, UniversalLabel};
use serde::Serialize;

/// Classification of a framework set by its scheme key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FrameworkKind {
    /// Production / clip / scene metadata (participants, titles, locations).
    Production,
    /// Broadcast-delivery metadata (title strings).
    Broadcast,
    /// Camera-card clip metadata (clip notes, thumbnail).
    CameraClip,
    /// Text-based metadata (captions and other textual payloads).
    TextBased,
    /// No recognized vocabulary ("dark metadata").
    Dark,
}

/// Wire type of a recognized property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Big-endian UTF-16 text.
    Utf16,
    /// UTF-8 text.
    Utf8,
    /// Big-endian unsigned integer of the given width in bytes.
    UInt(u8),
    /// Bare 16-byte instance id referencing another framework set.
    SingleRef,
    /// `{count, element size = 16, ids}` batch of instance ids.
    RefBatch,
    /// Uninterpreted bytes.
    Opaque,
}

/// One recognized property within a scheme's vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct PropertyDef {
    /// Global label of the property.
    pub identifier: Ul,
    /// Human-readable property name.
    pub name: &'static str,
    /// Wire type.
    pub kind: PropertyKind,
}

/// One scheme: a vocabulary of sets and properties under well-known prefixes.
#[derive(Debug, Clone, Copy)]
pub struct SchemeDef {
    /// Framework classification this scheme yields.
    pub kind: FrameworkKind,
    /// Scheme name for diagnostics.
    pub name: &'static str,
    /// Prefix all of the scheme's set keys share.
    pub set_prefix: &'static [u8],
    /// Prefix all of the scheme's property labels share.
    pub property_prefix: &'static [u8],
    /// Recognized properties.
    pub properties: &'static [PropertyDef],
}

const COMMON_PROPERTIES: &[PropertyDef] = &[
    PropertyDef {
        identifier: labels::INSTANCE_UID,
        name: "Instance UID",
        kind: PropertyKind::Opaque,
    },
    PropertyDef {
        identifier: labels::GENERATION_UID,
        name: "Generation UID",
        kind: PropertyKind::Opaque,
    },
];

const PRODUCTION_PROPERTIES: &[PropertyDef] = &[
    PropertyDef {
        identifier: labels::FRAMEWORK_TITLE,
        name: "Framework Title",
        kind: PropertyKind::Utf16,
    },
    PropertyDef {
        identifier: labels::TITLES_BATCH,
        name: "Titles Sets",
        kind: PropertyKind::RefBatch,
    },
    PropertyDef {
        identifier: labels::PARTICIPANTS_BATCH,
        name: "Participant Sets",
        kind: PropertyKind::RefBatch,
    },
    PropertyDef {
        identifier: labels::LOCATIONS_BATCH,
        name: "Location Sets",
        kind: PropertyKind::RefBatch,
    },
    PropertyDef {
        identifier: labels::ANNOTATIONS_BATCH,
        name: "Annotation Sets",
        kind: PropertyKind::RefBatch,
    },
    PropertyDef {
        identifier: labels::PERSONS_BATCH,
        name: "Person Sets",
        kind: PropertyKind::RefBatch,
    },
    PropertyDef {
        identifier: labels::ADDRESSES_BATCH,
        name: "Address Sets",
        kind: PropertyKind::RefBatch,
    },
    PropertyDef {
        identifier: labels::MAIN_TITLE,
        name: "Main Title",
        kind: PropertyKind::Utf16,
    },
    PropertyDef {
        identifier: labels::SECONDARY_TITLE,
        name: "Secondary Title",
        kind: PropertyKind::Utf16,
    },
    PropertyDef {
        identifier: labels::PARTICIPANT_ROLE,
        name: "Participant Role",
        kind: PropertyKind::Utf16,
    },
    PropertyDef {
        identifier: labels::FAMILY_NAME,
        name: "Family Name",
        kind: PropertyKind::Utf16,
    },
    PropertyDef {
        identifier: labels::FIRST_GIVEN_NAME,
        name: "First Given Name",
        kind: PropertyKind::Utf16,
    },
    PropertyDef {
        identifier: labels::LOCATION_NAME,
        name: "Location Name",
        kind: PropertyKind::Utf16,
    },
    PropertyDef {
        identifier: labels::ADDRESS_CITY,
        name: "City",
        kind: PropertyKind::Utf16,
    },
    PropertyDef {
        identifier: labels::ADDRESS_COUNTRY,
        name: "Country",
        kind: PropertyKind::Utf16,
    },
    PropertyDef {
        identifier: labels::ANNOTATION_KIND,
        name: "Annotation Kind",
        kind: PropertyKind::Utf16,
    },
    PropertyDef {
        identifier: labels::ANNOTATION_SYNOPSIS,
        name: "Annotation Synopsis",
        kind: PropertyKind::Utf16,
    },
];

const BROADCAST_PROPERTIES: &[PropertyDef] = &[
    PropertyDef {
        identifier: labels::BROADCAST_MAIN_TITLE,
        name: "Main Title",
        kind: PropertyKind::Utf16,
    },
    PropertyDef {
        identifier: labels::BROADCAST_SECONDARY_TITLE,
        name: "Secondary Title",
        kind: PropertyKind::Utf16,
    },
];

const TEXT_PROPERTIES: &[PropertyDef] = &[
    PropertyDef {
        identifier: labels::TEXT_MIME_TYPE,
        name: "MIME Media Type",
        kind: PropertyKind::Utf16,
    },
    PropertyDef {
        identifier: labels::TEXT_LANGUAGE_CODE,
        name: "Language Code",
        kind: PropertyKind::Utf8,
    },
    PropertyDef {
        identifier: labels::TEXT_PAYLOAD_SCHEME,
        name: "Payload Scheme",
        kind: PropertyKind::Opaque,
    },
    PropertyDef {
        identifier: labels::TEXT_DATA,
        name: "Text Data",
        kind: PropertyKind::Utf8,
    },
    PropertyDef {
        identifier: labels::TEXT_OBJECT_REF,
        name: "Text Object",
        kind: PropertyKind::SingleRef,
    },
];

const CAMERA_CLIP_PROPERTIES: &[PropertyDef] = &[
    PropertyDef {
        identifier: labels::CLIP_NOTES,
        name: "Clip Notes",
        kind: PropertyKind::Utf16,
    },
    PropertyDef {
        identifier: labels::THUMBNAIL_FORMAT,
        name: "Thumbnail Format",
        kind: PropertyKind::UInt(1),
    },
    PropertyDef {
        identifier: labels::THUMBNAIL_WIDTH,
        name: "Thumbnail Width",
        kind: PropertyKind::UInt(2),
    },
    PropertyDef {
        identifier: labels::THUMBNAIL_HEIGHT,
        name: "Thumbnail Height",
        kind: PropertyKind::UInt(2),
    },
    PropertyDef {
        identifier: labels::THUMBNAIL_DATA,
        name: "Thumbnail Data",
        kind: PropertyKind::Opaque,
    },
];

/// Immutable table of recognized schemes.
#[derive(Debug, Clone)]
pub struct SchemeRegistry {
    schemes: Vec<SchemeDef>,
}

impl SchemeRegistry {
    /// Build the registry of the vocabularies this crate ships.
    pub fn well_known() -> Self {
        SchemeRegistry {
            schemes: vec![
                SchemeDef {
                    kind: FrameworkKind::Production,
                    name: "Production",
                    set_prefix: &labels::PRODUCTION_SET_PREFIX,
                    property_prefix: &labels::PRODUCTION_PROPERTY_PREFIX,
                    properties: PRODUCTION_PROPERTIES,
                },
                SchemeDef {
                    kind: FrameworkKind::Broadcast,
                    name: "Broadcast",
                    set_prefix: &labels::BROADCAST_SET_PREFIX,
                    property_prefix: &labels::BROADCAST_PROPERTY_PREFIX,
                    properties: BROADCAST_PROPERTIES,
                },
                SchemeDef {
                    kind: FrameworkKind::TextBased,
                    name: "Text-Based",
                    set_prefix: &labels::TEXT_SET_PREFIX,
                    property_prefix: &labels::TEXT_PROPERTY_PREFIX,
                    properties: TEXT_PROPERTIES,
                },
                SchemeDef {
                    kind: FrameworkKind::CameraClip,
                    name: "Camera Clip",
                    set_prefix: &labels::CAMERA_CLIP_SET_PREFIX,
                    property_prefix: &labels::CAMERA_CLIP_PROPERTY_PREFIX,
                    properties: CAMERA_CLIP_PROPERTIES,
                },
            ],
        }
    }

    /// Add a vocabulary (new schemes never touch core resolution logic).
    pub fn with_scheme(mut self, scheme: SchemeDef) -> Self {
        self.schemes.push(scheme);
        self
    }

    /// Classify a framework set by its scheme key.
    pub fn classify_framework(&self, scheme_key: &UniversalLabel) -> FrameworkKind {
        self.schemes
            .iter()
            .find(|s| scheme_key.matches_prefix(s.set_prefix))
            .map(|s| s.kind)
            .unwrap_or(FrameworkKind::Dark)
    }

    /// Look up the scheme definition for a classification.
    pub fn scheme(&self, kind: FrameworkKind) -> Option<&SchemeDef> {
        self.schemes.iter().find(|s| s.kind == kind)
    }

    /// Look up a property within the framework's scheme.
    ///
    /// Dispatch is primarily by the framework's pre-classified kind. For a
    /// dark framework the property's own prefix decides the scheme; labels
    /// matching no prefix stay unrecognized and decode as opaque leaves.
    pub fn property(
        &self,
        framework: FrameworkKind,
        identifier: &UniversalLabel,
    ) -> Option<&PropertyDef> {
        if let Some(common) = lookup(COMMON_PROPERTIES, identifier) {
            return Some(common);
        }

        if framework != FrameworkKind::Dark {
            if let Some(scheme) = self.scheme(framework) {
                if let Some(def) = lookup(scheme.properties, identifier) {
                    return Some(def);
                }
            }
        }

        self.schemes
            .iter()
            .filter(|s| identifier.matches_prefix(s.property_prefix))
            .find_map(|s| lookup(s.properties, identifier))
    }
}

fn lookup<'a>(table: &'a [PropertyDef], identifier: &UniversalLabel) -> Option<&'a PropertyDef> {
    table.iter().find(|def| def.identifier == identifier.0)
}

impl Default for SchemeRegistry {
    fn default() -> Self {
        SchemeRegistry::well_known()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_schemes() {
        let registry = SchemeRegistry::well_known();
        assert_eq!(
            registry.classify_framework(&UniversalLabel(labels::PRODUCTION_FRAMEWORK)),
            FrameworkKind::Production
        );
        assert_eq!(
            registry.classify_framework(&UniversalLabel(labels::PERSON_SET)),
            FrameworkKind::Production
        );
        assert_eq!(
            registry.classify_framework(&UniversalLabel(labels::TEXT_OBJECT_SET)),
            FrameworkKind::TextBased
        );
        assert_eq!(
            registry.classify_framework(&UniversalLabel(labels::CAMERA_CLIP_FRAMEWORK)),
            FrameworkKind::CameraClip
        );
    }

    #[test]
    fn test_unrecognized_scheme_is_dark() {
        let registry = SchemeRegistry::well_known();
        assert_eq!(
            registry.classify_framework(&UniversalLabel([0xFF; 16])),
            FrameworkKind::Dark
        );
    }

    #[test]
    fn test_property_dispatch_by_kind() {
        let registry = SchemeRegistry::well_known();
        let def = registry
            .property(
                FrameworkKind::Production,
                &UniversalLabel(labels::FAMILY_NAME),
            )
            .unwrap();
        assert_eq!(def.name, "Family Name");
        assert_eq!(def.kind, PropertyKind::Utf16);
    }

    #[test]
    fn test_property_prefix_fallback_for_dark_frameworks() {
        let registry = SchemeRegistry::well_known();
        // Kind is Dark, but the property prefix still identifies the scheme.
        let def = registry
            .property(FrameworkKind::Dark, &UniversalLabel(labels::TEXT_DATA))
            .unwrap();
        assert_eq!(def.name, "Text Data");
    }

    #[test]
    fn test_common_properties_recognized_everywhere() {
        let registry = SchemeRegistry::well_known();
        for kind in [
            FrameworkKind::Production,
            FrameworkKind::TextBased,
            FrameworkKind::Dark,
        ] {
            let def = registry
                .property(kind, &UniversalLabel(labels::INSTANCE_UID))
                .unwrap();
            assert_eq!(def.name, "Instance UID");
        }
    }

    #[test]
    fn test_unknown_property_is_none() {
        let registry = SchemeRegistry::well_known();
        assert!(registry
            .property(FrameworkKind::Production, &UniversalLabel([0xEE; 16]))
            .is_none());
    }
}
