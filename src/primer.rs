//! Local tag dictionary.
//!
//! Each container declares a per-file table mapping 2-byte local tags to
//! 16-byte global labels. A tag is only meaningful within the file that
//! declared it; two files may reuse the same tag for different labels. The
//! table is fully populated at container-open time and read-only afterwards.

use crate::ul::{labels, Ul, UniversalLabel};
use std::collections::HashMap;

/// Local tags that every container maps the same way.
pub const TAG_INSTANCE_UID: u16 = 0x3C0A;
/// See [`TAG_INSTANCE_UID`].
pub const TAG_GENERATION_UID: u16 = 0x0102;

/// Per-file mapping from local tags to Universal Labels.
#[derive(Debug, Clone, Default)]
pub struct PrimerPack {
    mappings: HashMap<u16, UniversalLabel>,
}

impl PrimerPack {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        PrimerPack::default()
    }

    /// Create a dictionary pre-seeded with the tags every file carries.
    pub fn with_standard_tags() -> Self {
        let mut primer = PrimerPack::new();
        primer.insert(TAG_INSTANCE_UID, labels::INSTANCE_UID);
        primer.insert(TAG_GENERATION_UID, labels::GENERATION_UID);
        primer
    }

    /// Add a mapping. The first mapping for a tag wins; a redefinition of an
    /// already-declared tag is ignored.
    pub fn insert(&mut self, tag: u16, ul: Ul) {
        self.mappings.entry(tag).or_insert(UniversalLabel(ul));
    }

    /// Resolve a local tag to its global label.
    ///
    /// An absent tag is a normal outcome (a "dark" property the dictionary
    /// never declared), never an error; the caller skips the item.
    pub fn resolve(&self, tag: u16) -> Option<UniversalLabel> {
        self.mappings.get(&tag).copied()
    }

    /// Reverse lookup of the tag declared for a label, if any.
    pub fn tag_for(&self, ul: &UniversalLabel) -> Option<u16> {
        self.mappings
            .iter()
            .find(|(_, mapped)| **mapped == *ul)
            .map(|(tag, _)| *tag)
    }

    /// Number of declared tags.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Check for an empty dictionary.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_tag() {
        let primer = PrimerPack::with_standard_tags();
        assert_eq!(
            primer.resolve(TAG_INSTANCE_UID),
            Some(UniversalLabel(labels::INSTANCE_UID))
        );
    }

    #[test]
    fn test_absent_tag_is_none() {
        let primer = PrimerPack::with_standard_tags();
        assert_eq!(primer.resolve(0x9999), None);
    }

    #[test]
    fn test_first_mapping_wins() {
        let mut primer = PrimerPack::new();
        primer.insert(0x8001, labels::FAMILY_NAME);
        primer.insert(0x8001, labels::FIRST_GIVEN_NAME);
        assert_eq!(
            primer.resolve(0x8001),
            Some(UniversalLabel(labels::FAMILY_NAME))
        );
    }

    #[test]
    fn test_reverse_lookup() {
        let mut primer = PrimerPack::new();
        primer.insert(0x8010, labels::TEXT_DATA);
        assert_eq!(
            primer.tag_for(&UniversalLabel(labels::TEXT_DATA)),
            Some(0x8010)
        );
        assert_eq!(primer.tag_for(&UniversalLabel(labels::CLIP_NOTES)), None);
    }
}
