//! Descriptive-metadata track and segment model.
//!
//! DM tracks anchor framework sets to spans of the container timeline and to
//! specific essence tracks. The container collaborator enumerates them
//! eagerly at open time; segments within one track are required by the format
//! to be non-overlapping and ordered by start position, which is validated
//! defensively rather than trusted.

use crate::registry::FrameworkKind;
use crate::ul::{InstanceId, UniversalLabel};
use serde::Serialize;

/// What kind of timeline a DM track describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DmTrackKind {
    /// Metadata varying along the timeline.
    Timeline,
    /// Metadata applying to the whole container.
    Static,
    /// Point events.
    Event,
}

/// One span of descriptive metadata within a track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DmSegment {
    /// Start position in edit units (0 for static metadata).
    pub start_position: i64,
    /// Duration in edit units (-1 when unspecified).
    pub duration: i64,
    /// Optional free-text comment.
    pub comment: Option<String>,
    /// Essence track ids this segment applies to; `None` means all tracks.
    pub track_ids: Option<Vec<u32>>,
    /// Root framework set of this segment.
    pub framework_id: InstanceId,
    /// Scheme key of the root framework.
    pub scheme_key: UniversalLabel,
    /// Pre-classified scheme of the root framework.
    pub framework_kind: FrameworkKind,
}

/// One descriptive-metadata track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DmTrack {
    /// Track id within the container.
    pub track_id: u32,
    /// Track kind.
    pub kind: DmTrackKind,
    /// Track duration in edit units (-1 when unspecified).
    pub duration: i64,
    /// Segments in start-position order.
    pub segments: Vec<DmSegment>,
}

impl DmTrack {
    /// Enforce the format's segment ordering invariant.
    ///
    /// Out-of-order segments are sorted and overlapping spans are reported,
    /// both as warnings, never as errors: a malformed writer must not make
    /// the rest of the metadata unreadable.
    pub fn normalize(&mut self) {
        let sorted = self
            .segments
            .windows(2)
            .all(|pair| pair[0].start_position <= pair[1].start_position);
        if !sorted {
            log::warn!(
                "DM track {}: segments out of start-position order, sorting",
                self.track_id
            );
            self.segments.sort_by_key(|s| s.start_position);
        }

        for pair in self.segments.windows(2) {
            let end = pair[0].start_position.saturating_add(pair[0].duration.max(0));
            if pair[0].duration >= 0 && end > pair[1].start_position {
                log::warn!(
                    "DM track {}: segment at {} overlaps segment at {}",
                    self.track_id,
                    pair[0].start_position,
                    pair[1].start_position
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ul::labels;

    fn segment(start: i64, duration: i64) -> DmSegment {
        DmSegment {
            start_position: start,
            duration,
            comment: None,
            track_ids: None,
            framework_id: InstanceId([start as u8; 16]),
            scheme_key: UniversalLabel(labels::PRODUCTION_FRAMEWORK),
            framework_kind: FrameworkKind::Production,
        }
    }

    #[test]
    fn test_normalize_sorts_out_of_order_segments() {
        let mut track = DmTrack {
            track_id: 1,
            kind: DmTrackKind::Timeline,
            duration: 300,
            segments: vec![segment(200, 100), segment(0, 100), segment(100, 100)],
        };
        track.normalize();

        let starts: Vec<i64> = track.segments.iter().map(|s| s.start_position).collect();
        assert_eq!(starts, vec![0, 100, 200]);
    }

    #[test]
    fn test_normalize_keeps_ordered_segments() {
        let mut track = DmTrack {
            track_id: 2,
            kind: DmTrackKind::Event,
            duration: -1,
            segments: vec![segment(0, 50), segment(50, 50)],
        };
        let before = track.segments.clone();
        track.normalize();
        assert_eq!(track.segments, before);
    }

    #[test]
    fn test_normalize_tolerates_overlap() {
        // Overlap is warned about but preserved.
        let mut track = DmTrack {
            track_id: 3,
            kind: DmTrackKind::Timeline,
            duration: 100,
            segments: vec![segment(0, 80), segment(50, 50)],
        };
        track.normalize();
        assert_eq!(track.segments.len(), 2);
    }
}
