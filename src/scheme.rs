//! Scheme views: read-only projections of a resolved tree.
//!
//! A view gives scheme-specific meaning to the identifiers of a resolved
//! framework. Decoding is infallible: whatever a framework is missing simply
//! stays `None`/empty in its view, and a framework whose scheme nobody
//! recognizes decodes to [`DarkView`], which only exposes the scheme key and
//! declared length.

use crate::registry::{FrameworkKind, SchemeRegistry};
use crate::resolver::{NodeId, RefTarget, ResolvedFramework, ResolvedTree, ResolvedValue};
use crate::ul::{labels, UniversalLabel};
use serde::Serialize;

/// Scheme-specific projection of one resolved framework.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SchemeView {
    /// Production / clip / scene metadata.
    Production(ProductionView),
    /// Broadcast-delivery metadata.
    Broadcast(BroadcastView),
    /// Camera-card clip metadata.
    CameraClip(CameraClipView),
    /// Text-based metadata.
    TextBased(TextView),
    /// Unrecognized scheme.
    Dark(DarkView),
}

/// Production framework with its nested sets.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProductionView {
    /// Title of the framework itself.
    pub framework_title: Option<String>,
    /// Titles sets.
    pub titles: Vec<TitleView>,
    /// Participant sets.
    pub participants: Vec<ParticipantView>,
    /// Location sets.
    pub locations: Vec<LocationView>,
    /// Annotation sets.
    pub annotations: Vec<AnnotationView>,
}

/// A titles set.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TitleView {
    /// Main title.
    pub main_title: Option<String>,
    /// Secondary title.
    pub secondary_title: Option<String>,
}

/// A participant set with the persons it references.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ParticipantView {
    /// Role or function of the participant.
    pub role: Option<String>,
    /// Person sets.
    pub persons: Vec<PersonView>,
}

/// A person set.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PersonView {
    /// Family name.
    pub family_name: Option<String>,
    /// First given name.
    pub first_given_name: Option<String>,
    /// Address sets.
    pub addresses: Vec<AddressView>,
}

/// An address set.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AddressView {
    /// City.
    pub city: Option<String>,
    /// Country.
    pub country: Option<String>,
}

/// A location set.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LocationView {
    /// Location name.
    pub name: Option<String>,
    /// Address sets.
    pub addresses: Vec<AddressView>,
}

/// An annotation set.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AnnotationView {
    /// Annotation kind.
    pub kind: Option<String>,
    /// Annotation synopsis.
    pub synopsis: Option<String>,
}

/// Broadcast-delivery framework.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BroadcastView {
    /// Main title.
    pub main_title: Option<String>,
    /// Secondary title.
    pub secondary_title: Option<String>,
}

/// Camera-card clip framework.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CameraClipView {
    /// Free-text clip notes.
    pub clip_notes: Option<String>,
    /// Thumbnail image, when the framework carries one.
    pub thumbnail: Option<ThumbnailView>,
}

/// Thumbnail image carried by a camera-clip framework.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThumbnailView {
    /// Image format code.
    pub format: u8,
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
    /// Pixel data.
    pub data: Vec<u8>,
}

/// Text-based framework or text object; chains through text-object
/// references.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TextView {
    /// MIME media type of the payload.
    pub mime_type: Option<String>,
    /// RFC 5646 language code.
    pub language: Option<String>,
    /// Identifier of the payload's own scheme.
    pub payload_scheme: Option<UniversalLabel>,
    /// UTF-8 payload text.
    pub text: Option<String>,
    /// Referenced text object, when the payload lives elsewhere.
    pub next: Option<Box<TextView>>,
}

impl TextView {
    /// Payload text of the chain's leaf, however deep.
    pub fn leaf_text(&self) -> Option<&str> {
        let mut current = self;
        while let Some(next) = current.next.as_deref() {
            current = next;
        }
        current.text.as_deref()
    }

    /// Number of chained text objects, counting this one.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = self;
        while let Some(next) = current.next.as_deref() {
            depth += 1;
            current = next;
        }
        depth
    }
}

/// Opaque fallback for unrecognized schemes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DarkView {
    /// Scheme key nobody recognized.
    pub scheme_key: UniversalLabel,
    /// Declared payload length.
    pub length: u32,
}

/// Decode one resolved framework into its scheme view.
///
/// Dispatch is primarily by the framework's pre-classified kind; a framework
/// handed over as dark is re-classified against the registry by its scheme
/// key before falling back to [`DarkView`]. This never fails.
pub fn decode_framework(
    registry: &SchemeRegistry,
    tree: &ResolvedTree,
    node: NodeId,
) -> SchemeView {
    let framework = tree.node(node);
    let kind = match framework.info.kind {
        FrameworkKind::Dark => registry.classify_framework(&framework.info.scheme_key),
        kind => kind,
    };

    match kind {
        FrameworkKind::Production => SchemeView::Production(decode_production(tree, node)),
        FrameworkKind::Broadcast => SchemeView::Broadcast(decode_broadcast(framework)),
        FrameworkKind::CameraClip => SchemeView::CameraClip(decode_camera_clip(framework)),
        FrameworkKind::TextBased => SchemeView::TextBased(decode_text_chain(tree, node)),
        FrameworkKind::Dark => SchemeView::Dark(DarkView {
            scheme_key: framework.info.scheme_key,
            length: framework.info.length,
        }),
    }
}

fn decode_production(tree: &ResolvedTree, node: NodeId) -> ProductionView {
    let framework = tree.node(node);
    let mut view = ProductionView {
        framework_title: utf16(framework, labels::FRAMEWORK_TITLE),
        ..ProductionView::default()
    };

    for title in batch_nodes(tree, framework, labels::TITLES_BATCH) {
        view.titles.push(TitleView {
            main_title: utf16(title, labels::MAIN_TITLE),
            secondary_title: utf16(title, labels::SECONDARY_TITLE),
        });
    }

    for participant in batch_nodes(tree, framework, labels::PARTICIPANTS_BATCH) {
        let mut participant_view = ParticipantView {
            role: utf16(participant, labels::PARTICIPANT_ROLE),
            persons: Vec::new(),
        };
        for person in batch_nodes(tree, participant, labels::PERSONS_BATCH) {
            participant_view.persons.push(PersonView {
                family_name: utf16(person, labels::FAMILY_NAME),
                first_given_name: utf16(person, labels::FIRST_GIVEN_NAME),
                addresses: decode_addresses(tree, person),
            });
        }
        view.participants.push(participant_view);
    }

    for location in batch_nodes(tree, framework, labels::LOCATIONS_BATCH) {
        view.locations.push(LocationView {
            name: utf16(location, labels::LOCATION_NAME),
            addresses: decode_addresses(tree, location),
        });
    }

    for annotation in batch_nodes(tree, framework, labels::ANNOTATIONS_BATCH) {
        view.annotations.push(AnnotationView {
            kind: utf16(annotation, labels::ANNOTATION_KIND),
            synopsis: utf16(annotation, labels::ANNOTATION_SYNOPSIS),
        });
    }

    view
}

fn decode_addresses(tree: &ResolvedTree, owner: &ResolvedFramework) -> Vec<AddressView> {
    batch_nodes(tree, owner, labels::ADDRESSES_BATCH)
        .into_iter()
        .map(|address| AddressView {
            city: utf16(address, labels::ADDRESS_CITY),
            country: utf16(address, labels::ADDRESS_COUNTRY),
        })
        .collect()
}

fn decode_broadcast(framework: &ResolvedFramework) -> BroadcastView {
    BroadcastView {
        main_title: utf16(framework, labels::BROADCAST_MAIN_TITLE),
        secondary_title: utf16(framework, labels::BROADCAST_SECONDARY_TITLE),
    }
}

fn decode_camera_clip(framework: &ResolvedFramework) -> CameraClipView {
    let thumbnail = opaque(framework, labels::THUMBNAIL_DATA).map(|data| ThumbnailView {
        format: uint(framework, labels::THUMBNAIL_FORMAT).unwrap_or(0) as u8,
        width: uint(framework, labels::THUMBNAIL_WIDTH).unwrap_or(0) as u16,
        height: uint(framework, labels::THUMBNAIL_HEIGHT).unwrap_or(0) as u16,
        data: data.to_vec(),
    });

    CameraClipView {
        clip_notes: utf16(framework, labels::CLIP_NOTES),
        thumbnail,
    }
}

/// Decode a chain of text objects iteratively, deepest first.
///
/// The chain is finite: the resolver already replaced any repeated reference
/// with a terminal marker, and the view stops at the first non-expanded
/// target.
fn decode_text_chain(tree: &ResolvedTree, node: NodeId) -> TextView {
    let mut chain = vec![node];
    let mut current = node;
    while let Some(next) = single_node(tree.node(current), labels::TEXT_OBJECT_REF) {
        chain.push(next);
        current = next;
    }

    let mut view: Option<Box<TextView>> = None;
    for id in chain.into_iter().rev() {
        let framework = tree.node(id);
        view = Some(Box::new(TextView {
            mime_type: utf16(framework, labels::TEXT_MIME_TYPE),
            language: utf8(framework, labels::TEXT_LANGUAGE_CODE),
            payload_scheme: opaque(framework, labels::TEXT_PAYLOAD_SCHEME).and_then(|bytes| {
                let bytes: [u8; 16] = bytes.try_into().ok()?;
                Some(UniversalLabel(bytes))
            }),
            text: utf8(framework, labels::TEXT_DATA),
            next: view,
        }));
    }

    // The chain always contains at least the entry node.
    *view.unwrap_or_default()
}

fn utf16(framework: &ResolvedFramework, identifier: crate::ul::Ul) -> Option<String> {
    match &framework.item(&UniversalLabel(identifier))?.value {
        ResolvedValue::Utf16(text) => Some(text.clone()),
        _ => None,
    }
}

fn utf8(framework: &ResolvedFramework, identifier: crate::ul::Ul) -> Option<String> {
    match &framework.item(&UniversalLabel(identifier))?.value {
        ResolvedValue::Utf8(text) => Some(text.clone()),
        _ => None,
    }
}

fn uint(framework: &ResolvedFramework, identifier: crate::ul::Ul) -> Option<u64> {
    match &framework.item(&UniversalLabel(identifier))?.value {
        ResolvedValue::UInt { value, .. } => Some(*value),
        _ => None,
    }
}

fn opaque<'a>(framework: &'a ResolvedFramework, identifier: crate::ul::Ul) -> Option<&'a [u8]> {
    match &framework.item(&UniversalLabel(identifier))?.value {
        ResolvedValue::Opaque(bytes) => Some(bytes),
        _ => None,
    }
}

fn single_node(framework: &ResolvedFramework, identifier: crate::ul::Ul) -> Option<NodeId> {
    match &framework.item(&UniversalLabel(identifier))?.value {
        ResolvedValue::Reference(RefTarget::Node(node)) => Some(*node),
        _ => None,
    }
}

fn batch_nodes<'t>(
    tree: &'t ResolvedTree,
    framework: &ResolvedFramework,
    identifier: crate::ul::Ul,
) -> Vec<&'t ResolvedFramework> {
    match &framework.item(&UniversalLabel(identifier)) {
        Some(item) => match &item.value {
            ResolvedValue::ReferenceBatch(targets) => targets
                .iter()
                .filter_map(|target| match target {
                    RefTarget::Node(node) => Some(tree.node(*node)),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        },
        None => Vec::new(),
    }
}
