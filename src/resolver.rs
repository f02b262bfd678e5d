//! Framework resolver: raw payload bytes into a typed, recursive value tree.
//!
//! Resolution walks one framework's local-set items, resolves each tag
//! through the container's dictionary, decodes scalar values, and follows
//! reference-typed values into other framework sets. The format places no
//! acyclicity guarantee on object references, so every id expanded within one
//! top-level call is remembered and never re-entered; a repeat reference
//! terminates in a cycle marker instead.
//!
//! The walk uses an explicit work-stack and an arena of nodes rather than
//! native call-stack recursion, so reference chains as deep as the file can
//! express cannot exhaust the stack. All store reads of one resolution happen
//! inside a single payload session, released on every exit path.

use crate::error::{DmError, Result};
use crate::klv::{self, LocalSetReader};
use crate::registry::{PropertyKind, SchemeRegistry};
use crate::store::{FrameworkInfo, FrameworkStore, StoreSession};
use crate::ul::{InstanceId, UniversalLabel};
use serde::Serialize;
use std::collections::HashSet;

/// Index of a node within a [`ResolvedTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(usize);

/// Outcome of following one instance-id reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RefTarget {
    /// The referenced framework, expanded.
    Node(NodeId),
    /// The id is not present in this container; expected, skipped silently.
    Missing(InstanceId),
    /// The id was already expanded in this resolution; terminal marker.
    Cyclic(InstanceId),
}

/// A decoded property value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ResolvedValue {
    /// Big-endian UTF-16 text.
    Utf16(String),
    /// UTF-8 text.
    Utf8(String),
    /// Big-endian unsigned integer.
    UInt {
        /// Decoded value.
        value: u64,
        /// Width on the wire in bytes.
        width: u8,
    },
    /// Uninterpreted bytes (unknown identifiers land here).
    Opaque(Vec<u8>),
    /// Single reference to another framework set.
    Reference(RefTarget),
    /// Ordered batch of references.
    ReferenceBatch(Vec<RefTarget>),
}

/// One resolved local-set item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedItem {
    /// File-local tag the item was stored under.
    pub local_tag: u16,
    /// Global label the tag resolved to.
    pub identifier: UniversalLabel,
    /// Registry name for the property, when recognized.
    pub name: Option<&'static str>,
    /// Decoded value.
    pub value: ResolvedValue,
}

/// Problem found while decoding one framework's payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FrameworkProblem {
    /// The local set is inconsistent with the declared length; decoding of
    /// this payload stopped at `offset`. Siblings and ancestors continue.
    Malformed {
        /// Byte offset where decoding stopped.
        offset: usize,
        /// What was wrong.
        reason: String,
    },
    /// The payload could not be read from the store.
    ReadFailed {
        /// Store error rendered for diagnostics.
        reason: String,
    },
}

/// One expanded framework set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedFramework {
    /// Store record of the framework.
    pub info: FrameworkInfo,
    /// Items in payload order (dictionary-resolved tags only).
    pub items: Vec<ResolvedItem>,
    /// Payload bytes consumed; equals the declared length when well-formed.
    pub bytes_consumed: usize,
    /// Items whose local tag the dictionary does not declare.
    pub dark_items: u32,
    /// Set when this payload could not be fully decoded.
    pub problem: Option<FrameworkProblem>,
}

impl ResolvedFramework {
    /// First item carrying the given identifier, if present.
    pub fn item(&self, identifier: &UniversalLabel) -> Option<&ResolvedItem> {
        self.items.iter().find(|i| i.identifier == *identifier)
    }
}

/// Arena of expanded frameworks reachable from one root.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedTree {
    nodes: Vec<ResolvedFramework>,
    root: NodeId,
}

impl ResolvedTree {
    /// Entry-point node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Access a node by id.
    pub fn node(&self, id: NodeId) -> &ResolvedFramework {
        &self.nodes[id.0]
    }

    /// All nodes, in expansion order (root first).
    pub fn nodes(&self) -> &[ResolvedFramework] {
        &self.nodes
    }

    /// Number of frameworks expanded.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always has at least its root node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Reference slot awaiting expansion.
struct PendingRef {
    node: usize,
    item: usize,
    batch_slot: Option<usize>,
    id: InstanceId,
}

/// Expands framework sets against a registry of recognized vocabularies.
pub struct Resolver<'r> {
    registry: &'r SchemeRegistry,
}

impl<'r> Resolver<'r> {
    /// Create a resolver over a registry.
    pub fn new(registry: &'r SchemeRegistry) -> Self {
        Resolver { registry }
    }

    /// Expand the framework `root` and everything transitively reachable
    /// from it into a tree.
    ///
    /// Opens one payload session for the whole walk. Fails only when `root`
    /// itself is unknown or the session cannot be opened; every problem
    /// found deeper in the graph is annotated in the returned tree instead.
    pub fn resolve<S: FrameworkStore>(
        &self,
        store: &mut S,
        root: InstanceId,
    ) -> Result<ResolvedTree> {
        let root_info = store
            .info_by_instance_id(root)
            .cloned()
            .ok_or(DmError::NotFound(root))?;

        let session = StoreSession::open(store)?;
        let store = session.store();

        let mut nodes: Vec<ResolvedFramework> = Vec::new();
        let mut visited: HashSet<InstanceId> = HashSet::new();
        let mut work: Vec<PendingRef> = Vec::new();

        let root_node = self.expand(store, root_info, &mut nodes, &mut visited, &mut work);

        while let Some(pending) = work.pop() {
            let target = if visited.contains(&pending.id) {
                RefTarget::Cyclic(pending.id)
            } else if let Some(info) = store.info_by_instance_id(pending.id).cloned() {
                let node = self.expand(store, info, &mut nodes, &mut visited, &mut work);
                RefTarget::Node(node)
            } else {
                // References to data outside this container are expected.
                log::debug!("Reference to unknown framework {}, skipping", pending.id);
                RefTarget::Missing(pending.id)
            };
            set_target(&mut nodes, &pending, target);
        }

        Ok(ResolvedTree {
            nodes,
            root: root_node,
        })
    }

    /// Decode one framework's payload into a new node, queueing its
    /// references for later expansion.
    fn expand<S: FrameworkStore + ?Sized>(
        &self,
        store: &S,
        info: FrameworkInfo,
        nodes: &mut Vec<ResolvedFramework>,
        visited: &mut HashSet<InstanceId>,
        work: &mut Vec<PendingRef>,
    ) -> NodeId {
        visited.insert(info.instance_id);
        let node_index = nodes.len();

        let mut payload = vec![0u8; info.length as usize];
        if let Err(e) = store.read_payload(info.instance_id, &mut payload) {
            log::warn!("Payload read failed for {}: {}", info.instance_id, e);
            nodes.push(ResolvedFramework {
                info,
                items: Vec::new(),
                bytes_consumed: 0,
                dark_items: 0,
                problem: Some(FrameworkProblem::ReadFailed {
                    reason: e.to_string(),
                }),
            });
            return NodeId(node_index);
        }

        let mut items: Vec<ResolvedItem> = Vec::new();
        let mut dark_items = 0u32;
        let mut problem = None;
        let mut reader = LocalSetReader::new(&payload);
        let mut pending_here: Vec<PendingRef> = Vec::new();

        loop {
            let raw = match reader.next_item() {
                Ok(Some(raw)) => raw,
                Ok(None) => break,
                Err(e) => {
                    let (offset, reason) = match e {
                        DmError::Malformed { offset, reason } => (offset, reason),
                        other => (reader.position(), other.to_string()),
                    };
                    log::warn!(
                        "Malformed framework {} at offset {}: {}",
                        info.instance_id,
                        offset,
                        reason
                    );
                    problem = Some(FrameworkProblem::Malformed { offset, reason });
                    break;
                }
            };

            let Some(identifier) = store.resolve_tag(raw.tag) else {
                log::debug!(
                    "Local tag {:#06x} not in dictionary, skipping dark property",
                    raw.tag
                );
                dark_items += 1;
                continue;
            };

            let def = self.registry.property(info.kind, &identifier);
            let kind = def.map(|d| d.kind).unwrap_or(PropertyKind::Opaque);
            let item_index = items.len();

            let value = match kind {
                PropertyKind::Utf16 => ResolvedValue::Utf16(klv::decode_utf16_be(raw.value)),
                PropertyKind::Utf8 => ResolvedValue::Utf8(klv::decode_utf8(raw.value)),
                PropertyKind::UInt(_) => match klv::read_be_uint(raw.value) {
                    Some(value) => ResolvedValue::UInt {
                        value,
                        width: raw.value.len() as u8,
                    },
                    None => ResolvedValue::Opaque(raw.value.to_vec()),
                },
                PropertyKind::SingleRef => {
                    if raw.value.len() == 16 {
                        let mut bytes = [0u8; 16];
                        bytes.copy_from_slice(raw.value);
                        let id = InstanceId(bytes);
                        pending_here.push(PendingRef {
                            node: node_index,
                            item: item_index,
                            batch_slot: None,
                            id,
                        });
                        ResolvedValue::Reference(RefTarget::Missing(id))
                    } else {
                        log::debug!(
                            "Reference property {} has {} bytes, expected 16",
                            identifier,
                            raw.value.len()
                        );
                        ResolvedValue::Opaque(raw.value.to_vec())
                    }
                }
                PropertyKind::RefBatch => match klv::parse_reference_batch(raw.value) {
                    Some(ids) => {
                        let targets = ids
                            .iter()
                            .enumerate()
                            .map(|(slot, &id)| {
                                pending_here.push(PendingRef {
                                    node: node_index,
                                    item: item_index,
                                    batch_slot: Some(slot),
                                    id,
                                });
                                RefTarget::Missing(id)
                            })
                            .collect();
                        ResolvedValue::ReferenceBatch(targets)
                    }
                    None => {
                        log::debug!("Batch property {} not in batch shape", identifier);
                        ResolvedValue::Opaque(raw.value.to_vec())
                    }
                },
                PropertyKind::Opaque => ResolvedValue::Opaque(raw.value.to_vec()),
            };

            items.push(ResolvedItem {
                local_tag: raw.tag,
                identifier,
                name: def.map(|d| d.name),
                value,
            });
        }

        let bytes_consumed = reader.position();
        nodes.push(ResolvedFramework {
            info,
            items,
            bytes_consumed,
            dark_items,
            problem,
        });

        // Reverse so that pop order matches payload order (depth-first).
        work.extend(pending_here.into_iter().rev());
        NodeId(node_index)
    }
}

fn set_target(nodes: &mut [ResolvedFramework], pending: &PendingRef, target: RefTarget) {
    let value = &mut nodes[pending.node].items[pending.item].value;
    match (value, pending.batch_slot) {
        (ResolvedValue::Reference(slot), None) => *slot = target,
        (ResolvedValue::ReferenceBatch(slots), Some(i)) => slots[i] = target,
        _ => debug_assert!(false, "pending reference does not match its slot"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::klv::{encode_utf16_be, write_local_set, write_reference_batch};
    use crate::store::MemoryContainer;
    use crate::ul::labels;

    const TAG_TEXT_DATA: u16 = 0x8001;
    const TAG_TEXT_OBJECT: u16 = 0x8002;
    const TAG_FAMILY_NAME: u16 = 0x8003;

    fn payload(items: &[(u16, Vec<u8>)]) -> Vec<u8> {
        let mut out = Vec::new();
        for (tag, value) in items {
            write_local_set(&mut out, *tag, value).unwrap();
        }
        out
    }

    fn registry() -> SchemeRegistry {
        SchemeRegistry::well_known()
    }

    #[test]
    fn test_scalar_payload_consumes_exactly() {
        let id = InstanceId([1; 16]);
        let body = payload(&[(TAG_TEXT_DATA, b"Hello".to_vec())]);
        let declared = body.len();
        let mut container = MemoryContainer::builder()
            .map_tag(TAG_TEXT_DATA, labels::TEXT_DATA)
            .add_framework(id, labels::TEXT_FRAMEWORK, body)
            .build();

        let registry = registry();
        let tree = Resolver::new(&registry).resolve(&mut container, id).unwrap();
        let node = tree.node(tree.root());

        assert_eq!(node.bytes_consumed, declared);
        assert!(node.problem.is_none());
        assert_eq!(
            node.item(&UniversalLabel(labels::TEXT_DATA)).unwrap().value,
            ResolvedValue::Utf8("Hello".into())
        );
        assert_eq!(
            node.item(&UniversalLabel(labels::TEXT_DATA)).unwrap().name,
            Some("Text Data")
        );
    }

    #[test]
    fn test_unknown_root_is_not_found() {
        let mut container = MemoryContainer::builder().build();
        let registry = registry();
        let err = Resolver::new(&registry)
            .resolve(&mut container, InstanceId([9; 16]))
            .unwrap_err();
        assert!(matches!(err, DmError::NotFound(_)));
    }

    #[test]
    fn test_session_closed_after_resolution() {
        let id = InstanceId([1; 16]);
        let mut container = MemoryContainer::builder()
            .add_framework(id, labels::TEXT_FRAMEWORK, Vec::new())
            .build();
        let registry = registry();
        Resolver::new(&registry).resolve(&mut container, id).unwrap();

        let mut buf = [0u8; 4];
        assert!(matches!(
            crate::store::FrameworkStore::read_payload(&container, id, &mut buf).unwrap_err(),
            DmError::SessionNotOpen
        ));
    }

    #[test]
    fn test_dark_tag_skipped_following_items_decode() {
        let id = InstanceId([2; 16]);
        let body = payload(&[
            (0x7777, vec![1, 2, 3]), // not in dictionary
            (TAG_TEXT_DATA, b"after".to_vec()),
        ]);
        let mut container = MemoryContainer::builder()
            .map_tag(TAG_TEXT_DATA, labels::TEXT_DATA)
            .add_framework(id, labels::TEXT_FRAMEWORK, body)
            .build();

        let registry = registry();
        let tree = Resolver::new(&registry).resolve(&mut container, id).unwrap();
        let node = tree.node(tree.root());

        assert_eq!(node.dark_items, 1);
        assert_eq!(node.items.len(), 1);
        assert_eq!(
            node.items[0].value,
            ResolvedValue::Utf8("after".into())
        );
    }

    #[test]
    fn test_malformed_child_does_not_abort_parent() {
        let good = InstanceId([1; 16]);
        let bad = InstanceId([2; 16]);

        // Child payload declares more value bytes than it has.
        let mut truncated = Vec::new();
        truncated.extend_from_slice(&TAG_TEXT_DATA.to_be_bytes());
        truncated.extend_from_slice(&100u16.to_be_bytes());
        truncated.push(0x41);

        let parent = payload(&[
            (TAG_TEXT_OBJECT, bad.as_bytes().to_vec()),
            (TAG_TEXT_DATA, b"parent text".to_vec()),
        ]);

        let mut container = MemoryContainer::builder()
            .map_tag(TAG_TEXT_DATA, labels::TEXT_DATA)
            .map_tag(TAG_TEXT_OBJECT, labels::TEXT_OBJECT_REF)
            .add_framework(good, labels::TEXT_FRAMEWORK, parent)
            .add_framework(bad, labels::TEXT_OBJECT_SET, truncated)
            .build();

        let registry = registry();
        let tree = Resolver::new(&registry).resolve(&mut container, good).unwrap();

        let root = tree.node(tree.root());
        assert!(root.problem.is_none());
        assert_eq!(root.items.len(), 2);

        let child = match &root.items[0].value {
            ResolvedValue::Reference(RefTarget::Node(n)) => tree.node(*n),
            other => panic!("expected expanded reference, got {:?}", other),
        };
        assert!(matches!(
            child.problem,
            Some(FrameworkProblem::Malformed { offset: 0, .. })
        ));
        assert!(child.items.is_empty());
    }

    #[test]
    fn test_missing_reference_skipped_silently() {
        let id = InstanceId([1; 16]);
        let elsewhere = InstanceId([0xCC; 16]);
        let body = payload(&[(TAG_TEXT_OBJECT, elsewhere.as_bytes().to_vec())]);
        let mut container = MemoryContainer::builder()
            .map_tag(TAG_TEXT_OBJECT, labels::TEXT_OBJECT_REF)
            .add_framework(id, labels::TEXT_FRAMEWORK, body)
            .build();

        let registry = registry();
        let tree = Resolver::new(&registry).resolve(&mut container, id).unwrap();
        let node = tree.node(tree.root());

        assert_eq!(
            node.items[0].value,
            ResolvedValue::Reference(RefTarget::Missing(elsewhere))
        );
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_mutual_cycle_terminates_both_ways() {
        let a = InstanceId([0xAA; 16]);
        let b = InstanceId([0xBB; 16]);
        let to = |id: InstanceId| payload(&[(TAG_TEXT_OBJECT, id.as_bytes().to_vec())]);

        for entry in [a, b] {
            let mut container = MemoryContainer::builder()
                .map_tag(TAG_TEXT_OBJECT, labels::TEXT_OBJECT_REF)
                .add_framework(a, labels::TEXT_FRAMEWORK, to(b))
                .add_framework(b, labels::TEXT_FRAMEWORK, to(a))
                .build();

            let registry = registry();
            let tree = Resolver::new(&registry)
                .resolve(&mut container, entry)
                .unwrap();
            assert_eq!(tree.len(), 2);

            let root = tree.node(tree.root());
            let child = match &root.items[0].value {
                ResolvedValue::Reference(RefTarget::Node(n)) => tree.node(*n),
                other => panic!("expected expanded reference, got {:?}", other),
            };
            assert_eq!(
                child.items[0].value,
                ResolvedValue::Reference(RefTarget::Cyclic(entry))
            );
        }
    }

    #[test]
    fn test_self_reference_is_cyclic() {
        let id = InstanceId([0x11; 16]);
        let body = payload(&[(TAG_TEXT_OBJECT, id.as_bytes().to_vec())]);
        let mut container = MemoryContainer::builder()
            .map_tag(TAG_TEXT_OBJECT, labels::TEXT_OBJECT_REF)
            .add_framework(id, labels::TEXT_FRAMEWORK, body)
            .build();

        let registry = registry();
        let tree = Resolver::new(&registry).resolve(&mut container, id).unwrap();
        assert_eq!(
            tree.node(tree.root()).items[0].value,
            ResolvedValue::Reference(RefTarget::Cyclic(id))
        );
    }

    #[test]
    fn test_batch_preserves_order_and_skips_misses() {
        let root = InstanceId([1; 16]);
        let first = InstanceId([2; 16]);
        let gone = InstanceId([3; 16]);
        let second = InstanceId([4; 16]);

        let batch = write_reference_batch(&[first, gone, second]);
        let body = payload(&[(0x8100, batch)]);
        let person = payload(&[(TAG_FAMILY_NAME, encode_utf16_be("Doe"))]);

        let mut container = MemoryContainer::builder()
            .map_tag(0x8100, labels::PERSONS_BATCH)
            .map_tag(TAG_FAMILY_NAME, labels::FAMILY_NAME)
            .add_framework(root, labels::PRODUCTION_FRAMEWORK, body)
            .add_framework(first, labels::PERSON_SET, person.clone())
            .add_framework(second, labels::PERSON_SET, person)
            .build();

        let registry = registry();
        let tree = Resolver::new(&registry).resolve(&mut container, root).unwrap();
        let node = tree.node(tree.root());

        let targets = match &node.items[0].value {
            ResolvedValue::ReferenceBatch(targets) => targets,
            other => panic!("expected batch, got {:?}", other),
        };
        assert_eq!(targets.len(), 3);
        assert!(matches!(targets[0], RefTarget::Node(_)));
        assert_eq!(targets[1], RefTarget::Missing(gone));
        assert!(matches!(targets[2], RefTarget::Node(_)));
    }

    #[test]
    fn test_bad_batch_shape_is_opaque() {
        let id = InstanceId([1; 16]);
        // Element size 8 instead of 16.
        let mut batch = write_reference_batch(&[InstanceId([5; 16])]);
        batch[7] = 8;
        let body = payload(&[(0x8100, batch.clone())]);

        let mut container = MemoryContainer::builder()
            .map_tag(0x8100, labels::PERSONS_BATCH)
            .add_framework(id, labels::PRODUCTION_FRAMEWORK, body)
            .build();

        let registry = registry();
        let tree = Resolver::new(&registry).resolve(&mut container, id).unwrap();
        assert_eq!(
            tree.node(tree.root()).items[0].value,
            ResolvedValue::Opaque(batch)
        );
    }

    #[test]
    fn test_uint_and_unknown_identifier() {
        let id = InstanceId([1; 16]);
        let unknown_ul: crate::ul::Ul = [0xDD; 16];
        let body = payload(&[
            (0x8200, vec![0x01, 0x00]),       // width
            (0x8300, vec![0xDE, 0xAD, 0xBE]), // unknown identifier, odd width
        ]);
        let mut container = MemoryContainer::builder()
            .map_tag(0x8200, labels::THUMBNAIL_WIDTH)
            .map_tag(0x8300, unknown_ul)
            .add_framework(id, labels::CAMERA_CLIP_FRAMEWORK, body)
            .build();

        let registry = registry();
        let tree = Resolver::new(&registry).resolve(&mut container, id).unwrap();
        let node = tree.node(tree.root());

        assert_eq!(
            node.items[0].value,
            ResolvedValue::UInt {
                value: 256,
                width: 2
            }
        );
        assert_eq!(node.items[0].name, Some("Thumbnail Width"));

        assert_eq!(
            node.items[1].value,
            ResolvedValue::Opaque(vec![0xDE, 0xAD, 0xBE])
        );
        assert_eq!(node.items[1].name, None);
    }

    #[test]
    fn test_idempotent_resolution() {
        let root = InstanceId([1; 16]);
        let child = InstanceId([2; 16]);
        let body = payload(&[
            (TAG_TEXT_OBJECT, child.as_bytes().to_vec()),
            (TAG_TEXT_DATA, b"root".to_vec()),
        ]);
        let leaf = payload(&[(TAG_TEXT_DATA, b"leaf".to_vec())]);

        let mut container = MemoryContainer::builder()
            .map_tag(TAG_TEXT_DATA, labels::TEXT_DATA)
            .map_tag(TAG_TEXT_OBJECT, labels::TEXT_OBJECT_REF)
            .add_framework(root, labels::TEXT_FRAMEWORK, body)
            .add_framework(child, labels::TEXT_OBJECT_SET, leaf)
            .build();

        let registry = registry();
        let resolver = Resolver::new(&registry);
        let first = resolver.resolve(&mut container, root).unwrap();
        let second = resolver.resolve(&mut container, root).unwrap();
        assert_eq!(first, second);
    }
}
