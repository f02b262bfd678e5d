//! Descriptive-metadata (DM) framework reader for MXF containers.
//!
//! MXF files carry descriptive metadata as KLV local sets: each "framework
//! set" is a list of `{2-byte tag, 2-byte length, value}` items whose tags
//! are file-local aliases for 16-byte global labels. Values may be scalars
//! (UTF-16/UTF-8 text, big-endian integers, opaque bytes) or references to
//! other framework sets in the same container, singly or in batches.
//!
//! This crate takes an already-open container (anything implementing
//! [`FrameworkStore`]) and expands a framework set into a typed tree:
//!
//! - local tags are resolved through the container's dictionary; undeclared
//!   tags are skipped as "dark" properties,
//! - references are followed recursively with an explicit work-stack, so
//!   arbitrarily deep chains cannot overflow the native stack and cyclic
//!   references terminate in a marker instead of looping,
//! - recognized vocabularies (production, broadcast, camera-clip and
//!   text-based metadata) decode into scheme-specific views; anything else
//!   falls back to an opaque dark-metadata view.
//!
//! No single malformed, missing or cyclic reference aborts a walk: the
//! resolved tree always contains whatever could be read, annotated where a
//! problem occurred.
//!
//! # Example
//!
//! ```
//! use mxf_dm::{
//!     decode_framework, labels, klv, InstanceId, MemoryContainer, Resolver,
//!     SchemeRegistry,
//! };
//!
//! let id = InstanceId::random();
//! let mut payload = Vec::new();
//! klv::write_local_set(&mut payload, 0x8001, b"Hello").unwrap();
//!
//! let mut container = MemoryContainer::builder()
//!     .map_tag(0x8001, labels::TEXT_DATA)
//!     .add_framework(id, labels::TEXT_FRAMEWORK, payload)
//!     .build();
//!
//! let registry = SchemeRegistry::well_known();
//! let tree = Resolver::new(&registry).resolve(&mut container, id).unwrap();
//! let view = decode_framework(&registry, &tree, tree.root());
//! println!("{:?}", view);
//! ```

mod error;
pub mod klv;
mod primer;
mod registry;
mod resolver;
mod scheme;
mod store;
mod track;
mod ul;

pub use error::{DmError, Result};
pub use primer::{PrimerPack, TAG_GENERATION_UID, TAG_INSTANCE_UID};
pub use registry::{FrameworkKind, PropertyDef, PropertyKind, SchemeDef, SchemeRegistry};
pub use resolver::{
    FrameworkProblem, NodeId, RefTarget, ResolvedFramework, ResolvedItem, ResolvedTree,
    ResolvedValue, Resolver,
};
pub use scheme::{
    decode_framework, AddressView, AnnotationView, BroadcastView, CameraClipView, DarkView,
    LocationView, ParticipantView, PersonView, ProductionView, SchemeView, TextView,
    ThumbnailView, TitleView,
};
pub use store::{ContainerBuilder, FrameworkInfo, FrameworkStore, MemoryContainer, StoreSession};
pub use track::{DmSegment, DmTrack, DmTrackKind};
pub use ul::{labels, InstanceId, Ul, UniversalLabel};
