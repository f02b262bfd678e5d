//! Framework store: on-demand access to raw framework payloads.
//!
//! The store is the boundary to the container collaborator: it knows every
//! framework set discovered at open time (in file-scan order) and serves raw
//! payload bytes on request. Payload reads are the expensive operation here,
//! one underlying container read per call; callers resolving many
//! cross-references should batch their reads inside one session rather than
//! opening one per leaf.

use crate::error::{DmError, Result};
use crate::primer::PrimerPack;
use crate::registry::{FrameworkKind, SchemeRegistry};
use crate::track::DmTrack;
use crate::ul::{InstanceId, UniversalLabel};
use serde::Serialize;
use std::collections::HashMap;

/// Descriptive record of one framework set, payload fetched separately.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameworkInfo {
    /// Identity of this framework within the container.
    pub instance_id: InstanceId,
    /// Generation the framework belongs to (zero when absent).
    pub generation_id: InstanceId,
    /// Pre-classified scheme.
    pub kind: FrameworkKind,
    /// Scheme key (set key) of the framework.
    pub scheme_key: UniversalLabel,
    /// Declared payload length in bytes; bounds exactly what may be read.
    pub length: u32,
}

/// Read-only access to the framework sets of one open container.
///
/// Implementations are produced once at container-open time and never
/// mutated afterwards; the resolver only ever reads through this trait.
pub trait FrameworkStore {
    /// Number of framework sets discovered in the container.
    fn framework_count(&self) -> usize;

    /// Look up a framework by instance id.
    fn info_by_instance_id(&self, id: InstanceId) -> Option<&FrameworkInfo>;

    /// Look up a framework by file-scan index (diagnostic enumeration).
    fn info_by_index(&self, index: usize) -> Option<&FrameworkInfo>;

    /// Translate a file-local tag to its global label, if declared.
    fn resolve_tag(&self, tag: u16) -> Option<UniversalLabel>;

    /// Acquire whatever internal parsing state payload reads need.
    fn open_session(&mut self) -> Result<()>;

    /// Release the session state. Idempotent.
    fn close_session(&mut self);

    /// Read a framework's raw payload into `buf`, returning the byte count.
    ///
    /// One underlying container read per call. Fails with
    /// [`DmError::SessionNotOpen`] outside a session,
    /// [`DmError::NotFound`] for an unknown id, and
    /// [`DmError::SizeMismatch`] when `buf` is shorter than the declared
    /// length, in which case nothing is written to `buf`.
    fn read_payload(&self, id: InstanceId, buf: &mut [u8]) -> Result<usize>;
}

/// Scoped payload-reading session, released on every exit path.
pub struct StoreSession<'a, S: FrameworkStore + ?Sized> {
    store: &'a mut S,
}

impl<'a, S: FrameworkStore + ?Sized> StoreSession<'a, S> {
    /// Open a session on the store.
    pub fn open(store: &'a mut S) -> Result<Self> {
        store.open_session()?;
        Ok(StoreSession { store })
    }

    /// Shared access to the store for the duration of the session.
    pub fn store(&self) -> &S {
        self.store
    }
}

impl<S: FrameworkStore + ?Sized> Drop for StoreSession<'_, S> {
    fn drop(&mut self) {
        self.store.close_session();
    }
}

/// In-memory container: primer pack, framework sets in scan order, DM tracks.
///
/// This is the crate's reference implementation of the container
/// collaborator, fed with already-extracted metadata (and the test double
/// for everything above the store boundary).
#[derive(Debug, Default)]
pub struct MemoryContainer {
    primer: PrimerPack,
    order: Vec<InstanceId>,
    frameworks: HashMap<InstanceId, (FrameworkInfo, Vec<u8>)>,
    tracks: Vec<DmTrack>,
    session_open: bool,
}

impl MemoryContainer {
    /// Start building a container.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// The container's local tag dictionary.
    pub fn primer(&self) -> &PrimerPack {
        &self.primer
    }

    /// DM tracks, segments in start-position order.
    pub fn tracks(&self) -> &[DmTrack] {
        &self.tracks
    }

    /// Framework record behind a segment, feeding resolution.
    pub fn framework_for(&self, segment: &crate::track::DmSegment) -> Option<&FrameworkInfo> {
        self.info_by_instance_id(segment.framework_id)
    }
}

impl FrameworkStore for MemoryContainer {
    fn framework_count(&self) -> usize {
        self.order.len()
    }

    fn info_by_instance_id(&self, id: InstanceId) -> Option<&FrameworkInfo> {
        self.frameworks.get(&id).map(|(info, _)| info)
    }

    fn info_by_index(&self, index: usize) -> Option<&FrameworkInfo> {
        let id = self.order.get(index)?;
        self.info_by_instance_id(*id)
    }

    fn resolve_tag(&self, tag: u16) -> Option<UniversalLabel> {
        self.primer.resolve(tag)
    }

    fn open_session(&mut self) -> Result<()> {
        self.session_open = true;
        Ok(())
    }

    fn close_session(&mut self) {
        self.session_open = false;
    }

    fn read_payload(&self, id: InstanceId, buf: &mut [u8]) -> Result<usize> {
        if !self.session_open {
            return Err(DmError::SessionNotOpen);
        }
        let (info, payload) = self.frameworks.get(&id).ok_or(DmError::NotFound(id))?;
        let required = info.length as usize;
        if buf.len() < required {
            return Err(DmError::SizeMismatch {
                required,
                capacity: buf.len(),
            });
        }
        buf[..required].copy_from_slice(payload);
        Ok(required)
    }
}

/// Builder for [`MemoryContainer`].
pub struct ContainerBuilder {
    registry: SchemeRegistry,
    primer: PrimerPack,
    order: Vec<InstanceId>,
    frameworks: HashMap<InstanceId, (FrameworkInfo, Vec<u8>)>,
    tracks: Vec<DmTrack>,
}

impl ContainerBuilder {
    fn new() -> Self {
        ContainerBuilder {
            registry: SchemeRegistry::well_known(),
            primer: PrimerPack::with_standard_tags(),
            order: Vec::new(),
            frameworks: HashMap::new(),
            tracks: Vec::new(),
        }
    }

    /// Declare a local tag for a label.
    pub fn map_tag(mut self, tag: u16, ul: crate::ul::Ul) -> Self {
        self.primer.insert(tag, ul);
        self
    }

    /// Add a framework set with its raw payload. Classification follows the
    /// scheme key; the first framework registered for an id wins.
    pub fn add_framework(
        mut self,
        id: InstanceId,
        scheme_key: crate::ul::Ul,
        payload: Vec<u8>,
    ) -> Self {
        let scheme_key = UniversalLabel(scheme_key);
        let info = FrameworkInfo {
            instance_id: id,
            generation_id: InstanceId::ZERO,
            kind: self.registry.classify_framework(&scheme_key),
            scheme_key,
            length: payload.len() as u32,
        };
        if self.frameworks.contains_key(&id) {
            log::warn!("Duplicate framework instance id {}, keeping first", id);
        } else {
            self.order.push(id);
            self.frameworks.insert(id, (info, payload));
        }
        self
    }

    /// Add a framework set with an explicit, already-classified record, the
    /// way an external collaborator hands them back. The declared length is
    /// forced to the payload length.
    pub fn add_framework_info(mut self, mut info: FrameworkInfo, payload: Vec<u8>) -> Self {
        info.length = payload.len() as u32;
        let id = info.instance_id;
        if self.frameworks.contains_key(&id) {
            log::warn!("Duplicate framework instance id {}, keeping first", id);
        } else {
            self.order.push(id);
            self.frameworks.insert(id, (info, payload));
        }
        self
    }

    /// Add a DM track. Segment ordering is normalized at build time.
    pub fn add_track(mut self, track: DmTrack) -> Self {
        self.tracks.push(track);
        self
    }

    /// Finish the container.
    pub fn build(mut self) -> MemoryContainer {
        for track in &mut self.tracks {
            track.normalize();
        }
        MemoryContainer {
            primer: self.primer,
            order: self.order,
            frameworks: self.frameworks,
            tracks: self.tracks,
            session_open: false,
        }
    }
}
