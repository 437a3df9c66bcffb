// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Named GPU resources, their native handles and their lifetime.
//!
//! A [`Resource`] is shared as a [`ResourceRef`] between the registry and the
//! commands that use it. Validity is a flag on the resource itself: commands
//! never look resources up by name, they read the flag of the resource they
//! hold.

mod reaper;
mod registry;

pub use self::reaper::ResourceReaper;
pub use self::registry::{ResourceDescriptor, ResourceRegistry};

use crate::renderer::{BufferId, GraphicsDevice, IndexFormat, RenderPipelineId, ResourceError};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// A shared reference to a registered resource.
pub type ResourceRef = Arc<Resource>;

/// The category of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// A graphics pipeline.
    Pipeline,
    /// A drawable mesh made of a vertex and an index buffer.
    Model,
    /// A raw GPU buffer.
    Buffer,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Pipeline => "Pipeline",
            ResourceKind::Model => "Model",
            ResourceKind::Buffer => "Buffer",
        };
        f.write_str(name)
    }
}

/// Registry-assigned identifier of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub usize);

impl ResourceId {
    /// Identifier shared by the "invalid" placeholder resources.
    pub const SENTINEL: ResourceId = ResourceId(usize::MAX);
}

/// The buffers a model draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshBuffers {
    /// Interleaved vertex data.
    pub vertex: BufferId,
    /// Index data.
    pub index: BufferId,
    /// Element type of `index`.
    pub index_format: IndexFormat,
    /// Number of indices in `index`.
    pub index_count: u32,
}

/// The native object behind a resource.
///
/// The variant always matches the owning resource's [`ResourceKind`], except
/// for placeholders which carry [`NativeHandle::Null`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeHandle {
    /// No native object.
    Null,
    /// A render pipeline.
    Pipeline(RenderPipelineId),
    /// A model; destroying it destroys both buffers.
    Model(MeshBuffers),
    /// A single buffer.
    Buffer(BufferId),
}

impl NativeHandle {
    /// The resource kind this handle belongs to.
    pub fn kind(&self) -> Option<ResourceKind> {
        match self {
            NativeHandle::Null => None,
            NativeHandle::Pipeline(_) => Some(ResourceKind::Pipeline),
            NativeHandle::Model(_) => Some(ResourceKind::Model),
            NativeHandle::Buffer(_) => Some(ResourceKind::Buffer),
        }
    }

    /// Tears down the native object(s) through `device`.
    ///
    /// Both buffers of a model are released even if the first one fails; the
    /// first error is returned.
    pub fn destroy(self, device: &dyn GraphicsDevice) -> Result<(), ResourceError> {
        match self {
            NativeHandle::Null => Ok(()),
            NativeHandle::Pipeline(id) => device.destroy_render_pipeline(id),
            NativeHandle::Buffer(id) => device.destroy_buffer(id),
            NativeHandle::Model(mesh) => {
                let vertex = device.destroy_buffer(mesh.vertex);
                let index = device.destroy_buffer(mesh.index);
                vertex.and(index)
            }
        }
    }
}

/// A named GPU resource the user can reference from commands.
#[derive(Debug)]
pub struct Resource {
    id: ResourceId,
    kind: ResourceKind,
    name: String,
    handle: RwLock<NativeHandle>,
    valid: AtomicBool,
    owned: bool,
    children: Vec<ResourceRef>,
}

static INVALID_PIPELINE: OnceLock<ResourceRef> = OnceLock::new();
static INVALID_MODEL: OnceLock<ResourceRef> = OnceLock::new();
static INVALID_BUFFER: OnceLock<ResourceRef> = OnceLock::new();

impl Resource {
    pub(crate) fn new(id: ResourceId, descriptor: ResourceDescriptor) -> Self {
        Self {
            id,
            kind: descriptor.kind,
            name: descriptor.name,
            handle: RwLock::new(descriptor.handle),
            valid: AtomicBool::new(true),
            owned: descriptor.owned,
            children: descriptor.children,
        }
    }

    /// Returns the shared "invalid" placeholder of the given kind.
    ///
    /// Freshly created commands reference it until the user picks a real
    /// resource. It is never valid and never registered.
    pub fn invalid(kind: ResourceKind) -> ResourceRef {
        let cell = match kind {
            ResourceKind::Pipeline => &INVALID_PIPELINE,
            ResourceKind::Model => &INVALID_MODEL,
            ResourceKind::Buffer => &INVALID_BUFFER,
        };
        Arc::clone(cell.get_or_init(|| {
            Arc::new(Resource {
                id: ResourceId::SENTINEL,
                kind,
                name: "invalid".to_string(),
                handle: RwLock::new(NativeHandle::Null),
                valid: AtomicBool::new(false),
                owned: false,
                children: Vec::new(),
            })
        }))
    }

    /// Registry-assigned identifier.
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Resource category.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Display name. Not unique.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `false` once destruction has been requested.
    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    /// Non-owned resources alias objects owned by another resource and are
    /// never destroyed on their own.
    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// Whether this is one of the shared placeholders.
    pub fn is_sentinel(&self) -> bool {
        self.id == ResourceId::SENTINEL
    }

    /// Resources sharing this resource's lifetime.
    pub fn children(&self) -> &[ResourceRef] {
        &self.children
    }

    /// A copy of the current native handle.
    pub fn handle(&self) -> NativeHandle {
        *self.handle.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clears the valid flag of this resource and of every descendant.
    ///
    /// Returns `false` if the resource was already invalid.
    pub(crate) fn invalidate(&self) -> bool {
        let was_valid = self
            .valid
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        for child in &self.children {
            child.invalidate();
        }
        was_valid
    }

    /// Swaps in a new native handle and returns the previous one.
    pub(crate) fn replace_handle(&self, handle: NativeHandle) -> NativeHandle {
        let mut guard = self.handle.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, handle)
    }

    /// Ids of this resource and all of its descendants.
    pub(crate) fn collect_ids(&self, out: &mut Vec<ResourceId>) {
        out.push(self.id);
        for child in &self.children {
            child.collect_ids(out);
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_shared_and_never_valid() {
        let a = Resource::invalid(ResourceKind::Pipeline);
        let b = Resource::invalid(ResourceKind::Pipeline);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!a.is_valid());
        assert!(a.is_sentinel());
        assert_eq!(a.name(), "invalid");
        assert_eq!(a.kind(), ResourceKind::Pipeline);
        assert_eq!(a.handle(), NativeHandle::Null);

        let model = Resource::invalid(ResourceKind::Model);
        assert!(!Arc::ptr_eq(&a, &model));
        assert_eq!(model.kind(), ResourceKind::Model);
    }

    #[test]
    fn invalidate_propagates_to_children() {
        let child = Arc::new(Resource::new(
            ResourceId(1),
            ResourceDescriptor::aliased(
                ResourceKind::Buffer,
                "cube-vertex",
                NativeHandle::Buffer(BufferId(1)),
            ),
        ));
        let parent = Resource::new(
            ResourceId(2),
            ResourceDescriptor::owned(
                ResourceKind::Model,
                "cube",
                NativeHandle::Model(MeshBuffers {
                    vertex: BufferId(1),
                    index: BufferId(2),
                    index_format: IndexFormat::Uint32,
                    index_count: 36,
                }),
            )
            .with_children(vec![Arc::clone(&child)]),
        );

        assert!(parent.invalidate());
        assert!(!parent.is_valid());
        assert!(!child.is_valid());
        assert!(!parent.invalidate());
    }

    #[test]
    fn replace_handle_returns_previous() {
        let resource = Resource::new(
            ResourceId(0),
            ResourceDescriptor::owned(
                ResourceKind::Pipeline,
                "tri",
                NativeHandle::Pipeline(RenderPipelineId(0)),
            ),
        );
        let old = resource.replace_handle(NativeHandle::Pipeline(RenderPipelineId(7)));
        assert_eq!(old, NativeHandle::Pipeline(RenderPipelineId(0)));
        assert_eq!(
            resource.handle(),
            NativeHandle::Pipeline(RenderPipelineId(7))
        );
    }

    #[test]
    fn handle_kind_matches_variant() {
        assert_eq!(NativeHandle::Null.kind(), None);
        assert_eq!(
            NativeHandle::Buffer(BufferId(3)).kind(),
            Some(ResourceKind::Buffer)
        );
        assert_eq!(
            NativeHandle::Pipeline(RenderPipelineId(3)).kind(),
            Some(ResourceKind::Pipeline)
        );
    }
}
