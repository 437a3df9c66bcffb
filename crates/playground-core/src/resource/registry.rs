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

use super::{NativeHandle, Resource, ResourceId, ResourceKind, ResourceRef, ResourceReaper};
use crate::event::PlaygroundEvent;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Everything needed to register a new resource.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    /// Resource category.
    pub kind: ResourceKind,
    /// Display name.
    pub name: String,
    /// The native object.
    pub handle: NativeHandle,
    /// Whether the registry may destroy the handle on its own.
    pub owned: bool,
    /// Resources that live and die with this one.
    pub children: Vec<ResourceRef>,
}

impl ResourceDescriptor {
    /// A resource whose handle the registry destroys.
    pub fn owned(kind: ResourceKind, name: impl Into<String>, handle: NativeHandle) -> Self {
        Self {
            kind,
            name: name.into(),
            handle,
            owned: true,
            children: Vec::new(),
        }
    }

    /// A resource aliasing an object owned by another resource.
    pub fn aliased(kind: ResourceKind, name: impl Into<String>, handle: NativeHandle) -> Self {
        Self {
            owned: false,
            ..Self::owned(kind, name, handle)
        }
    }

    /// Attaches child resources.
    pub fn with_children(mut self, children: Vec<ResourceRef>) -> Self {
        self.children = children;
        self
    }
}

/// Owns the list of live resources and their lifecycle transitions.
///
/// All mutations go through a single lock, so invalidation and handle swaps
/// from the reload worker never interleave.
#[derive(Debug)]
pub struct ResourceRegistry {
    resources: RwLock<Vec<ResourceRef>>,
    next_id: AtomicUsize,
    reaper: ResourceReaper,
    events: Option<flume::Sender<PlaygroundEvent>>,
}

impl ResourceRegistry {
    /// Creates an empty registry that hands retired handles to `reaper`.
    pub fn new(reaper: ResourceReaper) -> Self {
        Self {
            resources: RwLock::new(Vec::new()),
            next_id: AtomicUsize::new(0),
            reaper,
            events: None,
        }
    }

    /// Publishes lifecycle events on `sender`.
    pub fn with_event_sender(mut self, sender: flume::Sender<PlaygroundEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    fn publish(&self, event: PlaygroundEvent) {
        if let Some(events) = &self.events {
            if events.send(event).is_err() {
                log::trace!("No listener for registry events.");
            }
        }
    }

    /// Registers a resource and returns a shared reference to it.
    pub fn add(&self, descriptor: ResourceDescriptor) -> ResourceRef {
        let id = ResourceId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let resource = Arc::new(Resource::new(id, descriptor));
        self.resources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&resource));

        log::debug!(
            "Registered {} '{}' as {:?}.",
            resource.kind(),
            resource.name(),
            id
        );
        self.publish(PlaygroundEvent::ResourceAdded {
            id,
            kind: resource.kind(),
            name: resource.name().to_string(),
        });
        resource
    }

    /// Valid resources in registration order, optionally filtered by kind.
    pub fn list(&self, kind: Option<ResourceKind>) -> Vec<ResourceRef> {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.is_valid() && kind.is_none_or(|k| r.kind() == k))
            .cloned()
            .collect()
    }

    /// Looks up a live resource by id.
    pub fn get(&self, id: ResourceId) -> Option<ResourceRef> {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    /// First valid resource of `kind` named `name`.
    pub fn find_by_name(&self, kind: ResourceKind, name: &str) -> Option<ResourceRef> {
        self.list(Some(kind)).into_iter().find(|r| r.name() == name)
    }

    /// Number of live resources.
    pub fn len(&self) -> usize {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `true` when no resource is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Marks `resource` and its children invalid right away, removes them from
    /// the registry, and queues the native teardown on the reaper.
    ///
    /// Placeholders, non-owned resources and resources already being
    /// destroyed are left untouched. Returns whether a teardown was queued.
    pub fn invalidate_and_schedule_destroy(&self, resource: &ResourceRef) -> bool {
        if resource.is_sentinel() {
            log::warn!("Refusing to destroy the '{}' placeholder.", resource.name());
            return false;
        }
        if !resource.is_owned() {
            log::warn!(
                "{} '{}' is owned by another resource and cannot be deleted on its own.",
                resource.kind(),
                resource.name()
            );
            return false;
        }

        let handle = {
            let mut resources = self
                .resources
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            if !resource.invalidate() {
                log::debug!("'{}' is already scheduled for destruction.", resource.name());
                return false;
            }
            let mut retired = Vec::new();
            resource.collect_ids(&mut retired);
            resources.retain(|r| !retired.contains(&r.id()));
            resource.handle()
        };

        log::info!(
            "{} '{}' invalidated; destroying in {:?}.",
            resource.kind(),
            resource.name(),
            self.reaper.grace()
        );
        self.publish(PlaygroundEvent::ResourceInvalidated {
            id: resource.id(),
            name: resource.name().to_string(),
        });
        self.reaper.schedule(handle, resource.name());
        true
    }

    /// Installs the result of a rebuild.
    ///
    /// If the resource is still live its handle is swapped and the old one is
    /// retired; otherwise `new_handle` is retired. Returns whether the swap
    /// happened.
    pub fn complete_rebuild(&self, id: ResourceId, new_handle: NativeHandle) -> bool {
        let swapped = {
            let resources = self.resources.read().unwrap_or_else(PoisonError::into_inner);
            resources
                .iter()
                .find(|r| r.id() == id && r.is_valid())
                .map(|r| (Arc::clone(r), r.replace_handle(new_handle)))
        };

        match swapped {
            Some((resource, old)) => {
                log::info!("{} '{}' rebuilt.", resource.kind(), resource.name());
                self.publish(PlaygroundEvent::PipelineRebuilt {
                    id,
                    name: resource.name().to_string(),
                });
                self.reaper.schedule(old, resource.name());
                true
            }
            None => {
                log::debug!("Rebuild of {id:?} finished after it was deleted; discarding.");
                self.publish(PlaygroundEvent::RebuildDiscarded { id });
                self.reaper.schedule(new_handle, format!("discarded rebuild of {id:?}"));
                false
            }
        }
    }

    /// The reaper retired handles are sent to.
    pub fn reaper(&self) -> &ResourceReaper {
        &self.reaper
    }
}
