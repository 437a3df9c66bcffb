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

//! Event transport and the lifecycle events published by the playground.

mod bus;

pub use self::bus::EventBus;

use crate::resource::{ResourceId, ResourceKind};

/// Resource lifecycle notifications, consumed by the runner for logging.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaygroundEvent {
    /// A resource was registered.
    ResourceAdded {
        /// Its id.
        id: ResourceId,
        /// Its kind.
        kind: ResourceKind,
        /// Its name.
        name: String,
    },
    /// Destruction of a resource was requested.
    ResourceInvalidated {
        /// Its id.
        id: ResourceId,
        /// Its name.
        name: String,
    },
    /// The reaper released a native handle.
    ResourceDestroyed {
        /// Label of the released handle.
        name: String,
    },
    /// A pipeline was rebuilt from its sources and swapped in.
    PipelineRebuilt {
        /// Its id.
        id: ResourceId,
        /// Its name.
        name: String,
    },
    /// A rebuild finished for a resource that no longer exists.
    RebuildDiscarded {
        /// The id the rebuild was requested for.
        id: ResourceId,
    },
    /// A rebuild failed; the previous pipeline stays in use.
    RebuildFailed {
        /// The id the rebuild was requested for.
        id: ResourceId,
        /// Its name.
        name: String,
        /// The compiler or backend error.
        reason: String,
    },
}
