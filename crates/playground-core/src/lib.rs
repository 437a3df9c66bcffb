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

//! # Playground Core
//!
//! Foundational crate of the playground: the abstract command model, the
//! resource registry, and the interface contracts (graphics device, command
//! sink) that backend crates implement.

#![warn(missing_docs)]

pub mod command;
pub mod event;
pub mod pipeline;
pub mod renderer;
pub mod resource;

pub use command::{
    Argument, ArgumentError, Command, CommandContext, CommandKind, CommandSequence,
    CommandState, SequenceReport, SimulationError,
};
pub use event::{EventBus, PlaygroundEvent};
pub use resource::{NativeHandle, Resource, ResourceId, ResourceKind, ResourceRef, ResourceRegistry};
