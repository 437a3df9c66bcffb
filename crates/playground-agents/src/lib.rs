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

//! # Playground Agents
//!
//! The workers that produce and maintain playground resources outside of the
//! frame loop:
//! - [`ShaderReloadAgent`] rebuilds pipelines when their shader files change.
//! - [`ResourceAgent`] creates pipelines and models and registers them.

#![warn(missing_docs)]

pub mod resource_agent;
pub mod shader_reload_agent;

pub use resource_agent::{MeshData, ModelError, ResourceAgent};
pub use shader_reload_agent::{AgentError, ReloadMessage, ShaderReloadAgent, ShaderReloadHandle};
