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

//! Keeps pipelines in sync with their shader files.
//!
//! The agent runs on its own thread. It learns about pipelines through
//! [`ReloadMessage::Watch`], listens for file changes (from the filesystem
//! watcher or from [`ReloadMessage::FileChanged`]) and re-runs the pipeline
//! factory with the recorded parameters. A successful build is handed to the
//! registry, which swaps the handle and retires the old one. A failed build is
//! logged and leaves the current pipeline in place.

mod agent;

pub use self::agent::{ShaderReloadAgent, ShaderReloadHandle};

use playground_core::pipeline::PipelineCreateInfo;
use playground_core::resource::ResourceId;
use playground_infra::WatchError;
use std::path::PathBuf;

/// Requests understood by the reload worker.
#[derive(Debug, Clone)]
pub enum ReloadMessage {
    /// Rebuild pipeline `id` from `info` whenever one of its stages changes.
    Watch {
        /// The pipeline resource.
        id: ResourceId,
        /// The parameters it was created with.
        info: PipelineCreateInfo,
    },
    /// A shader file was modified.
    FileChanged(PathBuf),
    /// Stops the worker.
    Shutdown,
}

/// Failures while starting the reload worker.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The worker thread could not be started.
    #[error("failed to spawn the shader reload worker: {0}")]
    Spawn(#[source] std::io::Error),
    /// The filesystem watcher could not be created.
    #[error(transparent)]
    Watch(#[from] WatchError),
}
