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

//! Pipeline creation parameters and the factory that turns them into a
//! native pipeline.
//!
//! The same [`PipelineCreateInfo`] is kept for the lifetime of a pipeline
//! resource so that a shader change can rebuild it with identical state.

mod shader;

pub use self::shader::{load_shader_source, stage_from_path};

use crate::renderer::{
    DepthStateDescriptor, GraphicsDevice, PrimitiveStateDescriptor, ProgrammableStage,
    RenderPipelineDescriptor, RenderPipelineId, ResourceError, ShaderError,
    ShaderModuleDescriptor, ShaderStage, VertexLayout,
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

fn default_entry_point() -> String {
    "main".to_string()
}

/// One shader file of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderStageSource {
    /// Path of the GLSL or SPIR-V file.
    pub path: PathBuf,
    /// Stage override. Deduced from the file name when absent.
    #[serde(default)]
    pub stage: Option<ShaderStage>,
    /// Entry point name.
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
}

impl ShaderStageSource {
    /// A stage read from `path`, with the stage deduced from its name and a
    /// `main` entry point.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stage: None,
            entry_point: default_entry_point(),
        }
    }

    /// The explicit stage, or the one deduced from the file name.
    pub fn resolved_stage(&self) -> Result<ShaderStage, ShaderError> {
        self.stage
            .or_else(|| stage_from_path(&self.path))
            .ok_or_else(|| ShaderError::UnknownStage {
                path: self.path.display().to_string(),
            })
    }
}

/// Everything needed to (re)build a pipeline resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineCreateInfo {
    /// Resource name.
    pub name: String,
    /// Shader files, one per stage.
    pub stages: Vec<ShaderStageSource>,
    /// Vertex input.
    #[serde(default)]
    pub vertex_layout: VertexLayout,
    /// Input assembly and rasterization.
    #[serde(default)]
    pub primitive: PrimitiveStateDescriptor,
    /// Depth test.
    #[serde(default)]
    pub depth: DepthStateDescriptor,
}

impl PipelineCreateInfo {
    /// A pipeline with default fixed-function state and no stage yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            vertex_layout: VertexLayout::default(),
            primitive: PrimitiveStateDescriptor::default(),
            depth: DepthStateDescriptor::default(),
        }
    }

    /// Adds a shader file.
    pub fn with_stage(mut self, path: impl Into<PathBuf>) -> Self {
        self.stages.push(ShaderStageSource::new(path));
        self
    }

    /// Files whose modification should trigger a rebuild.
    pub fn watched_paths(&self) -> impl Iterator<Item = &Path> {
        self.stages.iter().map(|s| s.path.as_path())
    }
}

/// Compiles every stage of `info` and creates the pipeline.
///
/// Shader modules only live for the duration of the call. On failure nothing
/// created here is left behind.
pub fn build_render_pipeline(
    device: &dyn GraphicsDevice,
    info: &PipelineCreateInfo,
) -> Result<RenderPipelineId, ResourceError> {
    log::debug!("Building pipeline '{}'.", info.name);

    let mut stages = Vec::with_capacity(info.stages.len());
    let compiled = info.stages.iter().try_for_each(|source| {
        let stage = source.resolved_stage()?;
        let code = load_shader_source(&source.path)?;
        let label = source.path.display().to_string();
        let module = device.create_shader_module(&ShaderModuleDescriptor {
            label: Some(label.as_str()),
            source: code,
            stage,
            entry_point: &source.entry_point,
        })?;
        stages.push(ProgrammableStage {
            module,
            stage,
            entry_point: source.entry_point.clone(),
        });
        Ok::<(), ResourceError>(())
    });

    let result = compiled.and_then(|()| {
        device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(Cow::Borrowed(info.name.as_str())),
            stages: stages.clone(),
            vertex_layout: info.vertex_layout,
            primitive: info.primitive,
            depth: info.depth,
        })
    });

    for stage in &stages {
        if let Err(e) = device.destroy_shader_module(stage.module) {
            log::warn!("Failed to release shader module {:?}: {e}", stage.module);
        }
    }
    result
}
