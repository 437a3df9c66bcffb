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

//! Defines the fixed-function state and descriptor of a render pipeline.

use super::shader::{ShaderModuleId, ShaderStage};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// An opaque handle to a compiled render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderPipelineId(pub usize);

/// How vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrimitiveTopology {
    /// Each vertex is a point.
    PointList,
    /// Each pair of vertices is a line.
    LineList,
    /// Each triplet of vertices is a triangle.
    #[default]
    TriangleList,
}

/// How polygons are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PolygonMode {
    /// Filled polygons.
    #[default]
    Fill,
    /// Polygon edges only.
    Line,
    /// Polygon vertices only.
    Point,
}

/// Which faces are discarded before rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CullMode {
    /// Nothing is culled.
    #[default]
    None,
    /// Front faces are culled.
    Front,
    /// Back faces are culled.
    Back,
}

/// Winding order that defines a front face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FrontFace {
    /// Counter-clockwise.
    #[default]
    Ccw,
    /// Clockwise.
    Cw,
}

/// Comparison applied by the depth test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CompareFunction {
    /// Never passes.
    Never,
    /// Passes if the new value is less than the stored one.
    Less,
    /// Passes if the values are equal.
    Equal,
    /// Passes if the new value is less than or equal to the stored one.
    #[default]
    LessEqual,
    /// Passes if the new value is greater than the stored one.
    Greater,
    /// Passes if the values differ.
    NotEqual,
    /// Passes if the new value is greater than or equal to the stored one.
    GreaterEqual,
    /// Always passes.
    Always,
}

/// Vertex input expected by a pipeline's vertex stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VertexLayout {
    /// No vertex buffers; the shader generates positions itself.
    #[default]
    None,
    /// One interleaved buffer of [`ModelVertex`](super::ModelVertex):
    /// location 0 is the position, location 1 the normal.
    PositionNormal,
}

/// Input assembly and rasterization state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimitiveStateDescriptor {
    /// Primitive topology.
    pub topology: PrimitiveTopology,
    /// Polygon fill mode.
    pub polygon_mode: PolygonMode,
    /// Face culling.
    pub cull_mode: CullMode,
    /// Front-face winding.
    pub front_face: FrontFace,
    /// Disables depth clipping (depth clamp).
    pub unclipped_depth: bool,
}

/// Depth test state. Stencil is not exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthStateDescriptor {
    /// Enables the depth test.
    pub test_enabled: bool,
    /// Enables depth writes.
    pub write_enabled: bool,
    /// Depth comparison, used when `test_enabled` is set.
    pub compare: CompareFunction,
}

/// One programmable stage of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgrammableStage {
    /// The compiled module.
    pub module: ShaderModuleId,
    /// The stage the module was compiled for.
    pub stage: ShaderStage,
    /// The entry point to invoke.
    pub entry_point: String,
}

/// A complete description of a render pipeline for the `GraphicsDevice`.
///
/// Color and depth target formats are chosen by the device, which knows the
/// surface it renders to.
#[derive(Debug, Clone)]
pub struct RenderPipelineDescriptor<'a> {
    /// An optional debug label.
    pub label: Option<Cow<'a, str>>,
    /// Programmable stages. Exactly one vertex stage is required.
    pub stages: Vec<ProgrammableStage>,
    /// Vertex input.
    pub vertex_layout: VertexLayout,
    /// Input assembly and rasterization.
    pub primitive: PrimitiveStateDescriptor,
    /// Depth test.
    pub depth: DepthStateDescriptor,
}

impl RenderPipelineDescriptor<'_> {
    /// Returns the first stage compiled for `stage`, if any.
    pub fn stage(&self, stage: ShaderStage) -> Option<&ProgrammableStage> {
        self.stages.iter().find(|s| s.stage == stage)
    }
}
