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

use playground_core::renderer::{
    BufferUsage, CompareFunction, CullMode, DepthStateDescriptor, FrontFace, IndexFormat,
    PolygonMode, PrimitiveStateDescriptor, PrimitiveTopology,
};

/// A local extension trait to convert playground types into wgpu types.
/// This avoids Rust's orphan rules while keeping an idiomatic `.into_wgpu()` syntax.
pub trait IntoWgpu<T> {
    /// Consumes self and converts it into a wgpu-compatible type.
    fn into_wgpu(self) -> T;
}

impl IntoWgpu<wgpu::PrimitiveTopology> for PrimitiveTopology {
    fn into_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            PrimitiveTopology::PointList => wgpu::PrimitiveTopology::PointList,
            PrimitiveTopology::LineList => wgpu::PrimitiveTopology::LineList,
            PrimitiveTopology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
        }
    }
}

impl IntoWgpu<wgpu::PolygonMode> for PolygonMode {
    fn into_wgpu(self) -> wgpu::PolygonMode {
        match self {
            PolygonMode::Fill => wgpu::PolygonMode::Fill,
            PolygonMode::Line => wgpu::PolygonMode::Line,
            PolygonMode::Point => wgpu::PolygonMode::Point,
        }
    }
}

impl IntoWgpu<Option<wgpu::Face>> for CullMode {
    fn into_wgpu(self) -> Option<wgpu::Face> {
        match self {
            CullMode::None => None,
            CullMode::Front => Some(wgpu::Face::Front),
            CullMode::Back => Some(wgpu::Face::Back),
        }
    }
}

impl IntoWgpu<wgpu::FrontFace> for FrontFace {
    fn into_wgpu(self) -> wgpu::FrontFace {
        match self {
            FrontFace::Ccw => wgpu::FrontFace::Ccw,
            FrontFace::Cw => wgpu::FrontFace::Cw,
        }
    }
}

impl IntoWgpu<wgpu::CompareFunction> for CompareFunction {
    fn into_wgpu(self) -> wgpu::CompareFunction {
        match self {
            CompareFunction::Never => wgpu::CompareFunction::Never,
            CompareFunction::Less => wgpu::CompareFunction::Less,
            CompareFunction::Equal => wgpu::CompareFunction::Equal,
            CompareFunction::LessEqual => wgpu::CompareFunction::LessEqual,
            CompareFunction::Greater => wgpu::CompareFunction::Greater,
            CompareFunction::NotEqual => wgpu::CompareFunction::NotEqual,
            CompareFunction::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
            CompareFunction::Always => wgpu::CompareFunction::Always,
        }
    }
}

impl IntoWgpu<wgpu::IndexFormat> for IndexFormat {
    fn into_wgpu(self) -> wgpu::IndexFormat {
        match self {
            IndexFormat::Uint16 => wgpu::IndexFormat::Uint16,
            IndexFormat::Uint32 => wgpu::IndexFormat::Uint32,
        }
    }
}

impl IntoWgpu<wgpu::BufferUsages> for BufferUsage {
    fn into_wgpu(self) -> wgpu::BufferUsages {
        match self {
            BufferUsage::Vertex => wgpu::BufferUsages::VERTEX,
            BufferUsage::Index => wgpu::BufferUsages::INDEX,
        }
    }
}

impl IntoWgpu<wgpu::PrimitiveState> for PrimitiveStateDescriptor {
    fn into_wgpu(self) -> wgpu::PrimitiveState {
        wgpu::PrimitiveState {
            topology: self.topology.into_wgpu(),
            strip_index_format: None,
            front_face: self.front_face.into_wgpu(),
            cull_mode: self.cull_mode.into_wgpu(),
            polygon_mode: self.polygon_mode.into_wgpu(),
            unclipped_depth: self.unclipped_depth,
            conservative: false,
        }
    }
}

/// Builds the depth state for a `format` attachment. Every pipeline carries
/// one so it stays compatible with the frame's render pass; a disabled test
/// always passes and never writes.
pub fn depth_stencil_state(
    depth: DepthStateDescriptor,
    format: wgpu::TextureFormat,
) -> wgpu::DepthStencilState {
    let (depth_compare, depth_write_enabled) = if depth.test_enabled {
        (depth.compare.into_wgpu(), depth.write_enabled)
    } else {
        (wgpu::CompareFunction::Always, false)
    };
    wgpu::DepthStencilState {
        format,
        depth_write_enabled,
        depth_compare,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cull_none_maps_to_no_face() {
        let face: Option<wgpu::Face> = CullMode::None.into_wgpu();
        assert_eq!(face, None);
        let face: Option<wgpu::Face> = CullMode::Back.into_wgpu();
        assert_eq!(face, Some(wgpu::Face::Back));
    }

    #[test]
    fn primitive_state_keeps_every_field() {
        let state: wgpu::PrimitiveState = PrimitiveStateDescriptor {
            topology: PrimitiveTopology::LineList,
            polygon_mode: PolygonMode::Line,
            cull_mode: CullMode::Front,
            front_face: FrontFace::Cw,
            unclipped_depth: true,
        }
        .into_wgpu();
        assert_eq!(state.topology, wgpu::PrimitiveTopology::LineList);
        assert_eq!(state.polygon_mode, wgpu::PolygonMode::Line);
        assert_eq!(state.cull_mode, Some(wgpu::Face::Front));
        assert_eq!(state.front_face, wgpu::FrontFace::Cw);
        assert!(state.unclipped_depth);
    }

    #[test]
    fn disabled_depth_test_always_passes_without_writes() {
        let state = depth_stencil_state(
            DepthStateDescriptor {
                test_enabled: false,
                write_enabled: true,
                compare: CompareFunction::Less,
            },
            wgpu::TextureFormat::Depth32Float,
        );
        assert_eq!(state.depth_compare, wgpu::CompareFunction::Always);
        assert!(!state.depth_write_enabled);

        let state = depth_stencil_state(
            DepthStateDescriptor {
                test_enabled: true,
                write_enabled: true,
                compare: CompareFunction::Less,
            },
            wgpu::TextureFormat::Depth32Float,
        );
        assert_eq!(state.depth_compare, wgpu::CompareFunction::Less);
        assert!(state.depth_write_enabled);
    }
}
