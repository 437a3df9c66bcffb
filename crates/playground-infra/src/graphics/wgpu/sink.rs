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

use playground_core::renderer::{BufferId, CommandSink, IndexFormat, RenderPipelineId};

use super::conversions::IntoWgpu;
use super::device::WgpuDevice;

/// Records playground commands into an open wgpu render pass.
///
/// Ids that no longer resolve to a native object are skipped with a warning;
/// the sequence is validated before any of these calls are made.
pub struct WgpuCommandSink<'a> {
    pass: wgpu::RenderPass<'a>,
    device: &'a WgpuDevice,
}

impl<'a> WgpuCommandSink<'a> {
    pub(crate) fn new(pass: wgpu::RenderPass<'a>, device: &'a WgpuDevice) -> Self {
        Self { pass, device }
    }
}

impl CommandSink for WgpuCommandSink<'_> {
    fn bind_pipeline(&mut self, pipeline: RenderPipelineId) {
        if let Some(pipeline) = self.device.get_wgpu_render_pipeline(pipeline) {
            self.pass.set_pipeline(&pipeline);
        } else {
            log::warn!("WgpuCommandSink: RenderPipelineId {pipeline:?} not found.");
        }
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferId) {
        if let Some(wgpu_buffer) = self.device.get_wgpu_buffer(buffer) {
            self.pass.set_vertex_buffer(slot, wgpu_buffer.slice(..));
        } else {
            log::warn!("WgpuCommandSink: Vertex BufferId {buffer:?} not found.");
        }
    }

    fn set_index_buffer(&mut self, buffer: BufferId, format: IndexFormat) {
        if let Some(wgpu_buffer) = self.device.get_wgpu_buffer(buffer) {
            self.pass
                .set_index_buffer(wgpu_buffer.slice(..), format.into_wgpu());
        } else {
            log::warn!("WgpuCommandSink: Index BufferId {buffer:?} not found.");
        }
    }

    fn draw(
        &mut self,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    ) {
        self.pass.draw(
            first_vertex..first_vertex.saturating_add(vertex_count),
            first_instance..first_instance.saturating_add(instance_count),
        );
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) {
        self.pass.draw_indexed(
            first_index..first_index.saturating_add(index_count),
            vertex_offset,
            first_instance..first_instance.saturating_add(instance_count),
        );
    }
}
