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

use crate::renderer::api::{BufferId, IndexFormat, RenderPipelineId};

/// The recording target of one frame: native calls issued by executed commands.
///
/// Arguments are passed straight through; no validation happens at this level.
pub trait CommandSink {
    /// Binds a graphics pipeline.
    fn bind_pipeline(&mut self, pipeline: RenderPipelineId);

    /// Binds a vertex buffer to `slot`.
    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferId);

    /// Binds the index buffer.
    fn set_index_buffer(&mut self, buffer: BufferId, format: IndexFormat);

    /// Records a non-indexed draw.
    fn draw(
        &mut self,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    );

    /// Records an indexed draw.
    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    );
}
