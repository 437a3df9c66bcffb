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

#![allow(dead_code)]

use playground_core::renderer::*;
use playground_core::resource::{ResourceReaper, ResourceRegistry};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A native call recorded by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    BindPipeline(RenderPipelineId),
    SetVertexBuffer(u32, BufferId),
    SetIndexBuffer(BufferId, IndexFormat),
    Draw(u32, u32, u32, u32),
    DrawIndexed(u32, u32, u32, i32, u32),
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
}

impl CommandSink for RecordingSink {
    fn bind_pipeline(&mut self, pipeline: RenderPipelineId) {
        self.calls.push(SinkCall::BindPipeline(pipeline));
    }
    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferId) {
        self.calls.push(SinkCall::SetVertexBuffer(slot, buffer));
    }
    fn set_index_buffer(&mut self, buffer: BufferId, format: IndexFormat) {
        self.calls.push(SinkCall::SetIndexBuffer(buffer, format));
    }
    fn draw(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.calls.push(SinkCall::Draw(a, b, c, d));
    }
    fn draw_indexed(&mut self, a: u32, b: u32, c: u32, d: i32, e: u32) {
        self.calls.push(SinkCall::DrawIndexed(a, b, c, d, e));
    }
}

/// A device that hands out sequential ids and records every teardown.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    next_id: AtomicUsize,
    pub live_modules: Mutex<Vec<ShaderModuleId>>,
    pub destroyed_pipelines: Mutex<Vec<RenderPipelineId>>,
    pub destroyed_buffers: Mutex<Vec<BufferId>>,
    pub pipeline_descriptors: Mutex<Vec<RenderPipelineDescriptor<'static>>>,
}

impl RecordingDevice {
    fn next(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError> {
        if let ShaderSourceData::Glsl(text) = &descriptor.source {
            if !text.contains("void main") {
                return Err(ShaderError::CompilationError {
                    label: descriptor.label.unwrap_or_default().to_string(),
                    details: "no main".to_string(),
                }
                .into());
            }
        }
        let id = ShaderModuleId(self.next());
        self.live_modules.lock().unwrap().push(id);
        Ok(id)
    }

    fn destroy_shader_module(&self, id: ShaderModuleId) -> Result<(), ResourceError> {
        self.live_modules.lock().unwrap().retain(|m| *m != id);
        Ok(())
    }

    fn create_render_pipeline(
        &self,
        descriptor: &RenderPipelineDescriptor,
    ) -> Result<RenderPipelineId, ResourceError> {
        self.pipeline_descriptors
            .lock()
            .unwrap()
            .push(RenderPipelineDescriptor {
                label: descriptor.label.as_ref().map(|l| l.to_string().into()),
                stages: descriptor.stages.clone(),
                vertex_layout: descriptor.vertex_layout,
                primitive: descriptor.primitive,
                depth: descriptor.depth,
            });
        Ok(RenderPipelineId(self.next()))
    }

    fn destroy_render_pipeline(&self, id: RenderPipelineId) -> Result<(), ResourceError> {
        self.destroyed_pipelines.lock().unwrap().push(id);
        Ok(())
    }

    fn create_buffer_with_data(
        &self,
        _descriptor: &BufferDescriptor,
        _data: &[u8],
    ) -> Result<BufferId, ResourceError> {
        Ok(BufferId(self.next()))
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        self.destroyed_buffers.lock().unwrap().push(id);
        Ok(())
    }
}

pub const TEST_GRACE: Duration = Duration::from_millis(60);

pub fn registry_with(device: &Arc<RecordingDevice>) -> ResourceRegistry {
    let reaper = ResourceReaper::spawn(device.clone(), TEST_GRACE, None).unwrap();
    ResourceRegistry::new(reaper)
}

/// Polls `condition` until it holds or a generous deadline passes.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while std::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
