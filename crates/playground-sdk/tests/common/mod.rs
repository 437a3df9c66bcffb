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

use playground_agents::ResourceAgent;
use playground_core::renderer::*;
use playground_core::resource::{ResourceReaper, ResourceRegistry};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Hands out sequential ids. GLSL without `void main` fails to compile.
#[derive(Debug, Default)]
pub struct StubDevice {
    next_id: AtomicUsize,
}

impl StubDevice {
    fn next(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl GraphicsDevice for StubDevice {
    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError> {
        match &descriptor.source {
            ShaderSourceData::Glsl(text) if !text.contains("void main") => {
                Err(ShaderError::CompilationError {
                    label: descriptor.label.unwrap_or_default().to_string(),
                    details: "missing main".to_string(),
                }
                .into())
            }
            _ => Ok(ShaderModuleId(self.next())),
        }
    }

    fn destroy_shader_module(&self, _id: ShaderModuleId) -> Result<(), ResourceError> {
        Ok(())
    }

    fn create_render_pipeline(
        &self,
        _descriptor: &RenderPipelineDescriptor,
    ) -> Result<RenderPipelineId, ResourceError> {
        Ok(RenderPipelineId(self.next()))
    }

    fn destroy_render_pipeline(&self, _id: RenderPipelineId) -> Result<(), ResourceError> {
        Ok(())
    }

    fn create_buffer_with_data(
        &self,
        _descriptor: &BufferDescriptor,
        _data: &[u8],
    ) -> Result<BufferId, ResourceError> {
        Ok(BufferId(self.next()))
    }

    fn destroy_buffer(&self, _id: BufferId) -> Result<(), ResourceError> {
        Ok(())
    }
}

/// A resource agent over a stub device, without shader reloading.
pub fn stub_agent() -> ResourceAgent {
    let device = Arc::new(StubDevice::default());
    let reaper = ResourceReaper::spawn(device.clone(), Duration::from_millis(20), None).unwrap();
    ResourceAgent::new(device, Arc::new(ResourceRegistry::new(reaper)))
}

/// A sink that counts draw calls.
#[derive(Debug, Default)]
pub struct CountingSink {
    pub binds: usize,
    pub draws: Vec<(u32, u32, u32, u32)>,
    pub indexed_draws: Vec<(u32, u32, u32, i32, u32)>,
}

impl CommandSink for CountingSink {
    fn bind_pipeline(&mut self, _pipeline: RenderPipelineId) {
        self.binds += 1;
    }
    fn set_vertex_buffer(&mut self, _slot: u32, _buffer: BufferId) {}
    fn set_index_buffer(&mut self, _buffer: BufferId, _format: IndexFormat) {}
    fn draw(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.draws.push((a, b, c, d));
    }
    fn draw_indexed(&mut self, a: u32, b: u32, c: u32, d: i32, e: u32) {
        self.indexed_draws.push((a, b, c, d, e));
    }
}
