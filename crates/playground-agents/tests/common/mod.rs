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

use playground_core::event::PlaygroundEvent;
use playground_core::renderer::*;
use playground_core::resource::{ResourceReaper, ResourceRegistry};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A device that hands out sequential ids and records every destruction.
/// GLSL without `void main` fails to compile.
#[derive(Debug, Default)]
pub struct FakeDevice {
    next_id: AtomicUsize,
    pub fail_index_buffers: AtomicBool,
    pub live_modules: Mutex<Vec<ShaderModuleId>>,
    pub live_buffers: Mutex<Vec<BufferId>>,
    pub buffer_sizes: Mutex<Vec<(String, usize)>>,
    pub destroyed_pipelines: Mutex<Vec<RenderPipelineId>>,
    pub destroyed_buffers: Mutex<Vec<BufferId>>,
}

impl FakeDevice {
    fn next(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl GraphicsDevice for FakeDevice {
    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError> {
        if let ShaderSourceData::Glsl(text) = &descriptor.source {
            if !text.contains("void main") {
                return Err(ShaderError::CompilationError {
                    label: descriptor.label.unwrap_or_default().to_string(),
                    details: "entry point not found".to_string(),
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
        _descriptor: &RenderPipelineDescriptor,
    ) -> Result<RenderPipelineId, ResourceError> {
        Ok(RenderPipelineId(self.next()))
    }

    fn destroy_render_pipeline(&self, id: RenderPipelineId) -> Result<(), ResourceError> {
        self.destroyed_pipelines.lock().unwrap().push(id);
        Ok(())
    }

    fn create_buffer_with_data(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError> {
        if descriptor.usage == BufferUsage::Index && self.fail_index_buffers.load(Ordering::Relaxed)
        {
            return Err(ResourceError::BackendError("out of memory".to_string()));
        }
        let id = BufferId(self.next());
        self.live_buffers.lock().unwrap().push(id);
        self.buffer_sizes.lock().unwrap().push((
            descriptor.label.as_deref().unwrap_or_default().to_string(),
            data.len(),
        ));
        Ok(id)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        self.live_buffers.lock().unwrap().retain(|b| *b != id);
        self.destroyed_buffers.lock().unwrap().push(id);
        Ok(())
    }
}

pub const TEST_GRACE: Duration = Duration::from_millis(40);

/// A registry over `device` publishing its events on `events`.
pub fn registry_with(
    device: &Arc<FakeDevice>,
    events: Option<flume::Sender<PlaygroundEvent>>,
) -> Arc<ResourceRegistry> {
    let reaper = ResourceReaper::spawn(device.clone(), TEST_GRACE, None).unwrap();
    let registry = ResourceRegistry::new(reaper);
    Arc::new(match events {
        Some(events) => registry.with_event_sender(events),
        None => registry,
    })
}

/// Polls `condition` for up to five seconds.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// Waits for the first event matching `predicate`, skipping the others.
pub fn wait_for_event(
    events: &flume::Receiver<PlaygroundEvent>,
    mut predicate: impl FnMut(&PlaygroundEvent) -> bool,
) -> Option<PlaygroundEvent> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while let Ok(event) = events.recv_deadline(deadline) {
        if predicate(&event) {
            return Some(event);
        }
    }
    None
}
