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

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wgpu::util::DeviceExt;

use playground_core::renderer::{
    BufferDescriptor, BufferId, GraphicsDevice, ModelVertex, PipelineError, RenderPipelineDescriptor,
    RenderPipelineId, ResourceError, ShaderError, ShaderModuleDescriptor, ShaderModuleId,
    ShaderStage, VertexLayout,
};

use super::context::WgpuGraphicsContext;
use super::conversions::{depth_stencil_state, IntoWgpu};
use crate::shader::compile_module;

/// Format of the depth attachment every frame renders with.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const POSITION_NORMAL_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

#[derive(Debug)]
struct WgpuShaderModuleEntry {
    wgpu_module: Arc<wgpu::ShaderModule>,
}

#[derive(Debug)]
struct WgpuRenderPipelineEntry {
    wgpu_pipeline: Arc<wgpu::RenderPipeline>,
}

#[derive(Debug)]
struct WgpuBufferEntry {
    wgpu_buffer: Arc<wgpu::Buffer>,
}

fn poisoned(what: &str, e: impl std::fmt::Display) -> ResourceError {
    ResourceError::BackendError(format!("Mutex poisoned ({what}): {e}"))
}

/// The internal, non-clonable state of the [`WgpuDevice`].
#[derive(Debug)]
struct WgpuDeviceInternal {
    context: Arc<Mutex<WgpuGraphicsContext>>,
    shader_modules: Mutex<HashMap<ShaderModuleId, WgpuShaderModuleEntry>>,
    pipelines: Mutex<HashMap<RenderPipelineId, WgpuRenderPipelineEntry>>,
    buffers: Mutex<HashMap<BufferId, WgpuBufferEntry>>,
    next_shader_id: AtomicUsize,
    next_pipeline_id: AtomicUsize,
    next_buffer_id: AtomicUsize,
}

/// A clonable, thread-safe handle to the wgpu graphics device.
///
/// Native objects live in id-keyed maps; destroying an id drops the map's
/// reference, and wgpu frees the object once no recorded pass uses it.
#[derive(Clone, Debug)]
pub struct WgpuDevice {
    internal: Arc<WgpuDeviceInternal>,
}

impl WgpuDevice {
    pub fn new(context: Arc<Mutex<WgpuGraphicsContext>>) -> Self {
        Self {
            internal: Arc::new(WgpuDeviceInternal {
                context,
                shader_modules: Mutex::new(HashMap::new()),
                pipelines: Mutex::new(HashMap::new()),
                buffers: Mutex::new(HashMap::new()),
                next_shader_id: AtomicUsize::new(0),
                next_pipeline_id: AtomicUsize::new(0),
                next_buffer_id: AtomicUsize::new(0),
            }),
        }
    }

    /// Runs `operation` with the wgpu device and the surface format.
    fn with_wgpu_device<F, R>(&self, operation: F) -> Result<R, ResourceError>
    where
        F: FnOnce(&wgpu::Device, wgpu::TextureFormat) -> Result<R, ResourceError>,
    {
        let context_guard = self.internal.context.lock().map_err(|e| {
            ResourceError::BackendError(format!("Failed to lock WgpuGraphicsContext: {e}"))
        })?;
        operation(&context_guard.device, context_guard.surface_format())
    }

    /// Retrieves the wgpu render pipeline behind `id`.
    pub fn get_wgpu_render_pipeline(&self, id: RenderPipelineId) -> Option<Arc<wgpu::RenderPipeline>> {
        let pipelines = self.internal.pipelines.lock().ok()?;
        pipelines.get(&id).map(|entry| Arc::clone(&entry.wgpu_pipeline))
    }

    /// Retrieves the wgpu buffer behind `id`.
    pub fn get_wgpu_buffer(&self, id: BufferId) -> Option<Arc<wgpu::Buffer>> {
        let buffers = self.internal.buffers.lock().ok()?;
        buffers.get(&id).map(|entry| Arc::clone(&entry.wgpu_buffer))
    }

    /// Number of live (pipelines, buffers, shader modules).
    pub fn live_counts(&self) -> (usize, usize, usize) {
        let count = |len: Option<usize>| len.unwrap_or_default();
        (
            count(self.internal.pipelines.lock().ok().map(|m| m.len())),
            count(self.internal.buffers.lock().ok().map(|m| m.len())),
            count(self.internal.shader_modules.lock().ok().map(|m| m.len())),
        )
    }
}

impl GraphicsDevice for WgpuDevice {
    // --- Shader Module Operations ---

    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError> {
        let module = compile_module(descriptor)?;
        let label = descriptor.label;

        let wgpu_module = self.with_wgpu_device(|device, _| {
            log::debug!("WgpuDevice: Creating wgpu::ShaderModule with label: {label:?}");
            Ok(Arc::new(device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label,
                source: wgpu::ShaderSource::Naga(Cow::Owned(module)),
            })))
        })?;

        let id = ShaderModuleId(self.internal.next_shader_id.fetch_add(1, Ordering::Relaxed));
        self.internal
            .shader_modules
            .lock()
            .map_err(|e| poisoned("shader_modules", e))?
            .insert(id, WgpuShaderModuleEntry { wgpu_module });

        log::debug!(
            "WgpuDevice: Created shader module '{}' with ID: {id:?}",
            label.unwrap_or_default()
        );
        Ok(id)
    }

    fn destroy_shader_module(&self, id: ShaderModuleId) -> Result<(), ResourceError> {
        let mut modules_guard = self
            .internal
            .shader_modules
            .lock()
            .map_err(|e| poisoned("shader_modules", e))?;

        if modules_guard.remove(&id).is_some() {
            log::trace!("WgpuDevice: Destroyed shader module with ID: {id:?}");
            Ok(())
        } else {
            Err(ShaderError::NotFound { id }.into())
        }
    }

    // --- Render Pipeline Operations ---

    fn create_render_pipeline(
        &self,
        descriptor: &RenderPipelineDescriptor,
    ) -> Result<RenderPipelineId, ResourceError> {
        let label = descriptor.label.as_deref().unwrap_or("<unnamed pipeline>");
        log::debug!("WgpuDevice: Creating render pipeline '{label}'");

        let vertex_stage = descriptor.stage(ShaderStage::Vertex).ok_or_else(|| {
            PipelineError::MissingVertexStage {
                label: Some(label.to_string()),
            }
        })?;
        if let Some(geometry) = descriptor.stage(ShaderStage::Geometry) {
            return Err(ShaderError::UnsupportedStage {
                label: format!("{label} (module {:?})", geometry.module),
                stage: ShaderStage::Geometry,
            }
            .into());
        }
        let fragment_stage = descriptor.stage(ShaderStage::Fragment);

        // 1. Resolve the shader modules
        let (vs_module, fs_module) = {
            let modules = self
                .internal
                .shader_modules
                .lock()
                .map_err(|e| poisoned("shader_modules", e))?;
            let lookup = |id: ShaderModuleId| {
                modules
                    .get(&id)
                    .map(|entry| Arc::clone(&entry.wgpu_module))
                    .ok_or_else(|| PipelineError::InvalidShaderModuleForPipeline {
                        id,
                        pipeline_label: Some(label.to_string()),
                    })
            };
            let vs = lookup(vertex_stage.module)?;
            let fs = fragment_stage.map(|s| lookup(s.module)).transpose()?;
            (vs, fs)
        };

        // 2. Vertex input
        let vertex_buffers: Vec<wgpu::VertexBufferLayout> = match descriptor.vertex_layout {
            VertexLayout::None => Vec::new(),
            VertexLayout::PositionNormal => vec![wgpu::VertexBufferLayout {
                array_stride: ModelVertex::STRIDE,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &POSITION_NORMAL_ATTRIBUTES,
            }],
        };

        // 3. Create pipeline layout and render pipeline
        let pipeline = self.with_wgpu_device(|device, surface_format| {
            let layout_label = format!("{label}_Layout");
            let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&layout_label),
                bind_group_layouts: &[],
                push_constant_ranges: &[],
            });

            let color_targets = [Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })];

            Ok(device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &vs_module,
                    entry_point: Some(vertex_stage.entry_point.as_str()),
                    buffers: &vertex_buffers,
                    compilation_options: Default::default(),
                },
                fragment: match (&fs_module, fragment_stage) {
                    (Some(module), Some(stage)) => Some(wgpu::FragmentState {
                        module,
                        entry_point: Some(stage.entry_point.as_str()),
                        targets: &color_targets,
                        compilation_options: Default::default(),
                    }),
                    _ => None,
                },
                primitive: descriptor.primitive.into_wgpu(),
                depth_stencil: Some(depth_stencil_state(descriptor.depth, DEPTH_FORMAT)),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            }))
        })?;

        let id = RenderPipelineId(self.internal.next_pipeline_id.fetch_add(1, Ordering::Relaxed));
        self.internal
            .pipelines
            .lock()
            .map_err(|e| poisoned("pipelines", e))?
            .insert(
                id,
                WgpuRenderPipelineEntry {
                    wgpu_pipeline: Arc::new(pipeline),
                },
            );

        log::info!("WgpuDevice: Created render pipeline '{label}' with ID: {id:?}");
        Ok(id)
    }

    fn destroy_render_pipeline(&self, id: RenderPipelineId) -> Result<(), ResourceError> {
        let mut pipelines_guard = self
            .internal
            .pipelines
            .lock()
            .map_err(|e| poisoned("pipelines", e))?;

        if pipelines_guard.remove(&id).is_some() {
            log::debug!("WgpuDevice: Destroyed render pipeline with ID: {id:?}");
            Ok(())
        } else {
            Err(PipelineError::InvalidRenderPipeline { id }.into())
        }
    }

    // --- Buffer Operations ---

    fn create_buffer_with_data(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError> {
        let wgpu_buffer = self.with_wgpu_device(|device, _| {
            Ok(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: descriptor.label.as_deref(),
                contents: data,
                usage: descriptor.usage.into_wgpu(),
            }))
        })?;

        let id = BufferId(self.internal.next_buffer_id.fetch_add(1, Ordering::Relaxed));
        self.internal
            .buffers
            .lock()
            .map_err(|e| poisoned("buffers", e))?
            .insert(
                id,
                WgpuBufferEntry {
                    wgpu_buffer: Arc::new(wgpu_buffer),
                },
            );

        log::debug!(
            "WgpuDevice: Created buffer '{}' with initial data. ID: {id:?}, size: {} bytes",
            descriptor.label.as_deref().unwrap_or_default(),
            data.len()
        );
        Ok(id)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let mut buffers = self
            .internal
            .buffers
            .lock()
            .map_err(|e| poisoned("buffers", e))?;

        if buffers.remove(&id).is_some() {
            log::debug!("WgpuDevice: Destroyed buffer with ID: {id:?}");
            Ok(())
        } else {
            Err(ResourceError::NotFound)
        }
    }
}
