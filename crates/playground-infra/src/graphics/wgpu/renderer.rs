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

//! Per-frame driver: acquires the swapchain image, opens the render pass and
//! hands it to the caller as a [`CommandSink`].

use super::context::WgpuGraphicsContext;
use super::device::{WgpuDevice, DEPTH_FORMAT};
use super::sink::WgpuCommandSink;
use anyhow::Result;
use playground_core::renderer::{CommandSink, GraphicsBackend, RenderError};
use std::sync::{Arc, Mutex, PoisonError};
use winit::dpi::PhysicalSize;
use winit::window::Window;

struct DepthTarget {
    view: wgpu::TextureView,
    size: (u32, u32),
}

/// Owns the graphics context of one window and renders its frames.
pub struct WgpuRenderer {
    context: Arc<Mutex<WgpuGraphicsContext>>,
    device: Arc<WgpuDevice>,
    depth: Option<DepthTarget>,
    frame_count: u64,
}

impl std::fmt::Debug for WgpuRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgpuRenderer")
            .field("device", &self.device)
            .field("depth", &self.depth.as_ref().map(|d| d.size))
            .field("frame_count", &self.frame_count)
            .finish()
    }
}

impl WgpuRenderer {
    /// Initializes wgpu for `window`. Blocks until the device is ready.
    pub fn new(window: Arc<Window>, backend: GraphicsBackend, clear_color: [f64; 4]) -> Result<Self> {
        let size: PhysicalSize<u32> = window.inner_size();
        let context = pollster::block_on(WgpuGraphicsContext::new(window, size, backend, clear_color))?;
        let context = Arc::new(Mutex::new(context));
        let device = Arc::new(WgpuDevice::new(Arc::clone(&context)));
        Ok(Self {
            context,
            device,
            depth: None,
            frame_count: 0,
        })
    }

    /// The device resources are created on.
    pub fn device(&self) -> Arc<WgpuDevice> {
        Arc::clone(&self.device)
    }

    /// Number of frames presented so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Adapter name and backend, for the startup banner.
    pub fn adapter_description(&self) -> String {
        let context = self.context.lock().unwrap_or_else(PoisonError::into_inner);
        format!(
            "{} ({})",
            context.adapter_name,
            super::context::backend_name(context.adapter_backend)
        )
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.context
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .resize(width, height);
    }

    /// The depth attachment for a `size` surface, recreated after a resize.
    fn depth_view(&mut self, device: &wgpu::Device, size: (u32, u32)) -> wgpu::TextureView {
        if let Some(depth) = self.depth.as_ref().filter(|d| d.size == size) {
            return depth.view.clone();
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        log::debug!("Depth texture created: {}x{} ({DEPTH_FORMAT:?})", size.0, size.1);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.depth = Some(DepthTarget {
            view: view.clone(),
            size,
        });
        view
    }

    /// Renders one frame. `record` receives the open render pass, already
    /// cleared with a full-window viewport and scissor.
    pub fn render_frame<F>(&mut self, record: F) -> Result<(), RenderError>
    where
        F: FnOnce(&mut dyn CommandSink),
    {
        // --- 1. Acquire Frame from Swap Chain ---
        let (frame, device, queue, size, clear_color) = {
            let context = self.context.lock().unwrap_or_else(PoisonError::into_inner);
            let frame = match context.get_current_texture() {
                Ok(texture) => texture,
                Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                    log::warn!("Swapchain surface lost or outdated ({e:?}). Reconfiguring.");
                    context.reconfigure();
                    return Ok(());
                }
                Err(wgpu::SurfaceError::Timeout) => {
                    log::warn!("Swapchain timeout acquiring frame; skipping it.");
                    return Ok(());
                }
                Err(e) => {
                    log::error!("Unexpected SurfaceError: {e:?}");
                    return Err(RenderError::SurfaceAcquisitionFailed(format!("{e:?}")));
                }
            };
            (
                frame,
                context.device.clone(),
                context.queue.clone(),
                context.get_size(),
                context.clear_color(),
            )
        };

        let color_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = self.depth_view(&device, size);
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Playground Frame Encoder"),
        });

        // --- 2. Main Render Pass ---
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Playground Main Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_viewport(0.0, 0.0, size.0 as f32, size.1 as f32, 0.0, 1.0);
            pass.set_scissor_rect(0, 0, size.0, size.1);

            let mut sink = WgpuCommandSink::new(pass, &self.device);
            record(&mut sink);
        }

        // --- 3. Submit and Present ---
        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        self.frame_count += 1;
        Ok(())
    }
}
