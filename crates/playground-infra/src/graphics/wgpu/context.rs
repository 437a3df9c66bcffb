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

use anyhow::{anyhow, Result};
use playground_core::renderer::GraphicsBackend;
use std::sync::Arc;
use winit::dpi::PhysicalSize;
use winit::window::Window;

/// Returns a human-readable name for a backend.
pub fn backend_name(backend: wgpu::Backend) -> &'static str {
    match backend {
        wgpu::Backend::Vulkan => "Vulkan",
        wgpu::Backend::Metal => "Metal",
        wgpu::Backend::Dx12 => "DirectX 12",
        wgpu::Backend::Gl => "OpenGL",
        wgpu::Backend::BrowserWebGpu => "WebGPU",
        wgpu::Backend::Noop => "No-op",
    }
}

fn backends_for(preference: GraphicsBackend) -> wgpu::Backends {
    match preference {
        GraphicsBackend::Vulkan => wgpu::Backends::VULKAN,
        GraphicsBackend::Auto => wgpu::Backends::PRIMARY,
    }
}

/// Holds the core wgpu state objects for one window surface.
#[derive(Debug)]
pub struct WgpuGraphicsContext {
    pub surface: wgpu::Surface<'static>,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub adapter_name: String,
    pub adapter_backend: wgpu::Backend,
    clear_color: wgpu::Color,
}

impl WgpuGraphicsContext {
    /// Opens a device on the requested backend and configures the window's
    /// surface.
    ///
    /// ## Arguments
    /// * `window` - The window to present to. The surface keeps it alive.
    /// * `window_size` - The initial physical size of the surface.
    /// * `preference` - Which native API to open.
    /// * `clear_color` - RGBA color the render pass clears to.
    pub async fn new(
        window: Arc<Window>,
        window_size: PhysicalSize<u32>,
        preference: GraphicsBackend,
        clear_color: [f64; 4],
    ) -> Result<Self> {
        log::info!("Initializing wgpu graphics context ({preference} backend)...");

        let mut instance_descriptor = wgpu::InstanceDescriptor::default();
        instance_descriptor.backends = backends_for(preference);
        let instance = wgpu::Instance::new(&instance_descriptor);

        let surface = instance
            .create_surface(window)
            .map_err(|e| anyhow!("Failed to create surface: {e}"))?;
        log::debug!("wgpu surface created for the window.");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("No {preference} adapter can present to this window: {e}"))?;

        let adapter_info = adapter.get_info();
        if preference == GraphicsBackend::Vulkan && adapter_info.backend != wgpu::Backend::Vulkan {
            return Err(anyhow!(
                "Adapter returned wrong backend: requested Vulkan, got {}",
                backend_name(adapter_info.backend)
            ));
        }
        log::info!(
            "Using graphics adapter: \"{}\" (Backend: {})",
            adapter_info.name,
            backend_name(adapter_info.backend)
        );

        // Line and point polygon modes are optional features.
        let wanted = wgpu::Features::POLYGON_MODE_LINE
            | wgpu::Features::POLYGON_MODE_POINT
            | wgpu::Features::DEPTH_CLIP_CONTROL;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Playground Logical Device"),
                required_features: adapter.features() & wanted,
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await
            .map_err(|e| anyhow!("Failed to create logical device: {e}"))?;
        log::info!("Logical device and command queue created.");

        device.on_uncaptured_error(Arc::new(|e| {
            log::error!("wgpu uncaptured error: {e}");
        }));
        log::debug!("Active device features: {:?}", device.features());

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow!("Surface reports no supported format"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: window_size.width.max(1),
            height: window_size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .iter()
                .copied()
                .find(|m| *m == wgpu::PresentMode::Mailbox)
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);
        log::info!(
            "Surface configured: {}x{} {:?} ({:?})",
            surface_config.width,
            surface_config.height,
            surface_config.format,
            surface_config.present_mode
        );

        let [r, g, b, a] = clear_color;
        Ok(WgpuGraphicsContext {
            surface,
            adapter,
            device,
            queue,
            surface_config,
            adapter_name: adapter_info.name,
            adapter_backend: adapter_info.backend,
            clear_color: wgpu::Color { r, g, b, a },
        })
    }

    /// Reconfigures the surface after a resize. Zero sizes are ignored.
    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            log::debug!("Resizing surface configuration to {new_width}x{new_height}");
            self.surface_config.width = new_width;
            self.surface_config.height = new_height;
            self.surface.configure(&self.device, &self.surface_config);
        } else {
            log::warn!("Ignoring resize request to zero dimensions: {new_width}x{new_height}");
        }
    }

    /// Reapplies the current configuration, e.g. after the surface was lost.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.surface_config);
    }

    pub fn get_current_texture(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    pub fn clear_color(&self) -> wgpu::Color {
        self.clear_color
    }

    /// Returns the (width, height) of the configured surface.
    pub fn get_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }
}
