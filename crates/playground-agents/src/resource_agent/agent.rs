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

use super::{MeshData, ModelError};
use crate::shader_reload_agent::ReloadMessage;
use crossbeam_channel::Sender;
use playground_core::pipeline::{build_render_pipeline, PipelineCreateInfo};
use playground_core::renderer::{
    BufferDescriptor, BufferUsage, GraphicsDevice, IndexFormat, ResourceError,
};
use playground_core::resource::{
    MeshBuffers, NativeHandle, ResourceDescriptor, ResourceKind, ResourceRef, ResourceRegistry,
};
use std::path::Path;
use std::sync::Arc;

/// Creates pipelines and models and registers them.
#[derive(Debug, Clone)]
pub struct ResourceAgent {
    device: Arc<dyn GraphicsDevice>,
    registry: Arc<ResourceRegistry>,
    reload_sender: Option<Sender<ReloadMessage>>,
}

impl ResourceAgent {
    /// Creates an agent allocating on `device` and registering in `registry`.
    pub fn new(device: Arc<dyn GraphicsDevice>, registry: Arc<ResourceRegistry>) -> Self {
        Self {
            device,
            registry,
            reload_sender: None,
        }
    }

    /// Enrolls every new pipeline with the shader reload worker behind
    /// `sender`.
    pub fn with_reload_sender(mut self, sender: Sender<ReloadMessage>) -> Self {
        self.reload_sender = Some(sender);
        self
    }

    /// The registry resources are added to.
    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    /// Compiles and registers a pipeline.
    ///
    /// On failure nothing is registered and no native object is left behind.
    pub fn create_pipeline(&self, info: PipelineCreateInfo) -> Result<ResourceRef, ResourceError> {
        let pipeline = build_render_pipeline(self.device.as_ref(), &info)?;
        let resource = self.registry.add(ResourceDescriptor::owned(
            ResourceKind::Pipeline,
            info.name.clone(),
            NativeHandle::Pipeline(pipeline),
        ));
        log::info!("ResourceAgent: pipeline '{}' created.", info.name);

        if let Some(sender) = &self.reload_sender {
            let message = ReloadMessage::Watch {
                id: resource.id(),
                info,
            };
            if sender.send(message).is_err() {
                log::warn!(
                    "ResourceAgent: reload worker is gone; '{}' will not be rebuilt on change.",
                    resource.name()
                );
            }
        }
        Ok(resource)
    }

    /// Loads an OBJ file as a model. The name defaults to the file stem.
    pub fn load_obj(&self, path: &Path, name: Option<&str>) -> Result<ResourceRef, ModelError> {
        let mesh = MeshData::from_obj(path)?;
        let name = match name {
            Some(name) => name.to_string(),
            None => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "model".to_string()),
        };
        self.add_mesh(&name, &mesh)
    }

    /// Generates and registers a flat grid model.
    pub fn create_grid(&self, name: &str, columns: u32, rows: u32) -> Result<ResourceRef, ModelError> {
        let mesh = MeshData::grid(columns, rows)?;
        self.add_mesh(name, &mesh)
    }

    /// Uploads `mesh` and registers it as a model.
    ///
    /// The model owns both buffers. They are also registered as aliased
    /// `<name>-vertex` and `<name>-index` children, which share its lifetime.
    pub fn add_mesh(&self, name: &str, mesh: &MeshData) -> Result<ResourceRef, ModelError> {
        mesh.validate()?;
        let index_count = mesh.index_count()?;

        let vertex_label = format!("{name}-vertex");
        let index_label = format!("{name}-index");

        let vertex = self.device.create_buffer_with_data(
            &BufferDescriptor {
                label: Some(vertex_label.as_str().into()),
                usage: BufferUsage::Vertex,
            },
            bytemuck::cast_slice(&mesh.vertices),
        )?;
        let index = match self.device.create_buffer_with_data(
            &BufferDescriptor {
                label: Some(index_label.as_str().into()),
                usage: BufferUsage::Index,
            },
            bytemuck::cast_slice(&mesh.indices),
        ) {
            Ok(index) => index,
            Err(e) => {
                if let Err(cleanup) = self.device.destroy_buffer(vertex) {
                    log::warn!("ResourceAgent: failed to release '{vertex_label}': {cleanup}");
                }
                return Err(e.into());
            }
        };

        let children = vec![
            self.registry.add(ResourceDescriptor::aliased(
                ResourceKind::Buffer,
                vertex_label,
                NativeHandle::Buffer(vertex),
            )),
            self.registry.add(ResourceDescriptor::aliased(
                ResourceKind::Buffer,
                index_label,
                NativeHandle::Buffer(index),
            )),
        ];
        let model = self.registry.add(
            ResourceDescriptor::owned(
                ResourceKind::Model,
                name,
                NativeHandle::Model(MeshBuffers {
                    vertex,
                    index,
                    index_format: IndexFormat::Uint32,
                    index_count,
                }),
            )
            .with_children(children),
        );
        log::info!(
            "ResourceAgent: model '{name}' created ({} vertices, {index_count} indices).",
            mesh.vertices.len()
        );
        Ok(model)
    }

    /// Invalidates `resource` now and destroys it after the grace delay.
    pub fn delete(&self, resource: &ResourceRef) -> bool {
        self.registry.invalidate_and_schedule_destroy(resource)
    }
}
