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

mod common;

use common::{registry_with, wait_until, RecordingDevice, TEST_GRACE};
use playground_core::pipeline::{build_render_pipeline, PipelineCreateInfo};
use playground_core::renderer::{BufferId, IndexFormat, RenderPipelineId, ResourceError};
use playground_core::resource::{MeshBuffers, ResourceDescriptor, ResourceReaper};
use playground_core::{
    EventBus, NativeHandle, PlaygroundEvent, Resource, ResourceKind, ResourceRef, ResourceRegistry,
};
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

const VERTEX_GLSL: &str = "#version 450\nvoid main() { gl_Position = vec4(0.0); }\n";
const BROKEN_GLSL: &str = "#version 450\nvoid mian( {\n";

fn shader_file(dir: &tempfile::TempDir, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(text.as_bytes()).unwrap();
    path
}

fn add_model(registry: &ResourceRegistry, name: &str, vertex: usize, index: usize) -> ResourceRef {
    let mesh = MeshBuffers {
        vertex: BufferId(vertex),
        index: BufferId(index),
        index_format: IndexFormat::Uint16,
        index_count: 3,
    };
    let children = vec![
        registry.add(ResourceDescriptor::aliased(
            ResourceKind::Buffer,
            format!("{name}-vertex"),
            NativeHandle::Buffer(mesh.vertex),
        )),
        registry.add(ResourceDescriptor::aliased(
            ResourceKind::Buffer,
            format!("{name}-index"),
            NativeHandle::Buffer(mesh.index),
        )),
    ];
    registry.add(
        ResourceDescriptor::owned(ResourceKind::Model, name, NativeHandle::Model(mesh))
            .with_children(children),
    )
}

#[test]
fn list_filters_by_kind_in_registration_order() {
    let device = Arc::new(RecordingDevice::default());
    let registry = registry_with(&device);
    let first = registry.add(ResourceDescriptor::owned(
        ResourceKind::Pipeline,
        "first",
        NativeHandle::Pipeline(RenderPipelineId(0)),
    ));
    add_model(&registry, "quad", 1, 2);
    let second = registry.add(ResourceDescriptor::owned(
        ResourceKind::Pipeline,
        "second",
        NativeHandle::Pipeline(RenderPipelineId(3)),
    ));

    let pipelines = registry.list(Some(ResourceKind::Pipeline));
    assert_eq!(pipelines.len(), 2);
    assert!(Arc::ptr_eq(&pipelines[0], &first));
    assert!(Arc::ptr_eq(&pipelines[1], &second));
    assert_eq!(registry.list(Some(ResourceKind::Buffer)).len(), 2);
    assert_eq!(registry.list(None).len(), 5);
    assert_eq!(
        registry
            .find_by_name(ResourceKind::Model, "quad")
            .map(|m| m.children().len()),
        Some(2)
    );
    assert!(registry.find_by_name(ResourceKind::Pipeline, "quad").is_none());
}

#[test]
fn deleting_a_model_invalidates_its_buffers_and_destroys_them_later() {
    // Arrange
    let device = Arc::new(RecordingDevice::default());
    let registry = registry_with(&device);
    let model = add_model(&registry, "cube", 10, 11);
    let started = Instant::now();

    // Act
    assert!(registry.invalidate_and_schedule_destroy(&model));

    // Assert
    assert!(!model.is_valid());
    assert!(model.children().iter().all(|c| !c.is_valid()));
    assert!(registry.is_empty());
    assert!(device.destroyed_buffers.lock().unwrap().is_empty());

    assert!(wait_until(|| device.destroyed_buffers.lock().unwrap().len() == 2));
    assert!(started.elapsed() >= TEST_GRACE);
    let mut destroyed = device.destroyed_buffers.lock().unwrap().clone();
    destroyed.sort_by_key(|b| b.0);
    assert_eq!(destroyed, vec![BufferId(10), BufferId(11)]);
}

#[test]
fn deleting_twice_schedules_a_single_teardown() {
    let device = Arc::new(RecordingDevice::default());
    let registry = registry_with(&device);
    let pipeline = registry.add(ResourceDescriptor::owned(
        ResourceKind::Pipeline,
        "tri",
        NativeHandle::Pipeline(RenderPipelineId(42)),
    ));

    assert!(registry.invalidate_and_schedule_destroy(&pipeline));
    assert!(!registry.invalidate_and_schedule_destroy(&pipeline));

    assert!(wait_until(|| !device.destroyed_pipelines.lock().unwrap().is_empty()));
    std::thread::sleep(TEST_GRACE * 2);
    assert_eq!(
        *device.destroyed_pipelines.lock().unwrap(),
        vec![RenderPipelineId(42)]
    );
}

#[test]
fn child_buffers_and_placeholders_cannot_be_deleted() {
    let device = Arc::new(RecordingDevice::default());
    let registry = registry_with(&device);
    let model = add_model(&registry, "cube", 1, 2);
    let vertex = model.children()[0].clone();

    assert!(!registry.invalidate_and_schedule_destroy(&vertex));
    assert!(vertex.is_valid());
    assert!(!registry.invalidate_and_schedule_destroy(&Resource::invalid(
        ResourceKind::Pipeline
    )));
    assert_eq!(registry.len(), 3);
}

#[test]
fn rebuild_swaps_the_handle_and_retires_the_old_one() {
    let device = Arc::new(RecordingDevice::default());
    let bus = EventBus::<PlaygroundEvent>::new();
    let registry = registry_with(&device).with_event_sender(bus.sender());
    let pipeline = registry.add(ResourceDescriptor::owned(
        ResourceKind::Pipeline,
        "tri",
        NativeHandle::Pipeline(RenderPipelineId(1)),
    ));

    assert!(registry.complete_rebuild(pipeline.id(), NativeHandle::Pipeline(RenderPipelineId(2))));

    assert_eq!(pipeline.handle(), NativeHandle::Pipeline(RenderPipelineId(2)));
    assert!(pipeline.is_valid());
    assert!(wait_until(|| {
        device.destroyed_pipelines.lock().unwrap().as_slice() == [RenderPipelineId(1)]
    }));
    assert!(bus.drain().contains(&PlaygroundEvent::PipelineRebuilt {
        id: pipeline.id(),
        name: "tri".to_string(),
    }));
}

#[test]
fn rebuild_after_deletion_is_discarded() {
    let device = Arc::new(RecordingDevice::default());
    let bus = EventBus::<PlaygroundEvent>::new();
    let registry = registry_with(&device).with_event_sender(bus.sender());
    let pipeline = registry.add(ResourceDescriptor::owned(
        ResourceKind::Pipeline,
        "tri",
        NativeHandle::Pipeline(RenderPipelineId(1)),
    ));
    registry.invalidate_and_schedule_destroy(&pipeline);

    assert!(!registry.complete_rebuild(pipeline.id(), NativeHandle::Pipeline(RenderPipelineId(9))));

    assert!(!pipeline.is_valid());
    assert!(wait_until(|| device.destroyed_pipelines.lock().unwrap().len() == 2));
    let destroyed = device.destroyed_pipelines.lock().unwrap().clone();
    assert!(destroyed.contains(&RenderPipelineId(1)));
    assert!(destroyed.contains(&RenderPipelineId(9)));
    assert!(bus
        .drain()
        .contains(&PlaygroundEvent::RebuildDiscarded { id: pipeline.id() }));
}

#[test]
fn reaper_reports_each_destruction() {
    let device = Arc::new(RecordingDevice::default());
    let bus = EventBus::<PlaygroundEvent>::new();
    let reaper = ResourceReaper::spawn(device.clone(), TEST_GRACE, Some(bus.sender())).unwrap();
    let registry = ResourceRegistry::new(reaper);
    let model = add_model(&registry, "quad", 5, 6);

    registry.invalidate_and_schedule_destroy(&model);

    assert!(wait_until(|| bus
        .receiver()
        .try_iter()
        .any(|e| e == PlaygroundEvent::ResourceDestroyed {
            name: "quad".to_string()
        })));
}

#[test]
fn pipeline_factory_releases_shader_modules() {
    let dir = tempfile::tempdir().unwrap();
    let info = PipelineCreateInfo::new("tri")
        .with_stage(shader_file(&dir, "tri.vert", VERTEX_GLSL))
        .with_stage(shader_file(&dir, "tri.frag", "#version 450\nvoid main() {}\n"));
    let device = RecordingDevice::default();

    let id = build_render_pipeline(&device, &info).unwrap();

    assert!(device.live_modules.lock().unwrap().is_empty());
    let descriptors = device.pipeline_descriptors.lock().unwrap();
    assert_eq!(descriptors.len(), 1);
    assert_eq!(descriptors[0].label.as_deref(), Some("tri"));
    assert_eq!(descriptors[0].stages.len(), 2);
    assert_eq!(id, RenderPipelineId(2));
}

#[test]
fn pipeline_factory_cleans_up_after_a_compile_error() {
    let dir = tempfile::tempdir().unwrap();
    let info = PipelineCreateInfo::new("broken")
        .with_stage(shader_file(&dir, "ok.vert", VERTEX_GLSL))
        .with_stage(shader_file(&dir, "bad.frag", BROKEN_GLSL));
    let device = RecordingDevice::default();

    let err = build_render_pipeline(&device, &info).unwrap_err();

    assert!(matches!(err, ResourceError::Shader(_)));
    assert!(err.to_string().contains("bad.frag"));
    assert!(device.live_modules.lock().unwrap().is_empty());
    assert!(device.pipeline_descriptors.lock().unwrap().is_empty());
}

#[test]
fn pipeline_factory_rejects_files_without_a_stage() {
    let dir = tempfile::tempdir().unwrap();
    let info = PipelineCreateInfo::new("odd").with_stage(shader_file(&dir, "tri.glsl", VERTEX_GLSL));
    let device = RecordingDevice::default();

    let err = build_render_pipeline(&device, &info).unwrap_err();
    assert!(err.to_string().contains("tri.glsl"));
}
