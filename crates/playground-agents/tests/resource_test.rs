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

use common::{registry_with, wait_until, FakeDevice};
use playground_agents::{MeshData, ModelError, ReloadMessage, ResourceAgent};
use playground_core::pipeline::PipelineCreateInfo;
use playground_core::renderer::{BufferId, IndexFormat, ResourceError};
use playground_core::resource::{MeshBuffers, NativeHandle, ResourceKind};
use std::fs;
use std::sync::atomic::Ordering;
use std::sync::Arc;

const VERT: &str = "#version 450\nvoid main() { gl_Position = vec4(0.0); }\n";
const FRAG: &str = "#version 450\nlayout(location = 0) out vec4 color;\nvoid main() { color = vec4(1.0); }\n";

fn agent() -> (Arc<FakeDevice>, ResourceAgent) {
    let device = Arc::new(FakeDevice::default());
    let registry = registry_with(&device, None);
    let agent = ResourceAgent::new(device.clone(), registry);
    (device, agent)
}

#[test]
fn grid_model_owns_its_two_buffers() {
    let (device, agent) = agent();

    let model = agent.create_grid("floor", 4, 4).unwrap();
    assert_eq!(model.kind(), ResourceKind::Model);
    assert!(model.is_owned());

    let children: Vec<_> = model.children().iter().map(|c| c.name().to_string()).collect();
    assert_eq!(children, vec!["floor-vertex", "floor-index"]);
    assert!(model.children().iter().all(|c| !c.is_owned()));

    match model.handle() {
        NativeHandle::Model(MeshBuffers {
            vertex,
            index,
            index_format,
            index_count,
        }) => {
            assert_eq!(index_format, IndexFormat::Uint32);
            assert_eq!(index_count, 4 * 4 * 6);
            assert_eq!(model.children()[0].handle(), NativeHandle::Buffer(vertex));
            assert_eq!(model.children()[1].handle(), NativeHandle::Buffer(index));
        }
        other => panic!("unexpected handle {other:?}"),
    }

    let sizes = device.buffer_sizes.lock().unwrap().clone();
    assert_eq!(
        sizes,
        vec![
            ("floor-vertex".to_string(), 25 * 24),
            ("floor-index".to_string(), 96 * 4)
        ]
    );
    assert_eq!(agent.registry().list(Some(ResourceKind::Buffer)).len(), 2);
}

#[test]
fn deleting_a_model_releases_both_buffers_once() {
    let (device, agent) = agent();
    let model = agent.create_grid("floor", 1, 1).unwrap();

    assert!(agent.delete(&model));
    assert!(!agent.delete(&model));
    assert!(agent.registry().is_empty());

    assert!(wait_until(|| device.live_buffers.lock().unwrap().is_empty()));
    std::thread::sleep(common::TEST_GRACE * 3);
    assert_eq!(device.destroyed_buffers.lock().unwrap().len(), 2);
}

#[test]
fn failed_index_upload_releases_the_vertex_buffer() {
    let (device, agent) = agent();
    device.fail_index_buffers.store(true, Ordering::Relaxed);

    let err = agent.create_grid("floor", 2, 2).unwrap_err();
    assert!(matches!(err, ModelError::Upload(ResourceError::BackendError(_))));
    assert!(agent.registry().is_empty());
    assert!(device.live_buffers.lock().unwrap().is_empty());
    assert_eq!(*device.destroyed_buffers.lock().unwrap(), vec![BufferId(0)]);
}

#[test]
fn obj_model_is_named_after_its_file() {
    let (_device, agent) = agent();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("triangle.obj");
    fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n").unwrap();

    let model = agent.load_obj(&path, None).unwrap();
    assert_eq!(model.name(), "triangle");
    let named = agent.load_obj(&path, Some("tri")).unwrap();
    assert_eq!(named.name(), "tri");
    assert_eq!(named.children()[0].name(), "tri-vertex");
}

#[test]
fn out_of_range_indices_are_rejected_before_upload() {
    let (device, agent) = agent();
    let mut mesh = MeshData::grid(1, 1).unwrap();
    mesh.indices.push(99);

    assert!(matches!(
        agent.add_mesh("broken", &mesh),
        Err(ModelError::IndexOutOfRange { index: 99, .. })
    ));
    assert!(device.buffer_sizes.lock().unwrap().is_empty());
}

#[test]
fn created_pipelines_are_enrolled_for_reload() {
    let (device, agent) = agent();
    let (sender, receiver) = crossbeam_channel::unbounded();
    let agent = agent.with_reload_sender(sender);

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("tri.vert"), VERT).unwrap();
    fs::write(dir.path().join("tri.frag"), FRAG).unwrap();
    let info = PipelineCreateInfo::new("triangle")
        .with_stage(dir.path().join("tri.vert"))
        .with_stage(dir.path().join("tri.frag"));

    let pipeline = agent.create_pipeline(info.clone()).unwrap();
    assert_eq!(pipeline.kind(), ResourceKind::Pipeline);
    assert!(device.live_modules.lock().unwrap().is_empty());

    match receiver.try_recv().unwrap() {
        ReloadMessage::Watch { id, info: watched } => {
            assert_eq!(id, pipeline.id());
            assert_eq!(watched, info);
        }
        other => panic!("unexpected message {other:?}"),
    }
}

#[test]
fn failed_pipeline_is_not_registered_nor_watched() {
    let (_device, agent) = agent();
    let (sender, receiver) = crossbeam_channel::unbounded();
    let agent = agent.with_reload_sender(sender);

    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("bad.vert"), "#version 450\n").unwrap();

    let info = PipelineCreateInfo::new("bad").with_stage(dir.path().join("bad.vert"));
    assert!(matches!(
        agent.create_pipeline(info),
        Err(ResourceError::Shader(_))
    ));
    assert!(agent.registry().is_empty());
    assert!(receiver.try_recv().is_err());
}
