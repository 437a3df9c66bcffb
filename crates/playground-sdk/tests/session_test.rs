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

use common::{stub_agent, CountingSink};
use playground_core::command::{CommandContext, SimulationError};
use playground_core::resource::ResourceKind;
use playground_sdk::{Session, SessionError};
use std::fs;

const VERT: &str = "#version 450\nvoid main() { gl_Position = vec4(0.0); }\n";
const FRAG: &str = "#version 450\nlayout(location = 0) out vec4 color;\nvoid main() { color = vec4(1.0); }\n";

const SESSION: &str = r#"(
    pipelines: [
        (name: "triangle", stages: [(path: "shaders/tri.vert"), (path: "shaders/tri.frag")]),
        (name: "broken", stages: [(path: "shaders/broken.vert")]),
    ],
    models: [Grid(name: "floor", columns: 2, rows: 2)],
    commands: [
        BindPipeline(pipeline: "triangle"),
        Draw(vertex_count: 3),
        DrawIndexed(model: "floor", instance_count: 2),
    ],
)"#;

fn write_session(text: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("shaders")).unwrap();
    fs::write(dir.path().join("shaders/tri.vert"), VERT).unwrap();
    fs::write(dir.path().join("shaders/tri.frag"), FRAG).unwrap();
    fs::write(dir.path().join("shaders/broken.vert"), "#version 450\n").unwrap();
    fs::write(dir.path().join("session.ron"), text).unwrap();
    dir
}

#[test]
fn session_builds_resources_and_a_runnable_sequence() {
    let dir = write_session(SESSION);
    let agent = stub_agent();

    let session = Session::load(&dir.path().join("session.ron")).unwrap();
    let applied = session.apply(&agent);

    assert_eq!(applied.failures.len(), 1);
    assert_eq!(applied.failures[0].0, "broken");
    assert_eq!(applied.unresolved, 0);
    assert_eq!(agent.registry().list(Some(ResourceKind::Pipeline)).len(), 1);
    assert_eq!(agent.registry().list(Some(ResourceKind::Model)).len(), 1);

    let ctx = CommandContext::new(agent.registry());
    let mut sink = CountingSink::default();
    let report = applied.sequence.run_frame(&ctx, &mut sink);
    assert!(report.is_valid(), "{:?}", report.lines());
    assert_eq!(sink.binds, 1);
    assert_eq!(sink.draws, vec![(3, 1, 0, 0)]);
    // The index count defaults to the whole grid: 2 x 2 cells of 6 indices.
    assert_eq!(sink.indexed_draws, vec![(24, 2, 0, 0, 0)]);
}

#[test]
fn unknown_names_leave_the_placeholder() {
    let dir = write_session(
        r#"(commands: [BindPipeline(pipeline: "broken"), Draw(vertex_count: 3, enabled: false)])"#,
    );
    let agent = stub_agent();

    let applied = Session::load(&dir.path().join("session.ron"))
        .unwrap()
        .apply(&agent);
    assert_eq!(applied.unresolved, 1);

    let ctx = CommandContext::new(agent.registry());
    let report = applied.sequence.simulate(&ctx);
    assert_eq!(report.error(0), Some(SimulationError::InvalidPipeline));
    assert_eq!(
        report.lines(),
        vec![
            "#000: vkCmdBindPipeline(invalid) <- invalid pipeline".to_string(),
            "#001: vkCmdDraw(3, 1, 0, 0) [disabled]".to_string(),
        ]
    );
}

#[test]
fn malformed_session_reports_the_file() {
    let dir = write_session("(commands: [Dance()])");
    let path = dir.path().join("session.ron");

    let err = Session::load(&path).unwrap_err();
    assert!(matches!(err, SessionError::Parse { .. }));
    assert!(err.to_string().contains("session.ron"));
}

#[test]
fn missing_session_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Session::load(&dir.path().join("nope.ron")),
        Err(SessionError::Io { .. })
    ));
}
