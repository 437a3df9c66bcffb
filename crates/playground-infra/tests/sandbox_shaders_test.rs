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

//! The shaders shipped with the sandbox must pass the naga front-end.

use playground_core::pipeline::{load_shader_source, stage_from_path};
use playground_core::renderer::ShaderModuleDescriptor;
use playground_infra::shader::compile_module;
use std::path::{Path, PathBuf};

fn sandbox_shaders() -> Vec<PathBuf> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../sandbox/assets/shaders");
    let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    paths.sort();
    paths
}

#[test]
fn sandbox_shaders_compile() {
    let paths = sandbox_shaders();
    assert!(paths.len() >= 4, "found {paths:?}");

    for path in paths {
        let stage = stage_from_path(&path).unwrap();
        let source = load_shader_source(&path).unwrap();
        let label = path.display().to_string();
        let result = compile_module(&ShaderModuleDescriptor {
            label: Some(&label),
            source,
            stage,
            entry_point: "main",
        });
        assert!(result.is_ok(), "{label}: {}", result.unwrap_err());
    }
}
