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

//! Session files: the pipelines, models and commands to set up at startup.
//!
//! ```ron
//! (
//!     pipelines: [
//!         (name: "triangle", stages: [(path: "shaders/triangle.vert"), (path: "shaders/triangle.frag")]),
//!     ],
//!     models: [Grid(name: "floor", columns: 8, rows: 8)],
//!     commands: [
//!         BindPipeline(pipeline: "triangle"),
//!         Draw(vertex_count: 3),
//!     ],
//! )
//! ```
//!
//! Relative paths are resolved against the directory of the session file.

use playground_agents::ResourceAgent;
use playground_core::command::{Command, CommandSequence};
use playground_core::pipeline::PipelineCreateInfo;
use playground_core::resource::{MeshBuffers, NativeHandle, Resource, ResourceKind, ResourceRef};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors while reading a session file.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The file could not be read.
    #[error("failed to read session '{path}': {source}")]
    Io {
        /// The file.
        path: PathBuf,
        /// The I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not a valid session.
    #[error("invalid session '{path}': {source}")]
    Parse {
        /// The file.
        path: PathBuf,
        /// The parser error.
        #[source]
        source: ron::error::SpannedError,
    },
}

fn enabled() -> bool {
    true
}

fn one() -> u32 {
    1
}

/// A model to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelSource {
    /// A Wavefront OBJ file. The name defaults to the file stem.
    Obj {
        /// The file.
        path: PathBuf,
        /// Resource name.
        #[serde(default)]
        name: Option<String>,
    },
    /// A flat procedural grid.
    Grid {
        /// Resource name.
        name: String,
        /// Cells along X.
        columns: u32,
        /// Cells along Z.
        rows: u32,
    },
}

/// A command to append, with resources referred to by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandSpec {
    /// `vkCmdBindPipeline`.
    BindPipeline {
        /// Pipeline name.
        pipeline: String,
        /// Whether the command executes.
        #[serde(default = "enabled")]
        enabled: bool,
    },
    /// `vkCmdDraw`.
    Draw {
        /// Number of vertices.
        #[serde(default)]
        vertex_count: u32,
        /// Number of instances.
        #[serde(default = "one")]
        instance_count: u32,
        /// First vertex.
        #[serde(default)]
        first_vertex: u32,
        /// First instance.
        #[serde(default)]
        first_instance: u32,
        /// Whether the command executes.
        #[serde(default = "enabled")]
        enabled: bool,
    },
    /// `vkCmdDrawIndexed`.
    DrawIndexed {
        /// Model name.
        model: String,
        /// Number of indices. Defaults to the whole model.
        #[serde(default)]
        index_count: Option<u32>,
        /// Number of instances.
        #[serde(default = "one")]
        instance_count: u32,
        /// First index.
        #[serde(default)]
        first_index: u32,
        /// Added to each index.
        #[serde(default)]
        vertex_offset: i32,
        /// First instance.
        #[serde(default)]
        first_instance: u32,
        /// Whether the command executes.
        #[serde(default = "enabled")]
        enabled: bool,
    },
}

/// The content of a session file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    /// Pipelines, created in order.
    pub pipelines: Vec<PipelineCreateInfo>,
    /// Models, created after the pipelines.
    pub models: Vec<ModelSource>,
    /// The initial command sequence.
    pub commands: Vec<CommandSpec>,
}

/// What [`Session::apply`] produced.
#[derive(Debug, Default)]
pub struct AppliedSession {
    /// The initial command sequence.
    pub sequence: CommandSequence,
    /// Pipelines and models that could not be created, with the reason.
    pub failures: Vec<(String, String)>,
    /// Commands whose resource name did not resolve.
    pub unresolved: usize,
}

impl Session {
    /// Reads a session file and resolves its relative paths.
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let text = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut session: Session = ron::from_str(&text).map_err(|source| SessionError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(base) = path.parent() {
            session.resolve_paths(base);
        }
        log::info!(
            "Loaded session '{}': {} pipeline(s), {} model(s), {} command(s).",
            path.display(),
            session.pipelines.len(),
            session.models.len(),
            session.commands.len()
        );
        Ok(session)
    }

    /// Makes every relative file path relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        for pipeline in &mut self.pipelines {
            for stage in &mut pipeline.stages {
                resolve(&mut stage.path);
            }
        }
        for model in &mut self.models {
            if let ModelSource::Obj { path, .. } = model {
                resolve(path);
            }
        }
    }

    /// Creates the pipelines and models through `agent` and builds the
    /// command sequence.
    ///
    /// A pipeline or model that fails is skipped. Commands naming a missing
    /// resource keep the invalid placeholder, so they fail simulation until
    /// edited.
    pub fn apply(&self, agent: &ResourceAgent) -> AppliedSession {
        let mut applied = AppliedSession::default();

        for info in &self.pipelines {
            if let Err(e) = agent.create_pipeline(info.clone()) {
                log::error!("Pipeline '{}' was not created: {e}", info.name);
                applied.failures.push((info.name.clone(), e.to_string()));
            }
        }

        for model in &self.models {
            let result = match model {
                ModelSource::Obj { path, name } => agent.load_obj(path, name.as_deref()),
                ModelSource::Grid {
                    name,
                    columns,
                    rows,
                } => agent.create_grid(name, *columns, *rows),
            };
            if let Err(e) = result {
                let label = match model {
                    ModelSource::Obj { path, name } => name
                        .clone()
                        .unwrap_or_else(|| path.display().to_string()),
                    ModelSource::Grid { name, .. } => name.clone(),
                };
                log::error!("Model '{label}' was not created: {e}");
                applied.failures.push((label, e.to_string()));
            }
        }

        for entry in &self.commands {
            let (command, resolved) = self.build_command(entry, agent);
            if !resolved {
                applied.unresolved += 1;
            }
            applied.sequence.push_command(command);
        }
        applied
    }

    fn build_command(&self, entry: &CommandSpec, agent: &ResourceAgent) -> (Command, bool) {
        let lookup = |kind: ResourceKind, name: &str| -> (ResourceRef, bool) {
            match agent.registry().find_by_name(kind, name) {
                Some(resource) => (resource, true),
                None => {
                    log::warn!("Session names unknown {kind} '{name}'; leaving it unset.");
                    (Resource::invalid(kind), false)
                }
            }
        };

        let (mut command, resolved, enabled) = match entry {
            CommandSpec::BindPipeline { pipeline, enabled } => {
                let (pipeline, resolved) = lookup(ResourceKind::Pipeline, pipeline);
                (Command::bind_pipeline(pipeline), resolved, *enabled)
            }
            CommandSpec::Draw {
                vertex_count,
                instance_count,
                first_vertex,
                first_instance,
                enabled,
            } => (
                Command::draw(*vertex_count, *instance_count, *first_vertex, *first_instance),
                true,
                *enabled,
            ),
            CommandSpec::DrawIndexed {
                model,
                index_count,
                instance_count,
                first_index,
                vertex_offset,
                first_instance,
                enabled,
            } => {
                let (model, resolved) = lookup(ResourceKind::Model, model);
                let index_count = index_count.unwrap_or_else(|| match model.handle() {
                    NativeHandle::Model(MeshBuffers { index_count, .. }) => index_count,
                    _ => 0,
                });
                (
                    Command::draw_indexed(
                        model,
                        index_count,
                        *instance_count,
                        *first_index,
                        *vertex_offset,
                        *first_instance,
                    ),
                    resolved,
                    *enabled,
                )
            }
        };
        command.set_enabled(enabled);
        (command, resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_default_their_counters() {
        let session: Session = ron::from_str(
            "(commands: [BindPipeline(pipeline: \"tri\", enabled: false), Draw(vertex_count: 3), DrawIndexed(model: \"floor\")])",
        )
        .unwrap();

        assert_eq!(
            session.commands,
            vec![
                CommandSpec::BindPipeline {
                    pipeline: "tri".to_string(),
                    enabled: false
                },
                CommandSpec::Draw {
                    vertex_count: 3,
                    instance_count: 1,
                    first_vertex: 0,
                    first_instance: 0,
                    enabled: true
                },
                CommandSpec::DrawIndexed {
                    model: "floor".to_string(),
                    index_count: None,
                    instance_count: 1,
                    first_index: 0,
                    vertex_offset: 0,
                    first_instance: 0,
                    enabled: true
                },
            ]
        );
        assert!(session.pipelines.is_empty());
    }

    #[test]
    fn relative_paths_follow_the_session_file() {
        let mut session: Session = ron::from_str(
            "(pipelines: [(name: \"tri\", stages: [(path: \"shaders/tri.vert\"), (path: \"/abs/tri.frag\")])], models: [Obj(path: \"bunny.obj\")])",
        )
        .unwrap();
        session.resolve_paths(Path::new("/work/demo"));

        assert_eq!(
            session.pipelines[0].stages[0].path,
            PathBuf::from("/work/demo/shaders/tri.vert")
        );
        assert_eq!(session.pipelines[0].stages[1].path, PathBuf::from("/abs/tri.frag"));
        assert_eq!(session.pipelines[0].stages[0].entry_point, "main");
        assert_eq!(
            session.models[0],
            ModelSource::Obj {
                path: PathBuf::from("/work/demo/bunny.obj"),
                name: None
            }
        );
    }
}
