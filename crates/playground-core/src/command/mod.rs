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

//! Abstract GPU commands.
//!
//! A [`Command`] is checked against a [`CommandState`] by [`Command::simulate`]
//! before it is ever translated into native calls by [`Command::execute`].
//! Simulation is pure with respect to resources: it only reads validity flags
//! and folds the pipeline-bound state.

mod argument;
mod sequence;

pub use self::argument::{Argument, ArgumentError, ArgumentType};
pub use self::sequence::{CommandSequence, SequenceReport};

use crate::renderer::CommandSink;
use crate::resource::{NativeHandle, Resource, ResourceKind, ResourceRef, ResourceRegistry};
use std::fmt;

/// The kinds of command a sequence can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// `vkCmdBindPipeline`.
    BindPipeline,
    /// `vkCmdDraw`.
    Draw,
    /// `vkCmdDrawIndexed`.
    DrawIndexed,
}

impl CommandKind {
    /// Every kind, in menu order.
    pub const ALL: [CommandKind; 3] = [
        CommandKind::BindPipeline,
        CommandKind::Draw,
        CommandKind::DrawIndexed,
    ];

    /// Name used in descriptions.
    pub fn name(self) -> &'static str {
        match self {
            CommandKind::BindPipeline => "BindPipeline",
            CommandKind::Draw => "Draw",
            CommandKind::DrawIndexed => "DrawIndexed",
        }
    }
}

/// Typed arguments of a command.
#[derive(Debug, Clone)]
pub enum CommandArgs {
    /// Arguments of [`CommandKind::BindPipeline`].
    BindPipeline {
        /// The pipeline to bind.
        pipeline: ResourceRef,
    },
    /// Arguments of [`CommandKind::Draw`].
    Draw {
        /// Number of vertices.
        vertex_count: u32,
        /// Number of instances.
        instance_count: u32,
        /// First vertex index.
        first_vertex: u32,
        /// First instance index.
        first_instance: u32,
    },
    /// Arguments of [`CommandKind::DrawIndexed`].
    DrawIndexed {
        /// The model providing vertex and index buffers.
        model: ResourceRef,
        /// Number of indices.
        index_count: u32,
        /// Number of instances.
        instance_count: u32,
        /// First index.
        first_index: u32,
        /// Value added to each index before fetching vertices.
        vertex_offset: i32,
        /// First instance index.
        first_instance: u32,
    },
}

/// Why a command cannot run in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationError {
    /// The bound pipeline was deleted or never chosen.
    InvalidPipeline,
    /// A draw was issued before any pipeline was bound.
    NoPipelineBound,
    /// The drawn model was deleted or never chosen.
    ///
    /// Only reported once a pipeline is bound.
    InvalidModel,
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SimulationError::InvalidPipeline => "invalid pipeline",
            SimulationError::NoPipelineBound => "no pipeline bound",
            SimulationError::InvalidModel => "invalid model",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for SimulationError {}

/// The abstract GPU state folded across a sequence during simulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandState {
    /// Whether a pipeline has been bound so far.
    pub pipeline_bound: bool,
}

/// Read-only view of the resources a frame runs against.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    registry: &'a ResourceRegistry,
}

impl<'a> CommandContext<'a> {
    /// Wraps the registry.
    pub fn new(registry: &'a ResourceRegistry) -> Self {
        Self { registry }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &'a ResourceRegistry {
        self.registry
    }

    /// Resources a slot of type `kind` may currently be set to.
    pub fn options(&self, kind: ResourceKind) -> Vec<ResourceRef> {
        self.registry.list(Some(kind))
    }
}

/// One entry of a command sequence.
#[derive(Debug, Clone)]
pub struct Command {
    args: CommandArgs,
    enabled: bool,
}

impl Command {
    /// Creates an enabled command of `kind` with its default arguments.
    ///
    /// Resource slots start on the shared "invalid" placeholder, so a fresh
    /// bind or indexed draw fails simulation until a resource is chosen.
    pub fn new(kind: CommandKind) -> Self {
        let args = match kind {
            CommandKind::BindPipeline => CommandArgs::BindPipeline {
                pipeline: Resource::invalid(ResourceKind::Pipeline),
            },
            CommandKind::Draw => CommandArgs::Draw {
                vertex_count: 0,
                instance_count: 1,
                first_vertex: 0,
                first_instance: 0,
            },
            CommandKind::DrawIndexed => CommandArgs::DrawIndexed {
                model: Resource::invalid(ResourceKind::Model),
                index_count: 0,
                instance_count: 1,
                first_index: 0,
                vertex_offset: 0,
                first_instance: 0,
            },
        };
        Self::from_args(args)
    }

    /// Creates an enabled command from explicit arguments.
    pub fn from_args(args: CommandArgs) -> Self {
        Self {
            args,
            enabled: true,
        }
    }

    /// `BindPipeline(pipeline)`.
    pub fn bind_pipeline(pipeline: ResourceRef) -> Self {
        Self::from_args(CommandArgs::BindPipeline { pipeline })
    }

    /// `Draw(vertex_count, instance_count, first_vertex, first_instance)`.
    pub fn draw(
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    ) -> Self {
        Self::from_args(CommandArgs::Draw {
            vertex_count,
            instance_count,
            first_vertex,
            first_instance,
        })
    }

    /// `DrawIndexed(model, ...)`.
    pub fn draw_indexed(
        model: ResourceRef,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) -> Self {
        Self::from_args(CommandArgs::DrawIndexed {
            model,
            index_count,
            instance_count,
            first_index,
            vertex_offset,
            first_instance,
        })
    }

    /// The command kind.
    pub fn kind(&self) -> CommandKind {
        match self.args {
            CommandArgs::BindPipeline { .. } => CommandKind::BindPipeline,
            CommandArgs::Draw { .. } => CommandKind::Draw,
            CommandArgs::DrawIndexed { .. } => CommandKind::DrawIndexed,
        }
    }

    /// The typed arguments.
    pub fn args(&self) -> &CommandArgs {
        &self.args
    }

    /// Whether the command runs during execution.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enables or disables execution. Disabled commands are still simulated.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Human-readable name of each argument slot.
    pub fn argument_names(&self) -> &'static [&'static str] {
        match self.args {
            CommandArgs::BindPipeline { .. } => &["pipeline"],
            CommandArgs::Draw { .. } => &[
                "vertexCount",
                "instanceCount",
                "firstVertex",
                "firstInstance",
            ],
            CommandArgs::DrawIndexed { .. } => &[
                "model",
                "indexCount",
                "instanceCount",
                "firstIndex",
                "vertexOffset",
                "firstInstance",
            ],
        }
    }

    /// The type of each argument slot.
    pub fn argument_types(&self) -> &'static [ArgumentType] {
        const U: ArgumentType = ArgumentType::U32;
        match self.args {
            CommandArgs::BindPipeline { .. } => {
                &[ArgumentType::Resource(ResourceKind::Pipeline)]
            }
            CommandArgs::Draw { .. } => &[U, U, U, U],
            CommandArgs::DrawIndexed { .. } => &[
                ArgumentType::Resource(ResourceKind::Model),
                U,
                U,
                U,
                ArgumentType::I32,
                U,
            ],
        }
    }

    /// Current argument values, in slot order.
    pub fn arguments(&self) -> Vec<Argument> {
        match &self.args {
            CommandArgs::BindPipeline { pipeline } => vec![Argument::Resource(pipeline.clone())],
            CommandArgs::Draw {
                vertex_count,
                instance_count,
                first_vertex,
                first_instance,
            } => vec![
                Argument::U32(*vertex_count),
                Argument::U32(*instance_count),
                Argument::U32(*first_vertex),
                Argument::U32(*first_instance),
            ],
            CommandArgs::DrawIndexed {
                model,
                index_count,
                instance_count,
                first_index,
                vertex_offset,
                first_instance,
            } => vec![
                Argument::Resource(model.clone()),
                Argument::U32(*index_count),
                Argument::U32(*instance_count),
                Argument::U32(*first_index),
                Argument::I32(*vertex_offset),
                Argument::U32(*first_instance),
            ],
        }
    }

    /// Replaces argument `index` with `value`.
    ///
    /// ## Errors
    /// Rejects an index past the last slot, a value of the wrong type or
    /// resource kind, and resources that are no longer valid.
    pub fn set_argument(&mut self, index: usize, value: Argument) -> Result<(), ArgumentError> {
        let types = self.argument_types();
        let expected = *types.get(index).ok_or(ArgumentError::OutOfRange {
            index,
            count: types.len(),
        })?;
        let found = value.argument_type();
        if expected != found {
            return Err(ArgumentError::TypeMismatch {
                index,
                expected,
                found,
            });
        }

        if let Argument::Resource(resource) = &value {
            if !resource.is_valid() {
                return Err(ArgumentError::InvalidResource {
                    index,
                    name: resource.name().to_string(),
                });
            }
        }

        // A slot table out of step with `argument_types` reports a mismatch.
        let mismatch = ArgumentError::TypeMismatch {
            index,
            expected,
            found,
        };
        match (&mut self.args, value) {
            (CommandArgs::BindPipeline { pipeline }, Argument::Resource(r)) => *pipeline = r,
            (CommandArgs::DrawIndexed { model, .. }, Argument::Resource(r)) => *model = r,
            (CommandArgs::DrawIndexed { vertex_offset, .. }, Argument::I32(v)) => {
                *vertex_offset = v
            }
            (args, Argument::U32(v)) => *u32_slot(args, index).ok_or(mismatch)? = v,
            _ => return Err(mismatch),
        }
        Ok(())
    }

    /// One-line rendering such as `vkCmdDraw(3, 1, 0, 0)`.
    pub fn describe(&self) -> String {
        self.to_string()
    }

    /// Checks the command against `state` and updates it.
    ///
    /// Returns the reason the command cannot run, or `None`.
    pub fn simulate(
        &self,
        state: &mut CommandState,
        _ctx: &CommandContext<'_>,
    ) -> Option<SimulationError> {
        match &self.args {
            CommandArgs::BindPipeline { pipeline } => {
                if !pipeline.is_valid() {
                    return Some(SimulationError::InvalidPipeline);
                }
                state.pipeline_bound = true;
                None
            }
            CommandArgs::Draw { .. } => {
                (!state.pipeline_bound).then_some(SimulationError::NoPipelineBound)
            }
            CommandArgs::DrawIndexed { model, .. } => {
                if !state.pipeline_bound {
                    Some(SimulationError::NoPipelineBound)
                } else if !model.is_valid() {
                    Some(SimulationError::InvalidModel)
                } else {
                    None
                }
            }
        }
    }

    /// Records the native calls of this command into `sink`.
    ///
    /// No validation happens here; callers only execute sequences that passed
    /// simulation in the same frame. Each resource handle is read once.
    pub fn execute(&self, sink: &mut dyn CommandSink, _ctx: &CommandContext<'_>) {
        match &self.args {
            CommandArgs::BindPipeline { pipeline } => match pipeline.handle() {
                NativeHandle::Pipeline(id) => sink.bind_pipeline(id),
                other => log::warn!(
                    "Pipeline '{}' has no pipeline handle ({other:?}); skipping bind.",
                    pipeline.name()
                ),
            },
            CommandArgs::Draw {
                vertex_count,
                instance_count,
                first_vertex,
                first_instance,
            } => sink.draw(*vertex_count, *instance_count, *first_vertex, *first_instance),
            CommandArgs::DrawIndexed {
                model,
                index_count,
                instance_count,
                first_index,
                vertex_offset,
                first_instance,
            } => match model.handle() {
                NativeHandle::Model(mesh) => {
                    sink.set_vertex_buffer(0, mesh.vertex);
                    sink.set_index_buffer(mesh.index, mesh.index_format);
                    sink.draw_indexed(
                        *index_count,
                        *instance_count,
                        *first_index,
                        *vertex_offset,
                        *first_instance,
                    );
                }
                other => log::warn!(
                    "Model '{}' has no mesh handle ({other:?}); skipping draw.",
                    model.name()
                ),
            },
        }
    }
}

fn u32_slot(args: &mut CommandArgs, index: usize) -> Option<&mut u32> {
    match args {
        CommandArgs::Draw {
            vertex_count,
            instance_count,
            first_vertex,
            first_instance,
        } => [vertex_count, instance_count, first_vertex, first_instance]
            .into_iter()
            .nth(index),
        CommandArgs::DrawIndexed {
            index_count,
            instance_count,
            first_index,
            first_instance,
            ..
        } => match index {
            1 => Some(index_count),
            2 => Some(instance_count),
            3 => Some(first_index),
            5 => Some(first_instance),
            _ => None,
        },
        CommandArgs::BindPipeline { .. } => None,
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vkCmd{}(", self.kind().name())?;
        for (i, arg) in self.arguments().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}
