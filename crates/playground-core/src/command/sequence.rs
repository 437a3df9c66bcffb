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

use super::{Argument, ArgumentError, Command, CommandContext, CommandKind, CommandState, SimulationError};
use crate::renderer::CommandSink;

/// Outcome of one simulation pass over a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SequenceReport {
    descriptions: Vec<String>,
    enabled: Vec<bool>,
    errors: Vec<Option<SimulationError>>,
    executed: usize,
}

impl SequenceReport {
    /// `true` when no command reported an error, enabled or not.
    pub fn is_valid(&self) -> bool {
        self.errors.iter().all(Option::is_none)
    }

    /// One entry per command, in sequence order.
    pub fn errors(&self) -> &[Option<SimulationError>] {
        &self.errors
    }

    /// The error of command `index`, if any.
    pub fn error(&self, index: usize) -> Option<SimulationError> {
        self.errors.get(index).copied().flatten()
    }

    /// Number of commands recorded into the sink this frame.
    pub fn executed(&self) -> usize {
        self.executed
    }

    /// Display lines such as `#001: vkCmdDraw(3, 1, 0, 0)`, with disabled
    /// commands and errors marked.
    pub fn lines(&self) -> Vec<String> {
        self.descriptions
            .iter()
            .zip(&self.enabled)
            .zip(&self.errors)
            .enumerate()
            .map(|(i, ((description, enabled), error))| {
                let mut line = format!("#{i:03}: {description}");
                if !enabled {
                    line.push_str(" [disabled]");
                }
                if let Some(error) = error {
                    line.push_str(&format!(" <- {error}"));
                }
                line
            })
            .collect()
    }
}

/// An ordered, editable list of commands. Order is execution order.
#[derive(Debug, Clone, Default)]
pub struct CommandSequence {
    commands: Vec<Command>,
}

impl CommandSequence {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// `true` if the sequence holds no command.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The commands, in order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Command at `index`.
    pub fn get(&self, index: usize) -> Option<&Command> {
        self.commands.get(index)
    }

    /// Appends a default command of `kind` and returns its index.
    pub fn push(&mut self, kind: CommandKind) -> usize {
        self.push_command(Command::new(kind))
    }

    /// Appends `command` and returns its index.
    pub fn push_command(&mut self, command: Command) -> usize {
        self.commands.push(command);
        self.commands.len() - 1
    }

    /// Removes and returns the command at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Command> {
        (index < self.commands.len()).then(|| self.commands.remove(index))
    }

    /// Swaps command `index` with the previous one. No-op on the first command.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.commands.len() {
            return false;
        }
        self.commands.swap(index - 1, index);
        true
    }

    /// Swaps command `index` with the next one. No-op on the last command.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index >= self.commands.len().saturating_sub(1) {
            return false;
        }
        self.commands.swap(index, index + 1);
        true
    }

    /// Enables or disables command `index`. Returns `false` if there is none.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> bool {
        match self.commands.get_mut(index) {
            Some(command) => {
                command.set_enabled(enabled);
                true
            }
            None => false,
        }
    }

    /// Sets argument `argument` of command `index`.
    pub fn set_argument(
        &mut self,
        index: usize,
        argument: usize,
        value: Argument,
    ) -> Result<(), ArgumentError> {
        let len = self.commands.len();
        self.commands
            .get_mut(index)
            .ok_or(ArgumentError::NoSuchCommand { index, len })?
            .set_argument(argument, value)
    }

    /// Simulates every command, enabled or not, from a fresh state.
    pub fn simulate(&self, ctx: &CommandContext<'_>) -> SequenceReport {
        let mut state = CommandState::default();
        let errors = self
            .commands
            .iter()
            .map(|command| command.simulate(&mut state, ctx))
            .collect();

        SequenceReport {
            descriptions: self.commands.iter().map(Command::describe).collect(),
            enabled: self.commands.iter().map(Command::is_enabled).collect(),
            errors,
            executed: 0,
        }
    }

    /// Runs one frame: simulate everything, then, only if the whole sequence
    /// is valid, execute the enabled commands into `sink`.
    pub fn run_frame(&self, ctx: &CommandContext<'_>, sink: &mut dyn CommandSink) -> SequenceReport {
        let mut report = self.simulate(ctx);
        if !report.is_valid() {
            log::trace!("Sequence has errors; nothing recorded this frame.");
            return report;
        }

        for command in self.commands.iter().filter(|c| c.is_enabled()) {
            command.execute(sink, ctx);
            report.executed += 1;
        }
        report
    }
}
