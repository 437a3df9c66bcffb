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

//! Keyboard editing of the command sequence.
//!
//! | Key | Action |
//! |---|---|
//! | `B` / `D` / `I` | append BindPipeline / Draw / DrawIndexed |
//! | `Up` / `Down` | move the selection |
//! | `Shift+Up` / `Shift+Down` | move the selected command |
//! | `Space` | toggle the selected command |
//! | `Delete` / `Backspace` | remove the selected command |
//! | `P` | cycle the pipeline or model of the selected command |
//! | `+` / `-` | change the vertex or index count of the selected draw |
//! | `X` | delete the pipeline or model of the selected command |
//! | `L` | log the resource list |
//! | `Escape` | quit |

use playground_core::command::{Argument, CommandArgs, CommandKind, CommandSequence};
use playground_core::resource::{ResourceKind, ResourceRef, ResourceRegistry};
use playground_infra::{InputEvent, KeyCode};
use std::sync::Arc;

/// What the runner should do after an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    /// Nothing changed.
    None,
    /// The sequence or the selection changed.
    Edited,
    /// The user asked to quit.
    Quit,
}

/// Selection and modifier state of the keyboard editor.
#[derive(Debug, Clone, Default)]
pub struct SequenceEditor {
    selected: usize,
    shift: bool,
}

impl SequenceEditor {
    /// Creates an editor with the first command selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the selected command. Meaningless on an empty sequence.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Applies one input event to `sequence`.
    pub fn handle(
        &mut self,
        event: &InputEvent,
        sequence: &mut CommandSequence,
        registry: &ResourceRegistry,
    ) -> EditorAction {
        let key = match event {
            InputEvent::ModifiersChanged { shift } => {
                self.shift = *shift;
                return EditorAction::None;
            }
            InputEvent::KeyPressed { key } => key,
        };

        let edited = match key {
            KeyCode::B => self.append(sequence, CommandKind::BindPipeline),
            KeyCode::D => self.append(sequence, CommandKind::Draw),
            KeyCode::I => self.append(sequence, CommandKind::DrawIndexed),
            KeyCode::Up if self.shift => {
                let moved = sequence.move_up(self.selected);
                if moved {
                    self.selected -= 1;
                }
                moved
            }
            KeyCode::Down if self.shift => {
                let moved = sequence.move_down(self.selected);
                if moved {
                    self.selected += 1;
                }
                moved
            }
            KeyCode::Up => {
                let before = self.selected;
                self.selected = self.selected.saturating_sub(1);
                before != self.selected
            }
            KeyCode::Down => {
                let before = self.selected;
                if self.selected + 1 < sequence.len() {
                    self.selected += 1;
                }
                before != self.selected
            }
            KeyCode::Space => {
                let enabled = sequence.get(self.selected).map(|c| c.is_enabled());
                match enabled {
                    Some(enabled) => sequence.set_enabled(self.selected, !enabled),
                    None => false,
                }
            }
            KeyCode::Delete | KeyCode::Backspace => {
                let removed = sequence.remove(self.selected).is_some();
                self.clamp(sequence);
                removed
            }
            KeyCode::P => self.cycle_resource(sequence, registry),
            KeyCode::Plus => self.adjust_count(sequence, 1),
            KeyCode::Minus => self.adjust_count(sequence, -1),
            KeyCode::X => self.delete_resource(sequence, registry),
            KeyCode::L => {
                log_resources(registry);
                false
            }
            KeyCode::Escape => return EditorAction::Quit,
            KeyCode::Other(_) => false,
        };

        if edited {
            log::debug!("Edited sequence ({key:?}); selection at #{:03}.", self.selected);
            EditorAction::Edited
        } else {
            EditorAction::None
        }
    }

    fn append(&mut self, sequence: &mut CommandSequence, kind: CommandKind) -> bool {
        self.selected = sequence.push(kind);
        true
    }

    fn clamp(&mut self, sequence: &CommandSequence) {
        self.selected = self.selected.min(sequence.len().saturating_sub(1));
    }

    /// The resource slot of the selected command: its index, kind and value.
    fn resource_slot(&self, sequence: &CommandSequence) -> Option<(usize, ResourceKind, ResourceRef)> {
        match sequence.get(self.selected)?.args() {
            CommandArgs::BindPipeline { pipeline } => {
                Some((0, ResourceKind::Pipeline, Arc::clone(pipeline)))
            }
            CommandArgs::DrawIndexed { model, .. } => {
                Some((0, ResourceKind::Model, Arc::clone(model)))
            }
            CommandArgs::Draw { .. } => None,
        }
    }

    fn cycle_resource(&self, sequence: &mut CommandSequence, registry: &ResourceRegistry) -> bool {
        let Some((slot, kind, current)) = self.resource_slot(sequence) else {
            return false;
        };
        let options = registry.list(Some(kind));
        if options.is_empty() {
            log::warn!("No valid {kind} to choose from.");
            return false;
        }
        let next = options
            .iter()
            .position(|r| Arc::ptr_eq(r, &current))
            .map_or(0, |i| (i + 1) % options.len());

        match sequence.set_argument(self.selected, slot, Argument::Resource(Arc::clone(&options[next]))) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Cannot select '{}': {e}", options[next].name());
                false
            }
        }
    }

    fn adjust_count(&self, sequence: &mut CommandSequence, delta: i64) -> bool {
        let (slot, count) = match sequence.get(self.selected).map(|c| c.args()) {
            Some(CommandArgs::Draw { vertex_count, .. }) => (0, *vertex_count),
            Some(CommandArgs::DrawIndexed { index_count, .. }) => (1, *index_count),
            _ => return false,
        };
        let updated = (i64::from(count) + delta).clamp(0, i64::from(u32::MAX));
        let updated = u32::try_from(updated).unwrap_or(count);
        if updated == count {
            return false;
        }
        sequence
            .set_argument(self.selected, slot, Argument::U32(updated))
            .is_ok()
    }

    fn delete_resource(&self, sequence: &CommandSequence, registry: &ResourceRegistry) -> bool {
        match self.resource_slot(sequence) {
            Some((_, _, resource)) => registry.invalidate_and_schedule_destroy(&resource),
            None => false,
        }
    }
}

/// Logs every valid resource with its id.
pub fn log_resources(registry: &ResourceRegistry) {
    let resources = registry.list(None);
    log::info!("{} resource(s):", resources.len());
    for resource in resources {
        log::info!(
            "  {:?} {} '{}'{}",
            resource.id(),
            resource.kind(),
            resource.name(),
            if resource.is_owned() { "" } else { " (aliased)" }
        );
    }
}
