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

//! The playground application: configuration, session files, keyboard
//! editing and the frame loop tying them to the wgpu backend.

pub mod config;
pub mod editor;
pub mod session;

pub use config::{ConfigError, PlaygroundConfig};
pub use editor::{EditorAction, SequenceEditor};
pub use session::{AppliedSession, CommandSpec, ModelSource, Session, SessionError};

use anyhow::{Context, Result};
use playground_agents::{ResourceAgent, ShaderReloadAgent, ShaderReloadHandle};
use playground_core::command::{CommandContext, CommandSequence, SequenceReport};
use playground_core::event::{EventBus, PlaygroundEvent};
use playground_core::renderer::GraphicsDevice;
use playground_core::resource::{ResourceReaper, ResourceRegistry};
use playground_infra::{translate_winit_input, PlaygroundWindow, WgpuRenderer, WinitWindowBuilder};
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::WindowId;

/// Everything that only exists once the window is open.
struct Systems {
    window: PlaygroundWindow,
    renderer: WgpuRenderer,
    registry: Arc<ResourceRegistry>,
    // Kept alive for the lifetime of the window; dropping it stops the worker.
    _reload: ShaderReloadHandle,
}

struct PlaygroundState {
    config: PlaygroundConfig,
    events: EventBus<PlaygroundEvent>,
    systems: Option<Systems>,
    sequence: CommandSequence,
    editor: SequenceEditor,
    last_lines: Vec<String>,
    fatal: Option<anyhow::Error>,
}

impl PlaygroundState {
    fn new(config: PlaygroundConfig) -> Self {
        Self {
            config,
            events: EventBus::new(),
            systems: None,
            sequence: CommandSequence::new(),
            editor: SequenceEditor::new(),
            last_lines: Vec::new(),
            fatal: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<Systems> {
        let window = WinitWindowBuilder::new()
            .with_title(self.config.window_title.clone())
            .with_dimensions(self.config.window_width, self.config.window_height)
            .build(event_loop)
            .context("failed to create the window")?;

        let renderer = WgpuRenderer::new(
            window.winit_window(),
            self.config.backend,
            self.config.clear_color,
        )?;
        log::info!("Rendering on {}.", renderer.adapter_description());

        let device: Arc<dyn GraphicsDevice> = renderer.device();
        let reaper = ResourceReaper::spawn(
            Arc::clone(&device),
            self.config.destroy_grace(),
            Some(self.events.sender()),
        )?;
        let registry =
            Arc::new(ResourceRegistry::new(reaper).with_event_sender(self.events.sender()));

        let reload = ShaderReloadAgent::new(Arc::clone(&device), Arc::clone(&registry))
            .with_event_sender(self.events.sender())
            .with_file_watching(self.config.watch_shaders)
            .spawn()?;
        let agent = ResourceAgent::new(device, Arc::clone(&registry))
            .with_reload_sender(reload.sender());

        if let Some(path) = &self.config.session {
            let applied = Session::load(path)?.apply(&agent);
            if !applied.failures.is_empty() || applied.unresolved > 0 {
                log::warn!(
                    "Session loaded with {} failed resource(s) and {} unresolved command(s).",
                    applied.failures.len(),
                    applied.unresolved
                );
            }
            self.sequence = applied.sequence;
        } else {
            log::info!("No session given; starting with an empty sequence.");
        }

        Ok(Systems {
            window,
            renderer,
            registry,
            _reload: reload,
        })
    }

    fn redraw(&mut self) {
        let Some(systems) = self.systems.as_mut() else {
            return;
        };
        let ctx = CommandContext::new(&systems.registry);
        let sequence = &self.sequence;
        let mut report: Option<SequenceReport> = None;

        let result = systems
            .renderer
            .render_frame(|sink| report = Some(sequence.run_frame(&ctx, sink)));
        if let Err(e) = result {
            log::error!("Rendering error: {e}");
        }

        if let Some(report) = report {
            log::trace!(
                "Frame {}: {} command(s) recorded.",
                systems.renderer.frame_count(),
                report.executed()
            );
            self.log_report(&report);
        }
        self.drain_events();
    }

    /// Logs the command list whenever its text changes.
    fn log_report(&mut self, report: &SequenceReport) {
        let lines = report.lines();
        if lines == self.last_lines {
            return;
        }
        if lines.is_empty() {
            log::info!("Command list is empty.");
        } else {
            let state = if report.is_valid() { "valid" } else { "blocked" };
            log::info!("Command list ({state}):");
            for (i, line) in lines.iter().enumerate() {
                let marker = if i == self.editor.selected() { ">" } else { " " };
                log::info!("{marker} {line}");
            }
        }
        self.last_lines = lines;
    }

    fn drain_events(&self) {
        for event in self.events.drain() {
            match event {
                PlaygroundEvent::RebuildFailed { name, reason, .. } => {
                    log::warn!("Pipeline '{name}' kept its previous version: {reason}");
                }
                other => log::debug!("Event: {other:?}"),
            }
        }
    }
}

impl Drop for PlaygroundState {
    fn drop(&mut self) {
        log::info!("Playground is shutting down.");
        // Stop the reload worker before the device goes away.
        self.systems.take();
    }
}

impl ApplicationHandler for PlaygroundState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.systems.is_some() {
            return;
        }
        log::info!("Initializing window and graphics...");
        match self.init(event_loop) {
            Ok(systems) => self.systems = Some(systems),
            Err(e) => {
                log::error!("Initialization failed: {e:#}");
                self.fatal = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let Some(systems) = self.systems.as_mut() else {
            return;
        };
        if systems.window.winit_window().id() != id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Shutdown requested, exiting event loop...");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                log::debug!("Window resized to: {}x{}", size.width, size.height);
                systems.renderer.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            other => {
                if let Some(input) = translate_winit_input(&other) {
                    let registry = Arc::clone(&systems.registry);
                    let action = self.editor.handle(&input, &mut self.sequence, &registry);
                    if action == EditorAction::Quit {
                        log::info!("Escape pressed, exiting event loop...");
                        event_loop.exit();
                    } else if action == EditorAction::Edited {
                        // Force the list to be logged even if only the selection moved.
                        self.last_lines.clear();
                    }
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(systems) = &self.systems {
            systems.window.request_redraw();
        }
    }
}

/// Entry point of the application.
pub struct Playground {
    config: PlaygroundConfig,
}

impl Playground {
    /// A playground running with `config`.
    pub fn new(config: PlaygroundConfig) -> Self {
        Self {
            config: config.validated(),
        }
    }

    /// Opens the window and runs until it is closed.
    pub fn run(self) -> Result<()> {
        log::info!("Playground: starting with backend {}...", self.config.backend);
        let event_loop = EventLoop::new()?;
        let mut state = PlaygroundState::new(self.config);
        event_loop.run_app(&mut state)?;

        match state.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
