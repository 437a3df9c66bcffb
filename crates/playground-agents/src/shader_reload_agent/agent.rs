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

use super::{AgentError, ReloadMessage};
use crossbeam_channel::{select, unbounded, Receiver, Sender};
use playground_core::event::PlaygroundEvent;
use playground_core::pipeline::{build_render_pipeline, PipelineCreateInfo};
use playground_core::renderer::GraphicsDevice;
use playground_core::resource::{NativeHandle, ResourceId, ResourceRegistry};
use playground_infra::{normalize_path, ShaderWatcher};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Configuration of the shader reload worker.
///
/// Build it with [`new`](Self::new) and the `with_*` methods, then call
/// [`spawn`](Self::spawn).
#[derive(Debug)]
pub struct ShaderReloadAgent {
    device: Arc<dyn GraphicsDevice>,
    registry: Arc<ResourceRegistry>,
    events: Option<flume::Sender<PlaygroundEvent>>,
    watch_files: bool,
    settle_delay: Duration,
}

impl ShaderReloadAgent {
    /// How long the worker waits for more changes before rebuilding.
    /// Editors often write a file several times per save.
    pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(50);

    /// Creates an agent rebuilding pipelines on `device` and installing them
    /// in `registry`. Filesystem watching is on by default.
    pub fn new(device: Arc<dyn GraphicsDevice>, registry: Arc<ResourceRegistry>) -> Self {
        Self {
            device,
            registry,
            events: None,
            watch_files: true,
            settle_delay: Self::DEFAULT_SETTLE_DELAY,
        }
    }

    /// Publishes `RebuildFailed` events on `sender`.
    pub fn with_event_sender(mut self, sender: flume::Sender<PlaygroundEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Enables or disables the filesystem watcher. Without it, changes are
    /// only reported through [`ReloadMessage::FileChanged`].
    pub fn with_file_watching(mut self, enabled: bool) -> Self {
        self.watch_files = enabled;
        self
    }

    /// Overrides [`DEFAULT_SETTLE_DELAY`](Self::DEFAULT_SETTLE_DELAY).
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Starts the worker thread.
    pub fn spawn(self) -> Result<ShaderReloadHandle, AgentError> {
        let (sender, messages) = unbounded::<ReloadMessage>();

        let (watcher, paths) = if self.watch_files {
            let (path_sender, paths) = unbounded::<PathBuf>();
            (Some(ShaderWatcher::new(path_sender)?), paths)
        } else {
            (None, crossbeam_channel::never())
        };

        let mut worker = ReloadWorker {
            device: self.device,
            registry: self.registry,
            events: self.events,
            settle_delay: self.settle_delay,
            watcher,
            pipelines: HashMap::new(),
        };

        let thread = thread::Builder::new()
            .name("shader-reload".to_string())
            .spawn(move || worker.run(messages, paths))
            .map_err(AgentError::Spawn)?;

        log::info!("ShaderReloadAgent: worker started.");
        Ok(ShaderReloadHandle {
            sender,
            thread: Some(thread),
        })
    }
}

/// A running reload worker. Dropping it stops the worker.
#[derive(Debug)]
pub struct ShaderReloadHandle {
    sender: Sender<ReloadMessage>,
    thread: Option<JoinHandle<()>>,
}

impl ShaderReloadHandle {
    /// A sender for [`ReloadMessage`]s, for producers living elsewhere.
    pub fn sender(&self) -> Sender<ReloadMessage> {
        self.sender.clone()
    }

    /// Registers pipeline `id` for rebuilds.
    pub fn watch(&self, id: ResourceId, info: PipelineCreateInfo) {
        self.send(ReloadMessage::Watch { id, info });
    }

    /// Reports a modified shader file.
    pub fn notify_changed(&self, path: impl Into<PathBuf>) {
        self.send(ReloadMessage::FileChanged(path.into()));
    }

    fn send(&self, message: ReloadMessage) {
        if self.sender.send(message).is_err() {
            log::warn!("ShaderReloadAgent: worker is gone; message dropped.");
        }
    }
}

impl Drop for ShaderReloadHandle {
    fn drop(&mut self) {
        let _ = self.sender.send(ReloadMessage::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("ShaderReloadAgent: worker panicked.");
            }
        }
    }
}

enum Flow {
    Continue,
    Stop,
}

enum Incoming {
    Message(ReloadMessage),
    PathsClosed,
    Settled,
}

struct ReloadWorker {
    device: Arc<dyn GraphicsDevice>,
    registry: Arc<ResourceRegistry>,
    events: Option<flume::Sender<PlaygroundEvent>>,
    settle_delay: Duration,
    watcher: Option<ShaderWatcher>,
    pipelines: HashMap<ResourceId, PipelineCreateInfo>,
}

impl ReloadWorker {
    /// Waits for the next message or watcher path. With `settle`, gives up
    /// after the settle delay.
    fn next(
        &self,
        messages: &Receiver<ReloadMessage>,
        paths: &Receiver<PathBuf>,
        settle: bool,
    ) -> Incoming {
        let timeout = if settle {
            crossbeam_channel::after(self.settle_delay)
        } else {
            crossbeam_channel::never()
        };
        select! {
            recv(messages) -> message => {
                Incoming::Message(message.unwrap_or(ReloadMessage::Shutdown))
            }
            recv(paths) -> path => match path {
                Ok(path) => Incoming::Message(ReloadMessage::FileChanged(path)),
                Err(_) => Incoming::PathsClosed,
            },
            recv(timeout) -> _ => Incoming::Settled,
        }
    }

    fn run(&mut self, messages: Receiver<ReloadMessage>, mut paths: Receiver<PathBuf>) {
        let mut changed = BTreeSet::new();
        loop {
            // Bursts of writes are coalesced: rebuild once the paths settle.
            let flow = match self.next(&messages, &paths, !changed.is_empty()) {
                Incoming::Message(message) => self.handle(message, &mut changed),
                Incoming::PathsClosed => {
                    paths = crossbeam_channel::never();
                    Flow::Continue
                }
                Incoming::Settled => {
                    let batch = std::mem::take(&mut changed);
                    self.rebuild_affected(&batch);
                    Flow::Continue
                }
            };
            if let Flow::Stop = flow {
                break;
            }
        }
        log::debug!("ShaderReloadAgent: worker stopped.");
    }

    fn handle(&mut self, message: ReloadMessage, changed: &mut BTreeSet<PathBuf>) -> Flow {
        match message {
            ReloadMessage::Watch { id, info } => {
                self.watch(id, info);
                Flow::Continue
            }
            ReloadMessage::FileChanged(path) => {
                changed.insert(normalize_path(&path));
                Flow::Continue
            }
            ReloadMessage::Shutdown => Flow::Stop,
        }
    }

    fn watch(&mut self, id: ResourceId, info: PipelineCreateInfo) {
        if let Some(watcher) = self.watcher.as_mut() {
            for path in info.watched_paths() {
                if let Err(e) = watcher.watch_file(path) {
                    log::warn!("ShaderReloadAgent: {e}");
                }
            }
        }
        log::debug!(
            "ShaderReloadAgent: watching {} file(s) of '{}'.",
            info.stages.len(),
            info.name
        );
        self.pipelines.insert(id, info);
    }

    fn uses_any(info: &PipelineCreateInfo, changed: &BTreeSet<PathBuf>) -> bool {
        info.watched_paths()
            .map(normalize_path)
            .any(|p| changed.contains(&p))
    }

    fn rebuild_affected(&mut self, changed: &BTreeSet<PathBuf>) {
        let mut affected: Vec<ResourceId> = self
            .pipelines
            .iter()
            .filter(|(_, info)| Self::uses_any(info, changed))
            .map(|(id, _)| *id)
            .collect();
        affected.sort();

        if affected.is_empty() {
            log::trace!(
                "ShaderReloadAgent: no pipeline uses {:?}.",
                changed.iter().map(|p| p.display().to_string()).collect::<Vec<_>>()
            );
            return;
        }

        for id in affected {
            // Deleted pipelines are forgotten instead of rebuilt.
            let live = self.registry.get(id).is_some_and(|r| r.is_valid());
            if !live {
                log::debug!("ShaderReloadAgent: {id:?} was deleted; forgetting it.");
                self.pipelines.remove(&id);
                continue;
            }
            if let Some(info) = self.pipelines.get(&id) {
                self.rebuild(id, info);
            }
        }
    }

    fn rebuild(&self, id: ResourceId, info: &PipelineCreateInfo) {
        log::info!("ShaderReloadAgent: rebuilding '{}'.", info.name);
        match build_render_pipeline(self.device.as_ref(), info) {
            Ok(pipeline) => {
                self.registry
                    .complete_rebuild(id, NativeHandle::Pipeline(pipeline));
            }
            Err(e) => {
                log::warn!(
                    "ShaderReloadAgent: rebuild of '{}' failed, keeping the previous pipeline: {e}",
                    info.name
                );
                if let Some(events) = &self.events {
                    let _ = events.send(PlaygroundEvent::RebuildFailed {
                        id,
                        name: info.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
}
