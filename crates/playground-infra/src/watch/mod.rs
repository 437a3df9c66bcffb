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

//! Shader hot-reload watching.
//!
//! Parent directories are watched rather than the files themselves, since
//! editors often replace a file instead of writing it in place.

use crossbeam_channel::Sender;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Failure to set up file watching.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("failed to start the file watcher: {0}")]
    Init(#[source] notify::Error),
    #[error("cannot watch '{}': {source}", path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// Canonical form used to compare watched and reported paths. Falls back to
/// the path as given when it cannot be resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Sends the normalized path of every created or modified file under the
/// watched directories. Dropping the watcher stops the notifications.
pub struct ShaderWatcher {
    watcher: RecommendedWatcher,
    watched_dirs: HashSet<PathBuf>,
}

impl std::fmt::Debug for ShaderWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShaderWatcher")
            .field("watched_dirs", &self.watched_dirs)
            .finish()
    }
}

impl ShaderWatcher {
    /// Starts a watcher reporting changed paths on `sender`.
    pub fn new(sender: Sender<PathBuf>) -> Result<Self, WatchError> {
        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                        for path in &event.paths {
                            if sender.send(normalize_path(path)).is_err() {
                                log::trace!("Shader change on {} dropped: no receiver.", path.display());
                            }
                        }
                    }
                }
                Err(e) => log::warn!("File watcher error: {e}"),
            },
            Config::default(),
        )
        .map_err(WatchError::Init)?;

        Ok(Self {
            watcher,
            watched_dirs: HashSet::new(),
        })
    }

    /// Starts watching the directory containing `file`. Watching the same
    /// directory twice is a no-op.
    pub fn watch_file(&mut self, file: &Path) -> Result<(), WatchError> {
        let dir = match file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => normalize_path(parent),
            _ => normalize_path(Path::new(".")),
        };
        if self.watched_dirs.contains(&dir) {
            return Ok(());
        }

        self.watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Watch {
                path: dir.clone(),
                source,
            })?;
        log::debug!("Watching '{}' for shader changes.", dir.display());
        self.watched_dirs.insert(dir);
        Ok(())
    }

    /// Directories currently watched.
    pub fn watched_dirs(&self) -> impl Iterator<Item = &Path> {
        self.watched_dirs.iter().map(PathBuf::as_path)
    }
}
