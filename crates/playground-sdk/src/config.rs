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

//! Application settings, read from a RON file.

use playground_core::renderer::GraphicsBackend;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors while reading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config '{path}': {source}")]
    Io {
        /// The file.
        path: PathBuf,
        /// The I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid RON for [`PlaygroundConfig`].
    #[error("invalid config '{path}': {source}")]
    Parse {
        /// The file.
        path: PathBuf,
        /// The parser error.
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Settings of a playground run. Every field has a default, so a config file
/// only lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaygroundConfig {
    /// Window title.
    pub window_title: String,
    /// Initial window width.
    pub window_width: u32,
    /// Initial window height.
    pub window_height: u32,
    /// Which graphics API to request.
    pub backend: GraphicsBackend,
    /// Delay between deleting a resource and releasing its GPU objects.
    pub destroy_grace_ms: u64,
    /// Background color of the render pass.
    pub clear_color: [f64; 4],
    /// Session applied at startup.
    pub session: Option<PathBuf>,
    /// Rebuild pipelines when their shader files change.
    pub watch_shaders: bool,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            window_title: "VkPlayground".to_string(),
            window_width: 1280,
            window_height: 720,
            backend: GraphicsBackend::Vulkan,
            destroy_grace_ms: Self::MIN_GRACE_MS,
            clear_color: [0.1, 0.1, 0.1, 1.0],
            session: None,
            watch_shaders: true,
        }
    }
}

impl PlaygroundConfig {
    /// Shortest accepted grace delay. GPU work referencing a resource may
    /// still be in flight for about this long.
    pub const MIN_GRACE_MS: u64 = 1000;

    /// Reads a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = ron::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded config from '{}'.", path.display());
        Ok(config.validated())
    }

    /// Raises out-of-range values to their minimum, with a warning.
    pub fn validated(mut self) -> Self {
        if self.destroy_grace_ms < Self::MIN_GRACE_MS {
            log::warn!(
                "destroy_grace_ms = {} is too short; using {}.",
                self.destroy_grace_ms,
                Self::MIN_GRACE_MS
            );
            self.destroy_grace_ms = Self::MIN_GRACE_MS;
        }
        if self.window_width == 0 || self.window_height == 0 {
            log::warn!(
                "Window size {}x{} is empty; using 1280x720.",
                self.window_width,
                self.window_height
            );
            self.window_width = 1280;
            self.window_height = 720;
        }
        self
    }

    /// The grace delay handed to the resource reaper.
    pub fn destroy_grace(&self) -> Duration {
        Duration::from_millis(self.destroy_grace_ms)
    }
}
