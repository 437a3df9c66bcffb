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

//! # Playground Infra
//!
//! Concrete implementations of the contracts declared in `playground-core`:
//! a wgpu graphics device and command sink, a naga shader front-end, a winit
//! window with keyboard translation, and a `notify` shader watcher.

pub mod graphics;
pub mod platform;
pub mod shader;
pub mod watch;

pub use graphics::wgpu::{WgpuCommandSink, WgpuDevice, WgpuGraphicsContext, WgpuRenderer};
pub use platform::input::{translate_winit_input, InputEvent, KeyCode};
pub use platform::window::{PlaygroundWindow, WinitWindowBuilder};
pub use watch::{normalize_path, ShaderWatcher, WatchError};
