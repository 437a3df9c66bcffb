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

//! Translation from `winit` window events to the playground's input events.
//!
//! Only the keys the editor binds are named; everything else is reported as
//! [`KeyCode::Other`].

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode as WinitKeyCode, PhysicalKey};

/// A keyboard key, by physical position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyCode {
    B,
    D,
    I,
    L,
    P,
    X,
    Up,
    Down,
    Space,
    Delete,
    Backspace,
    /// `+` on the main row (`=` key) or the keypad.
    Plus,
    /// `-` on the main row or the keypad.
    Minus,
    Escape,
    /// Any other key, by its `winit` name.
    Other(String),
}

/// A user input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A key went down. Auto-repeat is not reported.
    KeyPressed {
        key: KeyCode,
    },
    /// The set of held modifiers changed.
    ModifiersChanged {
        shift: bool,
    },
}

/// Translates a `winit` window event, returning `None` for anything that is
/// not keyboard input.
pub fn translate_winit_input(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::KeyboardInput {
            event: key_event, ..
        } => match (key_event.physical_key, key_event.state) {
            (PhysicalKey::Code(code), ElementState::Pressed) if !key_event.repeat => {
                Some(InputEvent::KeyPressed {
                    key: map_keycode(code),
                })
            }
            _ => None,
        },
        WindowEvent::ModifiersChanged(modifiers) => Some(InputEvent::ModifiersChanged {
            shift: modifiers.state().shift_key(),
        }),
        _ => None,
    }
}

fn map_keycode(code: WinitKeyCode) -> KeyCode {
    match code {
        WinitKeyCode::KeyB => KeyCode::B,
        WinitKeyCode::KeyD => KeyCode::D,
        WinitKeyCode::KeyI => KeyCode::I,
        WinitKeyCode::KeyL => KeyCode::L,
        WinitKeyCode::KeyP => KeyCode::P,
        WinitKeyCode::KeyX => KeyCode::X,
        WinitKeyCode::ArrowUp => KeyCode::Up,
        WinitKeyCode::ArrowDown => KeyCode::Down,
        WinitKeyCode::Space => KeyCode::Space,
        WinitKeyCode::Delete => KeyCode::Delete,
        WinitKeyCode::Backspace => KeyCode::Backspace,
        WinitKeyCode::Equal | WinitKeyCode::NumpadAdd => KeyCode::Plus,
        WinitKeyCode::Minus | WinitKeyCode::NumpadSubtract => KeyCode::Minus,
        WinitKeyCode::Escape => KeyCode::Escape,
        other => KeyCode::Other(format!("{other:?}")),
    }
}
