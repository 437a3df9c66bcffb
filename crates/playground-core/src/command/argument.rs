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

//! Dynamically typed command arguments, as edited through the UI.

use crate::resource::{ResourceKind, ResourceRef};
use std::fmt;

/// The type an argument slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentType {
    /// A valid resource of the given kind.
    Resource(ResourceKind),
    /// An unsigned counter.
    U32,
    /// A signed offset.
    I32,
}

impl fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentType::Resource(kind) => write!(f, "{kind}"),
            ArgumentType::U32 => f.write_str("u32"),
            ArgumentType::I32 => f.write_str("i32"),
        }
    }
}

/// The value of one command argument.
#[derive(Debug, Clone)]
pub enum Argument {
    /// A resource reference.
    Resource(ResourceRef),
    /// An unsigned counter.
    U32(u32),
    /// A signed offset.
    I32(i32),
}

impl Argument {
    /// The type of this value.
    pub fn argument_type(&self) -> ArgumentType {
        match self {
            Argument::Resource(r) => ArgumentType::Resource(r.kind()),
            Argument::U32(_) => ArgumentType::U32,
            Argument::I32(_) => ArgumentType::I32,
        }
    }
}

impl PartialEq for Argument {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Argument::Resource(a), Argument::Resource(b)) => std::sync::Arc::ptr_eq(a, b),
            (Argument::U32(a), Argument::U32(b)) => a == b,
            (Argument::I32(a), Argument::I32(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Resource(r) => f.write_str(r.name()),
            Argument::U32(v) => write!(f, "{v}"),
            Argument::I32(v) => write!(f, "{v}"),
        }
    }
}

/// Misuse of the argument editing API. The command is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// The sequence has no command at this position.
    NoSuchCommand {
        /// Requested command index.
        index: usize,
        /// Length of the sequence.
        len: usize,
    },
    /// The command has no argument at this position.
    OutOfRange {
        /// Requested argument index.
        index: usize,
        /// Number of arguments of the command.
        count: usize,
    },
    /// The value does not have the slot's type.
    TypeMismatch {
        /// Argument index.
        index: usize,
        /// Type of the slot.
        expected: ArgumentType,
        /// Type of the supplied value.
        found: ArgumentType,
    },
    /// The supplied resource was invalidated or is a placeholder.
    InvalidResource {
        /// Argument index.
        index: usize,
        /// Name of the rejected resource.
        name: String,
    },
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentError::NoSuchCommand { index, len } => {
                write!(f, "No command #{index:03} in a sequence of {len}")
            }
            ArgumentError::OutOfRange { index, count } => {
                write!(f, "Argument {index} out of range (command has {count})")
            }
            ArgumentError::TypeMismatch {
                index,
                expected,
                found,
            } => write!(f, "Argument {index} expects {expected}, got {found}"),
            ArgumentError::InvalidResource { index, name } => {
                write!(f, "Argument {index}: resource '{name}' is not valid")
            }
        }
    }
}

impl std::error::Error for ArgumentError {}
