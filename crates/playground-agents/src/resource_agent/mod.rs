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

//! Creation of playground resources.
//!
//! [`ResourceAgent`] turns pipeline parameters, OBJ files and procedural
//! grids into registered resources, and enrolls new pipelines with the
//! shader reload worker.

mod agent;
mod mesh;

pub use self::agent::ResourceAgent;
pub use self::mesh::MeshData;

use playground_core::renderer::ResourceError;
use std::path::PathBuf;

/// Failures while building a model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The OBJ file could not be read or parsed.
    #[error("failed to load '{path}': {source}")]
    Obj {
        /// The file.
        path: PathBuf,
        /// The parser error.
        #[source]
        source: tobj::LoadError,
    },
    /// The file parsed but holds no triangle.
    #[error("'{path}' contains no geometry")]
    NoGeometry {
        /// The file.
        path: PathBuf,
    },
    /// A grid needs at least one cell in each direction.
    #[error("a grid needs at least one column and one row (got {columns}x{rows})")]
    EmptyGrid {
        /// Requested columns.
        columns: u32,
        /// Requested rows.
        rows: u32,
    },
    /// The mesh has more vertices than 32-bit indices can address.
    #[error("mesh has {0} vertices, more than 32-bit indices can address")]
    TooLarge(usize),
    /// An index points past the end of the vertex list.
    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// The offending index.
        index: u32,
        /// Number of vertices.
        vertex_count: usize,
    },
    /// Buffer creation failed.
    #[error(transparent)]
    Upload(#[from] ResourceError),
}
