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

//! CPU-side mesh data: OBJ import and procedural grids.

use super::ModelError;
use playground_core::renderer::ModelVertex;
use std::path::Path;

/// Vertices and 32-bit triangle-list indices, ready for upload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    /// Interleaved position and normal.
    pub vertices: Vec<ModelVertex>,
    /// Triangle list indices into `vertices`.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Loads every object of an OBJ file into one mesh.
    ///
    /// Faces are triangulated and attributes are re-indexed so that a single
    /// index addresses position and normal. Missing normals are computed from
    /// the faces. Materials are ignored.
    pub fn from_obj(path: &Path) -> Result<Self, ModelError> {
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| ModelError::Obj {
            path: path.to_path_buf(),
            source,
        })?;

        let mut data = MeshData::default();
        for model in &models {
            let mesh = &model.mesh;
            let base = u32::try_from(data.vertices.len())
                .map_err(|_| ModelError::TooLarge(data.vertices.len()))?;
            let has_normals = mesh.normals.len() == mesh.positions.len();

            data.vertices.extend(
                mesh.positions
                    .chunks_exact(3)
                    .enumerate()
                    .map(|(i, p)| ModelVertex {
                        position: [p[0], p[1], p[2]],
                        normal: if has_normals {
                            [
                                mesh.normals[3 * i],
                                mesh.normals[3 * i + 1],
                                mesh.normals[3 * i + 2],
                            ]
                        } else {
                            [0.0; 3]
                        },
                    }),
            );
            data.indices.extend(mesh.indices.iter().map(|i| base + i));

            if !has_normals {
                let first = base as usize;
                let start = data.indices.len() - mesh.indices.len();
                let indices = data.indices[start..].to_vec();
                compute_normals(&mut data.vertices[first..], &indices, base);
            }
        }

        if data.indices.len() < 3 {
            return Err(ModelError::NoGeometry {
                path: path.to_path_buf(),
            });
        }
        data.validate()?;
        log::debug!(
            "Loaded '{}': {} object(s), {} vertices, {} indices.",
            path.display(),
            models.len(),
            data.vertices.len(),
            data.indices.len()
        );
        Ok(data)
    }

    /// A flat `columns` x `rows` grid spanning [-1, 1] on X and Z, facing +Y.
    pub fn grid(columns: u32, rows: u32) -> Result<Self, ModelError> {
        if columns == 0 || rows == 0 {
            return Err(ModelError::EmptyGrid { columns, rows });
        }
        let vertex_count = (columns as usize + 1) * (rows as usize + 1);
        if u32::try_from(vertex_count).is_err() {
            return Err(ModelError::TooLarge(vertex_count));
        }

        let mut vertices = Vec::with_capacity(vertex_count);
        for row in 0..=rows {
            let z = -1.0 + 2.0 * row as f32 / rows as f32;
            for column in 0..=columns {
                let x = -1.0 + 2.0 * column as f32 / columns as f32;
                vertices.push(ModelVertex {
                    position: [x, 0.0, z],
                    normal: [0.0, 1.0, 0.0],
                });
            }
        }

        let stride = columns + 1;
        let mut indices = Vec::with_capacity(columns as usize * rows as usize * 6);
        for row in 0..rows {
            for column in 0..columns {
                let a = row * stride + column;
                let b = a + 1;
                let c = a + stride;
                let d = c + 1;
                // Counter-clockwise seen from +Y.
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }

        Ok(Self { vertices, indices })
    }

    /// Number of indices, as recorded in the model handle.
    pub fn index_count(&self) -> Result<u32, ModelError> {
        u32::try_from(self.indices.len()).map_err(|_| ModelError::TooLarge(self.indices.len()))
    }

    /// Checks that every index addresses a vertex.
    pub fn validate(&self) -> Result<(), ModelError> {
        match self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.vertices.len())
        {
            Some(&index) => Err(ModelError::IndexOutOfRange {
                index,
                vertex_count: self.vertices.len(),
            }),
            None => Ok(()),
        }
    }
}

/// Area-weighted vertex normals. `indices` are offset by `base`.
fn compute_normals(vertices: &mut [ModelVertex], indices: &[u32], base: u32) {
    let sub = |a: [f32; 3], b: [f32; 3]| [a[0] - b[0], a[1] - b[1], a[2] - b[2]];
    for triangle in indices.chunks_exact(3) {
        let local: Vec<usize> = triangle.iter().map(|i| (i - base) as usize).collect();
        if local.iter().any(|&i| i >= vertices.len()) {
            continue;
        }
        let (p0, p1, p2) = (
            vertices[local[0]].position,
            vertices[local[1]].position,
            vertices[local[2]].position,
        );
        let (u, v) = (sub(p1, p0), sub(p2, p0));
        let n = [
            u[1] * v[2] - u[2] * v[1],
            u[2] * v[0] - u[0] * v[2],
            u[0] * v[1] - u[1] * v[0],
        ];
        for &i in &local {
            let normal = &mut vertices[i].normal;
            normal[0] += n[0];
            normal[1] += n[1];
            normal[2] += n[2];
        }
    }
    for vertex in vertices {
        let [x, y, z] = vertex.normal;
        let length = (x * x + y * y + z * z).sqrt();
        if length > f32::EPSILON {
            vertex.normal = [x / length, y / length, z / length];
        }
    }
}
