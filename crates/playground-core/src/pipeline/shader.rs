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

use crate::renderer::{ShaderError, ShaderSourceData, ShaderStage};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Deduces the stage from a file name: `.vert`, `.frag` or `.geom`,
/// optionally followed by `.spv`.
pub fn stage_from_path(path: &Path) -> Option<ShaderStage> {
    let name = path.file_name()?.to_str()?;
    let name = name.strip_suffix(".spv").unwrap_or(name);
    match Path::new(name).extension()?.to_str()? {
        "vert" => Some(ShaderStage::Vertex),
        "frag" => Some(ShaderStage::Fragment),
        "geom" => Some(ShaderStage::Geometry),
        _ => None,
    }
}

/// Reads a shader from disk. `.spv` files are SPIR-V binaries, anything else
/// is GLSL text.
pub fn load_shader_source(path: &Path) -> Result<ShaderSourceData<'static>, ShaderError> {
    let load_error = |source_error: String| ShaderError::LoadError {
        path: path.display().to_string(),
        source_error,
    };

    if path.extension().and_then(|e| e.to_str()) == Some("spv") {
        let bytes = fs::read(path).map_err(|e| load_error(e.to_string()))?;
        if bytes.len() % 4 != 0 {
            return Err(load_error(format!(
                "SPIR-V size {} is not a multiple of 4",
                bytes.len()
            )));
        }
        let words: Vec<u32> = bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        if words.first() != Some(&SPIRV_MAGIC) {
            return Err(load_error("missing SPIR-V magic number".to_string()));
        }
        Ok(ShaderSourceData::SpirV(Cow::Owned(words)))
    } else {
        let text = fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        Ok(ShaderSourceData::Glsl(Cow::Owned(text)))
    }
}
