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

//! Shader front-end: turns GLSL text or SPIR-V words into a validated naga
//! module.
//!
//! Everything here runs on the CPU, so compile errors surface as
//! [`ShaderError::CompilationError`] values before wgpu ever sees the code.

use naga::valid::{Capabilities, ValidationFlags, Validator};
use playground_core::renderer::{ShaderError, ShaderModuleDescriptor, ShaderSourceData, ShaderStage};

fn naga_stage(stage: ShaderStage, label: &str) -> Result<naga::ShaderStage, ShaderError> {
    match stage {
        ShaderStage::Vertex => Ok(naga::ShaderStage::Vertex),
        ShaderStage::Fragment => Ok(naga::ShaderStage::Fragment),
        ShaderStage::Geometry => Err(ShaderError::UnsupportedStage {
            label: label.to_string(),
            stage,
        }),
    }
}

/// Parses and validates the shader described by `descriptor`.
///
/// The module must contain an entry point named `descriptor.entry_point` for
/// `descriptor.stage`.
pub fn compile_module(descriptor: &ShaderModuleDescriptor<'_>) -> Result<naga::Module, ShaderError> {
    let label = descriptor.label.unwrap_or("<unnamed shader>");
    let stage = naga_stage(descriptor.stage, label)?;
    let compilation_error = |details: String| ShaderError::CompilationError {
        label: label.to_string(),
        details,
    };

    let (module, glsl_text) = match &descriptor.source {
        ShaderSourceData::Glsl(text) => {
            let mut frontend = naga::front::glsl::Frontend::default();
            let module = frontend
                .parse(&naga::front::glsl::Options::from(stage), text)
                .map_err(|e| compilation_error(e.emit_to_string(text)))?;
            (module, Some(text.as_ref()))
        }
        ShaderSourceData::SpirV(words) => {
            let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
            let module =
                naga::front::spv::parse_u8_slice(&bytes, &naga::front::spv::Options::default())
                    .map_err(|e| compilation_error(e.to_string()))?;
            (module, None)
        }
    };

    if !module
        .entry_points
        .iter()
        .any(|ep| ep.stage == stage && ep.name == descriptor.entry_point)
    {
        return Err(compilation_error(format!(
            "no {} entry point named '{}'",
            descriptor.stage, descriptor.entry_point
        )));
    }

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| match glsl_text {
            Some(text) => compilation_error(e.emit_to_string(text)),
            None => compilation_error(e.to_string()),
        })?;

    log::debug!(
        "Shader '{label}' compiled: {} function(s), {} global(s).",
        module.functions.len(),
        module.global_variables.len()
    );
    Ok(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    const VERTEX: &str = "#version 450
void main() {
    float x = float(gl_VertexIndex) - 1.0;
    gl_Position = vec4(x * 0.5, 0.0, 0.0, 1.0);
}
";

    const FRAGMENT: &str = "#version 450
layout(location = 0) out vec4 color;
void main() {
    color = vec4(1.0, 0.5, 0.2, 1.0);
}
";

    fn glsl<'a>(label: &'a str, text: &'a str, stage: ShaderStage) -> ShaderModuleDescriptor<'a> {
        ShaderModuleDescriptor {
            label: Some(label),
            source: ShaderSourceData::Glsl(Cow::Borrowed(text)),
            stage,
            entry_point: "main",
        }
    }

    #[test]
    fn vertex_and_fragment_glsl_compile() {
        let vs = compile_module(&glsl("tri.vert", VERTEX, ShaderStage::Vertex)).unwrap();
        assert_eq!(vs.entry_points.len(), 1);
        assert_eq!(vs.entry_points[0].stage, naga::ShaderStage::Vertex);

        let fs = compile_module(&glsl("tri.frag", FRAGMENT, ShaderStage::Fragment)).unwrap();
        assert_eq!(fs.entry_points[0].stage, naga::ShaderStage::Fragment);
    }

    #[test]
    fn syntax_errors_name_the_shader() {
        let err = compile_module(&glsl(
            "broken.frag",
            "#version 450\nvoid main( {\n",
            ShaderStage::Fragment,
        ))
        .unwrap_err();
        match err {
            ShaderError::CompilationError { label, details } => {
                assert_eq!(label, "broken.frag");
                assert!(!details.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn geometry_stage_is_rejected() {
        let err = compile_module(&glsl("normals.geom", VERTEX, ShaderStage::Geometry)).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::UnsupportedStage {
                stage: ShaderStage::Geometry,
                ..
            }
        ));
    }

    #[test]
    fn unknown_entry_point_is_a_compile_error() {
        let mut descriptor = glsl("tri.vert", VERTEX, ShaderStage::Vertex);
        descriptor.entry_point = "vs_main";
        let err = compile_module(&descriptor).unwrap_err();
        assert!(err.to_string().contains("vs_main"));
    }

    #[test]
    fn garbage_spirv_is_a_compile_error() {
        let words = [0x0723_0203u32, 0x0001_0000, 0, 0];
        let descriptor = ShaderModuleDescriptor {
            label: Some("tri.vert.spv"),
            source: ShaderSourceData::SpirV(Cow::Borrowed(&words)),
            stage: ShaderStage::Vertex,
            entry_point: "main",
        };
        assert!(matches!(
            compile_module(&descriptor),
            Err(ShaderError::CompilationError { .. })
        ));
    }
}
