//! Combined GLSL source splitting.
//!
//! A single `.glsl` file carries every stage, separated by marker lines:
//!
//! ```text
//! #shader vertex
//! ...
//! #shader pixel
//! ...
//! ```
//!
//! A file with a `#shader compute` section must contain only that section.

use std::path::Path;

use anyhow::{bail, Context, Result};

use boreal_common::NbrShader;

const MARKER: &str = "#shader";

/// Split a combined GLSL file into a shader payload.
pub fn convert_shader_source(input: &Path) -> Result<NbrShader> {
    let source = std::fs::read_to_string(input)
        .with_context(|| format!("could not read shader source '{}'", input.display()))?;
    split_source(&source)
        .with_context(|| format!("could not split shader source '{}'", input.display()))
}

#[derive(Clone, Copy, PartialEq)]
enum Stage {
    Vertex,
    Pixel,
    Compute,
}

fn split_source(source: &str) -> Result<NbrShader> {
    let mut sections: [Option<String>; 3] = [None, None, None];
    let mut current: Option<Stage> = None;

    for (line_number, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        if let Some(stage_name) = trimmed.strip_prefix(MARKER) {
            let stage = match stage_name.trim() {
                "vertex" => Stage::Vertex,
                "pixel" | "fragment" => Stage::Pixel,
                "compute" => Stage::Compute,
                other => bail!("unknown shader stage '{other}' on line {}", line_number + 1),
            };
            if sections[stage as usize].is_some() {
                bail!(
                    "duplicate '#shader {}' section on line {}",
                    stage_name.trim(),
                    line_number + 1
                );
            }
            sections[stage as usize] = Some(String::new());
            current = Some(stage);
            continue;
        }

        match current {
            Some(stage) => {
                let section = sections[stage as usize].as_mut().unwrap();
                section.push_str(line);
                section.push('\n');
            }
            None if trimmed.is_empty() => {}
            None => bail!(
                "source before the first '#shader' marker on line {}",
                line_number + 1
            ),
        }
    }

    let [vertex, pixel, compute] = sections.map(|s| s.map(|text| text.trim().to_owned()));

    match (vertex, pixel, compute) {
        (None, None, Some(source)) if !source.is_empty() => Ok(NbrShader::Compute { source }),
        (Some(vertex), Some(pixel), None) => {
            if vertex.is_empty() || pixel.is_empty() {
                bail!("vertex and pixel sections must both be non-empty");
            }
            Ok(NbrShader::Render { vertex, pixel })
        }
        (None, None, None) => bail!("no '#shader' sections found"),
        _ => bail!("a shader is either compute-only or a vertex/pixel pair"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_vertex_and_pixel() {
        let source = "\
#shader vertex
#version 420 core
void main() { gl_Position = vec4(0); }

#shader pixel
#version 420 core
void main() {}
";
        let NbrShader::Render { vertex, pixel } = split_source(source).unwrap() else {
            panic!("expected a render pair");
        };
        assert!(vertex.starts_with("#version 420 core"));
        assert!(vertex.contains("gl_Position"));
        assert!(pixel.ends_with("void main() {}"));
    }

    #[test]
    fn fragment_is_an_alias_for_pixel() {
        let source = "#shader vertex\nv\n#shader fragment\np\n";
        assert!(matches!(
            split_source(source).unwrap(),
            NbrShader::Render { .. }
        ));
    }

    #[test]
    fn compute_section_stands_alone() {
        let source = "#shader compute\n#version 430\nvoid main() {}\n";
        let NbrShader::Compute { source } = split_source(source).unwrap() else {
            panic!("expected a compute shader");
        };
        assert!(source.contains("#version 430"));
    }

    #[test]
    fn compute_mixed_with_render_stages_rejected() {
        let source = "#shader vertex\nv\n#shader compute\nc\n";
        assert!(split_source(source).is_err());
    }

    #[test]
    fn missing_pixel_section_rejected() {
        assert!(split_source("#shader vertex\nv\n").is_err());
    }

    #[test]
    fn unknown_stage_rejected() {
        assert!(split_source("#shader geometry\ng\n").is_err());
    }

    #[test]
    fn code_before_first_marker_rejected() {
        assert!(split_source("void main() {}\n#shader vertex\nv\n").is_err());
    }

    #[test]
    fn duplicate_sections_rejected() {
        assert!(split_source("#shader vertex\na\n#shader vertex\nb\n#shader pixel\np\n").is_err());
    }
}
