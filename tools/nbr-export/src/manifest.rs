//! Manifest-driven batch builds.
//!
//! An `assets.toml` lists every source asset by class; `build_all` converts
//! the lot into an output directory of `.nbr*` files. Entries name their
//! output after the source file's stem unless overridden.
//!
//! ```toml
//! [output]
//! dir = "assets_out"
//!
//! [[texture]]
//! path = "textures/wall.png"
//!
//! [[model]]
//! path = "models/crates.glb"
//! scale = 0.01
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use boreal_common::{NbrFile, NbrPayload};

use crate::{animation, audio, font, image, model, shader};

#[derive(Debug, Deserialize)]
pub struct Manifest {
    pub output: OutputSection,

    #[serde(default, rename = "texture")]
    pub textures: Vec<AssetEntry>,
    #[serde(default, rename = "cubemap")]
    pub cubemaps: Vec<CubemapEntry>,
    #[serde(default, rename = "model")]
    pub models: Vec<ModelEntry>,
    #[serde(default, rename = "animation")]
    pub animations: Vec<AnimationEntry>,
    #[serde(default, rename = "font")]
    pub fonts: Vec<AssetEntry>,
    #[serde(default, rename = "audio")]
    pub audio: Vec<AssetEntry>,
    #[serde(default, rename = "shader")]
    pub shaders: Vec<AssetEntry>,
}

#[derive(Debug, Deserialize)]
pub struct OutputSection {
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct AssetEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CubemapEntry {
    pub dir: PathBuf,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ModelEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_scale")]
    pub scale: f32,
}

#[derive(Debug, Deserialize)]
pub struct AnimationEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub frame_rate: Option<f32>,
}

fn default_scale() -> f32 {
    1.0
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("could not read manifest '{}'", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("could not parse manifest '{}'", path.display()))
    }

    pub fn asset_count(&self) -> usize {
        self.textures.len()
            + self.cubemaps.len()
            + self.models.len()
            + self.animations.len()
            + self.fonts.len()
            + self.audio.len()
            + self.shaders.len()
    }

    /// Source paths that do not exist on disk; empty means the manifest is
    /// buildable.
    pub fn missing_sources(&self, base_dir: &Path) -> Vec<PathBuf> {
        let mut missing = Vec::new();
        let mut check = |path: &Path| {
            let full = base_dir.join(path);
            if !full.exists() {
                missing.push(full);
            }
        };

        for entry in &self.textures {
            check(&entry.path);
        }
        for entry in &self.cubemaps {
            check(&entry.dir);
        }
        for entry in &self.models {
            check(&entry.path);
        }
        for entry in &self.animations {
            check(&entry.path);
        }
        for entry in &self.fonts {
            check(&entry.path);
        }
        for entry in &self.audio {
            check(&entry.path);
        }
        for entry in &self.shaders {
            check(&entry.path);
        }
        missing
    }
}

fn output_stem(source: &Path, name: &Option<String>) -> Result<String> {
    if let Some(name) = name {
        return Ok(name.clone());
    }
    source
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_owned)
        .with_context(|| format!("cannot derive a name from '{}'", source.display()))
}

/// Convert every asset the manifest names. `output_override` replaces the
/// manifest's output directory.
pub fn build_all(
    manifest: &Manifest,
    base_dir: &Path,
    output_override: Option<&Path>,
) -> Result<()> {
    let out_dir = output_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| base_dir.join(&manifest.output.dir));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("could not create output directory '{}'", out_dir.display()))?;

    let missing = manifest.missing_sources(base_dir);
    if !missing.is_empty() {
        for path in &missing {
            tracing::error!("missing source asset '{}'", path.display());
        }
        bail!("{} source asset(s) missing", missing.len());
    }

    for entry in &manifest.textures {
        let texture = image::convert_image(&base_dir.join(&entry.path))?;
        let stem = output_stem(&entry.path, &entry.name)?;
        NbrFile::save(&NbrPayload::Texture(texture), &out_dir.join(stem))?;
    }

    for entry in &manifest.cubemaps {
        let cubemap = image::convert_cubemap_dir(&base_dir.join(&entry.dir))?;
        let stem = output_stem(&entry.dir, &entry.name)?;
        NbrFile::save(&NbrPayload::Cubemap(cubemap), &out_dir.join(stem))?;
    }

    for entry in &manifest.models {
        let model = model::convert_gltf_model(&base_dir.join(&entry.path), entry.scale)?;
        let stem = output_stem(&entry.path, &entry.name)?;
        NbrFile::save(&NbrPayload::Model(model), &out_dir.join(stem))?;
    }

    for entry in &manifest.animations {
        let clip = animation::convert_gltf_animation(
            &base_dir.join(&entry.path),
            entry.index,
            entry.frame_rate,
        )?;
        let stem = output_stem(&entry.path, &entry.name)?;
        NbrFile::save(&NbrPayload::Animation(clip), &out_dir.join(stem))?;
    }

    for entry in &manifest.fonts {
        let font = font::convert_font(&base_dir.join(&entry.path))?;
        let stem = output_stem(&entry.path, &entry.name)?;
        NbrFile::save(&NbrPayload::Font(font), &out_dir.join(stem))?;
    }

    for entry in &manifest.audio {
        let clip = audio::convert_audio(&base_dir.join(&entry.path))?;
        let stem = output_stem(&entry.path, &entry.name)?;
        NbrFile::save(&NbrPayload::Audio(clip), &out_dir.join(stem))?;
    }

    for entry in &manifest.shaders {
        let sources = shader::convert_shader_source(&base_dir.join(&entry.path))?;
        let stem = output_stem(&entry.path, &entry.name)?;
        NbrFile::save(&NbrPayload::Shader(sources), &out_dir.join(stem))?;
    }

    tracing::info!(
        "built {} asset(s) into '{}'",
        manifest.asset_count(),
        out_dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
[output]
dir = "out"

[[texture]]
path = "wall.png"

[[texture]]
path = "floor.png"
name = "ground"

[[audio]]
path = "beep.wav"

[[shader]]
path = "basic.glsl"
"#;

    #[test]
    fn manifest_parses_and_counts() {
        let manifest: Manifest = toml::from_str(SAMPLE).unwrap();
        assert_eq!(manifest.output.dir, PathBuf::from("out"));
        assert_eq!(manifest.textures.len(), 2);
        assert_eq!(manifest.textures[1].name.as_deref(), Some("ground"));
        assert_eq!(manifest.asset_count(), 4);
    }

    #[test]
    fn missing_sources_are_reported() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("wall.png"), b"stub").unwrap();

        let manifest: Manifest = toml::from_str(SAMPLE).unwrap();
        let missing = manifest.missing_sources(dir.path());

        // Everything except wall.png is absent.
        assert_eq!(missing.len(), 3);
    }

    #[test]
    fn build_all_produces_nbr_files() {
        let dir = TempDir::new().unwrap();

        // A real PNG, WAV, and GLSL source.
        ::image::RgbaImage::from_pixel(2, 2, ::image::Rgba([10, 20, 30, 255]))
            .save(dir.path().join("wall.png"))
            .unwrap();
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(dir.path().join("beep.wav"), spec).unwrap();
        writer.write_sample(1234i16).unwrap();
        writer.finalize().unwrap();
        std::fs::write(
            dir.path().join("basic.glsl"),
            "#shader vertex\nv\n#shader pixel\np\n",
        )
        .unwrap();

        let manifest: Manifest = toml::from_str(
            r#"
[output]
dir = "out"

[[texture]]
path = "wall.png"

[[audio]]
path = "beep.wav"

[[shader]]
path = "basic.glsl"
"#,
        )
        .unwrap();

        build_all(&manifest, dir.path(), None).unwrap();

        let out = dir.path().join("out");
        assert!(out.join("wall.nbrtexture").exists());
        assert!(out.join("beep.nbraudio").exists());
        assert!(out.join("basic.nbrshader").exists());

        // Outputs are loadable containers.
        assert!(NbrFile::load(&out.join("wall.nbrtexture")).is_ok());
        assert!(NbrFile::load(&out.join("beep.nbraudio")).is_ok());
        assert!(NbrFile::load(&out.join("basic.nbrshader")).is_ok());
    }
}
