//! nbr-export - NBR asset export tool
//!
//! Converts raw assets (images, glTF, TTF, WAV/MP3/OGG, GLSL) to NBR binary
//! resources (.nbrtexture, .nbrcubemap, .nbrmodel, .nbranimation, .nbrfont,
//! .nbraudio, .nbrshader).

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use boreal_common::{NbrFile, NbrPayload};
use nbr_export::{animation, audio, font, image, manifest, model, shader};

#[derive(Parser)]
#[command(name = "nbr-export")]
#[command(about = "NBR asset export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build assets from a manifest file
    Build {
        /// Path to assets.toml manifest
        #[arg(default_value = "assets.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate manifest without building
    Check {
        /// Path to assets.toml manifest
        #[arg(default_value = "assets.toml")]
        manifest: PathBuf,
    },

    /// Export a single image file
    Texture {
        /// Input image file (png/jpg/bmp/tga/gif/hdr/ppm/pgm)
        input: PathBuf,

        /// Output .nbrtexture file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export a directory of six face images
    Cubemap {
        /// Directory holding the six faces
        input: PathBuf,

        /// Output .nbrcubemap file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export a glTF/GLB model
    Model {
        /// Input glTF/GLB file
        input: PathBuf,

        /// Output .nbrmodel file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Global import scale applied to vertex positions
        #[arg(short, long, default_value_t = 1.0)]
        scale: f32,
    },

    /// Export an animation clip from glTF
    Animation {
        /// Input glTF/GLB file
        input: PathBuf,

        /// Output .nbranimation file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Animation index (default: first animation)
        #[arg(short, long)]
        animation: Option<usize>,

        /// Frame rate recorded for playback (default: 30)
        #[arg(short, long)]
        frame_rate: Option<f32>,

        /// List available animations instead of exporting
        #[arg(long)]
        list: bool,
    },

    /// Export a TrueType font
    Font {
        /// Input TTF/OTF file
        input: PathBuf,

        /// Output .nbrfont file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export an audio file
    Audio {
        /// Input WAV/MP3/OGG file
        input: PathBuf,

        /// Output .nbraudio file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export a combined GLSL source file
    Shader {
        /// Input .glsl file with #shader sections
        input: PathBuf,

        /// Output .nbrshader file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Default output path: next to the input, renamed by the container layer.
fn output_path(input: &Path, output: Option<PathBuf>) -> PathBuf {
    output.unwrap_or_else(|| input.to_path_buf())
}

fn save(payload: NbrPayload, input: &Path, output: Option<PathBuf>) -> Result<()> {
    let written = NbrFile::save(&payload, &output_path(input, output))?;
    tracing::info!("wrote '{}'", written.display());
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build { manifest, output } => {
            let config = manifest::Manifest::load(&manifest)?;
            let base_dir = manifest.parent().unwrap_or(Path::new("."));
            manifest::build_all(&config, base_dir, output.as_deref())?;
        }

        Commands::Check { manifest } => {
            let config = manifest::Manifest::load(&manifest)?;
            let base_dir = manifest.parent().unwrap_or(Path::new("."));
            let missing = config.missing_sources(base_dir);

            if missing.is_empty() {
                tracing::info!("manifest OK: {} asset(s)", config.asset_count());
            } else {
                for path in &missing {
                    tracing::error!("missing source asset '{}'", path.display());
                }
                anyhow::bail!("{} source asset(s) missing", missing.len());
            }
        }

        Commands::Texture { input, output } => {
            let texture = image::convert_image(&input)?;
            save(NbrPayload::Texture(texture), &input, output)?;
        }

        Commands::Cubemap { input, output } => {
            let cubemap = image::convert_cubemap_dir(&input)?;
            let fallback = input.join("cubemap");
            let target = output.unwrap_or(fallback);
            let written = NbrFile::save(&NbrPayload::Cubemap(cubemap), &target)?;
            tracing::info!("wrote '{}'", written.display());
        }

        Commands::Model {
            input,
            output,
            scale,
        } => {
            let converted = model::convert_gltf_model(&input, scale)?;
            save(NbrPayload::Model(converted), &input, output)?;
        }

        Commands::Animation {
            input,
            output,
            animation: index,
            frame_rate,
            list,
        } => {
            if list {
                animation::list_animations(&input)?;
            } else {
                let clip = animation::convert_gltf_animation(&input, index, frame_rate)?;
                save(NbrPayload::Animation(clip), &input, output)?;
            }
        }

        Commands::Font { input, output } => {
            let converted = font::convert_font(&input)?;
            save(NbrPayload::Font(converted), &input, output)?;
        }

        Commands::Audio { input, output } => {
            let clip = audio::convert_audio(&input)?;
            save(NbrPayload::Audio(clip), &input, output)?;
        }

        Commands::Shader { input, output } => {
            let sources = shader::convert_shader_source(&input)?;
            save(NbrPayload::Shader(sources), &input, output)?;
        }
    }

    Ok(())
}
