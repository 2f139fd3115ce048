//! nbr-export library
//!
//! Converts third-party assets (images, cubemap directories, glTF scenes and
//! animations, TrueType fonts, WAV/MP3/OGG audio, combined GLSL sources)
//! into NBR binary resources. Importers are pure with respect to the engine
//! runtime: they only produce payloads and hand them to the container layer.

pub mod animation;
pub mod audio;
pub mod font;
pub mod image;
pub mod manifest;
pub mod model;
pub mod shader;

pub use animation::convert_gltf_animation;
pub use audio::convert_audio;
pub use font::convert_font;
pub use image::{convert_cubemap_dir, convert_image};
pub use model::convert_gltf_model;
pub use shader::convert_shader_source;
