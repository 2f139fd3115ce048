//! The NBR (binary resource) container format.
//!
//! An `.nbr*` file is a fixed 7-byte header followed by exactly one
//! length-prefixed payload. Each payload module defines one `Nbr*` struct and
//! its codec pair; [`container`] ties them together behind the [`NbrPayload`]
//! sum and the [`NbrFile`] save/load entry points.

mod animation;
mod audio;
mod container;
mod cubemap;
mod font;
mod header;
mod material;
mod mesh;
mod model;
mod shader;
mod texture;

pub use animation::{NbrAnimation, NbrJoint};
pub use audio::{AudioFormat, NbrAudio};
pub use container::{extension_kind, valid_extension, NbrFile, NbrPayload};
pub use cubemap::{NbrCubemap, CUBEMAP_FACES_MAX};
pub use font::{NbrFont, NbrGlyph};
pub use header::{
    NbrHeader, ResourceKind, NBR_IDENTIFIER, NBR_MAJOR_VERSION, NBR_MINOR_VERSION,
};
pub use material::NbrMaterial;
pub use mesh::{
    vertex_floats, vertex_stride, NbrMesh, VERTEX_COLOR0, VERTEX_COLOR1, VERTEX_COMPONENTS_ALL,
    VERTEX_NORMAL, VERTEX_POSITION, VERTEX_TANGENT, VERTEX_UV,
};
pub use model::NbrModel;
pub use shader::NbrShader;
pub use texture::{NbrTexture, PixelFormat};
