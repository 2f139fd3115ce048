//! Boreal binary resource (NBR) support crate.
//!
//! Everything the offline toolchain and the engine runtime share lives here:
//! the typed little-endian byte I/O layer, the NBR container (header +
//! per-type payload codecs), and the engine value types that round-trip
//! through scene files.
//!
//! The wire format is little-endian and tightly packed on every host; the
//! codecs in [`formats`] are the only definition of the on-disk layout.

pub mod error;
pub mod formats;
pub mod io;
pub mod values;

pub use error::NbrError;
pub use formats::{
    extension_kind, valid_extension, vertex_floats, vertex_stride, AudioFormat, NbrAnimation,
    NbrAudio, NbrCubemap, NbrFile, NbrFont, NbrGlyph, NbrHeader, NbrJoint, NbrMaterial, NbrMesh,
    NbrModel, NbrPayload, NbrShader, NbrTexture, PixelFormat, ResourceKind, CUBEMAP_FACES_MAX,
    NBR_IDENTIFIER, NBR_MAJOR_VERSION, NBR_MINOR_VERSION, VERTEX_COLOR0, VERTEX_COLOR1,
    VERTEX_COMPONENTS_ALL, VERTEX_NORMAL, VERTEX_POSITION, VERTEX_TANGENT, VERTEX_UV,
};
