//! NBR file header (7 bytes, little-endian, packed).
//!
//! # Layout
//! ```text
//! 0x00: identifier    u8   (always 107)
//! 0x01: major_version i16
//! 0x03: minor_version i16
//! 0x05: resource_type u16
//! ```

use std::io::{Read, Write};
use std::path::Path;

use crate::io::{BinaryRead, BinaryWrite};
use crate::NbrError;

/// The byte at the top of every valid NBR file.
///
/// The value is the averaged sum of the ASCII codes of `n`, `b`, and `r`.
pub const NBR_IDENTIFIER: u8 = 107;

/// Major version emitted by this build; loads require an exact match.
pub const NBR_MAJOR_VERSION: i16 = 1;

/// Minor version emitted by this build; loads require an exact match.
pub const NBR_MINOR_VERSION: i16 = 0;

/// Discriminates every resource family the engine knows about.
///
/// The numeric value doubles as the `resource_type` tag in NBR headers for
/// the kinds that exist as standalone files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ResourceKind {
    Buffer = 1,
    Texture = 2,
    Cubemap = 3,
    Shader = 4,
    Mesh = 5,
    Material = 6,
    Skybox = 7,
    Model = 8,
    Font = 9,
    ShaderContext = 10,
    AudioBuffer = 11,
    Animation = 12,
}

impl ResourceKind {
    /// Decode a header tag; `None` for unknown values.
    pub fn from_tag(tag: u16) -> Option<Self> {
        Some(match tag {
            1 => Self::Buffer,
            2 => Self::Texture,
            3 => Self::Cubemap,
            4 => Self::Shader,
            5 => Self::Mesh,
            6 => Self::Material,
            7 => Self::Skybox,
            8 => Self::Model,
            9 => Self::Font,
            10 => Self::ShaderContext,
            11 => Self::AudioBuffer,
            12 => Self::Animation,
            _ => return None,
        })
    }

    pub fn tag(self) -> u16 {
        self as u16
    }

    /// The file extension for kinds that exist as standalone `.nbr*` files.
    ///
    /// Mesh and Material only occur embedded in models; Buffer, Skybox and
    /// ShaderContext are runtime-only constructions.
    pub fn extension(self) -> Option<&'static str> {
        Some(match self {
            Self::Texture => "nbrtexture",
            Self::Cubemap => "nbrcubemap",
            Self::Shader => "nbrshader",
            Self::Model => "nbrmodel",
            Self::Font => "nbrfont",
            Self::AudioBuffer => "nbraudio",
            Self::Animation => "nbranimation",
            _ => return None,
        })
    }
}

/// The fixed header at the start of every NBR file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NbrHeader {
    pub identifier: u8,
    pub major_version: i16,
    pub minor_version: i16,
    pub resource_type: u16,
}

impl NbrHeader {
    pub const SIZE: usize = 7;

    /// Header for a fresh file of the given kind, stamped with the compiled-in
    /// identifier and version constants.
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            identifier: NBR_IDENTIFIER,
            major_version: NBR_MAJOR_VERSION,
            minor_version: NBR_MINOR_VERSION,
            resource_type: kind.tag(),
        }
    }

    pub fn write_into<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        w.write_u8(self.identifier)?;
        w.write_i16(self.major_version)?;
        w.write_i16(self.minor_version)?;
        w.write_u16(self.resource_type)
    }

    pub fn read_from<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        Ok(Self {
            identifier: r.read_u8()?,
            major_version: r.read_i16()?,
            minor_version: r.read_i16()?,
            resource_type: r.read_u16()?,
        })
    }

    /// Check identifier, exact version match, and tag validity, in that
    /// order. First failure wins; `path` only feeds the log line.
    pub fn validate(&self, path: &Path) -> Result<ResourceKind, NbrError> {
        if self.identifier != NBR_IDENTIFIER {
            tracing::error!(
                "invalid identifier in NBR file at '{}': expected {}, got {}",
                path.display(),
                NBR_IDENTIFIER,
                self.identifier
            );
            return Err(NbrError::BadIdentifier {
                expected: NBR_IDENTIFIER,
                found: self.identifier,
            });
        }

        if self.major_version != NBR_MAJOR_VERSION || self.minor_version != NBR_MINOR_VERSION {
            tracing::error!(
                "invalid version {}.{} in NBR file at '{}'",
                self.major_version,
                self.minor_version,
                path.display()
            );
            return Err(NbrError::VersionMismatch {
                major: self.major_version,
                minor: self.minor_version,
            });
        }

        ResourceKind::from_tag(self.resource_type).ok_or_else(|| {
            tracing::error!(
                "unknown resource type {} in NBR file at '{}'",
                self.resource_type,
                path.display()
            );
            NbrError::UnknownResourceType(self.resource_type)
        })
    }
}
