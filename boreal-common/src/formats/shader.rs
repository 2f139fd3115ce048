//! NBR shader payload.
//!
//! # Layout
//! ```text
//! compute_length u16
//! if compute_length > 0:
//!     compute_source [u8; compute_length]
//! else:
//!     vertex_length  u16
//!     vertex_source  [u8; vertex_length]
//!     pixel_length   u16
//!     pixel_source   [u8; pixel_length]
//! ```
//!
//! Sources are raw bytes on disk; the length prefix is the only framing.

use std::io::{Read, Write};

use crate::io::{BinaryRead, BinaryWrite};
use crate::NbrError;

/// A shader program: either a single compute stage or a vertex/pixel pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NbrShader {
    Compute { source: String },
    Render { vertex: String, pixel: String },
}

impl NbrShader {
    pub(crate) fn write_into<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        match self {
            Self::Compute { source } => {
                if source.is_empty() {
                    return Err(NbrError::Malformed("compute shader with empty source"));
                }
                w.write_string16(source)
            }
            Self::Render { vertex, pixel } => {
                w.write_u16(0)?;
                w.write_string16(vertex)?;
                w.write_string16(pixel)
            }
        }
    }

    pub(crate) fn read_from<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        let compute_length = r.read_u16()? as usize;
        if compute_length > 0 {
            let bytes = r.read_vec(compute_length)?;
            let source = String::from_utf8(bytes).map_err(|_| NbrError::InvalidString)?;
            return Ok(Self::Compute { source });
        }

        Ok(Self::Render {
            vertex: r.read_string16()?,
            pixel: r.read_string16()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn render_pair_roundtrip() {
        let shader = NbrShader::Render {
            vertex: "#version 420 core\nvoid main(){gl_Position=vec4(0);}".into(),
            pixel: "#version 420 core\nvoid main(){}".into(),
        };
        let mut buf = Vec::new();
        shader.write_into(&mut buf).unwrap();

        let parsed = NbrShader::read_from(&mut Cursor::new(buf)).unwrap();
        assert_eq!(parsed, shader);

        let NbrShader::Render { vertex, pixel } = parsed else {
            panic!("expected a render pair");
        };
        assert_eq!(vertex.len(), 51);
        assert_eq!(pixel.len(), 31);
    }

    #[test]
    fn compute_roundtrip() {
        let shader = NbrShader::Compute {
            source: "#version 430\nlayout(local_size_x = 64) in;\nvoid main(){}".into(),
        };
        let mut buf = Vec::new();
        shader.write_into(&mut buf).unwrap();

        assert_ne!(&buf[0..2], &[0, 0], "compute length prefix must be nonzero");
        assert_eq!(NbrShader::read_from(&mut Cursor::new(buf)).unwrap(), shader);
    }

    #[test]
    fn empty_compute_source_rejected() {
        let shader = NbrShader::Compute { source: String::new() };
        let mut buf = Vec::new();
        assert!(matches!(
            shader.write_into(&mut buf),
            Err(NbrError::Malformed(_))
        ));
    }

    #[test]
    fn oversized_source_rejected() {
        let shader = NbrShader::Render {
            vertex: "v".repeat(u16::MAX as usize + 1),
            pixel: String::new(),
        };
        let mut buf = Vec::new();
        assert!(matches!(
            shader.write_into(&mut buf),
            Err(NbrError::SourceTooLong(_))
        ));
    }
}
