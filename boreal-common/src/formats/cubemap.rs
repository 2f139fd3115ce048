//! NBR cubemap payload.
//!
//! # Layout
//! ```text
//! width       u32
//! height      u32
//! channels    i8
//! format      u8
//! faces_count u8
//! faces       faces_count × [u8; width * height * channels * bytes_per_channel(format)]
//! ```

use std::io::{Read, Write};

use super::texture::PixelFormat;
use crate::io::{BinaryRead, BinaryWrite};
use crate::NbrError;

/// Upper bound on the number of faces a cubemap can carry.
pub const CUBEMAP_FACES_MAX: usize = 6;

/// A decoded cubemap: shared face dimensions plus one pixel array per face.
#[derive(Debug, Clone, PartialEq)]
pub struct NbrCubemap {
    pub width: u32,
    pub height: u32,
    pub channels: i8,
    pub format: PixelFormat,
    pub faces: Vec<Vec<u8>>,
}

impl NbrCubemap {
    /// Byte size every face's pixel array must have.
    pub fn face_size(&self) -> usize {
        self.width as usize
            * self.height as usize
            * self.channels.max(0) as usize
            * self.format.bytes_per_channel()
    }

    pub(crate) fn validate(&self) -> Result<(), NbrError> {
        if self.channels != self.format.channels() {
            return Err(NbrError::ChannelFormatMismatch {
                channels: self.channels,
                format: self.format,
                expected: self.format.channels(),
            });
        }
        if self.faces.is_empty() || self.faces.len() > CUBEMAP_FACES_MAX {
            return Err(NbrError::BadFaceCount(self.faces.len()));
        }
        let expected = self.face_size();
        for face in &self.faces {
            if face.len() != expected {
                return Err(NbrError::PixelSizeMismatch {
                    expected,
                    found: face.len(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn write_into<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        self.validate()?;

        w.write_u32(self.width)?;
        w.write_u32(self.height)?;
        w.write_i8(self.channels)?;
        w.write_u8(self.format as u8)?;
        w.write_u8(self.faces.len() as u8)?;
        for face in &self.faces {
            w.write_bytes(face)?;
        }
        Ok(())
    }

    pub(crate) fn read_from<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        let width = r.read_u32()?;
        let height = r.read_u32()?;
        let channels = r.read_i8()?;
        let format = PixelFormat::from_byte(r.read_u8()?)?;
        let faces_count = r.read_u8()? as usize;

        if faces_count == 0 || faces_count > CUBEMAP_FACES_MAX {
            return Err(NbrError::BadFaceCount(faces_count));
        }

        let face_size =
            width as usize * height as usize * channels.max(0) as usize * format.bytes_per_channel();
        let mut faces = Vec::with_capacity(faces_count);
        for _ in 0..faces_count {
            faces.push(r.read_vec(face_size)?);
        }

        Ok(Self {
            width,
            height,
            channels,
            format,
            faces,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tiny_cubemap() -> NbrCubemap {
        NbrCubemap {
            width: 1,
            height: 1,
            channels: 4,
            format: PixelFormat::Rgba8,
            faces: (0..6u8).map(|f| vec![f, f, f, 0xFF]).collect(),
        }
    }

    #[test]
    fn roundtrip_six_faces() {
        let cubemap = tiny_cubemap();
        let mut buf = Vec::new();
        cubemap.write_into(&mut buf).unwrap();

        let parsed = NbrCubemap::read_from(&mut Cursor::new(buf)).unwrap();
        assert_eq!(parsed, cubemap);
        assert_eq!(parsed.faces.len(), 6);
        for (f, face) in parsed.faces.iter().enumerate() {
            assert_eq!(face, &vec![f as u8, f as u8, f as u8, 0xFF]);
        }
    }

    #[test]
    fn zero_faces_rejected() {
        let mut cubemap = tiny_cubemap();
        cubemap.faces.clear();
        let mut buf = Vec::new();
        assert!(matches!(
            cubemap.write_into(&mut buf),
            Err(NbrError::BadFaceCount(0))
        ));
    }

    #[test]
    fn extra_faces_rejected() {
        let mut cubemap = tiny_cubemap();
        cubemap.faces.push(vec![0, 0, 0, 0]);
        let mut buf = Vec::new();
        assert!(matches!(
            cubemap.write_into(&mut buf),
            Err(NbrError::BadFaceCount(7))
        ));
    }

    #[test]
    fn mismatched_face_size_rejected() {
        let mut cubemap = tiny_cubemap();
        cubemap.faces[3].pop();
        let mut buf = Vec::new();
        assert!(matches!(
            cubemap.write_into(&mut buf),
            Err(NbrError::PixelSizeMismatch { .. })
        ));
    }
}
