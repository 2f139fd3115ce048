//! NBR texture payload.
//!
//! # Layout
//! ```text
//! width    u32
//! height   u32
//! channels i8
//! format   u8
//! pixels   [u8; width * height * channels * bytes_per_channel(format)]
//! ```

use std::io::{Read, Write};

use crate::io::{BinaryRead, BinaryWrite};
use crate::NbrError;

/// GPU-facing pixel format of an NBR texture.
///
/// The 8-bit formats store one byte per channel. `Rgba16F` stores HDR
/// sources as `f32` channels (four bytes each); the backend uploads those
/// as half-float.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PixelFormat {
    R8 = 0,
    Rg8 = 1,
    Rgba8 = 2,
    Rgba16F = 3,
}

impl PixelFormat {
    pub fn from_byte(b: u8) -> Result<Self, NbrError> {
        Ok(match b {
            0 => Self::R8,
            1 => Self::Rg8,
            2 => Self::Rgba8,
            3 => Self::Rgba16F,
            other => return Err(NbrError::UnknownPixelFormat(other)),
        })
    }

    /// Channel count this format carries; `channels` in the payload must
    /// agree with it.
    pub fn channels(self) -> i8 {
        match self {
            Self::R8 => 1,
            Self::Rg8 => 2,
            Self::Rgba8 => 4,
            Self::Rgba16F => 4,
        }
    }

    /// Stored bytes per channel.
    pub fn bytes_per_channel(self) -> usize {
        match self {
            Self::R8 | Self::Rg8 | Self::Rgba8 => 1,
            Self::Rgba16F => 4,
        }
    }
}

/// A decoded texture: dimensions, channel layout, and the raw pixel bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct NbrTexture {
    pub width: u32,
    pub height: u32,
    pub channels: i8,
    pub format: PixelFormat,
    pub pixels: Vec<u8>,
}

impl NbrTexture {
    /// Byte size the pixel array must have for the declared dimensions.
    pub fn data_size(&self) -> usize {
        self.width as usize
            * self.height as usize
            * self.channels.max(0) as usize
            * self.format.bytes_per_channel()
    }

    /// Channel/format agreement and pixel-buffer length, checked before any
    /// byte of a texture reaches disk.
    pub(crate) fn validate(&self) -> Result<(), NbrError> {
        if self.channels != self.format.channels() {
            return Err(NbrError::ChannelFormatMismatch {
                channels: self.channels,
                format: self.format,
                expected: self.format.channels(),
            });
        }
        if self.pixels.len() != self.data_size() {
            return Err(NbrError::PixelSizeMismatch {
                expected: self.data_size(),
                found: self.pixels.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn write_into<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        self.validate()?;

        w.write_u32(self.width)?;
        w.write_u32(self.height)?;
        w.write_i8(self.channels)?;
        w.write_u8(self.format as u8)?;
        w.write_bytes(&self.pixels)
    }

    pub(crate) fn read_from<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        let width = r.read_u32()?;
        let height = r.read_u32()?;
        let channels = r.read_i8()?;
        let format = PixelFormat::from_byte(r.read_u8()?)?;

        if channels != format.channels() {
            return Err(NbrError::ChannelFormatMismatch {
                channels,
                format,
                expected: format.channels(),
            });
        }

        let size =
            width as usize * height as usize * channels as usize * format.bytes_per_channel();
        let pixels = r.read_vec(size)?;

        Ok(Self {
            width,
            height,
            channels,
            format,
            pixels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn checker_2x2() -> NbrTexture {
        NbrTexture {
            width: 2,
            height: 2,
            channels: 4,
            format: PixelFormat::Rgba8,
            pixels: vec![
                0xFF, 0, 0, 0xFF, // red
                0, 0xFF, 0, 0xFF, // green
                0, 0, 0xFF, 0xFF, // blue
                0xFF, 0xFF, 0xFF, 0xFF, // white
            ],
        }
    }

    #[test]
    fn roundtrip_2x2_rgba() {
        let texture = checker_2x2();
        let mut buf = Vec::new();
        texture.write_into(&mut buf).unwrap();

        let parsed = NbrTexture::read_from(&mut Cursor::new(buf)).unwrap();
        assert_eq!(parsed, texture);
        assert_eq!(parsed.pixels.len(), 16);
    }

    #[test]
    fn channel_format_mismatch_rejected_on_save() {
        let mut texture = checker_2x2();
        texture.channels = 1;
        let mut buf = Vec::new();
        assert!(matches!(
            texture.write_into(&mut buf),
            Err(NbrError::ChannelFormatMismatch { .. })
        ));
    }

    #[test]
    fn short_pixel_buffer_rejected_on_save() {
        let mut texture = checker_2x2();
        texture.pixels.pop();
        let mut buf = Vec::new();
        assert!(matches!(
            texture.write_into(&mut buf),
            Err(NbrError::PixelSizeMismatch { .. })
        ));
    }

    #[test]
    fn hdr_format_stores_four_bytes_per_channel() {
        let texture = NbrTexture {
            width: 1,
            height: 1,
            channels: 4,
            format: PixelFormat::Rgba16F,
            pixels: vec![0u8; 16],
        };
        assert_eq!(texture.data_size(), 16);

        let mut buf = Vec::new();
        texture.write_into(&mut buf).unwrap();
        let parsed = NbrTexture::read_from(&mut Cursor::new(buf)).unwrap();
        assert_eq!(parsed, texture);
    }

    #[test]
    fn truncated_pixels_fail_cleanly() {
        let texture = checker_2x2();
        let mut buf = Vec::new();
        texture.write_into(&mut buf).unwrap();
        buf.truncate(buf.len() - 4);

        assert!(matches!(
            NbrTexture::read_from(&mut Cursor::new(buf)),
            Err(NbrError::UnexpectedEof)
        ));
    }
}
