//! NBR font payload: rasterized glyphs plus face-wide metrics.
//!
//! # Layout
//! ```text
//! glyphs_count u32
//! per glyph:
//!     unicode      i8
//!     width        u16
//!     height       u16
//!     left         i16
//!     right        i16
//!     top          i16
//!     bottom       i16
//!     offset_x     i16
//!     offset_y     i16
//!     advance_x    i16
//!     kern         i16
//!     left_bearing i16
//!     pixels       [u8; width * height]   (single channel)
//! ascent   i16
//! descent  i16
//! line_gap i16
//! ```

use std::io::{Read, Write};

use crate::io::{BinaryRead, BinaryWrite};
use crate::NbrError;

/// One rasterized glyph and its placement metrics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NbrGlyph {
    pub unicode: i8,
    pub width: u16,
    pub height: u16,
    pub left: i16,
    pub right: i16,
    pub top: i16,
    pub bottom: i16,
    pub offset_x: i16,
    pub offset_y: i16,
    pub advance_x: i16,
    pub kern: i16,
    pub left_bearing: i16,
    pub pixels: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NbrFont {
    pub glyphs: Vec<NbrGlyph>,
    pub ascent: i16,
    pub descent: i16,
    pub line_gap: i16,
}

impl NbrGlyph {
    fn write_into<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        let expected = self.width as usize * self.height as usize;
        if self.pixels.len() != expected {
            return Err(NbrError::PixelSizeMismatch {
                expected,
                found: self.pixels.len(),
            });
        }

        w.write_i8(self.unicode)?;
        w.write_u16(self.width)?;
        w.write_u16(self.height)?;
        w.write_i16(self.left)?;
        w.write_i16(self.right)?;
        w.write_i16(self.top)?;
        w.write_i16(self.bottom)?;
        w.write_i16(self.offset_x)?;
        w.write_i16(self.offset_y)?;
        w.write_i16(self.advance_x)?;
        w.write_i16(self.kern)?;
        w.write_i16(self.left_bearing)?;
        w.write_bytes(&self.pixels)
    }

    fn read_from<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        let unicode = r.read_i8()?;
        let width = r.read_u16()?;
        let height = r.read_u16()?;
        let left = r.read_i16()?;
        let right = r.read_i16()?;
        let top = r.read_i16()?;
        let bottom = r.read_i16()?;
        let offset_x = r.read_i16()?;
        let offset_y = r.read_i16()?;
        let advance_x = r.read_i16()?;
        let kern = r.read_i16()?;
        let left_bearing = r.read_i16()?;
        let pixels = r.read_vec(width as usize * height as usize)?;

        Ok(Self {
            unicode,
            width,
            height,
            left,
            right,
            top,
            bottom,
            offset_x,
            offset_y,
            advance_x,
            kern,
            left_bearing,
            pixels,
        })
    }
}

impl NbrFont {
    pub(crate) fn write_into<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        w.write_u32(self.glyphs.len() as u32)?;
        for glyph in &self.glyphs {
            glyph.write_into(w)?;
        }
        w.write_i16(self.ascent)?;
        w.write_i16(self.descent)?;
        w.write_i16(self.line_gap)
    }

    pub(crate) fn read_from<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        let glyphs_count = r.read_u32()? as usize;
        let mut glyphs = Vec::with_capacity(glyphs_count);
        for _ in 0..glyphs_count {
            glyphs.push(NbrGlyph::read_from(r)?);
        }

        Ok(Self {
            glyphs,
            ascent: r.read_i16()?,
            descent: r.read_i16()?,
            line_gap: r.read_i16()?,
        })
    }
}
