//! NBR material payload (32 bytes).
//!
//! # Layout
//! ```text
//! color           [f32; 3]
//! metallic        f32
//! roughness       f32
//! albedo_index    i8
//! metallic_index  i8
//! roughness_index i8
//! normal_index    i8
//! ```
//!
//! Indices refer into the containing model's texture array; `-1` means the
//! material has no such map.

use std::io::{Read, Write};

use crate::io::{BinaryRead, BinaryWrite};
use crate::NbrError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NbrMaterial {
    pub color: [f32; 3],
    pub metallic: f32,
    pub roughness: f32,
    pub albedo_index: i8,
    pub metallic_index: i8,
    pub roughness_index: i8,
    pub normal_index: i8,
}

impl Default for NbrMaterial {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            metallic: 0.0,
            roughness: 1.0,
            albedo_index: -1,
            metallic_index: -1,
            roughness_index: -1,
            normal_index: -1,
        }
    }
}

impl NbrMaterial {
    /// Indices as they appear on the wire, for iteration.
    pub fn texture_indices(&self) -> [i8; 4] {
        [
            self.albedo_index,
            self.metallic_index,
            self.roughness_index,
            self.normal_index,
        ]
    }

    pub(crate) fn write_into<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        w.write_f32_slice(&self.color)?;
        w.write_f32(self.metallic)?;
        w.write_f32(self.roughness)?;
        w.write_i8(self.albedo_index)?;
        w.write_i8(self.metallic_index)?;
        w.write_i8(self.roughness_index)?;
        w.write_i8(self.normal_index)
    }

    pub(crate) fn read_from<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        let mut color = [0f32; 3];
        for c in &mut color {
            *c = r.read_f32()?;
        }

        Ok(Self {
            color,
            metallic: r.read_f32()?,
            roughness: r.read_f32()?,
            albedo_index: r.read_i8()?,
            metallic_index: r.read_i8()?,
            roughness_index: r.read_i8()?,
            normal_index: r.read_i8()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn roundtrip() {
        let material = NbrMaterial {
            color: [0.8, 0.2, 0.1],
            metallic: 0.25,
            roughness: 0.6,
            albedo_index: 0,
            metallic_index: 1,
            roughness_index: -1,
            normal_index: 2,
        };

        let mut buf = Vec::new();
        material.write_into(&mut buf).unwrap();
        assert_eq!(buf.len(), 24);

        let parsed = NbrMaterial::read_from(&mut Cursor::new(buf)).unwrap();
        assert_eq!(parsed, material);
    }

    #[test]
    fn default_has_no_maps() {
        let material = NbrMaterial::default();
        assert!(material.texture_indices().iter().all(|&i| i == -1));
    }
}
