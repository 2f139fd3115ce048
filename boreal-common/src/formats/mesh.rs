//! NBR mesh payload and the vertex component bitfield.
//!
//! # Layout
//! ```text
//! vertex_component_bits u8
//! vertices_count        u32   (number of f32 values, not vertices)
//! vertices              [f32; vertices_count]
//! indices_count         u32
//! indices               [u32; indices_count]
//! material_index        u8
//! ```
//!
//! The bitfield is the only authority on the interleaved vertex layout:
//! stride and attribute order derive from the bits, in declaration order.

use std::io::{Read, Write};

use crate::io::{BinaryRead, BinaryWrite};
use crate::NbrError;

/// 3 floats of position. Always present in a valid mesh.
pub const VERTEX_POSITION: u8 = 1 << 0;
/// 3 floats of normal.
pub const VERTEX_NORMAL: u8 = 1 << 1;
/// 3 floats of tangent.
pub const VERTEX_TANGENT: u8 = 1 << 2;
/// 4 floats, first color set.
pub const VERTEX_COLOR0: u8 = 1 << 3;
/// 4 floats, second color set.
pub const VERTEX_COLOR1: u8 = 1 << 4;
/// 2 floats of texture coordinates.
pub const VERTEX_UV: u8 = 1 << 5;

/// Every known component bit.
pub const VERTEX_COMPONENTS_ALL: u8 =
    VERTEX_POSITION | VERTEX_NORMAL | VERTEX_TANGENT | VERTEX_COLOR0 | VERTEX_COLOR1 | VERTEX_UV;

/// Number of f32s one vertex occupies under the given component bits.
pub fn vertex_floats(components: u8) -> usize {
    let mut floats = 0;
    if components & VERTEX_POSITION != 0 {
        floats += 3;
    }
    if components & VERTEX_NORMAL != 0 {
        floats += 3;
    }
    if components & VERTEX_TANGENT != 0 {
        floats += 3;
    }
    if components & VERTEX_COLOR0 != 0 {
        floats += 4;
    }
    if components & VERTEX_COLOR1 != 0 {
        floats += 4;
    }
    if components & VERTEX_UV != 0 {
        floats += 2;
    }
    floats
}

/// Byte stride of one interleaved vertex.
pub fn vertex_stride(components: u8) -> usize {
    vertex_floats(components) * std::mem::size_of::<f32>()
}

fn validate_components(components: u8) -> Result<(), NbrError> {
    if components & !VERTEX_COMPONENTS_ALL != 0 {
        return Err(NbrError::Malformed("unknown vertex component bits"));
    }
    if components & VERTEX_POSITION == 0 {
        return Err(NbrError::Malformed("mesh without position components"));
    }
    Ok(())
}

/// A decoded mesh: interleaved f32 vertex stream plus a u32 index stream.
#[derive(Debug, Clone, PartialEq)]
pub struct NbrMesh {
    pub vertex_components: u8,
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    pub material_index: u8,
}

impl NbrMesh {
    /// Number of whole vertices in the interleaved stream.
    pub fn vertex_count(&self) -> usize {
        let floats = vertex_floats(self.vertex_components);
        if floats == 0 {
            0
        } else {
            self.vertices.len() / floats
        }
    }

    pub(crate) fn write_into<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        validate_components(self.vertex_components)?;
        if self.vertices.len() % vertex_floats(self.vertex_components) != 0 {
            return Err(NbrError::Malformed(
                "vertex stream length is not a multiple of the stride",
            ));
        }

        w.write_u8(self.vertex_components)?;
        w.write_u32(self.vertices.len() as u32)?;
        w.write_f32_slice(&self.vertices)?;
        w.write_u32(self.indices.len() as u32)?;
        w.write_u32_slice(&self.indices)?;
        w.write_u8(self.material_index)
    }

    pub(crate) fn read_from<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        let vertex_components = r.read_u8()?;
        validate_components(vertex_components)?;

        let vertices_count = r.read_u32()? as usize;
        let vertices = r.read_f32_vec(vertices_count)?;

        let indices_count = r.read_u32()? as usize;
        let indices = r.read_u32_vec(indices_count)?;

        let material_index = r.read_u8()?;

        Ok(Self {
            vertex_components,
            vertices,
            indices,
            material_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn stride_derivation() {
        assert_eq!(vertex_floats(VERTEX_POSITION), 3);
        assert_eq!(vertex_floats(VERTEX_POSITION | VERTEX_UV), 5);
        assert_eq!(
            vertex_floats(VERTEX_POSITION | VERTEX_NORMAL | VERTEX_UV),
            8
        );
        assert_eq!(vertex_floats(VERTEX_COMPONENTS_ALL), 19);
        assert_eq!(vertex_stride(VERTEX_COMPONENTS_ALL), 76);
    }

    #[test]
    fn roundtrip_triangle() {
        let mesh = NbrMesh {
            vertex_components: VERTEX_POSITION | VERTEX_UV,
            vertices: vec![
                0.0, 0.0, 0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, 1.0, 0.0, //
                0.0, 1.0, 0.0, 0.0, 1.0,
            ],
            indices: vec![0, 1, 2],
            material_index: 0,
        };

        let mut buf = Vec::new();
        mesh.write_into(&mut buf).unwrap();

        let parsed = NbrMesh::read_from(&mut Cursor::new(buf)).unwrap();
        assert_eq!(parsed, mesh);
        assert_eq!(parsed.vertex_count(), 3);
    }

    #[test]
    fn position_bit_is_required() {
        let mesh = NbrMesh {
            vertex_components: VERTEX_UV,
            vertices: vec![0.0, 0.0],
            indices: vec![],
            material_index: 0,
        };
        let mut buf = Vec::new();
        assert!(matches!(
            mesh.write_into(&mut buf),
            Err(NbrError::Malformed(_))
        ));
    }

    #[test]
    fn unknown_bits_rejected() {
        let mesh = NbrMesh {
            vertex_components: VERTEX_POSITION | 0x80,
            vertices: vec![0.0; 3],
            indices: vec![],
            material_index: 0,
        };
        let mut buf = Vec::new();
        assert!(matches!(
            mesh.write_into(&mut buf),
            Err(NbrError::Malformed(_))
        ));
    }

    #[test]
    fn ragged_vertex_stream_rejected() {
        let mesh = NbrMesh {
            vertex_components: VERTEX_POSITION,
            vertices: vec![0.0; 4],
            indices: vec![],
            material_index: 0,
        };
        let mut buf = Vec::new();
        assert!(matches!(
            mesh.write_into(&mut buf),
            Err(NbrError::Malformed(_))
        ));
    }
}
