//! NBR model payload: meshes, materials, and embedded textures.
//!
//! # Layout
//! ```text
//! meshes_count    u16
//! meshes          meshes_count × NbrMesh
//! materials_count u8
//! materials       materials_count × NbrMaterial
//! textures_count  u8
//! textures        textures_count × NbrTexture
//! ```
//!
//! Textures are embedded whole; nothing in a model references the file
//! system.

use std::io::{Read, Write};

use super::material::NbrMaterial;
use super::mesh::NbrMesh;
use super::texture::NbrTexture;
use crate::io::{BinaryRead, BinaryWrite};
use crate::NbrError;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NbrModel {
    pub meshes: Vec<NbrMesh>,
    pub materials: Vec<NbrMaterial>,
    pub textures: Vec<NbrTexture>,
}

impl NbrModel {
    /// Index invariants: every mesh's material index is in range when
    /// materials are present, and every non-negative texture index inside a
    /// material points at an embedded texture.
    pub fn validate_indices(&self) -> Result<(), NbrError> {
        for mesh in &self.meshes {
            if !self.materials.is_empty() && mesh.material_index as usize >= self.materials.len() {
                return Err(NbrError::Malformed("mesh material index out of range"));
            }
        }
        for material in &self.materials {
            for index in material.texture_indices() {
                if index >= 0 && index as usize >= self.textures.len() {
                    return Err(NbrError::Malformed("material texture index out of range"));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn write_into<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        if self.meshes.len() > u16::MAX as usize {
            return Err(NbrError::Malformed("model has too many meshes"));
        }
        if self.materials.len() > u8::MAX as usize {
            return Err(NbrError::Malformed("model has too many materials"));
        }
        if self.textures.len() > u8::MAX as usize {
            return Err(NbrError::Malformed("model has too many textures"));
        }
        self.validate_indices()?;

        w.write_u16(self.meshes.len() as u16)?;
        for mesh in &self.meshes {
            mesh.write_into(w)?;
        }

        w.write_u8(self.materials.len() as u8)?;
        for material in &self.materials {
            material.write_into(w)?;
        }

        w.write_u8(self.textures.len() as u8)?;
        for texture in &self.textures {
            texture.write_into(w)?;
        }
        Ok(())
    }

    pub(crate) fn read_from<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        let meshes_count = r.read_u16()? as usize;
        let mut meshes = Vec::with_capacity(meshes_count);
        for _ in 0..meshes_count {
            meshes.push(NbrMesh::read_from(r)?);
        }

        let materials_count = r.read_u8()? as usize;
        let mut materials = Vec::with_capacity(materials_count);
        for _ in 0..materials_count {
            materials.push(NbrMaterial::read_from(r)?);
        }

        let textures_count = r.read_u8()? as usize;
        let mut textures = Vec::with_capacity(textures_count);
        for _ in 0..textures_count {
            textures.push(NbrTexture::read_from(r)?);
        }

        let model = Self {
            meshes,
            materials,
            textures,
        };
        model.validate_indices()?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::mesh::{VERTEX_POSITION, VERTEX_UV};
    use crate::formats::texture::PixelFormat;
    use std::io::Cursor;

    fn sample_model() -> NbrModel {
        NbrModel {
            meshes: vec![NbrMesh {
                vertex_components: VERTEX_POSITION | VERTEX_UV,
                vertices: vec![0.0; 15],
                indices: vec![0, 1, 2],
                material_index: 0,
            }],
            materials: vec![NbrMaterial {
                color: [1.0, 0.5, 0.25],
                metallic: 0.0,
                roughness: 0.9,
                albedo_index: 0,
                metallic_index: -1,
                roughness_index: -1,
                normal_index: -1,
            }],
            textures: vec![NbrTexture {
                width: 1,
                height: 1,
                channels: 4,
                format: PixelFormat::Rgba8,
                pixels: vec![0xFF; 4],
            }],
        }
    }

    #[test]
    fn roundtrip() {
        let model = sample_model();
        let mut buf = Vec::new();
        model.write_into(&mut buf).unwrap();

        let parsed = NbrModel::read_from(&mut Cursor::new(buf)).unwrap();
        assert_eq!(parsed, model);
    }

    #[test]
    fn bad_material_index_rejected() {
        let mut model = sample_model();
        model.meshes[0].material_index = 5;
        let mut buf = Vec::new();
        assert!(matches!(
            model.write_into(&mut buf),
            Err(NbrError::Malformed(_))
        ));
    }

    #[test]
    fn bad_texture_index_rejected() {
        let mut model = sample_model();
        model.materials[0].normal_index = 3;
        let mut buf = Vec::new();
        assert!(matches!(
            model.write_into(&mut buf),
            Err(NbrError::Malformed(_))
        ));
    }

    #[test]
    fn negative_texture_index_means_absent() {
        let mut model = sample_model();
        model.materials[0].albedo_index = -1;
        model.textures.clear();

        let mut buf = Vec::new();
        model.write_into(&mut buf).unwrap();
        let parsed = NbrModel::read_from(&mut Cursor::new(buf)).unwrap();
        assert!(parsed.textures.is_empty());
    }
}
