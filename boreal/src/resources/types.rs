//! Compound runtime resources.
//!
//! Compound types hold `ResourceId`s into their own group's arenas, never
//! raw handles to another group's storage. The cache group is the one
//! documented exception: its entries outlive every user group, so compound
//! resources may reference it.

use glam::{Vec2, Vec3};
use hashbrown::HashMap;

use boreal_common::AudioFormat;

use crate::gfx::{GfxPipeline, GfxPipelineDesc};

use super::id::ResourceId;

/// Maximum number of uniform buffers a shader context binds.
pub const SHADER_UNIFORM_BUFFERS_MAX: usize = 1;

/// Index of the matrices uniform buffer within every shader.
pub const SHADER_MATRICES_BUFFER_INDEX: usize = 0;

/// Material map flag: diffuse texture present.
pub const MATERIAL_MAP_DIFFUSE: i32 = 1 << 0;

/// Material map flag: specular texture present.
pub const MATERIAL_MAP_SPECULAR: i32 = 1 << 1;

/// A renderable mesh: its two buffers plus the pipeline built over them.
///
/// The pipeline descriptor is retained so the pipeline can be rebuilt when a
/// reload replaces the underlying buffers.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertex_buffer: ResourceId,
    pub index_buffer: ResourceId,
    pub pipeline: GfxPipeline,
    pub pipeline_desc: GfxPipelineDesc,
}

/// Surface state shared by everything drawn with it.
#[derive(Debug, Clone)]
pub struct Material {
    pub diffuse_map: Option<ResourceId>,
    pub specular_map: Option<ResourceId>,
    pub color: Vec3,
    pub shininess: f32,
    pub transparency: f32,
    /// Bitwise OR of `MATERIAL_MAP_*`, telling the shader which maps to
    /// sample.
    pub map_flags: i32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse_map: None,
            specular_map: None,
            color: Vec3::ONE,
            shininess: 1.0,
            transparency: 1.0,
            map_flags: 0,
        }
    }
}

/// Creation parameters for [`Material`]; invalid ids mean "no such map".
#[derive(Debug, Clone, Copy)]
pub struct MaterialDesc {
    pub diffuse_id: ResourceId,
    pub specular_id: ResourceId,
    pub color: Vec3,
    pub shininess: f32,
    pub transparency: f32,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            diffuse_id: ResourceId::INVALID,
            specular_id: ResourceId::INVALID,
            color: Vec3::ONE,
            shininess: 0.1,
            transparency: 1.0,
        }
    }
}

/// Cubemap-backed background drawn with a fixed cube geometry.
#[derive(Debug, Clone)]
pub struct Skybox {
    pub cubemap: ResourceId,
    pub pipeline: GfxPipeline,
    pub pipeline_desc: GfxPipelineDesc,
}

/// A model: meshes, materials, and the per-mesh material assignment.
///
/// `textures` records the group entries the model's import created so a
/// reload can tear them down with the model.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub meshes: Vec<ResourceId>,
    pub materials: Vec<ResourceId>,
    pub material_indices: Vec<u8>,
    pub textures: Vec<ResourceId>,
}

/// One glyph of a loaded font. The texture is absent for glyphs with no
/// bitmap (spaces).
#[derive(Debug, Clone)]
pub struct Glyph {
    pub unicode: i8,
    pub texture: Option<ResourceId>,
    pub size: Vec2,
    pub offset: Vec2,
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
    pub advance_x: i32,
    pub kern: i32,
    pub left_bearing: i32,
}

#[derive(Debug, Clone, Default)]
pub struct Font {
    pub ascent: f32,
    pub descent: f32,
    pub line_gap: f32,
    pub glyphs: HashMap<i8, Glyph>,
}

/// A shader plus its bound uniform buffers and a name→location cache.
#[derive(Debug, Clone)]
pub struct ShaderContext {
    pub shader: ResourceId,
    pub uniform_buffers: [Option<ResourceId>; SHADER_UNIFORM_BUFFERS_MAX],
    pub uniforms_cache: HashMap<String, i32>,
}

impl ShaderContext {
    pub fn new(shader: ResourceId) -> Self {
        Self {
            shader,
            uniform_buffers: [None; SHADER_UNIFORM_BUFFERS_MAX],
            uniforms_cache: HashMap::new(),
        }
    }
}

/// A decoded audio buffer, owned by its group.
#[derive(Debug, Clone)]
pub struct AudioBufferDesc {
    pub format: AudioFormat,
    pub channels: u8,
    pub sample_rate: u32,
    pub data: Vec<u8>,
}
