//! A resource group: parallel per-family arenas plus the name map.

use std::path::PathBuf;

use hashbrown::HashMap;

use crate::gfx::{GfxBuffer, GfxCubemap, GfxShader, GfxTexture};

use super::arena::SlotArena;
use super::id::{ResourceGroupId, ResourceId};
use super::types::{AudioBufferDesc, Font, Material, Mesh, Model, ShaderContext, Skybox};

/// A named registry of resources with a shared parent directory and a
/// common lifetime.
pub struct ResourceGroup {
    pub(crate) name: String,
    pub(crate) parent_dir: PathBuf,
    pub(crate) id: ResourceGroupId,

    pub(crate) buffers: SlotArena<GfxBuffer>,
    pub(crate) textures: SlotArena<GfxTexture>,
    pub(crate) cubemaps: SlotArena<GfxCubemap>,
    pub(crate) shaders: SlotArena<GfxShader>,

    pub(crate) meshes: SlotArena<Mesh>,
    pub(crate) materials: SlotArena<Material>,
    pub(crate) skyboxes: SlotArena<Skybox>,
    pub(crate) models: SlotArena<Model>,
    pub(crate) fonts: SlotArena<Font>,
    pub(crate) shader_contexts: SlotArena<ShaderContext>,
    pub(crate) audio_buffers: SlotArena<AudioBufferDesc>,

    pub(crate) named_ids: HashMap<String, ResourceId>,
}

impl ResourceGroup {
    pub(crate) fn new(name: &str, parent_dir: PathBuf, id: ResourceGroupId) -> Self {
        let mut named_ids = HashMap::new();
        named_ids.insert("invalid".to_owned(), ResourceId::INVALID);

        Self {
            name: name.to_owned(),
            parent_dir,
            id,
            buffers: SlotArena::default(),
            textures: SlotArena::default(),
            cubemaps: SlotArena::default(),
            shaders: SlotArena::default(),
            meshes: SlotArena::default(),
            materials: SlotArena::default(),
            skyboxes: SlotArena::default(),
            models: SlotArena::default(),
            fonts: SlotArena::default(),
            shader_contexts: SlotArena::default(),
            audio_buffers: SlotArena::default(),
            named_ids,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_dir(&self) -> &std::path::Path {
        &self.parent_dir
    }

    pub fn id(&self) -> ResourceGroupId {
        self.id
    }

    /// Empty every family arena and the name map. Backend handles are NOT
    /// destroyed; this only resets logical bindings.
    pub(crate) fn clear(&mut self) {
        self.buffers.clear();
        self.textures.clear();
        self.cubemaps.clear();
        self.shaders.clear();
        self.meshes.clear();
        self.materials.clear();
        self.skyboxes.clear();
        self.models.clear();
        self.fonts.clear();
        self.shader_contexts.clear();
        self.audio_buffers.clear();
        self.named_ids.clear();
        self.named_ids
            .insert("invalid".to_owned(), ResourceId::INVALID);
    }
}
