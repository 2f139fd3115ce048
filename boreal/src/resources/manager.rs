//! The resource manager context.
//!
//! Owns the graphics backend, every resource group, and the file watcher.
//! All operations are synchronous and complete before returning; hot-reload
//! events queue in the watcher until [`Resources::poll_reloads`] runs on the
//! caller's thread.

use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use rand::Rng;

use boreal_common::{
    extension_kind, NbrFile, NbrMesh, NbrPayload, ResourceKind,
};

use crate::fs::{FileStatus, FileWatcher};
use crate::gfx::{
    GfxBackend, GfxBuffer, GfxBufferDesc, GfxBufferType, GfxBufferUsage, GfxCubemap,
    GfxCubemapDesc, GfxShader, GfxShaderDesc, GfxTexture, GfxTextureDesc, GfxTextureFilter,
    GfxTextureWrap,
};

use super::geometry::{self, GeometryType};
use super::group::ResourceGroup;
use super::id::{ResourceGroupId, ResourceId, RESOURCE_CACHE_GROUP, RESOURCE_GROUP_INVALID};
use super::importer;
use super::types::{
    AudioBufferDesc, Font, Material, MaterialDesc, Mesh, Model, ShaderContext, Skybox,
    MATERIAL_MAP_DIFFUSE, MATERIAL_MAP_SPECULAR,
};

/// Default-texture edge length used by the cache bootstrap.
const DEFAULT_TEXTURE_SIZE: u32 = 4;

/// Two mat4s: view-projection plus model.
const MATRIX_BUFFER_SIZE: usize = 128;

/// The resource manager. One per process is typical, but nothing here is
/// global; tools can run several side by side.
pub struct Resources {
    backend: Box<dyn GfxBackend>,
    groups: HashMap<ResourceGroupId, ResourceGroup>,
    watcher: Option<FileWatcher>,
    watched_dirs: Vec<(PathBuf, ResourceGroupId)>,
}

impl Resources {
    /// Create the manager, the cache group, and the engine defaults
    /// (`"matrix_buffer"`, `"default_texture"`).
    pub fn new(backend: Box<dyn GfxBackend>) -> Self {
        let watcher = match FileWatcher::new() {
            Ok(watcher) => Some(watcher),
            Err(err) => {
                tracing::warn!("file watcher unavailable, hot-reload disabled: {err}");
                None
            }
        };

        let mut resources = Self {
            backend,
            groups: HashMap::new(),
            watcher,
            watched_dirs: Vec::new(),
        };

        resources.groups.insert(
            RESOURCE_CACHE_GROUP,
            ResourceGroup::new("cache", PathBuf::from("resource_cache"), RESOURCE_CACHE_GROUP),
        );

        let matrix_id = resources.push_buffer(
            RESOURCE_CACHE_GROUP,
            GfxBufferDesc {
                data: None,
                size: MATRIX_BUFFER_SIZE,
                buffer_type: GfxBufferType::Uniform,
                usage: GfxBufferUsage::DynamicDraw,
            },
        );
        resources.register_named(RESOURCE_CACHE_GROUP, "matrix_buffer", matrix_id);

        let edge = DEFAULT_TEXTURE_SIZE;
        let texture_id = resources.push_texture(
            RESOURCE_CACHE_GROUP,
            GfxTextureDesc {
                width: edge,
                height: edge,
                data: Some(vec![0xFF; (edge * edge * 4) as usize]),
                ..Default::default()
            },
        );
        resources.register_named(RESOURCE_CACHE_GROUP, "default_texture", texture_id);

        tracing::info!("resource manager initialized");
        resources
    }

    /// Destroy every group (cache included) and release the backend.
    pub fn shutdown(mut self) {
        let ids: Vec<ResourceGroupId> = self.groups.keys().copied().collect();
        for id in ids {
            self.destroy_group(id);
        }
        tracing::info!("resource manager shut down");
    }

    pub fn backend(&self) -> &dyn GfxBackend {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> &mut dyn GfxBackend {
        self.backend.as_mut()
    }

    pub fn group(&self, group_id: ResourceGroupId) -> Option<&ResourceGroup> {
        self.groups.get(&group_id)
    }

    // -----------------------------------------------------------------------
    // Group lifecycle

    /// Create a group with a random unused id, seed its name map, and put
    /// its parent directory under the file watcher.
    pub fn create_group(&mut self, name: &str, parent_dir: &Path) -> ResourceGroupId {
        let mut rng = rand::rng();
        let group_id = loop {
            let candidate: ResourceGroupId =
                rng.random_range((RESOURCE_CACHE_GROUP + 1)..RESOURCE_GROUP_INVALID);
            if !self.groups.contains_key(&candidate) {
                break candidate;
            }
        };

        self.groups.insert(
            group_id,
            ResourceGroup::new(name, parent_dir.to_path_buf(), group_id),
        );

        if parent_dir.exists() {
            if let Some(watcher) = self.watcher.as_mut() {
                match watcher.watch_dir(parent_dir) {
                    Ok(()) => {
                        let canonical = parent_dir
                            .canonicalize()
                            .unwrap_or_else(|_| parent_dir.to_path_buf());
                        self.watched_dirs.push((canonical, group_id));
                    }
                    Err(err) => {
                        tracing::warn!(
                            "cannot watch '{}' for group '{}': {err}",
                            parent_dir.display(),
                            name
                        );
                    }
                }
            }
        }

        tracing::info!("created resource group '{name}'");
        group_id
    }

    /// Empty all per-family arrays and the name map without destroying any
    /// backend handle. Resets logical bindings only.
    pub fn clear_group(&mut self, group_id: ResourceGroupId) {
        let group = self.group_mut(group_id);
        group.clear();
        tracing::info!("resource group '{}' cleared", group.name);
    }

    /// Destroy every backend handle created through this group, free its
    /// compound resources, and erase it. All ids into the group go stale.
    pub fn destroy_group(&mut self, group_id: ResourceGroupId) {
        if group_id == RESOURCE_GROUP_INVALID {
            tracing::warn!("cannot destroy the invalid resource group");
            return;
        }
        let Some(mut group) = self.groups.remove(&group_id) else {
            tracing::warn!("cannot destroy unknown resource group {group_id}");
            return;
        };

        for handle in group.buffers.drain() {
            self.backend.buffer_destroy(handle);
        }
        for handle in group.textures.drain() {
            self.backend.texture_destroy(handle);
        }
        for handle in group.cubemaps.drain() {
            self.backend.cubemap_destroy(handle);
        }
        for handle in group.shaders.drain() {
            self.backend.shader_destroy(handle);
        }
        for mesh in group.meshes.drain() {
            self.backend.pipeline_destroy(mesh.pipeline);
        }
        for skybox in group.skyboxes.drain() {
            self.backend.pipeline_destroy(skybox.pipeline);
        }
        group.materials.clear();
        group.models.clear();
        group.fonts.clear();
        group.shader_contexts.clear();
        group.audio_buffers.clear();

        if let Some(watcher) = self.watcher.as_mut() {
            self.watched_dirs.retain(|(dir, id)| {
                if *id == group_id {
                    watcher.unwatch_dir(dir);
                    false
                } else {
                    true
                }
            });
        }

        tracing::info!("resource group '{}' destroyed", group.name);
    }

    // -----------------------------------------------------------------------
    // Core pushes (descriptor overloads)

    pub fn push_buffer(&mut self, group_id: ResourceGroupId, desc: GfxBufferDesc) -> ResourceId {
        self.check_group(group_id);
        let size = desc.size;

        match self.backend.buffer_create(desc) {
            Ok(handle) => {
                let group = self.groups.get_mut(&group_id).unwrap();
                let (slot, generation) = group.buffers.insert(handle);
                tracing::debug!("group '{}' pushed buffer ({size} bytes)", group.name);
                ResourceId {
                    kind: ResourceKind::Buffer,
                    slot,
                    generation,
                    group: group_id,
                }
            }
            Err(err) => {
                tracing::error!("buffer creation failed: {err}");
                ResourceId::INVALID
            }
        }
    }

    pub fn push_texture(&mut self, group_id: ResourceGroupId, desc: GfxTextureDesc) -> ResourceId {
        self.check_group(group_id);
        let (width, height) = (desc.width, desc.height);

        match self.backend.texture_create(desc) {
            Ok(handle) => {
                let group = self.groups.get_mut(&group_id).unwrap();
                let (slot, generation) = group.textures.insert(handle);
                tracing::debug!("group '{}' pushed texture ({width} x {height})", group.name);
                ResourceId {
                    kind: ResourceKind::Texture,
                    slot,
                    generation,
                    group: group_id,
                }
            }
            Err(err) => {
                tracing::error!("texture creation failed: {err}");
                ResourceId::INVALID
            }
        }
    }

    pub fn push_cubemap(&mut self, group_id: ResourceGroupId, desc: GfxCubemapDesc) -> ResourceId {
        self.check_group(group_id);
        let (width, height, faces) = (desc.width, desc.height, desc.faces.len());

        match self.backend.cubemap_create(desc) {
            Ok(handle) => {
                let group = self.groups.get_mut(&group_id).unwrap();
                let (slot, generation) = group.cubemaps.insert(handle);
                tracing::debug!(
                    "group '{}' pushed cubemap ({width} x {height}, {faces} faces)",
                    group.name
                );
                ResourceId {
                    kind: ResourceKind::Cubemap,
                    slot,
                    generation,
                    group: group_id,
                }
            }
            Err(err) => {
                tracing::error!("cubemap creation failed: {err}");
                ResourceId::INVALID
            }
        }
    }

    pub fn push_shader(&mut self, group_id: ResourceGroupId, desc: GfxShaderDesc) -> ResourceId {
        self.check_group(group_id);

        match self.backend.shader_create(desc) {
            Ok(handle) => {
                let group = self.groups.get_mut(&group_id).unwrap();
                let (slot, generation) = group.shaders.insert(handle);
                tracing::debug!("group '{}' pushed shader", group.name);
                ResourceId {
                    kind: ResourceKind::Shader,
                    slot,
                    generation,
                    group: group_id,
                }
            }
            Err(err) => {
                tracing::error!("shader creation failed: {err}");
                ResourceId::INVALID
            }
        }
    }

    // -----------------------------------------------------------------------
    // File pushes (NBR overloads)

    pub fn push_texture_file(&mut self, group_id: ResourceGroupId, nbr_path: &Path) -> ResourceId {
        self.push_texture_file_with(
            group_id,
            nbr_path,
            GfxTextureFilter::MinMagNearest,
            GfxTextureWrap::Clamp,
        )
    }

    pub fn push_texture_file_with(
        &mut self,
        group_id: ResourceGroupId,
        nbr_path: &Path,
        filter: GfxTextureFilter,
        wrap: GfxTextureWrap,
    ) -> ResourceId {
        self.check_group(group_id);
        let full_path = self.full_path(group_id, nbr_path);

        let file = match NbrFile::load_expected(&full_path, ResourceKind::Texture) {
            Ok(file) => file,
            Err(_) => return ResourceId::INVALID,
        };
        let NbrPayload::Texture(nbr) = &file.payload else {
            unreachable!("load_expected returned the wrong payload");
        };

        let mut desc = GfxTextureDesc {
            filter,
            wrap_mode: wrap,
            ..Default::default()
        };
        importer::import_texture(nbr, &mut desc);

        let id = self.push_texture(group_id, desc);
        if id.is_valid() {
            self.register_file(group_id, nbr_path, id);
        }
        id
    }

    pub fn push_cubemap_file(&mut self, group_id: ResourceGroupId, nbr_path: &Path) -> ResourceId {
        self.push_cubemap_file_with(
            group_id,
            nbr_path,
            GfxTextureFilter::MinMagNearest,
            GfxTextureWrap::Clamp,
        )
    }

    pub fn push_cubemap_file_with(
        &mut self,
        group_id: ResourceGroupId,
        nbr_path: &Path,
        filter: GfxTextureFilter,
        wrap: GfxTextureWrap,
    ) -> ResourceId {
        self.check_group(group_id);
        let full_path = self.full_path(group_id, nbr_path);

        let file = match NbrFile::load_expected(&full_path, ResourceKind::Cubemap) {
            Ok(file) => file,
            Err(_) => return ResourceId::INVALID,
        };
        let NbrPayload::Cubemap(nbr) = &file.payload else {
            unreachable!("load_expected returned the wrong payload");
        };

        let mut desc = GfxCubemapDesc {
            filter,
            wrap_mode: wrap,
            ..Default::default()
        };
        importer::import_cubemap(nbr, &mut desc);

        let id = self.push_cubemap(group_id, desc);
        if id.is_valid() {
            self.register_file(group_id, nbr_path, id);
        }
        id
    }

    pub fn push_shader_file(&mut self, group_id: ResourceGroupId, nbr_path: &Path) -> ResourceId {
        self.check_group(group_id);
        let full_path = self.full_path(group_id, nbr_path);

        let file = match NbrFile::load_expected(&full_path, ResourceKind::Shader) {
            Ok(file) => file,
            Err(_) => return ResourceId::INVALID,
        };
        let NbrPayload::Shader(nbr) = &file.payload else {
            unreachable!("load_expected returned the wrong payload");
        };

        let mut desc = GfxShaderDesc::default();
        importer::import_shader(nbr, &mut desc);

        let id = self.push_shader(group_id, desc);
        if id.is_valid() {
            self.register_file(group_id, nbr_path, id);
        }
        id
    }

    // -----------------------------------------------------------------------
    // Compound pushes

    /// Mesh from a decoded NBR payload; its buffers land in the same group.
    pub fn push_mesh(&mut self, group_id: ResourceGroupId, nbr_mesh: &NbrMesh) -> ResourceId {
        self.check_group(group_id);

        let Some((vertex_id, index_id, pipeline_desc)) =
            importer::import_mesh(self, group_id, nbr_mesh)
        else {
            return ResourceId::INVALID;
        };

        self.finish_mesh(group_id, vertex_id, index_id, pipeline_desc)
    }

    /// Mesh from one of the built-in geometry shapes.
    pub fn push_mesh_geometry(
        &mut self,
        group_id: ResourceGroupId,
        geometry_type: GeometryType,
    ) -> ResourceId {
        self.check_group(group_id);

        let built = geometry::build(self, group_id, geometry_type);
        self.finish_mesh(group_id, built.vertex_buffer, built.index_buffer, built.desc)
    }

    fn finish_mesh(
        &mut self,
        group_id: ResourceGroupId,
        vertex_buffer: ResourceId,
        index_buffer: ResourceId,
        pipeline_desc: crate::gfx::GfxPipelineDesc,
    ) -> ResourceId {
        let pipeline = match self.backend.pipeline_create(pipeline_desc.clone()) {
            Ok(pipeline) => pipeline,
            Err(err) => {
                tracing::error!("mesh pipeline creation failed: {err}");
                return ResourceId::INVALID;
            }
        };

        let vertices = pipeline_desc.vertices_count;
        let indices = pipeline_desc.indices_count;

        let mesh = Mesh {
            vertex_buffer,
            index_buffer,
            pipeline,
            pipeline_desc,
        };

        let group = self.groups.get_mut(&group_id).unwrap();
        let (slot, generation) = group.meshes.insert(mesh);
        tracing::debug!(
            "group '{}' pushed mesh ({vertices} vertices, {indices} indices)",
            group.name
        );
        ResourceId {
            kind: ResourceKind::Mesh,
            slot,
            generation,
            group: group_id,
        }
    }

    pub fn push_material(&mut self, group_id: ResourceGroupId, desc: &MaterialDesc) -> ResourceId {
        self.check_group(group_id);

        let mut map_flags = 0;
        if desc.diffuse_id.is_valid() {
            map_flags |= MATERIAL_MAP_DIFFUSE;
        }
        if desc.specular_id.is_valid() {
            map_flags |= MATERIAL_MAP_SPECULAR;
        }

        let material = Material {
            diffuse_map: desc.diffuse_id.is_valid().then_some(desc.diffuse_id),
            specular_map: desc.specular_id.is_valid().then_some(desc.specular_id),
            color: desc.color,
            shininess: desc.shininess,
            transparency: desc.transparency,
            map_flags,
        };
        self.push_material_value(group_id, material)
    }

    pub(crate) fn push_material_value(
        &mut self,
        group_id: ResourceGroupId,
        material: Material,
    ) -> ResourceId {
        let group = self.groups.get_mut(&group_id).unwrap();
        let (slot, generation) = group.materials.insert(material);
        tracing::debug!("group '{}' pushed material", group.name);
        ResourceId {
            kind: ResourceKind::Material,
            slot,
            generation,
            group: group_id,
        }
    }

    /// Skybox over an already-pushed cubemap.
    pub fn push_skybox(&mut self, group_id: ResourceGroupId, cubemap_id: ResourceId) -> ResourceId {
        self.check_group(group_id);
        if !cubemap_id.is_valid() {
            tracing::error!("cannot build a skybox over an invalid cubemap");
            return ResourceId::INVALID;
        }

        let built = geometry::build(self, group_id, GeometryType::Skybox);
        let pipeline = match self.backend.pipeline_create(built.desc.clone()) {
            Ok(pipeline) => pipeline,
            Err(err) => {
                tracing::error!("skybox pipeline creation failed: {err}");
                return ResourceId::INVALID;
            }
        };

        let skybox = Skybox {
            cubemap: cubemap_id,
            pipeline,
            pipeline_desc: built.desc,
        };

        let group = self.groups.get_mut(&group_id).unwrap();
        let (slot, generation) = group.skyboxes.insert(skybox);
        tracing::debug!("group '{}' pushed skybox", group.name);
        ResourceId {
            kind: ResourceKind::Skybox,
            slot,
            generation,
            group: group_id,
        }
    }

    /// Skybox straight from a `.nbrcubemap` file.
    pub fn push_skybox_file(&mut self, group_id: ResourceGroupId, nbr_path: &Path) -> ResourceId {
        let cubemap_id = self.push_cubemap_file(group_id, nbr_path);
        if !cubemap_id.is_valid() {
            return ResourceId::INVALID;
        }
        self.push_skybox(group_id, cubemap_id)
    }

    pub fn push_model_file(&mut self, group_id: ResourceGroupId, nbr_path: &Path) -> ResourceId {
        self.check_group(group_id);
        let full_path = self.full_path(group_id, nbr_path);

        let file = match NbrFile::load_expected(&full_path, ResourceKind::Model) {
            Ok(file) => file,
            Err(_) => return ResourceId::INVALID,
        };
        let NbrPayload::Model(nbr) = &file.payload else {
            unreachable!("load_expected returned the wrong payload");
        };

        let model = importer::import_model(self, group_id, nbr);
        let meshes = model.meshes.len();
        let materials = model.materials.len();

        let group = self.groups.get_mut(&group_id).unwrap();
        let (slot, generation) = group.models.insert(model);
        let id = ResourceId {
            kind: ResourceKind::Model,
            slot,
            generation,
            group: group_id,
        };
        tracing::debug!(
            "group '{}' pushed model ({meshes} meshes, {materials} materials)",
            group.name
        );

        self.register_file(group_id, nbr_path, id);
        id
    }

    pub fn push_font_file(&mut self, group_id: ResourceGroupId, nbr_path: &Path) -> ResourceId {
        self.check_group(group_id);
        let full_path = self.full_path(group_id, nbr_path);

        let file = match NbrFile::load_expected(&full_path, ResourceKind::Font) {
            Ok(file) => file,
            Err(_) => return ResourceId::INVALID,
        };
        let NbrPayload::Font(nbr) = &file.payload else {
            unreachable!("load_expected returned the wrong payload");
        };

        let font = importer::import_font(self, group_id, nbr);
        let glyphs = font.glyphs.len();

        let group = self.groups.get_mut(&group_id).unwrap();
        let (slot, generation) = group.fonts.insert(font);
        let id = ResourceId {
            kind: ResourceKind::Font,
            slot,
            generation,
            group: group_id,
        };
        tracing::debug!("group '{}' pushed font ({glyphs} glyphs)", group.name);

        self.register_file(group_id, nbr_path, id);
        id
    }

    pub fn push_audio_buffer(
        &mut self,
        group_id: ResourceGroupId,
        desc: AudioBufferDesc,
    ) -> ResourceId {
        self.check_group(group_id);

        let group = self.groups.get_mut(&group_id).unwrap();
        let (slot, generation) = group.audio_buffers.insert(desc);
        tracing::debug!("group '{}' pushed audio buffer", group.name);
        ResourceId {
            kind: ResourceKind::AudioBuffer,
            slot,
            generation,
            group: group_id,
        }
    }

    pub fn push_audio_file(&mut self, group_id: ResourceGroupId, nbr_path: &Path) -> ResourceId {
        self.check_group(group_id);
        let full_path = self.full_path(group_id, nbr_path);

        let file = match NbrFile::load_expected(&full_path, ResourceKind::AudioBuffer) {
            Ok(file) => file,
            Err(_) => return ResourceId::INVALID,
        };
        let NbrPayload::Audio(nbr) = &file.payload else {
            unreachable!("load_expected returned the wrong payload");
        };

        let id = self.push_audio_buffer(group_id, importer::import_audio(nbr));
        if id.is_valid() {
            self.register_file(group_id, nbr_path, id);
        }
        id
    }

    /// Shader context over an already-pushed shader. The cache group's
    /// matrices buffer is bound at `SHADER_MATRICES_BUFFER_INDEX`.
    pub fn push_shader_context(
        &mut self,
        group_id: ResourceGroupId,
        shader_id: ResourceId,
    ) -> ResourceId {
        self.check_group(group_id);
        if !shader_id.is_valid() {
            tracing::error!("cannot build a shader context over an invalid shader");
            return ResourceId::INVALID;
        }

        let mut context = ShaderContext::new(shader_id);
        let matrix_id = self.get_id(RESOURCE_CACHE_GROUP, "matrix_buffer");
        if matrix_id.is_valid() {
            context.uniform_buffers[super::types::SHADER_MATRICES_BUFFER_INDEX] = Some(matrix_id);
        }

        let group = self.groups.get_mut(&group_id).unwrap();
        let (slot, generation) = group.shader_contexts.insert(context);
        tracing::debug!("group '{}' pushed shader context", group.name);
        ResourceId {
            kind: ResourceKind::ShaderContext,
            slot,
            generation,
            group: group_id,
        }
    }

    pub fn push_shader_context_file(
        &mut self,
        group_id: ResourceGroupId,
        nbr_path: &Path,
    ) -> ResourceId {
        let shader_id = self.push_shader_file(group_id, nbr_path);
        if !shader_id.is_valid() {
            return ResourceId::INVALID;
        }
        self.push_shader_context(group_id, shader_id)
    }

    /// Register everything in `parent_dir/subdir` (non-recursive) by its
    /// extension. Unknown extensions are logged and skipped.
    pub fn push_dir(&mut self, group_id: ResourceGroupId, subdir: &Path) {
        self.check_group(group_id);
        let full_dir = self.full_path(group_id, subdir);

        if !full_dir.is_dir() {
            tracing::error!("resource directory '{}' does not exist", full_dir.display());
            return;
        }

        let mut entries: Vec<PathBuf> = match std::fs::read_dir(&full_dir) {
            Ok(read) => read
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| path.is_file())
                .collect(),
            Err(err) => {
                tracing::error!("cannot iterate '{}': {err}", full_dir.display());
                return;
            }
        };
        entries.sort();

        for path in entries {
            let Some(file_name) = path.file_name() else {
                continue;
            };
            let relative = subdir.join(file_name);
            match extension_kind(&path) {
                Some(ResourceKind::Texture) => {
                    self.push_texture_file(group_id, &relative);
                }
                Some(ResourceKind::Cubemap) => {
                    self.push_cubemap_file(group_id, &relative);
                }
                Some(ResourceKind::Shader) => {
                    self.push_shader_file(group_id, &relative);
                }
                Some(ResourceKind::Model) => {
                    self.push_model_file(group_id, &relative);
                }
                Some(ResourceKind::Font) => {
                    self.push_font_file(group_id, &relative);
                }
                Some(ResourceKind::AudioBuffer) => {
                    self.push_audio_file(group_id, &relative);
                }
                Some(ResourceKind::Animation) => {
                    // Animations have no live resource family; players load
                    // them on demand through the container layer.
                    tracing::debug!("not registering animation '{}'", path.display());
                }
                Some(_) | None => {
                    tracing::error!("skipping unknown resource '{}'", path.display());
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Lookup

    /// The id registered under `name`, or the invalid sentinel. Never
    /// panics.
    pub fn get_id(&self, group_id: ResourceGroupId, name: &str) -> ResourceId {
        let Some(group) = self.groups.get(&group_id) else {
            tracing::error!("lookup in unknown resource group {group_id}");
            return ResourceId::INVALID;
        };

        match group.named_ids.get(name) {
            Some(id) => *id,
            None => {
                tracing::error!(
                    "could not find resource '{name}' in resource group '{}'",
                    group.name
                );
                ResourceId::INVALID
            }
        }
    }

    pub fn get_buffer(&self, id: ResourceId) -> GfxBuffer {
        self.expect_kind(id, ResourceKind::Buffer);
        *self
            .group_ref(id.group)
            .buffers
            .get(id.slot, id.generation)
            .expect("stale buffer id")
    }

    pub fn get_texture(&self, id: ResourceId) -> GfxTexture {
        self.expect_kind(id, ResourceKind::Texture);
        *self
            .group_ref(id.group)
            .textures
            .get(id.slot, id.generation)
            .expect("stale texture id")
    }

    pub fn get_cubemap(&self, id: ResourceId) -> GfxCubemap {
        self.expect_kind(id, ResourceKind::Cubemap);
        *self
            .group_ref(id.group)
            .cubemaps
            .get(id.slot, id.generation)
            .expect("stale cubemap id")
    }

    pub fn get_shader(&self, id: ResourceId) -> GfxShader {
        self.expect_kind(id, ResourceKind::Shader);
        *self
            .group_ref(id.group)
            .shaders
            .get(id.slot, id.generation)
            .expect("stale shader id")
    }

    pub fn get_mesh(&self, id: ResourceId) -> &Mesh {
        self.expect_kind(id, ResourceKind::Mesh);
        self.group_ref(id.group)
            .meshes
            .get(id.slot, id.generation)
            .expect("stale mesh id")
    }

    pub fn get_material(&self, id: ResourceId) -> &Material {
        self.expect_kind(id, ResourceKind::Material);
        self.group_ref(id.group)
            .materials
            .get(id.slot, id.generation)
            .expect("stale material id")
    }

    pub fn get_material_mut(&mut self, id: ResourceId) -> &mut Material {
        self.expect_kind(id, ResourceKind::Material);
        self.groups
            .get_mut(&id.group)
            .expect("resource group does not exist")
            .materials
            .get_mut(id.slot, id.generation)
            .expect("stale material id")
    }

    pub fn get_skybox(&self, id: ResourceId) -> &Skybox {
        self.expect_kind(id, ResourceKind::Skybox);
        self.group_ref(id.group)
            .skyboxes
            .get(id.slot, id.generation)
            .expect("stale skybox id")
    }

    pub fn get_model(&self, id: ResourceId) -> &Model {
        self.expect_kind(id, ResourceKind::Model);
        self.group_ref(id.group)
            .models
            .get(id.slot, id.generation)
            .expect("stale model id")
    }

    pub fn get_font(&self, id: ResourceId) -> &Font {
        self.expect_kind(id, ResourceKind::Font);
        self.group_ref(id.group)
            .fonts
            .get(id.slot, id.generation)
            .expect("stale font id")
    }

    pub fn get_shader_context(&self, id: ResourceId) -> &ShaderContext {
        self.expect_kind(id, ResourceKind::ShaderContext);
        self.group_ref(id.group)
            .shader_contexts
            .get(id.slot, id.generation)
            .expect("stale shader context id")
    }

    pub fn get_audio_buffer(&self, id: ResourceId) -> &AudioBufferDesc {
        self.expect_kind(id, ResourceKind::AudioBuffer);
        self.group_ref(id.group)
            .audio_buffers
            .get(id.slot, id.generation)
            .expect("stale audio buffer id")
    }

    /// Non-panicking buffer lookup; used when assembling descriptors.
    pub fn try_get_buffer(&self, id: ResourceId) -> Option<GfxBuffer> {
        if !id.is_valid() || id.kind != ResourceKind::Buffer {
            return None;
        }
        self.groups
            .get(&id.group)?
            .buffers
            .get(id.slot, id.generation)
            .copied()
    }

    /// Non-panicking texture lookup.
    pub fn try_get_texture(&self, id: ResourceId) -> Option<GfxTexture> {
        if !id.is_valid() || id.kind != ResourceKind::Texture {
            return None;
        }
        self.groups
            .get(&id.group)?
            .textures
            .get(id.slot, id.generation)
            .copied()
    }

    // -----------------------------------------------------------------------
    // Hot-reload

    /// Drain the file watcher and re-import every modified resource.
    /// Deliveries happen here, on the caller's thread.
    pub fn poll_reloads(&mut self) {
        let Some(watcher) = self.watcher.as_mut() else {
            return;
        };

        let changes = watcher.drain();
        for (status, path) in changes {
            if status != FileStatus::Modified {
                continue;
            }
            self.reload_path(&path);
        }
    }

    /// Re-import the resource previously loaded from `path`, updating the
    /// live handle in place. The resource's id is unchanged.
    pub fn reload_path(&mut self, path: &Path) {
        let Some(group_id) = self.group_for_path(path) else {
            return;
        };
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            return;
        };

        let id = {
            let group = self.groups.get(&group_id).unwrap();
            match group.named_ids.get(stem) {
                Some(id) => *id,
                None => return,
            }
        };
        if !id.is_valid() {
            return;
        }

        match id.kind {
            ResourceKind::Texture => self.reload_texture(id, path),
            ResourceKind::Cubemap => self.reload_cubemap(id, path),
            ResourceKind::Shader => self.reload_shader(id, path),
            ResourceKind::Model => self.reload_model(id, path),
            other => {
                tracing::debug!("no reload path for {other:?} resources");
            }
        }
    }

    fn reload_texture(&mut self, id: ResourceId, path: &Path) {
        let file = match NbrFile::load_expected(path, ResourceKind::Texture) {
            Ok(file) => file,
            Err(_) => return,
        };
        let NbrPayload::Texture(nbr) = &file.payload else {
            return;
        };

        let Some(handle) = self.try_get_texture(id) else {
            return;
        };
        let mut desc = self
            .backend
            .texture_desc(handle)
            .cloned()
            .unwrap_or_default();
        importer::import_texture(nbr, &mut desc);

        match self.backend.texture_update(handle, desc) {
            Ok(()) => tracing::debug!("reloaded texture '{}'", path.display()),
            Err(err) => tracing::error!("texture reload failed: {err}"),
        }
    }

    fn reload_cubemap(&mut self, id: ResourceId, path: &Path) {
        let file = match NbrFile::load_expected(path, ResourceKind::Cubemap) {
            Ok(file) => file,
            Err(_) => return,
        };
        let NbrPayload::Cubemap(nbr) = &file.payload else {
            return;
        };

        let Some(group) = self.groups.get(&id.group) else {
            return;
        };
        let Some(handle) = group.cubemaps.get(id.slot, id.generation).copied() else {
            return;
        };

        let mut desc = self
            .backend
            .cubemap_desc(handle)
            .cloned()
            .unwrap_or_default();
        importer::import_cubemap(nbr, &mut desc);

        match self.backend.cubemap_update(handle, desc) {
            Ok(()) => tracing::debug!("reloaded cubemap '{}'", path.display()),
            Err(err) => tracing::error!("cubemap reload failed: {err}"),
        }
    }

    fn reload_shader(&mut self, id: ResourceId, path: &Path) {
        let file = match NbrFile::load_expected(path, ResourceKind::Shader) {
            Ok(file) => file,
            Err(_) => return,
        };
        let NbrPayload::Shader(nbr) = &file.payload else {
            return;
        };

        let Some(group) = self.groups.get(&id.group) else {
            return;
        };
        let Some(handle) = group.shaders.get(id.slot, id.generation).copied() else {
            return;
        };

        let mut desc = self
            .backend
            .shader_desc(handle)
            .cloned()
            .unwrap_or_default();
        importer::import_shader(nbr, &mut desc);

        match self.backend.shader_update(handle, desc) {
            Ok(()) => tracing::debug!("reloaded shader '{}'", path.display()),
            Err(err) => tracing::error!("shader reload failed: {err}"),
        }
    }

    /// Model reload: tear down the owned meshes, materials, and textures of
    /// the old version, then rebuild into the same outer slot so the
    /// model's id survives.
    fn reload_model(&mut self, id: ResourceId, path: &Path) {
        let file = match NbrFile::load_expected(path, ResourceKind::Model) {
            Ok(file) => file,
            Err(_) => return,
        };
        let NbrPayload::Model(nbr) = &file.payload else {
            return;
        };

        let old = {
            let Some(group) = self.groups.get(&id.group) else {
                return;
            };
            match group.models.get(id.slot, id.generation) {
                Some(model) => model.clone(),
                None => return,
            }
        };

        for mesh_id in &old.meshes {
            self.remove_mesh(*mesh_id);
        }
        for material_id in &old.materials {
            if let Some(group) = self.groups.get_mut(&material_id.group) {
                group
                    .materials
                    .remove(material_id.slot, material_id.generation);
            }
        }
        for texture_id in &old.textures {
            self.remove_texture(*texture_id);
        }

        let new_model = importer::import_model(self, id.group, nbr);
        let group = self.groups.get_mut(&id.group).unwrap();
        if group.models.replace(id.slot, id.generation, new_model).is_some() {
            tracing::debug!("reloaded model '{}'", path.display());
        }
    }

    fn remove_mesh(&mut self, id: ResourceId) {
        let Some(group) = self.groups.get_mut(&id.group) else {
            return;
        };
        let Some(mesh) = group.meshes.remove(id.slot, id.generation) else {
            return;
        };

        self.backend.pipeline_destroy(mesh.pipeline);
        self.remove_buffer(mesh.vertex_buffer);
        self.remove_buffer(mesh.index_buffer);
    }

    fn remove_buffer(&mut self, id: ResourceId) {
        if !id.is_valid() {
            return;
        }
        let Some(group) = self.groups.get_mut(&id.group) else {
            return;
        };
        if let Some(handle) = group.buffers.remove(id.slot, id.generation) {
            self.backend.buffer_destroy(handle);
        }
    }

    fn remove_texture(&mut self, id: ResourceId) {
        if !id.is_valid() {
            return;
        }
        let Some(group) = self.groups.get_mut(&id.group) else {
            return;
        };
        if let Some(handle) = group.textures.remove(id.slot, id.generation) {
            self.backend.texture_destroy(handle);
        }
    }

    // -----------------------------------------------------------------------
    // Internals

    fn check_group(&self, group_id: ResourceGroupId) {
        assert!(
            group_id != RESOURCE_GROUP_INVALID,
            "cannot use the invalid resource group"
        );
        assert!(
            self.groups.contains_key(&group_id),
            "resource group {group_id} does not exist"
        );
    }

    fn group_ref(&self, group_id: ResourceGroupId) -> &ResourceGroup {
        assert!(
            group_id != RESOURCE_GROUP_INVALID,
            "cannot dereference an invalid resource id"
        );
        self.groups
            .get(&group_id)
            .expect("resource group does not exist")
    }

    fn group_mut(&mut self, group_id: ResourceGroupId) -> &mut ResourceGroup {
        assert!(
            group_id != RESOURCE_GROUP_INVALID,
            "cannot use the invalid resource group"
        );
        self.groups
            .get_mut(&group_id)
            .expect("resource group does not exist")
    }

    pub(crate) fn shader_context_entry_mut(&mut self, id: ResourceId) -> &mut ShaderContext {
        self.expect_kind(id, ResourceKind::ShaderContext);
        self.groups
            .get_mut(&id.group)
            .expect("resource group does not exist")
            .shader_contexts
            .get_mut(id.slot, id.generation)
            .expect("stale shader context id")
    }

    fn expect_kind(&self, id: ResourceId, expected: ResourceKind) {
        assert!(id.is_valid(), "cannot dereference an invalid resource id");
        assert!(
            id.kind == expected,
            "resource id kind mismatch: expected {expected:?}, got {:?}",
            id.kind
        );
    }

    fn full_path(&self, group_id: ResourceGroupId, relative: &Path) -> PathBuf {
        self.group_ref(group_id).parent_dir.join(relative)
    }

    /// Register a file-born resource under its stem so `get_id` finds it.
    fn register_file(&mut self, group_id: ResourceGroupId, nbr_path: &Path, id: ResourceId) {
        let Some(stem) = nbr_path.file_stem().and_then(|stem| stem.to_str()) else {
            return;
        };
        self.register_named(group_id, stem, id);
    }

    fn register_named(&mut self, group_id: ResourceGroupId, name: &str, id: ResourceId) {
        let group = self.group_mut(group_id);
        group.named_ids.insert(name.to_owned(), id);
    }

    fn group_for_path(&self, path: &Path) -> Option<ResourceGroupId> {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if let Some(group_id) = self
            .watched_dirs
            .iter()
            .find(|(dir, _)| canonical.starts_with(dir))
            .map(|(_, group_id)| *group_id)
        {
            return Some(group_id);
        }

        // The watcher may be unavailable; fall back to the groups' parent
        // directories so direct reloads still resolve.
        self.groups
            .values()
            .find(|group| {
                let dir = group
                    .parent_dir
                    .canonicalize()
                    .unwrap_or_else(|_| group.parent_dir.clone());
                canonical.starts_with(&dir)
            })
            .map(|group| group.id)
    }
}
