//! A device-free backend.
//!
//! Stores every descriptor verbatim and hands out sequential handles. Used
//! by the test suite and by tools that exercise the resource pipeline
//! without a window. Uniform lookup scans the stored sources for the name,
//! mirroring how a GL backend reports `-1` for uniforms that don't exist.

use hashbrown::HashMap;

use super::{
    GfxBackend, GfxBuffer, GfxBufferDesc, GfxContextDesc, GfxCubemap, GfxCubemapDesc, GfxError,
    GfxPipeline, GfxPipelineDesc, GfxShader, GfxShaderDesc, GfxTexture, GfxTextureDesc,
    GfxUniform,
};

struct Store<T> {
    entries: HashMap<u32, T>,
    next: u32,
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            next: 1,
        }
    }
}

impl<T> Store<T> {
    fn insert(&mut self, value: T) -> u32 {
        let id = self.next;
        self.next += 1;
        self.entries.insert(id, value);
        id
    }
}

#[derive(Default)]
pub struct HeadlessBackend {
    context: GfxContextDesc,
    buffers: Store<GfxBufferDesc>,
    textures: Store<GfxTextureDesc>,
    cubemaps: Store<GfxCubemapDesc>,
    shaders: Store<GfxShaderDesc>,
    pipelines: Store<GfxPipelineDesc>,
    uniform_locations: HashMap<(u32, String), i32>,
    next_uniform_location: HashMap<u32, i32>,
}

impl HeadlessBackend {
    pub fn new(context: GfxContextDesc) -> Self {
        Self {
            context,
            ..Default::default()
        }
    }

    /// Live handle counts, used by tests asserting group isolation.
    pub fn live_counts(&self) -> (usize, usize, usize, usize, usize) {
        (
            self.buffers.entries.len(),
            self.textures.entries.len(),
            self.cubemaps.entries.len(),
            self.shaders.entries.len(),
            self.pipelines.entries.len(),
        )
    }

    fn shader_declares(desc: &GfxShaderDesc, name: &str) -> bool {
        let declared = |src: &str| src.contains(name);
        declared(&desc.vertex_source)
            || declared(&desc.pixel_source)
            || desc
                .compute_source
                .as_deref()
                .is_some_and(declared)
    }
}

impl GfxBackend for HeadlessBackend {
    fn context_desc(&self) -> &GfxContextDesc {
        &self.context
    }

    fn buffer_create(&mut self, desc: GfxBufferDesc) -> Result<GfxBuffer, GfxError> {
        Ok(GfxBuffer::from_raw(self.buffers.insert(desc)))
    }

    fn buffer_update(&mut self, handle: GfxBuffer, desc: GfxBufferDesc) -> Result<(), GfxError> {
        match self.buffers.entries.get_mut(&handle.raw()) {
            Some(slot) => {
                *slot = desc;
                Ok(())
            }
            None => Err(GfxError::InvalidHandle("buffer")),
        }
    }

    fn buffer_destroy(&mut self, handle: GfxBuffer) {
        self.buffers.entries.remove(&handle.raw());
    }

    fn buffer_desc(&self, handle: GfxBuffer) -> Option<&GfxBufferDesc> {
        self.buffers.entries.get(&handle.raw())
    }

    fn texture_create(&mut self, desc: GfxTextureDesc) -> Result<GfxTexture, GfxError> {
        Ok(GfxTexture::from_raw(self.textures.insert(desc)))
    }

    fn texture_update(
        &mut self,
        handle: GfxTexture,
        desc: GfxTextureDesc,
    ) -> Result<(), GfxError> {
        match self.textures.entries.get_mut(&handle.raw()) {
            Some(slot) => {
                *slot = desc;
                Ok(())
            }
            None => Err(GfxError::InvalidHandle("texture")),
        }
    }

    fn texture_destroy(&mut self, handle: GfxTexture) {
        self.textures.entries.remove(&handle.raw());
    }

    fn texture_desc(&self, handle: GfxTexture) -> Option<&GfxTextureDesc> {
        self.textures.entries.get(&handle.raw())
    }

    fn cubemap_create(&mut self, desc: GfxCubemapDesc) -> Result<GfxCubemap, GfxError> {
        Ok(GfxCubemap::from_raw(self.cubemaps.insert(desc)))
    }

    fn cubemap_update(
        &mut self,
        handle: GfxCubemap,
        desc: GfxCubemapDesc,
    ) -> Result<(), GfxError> {
        match self.cubemaps.entries.get_mut(&handle.raw()) {
            Some(slot) => {
                *slot = desc;
                Ok(())
            }
            None => Err(GfxError::InvalidHandle("cubemap")),
        }
    }

    fn cubemap_destroy(&mut self, handle: GfxCubemap) {
        self.cubemaps.entries.remove(&handle.raw());
    }

    fn cubemap_desc(&self, handle: GfxCubemap) -> Option<&GfxCubemapDesc> {
        self.cubemaps.entries.get(&handle.raw())
    }

    fn shader_create(&mut self, desc: GfxShaderDesc) -> Result<GfxShader, GfxError> {
        Ok(GfxShader::from_raw(self.shaders.insert(desc)))
    }

    fn shader_update(&mut self, handle: GfxShader, desc: GfxShaderDesc) -> Result<(), GfxError> {
        match self.shaders.entries.get_mut(&handle.raw()) {
            Some(slot) => {
                *slot = desc;
                // Cached locations may no longer match the new source.
                self.uniform_locations.retain(|(h, _), _| *h != handle.raw());
                self.next_uniform_location.remove(&handle.raw());
                Ok(())
            }
            None => Err(GfxError::InvalidHandle("shader")),
        }
    }

    fn shader_destroy(&mut self, handle: GfxShader) {
        self.shaders.entries.remove(&handle.raw());
        self.uniform_locations.retain(|(h, _), _| *h != handle.raw());
        self.next_uniform_location.remove(&handle.raw());
    }

    fn shader_desc(&self, handle: GfxShader) -> Option<&GfxShaderDesc> {
        self.shaders.entries.get(&handle.raw())
    }

    fn shader_uniform_lookup(&mut self, handle: GfxShader, name: &str) -> i32 {
        let Some(desc) = self.shaders.entries.get(&handle.raw()) else {
            return -1;
        };
        if !Self::shader_declares(desc, name) {
            return -1;
        }

        if let Some(&location) = self.uniform_locations.get(&(handle.raw(), name.to_owned())) {
            return location;
        }

        let next = self.next_uniform_location.entry(handle.raw()).or_insert(0);
        let location = *next;
        *next += 1;
        self.uniform_locations
            .insert((handle.raw(), name.to_owned()), location);
        location
    }

    fn shader_upload_uniform(
        &mut self,
        handle: GfxShader,
        _location: i32,
        _value: GfxUniform,
    ) -> Result<(), GfxError> {
        if self.shaders.entries.contains_key(&handle.raw()) {
            Ok(())
        } else {
            Err(GfxError::InvalidHandle("shader"))
        }
    }

    fn pipeline_create(&mut self, desc: GfxPipelineDesc) -> Result<GfxPipeline, GfxError> {
        Ok(GfxPipeline::from_raw(self.pipelines.insert(desc)))
    }

    fn pipeline_update(
        &mut self,
        handle: GfxPipeline,
        desc: GfxPipelineDesc,
    ) -> Result<(), GfxError> {
        match self.pipelines.entries.get_mut(&handle.raw()) {
            Some(slot) => {
                *slot = desc;
                Ok(())
            }
            None => Err(GfxError::InvalidHandle("pipeline")),
        }
    }

    fn pipeline_destroy(&mut self, handle: GfxPipeline) {
        self.pipelines.entries.remove(&handle.raw());
    }

    fn pipeline_desc(&self, handle: GfxPipeline) -> Option<&GfxPipelineDesc> {
        self.pipelines.entries.get(&handle.raw())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{GfxBufferType, GfxBufferUsage};

    #[test]
    fn update_keeps_handle_identity() {
        let mut backend = HeadlessBackend::default();
        let handle = backend
            .texture_create(GfxTextureDesc {
                width: 2,
                height: 2,
                ..Default::default()
            })
            .unwrap();

        backend
            .texture_update(
                handle,
                GfxTextureDesc {
                    width: 4,
                    height: 4,
                    ..Default::default()
                },
            )
            .unwrap();

        let desc = backend.texture_desc(handle).unwrap();
        assert_eq!((desc.width, desc.height), (4, 4));
    }

    #[test]
    fn destroyed_handles_go_stale() {
        let mut backend = HeadlessBackend::default();
        let handle = backend
            .buffer_create(GfxBufferDesc {
                data: None,
                size: 64,
                buffer_type: GfxBufferType::Uniform,
                usage: GfxBufferUsage::DynamicDraw,
            })
            .unwrap();

        backend.buffer_destroy(handle);
        assert!(backend.buffer_desc(handle).is_none());
        assert!(backend
            .buffer_update(
                handle,
                GfxBufferDesc {
                    data: None,
                    size: 16,
                    buffer_type: GfxBufferType::Uniform,
                    usage: GfxBufferUsage::DynamicDraw,
                }
            )
            .is_err());
    }

    #[test]
    fn uniform_lookup_scans_sources() {
        let mut backend = HeadlessBackend::default();
        let shader = backend
            .shader_create(GfxShaderDesc {
                vertex_source: "uniform mat4 u_model;\nvoid main(){}".into(),
                pixel_source: "uniform vec3 u_material.color;\nvoid main(){}".into(),
                compute_source: None,
            })
            .unwrap();

        let model = backend.shader_uniform_lookup(shader, "u_model");
        assert!(model >= 0);
        assert_eq!(backend.shader_uniform_lookup(shader, "u_model"), model);
        assert!(backend.shader_uniform_lookup(shader, "u_material.color") >= 0);
        assert_eq!(backend.shader_uniform_lookup(shader, "u_missing"), -1);
    }
}
