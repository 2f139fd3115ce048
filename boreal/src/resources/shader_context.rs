//! Shader context operations: the uniform cache and typed setters.
//!
//! Uniform locations come from one backend lookup and are cached by name;
//! setting a uniform that was never cached is a silent no-op, matching the
//! behavior renderers rely on when a shader variant drops a uniform.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::gfx::GfxUniform;

use super::id::ResourceId;
use super::manager::Resources;

impl Resources {
    /// Look up and cache the location of `uniform_name` in the context's
    /// shader. Warns when the uniform does not exist.
    pub fn shader_context_cache_uniform(&mut self, ctx_id: ResourceId, uniform_name: &str) {
        let shader_id = self.get_shader_context(ctx_id).shader;
        let handle = self.get_shader(shader_id);

        let location = self.backend_mut().shader_uniform_lookup(handle, uniform_name);
        if location == -1 {
            tracing::warn!("could not find uniform '{uniform_name}' in shader context");
            return;
        }

        let context = self.shader_context_entry_mut(ctx_id);
        context
            .uniforms_cache
            .insert(uniform_name.to_owned(), location);
        tracing::debug!("cached uniform '{uniform_name}' at location {location}");
    }

    /// Upload a value to a previously cached uniform. Unknown names are
    /// skipped.
    pub fn shader_context_set_uniform(
        &mut self,
        ctx_id: ResourceId,
        uniform_name: &str,
        value: GfxUniform,
    ) {
        let context = self.get_shader_context(ctx_id);
        let Some(&location) = context.uniforms_cache.get(uniform_name) else {
            return;
        };
        let shader_id = context.shader;

        let handle = self.get_shader(shader_id);
        if let Err(err) = self.backend_mut().shader_upload_uniform(handle, location, value) {
            tracing::error!("uniform upload failed for '{uniform_name}': {err}");
        }
    }

    pub fn shader_context_set_uniform_i32(&mut self, ctx_id: ResourceId, name: &str, value: i32) {
        self.shader_context_set_uniform(ctx_id, name, GfxUniform::Int(value));
    }

    pub fn shader_context_set_uniform_f32(&mut self, ctx_id: ResourceId, name: &str, value: f32) {
        self.shader_context_set_uniform(ctx_id, name, GfxUniform::Float(value));
    }

    pub fn shader_context_set_uniform_vec2(&mut self, ctx_id: ResourceId, name: &str, value: Vec2) {
        self.shader_context_set_uniform(ctx_id, name, GfxUniform::Vec2(value));
    }

    pub fn shader_context_set_uniform_vec3(&mut self, ctx_id: ResourceId, name: &str, value: Vec3) {
        self.shader_context_set_uniform(ctx_id, name, GfxUniform::Vec3(value));
    }

    pub fn shader_context_set_uniform_vec4(&mut self, ctx_id: ResourceId, name: &str, value: Vec4) {
        self.shader_context_set_uniform(ctx_id, name, GfxUniform::Vec4(value));
    }

    pub fn shader_context_set_uniform_mat4(&mut self, ctx_id: ResourceId, name: &str, value: Mat4) {
        self.shader_context_set_uniform(ctx_id, name, GfxUniform::Mat4(value));
    }

    /// Bind a uniform buffer at `index` in the context.
    pub fn shader_context_set_uniform_buffer(
        &mut self,
        ctx_id: ResourceId,
        index: usize,
        buffer_id: ResourceId,
    ) {
        assert!(
            index < super::types::SHADER_UNIFORM_BUFFERS_MAX,
            "uniform buffer index out of range"
        );
        let context = self.shader_context_entry_mut(ctx_id);
        context.uniform_buffers[index] = buffer_id.is_valid().then_some(buffer_id);
    }
}
