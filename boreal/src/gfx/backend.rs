//! The backend trait the resource core is written against.

use glam::{Mat4, Vec2, Vec3, Vec4};

use super::{
    GfxBuffer, GfxBufferDesc, GfxContextDesc, GfxCubemap, GfxCubemapDesc, GfxPipeline,
    GfxPipelineDesc, GfxShader, GfxShaderDesc, GfxTexture, GfxTextureDesc,
};

/// Backend-reported failures. These are recoverable at the resource-manager
/// level: the failed resource is simply not registered.
#[derive(Debug, thiserror::Error)]
pub enum GfxError {
    #[error("stale or foreign {0} handle")]
    InvalidHandle(&'static str),

    #[error("shader compilation failed: {0}")]
    CompileFailed(String),

    #[error("resource allocation failed: {0}")]
    AllocationFailed(String),
}

/// A typed uniform value for [`GfxBackend::shader_upload_uniform`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GfxUniform {
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

/// Contract between the resource core and a graphics device.
///
/// Handles stay valid until their `*_destroy`; `*_update` replaces the
/// resource's contents without changing handle identity, which is what keeps
/// `ResourceId`s stable across hot-reloads. `*_desc` returns the descriptor
/// the resource was last created or updated with.
pub trait GfxBackend {
    /// The device state this backend was created with.
    fn context_desc(&self) -> &GfxContextDesc;

    fn buffer_create(&mut self, desc: GfxBufferDesc) -> Result<GfxBuffer, GfxError>;
    fn buffer_update(&mut self, handle: GfxBuffer, desc: GfxBufferDesc) -> Result<(), GfxError>;
    fn buffer_destroy(&mut self, handle: GfxBuffer);
    fn buffer_desc(&self, handle: GfxBuffer) -> Option<&GfxBufferDesc>;

    fn texture_create(&mut self, desc: GfxTextureDesc) -> Result<GfxTexture, GfxError>;
    fn texture_update(&mut self, handle: GfxTexture, desc: GfxTextureDesc)
        -> Result<(), GfxError>;
    fn texture_destroy(&mut self, handle: GfxTexture);
    fn texture_desc(&self, handle: GfxTexture) -> Option<&GfxTextureDesc>;

    fn cubemap_create(&mut self, desc: GfxCubemapDesc) -> Result<GfxCubemap, GfxError>;
    fn cubemap_update(&mut self, handle: GfxCubemap, desc: GfxCubemapDesc)
        -> Result<(), GfxError>;
    fn cubemap_destroy(&mut self, handle: GfxCubemap);
    fn cubemap_desc(&self, handle: GfxCubemap) -> Option<&GfxCubemapDesc>;

    fn shader_create(&mut self, desc: GfxShaderDesc) -> Result<GfxShader, GfxError>;
    fn shader_update(&mut self, handle: GfxShader, desc: GfxShaderDesc) -> Result<(), GfxError>;
    fn shader_destroy(&mut self, handle: GfxShader);
    fn shader_desc(&self, handle: GfxShader) -> Option<&GfxShaderDesc>;

    /// Location of a uniform in the shader, `-1` when it does not exist.
    fn shader_uniform_lookup(&mut self, handle: GfxShader, name: &str) -> i32;
    fn shader_upload_uniform(
        &mut self,
        handle: GfxShader,
        location: i32,
        value: GfxUniform,
    ) -> Result<(), GfxError>;

    fn pipeline_create(&mut self, desc: GfxPipelineDesc) -> Result<GfxPipeline, GfxError>;
    fn pipeline_update(
        &mut self,
        handle: GfxPipeline,
        desc: GfxPipelineDesc,
    ) -> Result<(), GfxError>;
    fn pipeline_destroy(&mut self, handle: GfxPipeline);
    fn pipeline_desc(&self, handle: GfxPipeline) -> Option<&GfxPipelineDesc>;
}
