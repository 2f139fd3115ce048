//! Graphics resource abstraction.
//!
//! The resource core talks to the GPU exclusively through [`GfxBackend`]:
//! opaque handles, owned descriptor structs, and an update operation that
//! keeps handle identity stable (the contract hot-reload depends on). The
//! concrete device backend lives behind the trait; [`HeadlessBackend`]
//! implements it without a device for tools and tests.

mod backend;
mod headless;

pub use backend::{GfxBackend, GfxError, GfxUniform};
pub use headless::HeadlessBackend;

use glam::Vec4;

bitflags::bitflags! {
    /// Device states enabled at context creation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct GfxStates: u32 {
        const DEPTH   = 1 << 0;
        const STENCIL = 1 << 1;
        const BLEND   = 1 << 2;
        const MSAA    = 1 << 3;
        const CULL    = 1 << 4;
    }
}

/// Opaque token for the window the context presents into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GfxCompareFunc {
    Always,
    Never,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GfxOperation {
    Keep,
    Zero,
    Replace,
    Increment,
    Decrement,
    Invert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GfxBlendMode {
    Zero,
    One,
    SrcColor,
    InvSrcColor,
    SrcAlpha,
    InvSrcAlpha,
    DestColor,
    InvDestColor,
    DestAlpha,
    InvDestAlpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GfxCullMode {
    Front,
    Back,
    FrontAndBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GfxCullOrder {
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GfxDepthDesc {
    pub compare_func: GfxCompareFunc,
    pub depth_write_enabled: bool,
}

impl Default for GfxDepthDesc {
    fn default() -> Self {
        Self {
            compare_func: GfxCompareFunc::LessEqual,
            depth_write_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GfxStencilDesc {
    pub polygon_face: GfxCullMode,
    pub compare_func: GfxCompareFunc,
    pub stencil_fail_op: GfxOperation,
    pub depth_pass_op: GfxOperation,
    pub depth_fail_op: GfxOperation,
    pub reference: i32,
    pub mask: u32,
}

impl Default for GfxStencilDesc {
    fn default() -> Self {
        Self {
            polygon_face: GfxCullMode::FrontAndBack,
            compare_func: GfxCompareFunc::Always,
            stencil_fail_op: GfxOperation::Keep,
            depth_pass_op: GfxOperation::Keep,
            depth_fail_op: GfxOperation::Keep,
            reference: 1,
            mask: 0xFF,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GfxBlendDesc {
    pub src_color_blend: GfxBlendMode,
    pub dest_color_blend: GfxBlendMode,
    pub src_alpha_blend: GfxBlendMode,
    pub dest_alpha_blend: GfxBlendMode,
    pub blend_factor: [f32; 4],
}

impl Default for GfxBlendDesc {
    fn default() -> Self {
        Self {
            src_color_blend: GfxBlendMode::One,
            dest_color_blend: GfxBlendMode::Zero,
            src_alpha_blend: GfxBlendMode::SrcAlpha,
            dest_alpha_blend: GfxBlendMode::InvSrcAlpha,
            blend_factor: [0.0; 4],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GfxCullDesc {
    pub cull_mode: GfxCullMode,
    pub front_face: GfxCullOrder,
}

impl Default for GfxCullDesc {
    fn default() -> Self {
        Self {
            cull_mode: GfxCullMode::Front,
            front_face: GfxCullOrder::Clockwise,
        }
    }
}

/// Everything a backend needs to bring up device state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GfxContextDesc {
    pub window: WindowHandle,
    pub states: GfxStates,
    pub has_vsync: bool,
    pub msaa_samples: u32,
    pub depth_desc: GfxDepthDesc,
    pub stencil_desc: GfxStencilDesc,
    pub blend_desc: GfxBlendDesc,
    pub cull_desc: GfxCullDesc,
}

// ---------------------------------------------------------------------------
// Handles

macro_rules! gfx_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(u32);

        impl $name {
            pub fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            pub fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

gfx_handle!(
    /// Opaque backend buffer handle.
    GfxBuffer
);
gfx_handle!(
    /// Opaque backend texture handle.
    GfxTexture
);
gfx_handle!(
    /// Opaque backend cubemap handle.
    GfxCubemap
);
gfx_handle!(
    /// Opaque backend shader handle.
    GfxShader
);
gfx_handle!(
    /// Opaque backend pipeline handle.
    GfxPipeline
);

// ---------------------------------------------------------------------------
// Descriptors

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GfxBufferType {
    Vertex,
    Index,
    Uniform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GfxBufferUsage {
    DynamicDraw,
    DynamicRead,
    StaticDraw,
    StaticRead,
}

/// Buffer creation data. `data` may be absent for buffers the renderer
/// streams into later; `size` is authoritative either way.
#[derive(Debug, Clone, PartialEq)]
pub struct GfxBufferDesc {
    pub data: Option<Vec<u8>>,
    pub size: usize,
    pub buffer_type: GfxBufferType,
    pub usage: GfxBufferUsage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GfxTextureType {
    Tex1D,
    Tex2D,
    Tex3D,
    RenderTarget,
    DepthTarget,
    StencilTarget,
    DepthStencilTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GfxTextureFormat {
    R8,
    R16F,
    R32F,
    Rg8,
    Rgba8,
    Rgba16F,
    Rgba32F,
    DepthStencil24_8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GfxTextureFilter {
    MinMagLinear,
    MinMagNearest,
    MinLinearMagNearest,
    MinNearestMagLinear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GfxTextureWrap {
    Repeat,
    Mirror,
    Clamp,
    BorderColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GfxTextureDesc {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub mips: u32,
    pub texture_type: GfxTextureType,
    pub format: GfxTextureFormat,
    pub filter: GfxTextureFilter,
    pub wrap_mode: GfxTextureWrap,
    pub data: Option<Vec<u8>>,
}

impl Default for GfxTextureDesc {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            depth: 0,
            mips: 1,
            texture_type: GfxTextureType::Tex2D,
            format: GfxTextureFormat::Rgba8,
            filter: GfxTextureFilter::MinMagNearest,
            wrap_mode: GfxTextureWrap::Clamp,
            data: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GfxCubemapDesc {
    pub width: u32,
    pub height: u32,
    pub mips: u32,
    pub format: GfxTextureFormat,
    pub filter: GfxTextureFilter,
    pub wrap_mode: GfxTextureWrap,
    pub faces: Vec<Vec<u8>>,
}

impl Default for GfxCubemapDesc {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            mips: 1,
            format: GfxTextureFormat::Rgba8,
            filter: GfxTextureFilter::MinMagNearest,
            wrap_mode: GfxTextureWrap::Clamp,
            faces: Vec::new(),
        }
    }
}

/// Shader sources. Either the render pair is set, or `compute_source` is.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GfxShaderDesc {
    pub vertex_source: String,
    pub pixel_source: String,
    pub compute_source: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GfxLayoutType {
    Float1,
    Float2,
    Float3,
    Float4,
    Int1,
    Int2,
    Int3,
    Int4,
    Uint1,
    Uint2,
    Uint3,
    Uint4,
    Mat2,
    Mat3,
    Mat4,
}

impl GfxLayoutType {
    /// Number of f32-sized lanes the attribute occupies.
    pub fn lanes(self) -> usize {
        match self {
            Self::Float1 | Self::Int1 | Self::Uint1 => 1,
            Self::Float2 | Self::Int2 | Self::Uint2 => 2,
            Self::Float3 | Self::Int3 | Self::Uint3 => 3,
            Self::Float4 | Self::Int4 | Self::Uint4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }
}

/// One vertex attribute in a pipeline layout.
#[derive(Debug, Clone, PartialEq)]
pub struct GfxLayoutAttr {
    pub name: &'static str,
    pub attr_type: GfxLayoutType,
    pub instance_rate: u32,
}

impl GfxLayoutAttr {
    pub fn new(name: &'static str, attr_type: GfxLayoutType) -> Self {
        Self {
            name,
            attr_type,
            instance_rate: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GfxDrawMode {
    Point,
    Triangle,
    TriangleStrip,
    Line,
    LineStrip,
}

/// Pipeline state: the buffers it draws, the vertex layout, and fixed
/// function knobs. Retained by compound resources so pipelines can be
/// rebuilt after a reload.
#[derive(Debug, Clone, PartialEq)]
pub struct GfxPipelineDesc {
    pub vertex_buffer: Option<GfxBuffer>,
    pub vertices_count: usize,
    pub index_buffer: Option<GfxBuffer>,
    pub indices_count: usize,
    pub shader: Option<GfxShader>,
    pub layout: Vec<GfxLayoutAttr>,
    pub draw_mode: GfxDrawMode,
    pub depth_mask: bool,
    pub stencil_ref: u32,
    pub blend_factor: Vec4,
}

impl Default for GfxPipelineDesc {
    fn default() -> Self {
        Self {
            vertex_buffer: None,
            vertices_count: 0,
            index_buffer: None,
            indices_count: 0,
            shader: None,
            layout: Vec::new(),
            draw_mode: GfxDrawMode::Triangle,
            depth_mask: true,
            stencil_ref: 1,
            blend_factor: Vec4::ZERO,
        }
    }
}
