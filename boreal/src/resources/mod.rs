//! Grouped resource management.
//!
//! Resources live in named groups with a shared parent directory and a
//! common lifetime; a [`ResourceId`] is the only way to refer to one.
//! [`Resources`] is the context object every operation goes through — there
//! is no global state.

mod arena;
mod geometry;
mod group;
mod id;
mod importer;
mod manager;
mod shader_context;
mod types;

pub use arena::SlotArena;
pub use geometry::GeometryType;
pub use group::ResourceGroup;
pub use id::{ResourceGroupId, ResourceId, RESOURCE_CACHE_GROUP, RESOURCE_GROUP_INVALID};
pub use manager::Resources;
pub use types::{
    AudioBufferDesc, Font, Glyph, Material, MaterialDesc, Mesh, Model, ShaderContext, Skybox,
    MATERIAL_MAP_DIFFUSE, MATERIAL_MAP_SPECULAR, SHADER_MATRICES_BUFFER_INDEX,
    SHADER_UNIFORM_BUFFERS_MAX,
};

pub use boreal_common::ResourceKind;
