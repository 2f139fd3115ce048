//! Runtime NBR importers: decoded payloads → live resources in a group.
//!
//! These never touch the file system; the container layer has already done
//! the decoding. Texture, cubemap, shader, and audio imports only shape a
//! descriptor; mesh, model, and font imports also push the resources they
//! are made of into the target group.

use boreal_common::{
    NbrAudio, NbrCubemap, NbrFont, NbrMesh, NbrModel, NbrShader, NbrTexture, PixelFormat,
    VERTEX_COLOR0, VERTEX_COLOR1, VERTEX_NORMAL, VERTEX_POSITION, VERTEX_TANGENT, VERTEX_UV,
};
use glam::Vec2;

use crate::gfx::{
    GfxBufferDesc, GfxBufferType, GfxBufferUsage, GfxCubemapDesc, GfxDrawMode, GfxLayoutAttr,
    GfxLayoutType, GfxPipelineDesc, GfxShaderDesc, GfxTextureDesc, GfxTextureFormat,
    GfxTextureFilter, GfxTextureType, GfxTextureWrap,
};

use super::id::{ResourceGroupId, ResourceId};
use super::manager::Resources;
use super::types::{AudioBufferDesc, Font, Glyph, Material, Model, MATERIAL_MAP_DIFFUSE,
    MATERIAL_MAP_SPECULAR};

pub(crate) fn texture_format(format: PixelFormat) -> GfxTextureFormat {
    match format {
        PixelFormat::R8 => GfxTextureFormat::R8,
        PixelFormat::Rg8 => GfxTextureFormat::Rg8,
        PixelFormat::Rgba8 => GfxTextureFormat::Rgba8,
        PixelFormat::Rgba16F => GfxTextureFormat::Rgba16F,
    }
}

/// Vertex attribute list derived from the component bitfield, in bit order.
pub(crate) fn vertex_layout(components: u8) -> Vec<GfxLayoutAttr> {
    let mut layout = Vec::new();
    if components & VERTEX_POSITION != 0 {
        layout.push(GfxLayoutAttr::new("POSITION", GfxLayoutType::Float3));
    }
    if components & VERTEX_NORMAL != 0 {
        layout.push(GfxLayoutAttr::new("NORMAL", GfxLayoutType::Float3));
    }
    if components & VERTEX_TANGENT != 0 {
        layout.push(GfxLayoutAttr::new("TANGENT", GfxLayoutType::Float3));
    }
    if components & VERTEX_COLOR0 != 0 {
        layout.push(GfxLayoutAttr::new("COLOR0", GfxLayoutType::Float4));
    }
    if components & VERTEX_COLOR1 != 0 {
        layout.push(GfxLayoutAttr::new("COLOR1", GfxLayoutType::Float4));
    }
    if components & VERTEX_UV != 0 {
        layout.push(GfxLayoutAttr::new("TEX", GfxLayoutType::Float2));
    }
    layout
}

/// Fill `desc` from the payload; sampler state already in `desc` is kept.
pub(crate) fn import_texture(nbr: &NbrTexture, desc: &mut GfxTextureDesc) {
    desc.width = nbr.width;
    desc.height = nbr.height;
    desc.depth = 0;
    desc.mips = 1;
    desc.texture_type = GfxTextureType::Tex2D;
    desc.format = texture_format(nbr.format);
    desc.data = Some(nbr.pixels.clone());
}

pub(crate) fn import_cubemap(nbr: &NbrCubemap, desc: &mut GfxCubemapDesc) {
    desc.width = nbr.width;
    desc.height = nbr.height;
    desc.mips = 1;
    desc.format = texture_format(nbr.format);
    desc.faces = nbr.faces.clone();
}

pub(crate) fn import_shader(nbr: &NbrShader, desc: &mut GfxShaderDesc) {
    match nbr {
        NbrShader::Compute { source } => {
            desc.compute_source = Some(source.clone());
            desc.vertex_source.clear();
            desc.pixel_source.clear();
        }
        NbrShader::Render { vertex, pixel } => {
            desc.vertex_source = vertex.clone();
            desc.pixel_source = pixel.clone();
            desc.compute_source = None;
        }
    }
}

/// Push the mesh's buffers into `group_id` and assemble its pipeline
/// descriptor. Returns `None` when a buffer fails to materialize.
pub(crate) fn import_mesh(
    resources: &mut Resources,
    group_id: ResourceGroupId,
    nbr: &NbrMesh,
) -> Option<(ResourceId, ResourceId, GfxPipelineDesc)> {
    let vertex_data: Vec<u8> = bytemuck::cast_slice(&nbr.vertices).to_vec();
    let vertex_id = resources.push_buffer(
        group_id,
        GfxBufferDesc {
            size: vertex_data.len(),
            data: Some(vertex_data),
            buffer_type: GfxBufferType::Vertex,
            usage: GfxBufferUsage::StaticDraw,
        },
    );

    let index_data: Vec<u8> = bytemuck::cast_slice(&nbr.indices).to_vec();
    let index_id = resources.push_buffer(
        group_id,
        GfxBufferDesc {
            size: index_data.len(),
            data: Some(index_data),
            buffer_type: GfxBufferType::Index,
            usage: GfxBufferUsage::StaticDraw,
        },
    );

    if !vertex_id.is_valid() || !index_id.is_valid() {
        return None;
    }

    let pipeline_desc = GfxPipelineDesc {
        vertex_buffer: resources.try_get_buffer(vertex_id),
        vertices_count: nbr.vertex_count(),
        index_buffer: resources.try_get_buffer(index_id),
        indices_count: nbr.indices.len(),
        layout: vertex_layout(nbr.vertex_components),
        draw_mode: GfxDrawMode::Triangle,
        ..Default::default()
    };

    Some((vertex_id, index_id, pipeline_desc))
}

/// Import a whole model: embedded textures first, then materials wired to
/// them, then one mesh per NBR mesh with its material index.
pub(crate) fn import_model(
    resources: &mut Resources,
    group_id: ResourceGroupId,
    nbr: &NbrModel,
) -> Model {
    let mut model = Model::default();

    let mut texture_ids = Vec::with_capacity(nbr.textures.len());
    for texture in &nbr.textures {
        let mut desc = GfxTextureDesc {
            filter: GfxTextureFilter::MinMagLinear,
            wrap_mode: GfxTextureWrap::Clamp,
            ..Default::default()
        };
        import_texture(texture, &mut desc);
        texture_ids.push(resources.push_texture(group_id, desc));
    }
    model.textures = texture_ids.clone();

    for nbr_material in &nbr.materials {
        let lookup = |index: i8| -> Option<ResourceId> {
            (index >= 0)
                .then(|| texture_ids.get(index as usize).copied())
                .flatten()
                .filter(|id| id.is_valid())
        };

        let diffuse_map = lookup(nbr_material.albedo_index);
        // The metallic-roughness map rides in the specular slot.
        let specular_map = lookup(nbr_material.metallic_index);

        let mut map_flags = 0;
        if diffuse_map.is_some() {
            map_flags |= MATERIAL_MAP_DIFFUSE;
        }
        if specular_map.is_some() {
            map_flags |= MATERIAL_MAP_SPECULAR;
        }

        let material = Material {
            diffuse_map,
            specular_map,
            color: nbr_material.color.into(),
            shininess: 1.0 - nbr_material.roughness,
            transparency: 1.0,
            map_flags,
        };
        model.materials.push(resources.push_material_value(group_id, material));
    }

    for nbr_mesh in &nbr.meshes {
        let mesh_id = resources.push_mesh(group_id, nbr_mesh);
        model.meshes.push(mesh_id);
        model.material_indices.push(nbr_mesh.material_index);
    }

    model
}

/// Import a font: metrics copy over, and every glyph with a bitmap gets its
/// own single-channel texture in the group.
pub(crate) fn import_font(
    resources: &mut Resources,
    group_id: ResourceGroupId,
    nbr: &NbrFont,
) -> Font {
    let mut font = Font {
        ascent: nbr.ascent as f32,
        descent: nbr.descent as f32,
        line_gap: nbr.line_gap as f32,
        glyphs: Default::default(),
    };

    for nbr_glyph in &nbr.glyphs {
        let mut glyph = Glyph {
            unicode: nbr_glyph.unicode,
            texture: None,
            size: Vec2::new(nbr_glyph.width as f32, nbr_glyph.height as f32),
            offset: Vec2::new(nbr_glyph.offset_x as f32, nbr_glyph.offset_y as f32),
            left: nbr_glyph.left as i32,
            right: nbr_glyph.right as i32,
            top: nbr_glyph.top as i32,
            bottom: nbr_glyph.bottom as i32,
            advance_x: nbr_glyph.advance_x as i32,
            kern: nbr_glyph.kern as i32,
            left_bearing: nbr_glyph.left_bearing as i32,
        };

        if nbr_glyph.width > 0 && nbr_glyph.height > 0 {
            let desc = GfxTextureDesc {
                width: nbr_glyph.width as u32,
                height: nbr_glyph.height as u32,
                depth: 0,
                mips: 1,
                texture_type: GfxTextureType::Tex2D,
                format: GfxTextureFormat::R8,
                filter: GfxTextureFilter::MinMagLinear,
                wrap_mode: GfxTextureWrap::Clamp,
                data: Some(nbr_glyph.pixels.clone()),
            };
            let id = resources.push_texture(group_id, desc);
            if id.is_valid() {
                glyph.texture = Some(id);
            }
        }

        font.glyphs.insert(glyph.unicode, glyph);
    }

    font
}

/// Shape an audio buffer descriptor from the payload. The format byte is
/// authoritative for the sample encoding.
pub(crate) fn import_audio(nbr: &NbrAudio) -> AudioBufferDesc {
    AudioBufferDesc {
        format: nbr.format,
        channels: nbr.channels,
        sample_rate: nbr.sample_rate,
        data: nbr.samples.clone(),
    }
}
