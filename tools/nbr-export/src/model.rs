//! glTF/GLB model conversion.
//!
//! Each primitive becomes one mesh with an interleaved f32 vertex stream
//! shaped by the component bitfield. Post-processing: identical vertices
//! are joined, vertex order is rewritten to index first-use order for cache
//! locality, and positions go through the global import scale. Materials
//! carry the PBR factors plus texture indices into the embedded texture
//! array; every referenced image is embedded as an NBR texture.

use std::path::Path;

use anyhow::{bail, Context, Result};
use hashbrown::HashMap;

use boreal_common::{
    NbrMaterial, NbrMesh, NbrModel, NbrTexture, PixelFormat, VERTEX_COLOR0, VERTEX_NORMAL,
    VERTEX_POSITION, VERTEX_TANGENT, VERTEX_UV,
};

/// Convert a glTF/GLB file into a model payload.
///
/// `scale` multiplies every vertex position on the way in.
pub fn convert_gltf_model(input: &Path, scale: f32) -> Result<NbrModel> {
    let (document, buffers, images) =
        gltf::import(input).with_context(|| format!("failed to load glTF '{}'", input.display()))?;

    let textures = convert_images(&images)?;
    let materials = convert_materials(&document, textures.len())?;

    let mut meshes = Vec::new();
    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            meshes.push(convert_primitive(&primitive, &buffers, &document, scale)?);
        }
    }

    if meshes.is_empty() {
        bail!("no meshes found in '{}'", input.display());
    }
    if meshes.len() > u16::MAX as usize {
        bail!("model has {} meshes, the format caps at 65535", meshes.len());
    }

    let model = NbrModel {
        meshes,
        materials,
        textures,
    };
    model
        .validate_indices()
        .context("glTF produced out-of-range material or texture indices")?;

    tracing::info!(
        "converted model '{}': {} meshes, {} materials, {} textures",
        input.display(),
        model.meshes.len(),
        model.materials.len(),
        model.textures.len()
    );
    Ok(model)
}

fn convert_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    document: &gltf::Document,
    scale: f32,
) -> Result<NbrMesh> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        bail!("only triangulated primitives are supported (found {:?})", primitive.mode());
    }

    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .context("primitive has no positions")?
        .map(|p| [p[0] * scale, p[1] * scale, p[2] * scale])
        .collect();

    let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|iter| iter.collect());
    let tangents: Option<Vec<[f32; 3]>> = reader
        .read_tangents()
        .map(|iter| iter.map(|t| [t[0], t[1], t[2]]).collect());
    let colors: Option<Vec<[f32; 4]>> = reader
        .read_colors(0)
        .map(|colors| colors.into_rgba_f32().collect());
    let uvs: Option<Vec<[f32; 2]>> = reader
        .read_tex_coords(0)
        .map(|coords| coords.into_f32().collect());

    let mut components = VERTEX_POSITION;
    if normals.is_some() {
        components |= VERTEX_NORMAL;
    }
    if tangents.is_some() {
        components |= VERTEX_TANGENT;
    }
    if colors.is_some() {
        components |= VERTEX_COLOR0;
    }
    if uvs.is_some() {
        components |= VERTEX_UV;
    }

    // Interleave in bitfield order.
    let vertex_count = positions.len();
    let mut interleaved: Vec<Vec<f32>> = Vec::with_capacity(vertex_count);
    for i in 0..vertex_count {
        let mut vertex = Vec::new();
        vertex.extend_from_slice(&positions[i]);
        if let Some(normals) = &normals {
            vertex.extend_from_slice(&normals[i]);
        }
        if let Some(tangents) = &tangents {
            vertex.extend_from_slice(&tangents[i]);
        }
        if let Some(colors) = &colors {
            vertex.extend_from_slice(&colors[i]);
        }
        if let Some(uvs) = &uvs {
            vertex.extend_from_slice(&uvs[i]);
        }
        interleaved.push(vertex);
    }

    let indices: Vec<u32> = match reader.read_indices() {
        Some(read) => read.into_u32().collect(),
        None => (0..vertex_count as u32).collect(),
    };

    let (vertices, indices) = join_and_reorder(&interleaved, &indices);

    let material_index = material_slot(primitive, document)?;

    Ok(NbrMesh {
        vertex_components: components,
        vertices,
        indices,
        material_index,
    })
}

/// Join identical vertices, then rewrite vertex order to first-use order of
/// the index stream so sequential fetches stay local.
fn join_and_reorder(vertices: &[Vec<f32>], indices: &[u32]) -> (Vec<f32>, Vec<u32>) {
    // Exact bit equality; NaNs never join.
    let key = |vertex: &[f32]| -> Vec<u32> { vertex.iter().map(|f| f.to_bits()).collect() };

    let mut joined: Vec<&Vec<f32>> = Vec::new();
    let mut lookup: HashMap<Vec<u32>, u32> = HashMap::new();
    let mut remap = vec![0u32; vertices.len()];

    for (i, vertex) in vertices.iter().enumerate() {
        let entry = lookup.entry(key(vertex)).or_insert_with(|| {
            joined.push(vertex);
            (joined.len() - 1) as u32
        });
        remap[i] = *entry;
    }

    // First-use reorder over the joined set.
    let mut order: Vec<u32> = Vec::with_capacity(joined.len());
    let mut position = vec![u32::MAX; joined.len()];
    let mut out_indices = Vec::with_capacity(indices.len());
    for &index in indices {
        let joined_index = remap[index as usize] as usize;
        if position[joined_index] == u32::MAX {
            position[joined_index] = order.len() as u32;
            order.push(joined_index as u32);
        }
        out_indices.push(position[joined_index]);
    }
    // Vertices never referenced by an index keep a slot at the tail.
    for joined_index in 0..joined.len() {
        if position[joined_index] == u32::MAX {
            position[joined_index] = order.len() as u32;
            order.push(joined_index as u32);
        }
    }

    let mut out_vertices = Vec::new();
    for &joined_index in &order {
        out_vertices.extend_from_slice(joined[joined_index as usize]);
    }

    (out_vertices, out_indices)
}

fn material_slot(primitive: &gltf::Primitive, _document: &gltf::Document) -> Result<u8> {
    let index = primitive.material().index().unwrap_or(0);
    if index > u8::MAX as usize {
        bail!("material index {index} does not fit the format's u8 slot");
    }
    Ok(index as u8)
}

fn convert_materials(document: &gltf::Document, texture_count: usize) -> Result<Vec<NbrMaterial>> {
    let image_index = |texture: Option<gltf::texture::Info>| -> Result<i8> {
        match texture {
            Some(info) => {
                let index = info.texture().source().index();
                if index >= texture_count || index > i8::MAX as usize {
                    bail!("texture index {index} out of range");
                }
                Ok(index as i8)
            }
            None => Ok(-1),
        }
    };

    let mut materials = Vec::new();
    for material in document.materials() {
        let pbr = material.pbr_metallic_roughness();
        let base_color = pbr.base_color_factor();

        let metallic_roughness_index = match pbr.metallic_roughness_texture() {
            Some(info) => {
                let index = info.texture().source().index();
                if index >= texture_count || index > i8::MAX as usize {
                    bail!("texture index {index} out of range");
                }
                index as i8
            }
            None => -1,
        };

        let normal_index = match material.normal_texture() {
            Some(normal) => {
                let index = normal.texture().source().index();
                if index >= texture_count || index > i8::MAX as usize {
                    bail!("texture index {index} out of range");
                }
                index as i8
            }
            None => -1,
        };

        materials.push(NbrMaterial {
            color: [base_color[0], base_color[1], base_color[2]],
            metallic: pbr.metallic_factor(),
            roughness: pbr.roughness_factor(),
            albedo_index: image_index(pbr.base_color_texture())?,
            // glTF packs metallic and roughness into one image.
            metallic_index: metallic_roughness_index,
            roughness_index: metallic_roughness_index,
            normal_index,
        });
    }

    if materials.len() > u8::MAX as usize {
        bail!("model has {} materials, the format caps at 255", materials.len());
    }
    Ok(materials)
}

fn convert_images(images: &[gltf::image::Data]) -> Result<Vec<NbrTexture>> {
    use gltf::image::Format;

    if images.len() > u8::MAX as usize {
        bail!("model references {} images, the format caps at 255", images.len());
    }

    let mut textures = Vec::with_capacity(images.len());
    for data in images {
        let pixel_count = (data.width * data.height) as usize;
        let pixels: Vec<u8> = match data.format {
            Format::R8 => data
                .pixels
                .iter()
                .flat_map(|&r| [r, r, r, 0xFF])
                .collect(),
            Format::R8G8 => data
                .pixels
                .chunks_exact(2)
                .flat_map(|p| [p[0], p[1], 0, 0xFF])
                .collect(),
            Format::R8G8B8 => data
                .pixels
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 0xFF])
                .collect(),
            Format::R8G8B8A8 => data.pixels.clone(),
            other => bail!("unsupported glTF image format {other:?}"),
        };

        if pixels.len() != pixel_count * 4 {
            bail!("decoded glTF image has the wrong pixel count");
        }

        textures.push(NbrTexture {
            width: data.width,
            height: data.height,
            channels: 4,
            format: PixelFormat::Rgba8,
            pixels,
        });
    }
    Ok(textures)
}
