//! Resource manager behavior against the headless backend and real NBR
//! files on disk.

use std::path::Path;

use glam::Vec3;
use tempfile::TempDir;

use boreal::gfx::{
    GfxBufferDesc, GfxBufferType, GfxBufferUsage, GfxShaderDesc, GfxTextureDesc, HeadlessBackend,
};
use boreal::resources::{
    GeometryType, MaterialDesc, ResourceId, Resources, RESOURCE_CACHE_GROUP,
};
use boreal_common::{
    AudioFormat, NbrAudio, NbrCubemap, NbrFile, NbrFont, NbrGlyph, NbrMaterial, NbrMesh, NbrModel,
    NbrPayload, NbrShader, NbrTexture, PixelFormat, VERTEX_POSITION, VERTEX_UV,
};

fn new_resources() -> Resources {
    Resources::new(Box::new(HeadlessBackend::default()))
}

fn texture_payload(width: u32, height: u32) -> NbrPayload {
    NbrPayload::Texture(NbrTexture {
        width,
        height,
        channels: 4,
        format: PixelFormat::Rgba8,
        pixels: vec![0xAB; (width * height * 4) as usize],
    })
}

fn write_texture(dir: &Path, name: &str, width: u32, height: u32) {
    NbrFile::save(&texture_payload(width, height), &dir.join(name)).unwrap();
}

#[test]
fn defaults_are_registered_in_the_cache_group() {
    let resources = new_resources();

    let texture_id = resources.get_id(RESOURCE_CACHE_GROUP, "default_texture");
    let buffer_id = resources.get_id(RESOURCE_CACHE_GROUP, "matrix_buffer");

    assert!(texture_id.is_valid());
    assert!(buffer_id.is_valid());

    let handle = resources.get_texture(texture_id);
    let desc = resources.backend().texture_desc(handle).unwrap();
    assert_eq!((desc.width, desc.height), (4, 4));

    let buffer = resources.get_buffer(buffer_id);
    assert!(resources.backend().buffer_desc(buffer).is_some());
}

#[test]
fn missing_name_returns_the_invalid_sentinel() {
    let resources = new_resources();
    let id = resources.get_id(RESOURCE_CACHE_GROUP, "does_not_exist");
    assert!(!id.is_valid());
    assert_eq!(id, ResourceId::INVALID);
}

#[test]
fn push_texture_file_registers_by_stem() {
    let dir = TempDir::new().unwrap();
    write_texture(dir.path(), "t", 2, 2);

    let mut resources = new_resources();
    let group = resources.create_group("g", dir.path());

    let pushed = resources.push_texture_file(group, Path::new("t.nbrtexture"));
    assert!(pushed.is_valid());

    // A push followed by a lookup in the same frame sees the resource.
    let id = resources.get_id(group, "t");
    assert_eq!(id, pushed);

    let desc = resources
        .backend()
        .texture_desc(resources.get_texture(id))
        .unwrap()
        .clone();
    assert_eq!((desc.width, desc.height), (2, 2));
}

#[test]
fn missing_file_returns_invalid_without_registry_damage() {
    let dir = TempDir::new().unwrap();
    let mut resources = new_resources();
    let group = resources.create_group("g", dir.path());

    let id = resources.push_texture_file(group, Path::new("nope.nbrtexture"));
    assert!(!id.is_valid());
    assert!(!resources.get_id(group, "nope").is_valid());
}

#[test]
fn destroy_group_frees_exactly_its_own_handles() {
    let dir_a = TempDir::new().unwrap();
    let dir_b = TempDir::new().unwrap();
    write_texture(dir_a.path(), "a", 2, 2);
    write_texture(dir_b.path(), "b", 2, 2);

    let mut resources = new_resources();
    let group_a = resources.create_group("a", dir_a.path());
    let group_b = resources.create_group("b", dir_b.path());

    let id_a = resources.push_texture_file(group_a, Path::new("a.nbrtexture"));
    let id_b = resources.push_texture_file(group_b, Path::new("b.nbrtexture"));
    assert!(id_a.is_valid() && id_b.is_valid());

    let handle_a = resources.get_texture(id_a);
    let handle_b = resources.get_texture(id_b);

    resources.destroy_group(group_b);

    // A's handle still resolves; B's backend storage is gone.
    assert!(resources.backend().texture_desc(handle_a).is_some());
    assert!(resources.backend().texture_desc(handle_b).is_none());
    assert_eq!(resources.get_texture(id_a), handle_a);
}

#[test]
#[should_panic]
fn lookup_in_destroyed_group_is_fatal() {
    let dir = TempDir::new().unwrap();
    write_texture(dir.path(), "t", 2, 2);

    let mut resources = new_resources();
    let group = resources.create_group("g", dir.path());
    let id = resources.push_texture_file(group, Path::new("t.nbrtexture"));

    resources.destroy_group(group);
    let _ = resources.get_texture(id);
}

#[test]
#[should_panic]
fn kind_mismatch_is_fatal() {
    let resources = new_resources();
    let id = resources.get_id(RESOURCE_CACHE_GROUP, "default_texture");
    let _ = resources.get_buffer(id);
}

#[test]
fn clear_group_resets_names_but_keeps_backend_handles() {
    let dir = TempDir::new().unwrap();
    write_texture(dir.path(), "t", 2, 2);

    let mut resources = new_resources();
    let group = resources.create_group("g", dir.path());
    let id = resources.push_texture_file(group, Path::new("t.nbrtexture"));
    let handle = resources.get_texture(id);

    resources.clear_group(group);

    assert!(!resources.get_id(group, "t").is_valid());
    // Logical binding is gone, the backend resource is not.
    assert!(resources.backend().texture_desc(handle).is_some());
}

#[test]
fn push_dir_classifies_by_extension() {
    let dir = TempDir::new().unwrap();
    let assets = dir.path().join("assets");
    std::fs::create_dir(&assets).unwrap();

    write_texture(&assets, "wall", 2, 2);
    NbrFile::save(
        &NbrPayload::Shader(NbrShader::Render {
            vertex: "void main(){}".into(),
            pixel: "void main(){}".into(),
        }),
        &assets.join("basic"),
    )
    .unwrap();
    std::fs::write(assets.join("notes.txt"), b"not a resource").unwrap();

    let mut resources = new_resources();
    let group = resources.create_group("g", dir.path());
    resources.push_dir(group, Path::new("assets"));

    assert!(resources.get_id(group, "wall").is_valid());
    assert!(resources.get_id(group, "basic").is_valid());
    assert!(!resources.get_id(group, "notes").is_valid());
}

#[test]
fn cube_geometry_mesh_owns_its_buffers() {
    let dir = TempDir::new().unwrap();
    let mut resources = new_resources();
    let group = resources.create_group("g", dir.path());

    let mesh_id = resources.push_mesh_geometry(group, GeometryType::Cube);
    assert!(mesh_id.is_valid());

    let mesh = resources.get_mesh(mesh_id);
    assert_eq!(mesh.pipeline_desc.vertices_count, 24);
    assert_eq!(mesh.pipeline_desc.indices_count, 36);
    assert_eq!(mesh.pipeline_desc.layout.len(), 6);
    assert_eq!(mesh.vertex_buffer.group, group);
    assert_eq!(mesh.index_buffer.group, group);

    let vertex_buffer = mesh.vertex_buffer;
    assert!(resources
        .backend()
        .buffer_desc(resources.get_buffer(vertex_buffer))
        .is_some());
}

#[test]
fn skybox_from_cubemap_file() {
    let dir = TempDir::new().unwrap();
    NbrFile::save(
        &NbrPayload::Cubemap(NbrCubemap {
            width: 1,
            height: 1,
            channels: 4,
            format: PixelFormat::Rgba8,
            faces: (0..6u8).map(|f| vec![f; 4]).collect(),
        }),
        &dir.path().join("sky"),
    )
    .unwrap();

    let mut resources = new_resources();
    let group = resources.create_group("g", dir.path());

    let skybox_id = resources.push_skybox_file(group, Path::new("sky.nbrcubemap"));
    assert!(skybox_id.is_valid());

    let skybox = resources.get_skybox(skybox_id);
    assert_eq!(skybox.pipeline_desc.vertices_count, 36);
    assert!(skybox.cubemap.is_valid());

    let cubemap = resources.get_cubemap(resources.get_id(group, "sky"));
    let desc = resources.backend().cubemap_desc(cubemap).unwrap();
    assert_eq!(desc.faces.len(), 6);
}

#[test]
fn model_file_import_wires_indices_and_textures() {
    let dir = TempDir::new().unwrap();

    let model = NbrModel {
        meshes: vec![
            NbrMesh {
                vertex_components: VERTEX_POSITION | VERTEX_UV,
                vertices: vec![0.0; 15],
                indices: vec![0, 1, 2],
                material_index: 1,
            },
            NbrMesh {
                vertex_components: VERTEX_POSITION,
                vertices: vec![0.0; 9],
                indices: vec![0, 1, 2],
                material_index: 0,
            },
        ],
        materials: vec![
            NbrMaterial {
                color: [0.5, 0.5, 0.5],
                albedo_index: -1,
                ..Default::default()
            },
            NbrMaterial {
                color: [1.0, 0.0, 0.0],
                albedo_index: 0,
                metallic_index: 1,
                ..Default::default()
            },
        ],
        textures: vec![
            NbrTexture {
                width: 1,
                height: 1,
                channels: 4,
                format: PixelFormat::Rgba8,
                pixels: vec![0xFF; 4],
            },
            NbrTexture {
                width: 2,
                height: 1,
                channels: 4,
                format: PixelFormat::Rgba8,
                pixels: vec![0x80; 8],
            },
        ],
    };
    NbrFile::save(&NbrPayload::Model(model), &dir.path().join("crate_stack")).unwrap();

    let mut resources = new_resources();
    let group = resources.create_group("g", dir.path());

    let model_id = resources.push_model_file(group, Path::new("crate_stack.nbrmodel"));
    assert!(model_id.is_valid());
    assert_eq!(resources.get_id(group, "crate_stack"), model_id);

    let model = resources.get_model(model_id).clone();
    assert_eq!(model.meshes.len(), 2);
    assert_eq!(model.materials.len(), 2);
    assert_eq!(model.material_indices, vec![1, 0]);
    assert_eq!(model.textures.len(), 2);

    // Every material index addresses a real material in the same group.
    for &index in &model.material_indices {
        assert!((index as usize) < model.materials.len());
    }

    let red = resources.get_material(model.materials[1]);
    assert!(red.diffuse_map.is_some());
    assert!(red.specular_map.is_some());
    assert_eq!(red.color, Vec3::new(1.0, 0.0, 0.0));

    let untextured = resources.get_material(model.materials[0]);
    assert!(untextured.diffuse_map.is_none());
}

#[test]
fn font_file_import_builds_glyph_textures() {
    let dir = TempDir::new().unwrap();

    let font = NbrFont {
        glyphs: vec![
            NbrGlyph {
                unicode: b'A' as i8,
                width: 2,
                height: 2,
                advance_x: 120,
                pixels: vec![0, 255, 255, 0],
                ..Default::default()
            },
            NbrGlyph {
                unicode: b' ' as i8,
                advance_x: 60,
                ..Default::default()
            },
        ],
        ascent: 200,
        descent: -50,
        line_gap: 12,
    };
    NbrFile::save(&NbrPayload::Font(font), &dir.path().join("mono")).unwrap();

    let mut resources = new_resources();
    let group = resources.create_group("g", dir.path());

    let font_id = resources.push_font_file(group, Path::new("mono.nbrfont"));
    assert!(font_id.is_valid());

    let font = resources.get_font(font_id).clone();
    assert_eq!(font.ascent, 200.0);
    assert_eq!(font.glyphs.len(), 2);

    let a = &font.glyphs[&(b'A' as i8)];
    let texture_id = a.texture.expect("glyph with a bitmap gets a texture");
    let desc = resources
        .backend()
        .texture_desc(resources.get_texture(texture_id))
        .unwrap();
    assert_eq!((desc.width, desc.height), (2, 2));
    assert_eq!(desc.format, boreal::gfx::GfxTextureFormat::R8);

    // Spaces carry metrics but no bitmap.
    assert!(font.glyphs[&(b' ' as i8)].texture.is_none());
}

#[test]
fn audio_file_import_keeps_format_authoritative() {
    let dir = TempDir::new().unwrap();

    NbrFile::save(
        &NbrPayload::Audio(NbrAudio {
            format: AudioFormat::I16,
            sample_rate: 22_050,
            channels: 1,
            samples: vec![0u8; 32],
        }),
        &dir.path().join("beep"),
    )
    .unwrap();

    let mut resources = new_resources();
    let group = resources.create_group("g", dir.path());

    let id = resources.push_audio_file(group, Path::new("beep.nbraudio"));
    assert!(id.is_valid());

    let buffer = resources.get_audio_buffer(id);
    assert_eq!(buffer.format, AudioFormat::I16);
    assert_eq!(buffer.sample_rate, 22_050);
    assert_eq!(buffer.channels, 1);
    assert_eq!(buffer.data.len(), 32);
}

#[test]
fn shader_context_caches_uniform_locations() {
    let dir = TempDir::new().unwrap();
    let mut resources = new_resources();
    let group = resources.create_group("g", dir.path());

    let shader_id = resources.push_shader(
        group,
        GfxShaderDesc {
            vertex_source: "uniform mat4 u_model;\nvoid main(){}".into(),
            pixel_source: "uniform vec3 u_color;\nvoid main(){}".into(),
            compute_source: None,
        },
    );
    let ctx_id = resources.push_shader_context(group, shader_id);
    assert!(ctx_id.is_valid());

    // The cache group's matrices buffer is pre-bound.
    let context = resources.get_shader_context(ctx_id);
    assert!(context.uniform_buffers[0].is_some());

    resources.shader_context_cache_uniform(ctx_id, "u_color");
    resources.shader_context_cache_uniform(ctx_id, "u_not_there");

    let context = resources.get_shader_context(ctx_id);
    assert!(context.uniforms_cache.contains_key("u_color"));
    assert!(!context.uniforms_cache.contains_key("u_not_there"));

    // Setting a cached uniform goes through; unknown names are no-ops.
    resources.shader_context_set_uniform_vec3(ctx_id, "u_color", Vec3::ONE);
    resources.shader_context_set_uniform_f32(ctx_id, "u_not_there", 1.0);
}

#[test]
fn materials_from_descriptors_set_map_flags() {
    let dir = TempDir::new().unwrap();
    write_texture(dir.path(), "diffuse", 2, 2);

    let mut resources = new_resources();
    let group = resources.create_group("g", dir.path());
    let diffuse = resources.push_texture_file(group, Path::new("diffuse.nbrtexture"));

    let with_map = resources.push_material(
        group,
        &MaterialDesc {
            diffuse_id: diffuse,
            color: Vec3::new(0.2, 0.4, 0.6),
            ..Default::default()
        },
    );
    let bare = resources.push_material(group, &MaterialDesc::default());

    let material = resources.get_material(with_map);
    assert_eq!(material.map_flags & boreal::resources::MATERIAL_MAP_DIFFUSE, 1);
    assert_eq!(material.color, Vec3::new(0.2, 0.4, 0.6));

    assert_eq!(resources.get_material(bare).map_flags, 0);
}

#[test]
fn plain_buffer_pushes_work_without_files() {
    let dir = TempDir::new().unwrap();
    let mut resources = new_resources();
    let group = resources.create_group("g", dir.path());

    let id = resources.push_buffer(
        group,
        GfxBufferDesc {
            data: Some(vec![0u8; 256]),
            size: 256,
            buffer_type: GfxBufferType::Vertex,
            usage: GfxBufferUsage::StaticDraw,
        },
    );
    assert!(id.is_valid());

    let desc = resources
        .backend()
        .buffer_desc(resources.get_buffer(id))
        .unwrap();
    assert_eq!(desc.size, 256);
}

#[test]
fn texture_descriptor_pushes_work_without_files() {
    let dir = TempDir::new().unwrap();
    let mut resources = new_resources();
    let group = resources.create_group("g", dir.path());

    let id = resources.push_texture(
        group,
        GfxTextureDesc {
            width: 8,
            height: 8,
            data: Some(vec![0u8; 8 * 8 * 4]),
            ..Default::default()
        },
    );
    assert!(id.is_valid());
    assert_eq!(id.group, group);
}
