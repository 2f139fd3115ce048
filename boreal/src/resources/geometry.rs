//! Built-in geometry shapes.
//!
//! Each shape fills a pipeline descriptor and pushes its vertex/index
//! buffers into the caller's group, which owns them from then on. Cube
//! normals are synthesized per indexed triangle; tangents come from the
//! edge and UV-delta pairs of the same triangle.

use glam::{Vec2, Vec3, Vec4};

use crate::gfx::{
    GfxBufferDesc, GfxBufferType, GfxBufferUsage, GfxDrawMode, GfxLayoutAttr, GfxLayoutType,
    GfxPipelineDesc,
};

use super::id::{ResourceGroupId, ResourceId};
use super::manager::Resources;

/// The fixed set of shapes the loader can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryType {
    Cube,
    Skybox,
    Billboard,
    DebugCube,
}

/// A generated shape: the filled pipeline descriptor plus the ids of the
/// buffers pushed into the group. `index_buffer` is invalid for unindexed
/// shapes.
pub(crate) struct BuiltGeometry {
    pub desc: GfxPipelineDesc,
    pub vertex_buffer: ResourceId,
    pub index_buffer: ResourceId,
}

/// One fully attributed vertex: position, normal, tangent, two color sets,
/// and texture coordinates.
#[derive(Debug, Clone, Copy)]
struct Vertex3D {
    position: Vec3,
    normal: Vec3,
    tangent: Vec3,
    color0: Vec4,
    color1: Vec4,
    uv: Vec2,
}

impl Vertex3D {
    fn at(position: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            normal: Vec3::ZERO,
            tangent: Vec3::ZERO,
            color0: Vec4::ONE,
            color1: Vec4::ONE,
            uv,
        }
    }

    fn write_floats(&self, out: &mut Vec<f32>) {
        out.extend_from_slice(&self.position.to_array());
        out.extend_from_slice(&self.normal.to_array());
        out.extend_from_slice(&self.tangent.to_array());
        out.extend_from_slice(&self.color0.to_array());
        out.extend_from_slice(&self.color1.to_array());
        out.extend_from_slice(&self.uv.to_array());
    }
}

/// Assign each indexed triangle the normalized cross product of its edges;
/// all three vertices of a face share the value.
fn generate_normals(vertices: &mut [Vertex3D], indices: &[u32]) {
    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];

        let edge1 = vertices[i1].position - vertices[i0].position;
        let edge2 = vertices[i2].position - vertices[i0].position;
        let normal = edge1.cross(edge2).normalize();

        vertices[i0].normal = normal;
        vertices[i1].normal = normal;
        vertices[i2].normal = normal;
    }
}

/// Tangent per indexed triangle from the edge and UV-delta pairs:
/// `T = (dv2*E1 - dv1*E2) / (du1*dv2 - du2*dv1)`, normalized.
fn generate_tangents(vertices: &mut [Vertex3D], indices: &[u32]) {
    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];

        let edge1 = vertices[i1].position - vertices[i0].position;
        let edge2 = vertices[i2].position - vertices[i0].position;

        let delta1 = vertices[i1].uv - vertices[i0].uv;
        let delta2 = vertices[i2].uv - vertices[i0].uv;

        let dividend = 1.0 / (delta1.x * delta2.y - delta2.x * delta1.y);
        let tangent = ((edge1 * delta2.y - edge2 * delta1.y) * dividend).normalize();

        vertices[i0].tangent = tangent;
        vertices[i1].tangent = tangent;
        vertices[i2].tangent = tangent;
    }
}

/// Indices for six quads laid out as four vertices per face.
fn quad_indices() -> Vec<u32> {
    let mut indices = Vec::with_capacity(36);
    for face in 0..6u32 {
        let base = face * 4;
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    indices
}

/// 24 cube corners, four per face, wound so synthesized normals face
/// outward.
fn cube_corners() -> Vec<Vertex3D> {
    let corner = |x: f32, y: f32, z: f32, u: f32, v: f32| {
        Vertex3D::at(Vec3::new(x, y, z), Vec2::new(u, v))
    };

    vec![
        // Back face (z = -1)
        corner(-1.0, -1.0, -1.0, 0.0, 0.0),
        corner(-1.0, 1.0, -1.0, 0.0, 1.0),
        corner(1.0, 1.0, -1.0, 1.0, 1.0),
        corner(1.0, -1.0, -1.0, 1.0, 0.0),
        // Front face (z = 1)
        corner(-1.0, -1.0, 1.0, 0.0, 0.0),
        corner(1.0, -1.0, 1.0, 1.0, 0.0),
        corner(1.0, 1.0, 1.0, 1.0, 1.0),
        corner(-1.0, 1.0, 1.0, 0.0, 1.0),
        // Left face (x = -1)
        corner(-1.0, -1.0, -1.0, 0.0, 0.0),
        corner(-1.0, -1.0, 1.0, 1.0, 0.0),
        corner(-1.0, 1.0, 1.0, 1.0, 1.0),
        corner(-1.0, 1.0, -1.0, 0.0, 1.0),
        // Right face (x = 1)
        corner(1.0, -1.0, -1.0, 0.0, 0.0),
        corner(1.0, 1.0, -1.0, 0.0, 1.0),
        corner(1.0, 1.0, 1.0, 1.0, 1.0),
        corner(1.0, -1.0, 1.0, 1.0, 0.0),
        // Top face (y = 1)
        corner(-1.0, 1.0, -1.0, 0.0, 0.0),
        corner(-1.0, 1.0, 1.0, 1.0, 0.0),
        corner(1.0, 1.0, 1.0, 1.0, 1.0),
        corner(1.0, 1.0, -1.0, 0.0, 1.0),
        // Bottom face (y = -1)
        corner(-1.0, -1.0, -1.0, 0.0, 0.0),
        corner(1.0, -1.0, -1.0, 1.0, 0.0),
        corner(1.0, -1.0, 1.0, 1.0, 1.0),
        corner(-1.0, -1.0, 1.0, 0.0, 1.0),
    ]
}

fn push_vertex_buffer(
    resources: &mut Resources,
    group_id: ResourceGroupId,
    data: Vec<u8>,
) -> ResourceId {
    resources.push_buffer(
        group_id,
        GfxBufferDesc {
            size: data.len(),
            data: Some(data),
            buffer_type: GfxBufferType::Vertex,
            usage: GfxBufferUsage::StaticDraw,
        },
    )
}

fn push_index_buffer(
    resources: &mut Resources,
    group_id: ResourceGroupId,
    indices: &[u32],
) -> ResourceId {
    let data: Vec<u8> = bytemuck::cast_slice(indices).to_vec();
    resources.push_buffer(
        group_id,
        GfxBufferDesc {
            size: data.len(),
            data: Some(data),
            buffer_type: GfxBufferType::Index,
            usage: GfxBufferUsage::StaticDraw,
        },
    )
}

fn build_cube(resources: &mut Resources, group_id: ResourceGroupId) -> BuiltGeometry {
    let indices = quad_indices();
    let mut vertices = cube_corners();

    generate_normals(&mut vertices, &indices);
    generate_tangents(&mut vertices, &indices);

    let mut floats = Vec::with_capacity(vertices.len() * 19);
    for vertex in &vertices {
        vertex.write_floats(&mut floats);
    }

    let vertex_id = push_vertex_buffer(resources, group_id, bytemuck::cast_slice(&floats).to_vec());
    let index_id = push_index_buffer(resources, group_id, &indices);

    BuiltGeometry {
        desc: GfxPipelineDesc {
            vertex_buffer: resources.try_get_buffer(vertex_id),
            vertices_count: vertices.len(),
            index_buffer: resources.try_get_buffer(index_id),
            indices_count: indices.len(),
            layout: vec![
                GfxLayoutAttr::new("POSITION", GfxLayoutType::Float3),
                GfxLayoutAttr::new("NORMAL", GfxLayoutType::Float3),
                GfxLayoutAttr::new("TANGENT", GfxLayoutType::Float3),
                GfxLayoutAttr::new("COLOR0", GfxLayoutType::Float4),
                GfxLayoutAttr::new("COLOR1", GfxLayoutType::Float4),
                GfxLayoutAttr::new("TEX", GfxLayoutType::Float2),
            ],
            draw_mode: GfxDrawMode::Triangle,
            ..Default::default()
        },
        vertex_buffer: vertex_id,
        index_buffer: index_id,
    }
}

fn build_skybox(resources: &mut Resources, group_id: ResourceGroupId) -> BuiltGeometry {
    // Inward-facing winding; drawn from the inside.
    #[rustfmt::skip]
    let vertices: [f32; 108] = [
        -1.0,  1.0, -1.0,
        -1.0, -1.0, -1.0,
         1.0, -1.0, -1.0,
         1.0, -1.0, -1.0,
         1.0,  1.0, -1.0,
        -1.0,  1.0, -1.0,

        -1.0, -1.0,  1.0,
        -1.0, -1.0, -1.0,
        -1.0,  1.0, -1.0,
        -1.0,  1.0, -1.0,
        -1.0,  1.0,  1.0,
        -1.0, -1.0,  1.0,

         1.0, -1.0, -1.0,
         1.0, -1.0,  1.0,
         1.0,  1.0,  1.0,
         1.0,  1.0,  1.0,
         1.0,  1.0, -1.0,
         1.0, -1.0, -1.0,

        -1.0, -1.0,  1.0,
        -1.0,  1.0,  1.0,
         1.0,  1.0,  1.0,
         1.0,  1.0,  1.0,
         1.0, -1.0,  1.0,
        -1.0, -1.0,  1.0,

        -1.0,  1.0, -1.0,
         1.0,  1.0, -1.0,
         1.0,  1.0,  1.0,
         1.0,  1.0,  1.0,
        -1.0,  1.0,  1.0,
        -1.0,  1.0, -1.0,

        -1.0, -1.0, -1.0,
        -1.0, -1.0,  1.0,
         1.0, -1.0, -1.0,
         1.0, -1.0, -1.0,
        -1.0, -1.0,  1.0,
         1.0, -1.0,  1.0,
    ];

    let vertex_id =
        push_vertex_buffer(resources, group_id, bytemuck::cast_slice(&vertices).to_vec());

    BuiltGeometry {
        desc: GfxPipelineDesc {
            vertex_buffer: resources.try_get_buffer(vertex_id),
            vertices_count: 36,
            layout: vec![GfxLayoutAttr::new("POSITION", GfxLayoutType::Float3)],
            draw_mode: GfxDrawMode::Triangle,
            ..Default::default()
        },
        vertex_buffer: vertex_id,
        index_buffer: ResourceId::INVALID,
    }
}

fn build_billboard(resources: &mut Resources, group_id: ResourceGroupId) -> BuiltGeometry {
    #[rustfmt::skip]
    let vertices: [f32; 32] = [
        // Position           Normal            UV
        -1.0,  1.0, 0.0,   0.0, 0.0, 1.0,   0.0, 1.0,
        -1.0, -1.0, 0.0,   0.0, 0.0, 1.0,   0.0, 0.0,
         1.0, -1.0, 0.0,   0.0, 0.0, 1.0,   1.0, 0.0,
         1.0,  1.0, 0.0,   0.0, 0.0, 1.0,   1.0, 1.0,
    ];
    let indices: [u32; 6] = [0, 1, 2, 2, 3, 0];

    let vertex_id =
        push_vertex_buffer(resources, group_id, bytemuck::cast_slice(&vertices).to_vec());
    let index_id = push_index_buffer(resources, group_id, &indices);

    BuiltGeometry {
        desc: GfxPipelineDesc {
            vertex_buffer: resources.try_get_buffer(vertex_id),
            vertices_count: 4,
            index_buffer: resources.try_get_buffer(index_id),
            indices_count: 6,
            layout: vec![
                GfxLayoutAttr::new("POSITION", GfxLayoutType::Float3),
                GfxLayoutAttr::new("NORMAL", GfxLayoutType::Float3),
                GfxLayoutAttr::new("TEX", GfxLayoutType::Float2),
            ],
            draw_mode: GfxDrawMode::Triangle,
            ..Default::default()
        },
        vertex_buffer: vertex_id,
        index_buffer: index_id,
    }
}

fn build_debug_cube(resources: &mut Resources, group_id: ResourceGroupId) -> BuiltGeometry {
    let indices = quad_indices();
    let corners = cube_corners();

    let mut floats = Vec::with_capacity(corners.len() * 3);
    for vertex in &corners {
        floats.extend_from_slice(&vertex.position.to_array());
    }

    let vertex_id = push_vertex_buffer(resources, group_id, bytemuck::cast_slice(&floats).to_vec());
    let index_id = push_index_buffer(resources, group_id, &indices);

    BuiltGeometry {
        desc: GfxPipelineDesc {
            vertex_buffer: resources.try_get_buffer(vertex_id),
            vertices_count: 24,
            index_buffer: resources.try_get_buffer(index_id),
            indices_count: 36,
            layout: vec![GfxLayoutAttr::new("POSITION", GfxLayoutType::Float3)],
            draw_mode: GfxDrawMode::Triangle,
            ..Default::default()
        },
        vertex_buffer: vertex_id,
        index_buffer: index_id,
    }
}

/// Generate the requested shape, pushing its buffers into `group_id`.
pub(crate) fn build(
    resources: &mut Resources,
    group_id: ResourceGroupId,
    geometry: GeometryType,
) -> BuiltGeometry {
    match geometry {
        GeometryType::Cube => build_cube(resources, group_id),
        GeometryType::Skybox => build_skybox(resources, group_id),
        GeometryType::Billboard => build_billboard(resources, group_id),
        GeometryType::DebugCube => build_debug_cube(resources, group_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn generated_cube() -> (Vec<Vertex3D>, Vec<u32>) {
        let indices = quad_indices();
        let mut vertices = cube_corners();
        generate_normals(&mut vertices, &indices);
        generate_tangents(&mut vertices, &indices);
        (vertices, indices)
    }

    #[test]
    fn back_face_triangle_normal_points_out() {
        let (vertices, _) = generated_cube();
        for i in [0usize, 1, 2] {
            assert!((vertices[i].normal - Vec3::new(0.0, 0.0, -1.0)).length() < EPSILON);
        }
    }

    #[test]
    fn front_face_triangle_normal_points_out() {
        let (vertices, _) = generated_cube();
        for i in [4usize, 5, 6] {
            assert!((vertices[i].normal - Vec3::new(0.0, 0.0, 1.0)).length() < EPSILON);
        }
    }

    #[test]
    fn face_normals_are_shared_and_unit_length() {
        let (vertices, indices) = generated_cube();
        for triangle in indices.chunks_exact(3) {
            let n0 = vertices[triangle[0] as usize].normal;
            let n1 = vertices[triangle[1] as usize].normal;
            let n2 = vertices[triangle[2] as usize].normal;

            assert!((n0 - n1).length() < EPSILON);
            assert!((n0 - n2).length() < EPSILON);
            assert!((n0.length() - 1.0).abs() < EPSILON);
        }
    }

    #[test]
    fn tangents_are_unit_and_perpendicular_to_normals() {
        let (vertices, _) = generated_cube();
        for vertex in &vertices {
            assert!((vertex.tangent.length() - 1.0).abs() < EPSILON);
            assert!(vertex.tangent.dot(vertex.normal).abs() < EPSILON);
        }
    }

    #[test]
    fn cube_has_24_vertices_and_36_indices() {
        let (vertices, indices) = generated_cube();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| i < 24));
    }
}
