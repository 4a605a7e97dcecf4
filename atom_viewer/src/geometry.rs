//! Static meshes shared by every entity

use std::f32::consts::{PI, TAU};

/// Radius of the shared sphere mesh, entities scale it uniformly
pub const SPHERE_RADIUS: f32 = 0.5;
pub const SPHERE_SECTORS: u32 = 48;
pub const SPHERE_STACKS: u32 = 32;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Indexed triangle list
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// UV sphere centered at the origin, counter-clockwise winding seen from outside
    pub fn sphere(radius: f32, sectors: u32, stacks: u32) -> Self {
        let sectors = sectors.max(3);
        let stacks = stacks.max(2);
        let mut mesh = Mesh::default();

        for i in 0..=stacks {
            let v = i as f32 / stacks as f32;
            let phi = PI / 2.0 - v * PI; // +90 at the top, -90 at the bottom
            let (ring_y, ring_r) = (phi.sin(), phi.cos());

            for j in 0..=sectors {
                let u = j as f32 / sectors as f32;
                let theta = u * TAU;
                let normal = [ring_r * theta.cos(), ring_y, -ring_r * theta.sin()];
                mesh.vertices.push(MeshVertex {
                    position: normal.map(|c| c * radius),
                    normal,
                    uv: [u, v],
                });
            }
        }

        let row = sectors + 1;
        for i in 0..stacks {
            for j in 0..sectors {
                let top = i * row + j;
                let bottom = top + row;
                if i != 0 {
                    mesh.indices.extend_from_slice(&[top, bottom, top + 1]);
                }
                if i != stacks - 1 {
                    mesh.indices.extend_from_slice(&[top + 1, bottom, bottom + 1]);
                }
            }
        }

        mesh
    }

    /// Unit cube centered at the origin with per-face normals and UVs
    pub fn cube() -> Self {
        // (normal, u axis, v axis) for each face
        const FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, -1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, -1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, -1.0, 0.0]),
        ];
        const CORNERS: [(f32, f32); 4] = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];

        let mut mesh = Mesh::default();
        for (normal, u_axis, v_axis) in FACES {
            let base = mesh.vertices.len() as u32;
            for (u, v) in CORNERS {
                let position = std::array::from_fn(|k| {
                    0.5 * normal[k] + (u - 0.5) * u_axis[k] + (v - 0.5) * v_axis[k]
                });
                mesh.vertices.push(MeshVertex {
                    position,
                    normal,
                    uv: [u, v],
                });
            }
            // v runs downwards on each face, so the quad winds 0-2-1
            mesh.indices
                .extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
        }
        mesh
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn triangle_normal(mesh: &Mesh, tri: &[u32]) -> Vec3 {
        let p = |i: u32| Vec3::from(mesh.vertices[i as usize].position);
        (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]))
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = Mesh::sphere(0.5, 16, 8);
        assert_eq!(mesh.vertices.len(), 17 * 9);
        for vertex in &mesh.vertices {
            assert!((Vec3::from(vertex.position).length() - 0.5).abs() < 1e-5);
            assert!((Vec3::from(vertex.normal).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn sphere_indices_are_valid() {
        let mesh = Mesh::sphere(1.0, 16, 8);
        // Poles contribute one triangle per sector, other bands two
        assert_eq!(mesh.indices.len(), (16 * 2 + 16 * 6 * 2) * 3);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn sphere_triangles_face_outwards() {
        let mesh = Mesh::sphere(1.0, 12, 6);
        for tri in mesh.indices.chunks(3) {
            let centroid: Vec3 = tri
                .iter()
                .map(|&i| Vec3::from(mesh.vertices[i as usize].position))
                .sum::<Vec3>()
                / 3.0;
            assert!(triangle_normal(&mesh, tri).dot(centroid) > 0.0);
        }
    }

    #[test]
    fn cube_has_six_outward_faces() {
        let mesh = Mesh::cube();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.index_count(), 36);
        for tri in mesh.indices.chunks(3) {
            let face_normal = Vec3::from(mesh.vertices[tri[0] as usize].normal);
            assert!(triangle_normal(&mesh, tri).dot(face_normal) > 0.0);
        }
        for vertex in &mesh.vertices {
            assert!(vertex.position.iter().all(|c| c.abs() == 0.5));
        }
    }
}
