// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flat triangle buffers for rendering hosts.

use nalgebra::{Point3, Vector3};

use crate::arena::Mesh;
use crate::keys::FaceKey;

/// GPU-style triangle mesh with per-face flat normals.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
    /// Category attribute of the source face, one per triangle
    pub categories: Vec<i32>,
}

impl TriangleMesh {
    fn push_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>) -> u32 {
        let index = (self.positions.len() / 3) as u32;
        self.positions.extend([position.x as f32, position.y as f32, position.z as f32]);
        self.normals.extend([normal.x as f32, normal.y as f32, normal.z as f32]);
        index
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Axis-aligned bounds of the positions.
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }
        let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);
        self.positions.chunks_exact(3).for_each(|c| {
            min.x = min.x.min(c[0]);
            min.y = min.y.min(c[1]);
            min.z = min.z.min(c[2]);
            max.x = max.x.max(c[0]);
            max.y = max.y.max(c[1]);
            max.z = max.z.max(c[2]);
        });
        (min, max)
    }
}

impl Mesh {
    /// Triangulates every face. Vertices are duplicated per face so each
    /// carries its face's flat normal.
    pub fn to_triangles(&self) -> TriangleMesh {
        let faces: Vec<FaceKey> = self.face_keys().collect();
        self.faces_to_triangles(&faces)
    }

    /// Triangulates a subset of faces. Degenerate faces are skipped.
    pub fn faces_to_triangles(&self, faces: &[FaceKey]) -> TriangleMesh {
        let mut out = TriangleMesh::default();
        for &f in faces {
            let (Some(normal), Some(tris)) = (self.face_normal(f), self.triangulate_face(f)) else {
                continue;
            };
            let category = self.category_attribute(f);
            for tri in tris {
                for v in tri {
                    let i = out.push_vertex(self.co(v), normal);
                    out.indices.push(i);
                }
                out.categories.push(category);
            }
        }
        out
    }
}
