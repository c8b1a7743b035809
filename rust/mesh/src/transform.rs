// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Affine transforms over vertex sets.
//!
//! Transforms act on the unique vertices reachable from the given elements,
//! so a vertex shared by several selected faces moves exactly once.

use nalgebra::{Matrix4, Point3, Rotation3, Unit, Vector3};
use rustc_hash::FxHashSet;

use crate::arena::Mesh;
use crate::keys::*;

impl Mesh {
    /// Collects the unique vertices of any mix of elements.
    pub fn collect_vertices(&self, keys: &[ElementKey]) -> Vec<VertexKey> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        let mut push = |v: VertexKey, out: &mut Vec<VertexKey>| {
            if seen.insert(v) {
                out.push(v);
            }
        };
        for key in keys {
            match *key {
                ElementKey::Vertex(v) => push(v, &mut out),
                ElementKey::Edge(e) => {
                    if let Some((a, b)) = self.edge_vertices(e) {
                        push(a, &mut out);
                        push(b, &mut out);
                    }
                }
                ElementKey::Face(f) => {
                    for &v in self.face_vertices(f) {
                        push(v, &mut out);
                    }
                }
            }
        }
        out
    }

    /// Translates vertices by `offset`.
    pub fn translate(&mut self, verts: &[VertexKey], offset: &Vector3<f64>) {
        let unique: FxHashSet<VertexKey> = verts.iter().copied().collect();
        for v in unique {
            if let Some(data) = self.vertices.get_mut(v) {
                data.x += offset.x;
                data.y += offset.y;
                data.z += offset.z;
            }
        }
    }

    /// Translates every vertex of the faces by `offset`.
    pub fn translate_faces(&mut self, faces: &[FaceKey], offset: &Vector3<f64>) {
        let verts = self.faces_vertices(faces);
        self.translate(&verts, offset);
    }

    /// Translates every endpoint of the edges by `offset`.
    pub fn translate_edges(&mut self, edges: &[EdgeKey], offset: &Vector3<f64>) {
        let verts = self.edges_vertices(edges);
        self.translate(&verts, offset);
    }

    /// Rotates vertices by `angle` radians about `axis` through `center`.
    pub fn rotate(
        &mut self,
        verts: &[VertexKey],
        center: &Point3<f64>,
        axis: &Vector3<f64>,
        angle: f64,
    ) {
        let Some(axis) = Unit::try_new(*axis, 1e-12) else {
            return;
        };
        let rot = Rotation3::from_axis_angle(&axis, angle);
        self.apply(verts, |p| center + rot * (p - center));
    }

    /// Scales vertices about `center` by per-axis factors.
    pub fn scale(&mut self, verts: &[VertexKey], center: &Point3<f64>, factors: &Vector3<f64>) {
        self.apply(verts, |p| center + (p - center).component_mul(factors));
    }

    /// Applies a homogeneous 4x4 matrix to vertices.
    pub fn transform(&mut self, verts: &[VertexKey], matrix: &Matrix4<f64>) {
        self.apply(verts, |p| matrix.transform_point(&p));
    }

    /// Translates every vertex in the mesh.
    pub fn translate_all(&mut self, offset: &Vector3<f64>) {
        for (_, v) in self.vertices.iter_mut() {
            v.x += offset.x;
            v.y += offset.y;
            v.z += offset.z;
        }
    }

    fn apply(&mut self, verts: &[VertexKey], f: impl Fn(Point3<f64>) -> Point3<f64>) {
        let unique: FxHashSet<VertexKey> = verts.iter().copied().collect();
        for v in unique {
            if let Some(data) = self.vertices.get_mut(v) {
                let p = f(data.point());
                data.x = p.x;
                data.y = p.y;
                data.z = p.z;
            }
        }
    }
}
