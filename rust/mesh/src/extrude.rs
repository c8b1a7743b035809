// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Region, face and edge extrusion, edge bridging and solidify.

use nalgebra::{Point3, Vector3};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::arena::Mesh;
use crate::error::{Error, Result};
use crate::keys::*;

/// Result of [`Mesh::extrude_region`].
#[derive(Debug, Clone, Default)]
pub struct Extrusion {
    /// Far faces, index-aligned with the input faces.
    pub far: Vec<FaceKey>,
    /// Side faces created along the region boundary.
    pub sides: Vec<FaceKey>,
    /// The input faces when kept, empty otherwise.
    pub originals: Vec<FaceKey>,
}

/// Result of [`Mesh::extrude_edges`].
#[derive(Debug, Clone, Default)]
pub struct EdgeExtrusion {
    /// Far edges, index-aligned with the input edges.
    pub edges: Vec<EdgeKey>,
    /// One quad per input edge.
    pub faces: Vec<FaceKey>,
}

impl Mesh {
    /// Extrudes a face region by `depth` along `normal`.
    ///
    /// Side faces are wound so they face away from the swept solid. Far
    /// faces keep the winding of their originals and are matched back to the
    /// inputs by nearest bounding-box center, so callers can zip the result
    /// against per-face metadata.
    pub fn extrude_region(
        &mut self,
        faces: &[FaceKey],
        depth: f64,
        normal: &Vector3<f64>,
        keep_original: bool,
    ) -> Result<Extrusion> {
        if faces.is_empty() {
            return Err(Error::EmptyInput("extrude region"));
        }
        self.require_faces(faces)?;
        let offset = normal * depth;
        if offset.norm() < 1e-9 {
            return Err(Error::DegenerateFace("zero extrusion depth"));
        }

        let targets: Vec<Point3<f64>> = faces
            .iter()
            .filter_map(|&f| self.face_center_bounds(f))
            .map(|c| c + offset)
            .collect();

        let mut map: FxHashMap<VertexKey, VertexKey> = FxHashMap::default();
        for v in self.faces_vertices(faces) {
            let p = self.co(v) + offset;
            map.insert(v, self.add_vertex_at(&p));
        }

        let boundary = self.region_boundary(faces);

        let mut far = Vec::with_capacity(faces.len());
        for &f in faces {
            let verts: Vec<VertexKey> = self.face_vertices(f).iter().map(|v| map[v]).collect();
            let nf = self.add_face(&verts)?;
            self.copy_category(f, nf);
            far.push(nf);
        }

        let mut sides = Vec::with_capacity(boundary.len());
        for &(a, b, f) in &boundary {
            let n = self.face_normal(f).unwrap_or(*normal);
            let quad = if offset.dot(&n) >= 0.0 {
                [a, b, map[&b], map[&a]]
            } else {
                [b, a, map[&a], map[&b]]
            };
            let side = self.add_face(&quad)?;
            self.copy_category(f, side);
            sides.push(side);
        }

        let originals = if keep_original {
            faces.to_vec()
        } else {
            self.delete_faces(faces);
            Vec::new()
        };

        let far = self.match_by_center(&targets, far);
        Ok(Extrusion { far, sides, originals })
    }

    /// Extrudes one face along its own normal, removing the original.
    pub fn extrude_face(&mut self, face: FaceKey, depth: f64) -> Result<Extrusion> {
        let normal = self.face_normal(face).ok_or(Error::FaceNotFound(face))?;
        self.extrude_region(&[face], depth, &normal, false)
    }

    /// Boundary edges of a region as `(a, b, face)`, with `a -> b` in the
    /// loop order of the owning region face.
    pub(crate) fn region_boundary(&self, faces: &[FaceKey]) -> Vec<(VertexKey, VertexKey, FaceKey)> {
        let region: FxHashSet<FaceKey> = faces.iter().copied().collect();
        let mut out = Vec::new();
        for &f in faces {
            let verts = self.face_vertices(f);
            let edges = self.face_edges(f);
            let n = verts.len();
            for i in 0..n {
                let inside = self
                    .edge_faces(edges[i])
                    .iter()
                    .filter(|g| region.contains(g))
                    .count();
                if inside == 1 {
                    out.push((verts[i], verts[(i + 1) % n], f));
                }
            }
        }
        out
    }

    /// Reorders `candidates` so entry `i` is the face nearest `targets[i]`.
    pub(crate) fn match_by_center(
        &self,
        targets: &[Point3<f64>],
        candidates: Vec<FaceKey>,
    ) -> Vec<FaceKey> {
        let mut pool = candidates;
        let mut out = Vec::with_capacity(pool.len());
        for t in targets {
            let best = pool
                .iter()
                .enumerate()
                .filter_map(|(i, &f)| self.face_center_bounds(f).map(|c| (i, (c - t).norm())))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(i, _)| i);
            if let Some(i) = best {
                out.push(pool.swap_remove(i));
            }
        }
        out.extend(pool);
        out
    }

    /// Extrudes loose or boundary edges by `offset` into quads.
    pub fn extrude_edges(&mut self, edges: &[EdgeKey], offset: &Vector3<f64>) -> Result<EdgeExtrusion> {
        if offset.norm() < 1e-9 {
            return Err(Error::DegenerateFace("zero extrusion depth"));
        }
        let mut map: FxHashMap<VertexKey, VertexKey> = FxHashMap::default();
        for v in self.edges_vertices(edges) {
            let p = self.co(v) + offset;
            map.insert(v, self.add_vertex_at(&p));
        }
        let mut out = EdgeExtrusion::default();
        for &e in edges {
            let (s, t) = self.edge_vertices(e).ok_or(Error::EdgeNotFound(e))?;
            // Wind against an existing face so the two stay consistent
            let (a, b) = match self.edge_faces(e).first() {
                Some(&f) => {
                    let verts = self.face_vertices(f);
                    let i = self.loop_index(f, s).unwrap_or(0);
                    if verts[(i + 1) % verts.len()] == t {
                        (t, s)
                    } else {
                        (s, t)
                    }
                }
                None => (s, t),
            };
            let face = self.add_face(&[a, b, map[&b], map[&a]])?;
            out.faces.push(face);
            if let Some(far) = self.edge_between(map[&s], map[&t]) {
                out.edges.push(far);
            }
        }
        Ok(out)
    }

    /// Joins two edges with a quad, pairing nearest endpoints.
    pub fn bridge_edges(&mut self, e1: EdgeKey, e2: EdgeKey) -> Result<FaceKey> {
        let (a, b) = self.edge_vertices(e1).ok_or(Error::EdgeNotFound(e1))?;
        let (c, d) = self.edge_vertices(e2).ok_or(Error::EdgeNotFound(e2))?;
        let dist = |p: VertexKey, q: VertexKey| (self.co(p) - self.co(q)).norm();
        let mut quad = if dist(a, c) + dist(b, d) <= dist(a, d) + dist(b, c) {
            [a, b, d, c]
        } else {
            [a, b, c, d]
        };
        if let Some(&f) = self.edge_faces(e1).first() {
            let verts = self.face_vertices(f);
            let i = self.loop_index(f, a).unwrap_or(0);
            if verts[(i + 1) % verts.len()] == b {
                quad.reverse();
            }
        }
        self.add_face(&quad)
    }

    /// Gives each face a thickness by extruding a reversed copy behind it.
    ///
    /// Returns the back and side faces of every shell.
    pub fn solidify(&mut self, faces: &[FaceKey], thickness: f64) -> Result<Vec<FaceKey>> {
        let mut out = Vec::new();
        for &f in faces {
            let normal = self.face_normal(f).ok_or(Error::FaceNotFound(f))?;
            let ext = self.extrude_region(&[f], thickness, &(-normal), true)?;
            self.reverse_faces(&ext.far)?;
            out.extend(ext.far);
            out.extend(ext.sides);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn floor(mesh: &mut Mesh, x0: f64, w: f64) -> FaceKey {
        let v: Vec<VertexKey> = [(x0, 0.0), (x0 + w, 0.0), (x0 + w, 1.0), (x0, 1.0)]
            .iter()
            .map(|&(x, y)| mesh.add_vertex(x, y, 0.0))
            .collect();
        mesh.add_face(&v).unwrap()
    }

    #[test]
    fn extrusion_distance_invariant() {
        for keep in [true, false] {
            let mut mesh = Mesh::new();
            let f = floor(&mut mesh, 0.0, 2.0);
            let center = mesh.face_center_bounds(f).unwrap();
            let ext = mesh.extrude_region(&[f], 1.5, &Vector3::z(), keep).unwrap();
            let far = mesh.face_center_bounds(ext.far[0]).unwrap();
            assert_relative_eq!(far.z, center.z + 1.5, epsilon = 1e-4);
            assert_eq!(ext.sides.len(), 4);
            assert_eq!(ext.originals.len(), usize::from(keep));
            for s in &ext.sides {
                let n = mesh.face_normal(*s).unwrap();
                let c = mesh.face_center(*s).unwrap();
                // Sides face away from the box center
                assert!(n.dot(&(c - Point3::new(1.0, 0.5, 0.75))) > 0.0);
            }
        }
    }

    #[test]
    fn far_faces_follow_input_order() {
        let mut mesh = Mesh::new();
        let a = floor(&mut mesh, 0.0, 1.0);
        let b = floor(&mut mesh, 5.0, 1.0);
        let ext = mesh.extrude_region(&[b, a], 1.0, &Vector3::z(), false).unwrap();
        assert!(mesh.face_center(ext.far[0]).unwrap().x > 4.0);
        assert!(mesh.face_center(ext.far[1]).unwrap().x < 2.0);
    }

    #[test]
    fn shared_edge_is_interior() {
        let mut mesh = Mesh::new();
        let v: Vec<VertexKey> = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (0.0, 1.0)]
            .iter()
            .map(|&(x, y)| mesh.add_vertex(x, y, 0.0))
            .collect();
        let f1 = mesh.add_face(&[v[0], v[1], v[4], v[5]]).unwrap();
        let f2 = mesh.add_face(&[v[1], v[2], v[3], v[4]]).unwrap();
        let ext = mesh.extrude_region(&[f1, f2], 1.0, &Vector3::z(), false).unwrap();
        assert_eq!(ext.sides.len(), 6);
        // The interior edge and its faces are gone
        assert!(mesh.edge_between(v[1], v[4]).is_none());
        assert_eq!(mesh.face_count(), 8);
    }

    #[test]
    fn solidify_builds_closed_shell() {
        let mut mesh = Mesh::new();
        let f = floor(&mut mesh, 0.0, 1.0);
        let added = mesh.solidify(&[f], 0.1).unwrap();
        assert_eq!(added.len(), 5);
        for e in mesh.edge_keys() {
            assert_eq!(mesh.edge_faces(e).len(), 2);
        }
    }

    #[test]
    fn extrude_edges_and_bridge() {
        let mut mesh = Mesh::new();
        let e = mesh
            .add_edge_from_points(&Point3::new(0.0, 0.0, 0.0), &Point3::new(1.0, 0.0, 0.0))
            .unwrap();
        let ext = mesh.extrude_edges(&[e], &Vector3::new(0.0, 0.0, 1.0)).unwrap();
        assert_eq!(ext.faces.len(), 1);
        assert_eq!(ext.edges.len(), 1);
        let other = mesh
            .add_edge_from_points(&Point3::new(1.0, 1.0, 1.0), &Point3::new(0.0, 1.0, 1.0))
            .unwrap();
        let bridge = mesh.bridge_edges(ext.edges[0], other).unwrap();
        assert_relative_eq!(mesh.face_area(bridge).unwrap(), 1.0, epsilon = 1e-9);
    }
}
