// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Duplication, separation and extraction of face groups.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::arena::Mesh;
use crate::error::{Error, Result};
use crate::keys::*;

/// Result of [`Mesh::duplicate_faces`].
#[derive(Debug, Clone, Default)]
pub struct Duplicate {
    /// Copies, index-aligned with the input faces.
    pub faces: Vec<FaceKey>,
    /// Original vertex → copied vertex.
    pub vertex_map: FxHashMap<VertexKey, VertexKey>,
}

impl Mesh {
    /// Copies faces onto fresh vertices shared among the copies.
    pub fn duplicate_faces(&mut self, faces: &[FaceKey]) -> Result<Duplicate> {
        self.require_faces(faces)?;
        let mut vertex_map = FxHashMap::default();
        for v in self.faces_vertices(faces) {
            let p = self.co(v);
            vertex_map.insert(v, self.add_vertex_at(&p));
        }
        let mut out = Vec::with_capacity(faces.len());
        for &f in faces {
            let verts: Vec<VertexKey> =
                self.face_vertices(f).iter().map(|v| vertex_map[v]).collect();
            let nf = self.add_face(&verts)?;
            self.copy_category(f, nf);
            out.push(nf);
        }
        Ok(Duplicate { faces: out, vertex_map })
    }

    /// Copies an edge onto fresh vertices.
    pub fn duplicate_edge(&mut self, edge: EdgeKey) -> Result<EdgeKey> {
        let (a, b) = self.edge_vertices(edge).ok_or(Error::EdgeNotFound(edge))?;
        let pa = self.co(a);
        let pb = self.co(b);
        self.add_edge_from_points(&pa, &pb)
    }

    /// Disconnects a face region from the rest of the mesh.
    ///
    /// Vertices the region shares with outside faces or loose edges are
    /// copied and the region is rewired onto the copies. Returns the former
    /// boundary edges now owned by the outside.
    pub fn separate_faces(&mut self, faces: &[FaceKey]) -> Result<Vec<EdgeKey>> {
        self.require_faces(faces)?;
        let region: FxHashSet<FaceKey> = faces.iter().copied().collect();
        let boundary: Vec<EdgeKey> = self
            .faces_edges(faces)
            .into_iter()
            .filter(|&e| self.edge_faces(e).iter().any(|f| !region.contains(f)))
            .collect();

        let mut map: FxHashMap<VertexKey, VertexKey> = FxHashMap::default();
        for v in self.faces_vertices(faces) {
            let shared = self.vertex_edges(v).iter().any(|&e| {
                let fs = self.edge_faces(e);
                fs.is_empty() || fs.iter().any(|f| !region.contains(f))
            });
            if shared {
                let p = self.co(v);
                map.insert(v, self.add_vertex_at(&p));
            }
        }
        for &f in faces {
            let verts: Vec<VertexKey> = self
                .face_vertices(f)
                .iter()
                .map(|v| map.get(v).copied().unwrap_or(*v))
                .collect();
            self.set_face_loop(f, &verts)?;
        }
        Ok(boundary.into_iter().filter(|&e| self.contains_edge(e)).collect())
    }

    /// Copies faces and their categories into a new standalone mesh.
    pub fn extract_faces(&self, faces: &[FaceKey]) -> Result<Mesh> {
        self.require_faces(faces)?;
        let mut out = Mesh::new();
        let mut map: FxHashMap<VertexKey, VertexKey> = FxHashMap::default();
        for v in self.faces_vertices(faces) {
            map.insert(v, out.add_vertex_at(&self.co(v)));
        }
        for &f in faces {
            let verts: Vec<VertexKey> = self.face_vertices(f).iter().map(|v| map[v]).collect();
            let nf = out.add_face(&verts)?;
            if let Some(&c) = self.categories.get(&f) {
                out.categories.insert(nf, c);
            }
        }
        Ok(out)
    }

    /// Appends all of `other` into this mesh. Returns the new face keys.
    pub fn append(&mut self, other: &Mesh) -> Result<Vec<FaceKey>> {
        let mut map: FxHashMap<VertexKey, VertexKey> = FxHashMap::default();
        for (k, v) in other.vertices.iter() {
            map.insert(k, self.add_vertex(v.x, v.y, v.z));
        }
        for (_, e) in other.edges.iter() {
            self.add_edge(map[&e.start], map[&e.end])?;
        }
        let mut out = Vec::with_capacity(other.face_count());
        for (k, f) in other.faces.iter() {
            let verts: Vec<VertexKey> = f.verts.iter().map(|v| map[v]).collect();
            let nf = self.add_face(&verts)?;
            if let Some(&c) = other.categories.get(&k) {
                self.categories.insert(nf, c);
            }
            out.push(nf);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn strip(mesh: &mut Mesh) -> (FaceKey, FaceKey) {
        let v: Vec<VertexKey> = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (0.0, 1.0)]
            .iter()
            .map(|&(x, y)| mesh.add_vertex(x, y, 0.0))
            .collect();
        let f1 = mesh.add_face(&[v[0], v[1], v[4], v[5]]).unwrap();
        let f2 = mesh.add_face(&[v[1], v[2], v[3], v[4]]).unwrap();
        (f1, f2)
    }

    #[test]
    fn duplicate_shares_new_vertices() {
        let mut mesh = Mesh::new();
        let (f1, f2) = strip(&mut mesh);
        let dup = mesh.duplicate_faces(&[f1, f2]).unwrap();
        assert_eq!(dup.faces.len(), 2);
        assert_eq!(mesh.vertex_count(), 12);
        mesh.translate_faces(&dup.faces, &Vector3::z());
        assert_eq!(mesh.face_center(f1).unwrap().z, 0.0);
        assert_eq!(mesh.face_center(dup.faces[0]).unwrap().z, 1.0);
    }

    #[test]
    fn separate_leaves_boundary_behind() {
        let mut mesh = Mesh::new();
        let (f1, f2) = strip(&mut mesh);
        let left = mesh.separate_faces(&[f2]).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(mesh.edge_faces(left[0]), &[f1]);
        assert!(mesh.face_neighbors(f2).is_empty());
    }

    #[test]
    fn extract_copies_faces() {
        let mut mesh = Mesh::new();
        let (f1, _) = strip(&mut mesh);
        let part = mesh.extract_faces(&[f1]).unwrap();
        assert_eq!(part.face_count(), 1);
        assert_eq!(part.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);

        let mut host = Mesh::new();
        let appended = host.append(&part).unwrap();
        assert_eq!(appended.len(), 1);
    }
}
