// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Adjacency traversal.
//!
//! Slice-returning accessors yield an empty slice for keys that are no longer
//! in the mesh, so callers iterating over stale selections see nothing rather
//! than an error.

use rustc_hash::FxHashSet;

use crate::arena::Mesh;
use crate::keys::*;

impl Mesh {
    /// Returns the ordered vertex loop of a face.
    pub fn face_vertices(&self, face: FaceKey) -> &[VertexKey] {
        self.faces.get(face).map(|f| f.verts.as_slice()).unwrap_or(&[])
    }

    /// Returns the ordered edge loop of a face.
    pub fn face_edges(&self, face: FaceKey) -> &[EdgeKey] {
        self.faces.get(face).map(|f| f.edges.as_slice()).unwrap_or(&[])
    }

    /// Returns the two endpoints of an edge.
    pub fn edge_vertices(&self, edge: EdgeKey) -> Option<(VertexKey, VertexKey)> {
        self.edges.get(edge).map(|e| (e.start, e.end))
    }

    /// Returns the faces using an edge.
    pub fn edge_faces(&self, edge: EdgeKey) -> &[FaceKey] {
        self.edge_faces.get(&edge).map(|l| l.as_slice()).unwrap_or(&[])
    }

    /// Returns the edges incident to a vertex.
    pub fn vertex_edges(&self, vertex: VertexKey) -> &[EdgeKey] {
        self.vertex_edges.get(&vertex).map(|l| l.as_slice()).unwrap_or(&[])
    }

    /// Returns the faces whose loop contains a vertex.
    pub fn vertex_faces(&self, vertex: VertexKey) -> Vec<FaceKey> {
        let mut out: Vec<FaceKey> = Vec::new();
        for &e in self.vertex_edges(vertex) {
            for &f in self.edge_faces(e) {
                if !out.contains(&f) {
                    out.push(f);
                }
            }
        }
        out
    }

    /// Returns the vertices sharing an edge with `vertex`.
    pub fn vertex_neighbors(&self, vertex: VertexKey) -> Vec<VertexKey> {
        self.vertex_edges(vertex)
            .iter()
            .filter_map(|&e| self.other_vertex(e, vertex))
            .collect()
    }

    /// Returns the endpoint of `edge` opposite to `vertex`.
    pub fn other_vertex(&self, edge: EdgeKey, vertex: VertexKey) -> Option<VertexKey> {
        self.edges.get(edge)?.other(vertex)
    }

    /// Finds the edge joining two vertices.
    pub fn edge_between(&self, a: VertexKey, b: VertexKey) -> Option<EdgeKey> {
        self.vertex_edges(a)
            .iter()
            .copied()
            .find(|&e| self.edges.get(e).map(|d| d.contains(b)).unwrap_or(false))
    }

    /// Returns the common vertex of two edges.
    pub fn common_vertex(&self, e1: EdgeKey, e2: EdgeKey) -> Option<VertexKey> {
        let (a, b) = self.edge_vertices(e1)?;
        let other = self.edges.get(e2)?;
        [a, b].into_iter().find(|&v| other.contains(v))
    }

    /// Returns faces sharing at least one edge with `face`.
    pub fn face_neighbors(&self, face: FaceKey) -> Vec<FaceKey> {
        let mut out: Vec<FaceKey> = Vec::new();
        for &e in self.face_edges(face) {
            for &f in self.edge_faces(e) {
                if f != face && !out.contains(&f) {
                    out.push(f);
                }
            }
        }
        out
    }

    /// Position of `vertex` in the loop of `face`.
    pub fn loop_index(&self, face: FaceKey, vertex: VertexKey) -> Option<usize> {
        self.face_vertices(face).iter().position(|&v| v == vertex)
    }

    /// Unique vertices of a face set, in first-seen order.
    pub fn faces_vertices(&self, faces: &[FaceKey]) -> Vec<VertexKey> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for &f in faces {
            for &v in self.face_vertices(f) {
                if seen.insert(v) {
                    out.push(v);
                }
            }
        }
        out
    }

    /// Unique edges of a face set, in first-seen order.
    pub fn faces_edges(&self, faces: &[FaceKey]) -> Vec<EdgeKey> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for &f in faces {
            for &e in self.face_edges(f) {
                if seen.insert(e) {
                    out.push(e);
                }
            }
        }
        out
    }

    /// Unique endpoints of an edge set, in first-seen order.
    pub fn edges_vertices(&self, edges: &[EdgeKey]) -> Vec<VertexKey> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for &e in edges {
            if let Some((a, b)) = self.edge_vertices(e) {
                for v in [a, b] {
                    if seen.insert(v) {
                        out.push(v);
                    }
                }
            }
        }
        out
    }

    /// Faces adjacent to any edge of the set, excluding `exclude`.
    pub fn edges_faces(&self, edges: &[EdgeKey], exclude: &[FaceKey]) -> Vec<FaceKey> {
        let mut out: Vec<FaceKey> = Vec::new();
        for &e in edges {
            for &f in self.edge_faces(e) {
                if !exclude.contains(&f) && !out.contains(&f) {
                    out.push(f);
                }
            }
        }
        out
    }

    /// Edges with no face attached.
    pub fn loose_edges(&self) -> Vec<EdgeKey> {
        self.edges
            .keys()
            .filter(|e| self.edge_faces(*e).is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbours_of_strip() {
        let mut mesh = Mesh::new();
        let v: Vec<VertexKey> = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (0.0, 1.0)]
            .iter()
            .map(|&(x, y)| mesh.add_vertex(x, y, 0.0))
            .collect();
        let f1 = mesh.add_face(&[v[0], v[1], v[4], v[5]]).unwrap();
        let f2 = mesh.add_face(&[v[1], v[2], v[3], v[4]]).unwrap();

        assert_eq!(mesh.face_neighbors(f1), vec![f2]);
        assert_eq!(mesh.vertex_faces(v[1]).len(), 2);
        assert_eq!(mesh.vertex_neighbors(v[1]).len(), 3);
        assert_eq!(mesh.faces_vertices(&[f1, f2]).len(), 6);
        assert_eq!(mesh.faces_edges(&[f1, f2]).len(), 7);

        let shared = mesh.edge_between(v[1], v[4]).unwrap();
        let top = mesh.edge_between(v[4], v[5]).unwrap();
        assert_eq!(mesh.common_vertex(shared, top), Some(v[4]));
        assert_eq!(mesh.loop_index(f2, v[3]), Some(2));
    }

    #[test]
    fn stale_keys_yield_empty() {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(0.0, 0.0, 0.0);
        let b = mesh.add_vertex(1.0, 0.0, 0.0);
        let c = mesh.add_vertex(0.0, 1.0, 0.0);
        let f = mesh.add_face(&[a, b, c]).unwrap();
        mesh.delete_faces(&[f]);
        assert!(mesh.face_vertices(f).is_empty());
        assert!(mesh.vertex_edges(a).is_empty());
        assert!(mesh.loose_edges().is_empty());
    }
}
