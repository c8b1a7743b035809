// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element construction, rewiring and deletion.
//!
//! Every constructor validates its inputs and keeps the adjacency indices in
//! sync. Deletion comes in the same flavours as a modelling tool offers:
//! faces only, faces with their now-unused edges and vertices, edges, and
//! vertices.

use nalgebra::Point3;
use rustc_hash::FxHashSet;

use crate::arena::{EdgeData, FaceData, Mesh};
use crate::error::{Error, Result};
use crate::keys::*;

/// Drops consecutive duplicates from a cyclic vertex loop.
pub(crate) fn clean_loop(verts: &[VertexKey]) -> Vec<VertexKey> {
    let mut out: Vec<VertexKey> = Vec::with_capacity(verts.len());
    for &v in verts {
        if out.last() != Some(&v) {
            out.push(v);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

impl Mesh {
    /// Returns the edge joining `a` and `b`, creating it if needed.
    pub fn add_edge(&mut self, a: VertexKey, b: VertexKey) -> Result<EdgeKey> {
        self.require_vertex(a)?;
        self.require_vertex(b)?;
        if a == b {
            return Err(Error::DegenerateEdge);
        }
        if let Some(existing) = self.edge_between(a, b) {
            return Ok(existing);
        }
        let key = self.edges.insert(EdgeData { start: a, end: b });
        self.link_edge(key);
        Ok(key)
    }

    /// Adds a loose edge between two new vertices.
    pub fn add_edge_from_points(&mut self, a: &Point3<f64>, b: &Point3<f64>) -> Result<EdgeKey> {
        let va = self.add_vertex_at(a);
        let vb = self.add_vertex_at(b);
        self.add_edge(va, vb)
    }

    /// Creates a face from an ordered vertex loop.
    ///
    /// Missing edges are created. If a face with exactly this vertex set
    /// already exists, its key is returned instead of a duplicate.
    pub fn add_face(&mut self, verts: &[VertexKey]) -> Result<FaceKey> {
        for &v in verts {
            self.require_vertex(v)?;
        }
        let verts = clean_loop(verts);
        self.validate_loop(&verts)?;
        if let Some(existing) = self.find_face(&verts) {
            return Ok(existing);
        }
        let edges = self.loop_edges(&verts)?;
        let key = self.faces.insert(FaceData { verts, edges });
        self.attach_face(key);
        Ok(key)
    }

    /// Creates a face over fresh vertices at `points`.
    pub fn add_face_from_points(&mut self, points: &[Point3<f64>]) -> Result<FaceKey> {
        let verts: Vec<VertexKey> = points.iter().map(|p| self.add_vertex_at(p)).collect();
        self.add_face(&verts)
    }

    /// Finds a face whose loop uses exactly the given vertex set.
    pub fn find_face(&self, verts: &[VertexKey]) -> Option<FaceKey> {
        if verts.len() < 2 {
            return None;
        }
        let first = self.edge_between(verts[0], verts[1])?;
        self.edge_faces(first).iter().copied().find(|&f| {
            let loop_verts = self.face_vertices(f);
            loop_verts.len() == verts.len() && verts.iter().all(|v| loop_verts.contains(v))
        })
    }

    fn validate_loop(&self, verts: &[VertexKey]) -> Result<()> {
        if verts.len() < 3 {
            return Err(Error::DegenerateFace("fewer than three vertices"));
        }
        let distinct: FxHashSet<VertexKey> = verts.iter().copied().collect();
        if distinct.len() != verts.len() {
            return Err(Error::DegenerateFace("repeated vertex in loop"));
        }
        if self.loop_normal(verts).is_none() {
            return Err(Error::DegenerateFace("zero area"));
        }
        Ok(())
    }

    /// Creates (or reuses) the edges of a cleaned vertex loop.
    pub(crate) fn loop_edges(&mut self, verts: &[VertexKey]) -> Result<Vec<EdgeKey>> {
        let n = verts.len();
        let mut edges = Vec::with_capacity(n);
        for i in 0..n {
            edges.push(self.add_edge(verts[i], verts[(i + 1) % n])?);
        }
        Ok(edges)
    }

    /// Replaces the loop of an existing face, keeping its key and category.
    ///
    /// Edges that lose their last face stay in the mesh as loose edges.
    pub fn set_face_loop(&mut self, face: FaceKey, verts: &[VertexKey]) -> Result<()> {
        self.require_face(face)?;
        let verts = clean_loop(verts);
        self.validate_loop(&verts)?;
        let edges = self.loop_edges(&verts)?;
        self.detach_face(face);
        if let Some(data) = self.faces.get_mut(face) {
            data.verts = verts;
            data.edges = edges;
        }
        self.attach_face(face);
        Ok(())
    }

    /// Flips the winding (and therefore the normal) of a face.
    pub fn reverse_face(&mut self, face: FaceKey) -> Result<()> {
        let data = self.faces.get_mut(face).ok_or(Error::FaceNotFound(face))?;
        data.verts.reverse();
        // edges[i] joined verts[i]..verts[i+1]; after reversal it must join
        // the reversed pair, which is the old edges[n - 2 - i]
        let n = data.edges.len();
        let old = data.edges.clone();
        for i in 0..n {
            data.edges[i] = old[(2 * n - 2 - i) % n];
        }
        Ok(())
    }

    pub fn reverse_faces(&mut self, faces: &[FaceKey]) -> Result<()> {
        faces.iter().try_for_each(|&f| self.reverse_face(f))
    }

    /// Removes faces, leaving their edges and vertices in place.
    pub fn delete_faces_only(&mut self, faces: &[FaceKey]) {
        for &f in faces {
            self.detach_face(f);
            self.faces.remove(f);
            self.categories.remove(&f);
        }
    }

    /// Removes faces together with edges and vertices nothing else uses.
    pub fn delete_faces(&mut self, faces: &[FaceKey]) {
        let mut edges: Vec<EdgeKey> = Vec::new();
        let mut verts: Vec<VertexKey> = Vec::new();
        for &f in faces {
            if let Some(data) = self.faces.get(f) {
                edges.extend_from_slice(&data.edges);
                verts.extend_from_slice(&data.verts);
            }
        }
        self.delete_faces_only(faces);
        for e in edges {
            if self.contains_edge(e) && self.edge_faces(e).is_empty() {
                self.remove_edge_raw(e);
            }
        }
        for v in verts {
            if self.contains_vertex(v) && self.vertex_edges(v).is_empty() {
                self.vertices.remove(v);
            }
        }
    }

    /// Removes edges and every face using them, then vertices left loose.
    pub fn delete_edges(&mut self, edges: &[EdgeKey]) {
        let mut faces: Vec<FaceKey> = Vec::new();
        let mut verts: Vec<VertexKey> = Vec::new();
        for &e in edges {
            faces.extend_from_slice(self.edge_faces(e));
            if let Some((a, b)) = self.edge_vertices(e) {
                verts.push(a);
                verts.push(b);
            }
        }
        faces.sort();
        faces.dedup();
        self.delete_faces_only(&faces);
        for &e in edges {
            if self.contains_edge(e) {
                self.remove_edge_raw(e);
            }
        }
        for v in verts {
            if self.contains_vertex(v) && self.vertex_edges(v).is_empty() {
                self.vertices.remove(v);
            }
        }
    }

    /// Removes vertices with every edge and face that uses them.
    pub fn delete_vertices(&mut self, verts: &[VertexKey]) {
        let mut edges: Vec<EdgeKey> = Vec::new();
        for &v in verts {
            edges.extend_from_slice(self.vertex_edges(v));
        }
        edges.sort();
        edges.dedup();
        let mut faces: Vec<FaceKey> = Vec::new();
        for &e in &edges {
            faces.extend_from_slice(self.edge_faces(e));
        }
        faces.sort();
        faces.dedup();
        self.delete_faces_only(&faces);
        for e in edges {
            self.remove_edge_raw(e);
        }
        for &v in verts {
            self.vertices.remove(v);
            self.vertex_edges.remove(&v);
        }
    }

    pub(crate) fn remove_edge_raw(&mut self, e: EdgeKey) {
        self.unlink_edge(e);
        self.edges.remove(e);
        self.edge_faces.remove(&e);
    }

    /// Welds `remove` into `keep`.
    ///
    /// Faces and edges that referenced `remove` are rewired to `keep`. Faces
    /// that collapse below three vertices are deleted; loose edges survive.
    pub fn merge_vertices(&mut self, keep: VertexKey, remove: VertexKey) -> Result<()> {
        if keep == remove {
            return Ok(());
        }
        self.require_vertex(keep)?;
        self.require_vertex(remove)?;

        let incident: Vec<EdgeKey> = self.vertex_edges(remove).to_vec();
        let mut touched: Vec<FaceKey> = Vec::new();
        for &e in &incident {
            for &f in self.edge_faces(e) {
                if !touched.contains(&f) {
                    touched.push(f);
                }
            }
        }
        let loops: Vec<(FaceKey, Vec<VertexKey>)> = touched
            .iter()
            .map(|&f| {
                let verts = self
                    .face_vertices(f)
                    .iter()
                    .map(|&v| if v == remove { keep } else { v })
                    .collect();
                (f, verts)
            })
            .collect();

        for &f in &touched {
            self.detach_face(f);
        }
        for &e in &incident {
            let other = self.other_vertex(e, remove);
            self.remove_edge_raw(e);
            if let Some(o) = other {
                if o != keep && o != remove {
                    self.add_edge(keep, o)?;
                }
            }
        }
        self.vertices.remove(remove);
        self.vertex_edges.remove(&remove);

        for (f, verts) in loops {
            let verts = clean_loop(&verts);
            let distinct: FxHashSet<VertexKey> = verts.iter().copied().collect();
            if distinct.len() < 3 {
                self.faces.remove(f);
                self.categories.remove(&f);
                continue;
            }
            let edges = self.loop_edges(&verts)?;
            if let Some(data) = self.faces.get_mut(f) {
                data.verts = verts;
                data.edges = edges;
            }
            self.attach_face(f);
        }
        Ok(())
    }

    /// Removes edges between face pairs, joining each pair into one face.
    ///
    /// Edges without exactly two faces are skipped. With `use_verts`, the
    /// endpoints left with two collinear edges are dissolved as well. Returns
    /// the surviving joined faces.
    pub fn dissolve_edges(&mut self, edges: &[EdgeKey], use_verts: bool) -> Result<Vec<FaceKey>> {
        let mut joined: Vec<FaceKey> = Vec::new();
        let mut ends: Vec<VertexKey> = Vec::new();
        for &e in edges {
            if !self.contains_edge(e) {
                continue;
            }
            let faces = self.edge_faces(e).to_vec();
            if faces.len() != 2 || faces[0] == faces[1] {
                continue;
            }
            let Some((a, b)) = self.edge_vertices(e) else {
                continue;
            };
            let Some(merged) = self.joined_loop(faces[0], faces[1], a, b) else {
                continue;
            };
            let distinct: FxHashSet<VertexKey> = merged.iter().copied().collect();
            if distinct.len() != merged.len() {
                // Joining would pinch the loop
                continue;
            }
            self.delete_faces_only(&[faces[1]]);
            self.detach_face(faces[0]);
            self.remove_edge_raw(e);
            let loop_edges = self.loop_edges(&merged)?;
            if let Some(data) = self.faces.get_mut(faces[0]) {
                data.verts = merged;
                data.edges = loop_edges;
            }
            self.attach_face(faces[0]);
            joined.retain(|f| *f != faces[1]);
            if !joined.contains(&faces[0]) {
                joined.push(faces[0]);
            }
            ends.push(a);
            ends.push(b);
        }
        if use_verts {
            for v in ends {
                if self.contains_vertex(v) {
                    self.dissolve_collinear_vertex(v)?;
                }
            }
        }
        Ok(joined)
    }

    /// Concatenates two loops sharing the edge `a`-`b`, dropping that edge.
    fn joined_loop(
        &self,
        f1: FaceKey,
        f2: FaceKey,
        a: VertexKey,
        b: VertexKey,
    ) -> Option<Vec<VertexKey>> {
        let l1 = self.face_vertices(f1);
        let mut l2 = self.face_vertices(f2).to_vec();
        let n1 = l1.len();
        let i = l1.iter().position(|&v| v == a)?;
        // Orient so that l1 runs a -> b
        let (first, second) = if l1[(i + 1) % n1] == b { (a, b) } else { (b, a) };
        let start = l1.iter().position(|&v| v == second)?;
        let mut out: Vec<VertexKey> = (0..n1).map(|k| l1[(start + k) % n1]).collect();

        // l2 must run second -> first for consistent winding
        let n2 = l2.len();
        let j = l2.iter().position(|&v| v == second)?;
        if l2[(j + 1) % n2] != first {
            l2.reverse();
        }
        let j = l2.iter().position(|&v| v == first)?;
        let rotated: Vec<VertexKey> = (0..n2).map(|k| l2[(j + k) % n2]).collect();
        // rotated = [first, x1, .., xk, second]
        out.extend_from_slice(&rotated[1..n2 - 1]);
        Some(out)
    }

    /// Dissolves a vertex joining exactly two collinear edges.
    pub fn dissolve_collinear_vertex(&mut self, v: VertexKey) -> Result<bool> {
        let edges = self.vertex_edges(v).to_vec();
        if edges.len() != 2 {
            return Ok(false);
        }
        let (Some(p), Some(q)) = (self.other_vertex(edges[0], v), self.other_vertex(edges[1], v))
        else {
            return Ok(false);
        };
        let c = self.co(v);
        let d1 = self.co(p) - c;
        let d2 = self.co(q) - c;
        if d1.norm() < 1e-12 || d2.norm() < 1e-12 {
            return Ok(false);
        }
        let cos = d1.normalize().dot(&d2.normalize());
        if cos > -1.0 + 1e-6 {
            return Ok(false);
        }
        let faces = self.vertex_faces(v);
        if faces.iter().any(|&f| self.face_vertices(f).len() <= 3) {
            return Ok(false);
        }
        let loops: Vec<(FaceKey, Vec<VertexKey>)> = faces
            .iter()
            .map(|&f| {
                let verts = self.face_vertices(f).iter().copied().filter(|&x| x != v).collect();
                (f, verts)
            })
            .collect();
        for &f in &faces {
            self.detach_face(f);
        }
        for e in edges {
            self.remove_edge_raw(e);
        }
        self.vertices.remove(v);
        self.vertex_edges.remove(&v);
        self.add_edge(p, q)?;
        for (f, verts) in loops {
            let loop_edges = self.loop_edges(&verts)?;
            if let Some(data) = self.faces.get_mut(f) {
                data.verts = verts;
                data.edges = loop_edges;
            }
            self.attach_face(f);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square(mesh: &mut Mesh) -> (FaceKey, [VertexKey; 4]) {
        let v0 = mesh.add_vertex(0.0, 0.0, 0.0);
        let v1 = mesh.add_vertex(1.0, 0.0, 0.0);
        let v2 = mesh.add_vertex(1.0, 1.0, 0.0);
        let v3 = mesh.add_vertex(0.0, 1.0, 0.0);
        let f = mesh.add_face(&[v0, v1, v2, v3]).unwrap();
        (f, [v0, v1, v2, v3])
    }

    #[test]
    fn add_face_creates_edges() {
        let mut mesh = Mesh::new();
        let (f, v) = unit_square(&mut mesh);
        assert_eq!(mesh.edge_count(), 4);
        assert_eq!(mesh.face_vertices(f), &v);
        for &e in mesh.face_edges(f) {
            assert_eq!(mesh.edge_faces(e), &[f]);
        }
    }

    #[test]
    fn add_face_reuses_existing() {
        let mut mesh = Mesh::new();
        let (f, v) = unit_square(&mut mesh);
        let again = mesh.add_face(&[v[1], v[2], v[3], v[0]]).unwrap();
        assert_eq!(f, again);
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn degenerate_faces_are_rejected() {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(0.0, 0.0, 0.0);
        let b = mesh.add_vertex(1.0, 0.0, 0.0);
        let c = mesh.add_vertex(2.0, 0.0, 0.0);
        assert!(matches!(mesh.add_face(&[a, b]), Err(Error::DegenerateFace(_))));
        assert!(matches!(mesh.add_face(&[a, b, c]), Err(Error::DegenerateFace(_))));
        assert!(matches!(mesh.add_edge(a, a), Err(Error::DegenerateEdge)));
    }

    #[test]
    fn reverse_face_keeps_edge_pairing() {
        let mut mesh = Mesh::new();
        let (f, _) = unit_square(&mut mesh);
        mesh.reverse_face(f).unwrap();
        let verts = mesh.face_vertices(f).to_vec();
        let edges = mesh.face_edges(f).to_vec();
        for i in 0..4 {
            let (a, b) = mesh.edge_vertices(edges[i]).unwrap();
            let (p, q) = (verts[i], verts[(i + 1) % 4]);
            assert!((a == p && b == q) || (a == q && b == p));
        }
        assert!(mesh.face_normal(f).unwrap().z < 0.0);
    }

    #[test]
    fn delete_faces_removes_orphans_only() {
        let mut mesh = Mesh::new();
        let (f, v) = unit_square(&mut mesh);
        let v4 = mesh.add_vertex(2.0, 0.0, 0.0);
        let v5 = mesh.add_vertex(2.0, 1.0, 0.0);
        let g = mesh.add_face(&[v[1], v4, v5, v[2]]).unwrap();
        mesh.delete_faces(&[f]);
        assert!(!mesh.contains_face(f));
        assert!(mesh.contains_face(g));
        // Shared edge v1-v2 survives, v0 and v3 do not
        assert!(mesh.edge_between(v[1], v[2]).is_some());
        assert!(!mesh.contains_vertex(v[0]));
        assert!(!mesh.contains_vertex(v[3]));
        assert_eq!(mesh.edge_count(), 4);
    }

    #[test]
    fn merge_vertices_collapses_triangle() {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(0.0, 0.0, 0.0);
        let b = mesh.add_vertex(1.0, 0.0, 0.0);
        let c = mesh.add_vertex(0.0, 1.0, 0.0);
        let f = mesh.add_face(&[a, b, c]).unwrap();
        mesh.merge_vertices(a, b).unwrap();
        assert!(!mesh.contains_face(f));
        assert!(!mesh.contains_vertex(b));
        assert!(mesh.edge_between(a, c).is_some());
    }

    #[test]
    fn dissolve_shared_edge_joins_faces() {
        let mut mesh = Mesh::new();
        let (f, v) = unit_square(&mut mesh);
        let v4 = mesh.add_vertex(2.0, 0.0, 0.0);
        let v5 = mesh.add_vertex(2.0, 1.0, 0.0);
        let g = mesh.add_face(&[v[1], v4, v5, v[2]]).unwrap();
        let shared = mesh.edge_between(v[1], v[2]).unwrap();
        let joined = mesh.dissolve_edges(&[shared], true).unwrap();
        assert_eq!(joined, vec![f]);
        assert!(!mesh.contains_face(g));
        // v1 and v2 became collinear and were dissolved
        assert_eq!(mesh.face_vertices(f).len(), 4);
        assert!((mesh.face_area(f).unwrap() - 2.0).abs() < 1e-9);
    }
}
