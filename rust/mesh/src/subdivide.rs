// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Edge and face splitting, and interval subdivision.
//!
//! [`Mesh::subdivide`] is the workhorse of every feature builder: it cuts a
//! set of parallel edges into intervals of given widths and connects the
//! cuts across the faces between them. Cuts are made uniformly first and
//! each cut line is then slid along the cut direction to its cumulative
//! target, so uneven partitions never need re-triangulation.

use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;

use crate::arena::{EdgeData, Mesh};
use crate::error::{Error, Result};
use crate::keys::*;

/// Smallest interval width accepted by [`Mesh::subdivide`].
pub const MIN_INTERVAL: f64 = 1e-6;

/// Result of splitting one edge.
#[derive(Debug, Clone, Copy)]
pub struct EdgeSplit {
    /// The inserted vertex.
    pub vertex: VertexKey,
    /// Edge from the `from` endpoint to the new vertex.
    pub near: EdgeKey,
    /// Edge from the new vertex to the far endpoint.
    pub far: EdgeKey,
}

/// Result of splitting one face in two.
#[derive(Debug, Clone)]
pub struct FaceSplit {
    /// The original key, now holding the first part.
    pub first: FaceKey,
    /// The newly created second part.
    pub second: FaceKey,
    /// Edges created along the cut.
    pub edges: Vec<EdgeKey>,
}

impl Mesh {
    /// Splits `edge` at `fraction` of its length measured from `from`.
    ///
    /// Faces using the edge get the new vertex inserted into their loops.
    pub fn split_edge(&mut self, edge: EdgeKey, from: VertexKey, fraction: f64) -> Result<EdgeSplit> {
        let data = self.edges.get(edge).ok_or(Error::EdgeNotFound(edge))?.clone();
        let to = data.other(from).ok_or(Error::NotOnEdge { edge, vertex: from })?;
        let a = self.co(from);
        let b = self.co(to);
        let vertex = self.add_vertex_at(&(a + (b - a) * fraction));

        // `edge` becomes from -> vertex, a new edge covers vertex -> to
        self.unlink_edge(edge);
        if let Some(e) = self.edges.get_mut(edge) {
            *e = EdgeData { start: from, end: vertex };
        }
        self.link_edge(edge);
        let far = self.edges.insert(EdgeData { start: vertex, end: to });
        self.link_edge(far);

        let faces = self.edge_faces(edge).to_vec();
        for f in faces {
            let Some(face) = self.faces.get_mut(f) else {
                continue;
            };
            let Some(i) = face.edges.iter().position(|&e| e == edge) else {
                continue;
            };
            if face.verts[i] == from {
                face.verts.insert(i + 1, vertex);
                face.edges.insert(i + 1, far);
            } else {
                // Loop runs to -> from at position i
                face.verts.insert(i + 1, vertex);
                face.edges[i] = far;
                face.edges.insert(i + 1, edge);
            }
            self.edge_faces.entry(far).or_default().push(f);
        }
        Ok(EdgeSplit { vertex, near: edge, far })
    }

    /// Cuts an edge into `cuts + 1` equal parts.
    ///
    /// Returns the new vertices ordered from `from` towards the other end.
    pub fn subdivide_edge_uniform(
        &mut self,
        edge: EdgeKey,
        from: VertexKey,
        cuts: usize,
    ) -> Result<Vec<VertexKey>> {
        let mut out = Vec::with_capacity(cuts);
        let mut tail = edge;
        let mut start = from;
        for i in 0..cuts {
            let remaining = (cuts + 1 - i) as f64;
            let split = self.split_edge(tail, start, 1.0 / remaining)?;
            out.push(split.vertex);
            tail = split.far;
            start = split.vertex;
        }
        Ok(out)
    }

    /// Splits a face with a straight edge between two non-adjacent loop
    /// vertices.
    pub fn split_face(&mut self, face: FaceKey, a: VertexKey, b: VertexKey) -> Result<FaceSplit> {
        let verts = self.face_vertices(face).to_vec();
        let n = verts.len();
        let ia = self.loop_index(face, a).ok_or(Error::NotInLoop { face, vertex: a })?;
        let ib = self.loop_index(face, b).ok_or(Error::NotInLoop { face, vertex: b })?;
        if ia == ib || (ia + 1) % n == ib || (ib + 1) % n == ia {
            return Err(Error::AdjacentVertices(face));
        }
        self.split_face_path(face, a, b, &[])
    }

    /// Splits a face along a polyline from `a` through `path` to `b`.
    ///
    /// `path` runs from `a` towards `b`; `a` and `b` may be adjacent when it
    /// is non-empty. The first part keeps the face key and runs `a .. b`
    /// along the old loop; the second runs `b .. a`.
    pub fn split_face_path(
        &mut self,
        face: FaceKey,
        a: VertexKey,
        b: VertexKey,
        path: &[Point3<f64>],
    ) -> Result<FaceSplit> {
        let verts = self.face_vertices(face).to_vec();
        let n = verts.len();
        let ia = self.loop_index(face, a).ok_or(Error::NotInLoop { face, vertex: a })?;
        let ib = self.loop_index(face, b).ok_or(Error::NotInLoop { face, vertex: b })?;
        if ia == ib {
            return Err(Error::AdjacentVertices(face));
        }

        let mut first: Vec<VertexKey> = Vec::new();
        let mut k = ia;
        loop {
            first.push(verts[k]);
            if k == ib {
                break;
            }
            k = (k + 1) % n;
        }
        let mut second: Vec<VertexKey> = Vec::new();
        let mut k = ib;
        loop {
            second.push(verts[k]);
            if k == ia {
                break;
            }
            k = (k + 1) % n;
        }

        let inner: Vec<VertexKey> = path.iter().map(|p| self.add_vertex_at(p)).collect();
        first.extend(inner.iter().rev());
        second.extend(inner.iter());

        let category = self.categories.get(&face).copied();
        self.set_face_loop(face, &first)?;
        let other = self.add_face(&second)?;
        if let Some(c) = category {
            self.categories.insert(other, c);
        }

        let mut chain = Vec::with_capacity(inner.len() + 2);
        chain.push(a);
        chain.extend(inner.iter().copied());
        chain.push(b);
        let edges = chain
            .windows(2)
            .filter_map(|w| self.edge_between(w[0], w[1]))
            .collect();
        Ok(FaceSplit { first: face, second: other, edges })
    }

    /// Partitions parallel edges into `widths.len()` intervals along
    /// `direction` and connects the cuts across faces holding two of them.
    ///
    /// Widths are absolute lengths and should sum to the edge span. Returns
    /// the inner cut edges ordered along `direction`; a single width leaves
    /// the mesh untouched.
    pub fn subdivide(
        &mut self,
        edges: &[EdgeKey],
        direction: &Vector3<f64>,
        widths: &[f64],
    ) -> Result<Vec<EdgeKey>> {
        if widths.len() < 2 {
            return Ok(Vec::new());
        }
        for (index, &width) in widths.iter().enumerate() {
            if !(width > MIN_INTERVAL) {
                return Err(Error::ZeroLengthSubdivision { index, width });
            }
        }
        let cuts = widths.len() - 1;
        let mut unique: Vec<EdgeKey> = Vec::new();
        for &e in edges {
            self.require_edge(e)?;
            if !unique.contains(&e) {
                unique.push(e);
            }
        }

        // Uniform cuts, each list ordered along `direction`
        let mut cut_lists: Vec<Vec<VertexKey>> = Vec::with_capacity(unique.len());
        for &e in &unique {
            let (s, t) = self.edge_vertices(e).ok_or(Error::EdgeNotFound(e))?;
            if (self.co(t) - self.co(s)).norm() < MIN_INTERVAL {
                return Err(Error::ZeroLengthSubdivision { index: 0, width: 0.0 });
            }
            let from = if (self.co(t) - self.co(s)).dot(direction) >= 0.0 { s } else { t };
            cut_lists.push(self.subdivide_edge_uniform(e, from, cuts)?);
        }

        // Slide cut line i to its cumulative offset
        let total: f64 = widths.iter().sum();
        let avg = total / widths.len() as f64;
        let dir = direction.try_normalize(1e-12).ok_or_else(|| {
            Error::InvalidWidths("subdivision direction has zero length".into())
        })?;
        let mut cumulative = 0.0;
        for i in 0..cuts {
            cumulative += widths[i];
            let diff = cumulative - (i + 1) as f64 * avg;
            if diff.abs() > 1e-12 {
                let line: Vec<VertexKey> = cut_lists.iter().map(|l| l[i]).collect();
                self.translate(&line, &(dir * diff));
            }
        }

        // Connect matching cuts across faces that hold two split edges
        let mut owner: FxHashMap<VertexKey, (usize, usize)> = FxHashMap::default();
        for (li, list) in cut_lists.iter().enumerate() {
            for (ci, &v) in list.iter().enumerate() {
                owner.insert(v, (li, ci));
            }
        }
        let mut pairs: Vec<(usize, usize)> = Vec::new();
        for li in 0..cut_lists.len() {
            let Some(&first_cut) = cut_lists[li].first() else {
                continue;
            };
            for f in self.vertex_faces(first_cut) {
                let lists: Vec<usize> = self
                    .face_vertices(f)
                    .iter()
                    .filter_map(|v| owner.get(v).map(|&(l, _)| l))
                    .collect();
                let mut distinct = lists.clone();
                distinct.sort_unstable();
                distinct.dedup();
                if distinct.len() == 2 {
                    let pair = (distinct[0], distinct[1]);
                    if !pairs.contains(&pair) {
                        pairs.push(pair);
                    }
                }
            }
        }

        let mut inner: Vec<(usize, EdgeKey)> = Vec::new();
        for (la, lb) in pairs {
            for ci in 0..cuts {
                let (va, vb) = (cut_lists[la][ci], cut_lists[lb][ci]);
                let face = self.vertex_faces(va).into_iter().find(|&f| {
                    let verts = self.face_vertices(f);
                    verts.contains(&vb) && self.edge_between(va, vb).is_none()
                });
                if let Some(face) = face {
                    let split = self.split_face(face, va, vb)?;
                    inner.extend(split.edges.into_iter().map(|e| (ci, e)));
                }
            }
        }
        inner.sort_by_key(|&(ci, _)| ci);
        Ok(inner.into_iter().map(|(_, e)| e).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(mesh: &mut Mesh, w: f64, h: f64) -> (FaceKey, [VertexKey; 4]) {
        let v0 = mesh.add_vertex(0.0, 0.0, 0.0);
        let v1 = mesh.add_vertex(w, 0.0, 0.0);
        let v2 = mesh.add_vertex(w, 0.0, h);
        let v3 = mesh.add_vertex(0.0, 0.0, h);
        let f = mesh.add_face(&[v0, v1, v2, v3]).unwrap();
        (f, [v0, v1, v2, v3])
    }

    #[test]
    fn split_edge_updates_both_faces() {
        let mut mesh = Mesh::new();
        let (f, v) = rect(&mut mesh, 1.0, 1.0);
        let v4 = mesh.add_vertex(1.0, -1.0, 0.0);
        let g = mesh.add_face(&[v[1], v4, v[2]]).unwrap();
        let shared = mesh.edge_between(v[1], v[2]).unwrap();
        let split = mesh.split_edge(shared, v[1], 0.25).unwrap();
        assert_relative_eq!(mesh.co(split.vertex).z, 0.25, epsilon = 1e-12);
        assert_eq!(mesh.face_vertices(f).len(), 5);
        assert_eq!(mesh.face_vertices(g).len(), 4);
        for face in [f, g] {
            let verts = mesh.face_vertices(face).to_vec();
            let edges = mesh.face_edges(face).to_vec();
            for i in 0..verts.len() {
                let d = mesh.edge(edges[i]).unwrap();
                assert!(d.contains(verts[i]) && d.contains(verts[(i + 1) % verts.len()]));
            }
        }
    }

    #[test]
    fn split_face_between_opposite_corners() {
        let mut mesh = Mesh::new();
        let (f, v) = rect(&mut mesh, 1.0, 1.0);
        let split = mesh.split_face(f, v[0], v[2]).unwrap();
        assert_eq!(split.edges.len(), 1);
        assert_eq!(mesh.face_count(), 2);
        assert!(matches!(mesh.split_face(f, v[0], v[1]), Err(Error::AdjacentVertices(_))));
    }

    #[test]
    fn split_face_along_path_between_adjacent() {
        let mut mesh = Mesh::new();
        let (f, v) = rect(&mut mesh, 2.0, 2.0);
        let path = [Point3::new(0.5, 0.0, 1.0), Point3::new(1.5, 0.0, 1.0)];
        let split = mesh.split_face_path(f, v[0], v[1], &path).unwrap();
        assert_eq!(split.edges.len(), 3);
        let a1 = mesh.face_area(split.first).unwrap();
        let a2 = mesh.face_area(split.second).unwrap();
        assert_relative_eq!(a1 + a2, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn subdivision_exactness() {
        let mut mesh = Mesh::new();
        let (f, _) = rect(&mut mesh, 4.0, 2.0);
        let horizontal: Vec<EdgeKey> = mesh
            .face_edges(f)
            .iter()
            .copied()
            .filter(|&e| mesh.edge_vector(e).unwrap().z.abs() < 1e-9)
            .collect();
        let widths = [0.5, 2.0, 1.5];
        let inner = mesh.subdivide(&horizontal, &Vector3::x(), &widths).unwrap();
        assert_eq!(inner.len(), 2);
        assert_relative_eq!(mesh.edge_center(inner[0]).unwrap().x, 0.5, epsilon = 1e-9);
        assert_relative_eq!(mesh.edge_center(inner[1]).unwrap().x, 2.5, epsilon = 1e-9);
        assert_eq!(mesh.face_count(), 3);
    }

    #[test]
    fn zero_width_is_an_error() {
        let mut mesh = Mesh::new();
        let (f, _) = rect(&mut mesh, 1.0, 1.0);
        let edges = mesh.face_edges(f).to_vec();
        let err = mesh.subdivide(&edges[..1], &Vector3::x(), &[1.0, 0.0]);
        assert!(matches!(err, Err(Error::ZeroLengthSubdivision { index: 1, .. })));
    }
}
