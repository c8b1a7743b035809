// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for the boundary-representation mesh.
//!
//! The [`Mesh`] is the single owner of all vertices, edges and faces. Each
//! element lives in a slot map with a stable generational key. Two upward
//! adjacency indices (vertex → edges, edge → faces) make neighbourhood
//! queries O(1) on average.
//!
//! ## Face loops
//!
//! A face stores its vertex loop and the matching edge loop: `edges[i]` joins
//! `verts[i]` and `verts[(i + 1) % n]`. Edges are unordered vertex pairs and
//! carry no winding; the winding lives in the face loop alone.
//!
//! ## Manifoldness
//!
//! Feature builders legitimately produce edges shared by three faces (a slab
//! rim meeting a wall and a floor), so the arena does not refuse them. What
//! the kernel refuses is degenerate geometry: zero-length edges and faces
//! with fewer than three distinct vertices or no area.

use nalgebra::Point3;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::keys::*;

/// Data stored for a vertex: a point in 3D space.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexData {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl VertexData {
    /// Returns the position as a point.
    pub fn point(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }
}

/// Data stored for an edge: an unordered pair of vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeData {
    pub start: VertexKey,
    pub end: VertexKey,
}

impl EdgeData {
    /// Returns `true` if `v` is one of the endpoints.
    pub fn contains(&self, v: VertexKey) -> bool {
        self.start == v || self.end == v
    }

    /// Returns the endpoint opposite to `v`.
    pub fn other(&self, v: VertexKey) -> Option<VertexKey> {
        if self.start == v {
            Some(self.end)
        } else if self.end == v {
            Some(self.start)
        } else {
            None
        }
    }
}

/// Data stored for a face: matching vertex and edge loops.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceData {
    pub verts: Vec<VertexKey>,
    pub edges: Vec<EdgeKey>,
}

/// The mutable B-rep owned by one feature build at a time.
///
/// # Example
///
/// ```
/// use archgen_mesh::Mesh;
///
/// let mut mesh = Mesh::new();
/// let v0 = mesh.add_vertex(0.0, 0.0, 0.0);
/// let v1 = mesh.add_vertex(1.0, 0.0, 0.0);
/// let v2 = mesh.add_vertex(1.0, 1.0, 0.0);
/// let face = mesh.add_face(&[v0, v1, v2]).unwrap();
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.edge_count(), 3);
/// assert!(mesh.contains_face(face));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    // Element storage
    pub(crate) vertices: SlotMap<VertexKey, VertexData>,
    pub(crate) edges: SlotMap<EdgeKey, EdgeData>,
    pub(crate) faces: SlotMap<FaceKey, FaceData>,

    // Upward adjacency: child → parents
    pub(crate) vertex_edges: FxHashMap<VertexKey, SmallVec<[EdgeKey; 4]>>,
    pub(crate) edge_faces: FxHashMap<EdgeKey, SmallVec<[FaceKey; 2]>>,

    // Per-face integer attribute holding the semantic category
    pub(crate) categories: FxHashMap<FaceKey, i32>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex at `(x, y, z)`.
    pub fn add_vertex(&mut self, x: f64, y: f64, z: f64) -> VertexKey {
        self.vertices.insert(VertexData { x, y, z })
    }

    /// Adds a vertex at `p`.
    pub fn add_vertex_at(&mut self, p: &Point3<f64>) -> VertexKey {
        self.add_vertex(p.x, p.y, p.z)
    }

    pub fn vertex(&self, key: VertexKey) -> Option<&VertexData> {
        self.vertices.get(key)
    }

    pub fn edge(&self, key: EdgeKey) -> Option<&EdgeData> {
        self.edges.get(key)
    }

    pub fn face(&self, key: FaceKey) -> Option<&FaceData> {
        self.faces.get(key)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains_vertex(&self, key: VertexKey) -> bool {
        self.vertices.contains_key(key)
    }

    pub fn contains_edge(&self, key: EdgeKey) -> bool {
        self.edges.contains_key(key)
    }

    pub fn contains_face(&self, key: FaceKey) -> bool {
        self.faces.contains_key(key)
    }

    /// Iterates over all vertex keys.
    pub fn vertex_keys(&self) -> impl Iterator<Item = VertexKey> + '_ {
        self.vertices.keys()
    }

    /// Iterates over all edge keys.
    pub fn edge_keys(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.edges.keys()
    }

    /// Iterates over all face keys.
    pub fn face_keys(&self) -> impl Iterator<Item = FaceKey> + '_ {
        self.faces.keys()
    }

    pub(crate) fn require_vertex(&self, key: VertexKey) -> Result<()> {
        if self.vertices.contains_key(key) {
            Ok(())
        } else {
            Err(Error::VertexNotFound(key))
        }
    }

    pub(crate) fn require_edge(&self, key: EdgeKey) -> Result<()> {
        if self.edges.contains_key(key) {
            Ok(())
        } else {
            Err(Error::EdgeNotFound(key))
        }
    }

    pub(crate) fn require_face(&self, key: FaceKey) -> Result<()> {
        if self.faces.contains_key(key) {
            Ok(())
        } else {
            Err(Error::FaceNotFound(key))
        }
    }

    pub(crate) fn require_faces(&self, keys: &[FaceKey]) -> Result<()> {
        keys.iter().try_for_each(|&f| self.require_face(f))
    }

    /// Registers an edge in the vertex → edges index.
    pub(crate) fn link_edge(&mut self, key: EdgeKey) {
        if let Some(e) = self.edges.get(key) {
            let (s, t) = (e.start, e.end);
            for v in [s, t] {
                let list = self.vertex_edges.entry(v).or_default();
                if !list.contains(&key) {
                    list.push(key);
                }
            }
        }
    }

    /// Removes an edge from the vertex → edges index.
    pub(crate) fn unlink_edge(&mut self, key: EdgeKey) {
        if let Some(e) = self.edges.get(key) {
            let (s, t) = (e.start, e.end);
            for v in [s, t] {
                if let Some(list) = self.vertex_edges.get_mut(&v) {
                    list.retain(|k| *k != key);
                    if list.is_empty() {
                        self.vertex_edges.remove(&v);
                    }
                }
            }
        }
    }

    /// Registers a face in the edge → faces index.
    pub(crate) fn attach_face(&mut self, key: FaceKey) {
        let edges = match self.faces.get(key) {
            Some(f) => f.edges.clone(),
            None => return,
        };
        for e in edges {
            let list = self.edge_faces.entry(e).or_default();
            if !list.contains(&key) {
                list.push(key);
            }
        }
    }

    /// Removes a face from the edge → faces index without deleting it.
    pub(crate) fn detach_face(&mut self, key: FaceKey) {
        let edges = match self.faces.get(key) {
            Some(f) => f.edges.clone(),
            None => return,
        };
        for e in edges {
            if let Some(list) = self.edge_faces.get_mut(&e) {
                list.retain(|k| *k != key);
                if list.is_empty() {
                    self.edge_faces.remove(&e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_count_vertices() {
        let mut mesh = Mesh::new();
        assert!(mesh.is_empty());
        let v = mesh.add_vertex(1.0, 2.0, 3.0);
        assert_eq!(mesh.vertex_count(), 1);
        assert_eq!(mesh.vertex(v).map(VertexData::point), Some(Point3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn edge_other_endpoint() {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(0.0, 0.0, 0.0);
        let b = mesh.add_vertex(1.0, 0.0, 0.0);
        let c = mesh.add_vertex(2.0, 0.0, 0.0);
        let e = EdgeData { start: a, end: b };
        assert_eq!(e.other(a), Some(b));
        assert_eq!(e.other(b), Some(a));
        assert_eq!(e.other(c), None);
        assert!(e.contains(a));
    }

    #[test]
    fn missing_keys_are_reported() {
        let mut mesh = Mesh::new();
        let v = mesh.add_vertex(0.0, 0.0, 0.0);
        mesh.vertices.remove(v);
        assert!(matches!(mesh.require_vertex(v), Err(Error::VertexNotFound(_))));
    }
}
