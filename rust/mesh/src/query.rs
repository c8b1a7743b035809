// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial queries over face and edge sets: local frames, opposite faces,
//! region boundaries, directional sorting, and frame-aligned subdivision.
//!
//! Every feature builder works in the local frame of its host face: `x`
//! runs along the wall, `y` points up the wall and `z` is the face normal.

use nalgebra::{Point3, Rotation3, Vector3};
use rustc_hash::FxHashSet;

use crate::arena::Mesh;
use crate::error::Result;
use crate::keys::*;
use crate::predicates::approx_equal;

/// Orthonormal axes derived from a face normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    pub x: Vector3<f64>,
    pub y: Vector3<f64>,
    pub z: Vector3<f64>,
}

impl LocalFrame {
    /// Frame whose `x` is the normal turned a quarter around world `z`.
    ///
    /// For an upright face this puts `x` along the face and `y` straight
    /// up. Flat faces get a frame whose `x` lies in the normal's own plane.
    pub fn from_normal(normal: &Vector3<f64>) -> Self {
        let z = *normal;
        let x = Rotation3::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2) * z;
        let y = z.cross(&x);
        Self { x, y, z }
    }

    /// World vector for local components.
    pub fn to_world(&self, x: f64, y: f64, z: f64) -> Vector3<f64> {
        self.x * x + self.y * y + self.z * z
    }
}

/// Sorts items by the projection of their position on `direction`.
fn sort_by_projection<T: Copy>(
    items: &[T],
    direction: &Vector3<f64>,
    position: impl Fn(T) -> Option<Point3<f64>>,
) -> Vec<T> {
    let mut keyed: Vec<(f64, T)> = items
        .iter()
        .map(|&it| (position(it).map(|p| direction.dot(&p.coords)).unwrap_or(0.0), it))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().map(|(_, it)| it).collect()
}

impl Mesh {
    /// Local frame of a face; `None` for a missing or degenerate face.
    pub fn local_frame(&self, face: FaceKey) -> Option<LocalFrame> {
        self.face_normal(face).map(|n| LocalFrame::from_normal(&n))
    }

    /// Offset of `other` relative to `face`, in `face`'s local `x`/`y`.
    pub fn relative_offset(&self, face: FaceKey, other: FaceKey) -> Option<(f64, f64)> {
        let frame = self.local_frame(face)?;
        let d = self.face_center_bounds(face)? - self.face_center_bounds(other)?;
        Some((-d.dot(&frame.x), -d.dot(&frame.y)))
    }

    /// The face in `faces` (other than `face`) whose center is nearest.
    pub fn opposite_face(&self, face: FaceKey, faces: &[FaceKey]) -> Option<FaceKey> {
        let c = self.face_center_bounds(face)?;
        faces
            .iter()
            .copied()
            .filter(|&f| f != face)
            .filter_map(|f| self.face_center_bounds(f).map(|p| (f, (p - c).norm())))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(f, _)| f)
    }

    /// Edges used by fewer than two faces of the set.
    pub fn boundary_edges(&self, faces: &[FaceKey]) -> Vec<EdgeKey> {
        let set: FxHashSet<FaceKey> = faces.iter().copied().collect();
        self.faces_edges(faces)
            .into_iter()
            .filter(|&e| self.edge_faces(e).iter().filter(|f| set.contains(f)).count() < 2)
            .collect()
    }

    pub fn sort_faces(&self, faces: &[FaceKey], direction: &Vector3<f64>) -> Vec<FaceKey> {
        sort_by_projection(faces, direction, |f| self.face_center_bounds(f))
    }

    pub fn sort_edges(&self, edges: &[EdgeKey], direction: &Vector3<f64>) -> Vec<EdgeKey> {
        sort_by_projection(edges, direction, |e| self.edge_center(e))
    }

    pub fn sort_vertices(&self, verts: &[VertexKey], direction: &Vector3<f64>) -> Vec<VertexKey> {
        sort_by_projection(verts, direction, |v| self.vertex_point(v))
    }

    /// The `n` highest edges by midpoint.
    pub fn top_edges(&self, edges: &[EdgeKey], n: usize) -> Vec<EdgeKey> {
        self.sort_edges(edges, &-Vector3::z()).into_iter().take(n).collect()
    }

    /// The `n` lowest edges by midpoint.
    pub fn bottom_edges(&self, edges: &[EdgeKey], n: usize) -> Vec<EdgeKey> {
        self.sort_edges(edges, &Vector3::z()).into_iter().take(n).collect()
    }

    pub fn top_faces(&self, faces: &[FaceKey], n: usize) -> Vec<FaceKey> {
        self.sort_faces(faces, &-Vector3::z()).into_iter().take(n).collect()
    }

    pub fn bottom_faces(&self, faces: &[FaceKey], n: usize) -> Vec<FaceKey> {
        self.sort_faces(faces, &Vector3::z()).into_iter().take(n).collect()
    }

    /// The `n` edges whose midpoints are nearest the midpoint of `edge`.
    pub fn closest_edges(&self, edge: EdgeKey, edges: &[EdgeKey], n: usize) -> Vec<EdgeKey> {
        let Some(c) = self.edge_center(edge) else {
            return Vec::new();
        };
        let mut keyed: Vec<(f64, EdgeKey)> = edges
            .iter()
            .filter_map(|&e| self.edge_center(e).map(|m| ((m - c).norm(), e)))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        keyed.into_iter().take(n).map(|(_, e)| e).collect()
    }

    /// Edges of `edges` running along `direction` (either sense).
    pub fn edges_along(&self, edges: &[EdgeKey], direction: &Vector3<f64>) -> Vec<EdgeKey> {
        let Some(dir) = direction.try_normalize(1e-12) else {
            return Vec::new();
        };
        edges
            .iter()
            .copied()
            .filter(|&e| {
                self.edge_direction(e)
                    .is_some_and(|d| approx_equal(d.dot(&dir).abs(), 1.0))
            })
            .collect()
    }

    /// Cuts a face into columns of the given widths, left to right along
    /// its local `x`. Returns the columns in that order.
    pub fn subdivide_face_horizontally(&mut self, face: FaceKey, widths: &[f64]) -> Result<Vec<FaceKey>> {
        if widths.len() < 2 {
            return Ok(vec![face]);
        }
        let Some(frame) = self.local_frame(face) else {
            return Ok(vec![face]);
        };
        let edges = self.horizontal_edges(self.face_edges(face));
        self.subdivide_along(&edges, &frame.x, widths)
    }

    /// Cuts a face into rows of the given heights, bottom to top along its
    /// local `y`. Returns the rows in that order.
    pub fn subdivide_face_vertically(&mut self, face: FaceKey, widths: &[f64]) -> Result<Vec<FaceKey>> {
        if widths.len() < 2 {
            return Ok(vec![face]);
        }
        let Some(frame) = self.local_frame(face) else {
            return Ok(vec![face]);
        };
        let edges = self.vertical_edges(self.face_edges(face));
        self.subdivide_along(&edges, &frame.y, widths)
    }

    /// Cuts every face of a group along `direction` using the group's edges
    /// that run parallel to it.
    pub fn subdivide_faces(
        &mut self,
        faces: &[FaceKey],
        direction: &Vector3<f64>,
        widths: &[f64],
    ) -> Result<Vec<FaceKey>> {
        if widths.len() < 2 {
            return Ok(faces.to_vec());
        }
        let edges = self.edges_along(&self.faces_edges(faces), direction);
        self.subdivide_along(&edges, direction, widths)
    }

    fn subdivide_along(
        &mut self,
        edges: &[EdgeKey],
        direction: &Vector3<f64>,
        widths: &[f64],
    ) -> Result<Vec<FaceKey>> {
        let inner = self.subdivide(edges, direction, widths)?;
        let faces = self.edges_faces(&inner, &[]);
        Ok(self.sort_faces(&faces, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn wall(mesh: &mut Mesh, w: f64, h: f64, y: f64) -> FaceKey {
        mesh.add_face_from_points(&[
            Point3::new(0.0, y, 0.0),
            Point3::new(w, y, 0.0),
            Point3::new(w, y, h),
            Point3::new(0.0, y, h),
        ])
        .unwrap()
    }

    #[test]
    fn local_frame_of_wall() {
        let mut mesh = Mesh::new();
        let f = wall(&mut mesh, 4.0, 2.8, 0.0);
        let frame = mesh.local_frame(f).unwrap();
        assert_relative_eq!(frame.z, -Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(frame.x, Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(frame.y, Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn relative_offset_and_opposite() {
        let mut mesh = Mesh::new();
        let front = wall(&mut mesh, 4.0, 2.8, 0.0);
        let back = wall(&mut mesh, 4.0, 2.8, 0.12);
        let far = wall(&mut mesh, 4.0, 2.8, 5.0);
        assert_eq!(mesh.opposite_face(front, &[front, back, far]), Some(back));
        let (ox, oy) = mesh.relative_offset(front, back).unwrap();
        assert_relative_eq!(ox, 0.0, epsilon = 1e-12);
        assert_relative_eq!(oy, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn horizontal_then_vertical_subdivision() {
        let mut mesh = Mesh::new();
        let f = wall(&mut mesh, 4.0, 2.8, 0.0);
        let cols = mesh.subdivide_face_horizontally(f, &[1.5, 1.0, 1.5]).unwrap();
        assert_eq!(cols.len(), 3);
        let widths: Vec<f64> = cols.iter().map(|&c| mesh.face_dimensions(c).0).collect();
        assert_relative_eq!(widths[0], 1.5, epsilon = 1e-9);
        assert_relative_eq!(widths[1], 1.0, epsilon = 1e-9);
        assert_relative_eq!(widths[2], 1.5, epsilon = 1e-9);

        let rows = mesh.subdivide_face_vertically(cols[1], &[2.0, 0.8]).unwrap();
        assert_eq!(rows.len(), 2);
        assert_relative_eq!(mesh.face_center(rows[0]).unwrap().z, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn boundary_of_strip() {
        let mut mesh = Mesh::new();
        let f = wall(&mut mesh, 2.0, 1.0, 0.0);
        let cols = mesh.subdivide_face_horizontally(f, &[1.0, 1.0]).unwrap();
        assert_eq!(mesh.boundary_edges(&cols).len(), 6);
        let bottom = mesh.bottom_edges(&mesh.faces_edges(&cols), 2);
        for e in bottom {
            assert_relative_eq!(mesh.edge_center(e).unwrap().z, 0.0, epsilon = 1e-12);
        }
    }
}
