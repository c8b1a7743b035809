// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric predicates over edges and faces.
//!
//! Orientation tests are expressed against world `+z` as "up". Horizontal
//! and vertical classification compares the normalized edge direction with
//! `+z` at [`EPSILON`], which tolerates the micro-nonplanarity extrusion
//! leaves behind.

use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::Vector3;

use crate::arena::Mesh;
use crate::keys::*;

/// Default tolerance for angle and equality checks.
pub const EPSILON: f64 = 0.001;

/// `true` when `a` and `b` differ by less than [`EPSILON`].
pub fn approx_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// `true` when two vectors point along the same or opposite direction.
pub fn vectors_parallel(a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
    match (a.try_normalize(1e-12), b.try_normalize(1e-12)) {
        (Some(a), Some(b)) => approx_equal(a.dot(&b).abs(), 1.0),
        _ => false,
    }
}

impl Mesh {
    fn up_dot(&self, edge: EdgeKey) -> Option<f64> {
        self.edge_direction(edge).map(|d| d.dot(&Vector3::z()))
    }

    pub fn is_horizontal_edge(&self, edge: EdgeKey) -> bool {
        self.up_dot(edge).is_some_and(|d| approx_equal(d, 0.0))
    }

    pub fn is_vertical_edge(&self, edge: EdgeKey) -> bool {
        self.up_dot(edge).is_some_and(|d| approx_equal(d.abs(), 1.0))
    }

    /// Rise over horizontal run; infinite for vertical edges.
    pub fn edge_slope(&self, edge: EdgeKey) -> Option<f64> {
        let v = self.edge_vector(edge)?;
        let run = v.xy().norm();
        Some(if run < 1e-12 { f64::INFINITY } else { v.z / run })
    }

    /// Finite, non-zero slope.
    pub fn is_sloped_edge(&self, edge: EdgeKey) -> bool {
        self.edge_slope(edge)
            .is_some_and(|s| s.is_finite() && s.abs() > 1e-9)
    }

    pub fn horizontal_edges(&self, edges: &[EdgeKey]) -> Vec<EdgeKey> {
        edges.iter().copied().filter(|&e| self.is_horizontal_edge(e)).collect()
    }

    pub fn vertical_edges(&self, edges: &[EdgeKey]) -> Vec<EdgeKey> {
        edges.iter().copied().filter(|&e| self.is_vertical_edge(e)).collect()
    }

    /// Width and height of a face: half the summed lengths of its horizontal
    /// and vertical edges respectively.
    pub fn face_dimensions(&self, face: FaceKey) -> (f64, f64) {
        let edges = self.face_edges(face);
        let sum = |list: Vec<EdgeKey>| -> f64 {
            list.iter().filter_map(|&e| self.edge_length(e)).sum::<f64>() / 2.0
        };
        (sum(self.horizontal_edges(edges)), sum(self.vertical_edges(edges)))
    }

    /// Four right-angled corners, every other corner straight.
    pub fn is_rectangle(&self, face: FaceKey) -> bool {
        let angles = self.face_corner_angles(face);
        if angles.is_empty() {
            return false;
        }
        let right = angles.iter().filter(|a| (*a - FRAC_PI_2).abs() < EPSILON).count();
        let straight = angles.iter().filter(|a| (*a - PI).abs() < EPSILON).count();
        right == 4 && straight == angles.len() - 4
    }

    /// Rectangle with exactly two horizontal edges.
    pub fn is_valid_ngon(&self, face: FaceKey) -> bool {
        self.horizontal_edges(self.face_edges(face)).len() == 2 && self.is_rectangle(face)
    }

    /// Normal lies in the horizontal plane.
    pub fn is_upright(&self, face: FaceKey) -> bool {
        self.face_normal(face).is_some_and(|n| approx_equal(n.z, 0.0))
    }

    /// Normal points straight up or down.
    pub fn is_flat(&self, face: FaceKey) -> bool {
        self.face_normal(face).is_some_and(|n| approx_equal(n.z.abs(), 1.0))
    }

    /// All faces share the dimensions of the first.
    pub fn same_dimensions(&self, faces: &[FaceKey]) -> bool {
        let Some((&first, rest)) = faces.split_first() else {
            return true;
        };
        let (w, h) = self.face_dimensions(first);
        rest.iter().all(|&f| {
            let (fw, fh) = self.face_dimensions(f);
            approx_equal(w, fw) && approx_equal(h, fh)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn wall(mesh: &mut Mesh, w: f64, h: f64) -> FaceKey {
        mesh.add_face_from_points(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(w, 0.0, 0.0),
            Point3::new(w, 0.0, h),
            Point3::new(0.0, 0.0, h),
        ])
        .unwrap()
    }

    #[test]
    fn wall_face_is_valid_ngon() {
        let mut mesh = Mesh::new();
        let f = wall(&mut mesh, 4.0, 2.8);
        assert!(mesh.is_valid_ngon(f));
        assert!(mesh.is_upright(f));
        assert!(!mesh.is_flat(f));
        let (w, h) = mesh.face_dimensions(f);
        assert_relative_eq!(w, 4.0, epsilon = 1e-12);
        assert_relative_eq!(h, 2.8, epsilon = 1e-12);
    }

    #[test]
    fn split_bottom_edge_breaks_ngon() {
        let mut mesh = Mesh::new();
        let f = wall(&mut mesh, 2.0, 1.0);
        let bottom = mesh.face_edges(f)[0];
        let from = mesh.face_vertices(f)[0];
        mesh.split_edge(bottom, from, 0.5).unwrap();
        // Still a rectangle with a straight corner, but three horizontal edges
        assert!(mesh.is_rectangle(f));
        assert!(!mesh.is_valid_ngon(f));
    }

    #[test]
    fn trapezoid_is_not_rectangle() {
        let mut mesh = Mesh::new();
        let f = mesh
            .add_face_from_points(&[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(1.5, 0.0, 1.0),
                Point3::new(0.5, 0.0, 1.0),
            ])
            .unwrap();
        assert!(!mesh.is_rectangle(f));
        let sloped: Vec<_> = mesh
            .face_edges(f)
            .iter()
            .copied()
            .filter(|&e| mesh.is_sloped_edge(e))
            .collect();
        assert_eq!(sloped.len(), 2);
    }

    #[test]
    fn dimensions_compare() {
        let mut mesh = Mesh::new();
        let a = wall(&mut mesh, 1.0, 2.0);
        let b = wall(&mut mesh, 1.0, 2.0);
        mesh.translate_faces(&[b], &Vector3::new(5.0, 0.0, 0.0));
        assert!(mesh.same_dimensions(&[a, b]));
        let c = wall(&mut mesh, 1.5, 2.0);
        assert!(!mesh.same_dimensions(&[a, c]));
        assert!(vectors_parallel(&Vector3::x(), &-Vector3::x()));
        assert!(!vectors_parallel(&Vector3::x(), &Vector3::y()));
    }
}
