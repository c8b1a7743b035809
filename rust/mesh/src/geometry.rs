// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometric queries on mesh elements.
//!
//! Normals use Newell's method so slightly non-planar loops (the result of
//! extruding along Z and then translating part of a face) still get a
//! stable orientation.

use nalgebra::{Point3, Vector3};

use crate::arena::{Mesh, VertexData};
use crate::error::{Error, Result};
use crate::keys::*;

/// Mean of a point set; `None` when empty.
pub fn mean_point(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

/// Axis-aligned bounds of a point set.
pub fn bounds(points: &[Point3<f64>]) -> Option<(Point3<f64>, Point3<f64>)> {
    let first = points.first()?;
    let mut lo = *first;
    let mut hi = *first;
    for p in &points[1..] {
        lo = lo.inf(p);
        hi = hi.sup(p);
    }
    Some((lo, hi))
}

impl Mesh {
    /// Returns the position of a vertex.
    pub fn vertex_point(&self, key: VertexKey) -> Option<Point3<f64>> {
        self.vertices.get(key).map(VertexData::point)
    }

    /// Position of a vertex, failing on a stale key.
    pub fn point(&self, key: VertexKey) -> Result<Point3<f64>> {
        self.vertex_point(key).ok_or(Error::VertexNotFound(key))
    }

    /// Normal of a face, failing on a stale key or a degenerate loop.
    pub fn normal(&self, key: FaceKey) -> Result<Vector3<f64>> {
        self.face_normal(key).ok_or(Error::FaceNotFound(key))
    }

    /// Position lookup for keys known to be live.
    pub(crate) fn co(&self, key: VertexKey) -> Point3<f64> {
        self.vertex_point(key).unwrap_or_else(Point3::origin)
    }

    /// Moves a vertex to `p`.
    pub fn set_vertex_point(&mut self, key: VertexKey, p: &Point3<f64>) -> Result<()> {
        let v = self.vertices.get_mut(key).ok_or(Error::VertexNotFound(key))?;
        v.x = p.x;
        v.y = p.y;
        v.z = p.z;
        Ok(())
    }

    /// Positions of a vertex list.
    pub fn points(&self, verts: &[VertexKey]) -> Vec<Point3<f64>> {
        verts.iter().map(|&v| self.co(v)).collect()
    }

    pub fn edge_length(&self, key: EdgeKey) -> Option<f64> {
        self.edge_vector(key).map(|d| d.norm())
    }

    /// Returns `end - start` of an edge.
    pub fn edge_vector(&self, key: EdgeKey) -> Option<Vector3<f64>> {
        let e = self.edges.get(key)?;
        Some(self.vertex_point(e.end)? - self.vertex_point(e.start)?)
    }

    /// Unit direction from start to end.
    pub fn edge_direction(&self, key: EdgeKey) -> Option<Vector3<f64>> {
        self.edge_vector(key)?.try_normalize(1e-15)
    }

    pub fn edge_center(&self, key: EdgeKey) -> Option<Point3<f64>> {
        let e = self.edges.get(key)?;
        let a = self.vertex_point(e.start)?;
        let b = self.vertex_point(e.end)?;
        Some(Point3::from((a.coords + b.coords) * 0.5))
    }

    /// Computes the unit normal of a face using Newell's method.
    pub fn face_normal(&self, key: FaceKey) -> Option<Vector3<f64>> {
        let face = self.faces.get(key)?;
        self.loop_normal(&face.verts)
    }

    /// Newell normal of a vertex loop; `None` for zero-area loops.
    pub(crate) fn loop_normal(&self, verts: &[VertexKey]) -> Option<Vector3<f64>> {
        let raw = self.loop_newell(verts)?;
        let len = raw.norm();
        if len < 1e-12 {
            return None;
        }
        Some(raw / len)
    }

    fn loop_newell(&self, verts: &[VertexKey]) -> Option<Vector3<f64>> {
        if verts.len() < 3 {
            return None;
        }
        let mut normal = Vector3::zeros();
        let n = verts.len();
        for i in 0..n {
            let cur = self.vertex_point(verts[i])?;
            let next = self.vertex_point(verts[(i + 1) % n])?;
            normal.x += (cur.y - next.y) * (cur.z + next.z);
            normal.y += (cur.z - next.z) * (cur.x + next.x);
            normal.z += (cur.x - next.x) * (cur.y + next.y);
        }
        Some(normal)
    }

    /// Area of a face (half the Newell vector length).
    pub fn face_area(&self, key: FaceKey) -> Option<f64> {
        let face = self.faces.get(key)?;
        self.loop_newell(&face.verts).map(|n| n.norm() * 0.5)
    }

    /// Mean of the face's vertex positions.
    pub fn face_center(&self, key: FaceKey) -> Option<Point3<f64>> {
        let face = self.faces.get(key)?;
        mean_point(&self.points(&face.verts))
    }

    /// Center of the face's bounding box.
    pub fn face_center_bounds(&self, key: FaceKey) -> Option<Point3<f64>> {
        let face = self.faces.get(key)?;
        let (lo, hi) = bounds(&self.points(&face.verts))?;
        Some(Point3::from((lo.coords + hi.coords) * 0.5))
    }

    /// Middle of the face's extent along its own local frame axes.
    ///
    /// Lies inside any convex face, which the world bounding-box center
    /// does not guarantee for sloped faces.
    pub fn face_extent_center(&self, key: FaceKey) -> Option<Point3<f64>> {
        let frame = self.local_frame(key)?;
        let points = self.points(self.face_vertices(key));
        let first = *points.first()?;
        let span = |axis: &Vector3<f64>| {
            points.iter().map(|p| (p - first).dot(axis)).fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), t| (lo.min(t), hi.max(t)),
            )
        };
        let (x0, x1) = span(&frame.x);
        let (y0, y1) = span(&frame.y);
        Some(first + frame.x * ((x0 + x1) * 0.5) + frame.y * ((y0 + y1) * 0.5))
    }

    /// Mean of the bounding-box centers of a face set.
    pub fn faces_center(&self, faces: &[FaceKey]) -> Option<Point3<f64>> {
        let centers: Vec<Point3<f64>> =
            faces.iter().filter_map(|&f| self.face_center_bounds(f)).collect();
        mean_point(&centers)
    }

    /// Corner angle at each loop vertex, between its two loop neighbours.
    pub fn face_corner_angles(&self, key: FaceKey) -> Vec<f64> {
        let verts = self.face_vertices(key);
        let n = verts.len();
        (0..n)
            .map(|i| {
                let c = self.co(verts[i]);
                let prev = self.co(verts[(i + n - 1) % n]) - c;
                let next = self.co(verts[(i + 1) % n]) - c;
                prev.angle(&next)
            })
            .collect()
    }

    /// Angle between the normals of the two faces sharing an edge.
    pub fn edge_face_angle(&self, key: EdgeKey) -> Option<f64> {
        match self.edge_faces(key) {
            [a, b] => Some(self.face_normal(*a)?.angle(&self.face_normal(*b)?)),
            _ => None,
        }
    }

    /// Average normal of the faces around a vertex.
    pub fn vertex_normal(&self, key: VertexKey) -> Option<Vector3<f64>> {
        let sum = self
            .vertex_faces(key)
            .iter()
            .filter_map(|&f| self.face_normal(f))
            .fold(Vector3::zeros(), |acc, n| acc + n);
        sum.try_normalize(1e-12)
    }

    /// Triangulates a face for rendering.
    ///
    /// Projects the loop onto the dominant axis plane of its normal and runs
    /// ear clipping. Returns vertex-key triples in loop winding.
    pub fn triangulate_face(&self, key: FaceKey) -> Option<Vec<[VertexKey; 3]>> {
        let face = self.faces.get(key)?;
        if face.verts.len() < 3 {
            return None;
        }
        if face.verts.len() == 3 {
            return Some(vec![[face.verts[0], face.verts[1], face.verts[2]]]);
        }

        let normal = self.face_normal(key)?;
        let abs_n = Vector3::new(normal.x.abs(), normal.y.abs(), normal.z.abs());
        let (ax_u, ax_v) = if abs_n.z >= abs_n.x && abs_n.z >= abs_n.y {
            (0, 1) // project onto XY
        } else if abs_n.y >= abs_n.x {
            (0, 2) // project onto XZ
        } else {
            (1, 2) // project onto YZ
        };

        let mut coords_2d: Vec<f64> = Vec::with_capacity(face.verts.len() * 2);
        for &vk in &face.verts {
            let p = self.vertex_point(vk)?;
            let c = [p.x, p.y, p.z];
            coords_2d.push(c[ax_u]);
            coords_2d.push(c[ax_v]);
        }

        let indices = earcutr::earcut(&coords_2d, &[], 2).ok()?;
        let mut triangles = Vec::with_capacity(indices.len() / 3);
        for chunk in indices.chunks(3) {
            if let [a, b, c] = *chunk {
                let tri = [face.verts[a], face.verts[b], face.verts[c]];
                // Ear clipping may flip winding relative to the face normal
                let p: Vec<Point3<f64>> = tri.iter().map(|&v| self.co(v)).collect();
                let n = (p[1] - p[0]).cross(&(p[2] - p[0]));
                if n.dot(&normal) < 0.0 {
                    triangles.push([tri[0], tri[2], tri[1]]);
                } else {
                    triangles.push(tri);
                }
            }
        }
        Some(triangles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quad(mesh: &mut Mesh, pts: [(f64, f64, f64); 4]) -> FaceKey {
        let v: Vec<VertexKey> = pts.iter().map(|&(x, y, z)| mesh.add_vertex(x, y, z)).collect();
        mesh.add_face(&v).unwrap()
    }

    #[test]
    fn face_normal_xz_plane() {
        let mut mesh = Mesh::new();
        let f = quad(
            &mut mesh,
            [(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (1.0, 0.0, 1.0), (0.0, 0.0, 1.0)],
        );
        let n = mesh.face_normal(f).unwrap();
        assert_relative_eq!(n.y, -1.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.face_area(f).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn centers_of_trapezoid() {
        let mut mesh = Mesh::new();
        let f = quad(
            &mut mesh,
            [(0.0, 0.0, 0.0), (4.0, 0.0, 0.0), (3.0, 1.0, 0.0), (0.0, 1.0, 0.0)],
        );
        let median = mesh.face_center(f).unwrap();
        let bounds = mesh.face_center_bounds(f).unwrap();
        assert_relative_eq!(median.x, 1.75, epsilon = 1e-12);
        assert_relative_eq!(bounds.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(bounds.y, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn right_angles_of_rectangle() {
        let mut mesh = Mesh::new();
        let f = quad(
            &mut mesh,
            [(0.0, 0.0, 0.0), (2.0, 0.0, 0.0), (2.0, 1.0, 0.0), (0.0, 1.0, 0.0)],
        );
        for a in mesh.face_corner_angles(f) {
            assert_relative_eq!(a, std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
        }
    }

    #[test]
    fn triangulate_concave_face() {
        let mut mesh = Mesh::new();
        let v: Vec<VertexKey> = [(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (1.0, 1.0), (0.0, 2.0)]
            .iter()
            .map(|&(x, y)| mesh.add_vertex(x, y, 0.0))
            .collect();
        let f = mesh.add_face(&v).unwrap();
        let tris = mesh.triangulate_face(f).unwrap();
        assert_eq!(tris.len(), 3);
        let total: f64 = tris
            .iter()
            .map(|t| {
                let p: Vec<Point3<f64>> = t.iter().map(|&k| mesh.co(k)).collect();
                (p[1] - p[0]).cross(&(p[2] - p[0])).z * 0.5
            })
            .sum();
        assert_relative_eq!(total, mesh.face_area(f).unwrap(), epsilon = 1e-9);
    }
}
