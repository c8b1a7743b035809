// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Primitive shapes: frame-aligned quads, planes and n-gon cylinders.

use std::f64::consts::PI;

use nalgebra::{Point3, Vector3};

use crate::arena::Mesh;
use crate::error::{Error, Result};
use crate::keys::*;
use crate::query::LocalFrame;

/// Side length of a regular n-gon with circumradius `radius`.
pub fn radius_to_side_length(radius: f64, segments: usize) -> f64 {
    let n = segments.max(3) as f64;
    let theta = (n - 2.0) * PI / n;
    2.0 * radius * (theta / 2.0).cos()
}

/// Result of [`Mesh::add_cylinder`].
#[derive(Debug, Clone, Default)]
pub struct Cylinder {
    /// Side faces, then the caps when requested.
    pub faces: Vec<FaceKey>,
    /// Ring around the start point, counter-clockwise about the axis.
    pub start_ring: Vec<VertexKey>,
    /// Ring around the end point, index-aligned with `start_ring`.
    pub end_ring: Vec<VertexKey>,
}

impl Cylinder {
    pub fn vertices(&self) -> Vec<VertexKey> {
        self.start_ring.iter().chain(self.end_ring.iter()).copied().collect()
    }
}

impl Mesh {
    /// Quad of `size` at `offset` in the plane spanned by a frame's `x`/`y`,
    /// measured from `origin`.
    pub fn create_face_in_frame(
        &mut self,
        origin: &Point3<f64>,
        size: (f64, f64),
        offset: (f64, f64),
        frame: &LocalFrame,
    ) -> Result<FaceKey> {
        let base = origin + frame.x * offset.0 + frame.y * offset.1;
        let (dx, dy) = (frame.x * size.0, frame.y * size.1);
        self.add_face_from_points(&[base, base + dx, base + dx + dy, base + dy])
    }

    /// Axis-aligned rectangle in the xy plane, facing `+z`.
    pub fn add_plane(&mut self, center: &Point3<f64>, width: f64, length: f64) -> Result<FaceKey> {
        let (hw, hl) = (width / 2.0, length / 2.0);
        self.add_face_from_points(&[
            center + Vector3::new(-hw, -hl, 0.0),
            center + Vector3::new(hw, -hl, 0.0),
            center + Vector3::new(hw, hl, 0.0),
            center + Vector3::new(-hw, hl, 0.0),
        ])
    }

    /// Regular n-gon prism from `start` to `end`.
    ///
    /// `up` fixes the ring orientation: the first ring vertex lies half a
    /// segment past `up`, so a flat side faces it. Side faces point away
    /// from the axis.
    pub fn add_cylinder(
        &mut self,
        start: &Point3<f64>,
        end: &Point3<f64>,
        radius: f64,
        up: &Vector3<f64>,
        segments: usize,
        capped: bool,
    ) -> Result<Cylinder> {
        let axis = (end - start)
            .try_normalize(1e-9)
            .ok_or(Error::DegenerateEdge)?;
        if radius <= 0.0 || segments < 3 {
            return Err(Error::DegenerateFace("cylinder needs a radius and three segments"));
        }
        let u = (up - axis * up.dot(&axis))
            .try_normalize(1e-9)
            .or_else(|| axis.cross(&Vector3::x()).try_normalize(1e-9))
            .or_else(|| axis.cross(&Vector3::y()).try_normalize(1e-9))
            .ok_or(Error::DegenerateEdge)?;
        let w = axis.cross(&u);

        let step = 2.0 * PI / segments as f64;
        let ring = |mesh: &mut Mesh, c: &Point3<f64>| -> Vec<VertexKey> {
            (0..segments)
                .map(|i| {
                    let a = step * (i as f64 + 0.5);
                    mesh.add_vertex_at(&(c + (u * a.cos() + w * a.sin()) * radius))
                })
                .collect()
        };
        let start_ring = ring(self, start);
        let end_ring = ring(self, end);

        let mut faces = Vec::with_capacity(segments + 2);
        for i in 0..segments {
            let j = (i + 1) % segments;
            faces.push(self.add_face(&[start_ring[i], start_ring[j], end_ring[j], end_ring[i]])?);
        }
        if capped {
            faces.push(self.add_face(&end_ring)?);
            let mut rev = start_ring.clone();
            rev.reverse();
            faces.push(self.add_face(&rev)?);
        }
        Ok(Cylinder { faces, start_ring, end_ring })
    }

    /// Sweeps an existing edge into a cylinder, leaving the edge in place.
    pub fn edge_to_cylinder(
        &mut self,
        edge: EdgeKey,
        radius: f64,
        up: &Vector3<f64>,
        segments: usize,
        capped: bool,
    ) -> Result<Cylinder> {
        let (a, b) = self.edge_vertices(edge).ok_or(Error::EdgeNotFound(edge))?;
        let (pa, pb) = (self.co(a), self.co(b));
        self.add_cylinder(&pa, &pb, radius, up, segments, capped)
    }
}
