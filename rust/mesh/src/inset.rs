// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Face inset: region and individual.
//!
//! Insetting shrinks a face region inward by `thickness` and optionally
//! pushes it along its normal by `depth`, joining the old boundary to the
//! new one with a ring of rim faces. The region faces keep their keys.

use nalgebra::Vector3;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::arena::Mesh;
use crate::error::{Error, Result};
use crate::keys::*;

impl Mesh {
    /// Insets a face region as a whole. Returns the rim faces.
    ///
    /// Boundary vertices move along the mitred inward bisector of their two
    /// boundary edges. With `even_offset` the miter is lengthened so the rim
    /// keeps a constant width at corners, and depth is scaled the same way
    /// across creases.
    pub fn inset_region(
        &mut self,
        faces: &[FaceKey],
        thickness: f64,
        depth: f64,
        even_offset: bool,
    ) -> Result<Vec<FaceKey>> {
        if faces.is_empty() {
            return Err(Error::EmptyInput("inset region"));
        }
        self.require_faces(faces)?;
        if thickness.abs() < 1e-12 && depth.abs() < 1e-12 {
            return Ok(Vec::new());
        }

        let region: FxHashSet<FaceKey> = faces.iter().copied().collect();
        let boundary = self.region_boundary(faces);
        let mut next: FxHashMap<VertexKey, VertexKey> = FxHashMap::default();
        let mut prev: FxHashMap<VertexKey, VertexKey> = FxHashMap::default();
        for &(a, b, _) in &boundary {
            if next.insert(a, b).is_some() || prev.insert(b, a).is_some() {
                return Err(Error::NonManifoldRegion(a));
            }
        }

        // Per-vertex region normal and depth offset
        let region_verts = self.faces_vertices(faces);
        let mut normals: FxHashMap<VertexKey, Vector3<f64>> = FxHashMap::default();
        let mut lift: FxHashMap<VertexKey, Vector3<f64>> = FxHashMap::default();
        for &v in &region_verts {
            let face_normals: Vec<Vector3<f64>> = self
                .vertex_faces(v)
                .into_iter()
                .filter(|f| region.contains(f))
                .filter_map(|f| self.face_normal(f))
                .collect();
            let sum = face_normals.iter().fold(Vector3::zeros(), |acc, n| acc + n);
            let vn = sum.try_normalize(1e-12).unwrap_or_else(Vector3::z);
            let shell = if even_offset {
                let min_cos = face_normals
                    .iter()
                    .map(|n| n.dot(&vn))
                    .fold(1.0_f64, f64::min)
                    .max(0.1);
                1.0 / min_cos
            } else {
                1.0
            };
            normals.insert(v, vn);
            lift.insert(v, vn * depth * shell);
        }

        let mut map: FxHashMap<VertexKey, VertexKey> = FxHashMap::default();
        for &(a, b, _) in &boundary {
            let p = *prev.get(&a).ok_or(Error::NonManifoldRegion(a))?;
            let n = normals[&a];
            let here = self.co(a);
            let e_in = (here - self.co(p)).try_normalize(1e-12).unwrap_or_else(Vector3::x);
            let e_out = (self.co(b) - here).try_normalize(1e-12).unwrap_or(e_in);
            let in1 = n.cross(&e_in);
            let in2 = n.cross(&e_out);
            let miter = (in1 + in2).try_normalize(1e-9).unwrap_or(in1);
            let scale = if even_offset {
                let c = miter.dot(&in1);
                if c > 1e-3 {
                    1.0 / c
                } else {
                    1.0
                }
            } else {
                1.0
            };
            let target = here + miter * thickness * scale + lift[&a];
            map.insert(a, self.add_vertex_at(&target));
        }

        for &v in &region_verts {
            if !map.contains_key(&v) {
                let offset = lift[&v];
                self.translate(&[v], &offset);
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

        let mut rims = Vec::with_capacity(boundary.len());
        for &(a, b, f) in &boundary {
            let rim = self.add_face(&[a, b, map[&b], map[&a]])?;
            self.copy_category(f, rim);
            rims.push(rim);
        }
        Ok(rims)
    }

    /// Insets each face on its own. Returns all rim faces.
    pub fn inset_individual(
        &mut self,
        faces: &[FaceKey],
        thickness: f64,
        depth: f64,
        even_offset: bool,
    ) -> Result<Vec<FaceKey>> {
        let mut rims = Vec::new();
        for &f in faces {
            rims.extend(self.inset_region(&[f], thickness, depth, even_offset)?);
        }
        Ok(rims)
    }

    /// Shrinks a face in place by `thickness`, discarding the rim.
    pub fn shrink_face(&mut self, face: FaceKey, thickness: f64) -> Result<()> {
        let rims = self.inset_region(&[face], thickness, 0.0, true)?;
        self.delete_faces(&rims);
        Ok(())
    }

    /// Insets a face by scaling a copy of its loop by `factor` toward
    /// [`Mesh::face_extent_center`], pushed `depth` along the normal.
    /// Returns the rim faces.
    ///
    /// The new loop of a convex face always stays inside it, so curved
    /// outlines with sharp ends get well formed rims where a mitred inset
    /// would fold over.
    pub fn inset_scaled(&mut self, face: FaceKey, factor: f64, depth: f64) -> Result<Vec<FaceKey>> {
        if !(factor > 0.0 && factor < 1.0) {
            return Err(Error::InvalidWidths(format!("scale factor {factor} outside (0, 1)")));
        }
        let center = self.face_extent_center(face).ok_or(Error::DegenerateFace("zero area"))?;
        let normal = self.face_normal(face).ok_or(Error::DegenerateFace("zero area"))?;
        let outer = self.face_vertices(face).to_vec();
        let mut inner = Vec::with_capacity(outer.len());
        for &v in &outer {
            let target = center + (self.co(v) - center) * factor + normal * depth;
            inner.push(self.add_vertex_at(&target));
        }
        self.set_face_loop(face, &inner)?;

        let n = outer.len();
        let mut rims = Vec::with_capacity(n);
        for i in 0..n {
            let j = (i + 1) % n;
            let rim = self.add_face(&[outer[i], outer[j], inner[j], inner[i]])?;
            self.copy_category(face, rim);
            rims.push(rim);
        }
        Ok(rims)
    }
}
