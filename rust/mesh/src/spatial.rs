// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial index for tolerance-based vertex lookup and welding.
//!
//! A grid hash with cubic cells gives O(1) average-case nearest-vertex
//! queries. Welding near-duplicate vertices after skeleton lifting and
//! cylinder sweeps goes through here.

use nalgebra::Point3;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::arena::Mesh;
use crate::error::Result;
use crate::keys::VertexKey;

/// A spatial hash grid over a subset of mesh vertices.
///
/// Lookups check the 3x3x3 block of cells around the query point, so the
/// query tolerance should not exceed `cell_size`.
#[derive(Debug)]
pub struct SpatialIndex {
    cell_size: f64,
    grid: FxHashMap<(i64, i64, i64), Vec<VertexKey>>,
}

impl SpatialIndex {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: cell_size.max(1e-10),
            grid: FxHashMap::default(),
        }
    }

    /// Indexes the given vertices of a mesh.
    pub fn from_vertices(mesh: &Mesh, verts: &[VertexKey], cell_size: f64) -> Self {
        let mut index = Self::new(cell_size);
        for &v in verts {
            if let Some(p) = mesh.vertex_point(v) {
                index.insert(v, &p);
            }
        }
        index
    }

    pub fn insert(&mut self, key: VertexKey, p: &Point3<f64>) {
        let cell = self.cell_coords(p);
        self.grid.entry(cell).or_default().push(key);
    }

    /// All indexed vertices within `tolerance` of `p`, nearest first.
    pub fn find_all_near(&self, mesh: &Mesh, p: &Point3<f64>, tolerance: f64) -> Vec<VertexKey> {
        let (cx, cy, cz) = self.cell_coords(p);
        let mut hits: Vec<(f64, VertexKey)> = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(keys) = self.grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &vk in keys {
                        if let Some(q) = mesh.vertex_point(vk) {
                            let d = (q - p).norm();
                            if d <= tolerance {
                                hits.push((d, vk));
                            }
                        }
                    }
                }
            }
        }
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.into_iter().map(|(_, k)| k).collect()
    }

    /// Nearest indexed vertex within `tolerance` of `p`.
    pub fn find_near(&self, mesh: &Mesh, p: &Point3<f64>, tolerance: f64) -> Option<VertexKey> {
        self.find_all_near(mesh, p, tolerance).into_iter().next()
    }

    fn cell_coords(&self, p: &Point3<f64>) -> (i64, i64, i64) {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
            (p.z / self.cell_size).floor() as i64,
        )
    }
}

impl Mesh {
    /// Returns an indexed vertex within `tolerance` of `p`, or creates and
    /// indexes a new one.
    pub fn find_or_add_vertex(
        &mut self,
        index: &mut SpatialIndex,
        p: &Point3<f64>,
        tolerance: f64,
    ) -> VertexKey {
        if let Some(existing) = index.find_near(self, p, tolerance) {
            return existing;
        }
        let key = self.add_vertex_at(p);
        index.insert(key, p);
        key
    }

    /// Welds vertices of `verts` lying within `dist` of each other.
    ///
    /// Each cluster collapses onto its first member in `verts` order. Faces
    /// collapsing below three vertices are removed. Returns the number of
    /// vertices merged away.
    pub fn remove_doubles(&mut self, verts: &[VertexKey], dist: f64) -> Result<usize> {
        let index = SpatialIndex::from_vertices(self, verts, dist);
        let mut merge: Vec<(VertexKey, VertexKey)> = Vec::new();
        let mut absorbed: FxHashSet<VertexKey> = FxHashSet::default();
        for &v in verts {
            if absorbed.contains(&v) {
                continue;
            }
            let Some(p) = self.vertex_point(v) else {
                continue;
            };
            for other in index.find_all_near(self, &p, dist) {
                if other != v && !absorbed.contains(&other) {
                    absorbed.insert(other);
                    merge.push((v, other));
                }
            }
            absorbed.insert(v);
        }

        let mut merged = 0;
        for (keep, remove) in merge {
            if self.contains_vertex(keep) && self.contains_vertex(remove) {
                self.merge_vertices(keep, remove)?;
                merged += 1;
            }
        }
        Ok(merged)
    }

    /// Vertices of `verts` whose xy lies within `tolerance` of `(x, y)`.
    pub fn vertices_at_xy(&self, verts: &[VertexKey], x: f64, y: f64, tolerance: f64) -> Vec<VertexKey> {
        verts
            .iter()
            .copied()
            .filter(|&v| {
                self.vertex_point(v)
                    .is_some_and(|p| (p.x - x).hypot(p.y - y) <= tolerance)
            })
            .collect()
    }
}
