// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON serialization for meshes.
//!
//! Slot-map keys are replaced by sequential integer ids so snapshots are
//! portable between processes. Loose edges and face categories survive a
//! round trip; keys do not.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::arena::Mesh;
use crate::error::{Error, Result};
use crate::keys::*;

/// Serializable representation of a mesh.
#[derive(Debug, Serialize, Deserialize)]
pub struct MeshSnapshot {
    pub vertices: Vec<[f64; 3]>,
    /// Edges not used by any face, as vertex id pairs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loose_edges: Vec<[usize; 2]>,
    pub faces: Vec<FaceSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FaceSnapshot {
    pub verts: Vec<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<i32>,
}

impl Mesh {
    /// Serializes the mesh to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_snapshot())
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Rebuilds a mesh from [`Mesh::to_json`] output.
    pub fn from_json(json: &str) -> Result<Mesh> {
        let snapshot: MeshSnapshot =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        Mesh::from_snapshot(&snapshot)
    }

    pub fn to_snapshot(&self) -> MeshSnapshot {
        let mut ids: FxHashMap<VertexKey, usize> = FxHashMap::default();
        let vertices = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, (k, v))| {
                ids.insert(k, i);
                [v.x, v.y, v.z]
            })
            .collect();
        let loose_edges = self
            .loose_edges()
            .into_iter()
            .filter_map(|e| {
                let (a, b) = self.edge_vertices(e)?;
                Some([*ids.get(&a)?, *ids.get(&b)?])
            })
            .collect();
        let faces = self
            .faces
            .iter()
            .map(|(k, f)| FaceSnapshot {
                verts: f.verts.iter().filter_map(|v| ids.get(v).copied()).collect(),
                category: self.categories.get(&k).copied(),
            })
            .collect();
        MeshSnapshot { vertices, loose_edges, faces }
    }

    pub fn from_snapshot(snapshot: &MeshSnapshot) -> Result<Mesh> {
        let mut mesh = Mesh::new();
        let keys: Vec<VertexKey> = snapshot
            .vertices
            .iter()
            .map(|&[x, y, z]| mesh.add_vertex(x, y, z))
            .collect();
        let lookup = |id: usize| {
            keys.get(id)
                .copied()
                .ok_or_else(|| Error::Serialization(format!("vertex id {id} out of range")))
        };
        for &[a, b] in &snapshot.loose_edges {
            mesh.add_edge(lookup(a)?, lookup(b)?)?;
        }
        for face in &snapshot.faces {
            let verts = face
                .verts
                .iter()
                .map(|&id| lookup(id))
                .collect::<Result<Vec<_>>>()?;
            let key = mesh.add_face(&verts)?;
            if let Some(c) = face.category {
                mesh.categories.insert(key, c);
            }
        }
        Ok(mesh)
    }
}
