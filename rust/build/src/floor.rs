// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stacked floors over a flat footprint.
//!
//! Each floor is a slab (the footprint extruded by the slab thickness, its
//! rim pushed out by the outset) followed by walls extruded up to the floor
//! height. Rooms get inner wall faces one wall thickness inside the outer
//! shell; shared edges between footprint faces become partition walls.

use archgen_mesh::{FaceCategory, FaceKey, Mesh};
use nalgebra::Vector3;
use rustc_hash::FxHashSet;

use crate::error::Result;
use crate::params::FloorParams;

/// Faces produced by [`build_floors`], already tagged.
#[derive(Debug, Clone, Default)]
pub struct FloorResult {
    pub slabs: Vec<FaceKey>,
    /// Outer shell walls.
    pub walls: Vec<FaceKey>,
    /// Room-facing wall faces.
    pub inner_walls: Vec<FaceKey>,
    pub floors: Vec<FaceKey>,
    pub ceilings: Vec<FaceKey>,
    /// Ceiling faces of the top floor, where a roof goes.
    pub top: Vec<FaceKey>,
}

/// Builds `params.floor_count` floors over the flat `faces`.
pub fn build_floors(mesh: &mut Mesh, faces: &[FaceKey], params: &FloorParams) -> Result<FloorResult> {
    let up = Vector3::z();
    face_towards(mesh, faces, 1.0)?;

    let mut out = FloorResult::default();
    let mut current = faces.to_vec();
    for level in 0..params.floor_count {
        let floor = if params.add_slab && params.slab_thickness > 0.0 {
            let ext = mesh.extrude_region(&current, params.slab_thickness, &up, true)?;
            out.ceilings.extend(&ext.originals);
            dissolve_coplanar_sides(mesh, &ext.sides)?;

            let mut slabs = mesh.edges_faces(&mesh.boundary_edges(&ext.far), &ext.far);
            if params.slab_outset > 0.0 {
                let rims = mesh.inset_region(&slabs, 0.0, params.slab_outset, true)?;
                slabs.extend(rims);
            }
            out.slabs.extend(slabs);
            ext.far
        } else {
            current.clone()
        };
        out.floors.extend(&floor);

        if !params.add_walls {
            current = floor;
            continue;
        }

        let ext = mesh.extrude_region(&floor, params.floor_height, &up, true)?;
        out.walls.extend(&ext.sides);
        out.ceilings.extend(&ext.far);
        if params.wall_thickness > 0.0 {
            out.inner_walls
                .extend(inner_walls(mesh, &floor, params.wall_thickness, params.floor_height)?);
        }
        current = ext.far;
        tracing::debug!(level, walls = out.walls.len(), "Floor built");
    }

    // Floors face up, ceilings down
    let floors: FxHashSet<FaceKey> = out.floors.iter().copied().collect();
    let mut seen = FxHashSet::default();
    out.ceilings.retain(|f| !floors.contains(f) && seen.insert(*f));
    face_towards(mesh, &out.floors, 1.0)?;
    face_towards(mesh, &out.ceilings, -1.0)?;

    mesh.set_category(&out.slabs, FaceCategory::Slab);
    mesh.set_category(&out.walls, FaceCategory::Wall);
    mesh.set_category(&out.inner_walls, FaceCategory::Wall);
    mesh.set_category(&out.floors, FaceCategory::Floor);
    mesh.set_category(&out.ceilings, FaceCategory::Ceiling);

    out.top = current;
    Ok(out)
}

/// Reverses the faces whose normal points against `sign * z`.
fn face_towards(mesh: &mut Mesh, faces: &[FaceKey], sign: f64) -> Result<()> {
    let wrong: Vec<FaceKey> = faces
        .iter()
        .copied()
        .filter(|&f| mesh.face_normal(f).is_some_and(|n| n.z * sign < 0.0))
        .collect();
    mesh.reverse_faces(&wrong)?;
    Ok(())
}

/// Merges side faces split only by a vertical edge within one plane.
fn dissolve_coplanar_sides(mesh: &mut Mesh, sides: &[FaceKey]) -> Result<()> {
    let set: FxHashSet<FaceKey> = sides.iter().copied().collect();
    let edges: Vec<_> = mesh
        .vertical_edges(&mesh.faces_edges(sides))
        .into_iter()
        .filter(|&e| {
            let faces = mesh.edge_faces(e);
            faces.len() == 2
                && faces.iter().all(|f| set.contains(f))
                && match (mesh.face_normal(faces[0]), mesh.face_normal(faces[1])) {
                    (Some(a), Some(b)) => a.dot(&b) > 1.0 - archgen_mesh::EPSILON,
                    _ => false,
                }
        })
        .collect();
    if !edges.is_empty() {
        mesh.dissolve_edges(&edges, true)?;
    }
    Ok(())
}

/// Room-facing walls of `floor`, offset inside the shell by `thickness`.
///
/// The footprint copy shrinks by half the thickness as a region (keeping
/// shared edges) and again per face, so neighbouring rooms end up one wall
/// thickness apart.
fn inner_walls(mesh: &mut Mesh, floor: &[FaceKey], thickness: f64, height: f64) -> Result<Vec<FaceKey>> {
    let dup = mesh.duplicate_faces(floor)?.faces;
    let rims = mesh.inset_region(&dup, thickness / 2.0, 0.0, true)?;
    mesh.delete_faces(&rims);
    let rims = mesh.inset_individual(&dup, thickness / 2.0, 0.0, true)?;
    mesh.delete_faces(&rims);

    let ext = mesh.extrude_region(&dup, height, &Vector3::z(), false)?;
    mesh.delete_faces(&ext.far);
    // Sides face away from the room they line
    mesh.reverse_faces(&ext.sides)?;
    Ok(ext.sides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn plan(mesh: &mut Mesh) -> FaceKey {
        mesh.add_plane(&Point3::origin(), 4.0, 4.0).unwrap()
    }

    fn max_z(mesh: &Mesh, faces: &[FaceKey]) -> f64 {
        mesh.faces_vertices(faces)
            .into_iter()
            .filter_map(|v| mesh.vertex_point(v))
            .map(|p| p.z)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    #[test]
    fn single_floor_shell() {
        let mut mesh = Mesh::new();
        let f = plan(&mut mesh);
        let out = build_floors(&mut mesh, &[f], &FloorParams::default()).unwrap();

        assert_eq!(out.walls.len(), 4);
        assert_eq!(out.inner_walls.len(), 4);
        // Four sides plus the two rim rings of the outset
        assert_eq!(out.slabs.len(), 12);
        assert_eq!(out.floors.len(), 1);
        assert_eq!(out.top.len(), 1);
        assert_eq!(out.ceilings.len(), 2);

        let floor = out.floors[0];
        assert!(mesh.face_normal(floor).unwrap().z > 0.99);
        assert_relative_eq!(mesh.face_center(floor).unwrap().z, 0.2, epsilon = 1e-9);
        for &c in &out.ceilings {
            assert!(mesh.face_normal(c).unwrap().z < -0.99);
        }
        assert_relative_eq!(max_z(&mesh, &out.top), 3.0, epsilon = 1e-9);
        assert_eq!(mesh.category(out.walls[0]), Some(FaceCategory::Wall));
        assert_eq!(mesh.category(out.slabs[0]), Some(FaceCategory::Slab));
    }

    #[test]
    fn inner_walls_face_the_room() {
        let mut mesh = Mesh::new();
        let f = plan(&mut mesh);
        let out = build_floors(&mut mesh, &[f], &FloorParams::default()).unwrap();
        for &w in &out.inner_walls {
            let n = mesh.face_normal(w).unwrap();
            let c = mesh.face_center(w).unwrap();
            // The room is centred on the origin
            assert!(n.dot(&Vector3::new(c.x, c.y, 0.0)) < 0.0);
            assert_relative_eq!(c.x.abs().max(c.y.abs()), 2.0 - 0.12, epsilon = 1e-6);
        }
    }

    #[test]
    fn floors_stack() {
        let mut mesh = Mesh::new();
        let f = plan(&mut mesh);
        let params = FloorParams {
            floor_count: 2,
            ..FloorParams::default()
        };
        let out = build_floors(&mut mesh, &[f], &params).unwrap();
        assert_eq!(out.walls.len(), 8);
        assert_eq!(out.floors.len(), 2);
        assert_relative_eq!(max_z(&mesh, &out.top), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn terrace_has_no_walls() {
        let mut mesh = Mesh::new();
        let f = plan(&mut mesh);
        let params = FloorParams {
            add_walls: false,
            ..FloorParams::default()
        };
        let out = build_floors(&mut mesh, &[f], &params).unwrap();
        assert!(out.walls.is_empty());
        assert!(out.inner_walls.is_empty());
        assert_eq!(out.slabs.len(), 12);
        assert_eq!(out.top, out.floors);
    }

    #[test]
    fn downward_footprint_is_flipped() {
        let mut mesh = Mesh::new();
        let f = plan(&mut mesh);
        mesh.reverse_face(f).unwrap();
        let out = build_floors(&mut mesh, &[f], &FloorParams::default()).unwrap();
        assert_relative_eq!(max_z(&mesh, &out.top), 3.0, epsilon = 1e-9);
    }
}
