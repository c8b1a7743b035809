// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Balcony slabs pushed out of a wall face.

use archgen_mesh::{FaceCategory, FaceKey, Mesh};
use nalgebra::{Point3, Vector3};

use crate::error::{Error, Result};
use crate::params::{BalconyParams, RailParams};
use crate::railing::{create_railing, RailingParts};

/// A balcony slab built into the working mesh.
#[derive(Debug, Clone)]
pub struct BalconyGeometry {
    /// Walkable top face.
    pub floor: FaceKey,
    pub ceiling: FaceKey,
    /// Front and side faces of the slab.
    pub walls: Vec<FaceKey>,
    /// Middle of the slab's bottom edge against the wall.
    pub origin: Point3<f64>,
    pub railing: Option<(Mesh, RailingParts)>,
}

/// Builds a balcony on the upright `face`.
///
/// The slab is added as new geometry in front of the face; the wall itself
/// is not cut.
pub fn create_balcony(mesh: &mut Mesh, face: FaceKey, params: &BalconyParams) -> Result<BalconyGeometry> {
    let frame = mesh
        .local_frame(face)
        .ok_or(archgen_mesh::Error::FaceNotFound(face))?;
    let center = mesh
        .face_center_bounds(face)
        .ok_or(archgen_mesh::Error::FaceNotFound(face))?;
    let (width, height) = mesh.face_dimensions(face);
    let corner = center - frame.x * width / 2.0 - frame.y * height / 2.0;

    let [ox, oy] = params.offset.unwrap_or([(width - params.length) / 2.0, 0.0]);
    let base = mesh.create_face_in_frame(
        &corner,
        (params.length, params.slab_height),
        (ox, oy),
        &frame,
    )?;
    let origin = corner + frame.x * (ox + params.length / 2.0) + frame.y * oy;

    let slab = mesh.extrude_face(base, params.width)?;
    let mut walls = slab.far.clone();
    let mut floor = None;
    let mut ceiling = None;
    for &side in &slab.sides {
        match mesh.face_normal(side).map(|n| n.z) {
            Some(z) if z > 1.0 - archgen_mesh::EPSILON => floor = Some(side),
            Some(z) if z < -1.0 + archgen_mesh::EPSILON => ceiling = Some(side),
            _ => walls.push(side),
        }
    }
    let floor = floor.ok_or(Error::Geometry("balcony slab has no top"))?;
    let ceiling = ceiling.ok_or(Error::Geometry("balcony slab has no underside"))?;
    mesh.set_category(&walls, FaceCategory::Wall);
    mesh.set_category(&[floor], FaceCategory::Floor);
    mesh.set_category(&[ceiling], FaceCategory::Ceiling);

    let railing = match &params.railing {
        Some(rail) => Some(balcony_railing(mesh, floor, &frame.z, rail)?),
        None => None,
    };

    tracing::debug!(
        length = params.length,
        width = params.width,
        railing = railing.is_some(),
        "Balcony built"
    );
    Ok(BalconyGeometry {
        floor,
        ceiling,
        walls,
        origin,
        railing,
    })
}

/// Railing around the three open sides of the balcony floor.
fn balcony_railing(
    mesh: &Mesh,
    floor: FaceKey,
    normal: &Vector3<f64>,
    params: &RailParams,
) -> Result<(Mesh, RailingParts)> {
    let mut rail = mesh.extract_faces(&[floor])?;
    let top = rail
        .face_keys()
        .next()
        .ok_or(Error::Geometry("balcony floor did not copy"))?;
    rail.clear_category(&[top]);
    rail.shrink_face(top, params.offset)?;

    // The edge nearest the wall gets no railing
    let edges = rail.sort_edges(rail.face_edges(top), normal);
    let open = edges.get(1..).unwrap_or_default();
    let faces = rail
        .extrude_edges(open, &(Vector3::z() * params.corner_post_height))?
        .faces;
    rail.delete_faces(&[top]);

    let parts = create_railing(&mut rail, &faces, params)?;
    Ok((rail, parts))
}
