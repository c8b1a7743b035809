// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Frames around door, window and arch leaves.
//!
//! Each recessed group face is cut into frame bars and leaf faces. The bars
//! are given the frame thickness, the leaves are pulled loose and set back
//! inside the frame, and a thin stop is raised around every leaf.

use archgen_mesh::{EdgeKey, FaceCategory, FaceKey, LocalFrame, Mesh, EPSILON, MIN_INTERVAL};
use nalgebra::{Point3, Vector3};

use super::components::{ComponentGroup, ComponentKind};
use super::hole::Hole;
use crate::error::{Error, Result};
use crate::fill::gap_factor;
use crate::objects::ObjectKind;
use crate::params::{Hinge, OpeningParams};

/// Arch leaves are shrunk by this much so they clear the frame.
const ARCH_CLEARANCE: f64 = 0.002;

/// A loose leaf face sitting inside the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub kind: ObjectKind,
    /// Front face of the leaf, not yet given thickness.
    pub face: FaceKey,
    /// Hinge side bottom corner, on the leaf's back plane.
    pub origin: Point3<f64>,
    pub width: f64,
    pub thickness: f64,
    pub hinge: Hinge,
    pub flip: bool,
}

/// A finished frame and the leaves it holds.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameGeometry {
    pub faces: Vec<FaceKey>,
    /// Middle of the frame's bottom edge.
    pub origin: Point3<f64>,
    pub leaves: Vec<Leaf>,
}

/// Widths across a group face, flagged `true` for leaf columns.
///
/// Doors own a bar on both sides. Windows skip the bar towards a
/// neighbouring group, which draws it.
fn column_layout(group: ComponentGroup, width: f64, margin: f64, first: bool, last: bool) -> Vec<(f64, bool)> {
    let count = group.count.max(1);
    let mut layout = Vec::with_capacity(2 * count + 1);
    match group.kind {
        ComponentKind::Door => {
            layout.push((margin, false));
            for _ in 0..count {
                layout.push((0.0, true));
                layout.push((margin, false));
            }
        }
        ComponentKind::Window => {
            if first {
                layout.push((margin, false));
            }
            for i in 0..count {
                layout.push((0.0, true));
                if i + 1 < count || last {
                    layout.push((margin, false));
                }
            }
        }
    }
    let bars = layout.iter().filter(|l| !l.1).count() as f64;
    let leaf = (width - bars * margin) / count as f64;
    for l in layout.iter_mut().filter(|l| l.1) {
        l.0 = leaf;
    }
    layout
}

/// Heights up a leaf column, flagged `true` for the leaf.
fn row_layout(kind: ComponentKind, height: f64, margin: f64) -> Vec<(f64, bool)> {
    match kind {
        ComponentKind::Door => vec![(height - margin, true), (margin, false)],
        ComponentKind::Window => vec![(margin, false), (height - 2.0 * margin, true), (margin, false)],
    }
}

fn widths(layout: &[(f64, bool)]) -> Vec<f64> {
    layout.iter().map(|l| l.0).collect()
}

/// Bottom corner of `face` on the hinge side.
fn hinge_corner(mesh: &Mesh, face: FaceKey, frame: &LocalFrame, hinge: Hinge) -> Option<Point3<f64>> {
    let points = mesh.points(mesh.face_vertices(face));
    let lowest = points
        .iter()
        .map(|p| p.coords.dot(&frame.y))
        .fold(f64::INFINITY, f64::min);
    let side = match hinge {
        Hinge::Left => frame.x,
        Hinge::Right => -frame.x,
    };
    points
        .into_iter()
        .filter(|p| p.coords.dot(&frame.y) - lowest < EPSILON)
        .min_by(|a, b| a.coords.dot(&side).total_cmp(&b.coords.dot(&side)))
}

/// Builds the frame in the recessed faces of `hole`.
pub fn build_frame(
    mesh: &mut Mesh,
    hole: &Hole,
    groups: &[ComponentGroup],
    params: &OpeningParams,
    margin: f64,
    frame: &LocalFrame,
) -> Result<FrameGeometry> {
    let normal = frame.z;
    let thickness = params.frame.thickness.max(0.0);
    let boundary = mesh.boundary_edges(&hole.faces());
    let origin = mesh
        .bottom_edges(&boundary, 1)
        .first()
        .and_then(|&e| mesh.edge_center(e))
        .ok_or(Error::Geometry("frame has no bottom edge"))?;

    let mut bars = Vec::new();
    let mut cut = Vec::new();
    let n = groups.len();
    for (i, (&group, &face)) in groups.iter().zip(&hole.groups).enumerate() {
        let (w, h) = mesh.face_dimensions(face);
        let columns = column_layout(group, w, margin, i == 0, i + 1 == n);
        let rows = row_layout(group.kind, h, margin);
        let pieces = mesh.subdivide_face_horizontally(face, &widths(&columns))?;
        for (&column, &(_, is_leaf)) in pieces.iter().zip(&columns) {
            if !is_leaf {
                bars.push(column);
                continue;
            }
            let parts = mesh.subdivide_face_vertically(column, &widths(&rows))?;
            for (&part, &(_, is_leaf)) in parts.iter().zip(&rows) {
                if is_leaf {
                    cut.push((group.kind, part));
                } else {
                    bars.push(part);
                }
            }
        }
    }

    let mut leaves = Vec::with_capacity(cut.len() + 1);
    let mut openings: Vec<(Vec<EdgeKey>, f64, bool)> = Vec::with_capacity(cut.len() + 1);
    for (kind, face) in cut {
        let (object, style) = match kind {
            ComponentKind::Door => (ObjectKind::Door, (params.door.thickness, params.door.hinge, params.door.flip)),
            ComponentKind::Window => (
                ObjectKind::Window,
                (params.window.thickness, params.window.hinge, params.window.flip),
            ),
        };
        let (t, hinge, flip) = style;
        let leaf = loosen_leaf(mesh, face, object, t, thickness, hinge, flip, frame)?;
        openings.push((leaf.1, leaf.0.thickness, flip));
        leaves.push(leaf.0);
    }
    if let (Some(arch_face), Some(arch)) = (hole.arch, params.arch.as_ref()) {
        let (w, h) = mesh.face_dimensions(arch_face);
        if let Some(factor) = gap_factor(w.min(h), margin) {
            bars.extend(mesh.inset_scaled(arch_face, factor, 0.0)?);
        }
        let (mut leaf, inner) =
            loosen_leaf(mesh, arch_face, ObjectKind::Arch, arch.thickness, thickness, Hinge::Left, false, frame)?;
        clear_arch_leaf(mesh, &mut leaf, frame);
        openings.push((inner, leaf.thickness, false));
        leaves.push(leaf);
    }

    if thickness > EPSILON && !bars.is_empty() {
        let verts = mesh.faces_vertices(&bars);
        mesh.translate(&verts, &(-normal * thickness));
        let ext = mesh.extrude_region(&bars, thickness, &normal, true)?;
        mesh.reverse_faces(&ext.originals)?;
        bars.extend(ext.sides);
        bars.extend(ext.far);
    }

    let border = params.frame.border;
    for (inner, leaf_thickness, flip) in &openings {
        bars.extend(add_stop(mesh, inner, &normal, thickness, *leaf_thickness, border, *flip)?);
    }
    bars.sort_unstable();
    bars.dedup();
    bars.retain(|&f| mesh.contains_face(f));
    mesh.set_category(&bars, FaceCategory::Frame);

    tracing::debug!(bars = bars.len(), leaves = leaves.len(), "Frame built");
    Ok(FrameGeometry {
        faces: bars,
        origin,
        leaves,
    })
}

/// Pulls an arch leaf in by [`ARCH_CLEARANCE`] without leaving a rim.
fn clear_arch_leaf(mesh: &mut Mesh, leaf: &mut Leaf, frame: &LocalFrame) {
    let (w, h) = mesh.face_dimensions(leaf.face);
    let (Some(factor), Some(center)) = (gap_factor(w.min(h), ARCH_CLEARANCE), mesh.face_extent_center(leaf.face))
    else {
        return;
    };
    let verts = mesh.face_vertices(leaf.face).to_vec();
    mesh.scale(&verts, &center, &Vector3::repeat(factor));
    let to_center = center - leaf.origin;
    let along = to_center - frame.z * to_center.dot(&frame.z);
    leaf.origin += along * (1.0 - factor);
    leaf.width *= factor;
}

/// Pulls a leaf face out of the frame and sets it back to its depth.
///
/// Returns the leaf and the frame edges that ringed it.
#[allow(clippy::too_many_arguments)]
fn loosen_leaf(
    mesh: &mut Mesh,
    face: FaceKey,
    kind: ObjectKind,
    thickness: f64,
    frame_thickness: f64,
    hinge: Hinge,
    flip: bool,
    frame: &LocalFrame,
) -> Result<(Leaf, Vec<EdgeKey>)> {
    let normal = frame.z;
    let thickness = thickness.clamp(EPSILON, frame_thickness.max(EPSILON));
    let (width, _) = mesh.face_dimensions(face);
    let inner = mesh.separate_faces(&[face])?;
    let verts = mesh.face_vertices(face).to_vec();
    let leaf_normal = if flip {
        mesh.reverse_faces(&[face])?;
        mesh.translate(&verts, &(-normal * thickness));
        -normal
    } else {
        mesh.translate(&verts, &(-normal * (frame_thickness - thickness).max(0.0)));
        normal
    };
    let category = match kind {
        ObjectKind::Door => FaceCategory::Door,
        ObjectKind::Window => FaceCategory::Window,
        _ => FaceCategory::Arch,
    };
    mesh.set_category(&[face], category);

    let corner = hinge_corner(mesh, face, frame, hinge).ok_or(Error::Geometry("leaf has no corner"))?;
    let leaf = Leaf {
        kind,
        face,
        origin: corner - leaf_normal * thickness,
        width,
        thickness,
        hinge,
        flip,
    };
    Ok((leaf, inner))
}

/// Raises a stop of depth `border` around a leaf, in front of it or behind
/// it when the leaf is flipped.
fn add_stop(
    mesh: &mut Mesh,
    inner: &[EdgeKey],
    normal: &Vector3<f64>,
    frame_thickness: f64,
    leaf_thickness: f64,
    border: f64,
    flip: bool,
) -> Result<Vec<FaceKey>> {
    if border <= EPSILON || frame_thickness - leaf_thickness <= MIN_INTERVAL || leaf_thickness <= MIN_INTERVAL {
        return Ok(Vec::new());
    }
    let direction = if flip { -normal } else { *normal };
    let sides: Vec<FaceKey> = mesh
        .edges_faces(inner, &[])
        .into_iter()
        .filter(|&f| mesh.face_normal(f).is_some_and(|n| n.dot(normal).abs() < EPSILON))
        .collect();
    if sides.is_empty() {
        return Ok(Vec::new());
    }

    let along = mesh.edges_along(&mesh.faces_edges(&sides), normal);
    let cuts = mesh.subdivide(&along, &direction, &[frame_thickness - leaf_thickness, leaf_thickness])?;
    let Some(level) = cuts
        .first()
        .and_then(|&e| mesh.edge_center(e))
        .map(|c| c.coords.dot(&direction))
    else {
        return Ok(Vec::new());
    };
    let mut added = mesh.edges_faces(&cuts, &[]);
    let strips: Vec<FaceKey> = added
        .iter()
        .copied()
        .filter(|&f| mesh.face_center(f).is_some_and(|c| c.coords.dot(&direction) > level))
        .collect();
    if !strips.is_empty() {
        added.extend(mesh.inset_region(&strips, 0.0, border, true)?);
    }
    Ok(added)
}
