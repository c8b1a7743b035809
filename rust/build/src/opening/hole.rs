// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cutting the hole for an opening into its host face.
//!
//! The opening rectangle is carved out of the host, optionally topped by an
//! arch, and cut into one face per component group. The rim of the hole is
//! lined with a reveal recessed to the frame depth; when the facing wall is
//! close enough the reveal is carried through and the facing wall opened
//! as well. The group faces are then moved back to the reveal's depth where
//! the frame is built from them.

use archgen_mesh::{FaceCategory, FaceKey, Mesh, EPSILON};
use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashSet;

use super::arch::{arch_band, cut_arch};
use super::components::{clubbed_widths, leaf_widths, ComponentGroup, ComponentKind};
use crate::context::OpeningContext;
use crate::error::{Error, Result};
use crate::params::ArchParams;

/// Size and layout of the hole in one host face.
#[derive(Debug, Clone, Copy)]
pub struct HoleShape<'a> {
    pub size: [f64; 2],
    /// Width of every frame bar.
    pub margin: f64,
    /// Window to door width ratio.
    pub ratio: f64,
    pub arch: Option<&'a ArchParams>,
}

/// The recessed faces of a cut hole.
#[derive(Debug, Clone, PartialEq)]
pub struct Hole {
    /// One face per component group, left to right.
    pub groups: Vec<FaceKey>,
    pub arch: Option<FaceKey>,
    pub reveal: Vec<FaceKey>,
    /// How far the group faces sit behind the host plane.
    pub depth: f64,
}

impl Hole {
    /// Group faces followed by the arch face.
    pub fn faces(&self) -> Vec<FaceKey> {
        self.groups.iter().copied().chain(self.arch).collect()
    }
}

/// Faces of one host split into its opening layout.
struct Split {
    groups: Vec<FaceKey>,
    arch: Option<FaceKey>,
}

impl Split {
    fn faces(&self) -> Vec<FaceKey> {
        self.groups.iter().copied().chain(self.arch).collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    X,
    Y,
}

/// Cuts `face` into `before`, `length` and `after` along `axis` and returns
/// the middle piece. Slivers under [`EPSILON`] are folded into it.
fn cut_out(mesh: &mut Mesh, face: FaceKey, axis: Axis, before: f64, length: f64, after: f64) -> Result<FaceKey> {
    let lead = before > EPSILON;
    let trail = after > EPSILON;
    let mut middle = length;
    if !lead {
        middle += before.max(0.0);
    }
    if !trail {
        middle += after.max(0.0);
    }

    let mut widths = Vec::with_capacity(3);
    if lead {
        widths.push(before);
    }
    widths.push(middle);
    if trail {
        widths.push(after);
    }
    let pieces = match axis {
        Axis::X => mesh.subdivide_face_horizontally(face, &widths)?,
        Axis::Y => mesh.subdivide_face_vertically(face, &widths)?,
    };
    pieces
        .get(usize::from(lead))
        .copied()
        .ok_or(Error::Geometry("opening cut lost its face"))
}

/// Lays the opening out on `face` with its bottom left corner at `offset`.
fn split_opening(
    mesh: &mut Mesh,
    face: FaceKey,
    shape: &HoleShape,
    offset: [f64; 2],
    groups: &[ComponentGroup],
) -> Result<Split> {
    let (width, height) = mesh.face_dimensions(face);
    let [sx, sy] = shape.size;
    let [ox, oy] = offset;

    let column = cut_out(mesh, face, Axis::X, ox, sx, width - ox - sx)?;
    // Doors run down to the bottom of the host, so keep everything below
    let mut span = cut_out(mesh, column, Axis::Y, 0.0, oy + sy, height - oy - sy)?;

    let mut arch = None;
    if let Some(params) = shape.arch {
        if let Some((band, rise)) = arch_band(params, sy, shape.margin) {
            let rows = mesh.subdivide_face_vertically(span, &[oy + sy - band, band])?;
            let (Some(&lower), Some(&top)) = (rows.first(), rows.last()) else {
                return Err(Error::Geometry("arch band split failed"));
            };
            let frame = mesh
                .local_frame(top)
                .ok_or(archgen_mesh::Error::FaceNotFound(top))?;
            arch = Some(cut_arch(mesh, top, &frame, params, rise)?);
            span = lower;
        }
    }

    let widths = leaf_widths(groups, sx, shape.margin, shape.ratio);
    let spans = clubbed_widths(groups, &widths, shape.margin);
    let pieces = mesh.subdivide_face_horizontally(span, &spans)?;
    let mut faces = Vec::with_capacity(groups.len());
    for (group, piece) in groups.iter().zip(pieces) {
        let face = match group.kind {
            ComponentKind::Door => piece,
            ComponentKind::Window => {
                let (_, h) = mesh.face_dimensions(piece);
                cut_out(mesh, piece, Axis::Y, oy, h - oy, 0.0)?
            }
        };
        faces.push(face);
    }
    Ok(Split { groups: faces, arch })
}

/// Flips `face` if it does not point at `target`.
fn face_towards(mesh: &mut Mesh, face: FaceKey, target: &Point3<f64>) -> Result<()> {
    let (Some(n), Some(c)) = (mesh.face_normal(face), mesh.face_center_bounds(face)) else {
        return Ok(());
    };
    if n.dot(&(target - c)) < 0.0 {
        mesh.reverse_faces(&[face])?;
    }
    Ok(())
}

/// Flips `face` to agree with `reference`.
fn face_along(mesh: &mut Mesh, face: FaceKey, reference: &Vector3<f64>) -> Result<()> {
    if mesh.face_normal(face).is_some_and(|n| n.dot(reference) < 0.0) {
        mesh.reverse_faces(&[face])?;
    }
    Ok(())
}

/// Cuts the hole described by `shape` into the host face of `ctx`.
pub fn cut_hole(
    mesh: &mut Mesh,
    ctx: &OpeningContext,
    shape: &HoleShape,
    groups: &[ComponentGroup],
    frame_depth: f64,
) -> Result<Hole> {
    let normal = mesh
        .face_normal(ctx.face)
        .ok_or(archgen_mesh::Error::FaceNotFound(ctx.face))?;
    let front = split_opening(mesh, ctx.face, shape, ctx.offset, groups)?;
    let faces = front.faces();

    let depth = frame_depth.min(ctx.wall_thickness() / 2.0);
    if depth <= EPSILON {
        tracing::debug!(frame_depth, "Opening left flush with its host");
        return Ok(Hole {
            groups: front.groups,
            arch: front.arch,
            reveal: Vec::new(),
            depth: 0.0,
        });
    }

    // Door bottoms are the lowest edges and get no reveal
    let boundary = mesh.boundary_edges(&faces);
    let doors = groups.iter().filter(|g| g.kind == ComponentKind::Door).count();
    let edges = mesh.top_edges(&boundary, boundary.len().saturating_sub(doors));
    let lining = mesh.extrude_edges(&edges, &(-normal * depth))?;
    let members: FxHashSet<FaceKey> = faces.iter().copied().collect();
    for (&edge, &quad) in edges.iter().zip(&lining.faces) {
        let inner = mesh
            .edge_faces(edge)
            .iter()
            .copied()
            .find(|f| members.contains(f));
        if let Some(center) = inner.and_then(|f| mesh.face_center_bounds(f)) {
            face_towards(mesh, quad, &center)?;
        }
    }
    let mut reveal = lining.faces.clone();

    let through = ctx
        .opposite
        .filter(|o| o.linkable() && o.thickness.is_finite() && mesh.is_valid_ngon(o.face));
    if let (Some(opposite), Some(offset)) = (through, ctx.opposite_offset()) {
        let mirrored: Vec<ComponentGroup> = groups.iter().rev().copied().collect();
        let back = split_opening(mesh, opposite.face, shape, offset, &mirrored)?;
        let back_faces = back.faces();
        let back_edges = mesh.boundary_edges(&back_faces);
        for (&far, &quad) in lining.edges.iter().zip(&lining.faces) {
            let Some(&target) = mesh.closest_edges(far, &back_edges, 1).first() else {
                continue;
            };
            let bridge = mesh.bridge_edges(far, target)?;
            if let Some(n) = mesh.face_normal(quad) {
                face_along(mesh, bridge, &n)?;
            }
            reveal.push(bridge);
        }
        mesh.delete_faces(&back_faces);
        tracing::debug!(face = ?opposite.face, "Opening carried through the facing wall");
    }
    mesh.set_category(&reveal, FaceCategory::Wall);

    let copy = mesh.duplicate_faces(&faces)?;
    let verts: Vec<_> = copy.vertex_map.values().copied().collect();
    mesh.translate(&verts, &(-normal * depth));
    mesh.delete_faces(&faces);

    let mut recessed = copy.faces;
    let arch = if front.arch.is_some() { recessed.pop() } else { None };
    tracing::debug!(groups = recessed.len(), reveal = reveal.len(), depth, "Hole cut");
    Ok(Hole {
        groups: recessed,
        arch,
        reveal,
        depth,
    })
}
