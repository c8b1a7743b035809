// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Door and window openings.
//!
//! An opening build runs in four stages per repeat across the host face:
//!
//! 1. Resolve the placement against the host and its facing wall
//!    ([`crate::context`]).
//! 2. Cut and line the hole ([`hole`]).
//! 3. Build the frame and set the leaves into it ([`frame`]).
//! 4. Split frame and leaves into objects, give the leaves thickness and
//!    infill, and attach hardware.

pub mod arch;
pub mod components;
mod frame;
mod hole;

use archgen_mesh::{FaceKey, LocalFrame, Mesh, EPSILON};

use crate::config::BuildConfig;
use crate::context::OpeningContext;
use crate::error::{Error, Result};
use crate::fill::{fill_arch, fill_bars, fill_face};
use crate::hardware::{door_knobs, window_handle, Mount};
use crate::objects::{split_off, ObjectArena, ObjectKind};
use crate::params::OpeningParams;

pub use components::{parse_components, ComponentGroup, ComponentKind};
pub use frame::{FrameGeometry, Leaf};
pub use hole::{Hole, HoleShape};

/// Door leaves keep at least this much above a bottom panel.
const MIN_UPPER_PANEL: f64 = 0.2;

/// Frame bar width that still fits `components` leaves in `size`.
fn effective_margin(margin: f64, size: [f64; 2], components: usize) -> f64 {
    margin
        .max(0.0)
        .min(size[0] / (2.0 * (components + 1) as f64))
        .min(size[1] / 4.0)
}

/// Repeats that fit across `width`, each at least four bars wide.
fn array_count(requested: usize, width: f64, margin: f64) -> usize {
    if margin <= EPSILON {
        return requested.max(1);
    }
    let most = ((width / (2.0 * margin)).floor() as usize).saturating_sub(1).max(1);
    requested.clamp(1, most)
}

/// Builds the opening described by `params` in the upright `face`.
///
/// Returns the generated frame, leaf, bar and hardware objects. The reveal
/// stays in `mesh`.
pub fn create_opening(
    mesh: &mut Mesh,
    face: FaceKey,
    params: &OpeningParams,
    config: &BuildConfig,
) -> Result<ObjectArena> {
    let groups = parse_components(&params.components)?;
    let components: usize = groups.iter().map(|g| g.count).sum();
    let default_size = if components > 1 { [2.0, 1.2] } else { [1.0, 1.2] };
    let frame = mesh
        .local_frame(face)
        .ok_or(archgen_mesh::Error::FaceNotFound(face))?;

    let (width, _) = mesh.face_dimensions(face);
    let count = array_count(params.count, width, params.frame.margin);
    if count != params.count {
        tracing::warn!(requested = params.count, count, "Opening count clamped to host width");
    }
    let spans = mesh.subdivide_face_horizontally(face, &vec![width / count as f64; count])?;

    let mut objects = ObjectArena::new();
    for span in spans {
        let ctx = OpeningContext::new(mesh, span, &params.size_offset, default_size, config);
        let margin = effective_margin(params.frame.margin, ctx.size, components);
        let shape = HoleShape {
            size: ctx.size,
            margin,
            ratio: params.effective_ratio(),
            arch: params.arch.as_ref(),
        };
        let hole = cut_hole_for(mesh, &ctx, &shape, &groups, params)?;
        if params.only_hole {
            mesh.delete_faces(&hole.faces());
            continue;
        }
        let geometry = frame::build_frame(mesh, &hole, &groups, params, margin, &frame)?;
        objects.extend(assemble(mesh, geometry, params, &frame)?);
    }

    tracing::debug!(
        components = %params.components,
        repeats = count,
        objects = objects.len(),
        "Opening built"
    );
    Ok(objects)
}

fn cut_hole_for(
    mesh: &mut Mesh,
    ctx: &OpeningContext,
    shape: &HoleShape,
    groups: &[ComponentGroup],
    params: &OpeningParams,
) -> Result<Hole> {
    tracing::trace!(
        size_x = ctx.size[0],
        size_y = ctx.size[1],
        offset_x = ctx.offset[0],
        offset_y = ctx.offset[1],
        "Cutting opening"
    );
    hole::cut_hole(mesh, ctx, shape, groups, params.frame.depth)
}

/// Moves frame and leaves out of `mesh` into an object tree.
fn assemble(
    mesh: &mut Mesh,
    geometry: FrameGeometry,
    params: &OpeningParams,
    frame: &LocalFrame,
) -> Result<ObjectArena> {
    let mut objects = ObjectArena::new();

    // Leaves and bar faces go first so the frame split takes only bars
    let mut parts = Vec::with_capacity(geometry.leaves.len());
    for leaf in &geometry.leaves {
        let bars = match (leaf.kind, params.window.bars.as_ref()) {
            (ObjectKind::Window, Some(_)) => {
                let copy = mesh.duplicate_faces(&[leaf.face])?;
                Some(split_off(mesh, &copy.faces, ObjectKind::Bars, leaf.origin)?)
            }
            _ => None,
        };
        let object = split_off(mesh, &[leaf.face], leaf.kind, leaf.origin)?;
        parts.push((leaf, object, bars));
    }
    let frame_id = objects.add(split_off(mesh, &geometry.faces, ObjectKind::Frame, geometry.origin)?);

    for (leaf, mut object, bars) in parts {
        shape_leaf(&mut object.mesh, leaf, params)?;
        let id = objects.add_child(frame_id, object);
        let mount = Mount {
            frame,
            origin: leaf.origin,
            width: leaf.width,
            thickness: leaf.thickness,
            hinge: leaf.hinge,
            flip: leaf.flip,
        };
        match leaf.kind {
            ObjectKind::Door => {
                for knob in door_knobs(&mount, params.door.knob) {
                    objects.add_child(id, knob);
                }
            }
            ObjectKind::Window => {
                if let Some(handle) = window_handle(&mount, params.window.handle) {
                    objects.add_child(id, handle);
                }
            }
            _ => {}
        }

        if let (Some(mut bars), Some(fill)) = (bars, params.window.bars.as_ref()) {
            let face = first_face(&bars.mesh)?;
            fill_bars(&mut bars.mesh, face, fill)?;
            objects.add_child(frame_id, bars);
        }
    }
    Ok(objects)
}

fn first_face(mesh: &Mesh) -> Result<FaceKey> {
    mesh.face_keys()
        .next()
        .ok_or(Error::Geometry("split object has no faces"))
}

/// Gives a split off leaf its thickness and infill.
fn shape_leaf(mesh: &mut Mesh, leaf: &Leaf, params: &OpeningParams) -> Result<()> {
    let front = first_face(mesh)?;
    let normal = mesh
        .face_normal(front)
        .ok_or(archgen_mesh::Error::FaceNotFound(front))?;
    let solid = mesh.extrude_region(&[front], leaf.thickness, &-normal, true)?;
    mesh.reverse_faces(&solid.far)?;
    let back = *solid
        .far
        .first()
        .ok_or(Error::Geometry("leaf extrusion has no back"))?;

    match leaf.kind {
        ObjectKind::Door => {
            let (_, height) = mesh.face_dimensions(front);
            let panel = params.door.bottom_panel_height.min(height - MIN_UPPER_PANEL);
            if params.door.bottom_panel && panel > EPSILON {
                let widths = [panel, height - panel];
                let fronts = mesh.subdivide_face_vertically(front, &widths)?;
                let backs = mesh.subdivide_face_vertically(back, &widths)?;
                for ((&f, &b), fill) in fronts
                    .iter()
                    .zip(&backs)
                    .zip([&params.door.bottom_fill, &params.door.fill])
                {
                    fill_face(mesh, f, b, fill)?;
                }
            } else {
                fill_face(mesh, front, back, &params.door.fill)?;
            }
        }
        ObjectKind::Window => {
            fill_face(mesh, front, back, &params.window.fill)?;
        }
        ObjectKind::Arch => {
            if let Some(glass) = params.arch.as_ref().and_then(|a| a.fill.as_ref()) {
                fill_arch(mesh, front, back, glass)?;
            }
        }
        _ => {}
    }
    Ok(())
}
