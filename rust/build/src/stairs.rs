// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stairs stepping down out of an upright face.
//!
//! The top riser is placed in the host face's frame so the lowest step
//! lands on the bottom of the face. The landing (or first step) is that
//! riser pushed out; every further step extrudes the current underside down
//! by one rise and pushes its front out by one run. Stairs live in their
//! own mesh; the host face is left untouched.

use archgen_mesh::{FaceCategory, FaceKey, LocalFrame, Mesh, VertexKey};
use nalgebra::{Point3, Vector3};

use crate::error::{Error, Result};
use crate::params::{RailParams, StairsBottom, StairsParams};
use crate::railing::{create_railing, RailingParts};

/// Stair geometry built for one host face.
#[derive(Debug, Clone)]
pub struct StairsGeometry {
    pub mesh: Mesh,
    /// Ground point below the middle of the top riser.
    pub origin: Point3<f64>,
    /// Step tops, from the wall outwards.
    pub treads: Vec<FaceKey>,
    /// Step fronts, index-aligned with `treads`.
    pub risers: Vec<FaceKey>,
    /// Railing mesh with its parts, when a side was requested.
    pub railing: Option<(Mesh, RailingParts)>,
}

/// Builds stairs in front of the upright `face` of `host`.
pub fn create_stairs(host: &Mesh, face: FaceKey, params: &StairsParams) -> Result<StairsGeometry> {
    let frame = host
        .local_frame(face)
        .ok_or(archgen_mesh::Error::FaceNotFound(face))?;
    let center = host
        .face_center_bounds(face)
        .ok_or(archgen_mesh::Error::FaceNotFound(face))?;
    let normal = frame.z;
    let (width, height) = host.face_dimensions(face);
    let corner = center - frame.x * width / 2.0 - frame.y * height / 2.0;

    let [ox, oy, oz] = params.offset.unwrap_or([(width - params.width) / 2.0, 0.0, 0.0]);
    let raised = if params.landing {
        params.step_count
    } else {
        params.step_count.saturating_sub(1)
    };
    let base = corner + normal * oz;
    let mut mesh = Mesh::new();
    let riser = mesh.create_face_in_frame(
        &base,
        (params.width, params.step_height),
        (ox, oy + params.step_height * raised as f64),
        &frame,
    )?;
    let origin = base + frame.x * (ox + params.width / 2.0) + frame.y * oy;

    let mut runs = Vec::with_capacity(params.step_count + 1);
    if params.landing {
        runs.push(params.landing_width);
    }
    runs.extend(std::iter::repeat(params.step_width).take(params.step_count));

    let mut treads = Vec::with_capacity(runs.len());
    let mut risers = Vec::with_capacity(runs.len());
    let mut front = riser;
    for (i, &run) in runs.iter().enumerate() {
        let (top, next) = if i == 0 {
            let ext = mesh.extrude_face(front, run)?;
            let top = facing(&mesh, &ext.sides, &Vector3::z())
                .ok_or(Error::Geometry("first step has no top"))?;
            (top, ext.far[0])
        } else {
            next_step(&mut mesh, front, &normal, run, params)?
        };
        treads.push(top);
        risers.push(next);
        front = next;
    }

    let all: Vec<FaceKey> = mesh.face_keys().collect();
    mesh.set_category(&all, FaceCategory::Wall);
    mesh.set_category(&treads, FaceCategory::Stairs);
    mesh.set_category(&risers, FaceCategory::Stairs);

    let railing = match params.railing {
        Some(rail) if params.has_railing() => Some(stairs_railing(&mesh, &treads, &frame, params, &rail)?),
        _ => None,
    };

    tracing::debug!(steps = treads.len(), railing = railing.is_some(), "Stairs built");
    Ok(StairsGeometry {
        mesh,
        origin,
        treads,
        risers,
        railing,
    })
}

/// First face of `faces` pointing along `direction`.
fn facing(mesh: &Mesh, faces: &[FaceKey], direction: &Vector3<f64>) -> Option<FaceKey> {
    faces
        .iter()
        .copied()
        .find(|&f| mesh.face_normal(f).is_some_and(|n| n.dot(direction) > 1.0 - archgen_mesh::EPSILON))
}

/// Adds one step below and in front of `front`. Returns its tread and riser.
fn next_step(
    mesh: &mut Mesh,
    front: FaceKey,
    normal: &Vector3<f64>,
    run: f64,
    params: &StairsParams,
) -> Result<(FaceKey, FaceKey)> {
    let rise = params.step_height;
    let around = mesh.edges_faces(mesh.face_edges(front), &[front]);
    let mut bottom = facing(mesh, &around, &-Vector3::z())
        .ok_or(Error::Geometry("step has no underside"))?;

    // Blocked and sloped undersides only drop a strip one rise deep
    let mut back_edge: Vec<VertexKey> = Vec::new();
    let mut cut_edge: Vec<VertexKey> = Vec::new();
    if params.bottom != StairsBottom::Filled {
        let along = mesh.edges_along(mesh.face_edges(bottom), normal);
        let depth = along.first().and_then(|&e| mesh.edge_length(e)).unwrap_or(0.0);
        if depth - rise > archgen_mesh::MIN_INTERVAL {
            if let Some(&e) = mesh.sort_edges(mesh.face_edges(bottom), normal).first() {
                back_edge = mesh.edges_vertices(&[e]);
            }
            let strips = mesh.subdivide_faces(&[bottom], normal, &[depth - rise, rise])?;
            bottom = *strips.last().ok_or(Error::Geometry("underside did not split"))?;
            if let Some(&e) = mesh.sort_edges(mesh.face_edges(bottom), normal).first() {
                cut_edge = mesh.edges_vertices(&[e]);
            }
        }
    }

    let (top, riser) = extrude_step(mesh, bottom, normal, rise, run)?;

    if params.bottom == StairsBottom::Slope && !cut_edge.is_empty() {
        cut_edge.retain(|&v| mesh.contains_vertex(v));
        mesh.translate(&cut_edge, &(-normal * run));
        let mut weld = back_edge;
        weld.retain(|&v| mesh.contains_vertex(v));
        weld.extend(&cut_edge);
        mesh.remove_doubles(&weld, 0.001)?;
    }
    Ok((top, riser))
}

/// Drops `bottom` by one rise and pushes the new front out by one run.
fn extrude_step(
    mesh: &mut Mesh,
    bottom: FaceKey,
    normal: &Vector3<f64>,
    rise: f64,
    run: f64,
) -> Result<(FaceKey, FaceKey)> {
    let block = mesh.extrude_face(bottom, rise)?;
    let block_front = facing(mesh, &block.sides, normal)
        .ok_or(Error::Geometry("step block has no front"))?;
    let step = mesh.extrude_face(block_front, run)?;
    let riser = step.far[0];
    let top = facing(mesh, &step.sides, &Vector3::z())
        .ok_or(Error::Geometry("step has no top"))?;

    let flat: Vec<_> = mesh
        .faces_edges(&step.sides)
        .into_iter()
        .filter(|&e| mesh.edge_face_angle(e).is_some_and(|a| a.abs() < 0.001))
        .collect();
    mesh.dissolve_edges(&flat, true)?;
    Ok((top, riser))
}

/// Railing reference faces along the stairs, turned into a railing.
fn stairs_railing(
    stairs: &Mesh,
    treads: &[FaceKey],
    frame: &LocalFrame,
    params: &StairsParams,
    rail: &RailParams,
) -> Result<(Mesh, RailingParts)> {
    let normal = frame.z;
    let steps = stairs.sort_faces(treads, &normal);
    let (Some(&first), Some(&last)) = (steps.first(), steps.last()) else {
        return Ok((Mesh::new(), RailingParts::default()));
    };
    let back = |face: FaceKey| -> Vec<Point3<f64>> {
        let verts = stairs.sort_vertices(stairs.face_vertices(face), &normal);
        stairs.points(&verts[..2.min(verts.len())])
    };
    let front = |face: FaceKey| -> Vec<Point3<f64>> {
        let verts = stairs.sort_vertices(stairs.face_vertices(face), &normal);
        stairs.points(&verts[verts.len().saturating_sub(2)..])
    };

    let mut mesh = Mesh::new();
    let inset = |points: Vec<Point3<f64>>, depth: f64, mesh: &mut Mesh| -> Option<(VertexKey, VertexKey)> {
        railing_pair(mesh, &points, frame, rail.offset, depth)
    };
    let mut pairs = Vec::new();
    if params.landing {
        pairs.extend(inset(back(first), rail.corner_post_width / 2.0, &mut mesh));
        pairs.extend(inset(front(first), -params.step_width / 2.0, &mut mesh));
    } else {
        pairs.extend(inset(back(first), params.step_width / 2.0, &mut mesh));
    }
    pairs.extend(inset(back(last), params.step_width / 2.0, &mut mesh));

    let mut edges = Vec::new();
    for w in pairs.windows(2) {
        edges.push(mesh.add_edge(w[0].0, w[1].0)?);
        edges.push(mesh.add_edge(w[0].1, w[1].1)?);
    }
    let faces = mesh
        .extrude_edges(&edges, &(Vector3::z() * rail.corner_post_height))?
        .faces;

    let sorted = mesh.sort_faces(&faces, &frame.x);
    let half = sorted.len() / 2;
    let keep = match (params.railing_left, params.railing_right) {
        (true, false) => {
            mesh.delete_faces(&sorted[half..]);
            sorted[..half].to_vec()
        }
        (false, true) => {
            mesh.delete_faces(&sorted[..half]);
            sorted[half..].to_vec()
        }
        _ => sorted,
    };
    let parts = create_railing(&mut mesh, &keep, rail)?;
    Ok((mesh, parts))
}

/// Two railing anchors: the outer vertices of a tread edge moved `depth`
/// along the stairs and `offset` in from the sides.
fn railing_pair(
    mesh: &mut Mesh,
    points: &[Point3<f64>],
    frame: &LocalFrame,
    offset: f64,
    depth: f64,
) -> Option<(VertexKey, VertexKey)> {
    let tangent = frame.x;
    let (a, b) = match points {
        [a, b] if (b - a).dot(&tangent) >= 0.0 => (*a, *b),
        [a, b] => (*b, *a),
        _ => return None,
    };
    let shift = frame.z * depth;
    let va = mesh.add_vertex_at(&(a + shift + tangent * offset));
    let vb = mesh.add_vertex_at(&(b + shift - tangent * offset));
    Some((va, vb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// 4 x 2.8 wall in the xz plane facing -y.
    fn wall() -> (Mesh, FaceKey) {
        let mut mesh = Mesh::new();
        let f = mesh
            .add_face_from_points(&[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(4.0, 0.0, 0.0),
                Point3::new(4.0, 0.0, 2.8),
                Point3::new(0.0, 0.0, 2.8),
            ])
            .unwrap();
        (mesh, f)
    }

    fn straight() -> StairsParams {
        StairsParams {
            landing: false,
            ..StairsParams::default()
        }
    }

    fn z_of(mesh: &Mesh, face: FaceKey) -> f64 {
        mesh.face_center(face).unwrap().z
    }

    #[test]
    fn straight_flight_lands_on_the_ground() {
        let (host, f) = wall();
        let stairs = create_stairs(&host, f, &straight()).unwrap();
        assert_eq!(stairs.treads.len(), 3);
        assert_eq!(stairs.risers.len(), 3);
        assert!(stairs.railing.is_none());

        let tops: Vec<f64> = stairs.treads.iter().map(|&t| z_of(&stairs.mesh, t)).collect();
        for (z, expected) in tops.iter().zip([0.36, 0.24, 0.12]) {
            assert_relative_eq!(*z, expected, epsilon = 1e-9);
        }
        // Riser bottoms at 0.24, 0.12 and the ground
        for (&r, expected) in stairs.risers.iter().zip([0.24, 0.12, 0.0]) {
            assert_relative_eq!(z_of(&stairs.mesh, r) - 0.06, expected, epsilon = 1e-9);
            assert!(stairs.mesh.face_normal(r).unwrap().y < -0.999);
        }
        assert_relative_eq!(stairs.origin.x, 2.0, epsilon = 1e-9);
        assert_eq!(host.face_count(), 1);
    }

    #[test]
    fn treads_step_outwards() {
        let (host, f) = wall();
        let stairs = create_stairs(&host, f, &straight()).unwrap();
        let fronts: Vec<f64> = stairs
            .risers
            .iter()
            .map(|&r| stairs.mesh.face_center(r).unwrap().y)
            .collect();
        for (y, expected) in fronts.iter().zip([-0.2, -0.4, -0.6]) {
            assert_relative_eq!(*y, expected, epsilon = 1e-9);
        }
        assert_eq!(
            stairs.mesh.faces_in_category(FaceCategory::Stairs).len(),
            6
        );
    }

    #[test]
    fn landing_adds_a_tread() {
        let (host, f) = wall();
        let stairs = create_stairs(&host, f, &StairsParams::default()).unwrap();
        assert_eq!(stairs.treads.len(), 4);
        assert_relative_eq!(z_of(&stairs.mesh, stairs.treads[0]), 0.48, epsilon = 1e-9);
        assert_relative_eq!(z_of(&stairs.mesh, stairs.treads[3]), 0.12, epsilon = 1e-9);
    }

    /// Faces of `mesh` whose normal is within a degree of `direction`.
    fn faces_toward(mesh: &Mesh, direction: &Vector3<f64>) -> Vec<FaceKey> {
        let direction = direction.normalize();
        mesh.face_keys()
            .filter(|&f| mesh.face_normal(f).is_some_and(|n| n.dot(&direction) > 0.9998))
            .collect()
    }

    fn y_span(mesh: &Mesh, face: FaceKey) -> f64 {
        let ys: Vec<f64> = mesh.points(mesh.face_vertices(face)).iter().map(|p| p.y).collect();
        ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max) - ys.iter().cloned().fold(f64::INFINITY, f64::min)
    }

    #[test]
    fn blocked_underside_hangs_one_rise_strips() {
        let (host, f) = wall();
        let params = StairsParams {
            bottom: StairsBottom::Blocked,
            ..StairsParams::default()
        };
        let stairs = create_stairs(&host, f, &params).unwrap();
        assert_eq!(stairs.treads.len(), 4);
        assert_relative_eq!(z_of(&stairs.mesh, stairs.treads[3]), 0.12, epsilon = 1e-9);
        let mesh = &stairs.mesh;

        // Each step hangs from the last rise of the one above it
        let mut backs: Vec<f64> = faces_toward(mesh, &Vector3::y())
            .into_iter()
            .map(|b| mesh.face_center(b).unwrap())
            .filter(|c| c.y < -0.5)
            .map(|c| c.y)
            .collect();
        backs.sort_by(|a, b| b.total_cmp(a));
        assert_eq!(backs.len(), 3);
        for (y, expected) in backs.iter().zip([-0.88, -1.08, -1.28]) {
            assert_relative_eq!(*y, expected, epsilon = 1e-9);
        }

        // The landing keeps the rest of its underside
        let landing = faces_toward(mesh, &-Vector3::z())
            .into_iter()
            .find(|&u| (z_of(mesh, u) - 0.36).abs() < 1e-9)
            .unwrap();
        assert_relative_eq!(y_span(mesh, landing), 0.88, epsilon = 1e-9);
    }

    #[test]
    fn sloped_underside_welds_into_one_plane() {
        let (host, f) = wall();
        let build = |bottom| {
            let params = StairsParams {
                bottom,
                ..StairsParams::default()
            };
            create_stairs(&host, f, &params).unwrap()
        };
        let blocked = build(StairsBottom::Blocked);
        let sloped = build(StairsBottom::Slope);
        assert_relative_eq!(z_of(&sloped.mesh, sloped.treads[3]), 0.12, epsilon = 1e-9);

        // Every step's back climbs one rise over one run towards the wall
        let slope = Vector3::new(0.0, 0.12, -0.2);
        let backs = faces_toward(&sloped.mesh, &slope);
        assert_eq!(backs.len(), 3);
        let upright_backs = faces_toward(&sloped.mesh, &Vector3::y())
            .into_iter()
            .filter(|&b| sloped.mesh.face_center(b).unwrap().y < -0.5)
            .count();
        assert_eq!(upright_backs, 0);

        // Below the landing each cut edge merges into the back edge above
        assert_eq!(blocked.mesh.vertex_count() - sloped.mesh.vertex_count(), 4);
    }

    #[test]
    fn railing_follows_requested_sides() {
        let (host, f) = wall();
        let both = StairsParams {
            railing: Some(RailParams::default()),
            ..straight()
        };
        let (_, parts) = create_stairs(&host, f, &both).unwrap().railing.unwrap();
        // One reference face per side, two corner posts each
        assert_eq!(parts.corner_posts.len(), 4 * 6);

        let left = StairsParams {
            railing_right: false,
            ..both
        };
        let (_, parts) = create_stairs(&host, f, &left).unwrap().railing.unwrap();
        assert_eq!(parts.corner_posts.len(), 2 * 6);

        let none = StairsParams {
            railing_left: false,
            ..left
        };
        assert!(create_stairs(&host, f, &none).unwrap().railing.is_none());
    }
}
