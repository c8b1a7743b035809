// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Railings grown from upright reference faces.
//!
//! Every reference face spans two corner posts. Its top edge becomes the
//! top rail and the face below is filled with posts, rails or a thin wall.
//! The reference faces are consumed.
//!
//! Sloped faces (stair railings) keep the cut ends of their rails upright,
//! and fill posts get their top caps turned to follow the slope.

use archgen_mesh::{
    mean_point, radius_to_side_length, Cylinder, EdgeKey, FaceCategory, FaceKey, Mesh, VertexKey,
};
use nalgebra::Vector3;

use crate::error::Result;
use crate::params::{RailParams, RailingFill};

/// Segments of corner posts and top rails.
const POST_SEGMENTS: usize = 4;

/// Faces created by [`create_railing`], by role.
#[derive(Debug, Clone, Default)]
pub struct RailingParts {
    pub corner_posts: Vec<FaceKey>,
    pub top_rails: Vec<FaceKey>,
    pub fill: Vec<FaceKey>,
}

impl RailingParts {
    pub fn len(&self) -> usize {
        self.corner_posts.len() + self.top_rails.len() + self.fill.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Replaces the upright `faces` with railing geometry.
pub fn create_railing(mesh: &mut Mesh, faces: &[FaceKey], params: &RailParams) -> Result<RailingParts> {
    let mut parts = RailingParts::default();
    let Some(&first) = faces.first() else {
        return Ok(parts);
    };
    let cpw = params.corner_post_width;

    if params.has_corner_post {
        let up = mesh.face_normal(first).unwrap_or_else(Vector3::y);
        let edges = mesh.vertical_edges(&mesh.faces_edges(faces));
        for e in edges {
            let post = mesh.edge_to_cylinder(e, cpw / 2.0, &up, POST_SEGMENTS, true)?;
            parts.corner_posts.extend(post.faces);
        }
    }

    for &face in faces {
        make_fill(mesh, face, params, &mut parts)?;
    }
    mesh.delete_faces(faces);

    mesh.set_category(&parts.corner_posts, FaceCategory::RailingPost);
    mesh.set_category(&parts.top_rails, FaceCategory::RailingRail);
    let fill_category = match params.fill {
        RailingFill::Posts => FaceCategory::RailingPost,
        RailingFill::Rails => FaceCategory::RailingRail,
        RailingFill::Wall => FaceCategory::RailingInfill,
    };
    mesh.set_category(&parts.fill, fill_category);

    tracing::debug!(
        faces = faces.len(),
        corner_posts = parts.corner_posts.len(),
        fill = parts.fill.len(),
        "Railing built"
    );
    Ok(parts)
}

/// Top rail and infill for one reference face.
fn make_fill(mesh: &mut Mesh, face: FaceKey, params: &RailParams, parts: &mut RailingParts) -> Result<()> {
    let cpw = params.corner_post_width;
    // Half the side of a square post: the rail sits flush inside it
    let side = radius_to_side_length(cpw / 2.0, POST_SEGMENTS) / 2.0;

    let dup = mesh.duplicate_faces(&[face])?.faces[0];
    let Some(normal) = mesh.face_normal(dup) else {
        mesh.delete_faces(&[dup]);
        return Ok(());
    };
    let edges = mesh.face_edges(dup).to_vec();
    let verticals = mesh.vertical_edges(&edges);
    let others: Vec<EdgeKey> = edges.iter().copied().filter(|e| !verticals.contains(e)).collect();
    let Some(&top) = mesh.top_edges(&others, 1).first() else {
        mesh.delete_faces(&[dup]);
        return Ok(());
    };

    let top_verts = mesh.edges_vertices(&[top]);
    let down = Vector3::new(0.0, 0.0, -side);
    mesh.translate(&top_verts, &down);
    pull_between_posts(mesh, dup, top, side);
    parts.top_rails.extend(rail_along(mesh, top, cpw / 2.0, POST_SEGMENTS)?);
    mesh.translate(&top_verts, &down);

    match params.fill {
        RailingFill::Posts => {
            let Some(&bottom) = mesh.bottom_edges(&others, 1).first() else {
                mesh.delete_faces(&[dup]);
                return Ok(());
            };
            let (Some(dir), Some(length)) = (mesh.edge_vector(top), mesh.edge_length(top)) else {
                mesh.delete_faces(&[dup]);
                return Ok(());
            };
            let count = (dir.xy().norm() * params.posts.density).round() as usize;
            if count == 0 {
                mesh.delete_faces(&[dup]);
                return Ok(());
            }
            let sloped = mesh.is_sloped_edge(top);
            let widths = vec![length / (count + 1) as f64; count + 1];
            let inner = mesh.subdivide(&[top, bottom], &dir, &widths)?;
            for &e in &inner {
                let post =
                    mesh.edge_to_cylinder(e, params.posts.size / 2.0, &normal, params.posts.segments, true)?;
                if sloped {
                    if let Some(axis) = mesh.edge_vector(e) {
                        follow_slope(mesh, &post, &axis, &dir);
                    }
                }
                parts.fill.extend(post.faces);
            }
            discard_pieces(mesh, dup, &inner);
        }
        RailingFill::Rails => {
            let size = params.rails.size.min(cpw);
            let Some(height) = verticals.first().and_then(|&e| mesh.edge_length(e)) else {
                mesh.delete_faces(&[dup]);
                return Ok(());
            };
            let count = (height * params.rails.density).floor() as usize;
            if count == 0 {
                mesh.delete_faces(&[dup]);
                return Ok(());
            }
            let widths = vec![height / (count + 1) as f64; count + 1];
            let inner = mesh.subdivide(&verticals, &Vector3::z(), &widths)?;
            for &e in &inner {
                parts.fill.extend(rail_along(mesh, e, size / 2.0, params.rails.segments)?);
            }
            discard_pieces(mesh, dup, &inner);
        }
        RailingFill::Wall => {
            let width = params.wall.width.clamp(0.001, cpw.max(0.001));
            let verts = mesh.face_vertices(dup).to_vec();
            mesh.translate(&verts, &(-normal * width / 2.0));
            let ext = mesh.extrude_region(&[dup], width, &normal, true)?;
            mesh.reverse_face(dup)?;
            parts.fill.push(dup);
            parts.fill.extend(ext.far);
            parts.fill.extend(ext.sides);
        }
    }
    Ok(())
}

/// Moves the face's end vertices towards each other by `side`, horizontally.
fn pull_between_posts(mesh: &mut Mesh, face: FaceKey, edge: EdgeKey, side: f64) {
    let Some(v) = mesh.edge_vector(edge) else {
        return;
    };
    let Some(dir) = Vector3::new(v.x, v.y, 0.0).try_normalize(1e-9) else {
        return;
    };
    let verts = mesh.sort_vertices(mesh.face_vertices(face), &dir);
    let half = verts.len() / 2;
    mesh.translate(&verts[..half], &(dir * side));
    mesh.translate(&verts[half..], &(-dir * side));
}

/// Capped cylinder along `edge` with a flat side on top; sloped ends are
/// turned upright.
fn rail_along(mesh: &mut Mesh, edge: EdgeKey, radius: f64, segments: usize) -> Result<Vec<FaceKey>> {
    let Some(vec) = mesh.edge_vector(edge) else {
        return Ok(Vec::new());
    };
    let up = vec.cross(&Vector3::z()).cross(&vec);
    let rail = mesh.edge_to_cylinder(edge, radius, &up, segments, true)?;
    if mesh.is_sloped_edge(edge) {
        let angle = (vec.z / vec.xy().norm()).atan();
        let axis = vec.cross(&-Vector3::z());
        for ring in [&rail.start_ring, &rail.end_ring] {
            rotate_ring(mesh, ring, &axis, angle);
        }
    }
    Ok(rail.faces)
}

/// Tilts the upper ring of a vertical post so its cap runs along `slope`.
fn follow_slope(mesh: &mut Mesh, post: &Cylinder, axis: &Vector3<f64>, slope: &Vector3<f64>) {
    let angle = (slope.z / slope.xy().norm()).atan();
    let axis = if axis.z < 0.0 { -axis } else { *axis };
    let turn = axis.cross(&-slope);
    let height = |ring: &[VertexKey]| mesh.points(ring).iter().map(|p| p.z).sum::<f64>();
    let upper = if height(&post.end_ring) >= height(&post.start_ring) {
        &post.end_ring
    } else {
        &post.start_ring
    };
    rotate_ring(mesh, upper, &turn, angle);
}

fn rotate_ring(mesh: &mut Mesh, ring: &[VertexKey], axis: &Vector3<f64>, angle: f64) {
    let Some(center) = mean_point(&mesh.points(ring)) else {
        return;
    };
    mesh.rotate(ring, &center, axis, angle);
}

/// Deletes a subdivided reference copy: every piece around the cuts.
fn discard_pieces(mesh: &mut Mesh, dup: FaceKey, inner: &[EdgeKey]) {
    let mut pieces = mesh.edges_faces(inner, &[]);
    pieces.push(dup);
    pieces.sort();
    pieces.dedup();
    mesh.delete_faces(&pieces);
}
