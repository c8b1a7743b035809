// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Infill of door, window and arch leaves.
//!
//! Every fill works on a leaf solid's front and back faces, both facing
//! out of the solid. Margins and borders are clamped to just under half
//! the governing face dimension so small leaves never self-intersect.

use archgen_mesh::{FaceCategory, FaceKey, Mesh, EPSILON, MIN_INTERVAL};
use nalgebra::Vector3;

use crate::error::{Error, Result};
use crate::params::{BarFill, FillParams, GlassFill, LouverFill, PanelFill};

/// Leaves narrower than this get no glazing.
const MIN_GLASS_SIZE: f64 = 0.05;

/// Fills the `front`/`back` pair of a leaf. Returns the tagged fill faces.
pub fn fill_face(mesh: &mut Mesh, front: FaceKey, back: FaceKey, fill: &FillParams) -> Result<Vec<FaceKey>> {
    match fill {
        FillParams::None => Ok(Vec::new()),
        FillParams::Panels(p) => fill_panels(mesh, front, back, p),
        FillParams::GlassPanes(p) => fill_glass_panes(mesh, front, back, p),
        FillParams::Louver(p) => fill_louver(mesh, front, back, p),
    }
}

/// `value` kept below half the smaller of `w` and `h`.
fn clamp_half(value: f64, w: f64, h: f64) -> f64 {
    let limit = (w.min(h) / 2.0 - EPSILON).max(0.0);
    value.clamp(0.0, limit)
}

/// Uniform scale that pulls a convex outline `gap` in across its `span`.
pub(crate) fn gap_factor(span: f64, gap: f64) -> Option<f64> {
    (gap > EPSILON && span > 2.0 * gap).then(|| 1.0 - 2.0 * gap / span)
}

/// Smallest dimension across `faces`.
fn min_dimension(mesh: &Mesh, faces: &[FaceKey]) -> f64 {
    faces
        .iter()
        .map(|&f| {
            let (w, h) = mesh.face_dimensions(f);
            w.min(h)
        })
        .fold(f64::INFINITY, f64::min)
}

/// Distance between the centers of two faces.
fn separation(mesh: &Mesh, a: FaceKey, b: FaceKey) -> f64 {
    match (mesh.face_center_bounds(a), mesh.face_center_bounds(b)) {
        (Some(p), Some(q)) => (p - q).norm(),
        _ => 0.0,
    }
}

fn fill_panels(mesh: &mut Mesh, front: FaceKey, back: FaceKey, p: &PanelFill) -> Result<Vec<FaceKey>> {
    if p.count_x + p.count_y == 0 {
        return Ok(Vec::new());
    }
    let mut panels = Vec::new();
    for face in [front, back] {
        let (w, h) = mesh.face_dimensions(face);
        mesh.inset_individual(&[face], clamp_half(p.margin, w, h), 0.0, true)?;
        let quads = subdivide_into_quads(mesh, face, p.count_x, p.count_y, p.gap)?;
        let m = min_dimension(mesh, &quads);
        let border = clamp_half(p.border, m, m);

        // Sink each quad, then raise its middle back out
        mesh.inset_individual(&quads, 0.0, -p.depth, true)?;
        mesh.set_category(&quads, FaceCategory::Panel);
        let raised = mesh.inset_individual(&quads, border, p.depth, true)?;
        panels.extend(quads);
        panels.extend(raised);
    }
    Ok(panels)
}

fn fill_glass_panes(mesh: &mut Mesh, front: FaceKey, back: FaceKey, p: &GlassFill) -> Result<Vec<FaceKey>> {
    if p.count_x + p.count_y == 0 {
        return Ok(Vec::new());
    }
    let thickness = separation(mesh, front, back);
    let depth = ((thickness - p.glass_thickness) / 2.0).max(0.0);
    let mut panes = Vec::new();
    for face in [front, back] {
        let (w, h) = mesh.face_dimensions(face);
        if w < MIN_GLASS_SIZE || h < MIN_GLASS_SIZE {
            tracing::debug!(w, h, "Leaf too small for glass panes");
            return Ok(panes);
        }
        mesh.inset_individual(&[face], clamp_half(p.margin, w, h), 0.0, true)?;
        let quads = subdivide_into_quads(mesh, face, p.count_x, p.count_y, p.gap)?;
        let m = min_dimension(mesh, &quads);
        mesh.inset_individual(&quads, clamp_half(p.border, m, m), -depth, true)?;
        mesh.set_category(&quads, FaceCategory::Pane);
        panes.extend(quads);
    }
    Ok(panes)
}

fn fill_louver(mesh: &mut Mesh, front: FaceKey, back: FaceKey, p: &LouverFill) -> Result<Vec<FaceKey>> {
    let Some(frame) = mesh.local_frame(front) else {
        return Ok(Vec::new());
    };
    let thickness = separation(mesh, front, back);
    let (w, h) = mesh.face_dimensions(front);
    let margin = clamp_half(p.margin, w, h);

    mesh.inset_individual(&[front], margin, 0.0, true)?;
    mesh.inset_individual(&[back], margin, 0.0, true)?;
    let front_rim = mesh.separate_faces(&[front])?;
    let back_rim = mesh.separate_faces(&[back])?;

    // Line the cavity between the two frames, then drop the back
    let mut lining = Vec::with_capacity(front_rim.len());
    for &e in &front_rim {
        if let Some(&other) = mesh.closest_edges(e, &back_rim, 1).first() {
            lining.push(mesh.bridge_edges(e, other)?);
        }
    }
    if let Some(category) = mesh.category(front) {
        mesh.set_category(&lining, category);
    }
    mesh.delete_faces(&[back]);
    let verts = mesh.face_vertices(front).to_vec();
    mesh.translate(&verts, &(-frame.z * thickness / 2.0));

    let (_, height) = mesh.face_dimensions(front);
    if p.louver_width <= MIN_INTERVAL {
        return Ok(Vec::new());
    }
    let count = (height / p.louver_width).floor() as usize;
    if count == 0 {
        return Ok(Vec::new());
    }
    let extra = height - count as f64 * p.louver_width;
    let mut widths = vec![p.louver_width; count];
    let leftover = extra > EPSILON;
    if leftover {
        widths.insert(0, extra);
    } else if let Some(last) = widths.last_mut() {
        // Absorb rounding so the strips still span the face
        *last += extra;
    }
    let mut slats = mesh.subdivide_face_vertically(front, &widths)?;
    if leftover && !slats.is_empty() {
        slats.remove(0);
    }

    for &slat in &slats {
        mesh.separate_faces(&[slat])?;
    }
    let axis = -frame.x;
    for &slat in &slats {
        let Some(center) = mesh.face_center_bounds(slat) else {
            continue;
        };
        let verts = mesh.face_vertices(slat).to_vec();
        mesh.rotate(&verts, &center, &axis, p.angle);
    }
    let mut louvers = slats.clone();
    louvers.extend(mesh.solidify(&slats, p.slat_thickness)?);
    mesh.set_category(&louvers, FaceCategory::Louver);
    Ok(louvers)
}

/// Turns `face` into a grid of bars pushed `depth` in front of it.
///
/// `count_x` bars stand upright spread along the face, `count_y` run
/// across it. The flat face is consumed.
pub fn fill_bars(mesh: &mut Mesh, face: FaceKey, p: &BarFill) -> Result<Vec<FaceKey>> {
    let Some(frame) = mesh.local_frame(face) else {
        return Ok(Vec::new());
    };
    if p.count_x + p.count_y == 0 {
        mesh.delete_faces(&[face]);
        return Ok(Vec::new());
    }
    let verts = mesh.face_vertices(face).to_vec();
    mesh.translate(&verts, &(frame.z * p.depth));
    let copy = mesh
        .duplicate_faces(&[face])?
        .faces
        .first()
        .copied()
        .ok_or(Error::Geometry("bar face did not copy"))?;

    let mut bars = bar_row(mesh, face, &frame.y, p.count_y, p, &frame.z)?;
    bars.extend(bar_row(mesh, copy, &frame.x, p.count_x, p, &frame.z)?);
    mesh.set_category(&bars, FaceCategory::Bar);
    Ok(bars)
}

/// Cuts `face` into `count + 1` even strips along `direction` and sweeps
/// every cut into a bar.
fn bar_row(
    mesh: &mut Mesh,
    face: FaceKey,
    direction: &Vector3<f64>,
    count: usize,
    p: &BarFill,
    up: &Vector3<f64>,
) -> Result<Vec<FaceKey>> {
    let edges = mesh.edges_along(mesh.face_edges(face), direction);
    let length = edges.first().and_then(|&e| mesh.edge_length(e)).unwrap_or(0.0);
    if count == 0 || length <= MIN_INTERVAL {
        mesh.delete_faces(&[face]);
        return Ok(Vec::new());
    }
    let cuts = mesh.subdivide(&edges, direction, &vec![length / (count + 1) as f64; count + 1])?;
    let mut bars = Vec::new();
    for &e in &cuts {
        bars.extend(mesh.edge_to_cylinder(e, p.radius, up, p.segments, true)?.faces);
    }
    let strips = mesh.edges_faces(&cuts, &[]);
    mesh.delete_faces(&strips);
    Ok(bars)
}

/// Glazes an arched leaf. The margin and border scale the whole outline,
/// so the curved top is followed.
pub fn fill_arch(mesh: &mut Mesh, front: FaceKey, back: FaceKey, p: &GlassFill) -> Result<Vec<FaceKey>> {
    let thickness = separation(mesh, front, back);
    let depth = ((thickness - p.glass_thickness) / 2.0).max(0.0);
    let mut panes = Vec::new();
    for face in [front, back] {
        let Some((w, h)) = extent(mesh, face) else {
            continue;
        };
        if w < MIN_GLASS_SIZE || h < MIN_GLASS_SIZE {
            return Ok(panes);
        }
        let margin = clamp_half(p.margin, w, h);
        let span = w.min(h);
        if let Some(factor) = gap_factor(span, margin) {
            mesh.inset_scaled(face, factor, 0.0)?;
        }
        let border = clamp_half(p.border, w - 2.0 * margin, h - 2.0 * margin);
        match gap_factor(span - 2.0 * margin, border) {
            Some(factor) => {
                mesh.inset_scaled(face, factor, -depth)?;
            }
            None if depth > EPSILON => {
                mesh.inset_individual(&[face], 0.0, -depth, false)?;
            }
            None => {}
        }
        mesh.set_category(&[face], FaceCategory::Pane);
        panes.push(face);
    }
    Ok(panes)
}

/// Width and height of any face measured in its local frame.
fn extent(mesh: &Mesh, face: FaceKey) -> Option<(f64, f64)> {
    let frame = mesh.local_frame(face)?;
    let points = mesh.points(mesh.face_vertices(face));
    let span = |axis: &Vector3<f64>| {
        let (lo, hi) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            let t = p.coords.dot(axis);
            (lo.min(t), hi.max(t))
        });
        hi - lo
    };
    Some((span(&frame.x), span(&frame.y)))
}

/// Interval widths with `gap` between `count` equal parts of `total`.
fn gapped(total: f64, count: usize, gap: f64) -> Vec<(f64, bool)> {
    let count = count.max(1);
    let gap = gap.clamp(0.0, total / (2 * count) as f64);
    if count == 1 {
        return vec![(total, true)];
    }
    let part = (total - gap * (count - 1) as f64) / count as f64;
    let mut out = Vec::with_capacity(2 * count - 1);
    for i in 0..count {
        if i > 0 && gap > MIN_INTERVAL {
            out.push((gap, false));
        }
        out.push((part, true));
    }
    if gap <= MIN_INTERVAL {
        // Gapless grids still have to cover the whole span
        for w in &mut out {
            w.0 = total / count as f64;
        }
    }
    out
}

/// Which interval of `layout` holds position `t`.
fn interval_at(layout: &[(f64, bool)], t: f64) -> bool {
    let mut end = 0.0;
    for &(w, keep) in layout {
        end += w;
        if t < end {
            return keep;
        }
    }
    layout.last().is_some_and(|l| l.1)
}

/// Cuts a rectangular face into an `nx` by `ny` grid of quads separated by
/// `gap`. Returns the quads; the gap strips stay as plain faces.
fn subdivide_into_quads(mesh: &mut Mesh, face: FaceKey, nx: usize, ny: usize, gap: f64) -> Result<Vec<FaceKey>> {
    let (nx, ny) = (nx.max(1), ny.max(1));
    if nx == 1 && ny == 1 {
        return Ok(vec![face]);
    }
    let Some(frame) = mesh.local_frame(face) else {
        return Ok(vec![face]);
    };
    let (w, h) = mesh.face_dimensions(face);
    let points = mesh.points(mesh.face_vertices(face));
    let x0 = points.iter().map(|p| p.coords.dot(&frame.x)).fold(f64::INFINITY, f64::min);
    let y0 = points.iter().map(|p| p.coords.dot(&frame.y)).fold(f64::INFINITY, f64::min);

    let columns = gapped(w, nx, gap);
    let rows = gapped(h, ny, gap);
    let widths = |layout: &[(f64, bool)]| layout.iter().map(|l| l.0).collect::<Vec<_>>();

    let strips = mesh.subdivide_face_vertically(face, &widths(&rows))?;
    let pieces = if columns.len() > 1 {
        mesh.subdivide_faces(&strips, &frame.x, &widths(&columns))?
    } else {
        strips
    };

    Ok(pieces
        .into_iter()
        .filter(|&f| {
            mesh.face_center_bounds(f).is_some_and(|c| {
                interval_at(&columns, c.coords.dot(&frame.x) - x0)
                    && interval_at(&rows, c.coords.dot(&frame.y) - y0)
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    /// A 0.8 x 2.0 leaf solid 0.04 thick; front faces -y.
    fn leaf(mesh: &mut Mesh) -> (FaceKey, FaceKey) {
        let front = mesh
            .add_face_from_points(&[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.8, 0.0, 0.0),
                Point3::new(0.8, 0.0, 2.0),
                Point3::new(0.0, 0.0, 2.0),
            ])
            .unwrap();
        mesh.set_category(&[front], FaceCategory::Door);
        let ext = mesh.extrude_region(&[front], 0.04, &Vector3::y(), true).unwrap();
        mesh.reverse_faces(&ext.far).unwrap();
        (front, ext.far[0])
    }

    #[test]
    fn quads_leave_gaps() {
        let mut mesh = Mesh::new();
        let (front, _) = leaf(&mut mesh);
        let quads = subdivide_into_quads(&mut mesh, front, 2, 3, 0.1).unwrap();
        assert_eq!(quads.len(), 6);
        for &q in &quads {
            let (w, h) = mesh.face_dimensions(q);
            assert_relative_eq!(w, 0.35, epsilon = 1e-9);
            assert_relative_eq!(h, (2.0 - 0.2) / 3.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn gapless_grid_covers_the_face() {
        let mut mesh = Mesh::new();
        let (front, _) = leaf(&mut mesh);
        let quads = subdivide_into_quads(&mut mesh, front, 2, 2, 0.0).unwrap();
        assert_eq!(quads.len(), 4);
        let area: f64 = quads.iter().filter_map(|&q| mesh.face_area(q)).sum();
        assert_relative_eq!(area, 1.6, epsilon = 1e-9);
    }

    #[test]
    fn panels_sink_and_rise() {
        let mut mesh = Mesh::new();
        let (front, back) = leaf(&mut mesh);
        let faces = fill_face(&mut mesh, front, back, &FillParams::Panels(PanelFill::default())).unwrap();
        // Four quads per side, each with a raised rim ring
        assert_eq!(faces.len(), 2 * (4 + 4 * 4));
        assert!(mesh.faces_in_category(FaceCategory::Panel).len() >= 8);
        // Raised middles sit back on the leaf surface
        let quad = faces[0];
        assert_relative_eq!(mesh.face_center(quad).unwrap().y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn glass_is_recessed_to_its_thickness() {
        let mut mesh = Mesh::new();
        let (front, back) = leaf(&mut mesh);
        let fill = FillParams::GlassPanes(GlassFill {
            count_x: 1,
            count_y: 1,
            ..GlassFill::default()
        });
        let panes = fill_face(&mut mesh, front, back, &fill).unwrap();
        assert_eq!(panes, vec![front, back]);
        let gap = mesh.face_center(back).unwrap().y - mesh.face_center(front).unwrap().y;
        assert_relative_eq!(gap, 0.002, epsilon = 1e-9);
        assert_eq!(mesh.category(front), Some(FaceCategory::Pane));
    }

    #[test]
    fn tiny_leaf_gets_no_glass() {
        let mut mesh = Mesh::new();
        let front = mesh
            .add_face_from_points(&[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(0.03, 0.0, 0.0),
                Point3::new(0.03, 0.0, 1.0),
                Point3::new(0.0, 0.0, 1.0),
            ])
            .unwrap();
        let ext = mesh.extrude_region(&[front], 0.04, &Vector3::y(), true).unwrap();
        let panes = fill_glass_panes(&mut mesh, front, ext.far[0], &GlassFill::default()).unwrap();
        assert!(panes.is_empty());
    }

    #[test]
    fn louvers_are_tilted_slats() {
        let mut mesh = Mesh::new();
        let (front, back) = leaf(&mut mesh);
        let p = LouverFill::default();
        let louvers = fill_face(&mut mesh, front, back, &FillParams::Louver(p)).unwrap();
        assert!(!mesh.contains_face(back));
        // Every slat is a face plus its solidified back and four sides
        assert_eq!(louvers.len() % 6, 0);
        let slats = louvers.len() / 6;
        assert_eq!(slats, ((2.0 - 0.3) / p.louver_width).floor() as usize);
        let n = mesh.face_normal(louvers[0]).unwrap();
        assert_relative_eq!(n.z.abs(), p.angle.sin(), epsilon = 1e-6);
    }

    #[test]
    fn bars_replace_the_face() {
        let mut mesh = Mesh::new();
        let face = mesh
            .add_face_from_points(&[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(0.0, 0.0, 1.0),
            ])
            .unwrap();
        let p = BarFill::default();
        let bars = fill_bars(&mut mesh, face, &p).unwrap();
        let per_bar = p.segments + 2;
        assert_eq!(bars.len(), (p.count_x + p.count_y) * per_bar);
        assert_eq!(mesh.face_count(), bars.len());
        for &b in &bars {
            assert!(mesh.face_center(b).unwrap().y < -0.03);
            assert_eq!(mesh.category(b), Some(FaceCategory::Bar));
        }
    }

    #[test]
    fn clamp_stays_under_half() {
        assert_relative_eq!(clamp_half(0.5, 0.4, 2.0), 0.199, epsilon = 1e-12);
        assert_relative_eq!(clamp_half(0.05, 0.4, 2.0), 0.05, epsilon = 1e-12);
        assert_relative_eq!(clamp_half(-1.0, 0.4, 2.0), 0.0, epsilon = 1e-12);
    }
}
