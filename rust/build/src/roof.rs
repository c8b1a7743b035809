// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roofs over flat face selections.
//!
//! Gable and hip roofs run the selection outline through the straight
//! skeleton, lift the skeleton to the requested height and trace one face
//! per outline edge. Flat roofs are a thickened, overhanging slab.

use archgen_mesh::{FaceCategory, FaceKey, Mesh, VertexKey};
use nalgebra::{Point2, Point3, Vector3};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::config::BuildConfig;
use crate::error::{Error, Result};
use crate::params::{RoofKind, RoofParams};
use crate::skeleton::{Skeleton, SkeletonMode};

/// Builds a roof on `faces`. Returns the faces tagged ROOF.
pub fn build_roof(
    mesh: &mut Mesh,
    faces: &[FaceKey],
    params: &RoofParams,
    config: &BuildConfig,
) -> Result<Vec<FaceKey>> {
    match params.kind {
        RoofKind::Flat => flat_roof(mesh, faces, params),
        RoofKind::Gable => skeleton_roof(mesh, faces, params.height, SkeletonMode::Gable, config),
        RoofKind::Hip => skeleton_roof(mesh, faces, params.height, SkeletonMode::Hip, config),
    }
}

/// Slab extruded up by the roof thickness with its rim pushed out.
fn flat_roof(mesh: &mut Mesh, faces: &[FaceKey], params: &RoofParams) -> Result<Vec<FaceKey>> {
    let roof = thicken_roof(mesh, faces, params.thickness, params.outset)?;
    tracing::debug!(top = roof.len(), "Flat roof built");
    Ok(roof)
}

/// Thickens roof faces of any pitch into a shell. Returns the faces
/// tagged ROOF.
///
/// The faces are extruded straight up by `thickness` and the side band is
/// pushed out by `outset`. The lower ring of the band then drops by half
/// the outset so the eaves keep sloping. Tops and the upper rim are ROOF;
/// the band and the soffit under it are ROOF_EDGE.
pub fn thicken_roof(mesh: &mut Mesh, faces: &[FaceKey], thickness: f64, outset: f64) -> Result<Vec<FaceKey>> {
    let ext = mesh.extrude_region(faces, thickness, &Vector3::z(), false)?;
    // Ceilings handed over from a floor build face down
    let down: Vec<FaceKey> = ext
        .far
        .iter()
        .copied()
        .filter(|&f| mesh.face_normal(f).is_some_and(|n| n.z < 0.0))
        .collect();
    mesh.reverse_faces(&down)?;

    let top: FxHashSet<VertexKey> = mesh.faces_vertices(&ext.far).into_iter().collect();
    let base: FxHashSet<VertexKey> = mesh
        .faces_vertices(&ext.sides)
        .into_iter()
        .filter(|v| !top.contains(v))
        .collect();
    let rims = mesh.inset_region(&ext.sides, 0.0, outset, true)?;
    let (soffit, upper): (Vec<FaceKey>, Vec<FaceKey>) = rims
        .into_iter()
        .partition(|&r| mesh.face_vertices(r).iter().any(|v| base.contains(v)));

    let lower: Vec<VertexKey> = mesh
        .faces_vertices(&soffit)
        .into_iter()
        .filter(|v| !base.contains(v))
        .collect();
    mesh.translate(&lower, &Vector3::new(0.0, 0.0, -outset / 2.0));

    let roof: Vec<FaceKey> = ext.far.iter().chain(&upper).copied().collect();
    let edge: Vec<FaceKey> = ext.sides.iter().chain(&soffit).copied().collect();
    mesh.set_category(&roof, FaceCategory::Roof);
    mesh.set_category(&edge, FaceCategory::RoofEdge);
    tracing::debug!(top = roof.len(), edge = edge.len(), "Roof thickened");
    Ok(roof)
}

/// Ordered boundary loop of a face region, counter-clockwise from above.
pub fn outline(mesh: &Mesh, faces: &[FaceKey]) -> Result<Vec<VertexKey>> {
    let edges = mesh.boundary_edges(faces);
    let mut adjacent: FxHashMap<VertexKey, SmallVec<[VertexKey; 2]>> = FxHashMap::default();
    for &e in &edges {
        let (a, b) = mesh.edge_vertices(e).ok_or(Error::OpenOutline)?;
        adjacent.entry(a).or_default().push(b);
        adjacent.entry(b).or_default().push(a);
    }
    if edges.is_empty() || adjacent.values().any(|n| n.len() != 2) {
        return Err(Error::OpenOutline);
    }

    let start = mesh.edge_vertices(edges[0]).ok_or(Error::OpenOutline)?.0;
    let mut ring = vec![start];
    let mut prev = start;
    let mut cur = adjacent[&start][0];
    while cur != start {
        if ring.len() > edges.len() {
            return Err(Error::OpenOutline);
        }
        ring.push(cur);
        let next = adjacent[&cur].iter().copied().find(|&n| n != prev).unwrap_or(prev);
        prev = cur;
        cur = next;
    }
    // A second loop means holes or disjoint islands
    if ring.len() != edges.len() {
        return Err(Error::OpenOutline);
    }

    let points: Vec<Point2<f64>> = ring
        .iter()
        .filter_map(|&v| mesh.vertex_point(v))
        .map(|p| p.xy())
        .collect();
    if total_turning(&points) < 0.0 {
        ring.reverse();
    }
    Ok(ring)
}

/// Signed angle from `a` to `b`, counter-clockwise positive.
fn turn(a: nalgebra::Vector2<f64>, b: nalgebra::Vector2<f64>) -> f64 {
    a.perp(&b).atan2(a.dot(&b))
}

/// Sum of exterior angles: `+2π` for counter-clockwise loops.
fn total_turning(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (a, b, c) = (points[i], points[(i + 1) % n], points[(i + 2) % n]);
            turn(b - a, c - b)
        })
        .sum()
}

/// Indices of the corners that turn by more than `angle`.
fn corner_indices(points: &[Point2<f64>], angle: f64) -> Vec<usize> {
    let n = points.len();
    (0..n)
        .filter(|&i| {
            let (a, b, c) = (points[(i + n - 1) % n], points[i], points[(i + 1) % n]);
            turn(b - a, c - b).abs() > angle
        })
        .collect()
}

/// Skeleton lifted into 3-D and cleaned up for face tracing.
struct RoofGraph {
    points: Vec<Point3<f64>>,
    /// Surviving node ids after welding.
    alive: Vec<usize>,
    arcs: Vec<(usize, usize)>,
}

impl RoofGraph {
    fn lift(skeleton: &Skeleton, corners: &[Point3<f64>], base_z: f64, scale: f64) -> Self {
        let points = skeleton
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| match corners.get(i) {
                Some(&p) => p,
                None => Point3::new(n.point.x, n.point.y, base_z + n.height * scale),
            })
            .collect::<Vec<_>>();
        Self {
            alive: (0..points.len()).collect(),
            points,
            arcs: skeleton.arcs.clone(),
        }
    }

    /// Collapses nodes closer than `distance` onto the earliest one.
    fn weld(&mut self, distance: f64) -> usize {
        let n = self.points.len();
        let mut rep: Vec<usize> = (0..n).collect();
        for i in 0..n {
            if let Some(j) = (0..i).find(|&j| rep[j] == j && (self.points[i] - self.points[j]).norm() <= distance) {
                rep[i] = j;
            }
        }
        let mut arcs: Vec<(usize, usize)> = Vec::with_capacity(self.arcs.len());
        for &(a, b) in &self.arcs {
            let (a, b) = (rep[a], rep[b]);
            let arc = (a.min(b), a.max(b));
            if a != b && !arcs.contains(&arc) {
                arcs.push(arc);
            }
        }
        self.arcs = arcs;
        self.alive = (0..n).filter(|&i| rep[i] == i).collect();
        n - self.alive.len()
    }

    /// Splits arcs that pass through another node.
    fn split_t_junctions(&mut self, distance: f64) -> usize {
        let mut splits = 0;
        let limit = self.arcs.len() * self.alive.len().max(1);
        'scan: while splits < limit {
            for idx in 0..self.arcs.len() {
                let (a, b) = self.arcs[idx];
                let (pa, pb) = (self.points[a], self.points[b]);
                let span = pb - pa;
                let len2 = span.norm_squared();
                if len2 < 1e-18 {
                    continue;
                }
                let hit = self.alive.iter().copied().find(|&n| {
                    if n == a || n == b {
                        return false;
                    }
                    let t = (self.points[n] - pa).dot(&span) / len2;
                    t > 1e-6 && t < 1.0 - 1e-6 && (pa + span * t - self.points[n]).norm() < distance
                });
                if let Some(n) = hit {
                    self.arcs.swap_remove(idx);
                    for arc in [(a.min(n), a.max(n)), (n.min(b), n.max(b))] {
                        if !self.arcs.contains(&arc) {
                            self.arcs.push(arc);
                        }
                    }
                    splits += 1;
                    continue 'scan;
                }
            }
            break;
        }
        splits
    }

    fn adjacency(&self) -> FxHashMap<usize, SmallVec<[usize; 4]>> {
        let mut adj: FxHashMap<usize, SmallVec<[usize; 4]>> = FxHashMap::default();
        for &(a, b) in &self.arcs {
            adj.entry(a).or_default().push(b);
            adj.entry(b).or_default().push(a);
        }
        adj
    }
}

/// Traces skeleton nodes from `from` back to `target`.
///
/// At each node the walk turns onto the neighbour with the smallest
/// counter-clockwise angle from the outgoing direction to the incoming one,
/// which keeps the traced face on its left. Returns the interior nodes in
/// walk order, or `None` when the walk fails to close.
fn trace(
    graph: &RoofGraph,
    adj: &FxHashMap<usize, SmallVec<[usize; 4]>>,
    corners: usize,
    from: usize,
    entry: Point2<f64>,
    target: usize,
) -> Option<Vec<usize>> {
    let xy = |n: usize| graph.points[n].xy();
    let mut path = Vec::new();
    let mut visited = FxHashSet::default();
    let mut back = entry;
    let mut cur = from;
    for _ in 0..=graph.points.len() {
        let here = xy(cur);
        let incoming = back - here;
        let next = adj.get(&cur)?.iter().copied().min_by(|&p, &q| {
            let angle = |w: usize| {
                let a = turn(xy(w) - here, incoming);
                if a <= 1e-12 {
                    a + std::f64::consts::TAU
                } else {
                    a
                }
            };
            angle(p).total_cmp(&angle(q))
        })?;
        if next == target {
            return Some(path);
        }
        if next < corners || !visited.insert(next) {
            return None;
        }
        path.push(next);
        back = here;
        cur = next;
    }
    None
}

/// Straight-skeleton roof: one face per outline edge, lifted so the
/// highest node sits `height` above the mean level of the selection.
fn skeleton_roof(
    mesh: &mut Mesh,
    faces: &[FaceKey],
    height: f64,
    mode: SkeletonMode,
    config: &BuildConfig,
) -> Result<Vec<FaceKey>> {
    let base_z = mesh
        .faces_center(faces)
        .ok_or(Error::Geometry("roof selection has no center"))?
        .z;
    let ring = outline(mesh, faces)?;
    let ring_points: Vec<Point3<f64>> = ring.iter().map(|&v| mesh.point(v)).collect::<archgen_mesh::Result<_>>()?;
    let flat: Vec<Point2<f64>> = ring_points.iter().map(|p| p.xy()).collect();
    let clean = corner_indices(&flat, config.collinear_angle);
    if clean.len() < 3 {
        return Err(Error::Skeleton(format!("outline reduces to {} corners", clean.len())));
    }

    let corner_xy: Vec<Point2<f64>> = clean.iter().map(|&i| flat[i]).collect();
    let skeleton = Skeleton::compute(&corner_xy, mode, config.max_skeleton_events)?;
    let peak = skeleton.max_height();
    if peak <= 1e-12 {
        return Err(Error::Skeleton("skeleton has no height".into()));
    }

    let corner_points: Vec<Point3<f64>> = clean.iter().map(|&i| ring_points[i]).collect();
    let mut graph = RoofGraph::lift(&skeleton, &corner_points, base_z, height / peak);
    let welded = graph.weld(config.weld_distance);
    let splits = graph.split_t_junctions(config.weld_distance);
    tracing::debug!(
        corners = clean.len(),
        nodes = graph.alive.len(),
        arcs = graph.arcs.len(),
        welded,
        splits,
        "Skeleton lifted"
    );

    let n = clean.len();
    let mut verts: FxHashMap<usize, VertexKey> = FxHashMap::default();
    for (i, &idx) in clean.iter().enumerate() {
        verts.insert(i, ring[idx]);
    }
    let mut created = Vec::new();
    for &node in &graph.alive {
        if node >= n {
            let v = mesh.add_vertex_at(&graph.points[node]);
            verts.insert(node, v);
            created.push(v);
        }
    }

    let adj = graph.adjacency();
    let mut traced = Vec::with_capacity(n);
    for i in 0..n {
        let j = (i + 1) % n;
        let (start, end) = (clean[i], clean[j]);
        let mut span = Vec::new();
        let mut k = start;
        loop {
            span.push(ring[k]);
            if k == end {
                break;
            }
            k = (k + 1) % ring.len();
        }
        let entry = flat[(end + ring.len() - 1) % ring.len()];

        let Some(path) = trace(&graph, &adj, n, j, entry, i) else {
            tracing::warn!(edge = i, "Roof walk did not close, dropping face");
            continue;
        };
        span.extend(path.iter().filter_map(|node| verts.get(node).copied()));
        match mesh.add_face(&span) {
            Ok(face) => traced.push(face),
            Err(err) => tracing::warn!(edge = i, error = %err, "Degenerate roof face dropped"),
        }
    }

    let mut roof = Vec::new();
    let mut gables = Vec::new();
    let mut scaffold = Vec::new();
    for face in traced {
        match mesh.face_normal(face) {
            Some(normal) if normal.z > config.up_facing_z => roof.push(face),
            Some(normal) if normal.z >= -config.up_facing_z => gables.push(face),
            _ => scaffold.push(face),
        }
    }
    mesh.delete_faces_only(&scaffold);
    mesh.set_category(&roof, FaceCategory::Roof);
    mesh.set_category(&gables, FaceCategory::Wall);

    let unused: Vec<VertexKey> = created
        .into_iter()
        .filter(|&v| mesh.vertex_faces(v).is_empty())
        .collect();
    mesh.delete_vertices(&unused);

    tracing::debug!(roof = roof.len(), gables = gables.len(), dropped = scaffold.len(), "Skeleton roof built");
    Ok(roof)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn footprint(mesh: &mut Mesh, coords: &[(f64, f64)], z: f64) -> FaceKey {
        let verts: Vec<VertexKey> = coords.iter().map(|&(x, y)| mesh.add_vertex(x, y, z)).collect();
        mesh.add_face(&verts).unwrap()
    }

    fn max_z(mesh: &Mesh, faces: &[FaceKey]) -> f64 {
        mesh.faces_vertices(faces)
            .into_iter()
            .filter_map(|v| mesh.vertex_point(v))
            .map(|p| p.z)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    fn params(kind: RoofKind) -> RoofParams {
        RoofParams {
            kind,
            ..RoofParams::default()
        }
    }

    #[test]
    fn outline_is_counter_clockwise() {
        let mut mesh = Mesh::new();
        // Wound clockwise on purpose
        let f = footprint(&mut mesh, &[(0.0, 0.0), (0.0, 2.0), (3.0, 2.0), (3.0, 0.0)], 0.0);
        let ring = outline(&mesh, &[f]).unwrap();
        let points: Vec<Point2<f64>> = ring.iter().map(|&v| mesh.point(v).unwrap().xy()).collect();
        assert_relative_eq!(total_turning(&points), std::f64::consts::TAU, epsilon = 1e-9);
    }

    #[test]
    fn disjoint_faces_have_no_single_outline() {
        let mut mesh = Mesh::new();
        let a = mesh.add_plane(&Point3::origin(), 1.0, 1.0).unwrap();
        let b = mesh.add_plane(&Point3::new(5.0, 0.0, 0.0), 1.0, 1.0).unwrap();
        assert!(matches!(outline(&mesh, &[a, b]), Err(Error::OpenOutline)));
    }

    #[test]
    fn collinear_corners_are_pruned() {
        let points: Vec<Point2<f64>> = [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 1.0), (0.0, 1.0)]
            .iter()
            .map(|&(x, y)| Point2::new(x, y))
            .collect();
        assert_eq!(corner_indices(&points, 0.001), vec![0, 2, 3, 4]);
    }

    #[test]
    fn hip_roof_on_rectangle() {
        let mut mesh = Mesh::new();
        let f = footprint(&mut mesh, &[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (0.0, 2.0)], 2.8);
        let roof = build_roof(&mut mesh, &[f], &params(RoofKind::Hip), &BuildConfig::default()).unwrap();
        assert_eq!(roof.len(), 4);
        assert_relative_eq!(max_z(&mesh, &roof), 3.8, epsilon = 1e-3);
        assert!(mesh.faces_in_category(FaceCategory::Wall).is_empty());
    }

    #[test]
    fn gable_roof_on_rectangle() {
        let mut mesh = Mesh::new();
        let f = footprint(&mut mesh, &[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (0.0, 2.0)], 0.0);
        let roof = build_roof(&mut mesh, &[f], &params(RoofKind::Gable), &BuildConfig::default()).unwrap();
        assert_eq!(roof.len(), 2);
        assert_eq!(mesh.faces_in_category(FaceCategory::Wall).len(), 2);
        assert_relative_eq!(max_z(&mesh, &roof), 1.0, epsilon = 1e-3);
        // Footprint plus four roof faces close the volume
        for e in mesh.edge_keys() {
            assert_eq!(mesh.edge_faces(e).len(), 2);
        }
    }

    #[test]
    fn hip_roof_on_l_shape() {
        let mut mesh = Mesh::new();
        let f = footprint(
            &mut mesh,
            &[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (2.0, 2.0), (2.0, 4.0), (0.0, 4.0)],
            0.0,
        );
        let roof = build_roof(&mut mesh, &[f], &params(RoofKind::Hip), &BuildConfig::default()).unwrap();
        assert_eq!(roof.len(), 6);
        assert_relative_eq!(max_z(&mesh, &roof), 1.0, epsilon = 1e-3);
    }

    #[test]
    fn flat_roof_tags_top_and_rim() {
        let mut mesh = Mesh::new();
        let f = mesh.add_plane(&Point3::origin(), 2.0, 2.0).unwrap();
        let roof = build_roof(&mut mesh, &[f], &params(RoofKind::Flat), &BuildConfig::default()).unwrap();
        assert!(!roof.is_empty());
        assert_relative_eq!(max_z(&mesh, &roof), 0.1, epsilon = 1e-9);
        assert!(!mesh.faces_in_category(FaceCategory::RoofEdge).is_empty());
    }

    #[test]
    fn hip_roof_thickens_into_a_closed_shell() {
        let mut mesh = Mesh::new();
        let f = footprint(&mut mesh, &[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (0.0, 2.0)], 0.0);
        let hips = build_roof(&mut mesh, &[f], &params(RoofKind::Hip), &BuildConfig::default()).unwrap();
        let roof = thicken_roof(&mut mesh, &hips, 0.1, 0.1).unwrap();

        assert!(roof.len() > hips.len());
        assert_relative_eq!(max_z(&mesh, &roof), 1.1, epsilon = 1e-3);
        for &face in &roof {
            assert!(mesh.face_normal(face).unwrap().z > 0.0);
            assert_eq!(mesh.category(face), Some(FaceCategory::Roof));
        }
        assert!(!mesh.faces_in_category(FaceCategory::RoofEdge).is_empty());

        // Eaves hang past the footprint and drop below it
        let all: Vec<VertexKey> = mesh.vertex_keys().collect();
        let points = mesh.points(&all);
        let (lo, hi) = archgen_mesh::bounds(&points).unwrap();
        assert_relative_eq!(lo.x, -0.1, epsilon = 1e-9);
        assert_relative_eq!(hi.x, 4.1, epsilon = 1e-9);
        assert_relative_eq!(hi.y, 2.1, epsilon = 1e-9);
        assert_relative_eq!(lo.z, -0.05, epsilon = 1e-9);

        // Still closed by the footprint underneath
        for e in mesh.edge_keys() {
            assert_eq!(mesh.edge_faces(e).len(), 2);
        }
    }

    #[test]
    fn roof_rises_from_the_mean_face_level() {
        // Three strips; the last one tilts up to 0.6 at its far edge
        let mut mesh = Mesh::new();
        let lo: Vec<VertexKey> = (0..4).map(|i| mesh.add_vertex(i as f64, 0.0, 0.0)).collect();
        let hi: Vec<VertexKey> = (0..4).map(|i| mesh.add_vertex(i as f64, 1.0, 0.0)).collect();
        let strips: Vec<FaceKey> = (0..3)
            .map(|i| mesh.add_face(&[lo[i], lo[i + 1], hi[i + 1], hi[i]]).unwrap())
            .collect();
        mesh.translate(&[lo[3], hi[3]], &Vector3::new(0.0, 0.0, 0.6));

        let roof = build_roof(&mut mesh, &strips, &params(RoofKind::Hip), &BuildConfig::default()).unwrap();
        // Centers at 0, 0 and 0.3
        assert_relative_eq!(max_z(&mesh, &roof), 1.1, epsilon = 1e-3);
    }
}
