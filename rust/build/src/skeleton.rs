// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Straight skeleton of a simple polygon.
//!
//! The polygon boundary is simulated as a wavefront: every edge moves
//! inward at unit speed and every wavefront vertex slides along the
//! bisector of its two edge lines. The simulation jumps from event to
//! event:
//!
//! - **edge event**: an edge shrinks to zero and its two vertices merge;
//! - **split event**: a reflex vertex runs into a non-adjacent edge and
//!   the wavefront ring splits in two.
//!
//! After every event, vertices that coincide are merged (adjacent) or the
//! ring is pinched apart (non-adjacent), which covers simultaneous events
//! such as the apex of a square. Rings reduced to two vertices close as a
//! ridge. The time of an event is the height of the node it creates.
//!
//! [`SkeletonMode::Gable`] post-processes the hip skeleton: every hip end
//! (a polygon edge whose two corner arcs meet in one node) has that node
//! moved onto the edge midpoint, turning the end triangle vertical.

use nalgebra::{Point2, Vector2};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};

/// Events closer in time than this count as simultaneous.
const TIME_TIE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkeletonMode {
    #[default]
    Hip,
    Gable,
}

/// A skeleton vertex: a polygon corner (height zero) or an event point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkeletonNode {
    pub point: Point2<f64>,
    /// Distance the wavefront travelled before reaching this node.
    pub height: f64,
}

/// An arc bundle: one source node and the lower nodes it terminates into.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonArc {
    pub source: Point2<f64>,
    pub height: f64,
    pub sinks: Vec<Point2<f64>>,
}

/// Straight skeleton as a graph over polygon corners and event nodes.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    /// Polygon corners first, in input order, then event nodes.
    pub nodes: Vec<SkeletonNode>,
    /// Undirected links, each stored once with the smaller index first.
    pub arcs: Vec<(usize, usize)>,
    corners: usize,
}

impl Skeleton {
    /// Computes the skeleton of a counter-clockwise polygon without
    /// collinear corners.
    pub fn compute(outline: &[Point2<f64>], mode: SkeletonMode, max_events: usize) -> Result<Self> {
        if outline.len() < 3 {
            return Err(Error::Skeleton(format!(
                "outline needs three corners, got {}",
                outline.len()
            )));
        }
        if signed_area(outline) <= 0.0 {
            return Err(Error::Skeleton("outline is not counter-clockwise".into()));
        }

        let mut front = Wavefront::new(outline)?;
        front.run(max_events)?;
        let mut skeleton = Skeleton {
            nodes: front.nodes,
            arcs: front.arcs,
            corners: outline.len(),
        };
        if mode == SkeletonMode::Gable {
            skeleton.raise_gables();
        }
        Ok(skeleton)
    }

    pub fn corner_count(&self) -> usize {
        self.corners
    }

    pub fn is_corner(&self, node: usize) -> bool {
        node < self.corners
    }

    pub fn max_height(&self) -> f64 {
        self.nodes.iter().map(|n| n.height).fold(0.0, f64::max)
    }

    pub fn neighbors(&self, node: usize) -> Vec<usize> {
        self.arcs
            .iter()
            .filter_map(|&(a, b)| {
                if a == node {
                    Some(b)
                } else if b == node {
                    Some(a)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Arcs grouped by their upper end.
    pub fn arcs_by_source(&self) -> Vec<SkeletonArc> {
        let below = |a: usize, b: usize| {
            let (ha, hb) = (self.nodes[a].height, self.nodes[b].height);
            ha < hb || (ha == hb && a < b)
        };
        (self.corners..self.nodes.len())
            .filter_map(|i| {
                let sinks: Vec<Point2<f64>> = self
                    .neighbors(i)
                    .into_iter()
                    .filter(|&j| below(j, i))
                    .map(|j| self.nodes[j].point)
                    .collect();
                (!sinks.is_empty()).then(|| SkeletonArc {
                    source: self.nodes[i].point,
                    height: self.nodes[i].height,
                    sinks,
                })
            })
            .collect()
    }

    fn link(&mut self, a: usize, b: usize) {
        let arc = (a.min(b), a.max(b));
        if a != b && !self.arcs.contains(&arc) {
            self.arcs.push(arc);
        }
    }

    fn sole_neighbor(&self, node: usize) -> Option<usize> {
        match self.neighbors(node).as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Moves hip-end apexes onto their edge midpoints.
    fn raise_gables(&mut self) {
        let n = self.corners;
        let mut ends: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
        for i in 0..n {
            let j = (i + 1) % n;
            if let (Some(a), Some(b)) = (self.sole_neighbor(i), self.sole_neighbor(j)) {
                if a == b && a >= n {
                    ends.entry(a).or_default().push(i);
                }
            }
        }
        let mut ends: Vec<(usize, Vec<usize>)> = ends.into_iter().collect();
        ends.sort_by_key(|(node, _)| *node);

        let corner = |s: &Self, i: usize| s.nodes[i % n].point;
        for (node, edges) in ends {
            let first = edges[0];
            let dir = |s: &Self, e: usize| (corner(s, e + 1) - corner(s, e)).normalize();
            let mid = |s: &Self, e: usize| nalgebra::center(&corner(s, e), &corner(s, e + 1));

            // A four-way apex needs a second end on the opposite side
            let partner = edges[1..]
                .iter()
                .copied()
                .map(|e| (e, dir(self, e).dot(&dir(self, first))))
                .filter(|&(_, d)| d < -0.9)
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(e, _)| e);

            let apex = mid(self, first);
            match partner {
                None => self.nodes[node].point = apex,
                Some(other) => {
                    let far = mid(self, other);
                    let twin = self.nodes.len();
                    self.nodes.push(SkeletonNode {
                        point: far,
                        height: self.nodes[node].height,
                    });
                    self.nodes[node].point = apex;
                    for k in 0..self.arcs.len() {
                        let (a, b) = self.arcs[k];
                        let other_end = if a == node {
                            b
                        } else if b == node {
                            a
                        } else {
                            continue;
                        };
                        let p = self.nodes[other_end].point;
                        if (p - far).norm() < (p - apex).norm() {
                            self.arcs[k] = (other_end.min(twin), other_end.max(twin));
                        }
                    }
                    self.link(node, twin);
                }
            }
        }
    }
}

/// Twice the signed area; positive for counter-clockwise loops.
pub fn signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (a, b) = (points[i], points[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum()
}

/// Supporting line of a polygon edge.
#[derive(Debug, Clone, Copy)]
struct Line {
    origin: Point2<f64>,
    dir: Vector2<f64>,
    /// Inward unit normal.
    normal: Vector2<f64>,
}

impl Line {
    fn through(a: Point2<f64>, b: Point2<f64>) -> Option<Self> {
        let dir = (b - a).try_normalize(1e-12)?;
        Some(Self {
            origin: a,
            dir,
            normal: Vector2::new(-dir.y, dir.x),
        })
    }

    /// Signed distance of `p` from the line after moving inward for `t`.
    fn distance(&self, p: &Point2<f64>, t: f64) -> f64 {
        self.normal.dot(&(p - self.origin)) - t
    }
}

#[derive(Debug, Clone, Copy)]
struct WaveVertex {
    origin: Point2<f64>,
    born: f64,
    /// `None` between antiparallel lines: the vertex sits on a ridge.
    velocity: Option<Vector2<f64>>,
    node: usize,
    line_in: usize,
    line_out: usize,
}

impl WaveVertex {
    fn at(&self, t: f64) -> Point2<f64> {
        match self.velocity {
            Some(v) => self.origin + v * (t - self.born),
            None => self.origin,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum EventKind {
    Edge { lav: usize, index: usize },
    Split { lav: usize, index: usize, edge: usize },
}

#[derive(Debug, Clone, Copy)]
struct Event {
    time: f64,
    kind: EventKind,
}

impl Event {
    fn is_edge(&self) -> bool {
        matches!(self.kind, EventKind::Edge { .. })
    }

    fn precedes(&self, other: &Event) -> bool {
        self.time < other.time - TIME_TIE
            || (self.time < other.time + TIME_TIE && self.is_edge() && !other.is_edge())
    }
}

struct Wavefront {
    lines: Vec<Line>,
    /// Active wavefront rings, counter-clockwise.
    lavs: Vec<Vec<WaveVertex>>,
    nodes: Vec<SkeletonNode>,
    arcs: Vec<(usize, usize)>,
    eps: f64,
    time: f64,
}

impl Wavefront {
    fn new(outline: &[Point2<f64>]) -> Result<Self> {
        let n = outline.len();
        let lines = (0..n)
            .map(|i| Line::through(outline[i], outline[(i + 1) % n]))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| Error::Skeleton("outline has a zero-length edge".into()))?;

        let (mut lo, mut hi) = (outline[0], outline[0]);
        for p in outline {
            lo = lo.inf(p);
            hi = hi.sup(p);
        }
        let eps = 1e-7 * (hi - lo).norm().max(1.0);

        let mut front = Self {
            lines,
            lavs: Vec::new(),
            nodes: outline
                .iter()
                .map(|&point| SkeletonNode { point, height: 0.0 })
                .collect(),
            arcs: Vec::new(),
            eps,
            time: 0.0,
        };
        let ring = (0..n)
            .map(|i| front.vertex(outline[i], 0.0, i, (i + n - 1) % n, i))
            .collect();
        front.lavs.push(ring);
        Ok(front)
    }

    fn run(&mut self, max_events: usize) -> Result<()> {
        let mut events = 0;
        while let Some(event) = self.next_event() {
            events += 1;
            if events > max_events {
                return Err(Error::Skeleton(format!(
                    "no convergence after {max_events} events"
                )));
            }
            let t = event.time.max(self.time);
            self.time = t;
            match event.kind {
                EventKind::Edge { lav, index } => self.edge_event(lav, index, t),
                EventKind::Split { lav, index, edge } => self.split_event(lav, index, edge, t),
            }
        }
        let rest = std::mem::take(&mut self.lavs);
        for lav in rest {
            self.close_strip(&lav)?;
        }
        tracing::debug!(events, nodes = self.nodes.len(), arcs = self.arcs.len(), "Straight skeleton complete");
        Ok(())
    }

    /// Velocity keeping both edge lines moving inward at unit speed.
    fn velocity(&self, line_in: usize, line_out: usize) -> Option<Vector2<f64>> {
        let n1 = self.lines[line_in].normal;
        let n2 = self.lines[line_out].normal;
        let det = n1.perp(&n2);
        if det.abs() < 1e-9 {
            return (n1.dot(&n2) > 0.0).then_some(n1);
        }
        Some(Vector2::new(n2.y - n1.y, n1.x - n2.x) / det)
    }

    fn vertex(&self, origin: Point2<f64>, born: f64, node: usize, line_in: usize, line_out: usize) -> WaveVertex {
        WaveVertex {
            origin,
            born,
            velocity: self.velocity(line_in, line_out),
            node,
            line_in,
            line_out,
        }
    }

    fn is_reflex(&self, v: &WaveVertex) -> bool {
        self.lines[v.line_in].dir.perp(&self.lines[v.line_out].dir) < -1e-9
    }

    fn node_at(&mut self, point: Point2<f64>, height: f64) -> usize {
        let eps = self.eps;
        if let Some(i) = self
            .nodes
            .iter()
            .position(|n| (n.point - point).norm() < eps && (n.height - height).abs() < eps)
        {
            return i;
        }
        self.nodes.push(SkeletonNode { point, height });
        self.nodes.len() - 1
    }

    fn link(&mut self, a: usize, b: usize) {
        let arc = (a.min(b), a.max(b));
        if a != b && !self.arcs.contains(&arc) {
            self.arcs.push(arc);
        }
    }

    /// Node where `v` is at time `t`, linked from where it started.
    fn arrive(&mut self, v: &WaveVertex, t: f64) -> usize {
        if v.velocity.is_none() {
            return v.node;
        }
        let node = self.node_at(v.at(t), t);
        self.link(v.node, node);
        node
    }

    fn next_event(&self) -> Option<Event> {
        let mut best: Option<Event> = None;
        let mut keep = |e: Event| {
            if best.as_ref().map_or(true, |b| e.precedes(b)) {
                best = Some(e);
            }
        };
        for (li, lav) in self.lavs.iter().enumerate() {
            let n = lav.len();
            for i in 0..n {
                if let Some(e) = self.find_edge_event(li, i) {
                    keep(e);
                }
                if !self.is_reflex(&lav[i]) {
                    continue;
                }
                for k in 0..n {
                    if k == i || (k + 1) % n == i {
                        continue;
                    }
                    if let Some(e) = self.find_split_event(li, i, k) {
                        keep(e);
                    }
                }
            }
        }
        best
    }

    fn find_edge_event(&self, li: usize, i: usize) -> Option<Event> {
        let lav = &self.lavs[li];
        let (a, b) = (&lav[i], &lav[(i + 1) % lav.len()]);
        let (va, vb) = (a.velocity?, b.velocity?);
        let dv = va - vb;
        let denom = dv.norm_squared();
        if denom < 1e-18 {
            return None;
        }
        let gap = b.at(self.time) - a.at(self.time);
        let s = gap.dot(&dv) / denom;
        if s < -self.eps || (gap - dv * s).norm() > self.eps * 10.0 {
            return None;
        }
        Some(Event {
            time: self.time + s.max(0.0),
            kind: EventKind::Edge { lav: li, index: i },
        })
    }

    fn find_split_event(&self, li: usize, i: usize, k: usize) -> Option<Event> {
        let lav = &self.lavs[li];
        let n = lav.len();
        let v = &lav[i];
        let vel = v.velocity?;
        let (a, b) = (&lav[k], &lav[(k + 1) % n]);
        let line = &self.lines[a.line_out];
        let denom = 1.0 - line.normal.dot(&vel);
        if denom < 1e-9 {
            return None;
        }
        let p = v.at(self.time);
        let s = line.distance(&p, self.time) / denom;
        if s < -self.eps {
            return None;
        }
        let s = s.max(0.0);
        let t = self.time + s;
        let hit = p + vel * s;

        // The edge as it stands at the moment of impact
        let (ea, eb) = (a.at(t), b.at(t));
        let span = eb - ea;
        let len2 = span.norm_squared();
        if len2 < self.eps * self.eps || span.dot(&line.dir) <= 0.0 {
            return None;
        }
        let u = (hit - ea).dot(&span) / len2;
        let tol = self.eps / len2.sqrt();
        if u < -tol || u > 1.0 + tol {
            return None;
        }
        Some(Event {
            time: t,
            kind: EventKind::Split { lav: li, index: i, edge: k },
        })
    }

    fn edge_event(&mut self, li: usize, i: usize, t: f64) {
        let mut lav = self.lavs.swap_remove(li);
        let n = lav.len();
        let j = (i + 1) % n;
        let (a, b) = (lav[i], lav[j]);
        let node = self.arrive(&a, t);
        let other = self.arrive(&b, t);
        self.link(node, other);

        if n <= 3 {
            if n == 3 {
                let c = lav[(j + 1) % n];
                let end = self.arrive(&c, t);
                self.link(node, end);
            }
            return;
        }
        lav[i] = self.vertex(self.nodes[node].point, t, node, a.line_in, b.line_out);
        lav.remove(j);
        self.settle(lav, t);
    }

    fn split_event(&mut self, li: usize, i: usize, k: usize, t: f64) {
        let lav = self.lavs.swap_remove(li);
        let n = lav.len();
        let v = lav[i];
        let edge_line = lav[k].line_out;
        let node = self.arrive(&v, t);
        let point = self.nodes[node].point;

        let mut first = vec![self.vertex(point, t, node, v.line_in, edge_line)];
        first.extend(chain(&lav, (k + 1) % n, i));
        let mut second = vec![self.vertex(point, t, node, edge_line, v.line_out)];
        second.extend(chain(&lav, (i + 1) % n, (k + 1) % n));
        self.settle(first, t);
        self.settle(second, t);
    }

    /// Merges coincident vertices and pinches rings apart until every ring
    /// is clean, then returns the survivors to the active set.
    fn settle(&mut self, lav: Vec<WaveVertex>, t: f64) {
        let mut pending = vec![lav];
        while let Some(mut lav) = pending.pop() {
            if lav.len() <= 2 {
                let ends: Vec<usize> = lav.iter().map(|v| self.arrive(v, t)).collect();
                if let [a, b] = ends[..] {
                    self.link(a, b);
                }
                continue;
            }
            let n = lav.len();
            let pos: Vec<Point2<f64>> = lav.iter().map(|v| v.at(t)).collect();

            if let Some(i) = (0..n).find(|&i| (pos[i] - pos[(i + 1) % n]).norm() < self.eps) {
                let j = (i + 1) % n;
                let (a, b) = (lav[i], lav[j]);
                let node = self.arrive(&a, t);
                let other = self.arrive(&b, t);
                self.link(node, other);
                lav[i] = self.vertex(pos[i], t, node, a.line_in, b.line_out);
                lav.remove(j);
                pending.push(lav);
                continue;
            }

            let pinch = (0..n)
                .flat_map(|i| (i + 2..n).map(move |k| (i, k)))
                .filter(|&(i, k)| !(i == 0 && k == n - 1))
                .find(|&(i, k)| (pos[i] - pos[k]).norm() < self.eps);
            if let Some((i, k)) = pinch {
                let (a, b) = (lav[i], lav[k]);
                let node = self.arrive(&a, t);
                let other = self.arrive(&b, t);
                self.link(node, other);
                let mut first = vec![self.vertex(pos[i], t, node, a.line_in, b.line_out)];
                first.extend(chain(&lav, (k + 1) % n, i));
                let mut second = vec![self.vertex(pos[i], t, node, b.line_in, a.line_out)];
                second.extend(chain(&lav, (i + 1) % n, k));
                pending.push(first);
                pending.push(second);
                continue;
            }
            self.lavs.push(lav);
        }
    }

    /// Closes a ring that has no events left. Its vertices must lie on one
    /// line; they are linked in order along it.
    fn close_strip(&mut self, lav: &[WaveVertex]) -> Result<()> {
        let t = self.time;
        let pos: Vec<Point2<f64>> = lav.iter().map(|v| v.at(t)).collect();
        let Some((a, b)) = pos
            .iter()
            .flat_map(|p| pos.iter().map(move |q| (*p, *q)))
            .max_by(|x, y| (x.0 - x.1).norm().total_cmp(&(y.0 - y.1).norm()))
        else {
            return Ok(());
        };
        let Some(dir) = (b - a).try_normalize(1e-12) else {
            // Everything collapsed into one point
            let ends: Vec<usize> = lav.iter().map(|v| self.arrive(v, t)).collect();
            for w in ends.windows(2) {
                self.link(w[0], w[1]);
            }
            return Ok(());
        };
        let normal = Vector2::new(-dir.y, dir.x);
        if pos.iter().any(|p| (p - a).dot(&normal).abs() > self.eps * 1e3) {
            return Err(Error::Skeleton("wavefront stalled before collapsing".into()));
        }
        let mut order: Vec<usize> = (0..lav.len()).collect();
        order.sort_by(|&x, &y| (pos[x] - a).dot(&dir).total_cmp(&(pos[y] - a).dot(&dir)));
        let ends: Vec<usize> = order.iter().map(|&i| self.arrive(&lav[i], t)).collect();
        for w in ends.windows(2) {
            self.link(w[0], w[1]);
        }
        Ok(())
    }
}

/// Ring elements from `from` up to, not including, `to`.
fn chain(lav: &[WaveVertex], from: usize, to: usize) -> Vec<WaveVertex> {
    let n = lav.len();
    let mut out = Vec::new();
    let mut k = from % n;
    while k != to % n {
        out.push(lav[k]);
        k = (k + 1) % n;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point2<f64>> {
        coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    fn inner(s: &Skeleton) -> Vec<SkeletonNode> {
        s.nodes[s.corner_count()..].to_vec()
    }

    #[test]
    fn rectangle_hip_has_one_ridge() {
        let outline = pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (0.0, 2.0)]);
        let s = Skeleton::compute(&outline, SkeletonMode::Hip, 1000).unwrap();
        let nodes = inner(&s);
        assert_eq!(nodes.len(), 2);
        for n in &nodes {
            assert_relative_eq!(n.height, 1.0, epsilon = 1e-9);
            assert_relative_eq!(n.point.y, 1.0, epsilon = 1e-9);
        }
        assert_eq!(s.arcs.len(), 5);
        for corner in 0..4 {
            assert_eq!(s.neighbors(corner).len(), 1);
        }
    }

    #[test]
    fn rectangle_gable_ridge_spans_the_length() {
        let outline = pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (0.0, 2.0)]);
        let s = Skeleton::compute(&outline, SkeletonMode::Gable, 1000).unwrap();
        let mut xs: Vec<f64> = inner(&s).iter().map(|n| n.point.x).collect();
        xs.sort_by(f64::total_cmp);
        assert_relative_eq!(xs[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(xs[1], 4.0, epsilon = 1e-9);
    }

    #[test]
    fn square_hip_is_a_pyramid() {
        let outline = pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let s = Skeleton::compute(&outline, SkeletonMode::Hip, 1000).unwrap();
        let nodes = inner(&s);
        assert_eq!(nodes.len(), 1);
        assert_relative_eq!(nodes[0].point.x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(nodes[0].height, 2.0, epsilon = 1e-9);
        assert_eq!(s.arcs.len(), 4);
    }

    #[test]
    fn square_gable_splits_the_apex() {
        let outline = pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        let s = Skeleton::compute(&outline, SkeletonMode::Gable, 1000).unwrap();
        let nodes = inner(&s);
        assert_eq!(nodes.len(), 2);
        assert_eq!(s.arcs.len(), 5);
        let ridge: Vec<&(usize, usize)> = s
            .arcs
            .iter()
            .filter(|(a, b)| !s.is_corner(*a) && !s.is_corner(*b))
            .collect();
        assert_eq!(ridge.len(), 1);
    }

    #[test]
    fn l_shape_joins_both_arms() {
        let outline = pts(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 2.0),
            (2.0, 2.0),
            (2.0, 4.0),
            (0.0, 4.0),
        ]);
        let s = Skeleton::compute(&outline, SkeletonMode::Hip, 1000).unwrap();
        assert_eq!(inner(&s).len(), 3);
        assert_eq!(s.arcs.len(), 8);
        assert_relative_eq!(s.max_height(), 1.0, epsilon = 1e-9);
        // Reflex corner runs into the valley node
        let valley = s.neighbors(3);
        assert_eq!(valley.len(), 1);
        assert_relative_eq!(s.nodes[valley[0]].point.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(s.nodes[valley[0]].point.y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn right_triangle_meets_at_incenter() {
        let outline = pts(&[(0.0, 0.0), (4.0, 0.0), (0.0, 3.0)]);
        let s = Skeleton::compute(&outline, SkeletonMode::Hip, 100).unwrap();
        let nodes = inner(&s);
        assert_eq!(nodes.len(), 1);
        assert_relative_eq!(nodes[0].point.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(nodes[0].point.y, 1.0, epsilon = 1e-9);
        assert_relative_eq!(nodes[0].height, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn arcs_group_under_their_upper_node() {
        let outline = pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (0.0, 2.0)]);
        let s = Skeleton::compute(&outline, SkeletonMode::Hip, 1000).unwrap();
        let arcs = s.arcs_by_source();
        let sinks: usize = arcs.iter().map(|a| a.sinks.len()).sum();
        assert_eq!(sinks, s.arcs.len());
    }

    #[test]
    fn clockwise_outline_is_rejected() {
        let outline = pts(&[(0.0, 0.0), (0.0, 2.0), (4.0, 2.0), (4.0, 0.0)]);
        assert!(matches!(
            Skeleton::compute(&outline, SkeletonMode::Hip, 100),
            Err(Error::Skeleton(_))
        ));
    }
}
