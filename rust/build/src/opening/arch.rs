// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arched tops.
//!
//! The top band of an opening span is cut along a curve running from its
//! bottom left to its bottom right corner. The part below the curve joins
//! the hole; the spandrels above stay wall.

use std::f64::consts::PI;

use archgen_mesh::{FaceKey, LocalFrame, Mesh};
use nalgebra::Point3;

use crate::error::{Error, Result};
use crate::params::{ArchFunction, ArchParams};

/// Points strictly between the ends of a chord of length `chord`, as
/// `(along, rise)` offsets from its left end.
pub fn arc_profile(params: &ArchParams, chord: f64, rise: f64) -> Vec<(f64, f64)> {
    let n = params.resolution.max(1);
    let steps = (n + 1) as f64;
    match params.function {
        ArchFunction::Sine => (1..=n)
            .map(|i| {
                let t = i as f64 / steps;
                (t * chord, rise * (PI * t).sin())
            })
            .collect(),
        ArchFunction::Sphere => {
            let half = chord / 2.0;
            let offset = params.offset.max(0.0);
            let radius = offset.hypot(half);
            let circular = radius - offset;
            if circular <= 1e-9 {
                return Vec::new();
            }
            let start = (half / radius).acos();
            let sweep = (PI - 2.0 * start) / steps;
            (1..=n)
                .map(|i| {
                    let angle = PI - start - sweep * i as f64;
                    let along = half + angle.cos() * radius;
                    let up = (angle.sin() * radius - offset) * (rise / circular);
                    (along, up)
                })
                .collect()
        }
    }
}

/// Cuts `band` along an arc over its bottom edge. Returns the face below
/// the arc.
///
/// `rise` must leave room under the top of the band so the spandrels stay
/// connected.
pub fn cut_arch(
    mesh: &mut Mesh,
    band: FaceKey,
    frame: &LocalFrame,
    params: &ArchParams,
    rise: f64,
) -> Result<FaceKey> {
    let verts = mesh.face_vertices(band).to_vec();
    let up = frame.y;
    let along = frame.x;
    let lowest = verts
        .iter()
        .filter_map(|&v| mesh.vertex_point(v).map(|p| p.coords.dot(&up)))
        .fold(f64::INFINITY, f64::min);
    let bottom: Vec<_> = verts
        .iter()
        .copied()
        .filter(|&v| {
            mesh.vertex_point(v)
                .is_some_and(|p| (p.coords.dot(&up) - lowest).abs() < archgen_mesh::EPSILON)
        })
        .collect();
    let bottom = mesh.sort_vertices(&bottom, &along);
    let (Some(&left), Some(&right)) = (bottom.first(), bottom.last()) else {
        return Err(Error::Geometry("arch band has no bottom edge"));
    };
    let top = verts
        .iter()
        .copied()
        .max_by(|&a, &b| {
            let h = |v| mesh.vertex_point(v).map_or(f64::NEG_INFINITY, |p| p.coords.dot(&up));
            h(a).total_cmp(&h(b))
        })
        .ok_or(Error::Geometry("arch band is empty"))?;

    let start = mesh.point(left)?;
    let chord = (mesh.point(right)? - start).dot(&along);
    let path: Vec<Point3<f64>> = arc_profile(params, chord, rise)
        .into_iter()
        .map(|(x, y)| start + along * x + up * y)
        .collect();
    if path.is_empty() {
        return Err(Error::Geometry("arch has no curve"));
    }

    let split = mesh.split_face_path(band, left, right, &path)?;
    let arch = if mesh.face_vertices(split.first).contains(&top) {
        split.second
    } else {
        split.first
    };
    tracing::trace!(points = path.len(), chord, rise, "Arch cut");
    Ok(arch)
}

/// Highest rise the arch may take in a span of `height`, leaving `margin`
/// of wall above the apex.
pub fn arch_band(params: &ArchParams, height: f64, margin: f64) -> Option<(f64, f64)> {
    let band = (params.height + margin).min(height / 2.0);
    let rise = band - margin;
    (rise > archgen_mesh::EPSILON).then_some((band, rise))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn sphere_profile_peaks_at_the_middle() {
        let params = ArchParams {
            resolution: 11,
            ..ArchParams::default()
        };
        let points = arc_profile(&params, 2.0, 0.4);
        assert_eq!(points.len(), 11);
        let apex = points[5];
        assert_relative_eq!(apex.0, 1.0, epsilon = 1e-9);
        assert_relative_eq!(apex.1, 0.4, epsilon = 1e-9);
        for w in points.windows(2) {
            assert!(w[1].0 > w[0].0);
        }
        assert!(points.iter().all(|p| p.1 > 0.0 && p.1 <= 0.4 + 1e-9));
    }

    #[test]
    fn sine_profile_is_symmetric() {
        let params = ArchParams {
            function: ArchFunction::Sine,
            resolution: 4,
            ..ArchParams::default()
        };
        let points = arc_profile(&params, 1.0, 0.3);
        assert_eq!(points.len(), 4);
        assert_relative_eq!(points[0].1, points[3].1, epsilon = 1e-12);
        assert_relative_eq!(points[1].1, points[2].1, epsilon = 1e-12);
    }

    #[test]
    fn band_leaves_room_above_the_apex() {
        let params = ArchParams::default();
        let (band, rise) = arch_band(&params, 2.0, 0.05).unwrap();
        assert_relative_eq!(band, 0.45, epsilon = 1e-12);
        assert_relative_eq!(rise, 0.4, epsilon = 1e-12);
        assert!(arch_band(&params, 0.05, 0.05).is_none());
    }

    #[test]
    fn cut_keeps_the_lower_part() {
        let mut mesh = Mesh::new();
        let band = mesh
            .add_face_from_points(&[
                Point3::new(0.0, 0.0, 2.0),
                Point3::new(2.0, 0.0, 2.0),
                Point3::new(2.0, 0.0, 2.45),
                Point3::new(0.0, 0.0, 2.45),
            ])
            .unwrap();
        let frame = mesh.local_frame(band).unwrap();
        let arch = cut_arch(&mut mesh, band, &frame, &ArchParams::default(), 0.4).unwrap();
        assert_eq!(mesh.face_count(), 2);
        let highest = mesh
            .points(mesh.face_vertices(arch))
            .iter()
            .map(|p| p.z)
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(highest < 2.45 - 0.04);
        assert!(mesh.face_normal(arch).unwrap().dot(&-Vector3::y()) > 0.99);
    }
}
