// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-face opening context: host dimensions, the facing wall, and the
//! limits an opening must stay within.
//!
//! The context is computed once per host face when a build starts and is
//! threaded through the composer unchanged.

use archgen_mesh::{FaceKey, Mesh};

use crate::config::BuildConfig;
use crate::params::SizeOffset;

/// Smallest opening size along either axis.
pub const MIN_OPENING_SIZE: [f64; 2] = [0.1, 0.1];

/// The wall face on the other side of a host face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OppositeWall {
    pub face: FaceKey,
    pub width: f64,
    pub height: f64,
    /// Center offset in the host face's local `x`/`y`.
    pub relative: (f64, f64),
    /// Distance between the two planes; infinite when they are not level.
    pub thickness: f64,
}

impl OppositeWall {
    /// Whether the facing wall is close enough to cut through.
    pub fn linkable(&self) -> bool {
        self.relative.0.hypot(self.relative.1) < 0.5
    }
}

/// Region of a host face an opening may occupy, in local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl Limits {
    /// Limits of a `width` x `height` face, narrowed by the facing wall.
    pub fn new(width: f64, height: f64, opposite: Option<&OppositeWall>, inset: f64) -> Self {
        let (ow, oh, (rx, ry)) = match opposite {
            Some(o) => (o.width, o.height, o.relative),
            None => (width, height, (0.0, 0.0)),
        };
        Self {
            left: (width / 2.0 - (ow / 2.0 - rx)).max(0.0) + inset,
            right: width - (width / 2.0 - ow / 2.0 - rx).max(0.0) - inset,
            bottom: (height / 2.0 - (oh / 2.0 - ry)).min(0.0) + inset,
            top: height - (height / 2.0 - oh / 2.0 - ry).max(0.0) - inset,
        }
    }

    /// Clamps `size` so an opening at `offset` stays inside.
    pub fn restricted_size(&self, offset: [f64; 2], min: [f64; 2], size: [f64; 2]) -> [f64; 2] {
        let max_x = (self.right - self.left).min(self.right - offset[0]);
        let max_y = (self.top - self.bottom).min(self.top - offset[1]);
        [clamp(size[0], min[0], max_x), clamp(size[1], min[1], max_y)]
    }

    /// Clamps `offset` so an opening of `size` stays inside.
    pub fn restricted_offset(&self, size: [f64; 2], offset: [f64; 2]) -> [f64; 2] {
        [
            clamp(offset[0], self.left, self.right - size[0]),
            clamp(offset[1], self.bottom, self.top - size[1]),
        ]
    }
}

/// `value` limited to `[lo, hi]`; `lo` wins when the range is empty.
fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.min(hi).max(lo)
}

/// Everything an opening build needs to know about its host face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpeningContext {
    pub face: FaceKey,
    pub width: f64,
    pub height: f64,
    pub opposite: Option<OppositeWall>,
    pub limits: Limits,
    /// Resolved opening size.
    pub size: [f64; 2],
    /// Resolved opening offset from the face's bottom left corner.
    pub offset: [f64; 2],
}

impl OpeningContext {
    /// Resolves the placement of an opening in `face`.
    ///
    /// `default_size` applies when the request leaves the size open; the
    /// default offset centers the opening horizontally at sill height 0.8.
    pub fn new(
        mesh: &Mesh,
        face: FaceKey,
        request: &SizeOffset,
        default_size: [f64; 2],
        config: &BuildConfig,
    ) -> Self {
        let (width, height) = mesh.face_dimensions(face);
        let opposite = find_opposite(mesh, face, config.equal_epsilon);
        let limits = Limits::new(width, height, opposite.as_ref(), config.limit_inset);

        let size = request.size.unwrap_or(default_size);
        let wanted_offset = request
            .offset
            .unwrap_or([(width - size[0]) / 2.0, 0.8]);
        let offset = limits.restricted_offset(size, wanted_offset);
        let size = limits.restricted_size(offset, MIN_OPENING_SIZE, size);

        if request.size.is_some_and(|s| s != size) {
            tracing::warn!(
                requested_x = request.size.map(|s| s[0]),
                size_x = size[0],
                size_y = size[1],
                "Opening size clamped to host face"
            );
        }
        if request.offset.is_some_and(|o| o != offset) {
            tracing::warn!(
                offset_x = offset[0],
                offset_y = offset[1],
                "Opening offset clamped to host face"
            );
        }

        Self {
            face,
            width,
            height,
            opposite,
            limits,
            size,
            offset,
        }
    }

    /// Offset of the same opening seen from the facing wall.
    pub fn opposite_offset(&self) -> Option<[f64; 2]> {
        let o = self.opposite?;
        let shift = self.width / 2.0 - o.width / 2.0 - o.relative.0;
        Some([self.width - self.offset[0] - self.size[0] - shift, self.offset[1]])
    }

    /// Wall thickness, infinite without a level facing wall.
    pub fn wall_thickness(&self) -> f64 {
        self.opposite.map_or(f64::INFINITY, |o| o.thickness)
    }
}

/// Nearest face pointing the opposite way to `face`.
pub fn find_opposite(mesh: &Mesh, face: FaceKey, epsilon: f64) -> Option<OppositeWall> {
    let normal = mesh.face_normal(face)?;
    let center = mesh.face_center_bounds(face)?;
    let other = mesh
        .face_keys()
        .filter(|&f| f != face)
        .filter(|&f| mesh.face_normal(f).is_some_and(|n| n.dot(&normal) < -1.0 + epsilon))
        .filter_map(|f| mesh.face_center_bounds(f).map(|c| (f, (c - center).norm())))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(f, _)| f)?;

    let (width, height) = mesh.face_dimensions(other);
    let relative = mesh.relative_offset(face, other)?;
    let thickness = if relative.1.abs() < epsilon {
        let c = mesh.face_center_bounds(other)?;
        (c - center).dot(&normal).abs()
    } else {
        f64::INFINITY
    };
    Some(OppositeWall {
        face: other,
        width,
        height,
        relative,
        thickness,
    })
}
