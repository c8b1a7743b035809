// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement of door knobs and window handles.
//!
//! Hardware is not modelled here. Each piece becomes an asset placeholder
//! naming the model to import and where it goes; the host resolves the
//! name through [`crate::MeshHost::import_asset`].

use archgen_mesh::LocalFrame;
use nalgebra::{Point3, Vector3};

use crate::objects::{GeneratedObject, ObjectKind, Placement};
use crate::params::{HardwareKind, Hinge};

/// Knobs sit this far in from the leaf edge opposite the hinge.
const EDGE_INSET: f64 = 0.06;
const KNOB_HEIGHT: f64 = 1.0;
const HANDLE_HEIGHT: f64 = 0.5;

/// Leaf a piece of hardware is mounted on.
#[derive(Debug, Clone, Copy)]
pub struct Mount<'a> {
    /// Frame of the host wall face.
    pub frame: &'a LocalFrame,
    /// Hinge side bottom corner on the leaf's back plane.
    pub origin: Point3<f64>,
    pub width: f64,
    pub thickness: f64,
    pub hinge: Hinge,
    pub flip: bool,
}

impl Mount<'_> {
    /// Leaf axes: `x` away from the hinge's wall side, `z` out of the leaf front.
    fn axes(&self) -> (Vector3<f64>, Vector3<f64>) {
        if self.flip {
            (-self.frame.x, -self.frame.z)
        } else {
            (self.frame.x, self.frame.z)
        }
    }

    /// +1 when the far edge lies along the leaf's `x`.
    fn side(&self) -> f64 {
        let side = match self.hinge {
            Hinge::Left => 1.0,
            Hinge::Right => -1.0,
        };
        if self.flip {
            -side
        } else {
            side
        }
    }

    /// Mirror factors for the front and back piece.
    fn scales(&self) -> (Vector3<f64>, Vector3<f64>) {
        let sx = match self.hinge {
            Hinge::Left => -1.0,
            Hinge::Right => 1.0,
        };
        let front = if self.flip { -1.0 } else { 1.0 };
        (Vector3::new(1.0, sx, front), Vector3::new(1.0, sx, -front))
    }

    fn placement(&self, height: f64, front: bool) -> Placement {
        let (x, z) = self.axes();
        let mut location = self.origin + x * self.side() * (self.width - EDGE_INSET) + self.frame.y * height;
        if front {
            location += z * self.thickness;
        }
        let (front_scale, back_scale) = self.scales();
        Placement {
            location,
            normal: self.frame.z,
            up: self.frame.y,
            scale: if front { front_scale } else { back_scale },
        }
    }
}

fn asset_name(prefix: &str, kind: HardwareKind) -> Option<String> {
    match kind {
        HardwareKind::None => None,
        HardwareKind::Round => Some(format!("{prefix}_round")),
        HardwareKind::Straight => Some(format!("{prefix}_straight")),
    }
}

/// Knob placeholders for both faces of a door leaf.
pub fn door_knobs(mount: &Mount, kind: HardwareKind) -> Vec<GeneratedObject> {
    let Some(name) = asset_name("knob", kind) else {
        return Vec::new();
    };
    [true, false]
        .into_iter()
        .map(|front| GeneratedObject::asset(ObjectKind::Knob, &name, mount.placement(KNOB_HEIGHT, front)))
        .collect()
}

/// Handle placeholder on the inner face of a window leaf.
pub fn window_handle(mount: &Mount, kind: HardwareKind) -> Option<GeneratedObject> {
    let name = asset_name("handle", kind)?;
    Some(GeneratedObject::asset(
        ObjectKind::Handle,
        &name,
        mount.placement(HANDLE_HEIGHT, false),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn wall_frame() -> LocalFrame {
        LocalFrame::from_normal(&-Vector3::y())
    }

    fn mount(frame: &LocalFrame, hinge: Hinge, flip: bool) -> Mount<'_> {
        Mount {
            frame,
            origin: Point3::new(1.0, 0.1, 0.0),
            width: 0.9,
            thickness: 0.03,
            hinge,
            flip,
        }
    }

    #[test]
    fn knobs_sit_opposite_the_hinge() {
        let frame = wall_frame();
        let knobs = door_knobs(&mount(&frame, Hinge::Left, false), HardwareKind::Round);
        assert_eq!(knobs.len(), 2);
        let (name, front) = knobs[0].asset.clone().unwrap();
        assert_eq!(name, "knob_round");
        assert_relative_eq!(front.location.x, 1.84, epsilon = 1e-9);
        assert_relative_eq!(front.location.z, 1.0, epsilon = 1e-9);
        // Front knob on the leaf face, back knob on its back plane
        assert_relative_eq!(front.location.y, 0.07, epsilon = 1e-9);
        let back = knobs[1].asset.as_ref().unwrap().1;
        assert_relative_eq!(back.location.y, 0.1, epsilon = 1e-9);
        assert_relative_eq!(front.scale.y, -1.0);
        assert_relative_eq!(back.scale.z, -1.0);

        let right = door_knobs(&mount(&frame, Hinge::Right, false), HardwareKind::Straight);
        let placement = right[0].asset.as_ref().unwrap().1;
        assert_relative_eq!(placement.location.x, 0.16, epsilon = 1e-9);
        assert_relative_eq!(placement.scale.y, 1.0);
    }

    #[test]
    fn flipped_leaf_mirrors_depth() {
        let frame = wall_frame();
        let knobs = door_knobs(&mount(&frame, Hinge::Left, true), HardwareKind::Round);
        let front = knobs[0].asset.as_ref().unwrap().1;
        // Flipped Left hinge still opens on the same wall side
        assert_relative_eq!(front.location.x, 1.84, epsilon = 1e-9);
        assert_relative_eq!(front.location.y, 0.13, epsilon = 1e-9);
        assert_relative_eq!(front.scale.z, -1.0);
    }

    #[test]
    fn no_hardware_for_none() {
        let frame = wall_frame();
        let m = mount(&frame, Hinge::Left, false);
        assert!(door_knobs(&m, HardwareKind::None).is_empty());
        assert!(window_handle(&m, HardwareKind::None).is_none());
        let handle = window_handle(&m, HardwareKind::Round).unwrap();
        assert_eq!(handle.kind, ObjectKind::Handle);
        assert_relative_eq!(handle.origin.z, 0.5, epsilon = 1e-9);
    }
}
