// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rectangular floorplans.

use archgen_mesh::{FaceKey, Mesh};
use nalgebra::Point3;

use crate::error::Result;
use crate::params::FloorplanParams;

/// Adds a `width` x `length` plane centered on the origin, facing up.
pub fn create_floorplan(mesh: &mut Mesh, params: &FloorplanParams) -> Result<FaceKey> {
    let face = mesh.add_plane(&Point3::origin(), params.width, params.length)?;
    tracing::debug!(width = params.width, length = params.length, "Floorplan added");
    Ok(face)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn plane_is_centered() {
        let mut mesh = Mesh::new();
        let params = FloorplanParams {
            width: 6.0,
            length: 3.0,
        };
        let f = create_floorplan(&mut mesh, &params).unwrap();
        assert_relative_eq!(mesh.face_area(f).unwrap(), 18.0, epsilon = 1e-9);
        assert_relative_eq!(mesh.face_center(f).unwrap().coords.norm(), 0.0, epsilon = 1e-12);
        assert!(mesh.face_normal(f).unwrap().z > 0.99);
    }
}
