// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Precondition checks run before any mesh mutation.

use archgen_mesh::{FaceKey, Mesh};

use crate::error::{Error, Result};

pub fn some_selection(faces: &[FaceKey]) -> Result<()> {
    if faces.is_empty() {
        return Err(Error::EmptySelection);
    }
    Ok(())
}

/// Every face is a rectangle with exactly two horizontal edges.
pub fn ngon(mesh: &Mesh, faces: &[FaceKey], feature: &'static str) -> Result<()> {
    if faces.iter().all(|&f| mesh.is_valid_ngon(f)) {
        Ok(())
    } else {
        Err(Error::NotRectangular(feature))
    }
}

pub fn same_dimensions(mesh: &Mesh, faces: &[FaceKey], feature: &'static str) -> Result<()> {
    if mesh.same_dimensions(faces) {
        Ok(())
    } else {
        Err(Error::DimensionMismatch(feature))
    }
}

pub fn upright(mesh: &Mesh, faces: &[FaceKey], feature: &'static str) -> Result<()> {
    if faces.iter().all(|&f| mesh.is_upright(f)) {
        Ok(())
    } else {
        Err(Error::NotUpright(feature))
    }
}

/// Every face is level and points up.
pub fn flat(mesh: &Mesh, faces: &[FaceKey], feature: &'static str) -> Result<()> {
    let up = |f: FaceKey| mesh.is_flat(f) && mesh.face_normal(f).is_some_and(|n| n.z > 0.0);
    if faces.iter().all(|&f| up(f)) {
        Ok(())
    } else {
        Err(Error::NotFlat(feature))
    }
}

/// Every face is level, facing up or down.
pub fn level(mesh: &Mesh, faces: &[FaceKey], feature: &'static str) -> Result<()> {
    if faces.iter().all(|&f| mesh.is_flat(f)) {
        Ok(())
    } else {
        Err(Error::NotFlat(feature))
    }
}

/// Checks shared by every wall-mounted feature.
pub fn wall_faces(mesh: &Mesh, faces: &[FaceKey], feature: &'static str) -> Result<()> {
    some_selection(faces)?;
    ngon(mesh, faces, feature)?;
    same_dimensions(mesh, faces, feature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn empty_selection_is_rejected() {
        assert!(matches!(some_selection(&[]), Err(Error::EmptySelection)));
    }

    #[test]
    fn triangle_is_not_a_wall() {
        let mut mesh = Mesh::new();
        let tri = mesh
            .add_face_from_points(&[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.5, 0.0, 1.0),
            ])
            .unwrap();
        let err = wall_faces(&mesh, &[tri], "Door").unwrap_err();
        assert!(err.is_precondition());
        assert_eq!(
            err.to_string(),
            "Door requires rectangular faces with exactly two horizontal edges"
        );
    }

    #[test]
    fn mixed_sizes_are_rejected() {
        let mut mesh = Mesh::new();
        let a = mesh
            .add_face_from_points(&[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(0.0, 0.0, 1.0),
            ])
            .unwrap();
        let b = mesh
            .add_face_from_points(&[
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(4.0, 0.0, 0.0),
                Point3::new(4.0, 0.0, 1.0),
                Point3::new(2.0, 0.0, 1.0),
            ])
            .unwrap();
        assert!(matches!(
            wall_faces(&mesh, &[a, b], "Window"),
            Err(Error::DimensionMismatch("Window"))
        ));
    }

    #[test]
    fn floor_faces_are_flat_not_upright() {
        let mut mesh = Mesh::new();
        let f = mesh.add_plane(&Point3::origin(), 2.0, 2.0).unwrap();
        assert!(flat(&mesh, &[f], "Roof").is_ok());
        assert!(matches!(upright(&mesh, &[f], "Stairs"), Err(Error::NotUpright("Stairs"))));
    }

    #[test]
    fn downward_faces_are_level_but_not_flat() {
        let mut mesh = Mesh::new();
        let f = mesh.add_plane(&Point3::origin(), 2.0, 2.0).unwrap();
        mesh.reverse_face(f).unwrap();
        assert!(level(&mesh, &[f], "Floor").is_ok());
        assert!(matches!(flat(&mesh, &[f], "Roof"), Err(Error::NotFlat("Roof"))));
    }
}
