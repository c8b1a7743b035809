// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Generated sub-objects and their ownership tree.
//!
//! Feature builds split finished face groups out of the working mesh into
//! standalone meshes (frames, leaves, hardware, railings). They live in an
//! [`ObjectArena`] and point at their parent by [`ObjectId`]; the host
//! resolves the tree into scene placement when the arena is linked.

use std::fmt;

use archgen_mesh::{FaceKey, Mesh};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Index handle into an [`ObjectArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(usize);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a generated object represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Frame,
    Door,
    Window,
    Arch,
    Bars,
    Knob,
    Handle,
    Railing,
    Stairs,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frame => "Frame",
            Self::Door => "Door",
            Self::Window => "Window",
            Self::Arch => "Arch",
            Self::Bars => "Bars",
            Self::Knob => "Knob",
            Self::Handle => "Handle",
            Self::Railing => "Railing",
            Self::Stairs => "Stairs",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placement of an imported asset: location, facing, and mirroring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// World location of the asset origin.
    pub location: Point3<f64>,
    /// Direction the asset's local `z` should face.
    pub normal: Vector3<f64>,
    /// Direction of the asset's local `y`.
    pub up: Vector3<f64>,
    /// Signed per-axis scale; negative components mirror.
    pub scale: Vector3<f64>,
}

/// A standalone sub-mesh produced by a feature build.
#[derive(Debug, Clone)]
pub struct GeneratedObject {
    pub name: String,
    pub kind: ObjectKind,
    /// Geometry in world coordinates.
    pub mesh: Mesh,
    /// Pivot point of the object.
    pub origin: Point3<f64>,
    /// Name of an external asset to import into `mesh`, with its placement.
    pub asset: Option<(String, Placement)>,
    pub parent: Option<ObjectId>,
}

impl GeneratedObject {
    pub fn new(kind: ObjectKind, mesh: Mesh, origin: Point3<f64>) -> Self {
        Self {
            name: kind.as_str().to_string(),
            kind,
            mesh,
            origin,
            asset: None,
            parent: None,
        }
    }

    /// Placeholder for an imported asset; the host fills in the mesh.
    pub fn asset(kind: ObjectKind, name: &str, placement: Placement) -> Self {
        Self {
            name: kind.as_str().to_string(),
            kind,
            mesh: Mesh::new(),
            origin: placement.location,
            asset: Some((name.to_string(), placement)),
            parent: None,
        }
    }
}

/// Arena of generated objects with index-based parent links.
#[derive(Debug, Clone, Default)]
pub struct ObjectArena {
    objects: Vec<GeneratedObject>,
}

impl ObjectArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: GeneratedObject) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    /// Adds `object` as a child of `parent`.
    pub fn add_child(&mut self, parent: ObjectId, mut object: GeneratedObject) -> ObjectId {
        object.parent = Some(parent);
        self.add(object)
    }

    pub fn get(&self, id: ObjectId) -> Option<&GeneratedObject> {
        self.objects.get(id.0)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GeneratedObject> {
        self.objects.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &GeneratedObject)> {
        self.objects.iter().enumerate().map(|(i, o)| (ObjectId(i), o))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ObjectId, &mut GeneratedObject)> {
        self.objects.iter_mut().enumerate().map(|(i, o)| (ObjectId(i), o))
    }

    pub fn children(&self, parent: ObjectId) -> Vec<ObjectId> {
        self.iter()
            .filter(|(_, o)| o.parent == Some(parent))
            .map(|(id, _)| id)
            .collect()
    }

    /// Objects without a parent.
    pub fn roots(&self) -> Vec<ObjectId> {
        self.iter()
            .filter(|(_, o)| o.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn of_kind(&self, kind: ObjectKind) -> Vec<ObjectId> {
        self.iter()
            .filter(|(_, o)| o.kind == kind)
            .map(|(id, _)| id)
            .collect()
    }

    /// Moves every object of `other` into this arena, keeping parent links.
    pub fn extend(&mut self, other: ObjectArena) {
        let base = self.objects.len();
        for mut object in other.objects {
            object.parent = object.parent.map(|p| ObjectId(p.0 + base));
            self.objects.push(object);
        }
    }
}

/// Moves `faces` out of `mesh` into a new object.
pub fn split_off(
    mesh: &mut Mesh,
    faces: &[FaceKey],
    kind: ObjectKind,
    origin: Point3<f64>,
) -> Result<GeneratedObject> {
    let part = mesh.extract_faces(faces)?;
    mesh.delete_faces(faces);
    Ok(GeneratedObject::new(kind, part, origin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_links_survive_extend() {
        let mut first = ObjectArena::new();
        first.add(GeneratedObject::new(ObjectKind::Stairs, Mesh::new(), Point3::origin()));

        let mut second = ObjectArena::new();
        let frame = second.add(GeneratedObject::new(ObjectKind::Frame, Mesh::new(), Point3::origin()));
        second.add_child(frame, GeneratedObject::new(ObjectKind::Door, Mesh::new(), Point3::origin()));

        first.extend(second);
        assert_eq!(first.len(), 3);
        let frame = first.of_kind(ObjectKind::Frame)[0];
        let door = first.of_kind(ObjectKind::Door)[0];
        assert_eq!(first.get(door).unwrap().parent, Some(frame));
        assert_eq!(first.children(frame), vec![door]);
        assert_eq!(first.roots().len(), 2);
    }

    #[test]
    fn split_off_moves_faces() {
        let mut mesh = Mesh::new();
        let a = mesh.add_plane(&Point3::origin(), 1.0, 1.0).unwrap();
        let b = mesh.add_plane(&Point3::new(3.0, 0.0, 0.0), 1.0, 1.0).unwrap();
        let object = split_off(&mut mesh, &[b], ObjectKind::Door, Point3::origin()).unwrap();
        assert_eq!(object.mesh.face_count(), 1);
        assert_eq!(object.name, "Door");
        assert!(mesh.contains_face(a));
        assert!(!mesh.contains_face(b));
    }
}
