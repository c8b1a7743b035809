// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Key types for arena-based mesh storage.
//!
//! Vertices, edges and faces each get a generational `slotmap` key. A key
//! stays valid until its own element is removed, so callers can hold on to
//! keys for elements an operation did not touch.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a vertex (point in 3D space).
    pub struct VertexKey;

    /// Key for an edge (unordered vertex pair).
    pub struct EdgeKey;

    /// Key for a face (closed vertex/edge loop).
    pub struct FaceKey;
}

/// A key that can reference any mesh element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKey {
    Vertex(VertexKey),
    Edge(EdgeKey),
    Face(FaceKey),
}

impl ElementKey {
    /// Returns the element type of this key.
    pub fn element_type(&self) -> ElementType {
        match self {
            ElementKey::Vertex(_) => ElementType::Vertex,
            ElementKey::Edge(_) => ElementType::Edge,
            ElementKey::Face(_) => ElementType::Face,
        }
    }
}

/// Discriminant for mesh element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementType {
    Vertex = 0,
    Edge = 1,
    Face = 2,
}

impl ElementType {
    /// Returns the type name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Vertex => "Vertex",
            ElementType::Edge => "Edge",
            ElementType::Face => "Face",
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<VertexKey> for ElementKey {
    fn from(k: VertexKey) -> Self {
        ElementKey::Vertex(k)
    }
}

impl From<EdgeKey> for ElementKey {
    fn from(k: EdgeKey) -> Self {
        ElementKey::Edge(k)
    }
}

impl From<FaceKey> for ElementKey {
    fn from(k: FaceKey) -> Self {
        ElementKey::Face(k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn element_key_roundtrip() {
        let mut faces: SlotMap<FaceKey, ()> = SlotMap::with_key();
        let fk = faces.insert(());
        let ek: ElementKey = fk.into();
        assert_eq!(ek.element_type(), ElementType::Face);
        assert_eq!(ek, ElementKey::Face(fk));
    }

    #[test]
    fn element_type_display() {
        assert_eq!(ElementType::Vertex.to_string(), "Vertex");
        assert_eq!(ElementType::Edge.as_str(), "Edge");
    }
}
