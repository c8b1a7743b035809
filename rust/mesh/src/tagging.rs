// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Semantic face categories.
//!
//! Each face carries at most one category, stored as an integer attribute
//! on the mesh. `0` (absent) means untagged. Assignment is a plain write
//! and can be repeated; the last write wins.

use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::arena::Mesh;
use crate::keys::FaceKey;

/// Closed set of face categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum FaceCategory {
    Slab = 1,
    Wall,
    Floor,
    Ceiling,
    Roof,
    RoofEdge,
    Frame,
    Pane,
    Panel,
    Louver,
    Bar,
    RailingPost,
    RailingRail,
    RailingInfill,
    Arch,
    Door,
    Window,
    Stairs,
}

impl FaceCategory {
    pub const ALL: [FaceCategory; 18] = [
        Self::Slab,
        Self::Wall,
        Self::Floor,
        Self::Ceiling,
        Self::Roof,
        Self::RoofEdge,
        Self::Frame,
        Self::Pane,
        Self::Panel,
        Self::Louver,
        Self::Bar,
        Self::RailingPost,
        Self::RailingRail,
        Self::RailingInfill,
        Self::Arch,
        Self::Door,
        Self::Window,
        Self::Stairs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slab => "SLAB",
            Self::Wall => "WALL",
            Self::Floor => "FLOOR",
            Self::Ceiling => "CEILING",
            Self::Roof => "ROOF",
            Self::RoofEdge => "ROOF_EDGE",
            Self::Frame => "FRAME",
            Self::Pane => "PANE",
            Self::Panel => "PANEL",
            Self::Louver => "LOUVER",
            Self::Bar => "BAR",
            Self::RailingPost => "RAILING_POST",
            Self::RailingRail => "RAILING_RAIL",
            Self::RailingInfill => "RAILING_INFILL",
            Self::Arch => "ARCH",
            Self::Door => "DOOR",
            Self::Window => "WINDOW",
            Self::Stairs => "STAIRS",
        }
    }

    /// Integer attribute value.
    pub fn value(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for FaceCategory {
    type Error = i32;

    fn try_from(value: i32) -> std::result::Result<Self, i32> {
        Self::ALL.iter().copied().find(|c| c.value() == value).ok_or(value)
    }
}

impl fmt::Display for FaceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Mesh {
    /// Tags faces, overwriting any previous category. Missing faces are
    /// skipped.
    pub fn set_category(&mut self, faces: &[FaceKey], category: FaceCategory) {
        for &f in faces {
            if self.faces.contains_key(f) {
                self.categories.insert(f, category.value());
            }
        }
    }

    pub fn category(&self, face: FaceKey) -> Option<FaceCategory> {
        self.categories
            .get(&face)
            .and_then(|&v| FaceCategory::try_from(v).ok())
    }

    /// Raw attribute value, `0` when untagged.
    pub fn category_attribute(&self, face: FaceKey) -> i32 {
        self.categories.get(&face).copied().unwrap_or(0)
    }

    pub fn clear_category(&mut self, faces: &[FaceKey]) {
        for f in faces {
            self.categories.remove(f);
        }
    }

    pub fn faces_in_category(&self, category: FaceCategory) -> Vec<FaceKey> {
        self.faces
            .keys()
            .filter(|f| self.categories.get(f) == Some(&category.value()))
            .collect()
    }

    /// Runs `build` and tags every face it created with `category`.
    ///
    /// Faces that existed before the call keep their tags, even when
    /// `build` rewired them.
    pub fn tag_new_faces<T, E>(
        &mut self,
        category: FaceCategory,
        build: impl FnOnce(&mut Mesh) -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E> {
        let before: FxHashSet<FaceKey> = self.faces.keys().collect();
        let out = build(self)?;
        let created: Vec<FaceKey> = self.faces.keys().filter(|f| !before.contains(f)).collect();
        self.set_category(&created, category);
        Ok(out)
    }

    /// Copies the category of `from` onto `to`, or clears `to` when `from`
    /// is untagged.
    pub(crate) fn copy_category(&mut self, from: FaceKey, to: FaceKey) {
        match self.categories.get(&from).copied() {
            Some(c) => {
                self.categories.insert(to, c);
            }
            None => {
                self.categories.remove(&to);
            }
        }
    }
}
