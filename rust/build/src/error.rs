// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for feature builds.

/// Result type alias for feature builds.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures reported by the feature builders.
///
/// Precondition variants are raised by validation before the mesh is
/// touched. Everything else surfaces mid-build and may leave partial
/// geometry behind for the host to discard.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no faces selected")]
    EmptySelection,

    #[error("{0} requires rectangular faces with exactly two horizontal edges")]
    NotRectangular(&'static str),

    #[error("{0} requires all selected faces to share the same dimensions")]
    DimensionMismatch(&'static str),

    #[error("{0} requires flat, upward facing faces")]
    NotFlat(&'static str),

    #[error("{0} requires upright faces")]
    NotUpright(&'static str),

    #[error("opening has no door or window components")]
    EmptyComponents,

    #[error("unsupported opening component '{0}'")]
    UnsupportedComponent(char),

    #[error("roof outline is not a single closed loop")]
    OpenOutline,

    #[error("skeleton construction failed: {0}")]
    Skeleton(String),

    #[error("geometry construction failed: {0}")]
    Geometry(&'static str),

    #[error("host error: {0}")]
    Host(String),

    #[error(transparent)]
    Mesh(#[from] archgen_mesh::Error),
}

impl Error {
    /// `true` for failures detected before any mutation.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::EmptySelection
                | Error::NotRectangular(_)
                | Error::DimensionMismatch(_)
                | Error::NotFlat(_)
                | Error::NotUpright(_)
                | Error::EmptyComponents
                | Error::UnsupportedComponent(_)
                | Error::OpenOutline
        )
    }
}
