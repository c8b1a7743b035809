// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for mesh kernel operations.

use crate::keys::{EdgeKey, FaceKey, VertexKey};

/// Result type alias for mesh operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Geometric and topological failures raised by the kernel.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Vertex key not found in the mesh.
    #[error("vertex not found: {0:?}")]
    VertexNotFound(VertexKey),

    /// Edge key not found in the mesh.
    #[error("edge not found: {0:?}")]
    EdgeNotFound(EdgeKey),

    /// Face key not found in the mesh.
    #[error("face not found: {0:?}")]
    FaceNotFound(FaceKey),

    /// An edge would join a vertex to itself or to a coincident point.
    #[error("degenerate edge: endpoints coincide")]
    DegenerateEdge,

    /// A face would have fewer than three distinct vertices or zero area.
    #[error("degenerate face: {0}")]
    DegenerateFace(&'static str),

    /// The vertex is not part of the face loop.
    #[error("vertex {vertex:?} is not part of face {face:?}")]
    NotInLoop { face: FaceKey, vertex: VertexKey },

    /// The vertex is not an endpoint of the edge.
    #[error("vertex {vertex:?} is not an endpoint of edge {edge:?}")]
    NotOnEdge { edge: EdgeKey, vertex: VertexKey },

    /// A face split needs two non-adjacent loop vertices.
    #[error("cannot split face {0:?} between adjacent vertices")]
    AdjacentVertices(FaceKey),

    /// A subdivision produced a zero-length interval.
    #[error("zero-length subdivision: interval {index} has width {width}")]
    ZeroLengthSubdivision { index: usize, width: f64 },

    /// A width list did not describe a usable partition.
    #[error("invalid widths: {0}")]
    InvalidWidths(String),

    /// A region boundary touches itself at a vertex.
    #[error("non-manifold region boundary at vertex {0:?}")]
    NonManifoldRegion(VertexKey),

    /// An operation was given nothing to work on.
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
