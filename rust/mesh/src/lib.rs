// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # ArchGen Mesh
//!
//! Mutable boundary-representation mesh kernel for procedural architecture.
//!
//! A [`Mesh`] owns vertices, edges and faces in slot maps with stable
//! generational keys, plus upward adjacency indices. On top of that the
//! kernel offers the editing primitives feature builders are made of:
//! interval subdivision, region extrusion, inset, duplication, boundary
//! queries and geometric predicates. Every face may carry one semantic
//! [`FaceCategory`].
//!
//! Mutating operations return the elements they created and never
//! invalidate keys of elements they did not touch.
//!
//! ```
//! use archgen_mesh::{FaceCategory, Mesh};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut mesh = Mesh::new();
//! let floor = mesh.add_plane(&Point3::origin(), 4.0, 4.0).unwrap();
//! mesh.set_category(&[floor], FaceCategory::Floor);
//! let ext = mesh.extrude_region(&[floor], 2.8, &Vector3::z(), true).unwrap();
//! assert_eq!(ext.sides.len(), 4);
//! ```

pub mod arena;
pub mod construction;
pub mod duplicate;
pub mod error;
pub mod export;
pub mod extrude;
pub mod geometry;
pub mod inset;
pub mod keys;
pub mod predicates;
pub mod primitives;
pub mod query;
pub mod serialization;
pub mod spatial;
pub mod subdivide;
pub mod tagging;
pub mod transform;
pub mod traversal;

pub use arena::{EdgeData, FaceData, Mesh, VertexData};
pub use duplicate::Duplicate;
pub use error::{Error, Result};
pub use export::TriangleMesh;
pub use extrude::{EdgeExtrusion, Extrusion};
pub use geometry::{bounds, mean_point};
pub use keys::{EdgeKey, ElementKey, ElementType, FaceKey, VertexKey};
pub use predicates::{approx_equal, vectors_parallel, EPSILON};
pub use primitives::{radius_to_side_length, Cylinder};
pub use query::LocalFrame;
pub use serialization::MeshSnapshot;
pub use spatial::SpatialIndex;
pub use subdivide::{EdgeSplit, FaceSplit, MIN_INTERVAL};
pub use tagging::FaceCategory;
