// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # ArchGen Build
//!
//! Procedural building features on top of [`archgen_mesh`]: floors, roofs,
//! door and window openings, stairs, railings and balconies.
//!
//! Every `build_*` entry point follows the same shape:
//!
//! 1. Validate the selection against the host's mesh. Precondition failures
//!    return before anything is touched.
//! 2. Open an [`EditSession`] on the host.
//! 3. Run the builder on the working mesh, collecting generated sub-objects
//!    into an [`ObjectArena`].
//! 4. Commit the mesh and link the objects. Any error on the way drops the
//!    session, which aborts the edit.
//!
//! ```
//! use archgen_build::{build_floor, build_floorplan, BuildConfig, FloorParams, FloorplanParams, MemoryHost};
//!
//! let mut host = MemoryHost::default();
//! let plan = build_floorplan(&mut host, &FloorplanParams::default()).unwrap();
//! let floor = build_floor(&mut host, &plan.faces, &FloorParams::default(), &BuildConfig::default()).unwrap();
//! assert!(!floor.faces.is_empty());
//! ```

pub mod balcony;
pub mod config;
pub mod context;
pub mod error;
pub mod fill;
pub mod floor;
pub mod floorplan;
pub mod hardware;
pub mod objects;
pub mod opening;
pub mod params;
pub mod railing;
pub mod roof;
pub mod session;
pub mod skeleton;
pub mod stairs;
pub mod validate;

use archgen_mesh::{FaceKey, Mesh};
use nalgebra::{Matrix3, Matrix4, Point3, Translation3};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

pub use config::BuildConfig;
pub use error::{Error, Result};
pub use objects::{GeneratedObject, ObjectArena, ObjectId, ObjectKind, Placement};
pub use params::{
    ArchFunction, ArchParams, BalconyParams, BarFill, DoorParams, FillParams, FloorParams, FloorplanParams,
    FrameParams, GlassFill, HardwareKind, Hinge, LouverFill, OpeningParams, PanelFill, PostFill, RailFill,
    RailParams, RailingFill, RoofKind, RoofParams, RoofTopParams, SizeOffset, StairsBottom, StairsParams,
    WallFill, WindowParams,
};
pub use session::{EditSession, MemoryHost, MeshHost};

/// What a successful build left behind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOutput {
    /// Faces added to or reshaped in the host mesh.
    pub faces: Vec<FaceKey>,
    /// Objects linked into the host.
    pub objects: usize,
}

/// Outcome of a build as reported to a host UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum BuildStatus {
    Ok,
    Error(String),
}

impl BuildStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, BuildStatus::Ok)
    }
}

impl<T> From<&Result<T>> for BuildStatus {
    fn from(result: &Result<T>) -> Self {
        match result {
            Ok(_) => BuildStatus::Ok,
            Err(err) => BuildStatus::Error(err.to_string()),
        }
    }
}

impl<T> From<Result<T>> for BuildStatus {
    fn from(result: Result<T>) -> Self {
        BuildStatus::from(&result)
    }
}

/// Opens a session and runs `check` on the working mesh before anything
/// else touches it. A failed check aborts the untouched edit.
fn validated<'h, H, F>(host: &'h mut H, check: F) -> Result<EditSession<'h, H>>
where
    H: MeshHost + ?Sized,
    F: FnOnce(&Mesh) -> Result<()>,
{
    let mut session = EditSession::begin(host)?;
    check(session.mesh())?;
    Ok(session)
}

/// Commits `objects` after filling in imported assets.
fn finish<H: MeshHost + ?Sized>(
    mut session: EditSession<'_, H>,
    mut objects: ObjectArena,
    faces: Vec<FaceKey>,
) -> Result<BuildOutput> {
    {
        let (_, host) = session.parts();
        resolve_assets(host, &mut objects);
    }
    let count = objects.len();
    session.commit(objects)?;
    Ok(BuildOutput { faces, objects: count })
}

/// Imports the named model of every asset placeholder the host can supply.
fn resolve_assets<H: MeshHost + ?Sized>(host: &mut H, objects: &mut ObjectArena) {
    for (_, object) in objects.iter_mut() {
        let Some((name, placement)) = object.asset.as_ref() else {
            continue;
        };
        let Some(mut mesh) = host.import_asset(name) else {
            tracing::debug!(asset = %name, "Asset not provided by host");
            continue;
        };
        place_asset(&mut mesh, placement);
        object.mesh = mesh;
    }
}

/// Moves an asset from its local frame to `placement`.
///
/// The asset's `z` turns to the placement normal and its `y` to the up
/// vector; the signed scale is applied first.
pub fn place_asset(mesh: &mut Mesh, placement: &Placement) {
    let z = placement.normal.try_normalize(1e-12).unwrap_or_else(nalgebra::Vector3::z);
    let y = (placement.up - z * placement.up.dot(&z))
        .try_normalize(1e-12)
        .unwrap_or_else(nalgebra::Vector3::y);
    let x = y.cross(&z);
    let rotation = Matrix3::from_columns(&[x, y, z]).to_homogeneous();
    let scale = Matrix4::new_nonuniform_scaling(&placement.scale);
    let translation = Translation3::from(placement.location.coords).to_homogeneous();
    let verts: Vec<_> = mesh.vertex_keys().collect();
    mesh.transform(&verts, &(translation * rotation * scale));
}

/// Adds a `width` x `length` floorplan plane at the origin.
pub fn build_floorplan<H: MeshHost + ?Sized>(host: &mut H, params: &FloorplanParams) -> Result<BuildOutput> {
    tracing::info!(width = params.width, length = params.length, "Building floorplan");
    let mut session = EditSession::begin(host)?;
    let face = floorplan::create_floorplan(session.mesh(), params)?;
    finish(session, ObjectArena::new(), vec![face])
}

/// Builds floors over the flat `faces`, with a roof on top when requested.
pub fn build_floor<H: MeshHost + ?Sized>(
    host: &mut H,
    faces: &[FaceKey],
    params: &FloorParams,
    config: &BuildConfig,
) -> Result<BuildOutput> {
    tracing::info!(
        faces = faces.len(),
        floors = params.floor_count,
        height = params.floor_height,
        "Building floors"
    );
    validate::some_selection(faces)?;
    let mut session = validated(host, |mesh| validate::level(mesh, faces, "Floor"))?;
    let mesh = session.mesh();
    let result = floor::build_floors(mesh, faces, params)?;
    let mut out: Vec<FaceKey> = result
        .slabs
        .iter()
        .chain(&result.walls)
        .chain(&result.inner_walls)
        .chain(&result.floors)
        .chain(&result.ceilings)
        .copied()
        .collect();
    if let Some(roof) = params.roof.as_ref() {
        out.extend(roof::build_roof(mesh, &result.top, roof, config)?);
    }
    finish(session, ObjectArena::new(), out)
}

/// Builds a roof over the flat `faces`.
pub fn build_roof<H: MeshHost + ?Sized>(
    host: &mut H,
    faces: &[FaceKey],
    params: &RoofParams,
    config: &BuildConfig,
) -> Result<BuildOutput> {
    tracing::info!(faces = faces.len(), kind = ?params.kind, height = params.height, "Building roof");
    validate::some_selection(faces)?;
    let mut session = validated(host, |mesh| validate::flat(mesh, faces, "Roof"))?;
    let roof = roof::build_roof(session.mesh(), faces, params, config)?;
    finish(session, ObjectArena::new(), roof)
}

/// Lays a thick, overhanging shell over existing roof faces.
pub fn build_roof_top<H: MeshHost + ?Sized>(
    host: &mut H,
    faces: &[FaceKey],
    params: &RoofTopParams,
) -> Result<BuildOutput> {
    tracing::info!(
        faces = faces.len(),
        thickness = params.thickness,
        outset = params.outset,
        "Building roof top"
    );
    validate::some_selection(faces)?;
    let mut session = EditSession::begin(host)?;
    let roof = roof::thicken_roof(session.mesh(), faces, params.thickness, params.outset)?;
    finish(session, ObjectArena::new(), roof)
}

/// Builds the opening described by `params` in every upright face.
pub fn build_opening<H: MeshHost + ?Sized>(
    host: &mut H,
    faces: &[FaceKey],
    params: &OpeningParams,
    config: &BuildConfig,
) -> Result<BuildOutput> {
    tracing::info!(
        faces = faces.len(),
        components = %params.components,
        count = params.count,
        "Building opening"
    );
    opening::parse_components(&params.components)?;
    validate::some_selection(faces)?;
    let mut session = validated(host, |mesh| {
        validate::wall_faces(mesh, faces, "Opening")?;
        validate::upright(mesh, faces, "Opening")
    })?;
    let before: FxHashSet<FaceKey> = session.mesh().face_keys().collect();
    let mut objects = ObjectArena::new();
    for &face in faces {
        objects.extend(opening::create_opening(session.mesh(), face, params, config)?);
    }
    let added = session.mesh().face_keys().filter(|f| !before.contains(f)).collect();
    finish(session, objects, added)
}

/// Builds stairs in front of every upright face.
pub fn build_stairs<H: MeshHost + ?Sized>(
    host: &mut H,
    faces: &[FaceKey],
    params: &StairsParams,
) -> Result<BuildOutput> {
    tracing::info!(
        faces = faces.len(),
        steps = params.step_count,
        width = params.width,
        "Building stairs"
    );
    validate::some_selection(faces)?;
    let mut session = validated(host, |mesh| validate::upright(mesh, faces, "Stairs"))?;
    let mut objects = ObjectArena::new();
    for &face in faces {
        let stairs = stairs::create_stairs(session.mesh(), face, params)?;
        let id = objects.add(GeneratedObject::new(ObjectKind::Stairs, stairs.mesh, stairs.origin));
        if let Some((mesh, parts)) = stairs.railing {
            tracing::debug!(faces = parts.len(), "Stairs railing attached");
            objects.add_child(id, GeneratedObject::new(ObjectKind::Railing, mesh, stairs.origin));
        }
    }
    finish(session, objects, Vec::new())
}

/// Turns an upright face group into a railing object.
pub fn build_railing<H: MeshHost + ?Sized>(
    host: &mut H,
    faces: &[FaceKey],
    params: &RailParams,
) -> Result<BuildOutput> {
    tracing::info!(faces = faces.len(), fill = ?params.fill, "Building railing");
    validate::some_selection(faces)?;
    let mut session = validated(host, |mesh| validate::upright(mesh, faces, "Railing"))?;
    let mesh = session.mesh();
    let origin = railing_origin(mesh, faces);
    let mut object = objects::split_off(mesh, faces, ObjectKind::Railing, origin)?;
    let group: Vec<FaceKey> = object.mesh.face_keys().collect();
    let parts = railing::create_railing(&mut object.mesh, &group, params)?;
    tracing::debug!(
        posts = parts.corner_posts.len(),
        rails = parts.top_rails.len(),
        fill = parts.fill.len(),
        "Railing built"
    );
    let mut objects = ObjectArena::new();
    objects.add(object);
    finish(session, objects, Vec::new())
}

/// Lowest point under the middle of a face group.
fn railing_origin(mesh: &Mesh, faces: &[FaceKey]) -> Point3<f64> {
    let center = mesh.faces_center(faces).unwrap_or_else(Point3::origin);
    let low = mesh
        .points(&mesh.faces_vertices(faces))
        .iter()
        .map(|p| p.z)
        .fold(f64::INFINITY, f64::min);
    if low.is_finite() {
        Point3::new(center.x, center.y, low)
    } else {
        center
    }
}

/// Builds a balcony on every upright face.
pub fn build_balcony<H: MeshHost + ?Sized>(
    host: &mut H,
    faces: &[FaceKey],
    params: &BalconyParams,
) -> Result<BuildOutput> {
    tracing::info!(
        faces = faces.len(),
        length = params.length,
        width = params.width,
        "Building balcony"
    );
    validate::some_selection(faces)?;
    let mut session = validated(host, |mesh| {
        validate::wall_faces(mesh, faces, "Balcony")?;
        validate::upright(mesh, faces, "Balcony")
    })?;
    let mut objects = ObjectArena::new();
    let mut out = Vec::new();
    for &face in faces {
        let balcony = balcony::create_balcony(session.mesh(), face, params)?;
        out.push(balcony.floor);
        out.push(balcony.ceiling);
        out.extend(&balcony.walls);
        if let Some((mesh, _)) = balcony.railing {
            objects.add(GeneratedObject::new(ObjectKind::Railing, mesh, balcony.origin));
        }
    }
    finish(session, objects, out)
}
